use stationdesk_core::remote::RemoteError;

/// Errors from the back-office REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status, or a 2xx body with `success: false`.
    #[error("Back-office API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The body was valid JSON but not the expected shape.
    #[error("Unexpected response shape: {0}")]
    Decode(String),
}

impl ClientError {
    /// The `message` (or `error`) field of a JSON error body, if any.
    pub fn server_message(&self) -> Option<String> {
        let ClientError::Api { body, .. } = self else {
            return None;
        };
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        ["message", "error"].iter().find_map(|key| {
            value
                .get(*key)
                .and_then(serde_json::Value::as_str)
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
        })
    }
}

impl From<ClientError> for RemoteError {
    fn from(err: ClientError) -> Self {
        let message = err.server_message();
        match err {
            ClientError::Api { status, .. } => RemoteError::Api { status, message },
            ClientError::Request(e) if e.is_decode() => RemoteError::Decode(e.to_string()),
            ClientError::Request(e) => RemoteError::Transport(e.to_string()),
            ClientError::Decode(msg) => RemoteError::Decode(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn api_error_keeps_server_message() {
        let err = ClientError::Api {
            status: 409,
            body: r#"{"success":false,"message":"Staff already assigned"}"#.into(),
        };
        let remote = RemoteError::from(err);
        assert_matches!(
            remote,
            RemoteError::Api { status: 409, message: Some(m) } if m == "Staff already assigned"
        );
    }

    #[test]
    fn error_field_is_used_when_message_is_missing() {
        let err = ClientError::Api {
            status: 400,
            body: r#"{"error":"Invalid station"}"#.into(),
        };
        assert_eq!(err.server_message().as_deref(), Some("Invalid station"));
    }

    #[test]
    fn non_json_body_has_no_message() {
        let err = ClientError::Api {
            status: 502,
            body: "<html>Bad Gateway</html>".into(),
        };
        assert_matches!(RemoteError::from(err), RemoteError::Api { status: 502, message: None });
    }
}
