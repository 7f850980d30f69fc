//! Tolerant extraction of lists and pagination from response envelopes.
//!
//! List endpoints have answered with each of these shapes:
//!
//! ```text
//! [ ... ]
//! { "data": [ ... ] }
//! { "staff": [ ... ] }                  // or users / stations / payments
//! { "data": { "staff": [ ... ] } }
//! ```
//!
//! Pagination is read from `pagination` at the top level or under `data`.

use serde::de::DeserializeOwned;
use serde_json::Value;
use stationdesk_core::remote::Pagination;

use crate::error::ClientError;

/// Locate the list in `body`, trying `keys` as named wrappers.
pub fn find_list<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    if let Value::Array(items) = body {
        return Some(items);
    }

    let data = body.get("data");
    if let Some(Value::Array(items)) = data {
        return Some(items);
    }

    let scopes = [Some(body), data].into_iter().flatten();
    for scope in scopes {
        for key in keys {
            if let Some(Value::Array(items)) = scope.get(*key) {
                return Some(items);
            }
        }
    }
    None
}

/// Decode the list in `body`. A body without any recognised list yields an
/// empty list; an item that fails to decode is an error.
pub fn list_items<T: DeserializeOwned>(body: &Value, keys: &[&str]) -> Result<Vec<T>, ClientError> {
    let Some(items) = find_list(body, keys) else {
        tracing::warn!(expected = ?keys, "Response contained no recognisable list");
        return Ok(Vec::new());
    };

    items
        .iter()
        .map(|item| {
            serde_json::from_value(item.clone())
                .map_err(|e| ClientError::Decode(format!("list item: {e}")))
        })
        .collect()
}

/// Pagination from `body`, or an unpaged block covering `len` items.
pub fn pagination(body: &Value, len: usize) -> Pagination {
    find_object(body, "pagination")
        .and_then(|p| serde_json::from_value::<Pagination>(p.clone()).ok())
        .map(Pagination::normalized)
        .unwrap_or_else(|| Pagination::from_len(len))
}

/// Object at `key` at the top level or under `data`.
pub fn find_object<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    body.get(key)
        .or_else(|| body.get("data").and_then(|d| d.get(key)))
        .filter(|v| v.is_object())
}

/// Whether a 2xx body reports failure with `"success": false`.
pub fn reports_failure(body: &Value) -> bool {
    body.get("success").and_then(Value::as_bool) == Some(false)
}
