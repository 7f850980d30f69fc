//! REST client for the back-office API.
//!
//! Wraps the staff, station, user and payment endpoints using [`reqwest`]
//! and implements the collaborator traits from `stationdesk_core::remote`.

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::Serialize;
use serde_json::Value;
use stationdesk_core::payment::{PaymentQuery, PaymentSummary};
use stationdesk_core::remote::{
    AssignStaffRequest, PageRequest, PaymentLedger, PaymentPage, RemoteError, StaffDirectory,
    StaffPage, StaffPageQuery, UnassignStaffRequest, UserPage,
};
use stationdesk_core::staff::StaffMember;
use stationdesk_core::station::Station;

use crate::config::ClientConfig;
use crate::envelope;
use crate::error::ClientError;

/// Wrapper keys under which each list endpoint may nest its items.
const STATION_KEYS: &[&str] = &["stations"];
const STAFF_KEYS: &[&str] = &["staff", "users"];
const USER_KEYS: &[&str] = &["users", "staff"];
const PAYMENT_KEYS: &[&str] = &["payments"];

/// HTTP client for one back-office API deployment.
#[derive(Debug, Clone)]
pub struct BackOfficeClient {
    client: reqwest::Client,
    api_url: String,
    api_token: Option<String>,
}

impl BackOfficeClient {
    /// Build a client with the configured timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(
            client,
            config.api_url.clone(),
            config.api_token.clone(),
        ))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String, api_token: Option<String>) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_token,
        }
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// `GET path?query` and return the JSON body.
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ClientError> {
        tracing::debug!(path, "GET");
        let response = self
            .authorize(self.client.get(self.url(path)).query(query))
            .send()
            .await?;
        Self::parse_body(response).await
    }

    /// `POST path` with a JSON body, discarding the response body.
    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ClientError> {
        tracing::debug!(path, "POST");
        let response = self
            .authorize(self.client.post(self.url(path)).json(body))
            .send()
            .await?;
        Self::parse_body(response).await.map(|_| ())
    }

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or [`ClientError::Api`] with the status and body
    /// text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), "Back-office API request failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON body. An empty body reads as `null`; a body
    /// with `"success": false` is treated as an API error.
    async fn parse_body(response: reqwest::Response) -> Result<Value, ClientError> {
        let response = Self::ensure_success(response).await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        let body: Value =
            serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))?;
        if envelope::reports_failure(&body) {
            return Err(ClientError::Api { status, body: text });
        }
        Ok(body)
    }
}

/// `/stations/{id}/staff` with the id percent-encoded as one path segment.
fn station_staff_path(station_id: &str) -> String {
    format!("/stations/{}/staff", urlencoding::encode(station_id))
}

#[async_trait]
impl StaffDirectory for BackOfficeClient {
    async fn get_stations(&self) -> Result<Vec<Station>, RemoteError> {
        let body = self.get_json("/stations", &[]).await?;
        Ok(envelope::list_items(&body, STATION_KEYS)?)
    }

    async fn get_unassigned_staff(&self, query: &StaffPageQuery) -> Result<StaffPage, RemoteError> {
        let body = self
            .get_json("/staff/unassigned", &query.to_query_pairs())
            .await?;
        let staff: Vec<StaffMember> = envelope::list_items(&body, STAFF_KEYS)?;
        let pagination = envelope::pagination(&body, staff.len());
        Ok(StaffPage { staff, pagination })
    }

    async fn assign_staff(&self, request: &AssignStaffRequest) -> Result<(), RemoteError> {
        self.post_json("/staff/assign", request).await?;
        tracing::info!(
            staff_id = %request.user_id,
            station_id = %request.station_id,
            "Staff assigned"
        );
        Ok(())
    }

    async fn unassign_staff(&self, request: &UnassignStaffRequest) -> Result<(), RemoteError> {
        self.post_json("/staff/unassign", request).await?;
        tracing::info!(staff_id = %request.user_id, "Staff unassigned");
        Ok(())
    }

    async fn get_station_staff(&self, station_id: &str) -> Result<Vec<StaffMember>, RemoteError> {
        let body = self
            .get_json(&station_staff_path(station_id), &[])
            .await?;
        Ok(envelope::list_items(&body, STAFF_KEYS)?)
    }

    async fn get_users_by_role(
        &self,
        role: &str,
        page: PageRequest,
    ) -> Result<UserPage, RemoteError> {
        let mut query = vec![("role", role.to_string())];
        query.extend(page.to_query_pairs());
        let body = self.get_json("/users", &query).await?;
        let users: Vec<StaffMember> = envelope::list_items(&body, USER_KEYS)?;
        let pagination = envelope::pagination(&body, users.len());
        Ok(UserPage { users, pagination })
    }
}

#[async_trait]
impl PaymentLedger for BackOfficeClient {
    async fn get_payments(&self, query: &PaymentQuery) -> Result<PaymentPage, RemoteError> {
        let body = self.get_json("/payments", &query.to_query_pairs()).await?;
        let data = envelope::list_items(&body, PAYMENT_KEYS)?;
        let summary = envelope::find_object(&body, "summary")
            .and_then(|s| serde_json::from_value::<PaymentSummary>(s.clone()).ok());
        let pagination = envelope::pagination(&body, data.len());
        Ok(PaymentPage {
            data,
            summary,
            pagination,
        })
    }

    async fn export_payments(&self, query: &PaymentQuery) -> Result<Vec<u8>, RemoteError> {
        tracing::debug!(path = "/payments/export", "GET");
        let response = self
            .authorize(
                self.client
                    .get(self.url("/payments/export"))
                    .query(&query.to_export_pairs()),
            )
            .send()
            .await
            .map_err(ClientError::from)?;
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await.map_err(ClientError::from)?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_id_is_a_single_path_segment() {
        assert_eq!(station_staff_path("s1"), "/stations/s1/staff");
        assert_eq!(station_staff_path("a/b"), "/stations/a%2Fb/staff");
        assert_eq!(station_staff_path("x?y#z"), "/stations/x%3Fy%23z/staff");
        assert_eq!(station_staff_path("Hà Nội"), "/stations/H%C3%A0%20N%E1%BB%99i/staff");
    }
}
