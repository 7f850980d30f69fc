//! Contracts of the remote collaborators the console talks to.
//!
//! The console only depends on these traits. `stationdesk-client` implements
//! them over HTTP; tests use in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::payment::{Payment, PaymentQuery, PaymentSummary};
use crate::staff::StaffMember;
use crate::station::Station;
use crate::types::EntityId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of a single remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The server answered with a non-success status.
    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        /// Server-supplied message, when the body carried one.
        message: Option<String>,
    },

    /// The request never produced a response (connection, timeout, TLS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// The server's message when it sent one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            RemoteError::Api {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Paging
// ---------------------------------------------------------------------------

/// Server-side pagination block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

impl Pagination {
    /// Pagination for an unpaged list of `len` items.
    pub fn from_len(len: usize) -> Self {
        let len = len as u64;
        Self {
            total: len,
            page: 1,
            limit: len,
            pages: u64::from(len > 0),
        }
    }

    /// Fill in `pages` when the server omitted it.
    pub fn normalized(mut self) -> Self {
        if self.pages == 0 && self.limit > 0 {
            self.pages = self.total.div_ceil(self.limit);
        }
        self.page = self.page.max(1);
        self
    }
}

/// Page and page size of a list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl PageRequest {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.max(1).to_string()),
            ("limit", self.limit.max(1).to_string()),
        ]
    }
}

/// Query of the unassigned-staff list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffPageQuery {
    pub page: PageRequest,
    pub search: Option<String>,
}

impl StaffPageQuery {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.page.to_query_pairs();
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}

// ---------------------------------------------------------------------------
// Requests and responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignStaffRequest {
    pub user_id: EntityId,
    pub station_id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignStaffRequest {
    pub user_id: EntityId,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaffPage {
    pub staff: Vec<StaffMember>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPage {
    pub users: Vec<StaffMember>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentPage {
    pub data: Vec<Payment>,
    pub summary: Option<PaymentSummary>,
    pub pagination: Pagination,
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Staff and station operations.
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    async fn get_stations(&self) -> Result<Vec<Station>, RemoteError>;

    async fn get_unassigned_staff(&self, query: &StaffPageQuery) -> Result<StaffPage, RemoteError>;

    async fn assign_staff(&self, request: &AssignStaffRequest) -> Result<(), RemoteError>;

    async fn unassign_staff(&self, request: &UnassignStaffRequest) -> Result<(), RemoteError>;

    /// Current roster of one station.
    async fn get_station_staff(&self, station_id: &str) -> Result<Vec<StaffMember>, RemoteError>;

    async fn get_users_by_role(&self, role: &str, page: PageRequest)
        -> Result<UserPage, RemoteError>;
}

/// Payment listing and export.
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    async fn get_payments(&self, query: &PaymentQuery) -> Result<PaymentPage, RemoteError>;

    /// Spreadsheet export of every payment matching the query's filters.
    async fn export_payments(&self, query: &PaymentQuery) -> Result<Vec<u8>, RemoteError>;
}
