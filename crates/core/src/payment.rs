//! Payments: normalisation of backend DTOs, summaries and list queries.
//!
//! The payments endpoints have shipped both snake_case and camelCase field
//! names, with customer details either flattened or nested under `user`.
//! [`normalize_payment`] folds every variant into one [`Payment`] shape.
//! Normalisation is idempotent: a serialised [`Payment`] normalises back to
//! itself.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::formatting::{amount_from_value, parse_date, UNKNOWN_DISPLAY};
use crate::table::{SortDirection, TableRow};
use crate::types::{id_from_value, EntityId, Timestamp};

// ---------------------------------------------------------------------------
// Payment
// ---------------------------------------------------------------------------

/// A normalised payment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value")]
pub struct Payment {
    pub id: EntityId,
    pub amount: f64,
    pub status: String,
    pub payment_type: String,
    pub payment_method: String,
    pub transaction_id: Option<String>,
    pub description: Option<String>,
    pub booking_code: Option<String>,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub created_at: Option<Timestamp>,
}

impl From<Value> for Payment {
    fn from(value: Value) -> Self {
        normalize_payment(&value)
    }
}

impl TableRow for Payment {
    fn row_id(&self) -> Option<String> {
        Some(self.id.clone()).filter(|id| !id.is_empty())
    }
}

/// Normalise a payment DTO in any of the shapes the backend emits.
///
/// Missing customer details fall back to the nested `user` object; a payment
/// with neither gets [`UNKNOWN_DISPLAY`] as its customer name.
pub fn normalize_payment(raw: &Value) -> Payment {
    let user = raw.get("user").filter(|u| u.is_object());
    let booking = raw.get("booking").filter(|b| b.is_object());

    let customer_name = text_field(raw, &["customer_name", "customerName"])
        .or_else(|| user.and_then(|u| text_field(u, &["full_name", "fullName", "name"])))
        .unwrap_or_else(|| UNKNOWN_DISPLAY.to_string());

    Payment {
        id: ["id", "_id"]
            .iter()
            .find_map(|key| raw.get(*key).and_then(id_from_value))
            .unwrap_or_default(),
        amount: raw.get("amount").and_then(amount_from_value).unwrap_or(0.0),
        status: text_field(raw, &["status"]).unwrap_or_default(),
        payment_type: text_field(raw, &["payment_type", "paymentType", "type"]).unwrap_or_default(),
        payment_method: text_field(raw, &["payment_method", "paymentMethod", "method"])
            .unwrap_or_default(),
        transaction_id: text_field(raw, &["transaction_id", "transactionId"]),
        description: text_field(raw, &["description"]),
        booking_code: text_field(raw, &["booking_code", "bookingCode"])
            .or_else(|| booking.and_then(|b| text_field(b, &["booking_code", "bookingCode", "code"]))),
        customer_name,
        customer_email: text_field(raw, &["customer_email", "customerEmail"])
            .or_else(|| user.and_then(|u| text_field(u, &["email"]))),
        customer_phone: text_field(raw, &["customer_phone", "customerPhone"])
            .or_else(|| user.and_then(|u| text_field(u, &["phone"]))),
        created_at: text_field(raw, &["created_at", "createdAt"])
            .as_deref()
            .and_then(parse_date),
    }
}

/// First non-empty string (or number, as text) among `keys`.
fn text_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Aggregates returned alongside a payments page. Absent fields are zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentSummary {
    #[serde(alias = "totalAmount")]
    pub total_amount: f64,
    #[serde(alias = "totalCount")]
    pub total_count: u64,
    #[serde(alias = "completedCount")]
    pub completed_count: u64,
    #[serde(alias = "pendingCount")]
    pub pending_count: u64,
    #[serde(alias = "failedCount")]
    pub failed_count: u64,
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Server-side filters of the payments list and export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub status: Option<String>,
    pub payment_type: Option<String>,
    pub payment_method: Option<String>,
    pub sort: Option<String>,
    pub order: Option<SortDirection>,
}

impl Default for PaymentQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: None,
            status: None,
            payment_type: None,
            payment_method: None,
            sort: None,
            order: None,
        }
    }
}

impl PaymentQuery {
    /// Query-string pairs, omitting unset and blank filters.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.max(1).to_string()),
            ("limit", self.limit.max(1).to_string()),
        ];
        let optional = [
            ("search", &self.search),
            ("status", &self.status),
            ("payment_type", &self.payment_type),
            ("payment_method", &self.payment_method),
            ("sort", &self.sort),
        ];
        for (key, value) in optional {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                pairs.push((key, v.to_string()));
            }
        }
        if let Some(order) = self.order {
            pairs.push(("order", order.as_str().to_string()));
        }
        pairs
    }

    /// The same filters without paging, as sent to the export endpoint.
    pub fn to_export_pairs(&self) -> Vec<(&'static str, String)> {
        self.to_query_pairs()
            .into_iter()
            .filter(|(key, _)| *key != "page" && *key != "limit")
            .collect()
    }
}
