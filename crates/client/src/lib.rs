//! HTTP client for the back-office REST API.
//!
//! [`BackOfficeClient`] implements [`StaffDirectory`] and [`PaymentLedger`]
//! over `reqwest`, tolerating the several response envelopes the API uses.
//!
//! [`StaffDirectory`]: stationdesk_core::remote::StaffDirectory
//! [`PaymentLedger`]: stationdesk_core::remote::PaymentLedger

pub mod api;
pub mod config;
pub mod envelope;
pub mod error;

pub use api::BackOfficeClient;
pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
