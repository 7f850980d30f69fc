//! StationDesk core: domain types and pure view-state logic for the
//! back-office console.
//!
//! Nothing in this crate performs I/O. Remote collaborators are described by
//! the traits in [`remote`] and implemented elsewhere (`stationdesk-client`
//! for HTTP, in-memory fakes in tests).

pub mod error;
pub mod formatting;
pub mod payment;
pub mod remote;
pub mod staff;
pub mod station;
pub mod table;
pub mod types;
