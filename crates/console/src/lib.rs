//! Back-office console controllers.
//!
//! View-state for the staff and payments screens, built on the pure table
//! pipeline of `stationdesk-core` and talking to the backend through the
//! collaborator traits in `stationdesk_core::remote`.

pub mod bus;
pub mod config;
pub mod debounce;
pub mod payments;
pub mod picker;
pub mod reassignment;
pub mod staff_board;
