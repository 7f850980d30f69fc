//! Single staff-to-station assignment picker.
//!
//! Remote work is split into request/apply halves so a caller that closes or
//! re-opens the picker while a fetch is in flight can drop the stale result:
//! every [`AssignmentPicker::open`] starts a new session with its own
//! cancellation token, and results tagged with an older session are ignored.

use stationdesk_core::error::CoreError;
use stationdesk_core::remote::{AssignStaffRequest, RemoteError, StaffDirectory};
use stationdesk_core::staff::StaffMember;
use stationdesk_core::station::{rank_stations, Station};
use stationdesk_core::types::EntityId;
use tokio_util::sync::CancellationToken;

use crate::bus::{ConsoleEvent, EventBus, Notice};

pub const MSG_STATIONS_LOAD_FAILED: &str = "Could not load stations";
pub const MSG_ASSIGN_FAILED: &str = "Could not assign staff to the station";
pub const MSG_NO_STAFF: &str = "No staff member selected";
pub const MSG_NO_STATION: &str = "Please select a station";

/// Handle tying async work to the session that started it.
#[derive(Debug, Clone)]
pub struct PickerSession {
    id: u64,
    cancel: CancellationToken,
}

impl PickerSession {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Result of [`AssignmentPicker::fetch_stations`].
#[derive(Debug)]
pub struct StationsLoaded {
    session: u64,
    /// `None` when the session was cancelled before the fetch finished.
    result: Option<Result<Vec<Station>, RemoteError>>,
}

/// An assignment ready to be sent.
#[derive(Debug, Clone)]
pub struct CommitTicket {
    session: u64,
    request: AssignStaffRequest,
    staff_name: String,
    station_label: String,
}

#[derive(Debug)]
pub struct CommitResult {
    ticket: CommitTicket,
    result: Result<(), RemoteError>,
}

#[derive(Debug, Default)]
pub struct AssignmentPicker {
    open: bool,
    staff: Option<StaffMember>,
    stations: Vec<Station>,
    query: String,
    selected_station: Option<EntityId>,
    loading: bool,
    committing: bool,
    error: Option<String>,
    session: u64,
    cancel: CancellationToken,
}

impl AssignmentPicker {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- lifecycle ----

    /// Open for `staff`, discarding all previous state, and start a new
    /// session. The caller fetches stations with the returned session.
    pub fn open(&mut self, staff: StaffMember) -> PickerSession {
        self.cancel.cancel();
        let session = self.session + 1;
        *self = Self {
            open: true,
            staff: Some(staff),
            loading: true,
            session,
            ..Self::default()
        };
        self.current_session()
    }

    /// Close and reset. Returns `false`, leaving the picker open, while a
    /// commit is in flight.
    pub fn close(&mut self) -> bool {
        if self.committing {
            return false;
        }
        self.cancel.cancel();
        let session = self.session;
        *self = Self {
            session,
            ..Self::default()
        };
        true
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn current_session(&self) -> PickerSession {
        PickerSession {
            id: self.session,
            cancel: self.cancel.clone(),
        }
    }

    fn is_current(&self, session: u64) -> bool {
        self.open && session == self.session
    }

    // ---- accessors ----

    pub fn staff(&self) -> Option<&StaffMember> {
        self.staff.as_ref()
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected_station(&self) -> Option<&Station> {
        let id = self.selected_station.as_deref()?;
        self.stations.iter().find(|s| s.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_committing(&self) -> bool {
        self.committing
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    // ---- stations ----

    /// Fetch the station list for `session`. Resolves early with no result
    /// when the session is cancelled.
    pub async fn fetch_stations(
        directory: &dyn StaffDirectory,
        session: PickerSession,
    ) -> StationsLoaded {
        let result = tokio::select! {
            biased;
            _ = session.cancel.cancelled() => None,
            result = directory.get_stations() => Some(result),
        };
        StationsLoaded {
            session: session.id,
            result,
        }
    }

    /// Apply a fetch result. Returns `false` when it belongs to a closed or
    /// superseded session.
    pub fn apply_stations(&mut self, loaded: StationsLoaded) -> bool {
        if !self.is_current(loaded.session) {
            tracing::debug!(session = loaded.session, "Dropping stale station list");
            return false;
        }
        let Some(result) = loaded.result else {
            return false;
        };

        self.loading = false;
        match result {
            Ok(stations) => {
                self.stations = stations;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load stations");
                self.error = Some(e.user_message(MSG_STATIONS_LOAD_FAILED));
            }
        }
        true
    }

    /// Fetch and apply the station list for the current session.
    pub async fn load_stations(&mut self, directory: &dyn StaffDirectory) -> bool {
        let loaded = Self::fetch_stations(directory, self.current_session()).await;
        self.apply_stations(loaded)
    }

    // ---- search and selection ----

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Stations matching the query, most relevant first.
    pub fn visible_stations(&self) -> Vec<&Station> {
        rank_stations(&self.stations, &self.query)
    }

    /// Select a loaded station. Unknown ids are ignored.
    pub fn select_station(&mut self, station_id: &str) -> bool {
        if !self.stations.iter().any(|s| s.id == station_id) {
            return false;
        }
        self.selected_station = Some(station_id.to_string());
        self.error = None;
        true
    }

    // ---- commit ----

    /// Validate and mark the picker as committing.
    pub fn begin_commit(&mut self) -> Result<CommitTicket, CoreError> {
        if self.committing {
            return Err(CoreError::Conflict(
                "An assignment is already being saved".to_string(),
            ));
        }
        let staff = self
            .staff
            .as_ref()
            .ok_or_else(|| CoreError::Validation(MSG_NO_STAFF.to_string()))?;
        let station = self
            .selected_station()
            .ok_or_else(|| CoreError::Validation(MSG_NO_STATION.to_string()))?;

        let ticket = CommitTicket {
            session: self.session,
            request: AssignStaffRequest {
                user_id: staff.id.clone(),
                station_id: station.id.clone(),
            },
            staff_name: staff.display_name().to_string(),
            station_label: station.label(),
        };
        self.committing = true;
        self.error = None;
        Ok(ticket)
    }

    /// Send the assignment. The call is not cancelled by closing; its result
    /// is reconciled by [`AssignmentPicker::finish_commit`].
    pub async fn send_commit(directory: &dyn StaffDirectory, ticket: CommitTicket) -> CommitResult {
        let result = directory.assign_staff(&ticket.request).await;
        CommitResult { ticket, result }
    }

    /// Apply a commit result. On success publishes a notice and
    /// [`ConsoleEvent::StaffAssignmentsChanged`], then closes. On failure the
    /// picker stays open with the server's message.
    pub fn finish_commit(&mut self, commit: CommitResult, bus: &EventBus) -> Result<(), RemoteError> {
        let CommitResult { ticket, result } = commit;
        if ticket.session == self.session {
            self.committing = false;
        }

        match result {
            Ok(()) => {
                tracing::info!(
                    staff_id = %ticket.request.user_id,
                    station_id = %ticket.request.station_id,
                    "Staff assigned from picker"
                );
                bus.notify(Notice::success(format!(
                    "Assigned {} to {}",
                    ticket.staff_name, ticket.station_label
                )));
                bus.publish(ConsoleEvent::StaffAssignmentsChanged);
                if ticket.session == self.session {
                    self.close();
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!(staff_id = %ticket.request.user_id, error = %e, "Assignment failed");
                let message = e.user_message(MSG_ASSIGN_FAILED);
                bus.notify(Notice::error(message.clone()));
                if self.is_current(ticket.session) {
                    self.error = Some(message);
                }
                Err(e)
            }
        }
    }

    /// Validate, send and apply an assignment.
    pub async fn commit(
        &mut self,
        directory: &dyn StaffDirectory,
        bus: &EventBus,
    ) -> Result<(), CommitError> {
        let ticket = self.begin_commit().map_err(CommitError::Invalid)?;
        let result = Self::send_commit(directory, ticket).await;
        self.finish_commit(result, bus).map_err(CommitError::Remote)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    #[error(transparent)]
    Invalid(CoreError),

    #[error(transparent)]
    Remote(RemoteError),
}
