//! Bulk transfer / unassign of a station's staff.
//!
//! The form collects a source station, its roster, a selection of staff and
//! either a target station (transfer) or nothing (unassign). Submission runs
//! one staff member at a time; a failure for one id is recorded and the loop
//! moves on. There is no retry and no compensation: a transfer whose assign
//! step fails leaves that member unassigned, visible only in the outcome.

use std::collections::BTreeSet;

use stationdesk_core::error::CoreError;
use stationdesk_core::remote::{
    AssignStaffRequest, RemoteError, StaffDirectory, UnassignStaffRequest,
};
use stationdesk_core::staff::StaffMember;
use stationdesk_core::types::EntityId;

use crate::bus::{ConsoleEvent, EventBus, Notice};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

pub const MSG_NO_STAFF_SELECTED: &str = "Please select at least one staff member";
pub const MSG_NO_TARGET_STATION: &str = "Please select a target station";
pub const MSG_SAME_STATION: &str = "Target station must be different from the source station";
pub const MSG_ROSTER_LOAD_FAILED: &str = "Could not load the station's staff";

// ---------------------------------------------------------------------------
// Plan and outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReassignAction {
    #[default]
    Transfer,
    Unassign,
}

impl ReassignAction {
    fn past_tense(self) -> &'static str {
        match self {
            Self::Transfer => "Transferred",
            Self::Unassign => "Unassigned",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Unassign => "unassign",
        }
    }
}

/// A validated submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReassignmentPlan {
    Transfer {
        staff_ids: Vec<EntityId>,
        target_station: EntityId,
    },
    Unassign {
        staff_ids: Vec<EntityId>,
    },
}

impl ReassignmentPlan {
    pub fn action(&self) -> ReassignAction {
        match self {
            Self::Transfer { .. } => ReassignAction::Transfer,
            Self::Unassign { .. } => ReassignAction::Unassign,
        }
    }

    pub fn staff_ids(&self) -> &[EntityId] {
        match self {
            Self::Transfer { staff_ids, .. } | Self::Unassign { staff_ids } => staff_ids,
        }
    }
}

/// Which remote call failed for a staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedStep {
    Unassign,
    Assign,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffFailure {
    pub staff_id: EntityId,
    pub step: FailedStep,
    pub error: RemoteError,
}

/// Tally of a batch run. Partial failure is data, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub success_count: usize,
    pub error_count: usize,
    pub failures: Vec<StaffFailure>,
}

impl BatchOutcome {
    fn record_success(&mut self) {
        self.success_count += 1;
    }

    fn record_failure(&mut self, staff_id: &str, step: FailedStep, error: RemoteError) {
        self.error_count += 1;
        self.failures.push(StaffFailure {
            staff_id: staff_id.to_string(),
            step,
            error,
        });
    }

    /// Notice summarising the run.
    ///
    /// Any success yields a success notice with the failure count in
    /// parentheses. No success at all yields a generic failure notice.
    pub fn notice(&self, action: ReassignAction) -> Notice {
        if self.success_count == 0 {
            return Notice::error(format!(
                "Could not {} staff. Please try again.",
                action.verb()
            ));
        }

        let mut message = format!(
            "{} {} staff member(s)",
            action.past_tense(),
            self.success_count
        );
        if self.error_count > 0 {
            message.push_str(&format!(" ({} failed)", self.error_count));
        }
        Notice::success(message)
    }
}

/// Run `plan` against `directory`, one staff member at a time.
///
/// Transfer unassigns then assigns; the assign is only attempted after the
/// unassign succeeded. Every id is processed regardless of earlier failures.
pub async fn execute_plan(directory: &dyn StaffDirectory, plan: &ReassignmentPlan) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for staff_id in plan.staff_ids() {
        let unassign = UnassignStaffRequest {
            user_id: staff_id.clone(),
        };
        if let Err(e) = directory.unassign_staff(&unassign).await {
            tracing::warn!(staff_id = %staff_id, error = %e, "Failed to unassign staff");
            outcome.record_failure(staff_id, FailedStep::Unassign, e);
            continue;
        }

        let ReassignmentPlan::Transfer { target_station, .. } = plan else {
            outcome.record_success();
            continue;
        };

        let assign = AssignStaffRequest {
            user_id: staff_id.clone(),
            station_id: target_station.clone(),
        };
        match directory.assign_staff(&assign).await {
            Ok(()) => outcome.record_success(),
            Err(e) => {
                tracing::warn!(
                    staff_id = %staff_id,
                    station_id = %target_station,
                    error = %e,
                    "Staff unassigned but not reassigned"
                );
                outcome.record_failure(staff_id, FailedStep::Assign, e);
            }
        }
    }

    tracing::info!(
        action = ?plan.action(),
        success_count = outcome.success_count,
        error_count = outcome.error_count,
        "Reassignment batch finished"
    );
    outcome
}

// ---------------------------------------------------------------------------
// Form state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ReassignmentForm {
    open: bool,
    action: ReassignAction,
    source_station: Option<EntityId>,
    target_station: Option<EntityId>,
    roster: Vec<StaffMember>,
    selected: BTreeSet<EntityId>,
    loading_roster: bool,
    submitting: bool,
}

impl ReassignmentForm {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- lifecycle ----

    /// Open with fresh state.
    pub fn open(&mut self) {
        *self = Self {
            open: true,
            ..Self::default()
        };
    }

    /// Close and reset. Ignored while a submission runs.
    pub fn close(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        *self = Self::default();
        true
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    // ---- accessors ----

    pub fn action(&self) -> ReassignAction {
        self.action
    }

    pub fn source_station(&self) -> Option<&str> {
        self.source_station.as_deref()
    }

    pub fn target_station(&self) -> Option<&str> {
        self.target_station.as_deref()
    }

    pub fn roster(&self) -> &[StaffMember] {
        &self.roster
    }

    pub fn is_selected(&self, staff_id: &str) -> bool {
        self.selected.contains(staff_id)
    }

    /// Selected ids in roster order.
    pub fn selected_staff_ids(&self) -> Vec<EntityId> {
        self.roster
            .iter()
            .filter(|s| self.selected.contains(&s.id))
            .map(|s| s.id.clone())
            .collect()
    }

    pub fn is_loading_roster(&self) -> bool {
        self.loading_roster
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    // ---- editing ----

    /// Change the source station. Clears roster and selection, then loads
    /// the new station's roster. A failed load leaves an empty roster and
    /// publishes an error notice.
    pub async fn select_source(
        &mut self,
        directory: &dyn StaffDirectory,
        bus: &EventBus,
        station_id: Option<EntityId>,
    ) {
        self.roster.clear();
        self.selected.clear();
        self.source_station = station_id.clone();

        let Some(station_id) = station_id else {
            return;
        };

        self.loading_roster = true;
        let result = directory.get_station_staff(&station_id).await;
        self.loading_roster = false;

        match result {
            Ok(roster) => {
                tracing::debug!(station_id = %station_id, count = roster.len(), "Roster loaded");
                self.roster = roster;
            }
            Err(e) => {
                tracing::warn!(station_id = %station_id, error = %e, "Failed to load roster");
                bus.notify(Notice::error(e.user_message(MSG_ROSTER_LOAD_FAILED)));
            }
        }
    }

    pub fn set_action(&mut self, action: ReassignAction) {
        self.action = action;
    }

    pub fn set_target(&mut self, station_id: Option<EntityId>) {
        self.target_station = station_id;
    }

    /// Toggle one roster member. Ids not in the roster are ignored.
    pub fn toggle_staff(&mut self, staff_id: &str) -> bool {
        if !self.roster.iter().any(|s| s.id == staff_id) {
            return false;
        }
        if !self.selected.remove(staff_id) {
            self.selected.insert(staff_id.to_string());
        }
        true
    }

    /// Select the whole roster, or clear the selection when it already is.
    pub fn select_all_staff(&mut self) {
        if !self.roster.is_empty() && self.selected.len() == self.roster.len() {
            self.selected.clear();
        } else {
            self.selected = self.roster.iter().map(|s| s.id.clone()).collect();
        }
    }

    // ---- submission ----

    pub fn validate(&self) -> Result<ReassignmentPlan, CoreError> {
        let staff_ids = self.selected_staff_ids();
        if staff_ids.is_empty() {
            return Err(CoreError::Validation(MSG_NO_STAFF_SELECTED.to_string()));
        }

        match self.action {
            ReassignAction::Unassign => Ok(ReassignmentPlan::Unassign { staff_ids }),
            ReassignAction::Transfer => {
                let target_station = self
                    .target_station
                    .clone()
                    .ok_or_else(|| CoreError::Validation(MSG_NO_TARGET_STATION.to_string()))?;
                if self.source_station.as_ref() == Some(&target_station) {
                    return Err(CoreError::Validation(MSG_SAME_STATION.to_string()));
                }
                Ok(ReassignmentPlan::Transfer {
                    staff_ids,
                    target_station,
                })
            }
        }
    }

    /// Validate and run the batch.
    ///
    /// Validation failures publish an error notice and make no remote call.
    /// After the batch, the outcome notice is published; when anything
    /// succeeded, [`ConsoleEvent::StaffAssignmentsChanged`] is published and
    /// the form closes.
    pub async fn submit(
        &mut self,
        directory: &dyn StaffDirectory,
        bus: &EventBus,
    ) -> Result<BatchOutcome, CoreError> {
        let plan = match self.validate() {
            Ok(plan) => plan,
            Err(e) => {
                bus.notify(Notice::error(e.user_message()));
                return Err(e);
            }
        };

        self.submitting = true;
        let outcome = execute_plan(directory, &plan).await;
        self.submitting = false;

        bus.notify(outcome.notice(plan.action()));
        if outcome.success_count > 0 {
            bus.publish(ConsoleEvent::StaffAssignmentsChanged);
            self.close();
        }
        Ok(outcome)
    }
}
