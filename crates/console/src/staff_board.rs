//! Staff management screen: unassigned staff, assigned staff and statistics.

use std::time::Duration;

use stationdesk_core::error::CoreError;
use stationdesk_core::remote::{PageRequest, Pagination, RemoteError, StaffDirectory, StaffPageQuery};
use stationdesk_core::staff::StaffMember;
use stationdesk_core::table::{CellValue, Column, ColumnSet, TableState};
use tokio::sync::mpsc;

use crate::bus::{ConsoleEvent, EventBus, Notice};
use crate::debounce::Debouncer;

/// Role name of staff users on the users endpoint.
pub const STAFF_ROLE: &str = "staff";

pub const MSG_STAFF_LOAD_FAILED: &str = "Could not load staff";

/// Upper bound on staff users fetched to build the assigned list.
const ASSIGNED_FETCH_LIMIT: u32 = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaffStats {
    pub total: u64,
    pub assigned: u64,
    pub unassigned: u64,
}

/// Columns of the unassigned-staff table.
pub fn staff_columns() -> Result<ColumnSet<StaffMember>, CoreError> {
    ColumnSet::new(vec![
        Column::new("full_name", "Full name", |s: &StaffMember| {
            CellValue::from(s.full_name.as_str())
        })
        .sortable(),
        Column::new("email", "Email", |s: &StaffMember| CellValue::from(s.email.clone()))
            .sortable()
            .filterable(),
        Column::new("phone", "Phone", |s: &StaffMember| CellValue::from(s.phone.clone()))
            .filterable(),
        Column::new("station", "Station", |s: &StaffMember| {
            CellValue::from(s.station_id.clone())
        })
        .with_render(|s: &StaffMember| match &s.station_id {
            Some(id) => format!("<span class=\"badge\">{id}</span>"),
            None => "<span class=\"badge muted\">Unassigned</span>".to_string(),
        }),
    ])
}

pub struct StaffBoard {
    unassigned: TableState<StaffMember>,
    unassigned_pagination: Pagination,
    assigned: Vec<StaffMember>,
    stats: StaffStats,
    page: PageRequest,
    search: String,
    search_debouncer: Debouncer<String>,
    search_rx: mpsc::UnboundedReceiver<String>,
}

impl StaffBoard {
    pub fn new(page_size: usize, search_quiet_period: Duration) -> Result<Self, CoreError> {
        let (search_debouncer, search_rx) = Debouncer::new(search_quiet_period);
        let page_size = page_size.max(1);
        Ok(Self {
            unassigned: TableState::with_page_size(staff_columns()?, page_size),
            unassigned_pagination: Pagination::default(),
            assigned: Vec::new(),
            stats: StaffStats::default(),
            page: PageRequest {
                page: 1,
                limit: u32::try_from(page_size).unwrap_or(u32::MAX),
            },
            search: String::new(),
            search_debouncer,
            search_rx,
        })
    }

    // ---- accessors ----

    pub fn unassigned(&self) -> &TableState<StaffMember> {
        &self.unassigned
    }

    pub fn unassigned_mut(&mut self) -> &mut TableState<StaffMember> {
        &mut self.unassigned
    }

    pub fn unassigned_pagination(&self) -> Pagination {
        self.unassigned_pagination
    }

    pub fn assigned(&self) -> &[StaffMember] {
        &self.assigned
    }

    pub fn stats(&self) -> StaffStats {
        self.stats
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    // ---- input ----

    /// Keystroke in the search box. The server query only changes once the
    /// input settles (see [`StaffBoard::settled_search`]).
    pub fn input_search(&mut self, text: impl Into<String>) {
        self.search_debouncer.push(text.into());
    }

    /// Wait for the debounced search text and apply it, returning to page 1.
    /// Returns `None` when the debouncer is gone.
    pub async fn settled_search(&mut self) -> Option<String> {
        let search = self.search_rx.recv().await?;
        self.search = search.clone();
        self.page.page = 1;
        Some(search)
    }

    pub fn set_page(&mut self, page: u32) {
        self.page.page = page.max(1);
    }

    // ---- remote ----

    /// Refetch the unassigned page, the staff users and the statistics.
    /// A failure keeps the previous data and publishes an error notice.
    pub async fn refresh(
        &mut self,
        directory: &dyn StaffDirectory,
        bus: &EventBus,
    ) -> Result<StaffStats, RemoteError> {
        let result = self.fetch(directory).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Failed to refresh staff board");
            bus.notify(Notice::error(e.user_message(MSG_STAFF_LOAD_FAILED)));
        }
        result
    }

    async fn fetch(&mut self, directory: &dyn StaffDirectory) -> Result<StaffStats, RemoteError> {
        let query = StaffPageQuery {
            page: self.page,
            search: Some(self.search.clone()).filter(|s| !s.trim().is_empty()),
        };
        let unassigned = directory.get_unassigned_staff(&query).await?;
        let users = directory
            .get_users_by_role(
                STAFF_ROLE,
                PageRequest {
                    page: 1,
                    limit: ASSIGNED_FETCH_LIMIT,
                },
            )
            .await?;

        let total = users.pagination.total.max(users.users.len() as u64);
        let unassigned_total = unassigned.pagination.total;
        self.stats = StaffStats {
            total,
            assigned: total.saturating_sub(unassigned_total),
            unassigned: unassigned_total,
        };

        self.assigned = users.users.into_iter().filter(StaffMember::is_assigned).collect();
        self.unassigned_pagination = unassigned.pagination;
        self.unassigned.set_rows(unassigned.staff);

        tracing::info!(
            total = self.stats.total,
            assigned = self.stats.assigned,
            unassigned = self.stats.unassigned,
            "Staff board refreshed"
        );
        Ok(self.stats)
    }

    /// React to a bus event. Returns `true` when a refresh happened.
    pub async fn handle_event(
        &mut self,
        event: &ConsoleEvent,
        directory: &dyn StaffDirectory,
        bus: &EventBus,
    ) -> Result<bool, RemoteError> {
        match event {
            ConsoleEvent::StaffAssignmentsChanged => {
                self.refresh(directory, bus).await?;
                Ok(true)
            }
            ConsoleEvent::Notice(_) => Ok(false),
        }
    }
}
