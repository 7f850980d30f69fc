//! Payments management screen.
//!
//! Filtering, sorting and paging happen server-side through
//! [`PaymentQuery`]; the loaded page is shown through the table pipeline so
//! the visible rows can also be exported locally as CSV.

use chrono::NaiveDate;
use stationdesk_core::error::CoreError;
use stationdesk_core::formatting::{format_currency, format_optional_date_time};
use stationdesk_core::payment::{Payment, PaymentQuery, PaymentSummary};
use stationdesk_core::remote::{Pagination, PaymentLedger, RemoteError};
use stationdesk_core::table::export::export_filename;
use stationdesk_core::table::{CellValue, Column, ColumnSet, CsvExport, SortDirection, TableState};

use crate::bus::{EventBus, Notice};

/// Title used in payment export filenames.
pub const PAYMENTS_EXPORT_TITLE: &str = "payments";

pub const MSG_PAYMENTS_LOAD_FAILED: &str = "Could not load payments";
pub const MSG_PAYMENTS_EXPORT_FAILED: &str = "Could not export payments";

/// A spreadsheet produced by the export endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetExport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Columns of the payments table.
pub fn payment_columns() -> Result<ColumnSet<Payment>, CoreError> {
    ColumnSet::new(vec![
        Column::new("transaction_id", "Transaction", |p: &Payment| {
            CellValue::from(p.transaction_id.clone())
        }),
        Column::new("customer_name", "Customer", |p: &Payment| {
            CellValue::from(p.customer_name.as_str())
        })
        .sortable(),
        Column::new("amount", "Amount", |p: &Payment| CellValue::from(p.amount))
            .with_render(|p: &Payment| format_currency(p.amount))
            .sortable(),
        Column::new("payment_method", "Method", |p: &Payment| {
            CellValue::from(p.payment_method.as_str())
        })
        .filterable(),
        Column::new("status", "Status", |p: &Payment| CellValue::from(p.status.as_str()))
            .with_render(|p: &Payment| format!("<span class=\"status-{0}\">{0}</span>", p.status))
            .sortable()
            .filterable(),
        Column::new("created_at", "Created", |p: &Payment| CellValue::from(p.created_at))
            .with_render(|p: &Payment| format_optional_date_time(p.created_at.as_ref()))
            .sortable(),
    ])
}

pub struct PaymentsScreen {
    query: PaymentQuery,
    table: TableState<Payment>,
    summary: Option<PaymentSummary>,
    pagination: Pagination,
}

impl PaymentsScreen {
    pub fn new(page_size: usize) -> Result<Self, CoreError> {
        let page_size = page_size.max(1);
        Ok(Self {
            query: PaymentQuery {
                limit: u32::try_from(page_size).unwrap_or(u32::MAX),
                ..PaymentQuery::default()
            },
            table: TableState::with_page_size(payment_columns()?, page_size),
            summary: None,
            pagination: Pagination::default(),
        })
    }

    // ---- accessors ----

    pub fn query(&self) -> &PaymentQuery {
        &self.query
    }

    pub fn table(&self) -> &TableState<Payment> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableState<Payment> {
        &mut self.table
    }

    pub fn summary(&self) -> Option<&PaymentSummary> {
        self.summary.as_ref()
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    // ---- filters ----
    //
    // Every filter change returns to the first page.

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.search = non_blank(search.into());
        self.query.page = 1;
    }

    pub fn set_status(&mut self, status: Option<String>) {
        self.query.status = status.and_then(non_blank);
        self.query.page = 1;
    }

    pub fn set_payment_type(&mut self, payment_type: Option<String>) {
        self.query.payment_type = payment_type.and_then(non_blank);
        self.query.page = 1;
    }

    pub fn set_payment_method(&mut self, payment_method: Option<String>) {
        self.query.payment_method = payment_method.and_then(non_blank);
        self.query.page = 1;
    }

    pub fn set_sort(&mut self, column: impl Into<String>, direction: SortDirection) {
        self.query.sort = non_blank(column.into());
        self.query.order = self.query.sort.as_ref().map(|_| direction);
        self.query.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.query = PaymentQuery {
            limit: self.query.limit,
            ..PaymentQuery::default()
        };
    }

    pub fn set_page(&mut self, page: u32) {
        self.query.page = page.max(1);
    }

    // ---- remote ----

    /// Load the page described by the current query. A failure keeps the
    /// previous page and publishes an error notice.
    pub async fn load(
        &mut self,
        ledger: &dyn PaymentLedger,
        bus: &EventBus,
    ) -> Result<Pagination, RemoteError> {
        let page = match ledger.get_payments(&self.query).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load payments");
                bus.notify(Notice::error(e.user_message(MSG_PAYMENTS_LOAD_FAILED)));
                return Err(e);
            }
        };
        tracing::debug!(
            count = page.data.len(),
            total = page.pagination.total,
            "Payments loaded"
        );
        self.summary = page.summary;
        self.pagination = page.pagination;
        self.table.set_rows(page.data);
        Ok(self.pagination)
    }

    /// Server-side spreadsheet export of every payment matching the filters.
    pub async fn export(
        &self,
        ledger: &dyn PaymentLedger,
        bus: &EventBus,
        today: NaiveDate,
    ) -> Result<SpreadsheetExport, RemoteError> {
        let bytes = match ledger.export_payments(&self.query).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to export payments");
                bus.notify(Notice::error(e.user_message(MSG_PAYMENTS_EXPORT_FAILED)));
                return Err(e);
            }
        };
        let filename = export_filename(Some(PAYMENTS_EXPORT_TITLE), today, "xlsx");
        tracing::info!(filename = %filename, size = bytes.len(), "Payments exported");
        Ok(SpreadsheetExport { filename, bytes })
    }

    /// Local CSV of the loaded rows after table search and filters.
    pub fn export_visible_csv(&self, today: NaiveDate) -> Result<CsvExport, CoreError> {
        self.table.export_csv(Some(PAYMENTS_EXPORT_TITLE), today)
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
