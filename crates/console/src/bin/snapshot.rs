//! Writes the current unassigned-staff roster to a CSV file.

use anyhow::Context;
use stationdesk_client::BackOfficeClient;
use stationdesk_console::config::ConsoleConfig;
use stationdesk_console::staff_board::staff_columns;
use stationdesk_core::formatting;
use stationdesk_core::remote::{PageRequest, StaffDirectory, StaffPageQuery};
use stationdesk_core::table::TableState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Page size used while walking the roster.
const FETCH_PAGE_SIZE: u32 = 100;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v == "json");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stationdesk_console=info,stationdesk_client=info".into()),
        )
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .init();

    let config = ConsoleConfig::from_env().context("Invalid configuration")?;
    let client = BackOfficeClient::new(&config.client).context("Failed to build HTTP client")?;

    let mut staff = Vec::new();
    let mut page = 1;
    loop {
        let query = StaffPageQuery {
            page: PageRequest {
                page,
                limit: FETCH_PAGE_SIZE,
            },
            search: None,
        };
        let result = client
            .get_unassigned_staff(&query)
            .await
            .with_context(|| format!("Failed to fetch unassigned staff page {page}"))?;

        let fetched = result.staff.len();
        staff.extend(result.staff);
        if fetched == 0 || u64::from(page) >= result.pagination.pages {
            break;
        }
        page += 1;
    }
    tracing::info!(count = staff.len(), "Unassigned staff fetched");

    let mut table = TableState::with_page_size(staff_columns()?, config.default_page_size);
    table.set_rows(staff);

    let export = table
        .export_csv(Some(&config.snapshot_title), formatting::today())
        .context("Nothing to export")?;

    tokio::fs::create_dir_all(&config.snapshot_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.snapshot_dir.display()))?;
    let path = config.snapshot_dir.join(&export.filename);
    tokio::fs::write(&path, &export.bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), bytes = export.bytes.len(), "Snapshot written");
    Ok(())
}
