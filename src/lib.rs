//! Sorts PDF invoices into `<location>/<requester>/<supplier>/` folders
//! driven by a CSV or spreadsheet of purchase orders.

pub mod config;
pub mod copy;
pub mod data;
pub mod error;
pub mod layout;
pub mod models;
pub mod opener;
pub mod organizer;
pub mod sanitize;

pub use config::OrganizerConfig;
pub use error::{DataFileError, OrganizerError, Result};
pub use models::{CopyOutcome, NormalizedRecord, OrganizationStats, ProgressEvent, RunState};
pub use organizer::{AbortFlag, Organizer, RunSummary};
pub use sanitize::sanitize;

use tracing_subscriber::EnvFilter;

/// Load `.env` and install the fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise other crates log at warn and this one
/// at info. Use `RUST_LOG=debug` for per-folder logs.
pub fn init_tracing() {
    // Current directory first, then the parent (running from a subfolder)
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path("../.env");
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,invoice_organizer_lib=info")),
        )
        .try_init();
}
