mod models;
mod service;

pub use models::{PendingStatus, RefreshOutcome};
pub use service::ReportService;
