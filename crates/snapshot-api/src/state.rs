use std::sync::Arc;

use snapshot_core::commands::Commands;
use snapshot_core::ingest::Ingestor;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub ingestor: Ingestor,
    pub commands: Commands,
    /// Shared secret for the platform adapter; `None` disables the check.
    pub ingest_token: Option<String>,
}
