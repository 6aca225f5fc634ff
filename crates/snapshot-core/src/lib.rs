//! Aggregation, compilation and scheduling for daily activity snapshots.
//!
//! Inbound chat events are reduced into per-user, per-day counters
//! ([`ingest`]), compiled into a fixed-shape [`SnapshotData`] record
//! ([`compiler`]) and delivered once per user per day by the
//! [`scheduler`].
//!
//! [`SnapshotData`]: snapshot_types::models::SnapshotData

pub mod classifier;
pub mod clock;
pub mod commands;
pub mod compiler;
pub mod delivery;
pub mod error;
pub mod ingest;
pub mod prompts;
pub mod scheduler;

pub use error::{DeliveryError, SnapshotError};

/// Run a blocking store call off the async runtime.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, SnapshotError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SnapshotError::Store(anyhow::anyhow!("spawn_blocking join error: {}", e)))?
        .map_err(SnapshotError::Store)
}
