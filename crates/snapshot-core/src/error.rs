use std::path::PathBuf;

use snapshot_types::models::Theme;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Bad command input. Nothing was written.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Interactive input didn't arrive in time. Nothing was written.
    #[error("no response")]
    Timeout,

    #[error("store error: {0:#}")]
    Store(anyhow::Error),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Failure rendering or sending one user's card.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("missing stylesheet for theme '{theme}' at {}", path.display())]
    MissingStylesheet { theme: Theme, path: PathBuf },

    #[error("render failed: {0}")]
    Render(String),

    #[error("send failed: {0}")]
    Send(String),
}
