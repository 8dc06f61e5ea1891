//! CLI error types.

use pagemill_site::SiteError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Render(#[from] SiteError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
