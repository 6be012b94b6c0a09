use crate::error::AppError;
use crate::infrastructure::clients::FetchError;

/// Failure of one of the upstream lookups behind a machine feed.
///
/// The display text is the user-facing summary; the wrapped [`FetchError`]
/// carries the detail.
#[derive(Debug, thiserror::Error)]
pub enum MachineFeedServiceError {
    #[error("Failed to fetch machine name")]
    MachineName(#[source] FetchError),
    #[error("Failed to fetch repairs")]
    Repairs(#[source] FetchError),
    #[error("Failed to fetch sessions")]
    Sessions(#[source] FetchError),
}

impl MachineFeedServiceError {
    pub fn fetch_error(&self) -> &FetchError {
        match self {
            Self::MachineName(err) | Self::Repairs(err) | Self::Sessions(err) => err,
        }
    }
}

impl From<MachineFeedServiceError> for AppError {
    fn from(err: MachineFeedServiceError) -> Self {
        AppError::UpstreamFetch {
            error: err.to_string(),
            details: err.fetch_error().to_string(),
        }
    }
}
