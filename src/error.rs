use thiserror::Error;

use crate::helpers::http_client::HttpClientError;

/// Errors returned by the artwork retrieval functions
///
/// Every retrieval either yields a path to a saved image or exactly one of
/// these kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtworkError {
    /// Opening or reading a remote URL failed
    #[error("resource error: {0}")]
    Resource(String),

    /// The catalog search returned no matching releases
    #[error("release not found: {0}")]
    ReleaseNotFound(String),

    /// Releases were found, but none of them exposed an image
    #[error("image not found: {0}")]
    ImageNotFound(String),

    /// Creating the cache directory or writing the image failed
    #[error("disk error: {0}")]
    Disk(String),
}

impl From<HttpClientError> for ArtworkError {
    fn from(e: HttpClientError) -> Self {
        ArtworkError::Resource(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ArtworkError>;
