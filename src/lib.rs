//! Album artwork from Discogs
//!
//! Searches Discogs for an album, downloads one of its cover images and keeps
//! it in a local directory (`~/.covers` by default) so that repeated lookups
//! don't hit the API again.
//!
//! Discogs throttles requests to one per second per IP address and image
//! requests to 1000 per day. Use `get_cache` whenever possible.

/// Error types
pub mod error;

/// Process-wide settings
pub mod config;

/// Logging setup
pub mod logging;

/// Releases, images and queries
pub mod data;

/// Retrieval strategies and background worker
pub mod artwork;

/// HTTP transport, Discogs client, disk cache
pub mod helpers;

pub use artwork::{get_cache, get_largest, get_random, Artwork, ArtworkSource, ArtworkWorker, Fallback, Strategy};
pub use config::CacheDirectory;
pub use data::{AlbumQuery, ImageDescriptor, ImageRole, Release};
pub use error::ArtworkError;
