use std::fmt;
use serde::{Deserialize, Serialize};

/// A release (or master release) as cataloged by Discogs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Discogs identifier
    pub id: u64,
    /// API URL of the full release record
    pub resource_url: String,
    pub artist: String,
    pub title: String,
    pub year: Option<i32>,
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} - {} ({}) [{}]", self.artist, self.title, year, self.id),
            None => write!(f, "{} - {} [{}]", self.artist, self.title, self.id),
        }
    }
}

/// Parameters of a single artwork lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlbumQuery {
    pub artist: String,
    pub album: String,
    pub year: Option<i32>,
}

impl AlbumQuery {
    pub fn new(artist: &str, album: &str, year: Option<i32>) -> Self {
        Self {
            artist: artist.to_string(),
            album: album.to_string(),
            year,
        }
    }
}

impl fmt::Display for AlbumQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' by '{}'", self.album, self.artist)?;
        if let Some(year) = self.year {
            write!(f, " ({})", year)?;
        }
        Ok(())
    }
}
