use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use log::{debug, error};

use crate::config::CacheDirectory;
use crate::error::{ArtworkError, Result};

/// Extensions probed when looking for a cached image, in order
pub const CANDIDATE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Extension used when neither the content type nor the URL tells us one
const FALLBACK_EXTENSION: &str = "jpg";

/// Characters replaced in file names
const UNSAFE_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// On-disk store of downloaded artwork
///
/// One file per (artist, album, year). Entries are never overwritten,
/// expired or deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskCache {
    directory: CacheDirectory,
}

impl DiskCache {
    pub fn new(directory: CacheDirectory) -> Self {
        Self { directory }
    }

    /// The directory images are stored in
    pub fn directory(&self) -> PathBuf {
        self.directory.resolve()
    }

    /// Full path of the entry for the given key and extension
    pub fn target_path(&self, artist: &str, album: &str, year: Option<i32>, extension: &str) -> PathBuf {
        self.directory()
            .join(format!("{}.{}", cache_key(artist, album, year), extension))
    }

    /// Return the path of a cached image, if one exists
    ///
    /// Only checks the file system.
    pub fn lookup(&self, artist: &str, album: &str, year: Option<i32>) -> Option<PathBuf> {
        for extension in CANDIDATE_EXTENSIONS.iter() {
            let candidate = self.target_path(artist, album, year, extension);
            if candidate.is_file() {
                debug!("artwork for {} by {} found on disk", album, artist);
                return Some(candidate);
            }
        }
        None
    }

    /// Store image data and return its path
    ///
    /// Creates the cache directory if needed. An existing file for the same
    /// key and extension is kept as is and its path returned.
    pub fn save(&self, artist: &str, album: &str, year: Option<i32>, data: &[u8], extension: &str) -> Result<PathBuf> {
        let directory = self.directory();
        if self.directory.is_managed() && !directory.is_dir() {
            if let Err(e) = fs::create_dir_all(&directory) {
                let message = format!("cannot create directory {}: {}", directory.display(), e);
                error!("{}", message);
                return Err(ArtworkError::Disk(message));
            }
            debug!("created directory {}", directory.display());
        }

        let target = self.target_path(artist, album, year, extension);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&target) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("artwork already cached as {}, keeping existing file", target.display());
                return Ok(target);
            }
            Err(e) => {
                let message = format!("saving artwork to {} failed: {}", target.display(), e);
                error!("{}", message);
                return Err(ArtworkError::Disk(message));
            }
        };

        if let Err(e) = file.write_all(data).and_then(|_| file.flush()) {
            let message = format!("saving artwork to {} failed: {}", target.display(), e);
            error!("{}", message);
            drop(file);
            // Never leave a truncated image behind as a cache hit
            let _ = fs::remove_file(&target);
            return Err(ArtworkError::Disk(message));
        }

        debug!("artwork saved as {}", target.display());
        Ok(target)
    }
}

/// File name (without extension) for an album's artwork
///
/// "Artist - Year - Album", or "Artist - Album" when no year (or year 0) is given.
pub fn cache_key(artist: &str, album: &str, year: Option<i32>) -> String {
    let artist = sanitize_for_filename(artist);
    let album = sanitize_for_filename(album);
    match year.filter(|y| *y != 0) {
        Some(y) => format!("{} - {} - {}", artist, y, album),
        None => format!("{} - {}", artist, album),
    }
}

/// Replace characters that are not allowed in file names
fn sanitize_for_filename(input: &str) -> String {
    input
        .chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) || c.is_control() { '-' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Convert a MIME type to a file extension
pub fn mime_type_to_extension(mime_type: &str) -> Option<&'static str> {
    match mime_type {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Pick the extension for a downloaded image
///
/// Uses the content type when it is a known image type, otherwise the suffix
/// of the URL path. Only extensions that `lookup` probes are returned.
pub fn extension_for(content_type: Option<&str>, url: &str) -> String {
    if let Some(ext) = content_type.and_then(mime_type_to_extension) {
        return ext.to_string();
    }

    let path = url.split(['?', '#']).next().unwrap_or("");
    let last_segment = path.rsplit('/').next().unwrap_or("");
    if let Some((_, suffix)) = last_segment.rsplit_once('.') {
        let suffix = suffix.to_lowercase();
        if let Some(ext) = CANDIDATE_EXTENSIONS.iter().find(|ext| **ext == suffix) {
            return ext.to_string();
        }
    }

    debug!("No extension known for {} ({:?}), using {}", url, content_type, FALLBACK_EXTENSION);
    FALLBACK_EXTENSION.to_string()
}
