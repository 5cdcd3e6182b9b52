// Common helpers for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use discogs_artwork::artwork::ArtworkSource;
use discogs_artwork::config::CacheDirectory;
use discogs_artwork::data::{FetchedImage, ImageDescriptor, ImageRole, Release};
use discogs_artwork::error::{ArtworkError, Result};
use discogs_artwork::helpers::imagecache::DiskCache;

/// In-memory catalog that counts every call
#[derive(Debug, Default)]
pub struct FakeSource {
    releases: Vec<Release>,
    images: HashMap<u64, Vec<ImageDescriptor>>,
    content_type: Option<String>,
    fail_fetch: bool,
    /// Number of `images_for` calls answered with an empty list before the real images
    empty_image_calls: usize,
    pub search_calls: AtomicUsize,
    pub images_calls: AtomicUsize,
    pub fetched: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            content_type: Some("image/jpeg".to_string()),
            ..Self::default()
        }
    }

    pub fn with_release(mut self, id: u64, images: Vec<ImageDescriptor>) -> Self {
        self.releases.push(Release {
            id,
            resource_url: format!("https://api.example.test/masters/{}", id),
            artist: "Arcade Fire".to_string(),
            title: "Funeral".to_string(),
            year: Some(2004),
        });
        self.images.insert(id, images);
        self
    }

    pub fn with_content_type(mut self, content_type: Option<&str>) -> Self {
        self.content_type = content_type.map(|c| c.to_string());
        self
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn with_empty_image_calls(mut self, calls: usize) -> Self {
        self.empty_image_calls = calls;
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    /// Total number of network operations of any kind
    pub fn network_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst) + self.images_calls.load(Ordering::SeqCst) + self.fetch_count()
    }
}

impl ArtworkSource for FakeSource {
    fn search(&self, _artist: &str, _album: &str, _year: Option<i32>) -> Result<Vec<Release>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.releases.clone())
    }

    fn images_for(&self, release: &Release) -> Result<Vec<ImageDescriptor>> {
        let call = self.images_calls.fetch_add(1, Ordering::SeqCst);
        if call < self.empty_image_calls {
            return Ok(Vec::new());
        }
        Ok(self.images.get(&release.id).cloned().unwrap_or_default())
    }

    fn fetch_image(&self, url: &str) -> Result<FetchedImage> {
        self.fetched.lock().unwrap().push(url.to_string());
        if self.fail_fetch {
            return Err(ArtworkError::Resource("HTTP 503 Service Unavailable".to_string()));
        }
        Ok(FetchedImage {
            data: format!("bytes of {}", url).into_bytes(),
            content_type: self.content_type.clone(),
        })
    }
}

pub fn image(url: &str, width: u32, height: u32) -> ImageDescriptor {
    ImageDescriptor::new(url, ImageRole::Primary).with_size(width, height)
}

pub fn cache_in(dir: &Path) -> DiskCache {
    DiskCache::new(CacheDirectory::Path(dir.join("covers")))
}

/// Number of files in the cache directory (0 if it does not exist)
pub fn cached_files(dir: &Path) -> usize {
    match std::fs::read_dir(dir.join("covers")) {
        Ok(entries) => entries.filter_map(|e| e.ok()).count(),
        Err(_) => 0,
    }
}
