//! Artwork retrieval strategies
//!
//! Three ways to get a path to an album cover on disk:
//!
//! 1. `get_random` picks a random matching release and a random image of it.
//!    Fast and cheap, but the image may be small.
//! 2. `get_largest` inspects every matching release and downloads the image
//!    with the largest reported area. Slow and expensive.
//! 3. `get_cache` returns a previously downloaded image if there is one and
//!    otherwise delegates to one of the above.
//!
//! Discogs throttles API requests to one per second per IP address, so prefer
//! `get_cache` for anything that runs repeatedly.

pub mod worker;

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;
use log::{debug, error};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::{self, ArtworkConfig};
use crate::data::{AlbumQuery, FetchedImage, ImageDescriptor, Release};
use crate::error::{ArtworkError, Result};
use crate::helpers::discogs::DiscogsClient;
use crate::helpers::imagecache::{extension_for, DiskCache};

pub use worker::{ArtworkListener, ArtworkWorker, WorkerOptions};

/// A catalog that can be searched for releases and their images
pub trait ArtworkSource: Send + Sync {
    /// Releases matching the parameters, in catalog order
    fn search(&self, artist: &str, album: &str, year: Option<i32>) -> Result<Vec<Release>>;

    /// Images of a release, primaries first. May be empty.
    fn images_for(&self, release: &Release) -> Result<Vec<ImageDescriptor>>;

    /// Download an image
    fn fetch_image(&self, url: &str) -> Result<FetchedImage>;
}

/// Strategy used by `get_cache` when nothing is cached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fallback {
    #[default]
    Random,
    Largest,
}

/// One of the retrieval strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Random,
    Largest,
    Cache(Fallback),
}

impl Strategy {
    /// Whether a retry could pick a different release
    pub fn is_random(&self) -> bool {
        matches!(self, Strategy::Random | Strategy::Cache(Fallback::Random))
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Cache(Fallback::Random)
    }
}

impl From<Fallback> for Strategy {
    fn from(fallback: Fallback) -> Self {
        match fallback {
            Fallback::Random => Strategy::Random,
            Fallback::Largest => Strategy::Largest,
        }
    }
}

/// Artwork retriever combining a catalog with a disk cache
#[derive(Debug)]
pub struct Artwork<S: ArtworkSource> {
    source: S,
    cache: DiskCache,
    rng: Mutex<StdRng>,
}

impl Artwork<DiscogsClient> {
    /// Discogs-backed retriever using the given settings
    pub fn from_config(config: &ArtworkConfig) -> Self {
        Self::new(DiscogsClient::from_config(config), DiskCache::new(config.directory.clone()))
    }
}

impl<S: ArtworkSource> Artwork<S> {
    pub fn new(source: S, cache: DiskCache) -> Self {
        Self {
            source,
            cache,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Retriever with a reproducible random selection
    pub fn with_seed(source: S, cache: DiskCache, seed: u64) -> Self {
        Self {
            source,
            cache,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &DiskCache {
        &self.cache
    }

    /// Run the given strategy for a query
    pub fn retrieve(&self, strategy: Strategy, query: &AlbumQuery) -> Result<PathBuf> {
        match strategy {
            Strategy::Random => self.get_random(&query.artist, &query.album, query.year),
            Strategy::Largest => self.get_largest(&query.artist, &query.album, query.year),
            Strategy::Cache(fallback) => self.get_cache(&query.artist, &query.album, query.year, fallback),
        }
    }

    /// Download an image of a random matching release and return its path
    ///
    /// Returns `ReleaseNotFound` if nothing matches and `ImageNotFound` if the
    /// chosen release has no images; another call may pick another release.
    pub fn get_random(&self, artist: &str, album: &str, year: Option<i32>) -> Result<PathBuf> {
        let started = Instant::now();

        let releases = self.source.search(artist, album, year)?;
        let release = self
            .choose(&releases)
            .ok_or_else(|| release_not_found(artist, album))?;
        debug!("Using release {}", release);

        let images = self.source.images_for(release)?;
        let image = self.choose(&images).ok_or_else(|| {
            let message = format!("no images found in release {}", release.id);
            error!("{}", message);
            ArtworkError::ImageNotFound(message)
        })?;

        let path = self.download(image, artist, album, year)?;
        debug!("retrieving image took {:.3} seconds", started.elapsed().as_secs_f64());
        Ok(path)
    }

    /// Download the largest image of all matching releases and return its path
    pub fn get_largest(&self, artist: &str, album: &str, year: Option<i32>) -> Result<PathBuf> {
        let started = Instant::now();

        let releases = self.source.search(artist, album, year)?;
        if releases.is_empty() {
            return Err(release_not_found(artist, album));
        }

        let mut pool = Vec::new();
        for release in &releases {
            pool.extend(self.source.images_for(release)?);
        }

        let image = select_largest(&pool).ok_or_else(|| {
            let message = format!("no image found for '{}' by '{}'", album, artist);
            error!("{}", message);
            ArtworkError::ImageNotFound(message)
        })?;
        debug!("Largest of {} images: {} ({:?}x{:?})", pool.len(), image.url, image.width, image.height);

        let path = self.download(image, artist, album, year)?;
        debug!("retrieving image took {:.3} seconds", started.elapsed().as_secs_f64());
        Ok(path)
    }

    /// Return a cached image, downloading one with `fallback` on a miss
    pub fn get_cache(&self, artist: &str, album: &str, year: Option<i32>, fallback: Fallback) -> Result<PathBuf> {
        if let Some(path) = self.cache.lookup(artist, album, year) {
            return Ok(path);
        }
        match fallback {
            Fallback::Random => self.get_random(artist, album, year),
            Fallback::Largest => self.get_largest(artist, album, year),
        }
    }

    fn choose<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        items.choose(&mut *rng)
    }

    fn download(&self, image: &ImageDescriptor, artist: &str, album: &str, year: Option<i32>) -> Result<PathBuf> {
        let fetched = self.source.fetch_image(&image.url)?;
        let extension = extension_for(fetched.content_type.as_deref(), &image.url);
        self.cache.save(artist, album, year, &fetched.data, &extension)
    }
}

/// The image with the greatest reported area
///
/// Ties go to the first image. If no image reports its size, the first image
/// is returned.
pub fn select_largest(images: &[ImageDescriptor]) -> Option<&ImageDescriptor> {
    let mut largest: Option<(&ImageDescriptor, u64)> = None;
    for image in images {
        if let Some(area) = image.area() {
            match largest {
                Some((_, best)) if area <= best => {}
                _ => largest = Some((image, area)),
            }
        }
    }
    largest.map(|(image, _)| image).or_else(|| images.first())
}

fn release_not_found(artist: &str, album: &str) -> ArtworkError {
    let message = format!("no results for {} by {}", album, artist);
    error!("{}", message);
    ArtworkError::ReleaseNotFound(message)
}

/// Discogs-backed retriever using the process-wide settings
pub fn default_artwork() -> Artwork<DiscogsClient> {
    Artwork::from_config(&config::current())
}

/// Download an image of a random matching Discogs release
pub fn get_random(artist: &str, album: &str, year: Option<i32>) -> Result<PathBuf> {
    default_artwork().get_random(artist, album, year)
}

/// Download the largest image of all matching Discogs releases
pub fn get_largest(artist: &str, album: &str, year: Option<i32>) -> Result<PathBuf> {
    default_artwork().get_largest(artist, album, year)
}

/// Return a cached image or download one using `fallback`
pub fn get_cache(artist: &str, album: &str, year: Option<i32>, fallback: Fallback) -> Result<PathBuf> {
    default_artwork().get_cache(artist, album, year, fallback)
}
