//! Discogs API client
//!
//! Searches the Discogs database for releases, inspects release records for
//! their images and downloads image data.
//!
//! Discogs throttles API requests to one per second per IP address and image
//! requests to 1000 per day. This client does not enforce these limits;
//! callers should go through the disk cache (`get_cache`) whenever possible.

use log::{debug, error};
use serde::Deserialize;
use serde_json::Value;

use crate::artwork::ArtworkSource;
use crate::config::{ArtworkConfig, SearchType};
use crate::data::{FetchedImage, ImageDescriptor, ImageRole, Release};
use crate::error::{ArtworkError, Result};
use crate::helpers::http_client::{self, HttpClient};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    year: Option<Value>,
    #[serde(default)]
    resource_url: Option<String>,
}

/// Client for the Discogs database API
#[derive(Debug, Clone)]
pub struct DiscogsClient {
    client: Box<dyn HttpClient>,
    api_url: String,
    search_type: SearchType,
}

impl DiscogsClient {
    /// Create a client with an explicit HTTP implementation
    pub fn new(client: Box<dyn HttpClient>, api_url: &str, search_type: SearchType) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            search_type,
        }
    }

    /// Create a ureq-backed client from the artwork settings
    pub fn from_config(config: &ArtworkConfig) -> Self {
        let mut client = http_client::UreqHttpClient::new(config.timeout_secs, &config.user_agent);
        if let Some(token) = &config.token {
            client = client.with_header("Authorization", &format!("Discogs token={}", token));
        }
        Self::new(Box::new(client), &config.api_url, config.search_type)
    }

    /// Build the database search URL for the given parameters
    pub fn search_url(&self, artist: &str, album: &str, year: Option<i32>) -> String {
        let mut url = format!(
            "{}/database/search?type={}&artist={}&release_title={}",
            self.api_url,
            self.search_type.as_str(),
            urlencoding::encode(artist),
            urlencoding::encode(album)
        );
        if let Some(y) = year {
            url.push_str(&format!("&year={}", y));
        }
        url
    }

    /// Search Discogs for releases matching artist, album and year
    ///
    /// Releases are returned in the order Discogs reports them.
    pub fn search(&self, artist: &str, album: &str, year: Option<i32>) -> Result<Vec<Release>> {
        let url = self.search_url(artist, album, year);
        let text = self.client.get_text(&url)?;

        let response: SearchResponse = serde_json::from_str(&text).map_err(|e| {
            let message = format!("Failed to parse Discogs search response: {}", e);
            error!("{}", message);
            ArtworkError::Resource(message)
        })?;

        let releases: Vec<Release> = response
            .results
            .into_iter()
            .map(|hit| self.release_from_hit(hit, artist, album))
            .collect();

        if releases.is_empty() {
            let message = format!("no results for {} by {}", album, artist);
            error!("{}", message);
            return Err(ArtworkError::ReleaseNotFound(message));
        }

        debug!("{} releases found for {} by {}", releases.len(), album, artist);
        Ok(releases)
    }

    fn release_from_hit(&self, hit: SearchHit, artist: &str, album: &str) -> Release {
        // Search titles have the form "Artist - Title"
        let (hit_artist, hit_title) = match hit.title.split_once(" - ") {
            Some((a, t)) => (a.trim().to_string(), t.trim().to_string()),
            None if hit.title.is_empty() => (artist.to_string(), album.to_string()),
            None => (artist.to_string(), hit.title.clone()),
        };

        let resource_url = hit.resource_url.unwrap_or_else(|| {
            format!("{}/{}s/{}", self.api_url, self.search_type.as_str(), hit.id)
        });

        Release {
            id: hit.id,
            resource_url,
            artist: hit_artist,
            title: hit_title,
            year: hit.year.as_ref().and_then(parse_year),
        }
    }

    /// Fetch the full record of a release and list its images
    ///
    /// Primary images come first, then secondary images, each in the order
    /// Discogs lists them. A release without (usable) images yields an empty
    /// list.
    pub fn images_for(&self, release: &Release) -> Result<Vec<ImageDescriptor>> {
        let text = self.client.get_text(&release.resource_url)?;

        let record: Value = serde_json::from_str(&text).map_err(|e| {
            let message = format!("Failed to parse Discogs release {}: {}", release.id, e);
            error!("{}", message);
            ArtworkError::Resource(message)
        })?;

        let images = parse_images(&record);
        debug!(
            "{} primary images found in release {} and {} secondary images",
            images.iter().filter(|i| i.role == ImageRole::Primary).count(),
            release.id,
            images.iter().filter(|i| i.role == ImageRole::Secondary).count()
        );
        Ok(images)
    }

    /// Download an image
    pub fn fetch_image(&self, url: &str) -> Result<FetchedImage> {
        let body = self.client.get_bytes(url)?;
        Ok(FetchedImage {
            data: body.data,
            content_type: body.content_type,
        })
    }
}

impl ArtworkSource for DiscogsClient {
    fn search(&self, artist: &str, album: &str, year: Option<i32>) -> Result<Vec<Release>> {
        DiscogsClient::search(self, artist, album, year)
    }

    fn images_for(&self, release: &Release) -> Result<Vec<ImageDescriptor>> {
        DiscogsClient::images_for(self, release)
    }

    fn fetch_image(&self, url: &str) -> Result<FetchedImage> {
        DiscogsClient::fetch_image(self, url)
    }
}

/// Discogs reports the year as a string ("2004"), a number, or "0" when unknown
fn parse_year(value: &Value) -> Option<i32> {
    let year = match value {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    };
    year.filter(|y| *y > 0)
}

/// Extract the image list of a release record, primaries first
fn parse_images(record: &Value) -> Vec<ImageDescriptor> {
    let entries = match record.get("images").and_then(|i| i.as_array()) {
        Some(entries) => entries,
        None => return Vec::new(),
    };

    let mut primaries = Vec::new();
    let mut secondaries = Vec::new();

    for entry in entries {
        let url = entry
            .get("resource_url")
            .and_then(|u| u.as_str())
            .or_else(|| entry.get("uri").and_then(|u| u.as_str()))
            .filter(|u| !u.is_empty());

        let url = match url {
            Some(url) => url,
            None => continue,
        };

        let role = ImageRole::from_tag(entry.get("type").and_then(|t| t.as_str()).unwrap_or(""));
        let mut image = ImageDescriptor::new(url, role);
        image.width = dimension(entry, "width");
        image.height = dimension(entry, "height");

        match role {
            ImageRole::Primary => primaries.push(image),
            ImageRole::Secondary => secondaries.push(image),
        }
    }

    primaries.extend(secondaries);
    primaries
}

fn dimension(entry: &Value, key: &str) -> Option<u32> {
    entry
        .get(key)
        .and_then(|v| v.as_u64())
        .and_then(|v| u32::try_from(v).ok())
}
