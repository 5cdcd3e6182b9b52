use std::fmt;
use serde::{Deserialize, Serialize};

/// Role of an image within a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageRole {
    /// The provider's designated main cover image
    Primary,
    /// Any additional image (back cover, inner sleeve, ...)
    Secondary,
}

impl ImageRole {
    /// Parse the provider's type tag. Anything other than "primary" is secondary.
    pub fn from_tag(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("primary") {
            ImageRole::Primary
        } else {
            ImageRole::Secondary
        }
    }
}

impl fmt::Display for ImageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRole::Primary => write!(f, "primary"),
            ImageRole::Secondary => write!(f, "secondary"),
        }
    }
}

/// An image offered by a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub url: String,
    pub role: ImageRole,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageDescriptor {
    pub fn new(url: &str, role: ImageRole) -> Self {
        Self {
            url: url.to_string(),
            role,
            width: None,
            height: None,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Width × height, if the provider reported both dimensions
    pub fn area(&self) -> Option<u64> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(w as u64 * h as u64),
            _ => None,
        }
    }
}

/// Image bytes as downloaded, with the content type reported by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}
