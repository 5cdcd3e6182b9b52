// Data structures shared by the catalog client, the cache and the strategies

pub mod image;
pub mod release;

pub use image::{FetchedImage, ImageDescriptor, ImageRole};
pub use release::{AlbumQuery, Release};
