pub mod discogs;
pub mod http_client;
pub mod imagecache;
pub mod retry;
