mod common;

use std::fs;
use std::sync::atomic::Ordering;
use tempfile::TempDir;

use common::{cache_in, cached_files, image, FakeSource};
use discogs_artwork::artwork::{Artwork, Fallback};
use discogs_artwork::data::{ImageDescriptor, ImageRole};
use discogs_artwork::error::ArtworkError;
use discogs_artwork::helpers::imagecache::cache_key;

fn two_release_source() -> FakeSource {
    FakeSource::new()
        .with_release(1, vec![image("http://img/a-500.jpg", 500, 500)])
        .with_release(2, vec![image("http://img/b-300.jpg", 300, 300), image("http://img/b-800.jpg", 800, 600)])
}

#[test]
fn test_get_cache_returns_cached_file_without_network() {
    let temp_dir = TempDir::new().unwrap();
    let cache = cache_in(temp_dir.path());
    let existing = cache.save("Arcade Fire", "Funeral", Some(2004), b"cached", "jpg").unwrap();

    let artwork = Artwork::with_seed(two_release_source(), cache, 7);
    let path = artwork.get_cache("Arcade Fire", "Funeral", Some(2004), Fallback::Random).unwrap();

    assert_eq!(path, existing);
    assert_eq!(artwork.source().network_calls(), 0);
    assert_eq!(fs::read(&path).unwrap(), b"cached");
}

#[test]
fn test_get_cache_miss_behaves_like_get_random() {
    let cached_dir = TempDir::new().unwrap();
    let direct_dir = TempDir::new().unwrap();

    let via_cache = Artwork::with_seed(two_release_source(), cache_in(cached_dir.path()), 42);
    let direct = Artwork::with_seed(two_release_source(), cache_in(direct_dir.path()), 42);

    let cached_path = via_cache.get_cache("Arcade Fire", "Funeral", Some(2004), Fallback::Random).unwrap();
    let direct_path = direct.get_random("Arcade Fire", "Funeral", Some(2004)).unwrap();

    assert_eq!(via_cache.source().fetched_urls(), direct.source().fetched_urls());
    assert_eq!(
        via_cache.source().search_calls.load(Ordering::SeqCst),
        direct.source().search_calls.load(Ordering::SeqCst)
    );
    assert_eq!(cached_path.file_name(), direct_path.file_name());

    // The new file is a cache entry at the deterministic key
    let expected_name = format!("{}.jpg", cache_key("Arcade Fire", "Funeral", Some(2004)));
    assert_eq!(cached_path.file_name().unwrap().to_str().unwrap(), expected_name);
    assert_eq!(via_cache.cache().lookup("Arcade Fire", "Funeral", Some(2004)), Some(cached_path));
}

#[test]
fn test_get_largest_picks_greatest_area_across_releases() {
    let temp_dir = TempDir::new().unwrap();
    let artwork = Artwork::with_seed(two_release_source(), cache_in(temp_dir.path()), 1);

    let path = artwork.get_largest("Arcade Fire", "Funeral", Some(2004)).unwrap();

    assert_eq!(artwork.source().fetched_urls(), vec!["http://img/b-800.jpg".to_string()]);
    assert_eq!(artwork.source().images_calls.load(Ordering::SeqCst), 2);
    assert_eq!(fs::read(&path).unwrap(), b"bytes of http://img/b-800.jpg");
}

#[test]
fn test_get_largest_skips_releases_without_images() {
    let temp_dir = TempDir::new().unwrap();
    let source = FakeSource::new()
        .with_release(1, Vec::new())
        .with_release(2, vec![image("http://img/only.jpg", 100, 100)])
        .with_release(3, Vec::new());
    let artwork = Artwork::with_seed(source, cache_in(temp_dir.path()), 1);

    artwork.get_largest("Arcade Fire", "Funeral", None).unwrap();
    assert_eq!(artwork.source().fetched_urls(), vec!["http://img/only.jpg".to_string()]);
}

#[test]
fn test_get_largest_without_dimensions_uses_first_image() {
    let temp_dir = TempDir::new().unwrap();
    let source = FakeSource::new()
        .with_release(1, vec![ImageDescriptor::new("http://img/first.jpg", ImageRole::Secondary)])
        .with_release(2, vec![ImageDescriptor::new("http://img/second.jpg", ImageRole::Primary)]);
    let artwork = Artwork::with_seed(source, cache_in(temp_dir.path()), 1);

    artwork.get_largest("Arcade Fire", "Funeral", None).unwrap();
    assert_eq!(artwork.source().fetched_urls(), vec!["http://img/first.jpg".to_string()]);
}

#[test]
fn test_get_largest_no_images_anywhere() {
    let temp_dir = TempDir::new().unwrap();
    let source = FakeSource::new().with_release(1, Vec::new()).with_release(2, Vec::new());
    let artwork = Artwork::with_seed(source, cache_in(temp_dir.path()), 1);

    let err = artwork.get_largest("Arcade Fire", "Funeral", None).unwrap_err();
    assert!(matches!(err, ArtworkError::ImageNotFound(_)));
    assert_eq!(artwork.source().fetch_count(), 0);
    assert_eq!(cached_files(temp_dir.path()), 0);
}

#[test]
fn test_release_not_found_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let artwork = Artwork::with_seed(FakeSource::new(), cache_in(temp_dir.path()), 1);

    for result in [
        artwork.get_random("Fake artist", "Fake album title", None),
        artwork.get_largest("Fake artist", "Fake album title", None),
        artwork.get_cache("Fake artist", "Fake album title", None, Fallback::Random),
    ] {
        match result.unwrap_err() {
            ArtworkError::ReleaseNotFound(message) => {
                assert!(message.contains("Fake artist"));
                assert!(message.contains("Fake album title"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    assert_eq!(artwork.source().fetch_count(), 0);
    assert!(!temp_dir.path().join("covers").exists());
}

#[test]
fn test_get_cache_twice_fetches_once() {
    let temp_dir = TempDir::new().unwrap();
    let artwork = Artwork::with_seed(two_release_source(), cache_in(temp_dir.path()), 3);

    let first = artwork.get_cache("Tame Impala", "Innerspeaker", Some(2010), Fallback::Random).unwrap();
    let second = artwork.get_cache("Tame Impala", "Innerspeaker", Some(2010), Fallback::Random).unwrap();

    assert_eq!(first, second);
    assert_eq!(artwork.source().fetch_count(), 1);
    assert_eq!(artwork.source().search_calls.load(Ordering::SeqCst), 1);
    assert_eq!(cached_files(temp_dir.path()), 1);
}

#[test]
fn test_get_cache_with_largest_fallback() {
    let temp_dir = TempDir::new().unwrap();
    let artwork = Artwork::with_seed(two_release_source(), cache_in(temp_dir.path()), 3);

    artwork.get_cache("Arcade Fire", "Funeral", Some(2004), Fallback::Largest).unwrap();
    assert_eq!(artwork.source().fetched_urls(), vec!["http://img/b-800.jpg".to_string()]);
}

#[test]
fn test_get_random_release_without_images() {
    let temp_dir = TempDir::new().unwrap();
    let artwork = Artwork::with_seed(FakeSource::new().with_release(9, Vec::new()), cache_in(temp_dir.path()), 1);

    let err = artwork.get_random("Arcade Fire", "Funeral", None).unwrap_err();
    assert!(matches!(err, ArtworkError::ImageNotFound(_)));
    assert_eq!(cached_files(temp_dir.path()), 0);
}

#[test]
fn test_get_random_is_reproducible_with_seed() {
    let first_dir = TempDir::new().unwrap();
    let second_dir = TempDir::new().unwrap();
    let first = Artwork::with_seed(two_release_source(), cache_in(first_dir.path()), 99);
    let second = Artwork::with_seed(two_release_source(), cache_in(second_dir.path()), 99);

    first.get_random("A", "B", None).unwrap();
    second.get_random("A", "B", None).unwrap();
    assert_eq!(first.source().fetched_urls(), second.source().fetched_urls());
}

#[test]
fn test_get_random_reaches_every_image() {
    let temp_dir = TempDir::new().unwrap();
    let artwork = Artwork::with_seed(two_release_source(), cache_in(temp_dir.path()), 5);

    // Distinct albums so that nothing is served from a previous save
    for i in 0..60 {
        artwork.get_random("Arcade Fire", &format!("Funeral {}", i), None).unwrap();
    }

    let fetched = artwork.source().fetched_urls();
    for url in ["http://img/a-500.jpg", "http://img/b-300.jpg", "http://img/b-800.jpg"] {
        assert!(fetched.iter().any(|f| f == url), "{} never chosen", url);
    }
}

#[test]
fn test_fetch_failure_is_resource_error() {
    let temp_dir = TempDir::new().unwrap();
    let artwork = Artwork::with_seed(two_release_source().failing_fetch(), cache_in(temp_dir.path()), 1);

    let err = artwork.get_random("Arcade Fire", "Funeral", None).unwrap_err();
    assert!(matches!(err, ArtworkError::Resource(_)));
    assert_eq!(cached_files(temp_dir.path()), 0);
}

#[test]
fn test_extension_follows_content_type() {
    let temp_dir = TempDir::new().unwrap();
    let source = FakeSource::new()
        .with_release(1, vec![image("http://img/cover.jpg", 10, 10)])
        .with_content_type(Some("image/png"));
    let artwork = Artwork::with_seed(source, cache_in(temp_dir.path()), 1);

    let path = artwork.get_random("Arcade Fire", "Funeral", Some(2004)).unwrap();
    assert_eq!(path.extension().unwrap(), "png");

    let unknown_dir = TempDir::new().unwrap();
    let source = FakeSource::new()
        .with_release(1, vec![image("http://img/cover.jpeg", 10, 10)])
        .with_content_type(None);
    let artwork = Artwork::with_seed(source, cache_in(unknown_dir.path()), 1);

    let path = artwork.get_random("Arcade Fire", "Funeral", Some(2004)).unwrap();
    assert_eq!(path.extension().unwrap(), "jpeg");
    assert_eq!(artwork.cache().lookup("Arcade Fire", "Funeral", Some(2004)), Some(path));
}

#[test]
fn test_get_cache_twice_with_uncommon_image_type_fetches_once() {
    let temp_dir = TempDir::new().unwrap();
    let source = FakeSource::new()
        .with_release(1, vec![image("https://i.discogs.com/cover.avif", 600, 600)])
        .with_content_type(Some("image/avif"));
    let artwork = Artwork::with_seed(source, cache_in(temp_dir.path()), 1);

    let first = artwork.get_cache("Arcade Fire", "Funeral", Some(2004), Fallback::Random).unwrap();
    let second = artwork.get_cache("Arcade Fire", "Funeral", Some(2004), Fallback::Random).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.extension().unwrap(), "jpg");
    assert_eq!(artwork.source().fetch_count(), 1);
    assert_eq!(artwork.source().search_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_year_zero_shares_the_entry_without_year() {
    let temp_dir = TempDir::new().unwrap();
    let artwork = Artwork::with_seed(two_release_source(), cache_in(temp_dir.path()), 1);

    let without_year = artwork.get_cache("Arcade Fire", "Funeral", None, Fallback::Random).unwrap();
    let year_zero = artwork.get_cache("Arcade Fire", "Funeral", Some(0), Fallback::Random).unwrap();

    assert_eq!(without_year, year_zero);
    assert_eq!(artwork.source().fetch_count(), 1);
}
