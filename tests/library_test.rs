//! Item Document Tests
//!
//! Loading Jellyfin JSON from disk and resolving what comes out of it.

use std::io::Write;
use std::path::Path;

use jellyplay::library::{load_items, parse_items, read_items, LibraryError};
use jellyplay::models::{PlaybackMode, StreamKind};
use jellyplay::resolver::PlaybackResolver;

const ITEMS_RESPONSE: &str = r#"{
    "Items": [
        {
            "Name": "Blade Runner 2049",
            "Id": "a1b2c3d4e5f60718293a4b5c6d7e8f90",
            "Type": "Movie",
            "MediaSources": [{
                "Protocol": "File",
                "Id": "a1b2c3d4e5f60718293a4b5c6d7e8f90",
                "Container": "mkv",
                "Size": 21474836480,
                "MediaStreams": [
                    {"Codec": "hevc", "Type": "Video", "Index": 0, "Width": 3840, "Height": 2160},
                    {"Codec": "truehd", "Type": "Audio", "Index": 1, "Language": "eng"},
                    {"Codec": "ac3", "Type": "Audio", "Index": 2, "Language": "eng"},
                    {"Codec": "PGSSUB", "Type": "Subtitle", "Index": 3}
                ]
            }]
        },
        {
            "Name": "Big Buck Bunny",
            "Id": "0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0",
            "Type": "Movie",
            "MediaSources": [{
                "Container": "MP4",
                "MediaStreams": [
                    {"Codec": "H264", "Type": "Video", "Index": 0},
                    {"Codec": "AAC", "Type": "Audio", "Index": 1},
                    {"Type": "EmbeddedImage", "Codec": "mjpeg", "Index": 2}
                ]
            }]
        },
        {
            "Name": "Home Video",
            "Type": "Video",
            "MediaSources": [{
                "Container": "avi",
                "MediaStreams": [
                    {"Codec": "msmpeg4v3", "Type": "Video"},
                    {"Codec": "mp3", "Type": "Audio"}
                ]
            }]
        },
        {
            "Name": "Season 1",
            "Type": "Season"
        }
    ],
    "TotalRecordCount": 4,
    "StartIndex": 0
}"#;

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_items_response() {
    let file = write_temp(ITEMS_RESPONSE);
    let items = load_items(file.path()).unwrap();

    assert_eq!(items.len(), 4);
    assert_eq!(items[0].name.as_deref(), Some("Blade Runner 2049"));
    assert!(items[0].id.is_some());
    assert!(items[1].id.is_some(), "hyphenated ids are accepted too");
    assert!(items[2].id.is_none());
    assert!(items[3].media_sources.is_empty());

    let streams = &items[1].first_source().unwrap().streams;
    assert_eq!(streams[2].kind, StreamKind::Other);
}

#[test]
fn test_resolve_loaded_library() {
    let file = write_temp(ITEMS_RESPONSE);
    let items = load_items(file.path()).unwrap();
    let resolver = PlaybackResolver::default();

    let modes: Vec<PlaybackMode> = items.iter().map(|i| resolver.resolve(i)).collect();
    assert_eq!(
        modes,
        vec![
            // first audio track is truehd, the ac3 fallback is not considered
            PlaybackMode::DirectStream,
            // uppercase identifiers from the server
            PlaybackMode::DirectPlay,
            PlaybackMode::Transcode,
            PlaybackMode::Transcode,
        ]
    );
}

#[test]
fn test_load_missing_file() {
    let err = load_items(Path::new("/nonexistent/jellyplay/items.json")).unwrap_err();
    assert!(matches!(err, LibraryError::Io { .. }));
    assert!(err.to_string().contains("items.json"));
}

#[test]
fn test_load_invalid_json() {
    let file = write_temp("{\"Items\": [");
    let err = load_items(file.path()).unwrap_err();
    assert!(matches!(err, LibraryError::InvalidJson(_)));
}

#[test]
fn test_items_must_be_a_list() {
    let err = parse_items(r#"{"Items": {"Name": "oops"}}"#).unwrap_err();
    assert!(matches!(err, LibraryError::InvalidJson(_)));
}

#[test]
fn test_empty_query_result() {
    let items = parse_items(r#"{"Items": [], "TotalRecordCount": 0}"#).unwrap();
    assert!(items.is_empty());
}

#[test]
fn test_read_piped_document() {
    let items = read_items(ITEMS_RESPONSE.as_bytes(), "<stdin>").unwrap();
    assert_eq!(items.len(), 4);
}

#[test]
fn test_untyped_stream_does_not_fail_library() {
    let json = r#"{"Items": [
        {"Name": "ok", "MediaSources": [{"Container": "mp4", "MediaStreams": [
            {"Type": "Video", "Codec": "h264"},
            {"Type": "Audio", "Codec": "aac"},
            {"Codec": "x"}
        ]}]},
        {"Name": "other", "MediaSources": [{"Container": "mkv", "MediaStreams": [
            {"Type": "Video", "Codec": "h264"},
            {"Type": "Audio", "Codec": "aac"}
        ]}]}
    ], "TotalRecordCount": 2}"#;
    let items = parse_items(json).unwrap();
    let resolver = PlaybackResolver::default();
    assert_eq!(resolver.resolve(&items[0]), PlaybackMode::DirectPlay);
    assert_eq!(resolver.resolve(&items[1]), PlaybackMode::Remux);
}

#[test]
fn test_null_items_is_empty() {
    let items = parse_items(r#"{"Items": null, "TotalRecordCount": 0}"#).unwrap();
    assert!(items.is_empty());
}
