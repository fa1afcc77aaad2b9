//! Item document loader
//!
//! Turns Jellyfin JSON into [`MediaItem`]s. Accepts whatever the server
//! hands out for an item: a single item, an `Items` query result, a bare
//! array, or a PlaybackInfo response.

use serde::Deserialize;
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::models::{null_as_empty, MediaItem};

/// Item document errors
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Unrecognized document: {0}")]
    UnrecognizedShape(String),
}

/// `/Items` query result envelope
#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(rename = "Items", default, deserialize_with = "null_as_empty")]
    items: Vec<MediaItem>,
    #[serde(rename = "TotalRecordCount", default)]
    total_record_count: Option<u64>,
}

/// Keys that mark an object as a single item (or PlaybackInfo response)
const ITEM_KEYS: &[&str] = &["Id", "Name", "MediaSources"];

/// Parse every item out of a JSON document
pub fn parse_items(json: &str) -> Result<Vec<MediaItem>, LibraryError> {
    let value: Value = serde_json::from_str(json)?;

    let (is_query, is_item) = match &value {
        Value::Object(map) => (
            map.contains_key("Items"),
            ITEM_KEYS.iter().any(|k| map.contains_key(*k)),
        ),
        _ => (false, false),
    };

    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::Object(_) if is_query => {
            let result: QueryResult = serde_json::from_value(value)?;
            if let Some(total) = result.total_record_count {
                if total != result.items.len() as u64 {
                    tracing::debug!(
                        total,
                        returned = result.items.len(),
                        "query result is a partial page"
                    );
                }
            }
            Ok(result.items)
        }
        Value::Object(_) if is_item => {
            Ok(vec![serde_json::from_value(value)?])
        }
        Value::Object(_) => Err(LibraryError::UnrecognizedShape(
            "object has none of Items, Id, Name, MediaSources".to_string(),
        )),
        other => Err(LibraryError::UnrecognizedShape(format!(
            "expected object or array, got {}",
            json_type(&other)
        ))),
    }
}

/// Load items from a file, or stdin when path is `-`
pub fn load_items(path: &Path) -> Result<Vec<MediaItem>, LibraryError> {
    if path == Path::new("-") {
        return read_items(std::io::stdin().lock(), "<stdin>");
    }

    let contents = std::fs::read_to_string(path).map_err(|source| LibraryError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let items = parse_items(&contents)?;
    tracing::debug!(path = %path.display(), count = items.len(), "loaded item document");
    Ok(items)
}

/// Parse items from any reader; `origin` names it in errors and logs
pub fn read_items<R: Read>(mut reader: R, origin: &str) -> Result<Vec<MediaItem>, LibraryError> {
    let mut contents = String::new();
    reader
        .read_to_string(&mut contents)
        .map_err(|source| LibraryError::Io {
            path: origin.to_string(),
            source,
        })?;
    let items = parse_items(&contents)?;
    tracing::debug!(path = origin, count = items.len(), "loaded item document");
    Ok(items)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_item() {
        let items = parse_items(r#"{"Name": "Heat", "MediaSources": []}"#).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name.as_deref(), Some("Heat"));
    }

    #[test]
    fn test_parse_query_result() {
        let json = r#"{"Items": [{"Name": "A"}, {"Name": "B"}], "TotalRecordCount": 40}"#;
        let items = parse_items(json).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_parse_null_items() {
        let items = parse_items(r#"{"Items": null, "TotalRecordCount": 0}"#).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_stream_without_type_keeps_document() {
        let json = r#"{"Items": [
            {"Name": "A", "MediaSources": [{"Container": "mp4", "MediaStreams": [
                {"Type": "Video", "Codec": "h264"},
                {"Codec": "bin_data"}
            ]}]},
            {"Name": "B"}
        ]}"#;
        let items = parse_items(json).unwrap();
        assert_eq!(items.len(), 2);
        let source = items[0].first_source().unwrap();
        assert_eq!(source.streams[1].kind, crate::models::StreamKind::Other);
        assert_eq!(source.video_stream().unwrap().codec.as_deref(), Some("h264"));
    }

    #[test]
    fn test_read_items_from_reader() {
        let items = read_items(r#"[{"Name": "A"}, {"Name": "B"}]"#.as_bytes(), "<stdin>").unwrap();
        assert_eq!(items.len(), 2);
        assert!(matches!(
            read_items("".as_bytes(), "<stdin>"),
            Err(LibraryError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_parse_array() {
        let items = parse_items(r#"[{"Name": "A"}]"#).unwrap();
        assert_eq!(items.len(), 1);
        assert!(parse_items("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_playback_info() {
        let json = r#"{"MediaSources": [{"Container": "mp4", "MediaStreams": []}], "PlaySessionId": "abc"}"#;
        let items = parse_items(json).unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].name.is_none());
        assert_eq!(items[0].media_sources.len(), 1);
    }

    #[test]
    fn test_unrecognized_shapes() {
        assert!(matches!(
            parse_items(r#"{"foo": 1}"#),
            Err(LibraryError::UnrecognizedShape(_))
        ));
        assert!(matches!(
            parse_items("42"),
            Err(LibraryError::UnrecognizedShape(_))
        ));
        assert!(matches!(
            parse_items("{not json"),
            Err(LibraryError::InvalidJson(_))
        ));
    }
}
