//! Data structures and types for jellyplay
//!
//! Contains all shared models used across the crate organized by domain:
//! - **Media**: item, source and stream descriptors as reported by the server
//! - **Playback**: the playback mode classification and its presentation data

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// Media Descriptors (Jellyfin item metadata)
// =============================================================================

/// Elementary stream kind discriminator
///
/// Jellyfin reports more stream types than the resolver cares about
/// (Subtitle, EmbeddedImage, Data, Lyric). Everything that is not video or
/// audio collapses into `Other`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum StreamKind {
    Video,
    Audio,
    #[default]
    Other,
}

impl<'de> Deserialize<'de> for StreamKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(if raw.eq_ignore_ascii_case("video") {
            StreamKind::Video
        } else if raw.eq_ignore_ascii_case("audio") {
            StreamKind::Audio
        } else {
            StreamKind::Other
        })
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Video => write!(f, "video"),
            StreamKind::Audio => write!(f, "audio"),
            StreamKind::Other => write!(f, "other"),
        }
    }
}

/// One elementary stream inside a media source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaStreamDescriptor {
    #[serde(rename = "Type", default)]
    pub kind: StreamKind,
    #[serde(default)]
    pub codec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_title: Option<String>,
}

impl MediaStreamDescriptor {
    /// Create a stream of the given kind and codec
    pub fn new(kind: StreamKind, codec: Option<&str>) -> Self {
        Self {
            kind,
            codec: codec.map(str::to_string),
            index: None,
            language: None,
            display_title: None,
        }
    }

    pub fn video(codec: &str) -> Self {
        Self::new(StreamKind::Video, Some(codec))
    }

    pub fn audio(codec: &str) -> Self {
        Self::new(StreamKind::Audio, Some(codec))
    }

    pub fn subtitle(codec: &str) -> Self {
        Self::new(StreamKind::Other, Some(codec))
    }
}

impl fmt::Display for MediaStreamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.codec.as_deref().unwrap_or("?"))
    }
}

/// A playable version of an item (file, container + streams)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaSourceDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(rename = "MediaStreams", default)]
    pub streams: Vec<MediaStreamDescriptor>,
}

impl MediaSourceDescriptor {
    /// Create an empty source with the given container
    pub fn new(container: Option<&str>) -> Self {
        Self {
            container: container.map(str::to_string),
            ..Default::default()
        }
    }

    /// Append a stream (builder style)
    pub fn with_stream(mut self, stream: MediaStreamDescriptor) -> Self {
        self.streams.push(stream);
        self
    }

    /// First stream of the given kind, in server order
    pub fn first_stream(&self, kind: StreamKind) -> Option<&MediaStreamDescriptor> {
        self.streams.iter().find(|s| s.kind == kind)
    }

    pub fn video_stream(&self) -> Option<&MediaStreamDescriptor> {
        self.first_stream(StreamKind::Video)
    }

    pub fn audio_stream(&self) -> Option<&MediaStreamDescriptor> {
        self.first_stream(StreamKind::Audio)
    }
}

impl fmt::Display for MediaSourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let streams: Vec<String> = self.streams.iter().map(|s| s.to_string()).collect();
        write!(
            f,
            "{} [{}]",
            self.container.as_deref().unwrap_or("?"),
            streams.join(", ")
        )
    }
}

/// A library item with zero or more media sources
///
/// The server orders sources by preference; only the first one is ever
/// considered for playback decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaItem {
    #[serde(
        default,
        deserialize_with = "lenient_uuid",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub media_sources: Vec<MediaSourceDescriptor>,
}

impl MediaItem {
    /// Create a named item without sources
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Append a media source (builder style)
    pub fn with_source(mut self, source: MediaSourceDescriptor) -> Self {
        self.media_sources.push(source);
        self
    }

    /// The preferred media source, if any
    pub fn first_source(&self) -> Option<&MediaSourceDescriptor> {
        self.media_sources.first()
    }

    /// Name for display, falling back to the id
    pub fn display_name(&self) -> String {
        match (&self.name, &self.id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => id.simple().to_string(),
            (None, None) => "<unnamed>".to_string(),
        }
    }
}

impl fmt::Display for MediaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.first_source() {
            Some(source) => write!(f, "{} ({})", self.display_name(), source),
            None => write!(f, "{} (no media sources)", self.display_name()),
        }
    }
}

/// Jellyfin ids are 32 hex digits without dashes; anything unparseable is
/// dropped rather than failing the whole document.
fn lenient_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| Uuid::parse_str(s.trim()).ok()))
}

pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Playback Models
// =============================================================================

/// How an item will be delivered to the device
///
/// Variants are listed in decision-table priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Original file streamed unmodified
    DirectPlay,
    /// Video passes through, audio is transcoded
    DirectStream,
    /// Container repackaged, no stream re-encoded
    Remux,
    /// Video fully re-encoded
    Transcode,
}

/// Static presentation data for a playback mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeInfo {
    pub label: &'static str,
    pub quality: &'static str,
    pub cpu_cost: &'static str,
}

impl PlaybackMode {
    pub const ALL: [PlaybackMode; 4] = [
        PlaybackMode::DirectPlay,
        PlaybackMode::DirectStream,
        PlaybackMode::Remux,
        PlaybackMode::Transcode,
    ];

    /// Quality tier and approximate server CPU cost
    pub fn info(&self) -> ModeInfo {
        match self {
            PlaybackMode::DirectPlay => ModeInfo {
                label: "Direct Play",
                quality: "Best quality",
                cpu_cost: "~0% server CPU",
            },
            PlaybackMode::DirectStream => ModeInfo {
                label: "Direct Stream",
                quality: "Excellent quality",
                cpu_cost: "5-10% server CPU",
            },
            PlaybackMode::Remux => ModeInfo {
                label: "Remux",
                quality: "Excellent quality",
                cpu_cost: "10-20% server CPU",
            },
            PlaybackMode::Transcode => ModeInfo {
                label: "Transcode",
                quality: "Reduced quality",
                cpu_cost: "80-100% server CPU",
            },
        }
    }

    /// One-line description, e.g. "Best quality / ~0% server CPU"
    pub fn description(&self) -> String {
        let info = self.info();
        format!("{} / {}", info.quality, info.cpu_cost)
    }

}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.info().label)
    }
}

// =============================================================================
// Tests
// =============================================================================
