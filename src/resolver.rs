//! Playback mode resolver
//!
//! Classifies a media item into one of four playback modes by checking its
//! preferred source against a [`CapabilityRegistry`]:
//!
//! | video | audio | container | mode         |
//! |-------|-------|-----------|--------------|
//! | yes   | yes   | yes       | DirectPlay   |
//! | yes   | yes   | no        | Remux        |
//! | yes   | no    | any       | DirectStream |
//! | no    | any   | any       | Transcode    |
//!
//! Rows are evaluated top to bottom and the first match wins. Once audio has
//! to be transcoded the output is repackaged anyway, so a container mismatch
//! no longer matters.

use serde::Serialize;
use std::sync::Arc;

use crate::capabilities::CapabilityRegistry;
use crate::models::{MediaItem, PlaybackMode};

/// Everything the resolver looked at, plus the verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackDecision {
    pub mode: PlaybackMode,
    pub has_source: bool,
    pub video_ok: bool,
    pub audio_ok: bool,
    pub container_ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
    #[serde(skip)]
    has_video_stream: bool,
    #[serde(skip)]
    has_audio_stream: bool,
}

impl PlaybackDecision {
    fn no_source() -> Self {
        Self {
            mode: PlaybackMode::Transcode,
            has_source: false,
            video_ok: false,
            audio_ok: false,
            container_ok: false,
            container: None,
            video_codec: None,
            audio_codec: None,
            has_video_stream: false,
            has_audio_stream: false,
        }
    }

    /// Human-readable explanation of each failed dimension
    pub fn reasons(&self) -> Vec<String> {
        if !self.has_source {
            return vec!["no media source".to_string()];
        }

        let mut reasons = Vec::new();
        if !self.video_ok {
            reasons.push(dimension_reason(
                "video codec",
                "no video stream",
                self.has_video_stream,
                self.video_codec.as_deref(),
            ));
        }
        if !self.audio_ok {
            reasons.push(dimension_reason(
                "audio codec",
                "no audio stream",
                self.has_audio_stream,
                self.audio_codec.as_deref(),
            ));
        }
        if !self.container_ok {
            reasons.push(match self.container.as_deref() {
                Some(c) => format!("container \"{}\" not supported", c),
                None => "container unknown".to_string(),
            });
        }
        reasons
    }
}

fn dimension_reason(what: &str, missing: &str, present: bool, codec: Option<&str>) -> String {
    match (present, codec) {
        (false, _) => missing.to_string(),
        (true, Some(c)) => format!("{} \"{}\" not supported", what, c),
        (true, None) => format!("{} unknown", what),
    }
}

/// Decision table; callers must pass the three predicates in this order
fn classify(video_ok: bool, audio_ok: bool, container_ok: bool) -> PlaybackMode {
    match (video_ok, audio_ok, container_ok) {
        (true, true, true) => PlaybackMode::DirectPlay,
        (true, true, false) => PlaybackMode::Remux,
        (true, false, _) => PlaybackMode::DirectStream,
        (false, _, _) => PlaybackMode::Transcode,
    }
}

/// Resolves playback modes against one device's capabilities
///
/// Cheap to clone; clones share the registry.
#[derive(Debug, Clone)]
pub struct PlaybackResolver {
    registry: Arc<CapabilityRegistry>,
}

impl Default for PlaybackResolver {
    fn default() -> Self {
        Self::new(CapabilityRegistry::default())
    }
}

impl PlaybackResolver {
    pub fn new(registry: CapabilityRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Share an existing registry
    pub fn with_shared(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Classify an item and return the full trace
    pub fn decide(&self, item: &MediaItem) -> PlaybackDecision {
        let decision = match item.first_source() {
            None => PlaybackDecision::no_source(),
            Some(source) => {
                let video = source.video_stream();
                let audio = source.audio_stream();
                let video_codec = video.and_then(|s| s.codec.as_deref());
                let audio_codec = audio.and_then(|s| s.codec.as_deref());
                let container = source.container.as_deref();

                let video_ok = self.registry.is_video_codec_supported(video_codec);
                let audio_ok = self.registry.is_audio_codec_supported(audio_codec);
                let container_ok = self.registry.is_container_supported(container);

                PlaybackDecision {
                    mode: classify(video_ok, audio_ok, container_ok),
                    has_source: true,
                    video_ok,
                    audio_ok,
                    container_ok,
                    container: container.map(str::to_string),
                    video_codec: video_codec.map(str::to_string),
                    audio_codec: audio_codec.map(str::to_string),
                    has_video_stream: video.is_some(),
                    has_audio_stream: audio.is_some(),
                }
            }
        };

        tracing::debug!(
            item = %item.display_name(),
            has_source = decision.has_source,
            container = decision.container.as_deref().unwrap_or("-"),
            video_codec = decision.video_codec.as_deref().unwrap_or("-"),
            audio_codec = decision.audio_codec.as_deref().unwrap_or("-"),
            video_ok = decision.video_ok,
            audio_ok = decision.audio_ok,
            container_ok = decision.container_ok,
            mode = ?decision.mode,
            "playback mode resolved"
        );

        decision
    }

    pub fn resolve(&self, item: &MediaItem) -> PlaybackMode {
        self.decide(item).mode
    }

    pub fn can_direct_play(&self, item: &MediaItem) -> bool {
        self.resolve(item) == PlaybackMode::DirectPlay
    }

    /// True for both DirectStream and Remux: neither re-encodes video
    pub fn can_direct_stream(&self, item: &MediaItem) -> bool {
        matches!(
            self.resolve(item),
            PlaybackMode::DirectStream | PlaybackMode::Remux
        )
    }
}
