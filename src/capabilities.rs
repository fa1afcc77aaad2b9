//! Device capability registry
//!
//! The set of video codecs, audio codecs and containers a playback device
//! can decode or demux in hardware. A registry is an immutable value: build
//! one per device class and hand it to the resolver.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Hardware video decoders on current Apple TV hardware
pub const DEFAULT_VIDEO_CODECS: &[&str] = &[
    "h264", "avc", "avc1", // H.264
    "hevc", "h265", "hvc1", "hev1", // H.265
    "vp9", "vp09", // VP9
    "mpeg4",
];

pub const DEFAULT_AUDIO_CODECS: &[&str] = &[
    "aac", "mp4a", // AAC
    "mp3", "mp3a", // MP3
    "ac3", "eac3", "ec-3", // Dolby Digital
    "flac", "alac", // lossless
    "pcm", "pcm_s16le", "pcm_s24le",
];

pub const DEFAULT_CONTAINERS: &[&str] = &["mp4", "m4v", "mov", "ts", "m2ts"];

/// Codec category a registry answers for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Video,
    Audio,
    Container,
}

/// Lowercased, trimmed identifier; empty input yields None
fn normalize(id: &str) -> Option<String> {
    let id = id.trim();
    (!id.is_empty()).then(|| id.to_ascii_lowercase())
}

fn to_set<I, S>(ids: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ids.into_iter().filter_map(|s| normalize(s.as_ref())).collect()
}

/// Codec/container identifiers a device supports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityRegistry {
    video: BTreeSet<String>,
    audio: BTreeSet<String>,
    containers: BTreeSet<String>,
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_VIDEO_CODECS, DEFAULT_AUDIO_CODECS, DEFAULT_CONTAINERS)
    }
}

impl CapabilityRegistry {
    /// Build a registry from explicit identifier lists.
    ///
    /// Identifiers are trimmed and lowercased; empty ones are dropped.
    pub fn new<V, A, C>(video: V, audio: A, containers: C) -> Self
    where
        V: IntoIterator,
        V::Item: AsRef<str>,
        A: IntoIterator,
        A::Item: AsRef<str>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        Self {
            video: to_set(video),
            audio: to_set(audio),
            containers: to_set(containers),
        }
    }

    /// A registry that supports nothing
    pub fn empty() -> Self {
        Self {
            video: BTreeSet::new(),
            audio: BTreeSet::new(),
            containers: BTreeSet::new(),
        }
    }

    /// Start a builder from the default registry
    pub fn builder() -> CapabilityRegistryBuilder {
        CapabilityRegistryBuilder {
            registry: Self::default(),
        }
    }

    pub fn is_video_codec_supported(&self, codec: Option<&str>) -> bool {
        Self::contains(&self.video, codec)
    }

    pub fn is_audio_codec_supported(&self, codec: Option<&str>) -> bool {
        Self::contains(&self.audio, codec)
    }

    pub fn is_container_supported(&self, container: Option<&str>) -> bool {
        Self::contains(&self.containers, container)
    }

    /// Membership query by category
    pub fn supports(&self, category: Category, id: Option<&str>) -> bool {
        match category {
            Category::Video => self.is_video_codec_supported(id),
            Category::Audio => self.is_audio_codec_supported(id),
            Category::Container => self.is_container_supported(id),
        }
    }

    fn contains(set: &BTreeSet<String>, id: Option<&str>) -> bool {
        // case-fold only; whitespace in server metadata is not forgiven
        match id {
            Some(id) => set.contains(&id.to_ascii_lowercase()),
            None => false,
        }
    }

    /// Supported video codecs, sorted
    pub fn video_codecs(&self) -> Vec<&str> {
        self.video.iter().map(String::as_str).collect()
    }

    /// Supported audio codecs, sorted
    pub fn audio_codecs(&self) -> Vec<&str> {
        self.audio.iter().map(String::as_str).collect()
    }

    /// Supported containers, sorted
    pub fn containers(&self) -> Vec<&str> {
        self.containers.iter().map(String::as_str).collect()
    }

    fn set_mut(&mut self, category: Category) -> &mut BTreeSet<String> {
        match category {
            Category::Video => &mut self.video,
            Category::Audio => &mut self.audio,
            Category::Container => &mut self.containers,
        }
    }
}

impl From<&CapabilityProfile> for CapabilityRegistry {
    fn from(profile: &CapabilityProfile) -> Self {
        let mut builder = match profile.base {
            ProfileBase::Default => CapabilityRegistry::builder(),
            ProfileBase::Empty => CapabilityRegistryBuilder::empty(),
        };
        builder = builder
            .remove(Category::Video, &profile.remove_video)
            .remove(Category::Audio, &profile.remove_audio)
            .remove(Category::Container, &profile.remove_containers)
            .add(Category::Video, &profile.video)
            .add(Category::Audio, &profile.audio)
            .add(Category::Container, &profile.containers);
        builder.build()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Derive a registry for another device class from a starting set
#[derive(Debug, Clone)]
pub struct CapabilityRegistryBuilder {
    registry: CapabilityRegistry,
}

impl CapabilityRegistryBuilder {
    /// Start from an empty registry instead of the defaults
    pub fn empty() -> Self {
        Self {
            registry: CapabilityRegistry::empty(),
        }
    }

    pub fn add<I, S>(mut self, category: Category, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry.set_mut(category).extend(to_set(ids));
        self
    }

    pub fn remove<I, S>(mut self, category: Category, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = self.registry.set_mut(category);
        for id in to_set(ids) {
            set.remove(&id);
        }
        self
    }

    pub fn build(self) -> CapabilityRegistry {
        self.registry
    }
}

// =============================================================================
// Profiles (config file representation)
// =============================================================================

/// Which identifier set a profile starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileBase {
    #[default]
    Default,
    Empty,
}

/// A device-class capability profile as written in the config file
///
/// Removals are applied before additions, so a profile can both drop and
/// re-add an identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityProfile {
    pub base: ProfileBase,
    pub video: Vec<String>,
    pub audio: Vec<String>,
    pub containers: Vec<String>,
    pub remove_video: Vec<String>,
    pub remove_audio: Vec<String>,
    pub remove_containers: Vec<String>,
}

impl CapabilityProfile {
    pub fn registry(&self) -> CapabilityRegistry {
        CapabilityRegistry::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sets() {
        let registry = CapabilityRegistry::default();
        for codec in DEFAULT_VIDEO_CODECS {
            assert!(registry.is_video_codec_supported(Some(codec)), "{codec}");
        }
        for codec in DEFAULT_AUDIO_CODECS {
            assert!(registry.is_audio_codec_supported(Some(codec)), "{codec}");
        }
        for container in DEFAULT_CONTAINERS {
            assert!(registry.is_container_supported(Some(container)), "{container}");
        }
        assert_eq!(registry.video_codecs().len(), 10);
        assert_eq!(registry.audio_codecs().len(), 12);
        assert_eq!(registry.containers().len(), 5);
    }

    #[test]
    fn test_absent_and_empty_are_unsupported() {
        let registry = CapabilityRegistry::default();
        assert!(!registry.is_video_codec_supported(None));
        assert!(!registry.is_audio_codec_supported(None));
        assert!(!registry.is_container_supported(None));
        assert!(!registry.is_video_codec_supported(Some("")));
        assert!(!registry.is_container_supported(Some("mkv")));
        assert!(!registry.is_audio_codec_supported(Some("dts")));
    }

    #[test]
    fn test_case_insensitive() {
        let registry = CapabilityRegistry::default();
        assert!(registry.is_video_codec_supported(Some("H264")));
        assert!(registry.is_video_codec_supported(Some("HeVc")));
        assert!(registry.is_audio_codec_supported(Some("EC-3")));
        assert!(registry.is_container_supported(Some("M2TS")));
    }

    #[test]
    fn test_new_normalizes_identifiers() {
        let registry = CapabilityRegistry::new([" AV1 ", ""], ["Opus"], ["MKV"]);
        assert_eq!(registry.video_codecs(), vec!["av1"]);
        assert!(registry.is_audio_codec_supported(Some("opus")));
        assert!(registry.is_container_supported(Some("mkv")));
    }

    #[test]
    fn test_builder_add_remove() {
        let registry = CapabilityRegistry::builder()
            .remove(Category::Video, ["hevc", "h265", "hvc1", "hev1"])
            .add(Category::Container, ["mkv"])
            .build();
        assert!(!registry.is_video_codec_supported(Some("hevc")));
        assert!(registry.is_video_codec_supported(Some("h264")));
        assert!(registry.supports(Category::Container, Some("mkv")));
    }

    #[test]
    fn test_profile_from_empty_base() {
        let profile = CapabilityProfile {
            base: ProfileBase::Empty,
            video: vec!["h264".into()],
            audio: vec!["aac".into()],
            containers: vec!["mp4".into()],
            ..Default::default()
        };
        let registry = profile.registry();
        assert_eq!(registry.video_codecs(), vec!["h264"]);
        assert!(!registry.is_audio_codec_supported(Some("ac3")));
    }

    #[test]
    fn test_profile_removal_then_addition() {
        let profile = CapabilityProfile {
            video: vec!["HEVC".into()],
            remove_video: vec!["hevc".into()],
            ..Default::default()
        };
        assert!(profile.registry().is_video_codec_supported(Some("hevc")));
    }

    #[test]
    fn test_registry_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CapabilityRegistry>();
    }
}
