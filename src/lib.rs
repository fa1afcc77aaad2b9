//! jellyplay - playback mode negotiation for Jellyfin clients
//!
//! Decides whether a media item can be played on a device as-is, needs its
//! container remuxed, needs only its audio transcoded, or needs a full
//! transcode.
//!
//! # Modules
//!
//! - `models` - Item, source and stream descriptors; playback modes
//! - `capabilities` - Device capability registry and profiles
//! - `resolver` - Playback mode resolver and decision traces
//! - `library` - Jellyfin JSON item documents
//! - `config` - Config file and device profile selection
//! - `cli` / `commands` - Scriptable command-line front end

pub mod models;
pub mod capabilities;
pub mod resolver;
pub mod library;
pub mod config;
pub mod cli;
pub mod commands;

// Re-export commonly used types
pub use models::{
    MediaItem, MediaSourceDescriptor, MediaStreamDescriptor, ModeInfo, PlaybackMode, StreamKind,
};

pub use capabilities::{CapabilityProfile, CapabilityRegistry, Category};
pub use resolver::{PlaybackDecision, PlaybackResolver};
