//! CLI Command Handlers
//!
//! Each handler takes CLI args and Output, returns ExitCode. The pure
//! building blocks (`resolve_items`, `summarize`, `check_item`, ...) are
//! public so they can be tested without touching stdout.

use serde::Serialize;
use uuid::Uuid;

use crate::capabilities::CapabilityRegistry;
use crate::cli::{
    CapabilitiesCmd, CheckCmd, ExitCode, ModeFilter, ModesCmd, Output, ResolveCmd, SummaryCmd,
};
use crate::config::Config;
use crate::library;
use crate::models::{
    MediaItem, MediaSourceDescriptor, MediaStreamDescriptor, ModeInfo, PlaybackMode, StreamKind,
};
use crate::resolver::{PlaybackDecision, PlaybackResolver};

// =============================================================================
// Output Rows
// =============================================================================

/// One resolved item
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub mode: PlaybackMode,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<DecisionTrace>,
}

/// Decision booleans plus the reasons for each failed check
#[derive(Debug, Clone, Serialize)]
pub struct DecisionTrace {
    #[serde(flatten)]
    pub decision: PlaybackDecision,
    pub reasons: Vec<String>,
}

impl From<PlaybackDecision> for DecisionTrace {
    fn from(decision: PlaybackDecision) -> Self {
        let reasons = decision.reasons();
        Self { decision, reasons }
    }
}

/// Item count for one mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeCount {
    pub mode: PlaybackMode,
    pub label: &'static str,
    pub count: usize,
}

/// Items per mode, in decision-table order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeSummary {
    pub profile: String,
    pub total: usize,
    pub modes: Vec<ModeCount>,
}

impl ModeSummary {
    pub fn count(&self, mode: PlaybackMode) -> usize {
        self.modes
            .iter()
            .find(|m| m.mode == mode)
            .map(|m| m.count)
            .unwrap_or(0)
    }
}

/// Identifier lists for a device profile
#[derive(Debug, Clone, Serialize)]
pub struct CapabilityReport<'a> {
    pub profile: &'a str,
    pub video: Vec<&'a str>,
    pub audio: Vec<&'a str>,
    pub containers: Vec<&'a str>,
}

/// Static mode table row
#[derive(Debug, Clone, Serialize)]
pub struct ModeRow {
    pub mode: PlaybackMode,
    #[serde(flatten)]
    pub info: ModeInfo,
    pub direct_play: bool,
    pub direct_stream: bool,
}

// =============================================================================
// Building Blocks
// =============================================================================

/// Resolve every item, optionally keeping the trace and filtering by mode
pub fn resolve_items(
    resolver: &PlaybackResolver,
    items: &[MediaItem],
    trace: bool,
    filter: Option<ModeFilter>,
) -> Vec<ResolvedItem> {
    let wanted = filter.map(PlaybackMode::from);
    items
        .iter()
        .map(|item| {
            let decision = resolver.decide(item);
            ResolvedItem {
                name: item.display_name(),
                id: item.id,
                mode: decision.mode,
                description: decision.mode.description(),
                trace: trace.then(|| DecisionTrace::from(decision)),
            }
        })
        .filter(|row| wanted.map_or(true, |m| row.mode == m))
        .collect()
}

pub fn summarize(resolver: &PlaybackResolver, profile: &str, items: &[MediaItem]) -> ModeSummary {
    let mut modes: Vec<ModeCount> = PlaybackMode::ALL
        .iter()
        .map(|&mode| ModeCount {
            mode,
            label: mode.info().label,
            count: 0,
        })
        .collect();

    for item in items {
        let mode = resolver.resolve(item);
        if let Some(entry) = modes.iter_mut().find(|m| m.mode == mode) {
            entry.count += 1;
        }
    }

    ModeSummary {
        profile: profile.to_string(),
        total: items.len(),
        modes,
    }
}

/// Build a single-source item from check flags
pub fn check_item(cmd: &CheckCmd) -> MediaItem {
    let mut item = MediaItem::new("check");
    if cmd.no_source {
        return item;
    }

    let mut source = MediaSourceDescriptor::new(cmd.container.as_deref());
    if let Some(video) = cmd.video.as_deref() {
        source = source.with_stream(MediaStreamDescriptor::new(StreamKind::Video, Some(video)));
    }
    if let Some(audio) = cmd.audio.as_deref() {
        source = source.with_stream(MediaStreamDescriptor::new(StreamKind::Audio, Some(audio)));
    }
    item.media_sources.push(source);
    item
}

pub fn capability_report<'a>(
    profile: &'a str,
    registry: &'a CapabilityRegistry,
) -> CapabilityReport<'a> {
    CapabilityReport {
        profile,
        video: registry.video_codecs(),
        audio: registry.audio_codecs(),
        containers: registry.containers(),
    }
}

pub fn mode_table() -> Vec<ModeRow> {
    PlaybackMode::ALL
        .iter()
        .map(|&mode| ModeRow {
            mode,
            info: mode.info(),
            direct_play: mode == PlaybackMode::DirectPlay,
            direct_stream: matches!(mode, PlaybackMode::DirectStream | PlaybackMode::Remux),
        })
        .collect()
}

/// Build a resolver for the requested profile, reporting config errors
pub fn load_resolver(
    config: &Config,
    profile: Option<&str>,
    output: &Output,
) -> Result<PlaybackResolver, ExitCode> {
    match config.registry(profile) {
        Ok(registry) => {
            tracing::debug!(
                profile = config.active_profile_name(profile),
                video = registry.video_codecs().len(),
                audio = registry.audio_codecs().len(),
                containers = registry.containers().len(),
                "capability registry ready"
            );
            Ok(PlaybackResolver::new(registry))
        }
        Err(e) => Err(output.error(e.to_string(), ExitCode::ConfigError)),
    }
}

fn load_document(input: &std::path::Path, output: &Output) -> Result<Vec<MediaItem>, ExitCode> {
    match library::load_items(input) {
        Ok(items) if items.is_empty() => {
            Err(output.error("No items found in document", ExitCode::NoItems))
        }
        Ok(items) => Ok(items),
        Err(e) => Err(output.error(e.to_string(), ExitCode::InputError)),
    }
}

fn print_rows(output: &Output, rows: &[ResolvedItem]) {
    for row in rows {
        output.text(format!(
            "{:<14} {}  ({})",
            row.mode.to_string(),
            row.name,
            row.description
        ));
        if let Some(trace) = &row.trace {
            for reason in &trace.reasons {
                output.text(format!("{:<14}   - {}", "", reason));
            }
        }
    }
}

// =============================================================================
// Resolve Command
// =============================================================================

pub fn resolve_cmd(
    cmd: ResolveCmd,
    config: &Config,
    profile: Option<&str>,
    output: &Output,
) -> ExitCode {
    let resolver = match load_resolver(config, profile, output) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let items = match load_document(&cmd.input, output) {
        Ok(items) => items,
        Err(code) => return code,
    };

    output.info(format!(
        "Resolving {} item(s) with profile '{}'",
        items.len(),
        config.active_profile_name(profile)
    ));

    let rows = resolve_items(&resolver, &items, cmd.trace, cmd.mode);
    if let Err(e) = output.print(&rows) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    print_rows(output, &rows);
    ExitCode::Success
}

// =============================================================================
// Summary Command
// =============================================================================

pub fn summary_cmd(
    cmd: SummaryCmd,
    config: &Config,
    profile: Option<&str>,
    output: &Output,
) -> ExitCode {
    let resolver = match load_resolver(config, profile, output) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let items = match load_document(&cmd.input, output) {
        Ok(items) => items,
        Err(code) => return code,
    };

    let summary = summarize(&resolver, config.active_profile_name(profile), &items);
    if let Err(e) = output.print(&summary) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    for entry in &summary.modes {
        output.text(format!("{:<14} {:>6}", entry.label, entry.count));
    }
    output.text(format!("{:<14} {:>6}", "Total", summary.total));
    ExitCode::Success
}

// =============================================================================
// Check Command
// =============================================================================

pub fn check_cmd(
    cmd: CheckCmd,
    config: &Config,
    profile: Option<&str>,
    output: &Output,
) -> ExitCode {
    let resolver = match load_resolver(config, profile, output) {
        Ok(r) => r,
        Err(code) => return code,
    };

    let item = check_item(&cmd);
    let rows = resolve_items(&resolver, std::slice::from_ref(&item), true, None);
    if let Err(e) = output.print(&rows[0]) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    print_rows(output, &rows);
    ExitCode::Success
}

// =============================================================================
// Capabilities Command
// =============================================================================

pub fn capabilities_cmd(
    cmd: CapabilitiesCmd,
    config: &Config,
    profile: Option<&str>,
    output: &Output,
) -> ExitCode {
    if cmd.list {
        let names = config.profile_names();
        if let Err(e) = output.print(&names) {
            return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
        }
        let active = config.active_profile_name(profile);
        for name in &names {
            let marker = if name == active { "*" } else { " " };
            output.text(format!("{} {}", marker, name));
        }
        return ExitCode::Success;
    }

    let registry = match config.registry(profile) {
        Ok(r) => r,
        Err(e) => return output.error(e.to_string(), ExitCode::ConfigError),
    };
    let report = capability_report(config.active_profile_name(profile), &registry);
    if let Err(e) = output.print(&report) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    output.text(format!("Profile:    {}", report.profile));
    output.text(format!("Video:      {}", report.video.join(", ")));
    output.text(format!("Audio:      {}", report.audio.join(", ")));
    output.text(format!("Containers: {}", report.containers.join(", ")));
    ExitCode::Success
}

// =============================================================================
// Modes Command
// =============================================================================

pub fn modes_cmd(_cmd: ModesCmd, output: &Output) -> ExitCode {
    let table = mode_table();
    if let Err(e) = output.print(&table) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    for row in &table {
        output.text(format!(
            "{:<14} {:<18} {}",
            row.info.label, row.info.quality, row.info.cpu_cost
        ));
    }
    ExitCode::Success
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(container: Option<&str>, video: Option<&str>, audio: Option<&str>) -> CheckCmd {
        CheckCmd {
            container: container.map(String::from),
            video: video.map(String::from),
            audio: audio.map(String::from),
            no_source: false,
        }
    }

    #[test]
    fn test_check_item_builds_single_source() {
        let item = check_item(&check(Some("mkv"), Some("h264"), None));
        let source = item.first_source().unwrap();
        assert_eq!(source.container.as_deref(), Some("mkv"));
        assert_eq!(source.streams.len(), 1);
        assert!(source.audio_stream().is_none());
    }

    #[test]
    fn test_check_item_no_source() {
        let mut cmd = check(None, None, None);
        cmd.no_source = true;
        assert!(check_item(&cmd).media_sources.is_empty());
    }

    #[test]
    fn test_mode_table_flags() {
        let table = mode_table();
        assert_eq!(table.len(), 4);
        assert!(table[0].direct_play);
        assert!(table[1].direct_stream);
        assert!(table[2].direct_stream);
        assert!(!table[3].direct_play && !table[3].direct_stream);
    }

    #[test]
    fn test_decision_trace_flattens() {
        let resolver = PlaybackResolver::default();
        let item = check_item(&check(Some("mp4"), Some("mpeg2video"), Some("aac")));
        let rows = resolve_items(&resolver, &[item], true, None);
        let value = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(value["mode"], "transcode");
        assert_eq!(value["trace"]["video_ok"], false);
        assert_eq!(
            value["trace"]["reasons"][0],
            "video codec \"mpeg2video\" not supported"
        );
    }
}
