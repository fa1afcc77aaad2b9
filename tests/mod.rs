//! Integration tests for jellyplay
//!
//! Tests are organized by component:
//! - resolver_test: decision table, scenarios, case folding, concurrency, traces
//! - library_test: Jellyfin item documents on disk
//! - config_test: device profiles from TOML
//! - cli_test: argument parsing and command building blocks

// Note: Each test file is a separate integration test crate
// Tests are run individually by cargo, not via mod.rs
