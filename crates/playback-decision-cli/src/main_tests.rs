// crates/playback-decision-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for bounded reads, argument parsing, and output bodies.
// Purpose: Ensure CLI inputs fail closed and outputs keep their wire shape.
// Dependencies: playback-decision-cli main helpers
// ============================================================================

//! ## Overview
//! Validates `read_bytes_with_limit` and stream reads enforce size limits,
//! the argument parser accepts each subcommand, and decide output bodies
//! carry the status, the outcome, and the replay hash.
//!
//! Security posture: CLI inputs are untrusted; size limits must fail closed.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use clap::Parser;
use playback_decision_config::DecisionConfig;
use serde_json::Value;
use serde_json::json;
use tempfile::NamedTempFile;

use super::Cli;
use super::Commands;
use super::DecideOutput;
use super::ReadLimitError;
use super::build_engine;
use super::check_replay_hash;
use super::input_read_limit;
use super::read_bytes_with_limit;
use super::read_error;
use super::read_reader_with_limit;
use super::render_json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn temp_file(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content).expect("write temp file");
    file
}

fn quiet_config() -> DecisionConfig {
    let mut config = DecisionConfig::default();
    config.telemetry.enabled = false;
    config
}

fn request_bytes() -> Vec<u8> {
    serde_json::to_vec(&json!({
        "api": "v3.1",
        "rid": "cli-1",
        "source": {"c": "mp4", "v": "h264", "a": "aac"},
        "caps": {"v": 1, "c": ["mp4"], "vc": ["h264"], "ac": ["aac"], "rng": true},
        "policy": {"tx": false}
    }))
    .unwrap()
}

// ============================================================================
// SECTION: Bounded Reads
// ============================================================================

#[test]
fn read_bytes_with_limit_allows_small_file() {
    let file = temp_file(b"ok");
    let bytes = read_bytes_with_limit(file.path(), 16).expect("read small file");
    assert_eq!(bytes, b"ok");
}

#[test]
fn read_bytes_with_limit_rejects_large_file() {
    let limit = 8_usize;
    let file = temp_file(&vec![0_u8; limit + 1]);

    let err = read_bytes_with_limit(file.path(), limit).expect_err("expected size limit failure");
    match err {
        ReadLimitError::TooLarge {
            size,
            limit: reported,
        } => {
            let limit_u64 = u64::try_from(limit).expect("limit fits");
            assert!(size > limit_u64);
            assert_eq!(reported, limit);
        }
        ReadLimitError::Io(err) => panic!("unexpected IO error: {err}"),
    }
}

#[test]
fn read_bytes_with_limit_reports_missing_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = read_bytes_with_limit(&dir.path().join("absent.json"), 16).expect_err("missing");
    assert!(matches!(err, ReadLimitError::Io(_)));
    assert!(read_error("absent.json", &err).starts_with("failed to read absent.json"));
}

#[test]
fn stream_read_stops_one_byte_past_limit() {
    let payload = vec![b'x'; 64];
    let err = read_reader_with_limit(payload.as_slice(), 10).expect_err("expected size limit failure");
    match err {
        ReadLimitError::TooLarge {
            size,
            limit,
        } => {
            assert_eq!(size, 11);
            assert_eq!(limit, 10);
        }
        ReadLimitError::Io(err) => panic!("unexpected IO error: {err}"),
    }
    let exact = read_reader_with_limit(&payload[.. 10], 10).expect("exact fit");
    assert_eq!(exact.len(), 10);
}

#[test]
fn read_limit_admits_one_byte_past_engine_limit() {
    let engine = build_engine(&quiet_config());
    assert_eq!(input_read_limit(&engine), engine.config().max_input_bytes + 1);
}

// ============================================================================
// SECTION: Argument Parsing
// ============================================================================

#[test]
fn parses_decide_with_input_and_pretty() {
    let cli = Cli::try_parse_from(["playback-decision", "decide", "--input", "req.json", "--pretty"])
        .expect("parse decide");
    match cli.command {
        Some(Commands::Decide(command)) => {
            assert!(command.pretty);
            assert_eq!(command.input.input.as_deref(), Some(std::path::Path::new("req.json")));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_global_config_after_subcommand() {
    let cli = Cli::try_parse_from(["playback-decision", "hash", "--config", "custom.toml"])
        .expect("parse hash");
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("custom.toml")));
    assert!(matches!(cli.command, Some(Commands::Hash(_))));
}

#[test]
fn replay_requires_input() {
    assert!(Cli::try_parse_from(["playback-decision", "replay"]).is_err());
    let cli = Cli::try_parse_from([
        "playback-decision",
        "replay",
        "--input",
        "canonical.json",
        "--expect-hash",
        "abc",
    ])
    .expect("parse replay");
    match cli.command {
        Some(Commands::Replay(command)) => assert_eq!(command.expect_hash.as_deref(), Some("abc")),
        other => panic!("unexpected command: {other:?}"),
    }
}

// ============================================================================
// SECTION: Output Bodies
// ============================================================================

#[test]
fn decide_output_carries_decision_and_hash() {
    let engine = build_engine(&quiet_config());
    let report = engine.decide_bytes(&request_bytes());
    let bytes = render_json(&DecideOutput::from_report(&report), false).expect("render");
    let body: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(body["status"], 200);
    assert_eq!(body["decision"]["mode"], "direct_play");
    assert_eq!(body["schema"], "compact");
    assert_eq!(body["inputHash"].as_str().map(str::len), Some(64));
    assert!(body.get("problem").is_none());
    assert_eq!(bytes.last(), Some(&b'\n'));
}

#[test]
fn decide_output_carries_problem() {
    let engine = build_engine(&quiet_config());
    let report = engine.decide_bytes(b"{}");
    let bytes = render_json(&DecideOutput::from_report(&report), true).expect("render");
    let body: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(body["status"], 400);
    assert_eq!(body["problem"]["code"], "capabilities_invalid");
    assert!(body.get("decision").is_none());
    assert!(body.get("inputHash").is_none());
}

#[test]
fn replay_hash_check_matches_recomputed_hash() {
    let engine = build_engine(&quiet_config());
    let report = engine.decide_bytes(&request_bytes());
    let hash = report.input_hash.clone().expect("hash").value;
    assert!(check_replay_hash(&hash, &report).is_ok());
    assert!(check_replay_hash(&hash.to_uppercase(), &report).is_ok());
    let err = check_replay_hash("deadbeef", &report).expect_err("mismatch");
    assert!(err.to_string().contains("replay hash mismatch"));
}
