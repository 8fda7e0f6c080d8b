// crates/playback-decision-core/tests/scenarios.rs
// ============================================================================
// Module: Decision Scenario Tests
// Description: End-to-end scenarios through the engine over wire bytes.
// Purpose: Pin mode selection, reason order, output shape, and status mapping.
// ============================================================================

//! ## Overview
//! Covers the canonical playback scenarios (direct play, direct stream,
//! policy deny, permutation stability, mixed schema, missing capabilities)
//! plus the full status mapping and the deny body shape.

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

use playback_decision_core::Decision;
use playback_decision_core::DecisionEngine;
use playback_decision_core::DecisionReport;
use playback_decision_core::EngineConfig;
use playback_decision_core::Mode;
use playback_decision_core::NoopObserver;
use playback_decision_core::OutputKind;
use playback_decision_core::Problem;
use playback_decision_core::ProblemCode;
use playback_decision_core::ReasonCode;
use playback_decision_core::RuleHit;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn run(request: &Value) -> DecisionReport {
    let engine = DecisionEngine::new(NoopObserver, EngineConfig::default());
    engine.decide_bytes(&serde_json::to_vec(request).unwrap())
}

fn decision(request: &Value) -> Decision {
    let report = run(request);
    assert_eq!(report.status(), 200, "{:?}", report.outcome);
    report.outcome.into_result().unwrap()
}

fn problem(request: &Value) -> Problem {
    run(request).outcome.into_result().unwrap_err()
}

fn request(source: &Value, caps: &Value, allow_transcode: bool) -> Value {
    json!({
        "api": "v3.1",
        "rid": "scenario",
        "source": source,
        "caps": caps,
        "policy": {"tx": allow_transcode}
    })
}

fn mp4_h264_aac() -> Value {
    json!({"c": "mp4", "v": "h264", "a": "aac", "br": 5000, "w": 1920, "h": 1080, "fps": 25})
}

// ============================================================================
// SECTION: Canonical Scenarios
// ============================================================================

/// Scenario A: fully compatible progressive file with range support.
#[test]
fn scenario_a_direct_play() {
    let caps = json!({"v": 1, "c": ["mp4"], "vc": ["h264"], "ac": ["aac"], "rng": true});
    let decision = decision(&request(&mp4_h264_aac(), &caps, false));
    assert_eq!(decision.mode, Mode::DirectPlay);
    assert_eq!(decision.reasons, vec![ReasonCode::DirectPlayMatch]);
    assert_eq!(decision.selected_output_kind, Some(OutputKind::File));
    assert_eq!(decision.selected_output_url, "placeholder://file");
    assert_eq!(decision.outputs.len(), 1);
    assert_eq!(decision.selected.container, "mp4");
    assert_eq!(decision.selected.video_codec, "h264");
    assert_eq!(decision.selected.audio_codec, "aac");
    assert_eq!(decision.trace.request_id, "scenario");
    assert_eq!(decision.trace.why.len(), 1);
}

/// Scenario B: container mismatch with segmented support repackages.
#[test]
fn scenario_b_direct_stream() {
    let caps = json!({"v": 1, "c": ["mkv"], "vc": ["h264"], "ac": ["aac"], "hls": true});
    let decision = decision(&request(&mp4_h264_aac(), &caps, false));
    assert_eq!(decision.mode, Mode::DirectStream);
    assert_eq!(decision.reasons, vec![ReasonCode::DirectStreamMatch]);
    assert_eq!(decision.selected_output_kind, Some(OutputKind::Hls));
    assert_eq!(decision.selected_output_url, "placeholder://hls");
    assert_eq!(
        decision.trace.rule_hits,
        vec![
            RuleHit::Container,
            RuleHit::Video,
            RuleHit::Audio,
            RuleHit::DirectPlay,
            RuleHit::DirectStream
        ]
    );
}

/// Scenario C: codec mismatch under a no-transcode policy denies.
#[test]
fn scenario_c_policy_deny() {
    let source = json!({"c": "mp4", "v": "hevc", "a": "aac"});
    let caps = json!({"v": 1, "c": ["mp4"], "vc": ["h264"], "ac": ["aac"]});
    let decision = decision(&request(&source, &caps, false));
    assert_eq!(decision.mode, Mode::Deny);
    assert_eq!(
        decision.reasons,
        vec![
            ReasonCode::PolicyDeniesTranscode,
            ReasonCode::HlsNotSupported,
            ReasonCode::VideoCodecNotSupported,
        ]
    );
    assert_eq!(decision.primary_reason(), Some(ReasonCode::PolicyDeniesTranscode));
    assert!(decision.selected.is_none());
    assert!(decision.outputs.is_empty());
    assert_eq!(decision.selected_output_url, "");
    assert_eq!(decision.selected_output_kind, None);
}

/// Scenario D: permuted and duplicated capability lists change nothing.
#[test]
fn scenario_d_permutation_is_stable() {
    let caps_a = json!({"v": 1, "c": ["mp4", "mkv"], "vc": ["h264", "hevc"], "ac": ["aac"], "hls": true, "rng": true});
    let caps_b = json!({"v": 1, "c": ["MKV", "mkv", " mp4 "], "vc": ["hevc", "H264", "h264"], "ac": ["aac", "AAC"], "hls": true, "rng": true});
    let report_a = run(&request(&mp4_h264_aac(), &caps_a, true));
    let report_b = run(&request(&mp4_h264_aac(), &caps_b, true));
    assert_eq!(report_a.outcome, report_b.outcome);
    assert!(report_a.input_hash.is_some());
    assert_eq!(report_a.input_hash, report_b.input_hash);
}

/// Tests an interior no-break space decides and hashes like a zero width space.
#[test]
fn interior_no_break_space_is_canonical() {
    let reports: Vec<DecisionReport> = ["h264", "h\u{200B}264", "h\u{00A0}264"]
        .into_iter()
        .map(|codec| {
            let mut source = mp4_h264_aac();
            source["v"] = json!(codec);
            let caps = json!({"v": 1, "c": ["mp4"], "vc": [codec], "ac": ["a\u{00A0}ac"], "rng": true});
            run(&request(&source, &caps, false))
        })
        .collect();
    for report in &reports {
        assert_eq!(report.status(), 200);
        assert_eq!(report.outcome, reports[0].outcome);
        assert_eq!(report.input_hash, reports[0].input_hash);
    }
    assert_eq!(reports[0].outcome.decision().map(|decision| decision.mode), Some(Mode::DirectPlay));
}

/// Scenario E: compact and legacy source at the root is a mixed schema.
#[test]
fn scenario_e_mixed_schema() {
    let mut body = request(&mp4_h264_aac(), &json!({"v": 1}), false);
    body["Source"] = json!({"container": "mp4"});
    let problem = problem(&body);
    assert_eq!(problem.status, 400);
    assert_eq!(problem.code, ProblemCode::CapabilitiesInvalid);
    assert!(problem.detail.contains("Mixed schema"));
}

/// Scenario F: a v3.x request without a capabilities version is 412.
#[test]
fn scenario_f_capabilities_missing() {
    let caps = json!({"c": ["mp4"], "vc": ["h264"], "ac": ["aac"]});
    let problem = problem(&request(&mp4_h264_aac(), &caps, false));
    assert_eq!(problem.status, 412);
    assert_eq!(problem.code, ProblemCode::CapabilitiesMissing);
}

// ============================================================================
// SECTION: Mode Selection
// ============================================================================

#[test]
fn codec_mismatch_transcodes_when_allowed() {
    let source = json!({"c": "mkv", "v": "hevc", "a": "ac3"});
    let caps = json!({"v": 1, "c": ["mp4"], "vc": ["h264"], "ac": ["aac"], "hls": true});
    let decision = decision(&request(&source, &caps, true));
    assert_eq!(decision.mode, Mode::Transcode);
    assert_eq!(
        decision.reasons,
        vec![
            ReasonCode::AudioCodecNotSupported,
            ReasonCode::ContainerNotSupported,
            ReasonCode::VideoCodecNotSupported,
        ]
    );
    assert_eq!(decision.selected_output_kind, Some(OutputKind::Hls));
    assert_eq!(decision.selected.video_codec, "hevc");
    assert!(decision.trace.rule_hits.contains(&RuleHit::TranscodeAllowed));
}

#[test]
fn transcode_requires_segmented_delivery() {
    let source = json!({"c": "mp4", "v": "hevc", "a": "aac"});
    let caps = json!({"v": 1, "c": ["mp4"], "vc": ["h264"], "ac": ["aac"], "hls": false});
    let decision = decision(&request(&source, &caps, true));
    assert_eq!(decision.mode, Mode::Deny);
    assert_eq!(
        decision.reasons,
        vec![ReasonCode::HlsNotSupported, ReasonCode::VideoCodecNotSupported]
    );
}

#[test]
fn absent_range_blocks_direct_play() {
    let caps = json!({"v": 1, "c": ["mp4"], "vc": ["h264"], "ac": ["aac"], "hls": true});
    let decision = decision(&request(&mp4_h264_aac(), &caps, false));
    assert_eq!(decision.mode, Mode::DirectStream);
}

#[test]
fn non_progressive_container_never_direct_plays() {
    let source = json!({"c": "mkv", "v": "h264", "a": "aac"});
    let caps = json!({"v": 1, "c": ["mkv"], "vc": ["h264"], "ac": ["aac"], "rng": true});
    let decision = decision(&request(&source, &caps, true));
    assert_eq!(decision.mode, Mode::Deny);
    assert_eq!(decision.reasons, vec![ReasonCode::HlsNotSupported]);
}

#[test]
fn container_mismatch_without_segmented_support_denies_with_policy() {
    let caps = json!({"v": 1, "c": ["mkv"], "vc": ["h264"], "ac": ["aac"], "rng": true});
    let decision = decision(&request(&mp4_h264_aac(), &caps, false));
    assert_eq!(decision.mode, Mode::Deny);
    assert_eq!(
        decision.reasons,
        vec![
            ReasonCode::PolicyDeniesTranscode,
            ReasonCode::ContainerNotSupported,
            ReasonCode::HlsNotSupported,
        ]
    );
}

#[test]
fn direct_play_wins_over_direct_stream() {
    let caps = json!({"v": 1, "c": ["mp4"], "vc": ["h264"], "ac": ["aac"], "hls": true, "rng": true});
    let decision = decision(&request(&mp4_h264_aac(), &caps, true));
    assert_eq!(decision.mode, Mode::DirectPlay);
}

#[test]
fn legacy_request_decides_like_compact() {
    let compact = request(
        &mp4_h264_aac(),
        &json!({"v": 1, "c": ["mp4"], "vc": ["h264"], "ac": ["aac"], "rng": true}),
        false,
    );
    let legacy = json!({
        "APIVersion": "v3.1",
        "RequestID": "scenario",
        "Source": {"container": "mp4", "videoCodec": "h264", "audioCodec": "aac", "bitrateKbps": 5000, "width": 1920, "height": 1080, "fps": 25},
        "Capabilities": {"version": 1, "containers": ["mp4"], "videoCodecs": ["h264"], "audioCodecs": ["aac"], "supportsRange": true},
        "Policy": {"allowTranscode": false}
    });
    let compact_report = run(&compact);
    let legacy_report = run(&legacy);
    assert_eq!(compact_report.outcome, legacy_report.outcome);
    assert_eq!(compact_report.input_hash, legacy_report.input_hash);
}

// ============================================================================
// SECTION: Status Mapping
// ============================================================================

#[test]
fn missing_api_version_is_400() {
    let mut body = request(&mp4_h264_aac(), &json!({"v": 1}), false);
    body.as_object_mut().unwrap().remove("api");
    let problem = problem(&body);
    assert_eq!(problem.status, 400);
    assert!(problem.detail.contains("api"));
    assert!(problem.detail.contains("required"));
}

#[test]
fn unsupported_api_version_is_400() {
    let mut body = request(&mp4_h264_aac(), &json!({"v": 1}), false);
    body["api"] = json!("v2");
    assert_eq!(problem(&body).status, 400);
}

#[test]
fn api_version_is_normalized_before_validation() {
    let mut body = request(&mp4_h264_aac(), &json!({"v": 1, "hls": true, "vc": ["h264"], "ac": ["aac"]}), false);
    body["api"] = json!("  V3.0\u{00A0}");
    assert_eq!(run(&body).status(), 200);
}

#[test]
fn unsupported_capabilities_version_is_400() {
    let problem = problem(&request(&mp4_h264_aac(), &json!({"v": 2}), false));
    assert_eq!(problem.status, 400);
    assert_eq!(problem.code, ProblemCode::CapabilitiesInvalid);
}

#[test]
fn ambiguous_source_is_422() {
    for (field, value) in [("c", "unknown"), ("v", ""), ("a", " NULL "), ("c", "None")] {
        let mut source = mp4_h264_aac();
        source[field] = json!(value);
        let problem = problem(&request(&source, &json!({"v": 1}), true));
        assert_eq!(problem.status, 422, "{field}={value}");
        assert_eq!(problem.code, ProblemCode::DecisionAmbiguous);
    }
}

#[test]
fn incompatible_but_valid_input_is_answered() {
    let caps = json!({"v": 1});
    let report = run(&request(&mp4_h264_aac(), &caps, false));
    assert_eq!(report.status(), 200);
    let decision = report.outcome.into_result().unwrap();
    assert_eq!(decision.mode, Mode::Deny);
    assert!(!decision.reasons.is_empty());
}

#[test]
fn validation_order_prefers_missing_caps_over_ambiguous_source() {
    let source = json!({"c": "unknown"});
    let problem = problem(&request(&source, &json!({}), false));
    assert_eq!(problem.status, 412);
}

// ============================================================================
// SECTION: Wire Shape
// ============================================================================

#[test]
fn deny_body_uses_sentinels_and_empty_handles() {
    let caps = json!({"v": 1});
    let report = run(&request(&mp4_h264_aac(), &caps, false));
    let body = serde_json::to_value(&report.outcome).unwrap();
    assert_eq!(body["mode"], "deny");
    assert_eq!(body["selected"], json!({"container": "none", "videoCodec": "none", "audioCodec": "none"}));
    assert_eq!(body["outputs"], json!([]));
    assert_eq!(body["constraints"], json!([]));
    assert_eq!(body["selectedOutputUrl"], "");
    assert_eq!(body["selectedOutputKind"], "");
    assert_eq!(body["reasons"][0], "policy_denies_transcode");
    assert_eq!(body["trace"]["requestId"], "scenario");
    assert_eq!(body["trace"]["ruleHits"][0], "rule_container");
}

#[test]
fn problem_body_uses_problem_details_shape() {
    let report = run(&json!({"api": "v3", "bogus": true}));
    let body = serde_json::to_value(&report.outcome).unwrap();
    assert_eq!(body["type"], "playback/capabilities-invalid");
    assert_eq!(body["status"], 400);
    assert_eq!(body["code"], "capabilities_invalid");
    assert_eq!(body["title"], "Unknown Root Key");
    assert!(report.input_hash.is_none());
}
