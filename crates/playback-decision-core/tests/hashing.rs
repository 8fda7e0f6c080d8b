// crates/playback-decision-core/tests/hashing.rs
// ============================================================================
// Module: Canonical Input Hashing Tests
// Description: Stability and replay of the semantic input hash.
// Purpose: Ensure equivalent requests share one hash and canonical bytes replay.
// ============================================================================

//! ## Overview
//! The semantic hash is computed over RFC 8785 canonical JSON of the
//! normalized input. These tests pin determinism, schema independence,
//! request-id exclusion, and replay of the canonical bytes.

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

use std::collections::HashSet;

use playback_decision_core::DEFAULT_HASH_ALGORITHM;
use playback_decision_core::DecisionInput;
use playback_decision_core::HashAlgorithm;
use playback_decision_core::HashDigest;
use playback_decision_core::canonical_input_json;
use playback_decision_core::core::hashing::hash_bytes;
use playback_decision_core::core::hashing::hash_canonical_json;
use playback_decision_core::decode_decision_input;
use playback_decision_core::evaluate_input;
use playback_decision_core::input_hash;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn decode(value: &Value) -> DecisionInput {
    decode_decision_input(&serde_json::to_vec(value).unwrap()).unwrap()
}

fn hash_of(value: &Value) -> String {
    input_hash(&decode(value), DEFAULT_HASH_ALGORITHM).unwrap().value
}

fn compact_request() -> Value {
    json!({
        "api": "v3.1",
        "rid": "hash-1",
        "source": {"c": "mkv", "v": "h264", "a": "aac", "br": 4000, "w": 1280, "h": 720, "fps": 23.976},
        "caps": {"v": 1, "c": ["mp4", "mkv"], "vc": ["h264"], "ac": ["aac", "opus"], "hls": true, "dev": "tv", "mv": {"w": 1920, "h": 1080}},
        "policy": {"tx": true}
    })
}

// ============================================================================
// SECTION: Stability
// ============================================================================

/// Tests the hash is deterministic and hex encoded.
#[test]
fn hash_is_stable_across_calls() {
    let first = hash_of(&compact_request());
    let second = hash_of(&compact_request());
    assert_eq!(first, second);
    assert_eq!(first.len(), 64);
    assert!(first.chars().all(|ch| ch.is_ascii_hexdigit() && !ch.is_ascii_uppercase()));
}

/// Tests the legacy rendering of a request hashes like the compact one.
#[test]
fn legacy_and_compact_share_a_hash() {
    let legacy = json!({
        "APIVersion": "V3.1",
        "RequestID": "hash-1",
        "Source": {"container": "MKV", "videoCodec": "H264", "audioCodec": "AAC", "bitrateKbps": 4000, "width": 1280, "height": 720, "fps": 23.976},
        "Capabilities": {"version": 1, "containers": ["mkv", "mp4", "mp4"], "videoCodecs": ["h264"], "audioCodecs": ["opus", "aac"], "supportsHls": true, "deviceType": " TV ", "maxVideo": {"width": 1920, "height": 1080}},
        "Policy": {"allowTranscode": true}
    });
    assert_eq!(hash_of(&compact_request()), hash_of(&legacy));
}

#[test]
fn request_id_is_excluded() {
    let mut other = compact_request();
    other["rid"] = json!("a-different-correlation-id");
    assert_eq!(hash_of(&compact_request()), hash_of(&other));
}

#[test]
fn absent_and_false_range_share_a_hash() {
    let mut explicit = compact_request();
    explicit["caps"]["rng"] = json!(false);
    assert_eq!(hash_of(&compact_request()), hash_of(&explicit));
}

#[test]
fn semantic_changes_change_the_hash() {
    let base = hash_of(&compact_request());
    let mut policy = compact_request();
    policy["policy"]["tx"] = json!(false);
    let mut caps = compact_request();
    caps["caps"]["vc"] = json!(["h264", "hevc"]);
    let mut dims = compact_request();
    dims["caps"]["mv"]["w"] = json!(3840);
    assert_ne!(base, hash_of(&policy));
    assert_ne!(base, hash_of(&caps));
    assert_ne!(base, hash_of(&dims));
}

// ============================================================================
// SECTION: Canonical Bytes
// ============================================================================

/// Tests canonical bytes use sorted compact keys and normalized values.
#[test]
fn canonical_bytes_are_sorted_compact_json() {
    let bytes = canonical_input_json(&decode(&compact_request())).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.starts_with(r#"{"api":"v3.1","caps":{"ac":["aac","opus"],"c":["mkv","mp4"],"dev":"tv","#), "{text}");
    assert!(!text.contains("hash-1"));
    assert!(!text.contains(' '));
}

/// Tests canonical bytes decode and replay to the same decision.
#[test]
fn canonical_bytes_replay_to_the_same_decision() {
    let input = decode(&compact_request());
    let canonical = canonical_input_json(&input).unwrap();
    let replayed = decode_decision_input(&canonical).unwrap();
    assert_eq!(
        input_hash(&replayed, DEFAULT_HASH_ALGORITHM).unwrap(),
        input_hash(&input, DEFAULT_HASH_ALGORITHM).unwrap()
    );

    let original = evaluate_input(input, DEFAULT_HASH_ALGORITHM).unwrap();
    let replay = evaluate_input(replayed, DEFAULT_HASH_ALGORITHM).unwrap();
    assert_eq!(original.mode, replay.mode);
    assert_eq!(original.reasons, replay.reasons);
    assert_eq!(original.selected, replay.selected);
    assert_eq!(original.outputs, replay.outputs);
}

// ============================================================================
// SECTION: Hash Helpers
// ============================================================================

#[test]
fn sha256_matches_known_vector() {
    let digest = hash_bytes(HashAlgorithm::Sha256, b"abc");
    assert_eq!(digest.value, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    assert_eq!(digest.to_string(), digest.value);
}

#[test]
fn digests_deduplicate_in_hash_sets() {
    let digests: HashSet<HashDigest> = [b"abc".as_slice(), b"abc", b"abd"]
        .into_iter()
        .map(|bytes| hash_bytes(HashAlgorithm::Sha256, bytes))
        .collect();
    assert_eq!(digests.len(), 2);
}

#[test]
fn canonical_json_ignores_key_order() {
    let a = hash_canonical_json(DEFAULT_HASH_ALGORITHM, &json!({"b": 1, "a": [2, 3]})).unwrap();
    let b = hash_canonical_json(DEFAULT_HASH_ALGORITHM, &json!({"a": [2, 3], "b": 1})).unwrap();
    assert_eq!(a, b);
}
