// crates/playback-decision-core/src/runtime/canonical.rs
// ============================================================================
// Module: Playback Decision Canonical Input
// Description: Semantic canonical form and hash of a decision input.
// Purpose: Support determinism checks, caller-side caching, and offline replay.
// Dependencies: serde, crate::core::hashing, crate::runtime::normalize
// ============================================================================

//! ## Overview
//! The canonical form is the normalized input without the request identifier,
//! written in the compact wire schema with the range flag forced to a boolean.
//! RFC 8785 fixes the key order. The canonical JSON is itself a valid
//! compact request, so feeding it back to the decoder replays the decision.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::DecisionInput;
use crate::core::HashAlgorithm;
use crate::core::HashDigest;
use crate::core::HashError;
use crate::core::hashing::canonical_json_bytes;
use crate::core::hashing::hash_bytes;
use crate::runtime::normalize::normalize_input;

// ============================================================================
// SECTION: Canonical Shapes
// ============================================================================

/// Canonical request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalInput {
    /// API version.
    api: String,
    /// Capabilities.
    caps: CanonicalCaps,
    /// Policy.
    policy: CanonicalPolicy,
    /// Source.
    source: CanonicalSource,
}

/// Canonical source object.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct CanonicalSource {
    /// Container.
    c: String,
    /// Video codec.
    v: String,
    /// Audio codec.
    a: String,
    /// Bitrate in kbps.
    br: i64,
    /// Width.
    w: i64,
    /// Height.
    h: i64,
    /// Frames per second.
    fps: f64,
}

/// Canonical capabilities object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct CanonicalCaps {
    /// Capabilities version, omitted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    v: Option<i64>,
    /// Containers.
    c: Vec<String>,
    /// Video codecs.
    vc: Vec<String>,
    /// Audio codecs.
    ac: Vec<String>,
    /// Segmented delivery support.
    hls: bool,
    /// Range support.
    rng: bool,
    /// Device type.
    dev: String,
    /// Max video dimensions, omitted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    mv: Option<CanonicalMaxVideo>,
}

/// Canonical max video dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
struct CanonicalMaxVideo {
    /// Width.
    w: i64,
    /// Height.
    h: i64,
}

/// Canonical policy object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
struct CanonicalPolicy {
    /// Allow transcode.
    tx: bool,
}

// ============================================================================
// SECTION: Canonicalization
// ============================================================================

/// Builds the canonical form of an input, normalizing it first.
#[must_use]
pub fn canonical_input(input: &DecisionInput) -> CanonicalInput {
    let normalized = normalize_input(input.clone());
    let source = normalized.source;
    let caps = normalized.capabilities;
    CanonicalInput {
        api: normalized.api_version,
        caps: CanonicalCaps {
            v: caps.version,
            c: caps.containers,
            vc: caps.video_codecs,
            ac: caps.audio_codecs,
            hls: caps.supports_hls,
            rng: caps.supports_range.unwrap_or(false),
            dev: caps.device_type,
            mv: caps.max_video.map(|dims| CanonicalMaxVideo {
                w: dims.width,
                h: dims.height,
            }),
        },
        policy: CanonicalPolicy {
            tx: normalized.policy.allow_transcode,
        },
        source: CanonicalSource {
            c: source.container,
            v: source.video_codec,
            a: source.audio_codec,
            br: source.bitrate_kbps,
            w: source.width,
            h: source.height,
            fps: source.fps,
        },
    }
}

/// Returns the canonical JSON bytes of an input.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn canonical_input_json(input: &DecisionInput) -> Result<Vec<u8>, HashError> {
    canonical_json_bytes(&canonical_input(input))
}

/// Returns the semantic hash of an input.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn input_hash(input: &DecisionInput, algorithm: HashAlgorithm) -> Result<HashDigest, HashError> {
    let bytes = canonical_input_json(input)?;
    Ok(hash_bytes(algorithm, &bytes))
}
