// crates/playback-decision-core/src/core/input.rs
// ============================================================================
// Module: Playback Decision Input Types
// Description: Source truth, client capabilities, and server policy.
// Purpose: Provide the typed request model consumed by the decision engine.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`DecisionInput`] bundles the three truths the engine negotiates between:
//! media truth ([`Source`]), client truth ([`Capabilities`]) and server truth
//! ([`Policy`]). Values arrive from the wire decoder in raw form and are
//! rewritten in place by the normalizer before any predicate sees them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

// ============================================================================
// SECTION: Source
// ============================================================================

/// Media truth produced by the probing stage.
///
/// # Invariants
/// - Fields are never mutated by the engine after normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Container format (e.g. `mp4`, `mkv`, `ts`).
    pub container: String,
    /// Video codec (e.g. `h264`, `hevc`).
    pub video_codec: String,
    /// Audio codec (e.g. `aac`, `ac3`).
    pub audio_codec: String,
    /// Bitrate in kilobits per second.
    pub bitrate_kbps: i64,
    /// Frame width in pixels.
    pub width: i64,
    /// Frame height in pixels.
    pub height: i64,
    /// Frames per second.
    pub fps: f64,
}

// ============================================================================
// SECTION: Capabilities
// ============================================================================

/// Maximum video dimensions declared by a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MaxVideoDimensions {
    /// Maximum frame width in pixels.
    pub width: i64,
    /// Maximum frame height in pixels.
    pub height: i64,
}

/// Client-declared playback capabilities.
///
/// # Invariants
/// - `version` is `None` only when the wire payload omitted it.
/// - `supports_range` keeps the absent/false/true distinction until normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// Capabilities contract version.
    pub version: Option<i64>,
    /// Supported containers.
    pub containers: Vec<String>,
    /// Supported video codecs.
    pub video_codecs: Vec<String>,
    /// Supported audio codecs.
    pub audio_codecs: Vec<String>,
    /// Client accepts segmented (HLS) delivery.
    pub supports_hls: bool,
    /// Client supports byte-range requests.
    pub supports_range: Option<bool>,
    /// Maximum decodable video dimensions.
    pub max_video: Option<MaxVideoDimensions>,
    /// Free-form device classification.
    pub device_type: String,
}

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Server-controlled playback policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Whether re-encoding is permitted.
    pub allow_transcode: bool,
}

// ============================================================================
// SECTION: Decision Input
// ============================================================================

/// Complete input to a single decision call.
///
/// # Invariants
/// - `request_id` is trace-only and never participates in semantic equality.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionInput {
    /// Media truth.
    pub source: Source,
    /// Client truth.
    pub capabilities: Capabilities,
    /// Server truth.
    pub policy: Policy,
    /// Requested API contract version.
    pub api_version: String,
    /// Caller correlation identifier.
    pub request_id: String,
}

impl DecisionInput {
    /// Returns true when both inputs are equal ignoring the request identifier.
    #[must_use]
    pub fn semantically_eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.capabilities == other.capabilities
            && self.policy == other.policy
            && self.api_version == other.api_version
    }
}
