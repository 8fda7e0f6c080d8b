// crates/playback-decision-core/src/core/decision.rs
// ============================================================================
// Module: Playback Decision Result Types
// Description: Delivery mode, selected formats, outputs, and rule trace.
// Purpose: Define the success body returned for every answered request.
// Dependencies: serde, crate::core::reason
// ============================================================================

//! ## Overview
//! A [`Decision`] is a well-formed business answer, including a logical
//! `deny`. Outputs carry opaque handles only; the transport layer resolves
//! them into real playback URLs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use serde::Serializer;

use crate::core::reason::ReasonCode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Sentinel used for every selected format of a `deny` decision.
pub const SENTINEL_NONE: &str = "none";

/// Containers eligible for direct play.
pub const DIRECT_PLAY_CONTAINERS: [&str; 3] = ["mp4", "mov", "m4v"];

// ============================================================================
// SECTION: Mode
// ============================================================================

/// Delivery mode chosen by the decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Serve the original file unmodified.
    DirectPlay,
    /// Repackage into a segmented stream without re-encoding.
    DirectStream,
    /// Re-encode into a segmented stream.
    Transcode,
    /// Refuse playback.
    Deny,
}

impl Mode {
    /// Returns a stable label for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DirectPlay => "direct_play",
            Self::DirectStream => "direct_stream",
            Self::Transcode => "transcode",
            Self::Deny => "deny",
        }
    }

    /// Preference rank: direct play > direct stream > transcode > deny.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::DirectPlay => 3,
            Self::DirectStream => 2,
            Self::Transcode => 1,
            Self::Deny => 0,
        }
    }

    /// Returns the delivery protocol implied by the mode.
    #[must_use]
    pub const fn protocol(self) -> Protocol {
        match self {
            Self::DirectPlay => Protocol::Mp4,
            Self::DirectStream | Self::Transcode => Protocol::Hls,
            Self::Deny => Protocol::None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery protocol label used for telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Progressive file delivery.
    Mp4,
    /// Segmented delivery.
    Hls,
    /// No delivery.
    None,
}

impl Protocol {
    /// Returns a stable label for the protocol.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Hls => "hls",
            Self::None => "none",
        }
    }
}

// ============================================================================
// SECTION: Outputs
// ============================================================================

/// Kind of a playback output handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// Static file with range support.
    File,
    /// Segmented playlist.
    Hls,
}

impl OutputKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Hls => "hls",
        }
    }
}

/// Opaque output handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Output {
    /// Output kind.
    pub kind: OutputKind,
    /// Opaque handle resolved by the transport layer.
    pub url: String,
}

/// Formats selected for delivery.
///
/// # Invariants
/// - All three fields equal [`SENTINEL_NONE`] iff the mode is `deny`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedFormats {
    /// Selected container.
    pub container: String,
    /// Selected video codec.
    pub video_codec: String,
    /// Selected audio codec.
    pub audio_codec: String,
}

impl SelectedFormats {
    /// Returns the deny sentinel triple.
    #[must_use]
    pub fn none() -> Self {
        Self {
            container: SENTINEL_NONE.to_string(),
            video_codec: SENTINEL_NONE.to_string(),
            audio_codec: SENTINEL_NONE.to_string(),
        }
    }

    /// Returns true when every field is the deny sentinel.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.container == SENTINEL_NONE
            && self.video_codec == SENTINEL_NONE
            && self.audio_codec == SENTINEL_NONE
    }
}

// ============================================================================
// SECTION: Trace
// ============================================================================

/// Rules visited by the decision table, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RuleHit {
    /// Container membership check.
    #[serde(rename = "rule_container")]
    Container,
    /// Video codec membership check.
    #[serde(rename = "rule_video")]
    Video,
    /// Audio codec membership check.
    #[serde(rename = "rule_audio")]
    Audio,
    /// Transcode fallback considered.
    #[serde(rename = "rule_transcode")]
    Transcode,
    /// Transcode fallback taken.
    #[serde(rename = "rule_transcode_allowed")]
    TranscodeAllowed,
    /// Direct play considered.
    #[serde(rename = "rule_directplay")]
    DirectPlay,
    /// Direct stream considered.
    #[serde(rename = "rule_directstream")]
    DirectStream,
}

impl RuleHit {
    /// Returns a stable label for the rule.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Container => "rule_container",
            Self::Video => "rule_video",
            Self::Audio => "rule_audio",
            Self::Transcode => "rule_transcode",
            Self::TranscodeAllowed => "rule_transcode_allowed",
            Self::DirectPlay => "rule_directplay",
            Self::DirectStream => "rule_directstream",
        }
    }
}

/// Decision trace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    /// Caller correlation identifier, passed through unchanged.
    pub request_id: String,
    /// Rules visited in evaluation order.
    pub rule_hits: Vec<RuleHit>,
    /// One explanation per reason, in reason order.
    pub why: Vec<String>,
}

// ============================================================================
// SECTION: Decision
// ============================================================================

/// Success body for an answered request.
///
/// # Invariants
/// - `reasons` are unique and canonically ordered.
/// - `constraints` is always empty in the current contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    /// Chosen delivery mode.
    pub mode: Mode,
    /// Formats selected for delivery.
    pub selected: SelectedFormats,
    /// Output handles.
    pub outputs: Vec<Output>,
    /// Delivery constraints.
    pub constraints: Vec<String>,
    /// Canonically ordered reasons.
    pub reasons: Vec<ReasonCode>,
    /// Rule trace.
    pub trace: Trace,
    /// Handle of the selected output, empty for deny.
    pub selected_output_url: String,
    /// Kind of the selected output, empty for deny.
    #[serde(serialize_with = "serialize_optional_kind")]
    pub selected_output_kind: Option<OutputKind>,
}

impl Decision {
    /// Returns the primary reason.
    #[must_use]
    pub fn primary_reason(&self) -> Option<ReasonCode> {
        self.reasons.first().copied()
    }
}

/// Serializes an absent output kind as an empty string.
fn serialize_optional_kind<S>(kind: &Option<OutputKind>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(kind.map_or("", OutputKind::as_str))
}
