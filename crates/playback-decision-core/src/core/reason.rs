// crates/playback-decision-core/src/core/reason.rs
// ============================================================================
// Module: Playback Decision Reason Vocabulary
// Description: Closed, versioned reason codes with a fixed total order.
// Purpose: Explain every decision with stable, sortable machine codes.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Reason codes form a frozen vocabulary. Ordering is tier first (policy
//! denial, capability mismatch, generic fallback, success) and then the wire
//! string, which makes the first element of a sorted list the primary reason.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Version of the reason vocabulary. Bumped whenever a code is added or renamed.
pub const REASON_VOCABULARY_VERSION: u32 = 1;

// ============================================================================
// SECTION: Reason Codes
// ============================================================================

/// Closed set of decision reasons.
///
/// # Invariants
/// - Wire strings are stable across releases of the same vocabulary version.
/// - `Ord` is a total order consistent with [`ReasonCode::tier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReasonCode {
    /// Policy forbids transcoding.
    #[serde(rename = "policy_denies_transcode")]
    PolicyDeniesTranscode,
    /// Source container is not in the client's container set.
    #[serde(rename = "container_not_supported_by_client")]
    ContainerNotSupported,
    /// Source video codec is not in the client's video codec set.
    #[serde(rename = "video_codec_not_supported_by_client")]
    VideoCodecNotSupported,
    /// Source audio codec is not in the client's audio codec set.
    #[serde(rename = "audio_codec_not_supported_by_client")]
    AudioCodecNotSupported,
    /// Client does not accept segmented delivery.
    #[serde(rename = "hls_not_supported_by_client")]
    HlsNotSupported,
    /// No delivery path is available.
    #[serde(rename = "no_compatible_playback_path")]
    NoCompatiblePlaybackPath,
    /// Original file can be served unmodified.
    #[serde(rename = "directplay_match")]
    DirectPlayMatch,
    /// Source can be repackaged without re-encoding.
    #[serde(rename = "directstream_match")]
    DirectStreamMatch,
}

/// Priority tier of a reason code. Lower tiers sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReasonTier {
    /// Policy denial.
    PolicyDenial = 0,
    /// Capability mismatch.
    CapabilityMismatch = 1,
    /// Generic fallback.
    Fallback = 2,
    /// Success.
    Success = 3,
}

impl ReasonCode {
    /// Every code in the vocabulary, in sorted order.
    pub const ALL: [Self; 8] = [
        Self::PolicyDeniesTranscode,
        Self::AudioCodecNotSupported,
        Self::ContainerNotSupported,
        Self::HlsNotSupported,
        Self::VideoCodecNotSupported,
        Self::NoCompatiblePlaybackPath,
        Self::DirectPlayMatch,
        Self::DirectStreamMatch,
    ];

    /// Returns the stable wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PolicyDeniesTranscode => "policy_denies_transcode",
            Self::ContainerNotSupported => "container_not_supported_by_client",
            Self::VideoCodecNotSupported => "video_codec_not_supported_by_client",
            Self::AudioCodecNotSupported => "audio_codec_not_supported_by_client",
            Self::HlsNotSupported => "hls_not_supported_by_client",
            Self::NoCompatiblePlaybackPath => "no_compatible_playback_path",
            Self::DirectPlayMatch => "directplay_match",
            Self::DirectStreamMatch => "directstream_match",
        }
    }

    /// Returns the priority tier.
    #[must_use]
    pub const fn tier(self) -> ReasonTier {
        match self {
            Self::PolicyDeniesTranscode => ReasonTier::PolicyDenial,
            Self::ContainerNotSupported
            | Self::VideoCodecNotSupported
            | Self::AudioCodecNotSupported
            | Self::HlsNotSupported => ReasonTier::CapabilityMismatch,
            Self::NoCompatiblePlaybackPath => ReasonTier::Fallback,
            Self::DirectPlayMatch | Self::DirectStreamMatch => ReasonTier::Success,
        }
    }

    /// Returns a human-readable explanation for trace output.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::PolicyDeniesTranscode => "server policy does not allow transcoding",
            Self::ContainerNotSupported => "source container is not supported by the client",
            Self::VideoCodecNotSupported => "source video codec is not supported by the client",
            Self::AudioCodecNotSupported => "source audio codec is not supported by the client",
            Self::HlsNotSupported => "client does not accept segmented delivery",
            Self::NoCompatiblePlaybackPath => "no compatible playback path exists",
            Self::DirectPlayMatch => "source file can be played directly",
            Self::DirectStreamMatch => "source can be repackaged without re-encoding",
        }
    }
}

impl Ord for ReasonCode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tier().cmp(&other.tier()).then_with(|| self.as_str().cmp(other.as_str()))
    }
}

impl PartialOrd for ReasonCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Ordering Helpers
// ============================================================================

/// Deduplicates and sorts reasons into their canonical order.
#[must_use]
pub fn canonical_reasons<I>(reasons: I) -> Vec<ReasonCode>
where
    I: IntoIterator<Item = ReasonCode>,
{
    reasons.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Returns the primary reason of a canonically ordered list.
#[must_use]
pub fn primary_reason(reasons: &[ReasonCode]) -> Option<ReasonCode> {
    reasons.first().copied()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
