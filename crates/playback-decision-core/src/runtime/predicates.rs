// crates/playback-decision-core/src/runtime/predicates.rs
// ============================================================================
// Module: Playback Decision Predicates
// Description: Compatibility matrix between source truth and client capabilities.
// Purpose: Derive the booleans the decision table branches on.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Predicates are a pure function of normalized input. Membership compares
//! normalized strings, so callers must normalize first. `max_video` is carried
//! on the input but no predicate consults it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::DIRECT_PLAY_CONTAINERS;
use crate::core::DecisionInput;

// ============================================================================
// SECTION: Predicates
// ============================================================================

/// Derived compatibility booleans.
#[allow(clippy::struct_excessive_bools, reason = "Predicates are a flat boolean matrix.")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Predicates {
    /// Source container is in the client set.
    pub can_container: bool,
    /// Source video codec is in the client set.
    pub can_video: bool,
    /// Source audio codec is in the client set.
    pub can_audio: bool,
    /// Unmodified file delivery is possible.
    pub direct_play_possible: bool,
    /// Repackaged segmented delivery is possible.
    pub direct_stream_possible: bool,
    /// Re-encoding is required to play at all.
    pub transcode_needed: bool,
    /// Re-encoding is permitted and deliverable.
    pub transcode_possible: bool,
}

/// Evaluates predicates for a normalized input.
#[must_use]
pub fn evaluate_predicates(input: &DecisionInput) -> Predicates {
    let source = &input.source;
    let caps = &input.capabilities;
    let can_container = contains(&caps.containers, &source.container);
    let can_video = contains(&caps.video_codecs, &source.video_codec);
    let can_audio = contains(&caps.audio_codecs, &source.audio_codec);
    let direct_play_possible = can_container
        && can_video
        && can_audio
        && DIRECT_PLAY_CONTAINERS.contains(&source.container.as_str())
        && caps.supports_range == Some(true);
    let direct_stream_possible = caps.supports_hls && can_video && can_audio;
    let transcode_needed =
        !can_video || !can_audio || (!direct_play_possible && !direct_stream_possible);
    let transcode_possible = input.policy.allow_transcode && caps.supports_hls;
    Predicates {
        can_container,
        can_video,
        can_audio,
        direct_play_possible,
        direct_stream_possible,
        transcode_needed,
        transcode_possible,
    }
}

/// Membership over a normalized list.
fn contains(values: &[String], needle: &str) -> bool {
    values.iter().any(|value| value == needle)
}
