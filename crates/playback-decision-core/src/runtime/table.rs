// crates/playback-decision-core/src/runtime/table.rs
// ============================================================================
// Module: Playback Decision Table
// Description: Ordered first-match rules producing a mode, reasons, and a rule trace.
// Purpose: Choose the most preferred deliverable mode and explain the choice.
// Dependencies: crate::core, crate::runtime::predicates
// ============================================================================

//! ## Overview
//! Evaluation order:
//! 1. Record container, video, and audio mismatches, plus missing segmented
//!    delivery. A container mismatch never short-circuits.
//! 2. A codec mismatch leads to `transcode` when possible, otherwise `deny`.
//! 3. `direct_play`, then `direct_stream`, each with a single success reason.
//! 4. `transcode` when needed and possible.
//! 5. `deny`, with `no_compatible_playback_path` when nothing else explains it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::DecisionInput;
use crate::core::Mode;
use crate::core::ReasonCode;
use crate::core::RuleHit;
use crate::core::canonical_reasons;
use crate::runtime::predicates::Predicates;

// ============================================================================
// SECTION: Table Outcome
// ============================================================================

/// Result of a decision table evaluation.
///
/// # Invariants
/// - `reasons` are unique and canonically ordered.
/// - `reasons` is non-empty for every mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOutcome {
    /// Selected mode.
    pub mode: Mode,
    /// Canonically ordered reasons.
    pub reasons: Vec<ReasonCode>,
    /// Rules visited in evaluation order.
    pub rule_hits: Vec<RuleHit>,
}

/// Accumulates reasons and rule hits during evaluation.
struct TableRun {
    /// Reasons recorded so far.
    reasons: Vec<ReasonCode>,
    /// Rules visited so far.
    rule_hits: Vec<RuleHit>,
}

impl TableRun {
    /// Finishes with the given mode and accumulated reasons.
    fn finish(self, mode: Mode) -> TableOutcome {
        let mut reasons = canonical_reasons(self.reasons);
        if reasons.is_empty() {
            reasons.push(ReasonCode::NoCompatiblePlaybackPath);
        }
        TableOutcome {
            mode,
            reasons,
            rule_hits: self.rule_hits,
        }
    }

    /// Finishes with a single success reason.
    fn succeed(self, mode: Mode, reason: ReasonCode) -> TableOutcome {
        TableOutcome {
            mode,
            reasons: vec![reason],
            rule_hits: self.rule_hits,
        }
    }

    /// Finishes with `deny`, adding the policy reason when policy forbids transcoding.
    fn deny(mut self, allow_transcode: bool) -> TableOutcome {
        if !allow_transcode {
            self.reasons.push(ReasonCode::PolicyDeniesTranscode);
        }
        self.finish(Mode::Deny)
    }
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Evaluates the decision table for a normalized input and its predicates.
#[must_use]
pub fn evaluate_table(input: &DecisionInput, predicates: &Predicates) -> TableOutcome {
    let allow_transcode = input.policy.allow_transcode;
    let mut run = TableRun {
        reasons: Vec::new(),
        rule_hits: vec![RuleHit::Container, RuleHit::Video, RuleHit::Audio],
    };
    if !predicates.can_container {
        run.reasons.push(ReasonCode::ContainerNotSupported);
    }
    if !predicates.can_video {
        run.reasons.push(ReasonCode::VideoCodecNotSupported);
    }
    if !predicates.can_audio {
        run.reasons.push(ReasonCode::AudioCodecNotSupported);
    }
    if !input.capabilities.supports_hls {
        run.reasons.push(ReasonCode::HlsNotSupported);
    }

    if !predicates.can_video || !predicates.can_audio {
        run.rule_hits.push(RuleHit::Transcode);
        if predicates.transcode_possible {
            run.rule_hits.push(RuleHit::TranscodeAllowed);
            return run.finish(Mode::Transcode);
        }
        return run.deny(allow_transcode);
    }

    run.rule_hits.push(RuleHit::DirectPlay);
    if predicates.direct_play_possible {
        return run.succeed(Mode::DirectPlay, ReasonCode::DirectPlayMatch);
    }
    run.rule_hits.push(RuleHit::DirectStream);
    if predicates.direct_stream_possible {
        return run.succeed(Mode::DirectStream, ReasonCode::DirectStreamMatch);
    }
    run.rule_hits.push(RuleHit::Transcode);
    if predicates.transcode_needed && predicates.transcode_possible {
        run.rule_hits.push(RuleHit::TranscodeAllowed);
        return run.finish(Mode::Transcode);
    }
    run.deny(allow_transcode)
}
