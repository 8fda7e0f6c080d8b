// crates/playback-decision-core/src/runtime/invariants.rs
// ============================================================================
// Module: Playback Decision Invariant Validator
// Description: Post-hoc structural self-check of every produced decision.
// Purpose: Refuse to ship an internally contradictory decision.
// Dependencies: thiserror, tracing, crate::core, crate::runtime::canonical
// ============================================================================

//! ## Overview
//! The validator runs last. It first clears any output fields a `deny`
//! decision must not carry, then checks every structural guarantee of the
//! decision contract. A breach becomes a 500 `invariant_violation` problem and
//! is never downgraded to `deny`. The canonical input JSON is logged so the
//! failure can be replayed offline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::DIRECT_PLAY_CONTAINERS;
use crate::core::Decision;
use crate::core::DecisionInput;
use crate::core::HashAlgorithm;
use crate::core::Mode;
use crate::core::OutputKind;
use crate::core::Problem;
use crate::core::SENTINEL_NONE;
use crate::core::SelectedFormats;
use crate::core::canonical_reasons;
use crate::runtime::canonical::canonical_input_json;
use crate::runtime::canonical::input_hash;

// ============================================================================
// SECTION: Violations
// ============================================================================

/// Structural guarantee broken by a decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// Deny did not select the sentinel triple.
    #[error("deny decision must select the none sentinel")]
    DenySentinel,
    /// Deny carried an output, URL, or kind.
    #[error("deny decision must not carry outputs")]
    DenyOutputs,
    /// A playable mode selected the sentinel.
    #[error("{0} decision must not select the none sentinel")]
    SentinelOutsideDeny(Mode),
    /// A playable mode has no single output matching the selected URL and kind.
    #[error("{0} decision must carry exactly one output matching the selected url and kind")]
    OutputMismatch(Mode),
    /// Output kind does not match the mode.
    #[error("{mode} decision must use output kind {expected}")]
    OutputKind {
        /// Decision mode.
        mode: Mode,
        /// Required kind.
        expected: &'static str,
    },
    /// Direct play without explicit range support.
    #[error("direct_play requires explicit range support")]
    DirectPlayRange,
    /// Direct play with a container outside the progressive family.
    #[error("direct_play requires a container in mp4, mov, or m4v")]
    DirectPlayContainer,
    /// Direct play with formats the client did not declare.
    #[error("direct_play formats must be declared by the client")]
    DirectPlayCapabilities,
    /// Deny or transcode without reasons.
    #[error("{0} decision must carry at least one reason")]
    EmptyReasons(Mode),
    /// Reasons are duplicated or out of order.
    #[error("reasons must be unique and canonically ordered")]
    UnorderedReasons,
    /// Constraints were populated.
    #[error("constraints must be empty")]
    Constraints,
    /// Trace explanations do not line up with reasons.
    #[error("trace must carry one explanation per reason")]
    TraceWhy,
    /// Trace request id differs from the input.
    #[error("trace request id must echo the input request id")]
    TraceRequestId,
}

// ============================================================================
// SECTION: Enforcement
// ============================================================================

/// Clears every output field of a `deny` decision.
pub fn force_clean_deny(decision: &mut Decision) {
    if decision.mode == Mode::Deny {
        decision.selected = SelectedFormats::none();
        decision.outputs.clear();
        decision.selected_output_url.clear();
        decision.selected_output_kind = None;
    }
}

/// Cleans and checks a decision, escalating any breach to a 500 problem.
///
/// # Errors
///
/// Returns an `invariant_violation` [`Problem`] when a guarantee is broken.
pub fn enforce_invariants(
    input: &DecisionInput,
    mut decision: Decision,
    algorithm: HashAlgorithm,
) -> Result<Decision, Problem> {
    force_clean_deny(&mut decision);
    match check_invariants(input, &decision) {
        Ok(()) => Ok(decision),
        Err(violation) => Err(violation_problem(input, &violation, algorithm)),
    }
}

/// Builds the problem for a violation and logs the replay artifact.
fn violation_problem(
    input: &DecisionInput,
    violation: &InvariantViolation,
    algorithm: HashAlgorithm,
) -> Problem {
    let hash = input_hash(input, algorithm)
        .map_or_else(|_| "unavailable".to_string(), |digest| digest.value);
    let canonical = canonical_input_json(input)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default();
    tracing::error!(
        violation = %violation,
        input_hash = %hash,
        canonical_input = %canonical,
        "decision invariant violated"
    );
    Problem::invariant(format!("Fail-Closed: {violation} (input {hash})"))
}

/// Checks every structural guarantee of a decision.
///
/// # Errors
///
/// Returns the first [`InvariantViolation`] found.
pub fn check_invariants(
    input: &DecisionInput,
    decision: &Decision,
) -> Result<(), InvariantViolation> {
    if decision.mode == Mode::Deny {
        if !decision.selected.is_none() {
            return Err(InvariantViolation::DenySentinel);
        }
        if !decision.outputs.is_empty()
            || !decision.selected_output_url.is_empty()
            || decision.selected_output_kind.is_some()
        {
            return Err(InvariantViolation::DenyOutputs);
        }
    } else {
        check_playable(input, decision)?;
    }
    if matches!(decision.mode, Mode::Deny | Mode::Transcode) && decision.reasons.is_empty() {
        return Err(InvariantViolation::EmptyReasons(decision.mode));
    }
    if canonical_reasons(decision.reasons.iter().copied()) != decision.reasons {
        return Err(InvariantViolation::UnorderedReasons);
    }
    if !decision.constraints.is_empty() {
        return Err(InvariantViolation::Constraints);
    }
    if decision.trace.why.len() != decision.reasons.len() {
        return Err(InvariantViolation::TraceWhy);
    }
    if decision.trace.request_id != input.request_id {
        return Err(InvariantViolation::TraceRequestId);
    }
    Ok(())
}

/// Checks guarantees of the playable modes.
fn check_playable(input: &DecisionInput, decision: &Decision) -> Result<(), InvariantViolation> {
    let mode = decision.mode;
    let selected = &decision.selected;
    if [&selected.container, &selected.video_codec, &selected.audio_codec]
        .iter()
        .any(|value| value.as_str() == SENTINEL_NONE)
    {
        return Err(InvariantViolation::SentinelOutsideDeny(mode));
    }
    let [output] = decision.outputs.as_slice() else {
        return Err(InvariantViolation::OutputMismatch(mode));
    };
    if decision.selected_output_kind != Some(output.kind)
        || decision.selected_output_url != output.url
        || output.url.is_empty()
    {
        return Err(InvariantViolation::OutputMismatch(mode));
    }
    let expected = if mode == Mode::DirectPlay { OutputKind::File } else { OutputKind::Hls };
    if output.kind != expected {
        return Err(InvariantViolation::OutputKind {
            mode,
            expected: expected.as_str(),
        });
    }
    if mode == Mode::DirectPlay {
        let caps = &input.capabilities;
        if caps.supports_range != Some(true) {
            return Err(InvariantViolation::DirectPlayRange);
        }
        if !DIRECT_PLAY_CONTAINERS.contains(&selected.container.as_str()) {
            return Err(InvariantViolation::DirectPlayContainer);
        }
        if !caps.containers.contains(&selected.container)
            || !caps.video_codecs.contains(&selected.video_codec)
            || !caps.audio_codecs.contains(&selected.audio_codec)
        {
            return Err(InvariantViolation::DirectPlayCapabilities);
        }
    }
    Ok(())
}
