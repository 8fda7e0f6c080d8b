// crates/playback-decision-core/src/core/problem.rs
// ============================================================================
// Module: Playback Decision Problems
// Description: Problem-details error body and its closed code set.
// Purpose: Report fail-closed rejections with a stable status mapping.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Problem`] is returned whenever no [`crate::Decision`] may be produced.
//! Codes map to fixed HTTP statuses: malformed or mixed input is 400, absent
//! capabilities 412, ambiguous source truth 422, and an internal contract
//! breach 500.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Problem Codes
// ============================================================================

/// Closed set of problem codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemCode {
    /// Capabilities are structurally required but absent.
    CapabilitiesMissing,
    /// Input is malformed, mixed, or unsupported.
    CapabilitiesInvalid,
    /// Source truth is incomplete or marked unknown.
    DecisionAmbiguous,
    /// The engine produced an internally contradictory decision.
    InvariantViolation,
}

impl ProblemCode {
    /// Returns the stable wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CapabilitiesMissing => "capabilities_missing",
            Self::CapabilitiesInvalid => "capabilities_invalid",
            Self::DecisionAmbiguous => "decision_ambiguous",
            Self::InvariantViolation => "invariant_violation",
        }
    }

    /// Returns the HTTP status for this code.
    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::CapabilitiesMissing => 412,
            Self::CapabilitiesInvalid => 400,
            Self::DecisionAmbiguous => 422,
            Self::InvariantViolation => 500,
        }
    }

    /// Returns the problem type URI.
    #[must_use]
    pub const fn type_uri(self) -> &'static str {
        match self {
            Self::CapabilitiesMissing => "playback/capabilities-missing",
            Self::CapabilitiesInvalid => "playback/capabilities-invalid",
            Self::DecisionAmbiguous => "playback/decision-ambiguous",
            Self::InvariantViolation => "playback/invariant-violation",
        }
    }
}

impl fmt::Display for ProblemCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Problem
// ============================================================================

/// Problem-details error body.
///
/// # Invariants
/// - `status` always equals `code.status()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{code} ({status}): {detail}")]
pub struct Problem {
    /// Problem type URI.
    #[serde(rename = "type")]
    pub type_uri: String,
    /// Short human-readable summary.
    pub title: String,
    /// HTTP status.
    pub status: u16,
    /// Machine-readable code.
    pub code: ProblemCode,
    /// Human-readable detail.
    pub detail: String,
}

impl Problem {
    /// Builds a problem for the given code.
    #[must_use]
    pub fn new(code: ProblemCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_uri: code.type_uri().to_string(),
            title: title.into(),
            status: code.status(),
            code,
            detail: detail.into(),
        }
    }

    /// Builds a 400 `capabilities_invalid` problem.
    #[must_use]
    pub fn invalid(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(ProblemCode::CapabilitiesInvalid, title, detail)
    }

    /// Builds a 400 mixed-schema problem naming the offending pair.
    #[must_use]
    pub fn mixed_schema(detail: &str) -> Self {
        Self::invalid(
            "Mixed Schema Detected",
            format!("Fail-Closed: Mixed schema detected. {detail}"),
        )
    }

    /// Builds a 412 `capabilities_missing` problem.
    #[must_use]
    pub fn missing(detail: impl Into<String>) -> Self {
        Self::new(ProblemCode::CapabilitiesMissing, "Capabilities Missing", detail)
    }

    /// Builds a 422 `decision_ambiguous` problem.
    #[must_use]
    pub fn ambiguous(detail: impl Into<String>) -> Self {
        Self::new(ProblemCode::DecisionAmbiguous, "Decision Ambiguous", detail)
    }

    /// Builds a 500 `invariant_violation` problem.
    #[must_use]
    pub fn invariant(detail: impl Into<String>) -> Self {
        Self::new(ProblemCode::InvariantViolation, "Invariant Violation", detail)
    }
}
