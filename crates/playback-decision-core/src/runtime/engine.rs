// crates/playback-decision-core/src/runtime/engine.rs
// ============================================================================
// Module: Playback Decision Engine
// Description: End-to-end decision pipeline with telemetry and replay hashing.
// Purpose: Provide the single canonical entry point for playback decisions.
// Dependencies: tracing, crate::{core, interfaces, runtime, telemetry}
// ============================================================================

//! ## Overview
//! A call flows through decode, normalize, validate, predicates, the decision
//! table, the output builder, and the invariant validator, then reports one
//! telemetry event. Every call yields exactly one of a [`Decision`] or a
//! [`Problem`]. The engine holds only immutable configuration and an
//! observer, so a single instance may be shared across threads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::DEFAULT_HASH_ALGORITHM;
use crate::core::Decision;
use crate::core::DecisionInput;
use crate::core::HashAlgorithm;
use crate::core::HashDigest;
use crate::core::Problem;
use crate::interfaces::DecisionObserver;
use crate::runtime::canonical::input_hash;
use crate::runtime::decode::DEFAULT_MAX_INPUT_BYTES;
use crate::runtime::decode::SchemaKind;
use crate::runtime::decode::decode_request;
use crate::runtime::invariants::enforce_invariants;
use crate::runtime::normalize::normalize_input;
use crate::runtime::outputs::build_decision;
use crate::runtime::predicates::evaluate_predicates;
use crate::runtime::table::evaluate_table;
use crate::runtime::validate::validate_input;
use crate::telemetry::DecisionEvent;
use crate::telemetry::TracingObserver;

// ============================================================================
// SECTION: Engine Configuration
// ============================================================================

/// Configuration for the decision engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum accepted request body size in bytes.
    pub max_input_bytes: usize,
    /// Hash algorithm used for canonical input hashing.
    pub hash_algorithm: HashAlgorithm,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            hash_algorithm: DEFAULT_HASH_ALGORITHM,
        }
    }
}

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Exactly one of a decision or a problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    /// Answered request, including a logical deny.
    Decision(Decision),
    /// Rejected request.
    Problem(Problem),
}

impl Outcome {
    /// Returns the HTTP status: 200 for any decision, the problem status otherwise.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Decision(_) => 200,
            Self::Problem(problem) => problem.status,
        }
    }

    /// Returns the decision when the request was answered.
    #[must_use]
    pub const fn decision(&self) -> Option<&Decision> {
        match self {
            Self::Decision(decision) => Some(decision),
            Self::Problem(_) => None,
        }
    }

    /// Returns the problem when the request was rejected.
    #[must_use]
    pub const fn problem(&self) -> Option<&Problem> {
        match self {
            Self::Decision(_) => None,
            Self::Problem(problem) => Some(problem),
        }
    }

    /// Converts into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the [`Problem`] when the request was rejected.
    pub fn into_result(self) -> Result<Decision, Problem> {
        match self {
            Self::Decision(decision) => Ok(decision),
            Self::Problem(problem) => Err(problem),
        }
    }
}

/// Outcome of one engine call plus its replay metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionReport {
    /// Decision or problem.
    pub outcome: Outcome,
    /// Semantic hash of the normalized input, when the input decoded.
    pub input_hash: Option<HashDigest>,
    /// Root schema family, when the request came from wire bytes and decoded.
    pub schema: Option<SchemaKind>,
}

impl DecisionReport {
    /// Returns the HTTP status of the outcome.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.outcome.status()
    }
}

// ============================================================================
// SECTION: Pure Evaluation
// ============================================================================

/// Runs normalization, validation, the decision table, and invariant checks.
///
/// # Errors
///
/// Returns a [`Problem`] for validation failures or invariant breaches.
pub fn evaluate_input(input: DecisionInput, algorithm: HashAlgorithm) -> Result<Decision, Problem> {
    let normalized = normalize_input(input);
    evaluate_normalized(&normalized, algorithm)
}

/// Evaluates an input that is already normalized.
fn evaluate_normalized(input: &DecisionInput, algorithm: HashAlgorithm) -> Result<Decision, Problem> {
    validate_input(input)?;
    let predicates = evaluate_predicates(input);
    let outcome = evaluate_table(input, &predicates);
    let decision = build_decision(input, outcome);
    enforce_invariants(input, decision, algorithm)
}

// ============================================================================
// SECTION: Decision Engine
// ============================================================================

/// Decision engine bound to an observer and configuration.
#[derive(Debug, Clone)]
pub struct DecisionEngine<O = TracingObserver> {
    /// Telemetry sink.
    observer: O,
    /// Engine configuration.
    config: EngineConfig,
}

impl Default for DecisionEngine<TracingObserver> {
    fn default() -> Self {
        Self::new(TracingObserver, EngineConfig::default())
    }
}

impl<O: DecisionObserver> DecisionEngine<O> {
    /// Creates an engine.
    #[must_use]
    pub const fn new(observer: O, config: EngineConfig) -> Self {
        Self {
            observer,
            config,
        }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Decides a raw wire request.
    #[must_use]
    pub fn decide_bytes(&self, bytes: &[u8]) -> DecisionReport {
        match decode_request(bytes, self.config.max_input_bytes) {
            Ok(decoded) => {
                tracing::debug!(schema = decoded.schema.as_str(), "decoded decision request");
                let mut report = self.decide(decoded.input);
                report.schema = Some(decoded.schema);
                report
            }
            Err(problem) => {
                tracing::debug!(code = problem.code.as_str(), detail = %problem.detail, "decision request rejected at decode");
                self.observer.record_decision(&DecisionEvent::from_problem(&problem, ""));
                DecisionReport {
                    outcome: Outcome::Problem(problem),
                    input_hash: None,
                    schema: None,
                }
            }
        }
    }

    /// Decides an already decoded request.
    #[must_use]
    pub fn decide(&self, input: DecisionInput) -> DecisionReport {
        let normalized = normalize_input(input);
        let hash = match input_hash(&normalized, self.config.hash_algorithm) {
            Ok(digest) => Some(digest),
            Err(err) => {
                tracing::warn!(error = %err, "decision input hash unavailable");
                None
            }
        };
        let outcome = match evaluate_normalized(&normalized, self.config.hash_algorithm) {
            Ok(decision) => {
                self.observer.record_decision(&DecisionEvent::from_decision(&decision));
                Outcome::Decision(decision)
            }
            Err(problem) => {
                self.observer
                    .record_decision(&DecisionEvent::from_problem(&problem, &normalized.request_id));
                Outcome::Problem(problem)
            }
        };
        tracing::debug!(
            status = outcome.status(),
            input_hash = hash.as_ref().map_or("", |digest| digest.value.as_str()),
            "decision evaluated"
        );
        DecisionReport {
            outcome,
            input_hash: hash,
            schema: None,
        }
    }
}
