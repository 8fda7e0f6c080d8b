// crates/playback-decision-core/src/runtime/mod.rs
// ============================================================================
// Module: Playback Decision Runtime
// Description: Decoder, normalizer, validator, decision table, and engine.
// Purpose: Execute the decision pipeline over typed inputs or wire bytes.
// Dependencies: crate::{core, interfaces, telemetry}
// ============================================================================

//! ## Overview
//! Runtime modules implement each stage of the decision pipeline as a pure
//! function. [`DecisionEngine`] strings them together and is the single
//! canonical entry point for callers.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod canonical;
pub mod decode;
pub mod engine;
pub mod invariants;
pub mod normalize;
pub mod outputs;
pub mod predicates;
pub mod table;
pub mod validate;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use canonical::CanonicalInput;
pub use canonical::canonical_input;
pub use canonical::canonical_input_json;
pub use canonical::input_hash;
pub use decode::DEFAULT_MAX_INPUT_BYTES;
pub use decode::DecodedRequest;
pub use decode::KeyRulesError;
pub use decode::SchemaKind;
pub use decode::classify_schema;
pub use decode::decode_decision_input;
pub use decode::decode_request;
pub use engine::DecisionEngine;
pub use engine::DecisionReport;
pub use engine::EngineConfig;
pub use engine::Outcome;
pub use engine::evaluate_input;
pub use invariants::InvariantViolation;
pub use invariants::check_invariants;
pub use invariants::enforce_invariants;
pub use normalize::normalize_input;
pub use predicates::Predicates;
pub use predicates::evaluate_predicates;
pub use table::TableOutcome;
pub use table::evaluate_table;
pub use validate::SUPPORTED_API_VERSIONS;
pub use validate::SUPPORTED_CAPABILITIES_VERSION;
pub use validate::validate_input;
