// crates/playback-decision-core/src/lib.rs
// ============================================================================
// Module: Playback Decision Core Library
// Description: Public API surface for the playback decision engine.
// Purpose: Expose core types, interfaces, runtime stages, and telemetry.
// Dependencies: crate::{core, interfaces, runtime, telemetry}
// ============================================================================

//! ## Overview
//! Playback Decision core is a pure, deterministic policy function. Given media
//! truth and a client's declared capabilities it decides whether playback is
//! delivered as `direct_play`, `direct_stream`, `transcode`, or `deny`, and
//! explains the choice with ordered reason codes. It performs no I/O and holds
//! no cross-call state. Embedding services resolve output handles and own any
//! caching keyed by the canonical input hash.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::DecisionObserver;
pub use interfaces::NoopObserver;
pub use runtime::CanonicalInput;
pub use runtime::DecisionEngine;
pub use runtime::DecisionReport;
pub use runtime::EngineConfig;
pub use runtime::InvariantViolation;
pub use runtime::Outcome;
pub use runtime::SchemaKind;
pub use runtime::canonical_input_json;
pub use runtime::classify_schema;
pub use runtime::decode_decision_input;
pub use runtime::evaluate_input;
pub use runtime::input_hash;
pub use runtime::normalize_input;
pub use telemetry::DecisionEvent;
pub use telemetry::TracingObserver;
