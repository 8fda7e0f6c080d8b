// crates/playback-decision-core/src/core/mod.rs
// ============================================================================
// Module: Playback Decision Core Types
// Description: Request model, decision body, reasons, problems, and hashing.
// Purpose: Provide stable, serializable types shared by every engine stage.
// Dependencies: serde, serde_jcs, sha2, thiserror
// ============================================================================

//! ## Overview
//! These types are the canonical source of truth for the decision wire
//! contract. Runtime stages consume and produce them without side effects.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod decision;
pub mod hashing;
pub mod input;
pub mod problem;
pub mod reason;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use decision::DIRECT_PLAY_CONTAINERS;
pub use decision::Decision;
pub use decision::Mode;
pub use decision::Output;
pub use decision::OutputKind;
pub use decision::Protocol;
pub use decision::RuleHit;
pub use decision::SENTINEL_NONE;
pub use decision::SelectedFormats;
pub use decision::Trace;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use input::Capabilities;
pub use input::DecisionInput;
pub use input::MaxVideoDimensions;
pub use input::Policy;
pub use input::Source;
pub use problem::Problem;
pub use problem::ProblemCode;
pub use reason::REASON_VOCABULARY_VERSION;
pub use reason::ReasonCode;
pub use reason::ReasonTier;
pub use reason::canonical_reasons;
