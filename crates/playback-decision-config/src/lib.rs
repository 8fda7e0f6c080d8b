// crates/playback-decision-config/src/lib.rs
// ============================================================================
// Module: Playback Decision Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for playback-decision.toml semantics.
// Dependencies: playback-decision-core, serde, toml
// ============================================================================

//! ## Overview
//! `playback-decision-config` defines the configuration model for the
//! playback decision engine and its CLI. Validation is strict and fails
//! closed.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
