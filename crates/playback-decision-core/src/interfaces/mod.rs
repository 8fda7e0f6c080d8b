// crates/playback-decision-core/src/interfaces/mod.rs
// ============================================================================
// Module: Playback Decision Interfaces
// Description: Extension points for observability sinks.
// Purpose: Keep the engine pure while letting embedders collect telemetry.
// Dependencies: crate::telemetry
// ============================================================================

//! ## Overview
//! The engine reports one [`DecisionEvent`] per call through a
//! [`DecisionObserver`]. Observers must be thread-safe because a single engine
//! may be shared across any number of callers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::telemetry::DecisionEvent;

// ============================================================================
// SECTION: Observer
// ============================================================================

/// Sink for per-call decision telemetry.
pub trait DecisionObserver: Send + Sync {
    /// Records exactly one span and one counter increment for a call.
    fn record_decision(&self, event: &DecisionEvent);
}

/// Observer that discards every event.
///
/// # Invariants
/// - Events are intentionally discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DecisionObserver for NoopObserver {
    fn record_decision(&self, _event: &DecisionEvent) {}
}

impl<T: DecisionObserver + ?Sized> DecisionObserver for Arc<T> {
    fn record_decision(&self, event: &DecisionEvent) {
        (**self).record_decision(event);
    }
}
