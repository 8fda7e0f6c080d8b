// crates/playback-decision-core/src/telemetry.rs
// ============================================================================
// Module: Playback Decision Telemetry
// Description: Whitelisted decision attributes and the tracing-backed observer.
// Purpose: Emit one span and one counter per call with a stable schema.
// Dependencies: tracing, crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Every call, whether it ends in a decision, a logical deny, or a problem,
//! produces one [`DecisionEvent`]. Its attributes are restricted to a fixed
//! whitelist. Inserting any other key logs an error and drops the attribute
//! so the telemetry schema cannot drift.
//! Security posture: attributes never carry raw capability lists or source
//! fields.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::Decision;
use crate::core::Mode;
use crate::core::Problem;
use crate::core::Protocol;
use crate::interfaces::DecisionObserver;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Span name recorded once per call.
pub const DECISION_SPAN_NAME: &str = "playback.decision";
/// Decision mode attribute.
pub const ATTR_MODE: &str = "playback.decision.mode";
/// Delivery protocol attribute.
pub const ATTR_PROTOCOL: &str = "playback.decision.protocol";
/// Ordered reason list attribute.
pub const ATTR_REASONS: &str = "playback.decision.reasons";
/// Primary reason attribute.
pub const ATTR_REASON_PRIMARY: &str = "playback.decision.reason_primary";
/// Request identifier attribute.
pub const ATTR_REQUEST_ID: &str = "playback.request_id";

/// The only attribute keys a decision event may carry.
pub const ALLOWED_ATTRIBUTES: [&str; 5] =
    [ATTR_MODE, ATTR_PROTOCOL, ATTR_REASONS, ATTR_REASON_PRIMARY, ATTR_REQUEST_ID];

// ============================================================================
// SECTION: Attributes
// ============================================================================

/// Attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// Single string.
    Text(String),
    /// Ordered string list.
    List(Vec<String>),
}

/// Whitelist-enforcing attribute set.
///
/// # Invariants
/// - Every stored key is a member of [`ALLOWED_ATTRIBUTES`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionAttributes {
    /// Stored attributes keyed by whitelisted name.
    values: BTreeMap<&'static str, AttributeValue>,
}

impl DecisionAttributes {
    /// Inserts an attribute. Returns false and logs when the key is not whitelisted.
    pub fn insert(&mut self, key: &str, value: AttributeValue) -> bool {
        let Some(allowed) = ALLOWED_ATTRIBUTES.iter().find(|allowed| **allowed == key) else {
            tracing::error!(attribute = key, "dropping non-whitelisted decision attribute");
            return false;
        };
        self.values.insert(*allowed, value);
        true
    }

    /// Returns the attribute stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.values.get(key)
    }

    /// Returns a text attribute.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(AttributeValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Returns a list attribute.
    #[must_use]
    pub fn list(&self, key: &str) -> Option<&[String]> {
        match self.values.get(key) {
            Some(AttributeValue::List(list)) => Some(list.as_slice()),
            _ => None,
        }
    }

    /// Iterates stored keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.keys().copied()
    }
}

// ============================================================================
// SECTION: Events
// ============================================================================

/// Telemetry payload for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionEvent {
    /// Whitelisted attributes.
    pub attributes: DecisionAttributes,
}

impl DecisionEvent {
    /// Builds the event for an answered request.
    #[must_use]
    pub fn from_decision(decision: &Decision) -> Self {
        let reasons = decision.reasons.iter().map(|reason| reason.as_str().to_string()).collect();
        let primary = decision.primary_reason().map(|reason| reason.as_str()).unwrap_or_default();
        Self::build(
            decision.mode,
            decision.mode.protocol(),
            reasons,
            primary,
            &decision.trace.request_id,
        )
    }

    /// Builds the event for a rejected request. The problem code stands in for reasons.
    #[must_use]
    pub fn from_problem(problem: &Problem, request_id: &str) -> Self {
        let code = problem.code.as_str();
        Self::build(Mode::Deny, Protocol::None, vec![code.to_string()], code, request_id)
    }

    /// Assembles the whitelisted attribute set.
    fn build(
        mode: Mode,
        protocol: Protocol,
        reasons: Vec<String>,
        primary: &str,
        request_id: &str,
    ) -> Self {
        let mut attributes = DecisionAttributes::default();
        attributes.insert(ATTR_MODE, AttributeValue::Text(mode.as_str().to_string()));
        attributes.insert(ATTR_PROTOCOL, AttributeValue::Text(protocol.as_str().to_string()));
        attributes.insert(ATTR_REASONS, AttributeValue::List(reasons));
        attributes.insert(ATTR_REASON_PRIMARY, AttributeValue::Text(primary.to_string()));
        attributes.insert(ATTR_REQUEST_ID, AttributeValue::Text(request_id.to_string()));
        Self {
            attributes,
        }
    }

    /// Returns the mode label.
    #[must_use]
    pub fn mode(&self) -> &str {
        self.attributes.text(ATTR_MODE).unwrap_or_default()
    }

    /// Returns the protocol label.
    #[must_use]
    pub fn protocol(&self) -> &str {
        self.attributes.text(ATTR_PROTOCOL).unwrap_or_default()
    }

    /// Returns the ordered reason labels.
    #[must_use]
    pub fn reasons(&self) -> &[String] {
        self.attributes.list(ATTR_REASONS).unwrap_or_default()
    }

    /// Returns the primary reason label.
    #[must_use]
    pub fn reason_primary(&self) -> &str {
        self.attributes.text(ATTR_REASON_PRIMARY).unwrap_or_default()
    }

    /// Returns the request identifier.
    #[must_use]
    pub fn request_id(&self) -> &str {
        self.attributes.text(ATTR_REQUEST_ID).unwrap_or_default()
    }
}

// ============================================================================
// SECTION: Tracing Observer
// ============================================================================

/// Observer emitting a `tracing` span plus a monotonic counter event.
///
/// # Invariants
/// - The span is a child of the caller's current span.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DecisionObserver for TracingObserver {
    fn record_decision(&self, event: &DecisionEvent) {
        let reasons = event.reasons().join(",");
        let span = tracing::info_span!(
            DECISION_SPAN_NAME,
            playback.decision.mode = event.mode(),
            playback.decision.protocol = event.protocol(),
            playback.decision.reasons = reasons.as_str(),
            playback.decision.reason_primary = event.reason_primary(),
            playback.request_id = event.request_id(),
        );
        let _entered = span.enter();
        tracing::info!(monotonic_counter.playback_decision_total = 1_u64, "decision recorded");
    }
}
