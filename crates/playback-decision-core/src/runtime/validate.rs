// crates/playback-decision-core/src/runtime/validate.rs
// ============================================================================
// Module: Playback Decision Validator
// Description: Ordered fail-closed semantic checks on normalized input.
// Purpose: Reject unsupported versions, absent capabilities, and ambiguous sources.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Checks run in a fixed order and the first failure wins:
//! API version (400), capabilities presence for the v3 family (412),
//! capabilities version (400), then source truth completeness (422).

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::DecisionInput;
use crate::core::Problem;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Accepted API versions, in normalized form.
pub const SUPPORTED_API_VERSIONS: [&str; 3] = ["v3", "v3.0", "v3.1"];

/// The only capabilities contract version the engine understands.
pub const SUPPORTED_CAPABILITIES_VERSION: i64 = 1;

/// Source values treated as unknown media truth.
const AMBIGUOUS_SENTINELS: [&str; 3] = ["unknown", "none", "null"];

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates a normalized input.
///
/// # Errors
///
/// Returns the [`Problem`] for the first failing check.
pub fn validate_input(input: &DecisionInput) -> Result<(), Problem> {
    let api = input.api_version.as_str();
    if api.is_empty() {
        return Err(Problem::invalid(
            "Invalid API Version",
            "Fail-Closed: api version is required",
        ));
    }
    if !SUPPORTED_API_VERSIONS.contains(&api) {
        return Err(Problem::invalid(
            "Invalid API Version",
            format!("Fail-Closed: unsupported api version \"{api}\""),
        ));
    }
    let Some(version) = input.capabilities.version else {
        return Err(Problem::missing(format!(
            "Fail-Closed: capabilities version is required for api {api}"
        )));
    };
    if version != SUPPORTED_CAPABILITIES_VERSION {
        return Err(Problem::invalid(
            "Invalid Capabilities Version",
            format!(
                "Fail-Closed: unsupported capabilities version {version} (expected {SUPPORTED_CAPABILITIES_VERSION})"
            ),
        ));
    }
    let source = &input.source;
    for (field, value) in [
        ("container", source.container.as_str()),
        ("video codec", source.video_codec.as_str()),
        ("audio codec", source.audio_codec.as_str()),
    ] {
        if value.is_empty() || AMBIGUOUS_SENTINELS.contains(&value) {
            return Err(Problem::ambiguous(format!(
                "Fail-Closed: source {field} is unknown or empty"
            )));
        }
    }
    Ok(())
}
