// crates/playback-decision-core/src/runtime/normalize.rs
// ============================================================================
// Module: Playback Decision Normalizer
// Description: Canonical rewriting of decoded decision inputs.
// Purpose: Collapse representational noise before predicates and hashing.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Normalization strips invisible formatting marks, folds every Unicode
//! whitespace run to a single space, trims, and lowercases each string.
//! Lists are deduplicated and sorted with empty entries dropped, and an absent
//! range flag becomes an explicit `false`. The rewrite is idempotent. The
//! request identifier is never touched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::core::Capabilities;
use crate::core::DecisionInput;
use crate::core::Source;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Invisible formatting marks removed wherever they appear.
const INVISIBLE_MARKS: [char; 6] = [
    '\u{00A0}', // no-break space
    '\u{200B}', // zero width space
    '\u{200C}', // zero width non-joiner
    '\u{200D}', // zero width joiner
    '\u{2060}', // word joiner
    '\u{FEFF}', // byte order mark
];

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Returns the canonical form of a decision input.
#[must_use]
pub fn normalize_input(mut input: DecisionInput) -> DecisionInput {
    normalize_source(&mut input.source);
    normalize_capabilities(&mut input.capabilities);
    input.api_version = normalize_text(&input.api_version);
    input
}

/// Normalizes source string fields in place.
fn normalize_source(source: &mut Source) {
    source.container = normalize_text(&source.container);
    source.video_codec = normalize_text(&source.video_codec);
    source.audio_codec = normalize_text(&source.audio_codec);
}

/// Normalizes capability lists and flags in place.
fn normalize_capabilities(caps: &mut Capabilities) {
    caps.containers = normalize_list(&caps.containers);
    caps.video_codecs = normalize_list(&caps.video_codecs);
    caps.audio_codecs = normalize_list(&caps.audio_codecs);
    caps.device_type = normalize_text(&caps.device_type);
    caps.supports_range = Some(caps.supports_range.unwrap_or(false));
}

/// Canonicalizes a single string value.
#[must_use]
pub fn normalize_text(value: &str) -> String {
    let mut collapsed = String::with_capacity(value.len());
    let mut pending_space = false;
    for ch in value.chars() {
        if INVISIBLE_MARKS.contains(&ch) {
            continue;
        }
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !collapsed.is_empty() {
            collapsed.push(' ');
        }
        pending_space = false;
        collapsed.push(ch);
    }
    collapsed.to_lowercase()
}

/// Canonicalizes a list: normalized entries, empties dropped, unique, sorted.
#[must_use]
pub fn normalize_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| normalize_text(value))
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
