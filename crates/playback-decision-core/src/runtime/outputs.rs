// crates/playback-decision-core/src/runtime/outputs.rs
// ============================================================================
// Module: Playback Decision Output Builder
// Description: Selected formats, output handles, and trace assembly.
// Purpose: Turn a table outcome into the success body.
// Dependencies: crate::core, crate::runtime::table
// ============================================================================

//! ## Overview
//! Outputs are opaque handles for the transport layer to resolve. A `deny`
//! decision carries the `"none"` sentinel triple and no outputs; every other
//! mode mirrors the normalized source formats.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Decision;
use crate::core::DecisionInput;
use crate::core::Mode;
use crate::core::Output;
use crate::core::OutputKind;
use crate::core::SelectedFormats;
use crate::core::Trace;
use crate::runtime::table::TableOutcome;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Opaque handle for direct file delivery.
pub const FILE_OUTPUT_HANDLE: &str = "placeholder://file";

/// Opaque handle for segmented delivery.
pub const HLS_OUTPUT_HANDLE: &str = "placeholder://hls";

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builds the decision body for a normalized input and table outcome.
#[must_use]
pub fn build_decision(input: &DecisionInput, outcome: TableOutcome) -> Decision {
    let why = outcome.reasons.iter().map(|reason| reason.description().to_string()).collect();
    let trace = Trace {
        request_id: input.request_id.clone(),
        rule_hits: outcome.rule_hits,
        why,
    };
    let output = match outcome.mode {
        Mode::DirectPlay => Some(Output {
            kind: OutputKind::File,
            url: FILE_OUTPUT_HANDLE.to_string(),
        }),
        Mode::DirectStream | Mode::Transcode => Some(Output {
            kind: OutputKind::Hls,
            url: HLS_OUTPUT_HANDLE.to_string(),
        }),
        Mode::Deny => None,
    };
    let selected = match outcome.mode {
        Mode::Deny => SelectedFormats::none(),
        Mode::DirectPlay | Mode::DirectStream | Mode::Transcode => SelectedFormats {
            container: input.source.container.clone(),
            video_codec: input.source.video_codec.clone(),
            audio_codec: input.source.audio_codec.clone(),
        },
    };
    Decision {
        mode: outcome.mode,
        selected,
        selected_output_url: output.as_ref().map(|out| out.url.clone()).unwrap_or_default(),
        selected_output_kind: output.as_ref().map(|out| out.kind),
        outputs: output.into_iter().collect(),
        constraints: Vec::new(),
        reasons: outcome.reasons,
        trace,
    }
}
