//! Overlap resolution.
//!
//! Charts may contain notes that overlap in time, which a single MIDI track
//! cannot express with one note-on/note-off pair per note. The resolver scans
//! the remaining notes repeatedly; each scan keeps every note that fits after
//! the previously kept one and leaves the rest for the next scan. Every scan
//! becomes one parallel track.
//!
//! Notes starting before tick 0 never fit any pass. Once they are all that
//! is left, resolution stops and reports them as dropped, exactly as if the
//! pass limit had been used up, without the empty passes in between.

use serde::Serialize;

use super::note_builder::{NotePass, PassBuilder, Placement};
use crate::chart::Note;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::settings::PitchBendRange;

/// Upper bound on passes for a single chart.
pub const MAX_PASSES: usize = 1000;

/// How overlap resolution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PassOutcome {
    /// Every note was assigned to a pass.
    #[default]
    Complete,
    /// The pass limit was hit; `dropped` notes are missing from the output.
    TruncatedAtPassLimit { dropped: usize },
}

impl PassOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, PassOutcome::Complete)
    }
}

/// Passes produced for a note list, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlapResolution {
    pub passes: Vec<NotePass>,
    pub outcome: PassOutcome,
}

/// Split `notes` into non-overlapping passes using the default pass limit.
pub fn resolve_overlaps(
    notes: &[Note],
    bend_range: PitchBendRange,
    ticks_per_quarter: u16,
    diagnostics: &mut Diagnostics,
) -> OverlapResolution {
    resolve_overlaps_with_limit(notes, bend_range, ticks_per_quarter, MAX_PASSES, diagnostics)
}

/// Split `notes` into at most `max_passes` non-overlapping passes.
///
/// Notes that are still unassigned when the limit is reached, or that no
/// pass can take, are dropped and reported through
/// [`PassOutcome::TruncatedAtPassLimit`] and a [`Diagnostic::PassLimitReached`]
/// entry.
pub fn resolve_overlaps_with_limit(
    notes: &[Note],
    bend_range: PitchBendRange,
    ticks_per_quarter: u16,
    max_passes: usize,
    diagnostics: &mut Diagnostics,
) -> OverlapResolution {
    log::info!(
        "Converting notes: total = {}, pitch bend range = {}",
        notes.len(),
        bend_range
    );

    let mut remaining: Vec<Note> = notes.to_vec();
    let mut passes = Vec::new();

    while !remaining.is_empty() && passes.len() < max_passes {
        let pass = passes.len();
        log::info!("Note pass {} ({} notes remaining)", pass, remaining.len());

        let mut builder = PassBuilder::new(pass, bend_range, ticks_per_quarter);
        let before = remaining.len();
        remaining.retain(|note| builder.place(note, diagnostics) == Placement::Deferred);

        // Only notes starting before tick 0 are refused by an empty pass, and
        // every later pass would refuse them again.
        if remaining.len() == before {
            log::info!("Note pass {} placed nothing, stopping", pass);
            break;
        }
        passes.push(builder.finish());
    }

    let outcome = if remaining.is_empty() {
        PassOutcome::Complete
    } else {
        diagnostics.record(Diagnostic::PassLimitReached {
            passes: passes.len(),
            dropped_notes: remaining.len(),
        });
        PassOutcome::TruncatedAtPassLimit {
            dropped: remaining.len(),
        }
    };

    OverlapResolution { passes, outcome }
}
