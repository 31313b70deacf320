//! Conversion diagnostics.
//!
//! The converter never aborts on odd chart data. Each adjustment it makes is
//! recorded here and returned with the result, and also sent to the `log`
//! facade so command-line runs show it without any extra plumbing.

use std::fmt;

use serde::Serialize;

use crate::timing::Tick;

/// Auxiliary marker stream a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuxStream {
    ImprovZones,
    Lyrics,
    Background,
}

impl fmt::Display for AuxStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuxStream::ImprovZones => "improv zone",
            AuxStream::Lyrics => "lyric",
            AuxStream::Background => "background cue",
        };
        f.write_str(name)
    }
}

/// A single non-fatal adjustment made during conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A note started one tick away from the previous one; the previous
    /// note's end was moved to meet it.
    DeltaCorrected { pass: usize, beat: f32, delta: Tick },
    /// A note overlapped an earlier note of the same pass and was left for
    /// the next pass.
    NoteDeferred { pass: usize, beat: f32, delta: Tick },
    /// A note starting exactly where the previous one ended, on the same
    /// pitch, but with a different bend.
    BendDiscontinuity { pass: usize, beat: f32, bend: i32 },
    /// An event would have landed before the previous event of its track and
    /// was pinned to it.
    EventPinned { track: String, beat: f32, moved_ticks: Tick },
    /// The pass limit was reached with notes still unassigned; they are not
    /// in the output.
    PassLimitReached { passes: usize, dropped_notes: usize },
}

impl Diagnostic {
    /// Whether the diagnostic means notes are missing from the output.
    pub fn is_error(&self) -> bool {
        matches!(self, Diagnostic::PassLimitReached { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DeltaCorrected { pass, beat, delta } => write!(
                f,
                "pass {}: note at beat {} has a delta of {}, previous note adjusted to meet it",
                pass, beat, delta
            ),
            Diagnostic::NoteDeferred { pass, beat, delta } => write!(
                f,
                "pass {}: note at beat {} has a negative delta ({}), left until the next pass",
                pass, beat, delta
            ),
            Diagnostic::BendDiscontinuity { pass, beat, bend } => write!(
                f,
                "pass {}: note at beat {} joins the previous note with a different pitch bend ({})",
                pass, beat, bend
            ),
            Diagnostic::EventPinned { track, beat, moved_ticks } => write!(
                f,
                "{} at beat {} is {} ticks before the previous event, moved up to it",
                track, beat, moved_ticks
            ),
            Diagnostic::PassLimitReached { passes, dropped_notes } => write!(
                f,
                "stopped after {} note passes, {} notes could not be placed and were dropped",
                passes, dropped_notes
            ),
        }
    }
}

/// Ordered collection of diagnostics for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            log::error!("{}", diagnostic);
        } else {
            log::warn!("{}", diagnostic);
        }
        self.entries.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
