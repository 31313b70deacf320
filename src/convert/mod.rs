//! # Conversion Module
//!
//! Turns a [`TmbChart`] into tick-quantized, delta-timed event tracks ready
//! for a MIDI container writer.
//!
//! ## Sub-modules
//! - `note_builder` - Events for a single note (sustains, slides, pitch bends)
//! - `overlap` - Splits overlapping notes into parallel passes
//! - `auxiliary` - Improv zone, lyric and background cue marker tracks
//!
//! ## Track Layout
//! The output always has the same shape, whatever the chart contains:
//!
//! | Index | Track |
//! |-------|-------|
//! | 0 | Tempo (one `SetTempo` event) |
//! | 1, 2 | Pass 0 notes, pass 0 pitch bends |
//! | 3, 4 | Pass 1 notes, pass 1 pitch bends (always empty) |
//! | ... | one note/bend pair per further pass |
//! | n-3 | Improv zone markers |
//! | n-2 | Lyrics |
//! | n-1 | Background cue markers |
//!
//! ## Example
//! ```rust
//! use tmb_midi::{convert, Note, PitchBendRange, TmbChart};
//! use tmb_midi::event::Event;
//!
//! let chart = TmbChart::with_notes(120.0, vec![Note::new(0.0, 1.0, 0.0, 0.0)]);
//! let result = convert(&chart, PitchBendRange::default());
//!
//! assert_eq!(result.ticks_per_quarter_note, 960);
//! assert_eq!(result.tracks.len(), 6);
//! assert_eq!(result.tracks[0].events, vec![Event::set_tempo(500_000)]);
//! assert_eq!(
//!     result.tracks[1].events,
//!     vec![Event::note_on(60, 0), Event::note_off(60, 960)]
//! );
//! ```
//!
//! The conversion is pure: it reads nothing from disk and reports every
//! adjustment it makes through [`ConversionResult::diagnostics`].

mod auxiliary;
mod note_builder;
mod overlap;


use serde::Serialize;

use crate::chart::TmbChart;
use crate::diagnostics::Diagnostics;
use crate::event::{Event, Track};
use crate::settings::PitchBendRange;
use crate::timing::{microseconds_per_beat, TICKS_PER_QUARTER_NOTE};

pub use auxiliary::{
    background_track, improv_track, lyrics_track, BG_CUE_PREFIX, IMPROV_END, IMPROV_START,
};
pub use note_builder::NotePass;
pub use overlap::{
    resolve_overlaps, resolve_overlaps_with_limit, OverlapResolution, PassOutcome, MAX_PASSES,
};

/// Everything a container writer needs, plus what happened along the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub ticks_per_quarter_note: u16,
    /// Tracks in output order, see the module docs for the layout.
    pub tracks: Vec<Track>,
    pub diagnostics: Diagnostics,
    /// Number of note passes (each contributes a note track and a bend track).
    pub note_passes: usize,
    pub outcome: PassOutcome,
}

impl ConversionResult {
    /// The note track of each pass.
    pub fn note_tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter().skip(1).take(self.note_passes * 2).step_by(2)
    }

    /// The pitch-bend track of each pass.
    pub fn bend_tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter().skip(2).take(self.note_passes * 2).step_by(2)
    }

    /// Improv zone, lyric and background cue tracks, in that order.
    pub fn marker_tracks(&self) -> &[Track] {
        let start = 1 + self.note_passes * 2;
        self.tracks.get(start..).unwrap_or(&[])
    }
}

/// Convert a chart into event tracks.
///
/// Never fails: odd chart data is smoothed over and reported in the
/// result's diagnostics.
pub fn convert(chart: &TmbChart, bend_range: PitchBendRange) -> ConversionResult {
    let tpq = TICKS_PER_QUARTER_NOTE;
    let mut diagnostics = Diagnostics::new();

    let tempo = microseconds_per_beat(chart.tempo);
    log::info!("Tempo: {} BPM = {} us per beat", chart.tempo, tempo);

    let resolution = resolve_overlaps(&chart.notes, bend_range, tpq, &mut diagnostics);
    let note_passes = resolution.passes.len();

    let mut tracks = Vec::with_capacity(4 + note_passes * 2);
    tracks.push(Track::new(vec![Event::set_tempo(tempo)]));
    for pass in resolution.passes {
        tracks.push(pass.notes);
        tracks.push(pass.bends);
    }
    tracks.push(improv_track(chart.improv_zones.as_deref(), tpq, &mut diagnostics));
    tracks.push(lyrics_track(chart.lyrics.as_deref(), tpq, &mut diagnostics));
    tracks.push(background_track(chart.bgdata.as_deref(), chart.tempo, tpq, &mut diagnostics));

    ConversionResult {
        ticks_per_quarter_note: tpq,
        tracks,
        diagnostics,
        note_passes,
        outcome: resolution.outcome,
    }
}
