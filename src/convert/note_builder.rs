//! Per-pass note event generation.
//!
//! A [`PassBuilder`] owns the note and pitch-bend tracks of one overlap pass
//! and turns chart notes into MIDI-style events, one note at a time, in
//! chart order. Notes that start before the pass's last event (an overlap,
//! or a negative start on an empty pass) are refused and stay with the caller
//! for a later pass.
//!
//! ## Slides
//! A note whose start and end pitch differ is written as two overlapping
//! notes: the start pitch for almost the whole length, and the end pitch
//! starting a short crossover before the end (see [`slide_length`]).
//!
//! ## Pitch Bends
//! Only the first pass writes pitch bends, since all passes share one MIDI
//! channel and a bend from an overlapping voice would detune the main line.

use crate::chart::Note;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::event::{EventKind, Track, TrackBuilder};
use crate::pitch::{to_midi_pitch, MidiPitch};
use crate::settings::PitchBendRange;
use crate::timing::{beat_to_ticks, slide_length, Tick};

/// What happened to a note offered to a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Placement {
    Placed,
    Deferred,
}

/// Event tracks produced by one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePass {
    pub notes: Track,
    /// Empty on every pass but the first.
    pub bends: Track,
}

pub(super) struct PassBuilder {
    pass: usize,
    bend_range: PitchBendRange,
    ticks_per_quarter: u16,
    notes: TrackBuilder,
    bends: TrackBuilder,
    last_end: Option<MidiPitch>,
}

impl PassBuilder {
    pub(super) fn new(pass: usize, bend_range: PitchBendRange, ticks_per_quarter: u16) -> Self {
        PassBuilder {
            pass,
            bend_range,
            ticks_per_quarter,
            notes: TrackBuilder::new(),
            bends: TrackBuilder::new(),
            last_end: None,
        }
    }

    fn writes_bends(&self) -> bool {
        self.pass == 0
    }

    fn last_end_bend(&self) -> i32 {
        self.last_end.map_or(0, |p| p.bend)
    }

    /// Add a note to this pass, or defer it if it starts before the pass's last note ends.
    pub(super) fn place(&mut self, note: &Note, diagnostics: &mut Diagnostics) -> Placement {
        let start = beat_to_ticks(note.start_beat, self.ticks_per_quarter);
        let end = beat_to_ticks(note.end_beat(), self.ticks_per_quarter);
        let start_delta = start - self.notes.cursor();

        log::debug!(
            "Note start: {} end: {} start pitch: {} end pitch: {}",
            note.start_beat,
            note.end_beat(),
            note.start_pitch,
            note.end_pitch
        );

        // A one-tick gap or overlap is float noise in the chart; move the
        // previous note's end (and a bend sitting on it) to meet this note.
        if start_delta.abs() == 1 && start >= 0 && !self.notes.is_empty() {
            diagnostics.record(Diagnostic::DeltaCorrected {
                pass: self.pass,
                beat: note.start_beat,
                delta: start_delta,
            });
            let bends_aligned =
                !self.bends.is_empty() && self.bends.cursor() == self.notes.cursor();
            self.notes.shift_tail(start_delta);
            if bends_aligned {
                self.bends.shift_tail(start_delta);
            }
        } else if start_delta < 0 {
            diagnostics.record(Diagnostic::NoteDeferred {
                pass: self.pass,
                beat: note.start_beat,
                delta: start_delta,
            });
            return Placement::Deferred;
        }

        let start_pitch = to_midi_pitch(note.start_pitch, self.bend_range);
        let end_pitch = to_midi_pitch(note.end_pitch, self.bend_range);

        if let Some(last) = self.last_end {
            if start == self.notes.cursor()
                && last.note == start_pitch.note
                && last.bend != start_pitch.bend
            {
                diagnostics.record(Diagnostic::BendDiscontinuity {
                    pass: self.pass,
                    beat: note.start_beat,
                    bend: start_pitch.bend,
                });
            }
        }

        log::debug!(
            "Converted note start: {} end: {} pitch: {}/{} -> {}/{}",
            start,
            end,
            start_pitch.note,
            start_pitch.bend,
            end_pitch.note,
            end_pitch.bend
        );

        if start_pitch.note == end_pitch.note {
            self.push_note(note, start, EventKind::NoteOn { pitch: start_pitch.note }, diagnostics);
            self.push_note(note, end, EventKind::NoteOff { pitch: end_pitch.note }, diagnostics);
            if self.writes_bends() {
                self.push_start_bends(note, start, start_pitch, diagnostics);
                if end_pitch.bend != start_pitch.bend {
                    self.push_bend(note, end, end_pitch.bend, diagnostics);
                }
            }
        } else {
            let crossover = slide_length(end - start, self.ticks_per_quarter);
            let slide_start = end - crossover;

            let (from, to) = (start_pitch.note, end_pitch.note);
            self.push_note(note, start, EventKind::NoteOn { pitch: from }, diagnostics);
            self.push_note(note, slide_start, EventKind::NoteOn { pitch: to }, diagnostics);
            self.push_note(note, end, EventKind::NoteOff { pitch: from }, diagnostics);
            self.push_note(note, end, EventKind::NoteOff { pitch: to }, diagnostics);
            if self.writes_bends() {
                self.push_start_bends(note, start, start_pitch, diagnostics);
                if end_pitch.bend != start_pitch.bend {
                    // Hold the start bend up to the tick before the second note
                    // begins, switch as it sounds, and hold through the end.
                    self.push_bend(note, slide_start - 1, start_pitch.bend, diagnostics);
                    self.push_bend(note, slide_start, end_pitch.bend, diagnostics);
                    self.push_bend(note, end, end_pitch.bend, diagnostics);
                }
            }
        }

        self.last_end = Some(end_pitch);
        Placement::Placed
    }

    fn push_start_bends(
        &mut self,
        note: &Note,
        start: Tick,
        start_pitch: MidiPitch,
        diagnostics: &mut Diagnostics,
    ) {
        let last_end_bend = self.last_end_bend();
        if start_pitch.bend != last_end_bend {
            self.push_bend(note, start, last_end_bend, diagnostics);
            self.push_bend(note, start, start_pitch.bend, diagnostics);
        }
    }

    fn push_note(
        &mut self,
        note: &Note,
        tick: Tick,
        kind: EventKind,
        diagnostics: &mut Diagnostics,
    ) {
        let moved = self.notes.push_at(tick, kind);
        if moved > 0 {
            diagnostics.record(Diagnostic::EventPinned {
                track: format!("note (pass {})", self.pass),
                beat: note.start_beat,
                moved_ticks: moved,
            });
        }
    }

    fn push_bend(&mut self, note: &Note, tick: Tick, value: i32, diagnostics: &mut Diagnostics) {
        let moved = self.bends.push_at(tick, EventKind::PitchBend { value });
        if moved > 0 {
            diagnostics.record(Diagnostic::EventPinned {
                track: "pitch bend".to_string(),
                beat: note.start_beat,
                moved_ticks: moved,
            });
        }
    }

    pub(super) fn finish(self) -> NotePass {
        NotePass {
            notes: self.notes.finish(),
            bends: self.bends.finish(),
        }
    }
}
