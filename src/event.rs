//! Performance event types and the delta-time track builder.
//!
//! Events are owned by this crate and carry no MIDI library types; the
//! [`crate::smf`] writer translates them into container events.

use serde::Serialize;

use crate::timing::Tick;

/// What an event does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventKind {
    NoteOn { pitch: i32 },
    NoteOff { pitch: i32 },
    /// Signed bend, 0 = centered. Biasing into the unsigned wire range is left to the writer.
    PitchBend { value: i32 },
    Marker { text: String },
    Lyric { text: String },
    SetTempo { microseconds_per_beat: i64 },
}

/// An event and its distance in ticks from the previous event of the same track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub delta_ticks: Tick,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn new(delta_ticks: Tick, kind: EventKind) -> Self {
        Event { delta_ticks, kind }
    }

    pub fn note_on(pitch: i32, delta_ticks: Tick) -> Self {
        Event::new(delta_ticks, EventKind::NoteOn { pitch })
    }

    pub fn note_off(pitch: i32, delta_ticks: Tick) -> Self {
        Event::new(delta_ticks, EventKind::NoteOff { pitch })
    }

    pub fn pitch_bend(value: i32, delta_ticks: Tick) -> Self {
        Event::new(delta_ticks, EventKind::PitchBend { value })
    }

    pub fn marker(text: impl Into<String>, delta_ticks: Tick) -> Self {
        Event::new(delta_ticks, EventKind::Marker { text: text.into() })
    }

    pub fn lyric(text: impl Into<String>, delta_ticks: Tick) -> Self {
        Event::new(delta_ticks, EventKind::Lyric { text: text.into() })
    }

    pub fn set_tempo(microseconds_per_beat: i64) -> Self {
        Event::new(0, EventKind::SetTempo { microseconds_per_beat })
    }
}

/// One parallel voice of the output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Track {
    pub events: Vec<Event>,
}

impl Track {
    pub fn new(events: Vec<Event>) -> Self {
        Track { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Total ticks covered by the track.
    pub fn duration_ticks(&self) -> Tick {
        self.events.iter().map(|e| e.delta_ticks).sum()
    }

    /// Absolute tick of every event, in order.
    pub fn absolute_ticks(&self) -> Vec<Tick> {
        self.events
            .iter()
            .scan(0, |now, e| {
                *now += e.delta_ticks;
                Some(*now)
            })
            .collect()
    }
}

/// Builds a [`Track`] from absolute tick positions.
///
/// The builder keeps a cursor at the absolute tick of the last event and
/// turns each new position into a delta. Deltas never go negative: an event
/// placed before the cursor is pinned to it, and [`TrackBuilder::push_at`]
/// reports how far it had to move.
#[derive(Debug, Clone, Default)]
pub struct TrackBuilder {
    events: Vec<Event>,
    cursor: Tick,
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absolute tick of the last event (0 for an empty track).
    pub fn cursor(&self) -> Tick {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Append an event at an absolute tick. Returns the number of ticks the
    /// event was pulled forward to keep the track ordered (0 when it fit).
    pub fn push_at(&mut self, tick: Tick, kind: EventKind) -> Tick {
        let delta = tick - self.cursor;
        let clamped = delta.max(0);
        self.events.push(Event::new(clamped, kind));
        self.cursor += clamped;
        clamped - delta
    }

    /// Move the end of the track by `by` ticks, keeping earlier events in place.
    ///
    /// Lengthening only touches the last event. Shortening takes ticks from the
    /// last event first and walks backwards while the deltas are exhausted, so
    /// events that shared a tick keep sharing it. Returns the shift actually
    /// applied, which is smaller than requested only when the track is too short.
    pub fn shift_tail(&mut self, by: Tick) -> Tick {
        if by >= 0 {
            return match self.events.last_mut() {
                Some(last) => {
                    last.delta_ticks += by;
                    self.cursor += by;
                    by
                }
                None => 0,
            };
        }

        let mut remaining = -by;
        for event in self.events.iter_mut().rev() {
            if remaining == 0 {
                break;
            }
            let taken = event.delta_ticks.min(remaining);
            event.delta_ticks -= taken;
            remaining -= taken;
        }
        let applied = by + remaining;
        self.cursor += applied;
        applied
    }

    pub fn finish(self) -> Track {
        Track::new(self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_push_at_accumulates_deltas() {
        let mut builder = TrackBuilder::new();
        builder.push_at(0, EventKind::NoteOn { pitch: 60 });
        builder.push_at(960, EventKind::NoteOff { pitch: 60 });
        builder.push_at(1440, EventKind::NoteOn { pitch: 62 });
        assert_eq!(builder.cursor(), 1440);

        let track = builder.finish();
        assert_eq!(
            track.events,
            vec![
                Event::note_on(60, 0),
                Event::note_off(60, 960),
                Event::note_on(62, 480),
            ]
        );
        assert_eq!(track.absolute_ticks(), vec![0, 960, 1440]);
        assert_eq!(track.duration_ticks(), 1440);
    }

    #[test]
    fn test_push_before_cursor_is_pinned() {
        let mut builder = TrackBuilder::new();
        builder.push_at(100, EventKind::Marker { text: "a".into() });
        let moved = builder.push_at(40, EventKind::Marker { text: "b".into() });

        assert_eq!(moved, 60);
        assert_eq!(builder.cursor(), 100);
        assert_eq!(builder.finish().events[1].delta_ticks, 0);
    }

    #[test]
    fn test_shift_tail_forward() {
        let mut builder = TrackBuilder::new();
        builder.push_at(0, EventKind::NoteOn { pitch: 60 });
        builder.push_at(960, EventKind::NoteOff { pitch: 60 });

        assert_eq!(builder.shift_tail(1), 1);
        assert_eq!(builder.cursor(), 961);
        assert_eq!(builder.finish().events[1].delta_ticks, 961);
    }

    #[test]
    fn test_shift_tail_back_walks_through_zero_deltas() {
        let mut builder = TrackBuilder::new();
        builder.push_at(0, EventKind::NoteOn { pitch: 60 });
        builder.push_at(840, EventKind::NoteOn { pitch: 61 });
        builder.push_at(960, EventKind::NoteOff { pitch: 60 });
        builder.push_at(960, EventKind::NoteOff { pitch: 61 });

        assert_eq!(builder.shift_tail(-1), -1);
        assert_eq!(builder.cursor(), 959);
        let track = builder.finish();
        assert_eq!(track.absolute_ticks(), vec![0, 840, 959, 959]);
    }

    #[test]
    fn test_shift_tail_on_empty_track() {
        let mut builder = TrackBuilder::new();
        assert_eq!(builder.shift_tail(1), 0);
        assert_eq!(builder.shift_tail(-1), 0);
        assert_eq!(builder.cursor(), 0);
    }
}
