//! Marker tracks for improv zones, lyrics and background cues.
//!
//! All three streams share the same shape: an ordered list of entries, each
//! mapped to one or more events at absolute ticks, accumulated into deltas.
//! A missing stream still yields an (empty) track so the track layout of the
//! output never changes.

use crate::chart::{BgCue, ImprovZone, Lyric};
use crate::diagnostics::{AuxStream, Diagnostic, Diagnostics};
use crate::event::{EventKind, Track, TrackBuilder};
use crate::timing::{beat_to_ticks, bg_cue_to_ticks, Tick};

pub const IMPROV_START: &str = "improv_start";
pub const IMPROV_END: &str = "improv_end";
pub const BG_CUE_PREFIX: &str = "bg_";

/// An event at an absolute tick, plus the chart time it came from.
struct TimedEvent {
    tick: Tick,
    chart_time: f32,
    kind: EventKind,
}

fn accumulate<T, F>(
    stream: AuxStream,
    entries: Option<&[T]>,
    diagnostics: &mut Diagnostics,
    to_events: F,
) -> Track
where
    F: Fn(usize, &T) -> Vec<TimedEvent>,
{
    let Some(entries) = entries else {
        return Track::default();
    };

    log::info!("Converting {}s, total = {}", stream, entries.len());
    let mut builder = TrackBuilder::new();

    for (i, entry) in entries.iter().enumerate() {
        for event in to_events(i, entry) {
            let moved = builder.push_at(event.tick, event.kind);
            if moved > 0 {
                diagnostics.record(Diagnostic::EventPinned {
                    track: stream.to_string(),
                    beat: event.chart_time,
                    moved_ticks: moved,
                });
            }
        }
    }

    builder.finish()
}

/// `improv_start`/`improv_end` marker pairs.
pub fn improv_track(
    zones: Option<&[ImprovZone]>,
    ticks_per_quarter: u16,
    diagnostics: &mut Diagnostics,
) -> Track {
    accumulate(AuxStream::ImprovZones, zones, diagnostics, |i, zone| {
        let start = beat_to_ticks(zone.start_beat, ticks_per_quarter);
        let end = beat_to_ticks(zone.end_beat, ticks_per_quarter);
        log::debug!(
            "ImprovZones[{}] start time = {}({} ticks) end time = {}({} ticks)",
            i,
            zone.start_beat,
            start,
            zone.end_beat,
            end
        );
        vec![
            TimedEvent {
                tick: start,
                chart_time: zone.start_beat,
                kind: EventKind::Marker { text: IMPROV_START.to_string() },
            },
            TimedEvent {
                tick: end,
                chart_time: zone.end_beat,
                kind: EventKind::Marker { text: IMPROV_END.to_string() },
            },
        ]
    })
}

/// One lyric event per caption.
pub fn lyrics_track(
    lyrics: Option<&[Lyric]>,
    ticks_per_quarter: u16,
    diagnostics: &mut Diagnostics,
) -> Track {
    accumulate(AuxStream::Lyrics, lyrics, diagnostics, |i, lyric| {
        let tick = beat_to_ticks(lyric.bar, ticks_per_quarter);
        log::debug!(
            "Lyrics[{}] start time = {}({} ticks) text = {}",
            i,
            lyric.bar,
            tick,
            lyric.text
        );
        vec![TimedEvent {
            tick,
            chart_time: lyric.bar,
            kind: EventKind::Lyric { text: lyric.text.clone() },
        }]
    })
}

/// `bg_<id>` markers, timed with the tempo-scaled background formula.
pub fn background_track(
    cues: Option<&[BgCue]>,
    tempo_bpm: f32,
    ticks_per_quarter: u16,
    diagnostics: &mut Diagnostics,
) -> Track {
    accumulate(AuxStream::Background, cues, diagnostics, |i, cue| {
        let tick = bg_cue_to_ticks(cue.time, tempo_bpm, ticks_per_quarter);
        log::debug!(
            "BgEvents[{}] start time = {}({} ticks) id = {}",
            i,
            cue.time,
            tick,
            cue.cue_id
        );
        vec![TimedEvent {
            tick,
            chart_time: cue.time,
            kind: EventKind::Marker { text: bg_cue_text(cue.cue_id) },
        }]
    })
}

fn bg_cue_text(cue_id: f32) -> String {
    format!("{}{}", BG_CUE_PREFIX, cue_id.floor() as i64)
}
