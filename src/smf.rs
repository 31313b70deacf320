//! Standard MIDI File output.
//!
//! Translates converted tracks into `midly` events and writes the container.
//! This is the only place where values are forced into MIDI's wire ranges:
//! note numbers are clamped to 0-127, pitch bends are biased by 8192 and
//! clamped to 0-16383, tempos to 24 bits and deltas to 28 bits.

use std::path::Path;

use midly::num::{u14, u15, u24, u28, u4, u7};
use midly::{
    Format, Header, MetaMessage, MidiMessage, PitchBend, Smf, Timing, TrackEvent, TrackEventKind,
};

use crate::convert::ConversionResult;
use crate::error::TmbError;
use crate::event::{EventKind, Track};
use crate::settings::TrackGrouping;
use crate::timing::Tick;

const CHANNEL: u8 = 0;
const NOTE_ON_VELOCITY: u8 = 100;
const PITCH_BEND_CENTER: i32 = 8192;
const PITCH_BEND_MAX_RAW: i32 = 16383;
const MAX_DELTA: i64 = 0x0FFF_FFFF;
const MAX_TEMPO: i64 = 0xFF_FFFF;

/// Build the `midly` representation of a conversion result.
pub fn to_smf(result: &ConversionResult, grouping: TrackGrouping) -> Smf<'_> {
    let (format, tracks) = match grouping {
        TrackGrouping::SingleTrack => (Format::SingleTrack, vec![merge_tracks(&result.tracks)]),
        TrackGrouping::Parallel => (
            Format::Parallel,
            result.tracks.iter().map(container_track).collect(),
        ),
    };

    Smf {
        header: Header::new(format, Timing::Metrical(u15::from(result.ticks_per_quarter_note))),
        tracks,
    }
}

/// Encode a conversion result as MIDI file bytes.
pub fn write_smf(
    result: &ConversionResult,
    grouping: TrackGrouping,
    out: &mut Vec<u8>,
) -> Result<(), TmbError> {
    log::info!("Building final MIDI ({:?})", grouping);
    let smf = to_smf(result, grouping);
    smf.write(out)
        .map_err(|e| TmbError::Midi(format!("Failed to write MIDI: {}", e)))
}

/// Encode a conversion result and write it to `path`.
pub fn write_file<P: AsRef<Path>>(
    result: &ConversionResult,
    grouping: TrackGrouping,
    path: P,
) -> Result<(), TmbError> {
    let path = path.as_ref();
    let mut bytes = Vec::new();
    write_smf(result, grouping, &mut bytes)?;

    log::info!("Writing MIDI to file: {}", path.display());
    std::fs::write(path, bytes).map_err(|e| TmbError::io(path, e))
}

fn container_track(track: &Track) -> Vec<TrackEvent<'_>> {
    let mut events: Vec<TrackEvent> = track
        .events
        .iter()
        .map(|event| TrackEvent {
            delta: wire_delta(event.delta_ticks),
            kind: wire_kind(&event.kind),
        })
        .collect();
    push_end_of_track(&mut events);
    events
}

/// Merge parallel tracks into one, ordered by absolute tick. Events on the
/// same tick keep their track order, then their order within the track.
fn merge_tracks(tracks: &[Track]) -> Vec<TrackEvent<'_>> {
    let mut timed: Vec<(Tick, &EventKind)> = tracks
        .iter()
        .flat_map(|track| {
            let kinds = track.events.iter().map(|e| &e.kind);
            track.absolute_ticks().into_iter().zip(kinds)
        })
        .collect();
    timed.sort_by_key(|(tick, _)| *tick);

    let mut events = Vec::with_capacity(timed.len() + 1);
    let mut previous = 0;
    for (tick, kind) in timed {
        events.push(TrackEvent {
            delta: wire_delta(tick - previous),
            kind: wire_kind(kind),
        });
        previous = tick;
    }
    push_end_of_track(&mut events);
    events
}

fn push_end_of_track(events: &mut Vec<TrackEvent<'_>>) {
    events.push(TrackEvent {
        delta: u28::from(0u32),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
}

fn wire_delta(delta: Tick) -> u28 {
    u28::from(delta.clamp(0, MAX_DELTA) as u32)
}

fn wire_key(pitch: i32) -> u7 {
    u7::from(pitch.clamp(0, 127) as u8)
}

fn wire_kind(kind: &EventKind) -> TrackEventKind<'_> {
    let channel = u4::from(CHANNEL);
    match kind {
        EventKind::NoteOn { pitch } => TrackEventKind::Midi {
            channel,
            message: MidiMessage::NoteOn {
                key: wire_key(*pitch),
                vel: u7::from(NOTE_ON_VELOCITY),
            },
        },
        EventKind::NoteOff { pitch } => TrackEventKind::Midi {
            channel,
            message: MidiMessage::NoteOff {
                key: wire_key(*pitch),
                vel: u7::from(0u8),
            },
        },
        EventKind::PitchBend { value } => {
            let raw = (value + PITCH_BEND_CENTER).clamp(0, PITCH_BEND_MAX_RAW) as u16;
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::PitchBend {
                    bend: PitchBend(u14::from(raw)),
                },
            }
        }
        EventKind::Marker { text } => TrackEventKind::Meta(MetaMessage::Text(text.as_bytes())),
        EventKind::Lyric { text } => TrackEventKind::Meta(MetaMessage::Lyric(text.as_bytes())),
        EventKind::SetTempo { microseconds_per_beat } => {
            let clamped = (*microseconds_per_beat).clamp(1, MAX_TEMPO);
            TrackEventKind::Meta(MetaMessage::Tempo(u24::from(clamped as u32)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Lyric, Note, TmbChart};
    use crate::convert::convert;
    use crate::event::Event;
    use crate::settings::PitchBendRange;

    fn sample_result() -> ConversionResult {
        let mut chart = TmbChart::with_notes(
            120.0,
            vec![Note::new(0.0, 1.0, 3.4375, 3.4375), Note::new(0.5, 1.0, 0.0, 0.0)],
        );
        chart.lyrics = Some(vec![Lyric { bar: 1.0, text: "la".to_string() }]);
        convert(&chart, PitchBendRange::default())
    }

    #[test]
    fn test_write_parallel() {
        let result = sample_result();
        let mut out = Vec::new();
        write_smf(&result, TrackGrouping::Parallel, &mut out).unwrap();

        assert_eq!(&out[0..4], b"MThd");
        let smf = Smf::parse(&out).unwrap();
        assert_eq!(smf.header.format, Format::Parallel);
        assert_eq!(smf.header.timing, Timing::Metrical(u15::from(960u16)));
        assert_eq!(smf.tracks.len(), result.tracks.len());

        assert_eq!(
            smf.tracks[0][0].kind,
            TrackEventKind::Meta(MetaMessage::Tempo(u24::from(500_000u32)))
        );
        for track in &smf.tracks {
            assert_eq!(
                track.last().map(|e| e.kind),
                Some(TrackEventKind::Meta(MetaMessage::EndOfTrack))
            );
        }

        // bend track of the first pass: 0 then +1024, biased by 8192
        let bends: Vec<u16> = smf.tracks[2]
            .iter()
            .filter_map(|e| match e.kind {
                TrackEventKind::Midi {
                    message: MidiMessage::PitchBend { bend },
                    ..
                } => Some(bend.0.as_int()),
                _ => None,
            })
            .collect();
        assert_eq!(bends, vec![8192, 9216]);
    }

    #[test]
    fn test_write_single_track_merges_by_time() {
        let result = sample_result();
        let mut out = Vec::new();
        write_smf(&result, TrackGrouping::SingleTrack, &mut out).unwrap();

        let smf = Smf::parse(&out).unwrap();
        assert_eq!(smf.header.format, Format::SingleTrack);
        assert_eq!(smf.tracks.len(), 1);

        let track = &smf.tracks[0];
        let total_events: usize = result.tracks.iter().map(|t| t.len()).sum();
        assert_eq!(track.len(), total_events + 1);

        // the lyric sits at beat 1, after the second note's note-on at beat 0.5
        let mut now = 0u32;
        let mut lyric_tick = None;
        let mut second_note_on = None;
        for event in track.iter() {
            now += event.delta.as_int();
            match event.kind {
                TrackEventKind::Meta(MetaMessage::Lyric(text)) => {
                    assert_eq!(text, b"la");
                    lyric_tick = Some(now);
                }
                TrackEventKind::Midi { message: MidiMessage::NoteOn { .. }, .. } if now == 480 => {
                    second_note_on = Some(now);
                }
                _ => {}
            }
        }
        assert_eq!(lyric_tick, Some(960));
        assert_eq!(second_note_on, Some(480));
        assert_eq!(now, 1440);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let result = ConversionResult {
            ticks_per_quarter_note: 960,
            tracks: vec![Track::new(vec![
                Event::note_on(200, 0),
                Event::note_off(-5, 10),
                Event::pitch_bend(9000, 0),
                Event::pitch_bend(-9000, 0),
            ])],
            diagnostics: Default::default(),
            note_passes: 1,
            outcome: Default::default(),
        };
        let smf = to_smf(&result, TrackGrouping::Parallel);
        let track = &smf.tracks[0];

        assert_eq!(
            track[0].kind,
            TrackEventKind::Midi {
                channel: u4::from(0u8),
                message: MidiMessage::NoteOn { key: u7::from(127u8), vel: u7::from(100u8) },
            }
        );
        assert_eq!(
            track[1].kind,
            TrackEventKind::Midi {
                channel: u4::from(0u8),
                message: MidiMessage::NoteOff { key: u7::from(0u8), vel: u7::from(0u8) },
            }
        );
        assert_eq!(
            track[2].kind,
            TrackEventKind::Midi {
                channel: u4::from(0u8),
                message: MidiMessage::PitchBend { bend: PitchBend(u14::from(16383u16)) },
            }
        );
        assert_eq!(
            track[3].kind,
            TrackEventKind::Midi {
                channel: u4::from(0u8),
                message: MidiMessage::PitchBend { bend: PitchBend(u14::from(0u16)) },
            }
        );
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.mid");
        write_file(&sample_result(), TrackGrouping::Parallel, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(Smf::parse(&bytes).is_ok());
    }
}
