//! Time quantization from chart beats to MIDI ticks.
//!
//! All output timing uses a fixed resolution of [`TICKS_PER_QUARTER_NOTE`].
//! Chart beats are quarter notes, so a beat position maps straight onto ticks.

/// Signed tick count at the fixed resolution.
pub type Tick = i64;

/// Fixed output resolution.
pub const TICKS_PER_QUARTER_NOTE: u16 = 960;

/// Largest tick magnitude a quantized position can take. Keeps every
/// difference between two ticks well inside `i64`.
pub const MAX_TICK: Tick = 1 << 48;

/// Quantize a beat position to the nearest tick (halves round away from zero).
///
/// ```
/// use tmb_midi::timing::beat_to_ticks;
///
/// assert_eq!(beat_to_ticks(1.0, 960), 960);
/// assert_eq!(beat_to_ticks(0.25, 960), 240);
/// ```
pub fn beat_to_ticks(beat: f32, ticks_per_quarter: u16) -> Tick {
    clamp_ticks(beat * f32::from(ticks_per_quarter))
}

/// Quantize a background cue time.
///
/// Background cues are scaled by `tempo / 60` before quantization, unlike
/// notes, lyrics and improv zones. Charts are authored against this
/// behaviour, so it is kept as is.
pub fn bg_cue_to_ticks(time: f32, tempo_bpm: f32, ticks_per_quarter: u16) -> Tick {
    let seconds_per_beat = tempo_bpm / 60.0;
    clamp_ticks(seconds_per_beat * time * f32::from(ticks_per_quarter))
}

fn clamp_ticks(ticks: f32) -> Tick {
    (ticks.round() as Tick).clamp(-MAX_TICK, MAX_TICK)
}

/// MIDI tempo (microseconds per quarter note) for a tempo in BPM.
///
/// ```
/// use tmb_midi::timing::microseconds_per_beat;
///
/// assert_eq!(microseconds_per_beat(120.0), 500_000);
/// ```
pub fn microseconds_per_beat(tempo_bpm: f32) -> i64 {
    (60.0 / f64::from(tempo_bpm) * 1_000_000.0).round() as i64
}

/// Length of the crossover note used to render a slide.
///
/// The smaller of an eighth of a beat and half the parent note.
pub fn slide_length(note_ticks: Tick, ticks_per_quarter: u16) -> Tick {
    let eighth_beat = Tick::from(ticks_per_quarter / 8);
    eighth_beat.min(note_ticks / 2).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beat_to_ticks_rounding() {
        assert_eq!(beat_to_ticks(0.0, 960), 0);
        assert_eq!(beat_to_ticks(2.5, 960), 2400);
        // 0.0005 beats = 0.48 ticks
        assert_eq!(beat_to_ticks(0.0005, 960), 0);
        // half a tick rounds away from zero
        assert_eq!(beat_to_ticks(0.25, 2), 1);
        assert_eq!(beat_to_ticks(-0.25, 2), -1);
        assert_eq!(beat_to_ticks(1.25, 2), 3);
    }

    #[test]
    fn test_extreme_beats_are_clamped() {
        assert_eq!(beat_to_ticks(-1.0e30, 960), -MAX_TICK);
        assert_eq!(beat_to_ticks(1.0e30, 960), MAX_TICK);
        assert_eq!(beat_to_ticks(f32::INFINITY, 960), MAX_TICK);
        assert_eq!(bg_cue_to_ticks(-1.0e30, 120.0, 960), -MAX_TICK);
        assert!(beat_to_ticks(1.0e30, 960).checked_sub(beat_to_ticks(-1.0e30, 960)).is_some());
    }

    #[test]
    fn test_bg_cue_scaled_by_tempo() {
        // 120 BPM: factor 2, so 1.5 -> 3 beats -> 2880 ticks
        assert_eq!(bg_cue_to_ticks(1.5, 120.0, 960), 2880);
        // 60 BPM: factor 1
        assert_eq!(bg_cue_to_ticks(1.5, 60.0, 960), 1440);
    }

    #[test]
    fn test_microseconds_per_beat() {
        assert_eq!(microseconds_per_beat(60.0), 1_000_000);
        assert_eq!(microseconds_per_beat(90.0), 666_667);
        assert_eq!(microseconds_per_beat(140.0), 428_571);
    }

    #[test]
    fn test_slide_length_bounds() {
        assert_eq!(slide_length(960, 960), 120);
        assert_eq!(slide_length(200, 960), 100);
        assert_eq!(slide_length(1, 960), 0);
        assert_eq!(slide_length(0, 960), 0);
        assert_eq!(slide_length(-10, 960), 0);
        for ticks in 0..400 {
            let len = slide_length(ticks, 960);
            assert!(len >= 0 && len <= ticks / 2);
        }
    }
}
