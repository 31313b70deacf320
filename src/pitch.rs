//! Pitch conversion from game pitch units to MIDI note plus pitch bend.
//!
//! The game stores pitch as a continuous value where 13.75 units make one
//! semitone and 0 is middle C. MIDI needs a whole note number, so anything
//! between semitones is carried by a pitch-bend value.

use crate::settings::PitchBendRange;

/// Game pitch units per semitone.
pub const PITCH_UNITS_PER_SEMITONE: f32 = 13.75;

/// MIDI note for pitch unit 0 (C4).
pub const REFERENCE_NOTE: i32 = 60;

/// Pitch-bend magnitude for a full bend-range offset. Bend values are signed,
/// 0 means no bend.
pub const PITCH_BEND_SCALE: i32 = 8192;

/// A game pitch split into a whole MIDI note and a signed bend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiPitch {
    pub note: i32,
    pub bend: i32,
}

/// Split a game pitch into the nearest MIDI note and the bend that makes up the rest.
///
/// Bends of exactly ±1 are float noise from chart authoring and are forced to 0.
/// The note number is not clamped to the MIDI range.
///
/// ```
/// use tmb_midi::pitch::{to_midi_pitch, MidiPitch};
/// use tmb_midi::PitchBendRange;
///
/// let range = PitchBendRange::new(2).unwrap();
/// assert_eq!(to_midi_pitch(0.0, range), MidiPitch { note: 60, bend: 0 });
/// assert_eq!(to_midi_pitch(13.75, range), MidiPitch { note: 61, bend: 0 });
/// // a quarter tone above C4
/// assert_eq!(to_midi_pitch(6.875, range), MidiPitch { note: 61, bend: -2048 });
/// ```
pub fn to_midi_pitch(pitch_units: f32, range: PitchBendRange) -> MidiPitch {
    let exact = pitch_units / PITCH_UNITS_PER_SEMITONE + REFERENCE_NOTE as f32;
    let note = exact.round() as i32;
    let offset = (exact - note as f32) / f32::from(range.semitones());
    let mut bend = (offset * PITCH_BEND_SCALE as f32).round() as i32;

    if bend.abs() == 1 {
        bend = 0;
    }

    MidiPitch { note, bend }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn range(semitones: u16) -> PitchBendRange {
        PitchBendRange::new(semitones).unwrap()
    }

    #[test]
    fn test_whole_semitones() {
        assert_eq!(to_midi_pitch(0.0, range(2)).note, 60);
        assert_eq!(to_midi_pitch(-165.0, range(2)).note, 48);
        assert_eq!(to_midi_pitch(165.0, range(2)).note, 72);
        assert_eq!(to_midi_pitch(165.0, range(2)).bend, 0);
    }

    #[test]
    fn test_bend_scales_with_range() {
        // 3.4375 units = a quarter semitone
        assert_eq!(to_midi_pitch(3.4375, range(1)).bend, 2048);
        assert_eq!(to_midi_pitch(3.4375, range(2)).bend, 1024);
        assert_eq!(to_midi_pitch(-3.4375, range(2)).bend, -1024);
        assert_eq!(to_midi_pitch(3.4375, range(12)).bend, 171);
    }

    #[test]
    fn test_unit_bend_is_noise() {
        // 0.0035 units is about 1.04 bend steps at range 2; rounds to 1 and is dropped
        let pitch = to_midi_pitch(0.0035, range(2));
        assert_eq!(pitch, MidiPitch { note: 60, bend: 0 });
        let pitch = to_midi_pitch(-0.0035, range(2));
        assert_eq!(pitch, MidiPitch { note: 60, bend: 0 });
    }

    proptest! {
        #[test]
        fn bend_is_never_unit_and_stays_in_range(
            units in -2000.0f32..2000.0,
            semitones in 1u16..=24,
        ) {
            let pitch = to_midi_pitch(units, range(semitones));
            prop_assert_ne!(pitch.bend.abs(), 1);
            prop_assert!((-8192..=8191).contains(&pitch.bend));
        }

        #[test]
        fn note_is_the_nearest_semitone(units in -2000.0f32..2000.0) {
            let pitch = to_midi_pitch(units, range(2));
            let exact = units / PITCH_UNITS_PER_SEMITONE + REFERENCE_NOTE as f32;
            prop_assert!((exact - pitch.note as f32).abs() <= 0.5);
        }
    }
}
