//! # Converter Settings
//!
//! User-adjustable options, persisted as YAML.
//!
//! ```yaml
//! pitch-bend-range: 12
//! track-grouping: parallel
//! ```
//!
//! Both keys are optional; missing keys fall back to their defaults.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TmbError;

/// Semitone span mapped across the full pitch-bend encoding.
///
/// Must match the bend range configured on the synthesizer that plays the
/// file back, otherwise microtonal notes come out at the wrong pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct PitchBendRange(u16);

impl PitchBendRange {
    pub const DEFAULT: PitchBendRange = PitchBendRange(2);

    pub fn new(semitones: u16) -> Result<Self, TmbError> {
        if semitones == 0 {
            return Err(TmbError::Settings(
                "pitch bend range must be at least 1 semitone".to_string(),
            ));
        }
        Ok(PitchBendRange(semitones))
    }

    pub fn semitones(self) -> u16 {
        self.0
    }
}

impl Default for PitchBendRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u16> for PitchBendRange {
    type Error = TmbError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        PitchBendRange::new(value)
    }
}

impl From<PitchBendRange> for u16 {
    fn from(range: PitchBendRange) -> Self {
        range.0
    }
}

impl fmt::Display for PitchBendRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the converted tracks are laid out in the MIDI container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackGrouping {
    /// SMF format 0: every track merged into one, ordered by absolute time.
    #[default]
    SingleTrack,
    /// SMF format 1: one container track per converted track.
    Parallel,
}

/// Settings for a conversion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConverterSettings {
    pub pitch_bend_range: PitchBendRange,
    pub track_grouping: TrackGrouping,
}

impl ConverterSettings {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, TmbError> {
        serde_yaml::from_str(yaml).map_err(|e| TmbError::Settings(e.to_string()))
    }

    pub fn to_yaml_string(&self) -> Result<String, TmbError> {
        serde_yaml::to_string(self).map_err(|e| TmbError::Settings(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TmbError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| TmbError::io(path, e))?;
        let settings = Self::from_yaml_str(&contents)?;
        log::debug!("Loaded settings from {}: {:?}", path.display(), settings);
        Ok(settings)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), TmbError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_yaml_string()?).map_err(|e| TmbError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ConverterSettings::default();
        assert_eq!(settings.pitch_bend_range.semitones(), 2);
        assert_eq!(settings.track_grouping, TrackGrouping::SingleTrack);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let settings = ConverterSettings::from_yaml_str("pitch-bend-range: 12\n").unwrap();
        assert_eq!(settings.pitch_bend_range.semitones(), 12);
        assert_eq!(settings.track_grouping, TrackGrouping::SingleTrack);

        let settings = ConverterSettings::from_yaml_str("track-grouping: parallel\n").unwrap();
        assert_eq!(settings.pitch_bend_range, PitchBendRange::DEFAULT);
        assert_eq!(settings.track_grouping, TrackGrouping::Parallel);
    }

    #[test]
    fn test_zero_bend_range_rejected() {
        assert!(PitchBendRange::new(0).is_err());
        let result = ConverterSettings::from_yaml_str("pitch-bend-range: 0\n");
        assert!(matches!(result, Err(TmbError::Settings(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        let settings = ConverterSettings {
            pitch_bend_range: PitchBendRange::new(24).unwrap(),
            track_grouping: TrackGrouping::Parallel,
        };

        settings.save(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("pitch-bend-range: 24"));
        assert_eq!(ConverterSettings::load(&path).unwrap(), settings);
    }
}
