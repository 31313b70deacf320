//! # Chart Model
//!
//! Serde model of a Trombone Champ `.tmb` chart and the functions that load it.
//!
//! A `.tmb` file is a JSON object. The converter only reads the fields below;
//! anything else in the file is ignored.
//!
//! ```json
//! {
//!   "name": "Example Song",
//!   "shortName": "Example",
//!   "trackref": "example",
//!   "tempo": 120,
//!   "notes": [[0, 1, 0, 0, 0], [1, 1, 0, 0, 13.75]],
//!   "improv_zones": [[4, 8]],
//!   "lyrics": [{ "bar": 2, "text": "la" }],
//!   "bgdata": [[1.5, 2]]
//! }
//! ```
//!
//! ## Note Tuples
//! Each note is `[start_beat, length_beats, start_pitch, unused, end_pitch]`.
//! Pitches are in game pitch units (13.75 per semitone, 0 = middle C).

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::TmbError;

/// A single chart note.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[f32; 5]")]
pub struct Note {
    pub start_beat: f32,
    pub length_beats: f32,
    pub start_pitch: f32,
    /// Fourth tuple element. Present in every chart but never read by the converter.
    pub unused: f32,
    pub end_pitch: f32,
}

impl Note {
    pub fn new(start_beat: f32, length_beats: f32, start_pitch: f32, end_pitch: f32) -> Self {
        Note {
            start_beat,
            length_beats,
            start_pitch,
            unused: 0.0,
            end_pitch,
        }
    }

    pub fn end_beat(&self) -> f32 {
        self.start_beat + self.length_beats
    }

    pub fn is_slide(&self) -> bool {
        self.start_pitch != self.end_pitch
    }
}

impl From<[f32; 5]> for Note {
    fn from(raw: [f32; 5]) -> Self {
        Note {
            start_beat: raw[0],
            length_beats: raw[1],
            start_pitch: raw[2],
            unused: raw[3],
            end_pitch: raw[4],
        }
    }
}

/// An improvisation zone, `[start_beat, end_beat]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[f32; 2]")]
pub struct ImprovZone {
    pub start_beat: f32,
    pub end_beat: f32,
}

impl From<[f32; 2]> for ImprovZone {
    fn from(raw: [f32; 2]) -> Self {
        ImprovZone {
            start_beat: raw[0],
            end_beat: raw[1],
        }
    }
}

/// A lyric caption shown at `bar` (a beat position, despite the name).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Lyric {
    pub bar: f32,
    pub text: String,
}

/// A background animation cue, `[time, cue_id]`.
///
/// `time` is scaled by the tempo before quantization, see
/// [`crate::timing::bg_cue_to_ticks`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[f32; 2]")]
pub struct BgCue {
    pub time: f32,
    pub cue_id: f32,
}

impl From<[f32; 2]> for BgCue {
    fn from(raw: [f32; 2]) -> Self {
        BgCue {
            time: raw[0],
            cue_id: raw[1],
        }
    }
}

/// A complete chart as read from a `.tmb` file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TmbChart {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "shortName")]
    pub short_name: String,
    #[serde(default)]
    pub trackref: String,
    /// Tempo in beats per minute.
    pub tempo: f32,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub improv_zones: Option<Vec<ImprovZone>>,
    #[serde(default)]
    pub lyrics: Option<Vec<Lyric>>,
    #[serde(default)]
    pub bgdata: Option<Vec<BgCue>>,
}

impl TmbChart {
    /// Build a chart with the given tempo and notes, and no auxiliary streams.
    pub fn with_notes(tempo: f32, notes: Vec<Note>) -> Self {
        TmbChart {
            name: String::new(),
            short_name: String::new(),
            trackref: String::new(),
            tempo,
            notes,
            improv_zones: None,
            lyrics: None,
            bgdata: None,
        }
    }

    /// Parse and validate a chart from its JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, TmbError> {
        let chart: TmbChart = serde_json::from_str(json)?;
        chart.validate()?;
        Ok(chart)
    }

    /// Parse and validate a chart from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TmbError> {
        let chart: TmbChart = serde_json::from_reader(reader)?;
        chart.validate()?;
        Ok(chart)
    }

    /// Load a chart from a `.tmb` file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TmbError> {
        let path = path.as_ref();
        log::info!("Loading chart: {}", path.display());
        let contents = std::fs::read_to_string(path).map_err(|e| TmbError::io(path, e))?;
        Self::from_json_str(&contents)
    }

    /// Check the values the conversion core relies on.
    ///
    /// The tempo divides into the MIDI tempo, so it must be finite and positive.
    pub fn validate(&self) -> Result<(), TmbError> {
        if !self.tempo.is_finite() || self.tempo <= 0.0 {
            return Err(TmbError::InvalidChart(format!(
                "tempo must be a positive number of beats per minute, got {}",
                self.tempo
            )));
        }
        Ok(())
    }

    pub fn improv_zones(&self) -> &[ImprovZone] {
        self.improv_zones.as_deref().unwrap_or_default()
    }

    pub fn lyrics(&self) -> &[Lyric] {
        self.lyrics.as_deref().unwrap_or_default()
    }

    pub fn bgdata(&self) -> &[BgCue] {
        self.bgdata.as_deref().unwrap_or_default()
    }
}
