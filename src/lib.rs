//! # tmb-midi
//!
//! Converts Trombone Champ charts (`.tmb`) into Standard MIDI Files.
//!
//! ## Pipeline
//! 1. [`TmbChart`] - load the chart JSON
//! 2. [`convert()`] - quantize notes and markers to ticks and split overlapping notes into passes
//! 3. [`smf::write_smf()`] - encode the tracks as a MIDI container
//!
//! Step 2 is pure and infallible; everything it adjusts along the way is
//! reported as a [`Diagnostic`] in the returned [`ConversionResult`].
//!
//! ## Example
//! ```rust
//! use tmb_midi::{convert_str, ConverterSettings};
//!
//! let chart = r#"{
//!     "name": "Example",
//!     "tempo": 120,
//!     "notes": [[0, 1, 0, 0, 0], [1, 1, 0, 0, 13.75]]
//! }"#;
//!
//! let (result, midi) = convert_str(chart, &ConverterSettings::default())?;
//! assert_eq!(result.ticks_per_quarter_note, 960);
//! assert_eq!(&midi[0..4], b"MThd");
//! # Ok::<(), tmb_midi::TmbError>(())
//! ```

pub mod chart;
pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod pitch;
pub mod settings;
pub mod smf;
pub mod timing;

use std::path::Path;

pub use chart::{BgCue, ImprovZone, Lyric, Note, TmbChart};
pub use convert::{convert, ConversionResult, PassOutcome};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::TmbError;
pub use event::{Event, EventKind, Track};
pub use settings::{ConverterSettings, PitchBendRange, TrackGrouping};

/// Convert chart JSON to MIDI file bytes.
///
/// Returns the conversion result alongside the bytes so callers can inspect
/// diagnostics.
pub fn convert_str(
    json: &str,
    settings: &ConverterSettings,
) -> Result<(ConversionResult, Vec<u8>), TmbError> {
    let chart = TmbChart::from_json_str(json)?;
    let result = convert(&chart, settings.pitch_bend_range);
    let mut midi = Vec::new();
    smf::write_smf(&result, settings.track_grouping, &mut midi)?;
    Ok((result, midi))
}

/// Convert a `.tmb` file and write the MIDI file to `output`.
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    settings: &ConverterSettings,
) -> Result<ConversionResult, TmbError> {
    let chart = TmbChart::load(input)?;
    log::info!("Attempting to generate MIDI for trackref: {}", chart.trackref);
    let result = convert(&chart, settings.pitch_bend_range);
    smf::write_file(&result, settings.track_grouping, output)?;
    Ok(result)
}
