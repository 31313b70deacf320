use std::env;
use std::path::{Path, PathBuf};
use std::process;

use tmb_midi::{convert, smf, ConverterSettings, PitchBendRange, TmbChart, TrackGrouping};

const USAGE: &str = "Usage: tmb2midi [options] <input.tmb> [output.mid]

Options:
  --config <settings.yaml>    Load converter settings from a YAML file
  --pitch-bend-range <n>      Semitones covered by a full pitch bend (default 2)
  --parallel                  Write one MIDI track per converted track (SMF format 1)
  --report                    Print every conversion diagnostic";

struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    pitch_bend_range: Option<u16>,
    parallel: bool,
    report: bool,
}

fn usage_error(message: &str) -> ! {
    eprintln!("{}", message);
    eprintln!("{}", USAGE);
    process::exit(1);
}

fn parse_args() -> Args {
    let mut input = None;
    let mut output = None;
    let mut config = None;
    let mut pitch_bend_range = None;
    let mut parallel = false;
    let mut report = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => match args.next() {
                Some(path) => config = Some(PathBuf::from(path)),
                None => usage_error("--config needs a file path"),
            },
            "--pitch-bend-range" => match args.next().map(|v| v.parse::<u16>()) {
                Some(Ok(value)) => pitch_bend_range = Some(value),
                _ => usage_error("--pitch-bend-range needs a whole number of semitones"),
            },
            "--parallel" => parallel = true,
            "--report" => report = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                process::exit(0);
            }
            flag if flag.starts_with("--") => usage_error(&format!("Unknown option '{}'", flag)),
            _ if input.is_none() => input = Some(PathBuf::from(&arg)),
            _ if output.is_none() => output = Some(PathBuf::from(&arg)),
            _ => usage_error(&format!("Unexpected argument '{}'", arg)),
        }
    }

    let Some(input) = input else {
        usage_error("Missing input file");
    };

    Args {
        input,
        output,
        config,
        pitch_bend_range,
        parallel,
        report,
    }
}

fn load_settings(args: &Args) -> Result<ConverterSettings, tmb_midi::TmbError> {
    let mut settings = match &args.config {
        Some(path) => ConverterSettings::load(path)?,
        None => ConverterSettings::default(),
    };
    if let Some(range) = args.pitch_bend_range {
        settings.pitch_bend_range = PitchBendRange::new(range)?;
    }
    if args.parallel {
        settings.track_grouping = TrackGrouping::Parallel;
    }
    Ok(settings)
}

fn default_output(input: &Path) -> PathBuf {
    input.with_extension("mid")
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();

    let settings = match load_settings(&args) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let chart = match TmbChart::load(&args.input) {
        Ok(chart) => chart,
        Err(e) => {
            eprintln!("Failed to load song data: {}", e);
            process::exit(1);
        }
    };

    log::info!("Trackref: {}", chart.trackref);
    log::info!("Name: {}", chart.name);
    log::info!("Short Name: {}", chart.short_name);
    log::info!("Tempo: {}", chart.tempo);

    let result = convert(&chart, settings.pitch_bend_range);

    if args.report {
        for diagnostic in &result.diagnostics {
            eprintln!("  {}", diagnostic);
        }
    }

    let output = args.output.unwrap_or_else(|| default_output(&args.input));
    if let Err(e) = smf::write_file(&result, settings.track_grouping, &output) {
        eprintln!("Failed to generate MIDI: {}", e);
        process::exit(1);
    }

    eprintln!(
        "Wrote {} ({} tracks, {} note passes, {} diagnostics)",
        output.display(),
        result.tracks.len(),
        result.note_passes,
        result.diagnostics.len()
    );
    if !result.outcome.is_complete() {
        eprintln!("Warning: some notes could not be placed and were dropped, see the log");
    }
}
