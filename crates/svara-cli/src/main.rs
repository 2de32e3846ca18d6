//! svara: note, sargam and pitch explorer for Svara Darshini

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use svara_core::ChromaticNote;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Svara Darshini - explore notes, sargam degrees and pitch
#[derive(Parser)]
#[command(name = "svara")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the major scale of a tonic with its sargam degrees
    Scale {
        /// Tonic (Sa), e.g. C, F#
        tonic: ChromaticNote,
    },

    /// Sargam degree of a note relative to a tonic
    Sargam {
        note: ChromaticNote,

        /// Tonic (default: configured tonic)
        #[arg(short, long)]
        tonic: Option<ChromaticNote>,

        /// Also name altered (flat/sharp) degrees
        #[arg(long)]
        chromatic: bool,
    },

    /// Frequency of a note number (69 = A4 = 440 Hz)
    Freq {
        #[arg(allow_hyphen_values = true)]
        note_number: i32,
    },

    /// Nearest note, octave and detune for a frequency
    Note {
        /// Frequency in Hz
        hz: f64,

        /// Tonic (default: configured tonic)
        #[arg(short, long)]
        tonic: Option<ChromaticNote>,
    },

    /// Translate typed sargam keys (s R r G g m M p D d N n) into notes
    Keys {
        keys: String,

        /// Tonic (default: configured tonic)
        #[arg(short, long)]
        tonic: Option<ChromaticNote>,
    },

    /// Detect pitch across a WAV file
    Detect {
        path: PathBuf,

        /// Tonic (default: configured tonic)
        #[arg(short, long)]
        tonic: Option<ChromaticNote>,

        /// Stream frames at playback speed
        #[arg(long)]
        realtime: bool,

        /// With --realtime, stop after this many seconds without pitch (0 disables;
        /// default from config). Ignored without --realtime
        #[arg(long)]
        idle_secs: Option<f64>,
    },

    /// Show the configuration
    Config {
        /// Persist a new default tonic
        #[arg(long)]
        set_tonic: Option<ChromaticNote>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("svara=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config_path = config::config_path();
    let app_config = config::load_config(&config_path);
    let default_tonic = app_config.general.tonic;
    let json = cli.json;

    match cli.command {
        Commands::Scale { tonic } => {
            let report = commands::scale_report(tonic);
            emit(json, &report, || {
                for entry in &report.degrees {
                    println!("{:<3} {:<4} ({})", entry.note, entry.degree, entry.key);
                }
            })
        }
        Commands::Sargam { note, tonic, chromatic } => {
            let report = commands::sargam_report(note, tonic.unwrap_or(default_tonic), chromatic)?;
            emit(json, &report, || {
                println!(
                    "{} in {}: {} ({})",
                    report.entry.note, report.tonic, report.entry.degree, report.entry.key
                )
            })
        }
        Commands::Freq { note_number } => {
            let report = commands::freq_report(note_number)?;
            emit(json, &report, || {
                println!("{} ({}): {:.3} Hz", report.name, report.note_number, report.frequency)
            })
        }
        Commands::Note { hz, tonic } => {
            let report = commands::note_report(hz, tonic.unwrap_or(default_tonic))?;
            emit(json, &report, || {
                println!(
                    "{} ({}) {:+} cents; {} in {} ({})",
                    report.name,
                    report.reading.note_number,
                    report.reading.cents,
                    report.degree,
                    report.tonic,
                    report.key
                )
            })
        }
        Commands::Keys { keys, tonic } => {
            let report = commands::keys_report(&keys, tonic.unwrap_or(default_tonic), &app_config)?;
            emit(json, &report, || {
                let notes: Vec<String> = report.notes.iter().map(ToString::to_string).collect();
                println!("{}", notes.join(" "))
            })
        }
        Commands::Detect { path, tonic, realtime, idle_secs } => {
            let options = commands::session_options(realtime, idle_secs, &app_config);
            let summary = commands::detect(
                &path,
                tonic.unwrap_or(default_tonic),
                &app_config,
                options,
                |reading| {
                    if !json {
                        commands::print_reading(reading)
                    }
                },
            )?;
            emit(json, &summary, || {
                if summary.idle {
                    println!("stopped: no pitch for {:?}", options.idle_timeout.unwrap_or_default());
                }
                println!("{} pitched frames", summary.readings.len());
            })
        }
        Commands::Config { set_tonic } => {
            let (path, config) = commands::config_command(config_path, set_tonic)?;
            if json {
                print_json(&config)
            } else {
                println!("# {}", path.display());
                print!("{}", toml::to_string_pretty(&config)?);
                Ok(())
            }
        }
    }
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce()) -> anyhow::Result<()> {
    if json {
        print_json(value)
    } else {
        text();
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
