//! Subcommand handlers

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use serde::Serialize;
use svara_core::{
    chromatic_degree, keys_to_notes, note_number_name, note_number_to_frequency,
    note_number_to_octave, notes_to_sargam, sargam_for_note, ChromaticNote, PitchReading,
    SargamDegree,
};
use svara_services::{load_wav, SessionOptions, Tuner, TunerEvent, TunerReading, TunerSession};
use tracing::{info, warn};

use crate::config::{self, AppConfig};

#[derive(Debug, Serialize)]
pub struct DegreeEntry {
    pub note: ChromaticNote,
    pub degree: &'static str,
    pub key: char,
}

impl DegreeEntry {
    fn new(note: ChromaticNote, degree: SargamDegree) -> Self {
        Self {
            note,
            degree: degree.name(),
            key: degree.key(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScaleReport {
    pub tonic: ChromaticNote,
    pub degrees: Vec<DegreeEntry>,
}

pub fn scale_report(tonic: ChromaticNote) -> ScaleReport {
    let degrees = notes_to_sargam(tonic)
        .into_iter()
        .zip(SargamDegree::PURE)
        .map(|(note, degree)| DegreeEntry::new(note, degree))
        .collect();
    ScaleReport { tonic, degrees }
}

#[derive(Debug, Serialize)]
pub struct SargamReport {
    pub tonic: ChromaticNote,
    #[serde(flatten)]
    pub entry: DegreeEntry,
    pub pure: bool,
}

/// Degree of `note`; with `chromatic` altered degrees are named too
pub fn sargam_report(
    note: ChromaticNote,
    tonic: ChromaticNote,
    chromatic: bool,
) -> anyhow::Result<SargamReport> {
    let degree = if chromatic {
        chromatic_degree(note, tonic)
    } else {
        sargam_for_note(note, tonic).context("use --chromatic to name altered degrees")?
    };
    Ok(SargamReport {
        tonic,
        entry: DegreeEntry::new(note, degree),
        pure: degree.is_pure(),
    })
}

#[derive(Debug, Serialize)]
pub struct FreqReport {
    pub note_number: i32,
    pub name: String,
    pub octave: i32,
    pub frequency: f64,
}

pub fn freq_report(note_number: i32) -> anyhow::Result<FreqReport> {
    let frequency = note_number_to_frequency(note_number);
    if !(frequency.is_finite() && frequency > 0.0) {
        bail!("note number {note_number} has no representable frequency");
    }
    Ok(FreqReport {
        note_number,
        name: note_number_name(note_number),
        octave: note_number_to_octave(note_number),
        frequency,
    })
}

#[derive(Debug, Serialize)]
pub struct NoteReport {
    pub name: String,
    #[serde(flatten)]
    pub reading: PitchReading,
    pub tonic: ChromaticNote,
    pub degree: &'static str,
    pub key: char,
    pub in_scale: bool,
}

pub fn note_report(hz: f64, tonic: ChromaticNote) -> anyhow::Result<NoteReport> {
    let reading = PitchReading::from_frequency(hz)?;
    let degree = chromatic_degree(reading.note, tonic);
    Ok(NoteReport {
        name: reading.name(),
        reading,
        tonic,
        degree: degree.name(),
        key: degree.key(),
        in_scale: degree.is_pure(),
    })
}

#[derive(Debug, Serialize)]
pub struct KeysReport {
    pub tonic: ChromaticNote,
    pub keys: String,
    pub notes: Vec<ChromaticNote>,
}

pub fn keys_report(keys: &str, tonic: ChromaticNote, config: &AppConfig) -> anyhow::Result<KeysReport> {
    if !config.general.typing_tool_enabled {
        bail!("typing tool is disabled (general.typing_tool_enabled = false)");
    }
    Ok(KeysReport {
        tonic,
        keys: keys.to_string(),
        notes: keys_to_notes(keys, tonic)?,
    })
}

#[derive(Debug, Default, Serialize)]
pub struct DetectSummary {
    pub readings: Vec<TunerReading>,
    pub silent_frames: usize,
    pub idle: bool,
}

/// Streaming options for `detect`.
///
/// The idle timeout only applies to realtime sessions; `idle_secs` of 0 disables it
/// and `None` falls back to the configured value.
pub fn session_options(realtime: bool, idle_secs: Option<f64>, config: &AppConfig) -> SessionOptions {
    if !realtime {
        if idle_secs.is_some() {
            warn!("--idle-secs only applies with --realtime, ignoring");
        }
        return SessionOptions { realtime, idle_timeout: None };
    }
    let idle_timeout = match idle_secs {
        Some(secs) if secs.is_finite() && secs > 0.0 => Some(Duration::from_secs_f64(secs)),
        Some(_) => None,
        None => config.tuner.idle_timeout(),
    };
    SessionOptions { realtime, idle_timeout }
}

/// Run the tuner over a WAV file, calling `on_reading` for each pitched frame as it arrives
pub fn detect(
    path: &Path,
    tonic: ChromaticNote,
    config: &AppConfig,
    options: SessionOptions,
    mut on_reading: impl FnMut(&TunerReading),
) -> anyhow::Result<DetectSummary> {
    let audio = load_wav(path).with_context(|| format!("loading {}", path.display()))?;
    let detector = config.tuner.detector(audio.sample_rate);

    if !options.realtime {
        let mut tuner = Tuner::new(detector, tonic)?;
        let readings = tuner.analyze(&audio)?;
        readings.iter().for_each(&mut on_reading);
        return Ok(DetectSummary {
            readings,
            ..Default::default()
        });
    }

    let session = TunerSession::start(audio, detector, tonic, options)?;
    let mut summary = DetectSummary::default();
    for event in session.events() {
        match event {
            TunerEvent::Reading(reading) => {
                on_reading(&reading);
                summary.readings.push(reading);
            }
            TunerEvent::Silence { .. } => summary.silent_frames += 1,
            TunerEvent::Idle => summary.idle = true,
            TunerEvent::Finished => break,
        }
    }
    info!(
        readings = summary.readings.len(),
        idle = summary.idle,
        "Detection finished"
    );
    Ok(summary)
}

pub fn print_reading(reading: &TunerReading) {
    println!(
        "{:>8.3}s  {:<4} {:>8.2} Hz  {:+3} cents  {} ({})",
        reading.time_secs,
        reading.pitch.name(),
        reading.pitch.frequency,
        reading.pitch.cents,
        reading.degree.name(),
        reading.degree.key(),
    );
}

/// Load the config at `path`, persisting a new tonic first if one is given
pub fn config_command(
    path: PathBuf,
    set_tonic: Option<ChromaticNote>,
) -> anyhow::Result<(PathBuf, AppConfig)> {
    let mut config = config::load_config(&path);
    if let Some(tonic) = set_tonic {
        config.general.tonic = tonic;
        config::save_config(&path, &config)?;
        info!(%tonic, path = %path.display(), "Saved tonic");
    }
    Ok((path, config))
}
