//! Tuner: pitch readings over audio, offline or as a streaming session

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use svara_core::{
    chromatic_degree, notes_to_sargam, ChromaticNote, DetectorConfig, PitchDetector,
    PitchReading, SargamDegree, SvaraError,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::inactivity::{ActivityKind, InactivityTimer};
use crate::wav::MonoAudio;

#[derive(Debug, Error)]
pub enum TunerError {
    #[error("Detector error: {0}")]
    Detector(#[from] SvaraError),
    #[error("Sample rate mismatch: detector expects {expected} Hz, audio is {actual} Hz")]
    SampleRateMismatch { expected: u32, actual: u32 },
}

/// A pitched frame resolved against the tonic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TunerReading {
    /// Start of the analysed frame
    pub time_secs: f64,
    pub pitch: PitchReading,
    pub degree: SargamDegree,
    /// Whether the note belongs to the tonic's major scale
    pub in_scale: bool,
}

/// Events emitted by a [`TunerSession`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TunerEvent {
    Reading(TunerReading),
    Silence { time_secs: f64 },
    /// No pitched frame within the idle timeout; the session stops
    Idle,
    Finished,
}

pub struct Tuner {
    detector: PitchDetector,
    tonic: ChromaticNote,
}

impl Tuner {
    pub fn new(config: DetectorConfig, tonic: ChromaticNote) -> Result<Self, TunerError> {
        Ok(Self {
            detector: PitchDetector::new(config)?,
            tonic,
        })
    }

    pub fn tonic(&self) -> ChromaticNote {
        self.tonic
    }

    pub fn set_tonic(&mut self, tonic: ChromaticNote) {
        self.tonic = tonic;
    }

    pub fn config(&self) -> &DetectorConfig {
        self.detector.config()
    }

    /// Analyse one frame starting at `time_secs`. `None` for silent or unpitched frames.
    pub fn process_frame(
        &mut self,
        frame: &[f32],
        time_secs: f64,
    ) -> Result<Option<TunerReading>, TunerError> {
        let Some(hz) = self.detector.detect(frame)? else {
            return Ok(None);
        };
        let pitch = PitchReading::from_frequency(hz)?;
        let in_scale = notes_to_sargam(self.tonic).contains(&pitch.note);
        Ok(Some(TunerReading {
            time_secs,
            pitch,
            degree: chromatic_degree(pitch.note, self.tonic),
            in_scale,
        }))
    }

    /// Run the detector over every hop-sized frame of `audio`, keeping pitched frames
    pub fn analyze(&mut self, audio: &MonoAudio) -> Result<Vec<TunerReading>, TunerError> {
        let expected = self.config().sample_rate;
        if audio.sample_rate != expected {
            return Err(TunerError::SampleRateMismatch {
                expected,
                actual: audio.sample_rate,
            });
        }

        let (window, hop) = (self.config().window_size, self.config().hop_size);
        let mut readings = Vec::new();
        for (start, frame) in frames(&audio.samples, window, hop) {
            let time_secs = start as f64 / audio.sample_rate as f64;
            if let Some(reading) = self.process_frame(frame, time_secs)? {
                readings.push(reading);
            }
        }

        debug!(
            frames = audio.samples.len() / self.config().hop_size,
            pitched = readings.len(),
            "Analysis complete"
        );
        Ok(readings)
    }
}

/// Window-sized frames every `hop_size` samples, with their start offsets
fn frames(samples: &[f32], window: usize, hop: usize) -> impl Iterator<Item = (usize, &[f32])> {
    (0..samples.len())
        .step_by(hop)
        .take_while(move |start| start + window <= samples.len())
        .map(move |start| (start, &samples[start..start + window]))
}

/// Streaming options
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Pace frames at the audio's own rate instead of as fast as possible
    pub realtime: bool,
    /// Stop after this long without a pitched frame
    pub idle_timeout: Option<Duration>,
}

/// A tuner running on a worker thread, streaming [`TunerEvent`]s.
///
/// The detector runs at the audio's sample rate; `config.sample_rate` is overridden.
pub struct TunerSession {
    events: Receiver<TunerEvent>,
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TunerSession {
    pub fn start(
        audio: MonoAudio,
        config: DetectorConfig,
        tonic: ChromaticNote,
        options: SessionOptions,
    ) -> Result<Self, TunerError> {
        let config = DetectorConfig {
            sample_rate: audio.sample_rate,
            ..config
        };
        let tuner = Tuner::new(config, tonic)?;

        let (tx, rx) = bounded::<TunerEvent>(64);
        let stop_flag = Arc::new(AtomicBool::new(false));
        let worker_stop = stop_flag.clone();

        info!(
            %tonic,
            duration_secs = audio.duration_secs(),
            realtime = options.realtime,
            "Tuner session started"
        );

        let handle = thread::spawn(move || {
            Self::run(tuner, audio, options, tx, worker_stop);
        });

        Ok(Self {
            events: rx,
            stop_flag,
            handle: Some(handle),
        })
    }

    pub fn events(&self) -> &Receiver<TunerEvent> {
        &self.events
    }

    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::SeqCst)
    }

    fn run(
        mut tuner: Tuner,
        audio: MonoAudio,
        options: SessionOptions,
        tx: Sender<TunerEvent>,
        stop_flag: Arc<AtomicBool>,
    ) {
        let idle = Arc::new(AtomicBool::new(false));
        let timer = options.idle_timeout.map(|timeout| {
            let idle = idle.clone();
            let stop_flag = stop_flag.clone();
            InactivityTimer::start(timeout, move || {
                idle.store(true, Ordering::SeqCst);
                stop_flag.store(true, Ordering::SeqCst);
            })
        });

        let (window, hop) = (tuner.config().window_size, tuner.config().hop_size);
        let hop_duration = Duration::from_secs_f64(hop as f64 / audio.sample_rate as f64);

        for (start, frame) in frames(&audio.samples, window, hop) {
            if stop_flag.load(Ordering::SeqCst) {
                break;
            }
            let time_secs = start as f64 / audio.sample_rate as f64;

            let event = match tuner.process_frame(frame, time_secs) {
                Ok(Some(reading)) => {
                    if let Some(timer) = &timer {
                        timer.touch(ActivityKind::Audio);
                    }
                    TunerEvent::Reading(reading)
                }
                Ok(None) => TunerEvent::Silence { time_secs },
                Err(e) => {
                    warn!(error = %e, time_secs, "Frame analysis failed");
                    continue;
                }
            };

            if tx.send(event).is_err() {
                debug!("Tuner receiver dropped");
                return;
            }

            if options.realtime {
                thread::sleep(hop_duration);
            }
        }

        drop(timer);
        if idle.load(Ordering::SeqCst) {
            info!("Tuner session idle");
            let _ = tx.send(TunerEvent::Idle);
        }
        stop_flag.store(true, Ordering::SeqCst);
        let _ = tx.send(TunerEvent::Finished);
        info!("Tuner session finished");
    }
}

impl Drop for TunerSession {
    fn drop(&mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            // drain so a worker blocked on a full channel can observe the stop flag
            while !handle.is_finished() {
                let _ = self.events.recv_timeout(Duration::from_millis(10));
            }
            let _ = handle.join();
        }
    }
}
