//! Monophonic pitch detection (YIN)

use serde::{Deserialize, Serialize};

use crate::error::{Result, SvaraError};

/// Pitch detector configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Sample rate of the analysed audio
    pub sample_rate: u32,
    /// Analysis window size in samples
    pub window_size: usize,
    /// Distance between consecutive windows in samples
    pub hop_size: usize,
    /// Lowest detectable frequency (Hz)
    pub min_freq: f32,
    /// Highest detectable frequency (Hz)
    pub max_freq: f32,
    /// Dip threshold on the normalised difference function (0..1)
    pub threshold: f32,
    /// Frames with RMS below this are treated as silence
    pub silence_rms: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            window_size: 2048,
            hop_size: 512,
            min_freq: 50.0,
            max_freq: 2000.0,
            threshold: 0.15,
            silence_rms: 0.01,
        }
    }
}

impl DetectorConfig {
    /// Longest period (in samples) the detector searches
    fn max_lag(&self) -> usize {
        (self.sample_rate as f64 / self.min_freq as f64).ceil() as usize
    }

    /// Shortest period (in samples) the detector searches
    fn min_lag(&self) -> usize {
        ((self.sample_rate as f32 / self.max_freq).floor() as usize).max(2)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(SvaraError::InvalidConfig(msg)) };

        if self.sample_rate == 0 {
            return invalid("sample_rate must be positive".into());
        }
        if self.hop_size == 0 {
            return invalid("hop_size must be positive".into());
        }
        if !(self.min_freq > 0.0 && self.min_freq < self.max_freq) {
            return invalid(format!(
                "frequency range {}..{} Hz is empty or non-positive",
                self.min_freq, self.max_freq
            ));
        }
        if self.max_freq > self.sample_rate as f32 / 2.0 {
            return invalid(format!(
                "max_freq {} Hz is above Nyquist for {} Hz",
                self.max_freq, self.sample_rate
            ));
        }
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return invalid(format!("threshold {} must be in (0, 1)", self.threshold));
        }
        if self.silence_rms < 0.0 {
            return invalid("silence_rms must not be negative".into());
        }
        // the integration window must still hold a full period at the longest lag;
        // checked in float so a tiny min_freq cannot saturate the usize lag
        let needed = 2.0 * (self.sample_rate as f64 / self.min_freq as f64).ceil();
        if !needed.is_finite() || needed > self.window_size as f64 {
            return invalid(format!(
                "window_size {} is too small for min_freq {} Hz (need {})",
                self.window_size, self.min_freq, needed
            ));
        }
        Ok(())
    }
}

/// YIN fundamental frequency estimator.
///
/// Holds scratch buffers so repeated calls do not allocate.
#[derive(Debug, Clone)]
pub struct PitchDetector {
    config: DetectorConfig,
    tau_min: usize,
    tau_max: usize,
    diff: Vec<f32>,
}

impl PitchDetector {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        let tau_max = config.max_lag();
        Ok(Self {
            config,
            tau_min: config.min_lag(),
            tau_max,
            diff: vec![0.0; tau_max + 1],
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Estimate the fundamental frequency of the first `window_size` samples.
    ///
    /// Returns `Ok(None)` for silent or unpitched frames.
    pub fn detect(&mut self, frame: &[f32]) -> Result<Option<f64>> {
        let window = self.config.window_size;
        if frame.len() < window {
            return Err(SvaraError::FrameTooShort {
                expected: window,
                actual: frame.len(),
            });
        }
        let frame = &frame[..window];

        if rms(frame) < self.config.silence_rms {
            return Ok(None);
        }

        self.difference(frame);
        self.normalize();

        let Some(tau) = self.first_dip() else {
            return Ok(None);
        };
        let period = self.refine(tau);
        Ok(Some(self.config.sample_rate as f64 / period))
    }

    /// d(tau) = sum (x[j] - x[j + tau])^2 over the integration window
    fn difference(&mut self, frame: &[f32]) {
        let span = frame.len() - self.tau_max;
        for tau in 0..=self.tau_max {
            self.diff[tau] = frame[..span]
                .iter()
                .zip(&frame[tau..tau + span])
                .map(|(a, b)| (a - b) * (a - b))
                .sum();
        }
    }

    /// Cumulative mean normalised difference, in place
    fn normalize(&mut self) {
        self.diff[0] = 1.0;
        let mut running = 0.0f32;
        for tau in 1..=self.tau_max {
            running += self.diff[tau];
            self.diff[tau] = if running > 0.0 {
                self.diff[tau] * tau as f32 / running
            } else {
                1.0
            };
        }
    }

    /// First lag under the threshold, followed down to its local minimum
    fn first_dip(&self) -> Option<usize> {
        let mut tau = self.tau_min;
        while tau <= self.tau_max {
            if self.diff[tau] < self.config.threshold {
                while tau < self.tau_max && self.diff[tau + 1] < self.diff[tau] {
                    tau += 1;
                }
                return Some(tau);
            }
            tau += 1;
        }
        None
    }

    /// Parabolic interpolation around `tau`
    fn refine(&self, tau: usize) -> f64 {
        if tau == 0 || tau >= self.tau_max {
            return tau as f64;
        }
        let (s0, s1, s2) = (self.diff[tau - 1], self.diff[tau], self.diff[tau + 1]);
        let denom = s0 + s2 - 2.0 * s1;
        if denom.abs() < f32::EPSILON {
            return tau as f64;
        }
        tau as f64 + ((s0 - s2) / (2.0 * denom)) as f64
    }
}

fn rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    (frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32).sqrt()
}
