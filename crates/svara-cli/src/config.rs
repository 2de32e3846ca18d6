//! Persistent settings in `config.toml` under the user's config directory

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use svara_core::{ChromaticNote, DetectorConfig};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub tuner: TunerConfig,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub tonic: ChromaticNote,
    pub typing_tool_enabled: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            tonic: ChromaticNote::C,
            typing_tool_enabled: true,
        }
    }
}

/// Detector settings; the sample rate always comes from the input audio
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TunerConfig {
    pub window_size: usize,
    pub hop_size: usize,
    pub min_freq: f32,
    pub max_freq: f32,
    pub threshold: f32,
    pub silence_rms: f32,
    /// Stop realtime sessions after this many seconds without a pitched frame; 0 disables
    pub idle_secs: Option<f64>,
}

impl Default for TunerConfig {
    fn default() -> Self {
        let detector = DetectorConfig::default();
        Self {
            window_size: detector.window_size,
            hop_size: detector.hop_size,
            min_freq: detector.min_freq,
            max_freq: detector.max_freq,
            threshold: detector.threshold,
            silence_rms: detector.silence_rms,
            idle_secs: Some(5.0),
        }
    }
}

impl TunerConfig {
    pub fn detector(&self, sample_rate: u32) -> DetectorConfig {
        DetectorConfig {
            sample_rate,
            window_size: self.window_size,
            hop_size: self.hop_size,
            min_freq: self.min_freq,
            max_freq: self.max_freq,
            threshold: self.threshold,
            silence_rms: self.silence_rms,
        }
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_secs
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(Duration::from_secs_f64)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("svara-darshini")
        .join("config.toml")
}

/// Load the config at `path`, falling back to defaults if it is missing or malformed
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return AppConfig::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read config, using defaults");
            return AppConfig::default();
        }
    };

    toml::from_str(&contents).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "Malformed config, using defaults");
        AppConfig::default()
    })
}

pub fn save_config(path: &Path, config: &AppConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let s = toml::to_string_pretty(config).context("serializing config")?;
    std::fs::write(path, s).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("nope.toml"));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.general.tonic, ChromaticNote::C);
        assert!(config.general.typing_tool_enabled);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\ntonic = \"F#\"\n\n[tuner]\nhop_size = 256\n").unwrap();

        let config = load_config(&path);
        assert_eq!(config.general.tonic, ChromaticNote::FSharp);
        assert!(config.general.typing_tool_enabled);
        assert_eq!(config.tuner.hop_size, 256);
        assert_eq!(config.tuner.window_size, TunerConfig::default().window_size);
    }

    #[test]
    fn test_malformed_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\ntonic = \"H\"\n").unwrap();
        assert_eq!(load_config(&path), AppConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.general.tonic = ChromaticNote::DSharp;
        config.tuner.idle_secs = Some(2.5);

        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path), config);
    }

    #[test]
    fn test_detector_and_idle_timeout() {
        let tuner = TunerConfig {
            idle_secs: Some(0.0),
            ..Default::default()
        };
        assert_eq!(tuner.idle_timeout(), None);
        assert_eq!(tuner.detector(22050).sample_rate, 22050);
        assert!(tuner.detector(22050).validate().is_ok());
        assert_eq!(
            TunerConfig::default().idle_timeout(),
            Some(Duration::from_secs(5))
        );
    }
}
