use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::sampler::SamplerSettings;

/// On-disk configuration for the meter.
///
/// Deliberately small: classifier thresholds, the dead-band window and the
/// gauge scale are fixed constants of the meter, not configuration.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(default)]
pub struct MeterConfig {
    pub sampler: SamplerConfig,
    pub display: DisplayConfig,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct SamplerConfig {
    /// Forwarding interval in milliseconds; values below 500 are clamped.
    pub sample_interval_ms: u64,
    /// Route samples through the legacy combined channel.
    pub use_combined_channel: bool,
    /// Swing of the simulated accelerometer around gravity, in m/s².
    pub simulated_amplitude: f32,
    /// Period of the simulated driving profile, in seconds.
    pub simulated_period_secs: f32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 500,
            use_combined_channel: false,
            simulated_amplitude: 6.0,
            simulated_period_secs: 12.0,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct DisplayConfig {
    /// Capacity of the update channel between processor and sink.
    pub update_channel_capacity: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            update_channel_capacity: 100,
        }
    }
}

impl MeterConfig {
    /// Load the config file, writing defaults on first run. Any failure
    /// falls back to defaults with a warning; configuration problems never
    /// keep the meter from starting.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            warn!("No config directory on this host, using defaults");
            return Self::default();
        };

        if !path.exists() {
            let config = Self::default();
            config.write_default(&path);
            return config;
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Invalid config at {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Unable to read {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gforce-meter").join("config.toml"))
    }

    fn write_default(&self, path: &PathBuf) {
        let serialized = match toml::to_string_pretty(self) {
            Ok(s) => s,
            Err(e) => {
                warn!("Unable to serialize default config: {}", e);
                return;
            }
        };

        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Unable to create {}: {}", parent.display(), e);
                return;
            }
        }
        match fs::write(path, serialized) {
            Ok(()) => info!("Wrote default config to {}", path.display()),
            Err(e) => warn!("Unable to write {}: {}", path.display(), e),
        }
        debug!("Default config: {:?}", self);
    }

    pub fn sampler_settings(&self) -> SamplerSettings {
        SamplerSettings {
            sample_interval_ms: self.sampler.sample_interval_ms,
            use_combined_channel: self.sampler.use_combined_channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_roundtrip_through_toml() {
        let config = MeterConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: MeterConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(parsed.sampler.sample_interval_ms, 500);
        assert!(!parsed.sampler.use_combined_channel);
        assert_eq!(parsed.display.update_channel_capacity, 100);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: MeterConfig = toml::from_str("[sampler]\nsample_interval_ms = 750\n").unwrap();
        assert_eq!(parsed.sampler.sample_interval_ms, 750);
        assert_eq!(
            parsed.sampler.simulated_amplitude,
            SamplerConfig::default().simulated_amplitude
        );
        assert_eq!(parsed.display.update_channel_capacity, 100);
    }
}
