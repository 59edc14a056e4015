use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::sim::{
    DerivationMode, GpsNoiseModel, NoiseModel, EARTH_MASS_KG, GRAVITATIONAL_CONSTANT,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{0}")]
    Invalid(String),
}

/// Everything a run depends on besides the TLE and the caller's generator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Sample step, humantime format in YAML ("10s", "500ms").
    #[serde(deserialize_with = "duration_from_str")]
    pub dt: Duration,
    #[serde(deserialize_with = "duration_from_str")]
    pub duration: Duration,
    pub mode: DerivationMode,
    /// Seeds the run's generator; entropy-seeded when absent.
    pub seed: Option<u64>,
    /// Nominal epoch of the first sample; the CLI falls back to the current
    /// time, the core never reads the clock itself.
    pub start: Option<DateTime<Utc>>,
    pub gravity: GravityModel,
    pub accelerometer: NoiseModel,
    pub gyroscope: NoiseModel,
    pub gps: GpsNoiseModel,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GravityModel {
    pub gravitational_constant: f64,
    pub central_mass_kg: f64,
}

impl GravityModel {
    pub fn mu(&self) -> f64 {
        self.gravitational_constant * self.central_mass_kg
    }
}

impl Default for GravityModel {
    fn default() -> Self {
        Self {
            gravitational_constant: GRAVITATIONAL_CONSTANT,
            central_mass_kg: EARTH_MASS_KG,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: Duration::from_secs(10),
            duration: Duration::from_secs(600),
            mode: DerivationMode::GravityCorrected,
            seed: None,
            start: None,
            gravity: GravityModel::default(),
            // MPU-6050-class IMU budget.
            accelerometer: NoiseModel {
                white_noise_std: 0.098,
                bias_std: 0.49,
                drift_rate_std: 0.001,
            },
            gyroscope: NoiseModel {
                white_noise_std: 0.01,
                bias_std: 0.01,
                drift_rate_std: 0.0001,
            },
            // NEO-6M-class receiver.
            gps: GpsNoiseModel {
                white_noise_std: 3.0,
            },
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a YAML configuration document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no propagation call should ever see.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dt.is_zero() {
            return Err(ConfigError::Invalid("dt must be positive".into()));
        }
        if self.duration.is_zero() {
            return Err(ConfigError::Invalid("duration must be positive".into()));
        }

        for (channel, model) in [
            ("accelerometer", &self.accelerometer),
            ("gyroscope", &self.gyroscope),
        ] {
            check_std(channel, "white_noise_std", model.white_noise_std)?;
            check_std(channel, "bias_std", model.bias_std)?;
            check_std(channel, "drift_rate_std", model.drift_rate_std)?;
        }
        check_std("gps", "white_noise_std", self.gps.white_noise_std)?;

        if !(self.gravity.gravitational_constant > 0.0) || !(self.gravity.central_mass_kg > 0.0) {
            return Err(ConfigError::Invalid(
                "gravity constants must be positive".into(),
            ));
        }

        Ok(())
    }

    pub fn dt_seconds(&self) -> f64 {
        self.dt.as_secs_f64()
    }
}

fn check_std(channel: &str, field: &str, value: f64) -> Result<(), ConfigError> {
    if !(value >= 0.0) {
        return Err(ConfigError::Invalid(format!(
            "{channel} {field} must be non-negative, got {value}"
        )));
    }
    Ok(())
}

fn duration_from_str<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        SimulationConfig::default().validate().unwrap();
    }

    #[test]
    fn parses_yaml_with_humantime_durations() {
        let yaml = "\
dt: 5s
duration: 2m
mode: simple
seed: 42
gyroscope:
  white_noise_std: 0.02
  bias_std: 0.0
  drift_rate_std: 0.0
";
        let config = SimulationConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.dt, Duration::from_secs(5));
        assert_eq!(config.duration, Duration::from_secs(120));
        assert_eq!(config.mode, DerivationMode::Simple);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.gyroscope.white_noise_std, 0.02);
        // Unset sections keep their defaults.
        assert_eq!(config.gps.white_noise_std, 3.0);
    }

    #[test]
    fn rejects_zero_dt() {
        let err = SimulationConfig::from_yaml_str("dt: 0s").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_negative_noise_std() {
        let yaml = "\
accelerometer:
  white_noise_std: -0.1
  bias_std: 0.0
  drift_rate_std: 0.0
";
        let err = SimulationConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = SimulationConfig::from_yaml_str("step_size: 10s").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn mu_is_the_product_of_g_and_mass() {
        let gravity = GravityModel::default();
        assert_eq!(gravity.mu(), GRAVITATIONAL_CONSTANT * EARTH_MASS_KG);
    }
}
