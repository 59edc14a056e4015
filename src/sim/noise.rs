use nalgebra::Vector3;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Stochastic error budget for one IMU channel. Standard deviations are in
/// the channel's own units (m/s² for the accelerometer, the angular-rate
/// channel's units for the gyroscope).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoiseModel {
    /// Per-sample, per-axis Gaussian noise.
    pub white_noise_std: f64,
    /// Spread of the constant per-axis offset drawn once per run.
    pub bias_std: f64,
    /// Spread of the per-step random-walk increment; the walk is unbounded,
    /// as real inertial sensor drift is between resets.
    pub drift_rate_std: f64,
}

impl NoiseModel {
    /// A silent channel: corruption with this model is the identity.
    #[allow(dead_code)]
    pub fn quiet() -> Self {
        Self {
            white_noise_std: 0.0,
            bias_std: 0.0,
            drift_rate_std: 0.0,
        }
    }
}

/// GPS positions get white noise only; receiver bias and drift are not
/// modeled on this channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GpsNoiseModel {
    /// Per-sample, per-axis Gaussian position noise, meters.
    pub white_noise_std: f64,
}

impl GpsNoiseModel {
    pub fn corrupt<R: Rng>(&self, series: &[Vector3<f64>], rng: &mut R) -> Vec<Vector3<f64>> {
        series
            .iter()
            .map(|truth| truth + gauss_vector(rng, self.white_noise_std))
            .collect()
    }
}

/// One run's realization of a [`NoiseModel`]: the bias axes are drawn at
/// construction and held constant for every sample of the run.
pub struct Realization {
    bias: Vector3<f64>,
    white_noise_std: f64,
    drift_rate_std: f64,
}

impl Realization {
    pub fn draw<R: Rng>(model: &NoiseModel, rng: &mut R) -> Self {
        Self {
            bias: gauss_vector(rng, model.bias_std),
            white_noise_std: model.white_noise_std,
            drift_rate_std: model.drift_rate_std,
        }
    }

    /// corrupted = truth + white + bias + drift, where drift is the running
    /// sum of one Gaussian increment per step and axis.
    pub fn corrupt<R: Rng>(&self, series: &[Vector3<f64>], rng: &mut R) -> Vec<Vector3<f64>> {
        let mut drift = Vector3::zeros();
        series
            .iter()
            .map(|truth| {
                let white = gauss_vector(rng, self.white_noise_std);
                drift += gauss_vector(rng, self.drift_rate_std);
                truth + white + self.bias + drift
            })
            .collect()
    }
}

fn gauss_vector<R: Rng>(rng: &mut R, std: f64) -> Vector3<f64> {
    Vector3::new(gauss(rng, std), gauss(rng, std), gauss(rng, std))
}

fn gauss<R: Rng>(rng: &mut R, std: f64) -> f64 {
    let sample: f64 = rng.sample(StandardNormal);
    sample * std
}
