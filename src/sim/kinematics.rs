use std::fmt;
use std::ops::Range;

use clap::ValueEnum;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::sim::timeline::Timeline;

/// CODATA 2018 gravitational constant, N·m²/kg².
pub const GRAVITATIONAL_CONSTANT: f64 = 6.674_30e-11;
pub const EARTH_MASS_KG: f64 = 5.972e24;

/// How specific force is reconstructed from the velocity series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DerivationMode {
    /// Forward difference of the velocity series; no gravity term.
    Simple,
    /// Central difference plus the two-body gravitational acceleration at the
    /// sample position. An accelerometer senses specific force, not
    /// coordinate acceleration, so the gravity an orbit "hides" is added
    /// back to the differenced value.
    GravityCorrected,
}

impl DerivationMode {
    /// Raw indices that survive into the aligned output for `n` raw samples.
    ///
    /// Both windows need a neighbor on each side; gravity correction trims
    /// one more sample per end so the emitted arrays stay index-aligned.
    pub fn aligned_range(&self, n: usize) -> Range<usize> {
        match self {
            DerivationMode::Simple => 1..n.saturating_sub(1),
            DerivationMode::GravityCorrected => 2..n.saturating_sub(2),
        }
    }

    /// Smallest raw sample count that still emits one aligned sample.
    pub fn min_samples(&self) -> usize {
        match self {
            DerivationMode::Simple => 3,
            DerivationMode::GravityCorrected => 5,
        }
    }
}

impl fmt::Display for DerivationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivationMode::Simple => write!(f, "simple"),
            DerivationMode::GravityCorrected => write!(f, "gravity-corrected"),
        }
    }
}

/// Derived kinematics for one raw sample index.
#[derive(Debug, Clone, Copy)]
pub struct Derived {
    /// Index into the raw timeline this sample was derived from.
    pub index: usize,
    /// Specific-force proxy, m/s².
    pub acceleration: Vector3<f64>,
    /// Rotation-rate proxy of the velocity direction.
    pub angular_rate: Vector3<f64>,
}

pub struct DerivedSeries {
    pub samples: Vec<Derived>,
    /// Raw indices dropped because `|v|` was zero there.
    pub degenerate: Vec<usize>,
}

impl DerivedSeries {
    pub fn accelerations(&self) -> Vec<Vector3<f64>> {
        self.samples.iter().map(|s| s.acceleration).collect()
    }

    pub fn angular_rates(&self) -> Vec<Vector3<f64>> {
        self.samples.iter().map(|s| s.angular_rate).collect()
    }
}

/// Two-body point-mass gravitational acceleration at `position`, m/s².
pub fn gravitational_acceleration(position: &Vector3<f64>, mu: f64) -> Vector3<f64> {
    let r = position.norm();
    position * (-mu / r.powi(3))
}

/// Differentiate the timeline into acceleration and angular-rate samples.
///
/// The angular rate `(v[i] × v[i+1]) / |v[i]|` is a geometric proxy for the
/// rotation of the velocity direction, not a body-frame rate; treat the
/// gyroscope channel accordingly. A zero-velocity sample makes it undefined,
/// so that index is reported as degenerate rather than emitted as NaN.
pub fn derive(
    timeline: &Timeline,
    mode: DerivationMode,
    dt_seconds: f64,
    mu: f64,
) -> DerivedSeries {
    let v = &timeline.velocities;
    let p = &timeline.positions;

    let mut samples = Vec::new();
    let mut degenerate = Vec::new();

    for i in mode.aligned_range(timeline.len()) {
        let speed = v[i].norm();
        if speed == 0.0 {
            degenerate.push(i);
            continue;
        }

        let acceleration = match mode {
            DerivationMode::Simple => (v[i + 1] - v[i]) / dt_seconds,
            DerivationMode::GravityCorrected => {
                (v[i + 1] - v[i - 1]) / (2.0 * dt_seconds) + gravitational_acceleration(&p[i], mu)
            }
        };
        let angular_rate = v[i].cross(&v[i + 1]) / speed;

        samples.push(Derived {
            index: i,
            acceleration,
            angular_rate,
        });
    }

    DerivedSeries {
        samples,
        degenerate,
    }
}
