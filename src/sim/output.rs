use chrono::{DateTime, Utc};
use nalgebra::Vector3;

use crate::sim::kinematics::DerivedSeries;
use crate::sim::timeline::Timeline;

/// The aligned quintuple a downstream estimator consumes. All five arrays
/// have the same length and share sample indices.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorStreams {
    pub times: Vec<DateTime<Utc>>,
    /// GPS-corrupted positions, meters.
    pub positions: Vec<Vector3<f64>>,
    /// True velocities, m/s.
    pub velocities: Vec<Vector3<f64>>,
    /// Accelerometer channel, m/s².
    pub accelerations: Vec<Vector3<f64>>,
    /// Gyroscope channel.
    pub angular_rates: Vec<Vector3<f64>>,
}

impl SensorStreams {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Trim the raw series down to the derived index set.
///
/// Every emitted index is selected from the same `Derived::index`, so the
/// alignment invariant holds even when derivation dropped samples.
pub fn assemble(
    timeline: &Timeline,
    noisy_positions: Vec<Vector3<f64>>,
    derived: &DerivedSeries,
    accelerations: Vec<Vector3<f64>>,
    angular_rates: Vec<Vector3<f64>>,
) -> SensorStreams {
    let times = derived
        .samples
        .iter()
        .map(|s| timeline.times[s.index])
        .collect();
    let positions = derived
        .samples
        .iter()
        .map(|s| noisy_positions[s.index])
        .collect();
    let velocities = derived
        .samples
        .iter()
        .map(|s| timeline.velocities[s.index])
        .collect();

    SensorStreams {
        times,
        positions,
        velocities,
        accelerations,
        angular_rates,
    }
}
