use chrono::{DateTime, Utc};
use nalgebra::Vector3;

use crate::propagation::error::PropagationError;
use crate::propagation::tle::Satellite;

pub const M_PER_KM: f64 = 1000.0;

/// One true trajectory sample in the TEME inertial frame, SI units.
#[derive(Debug, Clone, Copy)]
pub struct StateSample {
    pub time: DateTime<Utc>,
    /// Position in meters.
    pub position: Vector3<f64>,
    /// Velocity in meters per second.
    pub velocity: Vector3<f64>,
}

/// Propagate the satellite to `timestamp`.
///
/// SGP4 works in minutes since the element-set epoch and returns kilometers;
/// both conversions happen here so everything downstream is SI.
pub fn propagate_state(
    satellite: &Satellite,
    timestamp: DateTime<Utc>,
) -> Result<StateSample, PropagationError> {
    let minutes = satellite
        .elements
        .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
        .map_err(|e| PropagationError::Propagate(e.to_string()))?;

    let prediction = satellite.constants.propagate(minutes)?;

    Ok(StateSample {
        time: timestamp,
        position: Vector3::from(prediction.position) * M_PER_KM,
        velocity: Vector3::from(prediction.velocity) * M_PER_KM,
    })
}

impl Satellite {
    pub fn state_at(&self, timestamp: DateTime<Utc>) -> Result<StateSample, PropagationError> {
        propagate_state(self, timestamp)
    }
}
