use std::time::Duration;

use chrono::{DateTime, Utc};
use log::warn;
use nalgebra::Vector3;
use serde::Serialize;

use crate::propagation::Satellite;

/// True trajectory sampled on a uniform grid. The three arrays stay parallel;
/// a step the propagator cannot resolve lands in `skipped` instead.
pub struct Timeline {
    pub times: Vec<DateTime<Utc>>,
    pub positions: Vec<Vector3<f64>>,
    pub velocities: Vec<Vector3<f64>>,
    pub skipped: Vec<SkippedSample>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedSample {
    pub time: DateTime<Utc>,
    pub reason: String,
}

impl Timeline {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Sample the trajectory every `dt` from `start` while elapsed < `duration`.
///
/// A failed propagation skips that timestamp and keeps going; a single
/// unresolvable step must not sink the whole batch.
pub fn build_timeline(
    satellite: &Satellite,
    start: DateTime<Utc>,
    dt: Duration,
    duration: Duration,
) -> Timeline {
    let end = start + duration;
    let mut cursor = start;

    let mut times = Vec::new();
    let mut positions = Vec::new();
    let mut velocities = Vec::new();
    let mut skipped = Vec::new();

    while cursor < end {
        match satellite.state_at(cursor) {
            Ok(state) => {
                times.push(state.time);
                positions.push(state.position);
                velocities.push(state.velocity);
            }
            Err(e) => {
                warn!("skipping {cursor}: {e}");
                skipped.push(SkippedSample {
                    time: cursor,
                    reason: e.to_string(),
                });
            }
        }
        cursor = cursor + dt;
    }

    Timeline {
        times,
        positions,
        velocities,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const ISS_TLE: &str = "\
1 25544U 98067A   20356.91754743  .00016717  00000-0  10270-3 0  9003
2 25544  51.6431  21.3564 0000368  93.0661 287.0303 15.49182665261363";

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 12, 22, 0, 0, 0).unwrap()
    }

    #[test]
    fn ten_minutes_at_ten_seconds_gives_sixty_samples() {
        let sat = Satellite::from_tle(ISS_TLE).unwrap();
        let timeline = build_timeline(
            &sat,
            start(),
            Duration::from_secs(10),
            Duration::from_secs(600),
        );

        assert_eq!(timeline.len(), 60);
        assert!(timeline.skipped.is_empty());
        assert_eq!(timeline.positions.len(), 60);
        assert_eq!(timeline.velocities.len(), 60);
    }

    #[test]
    fn times_are_strictly_increasing_on_the_grid() {
        let sat = Satellite::from_tle(ISS_TLE).unwrap();
        let timeline = build_timeline(
            &sat,
            start(),
            Duration::from_secs(10),
            Duration::from_secs(120),
        );

        for pair in timeline.times.windows(2) {
            assert_eq!(pair[1] - pair[0], chrono::Duration::seconds(10));
        }
    }

    #[test]
    fn zero_duration_yields_empty_timeline() {
        let sat = Satellite::from_tle(ISS_TLE).unwrap();
        let timeline = build_timeline(&sat, start(), Duration::from_secs(10), Duration::ZERO);
        assert!(timeline.is_empty());
    }
}
