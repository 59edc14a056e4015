use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::config::SimulationConfig;
use crate::propagation::Satellite;
use crate::sim::{DerivationMode, SensorStreams, SimulationRun, SkippedSample};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// One aligned output sample, ready for serialization.
#[derive(Debug, Serialize)]
pub struct Record {
    pub time: DateTime<Utc>,
    pub position_m: [f64; 3],
    pub velocity_m_s: [f64; 3],
    pub acceleration_m_s2: [f64; 3],
    pub angular_rate: [f64; 3],
}

#[derive(Serialize)]
struct RunDocument<'a> {
    satellite: String,
    norad_id: u32,
    mode: DerivationMode,
    start: DateTime<Utc>,
    dt_seconds: f64,
    skipped: &'a [SkippedSample],
    degenerate_indices: &'a [usize],
    samples: Vec<Record>,
}

pub fn records(streams: &SensorStreams) -> Vec<Record> {
    (0..streams.len())
        .map(|i| Record {
            time: streams.times[i],
            position_m: streams.positions[i].into(),
            velocity_m_s: streams.velocities[i].into(),
            acceleration_m_s2: streams.accelerations[i].into(),
            angular_rate: streams.angular_rates[i].into(),
        })
        .collect()
}

/// Write the whole run as one JSON document, diagnostics included.
pub fn write_json<W: Write>(
    writer: W,
    satellite: &Satellite,
    config: &SimulationConfig,
    start: DateTime<Utc>,
    run: &SimulationRun,
) -> Result<(), ReportError> {
    let document = RunDocument {
        satellite: satellite.label(),
        norad_id: satellite.norad_id,
        mode: config.mode,
        start,
        dt_seconds: config.dt_seconds(),
        skipped: &run.skipped,
        degenerate_indices: &run.degenerate,
        samples: records(&run.streams),
    };
    serde_json::to_writer_pretty(writer, &document)?;
    Ok(())
}

/// Write the aligned streams as CSV, one row per sample.
pub fn write_csv<W: Write>(writer: W, streams: &SensorStreams) -> Result<(), ReportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "time", "px_m", "py_m", "pz_m", "vx_m_s", "vy_m_s", "vz_m_s", "ax_m_s2", "ay_m_s2",
        "az_m_s2", "wx", "wy", "wz",
    ])?;

    for record in records(streams) {
        let mut row = vec![record.time.to_rfc3339()];
        for triplet in [
            record.position_m,
            record.velocity_m_s,
            record.acceleration_m_s2,
            record.angular_rate,
        ] {
            row.extend(triplet.iter().map(|c| c.to_string()));
        }
        csv.write_record(&row)?;
    }

    csv.flush()?;
    Ok(())
}
