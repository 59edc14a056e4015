mod error;
mod propagator;
mod tle;

pub use error::PropagationError;
pub use propagator::{propagate_state, StateSample, M_PER_KM};
pub use tle::{parse_tle_lines, Satellite};
