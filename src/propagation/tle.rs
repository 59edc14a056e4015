use sgp4::{Constants, Elements};

use crate::propagation::error::PropagationError;

/// A satellite parsed from a two-line element set, ready for propagation.
pub struct Satellite {
    pub name: Option<String>,
    pub norad_id: u32,
    pub elements: Elements,
    pub constants: Constants,
}

impl Satellite {
    /// Parse a TLE given as two lines (unnamed) or three lines (name first).
    pub fn from_tle(tle: &str) -> Result<Self, PropagationError> {
        let (name, line1, line2) = parse_tle_lines(tle)?;

        let elements = Elements::from_tle(name.clone(), line1.as_bytes(), line2.as_bytes())?;
        let constants = Constants::from_elements(&elements)?;

        Ok(Self {
            name,
            norad_id: elements.norad_id as u32,
            elements,
            constants,
        })
    }

    /// Display name: the TLE title line if present, otherwise the NORAD id.
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("NORAD {}", self.norad_id))
    }
}

pub fn parse_tle_lines(tle: &str) -> Result<(Option<String>, String, String), PropagationError> {
    let lines: Vec<String> = tle
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();

    match lines.len() {
        2 => Ok((None, lines[0].clone(), lines[1].clone())),
        3 => Ok((Some(lines[0].clone()), lines[1].clone(), lines[2].clone())),
        _ => Err(PropagationError::InvalidTleFormat),
    }
}
