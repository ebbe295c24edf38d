use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;

/// Timestamp layouts accepted for close-approach times.
/// JPL publishes `2020-Jan-01 12:30`; the ISO form is what we write back out.
const TIME_FORMATS: [&str; 2] = ["%Y-%b-%d %H:%M", "%Y-%m-%d %H:%M"];

/// Layout used when presenting or serializing an approach time.
pub const TIME_OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M";

// ---------------------------------------------------------------------------
// DataError – a raw record that cannot be turned into an entity
// ---------------------------------------------------------------------------

/// Failure while coercing raw rows into linked entities.
///
/// Any of these aborts construction of the whole dataset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("record {row}: missing designation")]
    MissingDesignation { row: usize },

    #[error("designation '{0}' appears more than once")]
    DuplicateDesignation(String),

    #[error("approach of '{designation}': cannot parse time '{value}'")]
    InvalidTime { designation: String, value: String },

    #[error("'{designation}': {field} '{value}' is not a number")]
    InvalidNumber {
        designation: String,
        field: &'static str,
        value: String,
    },

    #[error("'{designation}': {field} must not be negative (got {value})")]
    NegativeValue {
        designation: String,
        field: &'static str,
        value: f64,
    },
}

// ---------------------------------------------------------------------------
// Raw records – scalar rows handed over by the loaders
// ---------------------------------------------------------------------------

/// One row of NEO metadata, as read from the SBDB export.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NeoRecord {
    #[serde(rename = "pdes")]
    pub designation: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "pha", default)]
    pub hazardous: String,
    #[serde(default)]
    pub diameter: String,
}

/// One close-approach row, as read from the CAD export.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApproachRecord {
    #[serde(rename = "des")]
    pub designation: String,
    #[serde(rename = "cd")]
    pub time: String,
    #[serde(rename = "dist")]
    pub distance: String,
    #[serde(rename = "v_rel")]
    pub velocity: String,
}

// ---------------------------------------------------------------------------
// Handles – non-owning links into a NeoDatabase
// ---------------------------------------------------------------------------

/// Index of a [`NearEarthObject`] inside the dataset that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NeoId(pub(crate) usize);

/// Index of a [`CloseApproach`] inside the dataset that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ApproachId(pub(crate) usize);

// ---------------------------------------------------------------------------
// NearEarthObject
// ---------------------------------------------------------------------------

/// A near-Earth object.
///
/// `approaches` is filled in while the dataset links records and is sorted by
/// approach time afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct NearEarthObject {
    pub designation: String,
    pub name: Option<String>,
    /// Diameter in km; `None` when the catalog does not know it.
    pub diameter: Option<f64>,
    pub hazardous: bool,
    pub approaches: Vec<ApproachId>,
    placeholder: bool,
}

impl NearEarthObject {
    pub fn new(
        designation: impl Into<String>,
        name: Option<String>,
        diameter: Option<f64>,
        hazardous: bool,
    ) -> Self {
        Self {
            designation: designation.into().trim().to_string(),
            name: name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            diameter,
            hazardous,
            approaches: Vec::new(),
            placeholder: false,
        }
    }

    /// Stand-in for a designation that only shows up in approach data.
    pub fn placeholder(designation: impl Into<String>) -> Self {
        Self {
            placeholder: true,
            ..Self::new(designation, None, None, false)
        }
    }

    /// Coerce a raw metadata row. `row` is only used for error reporting.
    pub fn from_record(record: &NeoRecord, row: usize) -> Result<Self, DataError> {
        let designation = record.designation.trim();
        if designation.is_empty() {
            return Err(DataError::MissingDesignation { row });
        }

        let diameter = match record.diameter.trim().parse::<f64>() {
            Ok(d) if d.is_finite() && d >= 0.0 => Some(d),
            _ => None,
        };

        Ok(Self::new(
            designation,
            Some(record.name.clone()),
            diameter,
            parse_hazardous(&record.hazardous),
        ))
    }

    /// Whether this object was synthesized for an orphaned approach.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// `433 (Eros)` when named, the bare designation otherwise.
    pub fn full_name(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({name})", self.designation),
            None => self.designation.clone(),
        }
    }
}

impl fmt::Display for NearEarthObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NEO {} ", self.full_name())?;
        match self.diameter {
            Some(d) => write!(f, "has a diameter of {d:.3} km")?,
            None => write!(f, "has an unknown diameter")?,
        }
        let verb = if self.hazardous { "is" } else { "is not" };
        write!(f, " and {verb} potentially hazardous.")
    }
}

/// Truthy markers seen in PHA columns. Anything else, including an empty cell,
/// reads as not hazardous.
fn parse_hazardous(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "y" | "yes" | "true" | "1"
    )
}

// ---------------------------------------------------------------------------
// CloseApproach
// ---------------------------------------------------------------------------

/// A single recorded pass of an NEO near Earth.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseApproach {
    pub designation: String,
    /// Time of closest approach, UTC, minute precision.
    pub time: NaiveDateTime,
    /// Nominal approach distance in au.
    pub distance: f64,
    /// Relative velocity in km/s.
    pub velocity: f64,
    /// Owning object. Only meaningful once the approach has been linked.
    pub neo: NeoId,
}

impl CloseApproach {
    pub fn new(
        designation: impl Into<String>,
        time: NaiveDateTime,
        distance: f64,
        velocity: f64,
    ) -> Self {
        Self {
            designation: designation.into().trim().to_string(),
            time,
            distance,
            velocity,
            neo: NeoId(usize::MAX),
        }
    }

    /// Coerce a raw approach row. `row` is only used for error reporting.
    pub fn from_record(record: &ApproachRecord, row: usize) -> Result<Self, DataError> {
        let designation = record.designation.trim();
        if designation.is_empty() {
            return Err(DataError::MissingDesignation { row });
        }

        let time = parse_time(&record.time).ok_or_else(|| DataError::InvalidTime {
            designation: designation.to_string(),
            value: record.time.clone(),
        })?;
        let distance = parse_non_negative(designation, "distance", &record.distance)?;
        let velocity = parse_non_negative(designation, "velocity", &record.velocity)?;

        Ok(Self::new(designation, time, distance, velocity))
    }

    /// Calendar date of the approach, ignoring time of day.
    pub fn date(&self) -> NaiveDate {
        self.time.date()
    }

    pub fn time_str(&self) -> String {
        self.time.format(TIME_OUTPUT_FORMAT).to_string()
    }
}

/// Parse a close-approach timestamp in any of [`TIME_FORMATS`].
pub fn parse_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn parse_non_negative(designation: &str, field: &'static str, raw: &str) -> Result<f64, DataError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DataError::InvalidNumber {
            designation: designation.to_string(),
            field,
            value: raw.to_string(),
        })?;
    if value < 0.0 {
        return Err(DataError::NegativeValue {
            designation: designation.to_string(),
            field,
            value,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neo_row(designation: &str, name: &str, pha: &str, diameter: &str) -> NeoRecord {
        NeoRecord {
            designation: designation.into(),
            name: name.into(),
            hazardous: pha.into(),
            diameter: diameter.into(),
        }
    }

    fn approach_row(designation: &str, time: &str, dist: &str, v: &str) -> ApproachRecord {
        ApproachRecord {
            designation: designation.into(),
            time: time.into(),
            distance: dist.into(),
            velocity: v.into(),
        }
    }

    #[test]
    fn unknown_diameter_is_not_zero() {
        let neo = NearEarthObject::from_record(&neo_row("2000 SG344", "", "N", ""), 0).unwrap();
        assert_eq!(neo.diameter, None);
        assert_eq!(neo.name, None);
        assert!(!neo.hazardous);

        let garbled = NearEarthObject::from_record(&neo_row("X", "", "", "n/a"), 0).unwrap();
        assert_eq!(garbled.diameter, None);

        let zero = NearEarthObject::from_record(&neo_row("Z", "", "", "0"), 0).unwrap();
        assert_eq!(zero.diameter, Some(0.0));
    }

    #[test]
    fn hazard_markers() {
        for marker in ["Y", "y", "true", "Yes", "1"] {
            let neo = NearEarthObject::from_record(&neo_row("A", "", marker, ""), 0).unwrap();
            assert!(neo.hazardous, "{marker} should be hazardous");
        }
        for marker in ["N", "", "false", "maybe"] {
            let neo = NearEarthObject::from_record(&neo_row("A", "", marker, ""), 0).unwrap();
            assert!(!neo.hazardous, "{marker} should not be hazardous");
        }
    }

    #[test]
    fn designation_and_name_are_trimmed() {
        let row = neo_row("  433 ", " Eros ", "N", "16.84");
        let neo = NearEarthObject::from_record(&row, 0).unwrap();
        assert_eq!(neo.designation, "433");
        assert_eq!(neo.name.as_deref(), Some("Eros"));
        assert_eq!(neo.full_name(), "433 (Eros)");
        assert!(!neo.is_placeholder());
    }

    #[test]
    fn missing_designation_is_rejected() {
        let err = NearEarthObject::from_record(&neo_row("   ", "Eros", "N", ""), 7).unwrap_err();
        assert_eq!(err, DataError::MissingDesignation { row: 7 });
    }

    #[test]
    fn approach_times_in_both_layouts() {
        let parse = |time| {
            CloseApproach::from_record(&approach_row("433", time, "0.31", "5.55"), 0)
        };
        let jpl = parse("1900-Dec-27 01:30").unwrap();
        let iso = parse("1900-12-27 01:30").unwrap();
        assert_eq!(jpl.time, iso.time);
        assert_eq!(jpl.time_str(), "1900-12-27 01:30");
        assert_eq!(jpl.date(), NaiveDate::from_ymd_opt(1900, 12, 27).unwrap());
    }

    #[test]
    fn malformed_approach_fields() {
        let parse = |time, dist, v| {
            CloseApproach::from_record(&approach_row("433", time, dist, v), 0)
        };

        let err = parse("yesterday", "0.3", "5").unwrap_err();
        assert!(matches!(err, DataError::InvalidTime { .. }));

        let err = parse("2020-Jan-01 00:00", "far", "5").unwrap_err();
        assert!(matches!(err, DataError::InvalidNumber { field: "distance", .. }));

        let err = parse("2020-Jan-01 00:00", "0.1", "-2").unwrap_err();
        assert!(matches!(err, DataError::NegativeValue { field: "velocity", .. }));
    }

    #[test]
    fn display_mentions_hazard_and_diameter() {
        let eros = NearEarthObject::new("433", Some("Eros".into()), Some(16.84), false);
        assert_eq!(
            eros.to_string(),
            "NEO 433 (Eros) has a diameter of 16.840 km and is not potentially hazardous."
        );
        let ghost = NearEarthObject::placeholder("2020 AB");
        assert!(ghost.is_placeholder());
        assert!(ghost.to_string().contains("unknown diameter"));
    }
}
