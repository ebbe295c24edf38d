//! Presenting query results: console lines and CSV/JSON result files.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::data::{CloseApproach, NearEarthObject, NeoDatabase};

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

/// An approach together with the object that made it, for display.
pub struct ApproachLine<'a> {
    pub approach: &'a CloseApproach,
    pub neo: &'a NearEarthObject,
}

impl<'a> ApproachLine<'a> {
    pub fn new(db: &'a NeoDatabase, approach: &'a CloseApproach) -> Self {
        Self {
            approach,
            neo: db.neo_of(approach),
        }
    }
}

impl fmt::Display for ApproachLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "On {}, '{}' approaches Earth at a distance of {:.2} au and a velocity of {:.2} km/s.",
            self.approach.time_str(),
            self.neo.full_name(),
            self.approach.distance,
            self.approach.velocity
        )
    }
}

/// Print results to stdout. Returns how many were printed.
pub fn print_results<'a>(
    db: &'a NeoDatabase,
    results: impl IntoIterator<Item = &'a CloseApproach>,
) -> usize {
    let mut count = 0;
    for approach in results {
        println!("{}", ApproachLine::new(db, approach));
        count += 1;
    }
    if count == 0 {
        println!("No matching close approaches.");
    }
    count
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CsvRow<'a> {
    datetime_utc: String,
    distance_au: f64,
    velocity_km_s: f64,
    designation: &'a str,
    name: &'a str,
    diameter_km: Option<f64>,
    potentially_hazardous: bool,
}

#[derive(Serialize)]
struct JsonNeo<'a> {
    designation: &'a str,
    name: &'a str,
    diameter_km: Option<f64>,
    potentially_hazardous: bool,
}

#[derive(Serialize)]
struct JsonApproach<'a> {
    datetime_utc: String,
    distance_au: f64,
    velocity_km_s: f64,
    neo: JsonNeo<'a>,
}

/// Write results to `path`, picking the format from its extension.
pub fn write_results<'a>(
    db: &'a NeoDatabase,
    results: impl IntoIterator<Item = &'a CloseApproach>,
    path: &Path,
) -> Result<usize> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let written = match ext.as_str() {
        "csv" => write_to_csv(db, results, path)?,
        "json" => write_to_json(db, results, path)?,
        other => bail!("Unsupported output file extension: .{other}"),
    };
    log::info!("Wrote {written} close approaches to {}", path.display());
    Ok(written)
}

/// One row per approach; unknown name and diameter are left empty.
pub fn write_to_csv<'a>(
    db: &'a NeoDatabase,
    results: impl IntoIterator<Item = &'a CloseApproach>,
    path: &Path,
) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut count = 0;
    for approach in results {
        let neo = db.neo_of(approach);
        writer
            .serialize(CsvRow {
                datetime_utc: approach.time_str(),
                distance_au: approach.distance,
                velocity_km_s: approach.velocity,
                designation: &neo.designation,
                name: neo.name.as_deref().unwrap_or(""),
                diameter_km: neo.diameter,
                potentially_hazardous: neo.hazardous,
            })
            .with_context(|| format!("writing CSV row {count}"))?;
        count += 1;
    }

    // The header comes from the first serialized row; keep it for empty results too.
    if count == 0 {
        writer.write_record([
            "datetime_utc",
            "distance_au",
            "velocity_km_s",
            "designation",
            "name",
            "diameter_km",
            "potentially_hazardous",
        ])?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(count)
}

/// A JSON array of approaches, each with its object nested under `neo`.
/// Unknown diameters become `null`.
pub fn write_to_json<'a>(
    db: &'a NeoDatabase,
    results: impl IntoIterator<Item = &'a CloseApproach>,
    path: &Path,
) -> Result<usize> {
    let rows: Vec<JsonApproach<'_>> = results
        .into_iter()
        .map(|approach| {
            let neo = db.neo_of(approach);
            JsonApproach {
                datetime_utc: approach.time_str(),
                distance_au: approach.distance,
                velocity_km_s: approach.velocity,
                neo: JsonNeo {
                    designation: &neo.designation,
                    name: neo.name.as_deref().unwrap_or(""),
                    diameter_km: neo.diameter,
                    potentially_hazardous: neo.hazardous,
                },
            }
        })
        .collect();

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, &rows).context("writing JSON output")?;
    out.flush().context("flushing JSON output")?;
    Ok(rows.len())
}
