use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value as JsonValue;

use super::database::NeoDatabase;
use super::model::{ApproachRecord, NeoRecord};

/// CAD columns we read, in `ApproachRecord` field order.
const CAD_COLUMNS: [&str; 4] = ["des", "cd", "dist", "v_rel"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load both data files and link them into a dataset.
pub fn load_database(neo_path: &Path, cad_path: &Path) -> Result<NeoDatabase> {
    let neos = load_neos(neo_path)?;
    log::info!("Loaded {} NEO records from {}", neos.len(), neo_path.display());

    let approaches = load_approaches(cad_path)?;
    log::info!(
        "Loaded {} close-approach records from {}",
        approaches.len(),
        cad_path.display()
    );

    NeoDatabase::from_records(&neos, &approaches).context("linking NEOs and close approaches")
}

/// Read NEO metadata. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – SBDB export with at least `pdes`, `name`, `pha`, `diameter`
/// * `.json` – `[{ "pdes": ..., "name": ..., "pha": ..., "diameter": ... }, ...]`
pub fn load_neos(path: &Path) -> Result<Vec<NeoRecord>> {
    match extension(path).as_str() {
        "csv" => load_neos_csv(path),
        "json" => load_neos_json(path),
        other => bail!("Unsupported NEO file extension: .{other}"),
    }
}

/// Read close-approach rows. Dispatch by extension.
///
/// Supported formats:
/// * `.json` – CAD API response, `{ "fields": [...], "data": [[...], ...] }`
/// * `.csv`  – header row naming `des`, `cd`, `dist`, `v_rel`
pub fn load_approaches(path: &Path) -> Result<Vec<ApproachRecord>> {
    match extension(path).as_str() {
        "json" => load_approaches_json(path),
        "csv" => load_approaches_csv(path),
        other => bail!("Unsupported close-approach file extension: .{other}"),
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// CSV loaders
// ---------------------------------------------------------------------------

/// The SBDB export carries dozens of columns; serde picks out the four we need
/// and ignores the rest.
fn load_neos_csv(path: &Path) -> Result<Vec<NeoRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening NEO CSV {}", path.display()))?;

    reader
        .deserialize::<NeoRecord>()
        .enumerate()
        .map(|(row_no, result)| result.with_context(|| format!("NEO CSV row {row_no}")))
        .collect()
}

fn load_approaches_csv(path: &Path) -> Result<Vec<ApproachRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening close-approach CSV {}", path.display()))?;

    reader
        .deserialize::<ApproachRecord>()
        .enumerate()
        .map(|(row_no, result)| result.with_context(|| format!("close-approach CSV row {row_no}")))
        .collect()
}

// ---------------------------------------------------------------------------
// JSON loaders
// ---------------------------------------------------------------------------

fn load_neos_json(path: &Path) -> Result<Vec<NeoRecord>> {
    let text = std::fs::read_to_string(path).context("reading NEO JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing NEO JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let obj = rec
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            let field = |key: &str| obj.get(key).map(json_to_text).unwrap_or_default();
            Ok(NeoRecord {
                designation: field("pdes"),
                name: field("name"),
                hazardous: field("pha"),
                diameter: field("diameter"),
            })
        })
        .collect()
}

/// Expected JSON schema (the CAD API response body):
///
/// ```json
/// {
///   "signature": { "version": "1.1", "source": "NASA/JPL SBDB Close Approach Data API" },
///   "count": "2",
///   "fields": ["des", "orbit_id", "jd", "cd", "dist", "dist_min", "dist_max", "v_rel", ...],
///   "data": [
///     ["170903", "105", "2415020.507669610", "1900-Jan-01 00:11", "0.0921795123769547", ...],
///     ...
///   ]
/// }
/// ```
fn load_approaches_json(path: &Path) -> Result<Vec<ApproachRecord>> {
    let text = std::fs::read_to_string(path).context("reading close-approach JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing close-approach JSON")?;

    let fields: Vec<&str> = root
        .get("fields")
        .and_then(|f| f.as_array())
        .context("close-approach JSON missing 'fields' array")?
        .iter()
        .map(|f| f.as_str().unwrap_or(""))
        .collect();

    let mut idx = [0usize; 4];
    for (slot, column) in idx.iter_mut().zip(CAD_COLUMNS) {
        *slot = fields
            .iter()
            .position(|f| *f == column)
            .with_context(|| format!("close-approach JSON missing '{column}' field"))?;
    }

    let data = match root.get("data") {
        Some(d) => d.as_array().context("'data' is not an array")?.as_slice(),
        // The API omits `data` entirely when nothing matched.
        None => &[],
    };

    data.iter()
        .enumerate()
        .map(|(i, row)| {
            let cells = row
                .as_array()
                .with_context(|| format!("Row {i} is not a JSON array"))?;
            let [des, cd, dist, v_rel] = idx.map(|j| cells.get(j));
            let cell = |v: Option<&JsonValue>, name: &str| {
                v.map(json_to_text)
                    .with_context(|| format!("Row {i}: missing '{name}' value"))
            };
            Ok(ApproachRecord {
                designation: cell(des, "des")?,
                time: cell(cd, "cd")?,
                distance: cell(dist, "dist")?,
                velocity: cell(v_rel, "v_rel")?,
            })
        })
        .collect()
}

/// Scalars are passed through as text; the model layer does the coercion.
fn json_to_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        JsonValue::Bool(true) => "Y".to_string(),
        JsonValue::Bool(false) => "N".to_string(),
        other => other.to_string(),
    }
}
