use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use serde_json::json;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// Sample objects: designation, name, PHA flag, diameter (empty = unknown).
const NEOS: [(&str, &str, &str, &str); 8] = [
    ("433", "Eros", "N", "16.84"),
    ("1036", "Ganymed", "N", "37.675"),
    ("1566", "Icarus", "Y", "1.0"),
    ("4179", "Toutatis", "Y", "5.4"),
    ("99942", "Apophis", "Y", "0.37"),
    ("101955", "Bennu", "Y", "0.49"),
    ("2000 SG344", "", "N", ""),
    ("2019 OK", "", "", ""),
];

/// Shows up only in the approach data, so the dataset has to invent it.
const ORPHAN: &str = "2024 XQ";

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);

    // ---- neos.csv ----
    let neo_path = out_dir.join("neos.csv");
    let mut writer = csv::Writer::from_path(&neo_path)
        .with_context(|| format!("creating {}", neo_path.display()))?;
    writer.write_record(["pdes", "name", "pha", "diameter"])?;
    for (pdes, name, pha, diameter) in NEOS {
        writer.write_record([pdes, name, pha, diameter])?;
    }
    writer.flush()?;

    // ---- cad.json ----
    let epoch = NaiveDate::from_ymd_opt(1950, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("building epoch")?;
    let designations = NEOS.iter().map(|n| n.0).chain([ORPHAN]);

    let mut rows = Vec::new();
    for des in designations {
        for _ in 0..6 {
            let minutes = (rng.next_f64() * 150.0 * 365.25 * 24.0 * 60.0) as i64;
            let time = epoch + Duration::minutes(minutes);
            rows.push((
                time,
                des,
                rng.range(0.0002, 0.5),
                rng.range(1.0, 40.0),
            ));
        }
    }
    rows.sort_by_key(|r| r.0);

    let data: Vec<_> = rows
        .iter()
        .map(|(time, des, dist, v_rel)| {
            json!([
                des,
                time.format("%Y-%b-%d %H:%M").to_string(),
                format!("{dist:.10}"),
                format!("{v_rel:.6}"),
            ])
        })
        .collect();
    let body = json!({
        "signature": { "source": "neo-explorer sample generator", "version": "1.1" },
        "count": data.len().to_string(),
        "fields": ["des", "cd", "dist", "v_rel"],
        "data": data,
    });

    let cad_path = out_dir.join("cad.json");
    std::fs::write(&cad_path, serde_json::to_string_pretty(&body)?)
        .with_context(|| format!("writing {}", cad_path.display()))?;

    println!(
        "Wrote {} NEOs to {} and {} close approaches to {}",
        NEOS.len(),
        neo_path.display(),
        rows.len(),
        cad_path.display()
    );
    Ok(())
}
