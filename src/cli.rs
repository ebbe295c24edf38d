//! Command-line definitions and the `inspect` / `query` handlers shared with the REPL.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{ArgGroup, Args, Parser, Subcommand};

use crate::data::{Filters, NeoDatabase};
use crate::output::{print_results, write_results, ApproachLine};

/// Results printed to the console when `--limit` is not given.
pub const DEFAULT_DISPLAY_LIMIT: usize = 10;

#[derive(Parser)]
#[command(name = "neo-explorer")]
#[command(about = "Explore near-Earth objects and their close approaches")]
#[command(version)]
pub struct Cli {
    /// NEO metadata file (.csv or .json)
    #[arg(long, env = "NEO_FILE", default_value = "data/neos.csv", global = true)]
    pub neofile: PathBuf,

    /// Close-approach file (.json or .csv)
    #[arg(long, env = "CAD_FILE", default_value = "data/cad.json", global = true)]
    pub cadfile: PathBuf,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look up one NEO by designation or name
    Inspect(InspectArgs),
    /// Find close approaches matching the given criteria
    Query(QueryArgs),
    /// Start an interactive session on the loaded data
    Interactive(InteractiveArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
#[command(group(ArgGroup::new("target").required(true).args(["pdes", "name"])))]
pub struct InspectArgs {
    /// Primary designation, e.g. "433" or "2000 SG344"
    #[arg(long)]
    pub pdes: Option<String>,

    /// IAU name, e.g. "Eros" (case-insensitive)
    #[arg(long)]
    pub name: Option<String>,

    /// Also list every close approach of the object
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct QueryArgs {
    /// Only approaches on this date (YYYY-MM-DD)
    #[arg(short, long, conflicts_with_all = ["start_date", "end_date"])]
    pub date: Option<NaiveDate>,

    /// Only approaches on or after this date (YYYY-MM-DD)
    #[arg(short, long)]
    pub start_date: Option<NaiveDate>,

    /// Only approaches on or before this date (YYYY-MM-DD)
    #[arg(short, long)]
    pub end_date: Option<NaiveDate>,

    /// Minimum approach distance in au
    #[arg(long = "min-distance")]
    pub distance_min: Option<f64>,

    /// Maximum approach distance in au
    #[arg(long = "max-distance")]
    pub distance_max: Option<f64>,

    /// Minimum relative velocity in km/s
    #[arg(long = "min-velocity")]
    pub velocity_min: Option<f64>,

    /// Maximum relative velocity in km/s
    #[arg(long = "max-velocity")]
    pub velocity_max: Option<f64>,

    /// Minimum NEO diameter in km
    #[arg(long = "min-diameter")]
    pub diameter_min: Option<f64>,

    /// Maximum NEO diameter in km
    #[arg(long = "max-diameter")]
    pub diameter_max: Option<f64>,

    /// Only potentially hazardous NEOs
    #[arg(long, conflicts_with = "not_hazardous")]
    pub hazardous: bool,

    /// Only NEOs that are not potentially hazardous
    #[arg(long)]
    pub not_hazardous: bool,

    /// Maximum number of results; 0 means no limit
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Write results to this file (.csv or .json) instead of the console
    #[arg(short, long)]
    pub outfile: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct InteractiveArgs {
    /// Reload the data files automatically when they change on disk
    #[arg(long)]
    pub aggressive: bool,
}

impl QueryArgs {
    pub fn filters(&self) -> Filters {
        let hazardous = match (self.hazardous, self.not_hazardous) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };
        Filters {
            date: self.date,
            start_date: self.start_date,
            end_date: self.end_date,
            distance_min: self.distance_min,
            distance_max: self.distance_max,
            velocity_min: self.velocity_min,
            velocity_max: self.velocity_max,
            diameter_min: self.diameter_min,
            diameter_max: self.diameter_max,
            hazardous,
        }
    }

    /// Files get every match unless a limit is given; the console gets
    /// [`DEFAULT_DISPLAY_LIMIT`].
    pub fn effective_limit(&self) -> Option<usize> {
        match (self.limit, &self.outfile) {
            (Some(n), _) => Some(n),
            (None, Some(_)) => None,
            (None, None) => Some(DEFAULT_DISPLAY_LIMIT),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Print one NEO (and optionally its approaches). Returns whether it was found.
pub fn run_inspect(db: &NeoDatabase, args: &InspectArgs) -> bool {
    let found = match (&args.pdes, &args.name) {
        (Some(pdes), _) => db.get_neo_by_designation(pdes),
        (None, Some(name)) => db.get_neo_by_name(name),
        (None, None) => None,
    };

    let Some(neo) = found else {
        println!("No matching NEOs exist in the database.");
        return false;
    };

    println!("{neo}");
    if args.verbose {
        for approach in db.approaches_of(neo) {
            println!("- {}", ApproachLine { approach, neo });
        }
    }
    true
}

/// Run a query and print or write the results. Returns how many were produced.
pub fn run_query(db: &NeoDatabase, args: &QueryArgs) -> Result<usize> {
    let results = db.query(&args.filters()).limit(args.effective_limit());
    let count = match &args.outfile {
        Some(path) => write_results(db, results, path)?,
        None => print_results(db, results),
    };
    log::debug!("Query produced {count} close approaches");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("neo-explorer").chain(args.iter().copied()))
    }

    fn query_args(args: &[&str]) -> QueryArgs {
        let mut argv = vec!["query"];
        argv.extend_from_slice(args);
        match parse(&argv).unwrap().command {
            Commands::Query(q) => q,
            _ => panic!("expected query"),
        }
    }

    #[test]
    fn query_flags_become_filters() {
        let q = query_args(&[
            "--start-date",
            "2020-01-01",
            "--max-distance",
            "0.1",
            "--min-diameter",
            "0.5",
            "--not-hazardous",
        ]);
        let f = q.filters();
        assert_eq!(f.start_date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(f.distance_max, Some(0.1));
        assert_eq!(f.diameter_min, Some(0.5));
        assert_eq!(f.hazardous, Some(false));
        assert_eq!(f.date, None);
    }

    #[test]
    fn hazard_flags_are_exclusive() {
        assert!(parse(&["query", "--hazardous", "--not-hazardous"]).is_err());
        assert_eq!(query_args(&["--hazardous"]).filters().hazardous, Some(true));
        assert_eq!(query_args(&[]).filters().hazardous, None);
    }

    #[test]
    fn date_conflicts_with_range() {
        assert!(parse(&["query", "--date", "2020-01-01", "--end-date", "2020-02-01"]).is_err());
        assert!(parse(&["query", "--date", "2020-13-01"]).is_err());
    }

    #[test]
    fn limit_defaults() {
        assert_eq!(query_args(&[]).effective_limit(), Some(DEFAULT_DISPLAY_LIMIT));
        assert_eq!(query_args(&["--outfile", "out.csv"]).effective_limit(), None);
        let capped = query_args(&["--outfile", "out.csv", "--limit", "5"]);
        assert_eq!(capped.effective_limit(), Some(5));
    }

    #[test]
    fn inspect_needs_a_target() {
        assert!(parse(&["inspect"]).is_err());
        let cli = parse(&["--neofile", "x.csv", "inspect", "--name", "Eros"]).unwrap();
        assert_eq!(cli.neofile, PathBuf::from("x.csv"));
        match cli.command {
            Commands::Inspect(args) => assert_eq!(args.name.as_deref(), Some("Eros")),
            _ => panic!("expected inspect"),
        }
    }

    #[test]
    fn debug_flag_is_separate_from_inspect_verbose() {
        let cli = parse(&["inspect", "--pdes", "433", "--verbose", "--debug"]).unwrap();
        assert!(cli.debug);
        match cli.command {
            Commands::Inspect(args) => assert!(args.verbose),
            _ => panic!("expected inspect"),
        }
        assert!(!parse(&["inspect", "--pdes", "433"]).unwrap().debug);
    }
}
