//! Interactive session: `inspect` and `query` against a dataset that stays loaded.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};

use crate::cli::{run_inspect, run_query, InspectArgs, QueryArgs};
use crate::state::Session;

const PROMPT: &str = "(neo) ";
const HISTORY_FILE: &str = ".neo_explorer_history";

/// A line typed at the prompt.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "neo")]
enum ReplCommand {
    /// Look up one NEO by designation or name
    Inspect(InspectArgs),
    /// Find close approaches matching the given criteria
    Query(QueryArgs),
    /// Rebuild the dataset from the data files
    Reload,
    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

/// Whether the loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive loop state.
pub struct Repl {
    pub session: Session,
    /// Reload automatically when the data files change.
    pub aggressive: bool,
    warned_stale: bool,
}

impl Repl {
    pub fn new(session: Session, aggressive: bool) -> Self {
        Self {
            session,
            aggressive,
            warned_stale: false,
        }
    }

    /// Handle one input line.
    pub fn execute(&mut self, line: &str) -> Flow {
        let words = match tokenize(line) {
            Ok(w) if w.is_empty() => return Flow::Continue,
            Ok(w) => w,
            Err(e) => {
                eprintln!("Error: {e}");
                return Flow::Continue;
            }
        };

        let command = match ReplCommand::try_parse_from(&words) {
            Ok(c) => c,
            Err(e) => {
                // Covers `help` and `--help` as well as genuine mistakes.
                let _ = e.print();
                return Flow::Continue;
            }
        };

        if !matches!(command, ReplCommand::Reload) {
            self.check_freshness();
        }

        match command {
            ReplCommand::Inspect(args) => {
                run_inspect(&self.session.database, &args);
            }
            ReplCommand::Query(args) => {
                if let Err(e) = run_query(&self.session.database, &args) {
                    log::error!("Query failed: {e:#}");
                    eprintln!("Error: {e:#}");
                }
            }
            ReplCommand::Reload => match self.session.reload() {
                Ok(()) => {
                    self.warned_stale = false;
                    println!(
                        "Loaded {} NEOs and {} close approaches.",
                        self.session.database.len_neos(),
                        self.session.database.len_approaches()
                    );
                }
                Err(e) => eprintln!("Error: {e:#}"),
            },
            ReplCommand::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Reload or warn when the files on disk no longer match the dataset.
    fn check_freshness(&mut self) {
        if !self.session.is_stale() {
            return;
        }
        if self.aggressive {
            log::info!("Data files changed; reloading");
            if let Err(e) = self.session.reload() {
                eprintln!("Error: {e:#}");
            }
        } else if !self.warned_stale {
            log::warn!(
                "Data files changed since they were loaded; run `reload` to pick up the changes"
            );
            self.warned_stale = true;
        }
    }

    /// Read lines until `quit` or end of input.
    pub fn run(&mut self) -> Result<()> {
        println!(
            "Loaded {} NEOs and {} close approaches.",
            self.session.database.len_neos(),
            self.session.database.len_approaches()
        );
        println!("Type `help` for commands, `quit` to exit.\n");

        let config = Config::builder().auto_add_history(true).build();
        let mut rl: Editor<(), DefaultHistory> = Editor::with_config(config)?;

        let history_path = history_path();
        if let Some(ref path) = history_path {
            let _ = rl.load_history(path);
        }

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    if self.execute(&line) == Flow::Quit {
                        break;
                    }
                }
                // Ctrl-C abandons the current line
                Err(ReadlineError::Interrupted) => println!("Use `quit` or Ctrl-D to exit"),
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("Error: {err:?}");
                    break;
                }
            }
        }

        if let Some(ref path) = history_path {
            if let Err(e) = rl.save_history(path) {
                log::debug!("Could not save history to {}: {e}", path.display());
            }
        }
        Ok(())
    }
}

fn history_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(HISTORY_FILE))
}

/// Split a line on whitespace; double quotes group words, as in
/// `inspect --name "Don Quixote"`.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if quoted {
        bail!("unterminated quote");
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
