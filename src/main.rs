use anyhow::Result;
use clap::Parser;

use neo_explorer::cli::{run_inspect, run_query, Cli, Commands};
use neo_explorer::repl::Repl;
use neo_explorer::state::Session;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let session = Session::load(&cli.neofile, &cli.cadfile)?;

    match cli.command {
        Commands::Inspect(args) => {
            run_inspect(&session.database, &args);
        }
        Commands::Query(args) => {
            run_query(&session.database, &args)?;
        }
        Commands::Interactive(args) => {
            Repl::new(session, args.aggressive).run()?;
        }
    }

    Ok(())
}
