use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use st_cli::commands::{insert, query, resolve, summary, util};
use st_cli::{Cli, Commands, Config, DayArgs, tui};

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so they never mix with command output.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = load_config(cli.config.as_deref())?;
    let today = util::today();
    let mut stdout = io::stdout().lock();

    match command {
        Commands::Query { day, json } => {
            let date = util::resolve_day(day, today)?;
            let store = util::open_store(&config);
            query::run(&mut stdout, &store, date, *json)?;
        }
        Commands::Summary { day, json } => {
            let date = util::resolve_day(day, today)?;
            let store = util::open_store(&config);
            let mut resolver = util::build_resolver(&config);
            summary::run(
                &mut stdout,
                &store,
                &mut resolver,
                date,
                config.minimum_duration_seconds,
                *json,
            )?;
        }
        Commands::Insert { day } => {
            let date = util::resolve_day(day, today)?;
            let store = util::open_store(&config);
            let mut resolver = util::build_resolver(&config);
            insert::run(
                &mut stdout,
                &store,
                &mut resolver,
                &config.note_folder,
                date,
                config.minimum_duration_seconds,
            )?;
        }
        Commands::Resolve { identifiers } => {
            let mut resolver = util::build_resolver(&config);
            resolve::run(&mut stdout, &mut resolver, identifiers)?;
        }
        Commands::Timeline { date } => {
            let day = DayArgs {
                date: date.clone(),
                yesterday: false,
            };
            let date = util::resolve_day(&day, today)?;
            let store = util::open_store(&config);
            let mut resolver = util::build_resolver(&config);
            drop(stdout);
            tui::run(
                &store,
                &mut resolver,
                config.minimum_duration_seconds,
                date,
                today,
            )?;
        }
    }

    Ok(())
}
