//! pnp-extract CLI
//!
//! Command-line interface for naming and annotating the card images of
//! Netrunner print-and-play documents.

mod cli_types;
mod commands;
mod error;

use clap::Parser;
use log::LevelFilter;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use pnp_extract_db::LayeredCache;
use pnp_extract_lib::{CatalogOptions, Settings};

use cli_types::{CacheAction, CatalogArgs, Cli, Commands, LogArgs};
use error::CliError;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.logging);

    if let Err(e) = run(cli) {
        eprintln!(
            "{} {}",
            "\u{2718}".if_supports_color(Stderr, |t| t.red()),
            e,
        );
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = Settings::load()?;
    let options = catalog_options(&cli.catalog);

    match cli.command {
        Commands::ListPacks => {
            let mut cache = options.build_cache(&settings)?;
            commands::packs::run_list_packs(&mut cache)
        }
        Commands::Plan(args) => {
            let mut cache = options.build_cache(&settings)?;
            commands::plan::run_plan(&mut cache, args)
        }
        Commands::Cache { action } => {
            let dir = options.cache_dir(&settings)?;
            match action {
                CacheAction::Path => commands::cache::run_cache_path(&dir),
                CacheAction::List => commands::cache::run_cache_list(&dir),
                CacheAction::Clear => commands::cache::run_cache_clear(&dir),
            }
        }
    }
}

fn catalog_options(args: &CatalogArgs) -> CatalogOptions {
    CatalogOptions {
        offline: args.offline,
        no_disk_cache: args.no_disk_cache,
        cache_dir: args.cache_directory.clone(),
        api_host: args.api.clone(),
        freshness: None,
    }
}

/// Warnings by default; each `-v` raises the level by one step.
fn log_level(args: &LogArgs) -> LevelFilter {
    if args.silent {
        return LevelFilter::Off;
    }
    if let Some(level) = args.log_level {
        return level;
    }
    match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// `RUST_LOG` can still narrow or widen individual modules.
fn init_logging(args: &LogArgs) {
    env_logger::Builder::new()
        .filter_level(log_level(args))
        .format_target(false)
        .parse_default_env()
        .init();
}

/// Whether any catalog data can be reached at all.
pub(crate) fn require_catalog(cache: &LayeredCache) -> Result<(), CliError> {
    if cache.is_offline() && cache.disk().is_none() {
        return Err(CliError::other(
            "--offline and --no-disk-cache leave no catalog to read from",
        ));
    }
    Ok(())
}
