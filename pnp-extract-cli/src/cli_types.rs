//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use pnp_extract_lib::template::{DEFAULT_CARD_TEMPLATE, DEFAULT_EXTRA_TEMPLATE};

#[derive(Parser)]
#[command(name = "pnp-extract")]
#[command(
    about = "Name and annotate the cards of Netrunner print-and-play documents",
    long_about = None
)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    #[command(flatten)]
    pub logging: LogArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where catalog data comes from.
#[derive(Args, Clone)]
pub(crate) struct CatalogArgs {
    /// NetrunnerDB API root (defaults to the public API)
    #[arg(long = "api", value_name = "URI", global = true)]
    pub api: Option<String>,

    /// Directory for cached API responses
    #[arg(short = 'C', long, value_name = "DIR", global = true)]
    pub cache_directory: Option<PathBuf>,

    /// Don't read or write the disk cache
    #[arg(long, global = true)]
    pub no_disk_cache: bool,

    /// Never contact the API; use cached responses only
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Args, Clone)]
pub(crate) struct LogArgs {
    /// More output per occurrence (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log level by name (off, error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", global = true, conflicts_with = "verbose")]
    pub log_level: Option<log::LevelFilter>,

    /// Don't log anything
    #[arg(short, long, global = true, conflicts_with_all = ["verbose", "log_level"])]
    pub silent: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List card packs and their codes
    ListPacks,

    /// Show where each card of a document would be written
    Plan(PlanArgs),

    /// Manage cached API responses
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Args, Clone)]
pub(crate) struct PlanArgs {
    /// Pages to extract (e.g. "2-", "1,3-5")
    #[arg(long, default_value = "2-")]
    pub pages: String,

    /// Number of pages in the document (page 1 is usually the cover)
    #[arg(long, default_value_t = 2)]
    pub page_count: u32,

    /// Card rows per page
    #[arg(long, default_value_t = 3)]
    pub rows: u32,

    /// Card columns per page
    #[arg(long, default_value_t = 3)]
    pub cols: u32,

    /// Pack the document prints (see list-packs)
    #[arg(short = 'c', long)]
    pub pack_code: Option<String>,

    /// Card positions in document order (e.g. "1-10,5,11-")
    #[arg(short = 'o', long, default_value = "-")]
    pub card_order: String,

    /// Extra cards before the first pack card
    #[arg(short = 'e', long, default_value_t = 0)]
    pub extra_start: u32,

    /// Extra cards after the last pack card
    #[arg(short = 'E', long, default_value_t = 0)]
    pub extra_end: u32,

    /// File name template for pack cards
    #[arg(short = 't', long, default_value = DEFAULT_CARD_TEMPLATE)]
    pub card_template: String,

    /// File name template for extra cards
    #[arg(short = 'T', long, default_value = DEFAULT_EXTRA_TEMPLATE)]
    pub extra_template: String,

    /// Output directory
    #[arg(short = 'd', long, default_value = ".")]
    pub directory: PathBuf,

    /// Plan over existing files too
    #[arg(short, long)]
    pub force: bool,

    /// Print the merged metadata of every card as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub(crate) enum CacheAction {
    /// Print the cache directory
    Path,

    /// List cached API responses
    List,

    /// Remove all cached API responses
    Clear,
}
