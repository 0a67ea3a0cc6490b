use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use pnp_extract_db::LayeredCache;
use pnp_extract_lib::{format_pack_listing, list_packs};

use crate::error::CliError;
use crate::require_catalog;

/// Print every pack code, grouped by cycle.
pub(crate) fn run_list_packs(cache: &mut LayeredCache) -> Result<(), CliError> {
    require_catalog(cache)?;
    let cycles = list_packs(cache)?;

    let lines = format_pack_listing(&cycles);
    if lines.is_empty() {
        println!(
            "{}",
            "No packs found.".if_supports_color(Stdout, |t| t.dimmed()),
        );
        return Ok(());
    }

    for line in lines {
        println!("{line}");
    }
    Ok(())
}
