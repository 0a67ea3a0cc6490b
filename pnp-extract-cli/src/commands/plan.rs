use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use serde_json::json;

use pnp_extract_db::LayeredCache;
use pnp_extract_lib::{
    Extraction, ExtractionSummary, GridProducer, MetadataMerger, PlanSink, PlannedCard,
    RunOptions,
};

use crate::cli_types::PlanArgs;
use crate::error::CliError;
use crate::require_catalog;

/// Dry run over a document of identical pages: resolve every card and print
/// where it would be written.
pub(crate) fn run_plan(cache: &mut LayeredCache, args: PlanArgs) -> Result<(), CliError> {
    let json = args.json;
    let (summary, cards) = plan_cards(cache, args)?;

    if json {
        print_json(&cards)?;
    } else {
        print_paths(&cards);
        print_summary(&summary);
    }
    Ok(())
}

fn plan_cards(
    cache: &mut LayeredCache,
    args: PlanArgs,
) -> Result<(ExtractionSummary, Vec<PlannedCard>), CliError> {
    if args.pack_code.is_some() {
        require_catalog(cache)?;
    }

    let options = RunOptions {
        pack_code: args.pack_code,
        card_order: args.card_order,
        extra_start: args.extra_start,
        extra_end: args.extra_end,
        pages: args.pages,
        card_template: args.card_template,
        extra_template: args.extra_template,
        directory: args.directory,
        force: args.force,
    };

    let merger = MetadataMerger::from_catalog(
        cache,
        options.pack_code.as_deref(),
        &options.card_order,
        options.extra_start,
        options.extra_end,
    )?;
    let mut extraction = Extraction::new(merger, &options);
    let mut producer = GridProducer::new(args.page_count, args.rows, args.cols);
    let mut sink = PlanSink::new();
    let summary = extraction.run(&mut producer, &mut sink)?;
    Ok((summary, sink.into_cards()))
}

fn print_paths(cards: &[PlannedCard]) {
    for card in cards {
        let page = card.metadata.lookup("page_number");
        let number = card.metadata.lookup("card_number");
        let label = match (page, number) {
            (Some(page), Some(number)) => format!("{:>8}", format!("p{page} #{number}")),
            _ => format!("{:>8}", ""),
        };
        let path = card.path.display().to_string();
        if card.metadata.is_extra() {
            println!(
                "{}  {}",
                label.if_supports_color(Stdout, |t| t.dimmed()),
                path.if_supports_color(Stdout, |t| t.yellow()),
            );
        } else {
            println!(
                "{}  {}",
                label.if_supports_color(Stdout, |t| t.dimmed()),
                path,
            );
        }
    }
}

fn print_json(cards: &[PlannedCard]) -> Result<(), CliError> {
    let planned: Vec<_> = cards
        .iter()
        .map(|card| {
            json!({
                "path": card.path.display().to_string(),
                "width": card.image.width,
                "height": card.image.height,
                "metadata": card.metadata,
            })
        })
        .collect();
    let text = serde_json::to_string_pretty(&planned).map_err(|e| CliError::other(e.to_string()))?;
    println!("{text}");
    Ok(())
}

fn print_summary(summary: &ExtractionSummary) {
    println!();
    println!(
        "{} {} card(s) planned, {} existing skipped, {} failed",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        summary.written,
        summary.skipped_existing,
        summary.failed,
    );
}
