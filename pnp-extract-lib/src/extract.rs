//! The extraction pipeline: pages in, named and annotated cards out.
//!
//! Rasterizing a document and encoding images happen outside this crate, behind
//! [`CardImageProducer`] and [`CardSink`]. The pipeline selects pages, numbers
//! the images it gets back, asks the [`MetadataMerger`] about each one and
//! decides where it should be written.

use std::path::{Path, PathBuf};

use pnp_extract_core::RangeSet;

use crate::error::ExtractError;
use crate::merge::{CardMetadata, MetadataMerger};
use crate::settings::RunOptions;
use crate::template::{FilenameTemplate, NO_PACK_TEMPLATE};

/// Size of the cards a [`GridProducer`] hands out, in pixels.
pub const DEFAULT_CARD_SIZE: (u32, u32) = (750, 1050);

/// Most cards a [`GridProducer`] page may hold.
pub const MAX_GRID_CARDS: u32 = 65_535;

/// One card image cut from a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardImage {
    pub width: u32,
    pub height: u32,
}

/// Source of card images, one page at a time.
pub trait CardImageProducer {
    fn page_count(&self) -> u32;

    /// The card images of a 1-based page, in reading order.
    fn images(&mut self, page: u32) -> Result<Vec<CardImage>, ExtractError>;
}

/// A stand-in producer: every page holds a fixed grid of identical cards.
#[derive(Debug, Clone)]
pub struct GridProducer {
    pages: u32,
    rows: u32,
    cols: u32,
    card_size: (u32, u32),
}

impl GridProducer {
    pub fn new(pages: u32, rows: u32, cols: u32) -> Self {
        Self {
            pages,
            rows,
            cols,
            card_size: DEFAULT_CARD_SIZE,
        }
    }

    pub fn with_card_size(mut self, width: u32, height: u32) -> Self {
        self.card_size = (width, height);
        self
    }
}

impl CardImageProducer for GridProducer {
    fn page_count(&self) -> u32 {
        self.pages
    }

    fn images(&mut self, page: u32) -> Result<Vec<CardImage>, ExtractError> {
        if page < 1 || page > self.pages {
            return Ok(Vec::new());
        }
        let (width, height) = self.card_size;
        let count = self
            .rows
            .checked_mul(self.cols)
            .filter(|&count| count <= MAX_GRID_CARDS)
            .ok_or(ExtractError::GridTooLarge {
                rows: self.rows,
                cols: self.cols,
            })?;
        Ok(vec![CardImage { width, height }; count as usize])
    }
}

/// Receiver of finished cards.
pub trait CardSink {
    fn write(
        &mut self,
        image: &CardImage,
        metadata: &CardMetadata,
        path: &Path,
    ) -> std::io::Result<()>;
}

/// A card the pipeline decided to write.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCard {
    pub path: PathBuf,
    pub image: CardImage,
    pub metadata: CardMetadata,
}

/// A sink that writes nothing and remembers every card it was given.
#[derive(Debug, Default)]
pub struct PlanSink {
    cards: Vec<PlannedCard>,
}

impl PlanSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cards(&self) -> &[PlannedCard] {
        &self.cards
    }

    pub fn into_cards(self) -> Vec<PlannedCard> {
        self.cards
    }
}

impl CardSink for PlanSink {
    fn write(
        &mut self,
        image: &CardImage,
        metadata: &CardMetadata,
        path: &Path,
    ) -> std::io::Result<()> {
        self.cards.push(PlannedCard {
            path: path.to_path_buf(),
            image: *image,
            metadata: metadata.clone(),
        });
        Ok(())
    }
}

/// Outcome of an extraction run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub written: usize,
    pub skipped_existing: usize,
    /// Images whose catalog data couldn't be loaded
    pub failed: usize,
}

/// One extraction run.
pub struct Extraction<'a> {
    merger: MetadataMerger<'a>,
    pages: String,
    card_template: FilenameTemplate,
    extra_template: FilenameTemplate,
    directory: PathBuf,
    force: bool,
}

impl<'a> Extraction<'a> {
    pub fn new(merger: MetadataMerger<'a>, options: &RunOptions) -> Self {
        let card_template = if options.pack_code.is_some() {
            FilenameTemplate::parse(&options.card_template)
        } else {
            FilenameTemplate::parse(NO_PACK_TEMPLATE)
        };
        Self {
            merger,
            pages: options.pages.clone(),
            card_template,
            extra_template: FilenameTemplate::parse(&options.extra_template),
            directory: options.directory.clone(),
            force: options.force,
        }
    }

    /// Where the card with this metadata goes.
    pub fn path_for(&self, metadata: &CardMetadata) -> PathBuf {
        let template = if metadata.is_extra() {
            &self.extra_template
        } else {
            &self.card_template
        };
        self.directory.join(template.render(metadata))
    }

    pub fn run(
        &mut self,
        producer: &mut dyn CardImageProducer,
        sink: &mut dyn CardSink,
    ) -> Result<ExtractionSummary, ExtractError> {
        let mut summary = ExtractionSummary::default();
        let page_count = producer.page_count();
        if page_count == 0 {
            log::warn!("Document has no pages");
            return Ok(summary);
        }

        let pages = RangeSet::parse(&self.pages, 1, page_count, true)?;
        log::debug!("Selected {} of {page_count} page(s)", pages.len());

        for page in &pages {
            log::info!("Extracting cards from page {page} of {page_count}...");
            let images = producer.images(page)?;
            for (index, image) in images.iter().enumerate() {
                let card_number = index as u32 + 1;
                self.process(page, card_number, image, sink, &mut summary)?;
            }
            log::info!("Extracted {} card(s) from page {page}.", images.len());
        }

        Ok(summary)
    }

    fn process(
        &mut self,
        page: u32,
        card_number: u32,
        image: &CardImage,
        sink: &mut dyn CardSink,
        summary: &mut ExtractionSummary,
    ) -> Result<(), ExtractError> {
        let metadata = match self.merger.next() {
            Ok(metadata) => metadata.with_page(page, card_number),
            Err(e) if !e.is_structural() => {
                log::error!("Skipping page {page} card {card_number}: {e}");
                summary.failed += 1;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let path = self.path_for(&metadata);
        if path.exists() {
            if self.force {
                log::warn!("Will replace existing file: {}", path.display());
            } else {
                log::warn!("Skipping existing file: {}", path.display());
                summary.skipped_existing += 1;
                return Ok(());
            }
        }

        log::info!(
            "Writing page {page} card {card_number} to {}",
            path.display()
        );
        sink.write(image, &metadata, &path)?;
        summary.written += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/extract_tests.rs"]
mod tests;
