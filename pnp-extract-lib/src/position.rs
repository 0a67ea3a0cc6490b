//! Mapping from document order to catalog order.
//!
//! In the ideal case the Nth card image in a print-and-play document is the
//! Nth card of the pack. Real documents break that in a few ways:
//!
//! - extra non-catalog cards at the start or end,
//! - the same card printed more than once (variants),
//! - a deliberately shuffled order, e.g. all identities first.
//!
//! A [`PositionMapper`] takes care of all three. The custom order is a
//! non-unique [`RangeSet`] bounded by the pack's cycle positions.

use std::collections::BTreeSet;

use pnp_extract_core::{CatalogRecord, RangeSet};
use pnp_extract_db::{CacheKey, Collection, DbError, LayeredCache};

use crate::error::MappingError;

/// The card order that keeps the pack as printed.
pub const DEFAULT_CARD_ORDER: &str = "-";

/// First and last cycle position of a pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackBounds {
    pub first: u32,
    pub last: u32,
}

impl PackBounds {
    /// Bounds used when no pack is configured.
    pub const UNBOUNDED: PackBounds = PackBounds {
        first: 1,
        last: u16::MAX as u32,
    };

    /// Compute a pack's bounds from the full pack list.
    ///
    /// Card positions run on across every pack of a cycle, so the first
    /// position is one past the combined size of the cycle's earlier packs.
    /// Booster packs reprint cards from elsewhere and don't count.
    pub fn for_pack(pack: &CatalogRecord, packs: &[CatalogRecord]) -> PackBounds {
        let position = pack.u32("position").unwrap_or(1);
        let size = pack.u32("size").unwrap_or(0);

        let first = if position == 1 {
            1
        } else {
            let cycle = pack.str("cycle_code");
            let earlier: u32 = packs
                .iter()
                .filter(|other| other.u32("position").is_some_and(|p| p < position))
                .filter(|other| cycle.is_some() && other.str("cycle_code") == cycle)
                .filter(|other| !is_booster_pack(other))
                .map(|other| other.u32("size").unwrap_or(0))
                .sum();
            earlier + 1
        };

        PackBounds {
            first,
            last: (first + size).saturating_sub(1),
        }
    }
}

fn is_booster_pack(pack: &CatalogRecord) -> bool {
    pack.str("name")
        .is_some_and(|name| name.to_lowercase().contains("booster pack"))
}

/// Where a document position lands in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedPosition {
    /// A catalog card, by its `position` field and by its index in the pack
    Card { cycle_position: u32, pack_position: u32 },
    /// An image with no catalog counterpart
    Extra,
}

/// Maps 1-based document positions to catalog positions.
#[derive(Debug, Clone)]
pub struct PositionMapper {
    bounds: PackBounds,
    order: RangeSet,
    extra_start: u32,
    extra_end: u32,
}

impl PositionMapper {
    /// Build a mapper over known pack bounds.
    pub fn new(
        bounds: PackBounds,
        card_order: &str,
        extra_start: u32,
        extra_end: u32,
    ) -> Result<Self, MappingError> {
        let order = RangeSet::parse(card_order, bounds.first, bounds.last, false)?;
        log::debug!(
            "Card order covers {} image(s) within positions {}-{}",
            order.len(),
            bounds.first,
            bounds.last
        );
        Ok(Self {
            bounds,
            order,
            extra_start,
            extra_end,
        })
    }

    /// Build a mapper for `pack_code`, looking its bounds up in the catalog.
    pub fn from_catalog(
        cache: &mut LayeredCache,
        pack_code: Option<&str>,
        card_order: &str,
        extra_start: u32,
        extra_end: u32,
    ) -> Result<Self, MappingError> {
        let bounds = match pack_code {
            Some(code) => pack_bounds(cache, code)?,
            None => PackBounds::UNBOUNDED,
        };
        Self::new(bounds, card_order, extra_start, extra_end)
    }

    pub fn bounds(&self) -> PackBounds {
        self.bounds
    }

    /// Highest document position that maps to anything.
    pub fn max_position(&self) -> u32 {
        let order = u32::try_from(self.order.len()).unwrap_or(u32::MAX);
        self.extra_start
            .saturating_add(order)
            .saturating_add(self.extra_end)
    }

    pub fn resolve(&self, position: u32) -> Result<MappedPosition, MappingError> {
        let max = self.max_position();
        if position < 1 || position > max {
            return Err(MappingError::OutOfRange { position, max });
        }

        if position <= self.extra_start {
            return Ok(MappedPosition::Extra);
        }
        let index = (position - self.extra_start - 1) as usize;
        match self.order.get(index) {
            Some(cycle_position) => Ok(MappedPosition::Card {
                cycle_position,
                pack_position: cycle_position - self.bounds.first + 1,
            }),
            None => Ok(MappedPosition::Extra),
        }
    }

    /// Every cycle position the order lists more than once.
    pub fn variant_positions(&self) -> BTreeSet<u32> {
        self.order.duplicates()
    }
}

/// Look up the bounds of the pack with the given code.
pub fn pack_bounds(cache: &mut LayeredCache, code: &str) -> Result<PackBounds, DbError> {
    let packs = cache.packs()?;
    let pack = find_by_code(&packs, code)
        .ok_or_else(|| DbError::not_found(&CacheKey::get(Collection::Pack, code)))?;
    let bounds = PackBounds::for_pack(pack, &packs);
    log::debug!(
        "Pack '{code}' spans cycle positions {}-{}",
        bounds.first,
        bounds.last
    );
    Ok(bounds)
}

pub(crate) fn find_by_code<'a>(records: &'a [CatalogRecord], code: &str) -> Option<&'a CatalogRecord> {
    records.iter().find(|r| r.code() == Some(code))
}

#[cfg(test)]
#[path = "tests/position_tests.rs"]
mod tests;
