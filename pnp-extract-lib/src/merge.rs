//! Per-image metadata assembly.
//!
//! A [`MetadataMerger`] is fed one call per extracted image, in document
//! order. It resolves the image's catalog position and joins the card with
//! its pack, cycle, faction, side and type into one flat [`CardMetadata`].

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use pnp_extract_core::{CatalogRecord, is_truthy, lookup, to_plain_string};
use pnp_extract_db::{CacheKey, Collection, DbError, LayeredCache};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{MappingError, MergeError};
use crate::position::{MappedPosition, PositionMapper, find_by_code};

/// Prefix of every PNG text chunk key.
pub const PNG_METADATA_PREFIX: &str = "netrunner:";

/// Metadata keys embedded into written card images, in order.
pub const PNG_METADATA_KEYS: &[&str] = &[
    "code",
    "cost",
    "deck_limit",
    "faction_cost",
    "flavor",
    "illustrator",
    "position",
    "quantity",
    "stripped_text",
    "stripped_title",
    "text",
    "title",
    "uniqueness",
    "is_variant",
    "variant_position",
    "page_number",
    "card_number",
    "cycle.code",
    "cycle.name",
    "faction.code",
    "faction.color",
    "faction.name",
    "pack.code",
    "pack.name",
    "pack.date_release",
    "pack.size",
    "side.code",
    "side.name",
    "type.code",
    "type.name",
    "type.is_subtype",
];

/// The flattened metadata of one card image.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CardMetadata(Map<String, Value>);

impl CardMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata of an image in a run without a pack.
    pub fn document_only(position: u32) -> Self {
        let mut meta = Self::new();
        meta.insert("position", position);
        meta
    }

    /// Metadata of an image with no catalog counterpart.
    pub fn extra(cycle: Option<&CatalogRecord>, pack: &CatalogRecord) -> Self {
        let mut meta = Self::new();
        meta.insert("is_extra", true);
        if let Some(cycle) = cycle {
            meta.insert("cycle", cycle.as_value().clone());
        }
        meta.insert("pack", pack.as_value().clone());
        meta
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Copy every field of a JSON object in, overwriting existing keys.
    pub fn extend(&mut self, record: &CatalogRecord) {
        if let Some(fields) = record.as_object() {
            for (key, value) in fields {
                self.0.insert(key.clone(), value.clone());
            }
        }
    }

    /// Add the page and card numbers the image was found at.
    pub fn with_page(mut self, page_number: u32, card_number: u32) -> Self {
        self.insert("page_number", page_number);
        self.insert("card_number", card_number);
        self
    }

    /// Look up a dotted path such as `"pack.name"`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        match path.split_once('.') {
            Some((head, rest)) => self.0.get(head).and_then(|v| lookup(v, rest)),
            None => self.0.get(path),
        }
    }

    pub fn is_truthy(&self, path: &str) -> bool {
        is_truthy(self.lookup(path))
    }

    pub fn is_extra(&self) -> bool {
        self.is_truthy("is_extra")
    }

    pub fn is_variant(&self) -> bool {
        self.is_truthy("is_variant")
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// The PNG text chunks for this card: every key of [`PNG_METADATA_KEYS`]
    /// that has a value, rendered as plain text.
    pub fn png_text_entries(&self, prefix: &str) -> Vec<(String, String)> {
        PNG_METADATA_KEYS
            .iter()
            .filter_map(|key| {
                let value = self.lookup(key).filter(|v| !v.is_null())?;
                Some((format!("{prefix}{key}"), to_plain_string(value)))
            })
            .collect()
    }

    fn drop_nulls(&mut self) {
        self.0.retain(|_, value| !value.is_null());
    }
}

/// Produces the metadata of successive card images for one run.
pub struct MetadataMerger<'a> {
    cache: &'a mut LayeredCache,
    mapper: PositionMapper,
    pack_code: Option<String>,
    /// `None` once the last representable position has been handed out
    next_position: Option<u32>,
    /// Images seen so far per repeated cycle position
    variants: BTreeMap<u32, u32>,
    pack: Option<CatalogRecord>,
    cycle: Option<Option<CatalogRecord>>,
    cards: Option<Vec<CatalogRecord>>,
    /// Faction, side and type lists, fetched on first use
    related: HashMap<Collection, Vec<CatalogRecord>>,
}

impl<'a> MetadataMerger<'a> {
    pub fn new(
        cache: &'a mut LayeredCache,
        pack_code: Option<&str>,
        mapper: PositionMapper,
    ) -> Self {
        let variants = mapper
            .variant_positions()
            .into_iter()
            .map(|position| (position, 0))
            .collect();
        Self {
            cache,
            mapper,
            pack_code: pack_code.map(str::to_string),
            next_position: Some(1),
            variants,
            pack: None,
            cycle: None,
            cards: None,
            related: HashMap::new(),
        }
    }

    /// Build the mapper for `pack_code` from the catalog, then the merger.
    pub fn from_catalog(
        cache: &'a mut LayeredCache,
        pack_code: Option<&str>,
        card_order: &str,
        extra_start: u32,
        extra_end: u32,
    ) -> Result<Self, MappingError> {
        let mapper =
            PositionMapper::from_catalog(cache, pack_code, card_order, extra_start, extra_end)?;
        Ok(Self::new(cache, pack_code, mapper))
    }

    /// Start at a later document position.
    pub fn with_position(mut self, position: u32) -> Self {
        self.next_position = Some(position);
        self
    }

    /// `None` after `u32::MAX` has been used.
    pub fn next_position(&self) -> Option<u32> {
        self.next_position
    }

    pub fn mapper(&self) -> &PositionMapper {
        &self.mapper
    }

    /// Metadata of the next image. The position advances even on failure.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<CardMetadata, MergeError> {
        let Some(position) = self.next_position else {
            return Err(MappingError::OutOfRange {
                position: u32::MAX,
                max: self.mapper.max_position(),
            }
            .into());
        };
        self.next_position = position.checked_add(1);

        if self.pack_code.is_none() {
            return Ok(CardMetadata::document_only(position));
        }

        match self.mapper.resolve(position)? {
            MappedPosition::Extra => {
                log::debug!("Document position {position} is an extra card");
                let pack = self.pack()?.clone();
                let cycle = self.cycle()?.cloned();
                Ok(CardMetadata::extra(cycle.as_ref(), &pack))
            }
            MappedPosition::Card { cycle_position, .. } => {
                let card = self.find_card(position, cycle_position)?;
                self.build(card)
            }
        }
    }

    fn build(&mut self, card: CatalogRecord) -> Result<CardMetadata, MergeError> {
        let mut meta = CardMetadata::new();
        meta.extend(&card);

        if let Some(cycle) = self.cycle()?.cloned() {
            meta.insert("cycle", cycle.into_value());
        }
        if let Some(faction) = self.related(Collection::Faction, card.str("faction_code"))? {
            meta.insert("faction", faction.into_value());
        }
        let pack = self.pack()?.clone();
        meta.insert("pack", pack.into_value());
        if let Some(side) = self.related(Collection::Side, card.str("side_code"))? {
            meta.insert("side", side.into_value());
        }
        if let Some(kind) = self.related(Collection::Type, card.str("type_code"))? {
            meta.insert("type", kind.into_value());
        }

        if let Some(count) = card
            .u32("position")
            .and_then(|position| self.variants.get_mut(&position))
        {
            *count += 1;
            meta.insert("is_variant", true);
            meta.insert("variant_position", *count);
        }

        meta.drop_nulls();
        Ok(meta)
    }

    /// The first card at or after `cycle_position` in the pack.
    fn find_card(&mut self, document: u32, cycle_position: u32) -> Result<CatalogRecord, MergeError> {
        let cards = self.cards()?;
        let index = cards.partition_point(|card| card_position(card) < cycle_position);
        cards.get(index).cloned().ok_or(MergeError::PositionNotFound {
            document,
            cycle: cycle_position,
        })
    }

    /// The record of `collection` whose code is `code`.
    fn related(
        &mut self,
        collection: Collection,
        code: Option<&str>,
    ) -> Result<Option<CatalogRecord>, DbError> {
        let Some(code) = code else {
            return Ok(None);
        };
        let records = match self.related.entry(collection) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(self.cache.list(collection)?),
        };
        Ok(records.iter().find(|r| r.code() == Some(code)).cloned())
    }

    fn pack_code(&self) -> &str {
        self.pack_code.as_deref().unwrap_or_default()
    }

    fn pack(&mut self) -> Result<&CatalogRecord, DbError> {
        if self.pack.is_none() {
            let code = self.pack_code().to_string();
            let packs = self.cache.packs()?;
            let pack = find_by_code(&packs, &code)
                .cloned()
                .ok_or_else(|| DbError::not_found(&CacheKey::get(Collection::Pack, &code)))?;
            self.pack = Some(pack);
        }
        self.pack
            .as_ref()
            .ok_or_else(|| DbError::not_found(&CacheKey::get(Collection::Pack, self.pack_code())))
    }

    fn cycle(&mut self) -> Result<Option<&CatalogRecord>, DbError> {
        if self.cycle.is_none() {
            let cycle_code = self.pack()?.str("cycle_code").map(str::to_string);
            let cycle = match cycle_code {
                Some(code) => Some(self.cache.cycle(&code)?),
                None => None,
            };
            self.cycle = Some(cycle);
        }
        Ok(self.cycle.as_ref().and_then(Option::as_ref))
    }

    /// The pack's cards, sorted by position.
    fn cards(&mut self) -> Result<&[CatalogRecord], DbError> {
        if self.cards.is_none() {
            let code = self.pack_code().to_string();
            let mut cards: Vec<_> = self
                .cache
                .cards()?
                .into_iter()
                .filter(|card| card.str("pack_code") == Some(code.as_str()))
                .collect();
            cards.sort_by_key(card_position);
            log::debug!("Pack '{code}' has {} card(s)", cards.len());
            self.cards = Some(cards);
        }
        Ok(self.cards.as_deref().unwrap_or_default())
    }
}

fn card_position(card: &CatalogRecord) -> u32 {
    card.u32("position").unwrap_or(0)
}

#[cfg(test)]
#[path = "tests/merge_tests.rs"]
mod tests;
