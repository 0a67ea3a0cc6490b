//! A small in-memory catalog shared by the unit tests.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, TimeZone, Utc};
use pnp_extract_db::{CacheKey, DbError, LayeredCache, Source, SourceResponse};
use serde_json::{Value, json};

/// Serves canned `{"success": true, "data": ...}` bodies by route.
#[derive(Clone, Default)]
pub struct FixtureSource {
    bodies: Rc<HashMap<String, String>>,
    calls: Rc<Cell<usize>>,
}

impl FixtureSource {
    pub fn new(routes: &[(&str, Value)]) -> Self {
        let bodies = routes
            .iter()
            .map(|(key, data)| {
                let body = json!({ "success": true, "data": data }).to_string();
                (key.to_string(), body)
            })
            .collect();
        Self {
            bodies: Rc::new(bodies),
            calls: Rc::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Source for FixtureSource {
    fn fetch(
        &self,
        key: &CacheKey,
        _modified_since: Option<DateTime<Utc>>,
    ) -> Result<SourceResponse, DbError> {
        self.calls.set(self.calls.get() + 1);
        Ok(match self.bodies.get(&key.to_string()) {
            Some(body) => SourceResponse::Success {
                body: body.clone(),
                last_modified: Some(upstream_time()),
            },
            None => SourceResponse::NotFound,
        })
    }
}

fn upstream_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 3, 14, 15, 9, 26).unwrap()
}

fn card(code: &str, pack: &str, position: u32, title: &str, faction: &str) -> Value {
    json!({
        "code": code,
        "pack_code": pack,
        "position": position,
        "title": title,
        "stripped_title": title,
        "faction_code": faction,
        "side_code": "corp",
        "type_code": "ice",
        "cost": 1,
        "flavor": null,
    })
}

/// Two cycles: the single-pack `core` and `genesis`, whose packs continue
/// each other's numbering (with a booster pack that doesn't count).
pub fn catalog() -> FixtureSource {
    FixtureSource::new(&[
        (
            "cycles",
            json!([
                { "code": "genesis", "name": "Genesis", "position": 2 },
                { "code": "core", "name": "Core Set", "position": 1 },
            ]),
        ),
        ("cycle/core", json!([{ "code": "core", "name": "Core Set", "position": 1 }])),
        ("cycle/genesis", json!([{ "code": "genesis", "name": "Genesis", "position": 2 }])),
        (
            "packs",
            json!([
                { "code": "core", "cycle_code": "core", "name": "Core Set", "position": 1, "size": 3, "date_release": "2012-09-06" },
                { "code": "wla", "cycle_code": "genesis", "name": "What Lies Ahead", "position": 1, "size": 40, "date_release": "2012-12-14" },
                { "code": "ta", "cycle_code": "genesis", "name": "Trace Amount", "position": 2, "size": 3, "date_release": "2013-01-04" },
                { "code": "gbp", "cycle_code": "genesis", "name": "Genesis Booster Pack", "position": 3, "size": 10, "date_release": null },
                { "code": "ci", "cycle_code": "genesis", "name": "Cyber Exodus", "position": 4, "size": 2, "date_release": "2013-02-01" },
            ]),
        ),
        (
            "cards",
            json!([
                card("01003", "core", 3, "Wall of Static", "neutral-corp"),
                card("01001", "core", 1, "Ice Wall", "haas-bioroid"),
                card("01002", "core", 2, "Enigma", "haas-bioroid"),
                card("02041", "ta", 41, "Caduceus", "jinteki"),
                card("02042", "ta", 42, "Draco", "jinteki"),
                card("02043", "ta", 43, "Snowflake", "jinteki"),
            ]),
        ),
        (
            "factions",
            json!([
                { "code": "haas-bioroid", "name": "Haas-Bioroid", "color": "8a23a1" },
                { "code": "jinteki", "name": "Jinteki", "color": "e5004c" },
            ]),
        ),
        ("sides", json!([{ "code": "corp", "name": "Corp" }])),
        ("types", json!([{ "code": "ice", "name": "ICE", "is_subtype": false }])),
    ])
}

pub fn cache() -> LayeredCache {
    LayeredCache::new().with_source(catalog())
}
