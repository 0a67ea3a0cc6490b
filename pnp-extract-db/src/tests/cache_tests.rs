use super::*;
use chrono::{DateTime, TimeZone, Utc};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::rc::Rc;
use std::thread::sleep;
use std::time::Duration;
use tempfile::TempDir;

const PACKS: &str = r#"{"success":true,"data":[{"code":"core","name":"Core Set","position":1},{"code":"wla","name":"What Lies Ahead","position":1}]}"#;
const PACK_CORE: &str = r#"{"success":true,"data":[{"code":"core","name":"Core Set","size":113}]}"#;

fn upstream_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 3, 14, 15, 9, 26).unwrap()
}

type Call = (String, Option<DateTime<Utc>>);

/// In-memory source that records every fetch.
#[derive(Clone, Default)]
struct MockSource {
    responses: Rc<RefCell<HashMap<String, Result<SourceResponse, String>>>>,
    calls: Rc<RefCell<Vec<Call>>>,
}

impl MockSource {
    fn respond(&self, key: &str, response: SourceResponse) {
        self.responses
            .borrow_mut()
            .insert(key.to_string(), Ok(response));
    }

    fn fail(&self, key: &str) {
        self.responses
            .borrow_mut()
            .insert(key.to_string(), Err("connection refused".to_string()));
    }

    fn success(&self, key: &str, body: &str) {
        self.respond(
            key,
            SourceResponse::Success {
                body: body.to_string(),
                last_modified: Some(upstream_time()),
            },
        );
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl Source for MockSource {
    fn fetch(
        &self,
        key: &CacheKey,
        modified_since: Option<DateTime<Utc>>,
    ) -> Result<SourceResponse, DbError> {
        self.calls
            .borrow_mut()
            .push((key.to_string(), modified_since));
        match self.responses.borrow().get(&key.to_string()) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(msg)) => Err(DbError::transport(msg.clone())),
            None => Ok(SourceResponse::NotFound),
        }
    }
}

fn seed(tier: &DiskTier, key: &CacheKey, body: &str) {
    tier.new_entry(key).store(body, upstream_time()).unwrap();
}

#[test]
fn memory_tier_calls_source_once() {
    let source = MockSource::default();
    source.success("pack/core", PACK_CORE);
    let mut cache = LayeredCache::new().with_source(source.clone());

    let first = cache.pack("core").unwrap();
    let second = cache.pack("core").unwrap();

    assert_eq!(first, second);
    assert_eq!(first.str("name"), Some("Core Set"));
    assert_eq!(source.calls().len(), 1);
}

#[test]
fn list_wraps_every_element() {
    let source = MockSource::default();
    source.success("packs", PACKS);
    let mut cache = LayeredCache::new().with_source(source);

    let packs = cache.packs().unwrap();
    assert_eq!(packs.len(), 2);
    assert_eq!(packs[1].code(), Some("wla"));
}

#[test]
fn fresh_disk_entry_skips_the_source() {
    let tmp = TempDir::new().unwrap();
    let tier = DiskTier::new(tmp.path());
    seed(&tier, &CacheKey::get(Collection::Pack, "core"), PACK_CORE);

    let source = MockSource::default();
    let mut cache = LayeredCache::new()
        .with_source(source.clone())
        .with_disk(tier);

    let pack = cache.pack("core").unwrap();
    assert_eq!(pack.u32("size"), Some(113));
    assert!(source.calls().is_empty());
}

#[test]
fn missing_disk_entry_is_fetched_and_stored() {
    let tmp = TempDir::new().unwrap();
    let source = MockSource::default();
    source.success("pack/core", PACK_CORE);
    let mut cache = LayeredCache::new()
        .with_source(source.clone())
        .with_disk(DiskTier::new(tmp.path()));

    cache.pack("core").unwrap();

    assert_eq!(source.calls(), vec![("pack/core".to_string(), None)]);
    let stored = fs::read_to_string(tmp.path().join("pack/core.json")).unwrap();
    assert_eq!(stored, PACK_CORE);
}

#[test]
fn stale_entry_sends_modified_since() {
    let tmp = TempDir::new().unwrap();
    let tier = DiskTier::new(tmp.path()).with_freshness(Duration::ZERO);
    seed(&tier, &CacheKey::list(Collection::Pack), PACKS);
    sleep(Duration::from_millis(20));

    let source = MockSource::default();
    source.respond("packs", SourceResponse::NotModified);
    let mut cache = LayeredCache::new()
        .with_source(source.clone())
        .with_disk(tier);

    let packs = cache.packs().unwrap();
    assert_eq!(packs.len(), 2);
    assert_eq!(
        source.calls(),
        vec![("packs".to_string(), Some(upstream_time()))]
    );
}

#[test]
fn not_modified_touches_entry_and_keeps_bytes() {
    let tmp = TempDir::new().unwrap();
    let tier = DiskTier::new(tmp.path()).with_freshness(Duration::ZERO);
    let key = CacheKey::list(Collection::Pack);
    seed(&tier, &key, PACKS);
    let before = tier.entry(&key).unwrap().cached_at().unwrap();
    sleep(Duration::from_millis(50));

    let source = MockSource::default();
    source.respond("packs", SourceResponse::NotModified);
    let mut cache = LayeredCache::new()
        .with_source(source)
        .with_disk(tier.clone());
    cache.packs().unwrap();

    let entry = tier.entry(&key).unwrap();
    assert!(entry.cached_at().unwrap() > before);
    assert_eq!(entry.modified_at().unwrap(), upstream_time());
    assert_eq!(
        fs::read(tmp.path().join("packs.json")).unwrap(),
        PACKS.as_bytes()
    );
}

#[test]
fn changed_data_rewrites_entry() {
    let tmp = TempDir::new().unwrap();
    let tier = DiskTier::new(tmp.path()).with_freshness(Duration::ZERO);
    let key = CacheKey::list(Collection::Pack);
    seed(&tier, &key, r#"{"success":true,"data":[]}"#);
    sleep(Duration::from_millis(20));

    let newer = upstream_time() + chrono::Duration::days(2);
    let source = MockSource::default();
    source.respond(
        "packs",
        SourceResponse::Success {
            body: PACKS.to_string(),
            last_modified: Some(newer),
        },
    );
    let mut cache = LayeredCache::new()
        .with_source(source)
        .with_disk(tier.clone());

    assert_eq!(cache.packs().unwrap().len(), 2);
    let entry = tier.entry(&key).unwrap();
    assert_eq!(entry.modified_at().unwrap(), newer);
    assert_eq!(fs::read_to_string(entry.path()).unwrap(), PACKS);
}

#[test]
fn missing_last_modified_returns_body_unpersisted() {
    let tmp = TempDir::new().unwrap();
    let source = MockSource::default();
    source.respond(
        "pack/core",
        SourceResponse::Success {
            body: PACK_CORE.to_string(),
            last_modified: None,
        },
    );
    let mut cache = LayeredCache::new()
        .with_source(source)
        .with_disk(DiskTier::new(tmp.path()));

    assert_eq!(cache.pack("core").unwrap().code(), Some("core"));
    assert!(!tmp.path().join("pack/core.json").exists());
}

#[test]
fn write_failure_returns_body_unpersisted() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    let source = MockSource::default();
    source.success("pack/core", PACK_CORE);
    let mut cache = LayeredCache::new()
        .with_source(source)
        .with_disk(DiskTier::new(&blocker));

    assert_eq!(cache.pack("core").unwrap().code(), Some("core"));
}

#[test]
fn transport_error_falls_back_to_stale_entry() {
    let tmp = TempDir::new().unwrap();
    let tier = DiskTier::new(tmp.path()).with_freshness(Duration::ZERO);
    seed(&tier, &CacheKey::list(Collection::Pack), PACKS);
    sleep(Duration::from_millis(20));

    let source = MockSource::default();
    source.fail("packs");
    let mut cache = LayeredCache::new()
        .with_source(source)
        .with_disk(tier);

    assert_eq!(cache.packs().unwrap().len(), 2);
}

#[test]
fn transport_error_without_entry_propagates() {
    let tmp = TempDir::new().unwrap();
    let source = MockSource::default();
    source.fail("packs");
    let mut cache = LayeredCache::new()
        .with_source(source)
        .with_disk(DiskTier::new(tmp.path()));

    let err = cache.packs().unwrap_err();
    assert!(err.is_transport());
}

#[test]
fn offline_reads_disk_verbatim() {
    let tmp = TempDir::new().unwrap();
    let tier = DiskTier::new(tmp.path()).with_freshness(Duration::ZERO);
    seed(&tier, &CacheKey::list(Collection::Pack), PACKS);

    let mut cache = LayeredCache::new().with_disk(tier);
    assert!(cache.is_offline());
    assert_eq!(cache.packs().unwrap().len(), 2);
}

#[test]
fn ids_differing_in_punctuation_do_not_share_an_entry() {
    let tmp = TempDir::new().unwrap();
    let tier = DiskTier::new(tmp.path());
    seed(
        &tier,
        &CacheKey::get(Collection::Card, "a.b"),
        r#"{"success":true,"data":[{"code":"a.b"}]}"#,
    );

    let mut cache = LayeredCache::new().with_disk(tier);
    assert_eq!(cache.card("a.b").unwrap().code(), Some("a.b"));
    let err = cache.card("a_b").unwrap_err();
    assert!(matches!(err, DbError::NotFound(ref key) if key == "card/a_b"));
}

#[test]
fn offline_without_entry_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let mut cache = LayeredCache::new().with_disk(DiskTier::new(tmp.path()));

    let err = cache.cycles().unwrap_err();
    assert!(matches!(err, DbError::NotFound(ref key) if key == "cycles"));
}

#[test]
fn no_layers_is_not_found() {
    let mut cache = LayeredCache::new();
    assert!(matches!(
        cache.pack("core").unwrap_err(),
        DbError::NotFound(_)
    ));
}

#[test]
fn source_not_found_is_not_found() {
    let source = MockSource::default();
    let mut cache = LayeredCache::new().with_source(source);
    let err = cache.pack("nope").unwrap_err();
    assert!(matches!(err, DbError::NotFound(ref key) if key == "pack/nope"));
}

#[test]
fn unsuccessful_payload_is_not_found() {
    let source = MockSource::default();
    source.success("packs", r#"{"success":false,"data":[]}"#);
    let mut cache = LayeredCache::new().with_source(source.clone());

    assert!(matches!(cache.packs().unwrap_err(), DbError::NotFound(_)));
    // Failures are not remembered.
    assert!(cache.packs().is_err());
    assert_eq!(source.calls().len(), 2);
}

#[test]
fn malformed_payload_is_a_database_error() {
    let source = MockSource::default();
    source.success("packs", "<html>oops</html>");
    let mut cache = LayeredCache::new().with_source(source);

    let err = cache.packs().unwrap_err();
    assert!(matches!(err, DbError::Database { ref key, .. } if key == "packs"));
}

#[test]
fn get_with_empty_data_is_not_found() {
    let source = MockSource::default();
    source.success("pack/core", r#"{"success":true,"data":[]}"#);
    let mut cache = LayeredCache::new().with_source(source);

    assert!(matches!(
        cache.pack("core").unwrap_err(),
        DbError::NotFound(_)
    ));
}
