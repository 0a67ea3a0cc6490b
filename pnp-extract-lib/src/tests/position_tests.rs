use super::*;
use crate::test_support;
use serde_json::json;

fn mapper(order: &str, extra_start: u32, extra_end: u32) -> PositionMapper {
    PositionMapper::new(
        PackBounds { first: 1, last: 3 },
        order,
        extra_start,
        extra_end,
    )
    .unwrap()
}

fn card_at(cycle_position: u32, first: u32) -> MappedPosition {
    MappedPosition::Card {
        cycle_position,
        pack_position: cycle_position - first + 1,
    }
}

#[test]
fn maps_extras_and_repeats() {
    let mapper = mapper("1,2,3,2", 2, 1);

    assert_eq!(mapper.resolve(1).unwrap(), MappedPosition::Extra);
    assert_eq!(mapper.resolve(2).unwrap(), MappedPosition::Extra);
    assert_eq!(mapper.resolve(3).unwrap(), card_at(1, 1));
    assert_eq!(mapper.resolve(4).unwrap(), card_at(2, 1));
    assert_eq!(mapper.resolve(5).unwrap(), card_at(3, 1));
    assert_eq!(mapper.resolve(6).unwrap(), card_at(2, 1));
    assert_eq!(mapper.resolve(7).unwrap(), MappedPosition::Extra);
    assert_eq!(mapper.variant_positions().into_iter().collect::<Vec<_>>(), vec![2]);
}

#[test]
fn out_of_range_positions() {
    let mapper = mapper("1,2,3,2", 2, 1);
    assert_eq!(mapper.max_position(), 7);

    for position in [0, 8] {
        let err = mapper.resolve(position).unwrap_err();
        assert!(matches!(
            err,
            MappingError::OutOfRange { max: 7, .. }
        ));
    }
}

#[test]
fn default_order_is_the_whole_pack() {
    let mapper = mapper(DEFAULT_CARD_ORDER, 0, 0);
    assert_eq!(mapper.max_position(), 3);
    assert_eq!(mapper.resolve(3).unwrap(), card_at(3, 1));
    assert!(mapper.variant_positions().is_empty());
}

#[test]
fn order_outside_the_pack_is_rejected() {
    let err = PositionMapper::new(PackBounds { first: 41, last: 43 }, "1-3", 0, 0).unwrap_err();
    assert!(matches!(err, MappingError::Range(_)));
}

#[test]
fn pack_position_is_relative_to_first() {
    let mapper = PositionMapper::new(PackBounds { first: 41, last: 43 }, "43,41", 0, 0).unwrap();
    assert_eq!(
        mapper.resolve(1).unwrap(),
        MappedPosition::Card {
            cycle_position: 43,
            pack_position: 3
        }
    );
    assert_eq!(mapper.resolve(2).unwrap(), card_at(41, 41));
}

#[test]
fn bounds_of_first_pack_in_cycle() {
    let packs = CatalogRecord::wrap_all(json!([
        { "code": "wla", "cycle_code": "genesis", "position": 1, "size": 40 },
    ]));
    assert_eq!(
        PackBounds::for_pack(&packs[0], &packs),
        PackBounds { first: 1, last: 40 }
    );
}

#[test]
fn bounds_continue_after_earlier_packs() {
    let packs = CatalogRecord::wrap_all(json!([
        { "code": "wla", "cycle_code": "genesis", "position": 1, "size": 40, "name": "What Lies Ahead" },
        { "code": "ta", "cycle_code": "genesis", "position": 2, "size": 20, "name": "Trace Amount" },
        { "code": "other", "cycle_code": "spin", "position": 1, "size": 55, "name": "Elsewhere" },
    ]));
    assert_eq!(
        PackBounds::for_pack(&packs[1], &packs),
        PackBounds { first: 41, last: 60 }
    );
}

#[test]
fn booster_packs_do_not_count() {
    let packs = CatalogRecord::wrap_all(json!([
        { "code": "a", "cycle_code": "c", "position": 1, "size": 10, "name": "First" },
        { "code": "b", "cycle_code": "c", "position": 2, "size": 5, "name": "Cycle BOOSTER Pack" },
        { "code": "d", "cycle_code": "c", "position": 3, "size": 5, "name": "Third" },
    ]));
    assert_eq!(
        PackBounds::for_pack(&packs[2], &packs),
        PackBounds { first: 11, last: 15 }
    );
}

#[test]
fn from_catalog_looks_up_the_pack() {
    let mut cache = test_support::cache();

    let mapper = PositionMapper::from_catalog(&mut cache, Some("ta"), "-", 0, 0).unwrap();
    assert_eq!(mapper.bounds(), PackBounds { first: 41, last: 43 });

    let mapper = PositionMapper::from_catalog(&mut cache, Some("ci"), "-", 0, 0).unwrap();
    assert_eq!(mapper.bounds(), PackBounds { first: 44, last: 45 });
}

#[test]
fn from_catalog_without_pack_is_unbounded() {
    let mut cache = LayeredCache::new();
    let mapper = PositionMapper::from_catalog(&mut cache, None, "5,9", 0, 0).unwrap();
    assert_eq!(mapper.bounds(), PackBounds::UNBOUNDED);
    assert_eq!(mapper.resolve(2).unwrap(), card_at(9, 1));
}

#[test]
fn unknown_pack_is_a_db_error() {
    let mut cache = test_support::cache();
    let err = PositionMapper::from_catalog(&mut cache, Some("nope"), "-", 0, 0).unwrap_err();
    assert!(matches!(err, MappingError::Db(DbError::NotFound(ref key)) if key == "pack/nope"));
}
