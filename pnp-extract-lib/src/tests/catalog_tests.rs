use super::*;
use crate::test_support;

#[test]
fn groups_packs_by_cycle_in_position_order() {
    let mut cache = test_support::cache();
    let cycles = list_packs(&mut cache).unwrap();

    let codes: Vec<_> = cycles.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, vec!["core", "genesis"]);
    assert!(cycles[0].is_single_pack());

    let genesis: Vec<_> = cycles[1].packs.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(genesis, vec!["wla", "ta", "gbp", "ci"]);
    assert_eq!(cycles[1].packs[2].date_release, None);
}

#[test]
fn listing_aligns_codes() {
    let mut cache = test_support::cache();
    let lines = format_pack_listing(&list_packs(&mut cache).unwrap());

    assert_eq!(lines[0], "core  Core Set (2012-09-06)");
    assert_eq!(lines[1], " wla  Genesis: What Lies Ahead (2012-12-14)");
    assert_eq!(lines[2], "  ta  Genesis: Trace Amount (2013-01-04)");
    assert_eq!(lines[3], " gbp  Genesis: Genesis Booster Pack ()");
    assert_eq!(lines.len(), 5);
}

#[test]
fn empty_catalog_lists_nothing() {
    assert!(format_pack_listing(&[]).is_empty());
}
