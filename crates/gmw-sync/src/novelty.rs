//! Novelty detection and the two filters over its output.

use std::collections::HashSet;

use gmw_core::{has_special_keyword, KeywordHit, Snapshot};

/// Per-source id-set difference: records in `current` whose id was absent
/// from `previous` for the same source, in current-list order. Sources with
/// nothing new are omitted. An empty previous snapshot (first run) makes
/// everything new.
pub fn diff_snapshots(current: &Snapshot, previous: &Snapshot) -> Snapshot {
    let mut novelty = Snapshot::new();
    for (store, records) in current {
        let previous_ids: HashSet<&str> = previous
            .get(store)
            .map(|list| list.iter().map(|r| r.id.as_str()).collect())
            .unwrap_or_default();
        let fresh: Vec<_> = records
            .iter()
            .filter(|record| !previous_ids.contains(record.id.as_str()))
            .cloned()
            .collect();
        if !fresh.is_empty() {
            novelty.insert(*store, fresh);
        }
    }
    novelty
}

/// Retains novelty records at or above the notification price floor; sources
/// left empty are dropped.
pub fn filter_high_value(novelty: &Snapshot) -> Snapshot {
    novelty
        .iter()
        .filter_map(|(store, records)| {
            let high: Vec<_> = records
                .iter()
                .filter(|record| record.is_high_value())
                .cloned()
                .collect();
            (!high.is_empty()).then_some((*store, high))
        })
        .collect()
}

/// Flags novelty records naming a special construction, independent of
/// price. Order follows source iteration, then record order.
pub fn detect_keyword_matches(novelty: &Snapshot) -> Vec<KeywordHit> {
    let mut hits = Vec::new();
    for (store, records) in novelty {
        for record in records {
            if has_special_keyword(&record.name) {
                hits.push(KeywordHit {
                    store_name: store.display_name().to_string(),
                    name: record.name.clone(),
                    price: record.price.clone(),
                });
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gmw_core::{ProductRecord, StoreKey};

    fn record(store: StoreKey, name: &str, price: &str) -> ProductRecord {
        ProductRecord::new(
            store,
            name,
            price.to_string(),
            "https://x/1".to_string(),
            Utc::now(),
        )
    }

    fn snapshot_of(store: StoreKey, records: Vec<ProductRecord>) -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert(store, records);
        snapshot
    }

    #[test]
    fn empty_previous_makes_everything_new() {
        let current = snapshot_of(
            StoreKey::Ikebe,
            vec![record(StoreKey::Ikebe, "Gibson J-45 Vintage", "¥120,000")],
        );
        let novelty = diff_snapshots(&current, &Snapshot::new());
        assert_eq!(novelty, current);
    }

    #[test]
    fn identical_id_sets_yield_no_novelty() {
        let current = snapshot_of(
            StoreKey::Ikebe,
            vec![record(StoreKey::Ikebe, "Gibson J-45 Vintage", "¥120,000")],
        );
        // Same name, so same derived id, even with a different timestamp.
        let previous = snapshot_of(
            StoreKey::Ikebe,
            vec![record(StoreKey::Ikebe, "Gibson J-45 Vintage", "¥120,000")],
        );
        assert!(diff_snapshots(&current, &previous).is_empty());
    }

    #[test]
    fn novelty_preserves_current_order_and_drops_empty_sources() {
        let known = record(StoreKey::Qsic, "YAMAHA GC-31 1995", "¥165,000");
        let fresh_a = record(StoreKey::Qsic, "Cordoba C10 Crossover", "¥150,000");
        let fresh_b = record(StoreKey::Qsic, "ARIA A-50 Concert", "¥60,000");
        let mut current = snapshot_of(
            StoreKey::Qsic,
            vec![fresh_a.clone(), known.clone(), fresh_b.clone()],
        );
        current.insert(
            StoreKey::Ikebe,
            vec![record(StoreKey::Ikebe, "Gibson J-45 Vintage", "¥120,000")],
        );
        let previous = {
            let mut prev = snapshot_of(StoreKey::Qsic, vec![known]);
            prev.insert(
                StoreKey::Ikebe,
                vec![record(StoreKey::Ikebe, "Gibson J-45 Vintage", "¥120,000")],
            );
            prev
        };

        let novelty = diff_snapshots(&current, &previous);
        assert_eq!(novelty.len(), 1);
        assert_eq!(novelty[&StoreKey::Qsic], vec![fresh_a, fresh_b]);
    }

    #[test]
    fn high_value_filter_is_a_subset_of_novelty() {
        let mut novelty = snapshot_of(
            StoreKey::Shimamura,
            vec![
                record(StoreKey::Shimamura, "YAMAHA GC22C Classical", "¥148,500"),
                record(StoreKey::Shimamura, "ARIA A-20 Student", "¥33,000"),
            ],
        );
        novelty.insert(
            StoreKey::Jguitar,
            vec![record(StoreKey::Jguitar, "ARIA A-30 Student", "¥80,000")],
        );

        let high = filter_high_value(&novelty);
        assert_eq!(high.len(), 1);
        let kept = &high[&StoreKey::Shimamura];
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "YAMAHA GC22C Classical");
        for (store, records) in &high {
            let source = &novelty[store];
            assert!(records.iter().all(|r| source.contains(r)));
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let novelty = snapshot_of(
            StoreKey::Ikebe,
            vec![record(StoreKey::Ikebe, "Gibson J-45 Vintage", "¥100,000")],
        );
        assert_eq!(filter_high_value(&novelty).len(), 1);
    }

    #[test]
    fn below_threshold_novelty_is_excluded() {
        let novelty = snapshot_of(
            StoreKey::Ikebe,
            vec![record(StoreKey::Ikebe, "YAMAHA CG192S Classical", "¥80,000")],
        );
        assert!(!novelty.is_empty());
        assert!(filter_high_value(&novelty).is_empty());
    }

    #[test]
    fn keyword_matches_ignore_price() {
        let novelty = snapshot_of(
            StoreKey::Kurosawa,
            vec![
                record(StoreKey::Kurosawa, "Ramirez ダブルトップ Classical", "¥80,000"),
                record(StoreKey::Kurosawa, "Gibson J-45 Vintage", "¥200,000"),
            ],
        );
        let hits = detect_keyword_matches(&novelty);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].store_name, "黒澤楽器店");
        assert_eq!(hits[0].name, "Ramirez ダブルトップ Classical");
        assert_eq!(hits[0].price, "¥80,000");
    }

    #[test]
    fn keyword_hits_follow_source_then_record_order() {
        let mut novelty = snapshot_of(
            StoreKey::Kurosawa,
            vec![record(StoreKey::Kurosawa, "Smallman Lattice Concert", "¥1,200,000")],
        );
        novelty.insert(
            StoreKey::Ikebe,
            vec![record(StoreKey::Ikebe, "Matsui Doubletop Cedar", "¥480,000")],
        );
        let hits = detect_keyword_matches(&novelty);
        // BTreeMap order: Ikebe before Kurosawa.
        assert_eq!(hits[0].store_name, "イケベ楽器店");
        assert_eq!(hits[1].store_name, "黒澤楽器店");
    }
}
