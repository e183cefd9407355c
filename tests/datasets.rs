// Invariants over the static tables (levels, reward palette).
// These tests are native-friendly and avoid wasm/browser APIs.

use std::collections::HashSet;

use number_city::level::{self, LEVELS};
use number_city::session::REWARD_HUES;

#[test]
fn level_ids_are_unique_and_resolvable() {
    let mut seen = HashSet::new();
    for l in LEVELS.iter() {
        assert!(seen.insert(l.id), "duplicate level id {}", l.id);
        assert_eq!(level::find(l.id), Some(l));
        assert!(l.answer_range > 0, "level {} has an empty answer range", l.id);
        assert!(!l.label.is_empty());
    }
}

#[test]
fn answer_ranges_strictly_increase() {
    for w in LEVELS.windows(2) {
        assert!(
            w[0].answer_range < w[1].answer_range,
            "level {} range {} not below level {} range {}",
            w[0].id,
            w[0].answer_range,
            w[1].id,
            w[1].answer_range
        );
    }
}

#[test]
fn palette_is_seven_distinct_hues() {
    let set: HashSet<u16> = REWARD_HUES.iter().copied().collect();
    assert_eq!(set.len(), 7);
    assert!(REWARD_HUES.iter().all(|h| *h < 360));
}
