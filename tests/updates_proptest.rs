// model = "claude-opus-4-5"
// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Property-based tests interleaving value updates, removals and filter
//! refreshes against a map model.

use std::collections::BTreeMap;

use facets::Builder;
use facets::FacetList;
use facets::Predicate;
use proptest::prelude::*;

// =============================================================================
// Test helpers
// =============================================================================

/// Ordered by key alone.
#[derive(Clone, Debug, PartialEq)]
struct Item {
    key: u16,
    score: u8,
}

fn item(key: u16) -> Item {
    return Item { key, score: 0 };
}

const FILTERS: usize = 5;
const EVEN: usize = 1;
const THIRD: usize = 2;
const HIGH: usize = 3;

/// Reference predicates, indexed like the list's filters. `threshold` is the
/// current bound of the high filter.
fn accepts(key: u16, score: u8, filter: usize, threshold: u8) -> bool {
    let even = score % 2 == 0;
    let third = key % 3 == 0;
    return match filter {
        0 => true,
        EVEN => even,
        THIRD => third,
        HIGH => even && score > threshold,
        _ => even != third,
    };
}

fn items(seed: u64) -> FacetList<Item> {
    let mut builder = Builder::with_comparator(|a: &Item, b: &Item| a.key.cmp(&b.key));
    builder.set_level_count(8).set_denominator(2).set_seed(seed);
    let even = builder.add_filter(Predicate::new(|item: &Item| item.score % 2 == 0)).unwrap();
    let third = builder.add_filter(Predicate::new(|item: &Item| item.key % 3 == 0)).unwrap();
    let high = builder
        .add_narrower(Predicate::new(|item: &Item| item.score > 100), [even])
        .unwrap();
    builder
        .add_derivative(|args: &[i32]| (args[0] != 0) != (args[1] != 0), [even, third])
        .unwrap();
    assert_eq!((even, third, high), (EVEN, THIRD, HIGH));
    return builder.create().unwrap();
}

#[derive(Clone, Debug)]
enum Op {
    Add { key: u16, score: u8 },
    Remove(u16),
    Filters { key: u16, score: u8 },
    Reorder { key: u16, to: u16, score: u8 },
    Threshold(u8),
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..60u16, any::<u8>()).prop_map(|(key, score)| Op::Add { key, score }),
        1 => (0..60u16).prop_map(Op::Remove),
        3 => (0..60u16, any::<u8>()).prop_map(|(key, score)| Op::Filters { key, score }),
        3 => (0..60u16, 0..60u16, any::<u8>()).prop_map(|(key, to, score)| Op::Reorder { key, to, score }),
        1 => any::<u8>().prop_map(Op::Threshold),
    ]
}

struct Model {
    scores: BTreeMap<u16, u8>,
    threshold: u8,
}

fn apply(list: &mut FacetList<Item>, model: &mut Model, op: &Op) {
    match *op {
        Op::Add { key, score } => {
            let added = list.add(Item { key, score });
            assert_eq!(added, !model.scores.contains_key(&key));
            model.scores.entry(key).or_insert(score);
        }
        Op::Remove(key) => {
            let removed = list.remove(&item(key)).map(|item| item.key);
            assert_eq!(removed, model.scores.remove(&key).map(|_| key));
        }
        Op::Filters { key, score } => {
            let updated = list.update_filters(item(key), |item| {
                item.score = score;
                true
            });
            assert_eq!(updated, model.scores.contains_key(&key));
            if let Some(stored) = model.scores.get_mut(&key) {
                *stored = score;
            }
        }
        Op::Reorder { key, to, score } => {
            // moving onto another element's key is a collision, covered elsewhere
            if to != key && model.scores.contains_key(&to) {
                return;
            }
            let updated = list.update_reorder(item(key), |item| {
                item.key = to;
                item.score = score;
                true
            });
            assert_eq!(updated, model.scores.contains_key(&key));
            if model.scores.remove(&key).is_some() {
                model.scores.insert(to, score);
            }
        }
        Op::Threshold(threshold) => {
            let dirty = list
                .projector_mut()
                .set_narrower(HIGH, Predicate::new(move |item: &Item| item.score > threshold))
                .unwrap();
            list.refresh_filters(&dirty);
            model.threshold = threshold;
        }
    }
}

fn check_views(list: &FacetList<Item>, model: &Model) {
    for filter in 0..FILTERS {
        let expected: Vec<(u16, u8)> = model
            .scores
            .iter()
            .filter(|&(&key, &score)| accepts(key, score, filter, model.threshold))
            .map(|(&key, &score)| (key, score))
            .collect();
        assert_eq!(list.size_of(filter), expected.len());
        let walked: Vec<(u16, u8)> = list.iter(filter).map(|item| (item.key, item.score)).collect();
        assert_eq!(walked, expected);
        for (index, &(key, _)) in expected.iter().enumerate() {
            assert_eq!(list.index_of(filter, &item(key)), Some(index));
        }
    }
}

// =============================================================================
// Update properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any mix of updates, removals and refreshes keeps the levels
    /// consistent and the views equal to the model.
    #[test]
    fn updates_keep_views_exact(
        ops in prop::collection::vec(arbitrary_op(), 1..120),
        seed in any::<u64>(),
        broadcast in any::<bool>(),
    ) {
        let mut list = items(seed);
        list.set_broadcast_old_value(broadcast);
        let mut model = Model {
            scores: BTreeMap::new(),
            threshold: 100,
        };
        for op in &ops {
            apply(&mut list, &mut model, op);
            prop_assert!(list.validate_integrity().is_ok());
        }
        check_views(&list, &model);
    }

    /// Observers can rebuild every view size from the notifications alone.
    #[test]
    fn notifications_sum_to_sizes(
        ops in prop::collection::vec(arbitrary_op(), 1..80),
        seed in any::<u64>(),
        broadcast in any::<bool>(),
    ) {
        let mut list = items(seed);
        list.set_broadcast_old_value(broadcast);
        let sizes = std::rc::Rc::new(std::cell::RefCell::new(vec![0i32; FILTERS]));
        let sink = std::rc::Rc::clone(&sizes);
        list.add_observer_fn(move |_: Option<&Item>, _: &[i32], _: &[i32], sign: i32, delta: &[i32]| {
            let mut sizes = sink.borrow_mut();
            for (size, count) in sizes.iter_mut().zip(delta) {
                *size += sign * count;
            }
        });
        let mut model = Model {
            scores: BTreeMap::new(),
            threshold: 100,
        };
        for op in &ops {
            apply(&mut list, &mut model, op);
        }
        let expected: Vec<i32> = (0..FILTERS).map(|filter| list.size_of(filter) as i32).collect();
        prop_assert_eq!(sizes.borrow().clone(), expected);
    }
}
