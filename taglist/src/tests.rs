use crate::*;

use alloc::vec;
use alloc::vec::Vec;
use proptest::prelude::*;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        debug_assert!(start < end_exclusive);
        start + (self.next_u64() % (end_exclusive - start) as u64) as usize
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() >> 33) & 1 == 1
    }
}

fn abc() -> (ItemArray<&'static str>, TagMask) {
    let mut registry = MaskRegistry::new();
    let tag = registry.allocate();
    let array: ItemArray<&'static str> = ["A", "B", "C"].into_iter().collect();
    (array, tag)
}

fn expected_count(states: &[u32], mask: TagMask) -> usize {
    states
        .iter()
        .filter(|&&s| mask.matches(s, Match::All))
        .count()
}

#[test]
fn tagged_middle_entry_scenario() {
    let (mut array, tag) = abc();
    assert_eq!(tag.bits(), 1);
    assert!(array.set_state(1, tag, true).unwrap());

    assert_eq!(array.get_count(tag), 1);
    assert_eq!(array.get_actual_index(0, tag), Some(1));
    assert_eq!(array.get_item(0, tag), Ok(&"B"));
    assert_eq!(array.get_virtual_index(1, tag), Some(0));
    assert_eq!(array.get_virtual_index(0, tag), None);
}

#[test]
fn remove_at_bumps_version_once() {
    let (mut array, _) = abc();
    let before = array.version();

    assert_eq!(array.remove_at(1), Ok("B"));
    assert_eq!(array.iter().copied().collect::<Vec<_>>(), vec!["A", "C"]);
    assert_eq!(array.get_count(TagMask::EMPTY), 2);
    assert_eq!(array.version(), before + 1);
}

#[test]
fn out_of_range_accessors_fail() {
    let (mut array, tag) = abc();
    assert_eq!(
        array.get(3),
        Err(Error::IndexOutOfRange { index: 3, len: 3 })
    );
    assert_eq!(
        array.remove_at(7),
        Err(Error::IndexOutOfRange { index: 7, len: 3 })
    );
    assert!(array.insert(4, "D").is_err());
    assert!(array.set_state(3, tag, true).is_err());
    assert_eq!(array.get_actual_index(0, tag), None);
    assert_eq!(
        array.get_item(0, tag),
        Err(Error::IndexOutOfRange { index: 0, len: 0 })
    );
}

#[test]
fn insert_at_len_appends_and_shifts_otherwise() {
    let (mut array, tag) = abc();
    array.set_state(2, tag, true).unwrap();

    array.insert(3, "D").unwrap();
    array.insert(0, "Z").unwrap();
    assert_eq!(
        array.iter().copied().collect::<Vec<_>>(),
        vec!["Z", "A", "B", "C", "D"]
    );
    // The tag travels with "C".
    assert_eq!(array.get_actual_index(0, tag), Some(3));
}

#[test]
fn empty_mask_addresses_the_full_array() {
    let (array, _) = abc();
    assert_eq!(array.get_count(TagMask::EMPTY), 3);
    assert_eq!(array.get_actual_index(2, TagMask::EMPTY), Some(2));
    assert_eq!(array.get_actual_index(3, TagMask::EMPTY), None);
    assert_eq!(array.get_item(1, TagMask::EMPTY), Ok(&"B"));
}

#[test]
fn match_all_and_any_differ_on_multi_bit_masks() {
    let mut registry = MaskRegistry::new();
    let a = registry.allocate();
    let b = registry.allocate();
    let mut array: ItemArray<u32> = (0..4).collect();
    array.set_state(0, a, true).unwrap();
    array.set_state(1, b, true).unwrap();
    array.set_state(2, a | b, true).unwrap();

    assert_eq!(array.count_matching(a | b, Match::All), 1);
    assert_eq!(array.count_matching(a | b, Match::Any), 3);
    assert_eq!(array.actual_index_matching(1, a | b, Match::Any), Some(1));
    assert_eq!(array.state(2), Ok(a.bits() | b.bits()));

    array.set_state(2, a, false).unwrap();
    assert_eq!(array.state(2), Ok(b.bits()));
}

#[test]
fn set_state_only_bumps_version_on_change() {
    let (mut array, tag) = abc();
    let v0 = array.version();
    assert!(array.set_state(0, tag, true).unwrap());
    assert_eq!(array.version(), v0 + 1);
    assert!(!array.set_state(0, tag, true).unwrap());
    assert_eq!(array.version(), v0 + 1);
    assert!(array.get_state(0, tag).unwrap());
}

#[test]
fn clear_state_resets_one_tag_only() {
    let mut registry = MaskRegistry::new();
    let selected = registry.allocate();
    let caret = registry.allocate();
    let mut array: ItemArray<u32> = (0..5).collect();
    for i in [0, 2, 4] {
        array.set_state(i, selected, true).unwrap();
    }
    array.set_state(2, caret, true).unwrap();

    assert_eq!(array.clear_state(selected), 3);
    assert_eq!(array.get_count(selected), 0);
    assert_eq!(array.get_count(caret), 1);
    assert_eq!(array.clear_state(selected), 0);
}

#[test]
fn count_cache_follows_version() {
    let (mut array, tag) = abc();
    array.set_state(0, tag, true).unwrap();
    assert_eq!(array.get_count(tag), 1);
    assert_eq!(array.get_count(tag), 1);

    array.set_state(2, tag, true).unwrap();
    assert_eq!(array.get_count(tag), 2);

    array.remove_at(0).unwrap();
    assert_eq!(array.get_count(tag), 1);

    array.clear();
    assert_eq!(array.get_count(tag), 0);
}

#[test]
fn handles_survive_reordering_and_die_on_removal() {
    let mut array = ItemArray::new();
    let a = array.add("a");
    let b = array.add("b");
    let c = array.add("c");

    array.sort_by(|x, y| y.cmp(x));
    assert_eq!(array.index_of_entry(a), Some(2));
    assert_eq!(array.resolve(b), Some(&"b"));

    assert_eq!(array.remove_entry(b), Some("b"));
    assert_eq!(array.resolve(b), None);
    assert_eq!(array.remove_entry(b), None);

    // A reused slot gets a fresh handle.
    let d = array.add("d");
    assert_ne!(d, b);
    assert_eq!(array.resolve(b), None);
    assert_eq!(array.resolve(d), Some(&"d"));

    array.clear();
    assert_eq!(array.resolve(c), None);
    assert_eq!(array.resolve(d), None);
    assert!(array.is_empty());

    let e = array.add("e");
    assert_eq!(array.resolve(c), None);
    assert_eq!(array.resolve(d), None);
    assert_eq!(array.index_of_entry(e), Some(0));
}

#[test]
fn equal_payloads_are_distinct_entries() {
    let mut registry = MaskRegistry::new();
    let tag = registry.allocate();
    let mut array = ItemArray::new();
    let first = array.add("same");
    let second = array.add("same");
    assert_ne!(first, second);

    array.set_state(1, tag, true).unwrap();
    assert_eq!(array.get_actual_index(0, tag), Some(1));
    assert!(!array.resolve_entry(first).unwrap().has(tag));
    assert!(array.resolve_entry(second).unwrap().has(tag));
}

#[test]
fn set_item_keeps_state_and_handle() {
    let (mut array, tag) = abc();
    let id = array.entry_id(1).unwrap();
    array.set_state(1, tag, true).unwrap();

    assert_eq!(array.set_item(1, "B2"), Ok("B"));
    assert_eq!(array.entry_id(1), Ok(id));
    assert_eq!(array.get_item(0, tag), Ok(&"B2"));
}

#[test]
fn get_mut_edits_in_place_without_bumping_version() {
    let mut array: ItemArray<u32> = (0..3).collect();
    let v = array.version();
    *array.get_mut(1).unwrap() = 10;
    assert_eq!(array.get(1), Ok(&10));
    assert_eq!(array.version(), v);
}

#[test]
fn sort_is_stable_for_ties() {
    let mut registry = MaskRegistry::new();
    let tag = registry.allocate();
    let mut array: ItemArray<(u32, char)> =
        [(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd'), (0, 'e')]
            .into_iter()
            .collect();
    array.set_state(2, tag, true).unwrap();
    let v = array.version();

    array.sort_by(|x, y| x.0.cmp(&y.0));

    let order: Vec<char> = array.iter().map(|x| x.1).collect();
    assert_eq!(order, vec!['e', 'b', 'd', 'a', 'c']);
    assert_eq!(array.get_item(0, tag), Ok(&(2, 'c')));
    assert_eq!(array.get_actual_index(0, tag), Some(4));
    assert_eq!(array.version(), v + 1);
}

#[test]
fn iter_tagged_visits_matches_in_insertion_order() {
    let mut registry = MaskRegistry::new();
    let tag = registry.allocate();
    let mut array: ItemArray<u32> = (0..10).collect();
    for i in [7, 1, 4] {
        array.set_state(i, tag, true).unwrap();
    }
    let seen: Vec<(usize, u32)> = array
        .iter_tagged(tag, Match::All)
        .map(|(i, &x)| (i, x))
        .collect();
    assert_eq!(seen, vec![(1, 1), (4, 4), (7, 7)]);
}

#[test]
fn cursor_detects_structural_modification() {
    let (mut array, _) = abc();
    let mut cursor = array.cursor(TagMask::EMPTY, Match::All);
    assert_eq!(cursor.advance(&array), Ok(Some((0, &"A"))));

    array.add("D");
    let expected = cursor.version();
    assert_eq!(
        cursor.advance(&array),
        Err(Error::ConcurrentModification {
            expected,
            found: expected + 1
        })
    );
    // Stays failed until reset.
    assert!(cursor.advance(&array).is_err());

    cursor.reset(&array);
    let mut seen = Vec::new();
    while let Some((_, item)) = cursor.advance(&array).unwrap() {
        seen.push(*item);
    }
    assert_eq!(seen, vec!["A", "B", "C", "D"]);
}

#[test]
fn cursor_fails_after_remove_clear_and_state_change() {
    let (mut array, tag) = abc();

    let mut cursor = array.cursor(TagMask::EMPTY, Match::All);
    cursor.advance(&array).unwrap();
    array.remove_at(0).unwrap();
    assert!(matches!(
        cursor.advance(&array),
        Err(Error::ConcurrentModification { .. })
    ));

    let mut cursor = array.cursor(TagMask::EMPTY, Match::All);
    array.set_state(0, tag, true).unwrap();
    assert!(cursor.advance(&array).is_err());

    let mut cursor = array.cursor(tag, Match::All);
    array.clear();
    assert!(cursor.advance(&array).is_err());
}

#[test]
fn cursor_skips_non_matching_entries() {
    let (mut array, tag) = abc();
    array.set_state(0, tag, true).unwrap();
    array.set_state(2, tag, true).unwrap();

    let mut cursor = array.cursor(tag, Match::All);
    assert_eq!(cursor.advance(&array), Ok(Some((0, &"A"))));
    assert_eq!(cursor.advance(&array), Ok(Some((2, &"C"))));
    assert_eq!(cursor.advance(&array), Ok(None));
    assert_eq!(cursor.advance(&array), Ok(None));
}

#[test]
fn tag_view_exposes_collection_semantics() {
    let mut registry = MaskRegistry::new();
    let tag = registry.allocate();
    let mut array: ItemArray<&str> = ["a", "b", "c", "d"].into_iter().collect();
    array.set_state(1, tag, true).unwrap();
    array.set_state(3, tag, true).unwrap();

    let view = array.view(tag);
    assert_eq!(view.count(), 2);
    assert!(!view.is_empty());
    assert_eq!(view.to_indices(), vec![1, 3]);
    assert_eq!(view.get(1), Ok(&"d"));
    assert_eq!(
        view.get(2),
        Err(Error::IndexOutOfRange { index: 2, len: 2 })
    );
    assert_eq!(view.actual_index(0), Some(1));
    assert_eq!(view.virtual_index(3), Some(1));
    assert!(view.contains_index(3));
    assert!(!view.contains_index(2));
    assert!(!view.contains_index(99));
    assert!(view.contains(&"b"));
    assert!(!view.contains(&"a"));
    assert_eq!(view.position(&"d"), Some(1));
    assert_eq!(view.first(), Some(&"b"));
    assert_eq!(
        view.into_iter().copied().collect::<Vec<_>>(),
        vec!["b", "d"]
    );

    let empty = array.view(registry.allocate());
    assert!(empty.is_empty());
    assert_eq!(empty.first_index(), None);
}

#[test]
fn registry_hands_out_distinct_bits_until_exhausted() {
    let mut registry = MaskRegistry::new();
    let mut seen = 0u32;
    for i in 0..TagMask::MAX_TAGS {
        let mask = registry.try_allocate().unwrap();
        assert_eq!(mask.bits(), 1 << i);
        assert_eq!(seen & mask.bits(), 0);
        seen |= mask.bits();
    }
    assert_eq!(registry.allocated(), 31);
    assert_eq!(registry.remaining(), 0);
    assert_eq!(registry.allocated_mask().bits(), seen);
    assert_eq!(
        registry.try_allocate(),
        Err(Error::TagBitsExhausted { max: 31 })
    );
}

#[test]
#[should_panic(expected = "tag bits")]
fn registry_allocate_panics_past_the_last_bit() {
    let mut registry = MaskRegistry::new();
    for _ in 0..TagMask::MAX_TAGS {
        registry.allocate();
    }
    registry.allocate();
}

#[test]
fn registries_are_independent() {
    let mut a = MaskRegistry::new();
    let mut b = MaskRegistry::new();
    a.allocate();
    a.allocate();
    assert_eq!(b.allocate().bits(), 1);
    assert_eq!(a.allocated_mask().bits(), 0b11);
    assert_eq!(MaskRegistry::new().allocated_mask(), TagMask::EMPTY);
}

#[test]
fn randomized_ops_match_a_vec_model() {
    let mut rng = Lcg::new(0x7461_676c_6973_74);
    let mut registry = MaskRegistry::new();
    let tags = [
        registry.allocate(),
        registry.allocate(),
        registry.allocate(),
    ];

    let mut array = ItemArray::new();
    let mut model: Vec<(u32, u32)> = Vec::new(); // (payload, state)
    let mut next_payload = 0u32;

    for _ in 0..2_000 {
        let version = array.version();
        match rng.gen_range_usize(0, 5) {
            0 => {
                array.add(next_payload);
                model.push((next_payload, 0));
                next_payload += 1;
                assert_eq!(array.version(), version + 1);
            }
            1 => {
                let index = rng.gen_range_usize(0, model.len() + 1);
                array.insert(index, next_payload).unwrap();
                model.insert(index, (next_payload, 0));
                next_payload += 1;
            }
            2 if !model.is_empty() => {
                let index = rng.gen_range_usize(0, model.len());
                assert_eq!(array.remove_at(index), Ok(model.remove(index).0));
                assert_eq!(array.version(), version + 1);
            }
            3 | 4 if !model.is_empty() => {
                let index = rng.gen_range_usize(0, model.len());
                let tag = tags[rng.gen_range_usize(0, tags.len())];
                let value = rng.gen_bool();
                let changed = array.set_state(index, tag, value).unwrap();
                let prev = model[index].1;
                model[index].1 = if value {
                    prev | tag.bits()
                } else {
                    prev & !tag.bits()
                };
                assert_eq!(changed, prev != model[index].1);
            }
            _ => {}
        }

        assert_eq!(array.len(), model.len());
        let states: Vec<u32> = model.iter().map(|m| m.1).collect();
        for &tag in &tags {
            assert_eq!(array.get_count(tag), expected_count(&states, tag));
        }
    }

    let payloads: Vec<u32> = array.iter().copied().collect();
    assert_eq!(payloads, model.iter().map(|m| m.0).collect::<Vec<_>>());
}

#[derive(Clone, Debug)]
enum Op {
    Add(u16),
    Insert(usize, u16),
    RemoveAt(usize),
    Tag(usize, bool),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u16>().prop_map(Op::Add),
        (any::<usize>(), any::<u16>()).prop_map(|(i, x)| Op::Insert(i, x)),
        any::<usize>().prop_map(Op::RemoveAt),
        (any::<usize>(), any::<bool>()).prop_map(|(i, v)| Op::Tag(i, v)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn counts_match_an_independent_scan(ops in proptest::collection::vec(op_strategy(), 0..200)) {
        let mut registry = MaskRegistry::new();
        let tag = registry.allocate();
        let mut array = ItemArray::new();
        let mut live = 0usize;

        for op in ops {
            match op {
                Op::Add(x) => {
                    array.add(x);
                    live += 1;
                }
                Op::Insert(i, x) => {
                    let index = i % (array.len() + 1);
                    array.insert(index, x).unwrap();
                    live += 1;
                }
                Op::RemoveAt(i) => {
                    if !array.is_empty() {
                        array.remove_at(i % array.len()).unwrap();
                        live -= 1;
                    }
                }
                Op::Tag(i, v) => {
                    if !array.is_empty() {
                        let index = i % array.len();
                        array.set_state(index, tag, v).unwrap();
                    }
                }
            }
        }

        prop_assert_eq!(array.get_count(TagMask::EMPTY), live);
        let scanned = (0..array.len())
            .filter(|&i| array.get_state(i, tag).unwrap())
            .collect::<Vec<_>>();
        prop_assert_eq!(array.get_count(tag), scanned.len());
        let visited = array.iter_tagged(tag, Match::All).map(|(i, _)| i).collect::<Vec<_>>();
        prop_assert_eq!(&visited, &scanned);
        for (virtual_index, &actual) in scanned.iter().enumerate() {
            prop_assert_eq!(array.get_actual_index(virtual_index, tag), Some(actual));
        }
        prop_assert_eq!(array.get_actual_index(scanned.len(), tag), None);
    }

    #[test]
    fn sort_orders_by_comparator_and_keeps_ties(keys in proptest::collection::vec(0u8..8, 0..64)) {
        let mut array: ItemArray<(u8, usize)> =
            keys.iter().copied().enumerate().map(|(i, k)| (k, i)).collect();
        array.sort_by(|a, b| a.0.cmp(&b.0));

        let sorted: Vec<(u8, usize)> = array.iter().copied().collect();
        for pair in sorted.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            prop_assert!(a.0 < b.0 || (a.0 == b.0 && a.1 < b.1));
        }
    }
}
