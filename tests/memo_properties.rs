// ==============================================
// MEMOIZER PROPERTY TESTS (integration)
// ==============================================
//
// Behavioural properties that span the key builder, both eviction policies
// and the facade's counters.

use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;

use memokit::prelude::*;
use proptest::prelude::*;

fn policy_strategy() -> impl Strategy<Value = CachePolicy> {
    prop_oneof![
        Just(CachePolicy::FrequencyBatch),
        Just(CachePolicy::RecencySingle)
    ]
}

fn arg_strategy() -> impl Strategy<Value = ArgValue> {
    prop_oneof![
        any::<i64>().prop_map(ArgValue::Int),
        any::<bool>().prop_map(ArgValue::Bool),
        "[a-z]{0,6}".prop_map(ArgValue::Str),
        (-1.0e6f64..1.0e6).prop_map(ArgValue::Float),
    ]
}

// ==============================================
// Key Equivalence
// ==============================================

proptest! {
    #[test]
    fn named_permutation_yields_same_key(
        positional in prop::collection::vec(arg_strategy(), 0..4),
        named in prop::collection::btree_map("[a-z]{1,4}", arg_strategy(), 0..5),
        seed in any::<u64>(),
    ) {
        let pairs: Vec<(String, ArgValue)> = named.into_iter().collect();
        let mut shuffled = pairs.clone();
        // deterministic rotation + reversal stands in for a shuffle
        if !shuffled.is_empty() {
            let len = shuffled.len();
            shuffled.rotate_left((seed as usize) % len);
            if seed % 2 == 0 {
                shuffled.reverse();
            }
        }

        let a = KeyBuilder::build(&positional, &pairs).unwrap();
        let b = KeyBuilder::build(&positional, &shuffled).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn differing_positional_values_yield_different_keys(
        prefix in prop::collection::vec(any::<i64>(), 0..3),
        x in any::<i64>(),
        y in any::<i64>(),
    ) {
        prop_assume!(x != y);
        let mut a: Vec<ArgValue> = prefix.iter().copied().map(ArgValue::Int).collect();
        let mut b = a.clone();
        a.push(ArgValue::Int(x));
        b.push(ArgValue::Int(y));
        prop_assert_ne!(
            KeyBuilder::build(&a, &[]).unwrap(),
            KeyBuilder::build(&b, &[]).unwrap()
        );
    }
}

// ==============================================
// Capacity Invariant
// ==============================================

proptest! {
    #[test]
    fn store_never_exceeds_capacity(
        policy in policy_strategy(),
        capacity in 1usize..40,
        ops in prop::collection::vec((any::<bool>(), 0u16..80), 1..400),
    ) {
        let mut store = CacheBuilder::new(capacity)
            .policy(policy)
            .try_build::<u16, u16>()
            .unwrap();

        for (is_get, key) in ops {
            if is_get {
                let _ = store.get(&key);
            } else {
                store.put(key, key);
                prop_assert!(store.contains(&key));
            }
            prop_assert!(store.len() <= capacity);
        }
    }

    #[test]
    fn counters_are_monotonic_and_account_for_every_call(
        policy in policy_strategy(),
        capacity in 1usize..8,
        keys in prop::collection::vec(0u8..12, 1..200),
    ) {
        let memo = Memoizer::with_capacity(capacity, policy).unwrap();
        let mut last = (0u64, 0u64);

        for key in &keys {
            memo.get_or_insert_with(&Args::new().arg(*key), |_| *key).unwrap();
            let now = (memo.hits(), memo.misses());
            prop_assert!(now.0 >= last.0 && now.1 >= last.1);
            prop_assert_eq!(now.0 + now.1, last.0 + last.1 + 1);
            last = now;
        }
        prop_assert!(memo.len() <= capacity);
    }

    #[test]
    fn misses_equal_distinct_keys_without_eviction(
        policy in policy_strategy(),
        keys in prop::collection::vec(0u8..16, 1..100),
    ) {
        // capacity above the key universe: nothing is ever evicted
        let memo = Memoizer::with_capacity(32, policy).unwrap();
        for key in &keys {
            memo.get_or_insert_with(&Args::new().arg(*key), |_| ()).unwrap();
        }
        let mut distinct = keys.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(memo.misses() as usize, distinct.len());
        prop_assert_eq!(memo.metrics().evictions, 0);
    }

    #[test]
    fn operation_runs_once_between_insert_and_evict(
        policy in policy_strategy(),
        capacity in 1usize..6,
        keys in prop::collection::vec(0u8..10, 1..150),
    ) {
        let memo = Memoizer::with_capacity(capacity, policy).unwrap();
        let invocations: RefCell<HashMap<u8, u32>> = RefCell::new(HashMap::new());

        for key in &keys {
            let args = Args::new().arg(*key);
            let was_cached = memo.contains(&args).unwrap();
            let before = invocations.borrow().get(key).copied().unwrap_or(0);
            memo.call(&args, |_| {
                *invocations.borrow_mut().entry(*key).or_default() += 1;
                Ok::<_, Infallible>(*key)
            })
            .unwrap();
            let after = invocations.borrow().get(key).copied().unwrap_or(0);
            // a cached key never re-runs the operation
            prop_assert_eq!(after - before, u32::from(!was_cached));
        }

        let total: u32 = invocations.borrow().values().sum();
        prop_assert_eq!(u64::from(total), memo.misses());
    }
}

// ==============================================
// Eviction Scenarios
// ==============================================

#[test]
fn frequency_batch_evicts_one_of_the_least_used() {
    let mut store = FrequencyBatchStore::new(4);
    for key in ["k1", "k2", "k3", "k4"] {
        store.put(key, ());
    }
    // counts become {k1:5, k2:1, k3:3, k4:1}
    for _ in 0..4 {
        store.get(&"k1");
    }
    for _ in 0..2 {
        store.get(&"k3");
    }

    store.put("k5", ());

    assert_eq!(store.evicted_total(), 1);
    let evicted: Vec<_> = ["k1", "k2", "k3", "k4"]
        .into_iter()
        .filter(|k| !store.contains(k))
        .collect();
    assert_eq!(evicted, vec!["k2"]);
}

#[test]
fn recency_single_evicts_least_recently_accessed() {
    let memo = Memoizer::with_capacity(2, CachePolicy::RecencySingle).unwrap();
    let key = |name: &str| Args::new().arg(name);

    memo.get_or_insert_with(&key("k1"), |_| 1).unwrap();
    memo.get_or_insert_with(&key("k2"), |_| 2).unwrap();
    memo.get_or_insert_with(&key("k1"), |_| 1).unwrap();
    memo.get_or_insert_with(&key("k3"), |_| 3).unwrap();

    assert!(memo.contains(&key("k1")).unwrap());
    assert!(!memo.contains(&key("k2")).unwrap());
    assert!(memo.contains(&key("k3")).unwrap());
}

fn replay(memo: &Memoizer<String>, calls: &[&str]) -> Vec<bool> {
    calls
        .iter()
        .map(|name| {
            let misses = memo.misses();
            memo.get_or_insert_with(&Args::new().arg(*name), |_| name.to_string())
                .unwrap();
            memo.misses() == misses
        })
        .collect()
}

#[test]
fn end_to_end_recency_capacity_two() {
    let memo = Memoizer::with_capacity(2, CachePolicy::RecencySingle).unwrap();
    let hits = replay(&memo, &["A", "A", "B", "B", "A", "C"]);

    assert_eq!(hits, vec![false, true, false, true, true, false]);
    assert_eq!((memo.hits(), memo.misses()), (3, 3));
    // C displaced B, the least recently used at that point
    assert!(!memo.contains(&Args::new().arg("B")).unwrap());
}

#[test]
fn end_to_end_recency_capacity_one() {
    let memo = Memoizer::with_capacity(1, CachePolicy::RecencySingle).unwrap();
    let hits = replay(&memo, &["A", "A", "B", "B", "A", "C"]);

    assert_eq!(hits, vec![false, true, false, true, false, false]);
    assert_eq!((memo.hits(), memo.misses()), (2, 4));
}

#[test]
fn url_workload_with_default_configuration() {
    let memo = Memoizer::default();
    let urls = [
        "https://google.com",
        "https://google.com",
        "https://youtube.com",
        "https://youtube.com",
        "https://google.com",
        "https://www.gov.uk",
        "https://google.com",
        "https://ithillel.ua",
        "https://google.com",
        "https://youtube.com",
    ];
    let hits = replay(&memo, &urls);

    // google stays hot; the second slot churns between the colder urls
    assert_eq!(
        hits,
        vec![false, true, false, true, true, false, true, false, true, false]
    );
    assert_eq!((memo.hits(), memo.misses()), (5, 5));
    assert!(memo.contains(&Args::new().arg("https://google.com")).unwrap());
}
