use algoviz::sorting::{ArrayEvent, SortArray, SortEngines, SortStats, Sorter, run_to_completion};
use rand::{Rng, SeedableRng, rngs::StdRng};

const MAX_STEPS: usize = 1_000_000;

fn random_values(seed: u64, len: usize) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(-50..=50)).collect()
}

/// Sorts `values` with `sorter` and returns the result with the final stats.
fn sort_with(sorter: Sorter, values: &[i32]) -> (Vec<i32>, SortStats) {
    let mut engines = SortEngines::default();
    engines.reset_all(values);
    let mut arr = SortArray::new(values.to_vec(), None);
    let engine = engines.get_mut(sorter);
    assert!(
        run_to_completion(engine, &mut arr, MAX_STEPS).is_some(),
        "{} did not finish",
        sorter
    );
    (arr.values().to_vec(), engine.stats())
}

#[test]
fn test_every_sorter_sorts_random_input() {
    for seed in 0..20 {
        let values = random_values(seed, (seed as usize * 7) % 60 + 2);
        let mut expected = values.clone();
        expected.sort();
        for sorter in Sorter::ALL {
            let (sorted, _) = sort_with(sorter, &values);
            assert_eq!(sorted, expected, "{} failed on seed {}", sorter, seed);
        }
    }
}

#[test]
fn test_duplicates_and_reversed_input() {
    let inputs = [
        vec![5, 5, 5, 5],
        vec![2, 1, 2, 1, 2, 1],
        (0..30).rev().collect::<Vec<_>>(),
        vec![i32::MAX, i32::MIN, 0],
    ];
    for values in inputs {
        let mut expected = values.clone();
        expected.sort();
        for sorter in Sorter::ALL {
            assert_eq!(sort_with(sorter, &values).0, expected, "{}", sorter);
        }
    }
}

#[test]
fn test_trivial_arrays_finish_immediately() {
    for values in [vec![], vec![42]] {
        for sorter in Sorter::ALL {
            let mut engines = SortEngines::default();
            engines.reset_all(&values);
            let mut arr = SortArray::new(values.clone(), None);
            let engine = engines.get_mut(sorter);
            assert_eq!(run_to_completion(engine, &mut arr, 10), Some(1), "{}", sorter);
            assert_eq!(engine.stats().comparisons, 0);
            assert_eq!(arr.values(), values.as_slice());
        }
    }
}

#[test]
fn test_stats_are_deterministic() {
    let values = random_values(99, 40);
    for sorter in Sorter::ALL {
        let first = sort_with(sorter, &values);
        let second = sort_with(sorter, &values);
        assert_eq!(first, second, "{}", sorter);
        assert!(first.1.comparisons > 0);
        assert!(first.1.array_accesses >= first.1.comparisons);
    }
}

#[test]
fn test_reset_is_idempotent() {
    let values = random_values(5, 25);
    let mut fresh = SortEngines::default();
    fresh.reset_all(&values);

    let mut used = SortEngines::default();
    used.reset_all(&values);
    for sorter in Sorter::ALL {
        let mut arr = SortArray::new(values.clone(), None);
        run_to_completion(used.get_mut(sorter), &mut arr, MAX_STEPS);
        assert!(used.get(sorter).is_sorted());
    }
    used.reset_all(&values);
    used.reset_all(&values);

    assert_eq!(used, fresh);
    for sorter in Sorter::ALL {
        assert!(!used.get(sorter).is_sorted());
        assert_eq!(used.get(sorter).stats(), SortStats::default());
    }
}

#[test]
fn test_events_replay_to_the_final_array() {
    let values = random_values(11, 30);
    for sorter in Sorter::ALL {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut arr = SortArray::new(values.clone(), Some(tx));
        let mut engines = SortEngines::default();
        engines.reset_all(&values);
        run_to_completion(engines.get_mut(sorter), &mut arr, MAX_STEPS);

        let mut replayed = Vec::new();
        for event in rx.try_iter() {
            match event {
                ArrayEvent::Initial { values } => replayed = values,
                ArrayEvent::Write { index, new, .. } => replayed[index] = new,
                ArrayEvent::Swap { a, b } => replayed.swap(a, b),
                ArrayEvent::Highlight { .. } => {}
            }
        }
        assert_eq!(replayed, arr.values(), "{}", sorter);
    }
}

#[test]
fn test_step_before_reset_does_nothing() {
    let values = vec![3, 2, 1];
    let mut engines = SortEngines::default();
    for sorter in Sorter::ALL {
        let mut arr = SortArray::new(values.clone(), None);
        engines.get_mut(sorter).step(&mut arr);
        assert_eq!(arr.values(), &[3, 2, 1], "{}", sorter);
        assert_eq!(engines.get(sorter).stats(), SortStats::default());
        assert_eq!(engines.get(sorter).current_line(), 0, "{}", sorter);
        assert!(!engines.get(sorter).is_sorted(), "{}", sorter);
    }
}
