//! Integration tests for the `dynamic_sequence` package.
//!
//! These tests drive `DynamicSequence<T>` through long chains of operations and compare the
//! outcome against `Vec<T>`, which serves as a model of the expected behavior.

use std::thread;

use dynamic_sequence::{DynamicSequence, Error, RawStorage};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const OPERATION_COUNT: u64 = 5_000;

#[test]
fn random_operations_match_vec() {
    let mut rng = SmallRng::seed_from_u64(42);

    let mut sequence = DynamicSequence::new();
    let mut model: Vec<u64> = Vec::new();

    for step in 0..OPERATION_COUNT {
        let capacity_before = sequence.capacity();

        match rng.random_range(0..8) {
            0 | 1 => {
                sequence.push_back(step);
                model.push(step);
            }
            2 => {
                let index = rng.random_range(0..=model.len());
                sequence.insert(index, step);
                model.insert(index, step);
            }
            3 if !model.is_empty() => {
                let index = rng.random_range(0..model.len());
                let following = sequence.erase_at(index).copied();
                model.remove(index);
                assert_eq!(following, model.get(index).copied());
            }
            4 => {
                assert_eq!(sequence.pop(), model.pop());
            }
            5 => {
                let new_len = rng.random_range(0..=model.len() + 3);
                sequence.resize(new_len);
                model.resize(new_len, 0);
            }
            6 => {
                let new_capacity = rng.random_range(0..=model.len() * 2);
                sequence.reserve(new_capacity);
                assert!(sequence.capacity() >= new_capacity);
            }
            _ => {
                let copy = sequence.clone();
                assert_eq!(copy.capacity(), copy.len());
                sequence.clone_from(&copy);
            }
        }

        assert_eq!(*sequence, *model);
        assert!(sequence.len() <= sequence.capacity());
        assert!(sequence.capacity() >= capacity_before);
    }
}

#[test]
fn appends_preserve_order() {
    for count in 0..100_usize {
        let mut sequence = DynamicSequence::new();

        for value in 0..count {
            sequence.push_back(value);
        }

        assert_eq!(sequence.len(), count);
        assert!(sequence.capacity() >= count);
        assert!(sequence.iter().copied().eq(0..count));
    }
}

#[test]
fn insert_at_every_position() {
    let original: DynamicSequence<u32> = (0..6).collect();

    for index in 0..=original.len() {
        let mut sequence = original.clone();
        sequence.insert(index, 100);

        let mut expected: Vec<u32> = (0..6).collect();
        expected.insert(index, 100);

        assert_eq!(*sequence, *expected);
    }
}

#[test]
fn clone_from_matches_source_for_all_size_combinations() {
    for target_len in 0..6_u32 {
        for source_len in 0..6_u32 {
            let mut target: DynamicSequence<String> =
                (0..target_len).map(|value| format!("t{value}")).collect();
            let source: DynamicSequence<String> =
                (0..source_len).map(|value| format!("s{value}")).collect();

            target.clone_from(&source);

            assert_eq!(target, source);
        }
    }
}

#[test]
fn sequence_can_be_moved_between_threads() {
    let mut sequence: DynamicSequence<String> = ["a", "b"].into_iter().map(String::from).collect();

    let handle = thread::spawn(move || {
        sequence.push_back("c".to_string());
        sequence
    });

    let sequence = handle.join().unwrap();
    assert_eq!(*sequence, ["a", "b", "c"]);
}

#[test]
fn sequence_can_be_shared_between_threads() {
    let sequence: DynamicSequence<u64> = (1..=100).collect();

    let sum = thread::scope(|scope| {
        let first = scope.spawn(|| sequence.iter().take(50).sum::<u64>());
        let second = scope.spawn(|| sequence.iter().skip(50).sum::<u64>());

        first.join().unwrap() + second.join().unwrap()
    });

    assert_eq!(sum, 5050);
}

#[test]
fn raw_storage_reports_impossible_capacity() {
    let result = RawStorage::<u128>::allocate(usize::MAX / 2);

    assert!(matches!(result, Err(Error::CapacityOverflow)));
}

#[test]
fn try_api_reports_errors_without_side_effects() {
    let mut sequence: DynamicSequence<u32> = (0..4).collect();

    let error = sequence.try_reserve(usize::MAX).unwrap_err();

    assert!(error.to_string().contains("exceeds"));
    assert_eq!(*sequence, [0, 1, 2, 3]);
}
