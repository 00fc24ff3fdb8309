//! Basic usage example for `DynamicSequence`.
//!
//! This example demonstrates how the capacity of a sequence grows as elements are added,
//! how positional insertion and removal shift the elements around, and how the fallible
//! API reports allocation problems without modifying the sequence.

use dynamic_sequence::{DropPolicy, DynamicSequence};

fn main() {
    let mut sequence = DynamicSequence::new();

    println!("Created empty sequence with capacity: {}", sequence.capacity());

    for value in 1..=5_u32 {
        sequence.push_back(value);
        println!(
            "Appended {value}, length is now {} and capacity {}",
            sequence.len(),
            sequence.capacity()
        );
    }

    // Constructs the new element in place, shifting everything after it.
    let inserted = sequence.emplace_at(2, || 100);
    *inserted += 1;
    println!("After inserting at index 2: {sequence:?}");

    // Erasing returns the element that moved into the erased position.
    if let Some(following) = sequence.erase_at(0) {
        println!("Erased index 0, the element now at index 0 is {following}");
    }

    sequence.resize(8);
    println!("After resizing to 8: {sequence:?}");

    // The sequence dereferences to a slice, so slice methods work directly.
    sequence.sort_unstable();
    println!("Sorted: {sequence:?}");

    match sequence.try_reserve(usize::MAX) {
        Ok(()) => println!("Reserved an impossibly large capacity?!"),
        Err(error) => println!("Reservation failed as expected: {error}"),
    }
    println!("The sequence is unchanged: {sequence:?}");

    // A copy is sized exactly for its contents.
    let copy = sequence.clone();
    println!(
        "Copy has length {} and capacity {}, original has capacity {}",
        copy.len(),
        copy.capacity(),
        sequence.capacity()
    );

    // Moving the contents out leaves the source empty but usable.
    let moved = sequence.take();
    println!("Moved {} elements, source now has length {}", moved.len(), sequence.len());

    let mut strict = DynamicSequence::builder()
        .capacity(4)
        .drop_policy(DropPolicy::MustNotDropItems)
        .build();

    strict.extend(moved);
    let total: u32 = strict.iter().sum();
    println!("Sum of the elements in the strict sequence: {total}");

    // A sequence with this policy must be emptied before it is dropped.
    strict.clear();

    println!("Example completed successfully!");
}
