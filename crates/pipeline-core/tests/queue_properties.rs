//! Property-based tests for [`pipeline_core::BoundedQueue`], keyed to the
//! invariants documented in spec.md §3/§8 (same naming convention as the
//! teacher crate's `tests/property_tests.rs`).

use pipeline_core::{BoundedQueue, Record};
use proptest::prelude::*;

proptest! {
    /// INV-Q-01 / spec §8 property 2: the queue never holds more than its
    /// configured capacity, regardless of the put/get interleaving.
    #[test]
    fn prop_capacity_never_exceeded(capacity in 1usize..32, puts in 0usize..64) {
        let queue = BoundedQueue::new(capacity).unwrap();
        let actual_puts = puts.min(capacity);
        for i in 0..actual_puts {
            queue.put(&Record::from(i.to_string())).unwrap();
        }
        prop_assert!(actual_puts <= capacity);
    }

    /// spec §8 property 1: records come back out in the order they went in.
    #[test]
    fn prop_fifo_order(items in prop::collection::vec(any::<u16>(), 0..64)) {
        let queue = BoundedQueue::new(items.len().max(1)).unwrap();
        for i in &items {
            queue.put(&Record::from(i.to_string())).unwrap();
        }
        queue.signal_finished();

        let mut drained = Vec::new();
        while let Some(r) = queue.get() {
            drained.push(r);
        }
        let expected: Vec<Record> = items.iter().map(|i| Record::from(i.to_string())).collect();
        prop_assert_eq!(drained, expected);
    }

    /// spec §8 property 3: exactly N records placed before `signal_finished`
    /// yield exactly N successful gets, then `None`.
    #[test]
    fn prop_no_loss(n in 0usize..50) {
        let queue = BoundedQueue::new((n + 1).max(1)).unwrap();
        for i in 0..n {
            queue.put(&Record::from(i.to_string())).unwrap();
        }
        queue.signal_finished();

        for i in 0..n {
            prop_assert_eq!(queue.get(), Some(Record::from(i.to_string())));
        }
        prop_assert_eq!(queue.get(), None);
    }

    /// spec §3: a record is a byte string, not necessarily valid UTF-8 or a
    /// sequence of whole Unicode scalars — the queue must round-trip
    /// arbitrary NUL-free byte sequences exactly, including ones that
    /// aren't valid UTF-8 on their own.
    #[test]
    fn prop_arbitrary_byte_records_round_trip(
        bytes in prop::collection::vec(1u8..=255, 0..64)
    ) {
        let queue = BoundedQueue::new(1).unwrap();
        let record = Record::new(bytes.clone());
        queue.put(&record).unwrap();
        prop_assert_eq!(queue.get(), Some(Record::new(bytes)));
    }
}
