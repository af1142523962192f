//! Debug assertion macros for the invariants documented in spec.md §3/§8.
//!
//! Active only in debug builds (`#[cfg(debug_assertions)]`); zero overhead
//! in release builds.

// =============================================================================
// INV-Q-01: Bounded Count
// =============================================================================

/// Assert that `count` never exceeds `capacity`.
///
/// **Invariant**: `0 ≤ count ≤ capacity` (spec §3, property 2 of §8).
///
/// Used in: `BoundedQueue::put_locked` after incrementing `count`.
macro_rules! debug_assert_bounded_count {
    ($count:expr, $capacity:expr) => {
        debug_assert!(
            $count <= $capacity,
            "INV-Q-01 violated: count {} exceeds capacity {}",
            $count,
            $capacity
        )
    };
}

// =============================================================================
// INV-Q-02: Ring Position Consistency
// =============================================================================

/// Assert the ring-position invariant from spec §3:
/// `count == (tail - head) mod capacity` when `count < capacity`, else
/// `head == tail`.
///
/// Used in: `BoundedQueue` operations, after mutating `head`/`tail`/`count`.
macro_rules! debug_assert_ring_consistent {
    ($head:expr, $tail:expr, $count:expr, $capacity:expr) => {
        debug_assert!(
            if $count < $capacity {
                $count == ($tail + $capacity - $head) % $capacity
            } else {
                $head == $tail
            },
            "INV-Q-02 violated: head={} tail={} count={} capacity={}",
            $head,
            $tail,
            $count,
            $capacity
        )
    };
}

pub(crate) use debug_assert_bounded_count;
pub(crate) use debug_assert_ring_consistent;
