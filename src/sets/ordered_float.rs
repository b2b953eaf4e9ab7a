use std::{cmp::Ordering, hash::Hash, hash::Hasher};

/// A wrapper around `f64` that provides total ordering and proper
/// equality semantics.
///
/// Standard `f64` does not implement `Ord` or `Eq` due to `NaN` and
/// signed zeros. This wrapper uses bit-level comparison so distances
/// can be used as `BinaryHeap`/sort keys. Network distances computed by
/// this crate are never `NaN` in practice, but a total order is still
/// required for the heap and for deterministic tie-breaking.
#[derive(Debug, Copy, Clone)]
#[repr(transparent)]
pub struct TotalF64(pub f64);

impl PartialEq for TotalF64 {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for TotalF64 {}

impl PartialOrd for TotalF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TotalF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for TotalF64 {
    fn from(x: f64) -> Self {
        TotalF64(x)
    }
}

impl Hash for TotalF64 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_like_floats_for_ordinary_values() {
        let a = TotalF64(1.0);
        let b = TotalF64(2.0);
        let c = TotalF64(3.0);
        assert!(a < b);
        assert!(b < c);
        assert!(c > a);
    }

    #[test]
    fn treats_positive_and_negative_zero_as_distinct() {
        let pos_zero = TotalF64(0.0);
        let neg_zero = TotalF64(-0.0);
        assert_ne!(pos_zero, neg_zero);
        assert!(pos_zero > neg_zero);
    }

    #[test]
    fn sorts_without_panicking_even_with_nan() {
        let mut values = [
            TotalF64(3.0),
            TotalF64(1.0),
            TotalF64(f64::NAN),
            TotalF64(2.0),
        ];
        values.sort();
        assert_eq!(values[0], TotalF64(1.0));
        assert_eq!(values[1], TotalF64(2.0));
        assert_eq!(values[2], TotalF64(3.0));
        assert!(values[3].0.is_nan());
    }

    #[test]
    fn hash_is_consistent_with_equality() {
        use std::collections::hash_map::DefaultHasher;
        let a = TotalF64(42.5);
        let b = TotalF64(42.5);
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }
}
