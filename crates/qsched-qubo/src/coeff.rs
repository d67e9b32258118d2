//! Canonical-pair coefficient storage.

use std::collections::BTreeMap;
use std::fmt;

/// An unordered variable pair stored smallest-index-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey(usize, usize);

impl PairKey {
    /// Canonicalize `(a, b)`. Returns `None` for a diagonal pair.
    pub fn new(a: usize, b: usize) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self(a, b)),
            std::cmp::Ordering::Greater => Some(Self(b, a)),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Smaller index.
    pub fn low(self) -> usize {
        self.0
    }

    /// Larger index.
    pub fn high(self) -> usize {
        self.1
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// Pair coefficients with accumulate-on-insert semantics.
///
/// `(a, b)` and `(b, a)` address the same entry; repeated contributions sum.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairMap {
    inner: BTreeMap<PairKey, f64>,
}

impl PairMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` to the `(a, b)` entry. Returns `false` for a diagonal pair,
    /// which is left for the caller to fold into its per-variable terms.
    pub fn add(&mut self, a: usize, b: usize, value: f64) -> bool {
        match PairKey::new(a, b) {
            Some(key) => {
                *self.inner.entry(key).or_insert(0.0) += value;
                true
            }
            None => false,
        }
    }

    /// Coefficient of `(a, b)`, zero if absent.
    pub fn get(&self, a: usize, b: usize) -> f64 {
        PairKey::new(a, b)
            .and_then(|k| self.inner.get(&k).copied())
            .unwrap_or(0.0)
    }

    /// Entries in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (PairKey, f64)> + '_ {
        self.inner.iter().map(|(k, v)| (*k, *v))
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True if no pair is stored.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_key() {
        assert_eq!(PairKey::new(3, 1), PairKey::new(1, 3));
        assert_eq!(PairKey::new(3, 1).unwrap().low(), 1);
        assert!(PairKey::new(2, 2).is_none());
    }

    #[test]
    fn test_accumulates_both_orders() {
        let mut m = PairMap::new();
        assert!(m.add(0, 1, 10.0));
        assert!(m.add(1, 0, 5.0));
        assert_eq!(m.len(), 1);
        assert_eq!(m.get(0, 1), 15.0);
        assert_eq!(m.get(1, 0), 15.0);
        assert!(!m.add(4, 4, 1.0));
        assert_eq!(m.get(7, 8), 0.0);
    }
}
