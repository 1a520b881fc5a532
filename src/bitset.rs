//! Fixed-capacity bit sets for capability and state bitmaps.

use std::fmt;

const WORD_BITS: usize = u64::BITS as usize;

/// Index rejected by a [`BitSet`] because it is not below the set's capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange {
    pub index: usize,
    pub capacity: usize,
}

/// A set of integers in `0..capacity`.
///
/// Mutators reject out-of-range indices instead of masking them, so a code
/// can never alias onto a different bit.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitSet {
    words: Box<[u64]>,
    capacity: usize,
}

impl BitSet {
    /// Create an empty set able to hold `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(WORD_BITS)].into_boxed_slice(),
            capacity,
        }
    }

    /// Exclusive upper bound of storable indices.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether `index` is in the set. Out-of-range indices are never members.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        index < self.capacity && self.words[index / WORD_BITS] & Self::mask(index) != 0
    }

    /// Add `index` to the set.
    #[inline]
    pub fn insert(&mut self, index: usize) -> Result<(), OutOfRange> {
        self.set(index, true)
    }

    /// Remove `index` from the set.
    #[inline]
    pub fn remove(&mut self, index: usize) -> Result<(), OutOfRange> {
        self.set(index, false)
    }

    /// Set membership of `index` to `on`.
    pub fn set(&mut self, index: usize, on: bool) -> Result<(), OutOfRange> {
        self.check(index)?;
        let word = &mut self.words[index / WORD_BITS];
        if on {
            *word |= Self::mask(index);
        } else {
            *word &= !Self::mask(index);
        }
        Ok(())
    }

    /// Flip membership of `index`, returning the new membership.
    pub fn toggle(&mut self, index: usize) -> Result<bool, OutOfRange> {
        self.check(index)?;
        let word = &mut self.words[index / WORD_BITS];
        *word ^= Self::mask(index);
        Ok(*word & Self::mask(index) != 0)
    }

    /// Remove every member.
    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether the set has no members.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Iterate over members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.capacity).filter(move |&i| self.contains(i))
    }

    /// Raw little-endian words, in the layout `EVIOCGBIT`-style queries use.
    pub fn as_words(&self) -> &[u64] {
        &self.words
    }

    fn check(&self, index: usize) -> Result<(), OutOfRange> {
        if index < self.capacity {
            Ok(())
        } else {
            Err(OutOfRange {
                index,
                capacity: self.capacity,
            })
        }
    }

    #[inline]
    fn mask(index: usize) -> u64 {
        1 << (index % WORD_BITS)
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_contains() {
        let mut set = BitSet::new(0x300);
        assert!(set.is_empty());

        set.insert(30).unwrap();
        set.insert(0x2ff).unwrap();
        assert!(set.contains(30));
        assert!(set.contains(0x2ff));
        assert!(!set.contains(31));
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![30, 0x2ff]);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let mut set = BitSet::new(16);
        assert_eq!(
            set.insert(16),
            Err(OutOfRange {
                index: 16,
                capacity: 16
            })
        );
        assert!(set.is_empty());
        assert!(!set.contains(16));
        assert!(!set.contains(usize::MAX));
    }

    #[test]
    fn test_word_boundaries() {
        let mut set = BitSet::new(130);
        for i in [0, 63, 64, 127, 128, 129] {
            set.insert(i).unwrap();
        }
        assert_eq!(set.as_words().len(), 3);
        assert_eq!(set.len(), 6);
        set.remove(64).unwrap();
        assert!(!set.contains(64));
        assert!(set.contains(63));
    }

    #[test]
    fn test_toggle_and_clear() {
        let mut set = BitSet::new(8);
        assert_eq!(set.toggle(3), Ok(true));
        assert_eq!(set.toggle(3), Ok(false));
        assert!(set.toggle(8).is_err());

        set.set(5, true).unwrap();
        set.clear();
        assert!(set.is_empty());
    }
}
