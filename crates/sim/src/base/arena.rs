//! Index pools for retired table slots.
//!
//! Gametes and mutations live in dense tables and are referred to by index.
//! Slots whose reference count has dropped to zero are collected into a
//! [`RecyclingBin`] at the start of every generation and handed out again,
//! lowest index first, before the table is allowed to grow. This bounds memory
//! over long runs without any per-object heap allocation.

use std::collections::VecDeque;

use crate::genome::Gamete;

/// FIFO queue of free slot indices, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecyclingBin {
    free: VecDeque<usize>,
}

impl RecyclingBin {
    /// An empty bin. Every allocation will append.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every index for which `is_free` holds, in ascending order.
    pub fn from_predicate<I, T>(items: I, mut is_free: impl FnMut(&T) -> bool) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let free = items
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| is_free(&item).then_some(i))
            .collect();
        Self { free }
    }

    /// Take the lowest free index, if any.
    #[inline]
    pub fn pop(&mut self) -> Option<usize> {
        self.free.pop_front()
    }

    /// Number of free slots still available.
    #[inline]
    pub fn len(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }
}

/// Free gamete slots: every gamete with `n == 0`.
pub fn gamete_queue(gametes: &[Gamete]) -> RecyclingBin {
    RecyclingBin::from_predicate(gametes, |g| g.n == 0)
}

/// Free mutation slots: every mutation whose population count is zero.
pub fn mutation_queue(mcounts: &[u32]) -> RecyclingBin {
    RecyclingBin::from_predicate(mcounts, |&&c| c == 0)
}

/// Store `value` in the lowest free slot of `table`, or append it.
///
/// Returns the index the value now occupies.
pub fn recycle<T>(bin: &mut RecyclingBin, table: &mut Vec<T>, value: T) -> usize {
    match bin.pop() {
        Some(idx) => {
            debug_assert!(idx < table.len());
            table[idx] = value;
            idx
        }
        None => {
            table.push(value);
            table.len() - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gamete_with_count(n: u32) -> Gamete {
        Gamete {
            n,
            ..Gamete::default()
        }
    }

    #[test]
    fn test_gamete_queue_collects_zero_counts_in_order() {
        let gametes = vec![
            gamete_with_count(3),
            gamete_with_count(0),
            gamete_with_count(1),
            gamete_with_count(0),
        ];
        let mut bin = gamete_queue(&gametes);
        assert_eq!(bin.len(), 2);
        assert_eq!(bin.pop(), Some(1));
        assert_eq!(bin.pop(), Some(3));
        assert_eq!(bin.pop(), None);
    }

    #[test]
    fn test_mutation_queue() {
        let bin = mutation_queue(&[0, 4, 0, 0, 7]);
        assert_eq!(bin.free.iter().copied().collect::<Vec<_>>(), vec![0, 2, 3]);
    }

    #[test]
    fn test_recycle_reuses_lowest_slot_first() {
        let mut table = vec![10, 0, 30, 0];
        let mut bin = RecyclingBin::from_predicate(&table, |&&v| v == 0);

        assert_eq!(recycle(&mut bin, &mut table, 20), 1);
        assert_eq!(recycle(&mut bin, &mut table, 40), 3);
        assert_eq!(table, vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_recycle_appends_when_empty() {
        let mut table = vec![1, 2];
        let mut bin = RecyclingBin::new();
        assert!(bin.is_empty());

        assert_eq!(recycle(&mut bin, &mut table, 3), 2);
        assert_eq!(table, vec![1, 2, 3]);
    }
}
