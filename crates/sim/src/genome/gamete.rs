use crate::genome::Mutation;
use serde::{Deserialize, Serialize};

/// A haplotype: the set of mutations carried by one genome copy.
///
/// Mutation keys are split into neutral and selected lists so that fitness
/// evaluation only has to walk the selected ones. Both lists are kept sorted
/// by mutation position. `n` is the number of diploid slots in the current
/// generation that point at this gamete; a gamete with `n == 0` is free for
/// recycling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gamete {
    /// Reference count.
    pub n: u32,
    /// Keys of neutral mutations.
    pub mutations: Vec<usize>,
    /// Keys of selected mutations.
    pub smutations: Vec<usize>,
}

impl Gamete {
    /// A mutation-free gamete with reference count `n`.
    pub fn new(n: u32) -> Self {
        Self {
            n,
            mutations: Vec::new(),
            smutations: Vec::new(),
        }
    }

    /// A gamete carrying the given neutral and selected keys.
    pub fn with_mutations(n: u32, mutations: Vec<usize>, smutations: Vec<usize>) -> Self {
        Self {
            n,
            mutations,
            smutations,
        }
    }

    /// Total number of mutations carried.
    #[inline]
    pub fn len(&self) -> usize {
        self.mutations.len() + self.smutations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty() && self.smutations.is_empty()
    }

    /// Iterate over all mutation keys, neutral first.
    pub fn keys(&self) -> impl Iterator<Item = usize> + '_ {
        self.mutations.iter().chain(self.smutations.iter()).copied()
    }

    /// Whether the gamete carries mutation `key`.
    pub fn carries(&self, key: usize) -> bool {
        self.mutations.contains(&key) || self.smutations.contains(&key)
    }

    /// File `key` into the neutral or selected list, keeping it sorted by position.
    pub fn insert(&mut self, key: usize, mutations: &[Mutation]) {
        let pos = mutations[key].pos;
        let list = if mutations[key].neutral {
            &mut self.mutations
        } else {
            &mut self.smutations
        };
        let at = list.partition_point(|&k| mutations[k].pos < pos);
        list.insert(at, key);
    }

    /// Keep only the keys for which `keep` returns true.
    pub fn retain_keys(&mut self, mut keep: impl FnMut(usize) -> bool) {
        self.mutations.retain(|&k| keep(k));
        self.smutations.retain(|&k| keep(k));
    }

    /// Forget all mutations. Used on dead gametes so no stale key survives.
    pub fn clear(&mut self) {
        self.mutations.clear();
        self.smutations.clear();
    }
}
