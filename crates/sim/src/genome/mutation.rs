use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::collections::hash_map::{Entry, HashMap};

/// A single mutation under the infinite-sites model.
///
/// Mutations are stored once, in the population's mutation table, and gametes
/// refer to them by index. The population-wide count of a mutation is kept in
/// a parallel `mcounts` vector rather than on the record itself, so a
/// `Mutation` is plain immutable data that can be copied into the fixation
/// record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    /// Position of the mutation. Unique among active mutations.
    pub pos: f64,
    /// Effect size. Zero for neutral mutations.
    pub s: f64,
    /// Dominance of the effect in heterozygotes.
    pub h: f64,
    /// Generation in which the mutation arose.
    pub g: u32,
    /// Whether the mutation is neutral (filed in `Gamete::mutations`) or
    /// selected (filed in `Gamete::smutations`).
    pub neutral: bool,
}

impl Mutation {
    /// A neutral mutation at `pos`, born in generation `g`.
    pub fn neutral(pos: f64, g: u32) -> Self {
        Self {
            pos,
            s: 0.0,
            h: 1.0,
            g,
            neutral: true,
        }
    }

    /// A selected mutation with effect `s` and dominance `h`.
    pub fn selected(pos: f64, s: f64, h: f64, g: u32) -> Self {
        Self {
            pos,
            s,
            h,
            g,
            neutral: false,
        }
    }
}

/// Positions currently occupied by active mutations.
///
/// New mutations are rejected at occupied positions so that every site
/// segregates at most one derived allele. Each position remembers the key of
/// the mutation holding it, so a stale record at a reused position cannot
/// release a newer mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationLookup {
    #[serde(serialize_with = "sorted_positions")]
    positions: HashMap<u64, usize>,
}

/// Write the lookup in position order so saved populations are byte-stable.
fn sorted_positions<S: Serializer>(
    positions: &HashMap<u64, usize>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    positions
        .iter()
        .collect::<BTreeMap<_, _>>()
        .serialize(serializer)
}

impl MutationLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the lookup from every mutation whose count is non-zero.
    pub fn from_table(mutations: &[Mutation], mcounts: &[u32]) -> Self {
        let positions = mutations
            .iter()
            .zip(mcounts)
            .enumerate()
            .filter(|&(_, (_, &c))| c > 0)
            .map(|(key, (m, _))| (m.pos.to_bits(), key))
            .collect();
        Self { positions }
    }

    #[inline]
    pub fn contains(&self, pos: f64) -> bool {
        self.positions.contains_key(&pos.to_bits())
    }

    /// Key of the mutation occupying `pos`, if any.
    #[inline]
    pub fn get(&self, pos: f64) -> Option<usize> {
        self.positions.get(&pos.to_bits()).copied()
    }

    /// Mark `pos` as occupied by mutation `key`. Returns `false` if it already was.
    #[inline]
    pub fn insert(&mut self, pos: f64, key: usize) -> bool {
        match self.positions.entry(pos.to_bits()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(e) => {
                e.insert(key);
                true
            }
        }
    }

    /// Release `pos` if it is held by `key`. Returns `true` if it was.
    #[inline]
    pub fn remove(&mut self, pos: f64, key: usize) -> bool {
        let bits = pos.to_bits();
        if self.positions.get(&bits) == Some(&key) {
            self.positions.remove(&bits);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
