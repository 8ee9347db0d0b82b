//! Population state.
//!
//! A [`Population`] owns every table the reproduction step touches: diploids,
//! gametes, mutations and their counts, the occupied-position lookup and the
//! record of fixations. Tables are indexed by plain `usize` keys and slots are
//! recycled, so a key stays valid only while the entry it names is alive.

use crate::errors::{InvariantViolation, PopulationError};
use crate::genome::{Diploid, Gamete, Mutation, MutationLookup};
use crate::simulation::reproduction::process_gametes;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A mutation that reached frequency one and was removed from the population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fixation {
    /// Copy of the mutation record at the time of fixation.
    pub mutation: Mutation,
    /// Generation in which fixation was detected.
    pub generation: u32,
}

/// A single deme of diploids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    pub(crate) generation: u32,
    pub(crate) n: u32,
    pub(crate) diploids: Vec<Diploid>,
    pub(crate) gametes: Vec<Gamete>,
    pub(crate) mutations: Vec<Mutation>,
    pub(crate) mcounts: Vec<u32>,
    pub(crate) mut_lookup: MutationLookup,
    pub(crate) fixations: Vec<Fixation>,
}

/// Largest population whose gamete counts fit in `u32`.
pub const MAX_POPULATION_SIZE: u32 = u32::MAX / 2;

impl Population {
    /// A monomorphic population of `n` diploids sharing one mutation-free gamete.
    ///
    /// # Errors
    /// Returns an error if `2 * n` does not fit in `u32`.
    pub fn new(n: u32) -> Result<Self, PopulationError> {
        if n > MAX_POPULATION_SIZE {
            return Err(PopulationError::TooLarge(n as usize));
        }
        Ok(Self {
            generation: 0,
            n,
            diploids: vec![Diploid::new(0, 0); n as usize],
            gametes: vec![Gamete::new(2 * n)],
            mutations: Vec::new(),
            mcounts: Vec::new(),
            mut_lookup: MutationLookup::new(),
            fixations: Vec::new(),
        })
    }

    /// Assemble a population from explicit tables.
    ///
    /// Gamete reference counts and mutation counts are recomputed from the
    /// diploids, key lists are sorted by position, and dead gametes are
    /// emptied. Every mutation carried by a live gamete becomes active.
    ///
    /// # Errors
    /// Returns an error if a key is out of range, a mutation is filed in the
    /// wrong list, two active mutations share a position, or the population is
    /// too large.
    pub fn from_parts(
        diploids: Vec<Diploid>,
        mut gametes: Vec<Gamete>,
        mutations: Vec<Mutation>,
    ) -> Result<Self, PopulationError> {
        if diploids.len() > MAX_POPULATION_SIZE as usize {
            return Err(PopulationError::TooLarge(diploids.len()));
        }

        for g in &mut gametes {
            g.n = 0;
        }
        for (i, d) in diploids.iter().enumerate() {
            for key in [d.first, d.second] {
                let g = gametes
                    .get_mut(key)
                    .ok_or(PopulationError::UnknownGamete { diploid: i, key })?;
                g.n += 1;
            }
        }

        for (i, g) in gametes.iter_mut().enumerate() {
            if g.n == 0 {
                g.clear();
                continue;
            }
            for (list, neutral) in [(&mut g.mutations, true), (&mut g.smutations, false)] {
                for &key in list.iter() {
                    let m = mutations
                        .get(key)
                        .ok_or(PopulationError::UnknownMutation { gamete: i, key })?;
                    if m.neutral != neutral {
                        return Err(PopulationError::MisfiledMutation { gamete: i, key });
                    }
                }
                list.sort_by(|&a, &b| mutations[a].pos.total_cmp(&mutations[b].pos));
            }
        }

        let mut mcounts = Vec::new();
        process_gametes(&gametes, &mutations, &mut mcounts);

        let mut seen = HashSet::new();
        for (m, _) in mutations.iter().zip(&mcounts).filter(|&(_, &c)| c > 0) {
            if !seen.insert(m.pos.to_bits()) {
                return Err(PopulationError::DuplicatePosition(m.pos));
            }
        }
        let mut_lookup = MutationLookup::from_table(&mutations, &mcounts);

        Ok(Self {
            generation: 0,
            n: diploids.len() as u32,
            diploids,
            gametes,
            mutations,
            mcounts,
            mut_lookup,
            fixations: Vec::new(),
        })
    }

    /// Current generation.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Set the generation counter, e.g. when resuming a run.
    pub fn set_generation(&mut self, generation: u32) {
        self.generation = generation;
    }

    /// Number of diploids, N.
    pub fn size(&self) -> u32 {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn diploids(&self) -> &[Diploid] {
        &self.diploids
    }

    pub fn gametes(&self) -> &[Gamete] {
        &self.gametes
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Population-wide count of each mutation slot.
    pub fn mcounts(&self) -> &[u32] {
        &self.mcounts
    }

    pub fn lookup(&self) -> &MutationLookup {
        &self.mut_lookup
    }

    pub fn fixations(&self) -> &[Fixation] {
        &self.fixations
    }

    /// Gametes carried by diploid `i`.
    pub fn genotype(&self, i: usize) -> Option<(&Gamete, &Gamete)> {
        let d = self.diploids.get(i)?;
        Some((&self.gametes[d.first], &self.gametes[d.second]))
    }

    /// Frequency of mutation `key` among the 2N gametes.
    pub fn frequency(&self, key: usize) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        let c = self.mcounts.get(key).copied().unwrap_or(0);
        f64::from(c) / (2.0 * f64::from(self.n))
    }

    /// Keys of mutations with `0 < count < 2N`.
    pub fn segregating(&self) -> impl Iterator<Item = usize> + '_ {
        let two_n = 2 * self.n;
        self.mcounts
            .iter()
            .enumerate()
            .filter(move |&(_, &c)| c > 0 && c < two_n)
            .map(|(k, _)| k)
    }

    /// Keys of mutations with count `2N` still present in gametes.
    pub fn fixed_active(&self) -> impl Iterator<Item = usize> + '_ {
        let two_n = 2 * self.n;
        self.mcounts
            .iter()
            .enumerate()
            .filter(move |&(_, &c)| two_n > 0 && c == two_n)
            .map(|(k, _)| k)
    }

    /// Reserve room for `additional` more mutation slots.
    pub fn reserve_mutations(&mut self, additional: usize) {
        self.mutations.reserve(additional);
        self.mcounts.reserve(additional);
    }

    /// The recorded size must equal the number of diploids.
    pub fn check_size(&self) -> Result<(), InvariantViolation> {
        if self.n as usize == self.diploids.len() {
            Ok(())
        } else {
            Err(InvariantViolation::SizeMismatch {
                recorded: self.n,
                diploids: self.diploids.len(),
            })
        }
    }

    /// Gamete reference counts must sum to twice the number of diploids.
    pub fn check_gamete_sum(&self) -> Result<(), InvariantViolation> {
        let expected = 2 * self.diploids.len() as u64;
        let found: u64 = self.gametes.iter().map(|g| u64::from(g.n)).sum();
        if expected == found {
            Ok(())
        } else {
            Err(InvariantViolation::GameteCountSum { expected, found })
        }
    }

    /// Every mutation count must equal the number of live gametes carrying it.
    pub fn check_mutation_counts(&self) -> Result<(), InvariantViolation> {
        let mut expected = vec![0u32; self.mutations.len()];
        for (i, g) in self.gametes.iter().enumerate().filter(|(_, g)| g.n > 0) {
            for key in g.keys() {
                let slot = expected
                    .get_mut(key)
                    .ok_or(InvariantViolation::DanglingMutation { gamete: i, key })?;
                *slot += g.n;
            }
        }
        for (key, &e) in expected.iter().enumerate() {
            let found = self.mcounts.get(key).copied().unwrap_or(0);
            if e != found {
                return Err(InvariantViolation::MutationCount {
                    key,
                    expected: e,
                    found,
                });
            }
        }
        Ok(())
    }

    /// Diploids must refer to live gametes, and live gametes to existing mutations.
    pub fn check_diploid_keys(&self) -> Result<(), InvariantViolation> {
        for (i, d) in self.diploids.iter().enumerate() {
            for key in [d.first, d.second] {
                if self.gametes.get(key).is_none_or(|g| g.n == 0) {
                    return Err(InvariantViolation::DanglingGamete { diploid: i, key });
                }
            }
        }
        for (i, g) in self.gametes.iter().enumerate().filter(|(_, g)| g.n > 0) {
            if let Some(key) = g.keys().find(|&k| k >= self.mutations.len()) {
                return Err(InvariantViolation::DanglingMutation { gamete: i, key });
            }
        }
        Ok(())
    }

    /// Run every consistency check.
    pub fn check_all(&self) -> Result<(), InvariantViolation> {
        self.check_size()?;
        self.check_gamete_sum()?;
        self.check_diploid_keys()?;
        self.check_mutation_counts()
    }
}
