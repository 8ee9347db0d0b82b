//! Low-level storage primitives shared by the genome tables.

pub mod arena;

pub use arena::{RecyclingBin, gamete_queue, mutation_queue, recycle};
