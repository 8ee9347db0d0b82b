//! # Simulation Crate
//!
//! The `sim` crate provides forward-time simulation of a single deme of
//! diploids under clonal Wright-Fisher reproduction. It includes modules for
//! genome tables, mutation and selection policies, the reproduction step, the
//! generation driver, and per-generation recording.

pub mod base;
pub mod errors;
pub mod evolution;
pub mod genome;
pub mod prelude;
pub mod simulation;
pub mod storage;
