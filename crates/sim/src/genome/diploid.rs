use serde::{Deserialize, Serialize};

/// A diploid individual: two gamete keys and a cached fitness.
///
/// Under clonal reproduction both keys are copied from a single parent, but
/// the slots stay ordered so mutation draws are applied to `first` before
/// `second`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diploid {
    /// Key of the first gamete.
    pub first: usize,
    /// Key of the second gamete.
    pub second: usize,
    /// Fitness written by the selection policy when this individual was last
    /// considered as a parent.
    pub w: f64,
}

impl Diploid {
    pub fn new(first: usize, second: usize) -> Self {
        Self {
            first,
            second,
            w: 1.0,
        }
    }

    /// Whether both slots point at the same gamete.
    #[inline]
    pub fn is_homozygous(&self) -> bool {
        self.first == self.second
    }
}

impl Default for Diploid {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
