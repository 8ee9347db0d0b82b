//! Population size schedules.
//!
//! A [`Demography`] expands into one target size per generation. Linear and
//! exponential schedules interpolate between two sizes inclusively at both
//! ends and truncate each value toward zero, like an unsigned integer cast.
//! An exponential endpoint such as `exp(ln 4000)` lands a hair below the whole
//! number and truncates to one less.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// A schedule of population sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Demography {
    /// `size` for `generations` generations.
    Constant { size: u32, generations: usize },
    /// Evenly spaced sizes from `from` to `to`.
    Linear {
        from: u32,
        to: u32,
        generations: usize,
    },
    /// Sizes evenly spaced on a log scale from `from` to `to`.
    Exponential {
        from: u32,
        to: u32,
        generations: usize,
    },
    /// Sizes given one per generation.
    Explicit { sizes: Vec<u32> },
    /// Several schedules run back to back.
    Sequence { phases: Vec<Demography> },
}

impl Default for Demography {
    fn default() -> Self {
        Self::Constant {
            size: 1000,
            generations: 1000,
        }
    }
}

/// `n` evenly spaced values from `a` to `b` inclusive.
fn linspace(a: f64, b: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 { (b - a) / (n - 1) as f64 } else { 0.0 };
    (0..n).map(move |i| if i + 1 == n && n > 1 { b } else { a + step * i as f64 })
}

/// Truncate toward zero. Negative values saturate at zero.
fn truncate(x: f64) -> u32 {
    x as u32
}

impl Demography {
    pub fn constant(size: u32, generations: usize) -> Self {
        Self::Constant { size, generations }
    }

    /// Check that the schedule can be expanded.
    ///
    /// # Errors
    /// Returns an error if an exponential phase starts or ends at zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Exponential { from, to, .. } if *from == 0 || *to == 0 => {
                Err(ConfigError::InvalidParameter(
                    "exponential demography requires positive sizes".into(),
                ))
            }
            Self::Sequence { phases } => phases.iter().try_for_each(Self::validate),
            _ => Ok(()),
        }
    }

    /// Number of generations in the schedule.
    pub fn generations(&self) -> usize {
        match self {
            Self::Constant { generations, .. }
            | Self::Linear { generations, .. }
            | Self::Exponential { generations, .. } => *generations,
            Self::Explicit { sizes } => sizes.len(),
            Self::Sequence { phases } => phases.iter().map(Self::generations).sum(),
        }
    }

    /// Expand the schedule to one size per generation.
    ///
    /// # Errors
    /// See [`validate`](Self::validate).
    pub fn sizes(&self) -> Result<Vec<u32>, ConfigError> {
        self.validate()?;
        let mut out = Vec::with_capacity(self.generations());
        self.extend_into(&mut out);
        Ok(out)
    }

    fn extend_into(&self, out: &mut Vec<u32>) {
        match self {
            Self::Constant { size, generations } => {
                out.extend(std::iter::repeat_n(*size, *generations));
            }
            Self::Linear {
                from,
                to,
                generations,
            } => out.extend(
                linspace(f64::from(*from), f64::from(*to), *generations).map(truncate),
            ),
            Self::Exponential {
                from,
                to,
                generations,
            } => out.extend(
                linspace(f64::from(*from).ln(), f64::from(*to).ln(), *generations)
                    .map(|x| truncate(x.exp())),
            ),
            Self::Explicit { sizes } => out.extend_from_slice(sizes),
            Self::Sequence { phases } => {
                for phase in phases {
                    phase.extend_into(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant() {
        assert_eq!(Demography::constant(5, 3).sizes().unwrap(), vec![5, 5, 5]);
        assert!(Demography::constant(5, 0).sizes().unwrap().is_empty());
    }

    #[test]
    fn test_linear_includes_both_ends_and_truncates() {
        let d = Demography::Linear {
            from: 10,
            to: 0,
            generations: 4,
        };
        // 10, 6.67, 3.33, 0
        assert_eq!(d.sizes().unwrap(), vec![10, 6, 3, 0]);

        let single = Demography::Linear {
            from: 7,
            to: 100,
            generations: 1,
        };
        assert_eq!(single.sizes().unwrap(), vec![7]);
    }

    #[test]
    fn test_exponential_decline() {
        let d = Demography::Exponential {
            from: 4000,
            to: 200,
            generations: 100,
        };
        let sizes = d.sizes().unwrap();
        assert_eq!(sizes.len(), 100);
        assert_eq!(sizes[0], 4000f64.ln().exp() as u32);
        assert_eq!(*sizes.last().unwrap(), 200f64.ln().exp() as u32);
        assert!((3999..=4000).contains(&sizes[0]));
        assert!((199..=200).contains(sizes.last().unwrap()));
        assert!(sizes.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_truncation_has_no_tolerance() {
        assert_eq!(truncate(199.999_999_999_999_9), 199);
        assert_eq!(truncate(6.999_999_999_9), 6);
        assert_eq!(truncate(10.000_000_000_000_002), 10);
        assert_eq!(truncate(0.0), 0);
        assert_eq!(truncate(-1e-12), 0);
    }

    #[test]
    fn test_exponential_rejects_zero() {
        let d = Demography::Exponential {
            from: 0,
            to: 10,
            generations: 3,
        };
        assert!(d.sizes().is_err());
        let nested = Demography::Sequence { phases: vec![d] };
        assert!(nested.validate().is_err());
    }

    #[test]
    fn test_sequence_concatenates() {
        let d = Demography::Sequence {
            phases: vec![
                Demography::constant(100, 2),
                Demography::Explicit {
                    sizes: vec![50, 25],
                },
                Demography::constant(10, 1),
            ],
        };
        assert_eq!(d.generations(), 5);
        assert_eq!(d.sizes().unwrap(), vec![100, 100, 50, 25, 10]);
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{"type": "linear", "from": 100, "to": 50, "generations": 2}"#;
        let d: Demography = serde_json::from_str(json).unwrap();
        assert_eq!(d.sizes().unwrap(), vec![100, 50]);
    }
}
