use std::error;
use std::fmt;

/// Errors raised while validating run parameters or model configuration.
///
/// These are always detected before any population state is touched.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The schedule of population sizes has no entries.
    EmptyDemography,
    /// A rate parameter was negative or not finite.
    NegativeRate { name: &'static str, value: f64 },
    /// A mutation or recombination region is malformed.
    InvalidRegion(String),
    /// Any other out-of-range parameter.
    InvalidParameter(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDemography => write!(f, "empty list of population sizes"),
            Self::NegativeRate { name, value } => {
                write!(f, "negative {name} rate: {value}")
            }
            Self::InvalidRegion(msg) => write!(f, "Invalid region: {msg}"),
            Self::InvalidParameter(msg) => write!(f, "Invalid parameter: {msg}"),
        }
    }
}

impl error::Error for ConfigError {}

/// Errors reported by a selection policy when it cannot build a sampling
/// distribution over the current parents.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionError {
    /// Offspring were requested from a population with no individuals.
    EmptyPopulation,
    /// Fitness values cannot be used as sampling weights (all zero, negative or NaN).
    InvalidWeights(String),
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPopulation => {
                write!(f, "cannot sample parents from an empty population")
            }
            Self::InvalidWeights(msg) => write!(f, "Invalid fitness weights: {msg}"),
        }
    }
}

impl error::Error for SelectionError {}

/// Broken bookkeeping detected after a reproduction step.
///
/// These indicate a programming defect, never bad user input. The driver
/// aborts the run as soon as one is observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Gamete reference counts do not sum to twice the population size.
    GameteCountSum { expected: u64, found: u64 },
    /// A mutation's recorded count differs from the gamete-weighted sum.
    MutationCount { key: usize, expected: u32, found: u32 },
    /// A diploid refers to a gamete slot outside the table or with `n == 0`.
    DanglingGamete { diploid: usize, key: usize },
    /// A gamete refers to a mutation slot outside the table.
    DanglingMutation { gamete: usize, key: usize },
    /// The recorded population size disagrees with the number of diploids.
    SizeMismatch { recorded: u32, diploids: usize },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GameteCountSum { expected, found } => write!(
                f,
                "gamete counts sum to {found}, expected {expected}"
            ),
            Self::MutationCount {
                key,
                expected,
                found,
            } => write!(
                f,
                "mutation {key} has count {found}, gametes carry it {expected} times"
            ),
            Self::DanglingGamete { diploid, key } => {
                write!(f, "diploid {diploid} refers to dead or missing gamete {key}")
            }
            Self::DanglingMutation { gamete, key } => {
                write!(f, "gamete {gamete} refers to missing mutation {key}")
            }
            Self::SizeMismatch { recorded, diploids } => write!(
                f,
                "population size is {recorded} but there are {diploids} diploids"
            ),
        }
    }
}

impl error::Error for InvariantViolation {}

/// Errors that can occur when assembling a population from explicit parts.
#[derive(Debug, Clone, PartialEq)]
pub enum PopulationError {
    /// A diploid refers to a gamete that does not exist.
    UnknownGamete { diploid: usize, key: usize },
    /// A gamete refers to a mutation that does not exist.
    UnknownMutation { gamete: usize, key: usize },
    /// A mutation is filed in the wrong list (neutral vs selected).
    MisfiledMutation { gamete: usize, key: usize },
    /// Two mutations share a position.
    DuplicatePosition(f64),
    /// The population is too large to count gametes in `u32`.
    TooLarge(usize),
}

impl fmt::Display for PopulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownGamete { diploid, key } => {
                write!(f, "diploid {diploid} refers to unknown gamete {key}")
            }
            Self::UnknownMutation { gamete, key } => {
                write!(f, "gamete {gamete} refers to unknown mutation {key}")
            }
            Self::MisfiledMutation { gamete, key } => write!(
                f,
                "gamete {gamete} files mutation {key} under the wrong effect class"
            ),
            Self::DuplicatePosition(pos) => {
                write!(f, "more than one mutation at position {pos}")
            }
            Self::TooLarge(n) => write!(f, "population of {n} diploids is too large"),
        }
    }
}

impl error::Error for PopulationError {}

/// Top-level error for reproduction steps and whole runs.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    Config(ConfigError),
    Selection(SelectionError),
    Invariant(InvariantViolation),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Selection(e) => write!(f, "Selection error: {e}"),
            Self::Invariant(e) => write!(f, "Internal consistency violation: {e}"),
        }
    }
}

impl error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Selection(e) => Some(e),
            Self::Invariant(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<SelectionError> for SimulationError {
    fn from(e: SelectionError) -> Self {
        Self::Selection(e)
    }
}

impl From<InvariantViolation> for SimulationError {
    fn from(e: InvariantViolation) -> Self {
        Self::Invariant(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        let e = ConfigError::NegativeRate {
            name: "neutral mutation",
            value: -0.5,
        };
        assert_eq!(e.to_string(), "negative neutral mutation rate: -0.5");
        assert_eq!(
            ConfigError::EmptyDemography.to_string(),
            "empty list of population sizes"
        );
    }

    #[test]
    fn test_simulation_error_wraps_source() {
        let e: SimulationError = InvariantViolation::GameteCountSum {
            expected: 20,
            found: 18,
        }
        .into();
        assert!(e.to_string().contains("expected 20"));
        assert!(error::Error::source(&e).is_some());
    }
}
