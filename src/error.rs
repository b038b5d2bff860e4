//! Construction-time errors
//!
//! Everything here is fail-fast: bad table data must be fixed at the source
//! before the table is loaded again. Numerical safeguards during simulation
//! never surface as errors.

use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Non-fixed actors need a positive mass for force integration
    NonPositiveMass { mass: f64 },
    FrictionOutOfRange { friction: f64 },
    NegativeRestitution { restitution: f64 },
    /// A radius, width or height that must be positive
    InvalidDimension { what: &'static str, value: f64 },
    DampingOutOfRange { damping: f64 },
    ZeroTickLength,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveMass { mass } => {
                write!(f, "mass must be positive for a movable actor, got {mass}")
            }
            Self::FrictionOutOfRange { friction } => {
                write!(f, "friction must be within [0, 1], got {friction}")
            }
            Self::NegativeRestitution { restitution } => {
                write!(f, "restitution must not be negative, got {restitution}")
            }
            Self::InvalidDimension { what, value } => {
                write!(f, "{what} must be positive, got {value}")
            }
            Self::DampingOutOfRange { damping } => {
                write!(f, "damping must be within [0, 1], got {damping}")
            }
            Self::ZeroTickLength => write!(f, "tick length must be at least 1 ms"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failure to turn a table description into a playable table
#[derive(Debug)]
pub enum TableError {
    Parse(serde_json::Error),
    /// An entry in one of the table's lists failed validation
    Entry {
        list: &'static str,
        index: usize,
        source: ConfigError,
    },
    Physics(ConfigError),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "failed to parse table: {err}"),
            Self::Entry {
                list,
                index,
                source,
            } => write!(f, "invalid {list}[{index}]: {source}"),
            Self::Physics(err) => write!(f, "invalid physics config: {err}"),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Entry { source, .. } => Some(source),
            Self::Physics(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

impl From<ConfigError> for TableError {
    fn from(err: ConfigError) -> Self {
        Self::Physics(err)
    }
}
