//! Configuration failures
//!
//! Raised when the enemy table or settings cannot produce what the simulation asks for.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Requested enemy type has no row in the table (or no such type exists)
    UnknownEnemyType(String),
    /// The row exists but lacks a column the type's behavior needs
    MissingField { enemy: String, field: &'static str },
    /// Config file could not be read
    Io { path: String, message: String },
    /// Config document could not be decoded
    Parse { path: String, message: String },
    /// No usable rows in the enemy table
    EmptyTable,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEnemyType(name) => write!(f, "enemy type \"{name}\" not found in enemy table"),
            Self::MissingField { enemy, field } => {
                write!(f, "enemy type \"{enemy}\" is missing required column \"{field}\"")
            }
            Self::Io { path, message } => write!(f, "failed reading {path}: {message}"),
            Self::Parse { path, message } => write!(f, "failed parsing {path}: {message}"),
            Self::EmptyTable => write!(f, "enemy table has no usable rows"),
        }
    }
}

impl std::error::Error for ConfigError {}
