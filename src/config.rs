//! Library configuration.
//!
//! Hosts usually build a [`Config`] once (or deserialize it from their own
//! settings file) and pass it to the orchestration entry points.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// SQL dialect used for schema introspection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `SHOW COLUMNS FROM ...`
    #[default]
    MySql,
    /// `PRAGMA table_info(...)`
    #[serde(rename = "sqlite3", alias = "sqlite")]
    Sqlite,
}

impl Dialect {
    /// Parses the form-level `dbtype` tag. An empty tag selects the default dialect.
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "" | "mysql" => Ok(Self::MySql),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            _ => Err(Error::UnknownDialect(tag.to_string())),
        }
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_tag(s)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MySql => f.write_str("mysql"),
            Self::Sqlite => f.write_str("sqlite3"),
        }
    }
}

/// What to do when a single result row cannot be decoded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowErrorPolicy {
    /// Return the decode error to the caller.
    #[default]
    Strict,
    /// Log the failure and keep what was read so far. Silently drops data.
    Lenient,
}

impl RowErrorPolicy {
    pub fn is_lenient(self) -> bool {
        matches!(self, Self::Lenient)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dialect used when the form carries no `dbtype` tag.
    pub dialect: Dialect,
    pub row_errors: RowErrorPolicy,
}

impl Config {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    pub fn with_row_errors(mut self, policy: RowErrorPolicy) -> Self {
        self.row_errors = policy;
        self
    }
}
