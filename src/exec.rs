//! Prepared statement execution.

use crate::builder::placeholder_count;
use crate::error::{Error, Result};
use crate::handle::{Execution, Handle};

/// Statement text together with the values for its placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub values: Vec<String>,
}

impl Statement {
    /// Pairs `sql` with `values`, checking that every placeholder gets exactly one value.
    pub fn new(sql: impl Into<String>, values: Vec<String>) -> Result<Self> {
        let sql = sql.into();
        let expected = placeholder_count(&sql);
        if expected != values.len() {
            return Err(Error::PlaceholderMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { sql, values })
    }

    pub fn execute(&self, handle: &dyn Handle) -> Result<Execution> {
        handle.execute(&self.sql, &self.values)
    }
}

/// Runs an INSERT and returns the new row id together with the affected row count.
pub fn insert(handle: &dyn Handle, sql: &str, values: &[String]) -> Result<Execution> {
    handle.execute(sql, values)
}

/// Runs an UPDATE and returns the number of affected rows.
pub fn update_by_values(handle: &dyn Handle, sql: &str, values: &[String]) -> Result<u64> {
    Ok(handle.execute(sql, values)?.rows_affected)
}
