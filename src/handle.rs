//! Database handle contract.
//!
//! Everything in this crate talks to the database through [`Handle`]. The
//! bundled implementation lives in [`crate::sqlite`]; hosts driving another
//! engine (MySQL, for example) implement these three traits over their own
//! driver.

use crate::error::Result;

/// A single field of the current row, borrowed from driver memory.
///
/// The borrow ends when the cursor advances, so callers must copy what they
/// need before fetching the next row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawField<'a> {
    Null,
    Integer(i64),
    Real(f64),
    Bytes(&'a [u8]),
}

/// The row a [`Cursor`] is currently positioned on.
pub trait RawRow {
    fn field(&self, index: usize) -> Result<RawField<'_>>;
}

/// Forward-only result cursor.
pub trait Cursor {
    /// Result column names, in select order.
    fn columns(&self) -> &[String];

    /// Advances to the next row. `Ok(None)` once the result set is exhausted.
    fn next_row(&mut self) -> Result<Option<&dyn RawRow>>;
}

/// Outcome of a write statement.
///
/// Both numbers are driver metadata and default to zero when the driver
/// cannot report them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Execution {
    pub last_insert_id: i64,
    pub rows_affected: u64,
}

/// A connection or transaction that can run statements.
///
/// Implementations must release the prepared statement before returning,
/// on success and on failure.
pub trait Handle {
    /// Prepares `sql`, opens a cursor over its result and hands it to `visit`.
    ///
    /// The cursor is only valid for the duration of the callback.
    fn query_with(
        &self,
        sql: &str,
        visit: &mut dyn FnMut(&mut dyn Cursor) -> Result<()>,
    ) -> Result<()>;

    /// Prepares `sql`, binds `values` to its placeholders in order and executes it.
    fn execute(&self, sql: &str, values: &[String]) -> Result<Execution>;
}
