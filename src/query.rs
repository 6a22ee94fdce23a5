//! Ad-hoc read and write helpers over raw SQL.
//!
//! `where_clause` arguments are trusted SQL fragments and are emitted
//! verbatim; table and field names go through [`quote_identifier`].

use std::collections::HashMap;

use tracing::warn;

use crate::builder::quote_identifier;
use crate::config::RowErrorPolicy;
use crate::error::{Error, Result};
use crate::handle::{Cursor, Handle, RawField, RawRow};
use crate::scan::{decode_into, MapScanner, PairScanner};

/// Executes `sql` without parameters. `Ok(true)` when at least one row changed.
///
/// `sql` must not return rows: on the rusqlite handle a SELECT fails with
/// [`rusqlite::Error::ExecuteReturnedResults`] instead of yielding `Ok(false)`.
pub fn raw_sql(handle: &dyn Handle, sql: &str) -> Result<bool> {
    Ok(handle.execute(sql, &[])?.rows_affected > 0)
}

/// Value of `field` in the first row of `table` matching `where_clause`.
///
/// `field` is a column name and is quoted like any identifier, so
/// expressions such as `max(id)` are looked up as a column of that name and
/// fail. Aggregates go through [`check_count`] or [`get_all_rows`].
pub fn field_by_value(
    handle: &dyn Handle,
    table: &str,
    field: &str,
    where_clause: &str,
) -> Result<Option<String>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE {}",
        quote_identifier(field)?,
        quote_identifier(table)?,
        where_clause
    );
    first_row(handle, &sql, |row, column| {
        let mut value = String::new();
        decode_into(&mut value, row, 0, column)?;
        Ok(value)
    })
}

/// Number of rows in `table` matching `where_clause`.
pub fn check_count(handle: &dyn Handle, table: &str, where_clause: &str) -> Result<i64> {
    let sql = format!(
        "SELECT count(*) AS cnt FROM {} WHERE {}",
        quote_identifier(table)?,
        where_clause
    );
    let count = first_row(handle, &sql, |row, column| {
        let fault = || Error::Decode {
            index: 0,
            column: column.to_string(),
        };
        match row.field(0).map_err(|_| fault())? {
            RawField::Integer(n) => Ok(n),
            RawField::Bytes(bytes) => std::str::from_utf8(bytes)
                .ok()
                .and_then(|text| text.trim().parse().ok())
                .ok_or_else(fault),
            _ => Err(fault()),
        }
    })?;
    Ok(count.unwrap_or_default())
}

/// Runs `sql` and returns every row as a column name → text mapping.
///
/// With [`RowErrorPolicy::Lenient`] the first row that fails to decode ends
/// the scan and the rows read before it are returned without an error.
/// Cursor failures are always returned.
pub fn get_all_rows(
    handle: &dyn Handle,
    sql: &str,
    policy: RowErrorPolicy,
) -> Result<Vec<HashMap<String, String>>> {
    let mut rows = Vec::new();
    handle.query_with(sql, &mut |cursor: &mut dyn Cursor| -> Result<()> {
        let mut scanner = MapScanner::new(cursor.columns());
        loop {
            match scanner.next(cursor) {
                Ok(true) => rows.push(scanner.materialize()),
                Ok(false) => break,
                Err(err @ Error::Decode { .. }) if policy.is_lenient() => {
                    warn!(sql, error = %err, kept = rows.len(), "stopping at unreadable row");
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    })?;
    Ok(rows)
}

/// Like [`get_all_rows`], but each row is a flat `[name, value, ...]` vector.
pub fn get_all_row_pairs(
    handle: &dyn Handle,
    sql: &str,
    policy: RowErrorPolicy,
) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    handle.query_with(sql, &mut |cursor: &mut dyn Cursor| -> Result<()> {
        let mut scanner = PairScanner::new(cursor.columns());
        loop {
            match scanner.next(cursor) {
                Ok(true) => rows.push(scanner.materialize()),
                Ok(false) => break,
                Err(err @ Error::Decode { .. }) if policy.is_lenient() => {
                    warn!(sql, error = %err, kept = rows.len(), "stopping at unreadable row");
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    })?;
    Ok(rows)
}

fn first_row<T>(
    handle: &dyn Handle,
    sql: &str,
    read: impl Fn(&dyn RawRow, &str) -> Result<T>,
) -> Result<Option<T>> {
    let mut value = None;
    handle.query_with(sql, &mut |cursor: &mut dyn Cursor| -> Result<()> {
        let column = cursor.columns().first().cloned().unwrap_or_default();
        if let Some(row) = cursor.next_row()? {
            value = Some(read(row, &column)?);
        }
        Ok(())
    })?;
    Ok(value)
}
