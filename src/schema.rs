//! Table column introspection.

use tracing::warn;

use crate::builder::quote_identifier;
use crate::config::{Dialect, RowErrorPolicy};
use crate::error::Result;
use crate::handle::{Cursor, Handle};
use crate::scan::decode_into;

/// Lists the columns of a table, in declaration order.
pub trait ColumnLister {
    fn list_columns(
        &self,
        handle: &dyn Handle,
        table: &str,
        policy: RowErrorPolicy,
    ) -> Result<Vec<String>>;
}

/// `SHOW COLUMNS FROM` -> `(Field, Type, Null, Key, Default, Extra)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlColumns;

/// `PRAGMA table_info` -> `(cid, name, type, notnull, dflt_value, pk)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteColumns;

impl ColumnLister for MySqlColumns {
    fn list_columns(
        &self,
        handle: &dyn Handle,
        table: &str,
        policy: RowErrorPolicy,
    ) -> Result<Vec<String>> {
        let sql = format!("SHOW COLUMNS FROM {}", quote_identifier(table)?);
        collect_names(handle, &sql, 0, policy)
    }
}

impl ColumnLister for SqliteColumns {
    fn list_columns(
        &self,
        handle: &dyn Handle,
        table: &str,
        policy: RowErrorPolicy,
    ) -> Result<Vec<String>> {
        let sql = format!("PRAGMA table_info({})", quote_identifier(table)?);
        collect_names(handle, &sql, 1, policy)
    }
}

impl Dialect {
    pub fn column_lister(self) -> &'static dyn ColumnLister {
        match self {
            Self::MySql => &MySqlColumns,
            Self::Sqlite => &SqliteColumns,
        }
    }
}

/// Column names of `table` using the introspection query for `dialect`.
pub fn list_columns(
    handle: &dyn Handle,
    dialect: Dialect,
    table: &str,
    policy: RowErrorPolicy,
) -> Result<Vec<String>> {
    dialect.column_lister().list_columns(handle, table, policy)
}

fn collect_names(
    handle: &dyn Handle,
    sql: &str,
    name_index: usize,
    policy: RowErrorPolicy,
) -> Result<Vec<String>> {
    let mut names = Vec::new();
    handle.query_with(sql, &mut |cursor: &mut dyn Cursor| -> Result<()> {
        let column = cursor
            .columns()
            .get(name_index)
            .cloned()
            .unwrap_or_default();
        while let Some(row) = cursor.next_row()? {
            let mut name = String::new();
            match decode_into(&mut name, row, name_index, &column) {
                Ok(()) => names.push(name),
                Err(err) if policy.is_lenient() => {
                    warn!(sql, error = %err, "skipping unreadable column row");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    })?;
    Ok(names)
}
