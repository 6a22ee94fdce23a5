//! [`Handle`] implementation for rusqlite connections and transactions.

use rusqlite::{params_from_iter, types::ValueRef, Connection, Row, Rows, Transaction};
use tracing::debug;

use crate::error::Result;
use crate::handle::{Cursor, Execution, Handle, RawField, RawRow};

struct SqliteCursor<'stmt> {
    columns: Vec<String>,
    rows: Rows<'stmt>,
}

impl Cursor for SqliteCursor<'_> {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<&dyn RawRow>> {
        Ok(self.rows.next()?.map(|row| row as &dyn RawRow))
    }
}

impl RawRow for Row<'_> {
    fn field(&self, index: usize) -> Result<RawField<'_>> {
        Ok(match self.get_ref(index)? {
            ValueRef::Null => RawField::Null,
            ValueRef::Integer(i) => RawField::Integer(i),
            ValueRef::Real(r) => RawField::Real(r),
            ValueRef::Text(t) => RawField::Bytes(t),
            ValueRef::Blob(b) => RawField::Bytes(b),
        })
    }
}

fn query_with(
    conn: &Connection,
    sql: &str,
    visit: &mut dyn FnMut(&mut dyn Cursor) -> Result<()>,
) -> Result<()> {
    let mut stmt = conn.prepare(sql)?;
    let columns = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();
    let rows = stmt.query([])?;
    let mut cursor = SqliteCursor { columns, rows };
    visit(&mut cursor)
}

fn execute(conn: &Connection, sql: &str, values: &[String]) -> Result<Execution> {
    let mut stmt = conn.prepare(sql)?;
    let affected = stmt.execute(params_from_iter(values.iter()))?;
    let execution = Execution {
        last_insert_id: conn.last_insert_rowid(),
        rows_affected: u64::try_from(affected).unwrap_or_default(),
    };
    debug!(
        sql,
        params = values.len(),
        rows_affected = execution.rows_affected,
        last_insert_id = execution.last_insert_id,
        "executed statement"
    );
    Ok(execution)
}

impl Handle for Connection {
    fn query_with(
        &self,
        sql: &str,
        visit: &mut dyn FnMut(&mut dyn Cursor) -> Result<()>,
    ) -> Result<()> {
        query_with(self, sql, visit)
    }

    fn execute(&self, sql: &str, values: &[String]) -> Result<Execution> {
        execute(self, sql, values)
    }
}

impl Handle for Transaction<'_> {
    fn query_with(
        &self,
        sql: &str,
        visit: &mut dyn FnMut(&mut dyn Cursor) -> Result<()>,
    ) -> Result<()> {
        query_with(self, sql, visit)
    }

    fn execute(&self, sql: &str, values: &[String]) -> Result<Execution> {
        execute(self, sql, values)
    }
}
