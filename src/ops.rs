//! Form-driven insert and update entry points.
//!
//! These tie the pieces together: introspect the table, project the form
//! onto its columns, build the statement and execute it.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::builder::{insert_query, update_query, where_equals};
use crate::config::{Config, Dialect};
use crate::error::{Error, Result};
use crate::exec::Statement;
use crate::form::{project, Form};
use crate::handle::Handle;
use crate::schema::list_columns;

/// Form field naming the target table.
pub const TABLE_FIELD: &str = "table";
/// Form field carrying the dialect tag.
pub const DIALECT_FIELD: &str = "dbtype";
/// Form field selecting `insert` or `update`.
pub const ACTION_FIELD: &str = "todo";
/// Form field naming the primary key column for updates.
pub const PK_FIELD: &str = "pkfield";
/// Form field carrying the primary key value for updates.
pub const ID_FIELD: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Insert,
    Update,
}

impl Action {
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            "insert" => Ok(Self::Insert),
            "update" => Ok(Self::Update),
            other => Err(Error::UnknownAction(other.to_string())),
        }
    }
}

/// Result of [`insert_update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Outcome {
    Inserted { id: i64 },
    Updated { rows_affected: u64 },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OK")
    }
}

/// Inserts the form's values for the columns of `table`, returning the new row id.
pub fn insert_record(
    handle: &dyn Handle,
    dialect: Dialect,
    table: &str,
    form: &Form,
    config: &Config,
) -> Result<i64> {
    let columns = list_columns(handle, dialect, table, config.row_errors)?;
    let projection = project(form, &columns);
    let sql = insert_query(&projection.keys, table)?;
    let execution = Statement::new(sql, projection.values)?.execute(handle)?;
    debug!(table, id = execution.last_insert_id, "inserted row");
    Ok(execution.last_insert_id)
}

/// Updates the row of `table` whose `pk_field` equals `id` with the form's values.
///
/// The primary key column itself is never part of the SET list. `id` is
/// matched as a string literal escaped for `dialect`.
pub fn update_record(
    handle: &dyn Handle,
    dialect: Dialect,
    table: &str,
    pk_field: &str,
    id: &str,
    form: &Form,
    config: &Config,
) -> Result<u64> {
    let where_clause = where_equals(dialect, pk_field, id)?;
    let columns = list_columns(handle, dialect, table, config.row_errors)?;
    let columns: Vec<&str> = columns
        .iter()
        .map(String::as_str)
        .filter(|column| *column != pk_field)
        .collect();
    let projection = project(form, &columns);
    let sql = update_query(&projection.keys, table, &where_clause)?;
    let rows_affected = Statement::new(sql, projection.values)?
        .execute(handle)?
        .rows_affected;
    debug!(table, rows_affected, "updated rows");
    Ok(rows_affected)
}

/// [`insert_record`] with the table and dialect taken from the form's
/// `table` and `dbtype` fields.
pub fn insert_into_any_table(handle: &dyn Handle, form: &Form, config: &Config) -> Result<i64> {
    let table = required(form, TABLE_FIELD)?;
    let dialect = form_dialect(form, config)?;
    insert_record(handle, dialect, table, form, config)
}

/// Inserts or updates a row depending on the form's `todo` field.
///
/// Updates match `pkfield = id`; both fields are then required.
pub fn insert_update(handle: &dyn Handle, form: &Form, config: &Config) -> Result<Outcome> {
    let action = Action::from_tag(required(form, ACTION_FIELD)?)?;
    let table = required(form, TABLE_FIELD)?;
    let dialect = form_dialect(form, config)?;

    match action {
        Action::Insert => insert_record(handle, dialect, table, form, config)
            .map(|id| Outcome::Inserted { id }),
        Action::Update => update_record(
            handle,
            dialect,
            table,
            required(form, PK_FIELD)?,
            required(form, ID_FIELD)?,
            form,
            config,
        )
        .map(|rows_affected| Outcome::Updated { rows_affected }),
    }
}

fn required<'a>(form: &'a Form, field: &'static str) -> Result<&'a str> {
    form.get(field)
        .filter(|value| !value.is_empty())
        .ok_or(Error::MissingField(field))
}

fn form_dialect(form: &Form, config: &Config) -> Result<Dialect> {
    match form.get(DIALECT_FIELD) {
        Some(tag) if !tag.is_empty() => Dialect::from_tag(tag),
        _ => Ok(config.dialect),
    }
}
