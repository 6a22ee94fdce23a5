//! INSERT / UPDATE statement text builders.
//!
//! Values are never interpolated: every column becomes a `?` placeholder and
//! the caller binds values in key order. Identifiers are backtick-quoted and
//! must satisfy [`quote_identifier`]'s contract. The WHERE fragment passed to
//! [`update_query`] is trusted caller text and is emitted as-is.

use crate::config::Dialect;
use crate::error::{Error, Result};

/// Key that is emitted as the bare `NULL` token instead of a quoted column.
pub const NULL_SENTINEL: &str = "NULL";

/// Quotes a table or column name with backticks.
///
/// Names must be non-empty and may not contain backticks or control
/// characters; anything else is rejected rather than escaped.
pub fn quote_identifier(name: &str) -> Result<String> {
    if name.is_empty() || name.chars().any(|c| c == '`' || c.is_control()) {
        return Err(Error::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("`{name}`"))
}

/// Quotes `value` as a single-quoted string literal for `dialect`.
///
/// Single quotes are doubled. MySQL also reads `\` as an escape inside
/// strings, so there backslashes are doubled first; SQLite keeps them literal.
pub fn quote_literal(dialect: Dialect, value: &str) -> String {
    let escaped = match dialect {
        Dialect::MySql => value.replace('\\', "\\\\"),
        Dialect::Sqlite => value.to_string(),
    };
    format!("'{}'", escaped.replace('\'', "''"))
}

/// Builds ``INSERT INTO `table` (`a`, `b`) VALUES (?, ?)``.
pub fn insert_query<S: AsRef<str>>(keys: &[S], table: &str) -> Result<String> {
    if keys.is_empty() {
        return Err(Error::EmptyProjection {
            table: table.to_string(),
        });
    }
    let fields = keys
        .iter()
        .map(|key| match key.as_ref() {
            NULL_SENTINEL => Ok(NULL_SENTINEL.to_string()),
            key => quote_identifier(key),
        })
        .collect::<Result<Vec<_>>>()?;
    let placeholders = vec!["?"; keys.len()];
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_identifier(table)?,
        fields.join(", "),
        placeholders.join(", ")
    ))
}

/// Builds ``UPDATE `table` SET `a`=?, `b`=? WHERE <where_clause>``.
pub fn update_query<S: AsRef<str>>(keys: &[S], table: &str, where_clause: &str) -> Result<String> {
    if keys.is_empty() {
        return Err(Error::EmptyProjection {
            table: table.to_string(),
        });
    }
    let assignments = keys
        .iter()
        .map(|key| quote_identifier(key.as_ref()).map(|column| format!("{column}=?")))
        .collect::<Result<Vec<_>>>()?;
    Ok(format!(
        "UPDATE {} SET {} WHERE {}",
        quote_identifier(table)?,
        assignments.join(", "),
        where_clause
    ))
}

/// Equality condition ``` `field`='value' ``` with the value quoted as a
/// `dialect` literal.
pub fn where_equals(dialect: Dialect, field: &str, value: &str) -> Result<String> {
    Ok(format!(
        "{}={}",
        quote_identifier(field)?,
        quote_literal(dialect, value)
    ))
}

/// Number of `?` placeholders in `sql`, ignoring ones inside quoted strings,
/// quoted identifiers, `--` line comments and `/* */` block comments.
pub fn placeholder_count(sql: &str) -> usize {
    let mut count = 0;
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            // A doubled quote closes and immediately reopens, which nets out.
            '\'' | '"' | '`' => {
                for inner in chars.by_ref() {
                    if inner == c {
                        break;
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                for inner in chars.by_ref() {
                    if inner == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for inner in chars.by_ref() {
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
            }
            '?' => count += 1,
            _ => {}
        }
    }
    count
}
