//! Form-driven data access helpers over SQL drivers.
//!
//! # Intention
//!
//! - Turn submitted key/value forms into parameterized INSERT and UPDATE
//!   statements for any table, using the table's own column list.
//! - Read arbitrary result sets into string-keyed rows with a reusable scanner.
//!
//! # Architectural Boundaries
//!
//! - Every operation is one synchronous round trip on a caller-supplied
//!   [`Handle`]. No pooling, retries or transaction management.
//! - Values are always bound as parameters. Table and column names are
//!   trusted input; they are quoted and checked by [`builder::quote_identifier`]
//!   but never escaped. WHERE fragments are emitted verbatim.
//!
//! ```no_run
//! use form_sql::{insert_record, Config, Dialect, Form};
//! use rusqlite::Connection;
//!
//! # fn main() -> form_sql::Result<()> {
//! let conn = Connection::open("app.db")?;
//! let form = Form::parse(b"name=Ann&email=a%40x.com");
//! let id = insert_record(&conn, Dialect::Sqlite, "users", &form, &Config::default())?;
//! println!("inserted {id}");
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod exec;
pub mod form;
pub mod handle;
pub mod ops;
pub mod query;
pub mod scan;
pub mod schema;
pub mod sqlite;

pub use config::{Config, Dialect, RowErrorPolicy};
pub use error::{Error, Result};
pub use exec::Statement;
pub use form::{project, Form, Projection};
pub use handle::{Cursor, Execution, Handle, RawField, RawRow};
pub use ops::{insert_into_any_table, insert_record, insert_update, update_record, Action, Outcome};
pub use query::{check_count, field_by_value, get_all_row_pairs, get_all_rows, raw_sql};
pub use scan::{MapScanner, PairScanner};
pub use schema::{list_columns, ColumnLister};
