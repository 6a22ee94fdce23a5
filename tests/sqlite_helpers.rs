use anyhow::Result;
use form_sql::builder::{insert_query, update_query, where_equals};
use form_sql::exec::{insert, update_by_values};
use form_sql::{
    check_count, field_by_value, get_all_row_pairs, get_all_rows, insert_into_any_table,
    insert_record, insert_update, list_columns, project, raw_sql, update_record, Config, Cursor,
    Dialect, Error, Form, Handle, MapScanner, Outcome, RowErrorPolicy,
};
use rusqlite::Connection;
use tempfile::NamedTempFile;

// In-memory database with the users table
fn create_test_db() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    initialize_schema(&conn)?;
    Ok(conn)
}

// File-backed database, kept alive by the returned temp file
fn create_temp_db() -> Result<(Connection, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let conn = Connection::open(temp_file.path())?;
    initialize_schema(&conn)?;
    Ok((conn, temp_file))
}

fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT
        );
        "#,
    )
}

fn sqlite_config() -> Config {
    Config::new(Dialect::Sqlite)
}

fn user_form(name: &str, email: &str) -> Form {
    Form::new()
        .with_value("name", name)
        .with_value("email", email)
        .with_value("extra", "ignored")
}

#[test]
fn test_sqlite_introspection() -> Result<()> {
    let conn = create_test_db()?;
    let columns = list_columns(&conn, Dialect::Sqlite, "users", RowErrorPolicy::Strict)?;
    assert_eq!(columns, ["id", "name", "email"]);
    Ok(())
}

#[test]
fn test_mysql_introspection_fails_on_sqlite() -> Result<()> {
    let conn = create_test_db()?;
    let err = list_columns(&conn, Dialect::MySql, "users", RowErrorPolicy::Lenient).unwrap_err();
    assert!(matches!(err, Error::Sqlite(_)));
    Ok(())
}

#[test]
fn test_end_to_end_insert() -> Result<()> {
    let conn = create_test_db()?;
    let form = user_form("Ann", "a@x.com");

    let columns = list_columns(&conn, Dialect::Sqlite, "users", RowErrorPolicy::Strict)?;
    let projection = project(&form, &columns);
    assert_eq!(projection.keys, ["name", "email"]);
    assert_eq!(projection.values, ["Ann", "a@x.com"]);

    let sql = insert_query(&projection.keys, "users")?;
    assert_eq!(sql, "INSERT INTO `users` (`name`, `email`) VALUES (?, ?)");

    let execution = insert(&conn, &sql, &projection.values)?;
    assert!(execution.last_insert_id > 0);
    assert_eq!(execution.rows_affected, 1);

    let id = insert_record(&conn, Dialect::Sqlite, "users", &user_form("Bob", "b@x.com"), &sqlite_config())?;
    assert_eq!(id, execution.last_insert_id + 1);
    assert_eq!(check_count(&conn, "users", "1=1")?, 2);
    Ok(())
}

#[test]
fn test_update_scenario() -> Result<()> {
    let conn = create_test_db()?;
    conn.execute("INSERT INTO users (id, name, email) VALUES (7, 'Ann', 'a@x.com')", [])?;

    let where_clause = where_equals(Dialect::Sqlite, "id", "7")?;
    let sql = update_query(&["name"], "users", &where_clause)?;
    assert_eq!(sql, "UPDATE `users` SET `name`=? WHERE `id`='7'");
    assert_eq!(update_by_values(&conn, &sql, &["Ann2".to_string()])?, 1);

    let form = Form::new().with_value("name", "Ann3");
    let affected = update_record(&conn, Dialect::Sqlite, "users", "id", "7", &form, &sqlite_config())?;
    assert_eq!(affected, 1);
    assert_eq!(
        field_by_value(&conn, "users", "name", "`id`=7")?.as_deref(),
        Some("Ann3")
    );
    assert_eq!(
        field_by_value(&conn, "users", "email", "`id`=7")?.as_deref(),
        Some("a@x.com")
    );
    Ok(())
}

#[test]
fn test_insert_update_dispatch() -> Result<()> {
    let conn = create_test_db()?;
    let config = sqlite_config();

    let form = Form::parse(b"todo=insert&table=users&name=Cy&email=c%40x.com");
    let outcome = insert_update(&conn, &form, &config)?;
    let Outcome::Inserted { id } = outcome else {
        panic!("expected insert, got {outcome:?}");
    };
    assert_eq!(outcome.to_string(), "OK");

    let form = Form::new()
        .with_value("todo", "update")
        .with_value("table", "users")
        .with_value("pkfield", "id")
        .with_value("id", id.to_string())
        .with_value("email", "cy@x.com");
    assert_eq!(
        insert_update(&conn, &form, &config)?,
        Outcome::Updated { rows_affected: 1 }
    );
    assert_eq!(
        field_by_value(&conn, "users", "email", &where_equals(Dialect::Sqlite, "id", &id.to_string())?)?.as_deref(),
        Some("cy@x.com")
    );
    Ok(())
}

#[test]
fn test_update_id_is_matched_as_a_literal() -> Result<()> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(
        r#"
        CREATE TABLE tags (code TEXT PRIMARY KEY, label TEXT);
        INSERT INTO tags VALUES ('a', 'first'), ('b', 'second');
        INSERT INTO tags VALUES ('c\''d', 'third');
        "#,
    )?;
    let config = sqlite_config();
    let form = Form::new().with_value("label", "changed");

    let affected = update_record(&conn, Dialect::Sqlite, "tags", "code", r"\' OR 1=1 -- ", &form, &config)?;
    assert_eq!(affected, 0);
    assert_eq!(check_count(&conn, "tags", "label='changed'")?, 0);

    let affected = update_record(&conn, Dialect::Sqlite, "tags", "code", r"c\'d", &form, &config)?;
    assert_eq!(affected, 1);
    assert_eq!(
        field_by_value(&conn, "tags", "label", r"code='c\''d'")?.as_deref(),
        Some("changed")
    );
    Ok(())
}

#[test]
fn test_insert_update_usage_faults() -> Result<()> {
    let conn = create_test_db()?;
    let config = sqlite_config();

    let err = insert_update(&conn, &Form::new().with_value("table", "users"), &config).unwrap_err();
    assert!(matches!(err, Error::MissingField("todo")));

    let form = Form::new().with_value("todo", "upsert").with_value("table", "users");
    assert!(matches!(insert_update(&conn, &form, &config), Err(Error::UnknownAction(_))));

    let form = Form::new().with_value("todo", "update").with_value("table", "users");
    assert!(matches!(insert_update(&conn, &form, &config), Err(Error::MissingField("pkfield"))));

    let form = Form::new()
        .with_value("todo", "insert")
        .with_value("table", "users")
        .with_value("name", "Dee");
    let err = insert_update(&conn, &form, &Config::default()).unwrap_err();
    assert!(matches!(err, Error::Sqlite(_)), "SHOW COLUMNS is not SQLite: {err}");
    Ok(())
}

#[test]
fn test_insert_into_any_table_reads_form_routing() -> Result<()> {
    let conn = create_test_db()?;
    let form = Form::new()
        .with_value("table", "users")
        .with_value("dbtype", "sqlite3")
        .with_value("name", "Eve");
    let id = insert_into_any_table(&conn, &form, &Config::default())?;
    assert!(id > 0);
    assert_eq!(field_by_value(&conn, "users", "email", &format!("id={id}"))?.as_deref(), Some(""));
    Ok(())
}

#[test]
fn test_empty_projection_is_rejected() -> Result<()> {
    let conn = create_test_db()?;
    let form = Form::new().with_value("name", "");
    let err = insert_record(&conn, Dialect::Sqlite, "users", &form, &sqlite_config()).unwrap_err();
    assert!(matches!(err, Error::EmptyProjection { ref table } if table == "users"));
    assert_eq!(check_count(&conn, "users", "1=1")?, 0);
    Ok(())
}

#[test]
fn test_transaction_handle() -> Result<()> {
    let mut conn = create_test_db()?;

    let tx = conn.transaction()?;
    insert_record(&tx, Dialect::Sqlite, "users", &user_form("Tx", "t@x.com"), &sqlite_config())?;
    assert_eq!(check_count(&tx, "users", "name='Tx'")?, 1);
    tx.rollback()?;
    assert_eq!(check_count(&conn, "users", "name='Tx'")?, 0);

    let tx = conn.transaction()?;
    insert_record(&tx, Dialect::Sqlite, "users", &user_form("Tx", "t@x.com"), &sqlite_config())?;
    tx.commit()?;
    assert_eq!(check_count(&conn, "users", "name='Tx'")?, 1);
    Ok(())
}

#[test]
fn test_file_backed_database() -> Result<()> {
    let (conn, temp_file) = create_temp_db()?;
    insert_record(&conn, Dialect::Sqlite, "users", &user_form("Fay", "f@x.com"), &sqlite_config())?;
    drop(conn);

    let reopened = Connection::open(temp_file.path())?;
    let rows = get_all_rows(&reopened, "SELECT name, email FROM users", RowErrorPolicy::Strict)?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Fay");
    assert_eq!(rows[0]["email"], "f@x.com");
    Ok(())
}

#[test]
fn test_raw_sql_reports_changes() -> Result<()> {
    let conn = create_test_db()?;
    conn.execute("INSERT INTO users (name) VALUES ('Gus')", [])?;

    assert!(raw_sql(&conn, "UPDATE users SET email = 'g@x.com' WHERE name = 'Gus'")?);
    assert!(!raw_sql(&conn, "UPDATE users SET email = 'n@x.com' WHERE name = 'nobody'")?);
    assert!(matches!(raw_sql(&conn, "UPDATE missing SET x = 1"), Err(Error::Sqlite(_))));
    assert!(matches!(
        raw_sql(&conn, "SELECT name FROM users"),
        Err(Error::Sqlite(rusqlite::Error::ExecuteReturnedResults))
    ));
    Ok(())
}

#[test]
fn test_lookup_helpers() -> Result<()> {
    let conn = create_test_db()?;
    conn.execute_batch(
        "INSERT INTO users (name, email) VALUES ('Hal', NULL), ('Ivy', 'i@x.com'), ('Ivy', 'j@x.com');",
    )?;

    assert_eq!(check_count(&conn, "users", "name = 'Ivy'")?, 2);
    assert_eq!(check_count(&conn, "users", "name = 'Zed'")?, 0);
    assert_eq!(field_by_value(&conn, "users", "name", "name = 'Zed'")?, None);
    assert_eq!(field_by_value(&conn, "users", "email", "name = 'Hal'")?.as_deref(), Some(""));
    assert!(matches!(field_by_value(&conn, "users", "bad`name", "1=1"), Err(Error::InvalidIdentifier(_))));

    let err = field_by_value(&conn, "users", "max(id)", "1=1").unwrap_err();
    assert!(matches!(err, Error::Sqlite(_)));
    assert!(err.to_string().contains("max(id)"), "{err}");
    Ok(())
}

#[test]
fn test_scanner_rows_stay_independent() -> Result<()> {
    let conn = create_test_db()?;
    conn.execute_batch("INSERT INTO users (id, name) VALUES (1, 'A'), (2, 'B');")?;

    conn.query_with("SELECT id, name FROM users ORDER BY id", &mut |cursor: &mut dyn Cursor| -> form_sql::Result<()> {
        let mut scanner = MapScanner::new(cursor.columns());
        assert!(scanner.next(cursor)?);
        let first = scanner.materialize();
        assert!(scanner.next(cursor)?);
        let second = scanner.get();

        assert_eq!(first["id"], "1");
        assert_eq!(first["name"], "A");
        assert_eq!(second["id"], "2");
        assert_eq!(second["name"], "B");
        assert!(!scanner.next(cursor)?);
        Ok(())
    })?;
    Ok(())
}

fn seed_notes(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE notes (id INTEGER PRIMARY KEY, body BLOB);
        INSERT INTO notes (id, body) VALUES
            (1, 'one'), (2, 'two'), (3, X'FF'), (4, 'four'), (5, 'five');
        "#,
    )
}

#[test]
fn test_lenient_bulk_fetch_stops_at_bad_row() -> Result<()> {
    let conn = create_test_db()?;
    seed_notes(&conn)?;
    let sql = "SELECT id, body FROM notes ORDER BY id";

    let rows = get_all_rows(&conn, sql, RowErrorPolicy::Lenient)?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["body"], "one");
    assert_eq!(rows[1]["body"], "two");

    let pairs = get_all_row_pairs(&conn, sql, RowErrorPolicy::Lenient)?;
    assert_eq!(pairs, [["id", "1", "body", "one"], ["id", "2", "body", "two"]]);

    let err = get_all_rows(&conn, sql, RowErrorPolicy::Strict).unwrap_err();
    assert!(matches!(err, Error::Decode { index: 1, ref column } if column == "body"));
    Ok(())
}

#[test]
fn test_bulk_fetch_query_errors_are_returned() -> Result<()> {
    let conn = create_test_db()?;
    let err = get_all_rows(&conn, "SELECT * FROM missing", RowErrorPolicy::Lenient).unwrap_err();
    assert!(matches!(err, Error::Sqlite(_)));
    Ok(())
}
