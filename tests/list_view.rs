//! End-to-end: accumulated conditions drive a real sqlite query, and filter
//! state sticks across simulated requests.

use anyhow::Result;
use rusqlite::Connection;
use sift::{FieldOptions, FilterAccumulator, FilterConfig, MemoryStore, RequestParams};

/// Route the crate's debug lines through a subscriber so RUST_LOG surfaces
/// them during test runs. `try_init` because tests share a process.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_test_writer()
        .try_init();
}

fn seeded_db() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(
        "CREATE TABLE items (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            status TEXT NOT NULL,
            account_id INTEGER NOT NULL,
            deleted_at TEXT
        );
        INSERT INTO items (title, status, account_id, deleted_at) VALUES
            ('alpha', 'active',   7, NULL),
            ('beta',  'active',   8, NULL),
            ('gamma', 'archived', 7, NULL),
            ('delta', 'active',   7, '2024-01-01');",
    )?;
    Ok(conn)
}

fn titles(conn: &Connection, clause: &str, params: &[&dyn rusqlite::types::ToSql]) -> Result<Vec<String>> {
    let sql = format!("SELECT title FROM items WHERE {clause} ORDER BY title");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params, |row| row.get::<_, String>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

#[test]
fn conditions_feed_a_parameterized_query() -> Result<()> {
    init_tracing();
    let conn = seeded_db()?;
    let mut session = MemoryStore::new();

    let params = RequestParams::from_pairs(
        "/items",
        vec![
            ("filter_by[status]", "active"),
            ("filter_by[account_id]", "7"),
        ],
    );

    let mut acc = FilterAccumulator::with_constraints(&params, &mut session, "deleted_at IS NULL");
    acc.register("status", FieldOptions::new())?;
    acc.register("account_id", FieldOptions::new())?;

    let conditions = acc.conditions();
    let found = titles(&conn, &conditions.clause, &conditions.params())?;
    assert_eq!(found, vec!["alpha"]);
    Ok(())
}

#[test]
fn filters_survive_navigation() -> Result<()> {
    init_tracing();
    let conn = seeded_db()?;
    let mut session = MemoryStore::new();

    // First request picks a filter.
    let params = RequestParams::from_pairs("/items", vec![("filter_by[status]", "archived")]);
    let mut acc = FilterAccumulator::new(&params, &mut session);
    acc.register("status", FieldOptions::new())?;
    drop(acc.conditions());

    // Second request to the same path sends no parameters: the stored
    // value still applies.
    let params = RequestParams::new("/items");
    let mut acc = FilterAccumulator::new(&params, &mut session);
    acc.register("status", FieldOptions::new())?;

    let conditions = acc.conditions();
    let found = titles(&conn, &conditions.clause, &conditions.params())?;
    assert_eq!(found, vec!["gamma"]);

    // Third request clears it with a blank value: everything comes back.
    let params = RequestParams::from_pairs("/items", vec![("filter_by[status]", "")]);
    let mut acc = FilterAccumulator::new(&params, &mut session);
    acc.register("status", FieldOptions::new())?;

    let conditions = acc.conditions();
    assert_eq!(conditions.clause, "1=1");
    let found = titles(&conn, &conditions.clause, &conditions.params())?;
    assert_eq!(found.len(), 4);
    Ok(())
}

#[test]
fn config_driven_view_setup() -> Result<()> {
    init_tracing();
    let conn = seeded_db()?;
    let mut session = MemoryStore::new();

    let config: FilterConfig = toml::from_str(
        r#"
        [view."/items"]
        constraints = "deleted_at IS NULL"

        [view."/items".defaults]
        status = "active"
        "#,
    )?;
    let view = config.view("/items").expect("view configured");

    let params = RequestParams::new("/items");
    let mut acc = FilterAccumulator::with_constraints(&params, &mut session, view.constraints());
    acc.register("status", view.field_options("status"))?;

    let conditions = acc.conditions();
    let found = titles(&conn, &conditions.clause, &conditions.params())?;
    assert_eq!(found, vec!["alpha", "beta"]);
    Ok(())
}
