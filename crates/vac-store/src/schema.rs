//! Schema creation and additive migrations.
//!
//! Databases written by earlier versions are upgraded in place: missing
//! columns are added with `ALTER TABLE`, never rewritten, so a downgrade
//! still finds its data.

use rusqlite::Connection;
use tracing::debug;

use crate::error::StoreResult;

const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    is_admin INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS vacations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    edited_at TIMESTAMP,
    comment TEXT,
    slot TEXT
);

CREATE TABLE IF NOT EXISTS entra_config (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    tenant_id TEXT,
    client_id TEXT,
    client_secret TEXT,
    enabled INTEGER NOT NULL DEFAULT 0,
    registration_token TEXT,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
";

pub(crate) fn migrate(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(CREATE_TABLES)?;

    add_column_if_missing(conn, "users", "is_admin", "INTEGER NOT NULL DEFAULT 0")?;
    add_column_if_missing(conn, "vacations", "edited_at", "TIMESTAMP")?;
    add_column_if_missing(conn, "vacations", "comment", "TEXT")?;
    add_column_if_missing(conn, "vacations", "slot", "TEXT")?;
    add_column_if_missing(conn, "entra_config", "registration_token", "TEXT")?;

    conn.execute(
        "INSERT OR IGNORE INTO entra_config (id, enabled) VALUES (1, 0)",
        [],
    )?;
    Ok(())
}

fn add_column_if_missing(
    conn: &Connection,
    table: &str,
    column: &str,
    definition: &str,
) -> StoreResult<()> {
    if table_has_column(conn, table, column)? {
        return Ok(());
    }
    debug!(table, column, "adding missing column");
    conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {column} {definition}"))?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert!(table_has_column(&conn, "vacations", "slot").unwrap());
    }

    #[test]
    fn upgrades_a_pre_slot_database() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE users (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 username TEXT NOT NULL UNIQUE,
                 password_hash TEXT NOT NULL,
                 created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
             );
             CREATE TABLE vacations (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 username TEXT NOT NULL,
                 start_date DATE NOT NULL,
                 end_date DATE NOT NULL,
                 created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
             );",
        )
        .unwrap();

        migrate(&conn).unwrap();

        assert!(table_has_column(&conn, "users", "is_admin").unwrap());
        assert!(table_has_column(&conn, "vacations", "edited_at").unwrap());
        assert!(table_has_column(&conn, "vacations", "comment").unwrap());
        assert!(table_has_column(&conn, "vacations", "slot").unwrap());

        let enabled: i64 = conn
            .query_row("SELECT enabled FROM entra_config WHERE id = 1", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(enabled, 0);
    }
}
