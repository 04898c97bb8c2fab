use crate::Database;
use crate::models::UserRow;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

use beacon_types::models::{DataEntry, LoginAttempt};

impl Database {
    // -- Users --

    pub fn create_user(&self, username: &str, password_hash: &str, role: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password_hash, role) VALUES (?1, ?2, ?3)",
                (username, password_hash, role),
            )?;
            Ok(())
        })
    }

    /// Exact, case-sensitive username match.
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    // -- Login attempts --

    pub fn insert_login_attempt(
        &self,
        username: &str,
        role: &str,
        success: bool,
        ip_address: &str,
        user_agent: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO login_attempts (username, role, success, ip_address, user_agent)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![username, role, success, ip_address, user_agent],
            )?;
            Ok(())
        })
    }

    pub fn recent_login_attempts(&self, limit: u32) -> Result<Vec<LoginAttempt>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, role, success, ip_address, user_agent, created_at
                 FROM login_attempts
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?1",
            )?;

            let rows = stmt
                .query_map([limit], |row| {
                    Ok(LoginAttempt {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        role: row.get(2)?,
                        success: row.get(3)?,
                        ip_address: row.get(4)?,
                        user_agent: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Data entries --

    /// Inserts a row and returns its assigned id.
    pub fn insert_entry(
        &self,
        name: &str,
        message: &str,
        location: Option<&str>,
        contact: Option<&str>,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO data_entries (name, message, location, contact)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![name, message, location, contact],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_entry(&self, id: i64) -> Result<Option<DataEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, message, location, contact, created_at, updated_at
                 FROM data_entries WHERE id = ?1",
            )?;

            let row = stmt.query_row([id], entry_from_row).optional()?;
            Ok(row)
        })
    }

    /// All entries, newest first. Id breaks ties within the same second.
    pub fn list_entries(&self) -> Result<Vec<DataEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, message, location, contact, created_at, updated_at
                 FROM data_entries
                 ORDER BY created_at DESC, id DESC",
            )?;

            let rows = stmt
                .query_map([], entry_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Returns false when no row matched.
    pub fn delete_entry(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM data_entries WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
    }
}

fn entry_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<DataEntry, rusqlite::Error> {
    Ok(DataEntry {
        id: row.get(0)?,
        name: row.get(1)?,
        message: row.get(2)?,
        location: row.get(3)?,
        contact: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, password_hash, role, created_at FROM users WHERE username = ?1",
    )?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
                role: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}
