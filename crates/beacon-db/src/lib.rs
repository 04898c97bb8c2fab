pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::{Result, ensure};
use crossbeam_channel::{Receiver, Sender, bounded};
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

/// Persistence gateway: a fixed pool of SQLite connections.
///
/// Connections are parked in a bounded channel. A checkout blocks until one
/// is free, so load beyond the pool size queues rather than failing. The
/// struct cannot exist without the schema in place — `open` runs migrations
/// before returning.
pub struct Database {
    tx: Sender<Connection>,
    rx: Receiver<Connection>,
}

impl Database {
    pub fn open(path: &Path, pool_size: usize) -> Result<Self> {
        ensure!(pool_size > 0, "pool size must be at least 1");

        let (tx, rx) = bounded(pool_size);
        for i in 0..pool_size {
            let conn = Connection::open(path)?;

            // WAL mode for concurrent reads
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;

            if i == 0 {
                migrations::run(&conn)?;
            }

            tx.send(conn)
                .map_err(|_| anyhow::anyhow!("connection pool channel closed"))?;
        }

        info!(
            "Database opened at {} ({} pooled connections)",
            path.display(),
            pool_size
        );
        Ok(Self { tx, rx })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        // Blocks when every connection is checked out.
        let conn = self
            .rx
            .recv()
            .map_err(|_| anyhow::anyhow!("connection pool channel closed"))?;
        let out = f(&conn);
        let _ = self.tx.send(conn);
        out
    }
}
