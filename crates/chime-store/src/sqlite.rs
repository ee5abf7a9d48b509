use std::path::Path;
use std::sync::Mutex;

use chime_core::{Job, JobStore, Rule, StoreError};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::debug;

/// SQLite-backed job store.
///
/// The whole-set save contract maps to a transactional table replace:
/// `position` preserves the set's iteration order across restarts.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        if let Some(dir) = path.as_ref().parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let conn = Connection::open(path).map_err(db_err)?;
        Self::new(conn)
    }

    /// Wrap an existing connection, initialising the schema if needed.
    pub fn new(conn: Connection) -> Result<Self, StoreError> {
        init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Initialise the `jobs` schema (idempotent).
fn init_db(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS jobs (
            position  INTEGER NOT NULL PRIMARY KEY,
            name      TEXT    NOT NULL,
            command   TEXT    NOT NULL,
            rule      TEXT    NOT NULL,   -- JSON-encoded Rule enum
            next_run  TEXT    NOT NULL,   -- RFC 3339
            done      INTEGER NOT NULL DEFAULT 0
        ) STRICT;
        ",
    )
    .map_err(db_err)
}

impl JobStore for SqliteStore {
    fn load(&self) -> Result<Vec<Job>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT name, command, rule, next_run, done FROM jobs ORDER BY position")
            .map_err(db_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?, // name
                    row.get::<_, String>(1)?, // command
                    row.get::<_, String>(2)?, // rule JSON
                    row.get::<_, String>(3)?, // next_run
                    row.get::<_, bool>(4)?,   // done
                ))
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;

        let mut jobs = Vec::with_capacity(rows.len());
        for (name, command, rule_json, next_run, done) in rows {
            let rule: Rule = serde_json::from_str(&rule_json)?;
            let next_run = DateTime::parse_from_rfc3339(&next_run)
                .map_err(|e| StoreError::Database(format!("bad next_run for {name:?}: {e}")))?
                .with_timezone(&Utc);
            let mut job = Job::new(&name, &command, rule, next_run);
            job.done = done;
            jobs.push(job);
        }
        Ok(jobs)
    }

    fn save(&self, jobs: &[Job]) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction().map_err(db_err)?;
        tx.execute("DELETE FROM jobs", []).map_err(db_err)?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO jobs (position, name, command, rule, next_run, done)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .map_err(db_err)?;
            for (position, job) in jobs.iter().enumerate() {
                let rule_json = serde_json::to_string(&job.rule)?;
                stmt.execute(rusqlite::params![
                    position as i64,
                    job.name,
                    job.command,
                    rule_json,
                    job.next_run.to_rfc3339(),
                    job.done,
                ])
                .map_err(db_err)?;
            }
        }
        tx.commit().map_err(db_err)?;
        debug!(count = jobs.len(), "job set saved");
        Ok(())
    }
}

fn db_err(e: rusqlite::Error) -> StoreError {
    StoreError::Database(e.to_string())
}
