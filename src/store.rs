//! Best-effort report persistence.
//!
//! Analysis never fails because a report could not be saved: the pipeline
//! calls [`ReportStore::save`] after a successful analysis, logs any
//! [`StoreError`] at WARN, and returns the report regardless. The SQLite
//! implementation keeps the whole history queryable per user so the CLI and
//! embedding applications can list past analyses.

use crate::error::StoreError;
use crate::report::{Report, StoredReport};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Rows returned by a listing when the caller does not say.
pub const DEFAULT_LIST_LIMIT: usize = 20;

/// Hard ceiling on listing size.
pub const MAX_LIST_LIMIT: usize = 100;

/// Persistence seam for finished reports.
pub trait ReportStore: Send + Sync {
    /// Persist one report; returns its assigned id.
    fn save(&self, report: &Report, user_id: &str, doc_name: &str) -> Result<i64, StoreError>;

    /// Most recent reports for one user, newest first. `limit` is clamped
    /// to `1..=`[`MAX_LIST_LIMIT`].
    fn list_by_user(&self, user_id: &str, limit: usize) -> Result<Vec<StoredReport>, StoreError>;
}

// ── Schema SQL ───────────────────────────────────────────────────────────

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS reports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    doc_name TEXT NOT NULL,
    summary TEXT NOT NULL,
    overall_risk REAL NOT NULL,
    flags TEXT NOT NULL DEFAULT '[]',
    created_at_ms INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reports_user_ts
    ON reports(user_id, created_at_ms DESC);
";

/// SQLite-backed [`ReportStore`].
///
/// Flags are stored as a JSON column rather than a child table: reports are
/// written once and read whole, so there is nothing to join on.
pub struct SqliteReportStore {
    conn: Mutex<Connection>,
}

impl SqliteReportStore {
    /// Open or create a database file, creating parent directories as needed.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::from_connection(Connection::open(path)?)
    }

    /// In-memory store for tests and throwaway runs.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn row_to_stored(row: &Row) -> Result<StoredReport, rusqlite::Error> {
        let flags_json: String = row.get(5)?;
        Ok(StoredReport {
            id: row.get(0)?,
            user_id: row.get(1)?,
            doc_name: row.get(2)?,
            report: Report {
                summary: row.get(3)?,
                overall_risk: row.get(4)?,
                // Tolerant read: a row with corrupt flag JSON still lists.
                flags: serde_json::from_str(&flags_json).unwrap_or_default(),
            },
            created_at_ms: row.get(6)?,
        })
    }
}

impl ReportStore for SqliteReportStore {
    fn save(&self, report: &Report, user_id: &str, doc_name: &str) -> Result<i64, StoreError> {
        let flags_json = serde_json::to_string(&report.flags)?;
        let created_at_ms = Utc::now().timestamp_millis();

        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        conn.execute(
            "INSERT INTO reports (user_id, doc_name, summary, overall_risk, flags, created_at_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user_id,
                doc_name,
                report.summary,
                report.overall_risk,
                flags_json,
                created_at_ms,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn list_by_user(&self, user_id: &str, limit: usize) -> Result<Vec<StoredReport>, StoreError> {
        let limit = limit.clamp(1, MAX_LIST_LIMIT);

        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stmt = conn.prepare(
            "SELECT id, user_id, doc_name, summary, overall_risk, flags, created_at_ms
             FROM reports
             WHERE user_id = ?1
             ORDER BY created_at_ms DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![user_id, limit as i64], |row| {
            Self::row_to_stored(row)
        })?;

        let mut reports = Vec::new();
        for row in rows {
            reports.push(row?);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Flag;

    fn sample_report(summary: &str, risk: f64) -> Report {
        Report {
            summary: summary.to_string(),
            overall_risk: risk,
            flags: vec![Flag {
                title: "Missing CDD records".to_string(),
                severity: 4,
                why_it_matters: "Required before onboarding".to_string(),
                recommendation: "Collect identity documents".to_string(),
                evidence: Vec::new(),
            }],
        }
    }

    #[test]
    fn save_and_list_round_trip() {
        let store = SqliteReportStore::open_in_memory().unwrap();
        let first = store
            .save(&sample_report("first", 40.0), "alice", "a.pdf")
            .unwrap();
        let second = store
            .save(&sample_report("second", 60.0), "alice", "b.pdf")
            .unwrap();
        assert!(second > first);

        let listed = store.list_by_user("alice", DEFAULT_LIST_LIMIT).unwrap();
        assert_eq!(listed.len(), 2);
        // Newest first.
        assert_eq!(listed[0].doc_name, "b.pdf");
        assert_eq!(listed[0].report.summary, "second");
        assert_eq!(listed[1].report.flags[0].severity, 4);
    }

    #[test]
    fn listing_is_scoped_to_the_user() {
        let store = SqliteReportStore::open_in_memory().unwrap();
        store
            .save(&sample_report("mine", 10.0), "alice", "a.pdf")
            .unwrap();
        store
            .save(&sample_report("theirs", 20.0), "bob", "b.pdf")
            .unwrap();

        let listed = store.list_by_user("alice", 50).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].user_id, "alice");
    }

    #[test]
    fn limit_is_clamped_to_at_least_one() {
        let store = SqliteReportStore::open_in_memory().unwrap();
        store
            .save(&sample_report("a", 10.0), "alice", "a.pdf")
            .unwrap();
        store
            .save(&sample_report("b", 20.0), "alice", "b.pdf")
            .unwrap();

        let listed = store.list_by_user("alice", 0).unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[test]
    fn open_creates_parent_directories_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("reports.sqlite");

        {
            let store = SqliteReportStore::open(&path).unwrap();
            store
                .save(&sample_report("persisted", 30.0), "alice", "a.pdf")
                .unwrap();
        }

        let reopened = SqliteReportStore::open(&path).unwrap();
        let listed = reopened.list_by_user("alice", 10).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].report.summary, "persisted");
    }

    #[test]
    fn unknown_user_lists_nothing() {
        let store = SqliteReportStore::open_in_memory().unwrap();
        assert!(store.list_by_user("nobody", 10).unwrap().is_empty());
    }
}
