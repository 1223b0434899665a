//! Audit log: SQLite-based operation history.
//!
//! Stores a record of every vault operation (create, unlock, add,
//! remove, password change, backup) in a local SQLite database at
//! `<vault_dir>/audit.db`.  Records name credentials by identifier only;
//! secrets and passwords never reach the log.
//!
//! Designed for graceful degradation: if the database can't be opened or
//! written to, operations silently continue without logging.  Built
//! without the `audit-log` feature, logging is a no-op.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

#[cfg(feature = "audit-log")]
use crate::errors::PassVaultError;
use crate::errors::Result;

/// A single audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub identifier: Option<String>,
    pub details: Option<String>,
}

/// Return the path to the audit database next to the vault.
pub fn db_path(vault_dir: &Path) -> PathBuf {
    vault_dir.join("audit.db")
}

#[cfg(feature = "audit-log")]
mod sqlite {
    use super::*;
    use rusqlite::Connection;

    /// SQLite-backed audit log.
    pub struct AuditLog {
        conn: Connection,
    }

    impl AuditLog {
        /// Open (or create) the audit database at `<vault_dir>/audit.db`.
        ///
        /// Returns `None` if the database can't be opened; callers should
        /// treat this as "audit logging unavailable" and continue normally.
        pub fn open(vault_dir: &Path) -> Option<Self> {
            let path = db_path(vault_dir);
            let conn = Connection::open(&path).ok()?;

            // Set restrictive permissions on the audit database (owner-only).
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let perms = std::fs::Permissions::from_mode(0o600);
                let _ = std::fs::set_permissions(&path, perms);
            }

            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS audit_log (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    timestamp   TEXT NOT NULL,
                    operation   TEXT NOT NULL,
                    identifier  TEXT,
                    details     TEXT
                );",
            )
            .ok()?;

            Some(Self { conn })
        }

        /// Record an operation. Fire-and-forget, errors are silently ignored.
        pub fn log(&self, operation: &str, identifier: Option<&str>, details: Option<&str>) {
            let now = Utc::now().to_rfc3339();
            let _ = self.conn.execute(
                "INSERT INTO audit_log (timestamp, operation, identifier, details)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![now, operation, identifier, details],
            );
        }

        /// Most recent entries first, at most `limit` of them.
        pub fn query(&self, limit: usize) -> Result<Vec<AuditEntry>> {
            let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);

            let mut stmt = self
                .conn
                .prepare(
                    "SELECT id, timestamp, operation, identifier, details
                     FROM audit_log
                     ORDER BY id DESC
                     LIMIT ?1",
                )
                .map_err(|e| PassVaultError::AuditError(format!("query prepare: {e}")))?;

            let rows = stmt
                .query_map([limit_i64], |row| {
                    let ts_str: String = row.get(1)?;
                    let timestamp = DateTime::parse_from_rfc3339(&ts_str)
                        .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

                    Ok(AuditEntry {
                        id: row.get(0)?,
                        timestamp,
                        operation: row.get(2)?,
                        identifier: row.get(3)?,
                        details: row.get(4)?,
                    })
                })
                .map_err(|e| PassVaultError::AuditError(format!("query exec: {e}")))?;

            let mut entries = Vec::new();
            for row in rows {
                entries.push(
                    row.map_err(|e| PassVaultError::AuditError(format!("row parse: {e}")))?,
                );
            }

            Ok(entries)
        }
    }
}

#[cfg(feature = "audit-log")]
pub use sqlite::AuditLog;

/// Log an audit event for the vault living in `vault_dir`.
///
/// Opens the audit database, logs the event, and silently ignores any
/// errors.  Safe to call from any command, it never fails the parent
/// operation.
pub fn log_audit(vault_dir: &Path, op: &str, identifier: Option<&str>, details: Option<&str>) {
    #[cfg(feature = "audit-log")]
    if let Some(audit) = AuditLog::open(vault_dir) {
        audit.log(op, identifier, details);
    }

    #[cfg(not(feature = "audit-log"))]
    let _ = (vault_dir, op, identifier, details);
}

/// Read the most recent audit entries for the vault living in `vault_dir`.
pub fn recent_entries(vault_dir: &Path, limit: usize) -> Result<Vec<AuditEntry>> {
    #[cfg(feature = "audit-log")]
    {
        if !db_path(vault_dir).exists() {
            return Ok(Vec::new());
        }
        match AuditLog::open(vault_dir) {
            Some(audit) => audit.query(limit),
            None => Err(PassVaultError::AuditError(format!(
                "cannot open {}",
                db_path(vault_dir).display()
            ))),
        }
    }

    #[cfg(not(feature = "audit-log"))]
    {
        let _ = (vault_dir, limit);
        Ok(Vec::new())
    }
}

#[cfg(all(test, feature = "audit-log"))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_creates_database() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(dir.path());
        assert!(audit.is_some(), "should open successfully");
        assert!(dir.path().join("audit.db").exists());
    }

    #[test]
    fn log_and_query_roundtrip() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(dir.path()).unwrap();

        audit.log("add", Some("amazon"), None);
        audit.log("add", Some("github"), None);
        audit.log("remove", Some("amazon"), None);

        let entries = audit.query(10).unwrap();
        assert_eq!(entries.len(), 3);

        // Most recent first.
        assert_eq!(entries[0].operation, "remove");
        assert_eq!(entries[1].identifier.as_deref(), Some("github"));
        assert_eq!(entries[2].operation, "add");
    }

    #[test]
    fn query_with_limit() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(dir.path()).unwrap();

        for i in 0..10 {
            audit.log("add", Some(&format!("site-{i}")), None);
        }

        assert_eq!(audit.query(3).unwrap().len(), 3);
    }

    #[test]
    fn log_audit_helper_writes_entry() {
        let dir = TempDir::new().unwrap();
        log_audit(dir.path(), "create", None, Some("vault created"));

        let entries = recent_entries(dir.path(), 5).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, "create");
        assert!(entries[0].identifier.is_none());
        assert_eq!(entries[0].details.as_deref(), Some("vault created"));
    }

    #[test]
    fn recent_entries_without_database_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(recent_entries(dir.path(), 5).unwrap().is_empty());
        assert!(!db_path(dir.path()).exists());
    }

    #[test]
    fn open_returns_none_on_bad_path() {
        let result = AuditLog::open(Path::new("/nonexistent/path/that/does/not/exist"));
        assert!(result.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn audit_db_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let _audit = AuditLog::open(dir.path()).unwrap();

        let perms = std::fs::metadata(db_path(dir.path())).unwrap().permissions();
        assert_eq!(
            perms.mode() & 0o777,
            0o600,
            "audit.db should have 0o600 permissions"
        );
    }
}
