//! Shared storage for the front-desk features. One service, one set of
//! tables; the HTTP modules expose slices of it.

pub mod announcements;
pub mod feedback;
pub mod leave;
pub mod menu;
pub mod rules;

use std::sync::Arc;

use hostel_core::ServiceError;
use hostel_store::{BlobStore, SqlStore};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS leave_applications (
        id          TEXT PRIMARY KEY,
        data        TEXT NOT NULL,
        email       TEXT NOT NULL,
        status      TEXT NOT NULL,
        created_at  TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_leave_email ON leave_applications(email)",
    "CREATE TABLE IF NOT EXISTS feedbacks (
        id          TEXT PRIMARY KEY,
        data        TEXT NOT NULL,
        status      TEXT NOT NULL,
        urgency     TEXT NOT NULL,
        created_at  TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS weekly_menu (
        day   TEXT PRIMARY KEY,
        data  TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS hostel_rules (
        id    INTEGER PRIMARY KEY,
        data  TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS announcements (
        id          TEXT PRIMARY KEY,
        data        TEXT NOT NULL,
        created_at  TEXT NOT NULL
    )",
];

pub struct DeskService {
    pub(crate) sql: Arc<dyn SqlStore>,
    pub(crate) blob: Arc<dyn BlobStore>,
}

impl DeskService {
    pub fn new(
        sql: Arc<dyn SqlStore>,
        blob: Arc<dyn BlobStore>,
    ) -> Result<Arc<Self>, ServiceError> {
        for stmt in SCHEMA {
            sql.exec(stmt, &[])
                .map_err(|e| ServiceError::Storage(e.to_string()))?;
        }
        Ok(Arc::new(Self { sql, blob }))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use hostel_store::{FsBlobStore, SqliteStore};

    use super::DeskService;

    pub fn test_service() -> (tempfile::TempDir, Arc<DeskService>) {
        let dir = tempfile::tempdir().unwrap();
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        let blob = Arc::new(FsBlobStore::open(dir.path()).unwrap());
        let svc = DeskService::new(sql, blob).unwrap();
        (dir, svc)
    }
}
