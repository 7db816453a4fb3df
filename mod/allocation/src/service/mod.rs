pub mod occupancy;
pub mod review;
pub mod status;
pub mod submit;

use std::sync::Arc;

use hostel_core::ServiceError;
use hostel_store::{BlobStore, Row, SqlStore, Value};

use crate::gate::ProfileGate;
use crate::model::Allocation;

/// SQL DDL for the allocation tables.
///
/// The full record lives as a JSON document in the `data` column, with
/// indexed scalar columns extracted for filtering. The two partial unique
/// indexes are the atomic check-and-insert guard: a bed (and a student)
/// can hold at most one non-rejected application, enforced by the store
/// rather than a client-observed snapshot.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS allocations (
        id TEXT PRIMARY KEY,
        data TEXT NOT NULL,
        email TEXT NOT NULL,
        reg_no TEXT NOT NULL,
        hostel TEXT NOT NULL,
        floor TEXT NOT NULL,
        room_number TEXT NOT NULL,
        bed_number INTEGER NOT NULL,
        status TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS uniq_alloc_bed
        ON allocations(hostel, floor, room_number, bed_number)
        WHERE status != 'rejected'",
    "CREATE UNIQUE INDEX IF NOT EXISTS uniq_alloc_email
        ON allocations(email)
        WHERE status != 'rejected'",
    "CREATE INDEX IF NOT EXISTS idx_alloc_status ON allocations(status)",
    "CREATE INDEX IF NOT EXISTS idx_alloc_floor ON allocations(hostel, floor)",
];

/// Allocation service — holds the storage backends and the profile gate.
pub struct AllocationService {
    pub(crate) sql: Arc<dyn SqlStore>,
    pub(crate) blob: Arc<dyn BlobStore>,
    pub(crate) gate: Arc<dyn ProfileGate>,
}

impl AllocationService {
    pub fn new(
        sql: Arc<dyn SqlStore>,
        blob: Arc<dyn BlobStore>,
        gate: Arc<dyn ProfileGate>,
    ) -> Result<Arc<Self>, ServiceError> {
        for stmt in SCHEMA {
            sql.exec(stmt, &[])
                .map_err(|e| ServiceError::Storage(format!("schema init failed: {}", e)))?;
        }
        Ok(Arc::new(Self { sql, blob, gate }))
    }

    /// Insert an allocation row, mapping unique-index violations to the
    /// user-facing conflict they represent.
    pub(crate) fn insert_allocation(&self, record: &Allocation) -> Result<(), ServiceError> {
        let json = serde_json::to_string(record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        self.sql
            .exec(
                "INSERT INTO allocations
                    (id, data, email, reg_no, hostel, floor, room_number, bed_number, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                &[
                    Value::Text(record.id.clone()),
                    Value::Text(json),
                    Value::Text(record.email.clone()),
                    Value::Text(record.reg_no.clone()),
                    Value::Text(record.hostel.clone()),
                    Value::Text(record.floor.clone()),
                    Value::Text(record.room_number.clone()),
                    Value::Integer(i64::from(record.bed_number)),
                    Value::Text(record.status.as_str().to_string()),
                    Value::Text(record.created_at.clone()),
                ],
            )
            .map_err(|e| Self::map_conflict(&e.to_string(), record))?;
        Ok(())
    }

    fn map_conflict(msg: &str, record: &Allocation) -> ServiceError {
        if msg.contains("allocations.email") {
            ServiceError::Conflict(format!(
                "an active application already exists for {}",
                record.email
            ))
        } else if msg.contains("UNIQUE constraint") {
            ServiceError::Conflict(format!(
                "bed {} in room {} is already taken",
                record.bed_number, record.room_number
            ))
        } else {
            ServiceError::Storage(msg.to_string())
        }
    }

    pub(crate) fn get_allocation(&self, id: &str) -> Result<Allocation, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM allocations WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("allocation {}", id)))?;
        Self::allocation_from_row(row)
    }

    pub(crate) fn allocation_from_row(row: &Row) -> Result<Allocation, ServiceError> {
        let data = row
            .get_text("data")
            .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Arc, Mutex};

    use hostel_core::ServiceError;
    use hostel_store::{FsBlobStore, SqliteStore};

    use crate::gate::ProfileGate;
    use crate::service::AllocationService;

    /// Gate stub that records every call.
    pub struct RecordingGate {
        pub calls: Mutex<Vec<(String, bool)>>,
    }

    impl RecordingGate {
        pub fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    impl ProfileGate for RecordingGate {
        fn set_can_apply(&self, reg_no: &str, can_apply: bool) -> Result<(), ServiceError> {
            self.calls.lock().unwrap().push((reg_no.to_string(), can_apply));
            Ok(())
        }
    }

    pub fn test_service_with_gate(
        gate: Arc<dyn ProfileGate>,
    ) -> (tempfile::TempDir, Arc<AllocationService>) {
        let dir = tempfile::tempdir().unwrap();
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        let blob = Arc::new(FsBlobStore::open(dir.path()).unwrap());
        let svc = AllocationService::new(sql, blob, gate).unwrap();
        (dir, svc)
    }

    pub fn test_service() -> (tempfile::TempDir, Arc<AllocationService>) {
        test_service_with_gate(Arc::new(crate::gate::NoProfileGate))
    }
}
