//! Admin review: request listing and status transitions.

use hostel_core::{ListParams, ListResult, ServiceError};
use hostel_store::Value;
use tracing::warn;

use crate::model::{Allocation, AllocationStatus};
use crate::service::AllocationService;

impl AllocationService {
    /// List allocation requests, newest first, optionally filtered by
    /// status.
    pub fn list(
        &self,
        status: Option<AllocationStatus>,
        params: &ListParams,
    ) -> Result<ListResult<Allocation>, ServiceError> {
        let limit = params.limit.min(500);

        let (where_sql, mut args) = match status {
            Some(s) => (
                " WHERE status = ?1",
                vec![Value::Text(s.as_str().to_string())],
            ),
            None => ("", Vec::new()),
        };

        let count_sql = format!("SELECT COUNT(*) AS cnt FROM allocations{}", where_sql);
        let total = self
            .sql
            .query(&count_sql, &args)
            .map_err(|e| ServiceError::Storage(e.to_string()))?
            .first()
            .and_then(|r| r.get_int("cnt"))
            .unwrap_or(0) as usize;

        let limit_idx = args.len() + 1;
        let offset_idx = args.len() + 2;
        args.push(Value::Integer(limit as i64));
        args.push(Value::Integer(params.offset as i64));

        let sql = format!(
            "SELECT data FROM allocations{} ORDER BY created_at DESC LIMIT ?{} OFFSET ?{}",
            where_sql, limit_idx, offset_idx,
        );
        let rows = self
            .sql
            .query(&sql, &args)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            items.push(Self::allocation_from_row(row)?);
        }
        Ok(ListResult { items, total })
    }

    /// Transition an allocation's status. Last write wins; transitions are
    /// not constrained since exactly one admin action per record is
    /// expected.
    ///
    /// Two-step saga: the allocation row is updated first, then the
    /// student profile's `can_apply` flag is flipped (false once
    /// confirmed). A failing second step is logged for manual
    /// reconciliation, never rolled back.
    pub fn update_status(
        &self,
        id: &str,
        status: AllocationStatus,
    ) -> Result<Allocation, ServiceError> {
        let mut record = self.get_allocation(id)?;
        record.status = status;

        let json = serde_json::to_string(&record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let affected = self
            .sql
            .exec(
                "UPDATE allocations SET data = ?1, status = ?2 WHERE id = ?3",
                &[
                    Value::Text(json),
                    Value::Text(status.as_str().to_string()),
                    Value::Text(id.to_string()),
                ],
            )
            .map_err(|e| Self::map_conflict(&e.to_string(), &record))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("allocation {}", id)));
        }

        let can_apply = status != AllocationStatus::Confirmed;
        if let Err(e) = self.gate.set_can_apply(&record.reg_no, can_apply) {
            warn!(
                reg_no = %record.reg_no,
                can_apply,
                error = %e,
                "allocation status updated but profile flag update failed"
            );
        }

        Ok(record)
    }
}
