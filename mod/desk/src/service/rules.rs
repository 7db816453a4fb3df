//! The hostel rule book. A single document with a fixed id.

use hostel_core::ServiceError;
use hostel_store::Value;

use crate::model::HostelRules;
use crate::service::DeskService;

const RULES_ID: i64 = 1;

impl DeskService {
    /// Fetch the rule book. An empty database yields the default (empty)
    /// document rather than a 404, so the admin form always has something
    /// to edit.
    pub fn get_rules(&self) -> Result<HostelRules, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM hostel_rules WHERE id = ?1",
                &[Value::Integer(RULES_ID)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        match rows.first().and_then(|r| r.get_text("data")) {
            Some(data) => {
                serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
            }
            None => Ok(HostelRules::default()),
        }
    }

    pub fn put_rules(&self, mut rules: HostelRules) -> Result<HostelRules, ServiceError> {
        rules.id = RULES_ID;
        let json = serde_json::to_string(&rules)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.sql
            .exec(
                "INSERT INTO hostel_rules (id, data) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET data = excluded.data",
                &[Value::Integer(RULES_ID), Value::Text(json)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(rules)
    }
}
