//! Admin announcements shown on the student dashboard.

use hostel_core::{new_id, now_rfc3339, ServiceError};
use hostel_store::Value;

use crate::model::Announcement;
use crate::service::DeskService;

impl DeskService {
    pub fn list_announcements(&self) -> Result<Vec<Announcement>, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM announcements ORDER BY created_at DESC",
                &[],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        rows.iter()
            .map(|row| {
                let data = row
                    .get_text("data")
                    .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
                serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
            })
            .collect()
    }

    pub fn create_announcement(
        &self,
        title: &str,
        content: &str,
    ) -> Result<Announcement, ServiceError> {
        if title.trim().is_empty() || content.trim().is_empty() {
            return Err(ServiceError::Validation(
                "title and content are required".into(),
            ));
        }

        let record = Announcement {
            id: new_id(),
            title: title.trim().to_string(),
            content: content.trim().to_string(),
            created_at: now_rfc3339(),
        };
        let json = serde_json::to_string(&record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.sql
            .exec(
                "INSERT INTO announcements (id, data, created_at) VALUES (?1, ?2, ?3)",
                &[
                    Value::Text(record.id.clone()),
                    Value::Text(json),
                    Value::Text(record.created_at.clone()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(record)
    }

    pub fn delete_announcement(&self, id: &str) -> Result<(), ServiceError> {
        let affected = self
            .sql
            .exec(
                "DELETE FROM announcements WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("announcement {}", id)));
        }
        Ok(())
    }
}
