//! Student feedback and complaints.

use hostel_core::{new_id, now_rfc3339, ServiceError};
use hostel_store::Value;

use crate::model::Feedback;
use crate::service::DeskService;

pub struct SubmitFeedback {
    pub name: String,
    pub roll_no: String,
    pub department: String,
    pub room_no: String,
    pub feedback_type: String,
    pub message: String,
    pub urgency: String,
}

impl DeskService {
    pub fn submit_feedback(&self, input: SubmitFeedback) -> Result<Feedback, ServiceError> {
        if input.message.trim().is_empty() {
            return Err(ServiceError::Validation("message: required".into()));
        }

        let record = Feedback {
            id: new_id(),
            name: input.name.trim().to_string(),
            roll_no: input.roll_no.trim().to_string(),
            department: input.department,
            room_no: input.room_no,
            feedback_type: input.feedback_type,
            message: input.message,
            urgency: input.urgency.trim().to_ascii_lowercase(),
            status: "pending".to_string(),
            created_at: now_rfc3339(),
        };

        let json = serde_json::to_string(&record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.sql
            .exec(
                "INSERT INTO feedbacks (id, data, status, urgency, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                &[
                    Value::Text(record.id.clone()),
                    Value::Text(json),
                    Value::Text(record.status.clone()),
                    Value::Text(record.urgency.clone()),
                    Value::Text(record.created_at.clone()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        Ok(record)
    }

    /// List feedback for the admin desk, newest first. A filter value of
    /// `"all"` (or empty) means unfiltered, which is what the dashboard
    /// sends for its default tab.
    pub fn list_feedback(
        &self,
        status: Option<&str>,
        urgency: Option<&str>,
    ) -> Result<Vec<Feedback>, ServiceError> {
        let mut clauses = Vec::new();
        let mut args = Vec::new();
        if let Some(s) = effective_filter(status) {
            args.push(Value::Text(s.to_string()));
            clauses.push(format!("status = ?{}", args.len()));
        }
        if let Some(u) = effective_filter(urgency) {
            args.push(Value::Text(u.to_string()));
            clauses.push(format!("urgency = ?{}", args.len()));
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let rows = self
            .sql
            .query(
                &format!(
                    "SELECT data FROM feedbacks{} ORDER BY created_at DESC",
                    where_sql
                ),
                &args,
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        rows.iter().map(Self::feedback_from_row).collect()
    }

    pub fn update_feedback_status(
        &self,
        id: &str,
        status: &str,
    ) -> Result<Feedback, ServiceError> {
        let status = status.trim().to_ascii_lowercase();
        if status.is_empty() {
            return Err(ServiceError::Validation("status: required".into()));
        }

        let rows = self
            .sql
            .query(
                "SELECT data FROM feedbacks WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("feedback {}", id)))?;
        let mut record = Self::feedback_from_row(row)?;
        record.status = status.clone();

        let json = serde_json::to_string(&record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.sql
            .exec(
                "UPDATE feedbacks SET data = ?1, status = ?2 WHERE id = ?3",
                &[
                    Value::Text(json),
                    Value::Text(status),
                    Value::Text(id.to_string()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        Ok(record)
    }

    pub fn delete_feedback(&self, id: &str) -> Result<(), ServiceError> {
        let affected = self
            .sql
            .exec(
                "DELETE FROM feedbacks WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("feedback {}", id)));
        }
        Ok(())
    }

    fn feedback_from_row(row: &hostel_store::Row) -> Result<Feedback, ServiceError> {
        let data = row
            .get_text("data")
            .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
    }
}

fn effective_filter(value: Option<&str>) -> Option<&str> {
    match value.map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(v) => Some(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::test_service;

    fn feedback(message: &str, urgency: &str) -> SubmitFeedback {
        SubmitFeedback {
            name: "Student".into(),
            roll_no: "21CS042".into(),
            department: "CSE".into(),
            room_no: "101".into(),
            feedback_type: "maintenance".into(),
            message: message.into(),
            urgency: urgency.into(),
        }
    }

    #[test]
    fn submit_starts_pending() {
        let (_dir, svc) = test_service();
        let f = svc.submit_feedback(feedback("fan broken", "high")).unwrap();
        assert_eq!(f.status, "pending");
        assert_eq!(f.urgency, "high");
    }

    #[test]
    fn filters_treat_all_as_unfiltered() {
        let (_dir, svc) = test_service();
        svc.submit_feedback(feedback("fan broken", "high")).unwrap();
        let f = svc.submit_feedback(feedback("tap leaking", "low")).unwrap();
        svc.update_feedback_status(&f.id, "resolved").unwrap();

        assert_eq!(svc.list_feedback(Some("all"), Some("all")).unwrap().len(), 2);
        assert_eq!(svc.list_feedback(Some("pending"), None).unwrap().len(), 1);
        assert_eq!(
            svc.list_feedback(Some("resolved"), Some("low")).unwrap().len(),
            1
        );
        assert!(svc
            .list_feedback(Some("resolved"), Some("high"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn delete_removes_the_record() {
        let (_dir, svc) = test_service();
        let f = svc.submit_feedback(feedback("fan broken", "high")).unwrap();
        svc.delete_feedback(&f.id).unwrap();
        assert!(svc.list_feedback(None, None).unwrap().is_empty());
        assert!(matches!(
            svc.delete_feedback(&f.id).unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }

    #[test]
    fn empty_message_is_rejected() {
        let (_dir, svc) = test_service();
        let err = svc.submit_feedback(feedback("  ", "high")).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
