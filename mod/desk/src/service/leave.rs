//! Leave permission applications.

use hostel_core::{new_id, now_millis, now_rfc3339, ServiceError};
use hostel_store::{sanitize_key_component, Value};
use tracing::warn;

use crate::model::{LeaveApplication, LeaveStatus};
use crate::service::DeskService;

/// A signature image attached to a leave application. The blob key is
/// derived from the applicant's email, so only the bytes are kept.
pub struct SignatureUpload {
    pub bytes: Vec<u8>,
}

pub struct SubmitLeave {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub roll_number: String,
    pub branch: String,
    pub year: String,
    pub semester: String,
    pub hostel_name: String,
    pub room_number: String,
    pub date_of_stay: String,
    pub time: String,
    pub reason: String,
    pub student_mobile: String,
    pub parent_mobile: String,
    pub informed_advisor: String,
    pub advisor_name: Option<String>,
    pub advisor_mobile: Option<String>,
    pub signature: Option<SignatureUpload>,
}

impl SubmitLeave {
    fn validate(&self) -> Result<(), ServiceError> {
        let required: &[(&str, &str)] = &[
            ("user_id", &self.user_id),
            ("email", &self.email),
            ("name", &self.name),
            ("roll_number", &self.roll_number),
            ("branch", &self.branch),
            ("year", &self.year),
            ("semester", &self.semester),
            ("hostel_name", &self.hostel_name),
            ("room_number", &self.room_number),
            ("date_of_stay", &self.date_of_stay),
            ("time", &self.time),
            ("reason", &self.reason),
            ("student_mobile", &self.student_mobile),
            ("parent_mobile", &self.parent_mobile),
            ("informed_advisor", &self.informed_advisor),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(k, _)| *k)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(format!(
                "required: {}",
                missing.join(", ")
            )))
        }
    }
}

impl DeskService {
    pub fn submit_leave(&self, input: SubmitLeave) -> Result<LeaveApplication, ServiceError> {
        input.validate()?;

        let signature_url = match &input.signature {
            Some(file) => Some(self.upload_signature(&input.email, file)?),
            None => None,
        };

        let record = LeaveApplication {
            id: new_id(),
            user_id: input.user_id.trim().to_string(),
            email: input.email.trim().to_ascii_lowercase(),
            name: input.name.trim().to_string(),
            roll_number: input.roll_number.trim().to_string(),
            branch: input.branch,
            year: input.year,
            semester: input.semester,
            hostel_name: input.hostel_name,
            room_number: input.room_number,
            date_of_stay: input.date_of_stay,
            time: input.time,
            reason: input.reason,
            student_mobile: input.student_mobile,
            parent_mobile: input.parent_mobile,
            informed_advisor: input.informed_advisor,
            advisor_name: input.advisor_name.filter(|s| !s.trim().is_empty()),
            advisor_mobile: input.advisor_mobile.filter(|s| !s.trim().is_empty()),
            student_signature_url: signature_url,
            admin_signature_url: None,
            status: LeaveStatus::Pending,
            created_at: now_rfc3339(),
        };

        let json = serde_json::to_string(&record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        if let Err(e) = self.sql.exec(
            "INSERT INTO leave_applications (id, data, email, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            &[
                Value::Text(record.id.clone()),
                Value::Text(json),
                Value::Text(record.email.clone()),
                Value::Text(record.status.as_str().to_string()),
                Value::Text(record.created_at.clone()),
            ],
        ) {
            if let Some(url) = &record.student_signature_url {
                warn!(%url, error = %e, "leave insert failed; signature blob is orphaned");
            }
            return Err(ServiceError::Storage(e.to_string()));
        }

        Ok(record)
    }

    /// A student's leave history, newest first.
    pub fn leave_history(&self, email: &str) -> Result<Vec<LeaveApplication>, ServiceError> {
        if email.trim().is_empty() {
            return Err(ServiceError::Validation("email: required".into()));
        }
        let rows = self
            .sql
            .query(
                "SELECT data FROM leave_applications WHERE email = ?1
                 ORDER BY created_at DESC",
                &[Value::Text(email.trim().to_ascii_lowercase())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        rows.iter().map(Self::leave_from_row).collect()
    }

    /// All leave applications, newest first, for the admin desk.
    pub fn list_leaves(&self) -> Result<Vec<LeaveApplication>, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM leave_applications ORDER BY created_at DESC",
                &[],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        rows.iter().map(Self::leave_from_row).collect()
    }

    /// Approve or reject an application. The admin's signature URL is
    /// recorded on approval and cleared on rejection.
    pub fn update_leave_status(
        &self,
        id: &str,
        status: LeaveStatus,
        admin_signature_url: Option<String>,
    ) -> Result<LeaveApplication, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM leave_applications WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("leave application {}", id)))?;
        let mut record = Self::leave_from_row(row)?;

        record.status = status;
        record.admin_signature_url = match status {
            LeaveStatus::Approved => admin_signature_url,
            _ => None,
        };

        let json = serde_json::to_string(&record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.sql
            .exec(
                "UPDATE leave_applications SET data = ?1, status = ?2 WHERE id = ?3",
                &[
                    Value::Text(json),
                    Value::Text(status.as_str().to_string()),
                    Value::Text(id.to_string()),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        Ok(record)
    }

    fn upload_signature(
        &self,
        email: &str,
        file: &SignatureUpload,
    ) -> Result<String, ServiceError> {
        // Keyed by the email's local part, like the receipt keys. The
        // local part is user input and must not introduce path segments.
        let local = sanitize_key_component(email.split('@').next().unwrap_or("student").trim());
        let key = format!("signatures/{}_{}", local, now_millis());
        self.blob
            .put(&key, &file.bytes)
            .map_err(|e| ServiceError::Upload(format!("signature upload failed: {}", e)))?;
        Ok(format!("/files/{}", key))
    }

    fn leave_from_row(row: &hostel_store::Row) -> Result<LeaveApplication, ServiceError> {
        let data = row
            .get_text("data")
            .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
    }
}
