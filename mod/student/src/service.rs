//! Profile persistence and the uploads that go with it.

use std::sync::Arc;

use hostel_core::{now_millis, ServiceError};
use hostel_store::{sanitize_key_component, BlobStore, SqlStore, Value};
use tracing::warn;

use crate::model::StudentProfile;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS student_profiles (
        user_id    TEXT PRIMARY KEY,
        data       TEXT NOT NULL,
        roll_no    TEXT,
        can_apply  INTEGER NOT NULL DEFAULT 1
    )",
    "CREATE INDEX IF NOT EXISTS idx_profile_roll_no ON student_profiles(roll_no)",
];

/// A file sent along with a profile update. The filename ends up in the
/// blob key so the stored document keeps its extension.
pub struct FileUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Text fields plus optional document uploads. `None` fields leave the
/// stored value untouched.
#[derive(Default)]
pub struct UpsertProfile {
    pub user_id: String,
    pub name: Option<String>,
    pub roll_no: Option<String>,
    pub dob: Option<String>,
    pub blood_group: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub section: Option<String>,
    pub admission_mode: Option<String>,
    pub mobile: Option<String>,
    pub whatsapp: Option<String>,
    pub father_name: Option<String>,
    pub father_contact: Option<String>,
    pub mother_name: Option<String>,
    pub mother_contact: Option<String>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub floor: Option<String>,
    pub room_no: Option<String>,
    pub fee_mode: Option<String>,
    pub passport_photo: Option<FileUpload>,
    pub id_card_photo: Option<FileUpload>,
    pub fees_receipt: Option<FileUpload>,
}

pub struct StudentService {
    sql: Arc<dyn SqlStore>,
    blob: Arc<dyn BlobStore>,
}

impl StudentService {
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

    pub fn get_profile(&self, user_id: &str) -> Result<Option<StudentProfile>, ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM student_profiles WHERE user_id = ?1",
                &[Value::Text(user_id.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        match rows.first().and_then(|r| r.get_text("data")) {
            Some(data) => {
                let profile = serde_json::from_str(data)
                    .map_err(|e| ServiceError::Internal(e.to_string()))?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    /// Create or update a profile. Uploaded documents land under
    /// `student-files/{folder}/` and their public URLs are persisted on
    /// the profile.
    pub fn upsert_profile(&self, input: UpsertProfile) -> Result<StudentProfile, ServiceError> {
        let user_id = input.user_id.trim().to_string();
        if user_id.is_empty() {
            return Err(ServiceError::Validation("user_id: required".into()));
        }

        let mut profile = self
            .get_profile(&user_id)?
            .unwrap_or_else(|| StudentProfile::empty(&user_id));

        merge(&mut profile.name, input.name);
        merge(&mut profile.roll_no, input.roll_no);
        merge(&mut profile.dob, input.dob);
        merge(&mut profile.blood_group, input.blood_group);
        merge(&mut profile.department, input.department);
        merge(&mut profile.year, input.year);
        merge(&mut profile.section, input.section);
        merge(&mut profile.admission_mode, input.admission_mode);
        merge(&mut profile.mobile, input.mobile);
        merge(&mut profile.whatsapp, input.whatsapp);
        merge(&mut profile.father_name, input.father_name);
        merge(&mut profile.father_contact, input.father_contact);
        merge(&mut profile.mother_name, input.mother_name);
        merge(&mut profile.mother_contact, input.mother_contact);
        merge(&mut profile.address, input.address);
        merge(&mut profile.district, input.district);
        merge(&mut profile.floor, input.floor);
        merge(&mut profile.room_no, input.room_no);
        merge(&mut profile.fee_mode, input.fee_mode);

        if let Some(file) = &input.passport_photo {
            profile.passport_photo_url = Some(self.upload(&user_id, "passport", file)?);
        }
        if let Some(file) = &input.id_card_photo {
            profile.id_card_photo_url = Some(self.upload(&user_id, "id_card", file)?);
        }
        if let Some(file) = &input.fees_receipt {
            profile.fees_receipt_url = Some(self.upload(&user_id, "fees", file)?);
        }

        let uploaded_any = input.passport_photo.is_some()
            || input.id_card_photo.is_some()
            || input.fees_receipt.is_some();

        let json = serde_json::to_string(&profile)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        if let Err(e) = self.sql.exec(
            "INSERT INTO student_profiles (user_id, data, roll_no, can_apply)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id) DO UPDATE SET
                 data = excluded.data,
                 roll_no = excluded.roll_no,
                 can_apply = excluded.can_apply",
            &[
                Value::Text(user_id.clone()),
                Value::Text(json),
                match &profile.roll_no {
                    Some(r) => Value::Text(r.clone()),
                    None => Value::Null,
                },
                Value::Integer(profile.can_apply as i64),
            ],
        ) {
            if uploaded_any {
                warn!(%user_id, error = %e, "profile upsert failed; uploaded documents are orphaned");
            }
            return Err(ServiceError::Storage(e.to_string()));
        }

        Ok(profile)
    }

    /// Flip the room-application flag for every profile carrying the roll
    /// number. A roll number with no profile yet is not an error.
    pub fn set_can_apply(&self, roll_no: &str, can_apply: bool) -> Result<(), ServiceError> {
        let rows = self
            .sql
            .query(
                "SELECT user_id, data FROM student_profiles WHERE roll_no = ?1",
                &[Value::Text(roll_no.to_string())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        for row in &rows {
            let data = row
                .get_text("data")
                .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
            let mut profile: StudentProfile = serde_json::from_str(data)
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
            profile.can_apply = can_apply;
            let json = serde_json::to_string(&profile)
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
            self.sql
                .exec(
                    "UPDATE student_profiles SET data = ?1, can_apply = ?2 WHERE user_id = ?3",
                    &[
                        Value::Text(json),
                        Value::Integer(can_apply as i64),
                        Value::Text(profile.user_id.clone()),
                    ],
                )
                .map_err(|e| ServiceError::Storage(e.to_string()))?;
        }
        Ok(())
    }

    fn upload(&self, user_id: &str, folder: &str, file: &FileUpload) -> Result<String, ServiceError> {
        let key = format!(
            "student-files/{}/{}-{}-{}",
            folder,
            user_id,
            now_millis(),
            sanitize_key_component(&file.filename)
        );
        self.blob
            .put(&key, &file.bytes)
            .map_err(|e| ServiceError::Upload(format!("{} upload failed: {}", folder, e)))?;
        Ok(format!("/files/{}", key))
    }
}

fn merge(field: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value {
        *field = Some(v);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use hostel_store::{FsBlobStore, SqliteStore};

    use super::StudentService;

    pub fn test_service() -> (tempfile::TempDir, Arc<StudentService>) {
        let dir = tempfile::tempdir().unwrap();
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        let blob = Arc::new(FsBlobStore::open(dir.path()).unwrap());
        let svc = StudentService::new(sql, blob).unwrap();
        (dir, svc)
    }
}
