//! The allocation submission workflow.
//!
//! A single-flight sequence: validate → upload receipt (optional) →
//! insert. There is no retry and no rollback; a receipt uploaded before a
//! failed insert stays in the blob store and is logged for manual
//! reconciliation.

use hostel_core::{new_id, now_millis, now_rfc3339, ServiceError};
use tracing::warn;

use crate::model::{Allocation, AllocationStatus};
use crate::rooms::{self, Floor, BEDS_PER_ROOM};
use crate::service::AllocationService;

/// An uploaded fee-receipt file. The blob key carries all the identity
/// the workflow needs, so only the bytes are kept.
pub struct ReceiptUpload {
    pub bytes: Vec<u8>,
}

/// Input to [`AllocationService::submit`].
pub struct SubmitAllocation {
    pub email: String,
    pub name: String,
    pub reg_no: String,
    pub department: String,
    pub fees_status: String,
    pub hostel: String,
    pub floor: String,
    pub room_number: String,
    /// 1-based bed number.
    pub bed_number: u32,
    pub receipt: Option<ReceiptUpload>,
}

impl SubmitAllocation {
    /// Field-level validation. Runs before any storage call and reports
    /// every failing field at once.
    fn validate(&self) -> Result<Floor, ServiceError> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("email", &self.email),
            ("name", &self.name),
            ("reg_no", &self.reg_no),
            ("department", &self.department),
            ("fees_status", &self.fees_status),
        ] {
            if value.trim().is_empty() {
                errors.push(format!("{}: required", field));
            }
        }

        if !rooms::is_valid_hostel(&self.hostel) {
            errors.push(format!("hostel: unknown hostel {:?}", self.hostel));
        }

        let floor = Floor::parse(&self.floor);
        if floor.is_none() {
            errors.push(format!("floor: unknown floor {:?}", self.floor));
        }

        if self.bed_number < 1 || self.bed_number > BEDS_PER_ROOM {
            errors.push(format!(
                "bed_number: must be between 1 and {}",
                BEDS_PER_ROOM
            ));
        }

        if let Some(floor) = floor {
            let room = rooms::normalize_room(&self.room_number);
            if !rooms::gen_rooms(floor).contains(&room) {
                errors.push(format!(
                    "room_number: {:?} is not a room on the {} floor",
                    self.room_number,
                    floor.as_str()
                ));
            }
        }

        match floor {
            Some(floor) if errors.is_empty() => Ok(floor),
            _ => Err(ServiceError::Validation(errors.join("; "))),
        }
    }
}

impl AllocationService {
    /// Submit an allocation application.
    ///
    /// The record is inserted with `status = "pending"`; the partial
    /// unique indexes turn a lost bed race or a duplicate application
    /// into a `Conflict`.
    pub fn submit(&self, input: SubmitAllocation) -> Result<Allocation, ServiceError> {
        let floor = input.validate()?;

        let receipt_url = match &input.receipt {
            Some(file) => Some(self.upload_receipt(&input.reg_no, file)?),
            None => None,
        };

        let record = Allocation {
            id: new_id(),
            email: input.email.trim().to_ascii_lowercase(),
            name: input.name.trim().to_string(),
            reg_no: input.reg_no.trim().to_string(),
            department: input.department.trim().to_string(),
            fees_status: input.fees_status.trim().to_string(),
            hostel: input.hostel.clone(),
            floor: floor.as_str().to_string(),
            room_number: rooms::normalize_room(&input.room_number),
            bed_number: input.bed_number,
            receipt_url: receipt_url.clone(),
            status: AllocationStatus::Pending,
            created_at: now_rfc3339(),
        };

        if let Err(e) = self.insert_allocation(&record) {
            if let Some(url) = &receipt_url {
                // Accepted failure mode: the uploaded receipt is orphaned.
                warn!(receipt = %url, "allocation insert failed after receipt upload");
            }
            return Err(e);
        }

        Ok(record)
    }

    /// Upload the receipt under a collision-resistant key and return its
    /// public URL.
    fn upload_receipt(&self, reg_no: &str, file: &ReceiptUpload) -> Result<String, ServiceError> {
        let key = format!("receipts/{}_{}", reg_no.trim(), now_millis());
        self.blob
            .put(&key, &file.bytes)
            .map_err(|e| ServiceError::Upload(format!("receipt upload failed: {}", e)))?;
        Ok(format!("/files/{}", key))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::service::test_support::test_service;

    pub(crate) fn submission(email: &str, room: &str, bed: u32) -> SubmitAllocation {
        SubmitAllocation {
            email: email.into(),
            name: "Student".into(),
            reg_no: "21CS042".into(),
            department: "CSE".into(),
            fees_status: "Paid".into(),
            hostel: "Hostel 1".into(),
            floor: "Ground".into(),
            room_number: room.into(),
            bed_number: bed,
            receipt: None,
        }
    }

    #[test]
    fn submit_inserts_pending_record() {
        let (_dir, svc) = test_service();
        let record = svc.submit(submission("x@y.com", "001", 2)).unwrap();
        assert_eq!(record.status, AllocationStatus::Pending);
        assert_eq!(record.room_number, "001");
        assert_eq!(record.bed_number, 2);
        assert_eq!(record.receipt_url, None);
        assert!(!record.id.is_empty());
    }

    #[test]
    fn submit_with_receipt_stores_file_and_url() {
        let (_dir, svc) = test_service();
        let mut input = submission("x@y.com", "101", 1);
        input.floor = "First".into();
        input.receipt = Some(ReceiptUpload {
            bytes: b"pdf bytes".to_vec(),
        });

        let record = svc.submit(input).unwrap();
        let url = record.receipt_url.expect("receipt_url set");
        assert!(url.starts_with("/files/receipts/21CS042_"));

        let key = url.strip_prefix("/files/").unwrap();
        assert_eq!(svc.blob.get(key).unwrap().unwrap(), b"pdf bytes");
    }

    #[test]
    fn validation_reports_all_failing_fields() {
        let (_dir, svc) = test_service();
        let mut input = submission("", "999", 9);
        input.name = " ".into();
        input.hostel = "Hostel 99".into();

        let err = svc.submit(input).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("email: required"));
        assert!(msg.contains("name: required"));
        assert!(msg.contains("hostel:"));
        assert!(msg.contains("bed_number:"));
        assert!(msg.contains("room_number:"));
    }

    #[test]
    fn unpadded_room_is_normalized() {
        let (_dir, svc) = test_service();
        let record = svc.submit(submission("x@y.com", "1", 1)).unwrap();
        assert_eq!(record.room_number, "001");
    }

    #[test]
    fn wrong_floor_room_is_rejected() {
        let (_dir, svc) = test_service();
        // Room 101 is on the First floor, not Ground.
        let err = svc.submit(submission("x@y.com", "101", 1)).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn same_bed_conflicts() {
        let (_dir, svc) = test_service();
        svc.submit(submission("a@y.com", "001", 2)).unwrap();
        let err = svc.submit(submission("b@y.com", "001", 2)).unwrap_err();
        match err {
            ServiceError::Conflict(msg) => assert!(msg.contains("already taken"), "{}", msg),
            other => panic!("expected Conflict, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_email_conflicts() {
        let (_dir, svc) = test_service();
        svc.submit(submission("a@y.com", "001", 1)).unwrap();
        let err = svc.submit(submission("a@y.com", "002", 1)).unwrap_err();
        match err {
            ServiceError::Conflict(msg) => {
                assert!(msg.contains("a@y.com"), "{}", msg);
            }
            other => panic!("expected Conflict, got {:?}", other),
        }
    }

    #[test]
    fn concurrent_submissions_for_one_bed_yield_one_success() {
        let (_dir, svc) = test_service();
        let mut handles = Vec::new();
        for i in 0..2 {
            let svc = Arc::clone(&svc);
            handles.push(std::thread::spawn(move || {
                svc.submit(submission(&format!("s{}@y.com", i), "007", 3))
            }));
        }

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(ServiceError::Conflict(_))))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(conflicts, 1);
    }
}
