//! Status projection: a student's current allocation, read straight from
//! the store.

use hostel_core::ServiceError;
use hostel_store::Value;

use crate::model::Allocation;
use crate::service::AllocationService;

impl AllocationService {
    /// The student's allocation, or None if they have never applied.
    /// Newest record wins if legacy data holds more than one.
    pub fn status_by_email(&self, email: &str) -> Result<Option<Allocation>, ServiceError> {
        if email.trim().is_empty() {
            return Err(ServiceError::Validation("email: required".into()));
        }

        let rows = self
            .sql
            .query(
                "SELECT data FROM allocations WHERE email = ?1
                 ORDER BY created_at DESC LIMIT 1",
                &[Value::Text(email.trim().to_ascii_lowercase())],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        match rows.first() {
            Some(row) => Ok(Some(Self::allocation_from_row(row)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::AllocationStatus;
    use crate::service::submit::SubmitAllocation;
    use crate::service::test_support::test_service;

    #[test]
    fn round_trip_and_admin_transition() {
        let (_dir, svc) = test_service();
        assert_eq!(svc.status_by_email("x@y.com").unwrap(), None);

        let submitted = svc
            .submit(SubmitAllocation {
                email: "X@Y.com".into(),
                name: "Student".into(),
                reg_no: "21CS042".into(),
                department: "CSE".into(),
                fees_status: "Paid".into(),
                hostel: "Hostel 3".into(),
                floor: "Second".into(),
                room_number: "213".into(),
                bed_number: 1,
                receipt: None,
            })
            .unwrap();

        // The projection returns exactly what was submitted, pending, with
        // no receipt URL since no file was attached. Email lookups are
        // case-insensitive because addresses are canonicalized on insert.
        let got = svc.status_by_email("x@y.com").unwrap().unwrap();
        assert_eq!(got, submitted);
        assert_eq!(got.status, AllocationStatus::Pending);
        assert_eq!(got.receipt_url, None);
        assert_eq!(got.hostel, "Hostel 3");
        assert_eq!(got.room_number, "213");

        svc.update_status(&submitted.id, AllocationStatus::Confirmed)
            .unwrap();
        let got = svc.status_by_email("x@y.com").unwrap().unwrap();
        assert_eq!(got.status, AllocationStatus::Confirmed);
    }

    #[test]
    fn empty_email_is_a_validation_error() {
        let (_dir, svc) = test_service();
        assert!(svc.status_by_email("  ").is_err());
    }
}
