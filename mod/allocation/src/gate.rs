//! Pluggable hook into the student-profile module.
//!
//! Confirming an allocation flips the student's `can_apply` flag. The
//! allocation module does not depend on the student module; the concrete
//! implementation is injected at startup.

use hostel_core::ServiceError;

/// Called by admin review after an allocation status change.
pub trait ProfileGate: Send + Sync {
    /// Set whether the student (keyed by registration number) may submit
    /// new allocation applications.
    fn set_can_apply(&self, reg_no: &str, can_apply: bool) -> Result<(), ServiceError>;
}

/// A no-op gate for tests and standalone deployments.
pub struct NoProfileGate;

impl ProfileGate for NoProfileGate {
    fn set_can_apply(&self, _reg_no: &str, _can_apply: bool) -> Result<(), ServiceError> {
        Ok(())
    }
}
