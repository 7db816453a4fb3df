pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;
use hostel_allocation::gate::ProfileGate;
use hostel_core::{Module, ServiceError};

use service::StudentService;

/// Student module — profiles and the documents attached to them.
pub struct StudentModule {
    service: Arc<StudentService>,
}

impl StudentModule {
    pub fn new(service: Arc<StudentService>) -> Self {
        Self { service }
    }
}

impl Module for StudentModule {
    fn name(&self) -> &str {
        "student"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}

/// Lets allocation review flip `can_apply` without depending on this
/// crate. Wired up at startup.
pub struct StudentProfileGate {
    service: Arc<StudentService>,
}

impl StudentProfileGate {
    pub fn new(service: Arc<StudentService>) -> Self {
        Self { service }
    }
}

impl ProfileGate for StudentProfileGate {
    fn set_can_apply(&self, reg_no: &str, can_apply: bool) -> Result<(), ServiceError> {
        self.service.set_can_apply(reg_no, can_apply)
    }
}
