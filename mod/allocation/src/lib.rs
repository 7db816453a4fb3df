pub mod api;
pub mod gate;
pub mod model;
pub mod rooms;
pub mod service;

use std::sync::Arc;

use axum::Router;
use hostel_core::Module;

use service::AllocationService;

/// Allocation module — room/bed applications, occupancy, admin review.
pub struct AllocationModule {
    service: Arc<AllocationService>,
}

impl AllocationModule {
    pub fn new(service: Arc<AllocationService>) -> Self {
        Self { service }
    }
}

impl Module for AllocationModule {
    fn name(&self) -> &str {
        "allocation"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
