pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;
use hostel_core::Module;

use service::DeskService;

macro_rules! desk_module {
    ($name:ident, $mount:literal, $router:path) => {
        pub struct $name {
            service: Arc<DeskService>,
        }

        impl $name {
            pub fn new(service: Arc<DeskService>) -> Self {
                Self { service }
            }
        }

        impl Module for $name {
            fn name(&self) -> &str {
                $mount
            }

            fn routes(&self) -> Router {
                $router(self.service.clone())
            }
        }
    };
}

desk_module!(LeaveModule, "leave", api::leave::router);
desk_module!(FeedbackModule, "feedback", api::feedback::router);
desk_module!(MenuModule, "menu", api::menu::router);
desk_module!(RulesModule, "rules", api::rules::router);
desk_module!(AnnouncementModule, "announcements", api::announcements::router);
