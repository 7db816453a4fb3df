use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Extension, Json, Router};
use hostel_core::{Claims, ServiceError};
use serde_json::{json, Value};

use crate::model::HostelRules;
use crate::service::DeskService;

type S = Arc<DeskService>;

pub fn router(service: S) -> Router {
    Router::new()
        .route("/", get(fetch).put(update))
        .with_state(service)
}

async fn fetch(State(svc): State<S>) -> Result<Json<HostelRules>, ServiceError> {
    Ok(Json(svc.get_rules()?))
}

async fn update(
    State(svc): State<S>,
    Extension(claims): Extension<Claims>,
    Json(rules): Json<HostelRules>,
) -> Result<Json<Value>, ServiceError> {
    claims.require_admin()?;
    let stored = svc.put_rules(rules)?;
    Ok(Json(json!({ "message": "Success", "data": stored })))
}
