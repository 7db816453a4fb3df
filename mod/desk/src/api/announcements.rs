use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Extension, Json, Router};
use hostel_core::{Claims, ServiceError};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::model::Announcement;
use crate::service::DeskService;

type S = Arc<DeskService>;

pub fn router(service: S) -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", delete(remove))
        .with_state(service)
}

async fn list(State(svc): State<S>) -> Result<Json<Vec<Announcement>>, ServiceError> {
    Ok(Json(svc.list_announcements()?))
}

#[derive(Deserialize)]
struct CreateAnnouncementRequest {
    title: String,
    content: String,
}

async fn create(
    State(svc): State<S>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<Announcement>), ServiceError> {
    claims.require_admin()?;
    let record = svc.create_announcement(&req.title, &req.content)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn remove(
    State(svc): State<S>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ServiceError> {
    claims.require_admin()?;
    svc.delete_announcement(&id)?;
    Ok(Json(json!({ "message": "Deleted" })))
}
