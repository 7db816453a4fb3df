use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, patch};
use axum::{Extension, Json, Router};
use hostel_core::{Claims, ServiceError};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::model::Feedback;
use crate::service::feedback::SubmitFeedback;
use crate::service::DeskService;

type S = Arc<DeskService>;

pub fn router(service: S) -> Router {
    Router::new()
        .route("/", get(list).post(submit))
        .route("/{id}/status", patch(update_status))
        .route("/{id}", delete(remove))
        .with_state(service)
}

#[derive(Deserialize)]
pub struct SubmitFeedbackRequest {
    pub name: String,
    pub roll_no: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub room_no: String,
    #[serde(default)]
    pub feedback_type: String,
    pub message: String,
    #[serde(default)]
    pub urgency: String,
}

async fn submit(
    State(svc): State<S>,
    Json(req): Json<SubmitFeedbackRequest>,
) -> Result<(StatusCode, Json<Value>), ServiceError> {
    svc.submit_feedback(SubmitFeedback {
        name: req.name,
        roll_no: req.roll_no,
        department: req.department,
        room_no: req.room_no,
        feedback_type: req.feedback_type,
        message: req.message,
        urgency: req.urgency,
    })?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Feedback submitted successfully" })),
    ))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct FeedbackQuery {
    status: String,
    urgency: String,
}

async fn list(
    State(svc): State<S>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<FeedbackQuery>,
) -> Result<Json<Vec<Feedback>>, ServiceError> {
    claims.require_admin()?;
    Ok(Json(svc.list_feedback(Some(&q.status), Some(&q.urgency))?))
}

#[derive(Deserialize)]
struct UpdateStatusRequest {
    status: String,
}

async fn update_status(
    State(svc): State<S>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, ServiceError> {
    claims.require_admin()?;
    svc.update_feedback_status(&id, &req.status)?;
    Ok(Json(json!({ "message": "Status updated" })))
}

async fn remove(
    State(svc): State<S>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ServiceError> {
    claims.require_admin()?;
    svc.delete_feedback(&id)?;
    Ok(Json(json!({ "message": "Deleted" })))
}
