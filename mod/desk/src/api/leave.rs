use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Extension, Json, Router};
use hostel_core::{Claims, ServiceError};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::model::{LeaveApplication, LeaveStatus};
use crate::service::leave::{SignatureUpload, SubmitLeave};
use crate::service::DeskService;

type S = Arc<DeskService>;

pub fn router(service: S) -> Router {
    Router::new()
        .route("/", axum::routing::post(submit).get(history))
        .route("/{id}/status", patch(update_status))
        .layer(DefaultBodyLimit::max(super::MAX_UPLOAD_BYTES))
        .with_state(service)
}

async fn submit(
    State(svc): State<S>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ServiceError> {
    let input = parse_submit(multipart).await?;
    if !input.email.trim().is_empty() {
        claims.require_self_or_admin(&input.email)?;
    }
    let record = svc.submit_leave(input)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Leave application submitted successfully",
            "leave": record,
        })),
    ))
}

async fn parse_submit(mut multipart: Multipart) -> Result<SubmitLeave, ServiceError> {
    let mut input = SubmitLeave {
        user_id: String::new(),
        email: String::new(),
        name: String::new(),
        roll_number: String::new(),
        branch: String::new(),
        year: String::new(),
        semester: String::new(),
        hostel_name: String::new(),
        room_number: String::new(),
        date_of_stay: String::new(),
        time: String::new(),
        reason: String::new(),
        student_mobile: String::new(),
        parent_mobile: String::new(),
        informed_advisor: String::new(),
        advisor_name: None,
        advisor_mobile: None,
        signature: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::Validation(format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "studentSignature" {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServiceError::Upload(format!("failed to read signature: {}", e)))?;
            if !bytes.is_empty() {
                input.signature = Some(SignatureUpload {
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| ServiceError::Validation(format!("malformed field {:?}: {}", name, e)))?;
        match name.as_str() {
            "userId" => input.user_id = text,
            "email" => input.email = text,
            "name" => input.name = text,
            "rollNumber" => input.roll_number = text,
            "branch" => input.branch = text,
            "year" => input.year = text,
            "semester" => input.semester = text,
            "hostelName" => input.hostel_name = text,
            "roomNumber" => input.room_number = text,
            "date" => input.date_of_stay = text,
            "time" => input.time = text,
            "reason" => input.reason = text,
            "studentMobile" => input.student_mobile = text,
            "parentMobile" => input.parent_mobile = text,
            "informedAdvisor" => input.informed_advisor = text,
            "advisorName" => input.advisor_name = Some(text),
            "advisorMobile" => input.advisor_mobile = Some(text),
            _ => {}
        }
    }

    Ok(input)
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct HistoryQuery {
    email: String,
}

/// A student's own history by email; admins without an email filter get
/// every application.
async fn history(
    State(svc): State<S>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Value>, ServiceError> {
    let email = q.email.trim();
    if email.is_empty() {
        claims.require_admin()?;
        let history = svc.list_leaves()?;
        return Ok(Json(json!({ "history": history })));
    }
    claims.require_self_or_admin(email)?;
    let history = svc.leave_history(email)?;
    Ok(Json(json!({ "history": history })))
}

#[derive(Deserialize)]
struct UpdateLeaveRequest {
    status: String,
    #[serde(default)]
    admin_signature_url: Option<String>,
}

async fn update_status(
    State(svc): State<S>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<UpdateLeaveRequest>,
) -> Result<Json<LeaveApplication>, ServiceError> {
    claims.require_admin()?;
    let status = LeaveStatus::parse(&req.status)
        .ok_or_else(|| ServiceError::Validation(format!("unknown status {:?}", req.status)))?;
    Ok(Json(svc.update_leave_status(&id, status, req.admin_signature_url)?))
}
