//! HTTP surface for student profiles.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use hostel_core::{Claims, ServiceError};
use serde_json::{json, Value};

use crate::service::{FileUpload, StudentService, UpsertProfile};

/// Same bound as allocation receipts; profile documents are scans too.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

type S = Arc<StudentService>;

pub fn router(service: S) -> Router {
    Router::new()
        .route("/profile/{user_id}", get(profile))
        .route("/update", post(update))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(service)
}

/// The frontend treats "no profile yet" as an empty object, not a 404.
async fn profile(
    State(svc): State<S>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ServiceError> {
    claims.require_subject_or_admin(&user_id)?;
    match svc.get_profile(&user_id)? {
        Some(p) => Ok(Json(json!(p))),
        None => Ok(Json(json!({}))),
    }
}

async fn update(
    State(svc): State<S>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<Json<Value>, ServiceError> {
    let input = parse_update(multipart).await?;
    if input.user_id.trim().is_empty() {
        return Err(ServiceError::Validation("user_id: required".into()));
    }
    claims.require_subject_or_admin(&input.user_id)?;
    svc.upsert_profile(input)?;
    Ok(Json(json!({ "success": true, "message": "Profile Updated" })))
}

async fn parse_update(mut multipart: Multipart) -> Result<UpsertProfile, ServiceError> {
    let mut input = UpsertProfile::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::Validation(format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if matches!(name.as_str(), "passportPhoto" | "idCardPhoto" | "feesReceipt") {
            let filename = field.file_name().unwrap_or("file").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| {
                    ServiceError::Upload(format!("failed to read {}: {}", name, e))
                })?
                .to_vec();
            if bytes.is_empty() {
                continue;
            }
            let file = Some(FileUpload { filename, bytes });
            match name.as_str() {
                "passportPhoto" => input.passport_photo = file,
                "idCardPhoto" => input.id_card_photo = file,
                _ => input.fees_receipt = file,
            }
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| ServiceError::Validation(format!("malformed field {:?}: {}", name, e)))?;
        match name.as_str() {
            "userId" => input.user_id = text,
            "name" => input.name = Some(text),
            "rollNo" => input.roll_no = Some(text),
            "dob" => input.dob = Some(text),
            "bloodGroup" => input.blood_group = Some(text),
            "department" => input.department = Some(text),
            "year" => input.year = Some(text),
            "section" => input.section = Some(text),
            "admissionMode" => input.admission_mode = Some(text),
            "mobile" => input.mobile = Some(text),
            "whatsapp" => input.whatsapp = Some(text),
            "fatherName" => input.father_name = Some(text),
            "fatherContact" => input.father_contact = Some(text),
            "motherName" => input.mother_name = Some(text),
            "motherContact" => input.mother_contact = Some(text),
            "address" => input.address = Some(text),
            "district" => input.district = Some(text),
            "floor" => input.floor = Some(text),
            "roomNo" => input.room_no = Some(text),
            "feeMode" => input.fee_mode = Some(text),
            _ => {}
        }
    }

    Ok(input)
}
