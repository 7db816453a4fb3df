//! HTTP surface for the allocation module.
//!
//! The submission endpoint takes a multipart form because the frontend
//! sends the fee receipt alongside the text fields. Field names are the
//! frontend's camelCase; responses use the stored snake_case shape.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Extension, Json, Router};
use hostel_core::{Claims, ListParams, ListResult, ServiceError};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::model::{Allocation, AllocationStatus};
use crate::service::occupancy::OccupancyGrid;
use crate::service::submit::{ReceiptUpload, SubmitAllocation};
use crate::service::AllocationService;

/// Receipts are image or PDF scans; anything larger is rejected outright.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

type S = Arc<AllocationService>;

pub fn router(service: S) -> Router {
    Router::new()
        .route("/", axum::routing::post(submit).get(list))
        .route("/occupied", get(occupied))
        .route("/grid", get(grid))
        .route("/status", get(status))
        .route("/{id}/status", patch(update_status))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
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
    let record = svc.submit(input)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Applied successfully", "data": record })),
    ))
}

async fn parse_submit(mut multipart: Multipart) -> Result<SubmitAllocation, ServiceError> {
    let mut input = SubmitAllocation {
        email: String::new(),
        name: String::new(),
        reg_no: String::new(),
        department: String::new(),
        fees_status: String::new(),
        hostel: String::new(),
        floor: String::new(),
        room_number: String::new(),
        bed_number: 0,
        receipt: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::Validation(format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "receipt" {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServiceError::Upload(format!("failed to read receipt: {}", e)))?;
            if !bytes.is_empty() {
                input.receipt = Some(ReceiptUpload {
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
            "email" => input.email = text,
            "name" => input.name = text,
            "regNo" => input.reg_no = text,
            "department" => input.department = text,
            "feesStatus" => input.fees_status = text,
            "hostel" => input.hostel = text,
            "floor" => input.floor = text,
            "roomNumber" => input.room_number = text,
            "bedNumber" => {
                input.bed_number = text.trim().parse().map_err(|_| {
                    ServiceError::Validation("bed_number: must be a number".into())
                })?;
            }
            _ => {}
        }
    }

    Ok(input)
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct FloorQuery {
    hostel: String,
    floor: String,
}

async fn occupied(
    State(svc): State<S>,
    Query(q): Query<FloorQuery>,
) -> Result<Json<Value>, ServiceError> {
    let beds = svc.occupied(&q.hostel, &q.floor)?;
    Ok(Json(json!(beds)))
}

async fn grid(
    State(svc): State<S>,
    Query(q): Query<FloorQuery>,
) -> Result<Json<OccupancyGrid>, ServiceError> {
    Ok(Json(svc.grid(&q.hostel, &q.floor)?))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct StatusQuery {
    email: String,
}

async fn status(
    State(svc): State<S>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<StatusQuery>,
) -> Result<Json<Value>, ServiceError> {
    let email = q.email.trim();
    if email.is_empty() {
        return Err(ServiceError::Validation(
            "email query parameter is required".into(),
        ));
    }
    claims.require_self_or_admin(email)?;
    let allocation = svc.status_by_email(email)?;
    Ok(Json(json!({ "allocation": allocation })))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ListQuery {
    status: String,
    limit: Option<usize>,
    offset: Option<usize>,
}

async fn list(
    State(svc): State<S>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<ListQuery>,
) -> Result<Json<ListResult<Allocation>>, ServiceError> {
    claims.require_admin()?;

    let status = match q.status.trim() {
        "" | "all" => None,
        s => Some(AllocationStatus::parse(s).ok_or_else(|| {
            ServiceError::Validation(format!("unknown status {:?}", s))
        })?),
    };
    let mut params = ListParams::default();
    if let Some(limit) = q.limit {
        params.limit = limit;
    }
    if let Some(offset) = q.offset {
        params.offset = offset;
    }

    Ok(Json(svc.list(status, &params)?))
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
) -> Result<Json<Allocation>, ServiceError> {
    claims.require_admin()?;
    let status = AllocationStatus::parse(&req.status)
        .ok_or_else(|| ServiceError::Validation(format!("unknown status {:?}", req.status)))?;
    Ok(Json(svc.update_status(&id, status)?))
}
