use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use hostel_core::{Claims, ServiceError};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::model::MenuDay;
use crate::service::DeskService;

type S = Arc<DeskService>;

pub fn router(service: S) -> Router {
    Router::new()
        .route("/", get(list))
        .route("/{day}", put(upsert_day))
        .with_state(service)
}

async fn list(State(svc): State<S>) -> Result<Json<Vec<MenuDay>>, ServiceError> {
    Ok(Json(svc.list_menu()?))
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct MenuDayRequest {
    morning: String,
    breakfast: String,
    lunch: String,
    evening: String,
    dinner: String,
}

async fn upsert_day(
    State(svc): State<S>,
    Extension(claims): Extension<Claims>,
    Path(day): Path<String>,
    Json(req): Json<MenuDayRequest>,
) -> Result<Json<Value>, ServiceError> {
    claims.require_admin()?;
    let menu = svc.upsert_menu_day(
        &day,
        MenuDay {
            day: day.clone(),
            morning: req.morning,
            breakfast: req.breakfast,
            lunch: req.lunch,
            evening: req.evening,
            dinner: req.dinner,
        },
    )?;
    Ok(Json(json!({
        "message": format!("Menu for {} updated successfully", menu.day),
        "data": menu,
    })))
}
