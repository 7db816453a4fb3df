//! Route registration — module routes under /api plus system endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use hostel_core::Module;
use hostel_store::BlobStore;

use crate::auth_middleware::{self, JwtState};

/// Build the complete router with all routes.
pub fn build_router(
    jwt_state: Arc<JwtState>,
    blob: Arc<dyn BlobStore>,
    modules: Vec<Box<dyn Module>>,
) -> Router {
    let system_routes = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    let file_routes = Router::new()
        .route("/files/{*key}", get(serve_file))
        .with_state(blob);

    let mut app: Router<()> = Router::new().merge(system_routes).merge(file_routes);

    // Mount each module under /api/{name}. Module routers carry their own
    // state already.
    for module in &modules {
        app = app.nest(&format!("/api/{}", module.name()), module.routes());
    }

    app.layer(middleware::from_fn_with_state(
        jwt_state,
        auth_middleware::auth_middleware,
    ))
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "hosteld",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Serve an uploaded file by its blob key. The content type was not kept
/// at upload time, so clients get octet-stream and sniff from there.
async fn serve_file(
    State(blob): State<Arc<dyn BlobStore>>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    match blob.get(&key) {
        Ok(Some(bytes)) => (StatusCode::OK, bytes).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "not found").into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}
