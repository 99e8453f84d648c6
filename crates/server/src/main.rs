use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use shared::{
    domain::{Matter, MatterId},
    error::{ApiError, ErrorCode},
    protocol::{CreateMatterRequest, UpdateMatterStatusRequest},
};
use storage::Storage;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use api::ApiContext;
use app_state::AppState;
use config::load_settings;

type HttpResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings()?;
    let database_url = settings.database_url.clone();
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state), settings.max_body_bytes);

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, "matters api listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/api/matters",
            get(http_list_matters).post(http_create_matter),
        )
        .route("/api/matters/:matter_id", get(http_get_matter))
        .route(
            "/api/matters/:matter_id/status",
            put(http_update_matter_status),
        )
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> HttpResult<&'static str> {
    state.api.storage.health_check().await.map_err(|e| {
        warn!(error = %e, "health check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::internal(e.to_string())),
        )
    })?;
    Ok("ok")
}

async fn http_list_matters(State(state): State<Arc<AppState>>) -> HttpResult<Json<Vec<Matter>>> {
    api::list_matters(&state.api)
        .await
        .map(Json)
        .map_err(http_error)
}

async fn http_create_matter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMatterRequest>,
) -> HttpResult<(StatusCode, Json<Matter>)> {
    let matter = api::create_matter(&state.api, req)
        .await
        .map_err(http_error)?;
    Ok((StatusCode::CREATED, Json(matter)))
}

async fn http_get_matter(
    State(state): State<Arc<AppState>>,
    Path(matter_id): Path<i64>,
) -> HttpResult<Json<Matter>> {
    api::get_matter(&state.api, MatterId(matter_id))
        .await
        .map(Json)
        .map_err(http_error)
}

async fn http_update_matter_status(
    State(state): State<Arc<AppState>>,
    Path(matter_id): Path<i64>,
    Json(req): Json<UpdateMatterStatusRequest>,
) -> HttpResult<Json<Matter>> {
    api::update_matter_status(&state.api, MatterId(matter_id), req.status)
        .await
        .map(Json)
        .map_err(http_error)
}

fn http_error(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => {
            error!(message = %err.message, "matters api internal error");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
