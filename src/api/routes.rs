//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::breakdown::{self, BreakdownErrorKind, BreakdownRequest, BreakdownResponse};
use crate::config::Config;
use crate::service::{ServiceError, TodoService};
use crate::task::{SubtaskId, TaskError, TaskId, TaskView};

use super::types::*;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Task store and breakdown gateway
    pub service: TodoService,
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let gateway = breakdown::from_config(&config.breakdown)?;
    match &config.breakdown.api_url {
        Some(url) => tracing::info!("Using remote breakdown service at {}", url),
        None => tracing::info!(
            "No BREAKDOWN_API_URL configured, using keyword breakdown ({}ms delay)",
            config.breakdown.mock_delay.as_millis()
        ),
    }

    let state = Arc::new(AppState {
        config: config.clone(),
        service: TodoService::new(gateway),
    });

    let app = router(Arc::clone(&state));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/breakdown", post(breakdown_title))
        .route("/api/tasks/:id", delete(delete_task))
        .route("/api/tasks/:id/toggle", post(toggle_task))
        .route("/api/tasks/:id/breakdown", post(breakdown_task))
        .route(
            "/api/tasks/:id/subtasks/:subtask_id/toggle",
            post(toggle_subtask),
        );

    let app = if state.config.cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Map a service error to an HTTP status and message.
fn error_response(error: ServiceError) -> (StatusCode, String) {
    let status = match &error {
        ServiceError::Task(TaskError::Validation(_)) => StatusCode::BAD_REQUEST,
        ServiceError::Task(TaskError::NotFound(_))
        | ServiceError::Task(TaskError::SubtaskNotFound { .. }) => StatusCode::NOT_FOUND,
        ServiceError::Task(TaskError::Reserved(_)) => StatusCode::CONFLICT,
        ServiceError::Breakdown(e) if e.kind == BreakdownErrorKind::InvalidInput => {
            StatusCode::BAD_REQUEST
        }
        ServiceError::Breakdown(_) => StatusCode::BAD_GATEWAY,
        ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, error.to_string())
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        breakdown_gateway: state.service.gateway().name().to_string(),
    })
}

/// List all tasks, newest first.
async fn list_tasks(State(state): State<Arc<AppState>>) -> Json<TaskListResponse> {
    Json(state.service.snapshot().await.into())
}

/// Create a task, with explicit subtasks or a breakdown.
async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskView>), (StatusCode, String)> {
    // Explicit subtasks and a requested breakdown are mutually exclusive
    if req.breakdown && !req.subtasks.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "subtasks cannot be given together with breakdown".to_string(),
        ));
    }

    let result = if req.breakdown {
        state.service.add_with_breakdown(&req.title).await
    } else {
        state.service.add_task(&req.title, &req.subtasks).await
    };
    result
        .map(|view| (StatusCode::CREATED, Json(view)))
        .map_err(error_response)
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .service
        .delete_task(TaskId::from(id))
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(error_response)
}

async fn toggle_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskView>, (StatusCode, String)> {
    state
        .service
        .toggle_task(TaskId::from(id))
        .await
        .map(Json)
        .map_err(error_response)
}

async fn toggle_subtask(
    State(state): State<Arc<AppState>>,
    Path((id, subtask_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<TaskView>, (StatusCode, String)> {
    state
        .service
        .toggle_subtask(TaskId::from(id), SubtaskId::from(subtask_id))
        .await
        .map(Json)
        .map_err(error_response)
}

/// Replace an existing task's subtasks with a fresh breakdown.
async fn breakdown_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskView>, (StatusCode, String)> {
    state
        .service
        .breakdown_existing(TaskId::from(id))
        .await
        .map(Json)
        .map_err(error_response)
}

/// Serve the breakdown contract without touching the task list.
async fn breakdown_title(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BreakdownRequest>,
) -> Result<Json<BreakdownResponse>, (StatusCode, String)> {
    state
        .service
        .breakdown(&req.task)
        .await
        .map(|subtasks| Json(BreakdownResponse { subtasks }))
        .map_err(|e| error_response(e.into()))
}
