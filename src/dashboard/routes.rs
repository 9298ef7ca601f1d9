//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::warn;

use super::view::GameView;
use crate::config::AppConfig;
use crate::engine::runner::Command;
use crate::invite::InviteLink;
use crate::rewards::{RewardError, TaskBoard, TaskView};
use crate::types::Direction;
use crate::withdrawal::{Quote, WithdrawalDesk, WithdrawalReceipt, WithdrawalRequest};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub view: watch::Receiver<GameView>,
    pub commands: mpsc::Sender<Command>,
    pub tasks: Mutex<TaskBoard>,
    pub withdrawals: WithdrawalDesk,
    pub invite: InviteLink,
}

impl DashboardState {
    pub fn new(
        config: &AppConfig,
        view: watch::Receiver<GameView>,
        commands: mpsc::Sender<Command>,
    ) -> Self {
        Self {
            view,
            commands,
            tasks: Mutex::new(TaskBoard::new(config.rewards.tasks.clone())),
            withdrawals: WithdrawalDesk::new(config.withdrawal.clone()),
            invite: InviteLink::from_config(&config.invite),
        }
    }

    async fn send(&self, command: Command) -> Result<(), ApiError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| loop_stopped(command))
    }
}

fn loop_stopped(command: Command) -> ApiError {
    warn!(?command, "Game loop is not running");
    ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "game loop is not running")
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct TaskCompletion {
    pub task_id: String,
    pub reward: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteParams {
    #[serde(default)]
    pub points: u64,
}

/// JSON error body with a status code.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

impl From<RewardError> for ApiError {
    fn from(e: RewardError) -> Self {
        let status = match e {
            RewardError::UnknownTask(_) => StatusCode::NOT_FOUND,
            RewardError::AlreadyCompleted(_) => StatusCode::CONFLICT,
        };
        Self::new(status, e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/state
pub async fn get_state(State(state): State<AppState>) -> Json<GameView> {
    Json(state.view.borrow().clone())
}

/// POST /api/predict/:direction
///
/// Always accepted once queued: whether the round actually starts is the
/// game's call, and a refused prediction is silently dropped.
pub async fn predict(
    State(state): State<AppState>,
    Path(direction): Path<String>,
) -> Result<StatusCode, ApiError> {
    let direction: Direction = direction
        .parse()
        .map_err(|e: crate::types::GameError| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
    state.send(Command::Predict(direction)).await?;
    Ok(StatusCode::ACCEPTED)
}

/// GET /api/tasks
pub async fn get_tasks(State(state): State<AppState>) -> Json<Vec<TaskView>> {
    Json(state.tasks.lock().await.list())
}

/// POST /api/tasks/:id/complete
pub async fn complete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskCompletion>, ApiError> {
    // Hold a channel slot before marking the task done, so a completed task
    // always delivers its grant.
    let permit = state
        .commands
        .reserve()
        .await
        .map_err(|_| loop_stopped(Command::GrantTokens(0)))?;
    let reward = state.tasks.lock().await.complete(&task_id)?;
    permit.send(Command::GrantTokens(reward));
    Ok(Json(TaskCompletion { task_id, reward }))
}

/// GET /api/withdraw/quote?points=N
pub async fn get_quote(
    State(state): State<AppState>,
    Query(params): Query<QuoteParams>,
) -> Json<Quote> {
    Json(state.withdrawals.quote(params.points))
}

/// POST /api/withdraw
pub async fn withdraw(
    State(state): State<AppState>,
    Json(request): Json<WithdrawalRequest>,
) -> Result<Json<WithdrawalReceipt>, ApiError> {
    let available = state.view.borrow().points;
    state
        .withdrawals
        .submit(&request, available)
        .map(Json)
        .map_err(|e| ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
}

/// GET /api/invite
pub async fn get_invite(State(state): State<AppState>) -> Json<InviteLink> {
    Json(state.invite.clone())
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
