use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    engine::{ProgressSummary, SubmissionOutcome, UnlockStatus},
    error::AppError,
    state,
    utils::{parse_submission, validate_session_id},
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ScorePayload {
    pub session_id: String,
    pub score: i64,
    #[serde(default)]
    pub play_time: i64,
    pub perfect_matches: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: SubmissionOutcome,
}

pub async fn score_handler(
    State(app): State<Arc<state::State>>,
    Json(payload): Json<ScorePayload>,
) -> Result<Json<ScoreResponse>, AppError> {
    let session_id = validate_session_id(&payload.session_id)?;
    let submission = parse_submission(&payload)?;

    let outcome = app.engine.submit_score(session_id, submission).await?;

    Ok(Json(ScoreResponse {
        success: true,
        outcome,
    }))
}

pub async fn progress_handler(
    State(app): State<Arc<state::State>>,
    Path(session_id): Path<String>,
) -> Result<Json<ProgressSummary>, AppError> {
    let session_id = validate_session_id(&session_id)?;

    Ok(Json(app.engine.progress_summary(session_id).await?))
}

pub async fn unlock_status_handler(
    State(app): State<Arc<state::State>>,
    Path((session_id, item_id)): Path<(String, String)>,
) -> Result<Json<UnlockStatus>, AppError> {
    let session_id = validate_session_id(&session_id)?;

    Ok(Json(app.engine.unlock_status(session_id, &item_id).await?))
}
