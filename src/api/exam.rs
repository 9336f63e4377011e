//! Exam endpoints: start an attempt, submit an answer.

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use super::ServiceResponse;
use crate::error::{Error, Result};
use crate::models::AnswerView;
use crate::services::{completion, completion::SubmitAnswerRequest, lifecycle};
use crate::AppState;

/// POST /api/v1/exam/start request. `exam_id` is the attempt id.
#[derive(Debug, Deserialize)]
pub struct StartExamRequest {
    pub student_id: i64,
    pub exam_id: i64,
}

/// POST /api/v1/exam/start
///
/// Moves the attempt (and parents) to IN_PROGRESS and returns its question
/// list, materializing it first when needed.
pub async fn start_exam(
    State(state): State<AppState>,
    payload: std::result::Result<Json<StartExamRequest>, JsonRejection>,
) -> Result<Json<ServiceResponse<Vec<AnswerView>>>> {
    let Json(req) = payload.map_err(|e| Error::Validation(e.body_text()))?;
    let questions = lifecycle::start_attempt(&state.db, req.exam_id, req.student_id).await?;
    Ok(Json(ServiceResponse::success("Exam started", questions)))
}

/// POST /api/v1/exam/answer
///
/// Records one answer; the final answer of an attempt triggers the
/// completion rollup before this returns.
pub async fn submit_answer(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SubmitAnswerRequest>, JsonRejection>,
) -> Result<Json<ServiceResponse<()>>> {
    let Json(req) = payload.map_err(|e| Error::Validation(e.body_text()))?;
    completion::submit_answer(&state.db, &req).await?;
    Ok(Json(ServiceResponse::success_empty()))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/exam/start", post(start_exam))
        .route("/exam/answer", post(submit_answer))
}
