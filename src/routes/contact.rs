use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::models::ContactInput;
use crate::state::SharedState;

pub async fn submit(
    State(state): State<SharedState>,
    payload: Result<Json<ContactInput>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(input) = payload?;

    let submission = state.workflow.submit(input).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Submission saved successfully",
        "data": submission,
    })))
}

pub async fn list(State(state): State<SharedState>) -> Result<Json<Value>, AppError> {
    let data = state.workflow.list_all().await?;

    Ok(Json(json!({ "success": true, "data": data })))
}
