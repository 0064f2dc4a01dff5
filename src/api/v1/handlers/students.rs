/*
 * Responsibility
 * - GET /students/{user}: パス上のユーザのアカウント概要
 * - 認可ミドルウェアの内側で動く (AuthCtx は必ず存在する)
 */
use axum::{
    Json,
    extract::{Path, State},
};
use tracing::{debug, error};

use crate::api::v1::dto::students::StudentResponse;
use crate::api::v1::extractors::AuthCtxExtractor;
use crate::error::AppError;
use crate::repos::RowLookup;
use crate::state::AppState;

pub async fn get_student(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(user): Path<String>,
) -> Result<Json<StudentResponse>, AppError> {
    debug!(viewer = %ctx.username, owner = %user, "student lookup");

    let row = state
        .store
        .lookup_row(RowLookup::AccountByUsername { username: &user })
        .await
        .map_err(|e| {
            error!(owner = %user, error = %e, "student lookup failed");
            AppError::Internal
        })?
        .ok_or_else(|| AppError::not_found("student"))?;

    Ok(Json(StudentResponse {
        id: row.id,
        username: row.username,
        level: row.access_level,
    }))
}
