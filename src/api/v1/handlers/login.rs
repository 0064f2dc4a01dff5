use axum::Json;
use axum::extract::{Path, State};

use crate::api::v1::dto::login::{SaltResponse, TokenRequest, TokenResponse};
use crate::error::AppError;
use crate::state::AppState;

pub async fn salt(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<SaltResponse>, AppError> {
    let salt = state.tokens.salt(&user).await?;
    Ok(Json(SaltResponse { salt }))
}

pub async fn issue_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let out = state
        .tokens
        .issue_token(&req.username, &req.password_hash)
        .await?;

    Ok(Json(TokenResponse {
        token: out.token,
        level: out.level.unwrap_or_default(),
    }))
}
