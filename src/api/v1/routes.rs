/*
 * Responsibility
 * - v1 の URL 構成
 * - どのルートを認可ミドルウェアの内側に置くか
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{login::issue_token, login::salt, students::get_student};
use crate::middleware::auth::access;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new().route("/students/{user}", get(get_student));

    Router::new()
        .route("/salt/{user}", get(salt))
        .route("/token", post(issue_token))
        .merge(access::apply(protected, state))
}
