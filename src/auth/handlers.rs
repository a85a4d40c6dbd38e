use axum::{
    extract::{FromRef, State},
    http::header::SET_COOKIE,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tracing::{info, instrument};

use crate::{
    auth::{
        extractors::{CurrentUser, HOME_PATH, SIGN_IN_PATH},
        services::authenticate,
        session::SessionKeys,
    },
    error::AppError,
    form::FormData,
    state::AppState,
    validation::validate_sign_in,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-in", get(sign_in_page).post(sign_in))
        .route("/sign-out", post(sign_out))
}

/// Signed-in users have nothing to do here.
#[instrument(skip_all)]
pub async fn sign_in_page(CurrentUser(user): CurrentUser) -> Response {
    match user {
        Some(_) => Redirect::to(HOME_PATH).into_response(),
        None => Json(Value::Null).into_response(),
    }
}

#[instrument(skip_all)]
pub async fn sign_in(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    form: FormData,
) -> Result<Response, AppError> {
    if current.is_some() {
        return Ok(Redirect::to(HOME_PATH).into_response());
    }

    let input = validate_sign_in(&form.fields).into_result()?;
    let user = authenticate(state.users.as_ref(), input).await?;

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(user.id)?;
    Ok((
        [(SET_COOKIE, keys.session_cookie(&token))],
        Redirect::to(HOME_PATH),
    )
        .into_response())
}

#[instrument(skip_all)]
pub async fn sign_out(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> Response {
    if let Some(user_id) = user {
        info!(%user_id, "user signed out");
    }
    let keys = SessionKeys::from_ref(&state);
    (
        [(SET_COOKIE, keys.cleared_cookie())],
        Redirect::to(SIGN_IN_PATH),
    )
        .into_response()
}
