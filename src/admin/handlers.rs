use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    auth::{extractors::AdminUser, repo_types::User, services::sign_up},
    emails::dto::MessageResponse,
    error::AppError,
    form::FormData,
    state::AppState,
    validation::{validate_add_user, validate_delete_user},
};

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin", get(list_users).post(add_user).delete(delete_user))
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

#[instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<UsersResponse>, AppError> {
    let users = state.users.list().await?;
    Ok(Json(UsersResponse { users }))
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn add_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    form: FormData,
) -> Result<Json<MessageResponse>, AppError> {
    let input = validate_add_user(&form.fields).into_result()?;
    sign_up(state.users.as_ref(), input, false).await?;
    Ok(Json(MessageResponse::new("User added successfully")))
}

#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    form: FormData,
) -> Result<Json<MessageResponse>, AppError> {
    let input = validate_delete_user(&form.fields).into_result()?;
    if !state.users.delete_by_email(&input.email).await? {
        warn!(email = %input.email, "delete target not found");
        return Err(AppError::not_found("User not found"));
    }
    info!(email = %input.email, "user deleted");
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
