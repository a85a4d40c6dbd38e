use axum::{
    extract::{DefaultBodyLimit, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::extractors::AuthUser,
    emails::{
        dto::{DashboardStats, ManagePage, ManageQuery, MessageResponse},
        repo_types::EmailFilter,
        services::{import_csv, upsert_all},
    },
    error::AppError,
    form::FormData,
    state::AppState,
    validation::{validate_add_entry, without_empty},
};

pub const PAGE_SIZE: i64 = 10;
pub const MANAGE_PATH: &str = "/manage";

pub fn email_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route(MANAGE_PATH, get(manage_page).post(manage_action))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
}

#[instrument(skip(state))]
pub async fn dashboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<DashboardStats>, AppError> {
    let emails = state.emails.as_ref();
    let emails_count = emails.count(&EmailFilter::default()).await?;
    let uni_emails_count = emails
        .count(&EmailFilter {
            email_suffix: Some(state.config.uni_domain.clone()),
            ..EmailFilter::default()
        })
        .await?;
    let emails_with_name = emails
        .count(&EmailFilter {
            require_name: true,
            ..EmailFilter::default()
        })
        .await?;
    let emails_with_registration_number = emails
        .count(&EmailFilter {
            require_registration_number: true,
            ..EmailFilter::default()
        })
        .await?;

    let is_admin = state
        .users
        .find_by_id(user_id)
        .await?
        .map(|u| u.is_admin)
        .unwrap_or(false);

    Ok(Json(DashboardStats {
        emails_count,
        uni_emails_count,
        emails_with_name,
        emails_with_registration_number,
        is_admin,
    }))
}

fn pages_count(total: i64) -> i64 {
    (total + PAGE_SIZE - 1) / PAGE_SIZE
}

#[instrument(skip(state))]
pub async fn manage_page(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ManageQuery>,
) -> Result<Response, AppError> {
    let page = match query.page.as_deref().map(str::parse::<i64>) {
        None => 1,
        Some(Ok(page)) => page,
        Some(Err(_)) => return Ok(Redirect::to(MANAGE_PATH).into_response()),
    };

    let total = state.emails.count(&EmailFilter::default()).await?;
    let pages_count = pages_count(total);

    // An empty table still has a first page.
    if page < 1 || page > pages_count.max(1) {
        return Ok(Redirect::to(MANAGE_PATH).into_response());
    }

    let emails = state
        .emails
        .list_page(PAGE_SIZE, (page - 1) * PAGE_SIZE)
        .await?;

    Ok(Json(ManagePage {
        page,
        emails,
        pages_count,
    })
    .into_response())
}

#[instrument(skip(state, form))]
pub async fn manage_action(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    form: FormData,
) -> Result<Json<MessageResponse>, AppError> {
    match form.fields.get("action").map(String::as_str) {
        Some("add") => add_entry(&state, form).await,
        Some("bulkAdd") => bulk_add(&state, form).await,
        other => {
            warn!(action = ?other, "unknown manage action");
            Err(AppError::bad_request("Invalid action"))
        }
    }
}

async fn add_entry(state: &AppState, form: FormData) -> Result<Json<MessageResponse>, AppError> {
    let entry = validate_add_entry(&without_empty(form.fields)).into_result()?;
    upsert_all(state.emails.as_ref(), std::slice::from_ref(&entry)).await?;

    info!(email = %entry.email, "entry upserted");
    Ok(Json(MessageResponse::new("Entry added successfully")))
}

async fn bulk_add(state: &AppState, mut form: FormData) -> Result<Json<MessageResponse>, AppError> {
    let Some(upload) = form.files.remove("file") else {
        return Err(AppError::bad_request("Invalid file"));
    };
    if upload.bytes.is_empty() {
        return Err(AppError::bad_request("Select a file"));
    }

    info!(
        file_name = %upload.file_name,
        content_type = ?upload.content_type,
        size = upload.bytes.len(),
        "bulk import upload"
    );
    let text = String::from_utf8_lossy(&upload.bytes);
    import_csv(state.emails.as_ref(), &text).await?;

    Ok(Json(MessageResponse::new("Entries added successfully")))
}
