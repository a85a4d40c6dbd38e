//! CSV download endpoints.

use axum::{
    extract::{Query, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::{
    auth::extractors::AuthUser,
    csv,
    emails::repo_types::{EmailFilter, EmailRecord},
    error::AppError,
    state::AppState,
};

pub const CSV_CONTENT_TYPE: &str = "text/csv;charset=UTF-8";

pub fn export_routes() -> Router<AppState> {
    Router::new()
        .route("/api/download/emails", get(download_emails))
        .route("/api/download/emails-with-name", get(download_emails_with_name))
        .route(
            "/api/download/emails-with-filters",
            get(download_emails_with_filters),
        )
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub filters: Option<String>,
}

/// Which optional columns to include and whether to keep only uni addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub name: bool,
    pub registration_number: bool,
    pub uni: bool,
}

impl Selection {
    /// Parses a comma list of `name`, `regNo` and `uni`; other tokens are ignored.
    pub fn parse(filters: Option<&str>) -> Self {
        let mut selection = Selection::default();
        for token in filters.unwrap_or_default().split(',') {
            match token {
                "name" => selection.name = true,
                "regNo" => selection.registration_number = true,
                "uni" => selection.uni = true,
                _ => {}
            }
        }
        selection
    }

    pub fn filter(&self, uni_domain: &str) -> EmailFilter {
        EmailFilter {
            require_name: self.name,
            require_registration_number: self.registration_number,
            email_suffix: self.uni.then(|| format!("@{uni_domain}")),
        }
    }

    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = vec!["email"];
        if self.name {
            columns.push("name");
        }
        if self.registration_number {
            columns.push("registrationNumber");
        }
        columns
    }

    pub fn record(&self, row: EmailRecord) -> csv::Record {
        let mut record = vec![("email".to_string(), row.email)];
        if self.name {
            record.push(("name".to_string(), row.name.unwrap_or_default()));
        }
        if self.registration_number {
            record.push((
                "registrationNumber".to_string(),
                row.registration_number.unwrap_or_default(),
            ));
        }
        record
    }
}

async fn export(state: &AppState, selection: Selection) -> Result<Response, AppError> {
    let rows = state
        .emails
        .find_all(&selection.filter(&state.config.uni_domain))
        .await?;
    let count = rows.len();

    let records: Vec<csv::Record> = rows.into_iter().map(|r| selection.record(r)).collect();
    let body = match csv::encode(&records) {
        Ok(body) => body,
        Err(csv::CsvError::Empty) => selection.columns().join(","),
    };

    info!(count, ?selection, "csv export");
    Ok(([(CONTENT_TYPE, CSV_CONTENT_TYPE)], body).into_response())
}

#[instrument(skip(state))]
pub async fn download_emails(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Response, AppError> {
    export(&state, Selection::default()).await
}

#[instrument(skip(state))]
pub async fn download_emails_with_name(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Response, AppError> {
    let selection = Selection {
        name: true,
        ..Selection::default()
    };
    export(&state, selection).await
}

#[instrument(skip(state))]
pub async fn download_emails_with_filters(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    export(&state, Selection::parse(query.filters.as_deref())).await
}
