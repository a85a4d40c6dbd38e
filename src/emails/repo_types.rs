use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Stored email entry. `email` is unique; `created_at` never changes after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EmailRecord {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub registration_number: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Conditions shared by the export queries and the dashboard counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailFilter {
    pub require_name: bool,
    pub require_registration_number: bool,
    pub email_suffix: Option<String>,
}

impl EmailFilter {
    pub fn matches(&self, record: &EmailRecord) -> bool {
        (!self.require_name || record.name.is_some())
            && (!self.require_registration_number || record.registration_number.is_some())
            && self
                .email_suffix
                .as_deref()
                .map_or(true, |suffix| record.email.ends_with(suffix))
    }
}
