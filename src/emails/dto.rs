use serde::{Deserialize, Serialize};

use crate::emails::repo_types::EmailRecord;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub emails_count: i64,
    pub uni_emails_count: i64,
    pub emails_with_name: i64,
    pub emails_with_registration_number: i64,
    pub is_admin: bool,
}

/// Raw `page` parameter; parsed by the handler so a bad value redirects.
#[derive(Debug, Deserialize)]
pub struct ManageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagePage {
    pub page: i64,
    pub emails: Vec<EmailRecord>,
    pub pages_count: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
