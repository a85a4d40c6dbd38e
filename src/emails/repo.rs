use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    emails::repo_types::{EmailFilter, EmailRecord},
    validation::AddEntry,
};

#[async_trait]
pub trait EmailStore: Send + Sync {
    /// Inserts the entry, or updates name/registration number of the existing
    /// record with the same email. Absent optional fields keep their stored value.
    async fn upsert(&self, entry: &AddEntry) -> anyhow::Result<EmailRecord>;
    async fn count(&self, filter: &EmailFilter) -> anyhow::Result<i64>;
    /// Newest first.
    async fn list_page(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<EmailRecord>>;
    /// Oldest first.
    async fn find_all(&self, filter: &EmailFilter) -> anyhow::Result<Vec<EmailRecord>>;
}

#[derive(Clone)]
pub struct PgEmailStore {
    db: PgPool,
}

impl PgEmailStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &EmailFilter) {
    qb.push(" WHERE TRUE");
    if filter.require_name {
        qb.push(" AND name IS NOT NULL");
    }
    if filter.require_registration_number {
        qb.push(" AND registration_number IS NOT NULL");
    }
    if let Some(suffix) = &filter.email_suffix {
        qb.push(" AND right(email, length(")
            .push_bind(suffix.clone())
            .push(")) = ")
            .push_bind(suffix.clone());
    }
}

#[async_trait]
impl EmailStore for PgEmailStore {
    async fn upsert(&self, entry: &AddEntry) -> anyhow::Result<EmailRecord> {
        let record = sqlx::query_as::<_, EmailRecord>(
            r#"
            INSERT INTO emails (email, name, registration_number)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
               SET name = COALESCE(EXCLUDED.name, emails.name),
                   registration_number = COALESCE(EXCLUDED.registration_number, emails.registration_number)
            RETURNING id, email, name, registration_number, created_at
            "#,
        )
        .bind(&entry.email)
        .bind(&entry.name)
        .bind(&entry.registration_number)
        .fetch_one(&self.db)
        .await?;
        Ok(record)
    }

    async fn count(&self, filter: &EmailFilter) -> anyhow::Result<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM emails");
        push_filter(&mut qb, filter);
        let count = qb.build_query_scalar::<i64>().fetch_one(&self.db).await?;
        Ok(count)
    }

    async fn list_page(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<EmailRecord>> {
        let rows = sqlx::query_as::<_, EmailRecord>(
            r#"
            SELECT id, email, name, registration_number, created_at
            FROM emails
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_all(&self, filter: &EmailFilter) -> anyhow::Result<Vec<EmailRecord>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, email, name, registration_number, created_at FROM emails",
        );
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at ASC");
        let rows = qb
            .build_query_as::<EmailRecord>()
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }
}
