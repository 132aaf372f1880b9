use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::{
    domain::{Offer, OfferSummary, PayIntegration},
    error::{AppError, Result},
    repository::OfferRepository,
};

#[derive(FromRow)]
struct OfferRow {
    id: i64,
    name: String,
    slug: String,
    price: i64,
    currency: String,
    is_free: bool,
    project_id: i64,
    send_registration_email: bool,
    registration_email_subject: Option<String>,
    registration_email_body: Option<String>,
    success_message: Option<String>,
    redirect_url: Option<String>,
    is_donate: bool,
    min_donate_price: i64,
    can_use_promocode: bool,
}

#[derive(FromRow)]
struct PayIntegrationRow {
    id: i64,
    name: String,
    r#type: String,
    login: String,
    password: String,
    is_active: bool,
    send_receipt: bool,
    receipt_taxation: Option<String>,
    project_id: i64,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteOfferRepository {
    pool: SqlitePool,
}

impl SqliteOfferRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OfferRepository for SqliteOfferRepository {
    async fn find_summary(&self, slug: &str) -> Result<Option<OfferSummary>> {
        let summary = sqlx::query_as::<_, OfferSummary>(
            r#"
            SELECT name, slug, description, price, currency, is_free,
                   is_donate, min_donate_price, can_use_promocode
            FROM offers
            WHERE slug = ?
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(summary)
    }

    async fn find_for_processing(&self, slug: &str) -> Result<Option<Offer>> {
        let row = sqlx::query_as::<_, OfferRow>(
            r#"
            SELECT id, name, slug, price, currency, is_free, project_id,
                   send_registration_email, registration_email_subject,
                   registration_email_body, success_message, redirect_url,
                   is_donate, min_donate_price, can_use_promocode
            FROM offers
            WHERE slug = ?
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map(|r| Offer {
            id: r.id,
            name: r.name,
            slug: r.slug,
            price: r.price,
            currency: r.currency,
            is_free: r.is_free,
            project_id: r.project_id,
            send_registration_email: r.send_registration_email,
            registration_email_subject: r.registration_email_subject,
            registration_email_body: r.registration_email_body,
            success_message: r.success_message,
            redirect_url: r.redirect_url,
            is_donate: r.is_donate,
            min_donate_price: r.min_donate_price,
            can_use_promocode: r.can_use_promocode,
        }))
    }

    async fn group_ids(&self, offer_id: i64) -> Result<Vec<i64>> {
        let ids: Vec<(i64,)> = sqlx::query_as(
            r#"
            SELECT group_id FROM offer_groups WHERE offer_id = ?
            "#,
        )
        .bind(offer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn pay_integration(
        &self,
        name: &str,
        project_id: i64,
    ) -> Result<Option<PayIntegration>> {
        let row = sqlx::query_as::<_, PayIntegrationRow>(
            r#"
            SELECT id, name, type, login, password, is_active,
                   send_receipt, receipt_taxation, project_id,
                   created_at, updated_at
            FROM pay_integrations
            WHERE name = ? AND project_id = ? AND is_active = 1
            "#,
        )
        .bind(name)
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map(|r| PayIntegration {
            id: r.id,
            name: r.name,
            provider_type: r.r#type,
            login: r.login,
            password: r.password,
            is_active: r.is_active,
            send_receipt: r.send_receipt,
            receipt_taxation: r.receipt_taxation,
            project_id: r.project_id,
            created_at: DateTime::from_naive_utc_and_offset(r.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(r.updated_at, Utc),
        }))
    }
}
