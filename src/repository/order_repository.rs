use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::{
    domain::{NewOrder, Order, OrderCardInfo, OrderError, OrderForProcessing, OrderStatus},
    error::{AppError, Result},
    repository::OrderRepository,
};

#[derive(FromRow)]
struct OrderRow {
    id: i64,
    description: Option<String>,
    price: i64,
    currency: String,
    status: String,
    payment_id: Option<String>,
    error_code: Option<String>,
    error_message: Option<String>,
    error_details: Option<String>,
    card_pan: Option<String>,
    card_expiry: Option<String>,
    integration_id: i64,
    offer_id: i64,
    project_id: i64,
    user_id: i64,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct OrderForProcessingRow {
    id: i64,
    price: i64,
    status: String,
    payment_id: Option<String>,
    offer_id: i64,
    offer_slug: String,
    user_id: i64,
    user_email: String,
}

pub struct SqliteOrderRepository {
    pool: SqlitePool,
}

impl SqliteOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_status(s: &str) -> Result<OrderStatus> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "succeeded" => Ok(OrderStatus::Succeeded),
            "canceled" => Ok(OrderStatus::Canceled),
            "rejected" => Ok(OrderStatus::Rejected),
            "expired" => Ok(OrderStatus::Expired),
            _ => Err(AppError::Database(format!("Invalid order status: {}", s))),
        }
    }

    fn row_to_order(row: OrderRow) -> Result<Order> {
        Ok(Order {
            id: row.id,
            description: row.description,
            price: row.price,
            currency: row.currency,
            status: Self::parse_status(&row.status)?,
            payment_id: row.payment_id,
            error_code: row.error_code,
            error_message: row.error_message,
            error_details: row.error_details,
            card_pan: row.card_pan,
            card_expiry: row.card_expiry,
            integration_id: row.integration_id,
            offer_id: row.offer_id,
            project_id: row.project_id,
            user_id: row.user_id,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    async fn create(&self, order: NewOrder) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO orders (
                description, price, currency, status,
                integration_id, offer_id, project_id, user_id
            ) VALUES (?, ?, ?, 'pending', ?, ?, ?, ?)
            "#,
        )
        .bind(&order.description)
        .bind(order.price)
        .bind(&order.currency)
        .bind(order.integration_id)
        .bind(order.offer_id)
        .bind(order.project_id)
        .bind(order.user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    async fn set_payment_id(&self, order_id: i64, payment_id: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET payment_id = ?, updated_at = datetime('now')
            WHERE id = ? AND payment_id IS NULL
            "#,
        )
        .bind(payment_id)
        .bind(order_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::Database(format!(
                "payment id already set for order {}",
                order_id
            )));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, description, price, currency, status, payment_id,
                   error_code, error_message, error_details,
                   card_pan, card_expiry,
                   integration_id, offer_id, project_id, user_id,
                   created_at, updated_at
            FROM orders
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_order(r)?)),
            None => Ok(None),
        }
    }

    async fn find_for_processing(&self, id: i64) -> Result<Option<OrderForProcessing>> {
        let row = sqlx::query_as::<_, OrderForProcessingRow>(
            r#"
            SELECT o.id, o.price, o.status, o.payment_id, o.offer_id,
                   f.slug AS offer_slug, o.user_id, u.email AS user_email
            FROM orders o
            JOIN offers f ON f.id = o.offer_id
            JOIN users u ON u.id = o.user_id
            WHERE o.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(OrderForProcessing {
                id: r.id,
                price: r.price,
                status: Self::parse_status(&r.status)?,
                payment_id: r.payment_id,
                offer_id: r.offer_id,
                offer_slug: r.offer_slug,
                user_id: r.user_id,
                user_email: r.user_email,
            })),
            None => Ok(None),
        }
    }

    async fn update_status(
        &self,
        id: i64,
        status: OrderStatus,
        error: &OrderError,
        card_info: &OrderCardInfo,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE orders
            SET status = ?,
                error_code = ?,
                error_message = ?,
                error_details = ?,
                card_pan = ?,
                card_expiry = ?,
                updated_at = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(&error.status_code)
        .bind(&error.message)
        .bind(&error.details)
        .bind(&card_info.pan)
        .bind(&card_info.expiry)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
