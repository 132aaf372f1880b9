use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::{
    domain::{UpdateContactInfo, User},
    error::{AppError, Result},
    repository::UserRepository,
};

#[derive(FromRow)]
struct UserRow {
    id: i64,
    email: String,
    first_name: Option<String>,
    phone: Option<String>,
    telegram: Option<String>,
    instagram: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn upsert_by_email(&self, email: &str, first_name: Option<&str>) -> Result<i64> {
        let existing: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT id FROM users WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some((id,)) = existing {
            return Ok(id);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO users (email, first_name) VALUES (?, ?)
            "#,
        )
        .bind(email)
        .bind(first_name)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    async fn update_contact(&self, user_id: i64, info: &UpdateContactInfo) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET phone = COALESCE(?, phone),
                telegram = COALESCE(?, telegram),
                instagram = COALESCE(?, instagram),
                updated_at = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(&info.phone)
        .bind(&info.telegram)
        .bind(&info.instagram)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, first_name, phone, telegram, instagram,
                   created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map(|r| User {
            id: r.id,
            email: r.email,
            first_name: r.first_name,
            phone: r.phone,
            telegram: r.telegram,
            instagram: r.instagram,
            created_at: DateTime::from_naive_utc_and_offset(r.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(r.updated_at, Utc),
        }))
    }
}
