use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::{
    error::{AppError, Result},
    repository::GroupRepository,
};

pub struct SqliteGroupRepository {
    pool: SqlitePool,
}

impl SqliteGroupRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for SqliteGroupRepository {
    async fn add_user_to_groups(&self, user_id: i64, group_ids: &[i64]) -> Result<()> {
        // One transaction across all groups: a partial failure must not
        // leave the user enrolled in some groups and not others.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        for group_id in group_ids {
            sqlx::query(
                r#"
                INSERT OR IGNORE INTO group_members (group_id, user_id)
                VALUES (?, ?)
                "#,
            )
            .bind(group_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn user_group_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        let ids: Vec<(i64,)> = sqlx::query_as(
            r#"
            SELECT group_id FROM group_members WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}
