use chrono::{DateTime, Utc};

/// One credential set for an external payment provider. A project is
/// expected to hold at most one active integration per provider type.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PayIntegration {
    pub id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    pub provider_type: String,
    pub login: String,
    pub password: String,
    pub is_active: bool,
    pub send_receipt: bool,
    pub receipt_taxation: Option<String>,
    pub project_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
