use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical payment outcome vocabulary. Provider-specific status strings
/// are translated into this set at the webhook boundary and never leak
/// past it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Succeeded,
    Canceled,
    Rejected,
    Expired,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Succeeded => "succeeded",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub description: Option<String>,
    pub price: i64,
    pub currency: String,
    pub status: OrderStatus,
    pub payment_id: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub error_details: Option<String>,
    pub card_pan: Option<String>,
    pub card_expiry: Option<String>,
    pub integration_id: i64,
    pub offer_id: i64,
    pub project_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The slice of an order the webhook path works with, joined with the
/// offer slug and the buyer's email so side effects need no extra lookups.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderForProcessing {
    pub id: i64,
    pub price: i64,
    pub status: OrderStatus,
    pub payment_id: Option<String>,
    pub offer_id: i64,
    pub offer_slug: String,
    pub user_id: i64,
    pub user_email: String,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub description: Option<String>,
    pub price: i64,
    pub currency: String,
    pub integration_id: i64,
    pub offer_id: i64,
    pub project_id: i64,
    pub user_id: i64,
}

/// Structured provider error detail, persisted verbatim for audit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderError {
    pub status_code: String,
    pub message: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderCardInfo {
    pub pan: String,
    pub expiry: String,
}
