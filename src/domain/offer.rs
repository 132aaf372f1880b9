use serde::{Deserialize, Serialize};

/// Everything the checkout path needs to know about an offer. Loaded by
/// slug; the price here is copied onto the order at creation time so later
/// offer edits never change what an existing order owes.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Offer {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub price: i64,
    pub currency: String,
    pub is_free: bool,
    pub project_id: i64,
    pub send_registration_email: bool,
    pub registration_email_subject: Option<String>,
    pub registration_email_body: Option<String>,
    pub success_message: Option<String>,
    pub redirect_url: Option<String>,
    pub is_donate: bool,
    pub min_donate_price: i64,
    pub can_use_promocode: bool,
}

/// Public view of an offer for the registration page.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OfferSummary {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: i64,
    pub currency: String,
    pub is_free: bool,
    pub is_donate: bool,
    pub min_donate_price: i64,
    pub can_use_promocode: bool,
}
