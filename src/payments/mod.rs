pub mod prodamus;
pub mod status;
pub mod tinkoff;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AppError, Result};

pub use prodamus::ProdamusGateway;
pub use tinkoff::TinkoffGateway;

/// Everything a provider adapter needs to mint a payment link. Amounts are
/// in the platform's minor units; an adapter re-scales into its provider's
/// own convention if they differ.
#[derive(Debug, Clone)]
pub struct PaymentLinkRequest {
    pub email: String,
    pub phone: String,
    pub description: String,
    pub amount: i64,
    pub order_id: i64,
    pub login: String,
    pub password: String,
    pub send_receipt: bool,
    pub receipt_taxation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PaymentLink {
    pub payment_url: String,
    pub payment_id: String,
    pub order_id: i64,
}

/// Common capability every provider adapter implements. The orchestrator
/// only ever talks to this trait; provider differences end at the
/// registry lookup.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn payment_link(&self, req: &PaymentLinkRequest) -> Result<PaymentLink>;
}

/// Closed set of known provider tags, resolved once from the integration's
/// stored type string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Tinkoff,
    Prodamus,
}

impl ProviderKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "tinkoff" => Some(ProviderKind::Tinkoff),
            "prodamus" => Some(ProviderKind::Prodamus),
            _ => None,
        }
    }
}

/// Fixed lookup from provider kind to adapter instance.
pub struct GatewayRegistry {
    tinkoff: Arc<dyn PaymentGateway>,
    prodamus: Arc<dyn PaymentGateway>,
}

impl GatewayRegistry {
    pub fn new(tinkoff: Arc<dyn PaymentGateway>, prodamus: Arc<dyn PaymentGateway>) -> Self {
        Self { tinkoff, prodamus }
    }

    pub fn select(&self, tag: &str) -> Result<Arc<dyn PaymentGateway>> {
        let kind = ProviderKind::from_tag(tag)
            .ok_or_else(|| AppError::Configuration(format!("Payment system not found: {}", tag)))?;

        Ok(match kind {
            ProviderKind::Tinkoff => self.tinkoff.clone(),
            ProviderKind::Prodamus => self.prodamus.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_resolve() {
        assert_eq!(ProviderKind::from_tag("tinkoff"), Some(ProviderKind::Tinkoff));
        assert_eq!(ProviderKind::from_tag("prodamus"), Some(ProviderKind::Prodamus));
    }

    #[test]
    fn unknown_tag_is_none() {
        assert_eq!(ProviderKind::from_tag("paypal"), None);
        assert_eq!(ProviderKind::from_tag(""), None);
    }
}
