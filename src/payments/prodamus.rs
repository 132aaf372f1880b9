use uuid::Uuid;

use super::{PaymentGateway, PaymentLink, PaymentLinkRequest};
use crate::error::{AppError, Result};

/// Redirect-link provider: a GET against the merchant's payform subdomain
/// whose successful response body is the hosted payment URL itself. The
/// provider assigns no payment id, so the adapter mints one locally to keep
/// order bookkeeping uniform.
pub struct ProdamusGateway {
    http: reqwest::Client,
}

impl ProdamusGateway {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn link_url(login: &str) -> String {
        format!("https://{}.payform.ru", login)
    }

    fn query_params(req: &PaymentLinkRequest) -> Vec<(String, String)> {
        vec![
            ("do".to_string(), "link".to_string()),
            ("order_id".to_string(), req.order_id.to_string()),
            ("customer_email".to_string(), req.email.clone()),
            ("customer_phone".to_string(), req.phone.clone()),
            ("products[0][name]".to_string(), req.description.clone()),
            ("products[0][price]".to_string(), req.amount.to_string()),
            ("products[0][quantity]".to_string(), "1".to_string()),
            ("callbackType".to_string(), "json".to_string()),
        ]
    }
}

#[async_trait::async_trait]
impl PaymentGateway for ProdamusGateway {
    async fn payment_link(&self, req: &PaymentLinkRequest) -> Result<PaymentLink> {
        let response = self
            .http
            .get(Self::link_url(&req.login))
            .query(&Self::query_params(req))
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("prodamus link request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Gateway(format!(
                "prodamus link request returned {}",
                response.status()
            )));
        }

        let payment_url = response
            .text()
            .await
            .map_err(|e| AppError::Gateway(format!("prodamus response unreadable: {}", e)))?;

        if payment_url.trim().is_empty() {
            return Err(AppError::Gateway("prodamus returned an empty link".to_string()));
        }

        Ok(PaymentLink {
            payment_url,
            payment_id: Uuid::new_v4().to_string(),
            order_id: req.order_id,
        })
    }
}
