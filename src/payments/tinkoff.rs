use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{PaymentGateway, PaymentLink, PaymentLinkRequest};
use crate::error::{AppError, Result};

pub const DEFAULT_BASE_URL: &str = "https://securepay.tinkoff.ru/v2";

/// The acquirer settles in kopecks; platform amounts are in rubles.
const MINOR_UNIT_SCALE: u64 = 100;

#[derive(Debug, Clone, Serialize)]
pub struct ReceiptItem {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Price")]
    pub price: u64,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    #[serde(rename = "Amount")]
    pub amount: u64,
    #[serde(rename = "Tax")]
    pub tax: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Taxation")]
    pub taxation: String,
    #[serde(rename = "Items")]
    pub items: Vec<ReceiptItem>,
}

#[derive(Debug, Clone, Serialize)]
struct InitRequest {
    #[serde(rename = "TerminalKey")]
    terminal_key: String,
    #[serde(rename = "Amount")]
    amount: u64,
    #[serde(rename = "OrderId")]
    order_id: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "DATA")]
    data: BTreeMap<String, String>,
    #[serde(rename = "Receipt", skip_serializing_if = "Option::is_none")]
    receipt: Option<Receipt>,
    #[serde(rename = "Token")]
    token: String,
}

impl InitRequest {
    /// Scalar fields only. Nested objects and arrays (DATA, Receipt) are
    /// excluded from the signature by the provider's protocol.
    fn token_values(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("TerminalKey".to_string(), self.terminal_key.clone()),
            ("Amount".to_string(), self.amount.to_string()),
            ("OrderId".to_string(), self.order_id.clone()),
            ("Description".to_string(), self.description.clone()),
        ])
    }

    /// Token = sha256 hex over the values of the scalar fields plus the
    /// terminal password, concatenated in lexical key order with no
    /// separator.
    fn sign(&mut self, password: &str) -> String {
        let mut values = self.token_values();
        values.insert("Password".to_string(), password.to_string());

        let mut hasher = Sha256::new();
        for value in values.values() {
            hasher.update(value.as_bytes());
        }

        self.token = hex::encode(hasher.finalize());
        self.token.clone()
    }
}

#[derive(Debug, Deserialize)]
struct InitResponse {
    #[serde(rename = "Success", default)]
    success: bool,
    #[serde(rename = "PaymentId", default)]
    payment_id: String,
    #[serde(rename = "PaymentURL", default)]
    payment_url: String,
    #[serde(rename = "ErrorCode", default)]
    error_code: String,
    #[serde(rename = "Message", default)]
    message: String,
    #[serde(rename = "Details", default)]
    details: String,
}

pub struct TinkoffGateway {
    http: reqwest::Client,
    base_url: String,
}

impl TinkoffGateway {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    fn build_init_request(req: &PaymentLinkRequest) -> InitRequest {
        let amount = req.amount as u64 * MINOR_UNIT_SCALE;

        let mut init = InitRequest {
            terminal_key: req.login.clone(),
            amount,
            order_id: req.order_id.to_string(),
            description: req.description.clone(),
            data: BTreeMap::from([("email".to_string(), req.email.clone())]),
            receipt: None,
            token: String::new(),
        };

        init.sign(&req.password);

        if req.send_receipt {
            init.receipt = Some(Receipt {
                email: req.email.clone(),
                taxation: req
                    .receipt_taxation
                    .clone()
                    .unwrap_or_else(|| "osn".to_string()),
                items: vec![ReceiptItem {
                    name: init.description.clone(),
                    price: amount,
                    amount,
                    quantity: 1,
                    tax: "none".to_string(),
                }],
            });
        }

        init
    }
}

#[async_trait::async_trait]
impl PaymentGateway for TinkoffGateway {
    async fn payment_link(&self, req: &PaymentLinkRequest) -> Result<PaymentLink> {
        let init = Self::build_init_request(req);

        let response = self
            .http
            .post(format!("{}/Init", self.base_url))
            .json(&init)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("tinkoff Init request failed: {}", e)))?;

        let body: InitResponse = response
            .json()
            .await
            .map_err(|e| AppError::Gateway(format!("tinkoff Init response undecodable: {}", e)))?;

        if !body.success {
            tracing::warn!(
                order_id = req.order_id,
                error_code = %body.error_code,
                message = %body.message,
                "tinkoff Init returned non-success"
            );
            let detail = if body.details.is_empty() {
                body.message
            } else {
                body.details
            };
            return Err(AppError::Gateway(detail));
        }

        Ok(PaymentLink {
            payment_url: body.payment_url,
            payment_id: body.payment_id,
            order_id: req.order_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> InitRequest {
        InitRequest {
            terminal_key: "98234234DEMO".to_string(),
            amount: 2500,
            order_id: "101231".to_string(),
            description: "test order".to_string(),
            data: BTreeMap::from([("email".to_string(), "test@example.com".to_string())]),
            receipt: Some(Receipt {
                email: "test@example.com".to_string(),
                taxation: "usn".to_string(),
                items: vec![ReceiptItem {
                    name: "Test Product".to_string(),
                    price: 2500,
                    amount: 2500,
                    quantity: 1,
                    tax: "none".to_string(),
                }],
            }),
            token: String::new(),
        }
    }

    #[test]
    fn token_values_exclude_nested_fields() {
        let req = sample_request();
        let values = req.token_values();

        assert!(!values.contains_key("DATA"));
        assert!(!values.contains_key("Receipt"));
        assert!(!values.contains_key("Token"));
        assert_eq!(values.len(), 4);
    }

    #[test]
    fn sign_is_deterministic_against_known_vector() {
        let mut req = sample_request();
        let token = req.sign("secret-123");

        assert_eq!(
            token,
            "258e262db188f3e6bd13cb7231742392d78de6f4c8dcfdd98f6f11f0f934bdea"
        );
        assert_eq!(req.token, token);
    }

    #[test]
    fn amount_is_scaled_into_kopecks() {
        let link_req = PaymentLinkRequest {
            email: "test@example.com".to_string(),
            phone: "13812345678".to_string(),
            description: "test order".to_string(),
            amount: 2400,
            order_id: 101231,
            login: "98234234DEMO".to_string(),
            password: "secret-123".to_string(),
            send_receipt: true,
            receipt_taxation: None,
        };

        let init = TinkoffGateway::build_init_request(&link_req);

        assert_eq!(init.amount, 240000);
        let receipt = init.receipt.expect("receipt requested");
        assert_eq!(receipt.items[0].price, 240000);
        assert_eq!(receipt.items[0].amount, 240000);
        assert_eq!(receipt.items[0].tax, "none");
    }

    #[test]
    fn receipt_omitted_unless_requested() {
        let link_req = PaymentLinkRequest {
            email: "test@example.com".to_string(),
            phone: String::new(),
            description: "test order".to_string(),
            amount: 100,
            order_id: 1,
            login: "key".to_string(),
            password: "secret".to_string(),
            send_receipt: false,
            receipt_taxation: None,
        };

        let init = TinkoffGateway::build_init_request(&link_req);
        assert!(init.receipt.is_none());
    }
}
