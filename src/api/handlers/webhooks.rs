use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::{api::state::AppState, error::AppError, service::WebhookEvent};

/// Field names on these bodies are fixed by the providers, not by us.
#[derive(Debug, Deserialize)]
pub struct TinkoffWebhookBody {
    #[serde(rename = "OrderId", default)]
    pub order_id: String,
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "PaymentId", default)]
    pub payment_id: i64,
    #[serde(rename = "Amount", default)]
    pub amount: i64,
    #[serde(rename = "ErrorCode", default)]
    pub error_code: String,
    #[serde(rename = "Message", default)]
    pub message: String,
    #[serde(rename = "Details", default)]
    pub details: String,
    #[serde(rename = "Pan", default)]
    pub pan: String,
    #[serde(rename = "ExpDate", default)]
    pub exp_date: String,
}

#[derive(Debug, Deserialize)]
pub struct ProdamusWebhookBody {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub payment_id: String,
    #[serde(default)]
    pub sum: String,
    #[serde(default)]
    pub payment_status: String,
    #[serde(default)]
    pub payment_status_description: String,
}

/// Providers retry aggressively on anything but 200, so a webhook that
/// fails validation is still answered 200: the order was left untouched
/// and the full payload is already in the logs. Only genuine internal
/// failures earn a 500 (the provider should retry those).
async fn dispatch(state: &AppState, event: WebhookEvent) -> StatusCode {
    match state.checkout.handle_webhook(event).await {
        Ok(()) => StatusCode::OK,
        Err(AppError::Validation(msg)) => {
            tracing::warn!("webhook rejected: {}", msg);
            StatusCode::OK
        }
        Err(e) => {
            tracing::error!("webhook processing failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub async fn tinkoff(
    State(state): State<AppState>,
    Json(body): Json<TinkoffWebhookBody>,
) -> (StatusCode, &'static str) {
    let order_id = match body.order_id.parse::<i64>() {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!(order_id = %body.order_id, "tinkoff webhook with unparsable order id");
            return (StatusCode::OK, "OK");
        }
    };

    let event = WebhookEvent {
        order_id,
        status: body.status,
        amount: body.amount,
        payment_id: body.payment_id.to_string(),
        error_code: body.error_code,
        message: body.message,
        details: body.details,
        pan: body.pan,
        exp_date: body.exp_date,
    };

    let code = dispatch(&state, event).await;
    // The acquirer requires a literal OK body to stop redelivery.
    (code, "OK")
}

pub async fn prodamus(
    State(state): State<AppState>,
    Json(body): Json<ProdamusWebhookBody>,
) -> StatusCode {
    let order_id = match body.order_id.parse::<i64>() {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!(order_id = %body.order_id, "prodamus webhook with unparsable order id");
            return StatusCode::OK;
        }
    };

    // Sums arrive as decimal strings ("2500.00"); orders store whole
    // currency units.
    let amount = match body.sum.parse::<f64>() {
        Ok(v) => v.round() as i64,
        Err(_) => {
            tracing::warn!(order_id, sum = %body.sum, "prodamus webhook with unparsable sum");
            return StatusCode::OK;
        }
    };

    let event = WebhookEvent {
        order_id,
        status: body.payment_status,
        amount,
        payment_id: body.payment_id,
        error_code: String::new(),
        message: body.payment_status_description,
        details: String::new(),
        pan: String::new(),
        exp_date: String::new(),
    };

    dispatch(&state, event).await
}
