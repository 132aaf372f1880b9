use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    domain::{NewOrder, Offer, OrderCardInfo, OrderError, OrderForProcessing, OrderStatus, UpdateContactInfo},
    error::{AppError, Result},
    payments::{status, GatewayRegistry, PaymentLinkRequest},
    repository::{GroupRepository, OfferRepository, OrderRepository, UserRepository},
    service::email::{EmailSender, OutgoingEmail},
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOfferRequest {
    pub selected_pay_method: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub telegram: Option<String>,
    pub instagram: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessOfferOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "redirectURL")]
    pub redirect_url: String,
}

/// Provider-agnostic form of a webhook callback. Each webhook handler
/// parses its provider's body into this before any order logic runs.
#[derive(Debug, Clone, Default)]
pub struct WebhookEvent {
    pub order_id: i64,
    pub status: String,
    pub amount: i64,
    pub payment_id: String,
    pub error_code: String,
    pub message: String,
    pub details: String,
    pub pan: String,
    pub exp_date: String,
}

/// The order orchestrator: creates orders, obtains payment links, and
/// reconciles webhook callbacks into the canonical order lifecycle.
pub struct CheckoutService {
    orders: Arc<dyn OrderRepository>,
    offers: Arc<dyn OfferRepository>,
    groups: Arc<dyn GroupRepository>,
    users: Arc<dyn UserRepository>,
    gateways: GatewayRegistry,
    mailer: Arc<dyn EmailSender>,
}

impl CheckoutService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        offers: Arc<dyn OfferRepository>,
        groups: Arc<dyn GroupRepository>,
        users: Arc<dyn UserRepository>,
        gateways: GatewayRegistry,
        mailer: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            orders,
            offers,
            groups,
            users,
            gateways,
            mailer,
        }
    }

    /// Checkout entry point. Free offers are delivered immediately and
    /// never create an order row; paid offers create a pending order and
    /// return the gateway-issued payment URL.
    pub async fn process_offer(
        &self,
        slug: &str,
        request: ProcessOfferRequest,
    ) -> Result<ProcessOfferOutcome> {
        let offer = self
            .offers
            .find_for_processing(slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Offer not found".to_string()))?;

        tracing::info!(offer_id = offer.id, slug = %slug, "processing offer");

        let user_id = self
            .users
            .upsert_by_email(&request.email, request.first_name.as_deref())
            .await?;

        self.users
            .update_contact(
                user_id,
                &UpdateContactInfo {
                    phone: request.phone.clone(),
                    telegram: request.telegram.clone(),
                    instagram: request.instagram.clone(),
                },
            )
            .await?;

        if offer.is_free {
            self.enroll_user(user_id, &request.email, &offer).await?;
            tracing::info!(user_id, offer_id = offer.id, "enrolled user for free offer");

            return Ok(ProcessOfferOutcome {
                message: offer.success_message.clone(),
                redirect_url: offer.redirect_url.clone().unwrap_or_default(),
            });
        }

        let pay_method = request.selected_pay_method.as_deref().ok_or_else(|| {
            AppError::BadRequest("A payment method must be selected".to_string())
        })?;

        let payment_url = self
            .request_payment_link(&offer, user_id, pay_method, &request)
            .await?;

        Ok(ProcessOfferOutcome {
            message: None,
            redirect_url: payment_url,
        })
    }

    /// Creates the order, asks the selected gateway for a link, and pins
    /// the provider payment id onto the order. On gateway failure the
    /// order stays pending with no payment id; nothing external exists
    /// yet, so the caller may simply retry.
    async fn request_payment_link(
        &self,
        offer: &Offer,
        user_id: i64,
        pay_method: &str,
        request: &ProcessOfferRequest,
    ) -> Result<String> {
        let integration = self
            .offers
            .pay_integration(pay_method, offer.project_id)
            .await?
            .ok_or_else(|| {
                AppError::Configuration(format!("Payment method {} is not available", pay_method))
            })?;

        let gateway = self.gateways.select(&integration.provider_type)?;

        // Price and currency are snapshotted onto the order; later offer
        // edits must not change what this order owes.
        let order_id = self
            .orders
            .create(NewOrder {
                description: Some(offer.name.clone()),
                price: offer.price,
                currency: offer.currency.clone(),
                integration_id: integration.id,
                offer_id: offer.id,
                project_id: offer.project_id,
                user_id,
            })
            .await?;

        let link = gateway
            .payment_link(&PaymentLinkRequest {
                email: request.email.clone(),
                phone: request.phone.clone().unwrap_or_default(),
                description: offer.name.clone(),
                amount: offer.price,
                order_id,
                login: integration.login.clone(),
                password: integration.password.clone(),
                send_receipt: integration.send_receipt,
                receipt_taxation: integration.receipt_taxation.clone(),
            })
            .await?;

        self.orders
            .set_payment_id(order_id, &link.payment_id)
            .await?;

        tracing::info!(
            order_id,
            payment_id = %link.payment_id,
            "created payment link"
        );

        // Best effort only: a failed notification never fails the checkout.
        let email = OutgoingEmail::order_created(
            &offer.name,
            offer.price,
            &offer.currency,
            &link.payment_url,
        );
        if let Err(e) = self.mailer.send(&email, &request.email).await {
            tracing::error!(order_id, user_id, "could not send order created email: {}", e);
        }

        Ok(link.payment_url)
    }

    /// Reconciles one provider callback against the stored order. The
    /// stored payment id and price are authoritative: any mismatch rejects
    /// the webhook with zero mutation. Side effects run only on the
    /// transition into `succeeded`, judged by the status read here before
    /// the write, so redelivered webhooks refresh metadata without
    /// double-enrolling or double-sending.
    pub async fn handle_webhook(&self, event: WebhookEvent) -> Result<()> {
        let order = self
            .orders
            .find_for_processing(event.order_id)
            .await?
            .ok_or_else(|| {
                tracing::error!(order_id = event.order_id, "webhook for unknown order");
                AppError::Validation(format!("Unknown order: {}", event.order_id))
            })?;

        self.validate_webhook(&event, &order)?;

        let reported = status::normalize(&event.status);
        tracing::info!(
            order_id = order.id,
            raw_status = %event.status,
            status = reported.as_str(),
            "got valid order webhook"
        );

        // A terminal order never transitions again; a repeat of the same
        // terminal status still refreshes the audit metadata below.
        let next = if order.status.is_terminal() && reported != order.status {
            tracing::warn!(
                order_id = order.id,
                stored = order.status.as_str(),
                reported = reported.as_str(),
                "ignoring status change for terminal order"
            );
            order.status
        } else {
            reported
        };

        let mut error = OrderError {
            status_code: event.error_code.clone(),
            message: event.message.clone(),
            details: event.details.clone(),
        };
        if error.status_code.is_empty() {
            error.status_code = "0".to_string();
        }

        let card_info = OrderCardInfo {
            pan: event.pan.clone(),
            expiry: event.exp_date.clone(),
        };

        self.orders
            .update_status(order.id, next, &error, &card_info)
            .await?;

        if next == OrderStatus::Succeeded && order.status != OrderStatus::Succeeded {
            self.fulfill_order(&order).await;
        }

        Ok(())
    }

    fn validate_webhook(&self, event: &WebhookEvent, order: &OrderForProcessing) -> Result<()> {
        if order.payment_id.as_deref() != Some(event.payment_id.as_str()) {
            tracing::error!(
                order_id = order.id,
                order_payment_id = ?order.payment_id,
                webhook_payment_id = %event.payment_id,
                "order payment id not equal with webhook payment id"
            );
            return Err(AppError::Validation(
                "Webhook payment id does not match order".to_string(),
            ));
        }

        if order.price != event.amount {
            tracing::error!(
                order_id = order.id,
                order_price = order.price,
                webhook_amount = event.amount,
                "order price not equal with webhook amount"
            );
            return Err(AppError::Validation(
                "Webhook amount does not match order".to_string(),
            ));
        }

        Ok(())
    }

    /// Post-payment side effects. The payment itself already succeeded, so
    /// every step here is best effort: failures are logged with enough
    /// context for manual remediation and never bubble back to the
    /// provider.
    async fn fulfill_order(&self, order: &OrderForProcessing) {
        let offer = match self.offers.find_for_processing(&order.offer_slug).await {
            Ok(Some(offer)) => offer,
            Ok(None) => {
                tracing::error!(
                    order_id = order.id,
                    offer_slug = %order.offer_slug,
                    "could not find offer for succeeded order"
                );
                return;
            }
            Err(e) => {
                tracing::error!(order_id = order.id, "could not load offer for succeeded order: {}", e);
                return;
            }
        };

        if let Err(e) = self
            .enroll_user(order.user_id, &order.user_email, &offer)
            .await
        {
            tracing::error!(
                order_id = order.id,
                user_id = order.user_id,
                "could not enroll user after payment: {}",
                e
            );
        }

        let email = OutgoingEmail::order_completed(&offer.name, offer.price, &offer.currency);
        if let Err(e) = self.mailer.send(&email, &order.user_email).await {
            tracing::error!(
                order_id = order.id,
                user_id = order.user_id,
                "could not send order completed email: {}",
                e
            );
        }
    }

    /// Grants the offer's group memberships and sends the offer-configured
    /// registration email. Shared by the free-offer path and the
    /// post-payment path.
    async fn enroll_user(&self, user_id: i64, user_email: &str, offer: &Offer) -> Result<()> {
        let group_ids = self.offers.group_ids(offer.id).await?;

        self.groups.add_user_to_groups(user_id, &group_ids).await?;

        if offer.send_registration_email {
            let subject = offer
                .registration_email_subject
                .as_deref()
                .unwrap_or(offer.name.as_str());
            let body = offer.registration_email_body.as_deref().unwrap_or_default();

            let email = OutgoingEmail::enrollment(subject, body);
            if let Err(e) = self.mailer.send(&email, user_email).await {
                tracing::error!(
                    user_id,
                    offer_id = offer.id,
                    "could not send enrollment email: {}",
                    e
                );
            }
        }

        Ok(())
    }
}
