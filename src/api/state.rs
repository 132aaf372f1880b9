use std::sync::Arc;

use crate::{repository::OfferRepository, service::CheckoutService};

#[derive(Clone)]
pub struct AppState {
    pub checkout: Arc<CheckoutService>,
    pub offers: Arc<dyn OfferRepository>,
}

impl AppState {
    pub fn new(checkout: Arc<CheckoutService>, offers: Arc<dyn OfferRepository>) -> Self {
        Self { checkout, offers }
    }
}
