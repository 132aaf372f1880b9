use async_trait::async_trait;

use crate::domain::*;
use crate::error::Result;

pub mod group_repository;
pub mod offer_repository;
pub mod order_repository;
pub mod user_repository;

pub use group_repository::SqliteGroupRepository;
pub use offer_repository::SqliteOfferRepository;
pub use order_repository::SqliteOrderRepository;
pub use user_repository::SqliteUserRepository;

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: NewOrder) -> Result<i64>;
    /// Write-once: fails if the order already carries a payment id.
    async fn set_payment_id(&self, order_id: i64, payment_id: &str) -> Result<()>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Order>>;
    async fn find_for_processing(&self, id: i64) -> Result<Option<OrderForProcessing>>;
    async fn update_status(
        &self,
        id: i64,
        status: OrderStatus,
        error: &OrderError,
        card_info: &OrderCardInfo,
    ) -> Result<()>;
}

#[async_trait]
pub trait OfferRepository: Send + Sync {
    async fn find_summary(&self, slug: &str) -> Result<Option<OfferSummary>>;
    async fn find_for_processing(&self, slug: &str) -> Result<Option<Offer>>;
    async fn group_ids(&self, offer_id: i64) -> Result<Vec<i64>>;
    /// Resolves an active credential set by pay-method name within a project.
    async fn pay_integration(&self, name: &str, project_id: i64)
        -> Result<Option<PayIntegration>>;
}

#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Adds the user to every listed group inside one transaction; existing
    /// memberships are left alone.
    async fn add_user_to_groups(&self, user_id: i64, group_ids: &[i64]) -> Result<()>;
    async fn user_group_ids(&self, user_id: i64) -> Result<Vec<i64>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns the existing user's id when the email is already known.
    async fn upsert_by_email(&self, email: &str, first_name: Option<&str>) -> Result<i64>;
    async fn update_contact(&self, user_id: i64, info: &UpdateContactInfo) -> Result<()>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
}
