pub mod offers;
pub mod root;
pub mod webhooks;
