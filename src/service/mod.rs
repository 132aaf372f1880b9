pub mod checkout;
pub mod email;

pub use checkout::{CheckoutService, ProcessOfferOutcome, ProcessOfferRequest, WebhookEvent};
pub use email::{EmailSender, NoopMailer, OutgoingEmail, SmtpMailer};
