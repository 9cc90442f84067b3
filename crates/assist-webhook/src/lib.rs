//! # assist-webhook
//!
//! Stripe webhook dispatcher.
//!
//! `POST /stripeWebhook` verifies the `stripe-signature` header against the
//! shared secret, parses the event envelope, and dispatches on the
//! event-type string to one of four handlers. Each handler performs a single
//! atomic multi-document write.
//!
//! Redelivered events are deduplicated: the dispatcher keeps a ledger of
//! processed event ids (with a TTL) in `processedWebhookEvents` and
//! acknowledges replays without writing anything. Unrecognized event types
//! are logged and acknowledged with 200 to prevent redelivery storms.

pub mod dispatcher;
pub mod error;
pub mod event;
pub mod handlers;
pub mod routes;
pub mod signature;

pub use dispatcher::{Outcome, WebhookDispatcher};
pub use error::WebhookError;
pub use event::StripeEvent;
pub use routes::{WebhookState, router};
