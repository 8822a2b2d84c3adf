//! # dunning-adapter-mail-resend
//!
//! Outbound email through the [Resend](https://resend.com) HTTP API.
//!
//! ## Responsibilities
//! - Implement the `Mailer` port from `dunning-app`
//! - Render the HTML invoice summary sent to customers
//! - Turn every provider or transport failure into a plain
//!   [`DispatchError`](dunning_domain::error::DispatchError) message
//!
//! ## Dependency rule
//! Depends on `dunning-app` (for the port trait) and `dunning-domain`.
//! Nothing else in the workspace knows this adapter exists.

pub mod error;
pub mod mailer;
pub mod template;

pub use error::ResendError;
pub use mailer::{ResendConfig, ResendMailer};
