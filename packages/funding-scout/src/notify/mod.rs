//! Notifier implementations.

#[cfg(feature = "postmark")]
mod postmark;

#[cfg(feature = "postmark")]
pub use postmark::{PostmarkConfig, PostmarkNotifier};
