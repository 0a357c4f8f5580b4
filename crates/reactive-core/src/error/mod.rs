//! Error types for reactive instances
//!
//! Every fallible operation in this crate returns a [`ReactiveResult`].
//! Errors carry plain string payloads so they stay `Clone` and can be handed
//! back to subscribers or logged without borrowing the failing value.

mod constructors;
mod types;

pub use types::{ReactiveError, ReactiveResult};
