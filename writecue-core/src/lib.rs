//! Likes, comments, and the notifications they cause.

pub mod error;
pub mod gateway;
pub mod interactions;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod notifier;
pub mod store;
