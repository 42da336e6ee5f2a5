//! Client side of the AI/build backend: typed requests, one error type, and a
//! retry policy for the calls that are safe to repeat.

pub mod client;
pub mod error;
pub mod fence;
pub mod retry;
#[cfg(test)]
pub(crate) mod scripted;
pub mod wire;

pub use client::{AuthoringBackend, HttpBackend};
pub use error::BackendError;
pub use retry::RetryPolicy;
