//! Cloudflare D1 storage over the HTTP query API.

mod adapter;
mod error;
#[cfg(test)]
pub(crate) mod fake;
mod wire;

pub use adapter::{D1Adapter, D1Config, DEFAULT_API_URL};
