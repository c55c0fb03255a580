//! Shared helpers for integration tests.

pub mod mock_gateway;

#[allow(unused_imports)]
pub use mock_gateway::{MockGateway, tone_wav};
