//! HTTP handlers for the prompt relay service.

pub mod health;
pub mod relay;

pub use health::{health_check, readiness_check};
pub use relay::{relay_prompt, RelayRequest, RelayResponse};
