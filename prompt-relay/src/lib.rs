//! prompt-relay: forwards text prompts to the Gemini API and relays the answer.
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod services;
pub mod startup;

pub use startup::{build_router, AppState, Application};
