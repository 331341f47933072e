//! HTTP gateway for Docent.
//!
//! Chat, review, health and trusted-parameter endpoints over one shared state.

pub mod chat_api;
pub mod health_api;
pub mod parameters_api;
pub mod review_api;
pub mod server;

#[cfg(test)]
mod testing;

pub use server::{build_router, start_server, GatewayState};
