//! HTTP and WebSocket API.

pub mod document;
pub mod health;
pub mod ws;
