//! Client side of the university schedule service: week parity, schedule
//! grouping, save-time reconciliation and the token-refreshing HTTP gateway.
pub mod api;
pub mod error;
pub mod favorites;
pub mod gateway;
pub mod grouping;
pub mod loader;
pub mod models;
pub mod parity;
pub mod reconcile;
pub mod render;
pub mod run_tool;
pub mod session;
