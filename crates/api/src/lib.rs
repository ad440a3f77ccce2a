//! HTTP API: routing, request/response mapping and process lifecycle.

pub mod app;
pub mod middleware;
pub mod server;
