//! HTTP surface: handlers and middleware

pub mod middleware;
pub mod services;
