//! Infrastructure layer
//!
//! This module contains all external dependencies and infrastructure concerns.
//! It provides the outbound HTTP client and the payment gateway abstraction
//! the services talk to.

pub mod cashfree;
pub mod gateway;
pub mod http_client;
