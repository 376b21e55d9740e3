//! Business logic services
//!
//! This module contains all the business logic of the application.
//! Services validate input, talk to the gateway through the infrastructure
//! layer and classify the results for the handlers.

pub mod health_service;
pub mod order_service;
pub mod status_service;
pub mod webhook_service;
