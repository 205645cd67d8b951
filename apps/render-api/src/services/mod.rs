//! HTTP service handlers.
//!
//! This module contains all the route handlers for the Render API.

pub mod document_service;
pub mod health_service;
pub mod totals_service;
