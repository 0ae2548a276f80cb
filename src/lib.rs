//! Repair Advisor API
//!
//! This library provides the core functionality for the repair-advisor
//! service: a stateless HTTP endpoint that accepts an authenticated
//! repair-photo analysis request, enforces a per-user daily quota, produces
//! a structured diagnosis via an OpenAI-compatible vision model (or built-in
//! fixtures), and persists the normalized result keyed by job id.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
