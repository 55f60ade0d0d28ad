//! Oracle relay
//!
//! Relays user text to an OpenAI-compatible chat API and tracks
//! long-running image-generation requests as in-memory jobs that clients
//! poll by id.

pub mod app_state;
pub mod bench;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
