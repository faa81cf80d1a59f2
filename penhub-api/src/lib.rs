//! # PenHub API Server Library
//!
//! Router, state and handlers for the PenHub HTTP API. The binary in
//! `main.rs` wires these to PostgreSQL; tests wire them to the in-memory
//! store.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
