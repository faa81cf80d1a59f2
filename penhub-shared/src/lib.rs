//! # PenHub Shared Library
//!
//! Domain core of the PenHub publishing backend, used by the API server.
//!
//! ## Module Organization
//!
//! - `models`: database rows and the SQL that reads and writes them
//! - `db`: connection pool, migrations, the `Store` seam and request deadlines
//! - `auth`: passwords, tokens, accounts, ownership rule, Axum token gate
//! - `library`: books, chapters, genres and likes with their lifecycle rules

pub mod auth;
pub mod db;
pub mod library;
pub mod models;

/// Current version of the PenHub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
