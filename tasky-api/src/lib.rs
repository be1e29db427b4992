//! # Tasky API Server Library
//!
//! Core functionality for the Tasky API server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `assets`: External asset host client (avatar storage)
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: HTTP-surface middleware (security headers)
//! - `routes`: API route handlers

pub mod app;
pub mod assets;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
