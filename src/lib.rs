//! orrery: a 3D photo gallery server.
//!
//! A REST API over an embedded SQLite store for image metadata, an upload
//! pipeline that derives full-size and thumbnail encodings from each
//! accepted image, and a pure layout engine that arranges the gallery in
//! 3D (spiral, grid, sphere, wave, web).
//!
//! # Modules
//!
//! - [`config`] - TOML configuration with validation
//! - [`constants`] - Fixed pipeline and server constants
//! - [`model`] - Persisted record types
//! - [`store`] - SQLite metadata store
//! - [`imaging`] - Upload processing and variant derivation
//! - [`layout`] - Placement math and web-mode connections
//! - [`server`] - axum router, handlers, and startup

#![deny(unsafe_code)]

pub mod config;
pub mod constants;
pub mod imaging;
pub mod layout;
pub mod model;
pub mod server;
pub mod store;
