//! # Coil Warehouse
//!
//! Inventory tracking for steel coils: record arrivals, mark removals, list
//! with range filters, and aggregate window statistics including a daily
//! occupancy series.
//!
//! ## Architecture
//!
//! - [`models`]: the `Coil` entity, range filters and timestamp helpers
//! - [`services`]: the statistics engine, shared by every storage backend
//! - [`db`]: repository trait, in-memory and Postgres backends, factory, service layer
//! - [`http`]: axum REST API (feature `http-server`)
//! - [`api`]: re-exports of the public wire types
//!
//! ## Features
//!
//! - `local-repo` (default): in-memory repository
//! - `postgres-repo`: Diesel + r2d2 Postgres repository with embedded migrations
//! - `http-server` (default): axum router and the `coil-server` binary

pub mod api;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
