//! A notes REST API: five CRUD operations over a single PostgreSQL table,
//! served with axum.

pub mod adapters;
pub mod config;
pub mod core;
pub mod service;
pub mod storage;
pub mod telemetry;
pub mod transport;
