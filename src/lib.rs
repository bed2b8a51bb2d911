//! Title resolution and tag-overlap recommendations over a recording/tag catalog.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use routes::{create_router, AppState};
