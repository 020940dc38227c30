//! Backend Module
//!
//! A minimal Axum development server that answers the health probe the
//! client monitors. It exists so the monitor can be exercised end to end
//! without the full task backend.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - App creation and shared state
//! - **`routes`** - HTTP handlers
//!
//! # Routes
//!
//! - `GET /api/health` - `{"status":"ok","timestamp":...,"uptimeSeconds":...}`

pub mod routes;
pub mod server;
