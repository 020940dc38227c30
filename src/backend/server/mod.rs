//! Server Module
//!
//! Initialization of the Axum dev server.
//!
//! - **`state`** - `AppState` shared with handlers
//! - **`init`** - Router assembly (`create_app`)

pub mod init;
pub mod state;

pub use init::create_app;
pub use state::AppState;
