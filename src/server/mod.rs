//! Server assembly: configuration, shared state, and startup.

pub mod config;
pub mod init;
pub mod state;

pub use init::create_app;
pub use state::AppState;
