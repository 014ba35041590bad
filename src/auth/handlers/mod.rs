//! Authentication HTTP handlers.

pub mod login;
pub mod me;
pub mod register;
pub mod types;

pub use login::{login, logout};
pub use me::get_me;
pub use register::register;
