//! Authentication: user records, password hashing, and JWT sessions.

pub mod handlers;
pub mod sessions;
pub mod users;

pub use handlers::{get_me, login, logout, register};
