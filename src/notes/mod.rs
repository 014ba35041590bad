//! Notes: CRUD, pin/archive, template instantiation, and encryption.

pub mod db;
pub mod encryption;
pub mod handlers;
pub mod types;
