//! Chat: direct and group rooms, message history, read tracking, and the
//! live subscription feed.

pub mod db;
pub mod handlers;
pub mod subscription;
pub mod types;
