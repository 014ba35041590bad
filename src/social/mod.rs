//! Social layer: public profiles, follows, fireflies, and per-user settings.

pub mod db;
pub mod handlers;
pub mod types;
