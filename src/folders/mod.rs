//! Folders: hierarchy, favorites, and smart folders with rule-based contents.

pub mod db;
pub mod handlers;
pub mod types;
