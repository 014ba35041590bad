//! Marketplace: browsing, listing, and purchasing user-created items.

pub mod db;
pub mod handlers;
pub mod types;
