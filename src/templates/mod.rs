//! Note templates: browsing the built-in and marketplace catalogs.

pub mod db;
pub mod handlers;
pub mod types;
