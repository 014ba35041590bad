//! Tags: CRUD, cloud sizing, autocomplete, and usage statistics.

pub mod db;
pub mod handlers;
pub mod types;
