//! Route configuration, split by API area.

pub mod api_routes;
pub mod chat_routes;
pub mod router;
