//! API error types and HTTP conversion.

pub mod conversion;
pub mod types;

pub use types::ApiError;

/// Convenience alias for handler results.
pub type ApiResult<T> = Result<T, ApiError>;
