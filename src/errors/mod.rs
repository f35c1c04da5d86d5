//! Centralized error handling for relay-scout
//!
//! Errors are split by the stage that produces them so callers can decide
//! between logging and propagation without string matching.
//!
//! # Error Categories
//!
//! - **Probe Failures**: per-probe verdicts carrying a [`ProbeErrorKind`]; never fatal
//! - **Catalog Errors**: missing, empty or unreadable channel catalog
//! - **Source Errors**: candidate discovery (remote list fetch)
//! - **Configuration Errors**: invalid or unparseable settings
//!
//! # Usage
//!
//! ```rust
//! use relay_scout::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("concurrency must be at least 1"))
//! }
//! assert!(example_function().is_err());
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for catalog loading results
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Convenience type alias for candidate source results
pub type SourceResult<T> = Result<T, SourceError>;
