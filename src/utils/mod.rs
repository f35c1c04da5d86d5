//! Utility modules shared across the pipeline

pub mod retry;
pub mod url;

pub use self::retry::{RetryPolicy, with_retry};
pub use self::url::UrlUtils;
