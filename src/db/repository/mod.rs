//! Repository abstraction.
//!
//! Defines the storage-agnostic trait the service layer programs against,
//! along with the structured error types all implementations share.

pub mod error;
pub mod logs;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use logs::PrayerLogRepository;
