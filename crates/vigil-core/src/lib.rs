//! Core types, configuration, and error handling for Vigil.
//!
//! This crate provides the shared foundation used by the review crate and
//! the binary:
//! - [`VigilError`] — unified error type using `thiserror`
//! - [`VigilConfig`] — configuration loaded from `.vigil.toml`
//! - [`CiContext`] — repository, PR number, and token resolved from the CI
//!   environment
//! - Shared types: [`ChangedFile`], [`AnchoredComment`], [`SummaryEntry`]

mod ci;
mod config;
mod error;
mod types;

pub use ci::{pr_number_from_event, CiContext};
pub use config::{LlmConfig, ReviewConfig, VigilConfig};
pub use error::VigilError;
pub use types::{AnchoredComment, ChangedFile, SummaryEntry};

/// A convenience `Result` type for Vigil operations.
pub type Result<T> = std::result::Result<T, VigilError>;
