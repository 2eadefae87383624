//! Value Control SDK core types and shared utilities.

pub mod context;
pub mod error;

pub use error::{Result, ValueSdkError};
