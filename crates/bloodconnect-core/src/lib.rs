//! # BloodConnect Core
//!
//! Foundational types shared by the BloodConnect crates.
//!
//! - [`errors`]: Application error type with HTTP response conversion, used by
//!   the reference backend server.
//!
//! # Example
//!
//! ```ignore
//! use bloodconnect_core::errors::AppError;
//!
//! let error = AppError::not_found(anyhow::anyhow!("User not found"));
//! ```

pub mod errors;

pub use errors::AppError;
