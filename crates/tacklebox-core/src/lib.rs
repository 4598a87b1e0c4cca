//! Core types and utilities for tacklebox.
//!
//! This crate provides the foundational types shared by the other tacklebox crates:
//!
//! - **Identifiers**: the strongly-typed [`SubjectId`] carried by session tokens
//!
//! # Example
//!
//! ```
//! use tacklebox_core::SubjectId;
//!
//! let subject = SubjectId::new("kT3sQm9xYbW2").unwrap();
//! assert_eq!(subject.as_str(), "kT3sQm9xYbW2");
//! assert!(SubjectId::new("").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;

pub use ids::{IdError, SubjectId, MAX_SUBJECT_LEN};
