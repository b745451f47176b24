//! # Battle Development Tools
//!
//! Command-line tools for development:
//! - Data validators for character, constants and encounter files

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod validate;
