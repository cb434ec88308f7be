//! Shared foundational types used across the spc toolchain.
//!
//! This crate provides the content-addressed cache fingerprint type and the
//! target-series model shared by the compiler frontend and the build cache.

#![warn(missing_docs)]

pub mod fingerprint;
pub mod series;

pub use fingerprint::Fingerprint;
pub use series::{parse_target, Series};
