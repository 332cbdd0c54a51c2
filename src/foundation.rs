//! Shared building blocks: the crate-wide error type and RGBA color helpers.

pub mod color;
pub mod error;
