//! Text sizing and wrapping.
//!
//! The pure algorithms in [`fit`] are generic over a measuring closure so they
//! can be tested without any font on disk; [`engine`] supplies the real
//! Parley-backed measurer.

pub mod engine;
pub mod fit;
