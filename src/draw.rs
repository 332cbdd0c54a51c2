//! Decorative paint operations for the overlay surface.

pub mod primitives;
