//! Cross-platform font resolution with a network-fetch fallback.

pub mod fetch;
pub mod resolver;
