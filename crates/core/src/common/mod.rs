//! Shared constants and error types used across the simulator.

pub mod constants;
pub mod error;

pub use constants::*;
pub use error::ImageError;
