//! Shared utility helpers.

pub mod error;
pub(crate) mod math;

pub use error::{HomingError, HomingResult, Missing};
pub use math::angular_error;
