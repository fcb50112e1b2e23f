//! Story descriptor model and validation.
//!
//! The descriptor is deserialized as-is from JSON and validated in a separate pass so every
//! structural problem can be reported with its path before scheduling begins.

pub(crate) mod model;
pub(crate) mod validate;
