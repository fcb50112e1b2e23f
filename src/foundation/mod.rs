//! Frame arithmetic, colors and the error taxonomy.

pub(crate) mod core;
pub(crate) mod error;
