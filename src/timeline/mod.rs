//! Timeline model, assembly and fingerprinting.

pub(crate) mod assembler;
pub(crate) mod fingerprint;
pub(crate) mod model;
