//! Enter/exit animation envelopes for placed visuals.

pub(crate) mod ease;
pub(crate) mod envelope;
