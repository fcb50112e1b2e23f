//! Asset collaborators: storage fetch, duration probing, and the prepared duration catalog.

pub(crate) mod catalog;
pub(crate) mod fetch;
pub(crate) mod probe;
