//! Seam between the timeline and whatever builds the actual scene.

pub(crate) mod binding;
