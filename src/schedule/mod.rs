//! Per-block scheduling: speech placement, direction windows and video retiming.
//!
//! Everything here is a pure function of its inputs. The text position cycle is threaded
//! explicitly through [`directions::schedule_directions`].

pub(crate) mod audio;
pub(crate) mod directions;
pub(crate) mod retime;
pub(crate) mod text_cycle;
pub(crate) mod warning;
