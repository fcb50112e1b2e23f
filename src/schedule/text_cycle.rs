use crate::story::model::Location;

/// Rotation of caption positions for text directions without an explicit location.
///
/// The cycle is a plain value: callers thread it through successive scheduling calls and keep
/// the returned state. Order is top → center → bottom → top; a fresh cycle sits on `Top`, so the
/// first draw yields `Center`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextPositionCycle {
    current: Location,
}

impl Default for TextPositionCycle {
    fn default() -> Self {
        Self {
            current: Location::Top,
        }
    }
}

impl TextPositionCycle {
    /// Fresh cycle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Position the cycle currently sits on.
    pub fn current(self) -> Location {
        self.current
    }

    /// Advance and return the new position together with the advanced cycle.
    #[must_use]
    pub fn advance(self) -> (Location, Self) {
        let next = match self.current {
            Location::Center => Location::Bottom,
            Location::Bottom => Location::Top,
            _ => Location::Center,
        };
        (next, Self { current: next })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/text_cycle.rs"]
mod tests;
