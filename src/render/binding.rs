use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::WeaverResult;
use crate::story::model::Palette;
use crate::timeline::model::{PlacedEvent, Timeline};

/// Timeline-wide settings handed to a [`RendererBinding`] before any event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BindingConfig {
    /// Output canvas.
    pub canvas: Canvas,
    /// Frame rate.
    pub fps: Fps,
    /// Story colors.
    pub palette: Palette,
    /// Number of frames in the story.
    pub total_frames: u64,
}

impl BindingConfig {
    /// Settings of `timeline`.
    pub fn of(timeline: &Timeline) -> Self {
        Self {
            canvas: timeline.canvas,
            fps: timeline.fps,
            palette: timeline.palette,
            total_frames: timeline.total_frames,
        }
    }
}

/// Consumer of placed events, e.g. a scene builder for a specific renderer.
///
/// Ordering contract: `place` is called in non-decreasing `window.start` order; events starting on
/// the same frame keep their timeline order.
pub trait RendererBinding {
    /// Called once before any event.
    fn begin(&mut self, cfg: BindingConfig) -> WeaverResult<()>;
    /// Consume one event.
    fn place(&mut self, event: &PlacedEvent) -> WeaverResult<()>;
    /// Called once after the last event.
    fn finish(&mut self) -> WeaverResult<()>;
}

/// Feed every event of `timeline` to `binding`.
#[tracing::instrument(skip_all, fields(events = timeline.events.len()))]
pub fn drive(timeline: &Timeline, binding: &mut dyn RendererBinding) -> WeaverResult<()> {
    let mut order: Vec<&PlacedEvent> = timeline.events.iter().collect();
    order.sort_by_key(|e| e.window.start);

    binding.begin(BindingConfig::of(timeline))?;
    for event in order {
        binding.place(event)?;
    }
    binding.finish()
}

/// Binding that records what it is given. For tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryBinding {
    cfg: Option<BindingConfig>,
    events: Vec<PlacedEvent>,
    finished: bool,
}

impl InMemoryBinding {
    /// Create an empty binding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings captured in `begin`, if any.
    pub fn config(&self) -> Option<BindingConfig> {
        self.cfg
    }

    /// Events in delivery order.
    pub fn events(&self) -> &[PlacedEvent] {
        &self.events
    }

    /// Whether `finish` was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Events that are audible or drawn at `frame`.
    ///
    /// Visuals with an envelope are live while the envelope says they are visible, which includes
    /// their entry and exit animations. Everything else is live inside its window.
    pub fn live_at(&self, frame: FrameIndex) -> Vec<&PlacedEvent> {
        self.events
            .iter()
            .filter(|e| match &e.envelope {
                Some(env) if env.keys.is_empty() => e.window.contains(frame),
                Some(env) => env.sample(frame).visible,
                None => e.window.contains(frame),
            })
            .collect()
    }
}

impl RendererBinding for InMemoryBinding {
    fn begin(&mut self, cfg: BindingConfig) -> WeaverResult<()> {
        self.cfg = Some(cfg);
        self.events.clear();
        self.finished = false;
        Ok(())
    }

    fn place(&mut self, event: &PlacedEvent) -> WeaverResult<()> {
        self.events.push(event.clone());
        Ok(())
    }

    fn finish(&mut self) -> WeaverResult<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/binding.rs"]
mod tests;
