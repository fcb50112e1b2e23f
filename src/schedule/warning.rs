use std::fmt;

/// Recoverable scheduling problem. The affected item is dropped (or placed raw) and synthesis
/// continues.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SchedulingWarning {
    /// Block the warning belongs to.
    pub block: String,
    /// Direction index within the block, when the warning concerns a direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<usize>,
    /// What went wrong.
    pub kind: WarningKind,
}

/// Warning categories.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningKind {
    /// The tag frame is at or past the end of the block audio, leaving no visible window.
    WindowCollapsed {
        /// Frame the tag resolved to.
        tag_frame: u64,
        /// Exclusive end of the block audio.
        audio_end: u64,
    },
    /// A transcript segment spans zero frames and was skipped.
    EmptySegment {
        /// Segment id.
        segment: String,
    },
    /// A video could not be retimed and was placed unretimed.
    RetimeFallback {
        /// Retimer error message.
        reason: String,
    },
}

impl fmt::Display for SchedulingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block '{}'", self.block)?;
        if let Some(d) = self.direction {
            write!(f, " direction {d}")?;
        }
        match &self.kind {
            WarningKind::WindowCollapsed {
                tag_frame,
                audio_end,
            } => write!(
                f,
                ": tag frame {tag_frame} is not before audio end {audio_end}; direction dropped"
            ),
            WarningKind::EmptySegment { segment } => {
                write!(f, ": segment '{segment}' spans zero frames; skipped")
            }
            WarningKind::RetimeFallback { reason } => {
                write!(f, ": placed video unretimed ({reason})")
            }
        }
    }
}
