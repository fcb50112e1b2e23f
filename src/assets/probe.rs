use std::path::Path;

use crate::foundation::error::{WeaverError, WeaverResult};

/// Measures the playable length of a local media file.
pub trait DurationProbe: Send + Sync {
    /// Duration of the file at `path` in seconds.
    fn duration_secs(&self, path: &Path) -> WeaverResult<f64>;
}

/// Probe that asks the system `ffprobe` binary for the container duration.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfprobeProbe;

#[cfg(feature = "media-ffmpeg")]
impl DurationProbe for FfprobeProbe {
    fn duration_secs(&self, path: &Path) -> WeaverResult<f64> {
        #[derive(serde::Deserialize)]
        struct ProbeFormat {
            duration: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct ProbeOut {
            format: ProbeFormat,
        }

        let out = std::process::Command::new("ffprobe")
            .args(["-v", "error", "-print_format", "json", "-show_format"])
            .arg(path)
            .output()
            .map_err(|e| WeaverError::Other(anyhow::anyhow!("failed to run ffprobe: {e}")))?;
        if !out.status.success() {
            return Err(WeaverError::Other(anyhow::anyhow!(
                "ffprobe failed for '{}': {}",
                path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
            .map_err(|e| WeaverError::serde(format!("ffprobe json parse failed: {e}")))?;
        let raw = parsed.format.duration.ok_or_else(|| {
            WeaverError::Other(anyhow::anyhow!(
                "ffprobe reported no duration for '{}'",
                path.display()
            ))
        })?;
        raw.trim().parse::<f64>().map_err(|e| {
            WeaverError::serde(format!("ffprobe duration '{raw}' is not a number: {e}"))
        })
    }
}

#[cfg(not(feature = "media-ffmpeg"))]
impl DurationProbe for FfprobeProbe {
    fn duration_secs(&self, _path: &Path) -> WeaverResult<f64> {
        Err(WeaverError::Other(anyhow::anyhow!(
            "probing media durations requires the 'media-ffmpeg' feature"
        )))
    }
}

/// Returns `true` when `ffprobe` can be spawned.
pub fn is_ffprobe_on_path() -> bool {
    std::process::Command::new("ffprobe")
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
