use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rayon::prelude::*;

use crate::assets::fetch::AssetFetcher;
use crate::assets::probe::DurationProbe;
use crate::foundation::error::{WeaverError, WeaverResult};
use crate::story::model::StoryDescriptor;

/// Front-loaded asset durations keyed by storage key.
///
/// Synthesis never performs IO: every duration it needs must be present here before it starts.
/// Serialized form is a plain JSON object `{ "<key>": seconds }`.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AssetCatalog {
    durations: BTreeMap<String, f64>,
}

impl AssetCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog from `(key, seconds)` pairs.
    pub fn from_durations<K: Into<String>>(pairs: impl IntoIterator<Item = (K, f64)>) -> Self {
        Self {
            durations: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Record the duration of `key`.
    pub fn insert(&mut self, key: impl Into<String>, secs: f64) {
        self.durations.insert(key.into(), secs);
    }

    /// Duration of `key` in seconds.
    pub fn duration_secs(&self, key: &str) -> Option<f64> {
        self.durations.get(key).copied()
    }

    /// Number of known assets.
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    /// Whether no durations are known.
    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// Parse a duration manifest from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> WeaverResult<Self> {
        let catalog: Self = serde_json::from_reader(r)
            .map_err(|e| WeaverError::serde(format!("parse duration manifest JSON: {e}")))?;
        for (key, secs) in &catalog.durations {
            if !secs.is_finite() || *secs < 0.0 {
                return Err(WeaverError::schema(format!(
                    "manifest duration for '{key}' must be finite and >= 0"
                )));
            }
        }
        Ok(catalog)
    }

    /// Parse a duration manifest from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> WeaverResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            WeaverError::schema(format!("open duration manifest '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Fetch and probe every speech asset of `story`.
    ///
    /// Fetches run in parallel; results are committed in block order, and the first failing
    /// block (in story order) is reported as [`WeaverError::AssetUnavailable`].
    #[tracing::instrument(skip_all, fields(blocks = story.blocks.len()))]
    pub fn prepare(
        story: &StoryDescriptor,
        bucket: &str,
        fetcher: &dyn AssetFetcher,
        probe: &dyn DurationProbe,
    ) -> WeaverResult<Self> {
        let wanted: Vec<(&str, &str)> = story
            .blocks
            .iter()
            .filter_map(|b| {
                b.speech
                    .as_ref()
                    .map(|s| (b.id.as_str(), s.asset.key.as_str()))
            })
            .collect();

        let probed: Vec<(&str, &str, WeaverResult<f64>)> = wanted
            .par_iter()
            .map(|&(block, key)| {
                let secs = fetcher
                    .fetch(bucket, key)
                    .and_then(|path| probe.duration_secs(&path));
                (block, key, secs)
            })
            .collect();

        let mut catalog = Self::new();
        for (block, key, secs) in probed {
            let secs = secs.map_err(|e| {
                WeaverError::asset_unavailable(block, format!("speech asset '{key}': {e}"))
            })?;
            tracing::debug!(block, key, secs, "prepared speech asset");
            catalog.insert(key, secs);
        }
        Ok(catalog)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/catalog.rs"]
mod tests;
