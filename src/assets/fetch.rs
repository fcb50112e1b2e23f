use std::path::{Path, PathBuf};

use crate::foundation::error::{WeaverError, WeaverResult};

/// Resolves a storage object to a local file.
///
/// Implementations must be safe to call from several threads at once; catalog preparation fans
/// fetches out across the rayon pool.
pub trait AssetFetcher: Send + Sync {
    /// Make `(bucket, key)` available locally and return its path.
    ///
    /// Any non-success outcome is an error; callers treat it as fatal for the owning block.
    fn fetch(&self, bucket: &str, key: &str) -> WeaverResult<PathBuf>;
}

/// Fetcher backed by a local directory laid out as `<root>/<bucket>/<key>`.
#[derive(Clone, Debug)]
pub struct LocalDirFetcher {
    root: PathBuf,
}

impl LocalDirFetcher {
    /// Serve objects from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetFetcher for LocalDirFetcher {
    fn fetch(&self, bucket: &str, key: &str) -> WeaverResult<PathBuf> {
        let rel = normalize_key(key)?;
        let path = self.root.join(bucket).join(rel);
        if !path.is_file() {
            return Err(WeaverError::schema(format!(
                "object '{bucket}/{key}' not found at '{}'",
                path.display()
            )));
        }
        Ok(path)
    }
}

/// Normalize a storage key into a relative path, rejecting absolute keys and `..`.
pub fn normalize_key(key: &str) -> WeaverResult<PathBuf> {
    let s = key.replace('\\', "/");
    if s.trim().is_empty() {
        return Err(WeaverError::schema("storage key must be non-empty"));
    }
    if s.starts_with('/') {
        return Err(WeaverError::schema(format!(
            "storage key '{key}' must be relative"
        )));
    }
    let mut out = PathBuf::new();
    for part in s.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                return Err(WeaverError::schema(format!(
                    "storage key '{key}' must not contain '..'"
                )));
            }
            p => out.push(p),
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
