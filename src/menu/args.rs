//! Collected handler parameters

use std::collections::HashMap;
use std::path::PathBuf;

use glob::glob;
use tracing::warn;

use crate::error::{Error, Result};

/// Parameter values keyed by [`Param::key`](super::Param::key)
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: HashMap<&'static str, String>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &'static str, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    /// Builder form of [`Args::insert`]
    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &'static str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn text(&self, key: &'static str) -> Result<&str> {
        self.get(key).ok_or(Error::MissingParameter(key))
    }

    pub fn path(&self, key: &'static str) -> Result<PathBuf> {
        self.text(key).map(PathBuf::from)
    }

    pub fn optional_path(&self, key: &'static str) -> Option<PathBuf> {
        self.get(key).map(PathBuf::from)
    }

    /// Whitespace-separated paths, each expanded as a glob pattern
    pub fn paths(&self, key: &'static str) -> Result<Vec<PathBuf>> {
        expand_globs(self.text(key)?.split_whitespace())
    }

    /// A signed whole number of degrees
    pub fn angle(&self, key: &'static str) -> Result<i64> {
        let value = self.text(key)?.trim();
        value
            .parse()
            .map_err(|_| Error::MalformedInput(value.to_string()))
    }
}

/// Expand glob patterns in input paths
///
/// Matches of one pattern are sorted; patterns keep the order they were
/// given in, so the merge order stays under the caller's control. Patterns
/// without glob characters are taken literally.
pub fn expand_globs<I, S>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut paths = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        if !(pattern.contains('*') || pattern.contains('?') || pattern.contains('[')) {
            paths.push(PathBuf::from(pattern));
            continue;
        }

        let entries = glob(pattern).map_err(|e| Error::InvalidGlob(format!("{pattern}: {e}")))?;
        let mut matched = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) => matched.push(path),
                Err(e) => warn!("glob error for {}: {}", pattern, e),
            }
        }
        if matched.is_empty() {
            return Err(Error::NoFilesMatched(pattern.to_string()));
        }

        matched.sort();
        paths.extend(matched);
    }

    Ok(paths)
}
