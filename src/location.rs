use anyhow::{Context, Result, anyhow};
use std::{fmt, path::Path};
use url::Url;

use crate::catalog::ChapterId;

pub const CHAPTER_PARAM: &str = "chapter";

/// The URL the reader was opened at. Resources resolve against it the way a
/// page resolves relative fetches, and its `chapter` parameter is the deep
/// link to the chapter on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location(Url);

impl Location {
    pub fn new(url: Url) -> Self {
        Location(url)
    }

    /// Accepts a URL, or a filesystem path that becomes a `file://` URL.
    pub fn parse(input: &str) -> Result<Self> {
        if let Ok(url) = Url::parse(input) {
            if url.scheme().len() > 1 {
                return Ok(Location(url));
            }
        }
        Self::from_path(Path::new(input))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let path = path
            .canonicalize()
            .with_context(|| format!("resolving {}", path.display()))?;
        let url = if path.is_dir() {
            Url::from_directory_path(&path)
        } else {
            Url::from_file_path(&path)
        };
        url.map(Location).map_err(|_| anyhow!("{} cannot be expressed as a URL", path.display()))
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    /// Resolves a relative resource path against this location.
    pub fn resolve(&self, relative: &str) -> Result<Url> {
        self.0
            .join(relative)
            .with_context(|| format!("resolving {relative} against {}", self.0))
    }

    /// Value of the `chapter` parameter; empty counts as absent.
    pub fn chapter(&self) -> Option<String> {
        self.0
            .query_pairs()
            .find(|(k, _)| k == CHAPTER_PARAM)
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty())
    }

    /// Sets `chapter` in place of its first occurrence, dropping duplicates
    /// and keeping every other parameter where it was.
    pub fn set_chapter(&mut self, id: &ChapterId) {
        let mut pairs: Vec<(String, String)> = Vec::new();
        let mut placed = false;
        for (k, v) in self.0.query_pairs() {
            if k == CHAPTER_PARAM {
                if !placed {
                    pairs.push((CHAPTER_PARAM.to_string(), id.to_string()));
                    placed = true;
                }
            } else {
                pairs.push((k.into_owned(), v.into_owned()));
            }
        }
        if !placed {
            pairs.push((CHAPTER_PARAM.to_string(), id.to_string()));
        }
        self.0.query_pairs_mut().clear().extend_pairs(pairs);
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
