//! Fetches the catalog and chapter documents relative to a location.

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    catalog::{ChapterContent, ChapterDescriptor, ChapterId},
    location::Location,
};

pub const CATALOG_PATH: &str = "data/toc.json";

#[derive(Debug, Clone)]
pub struct Library {
    client: reqwest::Client,
    location: Location,
}

impl Library {
    pub fn new(location: Location) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("rnovel/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, location }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub async fn fetch_catalog(&self) -> Result<Vec<ChapterDescriptor>> {
        self.fetch_json(CATALOG_PATH).await
    }

    pub async fn fetch_chapter(&self, id: &ChapterId) -> Result<ChapterContent> {
        self.fetch_json(&chapter_path(id)).await
    }

    async fn fetch_json<T: DeserializeOwned>(&self, relative: &str) -> Result<T> {
        let url = self.location.resolve(relative)?;
        match url.scheme() {
            "file" => read_file(&url).await,
            "http" | "https" => self.get(&url).await,
            other => bail!("unsupported scheme {other:?} in {url}"),
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        tracing::debug!(%url, "GET");
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("requesting {url}"))?
            .error_for_status()
            .with_context(|| format!("requesting {url}"))?;
        resp.json::<T>().await.with_context(|| format!("decoding {url}"))
    }
}

pub fn chapter_path(id: &ChapterId) -> String {
    format!("data/{id}.json")
}

async fn read_file<T: DeserializeOwned>(url: &Url) -> Result<T> {
    let path = url
        .to_file_path()
        .map_err(|_| anyhow::anyhow!("{url} is not a local path"))?;
    tracing::debug!(path = %path.display(), "read");
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("decoding {}", path.display()))
}
