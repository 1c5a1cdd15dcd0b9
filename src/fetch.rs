//! Batch loader for the four site documents.
//! Reads `info.json`, `cards.json`, `reviews.json` and `schedule.json` concurrently from a
//! `DocumentSource` and parses each one. The batch is all-or-nothing: the first failing
//! resource fails the whole load and nothing is returned.
//! Sources: HTTP base URL (reqwest), a directory on disk (tokio::fs), or an in-memory map.

use crate::data::{Cards, Info, Reviews, Schedule, SiteData};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

pub const INFO: &str = "info.json";
pub const CARDS: &str = "cards.json";
pub const REVIEWS: &str = "reviews.json";
pub const SCHEDULE: &str = "schedule.json";

/// Failure of one resource in a batch load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load {resource}: status {status}")]
    Status { resource: String, status: u16 },
    #[error("failed to parse {resource}: {source}")]
    Parse {
        resource: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read {resource}: {message}")]
    Transport { resource: String, message: String },
}

impl LoadError {
    /// Name of the resource that broke the batch.
    pub fn resource(&self) -> &str {
        match self {
            LoadError::Status { resource, .. }
            | LoadError::Parse { resource, .. }
            | LoadError::Transport { resource, .. } => resource,
        }
    }

    /// Response status, when the failure was a non-success status.
    pub fn status(&self) -> Option<u16> {
        match self {
            LoadError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Somewhere the site documents can be read from.
#[allow(async_fn_in_trait)]
pub trait DocumentSource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, LoadError>;
}

// *************** Sources ***************

/// Reads documents over HTTP relative to a base URL.
pub struct HttpSource {
    client: Client,
    base: String,
}

impl HttpSource {
    pub fn new(base: &str) -> Self {
        let base = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        };
        Self {
            client: Client::new(),
            base,
        }
    }

    pub fn url_for(&self, name: &str) -> String {
        format!("{}{}", self.base, name)
    }
}

impl DocumentSource for HttpSource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, LoadError> {
        let transport = |e: reqwest::Error| LoadError::Transport {
            resource: name.to_string(),
            message: e.to_string(),
        };
        let response = self
            .client
            .get(self.url_for(name))
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(LoadError::Status {
                resource: name.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        Ok(body.to_vec())
    }
}

/// Reads documents from a directory; a missing file behaves like a 404.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DocumentSource for DirSource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, LoadError> {
        match tokio::fs::read(self.root.join(name)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(LoadError::Status {
                resource: name.to_string(),
                status: 404,
            }),
            Err(e) => Err(LoadError::Transport {
                resource: name.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

/// In-memory documents with optional forced statuses, for embedding and tests.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    documents: HashMap<String, Vec<u8>>,
    statuses: HashMap<String, u16>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, body: impl Into<Vec<u8>>) -> Self {
        self.documents.insert(name.to_string(), body.into());
        self
    }

    /// Makes `name` answer with `status` instead of its body.
    pub fn with_status(mut self, name: &str, status: u16) -> Self {
        self.statuses.insert(name.to_string(), status);
        self
    }
}

impl DocumentSource for MemorySource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, LoadError> {
        if let Some(&status) = self.statuses.get(name) {
            return Err(LoadError::Status {
                resource: name.to_string(),
                status,
            });
        }
        self.documents
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::Status {
                resource: name.to_string(),
                status: 404,
            })
    }
}

// *************** Batch load ***************

async fn load_json<T: DeserializeOwned>(source: &impl DocumentSource, name: &str) -> Result<T, LoadError> {
    let body = source.fetch(name).await?;
    serde_json::from_slice(&body).map_err(|e| LoadError::Parse {
        resource: name.to_string(),
        source: e,
    })
}

/// Loads all four documents concurrently; any single failure fails the batch.
pub async fn load_all(source: &impl DocumentSource) -> Result<SiteData, LoadError> {
    tracing::info!("Loading site documents");
    let (info, cards, reviews, schedule) = tokio::try_join!(
        load_json::<Info>(source, INFO),
        load_json::<Cards>(source, CARDS),
        load_json::<Reviews>(source, REVIEWS),
        load_json::<Schedule>(source, SCHEDULE),
    )?;
    tracing::info!("Site documents loaded");
    Ok(SiteData {
        info,
        cards,
        reviews,
        schedule,
    })
}
