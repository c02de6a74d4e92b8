//! Remote mapping datasets, memoized per process.
//!
//! The known-ecosystems index, the per-ecosystem mapping documents, and
//! the canonical registry are all published as JSON documents over HTTP.
//! Repeated lookups within one process reuse the first result, keyed by
//! the resolved URL; nothing survives the process.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use url::Url;

use crate::core::mapping::{EcosystemIndex, MappingDoc};
use crate::core::registry::CanonicalRegistry;

/// Root of the published mapping dataset.
pub const DATA_BASE_URL: &str =
    "https://raw.githubusercontent.com/jaimergp/external-metadata-mappings/refs/heads/main/data";

/// Memoizing client for the remote mapping datasets.
pub struct RemoteStore {
    client: reqwest::blocking::Client,
    base_url: String,
    mappings: HashMap<String, Arc<MappingDoc>>,
    ecosystems: Option<Arc<EcosystemIndex>>,
    registry: Option<Arc<CanonicalRegistry>>,
}

impl Default for RemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStore {
    /// Create a store against the published dataset.
    pub fn new() -> Self {
        Self::with_base_url(DATA_BASE_URL)
    }

    /// Create a store against a custom dataset root.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        RemoteStore {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
            mappings: HashMap::new(),
            ecosystems: None,
            registry: None,
        }
    }

    /// The known-ecosystems index.
    pub fn ecosystems(&mut self) -> Result<Arc<EcosystemIndex>> {
        if let Some(index) = &self.ecosystems {
            return Ok(Arc::clone(index));
        }

        let url = format!("{}/known-ecosystems.json", self.base_url);
        let index = Arc::new(EcosystemIndex::parse(&self.fetch(&url)?)?);
        self.ecosystems = Some(Arc::clone(&index));
        Ok(index)
    }

    /// The mapping document for an ecosystem name or a full mapping URL.
    pub fn mapping(&mut self, ecosystem_or_url: &str) -> Result<Arc<MappingDoc>> {
        let url = self.mapping_url(ecosystem_or_url);

        if let Some(doc) = self.mappings.get(&url) {
            return Ok(Arc::clone(doc));
        }

        let doc = Arc::new(
            MappingDoc::parse(&self.fetch(&url)?)
                .with_context(|| format!("invalid mapping document at {url}"))?,
        );
        self.mappings.insert(url, Arc::clone(&doc));
        Ok(doc)
    }

    /// The canonical identifier registry.
    pub fn registry(&mut self) -> Result<Arc<CanonicalRegistry>> {
        if let Some(registry) = &self.registry {
            return Ok(Arc::clone(registry));
        }

        let url = format!("{}/registry.json", self.base_url);
        let registry = Arc::new(CanonicalRegistry::parse(&self.fetch(&url)?)?);
        self.registry = Some(Arc::clone(&registry));
        Ok(registry)
    }

    fn mapping_url(&self, ecosystem_or_url: &str) -> String {
        if ecosystem_or_url.starts_with("http:") || ecosystem_or_url.starts_with("https:") {
            ecosystem_or_url.to_string()
        } else {
            format!("{}/{ecosystem_or_url}.mapping.json", self.base_url)
        }
    }

    fn fetch(&self, url: &str) -> Result<String> {
        Url::parse(url).with_context(|| format!("invalid dataset URL: {url}"))?;

        tracing::debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("failed to fetch {url}"))?;

        if !response.status().is_success() {
            bail!("failed to fetch {url}: HTTP {}", response.status());
        }

        response
            .text()
            .with_context(|| format!("failed to read response body from {url}"))
    }
}
