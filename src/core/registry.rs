//! The central registry of canonical dependency identifiers.
//!
//! Used only for advisory validation: resolution never consults it for
//! correctness. A definition's `provides` list names the canonical
//! identifiers the definition is an alternate spelling for.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::purl::Purl;

/// The parsed registry document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CanonicalRegistry {
    #[serde(default)]
    definitions: Vec<RegistryDefinition>,
}

/// One registry definition.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryDefinition {
    pub id: String,

    #[serde(default)]
    pub provides: Vec<String>,
}

impl CanonicalRegistry {
    /// Parse the registry from JSON text.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse registry document")
    }

    /// Whether the identifier appears anywhere in the registry, either as
    /// a definition or as a provided alternate.
    pub fn is_known(&self, purl: &Purl) -> bool {
        self.definitions.iter().any(|def| {
            def.id == purl.as_str() || def.provides.iter().any(|p| p == purl.as_str())
        })
    }

    /// Whether the identifier is a canonical spelling.
    ///
    /// Canonical identifiers are definitions that do not defer to others,
    /// plus every identifier named in a `provides` list.
    pub fn is_canonical(&self, purl: &Purl) -> bool {
        self.definitions.iter().any(|def| {
            (def.id == purl.as_str() && def.provides.is_empty())
                || def.provides.iter().any(|p| p == purl.as_str())
        })
    }

    /// Canonical alternatives for a non-canonical identifier, read from
    /// the first matching definition with a `provides` list.
    pub fn canonical_alternatives(&self, purl: &Purl) -> &[String] {
        self.definitions
            .iter()
            .find(|def| def.id == purl.as_str() && !def.provides.is_empty())
            .map(|def| def.provides.as_slice())
            .unwrap_or(&[])
    }
}
