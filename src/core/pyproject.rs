//! pyproject.toml parsing and external dependency extraction.
//!
//! Only the parts of the manifest that matter to this tooling are modeled:
//! the `[build-system]` table and the `[external]` table with its
//! required and optional dependency lists.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::purl::Purl;
use crate::util::dedup_first_seen;

/// Fixed relative location of the manifest inside an sdist's top directory.
pub const MANIFEST_FILE: &str = "pyproject.toml";

/// Name of the optional dependency group read from `optional-*` tables.
pub const OPTIONAL_GROUP: &str = "extra";

/// Minimal manifest synthesized for sdists that ship without one.
pub const SYNTHESIZED_MANIFEST: &str = r#"[build-system]
requires = ["setuptools", "versioninfo"]
build-backend = "setuptools.build_meta"
"#;

/// The parsed pyproject manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PyProject {
    /// Declared build backend, if any.
    #[serde(default, rename = "build-system")]
    pub build_system: Option<BuildSystem>,

    /// External (non-Python-ecosystem) dependency declarations.
    #[serde(default)]
    pub external: Option<ExternalTable>,
}

/// `[build-system]` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildSystem {
    #[serde(default)]
    pub requires: Vec<String>,

    #[serde(default, rename = "build-backend")]
    pub build_backend: Option<String>,
}

/// `[external]` table.
///
/// The required keys hold flat identifier lists; the `optional-*`
/// counterparts hold named groups of identifiers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalTable {
    #[serde(default, rename = "build-requires")]
    pub build_requires: Vec<String>,

    #[serde(default, rename = "host-requires")]
    pub host_requires: Vec<String>,

    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default, rename = "optional-build-requires")]
    pub optional_build_requires: BTreeMap<String, Vec<String>>,

    #[serde(default, rename = "optional-host-requires")]
    pub optional_host_requires: BTreeMap<String, Vec<String>>,

    #[serde(default, rename = "optional-dependencies")]
    pub optional_dependencies: BTreeMap<String, Vec<String>>,
}

/// External dependencies split into the four resolution buckets.
///
/// Optional extras are desired by default, so they are surfaced alongside
/// the required identifiers, but kept in separate buckets so that a
/// resolution failure for an optional entry downgrades to a warning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalDeps {
    /// Required build-time dependencies (`build-requires` + `host-requires`).
    pub build: Vec<Purl>,

    /// Required run-time dependencies (`dependencies`).
    pub run: Vec<Purl>,

    /// Optional build-time dependencies (the `extra` group).
    pub optional_build: Vec<Purl>,

    /// Optional run-time dependencies (the `extra` group).
    pub optional_run: Vec<Purl>,
}

impl PyProject {
    /// Parse a manifest from TOML text.
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse pyproject.toml")
    }

    /// Extract the declared external dependencies.
    ///
    /// Identifiers within each bucket are deduplicated preserving
    /// first-seen order.
    pub fn external_deps(&self) -> Result<ExternalDeps> {
        let Some(external) = &self.external else {
            return Ok(ExternalDeps::default());
        };

        let build = parse_purls(
            external
                .build_requires
                .iter()
                .chain(external.host_requires.iter()),
        )?;
        let run = parse_purls(external.dependencies.iter())?;

        let optional_build = parse_purls(
            optional_group(&external.optional_build_requires)
                .iter()
                .chain(optional_group(&external.optional_host_requires)),
        )?;
        let optional_run = parse_purls(optional_group(&external.optional_dependencies).iter())?;

        Ok(ExternalDeps {
            build: dedup_first_seen(build),
            run: dedup_first_seen(run),
            optional_build: dedup_first_seen(optional_build),
            optional_run: dedup_first_seen(optional_run),
        })
    }
}

impl ExternalDeps {
    /// Whether no external dependencies are declared at all.
    pub fn is_empty(&self) -> bool {
        self.build.is_empty()
            && self.run.is_empty()
            && self.optional_build.is_empty()
            && self.optional_run.is_empty()
    }

    /// All identifiers in fixed bucket order, deduplicated preserving
    /// first-seen order.
    pub fn all(&self) -> Vec<Purl> {
        dedup_first_seen(
            self.build
                .iter()
                .chain(&self.optional_build)
                .chain(&self.run)
                .chain(&self.optional_run)
                .cloned()
                .collect::<Vec<_>>(),
        )
    }
}

fn optional_group(groups: &BTreeMap<String, Vec<String>>) -> &[String] {
    groups.get(OPTIONAL_GROUP).map(Vec::as_slice).unwrap_or(&[])
}

fn parse_purls<'a>(items: impl Iterator<Item = &'a String>) -> Result<Vec<Purl>> {
    items
        .map(|s| {
            s.parse::<Purl>()
                .with_context(|| format!("invalid identifier `{s}` in [external] table"))
        })
        .collect()
}
