//! Workspace layout - where artifacts live on disk.
//!
//! All stages exchange state exclusively through this layout: original
//! sdists in the sdist root, amended copies in `_amended/`, per-package
//! external metadata files, CI result snapshots, and the report document.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Root of the on-disk layout.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create a workspace rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Workspace { root: root.into() }
    }

    /// Create a workspace rooted at the current directory.
    pub fn current() -> Result<Self> {
        let root = std::env::current_dir().context("failed to determine current directory")?;
        Ok(Workspace::new(root))
    }

    /// The workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where original sdists are downloaded and unpacked.
    pub fn sdist_dir(&self) -> PathBuf {
        self.root.join("sdist")
    }

    /// Where amended sdists are written.
    pub fn amended_dir(&self) -> PathBuf {
        self.sdist_dir().join("_amended")
    }

    /// The external dependency declarations for one package.
    pub fn external_metadata_file(&self, package: &str) -> PathBuf {
        self.root.join("external_metadata").join(format!("{package}.toml"))
    }

    /// Where CI job snapshots live.
    pub fn results_dir(&self) -> PathBuf {
        self.root.join("results")
    }

    /// The download-popularity ranking consumed by the success matrix.
    pub fn download_ranking(&self) -> PathBuf {
        self.root.join("top_packages").join("pypi_top150_nonpure.txt")
    }

    /// The top-packages dump consumed by purity triage.
    pub fn top_packages_dump(&self) -> PathBuf {
        self.root.join("top_packages").join("top-pypi-packages-30-days.json")
    }

    /// Where triage writes its pure/non-pure lists.
    pub fn top_packages_dir(&self) -> PathBuf {
        self.root.join("top_packages")
    }

    /// The report document carrying the table markers.
    pub fn readme(&self) -> PathBuf {
        self.root.join("README.md")
    }
}
