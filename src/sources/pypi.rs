//! Package index (PyPI) client.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use miette::Diagnostic;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::util::fs::ensure_dir;

const INDEX_URL: &str = "https://pypi.org/pypi";

/// Failure to locate a usable sdist for a package.
#[derive(Debug, Error, Diagnostic)]
pub enum SdistError {
    /// The package publishes no sdist at all (binary-only release).
    #[error("no sdist for package `{package}` found")]
    #[diagnostic(
        code(stevedore::pypi::no_sdist),
        help("the package may be binary-only; check its release files on the index")
    )]
    NoSdist { package: String },

    /// More than one sdist-typed file in a release breaks the
    /// one-archive assumption and is treated as a data-integrity failure.
    #[error("package `{package}` publishes {count} sdists; expected exactly one")]
    #[diagnostic(code(stevedore::pypi::multiple_sdists))]
    MultipleSdists { package: String, count: usize },

    /// The single sdist is not a `.tar.gz` archive.
    #[error("unexpected sdist archive type for `{package}`: {filename}")]
    #[diagnostic(code(stevedore::pypi::unexpected_archive))]
    UnexpectedArchiveType { package: String, filename: String },
}

/// One file attached to a release, as reported by the index.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseFile {
    pub filename: String,
    pub url: String,
    pub packagetype: String,

    #[serde(default)]
    pub digests: Digests,
}

/// Published digests for a release file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Digests {
    #[serde(default)]
    pub sha256: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProjectDocument {
    #[serde(default)]
    urls: Vec<ReleaseFile>,
}

/// Blocking client for the package index JSON API.
pub struct PyPiClient {
    client: reqwest::blocking::Client,
    index_url: String,
}

impl Default for PyPiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PyPiClient {
    /// Create a client against the public index.
    pub fn new() -> Self {
        Self::with_index_url(INDEX_URL)
    }

    /// Create a client against a custom index location.
    pub fn with_index_url(index_url: impl Into<String>) -> Self {
        PyPiClient {
            client: reqwest::blocking::Client::new(),
            index_url: index_url.into(),
        }
    }

    /// All files of the package's current release.
    pub fn release_files(&self, package: &str) -> Result<Vec<ReleaseFile>> {
        let url = format!("{}/{package}/json", self.index_url);
        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("failed to query index for `{package}`"))?;

        if !response.status().is_success() {
            bail!(
                "index query for `{package}` failed: HTTP {}",
                response.status()
            );
        }

        let document: ProjectDocument = response
            .json()
            .with_context(|| format!("failed to parse index metadata for `{package}`"))?;

        Ok(document.urls)
    }

    /// The package's single sdist.
    pub fn sdist(&self, package: &str) -> Result<ReleaseFile> {
        let files = self.release_files(package)?;
        Ok(select_sdist(package, files)?)
    }

    /// Download the package's sdist into `sdist_dir` and return its
    /// filename. The archive is verified against the index-published
    /// SHA-256 digest when one is available.
    pub fn download_sdist(&self, package: &str, sdist_dir: &Path) -> Result<String> {
        let sdist = self.sdist(package)?;

        tracing::info!("Downloading sdist from {}", sdist.url);

        let response = self
            .client
            .get(&sdist.url)
            .send()
            .with_context(|| format!("failed to download sdist from {}", sdist.url))?;

        if !response.status().is_success() {
            bail!(
                "failed to download sdist from {}: HTTP {}",
                sdist.url,
                response.status()
            );
        }

        let bytes = response
            .bytes()
            .context("failed to read sdist response body")?;

        if let Some(expected) = &sdist.digests.sha256 {
            let actual = hex::encode(Sha256::digest(&bytes));
            if &actual != expected {
                bail!(
                    "sdist hash mismatch for {}:\n  expected: {}\n  actual:   {}",
                    sdist.filename,
                    expected,
                    actual
                );
            }
            tracing::debug!("Sdist hash verified: {}", &actual[..16]);
        }

        ensure_dir(sdist_dir)?;
        let dest: PathBuf = sdist_dir.join(&sdist.filename);
        std::fs::write(&dest, &bytes)
            .with_context(|| format!("failed to write {}", dest.display()))?;

        Ok(sdist.filename)
    }
}

/// Pick the release's single `.tar.gz` sdist out of its file list.
fn select_sdist(package: &str, files: Vec<ReleaseFile>) -> Result<ReleaseFile, SdistError> {
    let sdists: Vec<ReleaseFile> = files
        .into_iter()
        .filter(|file| file.packagetype == "sdist")
        .collect();

    let sdist = match sdists.len() {
        0 => {
            return Err(SdistError::NoSdist {
                package: package.to_string(),
            })
        }
        1 => sdists.into_iter().next().unwrap(),
        count => {
            return Err(SdistError::MultipleSdists {
                package: package.to_string(),
                count,
            })
        }
    };

    if !sdist.filename.ends_with(".tar.gz") {
        return Err(SdistError::UnexpectedArchiveType {
            package: package.to_string(),
            filename: sdist.filename,
        });
    }

    Ok(sdist)
}
