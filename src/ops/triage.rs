//! Classifying top downloaded packages by build purity.
//!
//! A package is pure when a platform-independent wheel exists for it;
//! non-pure packages need a native build and are the ones worth carrying
//! external dependency metadata for.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::sources::pypi::{PyPiClient, ReleaseFile};
use crate::util::fs::{read_to_string, write_string};

/// Build purity of a package's current release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purity {
    /// A `py3-none-any` wheel exists; no native build needed.
    Pure,
    /// Platform wheels plus an sdist: building pulls in a toolchain.
    NonPure,
}

#[derive(Debug, Deserialize)]
struct TopPackagesDump {
    rows: Vec<TopPackagesRow>,
}

#[derive(Debug, Deserialize)]
struct TopPackagesRow {
    project: String,
}

/// Read the first `limit` project names from a top-packages dump.
pub fn load_top_packages(path: &Path, limit: usize) -> Result<Vec<String>> {
    let text = read_to_string(path)?;
    let dump: TopPackagesDump =
        serde_json::from_str(&text).context("failed to parse top-packages dump")?;
    Ok(dump
        .rows
        .into_iter()
        .take(limit)
        .map(|row| row.project)
        .collect())
}

/// Classify one package by querying the index for its release files.
pub fn classify(client: &PyPiClient, package: &str) -> Result<Purity> {
    let files = client.release_files(package)?;
    classify_files(package, &files)
}

fn classify_files(package: &str, files: &[ReleaseFile]) -> Result<Purity> {
    if files.len() < 2 {
        bail!("{package}: has no sdist or no wheel - verify this manually");
    }

    let mut has_sdist = false;
    let mut has_platform_wheel = false;
    for file in files {
        if file.packagetype == "sdist" {
            if file.filename.ends_with(".tar.gz") {
                has_sdist = true;
            } else if !file.filename.ends_with(".zip") {
                tracing::info!(
                    "Unexpected file extension for package {}: {}",
                    package,
                    file.filename
                );
            }
            // A .zip-only sdist is old-style and skipped by the amending
            // workflow, so it does not count as an sdist here.
        } else if file.packagetype == "bdist_wheel" {
            if file.filename.ends_with("py3-none-any.whl") {
                return Ok(Purity::Pure);
            }
            has_platform_wheel = true;
        }
    }

    if has_platform_wheel && has_sdist {
        Ok(Purity::NonPure)
    } else {
        // Unknown actually; these packages are skipped by the workflow.
        Ok(Purity::Pure)
    }
}

/// Classify a ranked package list, preserving ranking order.
///
/// Per-package classification failures are surfaced as warnings and the
/// package is left out of both lists.
pub fn triage(client: &PyPiClient, packages: &[String]) -> (Vec<String>, Vec<String>) {
    let mut pure = Vec::new();
    let mut nonpure = Vec::new();

    for package in packages {
        match classify(client, package) {
            Ok(Purity::Pure) => pure.push(package.clone()),
            Ok(Purity::NonPure) => nonpure.push(package.clone()),
            Err(err) => tracing::warn!("skipping {}: {:#}", package, err),
        }
    }

    (pure, nonpure)
}

/// Write the pure/non-pure lists, one package per line.
pub fn write_lists(
    output_dir: &Path,
    limit: usize,
    pure: &[String],
    nonpure: &[String],
) -> Result<()> {
    write_list(&output_dir.join(format!("pypi_top{limit}_pure.txt")), pure)?;
    write_list(
        &output_dir.join(format!("pypi_top{limit}_nonpure.txt")),
        nonpure,
    )
}

fn write_list(path: &Path, packages: &[String]) -> Result<()> {
    let mut contents = packages.join("\n");
    if !contents.is_empty() {
        contents.push('\n');
    }
    write_string(path, &contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::pypi::Digests;
    use tempfile::TempDir;

    fn file(packagetype: &str, filename: &str) -> ReleaseFile {
        ReleaseFile {
            filename: filename.to_string(),
            url: format!("https://files.example.invalid/{filename}"),
            packagetype: packagetype.to_string(),
            digests: Digests::default(),
        }
    }

    #[test]
    fn test_universal_wheel_is_pure() {
        let files = vec![
            file("sdist", "pkg-1.0.tar.gz"),
            file("bdist_wheel", "pkg-1.0-py3-none-any.whl"),
        ];
        assert_eq!(classify_files("pkg", &files).unwrap(), Purity::Pure);
    }

    #[test]
    fn test_platform_wheel_with_sdist_is_nonpure() {
        let files = vec![
            file("sdist", "pkg-1.0.tar.gz"),
            file("bdist_wheel", "pkg-1.0-cp312-cp312-manylinux_x86_64.whl"),
            file("bdist_wheel", "pkg-1.0-cp312-cp312-win_amd64.whl"),
        ];
        assert_eq!(classify_files("pkg", &files).unwrap(), Purity::NonPure);
    }

    #[test]
    fn test_zip_only_sdist_counts_as_pure() {
        let files = vec![
            file("sdist", "pkg-1.0.zip"),
            file("bdist_wheel", "pkg-1.0-cp312-cp312-manylinux_x86_64.whl"),
        ];
        assert_eq!(classify_files("pkg", &files).unwrap(), Purity::Pure);
    }

    #[test]
    fn test_lone_file_is_an_error() {
        let files = vec![file("sdist", "pkg-1.0.tar.gz")];
        let err = classify_files("pkg", &files).unwrap_err();
        assert!(err.to_string().contains("verify this manually"));
    }

    #[test]
    fn test_load_top_packages_respects_limit() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("top.json");
        write_string(
            &path,
            r#"{"rows": [
                {"project": "numpy", "download_count": 1},
                {"project": "requests", "download_count": 2},
                {"project": "pandas", "download_count": 3}
            ]}"#,
        )
        .unwrap();

        let packages = load_top_packages(&path, 2).unwrap();
        assert_eq!(packages, ["numpy", "requests"]);
    }

    #[test]
    fn test_write_lists() {
        let tmp = TempDir::new().unwrap();
        write_lists(
            tmp.path(),
            150,
            &["requests".to_string()],
            &["numpy".to_string(), "pandas".to_string()],
        )
        .unwrap();

        assert_eq!(
            read_to_string(&tmp.path().join("pypi_top150_pure.txt")).unwrap(),
            "requests\n"
        );
        assert_eq!(
            read_to_string(&tmp.path().join("pypi_top150_nonpure.txt")).unwrap(),
            "numpy\npandas\n"
        );
    }
}
