//! Fetching an sdist and amending it with external dependency metadata.
//!
//! The original archive is never mutated: the unpacked tree is amended
//! (manifest synthesized if absent, external declarations appended,
//! package-specific patches applied) and repackaged as a new archive
//! under the amended directory.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Archive, Builder};

use crate::core::pyproject::{MANIFEST_FILE, SYNTHESIZED_MANIFEST};
use crate::core::workspace::Workspace;
use crate::ops::patch::PatchRegistry;
use crate::sources::pypi::PyPiClient;
use crate::util::fs::{ensure_dir, read_to_string, write_string};

/// Download, amend, and repackage one package's sdist.
///
/// Returns the path of the amended archive.
pub fn fetch_and_amend(
    ws: &Workspace,
    client: &PyPiClient,
    patches: &PatchRegistry,
    package: &str,
) -> Result<PathBuf> {
    let sdist_dir = ws.sdist_dir();
    let amended_dir = ws.amended_dir();
    ensure_dir(&amended_dir)?;

    let filename = client.download_sdist(package, &sdist_dir)?;
    let manifest_path = unpack_sdist(&filename, &sdist_dir)?;

    append_external_metadata(&manifest_path, &ws.external_metadata_file(package))?;

    let unpacked_dir = manifest_path
        .parent()
        .context("manifest path has no parent directory")?;
    patches.apply(package, unpacked_dir)?;

    repack_sdist(&filename, &sdist_dir, &amended_dir)
}

/// Unpack an sdist archive into the sdist directory and return the path
/// of its manifest.
///
/// An sdist without a manifest is a non-fatal condition: a warning is
/// emitted and a minimal manifest is synthesized so downstream tooling
/// still has something to parse.
pub fn unpack_sdist(filename: &str, sdist_dir: &Path) -> Result<PathBuf> {
    let archive_path = sdist_dir.join(filename);

    // First pass over the member list: the top-level directory name, and
    // whether a manifest is present at the fixed relative path.
    let file = File::open(&archive_path)
        .with_context(|| format!("failed to open {}", archive_path.display()))?;
    let mut archive = Archive::new(GzDecoder::new(file));

    let mut root: Option<PathBuf> = None;
    let mut has_manifest = false;
    for entry in archive.entries().context("failed to read sdist members")? {
        let entry = entry.context("failed to read sdist member")?;
        let path = entry.path().context("failed to read sdist member path")?;

        let mut components = path.components();
        let Some(first) = components.next() else {
            continue;
        };
        if root.is_none() {
            root = Some(PathBuf::from(first.as_os_str()));
        }
        if components
            .next()
            .is_some_and(|second| second.as_os_str() == MANIFEST_FILE)
        {
            has_manifest = true;
        }
    }

    let root = root.with_context(|| format!("sdist archive {filename} is empty"))?;

    // Second pass: actually unpack.
    let file = File::open(&archive_path)
        .with_context(|| format!("failed to open {}", archive_path.display()))?;
    Archive::new(GzDecoder::new(file))
        .unpack(sdist_dir)
        .with_context(|| format!("failed to unpack {filename}"))?;

    let manifest_path = sdist_dir.join(&root).join(MANIFEST_FILE);
    if !has_manifest || !manifest_path.exists() {
        tracing::warn!("{} does not contain a pyproject.toml file", filename);
        write_string(&manifest_path, SYNTHESIZED_MANIFEST)?;
    }

    Ok(manifest_path)
}

/// Append the package's external dependency declarations to its manifest.
///
/// Idempotent: if the declarations are already present the manifest is
/// left byte-identical.
pub fn append_external_metadata(manifest_path: &Path, metadata_path: &Path) -> Result<()> {
    let contents = read_to_string(manifest_path)?;
    let metadata = read_to_string(metadata_path)
        .context("no external dependency declarations for this package")?;

    if !contents.contains(&metadata) {
        write_string(manifest_path, &format!("{contents}\n{metadata}"))?;
    }

    Ok(())
}

/// Repackage the unpacked sdist directory as a new archive in the
/// amended directory.
///
/// The amended archive's name is the original name lowercased with
/// underscores replaced by hyphens.
pub fn repack_sdist(filename: &str, sdist_dir: &Path, amended_dir: &Path) -> Result<PathBuf> {
    let Some(dirname) = filename.strip_suffix(".tar.gz") else {
        bail!("unexpected sdist archive name: {filename}");
    };

    let amended_name = filename.to_lowercase().replace('_', "-");
    let out_path = amended_dir.join(amended_name);

    let file = File::create(&out_path)
        .with_context(|| format!("failed to create {}", out_path.display()))?;
    let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));
    builder
        .append_dir_all(dirname, sdist_dir.join(dirname))
        .with_context(|| format!("failed to archive {dirname}"))?;
    builder
        .into_inner()
        .context("failed to finish amended archive")?
        .finish()
        .context("failed to finish amended archive")?;

    Ok(out_path)
}
