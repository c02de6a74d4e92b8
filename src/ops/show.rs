//! Inspecting the external dependencies of an amended sdist.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use tar::Archive;

use crate::core::mapping::PackageManager;
use crate::core::purl::Purl;
use crate::core::pyproject::{ExternalDeps, PyProject, MANIFEST_FILE};
use crate::core::registry::CanonicalRegistry;
use crate::resolver;
use crate::sources::remote::RemoteStore;
use crate::util::distro;
use crate::util::distro::PackageManagerRegistry;
use crate::util::fs::glob_files;

/// Read the manifest out of a package's amended sdist.
pub fn read_pyproject(package: &str, sdist_dir: &Path) -> Result<PyProject> {
    let sdist = locate_sdist(package, sdist_dir)?;
    manifest_from_sdist(&sdist)
}

/// Locate a package's sdist under a directory.
///
/// Case and separator variants of the package name are tried in turn;
/// if several archives match, the lexicographically latest one wins with
/// a warning.
pub fn locate_sdist(package: &str, sdist_dir: &Path) -> Result<PathBuf> {
    let candidates = crate::util::dedup_first_seen(vec![
        package.to_string(),
        package.replace('-', "_"),
        package.replace('_', "-"),
    ]);

    for name in candidates {
        let matches = glob_files(sdist_dir, &format!("{name}-*.tar.gz"))?;
        if let Some(latest) = matches.last() {
            if matches.len() > 1 {
                tracing::warn!("More than one sdist found; choosing latest one");
            }
            return Ok(latest.clone());
        }
    }

    bail!(
        "couldn't find sdist for `{package}` at {}",
        sdist_dir.display()
    )
}

/// Read and parse the manifest member of an sdist archive.
pub fn manifest_from_sdist(sdist: &Path) -> Result<PyProject> {
    let file =
        File::open(sdist).with_context(|| format!("failed to open {}", sdist.display()))?;
    let mut archive = Archive::new(GzDecoder::new(file));

    for entry in archive.entries().context("failed to read sdist members")? {
        let mut entry = entry.context("failed to read sdist member")?;
        let path = entry.path().context("failed to read sdist member path")?;

        let mut components = path.components();
        components.next();
        if components
            .next()
            .is_some_and(|second| second.as_os_str() == MANIFEST_FILE)
        {
            let mut contents = String::new();
            entry
                .read_to_string(&mut contents)
                .context("failed to read pyproject.toml member")?;
            return PyProject::parse(&contents);
        }
    }

    bail!(
        "could not read pyproject.toml file from {}",
        sdist.display()
    )
}

/// Render the external dependency listing for terminal output.
pub fn render_external(deps: &ExternalDeps) -> String {
    let sections: [(&str, &[Purl]); 4] = [
        ("build-requires", &deps.build),
        ("dependencies", &deps.run),
        ("optional-build-requires.extra", &deps.optional_build),
        ("optional-dependencies.extra", &deps.optional_run),
    ];

    let mut out = String::new();
    for (name, purls) in sections {
        if purls.is_empty() {
            continue;
        }
        out.push_str(name);
        out.push_str(":\n");
        for purl in purls {
            out.push_str("  ");
            out.push_str(purl.as_str());
            out.push('\n');
        }
    }
    out
}

/// Check an identifier against the central registry, logging advisory
/// warnings for unknown or non-canonical spellings.
pub fn validate_purl(purl: &Purl, registry: &CanonicalRegistry) {
    if !registry.is_known(purl) {
        tracing::warn!("PURL {} is not recognized in the central registry.", purl);
    }
    if !registry.is_canonical(purl) {
        let alternatives = registry.canonical_alternatives(purl);
        if alternatives.is_empty() {
            tracing::warn!("PURL {} is not using a canonical reference.", purl);
        } else {
            tracing::warn!(
                "PURL {} is not using a canonical reference. Try with one of: {}.",
                purl,
                alternatives.join(", ")
            );
        }
    }
}

/// Assemble the system package manager install command for a package's
/// external dependencies.
///
/// With a package manager override, the owning ecosystem is looked up in
/// the known-ecosystems index; otherwise the host's ecosystem is detected
/// and its default package manager used.
pub fn system_install_command(
    deps: &ExternalDeps,
    store: &mut RemoteStore,
    pm_registry: &PackageManagerRegistry,
    package_manager: Option<&str>,
) -> Result<Vec<String>> {
    let ecosystems = store.ecosystems()?;

    let (ecosystem, mapping) = match package_manager {
        Some(name) => {
            let mut found = None;
            for (eco_name, entry) in &ecosystems.ecosystems {
                let mapping = store.mapping(&entry.mapping)?;
                if mapping.package_manager(name).is_some() {
                    found = Some((eco_name.clone(), mapping));
                    break;
                }
            }
            found.with_context(|| {
                format!("package manager `{name}` is not declared by any known ecosystem")
            })?
        }
        None => {
            let ecosystem = distro::detect(pm_registry);
            let entry = ecosystems.ecosystems.get(&ecosystem).with_context(|| {
                format!("ecosystem `{ecosystem}` is missing from the known-ecosystems index")
            })?;
            (ecosystem.clone(), store.mapping(&entry.mapping)?)
        }
    };

    let pm: PackageManager = match package_manager {
        Some(name) => mapping
            .package_manager(name)
            .with_context(|| format!("package manager `{name}` not found in `{ecosystem}` mapping"))?
            .clone(),
        None => mapping.default_package_manager()?.clone(),
    };

    tracing::debug!("Resolving against the {} mapping with {}", ecosystem, pm.name);

    let packages = resolver::resolve(deps, &mapping)?;
    Ok(pm.build_install_command(&packages))
}
