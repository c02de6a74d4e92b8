//! Per-package source patches.
//!
//! Some packages need a textual tweak to their unpacked source tree
//! before the amended sdist can be built. Patches are registered per
//! package identifier; packages without a registered patch get an
//! explicit no-op.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

use crate::util::fs::{read_to_string, write_string};

type PatchFn = fn(&Path) -> Result<()>;

/// Registry of package-specific source transformations.
pub struct PatchRegistry {
    patches: HashMap<&'static str, PatchFn>,
}

impl Default for PatchRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PatchRegistry {
    /// The built-in patch set.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("grpcio", patch_grpcio);
        registry.register("matplotlib", patch_matplotlib);
        registry
    }

    /// A registry with no patches.
    pub fn empty() -> Self {
        PatchRegistry {
            patches: HashMap::new(),
        }
    }

    /// Register a patch for a package.
    pub fn register(&mut self, package: &'static str, patch: PatchFn) {
        self.patches.insert(package, patch);
    }

    /// Apply the registered patch for a package, if any.
    pub fn apply(&self, package: &str, unpacked_dir: &Path) -> Result<()> {
        if let Some(patch) = self.patches.get(package) {
            tracing::info!("Applying source patch for {}", package);
            patch(unpacked_dir)
                .with_context(|| format!("failed to apply source patch for {package}"))?;
        }
        Ok(())
    }
}

/// grpcio ships no pyproject.toml and reads its version from
/// `_metadata.py` at import time; inline the version into `setup.py`
/// so the build does not import the package.
fn patch_grpcio(unpacked_dir: &Path) -> Result<()> {
    let setup_py_path = unpacked_dir.join("setup.py");
    let setup_py = read_to_string(&setup_py_path)?;
    let metadata = read_to_string(&unpacked_dir.join("_metadata.py"))?;

    let version_re = Regex::new(r#"__version__ = """([^"]+)""""#).unwrap();
    let version = version_re
        .captures(&metadata)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| "1.71.0".to_string());

    let setup_py = setup_py.replace("import _metadata", "# import _metadata");
    let setup_py = setup_py.replace("_metadata.__version__", &format!("'{version}'"));
    write_string(&setup_py_path, &setup_py)
}

/// Avoids missing symbol errors due to lto=on with some compilers.
/// https://github.com/matplotlib/matplotlib/issues/28357
fn patch_matplotlib(unpacked_dir: &Path) -> Result<()> {
    let meson_build_path = unpacked_dir.join("meson.build");
    let meson_build = read_to_string(&meson_build_path)?;
    let meson_build = meson_build.replace("'b_lto=true'", "'b_lto=false'");
    write_string(&meson_build_path, &meson_build)
}
