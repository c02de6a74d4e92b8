//! Target ecosystem detection.
//!
//! The ecosystem-to-package-manager table is an explicit registry built at
//! process start and passed by reference, rather than a module-level global.

use std::collections::BTreeMap;
use std::path::Path;

/// Known ecosystems and the package manager each one installs with.
#[derive(Debug, Clone)]
pub struct PackageManagerRegistry {
    by_ecosystem: BTreeMap<String, String>,
}

impl PackageManagerRegistry {
    /// The built-in ecosystem table.
    pub fn builtin() -> Self {
        let by_ecosystem = [
            ("arch", "pacman"),
            ("fedora", "dnf"),
            ("ubuntu", "apt-get"),
            ("conda-forge", "mamba"),
            ("homebrew", "brew"),
        ]
        .into_iter()
        .map(|(eco, pm)| (eco.to_string(), pm.to_string()))
        .collect();

        PackageManagerRegistry { by_ecosystem }
    }

    /// Whether the ecosystem is known to this registry.
    pub fn supports(&self, ecosystem: &str) -> bool {
        self.by_ecosystem.contains_key(ecosystem)
    }

    /// The package manager an ecosystem installs with.
    pub fn package_manager_for(&self, ecosystem: &str) -> Option<&str> {
        self.by_ecosystem.get(ecosystem).map(String::as_str)
    }
}

/// Detect the ecosystem of the running host.
///
/// Falls back to `fedora` with a warning when the host is not recognized.
pub fn detect(registry: &PackageManagerRegistry) -> String {
    for candidate in host_ids() {
        if candidate == "darwin" {
            return "homebrew".to_string();
        }
        if registry.supports(&candidate) {
            return candidate;
        }
    }

    tracing::warn!("no support for this host's distro yet; assuming fedora");
    "fedora".to_string()
}

#[cfg(target_os = "macos")]
fn host_ids() -> Vec<String> {
    vec!["darwin".to_string()]
}

#[cfg(not(target_os = "macos"))]
fn host_ids() -> Vec<String> {
    os_release_ids(Path::new("/etc/os-release"))
}

/// Read the `ID` and `ID_LIKE` fields from an os-release file, in that
/// order (`ID_LIKE` may list several space-separated parents).
fn os_release_ids(path: &Path) -> Vec<String> {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return Vec::new();
    };

    let mut id = None;
    let mut id_like = Vec::new();
    for line in contents.lines() {
        if let Some(value) = line.strip_prefix("ID=") {
            id = Some(unquote(value).to_string());
        } else if let Some(value) = line.strip_prefix("ID_LIKE=") {
            id_like = unquote(value)
                .split_whitespace()
                .map(str::to_string)
                .collect();
        }
    }

    id.into_iter().chain(id_like).collect()
}

fn unquote(value: &str) -> &str {
    value.trim_matches('"')
}
