//! Ecosystem mapping documents and the known-ecosystems index.
//!
//! A mapping document translates abstract dependency identifiers into
//! concrete package names for one target ecosystem (a Linux distribution
//! family, a scientific-package channel, etc.). Documents are published as
//! JSON; the raw shape is normalized at load time so the resolver never
//! branches on document layout.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::core::purl::Purl;
use crate::util::dedup_first_seen;

/// Which spec bucket a dependency declaration resolves against.
///
/// Build-time declarations (`build-requires`, `host-requires`) collapse to
/// `Build`; run-time declarations (`dependencies`) map to `Run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecKind {
    Build,
    Run,
}

/// Normalized per-kind spec buckets for one mapping entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecSet {
    pub build: Vec<String>,
    pub host: Vec<String>,
    pub run: Vec<String>,
}

impl SpecSet {
    /// The concrete package names to install for a declaration kind.
    ///
    /// Build-time declarations take the entry's `build` and `host` lists;
    /// run-time declarations take `run`.
    pub fn for_kind(&self, kind: SpecKind) -> Vec<String> {
        match kind {
            SpecKind::Build => dedup_first_seen(
                self.build
                    .iter()
                    .chain(&self.host)
                    .cloned()
                    .collect::<Vec<_>>(),
            ),
            SpecKind::Run => self.run.clone(),
        }
    }
}

/// A package manager available in an ecosystem, with the literal argv
/// prefix used to install packages.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManager {
    pub name: String,

    #[serde(default)]
    pub install_command: Vec<String>,
}

impl PackageManager {
    /// Assemble the full install command for a list of packages.
    pub fn build_install_command(&self, packages: &[String]) -> Vec<String> {
        self.install_command
            .iter()
            .cloned()
            .chain(packages.iter().cloned())
            .collect()
    }
}

/// Raw `specs` field: a single name, a flat list, or a per-kind table.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawSpecs {
    Single(String),
    List(Vec<String>),
    PerKind {
        #[serde(default)]
        build: Vec<String>,
        #[serde(default)]
        host: Vec<String>,
        #[serde(default)]
        run: Vec<String>,
    },
}

impl RawSpecs {
    fn normalize(self) -> SpecSet {
        match self {
            // A bare name or list applies to every kind.
            RawSpecs::Single(name) => SpecSet {
                build: vec![name.clone()],
                host: vec![name.clone()],
                run: vec![name],
            },
            RawSpecs::List(names) => SpecSet {
                build: names.clone(),
                host: names.clone(),
                run: names,
            },
            RawSpecs::PerKind { build, host, run } => SpecSet { build, host, run },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawMappingEntry {
    id: String,

    #[serde(default)]
    specs: Option<RawSpecs>,

    #[serde(default)]
    specs_from: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawMappingDoc {
    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    package_managers: Vec<PackageManager>,

    #[serde(default)]
    mappings: Vec<RawMappingEntry>,
}

/// A loaded, normalized mapping document for one ecosystem.
#[derive(Debug, Clone)]
pub struct MappingDoc {
    name: Option<String>,
    package_managers: Vec<PackageManager>,
    entries: BTreeMap<String, SpecSet>,
}

impl MappingDoc {
    /// Parse and normalize a mapping document from JSON text.
    ///
    /// `specs_from` indirections are resolved here; an entry deferring to a
    /// missing identifier or participating in a reference cycle is an error.
    /// Entries with neither `specs` nor `specs_from` are dropped (they
    /// behave as unmapped).
    pub fn parse(json: &str) -> Result<Self> {
        let raw: RawMappingDoc =
            serde_json::from_str(json).context("failed to parse mapping document")?;

        let by_id: BTreeMap<String, RawMappingEntry> = raw
            .mappings
            .iter()
            .map(|entry| (entry.id.clone(), entry.clone()))
            .collect();

        let mut entries = BTreeMap::new();
        for entry in &raw.mappings {
            if let Some(specs) = resolve_specs(entry, &by_id)? {
                entries.insert(entry.id.clone(), specs.normalize());
            }
        }

        Ok(MappingDoc {
            name: raw.name,
            package_managers: raw.package_managers,
            entries,
        })
    }

    /// The ecosystem name the document declares, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Look up the spec buckets for an identifier.
    pub fn entry(&self, purl: &Purl) -> Option<&SpecSet> {
        self.entries.get(purl.as_str())
    }

    /// All package managers declared by the ecosystem.
    pub fn package_managers(&self) -> &[PackageManager] {
        &self.package_managers
    }

    /// Look up a package manager by name.
    pub fn package_manager(&self, name: &str) -> Option<&PackageManager> {
        self.package_managers.iter().find(|pm| pm.name == name)
    }

    /// The ecosystem's default package manager (the first declared one).
    pub fn default_package_manager(&self) -> Result<&PackageManager> {
        match self.package_managers.first() {
            Some(pm) => Ok(pm),
            None => bail!("mapping document declares no package managers"),
        }
    }

    /// The ecosystem's Python development packages, read from the `build`
    /// specs of the `dep:generic/python` entry.
    pub fn python_dev_specs(&self) -> Option<&[String]> {
        self.entry(&Purl::python()).map(|s| s.build.as_slice())
    }
}

fn resolve_specs(
    entry: &RawMappingEntry,
    by_id: &BTreeMap<String, RawMappingEntry>,
) -> Result<Option<RawSpecs>> {
    match (&entry.specs, &entry.specs_from) {
        (Some(_), Some(_)) => bail!(
            "mapping entry `{}` has both `specs` and `specs_from`",
            entry.id
        ),
        (Some(specs), None) => Ok(Some(specs.clone())),
        (None, None) => Ok(None),
        (None, Some(_)) => {
            let mut visited = vec![entry.id.clone()];
            let mut current = entry;
            while let Some(target) = &current.specs_from {
                if visited.contains(target) {
                    bail!(
                        "cycle in `specs_from` references: {}",
                        visited.join(" -> ")
                    );
                }
                visited.push(target.clone());
                current = by_id.get(target).with_context(|| {
                    format!(
                        "mapping entry `{}` defers to unknown identifier `{target}`",
                        entry.id
                    )
                })?;
            }
            Ok(current.specs.clone())
        }
    }
}

/// The index of known ecosystems, keyed by ecosystem name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EcosystemIndex {
    #[serde(default)]
    pub ecosystems: BTreeMap<String, EcosystemEntry>,
}

/// One entry in the known-ecosystems index.
#[derive(Debug, Clone, Deserialize)]
pub struct EcosystemEntry {
    /// Mapping document location: a name resolved against the dataset
    /// root, or a full URL.
    pub mapping: String,
}

impl EcosystemIndex {
    /// Parse the index from JSON text.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse known-ecosystems index")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "name": "fedora",
        "package_managers": [
            {"name": "dnf", "install_command": ["sudo", "dnf", "install"]},
            {"name": "dnf5", "install_command": ["sudo", "dnf5", "install"]}
        ],
        "mappings": [
            {"id": "dep:generic/openssl", "specs": "openssl-devel"},
            {"id": "dep:generic/zlib", "specs": ["zlib", "zlib-devel"]},
            {
                "id": "dep:generic/python",
                "specs": {"build": ["python3-devel"], "run": ["python3"]}
            },
            {"id": "dep:generic/libssl", "specs_from": "dep:generic/openssl"},
            {"id": "dep:generic/unmapped"}
        ]
    }"#;

    fn doc() -> MappingDoc {
        MappingDoc::parse(DOC).unwrap()
    }

    #[test]
    fn test_specs_shapes_normalize_identically() {
        let doc = doc();

        let single = doc.entry(&"dep:generic/openssl".parse().unwrap()).unwrap();
        assert_eq!(single.for_kind(SpecKind::Build), ["openssl-devel"]);
        assert_eq!(single.for_kind(SpecKind::Run), ["openssl-devel"]);

        let list = doc.entry(&"dep:generic/zlib".parse().unwrap()).unwrap();
        assert_eq!(list.for_kind(SpecKind::Run), ["zlib", "zlib-devel"]);

        let per_kind = doc.entry(&"dep:generic/python".parse().unwrap()).unwrap();
        assert_eq!(per_kind.for_kind(SpecKind::Build), ["python3-devel"]);
        assert_eq!(per_kind.for_kind(SpecKind::Run), ["python3"]);
    }

    #[test]
    fn test_specs_from_resolved_at_load() {
        let doc = doc();
        assert_eq!(
            doc.entry(&"dep:generic/libssl".parse().unwrap()),
            doc.entry(&"dep:generic/openssl".parse().unwrap())
        );
    }

    #[test]
    fn test_entry_without_specs_is_unmapped() {
        let doc = doc();
        assert!(doc.entry(&"dep:generic/unmapped".parse().unwrap()).is_none());
    }

    #[test]
    fn test_specs_from_cycle_is_an_error() {
        let json = r#"{
            "mappings": [
                {"id": "dep:generic/a", "specs_from": "dep:generic/b"},
                {"id": "dep:generic/b", "specs_from": "dep:generic/a"}
            ]
        }"#;
        assert!(MappingDoc::parse(json).is_err());
    }

    #[test]
    fn test_python_dev_specs() {
        assert_eq!(doc().python_dev_specs().unwrap(), ["python3-devel"]);
    }

    #[test]
    fn test_package_manager_lookup_and_default() {
        let doc = doc();
        assert_eq!(doc.default_package_manager().unwrap().name, "dnf");
        let dnf5 = doc.package_manager("dnf5").unwrap();
        assert_eq!(
            dnf5.build_install_command(&["zlib-devel".to_string()]),
            ["sudo", "dnf5", "install", "zlib-devel"]
        );
        assert!(doc.package_manager("apt-get").is_none());
    }

    #[test]
    fn test_ecosystem_index_parse() {
        let index = EcosystemIndex::parse(
            r#"{"ecosystems": {
                "fedora": {"mapping": "fedora"},
                "ubuntu": {"mapping": "https://data.example.invalid/ubuntu.mapping.json"}
            }}"#,
        )
        .unwrap();
        assert_eq!(index.ecosystems.len(), 2);
        assert_eq!(index.ecosystems["fedora"].mapping, "fedora");
    }

    #[test]
    fn test_build_kind_takes_build_and_host() {
        let specs = SpecSet {
            build: vec!["gcc".into()],
            host: vec!["libfoo-dev".into(), "gcc".into()],
            run: vec!["libfoo".into()],
        };
        assert_eq!(specs.for_kind(SpecKind::Build), ["gcc", "libfoo-dev"]);
        assert_eq!(specs.for_kind(SpecKind::Run), ["libfoo"]);
    }
}
