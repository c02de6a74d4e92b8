//! Mapping the four dependency buckets onto concrete package names.

use crate::core::mapping::{MappingDoc, SpecKind};
use crate::core::purl::Purl;
use crate::core::pyproject::ExternalDeps;
use crate::resolver::errors::ResolveError;
use crate::util::dedup_first_seen;

/// Resolve external dependencies against an ecosystem mapping.
///
/// Buckets are processed in fixed order: required-build, optional-build,
/// required-run, optional-run. A missing mapping entry is an error for a
/// required identifier and an informational no-op for an optional one.
/// If the required build dependencies use a C or C++ compiler, the
/// ecosystem's Python development packages are appended (building native
/// extension modules needs the interpreter headers; only the ecosystem's
/// default Python version is considered).
///
/// The result is deduplicated preserving first-encountered order, so
/// identical inputs always yield an identically-ordered output list.
pub fn resolve(deps: &ExternalDeps, mapping: &MappingDoc) -> Result<Vec<String>, ResolveError> {
    let buckets: [(&[Purl], SpecKind, bool); 4] = [
        (&deps.build, SpecKind::Build, false),
        (&deps.optional_build, SpecKind::Build, true),
        (&deps.run, SpecKind::Run, false),
        (&deps.optional_run, SpecKind::Run, true),
    ];

    let mut resolved = Vec::new();
    for (group, kind, optional) in buckets {
        for purl in group {
            match mapping.entry(purl) {
                Some(specs) => resolved.extend(specs.for_kind(kind)),
                None if optional => {
                    tracing::info!(
                        "optional mapping entry for external dependency `{purl}` missing"
                    );
                }
                None => {
                    return Err(ResolveError::MissingMapping {
                        purl: purl.to_string(),
                    })
                }
            }
        }
    }

    if deps.build.iter().any(Purl::is_compiler) {
        let python_dev = mapping
            .python_dev_specs()
            .ok_or(ResolveError::MissingPythonDev)?;
        resolved.extend(python_dev.iter().cloned());
    }

    Ok(dedup_first_seen(resolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pyproject::PyProject;

    const MAPPING: &str = r#"{
        "name": "fedora",
        "package_managers": [{"name": "dnf", "install_command": ["sudo", "dnf", "install"]}],
        "mappings": [
            {"id": "dep:virtual/compiler/c", "specs": {"build": ["gcc"]}},
            {"id": "dep:virtual/compiler/cpp", "specs": {"build": ["gcc-c++"]}},
            {"id": "dep:generic/openblas", "specs": {"build": ["openblas-devel"], "run": ["openblas"]}},
            {"id": "dep:generic/libffi", "specs": {"build": ["libffi-devel"], "run": ["libffi"]}},
            {"id": "dep:generic/ninja", "specs": {"build": ["ninja-build"]}},
            {"id": "dep:generic/python", "specs": {"build": ["python3-devel"], "run": ["python3"]}}
        ]
    }"#;

    fn mapping() -> MappingDoc {
        MappingDoc::parse(MAPPING).unwrap()
    }

    fn deps(manifest: &str) -> ExternalDeps {
        PyProject::parse(manifest).unwrap().external_deps().unwrap()
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let deps = deps(
            r#"
[external]
build-requires = ["dep:generic/openblas", "dep:generic/ninja"]
dependencies = ["dep:generic/libffi"]
"#,
        );
        let first = resolve(&deps, &mapping()).unwrap();
        let second = resolve(&deps, &mapping()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, ["openblas-devel", "ninja-build", "libffi"]);
    }

    #[test]
    fn test_dedup_is_order_preserving() {
        let deps = deps(
            r#"
[external]
dependencies = ["dep:generic/openblas", "dep:generic/libffi", "dep:generic/openblas"]
"#,
        );
        let resolved = resolve(&deps, &mapping()).unwrap();
        assert_eq!(resolved, ["openblas", "libffi"]);
    }

    #[test]
    fn test_compiler_appends_python_dev_once() {
        let deps = deps(
            r#"
[external]
build-requires = ["dep:virtual/compiler/c", "dep:generic/openblas"]
"#,
        );
        let resolved = resolve(&deps, &mapping()).unwrap();
        assert_eq!(resolved, ["gcc", "openblas-devel", "python3-devel"]);
        assert_eq!(
            resolved.iter().filter(|s| *s == "python3-devel").count(),
            1
        );
    }

    #[test]
    fn test_cpp_compiler_also_triggers_python_dev() {
        let deps = deps(
            r#"
[external]
build-requires = ["dep:virtual/compiler/cpp"]
"#,
        );
        let resolved = resolve(&deps, &mapping()).unwrap();
        assert_eq!(resolved, ["gcc-c++", "python3-devel"]);
    }

    #[test]
    fn test_optional_compiler_does_not_trigger_python_dev() {
        let deps = deps(
            r#"
[external.optional-build-requires]
extra = ["dep:virtual/compiler/c"]
"#,
        );
        let resolved = resolve(&deps, &mapping()).unwrap();
        assert_eq!(resolved, ["gcc"]);
    }

    #[test]
    fn test_missing_required_mapping_is_an_error() {
        let deps = deps(
            r#"
[external]
dependencies = ["dep:generic/nosuch"]
"#,
        );
        let err = resolve(&deps, &mapping()).unwrap_err();
        assert!(matches!(err, ResolveError::MissingMapping { .. }));
        assert!(err.to_string().contains("dep:generic/nosuch"));
    }

    #[test]
    fn test_missing_optional_mapping_is_skipped() {
        let deps = deps(
            r#"
[external]
dependencies = ["dep:generic/libffi"]

[external.optional-dependencies]
extra = ["dep:generic/nosuch"]
"#,
        );
        let resolved = resolve(&deps, &mapping()).unwrap();
        assert_eq!(resolved, ["libffi"]);
    }

    #[test]
    fn test_bucket_processing_order() {
        let deps = deps(
            r#"
[external]
build-requires = ["dep:generic/openblas"]
dependencies = ["dep:generic/libffi"]

[external.optional-build-requires]
extra = ["dep:generic/ninja"]

[external.optional-dependencies]
extra = ["dep:generic/openblas"]
"#,
        );
        let resolved = resolve(&deps, &mapping()).unwrap();
        // required-build, optional-build, required-run, optional-run
        assert_eq!(resolved, ["openblas-devel", "ninja-build", "libffi", "openblas"]);
    }
}
