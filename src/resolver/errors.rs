//! Resolution error types and diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// Error during dependency resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    /// A required dependency has no mapping entry for the target ecosystem.
    #[error("mapping entry for external dependency `{purl}` missing")]
    #[diagnostic(
        code(stevedore::resolve::missing_mapping),
        help("add `{purl}` to the ecosystem mapping, or declare the dependency under an optional table")
    )]
    MissingMapping { purl: String },

    /// The mapping has no `dep:generic/python` entry, so the implicit
    /// Python development dependency cannot be resolved.
    #[error("mapping has no entry for `dep:generic/python`")]
    #[diagnostic(
        code(stevedore::resolve::missing_python_dev),
        help("the ecosystem mapping must name its Python development package under `dep:generic/python`")
    )]
    MissingPythonDev,
}
