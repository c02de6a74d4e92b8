//! Stevedore - tooling for Python sdists with external dependencies
//!
//! This crate provides the core library functionality for Stevedore,
//! including sdist acquisition and amending, external dependency
//! resolution against ecosystem mapping datasets, and CI result
//! summarization.

pub mod core;
pub mod ops;
pub mod report;
pub mod resolver;
pub mod sources;
pub mod util;

pub use crate::core::{
    mapping::{EcosystemIndex, MappingDoc, PackageManager},
    purl::Purl,
    pyproject::{ExternalDeps, PyProject},
    registry::CanonicalRegistry,
    workspace::Workspace,
};

pub use crate::resolver::{resolve, ResolveError};
pub use crate::sources::{PyPiClient, RemoteStore};
