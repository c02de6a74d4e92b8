//! Core data structures for Stevedore.
//!
//! This module contains the foundational types used throughout Stevedore:
//! - External dependency identifiers (PURLs)
//! - The pyproject manifest and its `[external]` table
//! - Ecosystem mapping documents and the canonical registry
//! - Workspace layout

pub mod mapping;
pub mod purl;
pub mod pyproject;
pub mod registry;
pub mod workspace;

pub use mapping::{EcosystemIndex, MappingDoc, PackageManager, SpecKind, SpecSet};
pub use purl::Purl;
pub use pyproject::{ExternalDeps, PyProject};
pub use registry::CanonicalRegistry;
pub use workspace::Workspace;
