//! High-level operations.
//!
//! This module contains the implementation of Stevedore commands.

pub mod fetch;
pub mod patch;
pub mod show;
pub mod triage;

pub use fetch::{append_external_metadata, fetch_and_amend, repack_sdist, unpack_sdist};
pub use patch::PatchRegistry;
pub use show::{locate_sdist, read_pyproject, system_install_command, validate_purl};
pub use triage::{classify, triage, Purity};
