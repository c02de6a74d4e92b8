//! External dependency identifiers.
//!
//! An external dependency is named by a PURL-style string of the form
//! `<scheme>:<namespace>/<name>`, e.g. `dep:generic/openssl` or
//! `dep:virtual/compiler/c`. The identifier is abstract: it names a
//! capability or library independent of any packaging ecosystem.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The virtual C compiler capability.
pub const C_COMPILER: &str = "dep:virtual/compiler/c";

/// The virtual C++ compiler capability.
pub const CPP_COMPILER: &str = "dep:virtual/compiler/cpp";

/// The generic Python identifier; its mapping entry names the Python
/// development package for an ecosystem.
pub const PYTHON: &str = "dep:generic/python";

/// A namespaced external dependency identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Purl(String);

/// Error parsing a PURL string.
#[derive(Debug, Error)]
#[error("invalid external dependency identifier `{0}`: expected `<scheme>:<namespace>/<name>`")]
pub struct ParsePurlError(String);

impl Purl {
    /// Parse and validate an identifier.
    pub fn new(s: impl Into<String>) -> Result<Self, ParsePurlError> {
        let s = s.into();
        let Some((scheme, rest)) = s.split_once(':') else {
            return Err(ParsePurlError(s));
        };
        if scheme.is_empty() || !rest.contains('/') || rest.starts_with('/') || rest.ends_with('/') {
            return Err(ParsePurlError(s));
        }
        Ok(Purl(s))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The scheme portion (before the first `:`).
    pub fn scheme(&self) -> &str {
        self.0.split_once(':').map(|(s, _)| s).unwrap_or(&self.0)
    }

    /// The `dep:generic/python` identifier.
    pub fn python() -> Self {
        Purl(PYTHON.to_string())
    }

    /// Whether this identifier is one of the virtual compiler capabilities.
    pub fn is_compiler(&self) -> bool {
        self.0 == C_COMPILER || self.0 == CPP_COMPILER
    }
}

impl FromStr for Purl {
    type Err = ParsePurlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Purl::new(s)
    }
}

impl fmt::Display for Purl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let purl: Purl = "dep:generic/openssl".parse().unwrap();
        assert_eq!(purl.as_str(), "dep:generic/openssl");
        assert_eq!(purl.scheme(), "dep");
        assert!(!purl.is_compiler());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("openssl".parse::<Purl>().is_err());
        assert!("dep:openssl".parse::<Purl>().is_err());
        assert!(":generic/openssl".parse::<Purl>().is_err());
        assert!("dep:generic/".parse::<Purl>().is_err());
    }

    #[test]
    fn test_compiler_identifiers() {
        assert!(C_COMPILER.parse::<Purl>().unwrap().is_compiler());
        assert!(CPP_COMPILER.parse::<Purl>().unwrap().is_compiler());
        assert!(!Purl::python().is_compiler());
    }
}
