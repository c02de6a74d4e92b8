//! Idempotent regeneration of marked report sections.
//!
//! Each table lives between a pair of HTML comment markers in the report
//! document, e.g. `<!-- DISTRO_TABLE -->` ... `<!-- /DISTRO_TABLE -->`.
//! Regeneration replaces only the content between the markers, so running
//! it twice with the same tables leaves the document unchanged.

use std::path::Path;

use anyhow::{bail, Result};
use regex::{NoExpand, Regex};

use crate::util::fs::{read_to_string, write_string};

/// Replace the content between a marker pair.
pub fn replace_section(text: &str, marker: &str, table: &str) -> Result<String> {
    let pattern = format!(
        r"(?s)<!-- {marker} -->.*<!-- /{marker} -->",
        marker = regex::escape(marker)
    );
    let re = Regex::new(&pattern).unwrap();

    if !re.is_match(text) {
        bail!("marker pair <!-- {marker} --> not found in report document");
    }

    let replacement = format!("<!-- {marker} -->\n{table}\n<!-- /{marker} -->");
    Ok(re.replace(text, NoExpand(&replacement)).into_owned())
}

/// Regenerate all marked sections of a report document in place.
pub fn update_document(path: &Path, sections: &[(&str, &str)]) -> Result<()> {
    let mut text = read_to_string(path)?;
    for (marker, table) in sections {
        text = replace_section(&text, marker, table)?;
    }
    write_string(path, &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DOCUMENT: &str = "\
# Results

<!-- DISTRO_TABLE -->
stale
<!-- /DISTRO_TABLE -->

Some prose.

<!-- SUCCESS_TABLE -->
also stale
<!-- /SUCCESS_TABLE -->
";

    #[test]
    fn test_replace_section() {
        let updated = replace_section(DOCUMENT, "DISTRO_TABLE", "| distro |").unwrap();
        assert!(updated.contains("<!-- DISTRO_TABLE -->\n| distro |\n<!-- /DISTRO_TABLE -->"));
        assert!(!updated.contains("stale\n<!-- /DISTRO_TABLE -->"));
        // Other sections are untouched.
        assert!(updated.contains("also stale"));
    }

    #[test]
    fn test_replace_section_is_idempotent() {
        let once = replace_section(DOCUMENT, "DISTRO_TABLE", "| distro |").unwrap();
        let twice = replace_section(&once, "DISTRO_TABLE", "| distro |").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_replacement_is_literal() {
        // Table content must not be treated as a regex replacement template.
        let updated = replace_section(DOCUMENT, "DISTRO_TABLE", "cost: $1").unwrap();
        assert!(updated.contains("cost: $1"));
    }

    #[test]
    fn test_missing_marker_is_an_error() {
        let err = replace_section(DOCUMENT, "DURATION_TABLE", "| x |").unwrap_err();
        assert!(err.to_string().contains("DURATION_TABLE"));
    }

    #[test]
    fn test_update_document() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("README.md");
        write_string(&path, DOCUMENT).unwrap();

        update_document(
            &path,
            &[("DISTRO_TABLE", "| distro |"), ("SUCCESS_TABLE", "| pkg |")],
        )
        .unwrap();

        let text = read_to_string(&path).unwrap();
        assert!(text.contains("| distro |"));
        assert!(text.contains("| pkg |"));
        assert!(!text.contains("stale"));
    }
}
