//! Markdown table rendering of aggregated job records.
//!
//! Baseline rows must be filtered out by the caller; every function here
//! treats its input as the distro-under-test rows.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::Duration;

use crate::report::{JobRecord, ReportError, EXPECTED_PACKAGE_COUNT};

/// Number of packages shown in the duration table.
const DURATION_TABLE_ROWS: usize = 12;

/// Total successes per distro, over the expected corpus size.
pub fn success_stats(records: &[JobRecord]) -> String {
    let mut successes: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        let count = successes.entry(&record.distro).or_default();
        if record.success {
            *count += 1;
        }
    }

    let rows: Vec<Vec<String>> = successes
        .into_iter()
        .map(|(distro, count)| {
            vec![distro.to_string(), format!("{count}/{EXPECTED_PACKAGE_COUNT}")]
        })
        .collect();

    render_markdown(&["distro", "success"], &rows)
}

/// The packages with the longest mean successful-build duration.
pub fn durations(records: &[JobRecord]) -> String {
    let mut by_package: BTreeMap<&str, Vec<Duration>> = BTreeMap::new();
    for record in records.iter().filter(|r| r.success) {
        by_package.entry(&record.package).or_default().push(record.duration);
    }

    let mut means: Vec<(&str, i64)> = by_package
        .into_iter()
        .map(|(package, durations)| {
            let total: i64 = durations.iter().map(Duration::num_seconds).sum();
            (package, total / durations.len() as i64)
        })
        .collect();
    // Longest first; package name breaks ties so the output is stable.
    means.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let rows: Vec<Vec<String>> = means
        .into_iter()
        .take(DURATION_TABLE_ROWS)
        .map(|(package, seconds)| vec![package.to_string(), format_duration(seconds)])
        .collect();

    render_markdown(&["package", "duration"], &rows)
}

/// Package-by-distro success matrix, ordered by download popularity.
///
/// The row count must equal the expected corpus size; a mismatch means
/// the records and the ranking have drifted apart and is a hard failure.
pub fn success_matrix(records: &[JobRecord], ranking: &[String]) -> Result<String, ReportError> {
    let distros: BTreeSet<&str> = records.iter().map(|r| r.distro.as_str()).collect();
    let outcomes: HashMap<(&str, &str), bool> = records
        .iter()
        .map(|r| ((r.package.as_str(), r.distro.as_str()), r.success))
        .collect();

    let tested: BTreeSet<&str> = records.iter().map(|r| r.package.as_str()).collect();
    let packages: Vec<&String> = ranking
        .iter()
        .filter(|package| tested.contains(package.as_str()))
        .collect();

    if packages.len() != EXPECTED_PACKAGE_COUNT {
        return Err(ReportError::CorpusSizeMismatch {
            expected: EXPECTED_PACKAGE_COUNT,
            actual: packages.len(),
        });
    }

    let mut headers: Vec<&str> = vec!["package"];
    headers.extend(distros.iter().copied());

    let rows: Vec<Vec<String>> = packages
        .iter()
        .map(|package| {
            let mut row = vec![package.to_string()];
            for distro in &distros {
                let success = outcomes
                    .get(&(package.as_str(), *distro))
                    .copied()
                    .unwrap_or(false);
                row.push(glyph(success).to_string());
            }
            row
        })
        .collect();

    Ok(render_markdown(&headers, &rows))
}

fn glyph(success: bool) -> &'static str {
    if success {
        ":heavy_check_mark:"
    } else {
        ":x:"
    }
}

/// Format whole seconds as minutes and seconds, e.g. `7m 42s`.
fn format_duration(seconds: i64) -> String {
    format!("{}m {}s", seconds / 60, seconds % 60)
}

/// Render a pipe-delimited markdown table with padded columns.
fn render_markdown(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut out = String::new();
    render_row(&mut out, headers.iter().map(|h| h.to_string()), &widths);
    out.push('|');
    for width in &widths {
        out.push(':');
        out.push_str(&"-".repeat(width + 1));
        out.push('|');
    }
    out.push('\n');
    for row in rows {
        render_row(&mut out, row.iter().cloned(), &widths);
    }
    out
}

fn render_row(out: &mut String, cells: impl Iterator<Item = String>, widths: &[usize]) {
    out.push('|');
    for (cell, width) in cells.zip(widths) {
        out.push(' ');
        out.push_str(&cell);
        out.push_str(&" ".repeat(width - cell.len() + 1));
        out.push('|');
    }
    out.push('\n');
}
