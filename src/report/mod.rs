//! CI result summarization.
//!
//! Job records come either from snapshot files under `results/` or, when
//! an access token is present, live from the CI API (the latest run id is
//! discovered through the `gh` CLI and the fetched pages are snapshotted
//! for later replays).

pub mod markers;
pub mod tables;

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::workspace::Workspace;
use crate::util::fs::{read_to_string, write_string};

/// Size of the non-pure package corpus under test. Used as the success
/// denominator and as the success-matrix row count; must be kept in sync
/// with the download ranking file.
pub const EXPECTED_PACKAGE_COUNT: usize = 37;

/// Repository whose CI runs are summarized.
const RESULTS_REPO: &str = "rgommers/external-deps-build";

/// Workflow whose latest run is fetched in live mode.
const RESULTS_WORKFLOW: &str = "build_all.yml";

/// Integrity failures in aggregated report data.
#[derive(Debug, Error, Diagnostic)]
pub enum ReportError {
    /// The success matrix does not cover the expected package corpus.
    #[error("success matrix has {actual} rows; expected {expected}")]
    #[diagnostic(
        code(stevedore::report::corpus_size_mismatch),
        help("the expected corpus size must match the packages present in both the job records and the download ranking")
    )]
    CorpusSizeMismatch { expected: usize, actual: usize },
}

/// One CI job, reduced to the fields the tables need.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub package: String,
    pub distro: String,
    /// Control job built without external metadata; excluded from reporting.
    pub baseline: bool,
    pub success: bool,
    pub duration: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
struct JobsDocument {
    jobs: Vec<RawJob>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawJob {
    name: String,
    conclusion: Option<String>,
    started_at: String,
    completed_at: String,
}

impl RawJob {
    /// Parse the `"<package>, <distro>, <flag>"` job name convention.
    /// Two-field names are smoke-test jobs and yield `None`.
    fn to_record(&self) -> Result<Option<JobRecord>> {
        let fields: Vec<&str> = self.name.split(", ").collect();
        let [package, distro, flag] = fields.as_slice() else {
            if fields.len() == 2 {
                return Ok(None);
            }
            bail!("unexpected job name: {}", self.name);
        };

        let started: DateTime<Utc> = self
            .started_at
            .parse()
            .with_context(|| format!("bad started_at timestamp: {}", self.started_at))?;
        let completed: DateTime<Utc> = self
            .completed_at
            .parse()
            .with_context(|| format!("bad completed_at timestamp: {}", self.completed_at))?;

        Ok(Some(JobRecord {
            package: package.to_string(),
            distro: distro.to_string(),
            baseline: *flag == "false",
            success: self.conclusion.as_deref() == Some("success"),
            duration: completed - started,
        }))
    }
}

fn parse_jobs(jobs: &[RawJob]) -> Result<Vec<JobRecord>> {
    jobs.iter()
        .filter_map(|job| job.to_record().transpose())
        .collect()
}

/// Load job records from the snapshot files under `results/`.
pub fn load_records(ws: &Workspace) -> Result<Vec<JobRecord>> {
    let mut jobs = Vec::new();
    for snapshot in ["jobs_first100.json", "jobs_second48.json"] {
        let path = ws.results_dir().join(snapshot);
        let document: JobsDocument = serde_json::from_str(&read_to_string(&path)?)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        jobs.extend(document.jobs);
    }
    parse_jobs(&jobs)
}

/// Fetch job records for the latest CI run and refresh the snapshots.
pub fn fetch_records(ws: &Workspace, token: &str) -> Result<Vec<JobRecord>> {
    let run_id = latest_run_id()?;
    tracing::info!("Fetching job data for run {}", run_id);

    let client = reqwest::blocking::Client::new();
    let mut jobs = Vec::new();
    for page in [1, 2] {
        let url = format!(
            "https://api.github.com/repos/{RESULTS_REPO}/actions/runs/{run_id}/jobs?per_page=100&page={page}"
        );
        let response = client
            .get(&url)
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"))
            .header(reqwest::header::USER_AGENT, "stevedore")
            .send()
            .with_context(|| format!("failed to fetch {url}"))?;

        if !response.status().is_success() {
            bail!("failed to fetch {url}: HTTP {}", response.status());
        }

        let document: JobsDocument = response
            .json()
            .context("failed to parse CI job listing")?;
        jobs.extend(document.jobs);
    }

    let split = jobs.len().min(100);
    write_snapshot(&ws.results_dir().join("jobs_first100.json"), &jobs[..split])?;
    write_snapshot(&ws.results_dir().join("jobs_second48.json"), &jobs[split..])?;

    parse_jobs(&jobs)
}

fn write_snapshot(path: &Path, jobs: &[RawJob]) -> Result<()> {
    let document = serde_json::json!({ "jobs": jobs });
    write_string(path, &serde_json::to_string(&document)?)
}

/// Latest run id of the results workflow, via the `gh` CLI.
fn latest_run_id() -> Result<u64> {
    let workflow = format!("--workflow={RESULTS_WORKFLOW}");
    let output = Command::new("gh")
        .args([
            "run",
            "list",
            "--branch=main",
            workflow.as_str(),
            "--limit=1",
            "--json=databaseId",
            "--jq=.[].databaseId",
        ])
        .output()
        .context("failed to run gh")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("gh run list failed:\n{}", stderr);
    }

    String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse()
        .context("gh run list returned no run id")
}

/// Read the download-popularity ranking, one package name per line.
pub fn load_download_ranking(path: &Path) -> Result<Vec<String>> {
    Ok(read_to_string(path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, conclusion: &str, started: &str, completed: &str) -> RawJob {
        RawJob {
            name: name.to_string(),
            conclusion: Some(conclusion.to_string()),
            started_at: started.to_string(),
            completed_at: completed.to_string(),
        }
    }

    #[test]
    fn test_job_name_parsing() {
        let jobs = vec![raw(
            "numpy, fedora, true",
            "success",
            "2023-10-19T08:00:00Z",
            "2023-10-19T08:05:30Z",
        )];
        let records = parse_jobs(&jobs).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.package, "numpy");
        assert_eq!(record.distro, "fedora");
        assert!(!record.baseline);
        assert!(record.success);
        assert_eq!(record.duration.num_seconds(), 330);
    }

    #[test]
    fn test_baseline_flag() {
        let jobs = vec![raw(
            "numpy, fedora, false",
            "failure",
            "2023-10-19T08:00:00Z",
            "2023-10-19T08:01:00Z",
        )];
        let records = parse_jobs(&jobs).unwrap();
        assert!(records[0].baseline);
        assert!(!records[0].success);
    }

    #[test]
    fn test_smoke_test_jobs_are_skipped() {
        let jobs = vec![
            raw(
                "smoke, fedora",
                "success",
                "2023-10-19T08:00:00Z",
                "2023-10-19T08:01:00Z",
            ),
            raw(
                "numpy, fedora, true",
                "success",
                "2023-10-19T08:00:00Z",
                "2023-10-19T08:01:00Z",
            ),
        ];
        let records = parse_jobs(&jobs).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].package, "numpy");
    }

    #[test]
    fn test_in_progress_job_is_a_failure() {
        let mut job = raw(
            "numpy, fedora, true",
            "success",
            "2023-10-19T08:00:00Z",
            "2023-10-19T08:01:00Z",
        );
        job.conclusion = None;
        let records = parse_jobs(&[job]).unwrap();
        assert!(!records[0].success);
    }
}
