//! `stevedore summarize` command

use anyhow::Result;

use stevedore::report::{self, markers, tables, JobRecord};
use stevedore::Workspace;

use crate::cli::SummarizeArgs;

pub fn execute(args: SummarizeArgs) -> Result<()> {
    let ws = match args.root {
        Some(root) => Workspace::new(root),
        None => Workspace::current()?,
    };

    let records = match std::env::var("GH_TOKEN") {
        Ok(token) if !token.is_empty() => report::fetch_records(&ws, &token)?,
        _ => report::load_records(&ws)?,
    };

    // Baseline control jobs are excluded from all reporting.
    let distro_rows: Vec<JobRecord> = records.into_iter().filter(|r| !r.baseline).collect();
    let ranking = report::load_download_ranking(&ws.download_ranking())?;

    let distro_table = tables::success_stats(&distro_rows);
    let duration_table = tables::durations(&distro_rows);
    let success_table = tables::success_matrix(&distro_rows, &ranking)?;

    println!("Overall number of successful builds per distro:\n");
    println!("{distro_table}");
    println!("Average CI job duration per package for the heaviest builds:\n");
    println!("{duration_table}");
    println!("Per-package success/failure:\n");
    println!("{success_table}");

    if args.update_readme {
        markers::update_document(
            &ws.readme(),
            &[
                ("DISTRO_TABLE", distro_table.trim_end()),
                ("DURATION_TABLE", duration_table.trim_end()),
                ("SUCCESS_TABLE", success_table.trim_end()),
            ],
        )?;
        println!("Updated {}", ws.readme().display());
    }

    Ok(())
}
