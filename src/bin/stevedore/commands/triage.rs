//! `stevedore triage` command

use anyhow::Result;

use stevedore::ops::triage::{load_top_packages, triage, write_lists};
use stevedore::{PyPiClient, Workspace};

use crate::cli::TriageArgs;

pub fn execute(args: TriageArgs) -> Result<()> {
    let ws = Workspace::current()?;
    let input = args.input.unwrap_or_else(|| ws.top_packages_dump());
    let output_dir = args.output_dir.unwrap_or_else(|| ws.top_packages_dir());

    let packages = load_top_packages(&input, args.limit)?;
    let client = PyPiClient::new();

    let (pure, nonpure) = triage(&client, &packages);
    write_lists(&output_dir, args.limit, &pure, &nonpure)?;

    println!(
        "Classified {} packages: {} pure, {} non-pure",
        pure.len() + nonpure.len(),
        pure.len(),
        nonpure.len()
    );

    Ok(())
}
