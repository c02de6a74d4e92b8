//! `stevedore fetch` command

use anyhow::Result;

use stevedore::ops::{fetch_and_amend, PatchRegistry};
use stevedore::{PyPiClient, Workspace};

use crate::cli::FetchArgs;

pub fn execute(args: FetchArgs) -> Result<()> {
    let ws = match args.root {
        Some(root) => Workspace::new(root),
        None => Workspace::current()?,
    };
    let client = PyPiClient::new();
    let patches = PatchRegistry::builtin();

    let amended = fetch_and_amend(&ws, &client, &patches, &args.package)?;
    println!("Amended sdist written to {}", amended.display());

    Ok(())
}
