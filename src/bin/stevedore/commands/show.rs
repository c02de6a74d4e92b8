//! `stevedore show` command

use anyhow::Result;

use stevedore::ops::show::{read_pyproject, render_external, system_install_command, validate_purl};
use stevedore::util::PackageManagerRegistry;
use stevedore::{RemoteStore, Workspace};

use crate::cli::ShowArgs;

pub fn execute(args: ShowArgs) -> Result<()> {
    let sdist_dir = match args.sdist_dir {
        Some(dir) => dir,
        None => Workspace::current()?.amended_dir(),
    };

    let manifest = read_pyproject(&args.package, &sdist_dir)?;
    let deps = manifest.external_deps()?;

    let mut store = RemoteStore::new();

    if args.external {
        // The listing is omitted when only the install command is wanted.
        if !args.system_install_cmd {
            print!("{}", render_external(&deps));
        }
        if args.validate {
            let registry = store.registry()?;
            for purl in deps.all() {
                validate_purl(&purl, &registry);
            }
        }
    }

    if args.system_install_cmd {
        let command = system_install_command(
            &deps,
            &mut store,
            &PackageManagerRegistry::builtin(),
            args.package_manager.as_deref(),
        )?;
        println!("{}", command.join(" "));
    }

    Ok(())
}
