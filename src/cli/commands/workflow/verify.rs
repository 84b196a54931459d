//! Verify command - check a finalized run against its archive seal

use clap::Args;
use console::style;
use miette::{bail, Result};

use crate::cli::helpers::load_run;
use crate::core::{FileArchive, Project};

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Run ID, ID prefix, or run code
    pub id: String,
}

pub fn run(args: VerifyArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let (_, run) = load_run(&project, &args.id)?;

    let archive = FileArchive::new(&project);
    let verdict = archive.verify(&run).map_err(|e| miette::miette!("{}", e))?;

    if verdict.valid {
        println!(
            "{} Archive seal valid for run {} ({})",
            style("✓").green(),
            style(run.id.short()).cyan(),
            run.run_code
        );
        Ok(())
    } else {
        bail!(
            "Archive verification FAILED for run {} ({}): stored digest does not match",
            run.id.short(),
            run.run_code
        );
    }
}
