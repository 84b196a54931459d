//! Approve command - resolve the pending step in a run's approval chain

use clap::Args;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{load_run, resolve_actor, save_entity};
use crate::core::workflow;
use crate::core::{Config, FileArchive, Project};
use crate::entities::run::RunStatus;

#[derive(Debug, Args)]
pub struct ApproveArgs {
    /// Run ID, ID prefix, or run code
    pub id: String,

    /// Approval comment
    #[arg(long, short = 'm')]
    pub message: Option<String>,

    /// Act as this roster member instead of the configured author
    #[arg(long = "as", value_name = "NAME")]
    pub actor: Option<String>,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Skip archive sealing even if workflow.auto_archive is enabled
    #[arg(long)]
    pub no_archive: bool,
}

pub fn run(args: ApproveArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load(&project);
    let actor = resolve_actor(&project, &config, args.actor.as_deref())?;
    let (path, mut run) = load_run(&project, &args.id)?;

    if !args.yes {
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Approve run {} ({}) as {}?",
                run.id.short(),
                run.run_code,
                actor.name
            ))
            .default(true)
            .interact()
            .into_diagnostic()?;
        if !proceed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let status =
        workflow::approve(&mut run, args.message.clone(), &actor).map_err(|e| miette::miette!("{}", e))?;
    save_entity(&path, &run)?;

    let archived = if status == RunStatus::Done && config.workflow.auto_archive && !args.no_archive
    {
        let archive = FileArchive::new(&project);
        archive
            .seal_and_store(&run)
            .map_err(|e| miette::miette!("{}", e))?;
        true
    } else {
        false
    };

    println!(
        "{} Approved run {} - status {}{}",
        style("✓").green(),
        style(run.id.short()).cyan(),
        style(status.to_string()).yellow(),
        if archived { " (archive sealed)" } else { "" }
    );
    Ok(())
}
