//! Reject command - send a submitted run back for rework

use clap::Args;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{load_run, resolve_actor, save_entity};
use crate::core::workflow;
use crate::core::{Config, Project};

#[derive(Debug, Args)]
pub struct RejectArgs {
    /// Run ID, ID prefix, or run code
    pub id: String,

    /// Rejection reason
    #[arg(long, short = 'm')]
    pub message: Option<String>,

    /// Act as this roster member instead of the configured author
    #[arg(long = "as", value_name = "NAME")]
    pub actor: Option<String>,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: RejectArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load(&project);
    let actor = resolve_actor(&project, &config, args.actor.as_deref())?;
    let (path, mut run) = load_run(&project, &args.id)?;

    if !args.yes {
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Reject run {} ({}) as {}?",
                run.id.short(),
                run.run_code,
                actor.name
            ))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !proceed {
            println!("Aborted.");
            return Ok(());
        }
    }

    workflow::reject(&mut run, args.message.clone(), &actor)
        .map_err(|e| miette::miette!("{}", e))?;
    save_entity(&path, &run)?;

    println!(
        "{} Rejected run {} - the inspector can edit and resubmit",
        style("✓").green(),
        style(run.id.short()).cyan()
    );
    Ok(())
}
