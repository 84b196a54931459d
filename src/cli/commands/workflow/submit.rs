//! Submit command - send an editable run into its approval chain

use clap::Args;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{bail, IntoDiagnostic, Result};

use crate::cli::helpers::{load_run, resolve_actor, save_entity};
use crate::core::workflow;
use crate::core::{Config, Project};

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Run ID, ID prefix, or run code
    pub id: String,

    /// Approver for the new approval step; defaults to
    /// workflow.default_approver from the project config
    #[arg(long)]
    pub approver: Option<String>,

    /// Act as this roster member instead of the configured author
    #[arg(long = "as", value_name = "NAME")]
    pub actor: Option<String>,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: SubmitArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load(&project);
    let actor = resolve_actor(&project, &config, args.actor.as_deref())?;
    let (path, mut run) = load_run(&project, &args.id)?;

    let approver = args
        .approver
        .unwrap_or_else(|| config.workflow.default_approver.clone());
    if approver.trim().is_empty() {
        bail!(
            "No approver given. Pass --approver, or set workflow.default_approver \
             in .fit/config.yaml"
        );
    }

    if !args.yes {
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Submit run {} ({}) for approval by {}?",
                run.id.short(),
                run.run_code,
                approver
            ))
            .default(true)
            .interact()
            .into_diagnostic()?;
        if !proceed {
            println!("Aborted.");
            return Ok(());
        }
    }

    workflow::submit(&mut run, &approver, &actor).map_err(|e| miette::miette!("{}", e))?;
    save_entity(&path, &run)?;

    println!(
        "{} Submitted run {} - awaiting approval by {}",
        style("✓").green(),
        style(run.id.short()).cyan(),
        style(&approver).yellow()
    );
    Ok(())
}
