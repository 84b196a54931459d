//! `fit init` command - project scaffolding

use clap::Args;
use console::style;
use miette::{bail, IntoDiagnostic, Result};
use std::fs;

use crate::core::identity::EntityPrefix;
use crate::core::project::MARKER_DIR;
use crate::core::{Config, Project};
use crate::scaffold::{ScaffoldContext, ScaffoldGenerator};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Site name recorded in the project config
    #[arg(long, default_value = "")]
    pub site: String,

    /// Re-initialize an existing project, overwriting config files
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let cwd = std::env::current_dir().into_diagnostic()?;
    let marker = cwd.join(MARKER_DIR);
    if marker.exists() && !args.force {
        bail!(
            "Already a FIT project ({} exists). Use --force to re-initialize",
            marker.display()
        );
    }

    fs::create_dir_all(&marker).into_diagnostic()?;
    let project = Project::open(&cwd);
    fs::create_dir_all(project.entity_dir(EntityPrefix::Tpl)).into_diagnostic()?;
    fs::create_dir_all(project.entity_dir(EntityPrefix::Run)).into_diagnostic()?;
    fs::create_dir_all(project.archive_dir()).into_diagnostic()?;

    // author comes from env until a config file exists
    let author = Config::default().author();
    let generator = ScaffoldGenerator::new().map_err(|e| miette::miette!("{}", e))?;
    let ctx = ScaffoldContext::new(args.site, author);

    let config_path = project.config_path();
    if !config_path.exists() || args.force {
        let content = generator
            .generate_config(&ctx)
            .map_err(|e| miette::miette!("{}", e))?;
        fs::write(&config_path, content).into_diagnostic()?;
    }

    let team_path = project.team_path();
    if !team_path.exists() || args.force {
        let content = generator
            .generate_team(&ctx)
            .map_err(|e| miette::miette!("{}", e))?;
        fs::write(&team_path, content).into_diagnostic()?;
    }

    println!(
        "{} Initialized FIT project in {}",
        style("✓").green(),
        cwd.display()
    );
    println!("   {}", style(config_path.display()).dim());
    println!("   {}", style(team_path.display()).dim());
    Ok(())
}
