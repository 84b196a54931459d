//! `fit validate` command - re-parse every entity file

use clap::Args;
use console::style;
use miette::{bail, Result};

use crate::core::identity::EntityPrefix;
use crate::core::Project;
use crate::entities::{Run, Template};

#[derive(Debug, Args)]
pub struct ValidateArgs {}

pub fn run(_args: ValidateArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;

    let mut ok = 0usize;
    let mut failed = 0usize;

    for path in project.iter_entity_files(EntityPrefix::Tpl) {
        match crate::yaml::parse_yaml_file::<Template>(&path) {
            Ok(_) => ok += 1,
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", style("✗").red(), path.display(), e);
            }
        }
    }
    for path in project.iter_entity_files(EntityPrefix::Run) {
        match crate::yaml::parse_yaml_file::<Run>(&path) {
            Ok(_) => ok += 1,
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", style("✗").red(), path.display(), e);
            }
        }
    }

    println!(
        "{} entity file(s) OK, {} failed",
        style(ok).cyan(),
        if failed > 0 {
            style(failed).red()
        } else {
            style(failed).green()
        }
    );
    if failed > 0 {
        bail!("{} entity file(s) failed validation", failed);
    }
    Ok(())
}
