//! Shared CLI helpers - entity lookup, actor resolution, display

use std::path::{Path, PathBuf};

use miette::{bail, IntoDiagnostic, Result};

use crate::core::identity::EntityPrefix;
use crate::core::project::ENTITY_SUFFIX;
use crate::core::team::{Member, TeamRoster};
use crate::core::{Config, Project};
use crate::entities::{Run, Template};

/// Truncate a string for table display, appending an ellipsis
pub fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}

/// File stem without the `.fit.yaml` suffix
fn entity_stem(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(ENTITY_SUFFIX))
        .map(|s| s.to_string())
}

/// Resolve a template by ID (full or prefix) or exact name
pub fn load_template(project: &Project, reference: &str) -> Result<(PathBuf, Template)> {
    let mut matches: Vec<(PathBuf, Template)> = Vec::new();

    for path in project.iter_entity_files(EntityPrefix::Tpl) {
        let Some(stem) = entity_stem(&path) else {
            continue;
        };
        let id_match = stem.eq_ignore_ascii_case(reference)
            || stem.to_uppercase().starts_with(&reference.to_uppercase());
        let tpl: Template = match crate::yaml::parse_yaml_file(&path) {
            Ok(tpl) => tpl,
            Err(_) => continue,
        };
        if id_match || tpl.name == reference {
            matches.push((path, tpl));
        }
    }

    match matches.len() {
        0 => bail!("Template not found: {}", reference),
        1 => Ok(matches.remove(0)),
        _ => {
            let ids: Vec<String> = matches.iter().map(|(_, t)| t.id.short()).collect();
            bail!(
                "Ambiguous template reference '{}': matches {}",
                reference,
                ids.join(", ")
            )
        }
    }
}

/// Resolve a run by ID (full or prefix) or run code
pub fn load_run(project: &Project, reference: &str) -> Result<(PathBuf, Run)> {
    let mut matches: Vec<(PathBuf, Run)> = Vec::new();

    for path in project.iter_entity_files(EntityPrefix::Run) {
        let Some(stem) = entity_stem(&path) else {
            continue;
        };
        let id_match = stem.eq_ignore_ascii_case(reference)
            || stem.to_uppercase().starts_with(&reference.to_uppercase());
        let run: Run = match crate::yaml::parse_yaml_file(&path) {
            Ok(run) => run,
            Err(_) => continue,
        };
        if id_match || run.run_code.eq_ignore_ascii_case(reference) {
            matches.push((path, run));
        }
    }

    match matches.len() {
        0 => bail!("Run not found: {}", reference),
        1 => Ok(matches.remove(0)),
        _ => {
            let ids: Vec<String> = matches.iter().map(|(_, r)| r.id.short()).collect();
            bail!(
                "Ambiguous run reference '{}': matches {}",
                reference,
                ids.join(", ")
            )
        }
    }
}

/// Serialize an entity back to its YAML file
///
/// Each command performs its permission/state check and this write inside a
/// single invocation; runs have a single writer by assumption.
pub fn save_entity<T: serde::Serialize>(path: &Path, entity: &T) -> Result<()> {
    let content = serde_yml::to_string(entity).into_diagnostic()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    std::fs::write(path, content).into_diagnostic()?;
    Ok(())
}

/// Resolve the acting member: `--as NAME` or the configured author,
/// checked against the roster when one exists
pub fn resolve_actor(
    project: &Project,
    config: &Config,
    as_name: Option<&str>,
) -> Result<Member> {
    let name = match as_name {
        Some(n) => n.to_string(),
        None => config.author(),
    };
    match TeamRoster::load(project) {
        Some(roster) => roster.find(&name).cloned().ok_or_else(|| {
            miette::miette!(
                "'{}' is not in the team roster (.fit/team.yaml). \
                 Add them, or pass --as with a roster member",
                name
            )
        }),
        // No roster = no auth checks
        None => Ok(Member::unrestricted(name)),
    }
}
