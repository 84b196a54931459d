//! `fit run` command - inspection run management

use std::path::PathBuf;

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{bail, IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::cli::helpers::{load_run, load_template, resolve_actor, save_entity, truncate_str};
use crate::core::identity::EntityPrefix;
use crate::core::workflow::{self, ItemPatch, RunRequest};
use crate::core::{Config, FileArchive, Project};
use crate::entities::run::{ItemResult, Run, RunStatus};

#[derive(Subcommand, Debug)]
pub enum RunCommands {
    /// Create a run from a template snapshot
    New(NewArgs),

    /// List runs
    List(ListArgs),

    /// Show a run with its items and approval history
    Show(ShowArgs),

    /// Record item results and notes
    Save(SaveArgs),

    /// Attach or replace a photo reference on one item
    Photo(PhotoArgs),

    /// Cancel an editable run (terminal)
    Cancel(CancelArgs),

    /// Export item results as CSV
    Export(ExportArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Template ID, ID prefix, or exact name
    #[arg(long)]
    pub template: String,

    /// Inspection target; defaults to the template's target
    #[arg(long, short = 't')]
    pub target: Option<String>,

    /// Inspection date (YYYY-MM-DD)
    #[arg(long)]
    pub date: String,

    /// Free-form note
    #[arg(long, default_value = "")]
    pub note: String,

    /// Site scope; defaults to the configured site
    #[arg(long)]
    pub site: Option<String>,

    /// Act as this roster member instead of the configured author
    #[arg(long = "as", value_name = "NAME")]
    pub actor: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status (draft/submitted/approved/rejected/done/canceled)
    #[arg(long, short = 's')]
    pub status: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Run ID, ID prefix, or run code
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SaveArgs {
    /// Run ID, ID prefix, or run code
    pub id: String,

    /// Item row id or item key to update
    #[arg(long, requires = "result")]
    pub item: Option<String>,

    /// Result to record (compliant/noncompliant/na)
    #[arg(long, short = 'r', requires = "item")]
    pub result: Option<String>,

    /// Note to record with --item
    #[arg(long, short = 'n')]
    pub note: Option<String>,

    /// YAML file with a list of {id, result, note} patches
    #[arg(long)]
    pub patch: Option<PathBuf>,

    /// Act as this roster member instead of the configured author
    #[arg(long = "as", value_name = "NAME")]
    pub actor: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct PhotoArgs {
    /// Run ID, ID prefix, or run code
    pub id: String,

    /// Item row id or item key
    #[arg(long)]
    pub item: String,

    /// Opaque photo reference (path or handle from the upload service)
    #[arg(long, short = 'f')]
    pub file: String,

    /// Act as this roster member instead of the configured author
    #[arg(long = "as", value_name = "NAME")]
    pub actor: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct CancelArgs {
    /// Run ID, ID prefix, or run code
    pub id: String,

    /// Act as this roster member instead of the configured author
    #[arg(long = "as", value_name = "NAME")]
    pub actor: Option<String>,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Run ID, ID prefix, or run code
    pub id: String,

    /// Write CSV here instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(cmd: RunCommands) -> Result<()> {
    match cmd {
        RunCommands::New(args) => run_new(args),
        RunCommands::List(args) => run_list(args),
        RunCommands::Show(args) => run_show(args),
        RunCommands::Save(args) => run_save(args),
        RunCommands::Photo(args) => run_photo(args),
        RunCommands::Cancel(args) => run_cancel(args),
        RunCommands::Export(args) => run_export(args),
    }
}

fn run_new(args: NewArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load(&project);
    let actor = resolve_actor(&project, &config, args.actor.as_deref())?;

    let (_, template) = load_template(&project, &args.template)?;
    let request = RunRequest {
        site: args.site.unwrap_or_else(|| config.site.clone()),
        target: args.target.unwrap_or_else(|| template.target.clone()),
        run_date: args.date,
        note: args.note,
    };

    let run = workflow::create_run(&template, request, &actor)
        .map_err(|e| miette::miette!("{}", e))?;
    let path = project.entity_path(&run.id);
    save_entity(&path, &run)?;

    println!(
        "{} Created run {} ({}) with {} items",
        style("✓").green(),
        style(run.id.short()).cyan(),
        style(&run.run_code).yellow(),
        run.items.len()
    );
    println!("   {}", style(path.display()).dim());
    Ok(())
}

#[derive(Tabled)]
struct RunRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "CODE")]
    code: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "TARGET")]
    target: String,
    #[tabled(rename = "INSPECTOR")]
    inspector: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

fn run_list(args: ListArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;

    let status_filter: Option<RunStatus> = match args.status.as_deref() {
        Some(s) => Some(s.parse().map_err(|e: String| miette::miette!("{}", e))?),
        None => None,
    };

    let mut runs: Vec<Run> = Vec::new();
    for path in project.iter_entity_files(EntityPrefix::Run) {
        match crate::yaml::parse_yaml_file::<Run>(&path) {
            Ok(run) => runs.push(run),
            Err(e) => eprintln!("{} Failed to parse {}: {}", style("!").yellow(), path.display(), e),
        }
    }
    if let Some(filter) = status_filter {
        runs.retain(|r| r.status == filter);
    }

    if runs.is_empty() {
        println!("No runs found.");
        println!();
        println!("Create one with: {}", style("fit run new").yellow());
        return Ok(());
    }

    runs.sort_by(|a, b| a.created.cmp(&b.created));
    let rows: Vec<RunRow> = runs
        .iter()
        .map(|r| RunRow {
            id: r.id.short(),
            code: r.run_code.clone(),
            date: r.run_date.to_string(),
            target: truncate_str(&r.target, 16),
            inspector: truncate_str(&r.inspector, 14),
            status: r.status.to_string(),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::sharp()));
    println!();
    println!("{} run(s) found", style(runs.len()).cyan());
    Ok(())
}

fn run_show(args: ShowArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let (_, run) = load_run(&project, &args.id)?;

    println!("{}", style("─".repeat(72)).dim());
    println!("{}: {}", style("ID").bold(), style(run.id.to_string()).cyan());
    println!("{}: {}", style("Code").bold(), style(&run.run_code).yellow());
    println!("{}: {}", style("Status").bold(), run.status);
    println!("{}: {}", style("Date").bold(), run.run_date);
    println!("{}: {}", style("Target").bold(), run.target);
    println!("{}: {}", style("Inspector").bold(), run.inspector);
    println!("{}: {}", style("Template").bold(), run.template.short());
    if !run.note.is_empty() {
        println!("{}: {}", style("Note").bold(), run.note);
    }
    println!("{}", style("─".repeat(72)).dim());

    for item in &run.items {
        let result = match item.result {
            ItemResult::Compliant => style("compliant").green(),
            ItemResult::Noncompliant => style("noncompliant").red(),
            ItemResult::Na => style("na").dim(),
        };
        let photo = if item.photo.is_some() { "📷" } else { "  " };
        println!(
            "  {:<10} {:<40} {:<13} {}",
            item.item_key,
            truncate_str(&item.item_text, 38),
            result,
            photo
        );
        if !item.note.is_empty() {
            println!("             {}", style(&item.note).dim());
        }
    }

    if !run.approvals.is_empty() {
        println!("{}", style("─".repeat(72)).dim());
        println!("{}", style("Approvals:").bold());
        for step in &run.approvals {
            let when = step
                .decided_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  step {}  {:<16} {:<9} {}  {}",
                step.step_no,
                step.approver,
                step.decision.to_string(),
                when,
                step.comment.as_deref().unwrap_or("")
            );
        }
    }
    println!("{}", style("─".repeat(72)).dim());
    Ok(())
}

fn run_save(args: SaveArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load(&project);
    let actor = resolve_actor(&project, &config, args.actor.as_deref())?;
    let (path, mut run) = load_run(&project, &args.id)?;

    let mut patches: Vec<ItemPatch> = Vec::new();

    if let Some(patch_file) = &args.patch {
        let file_patches: Vec<ItemPatch> =
            crate::yaml::parse_yaml_file(patch_file).map_err(|e| miette::miette!("{}", e))?;
        patches.extend(file_patches);
    }

    if let Some(item_ref) = &args.item {
        let result: Option<ItemResult> = match &args.result {
            Some(r) => Some(r.parse().map_err(|e: String| miette::miette!("{}", e))?),
            None => None,
        };
        patches.push(ItemPatch {
            id: item_ref.clone(),
            result,
            note: args.note.clone(),
        });
    }

    if patches.is_empty() {
        bail!("Nothing to save. Pass --item/--result or --patch <file>");
    }

    // accept item keys anywhere a row id is expected
    for patch in &mut patches {
        if let Some(resolved) = run.resolve_item_id(&patch.id) {
            patch.id = resolved;
        }
    }

    let touched = workflow::apply_item_patches(&mut run, &patches, &actor)
        .map_err(|e| miette::miette!("{}", e))?;
    save_entity(&path, &run)?;

    println!(
        "{} Saved {} item(s) on {} ({})",
        style("✓").green(),
        touched,
        style(run.id.short()).cyan(),
        run.status
    );
    Ok(())
}

fn run_photo(args: PhotoArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load(&project);
    let actor = resolve_actor(&project, &config, args.actor.as_deref())?;
    let (path, mut run) = load_run(&project, &args.id)?;

    let item_id = run
        .resolve_item_id(&args.item)
        .unwrap_or_else(|| args.item.clone());
    workflow::attach_photo(&mut run, &item_id, &args.file, &actor)
        .map_err(|e| miette::miette!("{}", e))?;
    save_entity(&path, &run)?;

    // a post-hoc attach on a finalized run changes its content digest
    if run.status == RunStatus::Done {
        let archive = FileArchive::new(&project);
        archive
            .seal_and_store(&run)
            .map_err(|e| miette::miette!("{}", e))?;
        println!(
            "{} Attached photo and re-sealed archived run {}",
            style("✓").green(),
            style(run.id.short()).cyan()
        );
    } else {
        println!(
            "{} Attached photo to {} on {}",
            style("✓").green(),
            args.item,
            style(run.id.short()).cyan()
        );
    }
    Ok(())
}

fn run_cancel(args: CancelArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load(&project);
    let actor = resolve_actor(&project, &config, args.actor.as_deref())?;
    let (path, mut run) = load_run(&project, &args.id)?;

    if !args.yes {
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Cancel run {} ({})? This is terminal",
                run.id.short(),
                run.run_code
            ))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !proceed {
            println!("Aborted.");
            return Ok(());
        }
    }

    workflow::cancel(&mut run, &actor).map_err(|e| miette::miette!("{}", e))?;
    save_entity(&path, &run)?;

    println!(
        "{} Canceled run {}",
        style("✓").green(),
        style(run.id.short()).cyan()
    );
    Ok(())
}

#[derive(Serialize)]
struct ExportRow<'a> {
    item_key: &'a str,
    item_text: &'a str,
    category: &'a str,
    result: String,
    note: &'a str,
    photo: &'a str,
}

fn run_export(args: ExportArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let (_, run) = load_run(&project, &args.id)?;

    let rows: Vec<ExportRow> = run
        .items
        .iter()
        .map(|i| ExportRow {
            item_key: &i.item_key,
            item_text: &i.item_text,
            category: &i.category,
            result: i.result.to_string(),
            note: &i.note,
            photo: i.photo.as_deref().unwrap_or(""),
        })
        .collect();

    match args.output {
        Some(path) => {
            let mut writer = csv::Writer::from_path(&path).into_diagnostic()?;
            for row in &rows {
                writer.serialize(row).into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
            println!(
                "{} Exported {} item(s) to {}",
                style("✓").green(),
                rows.len(),
                path.display()
            );
        }
        None => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for row in &rows {
                writer.serialize(row).into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
        }
    }
    Ok(())
}
