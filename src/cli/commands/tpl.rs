//! `fit tpl` command - checklist template management

use std::path::PathBuf;

use clap::Subcommand;
use console::style;
use miette::{bail, IntoDiagnostic, Result};
use tabled::{settings::Style, Table, Tabled};

use crate::cli::helpers::{load_template, save_entity, truncate_str};
use crate::core::identity::EntityPrefix;
use crate::core::tree;
use crate::core::{CategoryTree, Config, Project};
use crate::entities::template::{Period, Template};
use crate::scaffold::{ScaffoldContext, ScaffoldGenerator};

#[derive(Subcommand, Debug)]
pub enum TplCommands {
    /// Create a template by flattening a category tree file
    New(NewArgs),

    /// List templates
    List(ListArgs),

    /// Show a template's checklist
    Show(ShowArgs),

    /// Print a template's editable category tree (best-effort decode)
    Tree(TreeArgs),

    /// Deactivate a template so no new runs can use it
    Deactivate(DeactivateArgs),

    /// Write a starter category tree file for authoring
    Scaffold(ScaffoldArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Category tree YAML file (major/middle/minor)
    #[arg(long)]
    pub tree: PathBuf,

    /// Template display name
    #[arg(long)]
    pub name: String,

    /// Inspection cadence (daily/weekly/monthly/quarterly/yearly)
    #[arg(long, short = 'p', default_value = "monthly")]
    pub period: String,

    /// Inspection target reference (building, line, asset)
    #[arg(long, short = 't')]
    pub target: String,

    /// Site scope; defaults to the configured site
    #[arg(long)]
    pub site: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Include deactivated templates
    #[arg(long)]
    pub all: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Template ID, ID prefix, or exact name
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct TreeArgs {
    /// Template ID, ID prefix, or exact name
    pub id: String,

    /// Write the tree to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct DeactivateArgs {
    /// Template ID, ID prefix, or exact name
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct ScaffoldArgs {
    /// Destination file
    #[arg(long, short = 'o', default_value = "tree.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

pub fn run(cmd: TplCommands) -> Result<()> {
    match cmd {
        TplCommands::New(args) => run_new(args),
        TplCommands::List(args) => run_list(args),
        TplCommands::Show(args) => run_show(args),
        TplCommands::Tree(args) => run_tree(args),
        TplCommands::Deactivate(args) => run_deactivate(args),
        TplCommands::Scaffold(args) => run_scaffold(args),
    }
}

fn run_new(args: NewArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load(&project);

    let period: Period = args
        .period
        .parse()
        .map_err(|e: String| miette::miette!("{}", e))?;

    let tree_doc: CategoryTree =
        crate::yaml::parse_yaml_file(&args.tree).map_err(|e| miette::miette!("{}", e))?;

    let site = args.site.unwrap_or_else(|| config.site.clone());
    let template = Template::from_tree(
        args.name,
        site,
        args.target,
        period,
        &tree_doc,
        config.author(),
    )
    .map_err(|e| miette::miette!("{}", e))?;

    let path = project.entity_path(&template.id);
    save_entity(&path, &template)?;

    println!(
        "{} Created template {} ({} items)",
        style("✓").green(),
        style(template.id.short()).cyan(),
        template.items.len()
    );
    println!("   {}", style(path.display()).dim());
    Ok(())
}

#[derive(Tabled)]
struct TplRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "PERIOD")]
    period: String,
    #[tabled(rename = "TARGET")]
    target: String,
    #[tabled(rename = "ITEMS")]
    items: usize,
    #[tabled(rename = "ACTIVE")]
    active: String,
}

fn run_list(args: ListArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;

    let mut templates: Vec<Template> = Vec::new();
    for path in project.iter_entity_files(EntityPrefix::Tpl) {
        match crate::yaml::parse_yaml_file::<Template>(&path) {
            Ok(tpl) => templates.push(tpl),
            Err(e) => eprintln!("{} Failed to parse {}: {}", style("!").yellow(), path.display(), e),
        }
    }
    if !args.all {
        templates.retain(|t| t.is_active);
    }

    if templates.is_empty() {
        println!("No templates found.");
        println!();
        println!("Create one with: {}", style("fit tpl new").yellow());
        return Ok(());
    }

    templates.sort_by(|a, b| a.created.cmp(&b.created));
    let rows: Vec<TplRow> = templates
        .iter()
        .map(|t| TplRow {
            id: t.id.short(),
            name: truncate_str(&t.name, 32),
            period: t.period.to_string(),
            target: truncate_str(&t.target, 16),
            items: t.items.len(),
            active: if t.is_active { "yes" } else { "no" }.to_string(),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::sharp()));
    println!();
    println!("{} template(s) found", style(templates.len()).cyan());
    Ok(())
}

fn run_show(args: ShowArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let (_, tpl) = load_template(&project, &args.id)?;

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(tpl.id.to_string()).cyan());
    println!("{}: {}", style("Name").bold(), style(&tpl.name).yellow());
    println!("{}: {}", style("Period").bold(), tpl.period);
    println!("{}: {}", style("Target").bold(), tpl.target);
    if !tpl.site.is_empty() {
        println!("{}: {}", style("Site").bold(), tpl.site);
    }
    println!(
        "{}: {}",
        style("Active").bold(),
        if tpl.is_active { "yes" } else { "no" }
    );
    println!("{}", style("─".repeat(60)).dim());

    for item in &tpl.items {
        let marker = if item.is_active { " " } else { "-" };
        println!(
            "{} {:<10} {:<40} {}",
            marker,
            item.item_key,
            truncate_str(&item.item_text, 38),
            style(&item.category).dim()
        );
    }

    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {} | {}: {}",
        style("Author").dim(),
        tpl.author,
        style("Created").dim(),
        tpl.created.format("%Y-%m-%d")
    );
    Ok(())
}

fn run_tree(args: TreeArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let (_, tpl) = load_template(&project, &args.id)?;

    let rebuilt = tree::unflatten(&tpl.items);
    let yaml = serde_yml::to_string(&rebuilt).into_diagnostic()?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, yaml).into_diagnostic()?;
            println!(
                "{} Wrote editable tree for {} to {}",
                style("✓").green(),
                tpl.id.short(),
                path.display()
            );
        }
        None => print!("{}", yaml),
    }
    Ok(())
}

fn run_deactivate(args: DeactivateArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let (path, mut tpl) = load_template(&project, &args.id)?;

    if !tpl.is_active {
        bail!("Template {} is already deactivated", tpl.id.short());
    }
    tpl.is_active = false;
    save_entity(&path, &tpl)?;

    println!(
        "{} Deactivated template {}",
        style("✓").green(),
        style(tpl.id.short()).cyan()
    );
    Ok(())
}

fn run_scaffold(args: ScaffoldArgs) -> Result<()> {
    let project = Project::discover().map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load(&project);

    if args.output.exists() && !args.force {
        bail!(
            "{} already exists. Use --force to overwrite",
            args.output.display()
        );
    }

    let generator = ScaffoldGenerator::new().map_err(|e| miette::miette!("{}", e))?;
    let ctx = ScaffoldContext::new(config.site.clone(), config.author());
    let content = generator
        .generate_tree(&ctx)
        .map_err(|e| miette::miette!("{}", e))?;
    std::fs::write(&args.output, content).into_diagnostic()?;

    println!(
        "{} Wrote starter tree to {}",
        style("✓").green(),
        args.output.display()
    );
    println!(
        "Edit it, then run: {}",
        style(format!(
            "fit tpl new --tree {} --name <name> --target <target>",
            args.output.display()
        ))
        .yellow()
    );
    Ok(())
}
