//! CLI argument definitions

use clap::{Parser, Subcommand};

use crate::cli::commands;

/// Facility Inspection Toolkit
#[derive(Parser, Debug)]
#[command(
    name = "fit",
    version,
    about = "Facility Inspection Toolkit - checklist templates, inspection runs, approvals"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a FIT project in the current directory
    Init(commands::init::InitArgs),

    /// Manage checklist templates
    #[command(subcommand)]
    Tpl(commands::tpl::TplCommands),

    /// Manage inspection runs
    #[command(subcommand)]
    Run(commands::run::RunCommands),

    /// Submit a run for approval
    Submit(commands::workflow::submit::SubmitArgs),

    /// Approve a submitted run
    Approve(commands::workflow::approve::ApproveArgs),

    /// Reject a submitted run
    Reject(commands::workflow::reject::RejectArgs),

    /// Verify a finalized run against its archive seal
    Verify(commands::workflow::verify::VerifyArgs),

    /// Re-parse every entity file and report failures
    Validate(commands::validate::ValidateArgs),

    /// Generate shell completions
    Completions(commands::completions::CompletionsArgs),
}
