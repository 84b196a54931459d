use clap::Parser;
use miette::Result;

use fit::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => fit::cli::commands::init::run(args),
        Commands::Tpl(cmd) => fit::cli::commands::tpl::run(cmd),
        Commands::Run(cmd) => fit::cli::commands::run::run(cmd),
        Commands::Submit(args) => fit::cli::commands::workflow::submit::run(args),
        Commands::Approve(args) => fit::cli::commands::workflow::approve::run(args),
        Commands::Reject(args) => fit::cli::commands::workflow::reject::run(args),
        Commands::Verify(args) => fit::cli::commands::workflow::verify::run(args),
        Commands::Validate(args) => fit::cli::commands::validate::run(args),
        Commands::Completions(args) => fit::cli::commands::completions::run(args),
    }
}
