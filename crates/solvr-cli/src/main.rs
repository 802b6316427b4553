#![forbid(unsafe_code)]

mod cmd;
mod output;
mod session;
mod views;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use solvr_core::config::Overrides;
use std::env;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::session::Context;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "solvr: fund tasks, submit solutions, vote on the best one",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (pretty, text, json).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Base URL of the solvr API (overrides SOLVR_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Access token (overrides SOLVR_TOKEN).
    #[arg(long, global = true)]
    token: Option<String>,

    /// Your user id (overrides SOLVR_USER_ID).
    #[arg(long, global = true)]
    user_id: Option<String>,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            json: self.json,
            format: self.format.map(|mode| mode.as_str().to_string()),
            api_url: self.api_url.clone(),
            token: self.token.clone(),
            user_id: self.user_id.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Read",
        about = "List tasks",
        long_about = "List tasks, following the server's page cursor as far as asked.",
        after_help = "EXAMPLES:\n    # First page of tasks\n    solvr tasks\n\n    # Every active community task\n    solvr tasks --status active --kind community --all\n\n    # Emit machine-readable output\n    solvr tasks --json"
    )]
    Tasks(cmd::tasks::TasksArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one task",
        long_about = "Show a task with your permissions and remaining voting rights.",
        after_help = "EXAMPLES:\n    # Show a task\n    solvr task t-123\n\n    # Emit machine-readable output\n    solvr task t-123 --json"
    )]
    Task(cmd::task::TaskArgs),

    #[command(
        next_help_heading = "Read",
        about = "List solutions for a task",
        after_help = "EXAMPLES:\n    # First page of solutions\n    solvr solutions t-123\n\n    # Load three pages\n    solvr solutions t-123 --pages 3"
    )]
    Solutions(cmd::solutions::SolutionsArgs),

    #[command(
        next_help_heading = "Read",
        about = "List your own solutions",
        after_help = "EXAMPLES:\n    # Needs SOLVR_TOKEN and SOLVR_USER_ID\n    solvr submissions --all"
    )]
    Submissions(cmd::submissions::SubmissionsArgs),

    #[command(
        next_help_heading = "Act",
        about = "Create a task",
        after_help = "EXAMPLES:\n    # Community task with a starting fund\n    solvr create-task --title \"Port the parser\" --description \"Rust please\" --fund 100\n\n    # Personal task with a deadline\n    solvr create-task --title \"Logo\" --description \"SVG\" --kind personal --deadline 2026-12-31T23:59:00Z"
    )]
    CreateTask(cmd::create_task::CreateTaskArgs),

    #[command(
        next_help_heading = "Act",
        about = "Submit a solution to a task",
        after_help = "EXAMPLES:\n    solvr submit t-123 --content \"See the attached patch\""
    )]
    Submit(cmd::submit::SubmitArgs),

    #[command(
        next_help_heading = "Act",
        about = "Vote on a solution",
        long_about = "Spend voting rights on a solution. Rights are checked locally before anything is sent; the server's reply sets the new balance.",
        after_help = "EXAMPLES:\n    # Spend 250 rights\n    solvr vote t-123 s-9 --amount 250\n\n    # Spend a quarter of what is left\n    solvr vote t-123 s-9 --percent 25"
    )]
    Vote(cmd::vote::VoteArgs),

    #[command(
        next_help_heading = "Act",
        about = "Add funds to a task",
        after_help = "EXAMPLES:\n    solvr fund t-123 500"
    )]
    Fund(cmd::fund::FundArgs),

    #[command(
        next_help_heading = "Profile",
        about = "Check a username's format and availability",
        after_help = "EXAMPLES:\n    solvr check-username ada_l\n\n    # Check a wallet address in the same pass\n    solvr check-username ada_l --wallet 11111111111111111111111111111111"
    )]
    CheckUsername(cmd::profile::CheckUsernameArgs),

    #[command(
        next_help_heading = "Profile",
        about = "Check a Solana wallet address format",
        after_help = "EXAMPLES:\n    solvr check-address 11111111111111111111111111111111"
    )]
    CheckAddress(cmd::profile::CheckAddressArgs),

    #[command(
        next_help_heading = "Configuration",
        about = "Inspect configuration",
        after_help = "EXAMPLES:\n    # Resolved settings (token masked)\n    solvr config show\n\n    # Where the config file lives\n    solvr config path"
    )]
    Config(cmd::config::ConfigArgs),

    #[command(
        next_help_heading = "Configuration",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    solvr completions bash > ~/.local/share/bash-completion/completions/solvr"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SOLVR_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "solvr=debug,info"
        } else {
            "solvr=info,warn"
        })
    });

    let format = env::var("SOLVR_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output; logs stay on stderr.
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let ctx = Context::resolve(&cli.overrides(), cli.quiet)?;

    match &cli.command {
        Commands::Tasks(args) => cmd::tasks::run_tasks(args, &ctx),
        Commands::Task(args) => cmd::task::run_task(args, &ctx),
        Commands::Solutions(args) => cmd::solutions::run_solutions(args, &ctx),
        Commands::Submissions(args) => cmd::submissions::run_submissions(args, &ctx),
        Commands::CreateTask(args) => cmd::create_task::run_create_task(args, &ctx),
        Commands::Submit(args) => cmd::submit::run_submit(args, &ctx),
        Commands::Vote(args) => cmd::vote::run_vote(args, &ctx),
        Commands::Fund(args) => cmd::fund::run_fund(args, &ctx),
        Commands::CheckUsername(args) => cmd::profile::run_check_username(args, &ctx),
        Commands::CheckAddress(args) => cmd::profile::run_check_address(args, &ctx),
        Commands::Config(args) => cmd::config::run_config(args, &ctx),
        Commands::Completions(_) => Ok(()),
    }
}
