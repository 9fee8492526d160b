//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Compute Engine VM lifecycle from the command line
#[derive(Parser)]
#[command(
    name = "vmlc",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Answer yes to every prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage profiles
    #[command(subcommand)]
    Profile(commands::profile::ProfileCommand),

    /// Create a fresh instance for the active profile
    Create(commands::create::CreateArgs),

    /// Start the instance, restoring it from its latest image if needed
    Start(commands::start::StartArgs),

    /// Stop the instance, image it and delete it
    Stop(commands::stop::StopArgs),

    /// Delete the instance without imaging it
    Destroy,

    /// List instances in the active zone
    Status,

    /// Open VS Code on the running instance
    Connect(commands::connect::ConnectArgs),

    /// Manage polling settings
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            yes,
            command,
        } = self;
        let app = AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            behaviour: BehaviourFlags { yes },
        });

        match command {
            Command::Profile(cmd) => commands::profile::run(&app, cmd),
            Command::Create(args) => commands::create::run(&app, &args).await,
            Command::Start(args) => commands::start::run(&app, &args).await,
            Command::Stop(args) => commands::stop::run(&app, &args).await,
            Command::Destroy => commands::destroy::run(&app).await,
            Command::Status => commands::status::run(&app).await,
            Command::Connect(args) => commands::connect::run(&app, &args).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}
