mod commands;
mod context;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use context::CommandContext;
use persona_core::{ProfileError, Translator};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "PERSONA_LOG";

#[derive(Parser, Debug)]
#[command(name = "persona")]
#[command(about = "Persona - save and switch Cursor accounts", long_about = None)]
#[command(version, disable_help_subcommand = true, allow_external_subcommands = true)]
struct Cli {
    /// Log adapter activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// List saved profiles
    List,
    /// List saved profiles as JSON
    #[command(name = "list_json")]
    ListJson,
    /// Save the current account under a profile name
    Save { name: Option<String> },
    /// Switch to a saved profile and restart the application
    Switch { name: Option<String> },
    /// Show the current profile and logged-in email
    Status,
    /// Show the current profile and logged-in email as JSON
    #[command(name = "status_json")]
    StatusJson,
    /// Log out and generate a new machine identity
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Export every profile to a gzip tar archive
    Export { path: Option<PathBuf> },
    /// Import profiles from an archive
    Import {
        path: Option<PathBuf>,
        /// Replace profiles that already exist
        #[arg(long)]
        overwrite: bool,
    },
    /// Delete one or more profiles
    Delete {
        names: Vec<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Rename a profile
    Rename {
        old: Option<String>,
        new: Option<String>,
    },
    /// Show or change the interface language
    Lang { language: Option<String> },
    #[command(external_subcommand)]
    External(Vec<String>),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let context = CommandContext::load();

    let Some(command) = cli.command else {
        commands::usage(context.translator());
        return ExitCode::FAILURE;
    };

    match dispatch(command, &context).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report_error(&error, context.translator());
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(command: Commands, context: &CommandContext) -> anyhow::Result<()> {
    match command {
        Commands::List => commands::list(context, false).await,
        Commands::ListJson => commands::list(context, true).await,
        Commands::Status => commands::status(context, false).await,
        Commands::StatusJson => commands::status(context, true).await,
        Commands::Save { name: Some(name) } => commands::save(context, name).await,
        Commands::Switch { name: Some(name) } => commands::switch(context, name).await,
        Commands::Reset { yes } => commands::reset(context, yes).await,
        Commands::Export { path: Some(path) } => commands::export(context, path).await,
        Commands::Import {
            path: Some(path),
            overwrite,
        } => commands::import(context, path, overwrite).await,
        Commands::Delete { names, yes } if !names.is_empty() => {
            commands::delete(context, names, yes).await
        }
        Commands::Rename {
            old: Some(old),
            new: Some(new),
        } => commands::rename(context, old, new).await,
        Commands::Lang { language } => commands::lang(context, language),
        other => Err(commands::unknown(&other_name(&other), context.translator())),
    }
}

fn other_name(command: &Commands) -> String {
    match command {
        Commands::External(arguments) => arguments.join(" "),
        Commands::Save { .. } => "save".to_string(),
        Commands::Switch { .. } => "switch".to_string(),
        Commands::Export { .. } => "export".to_string(),
        Commands::Import { .. } => "import".to_string(),
        Commands::Delete { .. } => "delete".to_string(),
        Commands::Rename { .. } => "rename".to_string(),
        other => format!("{:?}", other).to_lowercase(),
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "warn,persona=debug,persona_core=debug,persona_adapters=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn report_error(error: &anyhow::Error, translator: &Translator) {
    match error.downcast_ref::<ProfileError>() {
        Some(ProfileError::Cancelled) => {
            eprintln!("{}", translator.get("command.cancelled"));
        }
        Some(profile_error @ ProfileError::StepFailed { step, .. }) => {
            eprintln!(
                "{}",
                translator.format("command.error", &[("message", &profile_error.to_string())])
            );
            eprintln!(
                "{}",
                translator.format("command.failed_step", &[("step", step.as_str())])
            );
        }
        _ => {
            eprintln!(
                "{}",
                translator.format("command.error", &[("message", &format!("{:#}", error))])
            );
        }
    }
}
