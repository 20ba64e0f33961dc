use clap::{CommandFactory, Parser, Subcommand};
use std::ffi::OsString;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod context;
mod format;

/// docker-genee - Genee image registry plugin for the Docker CLI
///
/// Log in to the registry, list its images and search them with wildcards.
#[derive(Parser, Debug)]
#[command(name = "docker-genee")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Registry address (default: docker.genee.cn)
    #[arg(long, global = true)]
    registry: Option<String>,

    /// Output format: pretty, json, yaml
    #[arg(long, global = true)]
    format: Option<String>,

    /// Control colored output: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in to the registry
    Login {
        /// Username (will prompt if not provided)
        #[arg(short, long)]
        username: Option<String>,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// List the newest image of every repository
    #[command(visible_alias = "ls")]
    Images {
        /// Only show images built for this platform (e.g. arm64, linux/amd64)
        #[arg(long)]
        platform: Option<String>,
    },
    /// Search images by repository and tag, with * wildcards
    Search {
        /// Query: REPOSITORY or REPOSITORY:TAG
        query: String,
        /// Only show images built for this platform
        #[arg(long)]
        platform: Option<String>,
        /// Maximum number of matching repositories to inspect
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Display version information
    Version,
    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Metadata for the Docker CLI plugin manager
    #[command(name = "docker-cli-plugin-metadata", hide = true)]
    Metadata,
}

/// Drops the `genee` word the Docker CLI inserts (`docker-genee genee images`).
fn plugin_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args: Vec<OsString> = args.into_iter().collect();
    if args.get(1).is_some_and(|arg| arg == "genee") {
        args.remove(1);
    }
    args
}

fn init_tracing(verbosity: context::VerbosityLevel) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(verbosity.as_filter())),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() {
    let cli = Cli::parse_from(plugin_args(std::env::args_os()));

    let verbosity = context::VerbosityLevel::from_count(cli.verbose);
    init_tracing(verbosity);

    // Build context with precedence: defaults > config file > env vars > CLI flags
    let ctx = context::AppContext::build(
        context::CliOverrides {
            registry: cli.registry,
            format: cli.format.as_deref().map(format::parse_output_format),
            color: cli.color.as_deref().map(format::parse_color_choice),
        },
        verbosity,
    );

    match cli.command {
        Commands::Login { username, password } => {
            commands::login::handle_login(&ctx, username.as_deref(), password.as_deref());
        }
        Commands::Images { platform } => {
            commands::images::handle_images(&ctx, platform.as_deref());
        }
        Commands::Search {
            query,
            platform,
            limit,
        } => {
            commands::search::handle_search(&ctx, &query, platform.as_deref(), limit);
        }
        Commands::Version => {
            commands::version::print_version();
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        }
        Commands::Metadata => {
            commands::metadata::handle_metadata();
        }
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
