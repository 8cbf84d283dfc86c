mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Screenflow: compile interview flows and navigate them against facts.
#[derive(Parser)]
#[command(
    name = "screenflow",
    version,
    about = "Compile interview flows and answer navigation queries"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Navigator settings file (TOML with a [navigator] table)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the walk step limit
    #[arg(long, global = true)]
    max_walk_steps: Option<usize>,

    /// Log navigation decisions to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// A flow declaration and the fact snapshot to query it with.
#[derive(Args)]
pub(crate) struct QueryArgs {
    /// Path to the flow declaration JSON
    pub flow: PathBuf,
    /// Path to the fact snapshot JSON
    #[arg(long)]
    pub facts: PathBuf,
}

/// A screen or section position.
#[derive(Args)]
pub(crate) struct PositionArgs {
    /// Canonical route, e.g. /flow/income/jobs/box-1
    #[arg(long)]
    pub route: String,
    /// Collection item id binding the route's wildcards, outermost first
    #[arg(long = "item")]
    pub items: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a flow declaration and print its Screen Index
    Compile {
        /// Path to the flow declaration JSON
        flow: PathBuf,
    },

    /// Validate a flow declaration against the JSON Schema
    Validate {
        /// Path to the flow declaration JSON
        flow: PathBuf,
    },

    /// Next navigable screen after a position
    Next {
        #[command(flatten)]
        query: QueryArgs,
        #[command(flatten)]
        position: PositionArgs,
    },

    /// Previous navigable screen before a position
    Previous {
        #[command(flatten)]
        query: QueryArgs,
        #[command(flatten)]
        position: PositionArgs,
    },

    /// Walk forward from the start of the flow
    Walk {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Completion, display state and assertions of a section
    Section {
        #[command(flatten)]
        query: QueryArgs,
        /// Section route, e.g. /flow/income/jobs
        #[arg(long)]
        section: String,
        /// Collection item id for sections inside a collection scope
        #[arg(long = "item")]
        items: Vec<String>,
    },

    /// Report whether the facts knock the user out
    Knockout {
        #[command(flatten)]
        query: QueryArgs,
        /// Only count knockouts met at or before this route
        #[arg(long)]
        reached: Option<String>,
        /// Collection item ids for --reached
        #[arg(long = "item", requires = "reached")]
        items: Vec<String>,
    },

    /// Explain why a screen is or is not navigable
    Explain {
        #[command(flatten)]
        query: QueryArgs,
        #[command(flatten)]
        position: PositionArgs,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    use commands::navigate::Direction;
    match cli.command {
        Commands::Compile { ref flow } => {
            commands::compile::cmd_compile(flow, cli.output, cli.quiet);
        }
        Commands::Validate { ref flow } => {
            commands::validate::cmd_validate(flow, cli.output, cli.quiet);
        }
        Commands::Next {
            ref query,
            ref position,
        } => {
            commands::navigate::cmd_navigate(query, position, Direction::Next, &context(&cli));
        }
        Commands::Previous {
            ref query,
            ref position,
        } => {
            commands::navigate::cmd_navigate(
                query,
                position,
                Direction::Previous,
                &context(&cli),
            );
        }
        Commands::Walk { ref query } => {
            commands::walk::cmd_walk(query, &context(&cli));
        }
        Commands::Section {
            ref query,
            ref section,
            ref items,
        } => {
            commands::section::cmd_section(query, section, items, &context(&cli));
        }
        Commands::Knockout {
            ref query,
            ref reached,
            ref items,
        } => {
            commands::knockout::cmd_knockout(query, reached.as_deref(), items, &context(&cli));
        }
        Commands::Explain {
            ref query,
            ref position,
        } => {
            commands::explain::cmd_explain(query, position, &context(&cli));
        }
    }
}

/// Resolve navigator settings for a query command. Exits on a bad config
/// file.
fn context(cli: &Cli) -> commands::Context {
    match config::load_navigator_config(cli.config.as_deref(), cli.max_walk_steps) {
        Ok(config) => commands::Context {
            config,
            output: cli.output,
            quiet: cli.quiet,
        },
        Err(msg) => {
            report_error(&msg, cli.output, cli.quiet);
            process::exit(1);
        }
    }
}

/// Logging goes to stderr so JSON on stdout stays parseable.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "screenflow=debug"
    } else {
        "screenflow=warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
