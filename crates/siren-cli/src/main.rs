#![forbid(unsafe_code)]

mod cmd;
mod output;
mod session;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use session::SessionArgs;
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "siren: emergency incident dashboard for dispatch operators",
    long_about = None
)]
struct Cli {
    /// Enable debug logging for siren.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty, text, or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Directory holding incidents and config.toml (default: $SIREN_DATA_DIR,
    /// then the platform data directory).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Operator username (falls back to $SIREN_USER).
    #[arg(long, short = 'u', global = true)]
    username: Option<String>,

    /// Operator password (falls back to $SIREN_PASSWORD).
    #[arg(long, short = 'p', global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }

    fn session_args(&self) -> SessionArgs {
        SessionArgs {
            data_dir: self.data_dir.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Read",
        about = "List incidents",
        long_about = "List incidents with optional filters, search, and multi-key sort.",
        after_help = "EXAMPLES:\n    # Pending fires, newest first\n    siren list --type fire --status pending --sort time:desc\n\n    # Search location, operator, type, status and id\n    siren list --search candelaria\n\n    # Emit machine-readable output\n    siren list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one incident",
        long_about = "Show full details, involved parties and history for one incident.",
        after_help = "EXAMPLES:\n    siren show 001\n    siren show 001 --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Read",
        about = "List filter values present in the data"
    )]
    Facets,

    #[command(
        next_help_heading = "Read",
        about = "List dispatchable resources"
    )]
    Resources,

    #[command(
        next_help_heading = "Dispatch",
        about = "Register a new incident",
        after_help = "EXAMPLES:\n    siren create --type fire --location \"Calle 80 #20-10\" \\\n        -d \"Humo en bodega\" --party \"Ana Ruiz,1020,3001234567\" --accept-terms"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Dispatch",
        about = "Change the status of an incident",
        after_help = "EXAMPLES:\n    siren status 001 in-progress\n    siren status 001 resolved"
    )]
    Status(cmd::status::StatusArgs),

    #[command(
        next_help_heading = "Dispatch",
        about = "Assign resources to an incident",
        long_about = "Replace the resources assigned to an incident. Assigning at least one resource moves it to in progress.",
        after_help = "EXAMPLES:\n    siren assign 001 bomberos policia\n\n    # Clear the assignment\n    siren assign 001"
    )]
    Assign(cmd::assign::AssignArgs),

    #[command(about = "Generate shell completions")]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("SIREN_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "siren=debug,siren_core=debug,warn"
        } else {
            "warn"
        })
    });

    let format = env::var("SIREN_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

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
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = cli.output_mode();
    debug!(?output, "siren starting");

    match &cli.command {
        Commands::Completions(args) => {
            let mut command = Cli::command();
            return cmd::completions::run_completions(args.shell, &mut command);
        }
        Commands::Resources => return cmd::resources::run_resources(output),
        _ => {}
    }

    let mut store = session::start(&cli.session_args(), output)?;

    let result = match &cli.command {
        Commands::List(args) => cmd::list::run_list(args, &mut store, output),
        Commands::Show(args) => cmd::show::run_show(args, &mut store, output),
        Commands::Facets => cmd::facets::run_facets(&store, output),
        Commands::Create(args) => cmd::create::run_create(args, &mut store, output),
        Commands::Status(args) => cmd::status::run_status(args, &mut store, output),
        Commands::Assign(args) => cmd::assign::run_assign(args, &mut store, output),
        Commands::Completions(_) | Commands::Resources => Ok(()),
    };

    session::finish(&mut store)?;
    result
}
