use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::json;
use sourcing_pipeline::intake::{self, InputFormat};
use sourcing_pipeline::{config, Orchestrator};
use sourcing_protocol::{output_schema, serialize_json, Requisition};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "sourcing")]
#[command(about = "Cluster purchase requisitions and propose consolidated sourcing events", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline over a requisition batch
    Run(RunArgs),

    /// Check a requisition batch without running the pipeline
    Validate(InputArgs),

    /// Print the JSON schema of the pipeline output
    Schema,
}

#[derive(Args)]
struct InputArgs {
    /// JSON array or CSV file of requisitions; `-` or absent reads stdin
    input: Option<PathBuf>,

    /// Input format (default: from the file extension, JSON for stdin)
    #[arg(long, value_enum)]
    format: Option<FormatFlag>,
}

#[derive(Copy, Clone, ValueEnum)]
enum FormatFlag {
    Json,
    Csv,
}

impl FormatFlag {
    const fn as_domain(self) -> InputFormat {
        match self {
            FormatFlag::Json => InputFormat::Json,
            FormatFlag::Csv => InputFormat::Csv,
        }
    }
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    input: InputArgs,

    /// TOML file with `moq` and `consolidation_window_days`
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum order value for consolidation
    #[arg(long)]
    moq: Option<u64>,

    /// Maximum delivery spread (days) for consolidation
    #[arg(long = "window-days")]
    window_days: Option<u32>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Include the normalized rows in the output
    #[arg(long)]
    include_rows: bool,
}

pub fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Run(args) => run_command(args),
        Commands::Validate(args) => validate_command(args),
        Commands::Schema => {
            let schema = output_schema()?;
            print_stdout(&serialize_json(&schema, true)?)
        }
    }
}

fn run_command(args: RunArgs) -> Result<()> {
    let config = config::resolve_config(args.config.as_deref(), args.moq, args.window_days)
        .context("Failed to load aggregation config")?;
    let requisitions = load_requisitions(&args.input)?;
    log::info!(
        "Running pipeline on {} requisitions (moq {}, window {}d)",
        requisitions.len(),
        config.moq,
        config.consolidation_window_days
    );

    let output = Orchestrator::default()
        .run(requisitions, config)
        .into_output(args.include_rows);
    print_stdout(&serialize_json(&output, args.pretty)?)?;

    if !output.is_success() {
        for error in &output.errors {
            log::error!("{error}");
        }
        anyhow::bail!("Pipeline finished with {} error(s)", output.errors.len());
    }
    Ok(())
}

fn validate_command(args: InputArgs) -> Result<()> {
    let requisitions = load_requisitions(&args)?;
    let report = json!({ "status": "ok", "rows": requisitions.len() });
    print_stdout(&serialize_json(&report, false)?)
}

fn load_requisitions(args: &InputArgs) -> Result<Vec<Requisition>> {
    let file = args
        .input
        .as_deref()
        .filter(|path| *path != Path::new("-"));
    let format = match (args.format, file) {
        (Some(flag), _) => flag.as_domain(),
        (None, Some(path)) => InputFormat::from_path(path),
        (None, None) => InputFormat::Json,
    };

    let raw = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read requisitions from stdin")?;
            buf
        }
    };
    Ok(intake::parse_requisitions_as(&raw, format)?)
}
