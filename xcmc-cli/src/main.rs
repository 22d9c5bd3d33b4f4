//! XCM program command-line tool
//!
//! # Usage
//!
//! ```bash
//! # Replay a build plan and print the wire JSON
//! xcmc build --plan weth-to-ethereum.json --pretty
//!
//! # Render a wire JSON program as text, checking it on the way
//! xcmc inspect --input program.json --validate
//! ```

mod plan;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use plan::Plan;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use xcmc_spec::{Config, Location, Validator};

/// Build and inspect cross-consensus message programs
#[derive(Parser)]
#[command(name = "xcmc")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log builder and validator decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON build plan and print the finalized program
    Build {
        /// Plan file (stdin if not specified)
        #[arg(short, long)]
        plan: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Print the program listing instead of wire JSON
        #[arg(long)]
        listing: bool,
    },

    /// Render a wire JSON program as text
    Inspect {
        /// Program file (stdin if not specified)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Location the outermost program runs in, as wire JSON
        #[arg(short, long)]
        context: Option<String>,

        /// Run ordering and beneficiary checks before rendering
        #[arg(long)]
        validate: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            plan,
            output,
            pretty,
            listing,
        } => run_build(plan, output, pretty, listing),
        Commands::Inspect {
            input,
            context,
            validate,
        } => run_inspect(input, context, validate),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            Ok(text)
        }
    }
}

fn write_output(path: Option<PathBuf>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(&path, text).with_context(|| format!("writing {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.write_all(b"\n")?;
            Ok(())
        }
    }
}

fn run_build(
    plan: Option<PathBuf>,
    output: Option<PathBuf>,
    pretty: bool,
    listing: bool,
) -> Result<()> {
    let text = read_input(plan.as_ref())?;
    let plan = Plan::from_json(&text).context("parsing build plan")?;
    let program = plan.build().context("building program")?;

    let rendered = if listing {
        xcmc_inspect::render(&program)?
    } else if pretty {
        program.to_json_pretty()?
    } else {
        program.to_json()?
    };
    write_output(output, &rendered)
}

fn run_inspect(input: Option<PathBuf>, context: Option<String>, validate: bool) -> Result<()> {
    let text = read_input(input.as_ref())?;
    let program = match context {
        Some(context) => {
            let context: Location =
                serde_json::from_str(&context).context("parsing --context location")?;
            xcmc_inspect::decode_in(context, &text)?
        }
        None => xcmc_inspect::decode(&text)?,
    };

    if validate {
        Validator::new(Config::default())
            .without_reference_checks()
            .validate(&program)
            .context("program failed validation")?;
    }

    write_output(None, &xcmc_inspect::render(&program)?)
}
