//! TAC to ARMv8 Compiler Driver
//! 
//! Command-line entry point: lowers an IR file to assembly, or runs a full
//! compile job (front end + backend) and prints the JSON response.

mod config;
mod job;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tac_backend::GeneratorOptions;

use crate::config::{load_config, JobConfig};
use crate::job::{run_job, CommandFrontEnd};

#[derive(Parser)]
#[command(name = "tacc")]
#[command(about = "Three-address code to ARMv8 assembly compiler")]
#[command(version = "0.1.0")]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate assembly from an IR file
    Generate {
        /// Input IR file
        input: PathBuf,

        /// Output assembly file
        #[arg(short, long, default_value = "armv8_output.s")]
        output: PathBuf,

        /// Drop unresolvable branches instead of failing
        #[arg(long)]
        lenient_branches: bool,

        /// Print the assembly to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Compile a source file through the front end and backend
    Job {
        /// Source file to compile
        source: PathBuf,

        /// JSON job configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Front end command line, overriding the configuration
        #[arg(long)]
        frontend: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Generate { input, output, lenient_branches, stdout } => {
            let options = GeneratorOptions {
                strict_branches: !lenient_branches,
                ..GeneratorOptions::default()
            };
            let output = if stdout { None } else { Some(output.as_path()) };
            if let Err(e) = generate_command(&input, output, &options) {
                eprintln!("Error generating assembly: {:#}", e);
                std::process::exit(1);
            }
        }
        Commands::Job { source, config, frontend } => {
            match job_command(&source, config.as_deref(), frontend.as_deref()) {
                Ok(true) => {}
                Ok(false) => std::process::exit(1),
                Err(e) => {
                    eprintln!("Error running job: {:#}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn generate_command(
    input: &Path,
    output: Option<&Path>,
    options: &GeneratorOptions,
) -> Result<()> {
    let report = tac_ir::load_ir(input)
        .with_context(|| format!("Failed to read IR from {}", input.display()))?;
    if report.skipped_lines() > 0 {
        log::warn!("skipped {} malformed IR line(s)", report.skipped_lines());
    }

    let program = tac_backend::generate(&report.instructions, options)?;
    let asm = program.to_text();

    match output {
        Some(path) => {
            fs::write(path, &asm)
                .with_context(|| format!("Failed to write output file {}", path.display()))?;
            println!("ARMv8 code written to {}.", path.display());
        }
        None => print!("{}", asm),
    }
    Ok(())
}

/// Returns whether the job succeeded
fn job_command(source: &Path, config: Option<&Path>, frontend: Option<&str>) -> Result<bool> {
    let mut config = match config {
        Some(path) => load_config(path)?,
        None => JobConfig::default(),
    };
    if let Some(command) = frontend {
        config.frontend = command.split_whitespace().map(str::to_string).collect();
    }

    let text = fs::read_to_string(source)
        .with_context(|| format!("Failed to read {}", source.display()))?;
    let front_end = CommandFrontEnd::from_command_line(&config.frontend)?;

    let response = run_job(&text, &config, &front_end);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(response.success)
}
