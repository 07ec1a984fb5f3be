//! CLI for the mutant generator

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use mutantgen::{
    compile_mutants, generate_session, parse_unit, Config, GenerationReport, MutationError,
    OpId, RunContext,
};

#[derive(Parser)]
#[command(name = "mutantgen")]
#[command(author, version, about = "AST-based mutant generation with suppression", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate mutants for the configured sources
    Generate {
        /// Path to the config file
        #[arg(short, long, default_value = "mutantgen.yaml")]
        config: PathBuf,

        /// Source files to mutate, overriding the configured list
        #[arg(short, long)]
        files: Vec<PathBuf>,

        /// Output root, overriding the configured one
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate the configuration without generating anything
    Validate {
        /// Path to the config file
        #[arg(short, long, default_value = "mutantgen.yaml")]
        config: PathBuf,
    },

    /// List the operator catalog
    Operators,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let verbose = matches!(
        cli.command,
        Commands::Generate { verbose: true, .. }
    );
    init_tracing(verbose);

    match cli.command {
        Commands::Generate {
            config,
            files,
            output,
            ..
        } => match generate(&config, files, output) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("{}: {:#}", "Error".red().bold(), e);
                ExitCode::FAILURE
            }
        },

        Commands::Validate { config } => validate(&config),

        Commands::Operators => {
            print_catalog();
            ExitCode::SUCCESS
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "mutantgen=debug" } else { "mutantgen=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn generate(
    config_path: &PathBuf,
    files: Vec<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
    let started = Instant::now();

    let mut config = Config::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if !files.is_empty() {
        config.sources = files;
    }
    if let Some(output) = output {
        config.mutant_root = output;
    }

    let ops = config.operator_ids()?;

    println!(
        "Generating with {} operator(s) over {} source file(s)",
        ops.len(),
        config.sources.len()
    );

    // Parse everything up front; a file that fails to parse fails the run
    // before any mutant is written.
    let mut units = Vec::new();
    for source in &config.sources {
        let text = std::fs::read_to_string(source).map_err(|error| MutationError::FileRead {
            file: source.clone(),
            error,
        })?;
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.display().to_string());
        units.push(parse_unit(&text, &name)?);
    }

    let ctx = RunContext::new(ops.iter().copied());
    let summaries = generate_session(&units, &ops, &ctx, &config.mutant_root);
    ctx.write_audit(&config.mutant_root)
        .context("writing the suppression audit log")?;

    let mut compile_outcomes = Vec::new();
    if let Some(command) = &config.compile {
        for (summary, unit) in summaries.iter().zip(&units) {
            let stem = std::path::Path::new(&unit.file_name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| unit.file_name.clone());
            let outcomes = compile_mutants(
                command,
                &config.mutant_root.join(stem),
                &summary.emitted,
                &unit.file_name,
            )
            .with_context(|| format!("compile-checking mutants of {}", unit.file_name))?;
            compile_outcomes.extend(outcomes);
        }
    }

    let report = GenerationReport::new(summaries, compile_outcomes, started.elapsed());
    report.print();

    if report.failures() > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn validate(config_path: &PathBuf) -> ExitCode {
    let config = match Config::load(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    match config.validate() {
        Ok(()) => {
            println!(
                "{} {} source file(s), {} operator(s)",
                "✓".green().bold(),
                config.sources.len(),
                config.operators.len()
            );
            ExitCode::SUCCESS
        }
        Err(errors) => {
            eprintln!("{}", "Configuration errors found:".red().bold());
            for error in &errors {
                eprintln!("  • {}", error);
            }
            ExitCode::FAILURE
        }
    }
}

fn print_catalog() {
    println!("{}", "Operator catalog".bold());
    println!("{}", "-".repeat(40));
    for op in OpId::ALL {
        let kind = if op.is_class_level() { "class " } else { "method" };
        println!(
            "  {} {} {}",
            op.name().bold(),
            kind.dimmed(),
            mutantgen::operators::describe(op)
        );
    }
}
