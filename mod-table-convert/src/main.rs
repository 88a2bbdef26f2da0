use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use mod_table_convert::failure::{classify, ComparisonFailed};
use mod_table_convert::registry;
use mod_table_convert::report::{render_models, render_summary, render_text};
use tracing_subscriber::EnvFilter;
use xml_presence_core::{compare, format_json, parse_file};

mod cli;
mod convert;
mod path_guard;

use cli::{Cli, Command, CompareArgs, ListModelsArgs, OutputFormat, RecognizeArgs};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Convert(args) => convert::run_convert(args),
        Command::Recognize(args) => run_recognize(args),
        Command::ListModels(args) => run_list_models(args, cli.verbose),
        Command::Compare(args) => run_compare(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let kind = classify(&err);
            eprintln!("{} {err:#}", "error:".red().bold());
            if let Some(hint) = kind.hint() {
                eprintln!("{} {hint}", "hint:".cyan());
            }
            ExitCode::from(kind.exit_code())
        }
    }
}

/// Logs go to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run_recognize(args: RecognizeArgs) -> Result<()> {
    let root = parse_file(&args.input)
        .with_context(|| format!("failed to parse {}", args.input.display()))?;
    let model = registry::recognize(&root)?;
    println!("{}", model.name);
    Ok(())
}

fn run_list_models(args: ListModelsArgs, verbose: bool) -> Result<()> {
    let models = match &args.search {
        Some(query) => registry::search(query),
        None => registry::models().iter().collect(),
    };
    if models.is_empty() {
        println!("no models match");
        return Ok(());
    }
    println!("{}", render_models(&models, verbose, "_"));
    Ok(())
}

fn run_compare(args: CompareArgs) -> Result<()> {
    let mut options = convert::comparison_options(args.options.as_deref())?;
    if let Some(mode) = args.mode {
        options.mode = mode.into();
    }

    let left = parse_file(&args.left)
        .with_context(|| format!("failed to parse {}", args.left.display()))?;
    let right = parse_file(&args.right)
        .with_context(|| format!("failed to parse {}", args.right.display()))?;
    let result = compare(&left, &right, &options);

    if args.summary {
        println!("{}", render_summary(&result.differences));
    } else {
        match args.format {
            OutputFormat::Text => {
                if result.equivalent {
                    println!("{}", "equivalent".green());
                } else {
                    println!("{}", render_text(&result.differences));
                    println!();
                    println!("{}", render_summary(&result.differences));
                }
            }
            OutputFormat::Json => println!("{}", format_json(&result)),
        }
    }

    if !result.equivalent {
        return Err(ComparisonFailed {
            differences: result.differences.len(),
        }
        .into());
    }
    Ok(())
}
