use anyhow::{Context, Result};
use clap::Parser;
use falint_core::{evaluate, offset_to_line_col, parse_source, Diagnostic};
use std::path::PathBuf;
use std::process::ExitCode;

mod config;

/// Future-annotations lint for Python source files.
///
/// Checks each file for typing constructs that only exist because
/// `from __future__ import annotations` is missing, and for simplified
/// builtin annotations that require it on older interpreters.
///
/// EXAMPLES:
///     falint app.py                              Check one file
///     falint src/a.py src/b.py                   Check several files
///     falint app.py --check-future-annotations   Also flag dict[...]-style usage
///     falint app.py --json                       Diagnostics as JSON lines
///
/// ENVIRONMENT VARIABLES:
///     FALINT_JSON   Set to '1' for JSON output by default
///
/// EXIT CODES:
///     0  no findings
///     1  lint findings reported
///     2  I/O, configuration or syntax errors
#[derive(Parser)]
#[command(name = "falint")]
#[command(version)]
struct Cli {
    /// Python files to check
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Report FA101 when the future import is missing even if nothing in
    /// the file needs it
    #[arg(long)]
    force_future_annotations: bool,

    /// Report FA102 for simplified builtin annotations (dict, list, X | Y)
    /// used without the future import
    #[arg(long)]
    check_future_annotations: bool,

    /// Output diagnostics in JSON format
    #[arg(long, env = "FALINT_JSON", value_parser = clap::builder::BoolishValueParser::new())]
    json: bool,

    /// Path to a falint.toml configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let mut config = config::load(cli.config.as_deref())?;
    // command-line flags take precedence over the config file
    if cli.force_future_annotations {
        config.force_future_annotations = true;
    }
    if cli.check_future_annotations {
        config.check_future_annotations = true;
    }

    let mut found_lint = false;
    let mut found_errors = false;

    for file in &cli.files {
        let source = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let display = file.display().to_string();

        let (module, syntax_diagnostics) = parse_source(&source);
        if !syntax_diagnostics.is_empty() {
            found_errors = true;
            for diag in syntax_diagnostics {
                let (line, column) = offset_to_line_col(&source, diag.span.start);
                let diag = diag
                    .with_file(display.as_str())
                    .with_line(line)
                    .with_column(column);
                print_diagnostic(&diag, cli.json)?;
            }
            continue;
        }

        let diagnostics = evaluate(&module, config);
        if !diagnostics.is_empty() {
            found_lint = true;
        }
        for diag in diagnostics {
            let diag = diag.with_file(display.as_str());
            print_diagnostic(&diag, cli.json)?;
        }
    }

    Ok(if found_errors {
        ExitCode::from(2)
    } else if found_lint {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

fn print_diagnostic(diag: &Diagnostic, json: bool) -> Result<()> {
    if json {
        println!("{}", diag.to_json_compact()?);
    } else {
        println!(
            "{}:{}:{}: {} {}",
            diag.file, diag.line, diag.column, diag.code, diag.message
        );
    }
    Ok(())
}
