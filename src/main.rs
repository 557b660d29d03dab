use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use method_order::{Config, FileOutcome, Fixer};
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "method-order")]
#[command(about = "Method-ordering linter and auto-fixer for Go source files", long_about = None)]
#[command(version)]
struct Cli {
    /// Files or directories to process; a `dir/...` suffix recurses
    #[arg(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Apply automatic fixes
    #[arg(long)]
    fix: bool,

    /// Write result to (source) file instead of stdout
    #[arg(short = 'w', long)]
    write: bool,

    /// Display diffs instead of rewriting files
    #[arg(short = 'd', long)]
    diff: bool,

    /// List files with violations
    #[arg(short = 'l', long)]
    list: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Disable the constructor ordering check
    #[arg(long)]
    no_constructor: bool,

    /// Disable the exported-before-unexported ordering check
    #[arg(long)]
    no_exported: bool,

    /// Emit a machine-readable JSON report to stdout
    #[arg(long)]
    json: bool,
}

/// Per-file entry of the JSON report.
#[derive(Serialize)]
struct JsonReport<'a> {
    path: String,
    violations: &'a [method_order::Violation],
    fixed: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        fix: cli.fix,
        write: cli.write,
        diff: cli.diff,
        list: cli.list,
        verbose: cli.verbose,
        check_constructor: !cli.no_constructor,
        check_exported: !cli.no_exported,
    };

    let fixer = Fixer::new(config.clone());

    let mut total_violations = 0usize;
    let mut total_fixed = 0usize;
    let mut has_errors = false;
    let mut outcomes = Vec::new();

    for path in &cli.paths {
        for result in process_path(&fixer, path) {
            match result {
                Err(e) => {
                    eprintln!("{} {}", "✗".red(), e);
                    has_errors = true;
                }
                Ok(outcome) => {
                    if outcome.violation_count() == 0 {
                        continue;
                    }
                    total_violations += outcome.violation_count();

                    if !cli.json {
                        report_outcome(&config, &outcome);
                    }

                    if outcome.fixed {
                        total_fixed += 1;
                        if let Err(e) = emit_fixed(&fixer, &config, &outcome) {
                            eprintln!("{} {}", "✗".red(), e);
                            has_errors = true;
                        }
                    }

                    outcomes.push(outcome);
                }
            }
        }
    }

    if cli.json {
        let reports: Vec<JsonReport<'_>> = outcomes
            .iter()
            .map(|o| JsonReport {
                path: o.path.display().to_string(),
                violations: &o.violations,
                fixed: o.fixed,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else if config.verbose {
        eprintln!();
        eprintln!(
            "Total: {} violations, {} files fixed",
            format!("{}", total_violations).yellow(),
            format!("{}", total_fixed).green()
        );
    }

    if has_errors {
        std::process::exit(1);
    }

    Ok(())
}

/// Expand one CLI path argument into per-file results.
///
/// Accepts a plain file, a directory, or the Go-style `dir/...` recursion
/// suffix (equivalent to passing the directory itself).
fn process_path(
    fixer: &Fixer,
    path: &Path,
) -> Vec<Result<FileOutcome, method_order::FixError>> {
    if let Some(s) = path.to_str() {
        if let Some(dir) = s.strip_suffix("/...") {
            let dir = if dir.is_empty() { "." } else { dir };
            return fixer.process_directory(Path::new(dir));
        }
    }

    if path.is_dir() {
        return fixer.process_directory(path);
    }

    if path.extension().and_then(|s| s.to_str()) == Some("go") {
        return vec![fixer.process_file(path)];
    }

    Vec::new()
}

/// Print the human-readable report for one file with violations.
fn report_outcome(config: &Config, outcome: &FileOutcome) {
    let path = outcome.path.display();

    if config.list {
        println!("{}", path);
        return;
    }

    if config.verbose || !config.fix {
        for violation in &outcome.violations {
            eprintln!(
                "{}:{}:{}: {}",
                path,
                violation.line,
                violation.column,
                violation.message.yellow()
            );
        }
        eprintln!(
            "{}: {} violations",
            path,
            format!("{}", outcome.violation_count()).yellow()
        );
    }
}

/// Route a fixed file to its destination: the file itself, a diff, or stdout.
fn emit_fixed(
    fixer: &Fixer,
    config: &Config,
    outcome: &FileOutcome,
) -> Result<(), method_order::FixError> {
    let Some(fixed) = &outcome.fixed_content else {
        return Ok(());
    };

    if config.write {
        fixer.write_outcome(outcome)?;
        if config.verbose {
            eprintln!("{} fixed {}", "✓".green(), outcome.path.display());
        }
        return Ok(());
    }

    if config.diff {
        display_diff(&outcome.path, &outcome.original, fixed);
        return Ok(());
    }

    print!("{}", fixed);
    Ok(())
}

/// Show a unified diff between original and fixed content.
fn display_diff(file: &Path, original: &str, fixed: &str) {
    println!("{}", format!("--- {} (original)", file.display()).dimmed());
    println!("{}", format!("+++ {} (fixed)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, fixed);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}
