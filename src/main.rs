use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use modbus_hook_patcher::{plan, runner};
use modbus_hook_patcher::{FileReport, FileStatus, Mode, StepOutcome};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "modbus-hook-patcher")]
#[command(about = "Inject a request callback hook into ArduinoModbus", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the hook plan to an ArduinoModbus checkout
    Apply {
        /// Root of the ArduinoModbus library (defaults to the current directory)
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },

    /// Report what apply would do, without modifying any file
    Status {
        /// Root of the ArduinoModbus library (defaults to the current directory)
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply { root } => run(root, Mode::Apply),
        Commands::Status { root } => run(root, Mode::Check),
    }
}

fn run(root: PathBuf, mode: Mode) -> Result<()> {
    // Preflight: refuse to run anywhere that doesn't look like an
    // ArduinoModbus checkout, before touching a single target.
    if !root.join(plan::MARKER_DIR).is_dir() {
        anyhow::bail!(
            "{} not found under {} - run from the root of the ArduinoModbus library \
             or pass --root",
            plan::MARKER_DIR,
            root.display()
        );
    }

    match mode {
        Mode::Apply => println!("{}", "Patching ArduinoModbus request hook...".bold()),
        Mode::Check => println!("{}", "Hook Status Report".bold()),
    }
    println!("Root: {}", root.display());
    println!();

    let reports = runner::run_plan(&root, &plan::hook_plan(), mode)?;

    let mut applied = 0;
    let mut already_applied = 0;
    let mut failed = 0;

    for report in &reports {
        render_file_report(report, mode);
        for step in &report.steps {
            match step.outcome {
                StepOutcome::Applied { .. } => applied += 1,
                StepOutcome::AlreadyApplied => already_applied += 1,
                StepOutcome::AnchorNotFound { .. } => failed += 1,
            }
        }
        if report.status == FileStatus::Missing {
            failed += 1;
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} applied", format!("{applied}").green());
    println!("  {} already applied", format!("{already_applied}").yellow());
    println!("  {} failed", format!("{failed}").red());

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn render_file_report(report: &FileReport, mode: Mode) {
    match report.status {
        FileStatus::Missing => {
            eprintln!(
                "{} {}: file is missing, skipped",
                "✗".red(),
                report.path.display()
            );
            return;
        }
        FileStatus::Persisted if mode == Mode::Apply => {
            println!("{} {}", "✓".green(), report.path.display());
        }
        FileStatus::Persisted => {
            println!(
                "{} {} {}",
                "⊙".yellow(),
                report.path.display(),
                "(would be patched)".dimmed()
            );
        }
        FileStatus::Unchanged => {
            println!(
                "{} {} {}",
                "✓".green(),
                report.path.display(),
                "(unchanged)".dimmed()
            );
        }
    }

    for step in &report.steps {
        match &step.outcome {
            StepOutcome::Applied { matched_anchor } => {
                let verb = if mode == Mode::Apply {
                    "applied"
                } else {
                    "would apply"
                };
                println!(
                    "  {} {}: {} at {:?}",
                    "✓".green(),
                    step.step_id,
                    verb,
                    abbreviate(matched_anchor)
                );
            }
            StepOutcome::AlreadyApplied => {
                println!("  {} {}: already applied", "⊙".yellow(), step.step_id);
            }
            StepOutcome::AnchorNotFound { candidates } => {
                eprintln!("  {} {}: no anchor matched", "✗".red(), step.step_id);
                for candidate in candidates {
                    eprintln!("      tried: {:?}", abbreviate(candidate));
                }
            }
        }
    }
}

/// Keep multi-line anchors readable in single-line console output.
fn abbreviate(anchor: &str) -> String {
    const MAX: usize = 48;
    let flat = anchor.replace('\n', "\\n");
    if flat.len() <= MAX {
        flat
    } else {
        let cut = flat
            .char_indices()
            .take_while(|(i, _)| *i < MAX)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(flat.len());
        format!("{}...", &flat[..cut])
    }
}
