//! Console reporting
//!
//! Progress lines for the user. Structured logs go through `tracing`;
//! these go to stdout, colored when the terminal allows it.

use colored::{ColoredString, Colorize};
use fastback_codegen::WriteReport;
use std::collections::BTreeSet;
use std::path::Path;

pub fn step(message: &str) {
    println!("{} {}", "==>".cyan().bold(), message);
}

pub fn table_name(name: &str) -> ColoredString {
    name.bold()
}

/// One line per written file, relative to the output root
pub fn written(output_dir: &Path, report: &WriteReport) {
    for path in &report.written {
        let shown = path.strip_prefix(output_dir).unwrap_or(path);
        println!("  {} {}", "wrote".green(), shown.display());
    }
}

pub fn warnings(warnings: &[String]) {
    for warning in warnings {
        println!("  {} {}", "warning:".yellow().bold(), warning);
    }
}

/// Stale artifacts, kept or pruned
pub fn stale(report: &WriteReport) {
    for path in &report.pruned {
        println!("  {} {}", "pruned".red(), path.display());
    }
    for path in report.stale.iter().filter(|p| !report.pruned.contains(p)) {
        println!(
            "  {} {} (no matching table; pass --prune to delete)",
            "stale".yellow(),
            path.display()
        );
    }
}

/// Crates the generated types need beyond axum, serde and sqlx
pub fn required_crates(crates: &BTreeSet<&'static str>) {
    if crates.is_empty() {
        return;
    }
    let list: Vec<&str> = crates.iter().copied().collect();
    println!(
        "  {} generated code also needs: {}",
        "note:".blue().bold(),
        list.join(", ")
    );
}

pub fn error(error: &anyhow::Error) {
    eprintln!("{} {}", "error:".red().bold(), error);
    for cause in error.chain().skip(1) {
        eprintln!("  {} {}", "caused by:".red(), cause);
    }
}
