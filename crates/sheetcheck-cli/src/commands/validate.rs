//! `sheetcheck validate` - run the engine and print the grouped report.

use std::error::Error;
use std::path::Path;

use colored::Colorize;

use sheetcheck::{IssueReport, RuleSet, Validator};

/// Validate one sheet. Returns `Ok(true)` when the report is clean.
pub fn run(
    sheet: &Path,
    rules_path: &Path,
    lims: bool,
    json: bool,
) -> Result<bool, Box<dyn Error>> {
    let rules = RuleSet::load(rules_path)?;
    let mut engine = Validator::new(rules);
    if lims {
        engine = engine.with_env_lims();
    }

    let report = engine.validate_file(sheet);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(report.is_clean())
}

fn print_report(report: &IssueReport) {
    if report.is_clean() {
        println!(
            "{}",
            "Samplesheet validation passed! No issues found.".green().bold()
        );
        return;
    }

    println!(
        "{} {} issue(s) found",
        "Validation failed:".red().bold(),
        report.len()
    );
    println!();

    for (category, messages) in report.iter() {
        if messages.is_empty() {
            continue;
        }
        println!("{}", category.label().yellow().bold());
        for message in messages {
            for (i, line) in message.lines().enumerate() {
                if i == 0 {
                    println!("  - {line}");
                } else {
                    println!("    {}", line.trim_start_matches('\t'));
                }
            }
        }
        println!();
    }
}
