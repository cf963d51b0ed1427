//! Console output for operators.

use anyhow::Result;
use chrono::Local;
use colored::{ColoredString, Colorize};
use dialoguer::{theme::ColorfulTheme, Select};

use crate::error::HarvestError;
use crate::scheduler::{CycleReport, RunSummary, StopReason};
use crate::traits::HarvestObserver;
use crate::types::{Category, Classification, DiscoveredEvent};

fn paint(category: Category) -> ColoredString {
    match category {
        Category::Live => category.as_str().bright_green().bold(),
        Category::Upcoming => category.as_str().bright_yellow().bold(),
        Category::Completed => category.as_str().bright_blue().bold(),
    }
}

/// Classified events, numbered from 1 in `Classification::iter` order.
pub fn print_classification(classification: &Classification) {
    println!();
    println!("{}", "🏏 Matches".bold());

    let mut index = 1;
    for category in Category::ALL {
        let bucket = classification.bucket(category);
        println!("{} ({})", paint(category), bucket.len());
        for event in bucket {
            println!(
                "  {:>2}. {}  {}",
                index,
                event.title,
                event.status_text.dimmed()
            );
            index += 1;
        }
    }

    println!(
        "{}",
        format!(
            "{} live, {} upcoming, {} completed",
            classification.live.len(),
            classification.upcoming.len(),
            classification.completed.len()
        )
        .dimmed()
    );
}

/// Ask the operator to pick any listed event. `None` when nothing is listed.
pub fn prompt_event(classification: &Classification) -> Result<Option<DiscoveredEvent>> {
    if classification.is_empty() {
        return Ok(None);
    }

    let items: Vec<String> = classification
        .iter()
        .map(|e| format!("[{}] {} ({})", e.category, e.title, e.status_text))
        .collect();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Which match should be tracked?")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(classification.nth(selection).cloned())
}

pub fn cycle_line(report: &CycleReport) -> String {
    let stamp = Local::now().format("%H:%M:%S");
    if report.appended == 0 {
        format!("[{stamp}] No new commentary.")
    } else {
        format!("[{stamp}] {} new records", report.appended)
    }
}

pub fn print_summary(summary: &RunSummary) {
    println!();
    let headline = match summary.reason {
        StopReason::Cancelled => "👋 Stopped".bright_blue().bold(),
        StopReason::NoTrackableEvent => "No live or completed match to track".yellow().bold(),
        StopReason::StoreUnwritable { failures } => {
            format!("❌ Stopped after {failures} failed writes").red().bold()
        }
    };
    println!("{headline}");

    if let Some(label) = &summary.label {
        println!("  match:    {label}");
    }
    let stats = &summary.stats;
    println!("  cycles:   {}", stats.cycles);
    println!("  stored:   {}", stats.appended);
    if stats.sample_failures > 0 || stats.write_failures > 0 {
        println!(
            "  failures: {} sample, {} write",
            stats.sample_failures, stats.write_failures
        );
    }
}

/// Prints classification and per-cycle status lines as the run proceeds.
#[derive(Debug, Default)]
pub struct ConsoleReport;

impl HarvestObserver for ConsoleReport {
    fn on_classified(&self, classification: &Classification) {
        print_classification(classification);
    }

    fn on_selected(&self, event: &DiscoveredEvent, label: &str) {
        println!();
        println!(
            "{} {} {}",
            "▶ Tracking".bright_green().bold(),
            label.bold(),
            format!("({})", event.url).dimmed()
        );
    }

    fn on_cycle(&self, report: &CycleReport) {
        let line = cycle_line(report);
        if report.appended > 0 {
            println!("{}", line.green());
        } else {
            println!("{line}");
        }
    }

    fn on_cycle_error(&self, error: &HarvestError) {
        println!("{}", format!("[{}] {error}", Local::now().format("%H:%M:%S")).red());
    }
}
