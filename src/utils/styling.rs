//! Terminal styling utilities for the run log

use console::{style, Emoji};
use std::path::Path;

use crate::pipeline::{InputPaths, OutputPaths};

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static CALENDAR: Emoji<'_, '_> = Emoji("📅 ", "");

const BOX_WIDTH: usize = 64;
const LABEL_WIDTH: usize = 14;

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {}",
        style("ENGAGEMENT PREP").cyan().bold()
    );
    println!(
        "    {}",
        style("Articles, Facebook engagement and disciplines, cleaned and joined").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(inputs: &InputPaths, outputs: &OutputPaths, min_year: Option<i32>) {
    let line = "─".repeat(BOX_WIDTH - 2);
    let value_width = BOX_WIDTH - LABEL_WIDTH - 9;

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(BOX_WIDTH - 20)
    );
    println!("    ├{}┤", line);
    let inputs_rows = [
        ("Articles", &inputs.articles),
        ("Details", &inputs.details),
        ("FB metrics", &inputs.fb_metrics),
        ("AM metrics", &inputs.am_metrics),
        ("Disciplines", &inputs.disciplines),
    ];
    for (label, path) in inputs_rows {
        println!(
            "    │  {} {:<lw$}{:<vw$}│",
            FOLDER,
            label,
            truncate_path(path, value_width),
            lw = LABEL_WIDTH,
            vw = value_width
        );
    }
    println!("    ├{}┤", line);
    for (label, path) in [("Articles", &outputs.articles), ("Responses", &outputs.responses)] {
        println!(
            "    │  {} {:<lw$}{:<vw$}│",
            SAVE,
            label,
            truncate_path(path, value_width),
            lw = LABEL_WIDTH,
            vw = value_width
        );
    }
    if let Some(year) = min_year {
        println!("    ├{}┤", line);
        println!(
            "    │  {} {:<lw$}{:<vw$}│",
            CALENDAR,
            "Min. year",
            year,
            lw = LABEL_WIDTH,
            vw = value_width
        );
    }
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print how long a step took
pub fn print_step_time(elapsed: std::time::Duration) {
    println!(
        "    {}",
        style(format!("⏱  {:.2}s", elapsed.as_secs_f64())).dim()
    );
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("Data preparation complete!").green().bold()
    );
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    if let Some(info) = detail {
        println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!(
            "      Found {} {}",
            style(count).yellow().bold(),
            description
        );
    }
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let len = s.chars().count();
    if len <= max_len {
        s.to_string()
    } else {
        let tail: String = s.chars().skip(len - max_len + 3).collect();
        format!("...{}", tail)
    }
}
