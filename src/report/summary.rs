//! Console tables for the counts gathered during a run

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{DedupeOutcome, DisciplineCoverage, InputStats, MetricDiagnostics, YearCounts};

/// Print a titled section header the way every summary block starts.
fn print_section(icon: &str, title: &str) {
    println!();
    println!(
        "    {} {}",
        style(icon).cyan(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

/// Indent the table
fn print_table(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn count_table(rows: Vec<(&str, String)>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Count").add_attribute(Attribute::Bold),
    ]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    table
}

/// Statistics over the raw inputs
pub fn display_input_stats(stats: &InputStats) {
    print_section("📥", "INPUT DATA");

    let am = &stats.altmetric;
    let fb = &stats.graph_api;
    let mut rows = vec![
        ("Altmetric responses", am.rows.to_string()),
        ("Altmetric non-empty responses", am.non_empty.to_string()),
        ("Altmetric with at least one POS", am.with_posts.to_string()),
        ("Altmetric with at least one TW", am.with_tweets.to_string()),
        ("Graph API responses", fb.rows.to_string()),
        ("Graph API non-empty responses", fb.non_empty.to_string()),
        ("Graph API with at least one share", fb.with_shares.to_string()),
        ("Graph API with at least one reaction", fb.with_reactions.to_string()),
        ("Graph API with at least one comment", fb.with_comments.to_string()),
    ];
    if let Some(plugin) = fb.with_plugin_comments {
        rows.push(("Graph API with at least one plugin comment", plugin.to_string()));
    }
    rows.extend([
        (
            "Articles with any share, reaction or comment",
            stats.articles_with_engagement.to_string(),
        ),
        (
            "Queries that returned results",
            format!("{} ({:.2}%)", stats.responses, stats.response_rate_pct),
        ),
        (
            "Responses with no engagement at all",
            format!(
                "{} ({:.2}%)",
                stats.zero_engagement_responses, stats.zero_engagement_pct
            ),
        ),
        ("Found articles", stats.articles.to_string()),
        ("Found articles with metrics", stats.articles_with_metrics.to_string()),
    ]);

    print_table(&count_table(rows));
}

/// Year-bucketed article counts before and after deduplication
pub fn display_dedupe(outcome: &DedupeOutcome) {
    print_section("🧹", "MISATTRIBUTED ARTICLES");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Year").add_attribute(Attribute::Bold),
        Cell::new("All articles").add_attribute(Attribute::Bold),
        Cell::new("Dropped").add_attribute(Attribute::Bold),
        Cell::new("Final article count").add_attribute(Attribute::Bold),
    ]);

    let year_row = |label: String, counts: &YearCounts| {
        vec![
            Cell::new(label),
            Cell::new(counts.all_articles),
            Cell::new(counts.dropped).fg(if counts.dropped == 0 {
                Color::White
            } else {
                Color::Red
            }),
            Cell::new(counts.retained).fg(Color::Green),
        ]
    };

    for counts in &outcome.by_year {
        let label = counts
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "Undated".to_string());
        table.add_row(year_row(label, counts));
    }
    let totals = outcome.totals();
    table.add_row(
        year_row("All years".to_string(), &totals)
            .into_iter()
            .map(|cell| cell.add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );

    print_table(&table);
    println!();
    println!(
        "      {} object id(s) shared by several DOIs",
        style(outcome.bad_og_ids.len()).yellow().bold()
    );
}

/// Zero-count diagnostics over the raw metrics
pub fn display_metric_diagnostics(diagnostics: &MetricDiagnostics) {
    print_section("📈", "METRICS");

    let rows = vec![
        (
            "Articles with 0/0/0 shares, reactions, comments",
            diagnostics.zero_engagement.to_string(),
        ),
        (
            "Articles with any share, reaction or comment",
            diagnostics.any_engagement.to_string(),
        ),
        ("Articles with 0 POS", diagnostics.zero_posts.to_string()),
        ("Articles with 0 TW", diagnostics.zero_tweets.to_string()),
    ];
    print_table(&count_table(rows));
}

/// How disciplines were attached
pub fn display_coverage(coverage: &DisciplineCoverage) {
    print_section("🏷️ ", "DISCIPLINES");

    let rows = vec![
        ("Articles with multiple disciplines", coverage.ambiguous_dois.to_string()),
        ("Matched by DOI", coverage.matched_by_doi.to_string()),
        ("Missing after DOI matching", coverage.missing_after_doi.to_string()),
        ("Matched by title", coverage.matched_by_title.to_string()),
        ("Titles with multiple disciplines", coverage.ambiguous_titles.to_string()),
        ("Missing after title matching", coverage.missing_after_title.to_string()),
        ("Articles by PLOS", coverage.plos_authored.to_string()),
        ("Corrections", coverage.corrections.to_string()),
        ("Retractions", coverage.retractions.to_string()),
    ];
    print_table(&count_table(rows));
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("").add_attribute(Attribute::Bold),
        Cell::new("Count").add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("✅ Articles with disciplines"),
        Cell::new(coverage.with_discipline).fg(Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("📄 Articles not in disc. dataset"),
        Cell::new(coverage.not_in_dataset),
    ]);
    table.add_row(vec![
        Cell::new("❓ Actual missing articles"),
        Cell::new(coverage.actual_missing).fg(if coverage.actual_missing == 0 {
            Color::White
        } else {
            Color::Yellow
        }),
    ]);
    print_table(&table);
}

/// Final row counts of the written tables
pub fn display_outputs(articles: usize, responses: usize) {
    print_section("📋", "OUTPUT SUMMARY");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Table").add_attribute(Attribute::Bold),
        Cell::new("Rows").add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("📁 Articles"),
        Cell::new(articles).fg(Color::Green).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("💬 Responses"),
        Cell::new(responses).fg(Color::Green).add_attribute(Attribute::Bold),
    ]);
    print_table(&table);
}
