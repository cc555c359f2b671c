//! Engagement prep: data preparation CLI
//!
//! Produces the cleaned `articles.csv` and `responses.csv` consumed by the
//! analysis notebook.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;

use engagement_prep::cli::Cli;
use engagement_prep::pipeline::{
    assign_disciplines, collect_input_stats, deduplicate, load_inputs, process_metrics,
    table_outputs, write_all, Prepared, StagedFile,
};
use engagement_prep::report::{
    display_coverage, display_dedupe, display_input_stats, display_metric_diagnostics,
    display_outputs, render_preparation_report, PreparationReport,
};
use engagement_prep::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_config, print_count, print_info, print_step_header, print_step_time, print_success,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let inputs = cli.input_paths();
    let outputs = cli.output_paths();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&inputs, &outputs, cli.min_year);

    // Step 1: Load inputs
    print_step_header(1, "Load Input Data");

    let step_start = Instant::now();
    let spinner = create_spinner("Reading input files...");
    let raw = load_inputs(&inputs, cli.load_options())?;
    finish_with_success(&spinner, "Input files loaded");

    let input_stats = collect_input_stats(&raw)?;
    display_input_stats(&input_stats);
    print_step_time(step_start.elapsed());

    // Step 2: Remove articles the social graph aggregated wrongly
    print_step_header(2, "Remove Misattributed Articles");

    let step_start = Instant::now();
    let spinner = create_spinner("Checking object ids...");
    let dedupe = deduplicate(&raw)?;
    if dedupe.bad_dois.is_empty() {
        finish_with_success(&spinner, "No object id is shared between DOIs");
    } else {
        finish_with_warning(&spinner, "Shared object ids found");
        print_count(
            "DOI(s) with a shared object id",
            dedupe.bad_dois.len(),
            Some("(dropped)"),
        );
    }
    display_dedupe(&dedupe);
    println!();
    println!("      Articles:  {}", dedupe.articles.height());
    println!("      Metrics:   {}", dedupe.metrics.height());
    println!("      Responses: {}", dedupe.responses.height());
    print_step_time(step_start.elapsed());

    // Step 3: Clean metrics
    print_step_header(3, "Process Metrics");

    let step_start = Instant::now();
    let spinner = create_spinner("Replacing zero counts...");
    let metrics = process_metrics(&dedupe)?;
    finish_with_success(&spinner, "Metrics attached to articles");
    display_metric_diagnostics(&metrics.diagnostics);
    print_step_time(step_start.elapsed());

    // Step 4: Disciplines
    print_step_header(4, "Match Disciplines");

    let step_start = Instant::now();
    let spinner = create_spinner("Matching by DOI, then by title...");
    let matched = assign_disciplines(&metrics.articles, &raw)?;
    finish_with_success(&spinner, "Discipline matching complete");
    if matched.coverage.ambiguous_dois > 0 {
        print_info(&format!(
            "{} article(s) with multiple disciplines, kept the smallest specialty",
            matched.coverage.ambiguous_dois
        ));
    }
    display_coverage(&matched.coverage);
    print_step_time(step_start.elapsed());

    let prepared = Prepared::assemble(dedupe, metrics, matched);

    // Step 5: Save output
    print_step_header(5, "Save Results");

    let step_start = Instant::now();
    let spinner = create_spinner("Writing output files...");

    // The report is rendered up front so it is written together with the tables
    let report_json = match &cli.report {
        Some(_) => Some(render_preparation_report(&PreparationReport::new(
            &inputs,
            &outputs,
            cli.min_year,
            input_stats,
            &prepared,
        ))?),
        None => None,
    };
    let mut files = table_outputs(&prepared.articles, &prepared.responses, &outputs).to_vec();
    if let (Some(target), Some(contents)) = (&cli.report, &report_json) {
        files.push(StagedFile::Text { contents, target });
    }
    write_all(&files)?;

    finish_with_success(&spinner, "Output files written");
    println!("      {}", style(outputs.articles.display()).dim());
    println!("      {}", style(outputs.responses.display()).dim());
    if let Some(report_path) = &cli.report {
        print_success(&format!("Report saved to {}", report_path.display()));
    }
    print_step_time(step_start.elapsed());

    display_outputs(prepared.articles.height(), prepared.responses.height());
    print_completion();

    Ok(())
}
