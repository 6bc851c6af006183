//! Command implementations

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::app::{AppContainer, AssemblyReport, AssemblyRequest, DefaultAppContainer, ProbeReport};
use crate::cli::args::{AssembleArgs, PlanArgs, ProbeArgs};
use crate::config_initialization::resolve_settings;
use crate::domain::model::ProbedDuration;
use crate::error::StillcastError;
use crate::planner::PlanPreview;
use crate::utils::Utils;

/// Execute the assemble command
pub async fn assemble(config: Option<&Path>, args: AssembleArgs) -> Result<()> {
    let settings = resolve_settings(config, &args.settings)?;
    let container = DefaultAppContainer::new(settings);

    let request = AssemblyRequest::from_paths(&args.image, &args.audio, &args.output, args.overwrite);
    info!("Starting assemble operation");

    match container.assemble_interactor().execute(request).await {
        Ok(report) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(())
        }
        Err(StillcastError::Pipeline(failure)) if args.json => {
            println!("{}", serde_json::to_string_pretty(&failure)?);
            Err(StillcastError::Pipeline(failure)).context("Assembly failed")
        }
        Err(e) => Err(e).context("Assembly failed"),
    }
}

/// Execute the probe command
pub async fn probe(config: Option<&Path>, args: ProbeArgs) -> Result<()> {
    let settings = resolve_settings(config, &args.settings)?;
    let container = DefaultAppContainer::new(settings);

    let report = container
        .inspect_interactor()
        .probe(&args.input)
        .await
        .context("Failed to probe input file")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_probe(&report);
    }
    Ok(())
}

/// Execute the plan command
pub async fn plan(config: Option<&Path>, args: PlanArgs) -> Result<()> {
    let settings = resolve_settings(config, &args.settings)?;
    let container = DefaultAppContainer::new(settings);

    let preview = container
        .inspect_interactor()
        .plan(&args.audio)
        .await
        .context("Failed to plan encoding")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
    } else {
        print_plan(&preview);
    }
    Ok(())
}

fn describe_duration(duration: ProbedDuration) -> String {
    match duration {
        ProbedDuration::Known(seconds) => {
            format!("{} ({:.3}s)", Utils::format_seconds(seconds), seconds)
        }
        ProbedDuration::Unknown => "unknown".to_string(),
    }
}

fn print_report(report: &AssemblyReport) {
    println!("Output:      {}", report.output_path.display());
    println!("Size:        {}", Utils::format_file_size(report.output_bytes));
    println!("Duration:    {}", describe_duration(report.duration));
    println!("Audio:       {}", report.enhancement);
    println!("Attempt:     {} ({})", report.attempt, report.strategy);
    println!("Segments:    {}", report.segment_count);
    println!("Elapsed:     {:.2}s", report.elapsed_secs);

    for degradation in &report.degradations {
        println!("Degraded:    {}", degradation);
    }
    for record in &report.attempts {
        if let Err(failure) = &record.outcome {
            println!("Failed:      {} ({}): {}", record.attempt, record.strategy, failure);
        }
    }
    if let Some(verification) = &report.verification {
        let verdict = match verification.passed {
            Some(true) => "passed",
            Some(false) => "duration mismatch",
            None => "inconclusive",
        };
        println!("Verified:    {}", verdict);
    }
    if !report.cleanup.is_complete() {
        println!(
            "Cleanup:     {} entries could not be removed",
            report.cleanup.failures.len()
        );
    }
}

fn print_probe(report: &ProbeReport) {
    println!("{}: {}", report.path.display(), describe_duration(report.duration));
}

fn print_plan(preview: &PlanPreview) {
    let duration = preview
        .duration
        .map(ProbedDuration::Known)
        .unwrap_or(ProbedDuration::Unknown);
    println!("Duration:    {}", describe_duration(duration));
    println!("Strategy:    {}", preview.strategy);
    println!("Timeout:     {}s per invocation", preview.timeout_secs);
    if !preview.segments.is_empty() {
        println!("Workers:     {}", preview.workers);
        println!("Segments:    {}", preview.segments.len());
        for segment in &preview.segments {
            println!(
                "  #{:<4} start {}  length {:.3}s",
                segment.index,
                Utils::format_seconds(segment.start_offset),
                segment.length
            );
        }
    }
}
