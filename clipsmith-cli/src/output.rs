// ============================================================================
// clipsmith-cli/src/output.rs
// ============================================================================
//
// TERMINAL OUTPUT: headings, task plans, run summaries and profile listings

use crate::error::CliResult;

use clipsmith_core::profile::Profile;
use clipsmith_core::tasks::compose::intermediate_outputs;
use clipsmith_core::utils::format_seconds_arg;
use clipsmith_core::{
    Clip, CoreError, RunReport, TaskAction, TaskGraph, TaskOutcome, format_duration,
};
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::{Map, Value};

use std::fmt::Display;
use std::path::Path;
use std::time::Duration;

/// Print a heading with colored styling and clear separation
pub fn print_heading(text: &str) {
    println!("\n{}", "=".repeat(50).bright_blue());
    println!("{}", format!(" {text} ").bold().bright_white());
    println!("{}\n", "=".repeat(50).bright_blue());
}

/// Print an info line with label and value, with the label colored
pub fn print_info<T: Display>(label: &str, value: T) {
    println!("{}: {}", label.bright_cyan(), value);
}

/// One-line description of what a task does.
pub fn describe_action(action: &TaskAction) -> String {
    match action {
        TaskAction::Transform { input, params } => {
            let mut parts = Vec::new();
            if let Some(start) = params.trim_start {
                parts.push(format!("from {}s", format_seconds_arg(start)));
            }
            if let Some(duration) = params.output_duration {
                parts.push(format!("for {}s", format_seconds_arg(duration)));
            }
            if let Some(scale) = params.time_scale {
                parts.push(format!("time x{}", format_seconds_arg(scale)));
            }
            if let Some(resolution) = params.resolution {
                parts.push(resolution.to_string());
            }
            if let Some(rate) = params.frame_rate {
                parts.push(format!("{rate} fps"));
            }
            if !params.audio {
                parts.push("no audio".to_string());
            }
            if parts.is_empty() {
                format!("re-encode {}", input.display())
            } else {
                format!("re-encode {} ({})", input.display(), parts.join(", "))
            }
        }
        TaskAction::Concat { inputs } => format!("join {} clip(s)", inputs.len()),
    }
}

/// Prints the tasks of `graph` in execution order.
pub fn print_plan(graph: &TaskGraph, clip: &Clip, scratch_dir: &Path) {
    print_heading("Task plan");
    for id in graph.topological_order() {
        let Some(task) = graph.task(id) else {
            continue;
        };
        let after = graph.dependencies(id);
        println!("{} {}", id.to_string().bright_black(), task.name.bold());
        println!("    {}", describe_action(&task.action));
        println!("    -> {}", task.output.display());
        if !after.is_empty() {
            let ids: Vec<String> = after.iter().map(ToString::to_string).collect();
            println!("    after {}", ids.join(", "));
        }
    }
    println!();
    print_info("Tasks", graph.len());
    print_info(
        "Intermediate files",
        intermediate_outputs(graph, scratch_dir).len(),
    );
    print_info("Output", clip.path().display());
    if let Some(duration) = clip.video.metadata.duration {
        print_info("Expected duration", format_duration(duration));
    }
    if let Some(resolution) = clip.video.metadata.resolution {
        print_info("Expected resolution", resolution);
    }
    if let Some(rate) = clip.video.metadata.frame_rate {
        print_info("Expected frame rate", format!("{:.3} fps", rate.as_f64()));
    }
}

/// Renders the task plan as JSON.
pub fn plan_json(graph: &TaskGraph, clip: &Clip, scratch_dir: &Path) -> CliResult<String> {
    let mut tasks = Vec::with_capacity(graph.len());
    for task in graph.tasks() {
        let mut value = to_json(task)?;
        if let Value::Object(fields) = &mut value {
            fields.insert("depends_on".to_string(), to_json(&graph.dependencies(task.id))?);
        }
        tasks.push(value);
    }

    let mut plan = Map::new();
    plan.insert("output".to_string(), to_json(clip.path())?);
    plan.insert(
        "expected_duration".to_string(),
        to_json(&clip.video.metadata.duration)?,
    );
    plan.insert(
        "expected_resolution".to_string(),
        to_json(&clip.video.metadata.resolution.map(|r| r.to_string()))?,
    );
    plan.insert("scratch_dir".to_string(), to_json(scratch_dir)?);
    plan.insert(
        "intermediates".to_string(),
        to_json(&intermediate_outputs(graph, scratch_dir))?,
    );
    plan.insert("tasks".to_string(), Value::Array(tasks));
    serde_json::to_string_pretty(&Value::Object(plan))
        .map_err(|e| CoreError::OperationFailed(e.to_string()))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> CliResult<Value> {
    serde_json::to_value(value).map_err(|e| CoreError::OperationFailed(e.to_string()))
}

/// Prints the outcome of every task followed by totals.
pub fn print_summary(report: &RunReport, elapsed: Duration) {
    print_heading("Summary");
    for (id, name, outcome) in report.outcomes() {
        match outcome {
            TaskOutcome::Succeeded(path) => println!(
                "  {} {} -> {}",
                "ok".green().bold(),
                name,
                path.display()
            ),
            TaskOutcome::Failed(e) => {
                println!("  {} {} ({})", "FAILED".red().bold(), name, id);
                for line in e.to_string().lines() {
                    println!("      {line}");
                }
            }
            TaskOutcome::Skipped { blocked_by } => println!(
                "  {} {} (blocked by {})",
                "skipped".yellow(),
                name,
                blocked_by
            ),
        }
    }
    println!();
    println!(
        "{} succeeded, {} failed, {} skipped in {}",
        report.succeeded().to_string().green().bold(),
        report.failed().to_string().red().bold(),
        report.skipped().to_string().yellow().bold(),
        format_duration(elapsed.as_secs_f64())
    );
}

/// Prints the built-in camera profiles.
pub fn print_profiles(profiles: &[Profile]) {
    for profile in profiles {
        match profile.datetime_region {
            Some(region) => println!(
                "{}  {} {}",
                profile.id.bold(),
                "timestamp at".bright_black(),
                region
            ),
            None => println!("{}", profile.id.bold()),
        }
    }
}
