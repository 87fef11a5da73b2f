//! Command implementations

use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;

use crate::pipeline::PipelineFile;
use crate::{Config, StepwiseError};

/// Execute `stepwise run`
pub(super) async fn execute_run_command(json: bool, config: &Config) -> Result<()> {
    let path = config.pipeline_file();
    let pipeline = PipelineFile::load(&path).map_err(StepwiseError::from)?;
    let total = pipeline.len();

    info!(path = %path.display(), tasks = total, "Running pipeline");
    let context = crate::run_pipeline(pipeline, config).await?;

    if json {
        let output =
            serde_json::to_string_pretty(&context).context("Failed to serialize the run context")?;
        println!("{output}");
    } else if !config.quiet() {
        eprintln!("✓ Completed {total} task(s)");
    }

    Ok(())
}

/// Execute `stepwise check`
pub(super) fn execute_check_command(json: bool, config: &Config) -> Result<()> {
    let path = config.pipeline_file();
    let pipeline = PipelineFile::load(&path).map_err(StepwiseError::from)?;

    if json {
        let output = json!({
            "pipeline": path.display().to_string(),
            "tasks": pipeline.tasks(),
        });
        let rendered =
            serde_json::to_string_pretty(&output).context("Failed to serialize the task list")?;
        println!("{rendered}");
        return Ok(());
    }

    let total = pipeline.len();
    println!("✓ {} is valid ({total} task(s))", path.display());
    for (index, task) in pipeline.tasks().iter().enumerate() {
        println!("  [{}/{total}] {}", index + 1, task.title);
        println!("        $ {}", task.command);
        if let Some(key) = &task.capture {
            println!("        capture → {key}");
        }
        if let Some(reason) = &task.skip {
            println!("        skipped: {reason}");
        }
    }

    Ok(())
}

/// Execute `stepwise config`
pub(super) fn execute_config_command(json: bool, config: &Config) -> Result<()> {
    let effective = config.effective_config();
    let config_file = config.config_path().map(|p| p.display().to_string());

    if json {
        let output = json!({
            "config_file": config_file,
            "values": effective,
        });
        let rendered =
            serde_json::to_string_pretty(&output).context("Failed to serialize configuration")?;
        println!("{rendered}");
        return Ok(());
    }

    println!(
        "Config file: {}",
        config_file.as_deref().unwrap_or("(none)")
    );
    for (key, entry) in &effective {
        println!("  {key:<14} = {:<24} [{}]", entry.value, entry.source.as_str());
    }

    Ok(())
}
