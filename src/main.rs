mod cli;
mod compiler;
mod core;
mod packs;

use anyhow::{Context, Result};
use cli::commands::{CreateCommand, ValidateCommand};
use cli::output::*;
use cli::{Cli, Command};
use compiler::Compiler;
use crate::core::config::PipelineConfig;
use crate::core::pod;
use std::path::Path;
use tracing::{debug, warn, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Create(cmd) => create_task(cmd)?,
        Command::Validate(cmd) => validate_pipeline(cmd)?,
    }

    Ok(())
}

fn create_task(cmd: &CreateCommand) -> Result<()> {
    let dir = match &cmd.dir {
        Some(dir) => std::path::PathBuf::from(dir),
        None => std::env::current_dir()?,
    };

    let (project, project_file) = packs::load_project_config(&dir)
        .with_context(|| format!("failed to load project config in dir {}", dir.display()))?;
    debug!("project config read from {}", project_file.display());

    let pack = cmd
        .pack
        .clone()
        .filter(|p| !p.is_empty())
        .or_else(|| {
            (!project.build_pack.is_empty()).then(|| project.build_pack.clone())
        })
        .ok_or_else(|| anyhow::anyhow!("missing option: pack"))?;

    println!(
        "{} Using build pack {} for kind {}",
        INFO,
        style(&pack).bold(),
        style(&cmd.kind).cyan()
    );

    let base = packs::load_pack_pipeline(Path::new(&cmd.packs_dir), &pack)?;
    let pipeline = packs::merged_pipeline(base, &project);

    let templates = pod::load_templates(&cmd.templates)?;

    let compiled = Compiler::default()
        .compile_kind(&pack, &pipeline, &cmd.kind, &templates)
        .with_context(|| format!("failed to generate task for build pack {}", pack))?;

    for name in &compiled.missing_templates {
        warn!("no pod template found for container {}", name);
        println!(
            "{} No pod template found for container {}",
            WARN,
            style(name).yellow()
        );
    }

    let data = compiled.task.to_yaml()?;
    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &data)
                .with_context(|| format!("failed to save task file {}", path))?;
            println!("{} Generated task at {}", CHECK, style(path).bold());
        }
        None => {
            println!("{}", data);
        }
    }

    Ok(())
}

fn validate_pipeline(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating pipeline...", INFO);

    let result = PipelineConfig::from_file(&cmd.file);

    match result {
        Ok(config) => {
            println!("{} Pipeline configuration is valid!", CHECK);
            println!("  Agent: {}", style(&config.agent.container).bold());
            for kind in config.pipelines.kinds() {
                let steps = config
                    .pipelines
                    .get(kind)
                    .map(|l| l.command_count())
                    .unwrap_or(0);
                println!(
                    "  {}: {} steps",
                    style(kind.as_str()).cyan(),
                    style(steps).bold()
                );
            }

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    }
}
