//! Build pack and project configuration loading
//!
//! A build pack root is a directory holding one subdirectory per pack,
//! each with a pipeline configuration file at a fixed relative path.
//! Fetching that root from a remote repository is the caller's concern;
//! this module only reads an already-materialized directory.

use crate::core::config::{PipelineConfig, ProjectConfig};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Pipeline configuration file name inside each build pack directory
pub const PIPELINE_CONFIG_FILE: &str = "pipeline.yaml";

/// Project configuration file name inside a project directory
pub const PROJECT_CONFIG_FILE: &str = "project.yaml";

/// Directory of the named build pack under a packs root
pub fn pack_dir(packs_root: &Path, pack: &str) -> PathBuf {
    packs_root.join(pack)
}

/// Load the base pipeline configuration of a named build pack
pub fn load_pack_pipeline(packs_root: &Path, pack: &str) -> Result<PipelineConfig> {
    let dir = pack_dir(packs_root, pack);
    let file = dir.join(PIPELINE_CONFIG_FILE);
    if !file.exists() {
        anyhow::bail!(
            "no build pack for {} exists at directory {}",
            pack,
            dir.display()
        );
    }
    PipelineConfig::from_file(&file)
        .with_context(|| format!("failed to load build pack pipeline YAML: {}", file.display()))
}

/// Load the project configuration from a directory, returning the path
/// it was read from. An absent file yields the default empty config.
pub fn load_project_config(dir: &Path) -> Result<(ProjectConfig, PathBuf)> {
    let file = dir.join(PROJECT_CONFIG_FILE);
    if !file.exists() {
        return Ok((ProjectConfig::default(), file));
    }
    let content = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read project config {}", file.display()))?;
    let config: ProjectConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse project config {}", file.display()))?;
    Ok((config, file))
}

/// Apply the project's pipeline override, if any, onto the build pack
/// base. The compiler only ever receives the merged result.
pub fn merged_pipeline(base: PipelineConfig, project: &ProjectConfig) -> PipelineConfig {
    match &project.pipeline_config {
        Some(overlay) => {
            let mut merged = overlay.clone();
            merged.extend(&base);
            merged
        }
        None => base,
    }
}
