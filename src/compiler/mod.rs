//! Pipeline-to-task compiler
//!
//! Translates one fully-merged pipeline configuration plus a pod
//! template mapping into a named, ordered task manifest. Compilation is
//! pure and deterministic: all inputs are materialized up front, the
//! configuration is only read, and a fresh diagnostics set is produced
//! per call.

pub mod flattener;
pub mod paths;
pub mod resolver;

pub use flattener::flatten;
pub use paths::normalize;
pub use resolver::{resolve, sanitize, Resolution};

use crate::core::config::{PipelineConfig, PipelineKind, UnsupportedKindError};
use crate::core::pod::PodTemplates;
use crate::core::task::Task;
use std::collections::BTreeSet;
use thiserror::Error;

/// Prefix composed into every generated task name
pub const TASK_NAME_PREFIX: &str = "jx-task-";

/// Fatal compilation errors
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    UnsupportedKind(#[from] UnsupportedKindError),

    /// A template lookup fell back to a template with no usable
    /// container; an unrunnable step makes the whole task meaningless
    #[error("no containers for pod template {0}")]
    NoContainers(String),
}

/// Named settings for the reference constants the compiler applies
#[derive(Debug, Clone)]
pub struct CompileSettings {
    /// Container name used when neither a step nor the agent names one
    pub default_container: String,

    /// Image every generated step runs with
    pub runner_image: String,

    /// Environment variable prefixes stripped from template containers
    pub disallowed_env_prefixes: Vec<String>,
}

impl Default for CompileSettings {
    fn default() -> Self {
        Self {
            default_container: "maven".to_string(),
            runner_image: "jenkinsxio/jx:latest".to_string(),
            disallowed_env_prefixes: vec![
                "GIT_".to_string(),
                "DOCKER_".to_string(),
                "XDG_".to_string(),
            ],
        }
    }
}

/// The compiled task together with its diagnostics side channel
#[derive(Debug, Clone)]
pub struct CompiledTask {
    /// The generated task manifest
    pub task: Task,

    /// Container names that had no pod template and degraded to the
    /// default; reported to the user, never fatal
    pub missing_templates: BTreeSet<String>,
}

/// Compiles pipeline configurations into task manifests
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    settings: CompileSettings,
}

impl Compiler {
    pub fn new(settings: CompileSettings) -> Self {
        Self { settings }
    }

    /// Compile the lifecycle set selected by a kind string, failing on
    /// an unrecognized kind
    pub fn compile_kind(
        &self,
        pack_name: &str,
        config: &PipelineConfig,
        kind: &str,
        templates: &PodTemplates,
    ) -> Result<CompiledTask, CompileError> {
        let kind: PipelineKind = kind.parse()?;
        self.compile(pack_name, config, kind, templates)
    }

    /// Compile the lifecycle set for `kind` into a task manifest.
    ///
    /// Stages flatten in their fixed declared order, then step order; a
    /// kind with no lifecycle set compiles to an empty task. The task
    /// name composes the fixed prefix, pack name and kind name,
    /// sanitized into a valid identifier.
    pub fn compile(
        &self,
        pack_name: &str,
        config: &PipelineConfig,
        kind: PipelineKind,
        templates: &PodTemplates,
    ) -> Result<CompiledTask, CompileError> {
        let mut missing = BTreeSet::new();
        let mut steps = Vec::new();

        if let Some(lifecycles) = config.pipelines.get(kind) {
            for lifecycle in lifecycles.all() {
                for step in &lifecycle.steps {
                    steps.extend(flattener::flatten(
                        step,
                        &config.agent.container,
                        paths::WORKSPACE_ROOT,
                        templates,
                        &self.settings,
                        &mut missing,
                    )?);
                }
            }
        }

        let name = format!("{}{}-{}", TASK_NAME_PREFIX, pack_name, kind.as_str());
        Ok(CompiledTask {
            task: Task::new(&name, steps),
            missing_templates: missing,
        })
    }
}
