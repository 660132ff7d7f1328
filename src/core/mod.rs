//! Core domain models
//!
//! This module defines the data structures for pipeline configuration,
//! pod templates and the generated task manifest.

pub mod config;
pub mod pod;
pub mod task;

pub use config::{
    PipelineAgent, PipelineConfig, PipelineKind, PipelineLifecycle, PipelineLifecycles,
    PipelineStep, Pipelines, ProjectConfig, UnsupportedKindError,
};
pub use pod::{Container, EnvVar, Pod, PodSpec, PodTemplates, VolumeMount};
pub use task::{Metadata, Task, TaskSpec};
