//! taskgen - compiles build pack pipelines into container task manifests

pub mod cli;
pub mod compiler;
pub mod core;
pub mod packs;

// Re-export commonly used types
pub use crate::compiler::{CompileError, CompileSettings, CompiledTask, Compiler};
pub use crate::core::config::{PipelineConfig, PipelineKind, PipelineStep, ProjectConfig};
pub use crate::core::pod::{Container, Pod, PodTemplates};
pub use crate::core::task::Task;
