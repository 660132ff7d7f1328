//! Generated task manifest
//!
//! The compiler's terminal artifact: a named, ordered list of container
//! steps wrapped in the kind/apiVersion/metadata/spec envelope expected
//! by the execution engine.

use crate::core::pod::Container;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const TASK_API_VERSION: &str = "pipeline.knative.dev/v1alpha1";
pub const TASK_KIND: &str = "Task";

/// A compiled task definition ready for submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    pub spec: TaskSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Ordered container steps; order is execution order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Container>,
}

impl Task {
    /// Create a task, sanitizing the name into a valid identifier
    pub fn new(name: &str, steps: Vec<Container>) -> Self {
        Self {
            api_version: TASK_API_VERSION.to_string(),
            kind: TASK_KIND.to_string(),
            metadata: Metadata {
                name: to_valid_name(name),
            },
            spec: TaskSpec { steps },
        }
    }

    /// Serialize the task manifest to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("failed to marshal task YAML")
    }
}

/// Sanitize a name into a valid identifier: lowercase, alphanumerics
/// and dashes only, no leading or trailing dash. Idempotent.
pub fn to_valid_name(name: &str) -> String {
    let mapped: String = name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    mapped.trim_matches('-').to_string()
}
