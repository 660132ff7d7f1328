//! Pod template models
//!
//! A pod template is a skeleton pod specification keyed by container
//! name. The compiler clones the template's first container and
//! overwrites command, args, working directory and image per step.
//! Field names follow the pod spec wire format (camelCase).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Mapping from container name to its pod template
pub type PodTemplates = HashMap<String, Pod>;

/// A pod specification skeleton
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pod {
    #[serde(default)]
    pub spec: PodSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<Container>,
}

/// A container definition; doubles as the compiled step unit in the
/// generated task manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Container {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub image: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub working_dir: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
}

/// A single environment variable entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
}

impl EnvVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A volume mount entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    pub name: String,
    pub mount_path: String,
}

/// Load pod templates from a YAML file holding a mapping from
/// container name to pod specification
pub fn load_templates<P: AsRef<Path>>(path: P) -> Result<PodTemplates> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read pod templates from {}", path.display()))?;
    templates_from_yaml(&content)
        .with_context(|| format!("failed to parse pod templates from {}", path.display()))
}

/// Parse pod templates from a YAML string
pub fn templates_from_yaml(yaml: &str) -> Result<PodTemplates> {
    let templates: PodTemplates = serde_yaml::from_str(yaml)?;
    Ok(templates)
}
