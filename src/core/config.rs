//! Pipeline configuration from YAML
//!
//! These types mirror the build pack pipeline file: one set of
//! lifecycles per pipeline kind, each lifecycle holding a tree of
//! steps. A project can carry a local override that is layered on top
//! of the build pack base before compilation.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// The kind of pipeline to compile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    Release,
    PullRequest,
    Feature,
}

impl PipelineKind {
    /// All recognized kinds, in declaration order
    pub const ALL: [PipelineKind; 3] = [
        PipelineKind::Release,
        PipelineKind::PullRequest,
        PipelineKind::Feature,
    ];

    /// The kind name as used on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineKind::Release => "release",
            PipelineKind::PullRequest => "pullrequest",
            PipelineKind::Feature => "feature",
        }
    }

    /// Comma-separated list of recognized kind names
    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Error for a pipeline kind string that matches no known kind
#[derive(Debug, Error)]
#[error("unknown pipeline kind {kind}, supported values are {}", PipelineKind::names())]
pub struct UnsupportedKindError {
    pub kind: String,
}

impl FromStr for PipelineKind {
    type Err = UnsupportedKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "release" => Ok(PipelineKind::Release),
            "pullrequest" => Ok(PipelineKind::PullRequest),
            "feature" => Ok(PipelineKind::Feature),
            other => Err(UnsupportedKindError {
                kind: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level pipeline configuration loaded from YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Default execution agent for steps that name no container
    #[serde(default)]
    pub agent: PipelineAgent,

    /// Lifecycle sets, one per pipeline kind
    #[serde(default)]
    pub pipelines: Pipelines,
}

/// The default agent used when a step does not name a container
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineAgent {
    /// Agent label (informational)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,

    /// Default container name inherited by root steps
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub container: String,
}

/// Lifecycle sets keyed by pipeline kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipelines {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<PipelineLifecycles>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<PipelineLifecycles>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<PipelineLifecycles>,
}

impl Pipelines {
    /// The lifecycle set for the given kind, if the config defines one
    pub fn get(&self, kind: PipelineKind) -> Option<&PipelineLifecycles> {
        match kind {
            PipelineKind::Release => self.release.as_ref(),
            PipelineKind::PullRequest => self.pull_request.as_ref(),
            PipelineKind::Feature => self.feature.as_ref(),
        }
    }

    /// Kinds that have a lifecycle set defined
    pub fn kinds(&self) -> Vec<PipelineKind> {
        PipelineKind::ALL
            .into_iter()
            .filter(|k| self.get(*k).is_some())
            .collect()
    }
}

/// The ordered lifecycle stages of one pipeline kind
///
/// Stages are compiled in the fixed order returned by [`all`](Self::all);
/// an absent stage contributes zero steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineLifecycles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<PipelineLifecycle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_version: Option<PipelineLifecycle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_build: Option<PipelineLifecycle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<PipelineLifecycle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_build: Option<PipelineLifecycle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promote: Option<PipelineLifecycle>,
}

impl PipelineLifecycles {
    /// Defined stages in their fixed declared order
    pub fn all(&self) -> impl Iterator<Item = &PipelineLifecycle> {
        [
            self.setup.as_ref(),
            self.set_version.as_ref(),
            self.pre_build.as_ref(),
            self.build.as_ref(),
            self.post_build.as_ref(),
            self.promote.as_ref(),
        ]
        .into_iter()
        .flatten()
    }

    /// Total number of executable steps across all stages
    pub fn command_count(&self) -> usize {
        self.all()
            .flat_map(|l| l.steps.iter())
            .map(PipelineStep::command_count)
            .sum()
    }
}

/// One lifecycle stage holding an ordered forest of steps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineLifecycle {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<PipelineStep>,
}

/// A pipeline step: a leaf with a command, or a grouping node with
/// nested child steps. All fields are optional; an empty string means
/// "not set". A step with no command and no children is a no-op.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineStep {
    /// Free-text comment, carried through but not compiled
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,

    /// Container name override for this step's subtree
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub container: String,

    /// Working directory override, possibly relative
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dir: String,

    /// Shell command; presence marks this step as executable
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub command: String,

    /// Nested child steps, compiled after this step's own command
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<PipelineStep>,
}

impl PipelineStep {
    /// Number of executable steps in this subtree, self included
    pub fn command_count(&self) -> usize {
        let own = usize::from(!self.command.is_empty());
        own + self.steps.iter().map(Self::command_count).sum::<usize>()
    }
}

impl PipelineConfig {
    /// Load a pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a pipeline configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<()> {
        if self.pipelines.kinds().is_empty() {
            anyhow::bail!(
                "no pipelines defined for any kind ({})",
                PipelineKind::names()
            );
        }
        Ok(())
    }

    /// Fill unset fields of this configuration from a base config.
    ///
    /// Used to layer a project-local override on top of the build pack
    /// base: the override's agent and per-kind lifecycle sets win where
    /// set, the base fills the gaps. The result is the complete config
    /// handed to the compiler.
    pub fn extend(&mut self, base: &PipelineConfig) {
        if self.agent.container.is_empty() {
            self.agent = base.agent.clone();
        }
        if self.pipelines.release.is_none() {
            self.pipelines.release = base.pipelines.release.clone();
        }
        if self.pipelines.pull_request.is_none() {
            self.pipelines.pull_request = base.pipelines.pull_request.clone();
        }
        if self.pipelines.feature.is_none() {
            self.pipelines.feature = base.pipelines.feature.clone();
        }
    }
}

/// Declarative project configuration, optionally naming a build pack
/// and carrying a pipeline override
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Name of the build pack to compile with
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub build_pack: String,

    /// Project-local pipeline override layered onto the pack base
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_config: Option<PipelineConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_steps() {
        let yaml = r#"
agent:
  label: jenkins-maven
  container: maven
pipelines:
  release:
    build:
      steps:
        - command: "mvn deploy"
          dir: "./app"
        - container: gradle
          steps:
            - command: "gradle build"
"#;

        let config = PipelineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.agent.container, "maven");

        let release = config.pipelines.release.as_ref().unwrap();
        let build = release.build.as_ref().unwrap();
        assert_eq!(build.steps.len(), 2);
        assert_eq!(build.steps[0].command, "mvn deploy");
        assert_eq!(build.steps[0].dir, "./app");
        assert_eq!(build.steps[1].container, "gradle");
        assert_eq!(build.steps[1].steps[0].command, "gradle build");
    }

    #[test]
    fn test_lifecycle_order() {
        let yaml = r#"
pipelines:
  release:
    promote:
      steps:
        - command: "jx promote"
    setup:
      steps:
        - command: "git init"
    build:
      steps:
        - command: "make"
"#;

        let config = PipelineConfig::from_yaml(yaml).unwrap();
        let release = config.pipelines.release.as_ref().unwrap();
        let commands: Vec<&str> = release
            .all()
            .flat_map(|l| l.steps.iter())
            .map(|s| s.command.as_str())
            .collect();
        // Declared order is setup, setVersion, preBuild, build, postBuild,
        // promote regardless of YAML key order
        assert_eq!(commands, vec!["git init", "make", "jx promote"]);
    }

    #[test]
    fn test_camel_case_keys() {
        let yaml = r#"
pipelines:
  pullRequest:
    preBuild:
      steps:
        - command: "npm install"
    postBuild:
      steps:
        - command: "npm audit"
"#;

        let config = PipelineConfig::from_yaml(yaml).unwrap();
        let pr = config.pipelines.pull_request.as_ref().unwrap();
        assert!(pr.pre_build.is_some());
        assert!(pr.post_build.is_some());
        assert_eq!(pr.command_count(), 2);
    }

    #[test]
    fn test_no_pipelines_fails_validation() {
        let yaml = r#"
agent:
  container: maven
"#;

        assert!(PipelineConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(
            "release".parse::<PipelineKind>().unwrap(),
            PipelineKind::Release
        );
        assert_eq!(
            "pullrequest".parse::<PipelineKind>().unwrap(),
            PipelineKind::PullRequest
        );
        assert_eq!(
            "feature".parse::<PipelineKind>().unwrap(),
            PipelineKind::Feature
        );

        let err = "nightly".parse::<PipelineKind>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("nightly"));
        assert!(message.contains("release, pullrequest, feature"));
    }

    #[test]
    fn test_extend_fills_unset_fields() {
        let base = PipelineConfig::from_yaml(
            r#"
agent:
  container: maven
pipelines:
  release:
    build:
      steps:
        - command: "mvn deploy"
  pullRequest:
    build:
      steps:
        - command: "mvn verify"
"#,
        )
        .unwrap();

        let mut overlay = PipelineConfig::from_yaml(
            r#"
pipelines:
  release:
    build:
      steps:
        - command: "make release"
"#,
        )
        .unwrap();

        overlay.extend(&base);

        // Overridden kind wins, the rest comes from the base
        assert_eq!(overlay.agent.container, "maven");
        let release = overlay.pipelines.release.as_ref().unwrap();
        assert_eq!(
            release.build.as_ref().unwrap().steps[0].command,
            "make release"
        );
        let pr = overlay.pipelines.pull_request.as_ref().unwrap();
        assert_eq!(pr.build.as_ref().unwrap().steps[0].command, "mvn verify");
    }

    #[test]
    fn test_command_count_nested() {
        let step = PipelineStep {
            command: "outer".to_string(),
            steps: vec![
                PipelineStep {
                    command: "inner".to_string(),
                    ..Default::default()
                },
                PipelineStep::default(),
            ],
            ..Default::default()
        };
        assert_eq!(step.command_count(), 2);
    }
}
