//! CLI command definitions

use clap::Args;

/// Generate a task manifest for a project
#[derive(Debug, Args, Clone)]
pub struct CreateCommand {
    /// Project directory holding the project configuration
    #[arg(short, long)]
    pub dir: Option<String>,

    /// Output file to write the task YAML to (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Root directory of the build pack repository
    #[arg(short = 'u', long)]
    pub packs_dir: String,

    /// Build pack name; falls back to the project configuration
    #[arg(short, long)]
    pub pack: Option<String>,

    /// Kind of pipeline to create (release, pullrequest, feature)
    #[arg(short, long, default_value = "release")]
    pub kind: String,

    /// Path to the pod templates YAML file
    #[arg(short, long)]
    pub templates: String,
}

/// Validate a pipeline configuration file
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
