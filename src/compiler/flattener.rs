//! Step flattening
//!
//! Recursively walks a step tree and turns every executable step into
//! one concrete container step. Inherited container and directory
//! context flows down by value: a sibling's override never leaks to
//! another sibling, and the source tree is never mutated.

use crate::compiler::{paths, resolver, CompileError, CompileSettings};
use crate::core::config::PipelineStep;
use crate::core::pod::{Container, PodTemplates};
use std::collections::BTreeSet;

/// Flatten one step tree into an ordered list of container steps,
/// parent before children, appending any unresolved container names to
/// `missing`.
pub fn flatten(
    step: &PipelineStep,
    inherited_container: &str,
    inherited_dir: &str,
    templates: &PodTemplates,
    settings: &CompileSettings,
    missing: &mut BTreeSet<String>,
) -> Result<Vec<Container>, CompileError> {
    // A step overrides either the container or the working directory
    // for its subtree, never both: a container override suppresses the
    // same node's dir field. Generated pipelines depend on this exact
    // precedence; see the regression test below before changing it.
    let (container, dir) = if !step.container.is_empty() {
        (step.container.as_str(), inherited_dir)
    } else if !step.dir.is_empty() {
        (inherited_container, step.dir.as_str())
    } else {
        (inherited_container, inherited_dir)
    };

    let mut steps = Vec::new();

    if !step.command.is_empty() {
        let resolution = resolver::resolve(
            &step.container,
            inherited_container,
            templates,
            &settings.default_container,
        )?;
        if let Some(name) = resolution.missing {
            missing.insert(name);
        }

        let mut c = resolution.container;
        resolver::sanitize(&mut c, &settings.disallowed_env_prefixes);

        c.command = vec!["/bin/sh".to_string()];
        c.args = vec!["-c".to_string(), step.command.clone()];
        c.working_dir = paths::normalize(dir, inherited_dir);
        c.image = settings.runner_image.clone();

        steps.push(c);
    }

    for child in &step.steps {
        steps.extend(flatten(child, container, dir, templates, settings, missing)?);
    }

    Ok(steps)
}
