//! Container resolution and sanitization
//!
//! Maps a step's effective container name to a pod template skeleton,
//! falling back to the default template when the name is unknown, and
//! strips template fields that do not belong in a generated step.

use crate::compiler::CompileError;
use crate::core::pod::{Container, PodTemplates};

/// Outcome of resolving a container name against the template mapping
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Clone of the first container of the chosen template
    pub container: Container,

    /// The name that was looked up
    pub name: String,

    /// Set when the looked-up name had no template and the default was
    /// used instead; the caller records it for diagnostics
    pub missing: Option<String>,
}

/// Resolve the container template for a step.
///
/// The effective name is the declared name if non-empty, else the
/// inherited one, else `default_name`. An unknown name is not fatal: it
/// degrades to the default template and is reported via
/// [`Resolution::missing`]. A chosen template without any containers is
/// fatal. Templates with multiple containers always contribute their
/// first one.
pub fn resolve(
    declared: &str,
    inherited: &str,
    templates: &PodTemplates,
    default_name: &str,
) -> Result<Resolution, CompileError> {
    let mut name = if !declared.is_empty() { declared } else { inherited };
    if name.is_empty() {
        name = default_name;
    }

    let (template, missing) = match templates.get(name) {
        Some(t) => (Some(t), None),
        None => (templates.get(default_name), Some(name.to_string())),
    };

    let first = template
        .and_then(|t| t.spec.containers.first())
        .ok_or_else(|| CompileError::NoContainers(name.to_string()))?;

    Ok(Resolution {
        container: first.clone(),
        name: name.to_string(),
        missing,
    })
}

/// Strip inherited template fields that must not reach the generated
/// step: all volume mounts, and every environment variable whose name
/// starts with one of the disallowed prefixes.
pub fn sanitize(container: &mut Container, disallowed_env_prefixes: &[String]) {
    container.volume_mounts.clear();
    container
        .env
        .retain(|e| !disallowed_env_prefixes.iter().any(|p| e.name.starts_with(p.as_str())));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pod::{EnvVar, Pod, PodSpec, VolumeMount};
    use std::collections::HashMap;

    fn templates_with(names: &[&str]) -> PodTemplates {
        let mut templates = HashMap::new();
        for name in names {
            templates.insert(
                name.to_string(),
                Pod {
                    spec: PodSpec {
                        containers: vec![Container {
                            name: name.to_string(),
                            image: format!("{}:latest", name),
                            ..Default::default()
                        }],
                    },
                },
            );
        }
        templates
    }

    #[test]
    fn test_declared_wins_over_inherited() {
        let templates = templates_with(&["maven", "gradle"]);
        let resolution = resolve("gradle", "maven", &templates, "maven").unwrap();
        assert_eq!(resolution.name, "gradle");
        assert_eq!(resolution.container.image, "gradle:latest");
        assert!(resolution.missing.is_none());
    }

    #[test]
    fn test_empty_names_use_default() {
        let templates = templates_with(&["maven"]);
        let resolution = resolve("", "", &templates, "maven").unwrap();
        assert_eq!(resolution.name, "maven");
        assert!(resolution.missing.is_none());
    }

    #[test]
    fn test_unknown_name_falls_back_to_default() {
        let templates = templates_with(&["maven"]);
        let resolution = resolve("nodejs", "", &templates, "maven").unwrap();
        assert_eq!(resolution.container.image, "maven:latest");
        assert_eq!(resolution.missing.as_deref(), Some("nodejs"));
    }

    #[test]
    fn test_fallback_without_containers_is_fatal() {
        let mut templates = templates_with(&[]);
        templates.insert("maven".to_string(), Pod::default());

        let err = resolve("nodejs", "", &templates, "maven").unwrap_err();
        assert!(matches!(err, CompileError::NoContainers(ref name) if name == "nodejs"));
    }

    #[test]
    fn test_missing_default_template_is_fatal() {
        let templates = templates_with(&[]);
        let err = resolve("nodejs", "", &templates, "maven").unwrap_err();
        assert!(matches!(err, CompileError::NoContainers(_)));
    }

    #[test]
    fn test_multi_container_template_uses_first() {
        let mut templates = HashMap::new();
        templates.insert(
            "maven".to_string(),
            Pod {
                spec: PodSpec {
                    containers: vec![
                        Container {
                            name: "primary".to_string(),
                            ..Default::default()
                        },
                        Container {
                            name: "sidecar".to_string(),
                            ..Default::default()
                        },
                    ],
                },
            },
        );

        let resolution = resolve("maven", "", &templates, "maven").unwrap();
        assert_eq!(resolution.container.name, "primary");
    }

    #[test]
    fn test_sanitize_strips_volumes_and_reserved_env() {
        let mut container = Container {
            env: vec![
                EnvVar::new("GIT_TOKEN", "secret"),
                EnvVar::new("DOCKER_HOST", "tcp://localhost"),
                EnvVar::new("XDG_CONFIG", "/etc/xdg"),
                EnvVar::new("PATH", "/usr/bin"),
            ],
            volume_mounts: vec![VolumeMount {
                name: "workspace-volume".to_string(),
                mount_path: "/home/jenkins".to_string(),
            }],
            ..Default::default()
        };

        let prefixes = vec!["GIT_".to_string(), "DOCKER_".to_string(), "XDG_".to_string()];
        sanitize(&mut container, &prefixes);

        assert!(container.volume_mounts.is_empty());
        assert_eq!(container.env, vec![EnvVar::new("PATH", "/usr/bin")]);
    }
}
