//! Configuration discovery and layered merge.
//!
//! Sources merge in a fixed order, last-write-wins per rule id:
//! built-in defaults (every registry rule at its default severity), then
//! each preset named by `extends` in list order, then the project file
//! (`convlint.toml|yaml|yml`), then CLI `--rule` overrides. Inline
//! suppressions are harvested by the scanner and applied later by the
//! resolver; they only ever silence, never raise.
//!
//! Loading is best-effort: an unresolvable preset, unknown rule id,
//! unknown domain, or malformed severity becomes a `ConfigError` that is
//! collected and surfaced in the report, without aborting the merge.

use crate::model::Severity;
use crate::registry::Registry;
use crate::rules::Domain;
use glob::Pattern;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_IGNORES: &[&str] = &[".git", "node_modules", "dist", "coverage"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSetting {
    Off,
    On(Severity),
}

#[derive(Debug, Default, Deserialize)]
/// On-disk shape of `convlint.toml`/`convlint.yaml` and preset files.
pub struct ConfigFile {
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub domains: BTreeMap<String, bool>,
    #[serde(default)]
    pub rules: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
/// A bad configuration source or override; recovered per-source.
pub struct ConfigError {
    /// Display path of the offending source file.
    pub source: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}

impl Error for ConfigError {}

/// The one effective configuration for a run, immutable once loaded.
#[derive(Debug)]
pub struct EffectiveConfig {
    /// Complete over the registry: every rule id maps to a setting.
    pub settings: BTreeMap<String, RuleSetting>,
    pub ignore: Vec<Pattern>,
    pub output: Option<String>,
    /// Display path of the project config file, when one was found.
    pub config_path: Option<String>,
    /// Recoverable errors collected during the merge.
    pub errors: Vec<ConfigError>,
}

impl EffectiveConfig {
    pub fn severity_of(&self, rule_id: &str) -> Option<Severity> {
        match self.settings.get(rule_id) {
            Some(RuleSetting::On(sev)) => Some(*sev),
            _ => None,
        }
    }

    /// Rules that will actually execute: disabled rules are filtered out
    /// here, before the evaluator ever sees them.
    pub fn active<'r>(&self, registry: &'r Registry) -> Vec<&'r crate::rules::Rule> {
        registry
            .iter()
            .filter(|r| matches!(self.settings.get(r.id), Some(RuleSetting::On(_))))
            .collect()
    }
}

/// Locate and merge all configuration sources for `root`.
///
/// Fails only when `cli_config` names a file that does not exist or cannot
/// be parsed at all; a discovered (non-explicit) config that is malformed
/// is a collected error instead.
pub fn load(
    root: &Path,
    cli_config: Option<&Path>,
    cli_rules: &[String],
    cli_ignores: &[String],
    registry: &Registry,
) -> Result<EffectiveConfig, ConfigError> {
    let mut settings: BTreeMap<String, RuleSetting> = registry
        .iter()
        .map(|r| (r.id.to_string(), RuleSetting::On(r.default_severity)))
        .collect();
    let mut errors: Vec<ConfigError> = Vec::new();
    let mut ignore_globs: Vec<String> =
        DEFAULT_IGNORES.iter().map(|s| s.to_string()).collect();
    let mut output = None;

    let project_file = match cli_config {
        Some(p) => {
            let p = if p.is_absolute() {
                p.to_path_buf()
            } else {
                root.join(p)
            };
            if !p.is_file() {
                return Err(ConfigError {
                    source: p.to_string_lossy().to_string(),
                    message: "configuration file not found".to_string(),
                });
            }
            Some(p)
        }
        None => discover(root),
    };
    let config_path = project_file.as_ref().map(|p| display_path(p, root));

    if let Some(path) = &project_file {
        match read_config_file(path) {
            Ok(file) => {
                let mut visited = BTreeSet::new();
                visited.insert(path.clone());
                apply_with_presets(
                    &file,
                    path,
                    root,
                    registry,
                    &mut settings,
                    &mut ignore_globs,
                    &mut output,
                    &mut errors,
                    &mut visited,
                );
            }
            Err(e) => {
                if cli_config.is_some() {
                    return Err(e);
                }
                errors.push(e);
            }
        }
    }

    // CLI overrides are the highest-precedence source.
    for entry in cli_rules {
        match entry.split_once('=') {
            Some((id, sev)) => apply_rule_override(
                id.trim(),
                sev.trim(),
                "<cli>",
                registry,
                &mut settings,
                &mut errors,
            ),
            None => errors.push(ConfigError {
                source: "<cli>".to_string(),
                message: format!("malformed --rule override '{}': expected id=severity", entry),
            }),
        }
    }
    ignore_globs.extend(cli_ignores.iter().cloned());

    let mut ignore = Vec::new();
    for g in ignore_globs {
        match Pattern::new(&g) {
            Ok(p) => ignore.push(p),
            Err(e) => errors.push(ConfigError {
                source: config_path.clone().unwrap_or_else(|| "<cli>".to_string()),
                message: format!("invalid ignore glob '{}': {}", g, e),
            }),
        }
    }

    Ok(EffectiveConfig {
        settings,
        ignore,
        output,
        config_path,
        errors,
    })
}

/// Probe `convlint.toml`, then `convlint.yaml|yml`, at the project root.
pub fn discover(root: &Path) -> Option<PathBuf> {
    for name in ["convlint.toml", "convlint.yaml", "convlint.yml"] {
        let p = root.join(name);
        if p.is_file() {
            return Some(p);
        }
    }
    None
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let source = path.to_string_lossy().to_string();
    let content = fs::read_to_string(path).map_err(|e| ConfigError {
        source: source.clone(),
        message: format!("cannot read configuration: {}", e),
    })?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| ConfigError {
            source,
            message: format!("invalid YAML configuration: {}", e),
        })
    } else {
        toml::from_str(&content).map_err(|e| ConfigError {
            source,
            message: format!("invalid TOML configuration: {}", e),
        })
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_with_presets(
    file: &ConfigFile,
    path: &Path,
    root: &Path,
    registry: &Registry,
    settings: &mut BTreeMap<String, RuleSetting>,
    ignore_globs: &mut Vec<String>,
    output: &mut Option<String>,
    errors: &mut Vec<ConfigError>,
    visited: &mut BTreeSet<PathBuf>,
) {
    // Presets merge before the file that names them.
    for preset_ref in &file.extends {
        let preset_path = path.parent().unwrap_or(Path::new(".")).join(preset_ref);
        if !preset_path.is_file() {
            errors.push(ConfigError {
                source: display_path(path, root),
                message: format!("preset '{}' could not be resolved", preset_ref),
            });
            continue;
        }
        if !visited.insert(preset_path.clone()) {
            errors.push(ConfigError {
                source: display_path(path, root),
                message: format!("preset '{}' forms an extends cycle", preset_ref),
            });
            continue;
        }
        match read_config_file(&preset_path) {
            Ok(preset) => apply_with_presets(
                &preset,
                &preset_path,
                root,
                registry,
                settings,
                ignore_globs,
                output,
                errors,
                visited,
            ),
            Err(e) => errors.push(e),
        }
    }
    apply_source(file, &display_path(path, root), registry, settings, errors);
    ignore_globs.extend(file.ignore.iter().cloned());
    if file.output.is_some() {
        *output = file.output.clone();
    }
}

/// Apply one source's domain toggles and per-rule overrides. Domain
/// toggles go first so the same source's rule entries win over them.
fn apply_source(
    file: &ConfigFile,
    source: &str,
    registry: &Registry,
    settings: &mut BTreeMap<String, RuleSetting>,
    errors: &mut Vec<ConfigError>,
) {
    for (name, enabled) in &file.domains {
        let Some(domain) = Domain::parse(name) else {
            errors.push(ConfigError {
                source: source.to_string(),
                message: format!("unknown domain '{}'", name),
            });
            continue;
        };
        for id in registry.ids_in_domain(domain) {
            let setting = if *enabled {
                RuleSetting::On(
                    registry
                        .get(id)
                        .map(|r| r.default_severity)
                        .unwrap_or(Severity::Warning),
                )
            } else {
                RuleSetting::Off
            };
            settings.insert(id.to_string(), setting);
        }
    }
    for (id, sev) in &file.rules {
        apply_rule_override(id, sev, source, registry, settings, errors);
    }
}

fn apply_rule_override(
    id: &str,
    sev: &str,
    source: &str,
    registry: &Registry,
    settings: &mut BTreeMap<String, RuleSetting>,
    errors: &mut Vec<ConfigError>,
) {
    if !registry.contains(id) {
        errors.push(ConfigError {
            source: source.to_string(),
            message: format!("unknown rule id '{}'", id),
        });
        return;
    }
    let setting = if sev == "off" {
        RuleSetting::Off
    } else {
        match Severity::parse(sev) {
            Some(s) => RuleSetting::On(s),
            None => {
                errors.push(ConfigError {
                    source: source.to_string(),
                    message: format!(
                        "malformed severity '{}' for rule '{}' (expected error|warning|info|off)",
                        sev, id
                    ),
                });
                return;
            }
        }
    };
    settings.insert(id.to_string(), setting);
}

fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}
