//! Project-wide rules: cross-file checks that need the complete model.
//!
//! These run only after the node-local barrier, since they read every
//! ParsedUnit. A duplicate finding attaches to the lexicographically
//! first involved path (stable identity across scans) and lists every
//! path in the message.

use super::{Domain, Matcher, Rule};
use crate::model::{FileKind, ParsedUnit, ProjectModel, RawFinding, Severity, ToolKind};
use std::collections::BTreeMap;

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "component/unique-name",
            domain: Domain::ComponentShape,
            default_severity: Severity::Error,
            describe: "no two component files share a declared name",
            matcher: Matcher::ProjectWide(unique_component_name),
        },
        Rule {
            id: "store/unique-id",
            domain: Domain::StoreShape,
            default_severity: Severity::Error,
            describe: "no two store files share a store id",
            matcher: Matcher::ProjectWide(unique_store_id),
        },
        Rule {
            id: "format/formatter-config-present",
            domain: Domain::Formatting,
            default_severity: Severity::Warning,
            describe: "projects with components carry a formatter config",
            matcher: Matcher::ProjectWide(formatter_config_present),
        },
    ]
}

fn duplicates(
    rule: &'static str,
    what: &str,
    occurrences: BTreeMap<String, Vec<String>>,
) -> Vec<RawFinding> {
    occurrences
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|(name, mut paths)| {
            paths.sort();
            RawFinding {
                rule: rule.to_string(),
                path: paths[0].clone().into(),
                line: None,
                column: None,
                message: format!(
                    "{} '{}' is declared by multiple files: {}",
                    what,
                    name,
                    paths.join(", ")
                ),
            }
        })
        .collect()
}

fn unique_component_name(model: &ProjectModel) -> Vec<RawFinding> {
    let mut by_name: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for node in model.files_of_kind(FileKind::Component) {
        let declared = match &node.unit {
            Some(ParsedUnit::Component(f)) => f.name.clone(),
            _ => None,
        };
        // An undeclared name defaults to the file stem, which is how the
        // component is addressed from templates.
        let name = declared.or_else(|| {
            node.path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
        });
        if let Some(name) = name {
            by_name
                .entry(name)
                .or_default()
                .push(node.path.to_string_lossy().to_string());
        }
    }
    duplicates("component/unique-name", "component name", by_name)
}

fn unique_store_id(model: &ProjectModel) -> Vec<RawFinding> {
    let mut by_id: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for node in model.files_of_kind(FileKind::Store) {
        if let Some(ParsedUnit::Store(facts)) = &node.unit {
            if let Some(id) = &facts.id {
                by_id
                    .entry(id.clone())
                    .or_default()
                    .push(node.path.to_string_lossy().to_string());
            }
        }
    }
    duplicates("store/unique-id", "store id", by_id)
}

fn formatter_config_present(model: &ProjectModel) -> Vec<RawFinding> {
    let has_components = model.files_of_kind(FileKind::Component).next().is_some();
    if !has_components {
        return Vec::new();
    }
    let has_formatter = model.files_of_kind(FileKind::ToolConfig).any(|n| {
        matches!(&n.unit, Some(ParsedUnit::ToolConfig(f)) if f.tool == ToolKind::Formatter)
    });
    if has_formatter {
        return Vec::new();
    }
    vec![RawFinding {
        rule: "format/formatter-config-present".to_string(),
        path: std::path::PathBuf::new(),
        line: None,
        column: None,
        message: "project has component files but no formatter configuration (.prettierrc or .editorconfig)"
            .to_string(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProjectNode, StoreFacts};
    use std::path::PathBuf;

    fn model_with(nodes: Vec<ProjectNode>) -> ProjectModel {
        ProjectModel {
            root: PathBuf::from("."),
            nodes,
        }
    }

    fn store_node(path: &str, id: &str) -> ProjectNode {
        ProjectNode {
            path: PathBuf::from(path),
            kind: FileKind::Store,
            parent: Some(0),
            children: Vec::new(),
            unit: Some(ParsedUnit::Store(StoreFacts {
                declares_store: true,
                id: Some(id.to_string()),
                ..StoreFacts::default()
            })),
            text: None,
        }
    }

    #[test]
    fn test_duplicate_store_id_is_one_finding_naming_both_paths() {
        let model = model_with(vec![
            store_node("src/stores/user.ts", "user"),
            store_node("src/stores/account.ts", "user"),
            store_node("src/stores/cart.ts", "cart"),
        ]);
        let found = unique_store_id(&model);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, PathBuf::from("src/stores/account.ts"));
        assert!(found[0].message.contains("src/stores/user.ts"));
        assert!(found[0].message.contains("src/stores/account.ts"));
    }

    #[test]
    fn test_component_name_falls_back_to_stem() {
        let mk = |path: &str| ProjectNode {
            path: PathBuf::from(path),
            kind: FileKind::Component,
            parent: Some(0),
            children: Vec::new(),
            unit: None,
            text: None,
        };
        let model = model_with(vec![
            mk("src/components/Button.vue"),
            mk("src/views/Button.vue"),
        ]);
        let found = unique_component_name(&model);
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("component name 'Button'"));
    }

    #[test]
    fn test_formatter_presence_only_checked_with_components() {
        let empty = model_with(Vec::new());
        assert!(formatter_config_present(&empty).is_empty());
    }
}
