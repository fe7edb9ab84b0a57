//! Naming-domain rules: case conventions for files, directories,
//! composables, and style classes.

use super::{finding, Domain, Matcher, Rule};
use crate::model::{FileKind, ParsedUnit, ProjectNode, RawFinding, Severity};

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "naming/component-pascal-case",
            domain: Domain::Naming,
            default_severity: Severity::Error,
            describe: "component file names are PascalCase",
            matcher: Matcher::NodeLocal(component_pascal_case),
        },
        Rule {
            id: "naming/store-camel-case",
            domain: Domain::Naming,
            default_severity: Severity::Warning,
            describe: "store file names are camelCase",
            matcher: Matcher::NodeLocal(store_camel_case),
        },
        Rule {
            id: "naming/directory-kebab-case",
            domain: Domain::Naming,
            default_severity: Severity::Warning,
            describe: "directory names are kebab-case",
            matcher: Matcher::NodeLocal(directory_kebab_case),
        },
        Rule {
            id: "naming/composable-use-prefix",
            domain: Domain::Naming,
            default_severity: Severity::Warning,
            describe: "composables are named and exported with a use* prefix",
            matcher: Matcher::NodeLocal(composable_use_prefix),
        },
        Rule {
            id: "naming/style-class-kebab-case",
            domain: Domain::Naming,
            default_severity: Severity::Info,
            describe: "style class selectors are kebab-case",
            matcher: Matcher::NodeLocal(style_class_kebab_case),
        },
    ]
}

pub(crate) fn is_pascal_case(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

pub(crate) fn is_camel_case(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

pub(crate) fn is_kebab_case(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn stem(node: &ProjectNode) -> Option<String> {
    node.path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
}

fn component_pascal_case(node: &ProjectNode) -> Vec<RawFinding> {
    if node.kind != FileKind::Component {
        return Vec::new();
    }
    let Some(stem) = stem(node) else {
        return Vec::new();
    };
    if is_pascal_case(&stem) {
        return Vec::new();
    }
    vec![finding(
        "naming/component-pascal-case",
        node,
        None,
        format!("component file name '{}' is not PascalCase", stem),
    )]
}

fn store_camel_case(node: &ProjectNode) -> Vec<RawFinding> {
    if node.kind != FileKind::Store {
        return Vec::new();
    }
    let Some(stem) = stem(node) else {
        return Vec::new();
    };
    if is_camel_case(&stem) {
        return Vec::new();
    }
    vec![finding(
        "naming/store-camel-case",
        node,
        None,
        format!("store file name '{}' is not camelCase", stem),
    )]
}

fn directory_kebab_case(node: &ProjectNode) -> Vec<RawFinding> {
    if node.kind != FileKind::Directory {
        return Vec::new();
    }
    let Some(name) = node.path.file_name().map(|n| n.to_string_lossy().to_string()) else {
        // the root node has an empty path
        return Vec::new();
    };
    if name.starts_with('.') || is_kebab_case(&name) {
        return Vec::new();
    }
    vec![finding(
        "naming/directory-kebab-case",
        node,
        None,
        format!("directory name '{}' is not kebab-case", name),
    )]
}

fn composable_use_prefix(node: &ProjectNode) -> Vec<RawFinding> {
    if node.kind != FileKind::Script {
        return Vec::new();
    }
    let in_composables = node
        .path
        .components()
        .any(|c| c.as_os_str().to_string_lossy() == "composables");
    if !in_composables {
        return Vec::new();
    }
    let Some(stem) = stem(node) else {
        return Vec::new();
    };
    if !stem.starts_with("use") {
        return vec![finding(
            "naming/composable-use-prefix",
            node,
            None,
            format!("composable file name '{}' does not start with 'use'", stem),
        )];
    }
    if let Some(ParsedUnit::Script(facts)) = &node.unit {
        let exports_use = facts.has_default_export
            || facts.named_exports.iter().any(|n| n.starts_with("use"));
        if !exports_use && !facts.named_exports.is_empty() {
            return vec![finding(
                "naming/composable-use-prefix",
                node,
                None,
                "composable exports nothing named with a 'use' prefix".to_string(),
            )];
        }
    }
    Vec::new()
}

fn style_class_kebab_case(node: &ProjectNode) -> Vec<RawFinding> {
    let Some(ParsedUnit::Style(facts)) = &node.unit else {
        return Vec::new();
    };
    facts
        .class_names
        .iter()
        .filter(|(name, _)| !is_kebab_case(name))
        .map(|(name, line)| {
            finding(
                "naming/style-class-kebab-case",
                node,
                Some(*line),
                format!("class selector '.{}' is not kebab-case", name),
            )
        })
        .collect()
}
