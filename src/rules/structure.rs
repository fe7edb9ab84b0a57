//! Structure-domain rules: files of each kind live under their
//! conventional directory.

use super::{finding, Domain, Matcher, Rule};
use crate::model::{FileKind, ProjectNode, RawFinding, Severity};

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "structure/component-location",
            domain: Domain::Structure,
            default_severity: Severity::Warning,
            describe: "component files live under components/, views/, or pages/",
            matcher: Matcher::NodeLocal(component_location),
        },
        Rule {
            id: "structure/store-location",
            domain: Domain::Structure,
            default_severity: Severity::Warning,
            describe: "store files live under stores/",
            matcher: Matcher::NodeLocal(store_location),
        },
        Rule {
            id: "structure/route-location",
            domain: Domain::Structure,
            default_severity: Severity::Warning,
            describe: "route files live under router/",
            matcher: Matcher::NodeLocal(route_location),
        },
    ]
}

fn has_ancestor_dir(node: &ProjectNode, names: &[&str]) -> bool {
    let mut components: Vec<_> = node.path.components().collect();
    components.pop(); // the file itself
    components.iter().any(|c| {
        let s = c.as_os_str().to_string_lossy();
        names.iter().any(|n| *n == s)
    })
}

fn component_location(node: &ProjectNode) -> Vec<RawFinding> {
    if node.kind != FileKind::Component {
        return Vec::new();
    }
    // src/App.vue is the conventional root component.
    if node.path.file_stem().map(|s| s == "App").unwrap_or(false) {
        return Vec::new();
    }
    if has_ancestor_dir(node, &["components", "views", "pages"]) {
        return Vec::new();
    }
    vec![finding(
        "structure/component-location",
        node,
        None,
        "component file is outside components/, views/, or pages/".to_string(),
    )]
}

fn store_location(node: &ProjectNode) -> Vec<RawFinding> {
    if node.kind != FileKind::Store || has_ancestor_dir(node, &["stores", "store"]) {
        return Vec::new();
    }
    vec![finding(
        "structure/store-location",
        node,
        None,
        "store file is outside stores/".to_string(),
    )]
}

fn route_location(node: &ProjectNode) -> Vec<RawFinding> {
    if node.kind != FileKind::Route || has_ancestor_dir(node, &["router", "routes"]) {
        return Vec::new();
    }
    vec![finding(
        "structure/route-location",
        node,
        None,
        "route file is outside router/".to_string(),
    )]
}
