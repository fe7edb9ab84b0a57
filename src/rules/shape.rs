//! Component-, store-, and router-shape rules over parsed units.

use super::{finding, Domain, Matcher, Rule};
use crate::model::{Block, ParsedUnit, ProjectNode, RawFinding, Severity};

const MAX_ROUTE_DEPTH: usize = 3;

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "component/block-order",
            domain: Domain::ComponentShape,
            default_severity: Severity::Warning,
            describe: "component blocks appear as script, template, style",
            matcher: Matcher::NodeLocal(block_order),
        },
        Rule {
            id: "component/require-template",
            domain: Domain::ComponentShape,
            default_severity: Severity::Error,
            describe: "components declare a template block",
            matcher: Matcher::NodeLocal(require_template),
        },
        Rule {
            id: "component/prop-type-required",
            domain: Domain::ComponentShape,
            default_severity: Severity::Warning,
            describe: "every declared prop has a declared type",
            matcher: Matcher::NodeLocal(prop_type_required),
        },
        Rule {
            id: "component/name-matches-file",
            domain: Domain::ComponentShape,
            default_severity: Severity::Warning,
            describe: "a declared component name matches the file name",
            matcher: Matcher::NodeLocal(name_matches_file),
        },
        Rule {
            id: "store/three-part-shape",
            domain: Domain::StoreShape,
            default_severity: Severity::Warning,
            describe: "stores declare state, getters, and actions",
            matcher: Matcher::NodeLocal(store_three_part_shape),
        },
        Rule {
            id: "router/max-depth",
            domain: Domain::RouterShape,
            default_severity: Severity::Warning,
            describe: "route nesting stays within three levels",
            matcher: Matcher::NodeLocal(route_max_depth),
        },
        Rule {
            id: "router/path-kebab-case",
            domain: Domain::RouterShape,
            default_severity: Severity::Warning,
            describe: "static route path segments are kebab-case",
            matcher: Matcher::NodeLocal(route_path_kebab_case),
        },
    ]
}

fn component_facts(node: &ProjectNode) -> Option<&crate::model::ComponentFacts> {
    match &node.unit {
        Some(ParsedUnit::Component(f)) => Some(f),
        _ => None,
    }
}

fn block_order(node: &ProjectNode) -> Vec<RawFinding> {
    let Some(facts) = component_facts(node) else {
        return Vec::new();
    };
    let rank = |b: Block| match b {
        Block::Script => 0,
        Block::Template => 1,
        Block::Style => 2,
    };
    let mut last = 0;
    for (block, line) in &facts.blocks {
        let r = rank(*block);
        if r < last {
            return vec![finding(
                "component/block-order",
                node,
                Some(*line),
                format!(
                    "<{}> block is out of order; expected script, template, style",
                    block.as_str()
                ),
            )];
        }
        last = r;
    }
    Vec::new()
}

fn require_template(node: &ProjectNode) -> Vec<RawFinding> {
    let Some(facts) = component_facts(node) else {
        return Vec::new();
    };
    if facts.blocks.iter().any(|(b, _)| *b == Block::Template) {
        return Vec::new();
    }
    vec![finding(
        "component/require-template",
        node,
        None,
        "component has no <template> block".to_string(),
    )]
}

fn prop_type_required(node: &ProjectNode) -> Vec<RawFinding> {
    let Some(facts) = component_facts(node) else {
        return Vec::new();
    };
    facts
        .props
        .iter()
        .filter(|p| p.ty.is_none())
        .map(|p| {
            finding(
                "component/prop-type-required",
                node,
                Some(p.line),
                format!("prop '{}' has no declared type", p.name),
            )
        })
        .collect()
}

fn name_matches_file(node: &ProjectNode) -> Vec<RawFinding> {
    let Some(facts) = component_facts(node) else {
        return Vec::new();
    };
    let (Some(name), Some(stem)) = (
        facts.name.as_deref(),
        node.path.file_stem().map(|s| s.to_string_lossy().to_string()),
    ) else {
        return Vec::new();
    };
    if name == stem {
        return Vec::new();
    }
    vec![finding(
        "component/name-matches-file",
        node,
        None,
        format!(
            "declared component name '{}' does not match file name '{}'",
            name, stem
        ),
    )]
}

fn store_three_part_shape(node: &ProjectNode) -> Vec<RawFinding> {
    let Some(ParsedUnit::Store(facts)) = &node.unit else {
        return Vec::new();
    };
    if !facts.declares_store {
        return Vec::new();
    }
    let mut missing = Vec::new();
    if !facts.has_state {
        missing.push("state");
    }
    if !facts.has_getters {
        missing.push("getters");
    }
    if !facts.has_actions {
        missing.push("actions");
    }
    if missing.is_empty() {
        return Vec::new();
    }
    vec![finding(
        "store/three-part-shape",
        node,
        facts.id_line,
        format!("store is missing {}", missing.join(", ")),
    )]
}

fn route_max_depth(node: &ProjectNode) -> Vec<RawFinding> {
    let Some(ParsedUnit::Route(facts)) = &node.unit else {
        return Vec::new();
    };
    facts
        .routes
        .iter()
        .filter(|r| r.depth > MAX_ROUTE_DEPTH)
        .map(|r| {
            finding(
                "router/max-depth",
                node,
                Some(r.line),
                format!(
                    "route '{}' is nested {} levels deep (max {})",
                    r.path, r.depth, MAX_ROUTE_DEPTH
                ),
            )
        })
        .collect()
}

fn route_path_kebab_case(node: &ProjectNode) -> Vec<RawFinding> {
    let Some(ParsedUnit::Route(facts)) = &node.unit else {
        return Vec::new();
    };
    let mut found = Vec::new();
    for route in &facts.routes {
        for segment in route.path.split('/') {
            if segment.is_empty() || segment.starts_with(':') || segment.contains('*') {
                continue;
            }
            if !super::naming::is_kebab_case(segment) {
                found.push(finding(
                    "router/path-kebab-case",
                    node,
                    Some(route.line),
                    format!(
                        "route path segment '{}' in '{}' is not kebab-case",
                        segment, route.path
                    ),
                ));
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentFacts, FileKind, PropFact, RouteFact, RouteFacts, StoreFacts};
    use std::path::PathBuf;

    fn component_node(facts: ComponentFacts) -> ProjectNode {
        ProjectNode {
            path: PathBuf::from("src/components/Card.vue"),
            kind: FileKind::Component,
            parent: Some(0),
            children: Vec::new(),
            unit: Some(ParsedUnit::Component(facts)),
            text: None,
        }
    }

    #[test]
    fn test_block_order_flags_first_offender() {
        let node = component_node(ComponentFacts {
            blocks: vec![(Block::Template, 1), (Block::Script, 8), (Block::Style, 20)],
            ..ComponentFacts::default()
        });
        let found = block_order(&node);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, Some(8));
    }

    #[test]
    fn test_untyped_prop_flagged_per_prop() {
        let node = component_node(ComponentFacts {
            blocks: vec![(Block::Script, 1), (Block::Template, 5)],
            props: vec![
                PropFact { name: "label".into(), ty: Some("String".into()), line: 2 },
                PropFact { name: "meta".into(), ty: None, line: 3 },
            ],
            ..ComponentFacts::default()
        });
        let found = prop_type_required(&node);
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("meta"));
    }

    #[test]
    fn test_name_mismatch() {
        let node = component_node(ComponentFacts {
            name: Some("FancyCard".into()),
            blocks: vec![(Block::Template, 1)],
            ..ComponentFacts::default()
        });
        assert_eq!(name_matches_file(&node).len(), 1);
    }

    #[test]
    fn test_store_missing_parts_listed() {
        let node = ProjectNode {
            path: PathBuf::from("src/stores/user.ts"),
            kind: FileKind::Store,
            parent: Some(0),
            children: Vec::new(),
            unit: Some(ParsedUnit::Store(StoreFacts {
                declares_store: true,
                id: Some("user".into()),
                has_state: true,
                ..StoreFacts::default()
            })),
            text: None,
        };
        let found = store_three_part_shape(&node);
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("getters, actions"));
    }

    #[test]
    fn test_route_rules() {
        let node = ProjectNode {
            path: PathBuf::from("src/router/index.ts"),
            kind: FileKind::Route,
            parent: Some(0),
            children: Vec::new(),
            unit: Some(ParsedUnit::Route(RouteFacts {
                routes: vec![
                    RouteFact { path: "/UserAdmin".into(), depth: 1, has_guard: false, line: 3 },
                    RouteFact { path: ":id".into(), depth: 4, has_guard: false, line: 9 },
                ],
            })),
            text: None,
        };
        let depth = route_max_depth(&node);
        assert_eq!(depth.len(), 1);
        assert_eq!(depth[0].line, Some(9));
        let kebab = route_path_kebab_case(&node);
        assert_eq!(kebab.len(), 1);
        assert!(kebab[0].message.contains("UserAdmin"));
    }
}
