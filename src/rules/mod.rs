//! Built-in rule catalog.
//!
//! A `Rule` couples a stable id, a domain tag, a default severity, and a
//! matcher. Matchers come in two shapes: node-local (one node at a time,
//! safe to run in parallel per node) and project-wide (the full model,
//! run after the node-local barrier). Domains are selection/reporting
//! metadata, not execution paths.

pub mod formatting;
pub mod naming;
pub mod project;
pub mod shape;
pub mod structure;

use crate::model::{ProjectModel, ProjectNode, RawFinding, Severity};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    Structure,
    Naming,
    ComponentShape,
    StoreShape,
    RouterShape,
    Formatting,
}

impl Domain {
    pub fn parse(s: &str) -> Option<Domain> {
        match s {
            "structure" => Some(Domain::Structure),
            "naming" => Some(Domain::Naming),
            "component-shape" => Some(Domain::ComponentShape),
            "store-shape" => Some(Domain::StoreShape),
            "router-shape" => Some(Domain::RouterShape),
            "formatting" => Some(Domain::Formatting),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Structure => "structure",
            Domain::Naming => "naming",
            Domain::ComponentShape => "component-shape",
            Domain::StoreShape => "store-shape",
            Domain::RouterShape => "router-shape",
            Domain::Formatting => "formatting",
        }
    }
}

/// Matcher dispatch, keyed on the two rule variants.
pub enum Matcher {
    NodeLocal(fn(&ProjectNode) -> Vec<RawFinding>),
    ProjectWide(fn(&ProjectModel) -> Vec<RawFinding>),
}

impl Matcher {
    pub fn kind_str(&self) -> &'static str {
        match self {
            Matcher::NodeLocal(_) => "node-local",
            Matcher::ProjectWide(_) => "project-wide",
        }
    }
}

pub struct Rule {
    pub id: &'static str,
    pub domain: Domain,
    pub default_severity: Severity,
    /// One-line summary shown by `convlint rules`.
    pub describe: &'static str,
    pub matcher: Matcher,
}

/// The full built-in catalog in registration order.
pub fn builtin() -> Vec<Rule> {
    let mut rules = Vec::new();
    rules.extend(structure::rules());
    rules.extend(naming::rules());
    rules.extend(shape::rules());
    rules.extend(project::rules());
    rules.extend(formatting::rules());
    rules
}

pub(crate) fn finding(
    rule: &'static str,
    node: &ProjectNode,
    line: Option<u32>,
    message: String,
) -> RawFinding {
    RawFinding {
        rule: rule.to_string(),
        path: node.path.clone(),
        line,
        column: None,
        message,
    }
}
