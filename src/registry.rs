//! Rule registry: the single source of truth for valid rule ids.
//!
//! Ids are unique at registration time; a duplicate is a fatal
//! `RuleConflictError` since the rule set itself is inconsistent. The
//! configuration loader consults the registry to validate overrides, and
//! the resolver consults it for default severities.

use crate::model::Severity;
use crate::rules::{self, Domain, Rule};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

/// Reserved synthetic rule ids. These are not registered: they have fixed
/// severities, cannot be disabled, and a configuration override naming one
/// is rejected as an unknown id. Inline suppressions still apply.
pub const RULE_UNPARSABLE: &str = "unparsable-file";
pub const RULE_LINK_CYCLE: &str = "link-cycle";
pub const RULE_CRASHED: &str = "rule-crashed";
pub const RULE_INVALID_CONFIG: &str = "invalid-config";

pub fn synthetic_severity(id: &str) -> Option<Severity> {
    match id {
        RULE_UNPARSABLE | RULE_LINK_CYCLE | RULE_CRASHED => Some(Severity::Error),
        RULE_INVALID_CONFIG => Some(Severity::Warning),
        _ => None,
    }
}

#[derive(Debug)]
/// Duplicate rule id at registration time.
pub struct RuleConflictError {
    pub id: String,
}

impl fmt::Display for RuleConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "duplicate rule id '{}' registered", self.id)
    }
}

impl Error for RuleConflictError {}

pub struct Registry {
    rules: Vec<Rule>,
    by_id: BTreeMap<&'static str, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            by_id: BTreeMap::new(),
        }
    }

    /// Registry preloaded with the built-in rule catalog.
    pub fn builtin() -> Result<Self, RuleConflictError> {
        let mut registry = Self::new();
        for rule in rules::builtin() {
            registry.register(rule)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, rule: Rule) -> Result<(), RuleConflictError> {
        if self.by_id.contains_key(rule.id) {
            return Err(RuleConflictError {
                id: rule.id.to_string(),
            });
        }
        self.by_id.insert(rule.id, self.rules.len());
        self.rules.push(rule);
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.by_id.get(id).map(|i| &self.rules[*i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn ids_in_domain(&self, domain: Domain) -> Vec<&'static str> {
        self.rules
            .iter()
            .filter(|r| r.domain == domain)
            .map(|r| r.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
