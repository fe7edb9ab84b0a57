//! Rule evaluation over the project model.
//!
//! Node-local matchers fan out with rayon across nodes; each node's
//! finding vector is merged at collect, so no shared mutable structure is
//! contended. Project-wide matchers run after that join (the barrier),
//! since they read the complete set of parsed units. A matcher that
//! panics is isolated: it yields exactly one synthetic `rule-crashed`
//! finding for that rule, however many nodes it panicked on, and
//! evaluation continues with the remaining rules.

use crate::model::{CancelToken, ProjectModel, RawFinding};
use crate::registry::RULE_CRASHED;
use crate::rules::{Matcher, Rule};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct EvalOutcome {
    pub findings: Vec<RawFinding>,
    /// Matcher invocations this run; lets tests observe that disabling a
    /// rule also skips its execution.
    pub executed: usize,
}

pub fn evaluate(model: &ProjectModel, active: &[&Rule], cancel: &CancelToken) -> EvalOutcome {
    let executed = AtomicUsize::new(0);

    let node_local: Vec<&Rule> = active
        .iter()
        .copied()
        .filter(|r| matches!(r.matcher, Matcher::NodeLocal(_)))
        .collect();
    let project_wide: Vec<&Rule> = active
        .iter()
        .copied()
        .filter(|r| matches!(r.matcher, Matcher::ProjectWide(_)))
        .collect();

    let mut findings: Vec<RawFinding> = model
        .nodes
        .par_iter()
        .filter(|_| !cancel.is_cancelled())
        .flat_map_iter(|node| {
            let mut per_node: Vec<RawFinding> = Vec::new();
            for rule in &node_local {
                let Matcher::NodeLocal(matcher) = rule.matcher else {
                    continue;
                };
                executed.fetch_add(1, Ordering::Relaxed);
                match catch_unwind(AssertUnwindSafe(|| matcher(node))) {
                    Ok(mut found) => per_node.append(&mut found),
                    Err(_) => per_node.push(crashed(rule.id, node.path.clone())),
                }
            }
            per_node
        })
        .collect();

    // A rule that panics on many nodes still reports exactly once.
    let mut seen_crashes: BTreeSet<String> = BTreeSet::new();
    findings.retain(|f| f.rule != RULE_CRASHED || seen_crashes.insert(f.message.clone()));

    // Barrier: project-wide rules see the full model only after every
    // node-local matcher has finished.
    for rule in &project_wide {
        if cancel.is_cancelled() {
            break;
        }
        let Matcher::ProjectWide(matcher) = rule.matcher else {
            continue;
        };
        executed.fetch_add(1, Ordering::Relaxed);
        match catch_unwind(AssertUnwindSafe(|| matcher(model))) {
            Ok(mut found) => findings.append(&mut found),
            Err(_) => findings.push(crashed(rule.id, PathBuf::new())),
        }
    }

    EvalOutcome {
        findings,
        executed: executed.load(Ordering::Relaxed),
    }
}

fn crashed(rule_id: &str, path: PathBuf) -> RawFinding {
    RawFinding {
        rule: RULE_CRASHED.to_string(),
        path,
        line: None,
        column: None,
        message: format!("rule '{}' crashed during evaluation", rule_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileKind, ProjectNode, Severity};
    use crate::rules::Domain;

    fn model_with_files(n: usize) -> ProjectModel {
        let mut nodes = vec![ProjectNode {
            path: PathBuf::new(),
            kind: FileKind::Directory,
            parent: None,
            children: Vec::new(),
            unit: None,
            text: None,
        }];
        for i in 0..n {
            nodes.push(ProjectNode {
                path: PathBuf::from(format!("f{}.ts", i)),
                kind: FileKind::Script,
                parent: Some(0),
                children: Vec::new(),
                unit: None,
                text: None,
            });
        }
        ProjectModel {
            root: PathBuf::from("."),
            nodes,
        }
    }

    fn rule(id: &'static str, matcher: Matcher) -> Rule {
        Rule {
            id,
            domain: Domain::Naming,
            default_severity: Severity::Error,
            describe: "",
            matcher,
        }
    }

    #[test]
    fn test_execution_counter_counts_matcher_calls() {
        let model = model_with_files(3);
        let local = rule("t/local", Matcher::NodeLocal(|_| Vec::new()));
        let wide = rule("t/wide", Matcher::ProjectWide(|_| Vec::new()));
        let out = evaluate(&model, &[&local, &wide], &CancelToken::new());
        // 4 nodes (root + 3 files) x 1 node-local rule, + 1 project-wide
        assert_eq!(out.executed, 5);
        assert!(out.findings.is_empty());
    }

    #[test]
    fn test_panicking_rule_is_isolated() {
        let model = model_with_files(1);
        let bad = rule("t/panics", Matcher::ProjectWide(|_| panic!("boom")));
        let good = rule(
            "t/fine",
            Matcher::ProjectWide(|m| {
                vec![RawFinding {
                    rule: "t/fine".to_string(),
                    path: m.nodes[1].path.clone(),
                    line: None,
                    column: None,
                    message: "ok".to_string(),
                }]
            }),
        );
        let out = evaluate(&model, &[&bad, &good], &CancelToken::new());
        let crashed: Vec<_> = out
            .findings
            .iter()
            .filter(|f| f.rule == RULE_CRASHED)
            .collect();
        assert_eq!(crashed.len(), 1);
        assert!(crashed[0].message.contains("t/panics"));
        assert!(out.findings.iter().any(|f| f.rule == "t/fine"));
    }

    #[test]
    fn test_node_local_crash_reported_once_per_rule() {
        let model = model_with_files(3);
        let boom = rule("t/boom", Matcher::NodeLocal(|_| panic!("x")));
        let also = rule("t/also", Matcher::NodeLocal(|_| panic!("y")));
        let out = evaluate(&model, &[&boom, &also], &CancelToken::new());
        let crashed: Vec<_> = out
            .findings
            .iter()
            .filter(|f| f.rule == RULE_CRASHED)
            .collect();
        // one finding per crashed rule, not one per node
        assert_eq!(crashed.len(), 2);
        assert!(crashed.iter().any(|f| f.message.contains("t/boom")));
        assert!(crashed.iter().any(|f| f.message.contains("t/also")));
    }

    #[test]
    fn test_cancelled_evaluation_stops_project_wide_rules() {
        let model = model_with_files(2);
        let wide = rule("t/wide", Matcher::ProjectWide(|_| panic!("must not run")));
        let cancel = CancelToken::new();
        cancel.cancel();
        let out = evaluate(&model, &[&wide], &cancel);
        assert_eq!(out.executed, 0);
        assert!(out.findings.is_empty());
    }
}
