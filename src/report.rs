//! Report aggregation and rendering.
//!
//! Dedupes violations by identity (rule, path, line, column, message),
//! sorts by (path, line, column, rule), computes summary counts, and decides
//! pass/fail: the run fails iff at least one violation has final severity
//! error. Rendering is a pure projection over the aggregated set, so
//! rendering twice is byte-identical.

use crate::model::{Report, Severity, Summary, Violation};
use crate::resolver::Resolved;
use owo_colors::OwoColorize;
use serde_json::Value as JsonVal;
use std::path::Path;

pub fn aggregate(resolved: Resolved) -> Report {
    let mut violations = resolved.violations;
    violations.sort_by(|a, b| {
        a.path
            .cmp(&b.path)
            .then(a.line.unwrap_or(0).cmp(&b.line.unwrap_or(0)))
            .then(a.column.unwrap_or(0).cmp(&b.column.unwrap_or(0)))
            .then(a.rule_id.cmp(&b.rule_id))
            .then(a.message.cmp(&b.message))
    });
    // Message is part of the identity so that synthetic findings sharing a
    // rule id and location (two crashed rules, say) stay distinct.
    violations.dedup_by(|a, b| {
        a.rule_id == b.rule_id
            && a.path == b.path
            && a.line == b.line
            && a.column == b.column
            && a.message == b.message
    });

    let mut summary = Summary {
        suppressed: resolved.suppressed,
        ..Summary::default()
    };
    for v in &violations {
        match v.severity {
            Severity::Error => summary.errors += 1,
            Severity::Warning => summary.warnings += 1,
            Severity::Info => summary.info += 1,
        }
    }
    let pass = summary.errors == 0;
    Report {
        violations,
        summary,
        pass,
    }
}

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

/// Compose the machine report (pure, for testing/snapshot purposes).
pub fn compose_json(report: &Report) -> JsonVal {
    serde_json::to_value(report).expect("report serializes")
}

/// One human line per violation:
/// `<path>:<line>:<col> [<severity>] <rule-id> — <message>`.
pub fn render_human_line(v: &Violation, display_path: &str, color: bool) -> String {
    let line = v.line.map(|l| l.to_string()).unwrap_or_else(|| "-".into());
    let col = v.column.map(|c| c.to_string()).unwrap_or_else(|| "-".into());
    let location = format!("{}:{}:{}", display_path, line, col);
    let sev = format!("[{}]", v.severity);
    if color {
        let sev = match v.severity {
            Severity::Error => sev.red().bold().to_string(),
            Severity::Warning => sev.yellow().bold().to_string(),
            Severity::Info => sev.blue().bold().to_string(),
        };
        format!(
            "{} {} {} — {}",
            location.bold(),
            sev,
            v.rule_id,
            v.message
        )
    } else {
        format!("{} {} {} — {}", location, sev, v.rule_id, v.message)
    }
}

pub fn render_summary_line(summary: &Summary) -> String {
    let mut line = format!(
        "{} errors, {} warnings, {} info",
        summary.errors, summary.warnings, summary.info
    );
    if summary.suppressed > 0 {
        line.push_str(&format!(" ({} suppressed)", summary.suppressed));
    }
    line
}

/// Print the report in the requested format. Human paths are shown
/// relative to the invocation directory when possible.
pub fn print_report(report: &Report, output: &str, root: &Path) {
    if output == "json" {
        println!(
            "{}",
            serde_json::to_string_pretty(&compose_json(report)).expect("report serializes")
        );
        return;
    }
    let color = use_colors(output);
    let cwd = std::env::current_dir().unwrap_or_else(|_| root.to_path_buf());
    for v in &report.violations {
        let abs = root.join(&v.path);
        let display = pathdiff::diff_paths(&abs, &cwd)
            .unwrap_or(abs)
            .to_string_lossy()
            .to_string();
        let display = if display.is_empty() {
            ".".to_string()
        } else {
            display
        };
        println!("{}", render_human_line(v, &display, color));
    }
    let summary = render_summary_line(&report.summary);
    if color {
        println!("{}", summary.bold());
    } else {
        println!("{}", summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(rule: &str, path: &str, line: Option<u32>, severity: Severity) -> Violation {
        Violation {
            path: path.to_string(),
            line,
            column: line.map(|_| 1),
            rule_id: rule.to_string(),
            severity,
            message: "msg".to_string(),
        }
    }

    #[test]
    fn test_aggregate_sorts_dedupes_and_counts() {
        let resolved = Resolved {
            violations: vec![
                violation("b/rule", "src/z.vue", Some(4), Severity::Warning),
                violation("a/rule", "src/a.vue", Some(9), Severity::Error),
                violation("a/rule", "src/a.vue", Some(9), Severity::Error),
                violation("a/rule", "src/a.vue", Some(2), Severity::Info),
            ],
            suppressed: 2,
        };
        let report = aggregate(resolved);
        assert_eq!(report.violations.len(), 3);
        assert_eq!(report.violations[0].line, Some(2));
        assert_eq!(report.violations[1].line, Some(9));
        assert_eq!(report.violations[2].path, "src/z.vue");
        assert_eq!(
            report.summary,
            Summary {
                errors: 1,
                warnings: 1,
                info: 1,
                suppressed: 2
            }
        );
        assert!(!report.pass);
    }

    #[test]
    fn test_same_location_distinct_messages_both_kept() {
        let mk = |msg: &str| Violation {
            path: String::new(),
            line: None,
            column: None,
            rule_id: "rule-crashed".to_string(),
            severity: Severity::Error,
            message: msg.to_string(),
        };
        let report = aggregate(Resolved {
            violations: vec![
                mk("rule 't/a' crashed during evaluation"),
                mk("rule 't/b' crashed during evaluation"),
                mk("rule 't/b' crashed during evaluation"),
            ],
            suppressed: 0,
        });
        assert_eq!(report.violations.len(), 2);
        assert_eq!(report.summary.errors, 2);
    }

    #[test]
    fn test_empty_report_passes() {
        let report = aggregate(Resolved {
            violations: Vec::new(),
            suppressed: 0,
        });
        assert!(report.pass);
        assert_eq!(render_summary_line(&report.summary), "0 errors, 0 warnings, 0 info");
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let mk = || Resolved {
            violations: vec![
                violation("a/rule", "x.vue", Some(1), Severity::Warning),
                violation("b/rule", "x.vue", None, Severity::Error),
            ],
            suppressed: 1,
        };
        let one = compose_json(&aggregate(mk()));
        let two = compose_json(&aggregate(mk()));
        assert_eq!(
            serde_json::to_string(&one).unwrap(),
            serde_json::to_string(&two).unwrap()
        );
    }

    #[test]
    fn test_json_shape() {
        let report = aggregate(Resolved {
            violations: vec![violation("a/rule", "x.vue", Some(3), Severity::Error)],
            suppressed: 4,
        });
        let out = compose_json(&report);
        assert_eq!(out["violations"][0]["ruleId"], "a/rule");
        assert_eq!(out["violations"][0]["severity"], "error");
        assert_eq!(out["summary"]["suppressed"], 4);
        assert_eq!(out["pass"], false);
    }

    #[test]
    fn test_human_line_format() {
        let v = violation("naming/component-pascal-case", "src/a.vue", Some(3), Severity::Error);
        assert_eq!(
            render_human_line(&v, "src/a.vue", false),
            "src/a.vue:3:1 [error] naming/component-pascal-case — msg"
        );
        let no_loc = violation("store/unique-id", "src/s.ts", None, Severity::Error);
        assert_eq!(
            render_human_line(&no_loc, "src/s.ts", false),
            "src/s.ts:-:- [error] store/unique-id — msg"
        );
    }
}
