//! Check runner: one full compliance run over a project root.
//!
//! Wires the stages together in their fixed order: scan (with parallel
//! parsing), node-local evaluation, project-wide evaluation, severity and
//! suppression resolution, aggregation. Configuration errors collected
//! during loading surface here as synthetic `invalid-config` findings so
//! the report shows every recoverable problem of the run.

use crate::config::EffectiveConfig;
use crate::model::{CancelToken, RawFinding, Report};
use crate::registry::{Registry, RULE_INVALID_CONFIG};
use crate::scanner::{self, ScanError};
use crate::{evaluator, report, resolver};
use std::path::{Path, PathBuf};

pub struct CheckRun {
    pub report: Report,
    /// Matcher invocations during evaluation (see `EvalOutcome::executed`).
    pub executed: usize,
}

pub fn run_check(
    root: &Path,
    cfg: &EffectiveConfig,
    registry: &Registry,
    cancel: &CancelToken,
) -> Result<CheckRun, ScanError> {
    let outcome = scanner::scan(root, &cfg.ignore, cancel)?;
    let active = cfg.active(registry);
    let eval = evaluator::evaluate(&outcome.model, &active, cancel);

    let mut findings = outcome.findings;
    findings.extend(eval.findings);
    for err in &cfg.errors {
        findings.push(RawFinding {
            rule: RULE_INVALID_CONFIG.to_string(),
            path: PathBuf::from(&err.source),
            line: None,
            column: None,
            message: err.message.clone(),
        });
    }

    let resolved = resolver::resolve(findings, cfg, &outcome.suppressions);
    Ok(CheckRun {
        report: report::aggregate(resolved),
        executed: eval.executed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::model::Severity;
    use std::fs;
    use tempfile::tempdir;

    fn check(root: &Path, cli_rules: &[String]) -> CheckRun {
        let registry = Registry::builtin().unwrap();
        let cfg = config::load(root, None, cli_rules, &[], &registry).unwrap();
        run_check(root, &cfg, &registry, &CancelToken::new()).unwrap()
    }

    fn violations_of<'a>(run: &'a CheckRun, rule: &str) -> Vec<&'a crate::model::Violation> {
        run.report
            .violations
            .iter()
            .filter(|v| v.rule_id == rule)
            .collect()
    }

    #[test]
    fn test_empty_root_passes_with_zero_violations() {
        let dir = tempdir().unwrap();
        let run = check(dir.path(), &[]);
        assert!(run.report.pass);
        assert!(run.report.violations.is_empty());
    }

    #[test]
    fn test_snake_case_component_then_rename_fixes_it() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/components")).unwrap();
        fs::write(
            root.join("src/components/user_profile.vue"),
            "<template>\n  <div />\n</template>\n",
        )
        .unwrap();
        fs::write(root.join(".prettierrc"), "{ \"tabWidth\": 2 }\n").unwrap();

        let run = check(root, &[]);
        let naming = violations_of(&run, "naming/component-pascal-case");
        assert_eq!(naming.len(), 1);
        assert_eq!(naming[0].severity, Severity::Error);
        assert!(!run.report.pass);

        fs::rename(
            root.join("src/components/user_profile.vue"),
            root.join("src/components/UserProfile.vue"),
        )
        .unwrap();
        let run = check(root, &[]);
        assert!(violations_of(&run, "naming/component-pascal-case").is_empty());
        assert!(run.report.pass);
    }

    #[test]
    fn test_duplicate_store_id_names_both_paths() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/stores")).unwrap();
        let store = |id: &str| {
            format!(
                "export const use{}Store = defineStore('{}', {{\n  state: () => ({{ x: 1 }}),\n  getters: {{\n    y: (s) => s.x,\n  }},\n  actions: {{\n    bump() {{}},\n  }},\n}})\n",
                id, "user"
            )
        };
        fs::write(root.join("src/stores/account.ts"), store("Account")).unwrap();
        fs::write(root.join("src/stores/profile.ts"), store("Profile")).unwrap();

        let run = check(root, &[]);
        let dups = violations_of(&run, "store/unique-id");
        assert_eq!(dups.len(), 1);
        assert!(dups[0].message.contains("src/stores/account.ts"));
        assert!(dups[0].message.contains("src/stores/profile.ts"));
    }

    #[test]
    fn test_unparsable_file_contributes_only_synthetic_finding() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/components")).unwrap();
        // Truncated component: opened template, never closed.
        fs::write(root.join("src/components/Broken.vue"), "<template>\n<div>\n").unwrap();

        let run = check(root, &[]);
        assert_eq!(violations_of(&run, "unparsable-file").len(), 1);
        // No unit-based findings for the same path.
        assert!(violations_of(&run, "component/require-template").is_empty());
    }

    #[test]
    fn test_override_lowers_severity_and_flips_pass() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/components")).unwrap();
        fs::write(
            root.join("src/components/user_profile.vue"),
            "<template><div /></template>\n",
        )
        .unwrap();
        fs::write(root.join(".prettierrc"), "{}\n").unwrap();
        fs::write(
            root.join("convlint.toml"),
            "[rules]\n\"naming/component-pascal-case\" = \"warning\"\n",
        )
        .unwrap();

        let run = check(root, &[]);
        let naming = violations_of(&run, "naming/component-pascal-case");
        assert_eq!(naming.len(), 1);
        assert_eq!(naming[0].severity, Severity::Warning);
        assert!(run.report.pass);
    }

    #[test]
    fn test_disabling_removes_exactly_that_rules_findings_and_skips_execution() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/components")).unwrap();
        fs::write(
            root.join("src/components/bad_name.vue"),
            "<template><div /></template>",
        )
        .unwrap();

        let with = check(root, &[]);
        let without = check(root, &["naming/component-pascal-case=off".to_string()]);

        assert_eq!(violations_of(&with, "naming/component-pascal-case").len(), 1);
        assert!(violations_of(&without, "naming/component-pascal-case").is_empty());
        // only that rule's findings disappeared
        assert_eq!(
            violations_of(&with, "format/final-newline").len(),
            violations_of(&without, "format/final-newline").len()
        );
        // disabling also skips matcher execution
        assert!(without.executed < with.executed);
    }

    #[test]
    fn test_suppression_counts_but_still_executes() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/components")).unwrap();
        fs::write(
            root.join("src/components/bad_name.vue"),
            "<template><div /></template>\n<!-- convlint-disable-file naming/component-pascal-case -->\n",
        )
        .unwrap();
        fs::write(root.join(".prettierrc"), "{}\n").unwrap();

        let run = check(root, &[]);
        assert!(violations_of(&run, "naming/component-pascal-case").is_empty());
        assert_eq!(run.report.summary.suppressed, 1);

        let disabled = check(root, &["naming/component-pascal-case=off".to_string()]);
        assert_eq!(disabled.report.summary.suppressed, 0);
        assert!(disabled.executed < run.executed);
    }

    #[test]
    fn test_config_errors_surface_as_invalid_config_warnings() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("convlint.toml"),
            "[rules]\n\"no/such-rule\" = \"error\"\n",
        )
        .unwrap();

        let run = check(root, &[]);
        let invalid = violations_of(&run, "invalid-config");
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].severity, Severity::Warning);
        assert!(run.report.pass);
    }
}
