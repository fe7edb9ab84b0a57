//! Severity and suppression resolution.
//!
//! Maps each raw finding to its effective severity from configuration,
//! diverting inline-suppressed findings to a suppressed counter (retained
//! for audit, excluded from the actionable list). Deterministic and
//! side-effect-free: disabled rules never reach this point because the
//! evaluator only runs active rules.

use crate::config::EffectiveConfig;
use crate::model::{RawFinding, Violation};
use crate::registry;
use crate::scanner::SuppressionIndex;

pub struct Resolved {
    pub violations: Vec<Violation>,
    pub suppressed: usize,
}

pub fn resolve(
    findings: Vec<RawFinding>,
    config: &EffectiveConfig,
    suppressions: &SuppressionIndex,
) -> Resolved {
    let mut violations = Vec::new();
    let mut suppressed = 0usize;
    for finding in findings {
        // Registry rules take their configured severity; reserved synthetic
        // ids carry fixed severities.
        let severity = match config
            .severity_of(&finding.rule)
            .or_else(|| registry::synthetic_severity(&finding.rule))
        {
            Some(s) => s,
            None => continue,
        };
        if suppressions.covers(&finding.path, &finding.rule, finding.line) {
            suppressed += 1;
            continue;
        }
        violations.push(Violation {
            path: finding.path.to_string_lossy().replace('\\', "/"),
            line: finding.line,
            column: finding.column,
            rule_id: finding.rule,
            severity,
            message: finding.message,
        });
    }
    Resolved {
        violations,
        suppressed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CancelToken, Severity};
    use crate::registry::{Registry, RULE_UNPARSABLE};
    use crate::scanner;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn raw(rule: &str, path: &str, line: Option<u32>) -> RawFinding {
        RawFinding {
            rule: rule.to_string(),
            path: PathBuf::from(path),
            line,
            column: None,
            message: "m".to_string(),
        }
    }

    fn default_config() -> EffectiveConfig {
        let dir = tempdir().unwrap();
        crate::config::load(dir.path(), None, &[], &[], &Registry::builtin().unwrap()).unwrap()
    }

    #[test]
    fn test_synthetic_ids_resolve_to_fixed_severity() {
        let resolved = resolve(
            vec![raw(RULE_UNPARSABLE, "a.vue", None)],
            &default_config(),
            &SuppressionIndex::default(),
        );
        assert_eq!(resolved.violations.len(), 1);
        assert_eq!(resolved.violations[0].severity, Severity::Error);
    }

    #[test]
    fn test_suppressed_finding_counts_but_does_not_report() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.ts"),
            "// convlint-disable-file naming/store-camel-case\nexport const x = 1\n",
        )
        .unwrap();
        let out = scanner::scan(dir.path(), &[], &CancelToken::new()).unwrap();

        let resolved = resolve(
            vec![
                raw("naming/store-camel-case", "a.ts", Some(2)),
                raw("naming/store-camel-case", "b.ts", Some(2)),
            ],
            &default_config(),
            &out.suppressions,
        );
        assert_eq!(resolved.suppressed, 1);
        assert_eq!(resolved.violations.len(), 1);
        assert_eq!(resolved.violations[0].path, "b.ts");
    }

    #[test]
    fn test_suppression_scoped_to_its_own_path() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("b.ts"),
            "// convlint-disable-file store/unique-id\n",
        )
        .unwrap();
        let out = scanner::scan(dir.path(), &[], &CancelToken::new()).unwrap();
        // finding attached to a.ts is not silenced by b.ts's marker
        let resolved = resolve(
            vec![raw("store/unique-id", "a.ts", None)],
            &default_config(),
            &out.suppressions,
        );
        assert_eq!(resolved.suppressed, 0);
        assert_eq!(resolved.violations.len(), 1);
    }
}
