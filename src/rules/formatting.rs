//! Formatting-domain rules over the text facts recorded during scanning.

use super::{finding, Domain, Matcher, Rule};
use crate::model::{ProjectNode, RawFinding, Severity};

pub fn rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "format/no-tab-indent",
            domain: Domain::Formatting,
            default_severity: Severity::Info,
            describe: "lines are not indented with tabs",
            matcher: Matcher::NodeLocal(no_tab_indent),
        },
        Rule {
            id: "format/final-newline",
            domain: Domain::Formatting,
            default_severity: Severity::Info,
            describe: "text files end with a newline",
            matcher: Matcher::NodeLocal(final_newline),
        },
    ]
}

fn no_tab_indent(node: &ProjectNode) -> Vec<RawFinding> {
    let Some(text) = &node.text else {
        return Vec::new();
    };
    text.tab_indented_lines
        .iter()
        .map(|line| {
            let mut f = finding(
                "format/no-tab-indent",
                node,
                Some(*line),
                "line is indented with a tab".to_string(),
            );
            f.column = Some(1);
            f
        })
        .collect()
}

fn final_newline(node: &ProjectNode) -> Vec<RawFinding> {
    let Some(text) = &node.text else {
        return Vec::new();
    };
    if text.final_newline {
        return Vec::new();
    }
    vec![finding(
        "format/final-newline",
        node,
        None,
        "file does not end with a newline".to_string(),
    )]
}
