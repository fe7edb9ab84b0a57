//! Per-kind structural parsers.
//!
//! Each parser is a pure function from file content to a `ParsedUnit`:
//! no filesystem or network access, so the scanner can fan them out with
//! rayon and each is unit-testable in isolation. A `ParseError` never
//! aborts the run; the scanner records it as a synthetic
//! `unparsable-file` finding and the file is excluded from unit-based
//! rule evaluation.
//!
//! Extraction is regex-over-content with small brace/bracket matching
//! helpers, deliberately short of a real JS/TS parser: the rules only
//! need declared identifiers and block structure, not semantics.

pub mod component;
pub mod route;
pub mod store;
pub mod toolconfig;

use crate::model::{FileKind, ParsedUnit, ScriptFacts, StyleFacts};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single file's content could not be normalized into structural facts.
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for ParseError {}

/// Dispatch to the parser matching the node's classified kind.
///
/// `Directory` and `Other` nodes never reach this function.
pub fn parse(kind: FileKind, content: &str, path: &Path) -> Result<ParsedUnit, ParseError> {
    match kind {
        FileKind::Component => component::parse(content).map(ParsedUnit::Component),
        FileKind::Store => store::parse(content).map(ParsedUnit::Store),
        FileKind::Route => route::parse(content).map(ParsedUnit::Route),
        FileKind::ToolConfig => toolconfig::parse(content, path).map(ParsedUnit::ToolConfig),
        FileKind::Script => Ok(ParsedUnit::Script(parse_script(content))),
        FileKind::Style => Ok(ParsedUnit::Style(parse_style(content))),
        FileKind::Directory | FileKind::Other => {
            Err(ParseError::new(format!("no parser for kind {:?}", kind)))
        }
    }
}

static NAMED_EXPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*export\s+(?:async\s+)?(?:function|const|let|var|class)\s+([A-Za-z_$][\w$]*)")
        .expect("named export regex")
});
static EXPORT_LIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*export\s*\{([^}]*)\}").expect("export list regex"));
static DEFAULT_EXPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*export\s+default\b").expect("default export regex"));

/// Extract export structure from a script/logic file.
pub fn parse_script(content: &str) -> ScriptFacts {
    let mut named: Vec<String> = NAMED_EXPORT_RE
        .captures_iter(content)
        .map(|c| c[1].to_string())
        .collect();
    for caps in EXPORT_LIST_RE.captures_iter(content) {
        for item in caps[1].split(',') {
            // `export { inner as outer }` re-exports under the outer name
            let name = item.split_whitespace().last().unwrap_or("").trim();
            if !name.is_empty() {
                named.push(name.to_string());
            }
        }
    }
    // first occurrence wins, even when declaration and export list repeat
    // the same name far apart
    let mut seen = BTreeSet::new();
    named.retain(|n| seen.insert(n.clone()));
    ScriptFacts {
        has_default_export: DEFAULT_EXPORT_RE.is_match(content),
        named_exports: named,
    }
}

static CLASS_SELECTOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*\.([A-Za-z][\w-]*)").expect("class selector regex"));

/// Extract top-of-line class selector names from a style file.
pub fn parse_style(content: &str) -> StyleFacts {
    let class_names = CLASS_SELECTOR_RE
        .captures_iter(content)
        .map(|c| {
            let name = c[1].to_string();
            let line = line_of(content, c.get(1).map(|m| m.start()).unwrap_or(0));
            (name, line)
        })
        .collect();
    StyleFacts { class_names }
}

/// 1-based line number of a byte offset.
pub(crate) fn line_of(content: &str, offset: usize) -> u32 {
    content[..offset.min(content.len())]
        .bytes()
        .filter(|b| *b == b'\n')
        .count() as u32
        + 1
}

/// Given the index of an opening `{`, return the content between it and
/// its balanced closing brace, or `None` when the braces never balance
/// (truncated/corrupt input).
pub(crate) fn balanced_braces(content: &str, open: usize) -> Option<&str> {
    debug_assert_eq!(content.as_bytes().get(open), Some(&b'{'));
    let mut depth = 0usize;
    for (i, b) in content.bytes().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[open + 1..i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split a `'a', "b"` style list into the quoted string items.
pub(crate) fn quoted_items(list: &str) -> Vec<String> {
    static QUOTED_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#"['"]([^'"]+)['"]"#).expect("quoted item regex"));
    QUOTED_RE
        .captures_iter(list)
        .map(|c| c[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script_exports() {
        let src = r#"
import { ref } from 'vue'

export function useCounter() {}
export const useMouse = () => {}
export { helper as useHelper }
export default useCounter
"#;
        let facts = parse_script(src);
        assert!(facts.has_default_export);
        assert_eq!(facts.named_exports, vec!["useCounter", "useMouse", "useHelper"]);
    }

    #[test]
    fn test_redeclared_export_listed_once() {
        let src = "export function useCounter() {}\nexport const other = 1\nexport { useCounter }\n";
        let facts = parse_script(src);
        assert_eq!(facts.named_exports, vec!["useCounter", "other"]);
    }

    #[test]
    fn test_parse_style_class_selectors() {
        let src = ".card-header {\n  color: red;\n}\n.cardBody { }\ndiv.ignored {}\n";
        let facts = parse_style(src);
        let names: Vec<&str> = facts.class_names.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["card-header", "cardBody"]);
        assert_eq!(facts.class_names[1].1, 4);
    }

    #[test]
    fn test_balanced_braces_truncated_is_none() {
        let src = "defineStore('x', { state: () => ({ a: 1 }";
        let open = src.find('{').unwrap();
        assert!(balanced_braces(src, open).is_none());
        let ok = "f({ a: { b: 2 } })";
        let open = ok.find('{').unwrap();
        assert_eq!(balanced_braces(ok, open), Some(" a: { b: 2 } "));
    }

    #[test]
    fn test_line_of_is_one_based() {
        assert_eq!(line_of("a\nb\nc", 0), 1);
        assert_eq!(line_of("a\nb\nc", 2), 2);
        assert_eq!(line_of("a\nb\nc", 4), 3);
    }
}
