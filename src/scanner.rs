//! Project tree scanning and classification.
//!
//! Walks the root depth-first in sorted order (so two scans of an
//! unchanged tree build identical models), classifies every file by
//! extension plus a content sniff, harvests inline suppression markers,
//! then parses all classifiable files in parallel. Symlinked directories
//! are followed once; a link resolving back onto the descent stack stops
//! there and becomes a synthetic `link-cycle` finding.

use crate::model::{
    CancelToken, FileKind, ProjectModel, ProjectNode, RawFinding, TextFacts,
};
use crate::parsers;
use crate::registry::{RULE_LINK_CYCLE, RULE_UNPARSABLE};
use glob::Pattern;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything one walk produces: the model, synthetic findings recorded
/// during scanning (cycles, unparsable files), and harvested suppressions.
pub struct ScanOutcome {
    pub model: ProjectModel,
    pub findings: Vec<RawFinding>,
    pub suppressions: SuppressionIndex,
}

#[derive(Debug)]
pub enum ScanError {
    /// The root itself could not be read; no report can be produced.
    UnreadableRoot(PathBuf, std::io::Error),
    Cancelled,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::UnreadableRoot(p, e) => {
                write!(f, "cannot read project root '{}': {}", p.display(), e)
            }
            ScanError::Cancelled => f.write_str("scan cancelled"),
        }
    }
}

impl Error for ScanError {}

/// One inline suppression marker: silences `rule` at `line` (or anywhere
/// in the file when `line` is `None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suppression {
    pub rule: String,
    pub line: Option<u32>,
}

#[derive(Debug, Default)]
pub struct SuppressionIndex {
    by_path: BTreeMap<PathBuf, Vec<Suppression>>,
}

impl SuppressionIndex {
    pub fn covers(&self, path: &Path, rule: &str, line: Option<u32>) -> bool {
        let Some(marks) = self.by_path.get(path) else {
            return false;
        };
        marks.iter().any(|m| {
            m.rule == rule && (m.line.is_none() || (line.is_some() && m.line == line))
        })
    }

    fn insert(&mut self, path: PathBuf, marks: Vec<Suppression>) {
        if !marks.is_empty() {
            self.by_path.insert(path, marks);
        }
    }
}

/// Classify a file from its path, extension, and content. Pure: the same
/// inputs always yield the same kind.
pub fn classify(path: &Path, content: &str) -> FileKind {
    let basename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if parsers::toolconfig::tool_of(&basename).is_some() {
        return FileKind::ToolConfig;
    }
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    // Content sniff first: a file with both markup and script blocks is a
    // component even under an ambiguous extension.
    let has_template = content.contains("<template");
    let has_script = content.contains("<script");
    if ext == "vue" || (has_template && has_script) {
        return FileKind::Component;
    }
    match ext.as_str() {
        "js" | "ts" | "mjs" | "cjs" | "jsx" | "tsx" => {
            // Location alone is not enough: a helper under stores/ without
            // a defineStore call is still a Script.
            if content.contains("defineStore(") {
                FileKind::Store
            } else if content.contains("createRouter(") || looks_like_route_table(content) {
                FileKind::Route
            } else {
                FileKind::Script
            }
        }
        "css" | "scss" | "sass" | "less" => FileKind::Style,
        _ => FileKind::Other,
    }
}

static ROUTES_ARRAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"routes\s*[:=]\s*\[").expect("routes array regex"));

fn looks_like_route_table(content: &str) -> bool {
    ROUTES_ARRAY_RE.is_match(content) && content.contains("path:")
}

static SUPPRESSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"convlint-disable-(next-line|line|file)\s+([A-Za-z0-9/_-]+)")
        .expect("suppression regex")
});

/// Line-wise pass over content: tab-indentation facts and suppression
/// markers in one read.
fn read_text(content: &str) -> (TextFacts, Vec<Suppression>) {
    let mut facts = TextFacts {
        tab_indented_lines: Vec::new(),
        final_newline: content.ends_with('\n'),
    };
    let mut marks = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let lineno = (i + 1) as u32;
        if line.starts_with('\t') {
            facts.tab_indented_lines.push(lineno);
        }
        for caps in SUPPRESSION_RE.captures_iter(line) {
            let rule = caps[2].to_string();
            let line = match &caps[1] {
                "next-line" => Some(lineno + 1),
                "line" => Some(lineno),
                _ => None,
            };
            marks.push(Suppression { rule, line });
        }
    }
    (facts, marks)
}

struct PendingParse {
    node: usize,
    kind: FileKind,
    path: PathBuf,
    content: String,
}

struct Walker<'a> {
    root: PathBuf,
    ignore: &'a [Pattern],
    cancel: &'a CancelToken,
    nodes: Vec<ProjectNode>,
    pending: Vec<PendingParse>,
    findings: Vec<RawFinding>,
    suppressions: SuppressionIndex,
}

/// Build a `ProjectModel` by depth-first traversal of `root`.
pub fn scan(
    root: &Path,
    ignore: &[Pattern],
    cancel: &CancelToken,
) -> Result<ScanOutcome, ScanError> {
    let canonical_root = fs::canonicalize(root)
        .map_err(|e| ScanError::UnreadableRoot(root.to_path_buf(), e))?;
    fs::read_dir(root).map_err(|e| ScanError::UnreadableRoot(root.to_path_buf(), e))?;

    let mut walker = Walker {
        root: root.to_path_buf(),
        ignore,
        cancel,
        nodes: vec![ProjectNode {
            path: PathBuf::new(),
            kind: FileKind::Directory,
            parent: None,
            children: Vec::new(),
            unit: None,
            text: None,
        }],
        pending: Vec::new(),
        findings: Vec::new(),
        suppressions: SuppressionIndex::default(),
    };
    let mut stack = vec![canonical_root];
    walker.walk_dir(&root.to_path_buf(), &PathBuf::new(), 0, &mut stack)?;

    // Parallel parse phase: parsers are pure, each file independent.
    let cancel_parse = cancel.clone();
    let parsed: Vec<(usize, Result<crate::model::ParsedUnit, parsers::ParseError>)> = walker
        .pending
        .par_iter()
        .filter(|_| !cancel_parse.is_cancelled())
        .map(|p| (p.node, parsers::parse(p.kind, &p.content, &p.path)))
        .collect();
    if cancel.is_cancelled() {
        return Err(ScanError::Cancelled);
    }
    for (idx, result) in parsed {
        match result {
            Ok(unit) => walker.nodes[idx].unit = Some(unit),
            Err(e) => walker.findings.push(RawFinding {
                rule: RULE_UNPARSABLE.to_string(),
                path: walker.nodes[idx].path.clone(),
                line: None,
                column: None,
                message: format!("file could not be parsed: {}", e),
            }),
        }
    }

    Ok(ScanOutcome {
        model: ProjectModel {
            root: root.to_path_buf(),
            nodes: walker.nodes,
        },
        findings: walker.findings,
        suppressions: walker.suppressions,
    })
}

impl Walker<'_> {
    fn is_ignored(&self, rel: &Path, name: &str) -> bool {
        self.ignore
            .iter()
            .any(|p| p.matches(name) || p.matches_path(rel))
    }

    fn walk_dir(
        &mut self,
        abs: &PathBuf,
        rel: &PathBuf,
        parent: usize,
        canonical_stack: &mut Vec<PathBuf>,
    ) -> Result<(), ScanError> {
        let mut entries: Vec<_> = match fs::read_dir(abs) {
            Ok(rd) => rd.filter_map(|e| e.ok()).collect(),
            // A directory vanishing or turning unreadable mid-walk just
            // contributes no children.
            Err(_) => return Ok(()),
        };
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            if self.cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let child_abs = entry.path();
            let child_rel = rel.join(&name);
            if self.is_ignored(&child_rel, &name) {
                continue;
            }
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let is_dir = if file_type.is_symlink() {
                child_abs.is_dir()
            } else {
                file_type.is_dir()
            };
            if is_dir {
                let canonical = match fs::canonicalize(&child_abs) {
                    Ok(c) => c,
                    Err(_) => continue,
                };
                if canonical_stack.contains(&canonical) {
                    self.findings.push(RawFinding {
                        rule: RULE_LINK_CYCLE.to_string(),
                        path: child_rel.clone(),
                        line: None,
                        column: None,
                        message: format!(
                            "symbolic link cycle: '{}' resolves to an ancestor directory",
                            child_rel.display()
                        ),
                    });
                    continue;
                }
                let idx = self.push_node(child_rel.clone(), FileKind::Directory, parent);
                canonical_stack.push(canonical);
                self.walk_dir(&child_abs, &child_rel, idx, canonical_stack)?;
                canonical_stack.pop();
            } else {
                self.visit_file(&child_abs, child_rel, parent);
            }
        }
        Ok(())
    }

    fn visit_file(&mut self, abs: &Path, rel: PathBuf, parent: usize) {
        let bytes = match fs::read(abs) {
            Ok(b) => b,
            Err(_) => return,
        };
        let content = match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(_) => {
                self.push_node(rel, FileKind::Other, parent);
                return;
            }
        };
        let kind = classify(&rel, &content);
        let idx = self.push_node(rel.clone(), kind, parent);
        if kind == FileKind::Other || content.is_empty() {
            // Zero-byte files are classified but carry no unit or text facts.
            return;
        }
        let (text, marks) = read_text(&content);
        self.nodes[idx].text = Some(text);
        self.suppressions.insert(rel.clone(), marks);
        self.pending.push(PendingParse {
            node: idx,
            kind,
            path: rel,
            content,
        });
    }

    fn push_node(&mut self, path: PathBuf, kind: FileKind, parent: usize) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(ProjectNode {
            path,
            kind,
            parent: Some(parent),
            children: Vec::new(),
            unit: None,
            text: None,
        });
        self.nodes[parent].children.push(idx);
        idx
    }
}
