//! Core data model for one compliance run.
//!
//! A run builds a `ProjectModel` (classified tree plus parsed structural
//! facts), evaluates rules into `RawFinding`s, resolves them to
//! `Violation`s, and aggregates those into a `Report`. Everything here is
//! built write-once per run and read-only afterwards.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
/// Classification assigned to every node during scanning.
pub enum FileKind {
    Directory,
    Component,
    Script,
    Style,
    Store,
    Route,
    ToolConfig,
    Other,
}

/// One directory or file in the project tree.
///
/// Nodes live in the flat arena owned by `ProjectModel`; `parent` and
/// `children` are indices into that arena. `path` is relative to the scan
/// root (the root node itself has an empty path).
#[derive(Debug)]
pub struct ProjectNode {
    pub path: PathBuf,
    pub kind: FileKind,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub unit: Option<ParsedUnit>,
    pub text: Option<TextFacts>,
}

/// Cheap line-level facts recorded for every readable text file so that
/// formatting rules never re-read content.
#[derive(Debug, Clone, Default)]
pub struct TextFacts {
    /// 1-based numbers of lines that start with a tab character.
    pub tab_indented_lines: Vec<u32>,
    pub final_newline: bool,
}

/// Kind-specific structural facts attached to a parsable leaf node.
#[derive(Debug, Clone)]
pub enum ParsedUnit {
    Component(ComponentFacts),
    Script(ScriptFacts),
    Style(StyleFacts),
    Store(StoreFacts),
    Route(RouteFacts),
    ToolConfig(ToolConfigFacts),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Script,
    Template,
    Style,
}

impl Block {
    pub fn as_str(self) -> &'static str {
        match self {
            Block::Script => "script",
            Block::Template => "template",
            Block::Style => "style",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComponentFacts {
    pub name: Option<String>,
    pub props: Vec<PropFact>,
    pub emits: Vec<String>,
    /// Top-level blocks in source order with their 1-based line numbers.
    pub blocks: Vec<(Block, u32)>,
}

#[derive(Debug, Clone)]
pub struct PropFact {
    pub name: String,
    pub ty: Option<String>,
    pub line: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptFacts {
    pub has_default_export: bool,
    pub named_exports: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StyleFacts {
    /// Top-level class selector names with their 1-based line numbers.
    pub class_names: Vec<(String, u32)>,
}

#[derive(Debug, Clone, Default)]
pub struct StoreFacts {
    /// True when the file actually calls `defineStore`.
    pub declares_store: bool,
    pub id: Option<String>,
    pub id_line: Option<u32>,
    pub has_state: bool,
    pub has_getters: bool,
    pub has_actions: bool,
    pub state_keys: Vec<String>,
    pub getter_keys: Vec<String>,
    pub action_keys: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RouteFact {
    pub path: String,
    /// 1 for entries in the top-level routes array, +1 per `children` level.
    pub depth: usize,
    pub has_guard: bool,
    pub line: u32,
}

#[derive(Debug, Clone, Default)]
pub struct RouteFacts {
    pub routes: Vec<RouteFact>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Formatter,
    Linter,
    BuildTool,
    CssFramework,
}

impl ToolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolKind::Formatter => "formatter",
            ToolKind::Linter => "linter",
            ToolKind::BuildTool => "build-tool",
            ToolKind::CssFramework => "css-framework",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolConfigFacts {
    pub tool: ToolKind,
    /// Flattened top-level scalar settings, when the format is parsable.
    pub settings: BTreeMap<String, String>,
}

/// The in-memory tree of classified files plus their parsed facts.
#[derive(Debug)]
pub struct ProjectModel {
    pub root: PathBuf,
    pub nodes: Vec<ProjectNode>,
}

impl ProjectModel {
    pub fn files_of_kind(&self, kind: FileKind) -> impl Iterator<Item = &ProjectNode> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    pub fn file_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.kind != FileKind::Directory)
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn parse(s: &str) -> Option<Severity> {
        match s {
            "error" => Some(Severity::Error),
            "warning" | "warn" => Some(Severity::Warning),
            "info" => Some(Severity::Info),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule match before severity/suppression resolution.
#[derive(Debug, Clone)]
pub struct RawFinding {
    pub rule: String,
    /// Root-relative path of the offending node.
    pub path: PathBuf,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub message: String,
}

/// A resolved finding; the engine's unit of report output.
///
/// Identity is `(rule_id, path, line, column, message)`; duplicates
/// collapse during aggregation.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub path: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
    #[serde(rename = "ruleId")]
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub suppressed: usize,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub violations: Vec<Violation>,
    pub summary: Summary,
    pub pass: bool,
}

/// Cooperative cancellation flag shared between the scanner and evaluator.
///
/// Workers check it between files and between nodes; once set, no new work
/// starts. Partially accumulated results are discarded by the caller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
