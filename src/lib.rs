//! convlint core library.
//!
//! Programmatic API for the convention compliance engine: scan a project
//! tree, evaluate a configured rule set against its structural model, and
//! aggregate violations into a report.
//!
//! High-level modules:
//! - `check`: One full check run wiring the stages together.
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Configuration discovery and layered merge.
//! - `model`: Project model, findings, violations, report types.
//! - `scanner`: Tree walk, classification, suppression harvesting.
//! - `parsers`: Per-kind structural parsers (pure functions).
//! - `registry`: Rule registry with duplicate-id enforcement.
//! - `rules`: Built-in rule catalog, node-local and project-wide.
//! - `evaluator`: Parallel rule execution with crash isolation.
//! - `resolver`: Severity and suppression resolution.
//! - `report`: Aggregation plus human/JSON printers.
//! - `util`: Supporting helpers.

pub mod check;
pub mod cli;
pub mod config;
pub mod evaluator;
pub mod model;
pub mod parsers;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod rules;
pub mod scanner;
pub mod util;
