//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "convlint",
    version,
    about = "Convention compliance engine for component-based front-end projects",
    long_about = "convlint — scan a project tree, evaluate a configurable rule set against its structure, and report violations with CI-friendly severities and exit codes.\n\nConfiguration precedence: CLI > convlint.toml > presets > defaults.",
    after_help = "Examples:\n  convlint check\n  convlint check --root apps/web --output json\n  convlint check --rule naming/component-pascal-case=warning\n  convlint rules",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current convlint version.")]
    Version,
    /// Check a project tree against the active rule set
    #[command(
        about = "Run compliance checks",
        long_about = "Scan the project tree, evaluate the active rules, and print a report. Exits 0 when the run passes, 1 when any error-severity violation remains, 2 on engine faults.",
        after_help = "Examples:\n  convlint check --root .\n  convlint check --config ci/convlint.toml --output json\n  convlint check --ignore 'legacy/**'"
    )]
    Check {
        #[arg(long, help = "Project root to scan (default: current dir)")]
        root: Option<String>,
        #[arg(long, help = "Path to a configuration file (default: discover convlint.toml|yaml)")]
        config: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(
            long = "rule",
            value_name = "ID=SEVERITY",
            help = "Override a rule severity (error|warning|info|off); repeatable"
        )]
        rules: Vec<String>,
        #[arg(
            long = "ignore",
            value_name = "GLOB",
            help = "Additional ignore glob; repeatable"
        )]
        ignores: Vec<String>,
    },
    /// List the built-in rule registry
    #[command(
        about = "List rules",
        long_about = "Print every registered rule with its domain, default severity, and matcher kind."
    )]
    Rules {
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}
