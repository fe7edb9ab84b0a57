//! convlint CLI binary entry point.
//! Delegates to library modules for one check run and prints the report.

mod check;
mod cli;
mod config;
mod evaluator;
mod model;
mod parsers;
mod registry;
mod report;
mod resolver;
mod rules;
mod scanner;
mod util;

use clap::Parser;
use cli::{Cli, Commands};
use model::CancelToken;
use registry::Registry;
use rules::Matcher;
use serde_json::json;
use std::path::{Path, PathBuf};

// Exit codes: 0 pass, 1 violations at error severity, 2 engine fault.
const EXIT_VIOLATIONS: i32 = 1;
const EXIT_FAULT: i32 = 2;

fn main() {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Rules { output } => {
            let registry = build_registry();
            print_rules(&registry, output.as_deref().unwrap_or("human"));
        }
        Commands::Check {
            root,
            config,
            output,
            rules,
            ignores,
        } => {
            run_check(
                root.as_deref(),
                config.as_deref(),
                output.as_deref(),
                &rules,
                &ignores,
            );
        }
    }
}

fn build_registry() -> Registry {
    match Registry::builtin() {
        Ok(r) => r,
        Err(e) => {
            // An inconsistent rule set can never produce a trustworthy report.
            eprintln!("{} {}", util::error_prefix(), e);
            std::process::exit(EXIT_FAULT);
        }
    }
}

fn run_check(
    root: Option<&str>,
    config: Option<&str>,
    output: Option<&str>,
    rule_overrides: &[String],
    ignores: &[String],
) {
    let registry = build_registry();
    let root = PathBuf::from(root.unwrap_or("."));
    if !root.is_dir() {
        eprintln!(
            "{} {}",
            util::error_prefix(),
            format!("project root is not a directory: {}", root.display())
        );
        std::process::exit(EXIT_FAULT);
    }

    let cfg = match config::load(
        &root,
        config.map(Path::new),
        rule_overrides,
        ignores,
        &registry,
    ) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{} {}", util::error_prefix(), e);
            std::process::exit(EXIT_FAULT);
        }
    };
    // Output precedence: CLI > config file > default.
    let output_mode = output
        .map(|s| s.to_string())
        .or_else(|| cfg.output.clone())
        .unwrap_or_else(|| "human".to_string());
    if cfg.config_path.is_none() && output_mode != "json" {
        eprintln!(
            "{} {}",
            util::note_prefix(),
            "no convlint.toml found; using built-in defaults."
        );
    }

    let cancel = CancelToken::new();
    let run = match check::run_check(&root, &cfg, &registry, &cancel) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{} {}", util::error_prefix(), e);
            std::process::exit(EXIT_FAULT);
        }
    };
    report::print_report(&run.report, &output_mode, &root);
    if !run.report.pass {
        std::process::exit(EXIT_VIOLATIONS);
    }
}

fn print_rules(registry: &Registry, output: &str) {
    if output == "json" {
        let items: Vec<_> = registry
            .iter()
            .map(|r| {
                json!({
                    "id": r.id,
                    "domain": r.domain.as_str(),
                    "defaultSeverity": r.default_severity.as_str(),
                    "kind": r.matcher.kind_str(),
                    "describe": r.describe,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "rules": items })).expect("rules serialize")
        );
        return;
    }
    for r in registry.iter() {
        let kind = match r.matcher {
            Matcher::NodeLocal(_) => "node-local",
            Matcher::ProjectWide(_) => "project-wide",
        };
        println!(
            "{:<36} {:<16} {:<8} {:<12} {}",
            r.id,
            r.domain.as_str(),
            r.default_severity,
            kind,
            r.describe
        );
    }
}
