//! Tool-configuration parser.
//!
//! Identifies which tool a config file belongs to (formatter, linter,
//! build tool, css framework) from its basename and flattens top-level
//! scalar settings when the file is JSON or YAML. JavaScript-based
//! configs (`vite.config.ts` and friends) are identified but carry no
//! structured settings.

use super::ParseError;
use crate::model::{ToolConfigFacts, ToolKind};
use std::collections::BTreeMap;
use std::path::Path;

/// Which tool a recognized config basename belongs to, or `None` when the
/// basename is not a known tool config.
pub fn tool_of(basename: &str) -> Option<ToolKind> {
    if basename == ".editorconfig" || basename.starts_with(".prettierrc") {
        return Some(ToolKind::Formatter);
    }
    if basename.starts_with(".eslintrc") || basename.starts_with("eslint.config.") {
        return Some(ToolKind::Linter);
    }
    if basename.starts_with("vite.config.") || basename.starts_with("webpack.config.") {
        return Some(ToolKind::BuildTool);
    }
    if basename.starts_with("tailwind.config.") {
        return Some(ToolKind::CssFramework);
    }
    None
}

pub fn parse(content: &str, path: &Path) -> Result<ToolConfigFacts, ParseError> {
    let basename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tool = tool_of(&basename)
        .ok_or_else(|| ParseError::new(format!("unrecognized tool config '{}'", basename)))?;

    let settings = if basename.ends_with(".json") || basename == ".prettierrc" {
        // .prettierrc without an extension is JSON first, YAML as fallback.
        match parse_json_settings(content) {
            Ok(s) => s,
            Err(e) if basename.ends_with(".json") => return Err(e),
            Err(_) => parse_yaml_settings(content)?,
        }
    } else if basename.ends_with(".yaml") || basename.ends_with(".yml") {
        parse_yaml_settings(content)?
    } else if basename == ".editorconfig" {
        parse_editorconfig_settings(content)
    } else {
        BTreeMap::new()
    };

    Ok(ToolConfigFacts { tool, settings })
}

fn parse_json_settings(content: &str) -> Result<BTreeMap<String, String>, ParseError> {
    let value: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| ParseError::new(format!("invalid JSON tool config: {}", e)))?;
    Ok(flatten_scalars(value.as_object().map(|o| {
        o.iter()
            .map(|(k, v)| (k.clone(), json_scalar(v)))
            .collect::<Vec<_>>()
    })))
}

fn parse_yaml_settings(content: &str) -> Result<BTreeMap<String, String>, ParseError> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)
        .map_err(|e| ParseError::new(format!("invalid YAML tool config: {}", e)))?;
    Ok(flatten_scalars(value.as_mapping().map(|m| {
        m.iter()
            .map(|(k, v)| {
                (
                    k.as_str().unwrap_or_default().to_string(),
                    yaml_scalar(v),
                )
            })
            .collect::<Vec<_>>()
    })))
}

fn parse_editorconfig_settings(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.starts_with('[') || line.starts_with('#') || line.starts_with(';') {
                return None;
            }
            let (k, v) = line.split_once('=')?;
            Some((k.trim().to_string(), v.trim().to_string()))
        })
        .collect()
}

fn flatten_scalars(entries: Option<Vec<(String, Option<String>)>>) -> BTreeMap<String, String> {
    entries
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect()
}

fn json_scalar(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn yaml_scalar(v: &serde_yaml::Value) -> Option<String> {
    match v {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_prettierrc_json_settings() {
        let facts = parse(
            r#"{ "semi": false, "tabWidth": 2, "overrides": [] }"#,
            &PathBuf::from(".prettierrc"),
        )
        .unwrap();
        assert_eq!(facts.tool, ToolKind::Formatter);
        assert_eq!(facts.settings.get("semi").map(String::as_str), Some("false"));
        assert_eq!(facts.settings.get("tabWidth").map(String::as_str), Some("2"));
        assert!(!facts.settings.contains_key("overrides"));
    }

    #[test]
    fn test_invalid_json_config_is_parse_error() {
        let err = parse("{ semi: false", &PathBuf::from(".prettierrc.json")).unwrap_err();
        assert!(err.message.contains("invalid JSON"));
    }

    #[test]
    fn test_tool_identity_from_basename() {
        assert_eq!(tool_of(".eslintrc.cjs"), Some(ToolKind::Linter));
        assert_eq!(tool_of("eslint.config.js"), Some(ToolKind::Linter));
        assert_eq!(tool_of("vite.config.ts"), Some(ToolKind::BuildTool));
        assert_eq!(tool_of("tailwind.config.js"), Some(ToolKind::CssFramework));
        assert_eq!(tool_of("package.json"), None);
    }

    #[test]
    fn test_editorconfig_settings() {
        let facts = parse(
            "root = true\n\n[*]\nindent_style = space\nindent_size = 2\n",
            &PathBuf::from(".editorconfig"),
        )
        .unwrap();
        assert_eq!(facts.tool, ToolKind::Formatter);
        assert_eq!(
            facts.settings.get("indent_style").map(String::as_str),
            Some("space")
        );
    }
}
