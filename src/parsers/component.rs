//! Single-file-component parser.
//!
//! Recovers the three top-level structural blocks (script, template,
//! style) in source order, the declared component name, declared props
//! with their types, and emitted event names. Works on both the
//! `<script setup>` macros (`defineProps`/`defineEmits`/`defineOptions`)
//! and the options-API object, without executing any code.

use super::{balanced_braces, line_of, quoted_items, ParseError};
use crate::model::{Block, ComponentFacts, PropFact};
use once_cell::sync::Lazy;
use regex::Regex;

static BLOCK_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^<(script|template|style)\b").expect("block open regex"));

static DEFINE_OPTIONS_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"defineOptions\(\s*\{[^}]*?name\s*:\s*['"]([^'"]+)['"]"#).expect("name regex")
});
static OPTIONS_OPEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:export\s+default\s+(?:defineComponent\s*\(\s*)?|defineComponent\s*\(\s*)\{")
        .expect("options open regex")
});
static OPTIONS_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*name\s*:\s*['"]([^'"]+)['"]"#).expect("name regex"));

static DEFINE_PROPS_TYPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"defineProps\s*<\s*\{").expect("defineProps type regex"));
static DEFINE_PROPS_OBJ_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"defineProps\s*\(\s*\{").expect("defineProps obj regex"));
static OPTIONS_PROPS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*props\s*:\s*\{").expect("props obj regex"));
static PROPS_ARRAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:defineProps\s*\(\s*|(?m:^)\s*props\s*:\s*)\[([^\]]*)\]")
        .expect("props array regex")
});

static TS_PROP_ENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*([A-Za-z_$][\w$]*)\s*\??\s*:\s*([^;,\n]+)").expect("ts prop regex")
});
static OBJ_PROP_ENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*([A-Za-z_$][\w$]*)\s*:\s*(\{|[A-Za-z][\w$]*)").expect("obj prop regex")
});
static PROP_TYPE_FIELD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"type\s*:\s*([A-Za-z][\w$]*)").expect("prop type field regex"));

static DEFINE_EMITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"defineEmits\s*\(\s*\[([^\]]*)\]").expect("defineEmits regex"));
static OPTIONS_EMITS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*emits\s*:\s*\[([^\]]*)\]").expect("emits regex"));

pub fn parse(content: &str) -> Result<ComponentFacts, ParseError> {
    let blocks = parse_blocks(content)?;
    Ok(ComponentFacts {
        name: parse_name(content),
        props: parse_props(content)?,
        emits: parse_emits(content),
        blocks,
    })
}

fn parse_blocks(content: &str) -> Result<Vec<(Block, u32)>, ParseError> {
    let mut blocks = Vec::new();
    for caps in BLOCK_OPEN_RE.captures_iter(content) {
        let tag = &caps[1];
        let block = match tag {
            "script" => Block::Script,
            "template" => Block::Template,
            _ => Block::Style,
        };
        let open = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let closer = format!("</{}>", tag);
        if !content[open..].contains(&closer) {
            return Err(ParseError::new(format!("unclosed <{}> block", tag)));
        }
        blocks.push((block, line_of(content, open)));
    }
    Ok(blocks)
}

fn parse_name(content: &str) -> Option<String> {
    if let Some(caps) = DEFINE_OPTIONS_NAME_RE.captures(content) {
        return Some(caps[1].to_string());
    }
    // An options-API `name:` only counts inside the component options
    // object, not in arbitrary objects elsewhere in the file.
    let body = options_body(content)?;
    OPTIONS_NAME_RE.captures(body).map(|c| c[1].to_string())
}

fn options_body(content: &str) -> Option<&str> {
    let m = OPTIONS_OPEN_RE.find(content)?;
    balanced_braces(content, m.end() - 1)
}

fn parse_props(content: &str) -> Result<Vec<PropFact>, ParseError> {
    // Type-literal form: defineProps<{ label: string; count?: number }>()
    if let Some(m) = DEFINE_PROPS_TYPE_RE.find(content) {
        let open = m.end() - 1;
        let body = balanced_braces(content, open)
            .ok_or_else(|| ParseError::new("unbalanced braces in defineProps type literal"))?;
        let base = open + 1;
        return Ok(TS_PROP_ENTRY_RE
            .captures_iter(body)
            .map(|c| PropFact {
                name: c[1].to_string(),
                ty: Some(c[2].trim().to_string()),
                line: line_of(content, base + c.get(1).map(|m| m.start()).unwrap_or(0)),
            })
            .collect());
    }
    // Object form: defineProps({ ... }) or options-API props: { ... }
    let obj_open = DEFINE_PROPS_OBJ_RE
        .find(content)
        .or_else(|| OPTIONS_PROPS_RE.find(content))
        .map(|m| m.end() - 1);
    if let Some(open) = obj_open {
        let body = balanced_braces(content, open)
            .ok_or_else(|| ParseError::new("unbalanced braces in props declaration"))?;
        let base = open + 1;
        let mut props = Vec::new();
        let mut skip_until = 0usize;
        for caps in OBJ_PROP_ENTRY_RE.captures_iter(body) {
            let Some(name_match) = caps.get(1) else {
                continue;
            };
            if name_match.start() < skip_until {
                // entry inside a preceding prop's option object
                continue;
            }
            let value = &caps[2];
            let ty = if value == "{" {
                let inner_open = caps.get(2).map(|m| m.start()).unwrap_or(0);
                let inner = balanced_braces(body, inner_open)
                    .ok_or_else(|| ParseError::new("unbalanced braces in props declaration"))?;
                // skip past the option object's closing brace
                skip_until = inner_open + inner.len() + 2;
                PROP_TYPE_FIELD_RE.captures(inner).map(|c| c[1].to_string())
            } else {
                Some(value.to_string())
            };
            props.push(PropFact {
                name: name_match.as_str().to_string(),
                ty,
                line: line_of(content, base + name_match.start()),
            });
        }
        return Ok(props);
    }
    // Array form declares names without types
    if let Some(caps) = PROPS_ARRAY_RE.captures(content) {
        let base = caps.get(1).map(|m| m.start()).unwrap_or(0);
        return Ok(quoted_items(&caps[1])
            .into_iter()
            .map(|name| PropFact {
                name,
                ty: None,
                line: line_of(content, base),
            })
            .collect());
    }
    Ok(Vec::new())
}

fn parse_emits(content: &str) -> Vec<String> {
    DEFINE_EMITS_RE
        .captures(content)
        .or_else(|| OPTIONS_EMITS_RE.captures(content))
        .map(|c| quoted_items(&c[1]))
        .unwrap_or_default()
}
