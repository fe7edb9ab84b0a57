//! Store-definition parser.
//!
//! Recognizes the three-part store shape (state, derived values, actions)
//! regardless of declaration order, for both the options form
//! `defineStore(id, { state, getters, actions })` and the setup form
//! `defineStore(id, () => { ... })` built from refs, computed values, and
//! functions.

use super::{balanced_braces, line_of, ParseError};
use crate::model::StoreFacts;
use once_cell::sync::Lazy;
use regex::Regex;

static DEFINE_STORE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"defineStore\s*\("#).expect("defineStore regex"));
static STORE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"defineStore\s*\(\s*['"]([^'"]+)['"]"#).expect("store id regex"));
static SETUP_FORM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"defineStore\s*\(\s*['"][^'"]*['"]\s*,\s*(?:\(\)|function)"#)
        .expect("setup form regex")
});

static SECTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(state|getters|actions)\s*:").expect("section regex")
});
static OBJ_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:async\s+)?([A-Za-z_$][\w$]*)\s*[:(]").expect("key regex"));

static REF_DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:const|let)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:ref|reactive|shallowRef)\s*\(")
        .expect("ref decl regex")
});
static COMPUTED_DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:const|let)\s+([A-Za-z_$][\w$]*)\s*=\s*computed\s*\(")
        .expect("computed decl regex")
});
static FN_DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:async\s+)?function\s+([A-Za-z_$][\w$]*)\s*\(")
        .expect("fn decl regex")
});

pub fn parse(content: &str) -> Result<StoreFacts, ParseError> {
    let call = match DEFINE_STORE_RE.find(content) {
        Some(m) => m,
        // A store-classified file without a defineStore call (e.g. a barrel
        // file under stores/) carries empty facts.
        None => return Ok(StoreFacts::default()),
    };

    let id = STORE_ID_RE.captures(content).map(|c| c[1].to_string());
    let id_line = STORE_ID_RE
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| line_of(content, m.start()));

    let mut facts = StoreFacts {
        declares_store: true,
        id,
        id_line,
        ..StoreFacts::default()
    };

    if SETUP_FORM_RE.is_match(content) {
        let body_open = content[call.end()..]
            .find('{')
            .map(|i| call.end() + i)
            .ok_or_else(|| ParseError::new("defineStore setup body missing"))?;
        let body = balanced_braces(content, body_open)
            .ok_or_else(|| ParseError::new("unbalanced braces in defineStore setup body"))?;
        facts.state_keys = capture_names(&REF_DECL_RE, body);
        facts.getter_keys = capture_names(&COMPUTED_DECL_RE, body);
        facts.action_keys = capture_names(&FN_DECL_RE, body);
        facts.has_state = !facts.state_keys.is_empty();
        facts.has_getters = !facts.getter_keys.is_empty();
        facts.has_actions = !facts.action_keys.is_empty();
        return Ok(facts);
    }

    // Options form: find the options object after the id argument.
    let opts_open = content[call.end()..]
        .find('{')
        .map(|i| call.end() + i)
        .ok_or_else(|| ParseError::new("defineStore options object missing"))?;
    let opts = balanced_braces(content, opts_open)
        .ok_or_else(|| ParseError::new("unbalanced braces in defineStore options"))?;

    for caps in SECTION_RE.captures_iter(opts) {
        let section_end = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let Some(open) = opts[section_end..].find('{').map(|i| section_end + i) else {
            continue;
        };
        let body = balanced_braces(opts, open)
            .ok_or_else(|| ParseError::new("unbalanced braces in store section"))?;
        let keys = capture_names(&OBJ_KEY_RE, body);
        match &caps[1] {
            "state" => {
                facts.has_state = true;
                facts.state_keys = keys;
            }
            "getters" => {
                facts.has_getters = true;
                facts.getter_keys = keys;
            }
            _ => {
                facts.has_actions = true;
                facts.action_keys = keys;
            }
        }
    }
    Ok(facts)
}

fn capture_names(re: &Regex, body: &str) -> Vec<String> {
    let mut names: Vec<String> = re.captures_iter(body).map(|c| c[1].to_string()).collect();
    names.dedup();
    names
}
