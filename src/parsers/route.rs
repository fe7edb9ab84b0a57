//! Route-definition parser.
//!
//! Recovers every declared route path with its nesting depth (1 at the
//! top-level routes array, +1 per `children` array) and per-route guard
//! presence (`beforeEnter`). Depth tracking uses bracket counting over the
//! source, which is enough for declaration-style route tables.

use super::{line_of, ParseError};
use crate::model::{RouteFact, RouteFacts};
use once_cell::sync::Lazy;
use regex::Regex;

// `path:` can open a line or sit inline after `{` or `,`.
static PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)(?:^|[{,])\s*path\s*:\s*['"]([^'"]*)['"]"#).expect("path regex")
});
static CHILDREN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"children\s*:\s*\[").expect("children regex"));
static GUARD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(?:^|[{,])\s*(beforeEnter)\s*[:(]").expect("guard regex")
});

#[derive(Debug, Clone, Copy)]
enum Event {
    Path { offset: usize, end: usize },
    ChildrenOpen { offset: usize },
    Guard { offset: usize },
}

pub fn parse(content: &str) -> Result<RouteFacts, ParseError> {
    let mut depth_balance = 0i64;
    for b in content.bytes() {
        match b {
            b'[' | b'{' => depth_balance += 1,
            b']' | b'}' => depth_balance -= 1,
            _ => {}
        }
    }
    if depth_balance != 0 {
        return Err(ParseError::new("unbalanced brackets in route definitions"));
    }

    // Collect positional events, then replay them in offset order while
    // tracking which `children` arrays are still open.
    let mut events: Vec<Event> = Vec::new();
    for caps in PATH_RE.captures_iter(content) {
        if let Some(m) = caps.get(1) {
            events.push(Event::Path {
                offset: m.start(),
                end: m.end(),
            });
        }
    }
    for m in CHILDREN_RE.find_iter(content) {
        events.push(Event::ChildrenOpen {
            offset: m.end() - 1,
        });
    }
    for caps in GUARD_RE.captures_iter(content) {
        if let Some(m) = caps.get(1) {
            events.push(Event::Guard { offset: m.start() });
        }
    }
    events.sort_by_key(|e| match e {
        Event::Path { offset, .. } | Event::ChildrenOpen { offset } | Event::Guard { offset } => {
            *offset
        }
    });

    let mut routes: Vec<RouteFact> = Vec::new();
    // Offsets (exclusive) at which each open `children` array closes.
    let mut open_children: Vec<usize> = Vec::new();
    for event in events {
        let at = match event {
            Event::Path { offset, .. } | Event::ChildrenOpen { offset } | Event::Guard { offset } => {
                offset
            }
        };
        open_children.retain(|close| *close > at);
        match event {
            Event::Path { offset, end } => {
                routes.push(RouteFact {
                    path: content[offset..end].to_string(),
                    depth: open_children.len() + 1,
                    has_guard: false,
                    line: line_of(content, offset),
                });
            }
            Event::ChildrenOpen { offset } => {
                open_children.push(close_of_bracket(content, offset));
            }
            Event::Guard { .. } => {
                // A guard belongs to the most recent route at the current depth.
                let depth = open_children.len() + 1;
                if let Some(route) = routes.iter_mut().rev().find(|r| r.depth == depth) {
                    route.has_guard = true;
                }
            }
        }
    }
    Ok(RouteFacts { routes })
}

/// Exclusive offset just past the `]` matching the `[` at `open`.
fn close_of_bracket(content: &str, open: usize) -> usize {
    let mut depth = 0i64;
    for (i, b) in content.bytes().enumerate().skip(open) {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
    }
    content.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTER: &str = r#"
import { createRouter } from 'vue-router'

const routes = [
  {
    path: '/',
    component: HomePage,
  },
  {
    path: '/admin',
    beforeEnter: requireAuth,
    children: [
      {
        path: 'users',
        component: AdminUsers,
        children: [
          { path: ':id', component: AdminUserDetail },
        ],
      },
    ],
  },
]

export default createRouter({ routes })
"#;

    #[test]
    fn test_depth_and_guards() {
        let facts = parse(ROUTER).unwrap();
        let view: Vec<(&str, usize, bool)> = facts
            .routes
            .iter()
            .map(|r| (r.path.as_str(), r.depth, r.has_guard))
            .collect();
        assert_eq!(
            view,
            vec![
                ("/", 1, false),
                ("/admin", 1, true),
                ("users", 2, false),
                (":id", 3, false),
            ]
        );
    }

    #[test]
    fn test_route_lines_are_recorded() {
        let facts = parse(ROUTER).unwrap();
        assert_eq!(facts.routes[0].line, 6);
    }

    #[test]
    fn test_inline_route_objects_recovered() {
        let src = "const routes = [\n  { path: '/a', component: A },\n  { path: '/b', beforeEnter: guard, children: [{ path: 'c' }] },\n]\n";
        let facts = parse(src).unwrap();
        let view: Vec<(&str, usize, bool)> = facts
            .routes
            .iter()
            .map(|r| (r.path.as_str(), r.depth, r.has_guard))
            .collect();
        assert_eq!(
            view,
            vec![("/a", 1, false), ("/b", 1, true), ("c", 2, false)]
        );
    }

    #[test]
    fn test_unbalanced_routes_is_parse_error() {
        let src = "const routes = [\n  { path: '/', component: Home },\n";
        assert!(parse(src).is_err());
    }
}
