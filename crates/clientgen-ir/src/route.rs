//! Route templates.

use serde::{Deserialize, Serialize};

/// A `{name}` or `{name:constraint}` token in a route template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteParam {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    /// Byte range of the whole token, braces included.
    pub start: usize,
    pub end: usize,
}

/// Join a prefix and a route with exactly one separator.
///
/// Leading/trailing slashes on each part are trimmed; the result always starts
/// with `/`. Empty parts are skipped.
pub fn join_routes(prefix: &str, route: &str) -> String {
    let parts: Vec<&str> = [prefix, route]
        .into_iter()
        .map(|p| p.trim().trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect();
    format!("/{}", parts.join("/"))
}

/// Scan a route template for parameter tokens, in order.
///
/// The constraint suffix is discarded for typing but still bounds the token
/// (`{id:regex(^\d{3}$)}` is one token). Catch-all `*` and optional `?`
/// markers are stripped from the name.
pub fn route_parameters(route: &str) -> Vec<RouteParam> {
    let bytes = route.as_bytes();
    let mut params = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'{' {
            i += 1;
            continue;
        }
        // `{{` is an escaped literal brace
        if bytes.get(i + 1) == Some(&b'{') {
            i += 2;
            continue;
        }
        let start = i;
        let mut depth = 0usize;
        let mut end = None;
        for (j, &b) in bytes.iter().enumerate().skip(i) {
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(j);
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some(end) = end else { break };
        let body = &route[start + 1..end];
        let (name, constraint) = match body.split_once(':') {
            Some((name, constraint)) => (name, Some(constraint.to_string())),
            None => (body, None),
        };
        let name = name
            .trim()
            .trim_start_matches('*')
            .trim_end_matches('?')
            .to_string();
        if !name.is_empty() {
            params.push(RouteParam {
                name,
                constraint,
                start,
                end: end + 1,
            });
        }
        i = end + 1;
    }
    params
}
