//! Bracket-aware helpers over flattened type strings.
//!
//! Both the C# display strings read from attributes (`Result<List<User>>`) and
//! the TypeScript expressions produced by mapping (`Record<string, User[]>`)
//! are split with the same routines here, so identical inputs always
//! decompose identically.

fn opens(c: char) -> bool {
    matches!(c, '<' | '(' | '[' | '{')
}

fn closes(c: char) -> bool {
    matches!(c, '>' | ')' | ']' | '}')
}

/// Split a comma-separated argument list at depth zero.
///
/// Commas nested inside `<...>`, `(...)`, `[...]` or `{...}` do not split.
/// Each piece is trimmed; empty pieces are dropped.
pub fn split_generic_args(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        if opens(c) {
            depth += 1;
        } else if closes(c) {
            depth = depth.saturating_sub(1);
        } else if c == ',' && depth == 0 {
            parts.push(list[start..i].trim());
            start = i + 1;
        }
    }
    parts.push(list[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

/// Split `Base<Args>` into `("Base", "Args")`.
///
/// Returns `None` when the string is not a single well-formed generic
/// application (no `<`, or the first `<` does not close at the very end).
pub fn split_generic(expr: &str) -> Option<(&str, &str)> {
    let expr = expr.trim();
    let open = expr.find('<')?;
    let mut depth = 0usize;
    for (i, c) in expr.char_indices().skip_while(|(i, _)| *i < open) {
        if c == '<' {
            depth += 1;
        } else if c == '>' {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                if i + 1 != expr.len() {
                    return None;
                }
                return Some((expr[..open].trim(), &expr[open + 1..i]));
            }
        }
    }
    None
}

/// Cut an expression at its first unmatched bracket.
///
/// Upstream heuristics sometimes capture only a prefix such as `List<User`
/// or a suffix such as `User>`. Rather than importing such text verbatim, keep
/// only the part before the offending bracket.
pub fn truncate_unbalanced(expr: &str) -> &str {
    let mut stack: Vec<usize> = Vec::new();
    for (i, c) in expr.char_indices() {
        if opens(c) {
            stack.push(i);
        } else if closes(c) && stack.pop().is_none() {
            return expr[..i].trim_end();
        }
    }
    match stack.first() {
        Some(&first) => expr[..first].trim_end(),
        None => expr,
    }
}

/// Split a union at depth zero (`A | B<C | D>` → `["A", "B<C | D>"]`).
pub fn split_union(expr: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in expr.char_indices() {
        if opens(c) {
            depth += 1;
        } else if closes(c) {
            depth = depth.saturating_sub(1);
        } else if c == '|' && depth == 0 {
            parts.push(expr[start..i].trim());
            start = i + 1;
        }
    }
    parts.push(expr[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

/// True when `expr` is a union at its top level.
pub fn is_top_level_union(expr: &str) -> bool {
    split_union(expr).len() > 1
}

/// Split a dotted name at its last depth-zero dot: `System.Guid` → `(Some("System"), "Guid")`.
pub fn split_qualified(name: &str) -> (Option<&str>, &str) {
    let mut depth = 0usize;
    let mut last_dot = None;
    for (i, c) in name.char_indices() {
        if opens(c) {
            depth += 1;
        } else if closes(c) {
            depth = depth.saturating_sub(1);
        } else if c == '.' && depth == 0 {
            last_dot = Some(i);
        }
    }
    match last_dot {
        Some(i) => (Some(&name[..i]), &name[i + 1..]),
        None => (None, name),
    }
}
