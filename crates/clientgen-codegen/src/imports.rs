//! Import resolution over rendered type expressions.
//!
//! Decomposition uses the same bracket-aware splitter as the type mapper's
//! string entry point, so a name inside `Record<string, Page<User>[]>` is
//! found the same way it was produced.

use clientgen_ir::typestr::{split_generic, split_generic_args, split_union, truncate_unbalanced};
use std::collections::BTreeMap;

/// Names that never need an import.
const BUILTIN: &[&str] = &[
    "string", "number", "boolean", "bigint", "any", "unknown", "void", "never", "null",
    "undefined", "object", "Date", "Blob", "File", "FormData", "Record", "Map", "Set", "Array",
    "ReadonlyArray", "Promise", "Partial",
];

/// Distinct named types referenced by a target type expression, in first-seen
/// order.
pub fn referenced_types(expr: &str) -> Vec<String> {
    let mut out = Vec::new();
    decompose(expr, &mut out);
    out
}

fn decompose(expr: &str, out: &mut Vec<String>) {
    let expr = truncate_unbalanced(expr.trim());
    if expr.is_empty() {
        return;
    }

    let members = split_union(expr);
    if members.len() > 1 {
        for m in members {
            decompose(m, out);
        }
        return;
    }

    if let Some(element) = expr.strip_suffix("[]") {
        decompose(element, out);
        return;
    }
    if let Some(inner) = expr.strip_prefix('(').and_then(|e| e.strip_suffix(')')) {
        decompose(inner, out);
        return;
    }
    if let Some(inner) = expr.strip_prefix('[').and_then(|e| e.strip_suffix(']')) {
        for element in split_generic_args(inner) {
            decompose(element, out);
        }
        return;
    }
    if let Some((base, args)) = split_generic(expr) {
        decompose(base, out);
        for arg in split_generic_args(args) {
            decompose(arg, out);
        }
        return;
    }

    let is_name = expr
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && expr.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if is_name && !BUILTIN.contains(&expr) && !out.iter().any(|n| n == expr) {
        out.push(expr.to_string());
    }
}

/// Accumulates `import` statements for one file.
#[derive(Debug, Default)]
pub struct Imports {
    /// module -> (names, type-only)
    modules: BTreeMap<String, (Vec<String>, bool)>,
    /// Side-effect imports (`import 'server-only'`).
    bare: Vec<String>,
}

impl Imports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_type(&mut self, module: &str, name: &str) {
        self.add(module, name, true);
    }

    pub fn add_value(&mut self, module: &str, name: &str) {
        self.add(module, name, false);
    }

    pub fn add_bare(&mut self, module: &str) {
        if !self.bare.iter().any(|m| m == module) {
            self.bare.push(module.to_string());
        }
    }

    fn add(&mut self, module: &str, name: &str, type_only: bool) {
        let entry = self
            .modules
            .entry(module.to_string())
            .or_insert_with(|| (Vec::new(), true));
        entry.1 &= type_only;
        if !entry.0.iter().any(|n| n == name) {
            entry.0.push(name.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.bare.is_empty()
    }

    /// Side-effect imports, then packages, then relative modules; names
    /// sorted within each statement.
    pub fn render(&self) -> Vec<String> {
        let bare = self.bare.iter().map(|m| format!("import '{}';", m));
        let mut modules: Vec<_> = self.modules.iter().collect();
        modules.sort_by_key(|(module, _)| module.starts_with('.'));
        let named = modules.into_iter().map(|(module, (names, type_only))| {
            let mut names = names.clone();
            names.sort();
            let keyword = if *type_only { "import type" } else { "import" };
            format!("{} {{ {} }} from '{}';", keyword, names.join(", "), module)
        });
        bare.chain(named).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decomposition() {
        assert_eq!(
            referenced_types("Record<string, Page<User>[]> | null"),
            vec!["Page", "User"]
        );
        assert_eq!(referenced_types("Result<void>"), vec!["Result"]);
        assert_eq!(referenced_types("[Order, number]"), vec!["Order"]);
        assert_eq!(referenced_types("(User | Admin)[]"), vec!["User", "Admin"]);
        assert!(referenced_types("string[]").is_empty());
    }

    #[test]
    fn test_malformed_is_truncated() {
        assert_eq!(referenced_types("Page<User"), vec!["Page"]);
        assert_eq!(referenced_types("User>"), vec!["User"]);
    }

    #[test]
    fn test_render_sorted() {
        let mut imports = Imports::new();
        imports.add_type("../types/user-dto", "UserDto");
        imports.add_value("../client", "apiFetch");
        imports.add_type("../types/address", "Address");
        assert_eq!(
            imports.render(),
            vec![
                "import { apiFetch } from '../client';",
                "import type { Address } from '../types/address';",
                "import type { UserDto } from '../types/user-dto';",
            ]
        );
    }
}
