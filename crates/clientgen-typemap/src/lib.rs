//! C# → TypeScript type expression mapping.
//!
//! [`TypeMapper::map`] works over a structured [`TypeInfo`];
//! [`TypeMapper::map_str`] works over a flattened display string and parses it
//! with the shared splitter in `clientgen_ir::typestr`, so both entry points
//! apply the same rules in the same order:
//!
//! 1. caller-supplied overrides
//! 2. built-in primitive/infrastructure table
//! 3. enumeration identity
//! 4. generic rules by base name (collections, erased wrappers, the `Result`
//!    outcome wrapper, maps, sets, tuples, pass-through)
//! 5. bare name
//!
//! Nullability is applied last and never twice.

pub mod builtins;

use builtins::{ANY, STRING, VOID};
use clientgen_ir::typestr::is_top_level_union;
use clientgen_ir::{Diagnostic, DiagnosticSink, NullSink, TypeInfo};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub use builtins::is_infrastructure;

/// Maps source type references to target type expressions.
#[derive(Clone)]
pub struct TypeMapper {
    overrides: HashMap<String, String>,
    enums: HashSet<String>,
    /// Names with a generated declaration; passing these through is expected.
    declared: HashSet<String>,
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for TypeMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeMapper")
            .field("overrides", &self.overrides)
            .field("enums", &self.enums)
            .field("declared", &self.declared)
            .finish_non_exhaustive()
    }
}

impl TypeMapper {
    pub fn new() -> Self {
        Self {
            overrides: HashMap::new(),
            enums: HashSet::new(),
            declared: HashSet::new(),
            sink: Arc::new(NullSink),
        }
    }

    /// Override table keyed by simple or namespace-qualified source name.
    pub fn with_overrides<I, K, V>(self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = self.overrides;
        table.extend(overrides.into_iter().map(|(k, v)| (k.into(), v.into())));
        Self {
            overrides: table,
            ..self
        }
    }

    /// Names known to be enums, so string-only references keep their name.
    pub fn with_enums<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut enums = self.enums;
        enums.extend(names.into_iter().map(Into::into));
        Self { enums, ..self }
    }

    /// Names the output declares, so their bare-name fallback is not reported.
    pub fn with_declared<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut declared = self.declared;
        declared.extend(names.into_iter().map(Into::into));
        Self { declared, ..self }
    }

    /// Where default pass-through decisions are reported.
    pub fn with_sink(self, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink, ..self }
    }

    /// Map a structured reference.
    pub fn map(&self, ty: &TypeInfo) -> String {
        let mapped = self.map_unwrapped(ty);
        if ty.is_nullable {
            with_null(mapped)
        } else {
            mapped
        }
    }

    /// Map a flattened display string (`Task<List<User>>`, `int?`).
    pub fn map_str(&self, display: &str) -> String {
        self.map(&TypeInfo::from_display(display))
    }

    fn lookup_override(&self, ty: &TypeInfo) -> Option<&String> {
        let qualified = match &ty.namespace {
            Some(ns) => format!("{}.{}", ns, ty.name),
            None => ty.name.clone(),
        };
        let display = ty.full_name.trim_end_matches('?');
        self.overrides
            .get(display)
            .or_else(|| self.overrides.get(&qualified))
            .or_else(|| self.overrides.get(&ty.name))
    }

    fn map_unwrapped(&self, ty: &TypeInfo) -> String {
        if let Some(mapped) = self.lookup_override(ty) {
            return mapped.clone();
        }

        if let Some(mapped) = builtins::primitive(&ty.name) {
            return mapped.to_string();
        }

        if ty.is_enum || self.enums.contains(&ty.name) {
            return ty.name.clone();
        }

        if let Some(mapped) = self.map_generic(ty) {
            return mapped;
        }

        if self.declared.contains(&ty.name) {
            return ty.name.clone();
        }
        self.sink.report(
            Diagnostic::info(format!(
                "'{}' has no mapping rule, emitting it as a named type",
                ty.full_name
            ))
            .at(ty.name.clone()),
        );
        ty.name.clone()
    }

    fn map_generic(&self, ty: &TypeInfo) -> Option<String> {
        let name = ty.name.as_str();
        let args = &ty.generic_args;

        if ty.is_collection {
            let Some(element) = args.first() else {
                return Some(format!("{}[]", ANY));
            };
            // byte[] travels as base64 text
            if name == "Array" && matches!(element.name.as_str(), "byte" | "Byte") {
                return Some(STRING.to_string());
            }
            return Some(format!("{}[]", parenthesize(self.map(element))));
        }

        if args.is_empty() {
            if builtins::is_outcome(name) {
                return Some(format!("Result<{}>", VOID));
            }
            if builtins::is_empty_result(name) {
                return Some(VOID.to_string());
            }
            return None;
        }

        if builtins::is_erased_wrapper(name) {
            return Some(self.map(&args[0]));
        }

        if builtins::is_outcome(name) && args.len() == 1 {
            let inner = self.map(&args[0]);
            let inner = if inner == VOID { VOID.to_string() } else { inner };
            return Some(format!("Result<{}>", inner));
        }

        if builtins::is_result_union(name) {
            let success = args
                .iter()
                .find(|a| builtins::is_erased_wrapper(&a.name))
                .unwrap_or(&args[0]);
            return Some(self.map(success));
        }

        if builtins::is_map(name) && args.len() == 2 {
            let key = self.map(&args[0]);
            let value = self.map(&args[1]);
            return Some(if key == STRING {
                format!("Record<string, {}>", value)
            } else {
                format!("Map<{}, {}>", key, value)
            });
        }

        if builtins::is_set(name) && args.len() == 1 {
            return Some(format!("Set<{}>", self.map(&args[0])));
        }

        if builtins::is_tuple(name) {
            let elements: Vec<String> = args.iter().map(|a| self.map(a)).collect();
            return Some(format!("[{}]", elements.join(", ")));
        }

        let mapped: Vec<String> = args.iter().map(|a| self.map(a)).collect();
        Some(format!("{}<{}>", name, mapped.join(", ")))
    }
}

/// Append `| null` unless the expression is a sentinel or already a union.
fn with_null(expr: String) -> String {
    if expr == ANY || expr == VOID || is_top_level_union(&expr) {
        expr
    } else {
        format!("{} | null", expr)
    }
}

/// Unions need parentheses before an array suffix.
fn parenthesize(expr: String) -> String {
    if is_top_level_union(&expr) {
        format!("({})", expr)
    } else {
        expr
    }
}
