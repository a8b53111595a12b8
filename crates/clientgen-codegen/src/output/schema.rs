//! zod schemas for types with at least one extracted rule.
//!
//! Only validated properties are listed; the object passes unknown keys
//! through so unvalidated fields survive `parse`.

use super::{RenderContext, VALIDATION_DIR, ts_path};
use crate::artifact::{Artifact, ArtifactKind};
use crate::emitter::Emitter;
use crate::naming::{file_stem, property_key, schema_name};
use clientgen_ir::{PropertyInfo, PropertyValidationRules, RuleKind, TypeInfo, ValidationRule};
use heck::ToLowerCamelCase;

/// `None` when the type has no rules.
pub fn render_schema(cx: &RenderContext<'_>, type_name: &str) -> Option<Artifact> {
    if !cx.ir.has_rules(type_name) {
        return None;
    }
    let mut root = Field::default();
    for rules in cx.ir.rules_for(type_name) {
        root.insert(&rules.property, rules);
    }

    let mut e = Emitter::new();
    e.line("import { z } from 'zod';");
    e.blank();
    e.open(format!("export const {} = z", schema_name(type_name)));
    e.open(".object({");
    render_fields(cx, &mut e, type_name, cx.ir.type_named(type_name), &root.children);
    e.close("})");
    e.line(".passthrough();");
    e.dedent();

    Some(Artifact::new(
        ArtifactKind::Schema,
        ts_path(VALIDATION_DIR, &file_stem(type_name)),
        e.finish(),
    ))
}

/// Rules arranged by property path, so `Address.Street` nests under
/// `Address`. Children keep first-seen order.
#[derive(Default)]
struct Field<'a> {
    rules: Option<&'a PropertyValidationRules>,
    children: Vec<(&'a str, Field<'a>)>,
}

impl<'a> Field<'a> {
    fn insert(&mut self, path: &'a str, rules: &'a PropertyValidationRules) {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let index = match self.children.iter().position(|(name, _)| *name == head) {
            Some(index) => index,
            None => {
                self.children.push((head, Field::default()));
                self.children.len() - 1
            }
        };
        let child = &mut self.children[index].1;
        match rest {
            Some(rest) => child.insert(rest, rules),
            None => child.rules = Some(rules),
        }
    }

    /// Every selected path at or below this field.
    fn paths(&self, out: &mut Vec<&'a str>) {
        if let Some(rules) = self.rules {
            out.push(&rules.property);
        }
        for (_, child) in &self.children {
            child.paths(out);
        }
    }
}

fn render_fields(
    cx: &RenderContext<'_>,
    e: &mut Emitter,
    type_name: &str,
    owner: Option<&TypeInfo>,
    fields: &[(&str, Field<'_>)],
) {
    for (name, field) in fields {
        let property = owner.and_then(|t| t.properties.iter().find(|p| p.name == *name));
        let key = property.map_or_else(|| name.to_lower_camel_case(), |p| p.json_name.clone());

        if field.children.is_empty() {
            if let Some(rules) = field.rules {
                render_leaf(cx, e, type_name, &key, rules, property);
            }
            continue;
        }

        let nested = property
            .filter(|p| !p.type_info.is_collection)
            .and_then(|p| cx.ir.type_named(&p.type_info.name))
            .filter(|t| !t.is_enum);
        let Some(nested) = nested else {
            // no object shape to hang the nested rules on
            let mut paths = Vec::new();
            for (_, child) in &field.children {
                child.paths(&mut paths);
            }
            tracing::debug!("{}: nested rules left to the server: {:?}", type_name, paths);
            for path in paths {
                e.line(format!("// checked on the server: {}", path));
            }
            if let Some(rules) = field.rules {
                render_leaf(cx, e, type_name, &key, rules, property);
            }
            continue;
        };

        let required = field.rules.is_some_and(|r| r.required);
        let suffix = match property {
            _ if required => "",
            Some(p) if !p.is_nullable => ".optional()",
            _ => ".nullish()",
        };
        e.open(format!("{}: z", property_key(&key)));
        e.open(".object({");
        render_fields(cx, e, type_name, Some(nested), &field.children);
        e.close("})");
        e.line(format!(".passthrough(){},", suffix));
        e.dedent();
    }
}

fn render_leaf(
    cx: &RenderContext<'_>,
    e: &mut Emitter,
    type_name: &str,
    key: &str,
    rules: &PropertyValidationRules,
    property: Option<&PropertyInfo>,
) {
    let extras: Vec<&ValidationRule> = cx
        .ir
        .extra_rules_for(type_name)
        .filter(|r| r.property == rules.property)
        .collect();
    for custom in extras.iter().filter(|r| r.kind == RuleKind::Custom) {
        let predicate = custom.value.as_str().unwrap_or("custom");
        e.line(format!("// checked on the server: {}", predicate));
    }
    e.line(format!(
        "{}: {},",
        property_key(key),
        property_schema(cx, rules, property, &extras)
    ));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Base {
    String,
    Number,
    Boolean,
    Array,
    Any,
}

impl Base {
    fn of(mapped: Option<&str>) -> Self {
        match mapped.map(|m| m.trim_end_matches(" | null")) {
            Some("string") => Base::String,
            Some("number") => Base::Number,
            Some("boolean") => Base::Boolean,
            Some(m) if m.ends_with("[]") => Base::Array,
            _ => Base::Any,
        }
    }

    fn constructor(self) -> &'static str {
        match self {
            Base::String => "z.string()",
            Base::Number => "z.number()",
            Base::Boolean => "z.boolean()",
            Base::Array => "z.array(z.any())",
            Base::Any => "z.any()",
        }
    }

    fn has_length(self) -> bool {
        matches!(self, Base::String | Base::Array)
    }
}

fn property_schema(
    cx: &RenderContext<'_>,
    rules: &PropertyValidationRules,
    property: Option<&PropertyInfo>,
    extras: &[&ValidationRule],
) -> String {
    let mapped = property.map(|p| cx.map(&p.type_info));
    let base = Base::of(mapped.as_deref());
    let msg = rules
        .message
        .as_deref()
        .map(|m| format!(", {}", js_string(m)))
        .unwrap_or_default();
    let only_msg = msg.trim_start_matches(", ");

    let mut out = base.constructor().to_string();
    if rules.required && base.has_length() && rules.min_length.is_none_or(|n| n == 0) {
        out.push_str(&format!(".min(1{})", msg));
    }
    if base.has_length() {
        if let Some(n) = rules.min_length.filter(|n| *n > 0) {
            out.push_str(&format!(".min({}{})", n, msg));
        }
        if let Some(n) = rules.max_length {
            out.push_str(&format!(".max({}{})", n, msg));
        }
    }
    if base == Base::Number || base == Base::Any {
        if let Some(n) = rules.minimum {
            let check = if rules.minimum_exclusive { "gt" } else { "gte" };
            out = numeric(out, base, check, n, &msg);
        }
        if let Some(n) = rules.maximum {
            let check = if rules.maximum_exclusive { "lt" } else { "lte" };
            out = numeric(out, base, check, n, &msg);
        }
    }
    if base == Base::String || base == Base::Any {
        if rules.email {
            out = string_check(out, base, &format!("email({})", only_msg));
        }
        let patterns = rules.pattern.iter().map(String::as_str).chain(
            extras
                .iter()
                .filter(|r| r.kind == RuleKind::Pattern)
                .filter_map(|r| r.value.as_str()),
        );
        for pattern in patterns {
            out = string_check(
                out,
                base,
                &format!("regex(new RegExp({}){})", js_string(pattern), msg),
            );
        }
    }
    if rules.required && base == Base::Any {
        out.push_str(&format!(
            ".refine((value) => value !== undefined && value !== null{})",
            msg
        ));
    }
    if !rules.required {
        let nullable = property.is_none_or(|p| p.is_nullable);
        out.push_str(if nullable { ".nullish()" } else { ".optional()" });
    }
    out
}

/// A number check; an untyped property is coerced to a number first.
fn numeric(out: String, base: Base, check: &str, n: f64, msg: &str) -> String {
    let out = if base == Base::Any {
        "z.coerce.number()".to_string()
    } else {
        out
    };
    format!("{}.{}({}{})", out, check, number(n), msg)
}

/// A string check; an untyped property becomes a string first.
fn string_check(out: String, base: Base, check: &str) -> String {
    let out = if base == Base::Any {
        "z.string()".to_string()
    } else {
        out
    };
    format!("{}.{}", out, check)
}

fn number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Double-quoted JS string via JSON escaping.
fn js_string(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::GenerateOptions;
    use clientgen_ir::ProjectIr;
    use clientgen_typemap::TypeMapper;
    use serde_json::json;

    fn property(name: &str, json_name: &str, ty: &str) -> PropertyInfo {
        let type_info = TypeInfo::from_display(ty);
        PropertyInfo {
            name: name.into(),
            json_name: json_name.into(),
            is_nullable: type_info.is_nullable,
            type_info,
            is_required: false,
            annotations: vec![],
            summary: None,
        }
    }

    fn render(ir: &ProjectIr, name: &str) -> Option<String> {
        let mapper = TypeMapper::new();
        let options = GenerateOptions::default();
        let cx = RenderContext::new(ir, &mapper, &options);
        render_schema(&cx, name).map(|a| a.contents)
    }

    #[test]
    fn test_schema() {
        let ir = ProjectIr {
            types: vec![TypeInfo::definition(
                "CreateUserRequest",
                None,
                vec![],
                vec![
                    property("Email", "email", "string"),
                    property("Age", "age", "int?"),
                    property("Code", "code", "string"),
                ],
                None,
            )],
            validation: vec![
                PropertyValidationRules {
                    type_name: "CreateUserRequest".into(),
                    property: "Email".into(),
                    required: true,
                    max_length: Some(100),
                    email: true,
                    ..Default::default()
                },
                PropertyValidationRules {
                    type_name: "CreateUserRequest".into(),
                    property: "Age".into(),
                    minimum: Some(18.0),
                    maximum: Some(130.0),
                    maximum_exclusive: true,
                    message: Some("Adults only".into()),
                    ..Default::default()
                },
                PropertyValidationRules {
                    type_name: "CreateUserRequest".into(),
                    property: "Code".into(),
                    required: true,
                    pattern: Some("^[A-Z]{3}$".into()),
                    ..Default::default()
                },
            ],
            extra_rules: vec![ValidationRule::new(
                "CreateUserRequest",
                "Code",
                RuleKind::Custom,
                json!("Must"),
            )],
            ..Default::default()
        };
        insta::assert_snapshot!(render(&ir, "CreateUserRequest").unwrap(), @r#"
        import { z } from 'zod';

        export const createUserRequestSchema = z
          .object({
            email: z.string().min(1).max(100).email(),
            age: z.number().gte(18, "Adults only").lt(130, "Adults only").nullish(),
            // checked on the server: Must
            code: z.string().min(1).regex(new RegExp("^[A-Z]{3}$")),
          })
          .passthrough();
        "#);
        let artifact_path = {
            let mapper = TypeMapper::new();
            let options = GenerateOptions::default();
            let cx = RenderContext::new(&ir, &mapper, &options);
            render_schema(&cx, "CreateUserRequest").unwrap().display_path()
        };
        assert_eq!(artifact_path, "validation/create-user-request.ts");
    }

    #[test]
    fn test_nested_selection_renders_nested_object() {
        let rule = |property: &str| PropertyValidationRules {
            type_name: "CreateOrderRequest".into(),
            property: property.into(),
            required: true,
            ..Default::default()
        };
        let ir = ProjectIr {
            types: vec![
                TypeInfo::definition(
                    "CreateOrderRequest",
                    None,
                    vec![],
                    vec![
                        property("Address", "address", "AddressDto?"),
                        property("Lines", "lines", "List<OrderLine>"),
                    ],
                    None,
                ),
                TypeInfo::definition(
                    "AddressDto",
                    None,
                    vec![],
                    vec![
                        property("Street", "street", "string"),
                        property("Geo", "geo", "GeoPoint"),
                    ],
                    None,
                ),
                TypeInfo::definition(
                    "GeoPoint",
                    None,
                    vec![],
                    vec![property("Lat", "lat", "double")],
                    None,
                ),
            ],
            validation: vec![
                PropertyValidationRules {
                    max_length: Some(80),
                    ..rule("Address.Street")
                },
                PropertyValidationRules {
                    minimum: Some(-90.0),
                    maximum: Some(90.0),
                    ..rule("Address.Geo.Lat")
                },
                rule("Lines.Count"),
            ],
            ..Default::default()
        };
        let schema = render(&ir, "CreateOrderRequest").unwrap();
        assert!(!schema.contains("addressStreet"));
        insta::assert_snapshot!(schema, @r#"
        import { z } from 'zod';

        export const createOrderRequestSchema = z
          .object({
            address: z
              .object({
                street: z.string().min(1).max(80),
                geo: z
                  .object({
                    lat: z.number().gte(-90).lte(90),
                  })
                  .passthrough().optional(),
              })
              .passthrough().nullish(),
            // checked on the server: Lines.Count
          })
          .passthrough();
        "#);
    }

    #[test]
    fn test_no_rules_no_schema() {
        let ir = ProjectIr {
            types: vec![TypeInfo::definition(
                "Widget",
                None,
                vec![],
                vec![property("Name", "name", "string")],
                None,
            )],
            ..Default::default()
        };
        assert!(render(&ir, "Widget").is_none());
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(number(18.0), "18");
        assert_eq!(number(0.5), "0.5");
        assert_eq!(number(-3.0), "-3");
    }
}
