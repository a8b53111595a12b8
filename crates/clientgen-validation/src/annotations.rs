//! Data-annotation attributes on properties.

use clientgen_ir::literal::{bool_literal, number_literal, string_literal};
use clientgen_ir::{Annotation, RuleKind, ValidationRule};
use serde_json::{Value, json};

/// Rules declared by the annotations of one property.
///
/// `ErrorMessage = "..."` applies to every rule its attribute produces.
pub fn rules_from_annotations(
    type_name: &str,
    property: &str,
    annotations: &[Annotation],
) -> Vec<ValidationRule> {
    let mut rules = Vec::new();
    for annotation in annotations {
        let produced = rules_for_annotation(type_name, property, annotation);
        let message = annotation.named_arg("ErrorMessage").and_then(string_literal);
        rules.extend(produced.into_iter().map(|r| match &message {
            Some(m) => r.with_message(m.clone()),
            None => r,
        }));
    }
    rules
}

fn rules_for_annotation(
    type_name: &str,
    property: &str,
    annotation: &Annotation,
) -> Vec<ValidationRule> {
    let rule = |kind, value| ValidationRule::new(type_name, property, kind, value);
    let positional: Vec<&str> = annotation.positional().collect();
    let length = |text: Option<&str>| text.and_then(length_arg);

    match annotation.name.as_str() {
        "Required" => vec![rule(RuleKind::Required, Value::Bool(true))],
        "StringLength" => {
            let mut out = Vec::new();
            if let Some(min) = length(annotation.named_arg("MinimumLength")) {
                out.push(rule(RuleKind::MinLength, json!(min)));
            }
            if let Some(max) = length(positional.first().copied()) {
                out.push(rule(RuleKind::MaxLength, json!(max)));
            }
            out
        }
        "MinLength" => length(positional.first().copied())
            .map(|n| rule(RuleKind::MinLength, json!(n)))
            .into_iter()
            .collect(),
        "MaxLength" => length(positional.first().copied())
            .map(|n| rule(RuleKind::MaxLength, json!(n)))
            .into_iter()
            .collect(),
        "Length" => match (length(positional.first().copied()), length(positional.get(1).copied())) {
            (Some(min), Some(max)) => vec![
                rule(RuleKind::MinLength, json!(min)),
                rule(RuleKind::MaxLength, json!(max)),
            ],
            _ => Vec::new(),
        },
        "Range" => {
            // Range(typeof(decimal), "0.01", "999.99") carries its bounds as strings
            let bounds: Vec<&str> = positional
                .iter()
                .copied()
                .filter(|p| !p.trim_start().starts_with("typeof"))
                .collect();
            let (Some(min), Some(max)) = (
                bounds.first().and_then(|b| range_bound(b)),
                bounds.get(1).and_then(|b| range_bound(b)),
            ) else {
                return Vec::new();
            };
            let exclusive = |name| {
                annotation
                    .named_arg(name)
                    .and_then(bool_literal)
                    .unwrap_or(false)
            };
            vec![
                rule(RuleKind::Minimum, json!(min))
                    .with_metadata("inclusive", Value::Bool(!exclusive("MinimumIsExclusive"))),
                rule(RuleKind::Maximum, json!(max))
                    .with_metadata("inclusive", Value::Bool(!exclusive("MaximumIsExclusive"))),
            ]
        }
        "EmailAddress" => vec![rule(RuleKind::Email, Value::Bool(true))],
        "RegularExpression" => positional
            .first()
            .and_then(|p| string_literal(p))
            .map(|p| rule(RuleKind::Pattern, Value::String(p)))
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

fn length_arg(text: &str) -> Option<u64> {
    let n = number_literal(text)?;
    (n >= 0.0 && n.fract() == 0.0).then_some(n as u64)
}

fn range_bound(text: &str) -> Option<f64> {
    number_literal(text).or_else(|| string_literal(text).and_then(|s| number_literal(&s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clientgen_ir::AnnotationArg;

    fn annotation(name: &str, args: &[(Option<&str>, &str)]) -> Annotation {
        Annotation {
            name: name.to_string(),
            type_args: vec![],
            arguments: args
                .iter()
                .map(|(n, v)| AnnotationArg {
                    name: n.map(str::to_string),
                    value: v.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_string_length_with_minimum() {
        let rules = rules_from_annotations(
            "CreateUserRequest",
            "Name",
            &[annotation(
                "StringLength",
                &[(None, "100"), (Some("MinimumLength"), "2")],
            )],
        );
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].kind, RuleKind::MinLength);
        assert_eq!(rules[0].value, json!(2));
        assert_eq!(rules[1].kind, RuleKind::MaxLength);
        assert_eq!(rules[1].value, json!(100));
    }

    #[test]
    fn test_range_forms() {
        let rules = rules_from_annotations("T", "Age", &[annotation("Range", &[(None, "1"), (None, "10")])]);
        assert_eq!(rules.len(), 2);
        assert!(rules.iter().all(|r| r.is_inclusive()));

        let rules = rules_from_annotations(
            "T",
            "Price",
            &[annotation(
                "Range",
                &[
                    (None, "typeof(decimal)"),
                    (None, "\"0.01\""),
                    (None, "\"999.99\""),
                    (Some("MinimumIsExclusive"), "true"),
                ],
            )],
        );
        assert_eq!(rules[0].value, json!(0.01));
        assert!(!rules[0].is_inclusive());
        assert!(rules[1].is_inclusive());
    }

    #[test]
    fn test_error_message_applies() {
        let rules = rules_from_annotations(
            "T",
            "Email",
            &[
                annotation("Required", &[(Some("ErrorMessage"), "\"Email is required\"")]),
                annotation("EmailAddress", &[]),
            ],
        );
        assert_eq!(rules[0].message.as_deref(), Some("Email is required"));
        assert_eq!(rules[1].kind, RuleKind::Email);
        assert_eq!(rules[1].message, None);
    }

    #[test]
    fn test_unrelated_annotations_ignored() {
        let rules = rules_from_annotations(
            "T",
            "Name",
            &[
                annotation("JsonPropertyName", &[(None, "\"name\"")]),
                annotation("MaxLength", &[(None, "Limits.Name")]),
            ],
        );
        assert!(rules.is_empty());
    }
}
