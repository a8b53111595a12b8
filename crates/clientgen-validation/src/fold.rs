//! Fine-grained rules → one fixed-shape record per property.

use clientgen_ir::{PropertyValidationRules, RuleKind, ValidationRule};

/// Collapse rules into per-property records, in first-seen order.
///
/// Repeated bounds keep the stricter value. Rules the fixed shape cannot hold
/// (custom predicates, a second pattern) are returned as extras.
pub fn fold_rules(
    rules: impl IntoIterator<Item = ValidationRule>,
) -> (Vec<PropertyValidationRules>, Vec<ValidationRule>) {
    let mut folded: Vec<PropertyValidationRules> = Vec::new();
    let mut extras = Vec::new();

    for rule in rules {
        let index = match folded
            .iter()
            .position(|r| r.type_name == rule.type_name && r.property == rule.property)
        {
            Some(i) => i,
            None => {
                folded.push(PropertyValidationRules {
                    type_name: rule.type_name.clone(),
                    property: rule.property.clone(),
                    ..Default::default()
                });
                folded.len() - 1
            }
        };
        let target = &mut folded[index];

        let fitted = match rule.kind {
            RuleKind::Required => {
                target.required = true;
                true
            }
            RuleKind::MinLength => match rule.value.as_u64() {
                Some(n) => {
                    target.min_length = Some(target.min_length.map_or(n, |m| m.max(n)));
                    true
                }
                None => false,
            },
            RuleKind::MaxLength => match rule.value.as_u64() {
                Some(n) => {
                    target.max_length = Some(target.max_length.map_or(n, |m| m.min(n)));
                    true
                }
                None => false,
            },
            RuleKind::Minimum => match rule.value.as_f64() {
                Some(n) if target.minimum.is_none_or(|m| n >= m) => {
                    target.minimum = Some(n);
                    target.minimum_exclusive = !rule.is_inclusive();
                    true
                }
                Some(_) => true,
                None => false,
            },
            RuleKind::Maximum => match rule.value.as_f64() {
                Some(n) if target.maximum.is_none_or(|m| n <= m) => {
                    target.maximum = Some(n);
                    target.maximum_exclusive = !rule.is_inclusive();
                    true
                }
                Some(_) => true,
                None => false,
            },
            RuleKind::Email => {
                target.email = true;
                true
            }
            RuleKind::Pattern => match (&target.pattern, rule.value.as_str()) {
                (None, Some(p)) => {
                    target.pattern = Some(p.to_string());
                    true
                }
                _ => false,
            },
            RuleKind::Custom => false,
        };

        if fitted {
            if target.message.is_none() {
                target.message = rule.message;
            }
        } else {
            extras.push(rule);
        }
    }

    (folded, extras)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn rule(property: &str, kind: RuleKind, value: Value) -> ValidationRule {
        ValidationRule::new("T", property, kind, value)
    }

    #[test]
    fn test_fold_groups_by_property() {
        let (folded, extras) = fold_rules([
            rule("Email", RuleKind::Required, json!(true)),
            rule("Name", RuleKind::MaxLength, json!(50)),
            rule("Email", RuleKind::MaxLength, json!(100)),
            rule("Email", RuleKind::Email, json!(true)),
        ]);
        assert!(extras.is_empty());
        assert_eq!(folded.len(), 2);
        assert_eq!(folded[0].property, "Email");
        assert!(folded[0].required);
        assert!(folded[0].email);
        assert_eq!(folded[0].max_length, Some(100));
        assert_eq!(folded[1].max_length, Some(50));
    }

    #[test]
    fn test_stricter_bounds_win() {
        let (folded, _) = fold_rules([
            rule("Name", RuleKind::MaxLength, json!(100)),
            rule("Name", RuleKind::MaxLength, json!(40)),
            rule("Name", RuleKind::MinLength, json!(1)),
            rule("Name", RuleKind::MinLength, json!(3)),
        ]);
        assert_eq!(folded[0].max_length, Some(40));
        assert_eq!(folded[0].min_length, Some(3));
    }

    #[test]
    fn test_exclusive_flags() {
        let (folded, _) = fold_rules([rule("Price", RuleKind::Minimum, json!(0.0))
            .with_metadata("inclusive", Value::Bool(false))]);
        assert_eq!(folded[0].minimum, Some(0.0));
        assert!(folded[0].minimum_exclusive);
    }

    #[test]
    fn test_extras_keep_what_does_not_fit() {
        let (folded, extras) = fold_rules([
            rule("Slug", RuleKind::Pattern, json!("^[a-z]+$")),
            rule("Slug", RuleKind::Pattern, json!("^.{3,}$")),
            rule("Slug", RuleKind::Custom, json!("Must")),
        ]);
        assert_eq!(folded[0].pattern.as_deref(), Some("^[a-z]+$"));
        assert_eq!(extras.len(), 2);
        assert_eq!(extras[1].kind, RuleKind::Custom);
    }

    #[test]
    fn test_first_message_wins() {
        let (folded, _) = fold_rules([
            rule("Name", RuleKind::Required, json!(true)).with_message("Name is required"),
            rule("Name", RuleKind::MaxLength, json!(10)).with_message("Too long"),
        ]);
        assert_eq!(folded[0].message.as_deref(), Some("Name is required"));
    }
}
