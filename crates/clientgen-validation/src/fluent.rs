//! Fluent validator chains.

use clientgen_ir::literal::{number_literal, string_literal};
use clientgen_ir::{ChainCall, RuleKind, ValidationRule};
use serde_json::{Value, json};

/// Read every `RuleFor(...)` segment of a flattened validator chain.
///
/// Calls before the first selection, and the whole of a `RuleForEach`
/// segment, are ignored. Rules come back in discovery order.
pub fn extract_chain_rules(type_name: &str, calls: &[ChainCall]) -> Vec<ValidationRule> {
    let mut rules = Vec::new();
    let mut index = 0;
    while index < calls.len() {
        if !is_selection(&calls[index].name) {
            index += 1;
            continue;
        }
        let end = calls[index + 1..]
            .iter()
            .position(|c| is_selection(&c.name))
            .map_or(calls.len(), |p| index + 1 + p);
        if calls[index].name == "RuleFor" {
            if let Some(property) = calls[index].arg(0).and_then(selected_property) {
                rules.extend(extract_property_rules(
                    type_name,
                    &property,
                    &calls[index + 1..end],
                ));
            }
        }
        index = end;
    }
    rules
}

fn is_selection(name: &str) -> bool {
    matches!(name, "RuleFor" | "RuleForEach" | "RuleSet")
}

/// Rules for one property from the calls chained after its selection.
///
/// `WithMessage` attaches to the most recent rule of the segment.
pub fn extract_property_rules(
    type_name: &str,
    property: &str,
    calls: &[ChainCall],
) -> Vec<ValidationRule> {
    let mut rules: Vec<ValidationRule> = Vec::new();
    for call in calls {
        if call.name == "WithMessage" {
            let message = call.arg(0).and_then(string_literal);
            if let (Some(message), Some(last)) = (message, rules.pop()) {
                rules.push(last.with_message(message));
            }
            continue;
        }
        rules.extend(rules_for_call(type_name, property, call));
    }
    rules
}

fn rules_for_call(type_name: &str, property: &str, call: &ChainCall) -> Vec<ValidationRule> {
    let rule = |kind, value| ValidationRule::new(type_name, property, kind, value);
    let length = |i: usize| call.arg(i).and_then(length_arg);
    let number = |i: usize| call.arg(i).and_then(number_literal);
    let bound = |kind, value: f64, inclusive: bool| {
        rule(kind, json!(value)).with_metadata("inclusive", Value::Bool(inclusive))
    };

    match call.name.as_str() {
        "NotEmpty" | "NotNull" => vec![rule(RuleKind::Required, Value::Bool(true))],
        "MinimumLength" => length(0)
            .map(|n| rule(RuleKind::MinLength, json!(n)))
            .into_iter()
            .collect(),
        "MaximumLength" => length(0)
            .map(|n| rule(RuleKind::MaxLength, json!(n)))
            .into_iter()
            .collect(),
        "Length" => match (length(0), length(1)) {
            (Some(min), Some(max)) => vec![
                rule(RuleKind::MinLength, json!(min)),
                rule(RuleKind::MaxLength, json!(max)),
            ],
            (Some(exact), None) if call.args.len() == 1 => vec![
                rule(RuleKind::MinLength, json!(exact)),
                rule(RuleKind::MaxLength, json!(exact)),
            ],
            _ => Vec::new(),
        },
        "GreaterThan" => number(0)
            .map(|n| bound(RuleKind::Minimum, n, false))
            .into_iter()
            .collect(),
        "GreaterThanOrEqualTo" => number(0)
            .map(|n| bound(RuleKind::Minimum, n, true))
            .into_iter()
            .collect(),
        "LessThan" => number(0)
            .map(|n| bound(RuleKind::Maximum, n, false))
            .into_iter()
            .collect(),
        "LessThanOrEqualTo" => number(0)
            .map(|n| bound(RuleKind::Maximum, n, true))
            .into_iter()
            .collect(),
        "InclusiveBetween" | "ExclusiveBetween" => {
            let inclusive = call.name == "InclusiveBetween";
            match (number(0), number(1)) {
                (Some(min), Some(max)) => vec![
                    bound(RuleKind::Minimum, min, inclusive),
                    bound(RuleKind::Maximum, max, inclusive),
                ],
                _ => Vec::new(),
            }
        }
        "EmailAddress" => vec![rule(RuleKind::Email, Value::Bool(true))],
        "Matches" => call
            .arg(0)
            .and_then(string_literal)
            .map(|p| rule(RuleKind::Pattern, Value::String(p)))
            .into_iter()
            .collect(),
        "Must" | "MustAsync" | "Custom" | "CustomAsync" => {
            vec![rule(RuleKind::Custom, Value::String(call.name.clone()))]
        }
        _ => Vec::new(),
    }
}

fn length_arg(text: &str) -> Option<u64> {
    let n = number_literal(text)?;
    (n >= 0.0 && n.fract() == 0.0).then_some(n as u64)
}

/// The member selected by a property lambda: `x => x.Email` → `Email`.
///
/// Nested selections keep their path (`x => x.Address.Street`). Anything that
/// is not a simple member lambda yields `None`.
pub fn selected_property(lambda: &str) -> Option<String> {
    let (param, body) = lambda.split_once("=>")?;
    let param = param.trim().trim_start_matches('(').trim_end_matches(')').trim();
    let body = body.trim();
    let path = body.strip_prefix(param)?.strip_prefix('.')?;
    let valid = !path.is_empty()
        && path
            .split('.')
            .all(|seg| !seg.is_empty() && seg.chars().all(|c| c.is_alphanumeric() || c == '_'));
    valid.then(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[&str]) -> ChainCall {
        ChainCall::new(name, args)
    }

    #[test]
    fn test_email_chain_three_rules_in_order() {
        let calls = [
            call("RuleFor", &["x => x.Email"]),
            call("NotEmpty", &[]),
            call("MaximumLength", &["100"]),
            call("EmailAddress", &[]),
        ];
        let rules = extract_chain_rules("CreateUserRequest", &calls);
        let kinds: Vec<RuleKind> = rules.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![RuleKind::Required, RuleKind::MaxLength, RuleKind::Email]
        );
        assert!(rules.iter().all(|r| r.property == "Email"));
        assert!(rules.iter().all(|r| r.type_name == "CreateUserRequest"));
        assert_eq!(rules[1].value, json!(100));
    }

    #[test]
    fn test_segments_split_at_selection() {
        let calls = [
            call("RuleFor", &["x => x.Name"]),
            call("NotEmpty", &[]),
            call("RuleFor", &["x => x.Age"]),
            call("InclusiveBetween", &["18", "120"]),
            call("RuleForEach", &["x => x.Tags"]),
            call("NotEmpty", &[]),
        ];
        let rules = extract_chain_rules("T", &calls);
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].property, "Name");
        assert_eq!(rules[1].property, "Age");
        assert_eq!(rules[1].kind, RuleKind::Minimum);
        assert!(rules[1].is_inclusive());
        assert_eq!(rules[2].kind, RuleKind::Maximum);
    }

    #[test]
    fn test_exact_length_yields_min_and_max() {
        let rules = extract_property_rules("T", "Code", &[call("Length", &["6"])]);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].kind, RuleKind::MinLength);
        assert_eq!(rules[1].kind, RuleKind::MaxLength);
        assert_eq!(rules[0].value, json!(6));
        assert_eq!(rules[1].value, json!(6));
    }

    #[test]
    fn test_exclusive_bounds() {
        let rules = extract_property_rules("T", "Price", &[call("GreaterThan", &["0"])]);
        assert_eq!(rules.len(), 1);
        assert!(!rules[0].is_inclusive());
        let rules = extract_property_rules("T", "Price", &[call("ExclusiveBetween", &["1", "5"])]);
        assert!(rules.iter().all(|r| !r.is_inclusive()));
    }

    #[test]
    fn test_message_attaches_to_last_rule() {
        let rules = extract_property_rules(
            "T",
            "Name",
            &[
                call("NotEmpty", &[]),
                call("MaximumLength", &["50"]),
                call("WithMessage", &["\"Too long\""]),
            ],
        );
        assert_eq!(rules[0].message, None);
        assert_eq!(rules[1].message.as_deref(), Some("Too long"));
    }

    #[test]
    fn test_unparseable_arguments_yield_nothing() {
        let rules = extract_property_rules(
            "T",
            "End",
            &[
                call("GreaterThan", &["x => x.Start"]),
                call("MaximumLength", &["Limits.Name"]),
                call("WithMessage", &["\"ignored\""]),
                call("When", &["x => x.Flag"]),
            ],
        );
        assert!(rules.is_empty());
        assert!(extract_chain_rules("T", &[call("RuleFor", &["GetName()"])]).is_empty());
    }

    #[test]
    fn test_custom_and_pattern() {
        let rules = extract_property_rules(
            "T",
            "Slug",
            &[
                call("Matches", &[r#"@"^[a-z-]+$""#]),
                call("Must", &["BeUnique"]),
            ],
        );
        assert_eq!(rules[0].kind, RuleKind::Pattern);
        assert_eq!(rules[0].value, json!("^[a-z-]+$"));
        assert_eq!(rules[1].kind, RuleKind::Custom);
    }

    #[test]
    fn test_selected_property() {
        assert_eq!(selected_property("x => x.Email").as_deref(), Some("Email"));
        assert_eq!(selected_property("(c) => c.Address.Street").as_deref(), Some("Address.Street"));
        assert_eq!(selected_property("x => y.Email"), None);
        assert_eq!(selected_property("x => x.Items.Count()"), None);
        assert_eq!(selected_property("Email"), None);
    }
}
