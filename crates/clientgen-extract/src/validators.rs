//! Validation rule discovery: validator classes and property annotations.

use crate::syntax::{ContainerDecl, SourceFile};
use clientgen_ir::{TypeInfo, ValidationRule};
use clientgen_validation::{extract_chain_rules, rules_from_annotations};

const VALIDATOR_BASE: &str = "AbstractValidator";

/// The type a validator class is keyed to, from its `AbstractValidator<T>`
/// base.
pub fn validator_target(container: &ContainerDecl) -> Option<&str> {
    container
        .bases
        .iter()
        .find(|b| b.name == VALIDATOR_BASE)
        .and_then(|b| b.generic_args.first())
        .map(|t| t.name.as_str())
}

/// Rules from every validator class in a file, in declaration order.
pub fn validator_rules(file: &SourceFile) -> Vec<ValidationRule> {
    let mut rules = Vec::new();
    for container in &file.containers {
        let Some(target) = validator_target(container) else {
            continue;
        };
        let before = rules.len();
        for body in &container.constructors {
            for chain in &body.chains {
                rules.extend(extract_chain_rules(target, &chain.calls));
            }
        }
        tracing::debug!(
            "{} -> {}: {} rules",
            container.name,
            target,
            rules.len() - before
        );
    }
    rules
}

/// Rules declared as data annotations on the properties of `types`.
pub fn annotation_rules(types: &[TypeInfo]) -> Vec<ValidationRule> {
    types
        .iter()
        .filter(|t| !t.is_enum)
        .flat_map(|t| {
            t.properties
                .iter()
                .flat_map(move |p| rules_from_annotations(&t.name, &p.name, &p.annotations))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_source;
    use crate::types::discover_types;
    use clientgen_ir::RuleKind;

    #[test]
    fn test_validator_constructor_chains() {
        let file = parse_source(
            None,
            r#"
public class CreateUserValidator : AbstractValidator<CreateUserRequest>
{
    public CreateUserValidator()
    {
        RuleFor(x => x.Email).NotEmpty().MaximumLength(100).EmailAddress();
        RuleFor(x => x.Age).InclusiveBetween(18, 130).WithMessage("Adults only");
    }
}
"#,
        )
        .unwrap();
        assert_eq!(validator_target(&file.containers[0]), Some("CreateUserRequest"));

        let rules = validator_rules(&file);
        let kinds: Vec<(&str, RuleKind)> = rules
            .iter()
            .map(|r| (r.property.as_str(), r.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("Email", RuleKind::Required),
                ("Email", RuleKind::MaxLength),
                ("Email", RuleKind::Email),
                ("Age", RuleKind::Minimum),
                ("Age", RuleKind::Maximum),
            ]
        );
        assert!(rules.iter().all(|r| r.type_name == "CreateUserRequest"));
        assert_eq!(rules[4].message.as_deref(), Some("Adults only"));
    }

    #[test]
    fn test_annotation_rules() {
        let file = parse_source(
            None,
            r#"
public class RegisterRequest
{
    [Required]
    [StringLength(50, MinimumLength = 3)]
    public string UserName { get; set; }
    public string Nickname { get; set; }
}
public enum Plan { Free, Pro }
"#,
        )
        .unwrap();
        let found = discover_types(&file);
        let rules = annotation_rules(&found.included);
        let kinds: Vec<RuleKind> = rules.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![RuleKind::Required, RuleKind::MinLength, RuleKind::MaxLength]
        );
        assert!(rules.iter().all(|r| r.property == "UserName"));
    }

    #[test]
    fn test_non_validator_ignored() {
        let file = parse_source(
            None,
            "public class Mapper { public Mapper() { RuleFor(x => x.A).NotEmpty(); } }",
        )
        .unwrap();
        assert!(validator_rules(&file).is_empty());
    }
}
