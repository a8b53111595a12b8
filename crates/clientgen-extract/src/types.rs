//! Wire-contract type discovery.
//!
//! Structured types are included by naming convention only, which keeps
//! persistence entities out of the client. Anything left out that an
//! exported endpoint still references is pulled back in at assembly.

use crate::syntax::{ContainerDecl, ContainerKind, ParamDecl, PropertyDecl, SourceFile, annotation};
use clientgen_ir::literal::string_literal;
use clientgen_ir::{PropertyInfo, TypeInfo};
use heck::ToLowerCamelCase;

/// Name suffixes of structured types that belong to the wire contract.
pub const CONTRACT_SUFFIXES: &[&str] = &[
    "Request",
    "Response",
    "Command",
    "Query",
    "Dto",
    "DTO",
    "ViewModel",
    "Model",
];

pub fn is_contract_name(name: &str) -> bool {
    CONTRACT_SUFFIXES.iter().any(|s| name.ends_with(s))
}

#[derive(Debug, Clone, Default)]
pub struct DiscoveredTypes {
    /// Allow-listed structured types and every enum.
    pub included: Vec<TypeInfo>,
    /// Structured types that failed the allow-list.
    pub unlisted: Vec<TypeInfo>,
}

pub fn discover_types(file: &SourceFile) -> DiscoveredTypes {
    let mut found = DiscoveredTypes {
        included: file.enums.clone(),
        unlisted: Vec::new(),
    };
    for container in &file.containers {
        if !is_data_shape(container) {
            continue;
        }
        let def = definition(container);
        if is_contract_name(&container.name) {
            found.included.push(def);
        } else if !def.properties.is_empty() {
            found.unlisted.push(def);
        }
    }
    found
}

/// Classes, records and structs that are not service plumbing.
fn is_data_shape(container: &ContainerDecl) -> bool {
    if container.kind == ContainerKind::Interface || container.has_modifier("static") {
        return false;
    }
    let plumbing_base = container.bases.iter().any(|b| {
        matches!(
            b.name.as_str(),
            "AbstractValidator" | "ControllerBase" | "Controller" | "DbContext" | "Hub"
        )
    });
    let plumbing_name = ["Controller", "Endpoints", "Validator", "Handler"]
        .iter()
        .any(|s| container.name.ends_with(s));
    !plumbing_base && !plumbing_name
}

fn definition(container: &ContainerDecl) -> TypeInfo {
    let positional = container.record_params.iter().map(positional_property);
    let declared = container
        .properties
        .iter()
        .filter(|p| p.has_modifier("public") && !p.has_modifier("static"))
        .map(declared_property);
    let properties = positional
        .chain(declared)
        .filter(|p| annotation(&p.annotations, "JsonIgnore").is_none())
        .collect();

    TypeInfo::definition(
        &container.name,
        container.namespace.clone(),
        container
            .type_params
            .iter()
            .map(|t| TypeInfo::reference(t))
            .collect(),
        properties,
        container.summary.clone(),
    )
}

fn positional_property(param: &ParamDecl) -> PropertyInfo {
    PropertyInfo {
        name: param.name.clone(),
        json_name: json_name(&param.attributes, &param.name),
        type_info: param.type_info.clone(),
        is_nullable: param.type_info.is_nullable,
        is_required: !param.type_info.is_nullable && !param.has_default
            || annotation(&param.attributes, "Required").is_some(),
        annotations: param.attributes.clone(),
        summary: None,
    }
}

fn declared_property(prop: &PropertyDecl) -> PropertyInfo {
    PropertyInfo {
        name: prop.name.clone(),
        json_name: json_name(&prop.attributes, &prop.name),
        type_info: prop.type_info.clone(),
        is_nullable: prop.type_info.is_nullable,
        is_required: prop.has_modifier("required")
            || annotation(&prop.attributes, "Required").is_some(),
        annotations: prop.attributes.clone(),
        summary: prop.summary.clone(),
    }
}

/// `[JsonPropertyName("...")]`, else the camel-cased member name.
fn json_name(attributes: &[clientgen_ir::Annotation], name: &str) -> String {
    annotation(attributes, "JsonPropertyName")
        .and_then(|a| a.positional().next())
        .and_then(string_literal)
        .unwrap_or_else(|| name.to_lower_camel_case())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_source;

    #[test]
    fn test_allow_list() {
        let file = parse_source(
            None,
            r#"
public class CreateUserRequest { public string Email { get; set; } }
public record UserDto(Guid Id, string Name);
public class User { public Guid Id { get; set; } }
public class UsersController : ControllerBase {}
public class CreateUserValidator : AbstractValidator<CreateUserRequest> {}
public interface IUserResponse { string Name { get; } }
public enum Role { Admin, Member }
"#,
        )
        .unwrap();
        let found = discover_types(&file);
        let included: Vec<&str> = found.included.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(included, vec!["Role", "CreateUserRequest", "UserDto"]);
        let unlisted: Vec<&str> = found.unlisted.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(unlisted, vec!["User"]);
    }

    #[test]
    fn test_properties() {
        let file = parse_source(
            None,
            r#"
namespace Shop;

/// <summary>A page of results.</summary>
public class PagedResponse<T>
{
    public required List<T> Items { get; init; }
    [JsonPropertyName("total_count")]
    public int TotalCount { get; set; }
    public string? NextCursor { get; set; }
    [JsonIgnore]
    public string Internal { get; set; }
    private int hidden { get; set; }
    public static int Max { get; } = 100;
}
"#,
        )
        .unwrap();
        let found = discover_types(&file);
        let page = &found.included[0];
        assert_eq!(page.name, "PagedResponse");
        assert_eq!(page.full_name, "Shop.PagedResponse<T>");
        assert_eq!(page.type_parameter_names(), vec!["T"]);
        assert_eq!(page.summary.as_deref(), Some("A page of results."));

        let names: Vec<&str> = page.properties.iter().map(|p| p.json_name.as_str()).collect();
        assert_eq!(names, vec!["items", "total_count", "nextCursor"]);
        assert!(page.properties[0].is_required);
        assert!(!page.properties[1].is_required);
        assert!(page.properties[2].is_nullable);
    }

    #[test]
    fn test_record_positional_properties() {
        let file = parse_source(
            None,
            "public record CreateOrderCommand(Guid CustomerId, string? Note = null);",
        )
        .unwrap();
        let found = discover_types(&file);
        let props = &found.included[0].properties;
        assert_eq!(props[0].json_name, "customerId");
        assert!(props[0].is_required);
        assert!(!props[1].is_required);
    }
}
