//! Type references and definitions.

use crate::typestr::{split_generic, split_generic_args, split_qualified, truncate_unbalanced};
use serde::{Deserialize, Serialize};

/// Base names treated as ordered collections (`List<T>` → `T[]`).
pub const COLLECTION_BASES: &[&str] = &[
    "Array",
    "List",
    "IList",
    "IEnumerable",
    "ICollection",
    "IReadOnlyList",
    "IReadOnlyCollection",
    "Collection",
    "ReadOnlyCollection",
    "ImmutableArray",
    "ImmutableList",
    "IImmutableList",
    "IAsyncEnumerable",
    "IQueryable",
    "LinkedList",
    "Queue",
    "Stack",
];

/// A type reference, or a type definition when `properties`/`enum_members`
/// are populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeInfo {
    /// Simple name without namespace or generic arguments (`List`).
    pub name: String,
    /// Namespace-qualified display form (`System.Collections.Generic.List<int>`).
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub is_generic: bool,
    /// Ordered; key/value position matters for maps.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_args: Vec<TypeInfo>,
    #[serde(default)]
    pub is_collection: bool,
    #[serde(default)]
    pub is_nullable: bool,
    #[serde(default)]
    pub is_enum: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_members: Vec<EnumMember>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl TypeInfo {
    /// A plain reference, possibly namespace-qualified (`System.Guid`).
    pub fn reference(name: &str) -> Self {
        let name = name.trim().trim_start_matches("global::");
        let (namespace, simple) = split_qualified(name);
        Self {
            name: simple.to_string(),
            full_name: name.to_string(),
            namespace: namespace.map(str::to_string),
            is_generic: false,
            generic_args: Vec::new(),
            is_collection: COLLECTION_BASES.contains(&simple),
            is_nullable: false,
            is_enum: false,
            enum_members: Vec::new(),
            properties: Vec::new(),
            summary: None,
        }
    }

    /// A generic application `name<args>`.
    pub fn generic(name: &str, args: Vec<TypeInfo>) -> Self {
        let base = Self::reference(name);
        let rendered: Vec<&str> = args.iter().map(|a| a.full_name.as_str()).collect();
        let full_name = format!("{}<{}>", base.full_name, rendered.join(", "));
        Self {
            full_name,
            is_generic: !args.is_empty(),
            generic_args: args,
            ..base
        }
    }

    /// `T[]`, modelled as the collection `Array<T>`.
    pub fn array(element: TypeInfo) -> Self {
        let full_name = format!("{}[]", element.full_name);
        Self {
            name: "Array".to_string(),
            full_name,
            namespace: None,
            is_generic: true,
            generic_args: vec![element],
            is_collection: true,
            is_nullable: false,
            is_enum: false,
            enum_members: Vec::new(),
            properties: Vec::new(),
            summary: None,
        }
    }

    /// Tuple `(A, B)`, modelled as `ValueTuple<A, B>`.
    pub fn tuple(elements: Vec<TypeInfo>) -> Self {
        let rendered: Vec<&str> = elements.iter().map(|a| a.full_name.as_str()).collect();
        let full_name = format!("({})", rendered.join(", "));
        Self {
            full_name,
            ..Self::generic("ValueTuple", elements)
        }
    }

    /// Same type with the nullability flag set.
    pub fn nullable(self) -> Self {
        if self.is_nullable {
            return self;
        }
        Self {
            full_name: format!("{}?", self.full_name),
            is_nullable: true,
            ..self
        }
    }

    /// Same type marked as an enumeration.
    pub fn as_enum(self) -> Self {
        Self {
            is_enum: true,
            properties: Vec::new(),
            ..self
        }
    }

    /// A structured type definition.
    pub fn definition(
        name: &str,
        namespace: Option<String>,
        type_params: Vec<TypeInfo>,
        properties: Vec<PropertyInfo>,
        summary: Option<String>,
    ) -> Self {
        let base = if type_params.is_empty() {
            Self::reference(name)
        } else {
            Self::generic(name, type_params)
        };
        let full_name = match &namespace {
            Some(ns) => format!("{}.{}", ns, base.full_name),
            None => base.full_name.clone(),
        };
        Self {
            full_name,
            namespace,
            properties,
            summary,
            ..base
        }
    }

    /// An enum definition. Enums never carry properties.
    pub fn enumeration(
        name: &str,
        namespace: Option<String>,
        members: Vec<EnumMember>,
        summary: Option<String>,
    ) -> Self {
        let base = Self::reference(name);
        let full_name = match &namespace {
            Some(ns) => format!("{}.{}", ns, name),
            None => base.full_name.clone(),
        };
        Self {
            full_name,
            namespace,
            is_enum: true,
            enum_members: members,
            summary,
            ..base
        }
    }

    /// Synthesize a reference from a flattened display string.
    ///
    /// Used when only attribute-level text is available (`typeof(List<User>)`,
    /// `ProducesResponseType<Result<User>>`). Malformed input is truncated at
    /// its first unmatched bracket before parsing.
    pub fn from_display(display: &str) -> Self {
        let display = truncate_unbalanced(display.trim());
        let display = display.trim_start_matches("global::");
        if display.is_empty() {
            return Self::reference("object");
        }

        if let Some(inner) = display.strip_suffix('?') {
            return Self::from_display(inner).nullable();
        }

        if display.ends_with(']') {
            if let Some(open) = display.rfind('[') {
                let rank = &display[open + 1..display.len() - 1];
                if rank.chars().all(|c| c == ',' || c.is_whitespace()) {
                    return Self::array(Self::from_display(&display[..open]));
                }
            }
        }

        if display.starts_with('(') && display.ends_with(')') {
            let elements = split_generic_args(&display[1..display.len() - 1])
                .into_iter()
                .map(|element| {
                    // Named tuple elements: `(int Id, string Name)`
                    let ty = element
                        .rsplit_once(' ')
                        .filter(|(ty, _)| !ty.ends_with(',') && !ty.is_empty())
                        .map(|(ty, _)| ty)
                        .unwrap_or(element);
                    Self::from_display(ty)
                })
                .collect();
            return Self::tuple(elements);
        }

        if let Some((base, args)) = split_generic(display) {
            let args = split_generic_args(args)
                .into_iter()
                .map(Self::from_display)
                .collect();
            return Self::generic(base, args);
        }

        Self::reference(display)
    }

    /// Names of the generic parameters of a definition (`T` in `Page<T>`).
    pub fn type_parameter_names(&self) -> Vec<&str> {
        self.generic_args.iter().map(|a| a.name.as_str()).collect()
    }

    /// Whether this is a definition (vs. a bare reference).
    pub fn is_definition(&self) -> bool {
        self.is_enum || !self.properties.is_empty()
    }
}

/// One enum member with its resolved numeric value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Attribute attached to a declaration, kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Simple name with any `Attribute` suffix removed (`Required`).
    pub name: String,
    /// Type arguments of a generic attribute (`ProducesResponseType<User>`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<AnnotationArg>,
}

impl Annotation {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_args: Vec::new(),
            arguments: Vec::new(),
        }
    }

    /// Positional arguments, in order.
    pub fn positional(&self) -> impl Iterator<Item = &str> {
        self.arguments
            .iter()
            .filter(|a| a.name.is_none())
            .map(|a| a.value.as_str())
    }

    /// Value of a named argument (`Summary = "..."`), compared case-insensitively.
    pub fn named_arg(&self, name: &str) -> Option<&str> {
        self.arguments
            .iter()
            .find(|a| {
                a.name
                    .as_deref()
                    .is_some_and(|n| n.eq_ignore_ascii_case(name))
            })
            .map(|a| a.value.as_str())
    }
}

/// One attribute argument; `value` is the raw expression text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationArg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: String,
}

/// A public property of a structured type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyInfo {
    /// Declared C# name.
    pub name: String,
    /// Name on the wire.
    pub json_name: String,
    pub type_info: TypeInfo,
    pub is_nullable: bool,
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_display_generic() {
        let t = TypeInfo::from_display("Dictionary<string, List<User>>");
        assert_eq!(t.name, "Dictionary");
        assert!(t.is_generic);
        assert_eq!(t.generic_args.len(), 2);
        assert_eq!(t.generic_args[0].name, "string");
        assert_eq!(t.generic_args[1].name, "List");
        assert!(t.generic_args[1].is_collection);
        assert_eq!(t.generic_args[1].generic_args[0].name, "User");
    }

    #[test]
    fn test_from_display_nullable_and_array() {
        let t = TypeInfo::from_display("int?[]");
        assert_eq!(t.name, "Array");
        assert!(t.is_collection);
        assert!(!t.is_nullable);
        assert!(t.generic_args[0].is_nullable);

        let t = TypeInfo::from_display("string[]?");
        assert!(t.is_nullable);
        assert!(t.is_collection);
    }

    #[test]
    fn test_from_display_qualified() {
        let t = TypeInfo::from_display("global::System.Guid");
        assert_eq!(t.name, "Guid");
        assert_eq!(t.namespace.as_deref(), Some("System"));
        assert_eq!(t.full_name, "System.Guid");
    }

    #[test]
    fn test_from_display_truncates_partial() {
        let t = TypeInfo::from_display("List<User");
        assert_eq!(t.name, "List");
        assert!(!t.is_generic);
    }

    #[test]
    fn test_from_display_tuple() {
        let t = TypeInfo::from_display("(int Id, string Name)");
        assert_eq!(t.name, "ValueTuple");
        assert_eq!(t.generic_args[0].name, "int");
        assert_eq!(t.generic_args[1].name, "string");
    }

    #[test]
    fn test_annotation_args() {
        let a = Annotation {
            name: "ExportClient".into(),
            type_args: vec![],
            arguments: vec![
                AnnotationArg {
                    name: None,
                    value: "\"users\"".into(),
                },
                AnnotationArg {
                    name: Some("Summary".into()),
                    value: "\"Get a user\"".into(),
                },
            ],
        };
        assert_eq!(a.positional().collect::<Vec<_>>(), vec!["\"users\""]);
        assert_eq!(a.named_arg("summary"), Some("\"Get a user\""));
        assert_eq!(a.named_arg("Tags"), None);
    }
}
