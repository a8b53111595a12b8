//! Target-side names.

use clientgen_ir::HttpVerb;
use heck::{ToKebabCase, ToLowerCamelCase, ToUpperCamelCase};

const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with", "yield", "let", "static",
    "implements", "interface", "package", "private", "protected", "public", "await",
];

/// Client function name: camel-cased verb + operation, unless the operation
/// already starts with the verb (`GetUser` + GET → `getUser`).
pub fn function_name(verb: HttpVerb, operation: &str) -> String {
    let prefix = verb.pascal();
    let prefixed = operation
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        && operation[prefix.len()..]
            .chars()
            .next()
            .is_none_or(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    let joined = if prefixed {
        operation.to_string()
    } else {
        format!("{}{}", prefix, operation)
    };
    joined.to_lower_camel_case()
}

/// File stem for a type or group (`CreateUserRequest` → `create-user-request`).
pub fn file_stem(name: &str) -> String {
    name.to_kebab_case()
}

/// Binding name for a client function (`getUser` → `useGetUser`).
pub fn hook_name(function: &str) -> String {
    format!("use{}", function.to_upper_camel_case())
}

/// zod schema constant for a type (`CreateUserRequest` → `createUserRequestSchema`).
pub fn schema_name(type_name: &str) -> String {
    format!("{}Schema", type_name.to_lower_camel_case())
}

/// A local identifier for a wire name (`X-Tenant` → `xTenant`).
pub fn identifier(name: &str) -> String {
    let ident = name.to_lower_camel_case();
    let ident = if ident.starts_with(|c: char| c.is_ascii_digit()) || ident.is_empty() {
        format!("_{}", ident)
    } else {
        ident
    };
    if RESERVED.contains(&ident.as_str()) {
        format!("{}_", ident)
    } else {
        ident
    }
}

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Object key, quoted only when needed.
pub fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

/// Single-quoted string literal.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_name() {
        assert_eq!(function_name(HttpVerb::Get, "GetUser"), "getUser");
        assert_eq!(function_name(HttpVerb::Post, "Create"), "postCreate");
        assert_eq!(function_name(HttpVerb::Delete, "DeleteOrder"), "deleteOrder");
        assert_eq!(function_name(HttpVerb::Get, "Getaway"), "getGetaway");
        assert_eq!(function_name(HttpVerb::Get, "ApiUsersById"), "getApiUsersById");
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(identifier("X-Tenant"), "xTenant");
        assert_eq!(identifier("delete"), "delete_");
        assert_eq!(identifier("Id"), "id");
        assert_eq!(property_key("x-tenant"), "'x-tenant'");
        assert_eq!(property_key("search"), "search");
    }

    #[test]
    fn test_names() {
        assert_eq!(file_stem("CreateUserRequest"), "create-user-request");
        assert_eq!(hook_name("getUser"), "useGetUser");
        assert_eq!(schema_name("CreateUserRequest"), "createUserRequestSchema");
        assert_eq!(quote("it's"), "'it\\'s'");
    }
}
