//! C# syntax tree → declaration model.
//!
//! The tree-sitter walk happens once per file here. Everything downstream
//! (strategies, type discovery, validators) works on the owned model so it can
//! be built and tested from plain values.

use crate::error::ExtractError;
use clientgen_ir::literal::integer_expression;
use clientgen_ir::{Annotation, AnnotationArg, ChainCall, EnumMember, TypeInfo};
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser};

/// Declarations of one source file.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    pub path: Option<PathBuf>,
    pub containers: Vec<ContainerDecl>,
    pub enums: Vec<TypeInfo>,
    /// Enum members whose initializer could not be evaluated.
    pub unresolved_values: Vec<UnresolvedValue>,
}

/// An enum member initializer that is not a constant this crate can fold
/// (`int.MaxValue`, a member of another enum). The member takes the previous
/// value plus one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedValue {
    pub enum_name: String,
    pub member: String,
    pub expression: String,
    pub assumed: i64,
}

impl SourceFile {
    pub fn container(&self, name: &str) -> Option<&ContainerDecl> {
        self.containers.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerKind {
    #[default]
    Class,
    Record,
    Struct,
    Interface,
}

/// A class, record, struct or interface.
#[derive(Debug, Clone, Default)]
pub struct ContainerDecl {
    pub name: String,
    pub namespace: Option<String>,
    pub kind: ContainerKind,
    pub type_params: Vec<String>,
    pub bases: Vec<TypeInfo>,
    pub attributes: Vec<Annotation>,
    pub modifiers: Vec<String>,
    pub summary: Option<String>,
    pub methods: Vec<MethodDecl>,
    pub properties: Vec<PropertyDecl>,
    /// Positional record parameters.
    pub record_params: Vec<ParamDecl>,
    pub constructors: Vec<BodyInfo>,
}

impl ContainerDecl {
    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }
}

/// A method, or a lambda lowered to the same shape (empty name).
#[derive(Debug, Clone, Default)]
pub struct MethodDecl {
    pub name: String,
    pub modifiers: Vec<String>,
    pub attributes: Vec<Annotation>,
    pub summary: Option<String>,
    pub return_type: Option<TypeInfo>,
    pub params: Vec<ParamDecl>,
    pub body: BodyInfo,
}

impl MethodDecl {
    pub fn is_lambda(&self) -> bool {
        self.name.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: String,
    pub type_info: TypeInfo,
    pub attributes: Vec<Annotation>,
    /// Extension receiver (`this IEndpointRouteBuilder app`).
    pub is_receiver: bool,
    pub has_default: bool,
}

#[derive(Debug, Clone)]
pub struct PropertyDecl {
    pub name: String,
    pub type_info: TypeInfo,
    pub attributes: Vec<Annotation>,
    pub modifiers: Vec<String>,
    pub summary: Option<String>,
}

impl PropertyDecl {
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }
}

/// Call chains found in a method or constructor body, in source order.
#[derive(Debug, Clone, Default)]
pub struct BodyInfo {
    pub chains: Vec<CallChain>,
}

/// One fluent chain, receiver-most call first.
#[derive(Debug, Clone, Default)]
pub struct CallChain {
    /// Receiver expression text (`app`, `group`, `_mediator`); empty for an
    /// unqualified call.
    pub root: String,
    /// Local the chain result is assigned to.
    pub bound_to: Option<String>,
    pub calls: Vec<ChainCall>,
    /// Lambda arguments, keyed by the index of the call that received them.
    pub lambdas: Vec<(usize, MethodDecl)>,
}

impl CallChain {
    pub fn lambda_for(&self, call_index: usize) -> Option<&MethodDecl> {
        self.lambdas
            .iter()
            .find(|(i, _)| *i == call_index)
            .map(|(_, m)| m)
    }
}

/// First annotation with the given simple name.
pub fn annotation<'a>(attributes: &'a [Annotation], name: &str) -> Option<&'a Annotation> {
    attributes.iter().find(|a| a.name == name)
}

/// Parse one file into the declaration model.
///
/// A tree with syntax errors is rejected as a whole.
pub fn parse_source(path: Option<&Path>, source: &str) -> Result<SourceFile, ExtractError> {
    let display = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("<source>"));

    let mut parser = Parser::new();
    parser
        .set_language(&arborium_c_sharp::language().into())
        .map_err(|e| ExtractError::Grammar(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ExtractError::NoTree {
            path: display.clone(),
        })?;

    let root = tree.root_node();
    if root.has_error() {
        let line = first_error(root).map_or(0, |n| n.start_position().row + 1);
        return Err(ExtractError::Syntax {
            path: display,
            line,
        });
    }

    let mut lowering = Lowering::new(source);
    let mut file = SourceFile {
        path: path.map(Path::to_path_buf),
        ..Default::default()
    };
    lowering.collect(root, None, &mut file);
    Ok(file)
}

fn first_error<'t>(node: Node<'t>) -> Option<Node<'t>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error())
        .find_map(first_error)
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    named_children(node).into_iter().find(|c| c.kind() == kind)
}

struct Lowering<'a> {
    source: &'a str,
    file_namespace: Option<String>,
}

impl<'a> Lowering<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            file_namespace: None,
        }
    }

    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn field_text(&self, node: Node, field: &str) -> &'a str {
        node.child_by_field_name(field)
            .map(|n| self.text(n))
            .unwrap_or("")
    }

    fn collect(&mut self, node: Node, namespace: Option<String>, file: &mut SourceFile) {
        for child in named_children(node) {
            match child.kind() {
                "namespace_declaration" => {
                    let inner = join_namespace(namespace.as_deref(), self.field_text(child, "name"));
                    if let Some(body) = child.child_by_field_name("body") {
                        self.collect(body, Some(inner), file);
                    }
                }
                "file_scoped_namespace_declaration" => {
                    let inner = join_namespace(namespace.as_deref(), self.field_text(child, "name"));
                    self.file_namespace = Some(inner.clone());
                    self.collect(child, Some(inner), file);
                }
                "class_declaration"
                | "record_declaration"
                | "record_struct_declaration"
                | "struct_declaration"
                | "interface_declaration" => {
                    let ns = namespace.clone().or_else(|| self.file_namespace.clone());
                    file.containers.push(self.lower_container(child, ns.clone()));
                    if let Some(body) = child.child_by_field_name("body") {
                        self.collect(body, ns, file);
                    }
                }
                "enum_declaration" => {
                    let ns = namespace.clone().or_else(|| self.file_namespace.clone());
                    let enumeration = self.lower_enum(child, ns, &mut file.unresolved_values);
                    file.enums.push(enumeration);
                }
                "declaration_list" => self.collect(child, namespace.clone(), file),
                _ => {}
            }
        }
    }

    fn lower_container(&self, node: Node, namespace: Option<String>) -> ContainerDecl {
        let kind = match node.kind() {
            "record_declaration" | "record_struct_declaration" => ContainerKind::Record,
            "struct_declaration" => ContainerKind::Struct,
            "interface_declaration" => ContainerKind::Interface,
            _ => ContainerKind::Class,
        };

        let mut decl = ContainerDecl {
            name: self.field_text(node, "name").to_string(),
            namespace,
            kind,
            type_params: self.type_params(node),
            bases: self.bases(node),
            attributes: self.attributes(node),
            modifiers: self.modifiers(node),
            summary: self.doc_summary(node),
            ..Default::default()
        };

        if kind == ContainerKind::Record {
            if let Some(list) = child_of_kind(node, "parameter_list") {
                decl.record_params = self.parameters(list);
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            for member in named_children(body) {
                match member.kind() {
                    "method_declaration" => decl.methods.push(self.lower_method(member)),
                    "property_declaration" => decl.properties.push(self.lower_property(member)),
                    "constructor_declaration" => decl.constructors.push(self.body_of(member)),
                    _ => {}
                }
            }
        }
        decl
    }

    fn lower_method(&self, node: Node) -> MethodDecl {
        MethodDecl {
            name: self.field_text(node, "name").to_string(),
            modifiers: self.modifiers(node),
            attributes: self.attributes(node),
            summary: self.doc_summary(node),
            return_type: node
                .child_by_field_name("returns")
                .or_else(|| node.child_by_field_name("type"))
                .map(|t| self.type_from_node(t)),
            params: node
                .child_by_field_name("parameters")
                .map(|p| self.parameters(p))
                .unwrap_or_default(),
            body: self.body_of(node),
        }
    }

    fn lower_lambda(&self, node: Node) -> MethodDecl {
        let params = node
            .child_by_field_name("parameters")
            .or_else(|| child_of_kind(node, "parameter_list"))
            .filter(|p| p.kind() == "parameter_list")
            .map(|p| self.parameters(p))
            .unwrap_or_default();
        let body = node
            .child_by_field_name("body")
            .or_else(|| named_children(node).into_iter().last());
        MethodDecl {
            name: String::new(),
            modifiers: self.modifiers(node),
            attributes: self.attributes(node),
            summary: None,
            return_type: None,
            params,
            body: BodyInfo {
                chains: body.map(|b| self.chains(b)).unwrap_or_default(),
            },
        }
    }

    fn body_of(&self, node: Node) -> BodyInfo {
        let body = node
            .child_by_field_name("body")
            .or_else(|| child_of_kind(node, "arrow_expression_clause"));
        BodyInfo {
            chains: body.map(|b| self.chains(b)).unwrap_or_default(),
        }
    }

    fn lower_property(&self, node: Node) -> PropertyDecl {
        PropertyDecl {
            name: self.field_text(node, "name").to_string(),
            type_info: node
                .child_by_field_name("type")
                .map(|t| self.type_from_node(t))
                .unwrap_or_else(|| TypeInfo::reference("object")),
            attributes: self.attributes(node),
            modifiers: self.modifiers(node),
            summary: self.doc_summary(node),
        }
    }

    fn lower_enum(
        &self,
        node: Node,
        namespace: Option<String>,
        unresolved: &mut Vec<UnresolvedValue>,
    ) -> TypeInfo {
        let enum_name = self.field_text(node, "name");
        let mut members: Vec<EnumMember> = Vec::new();
        let mut next = 0i64;
        if let Some(body) = node.child_by_field_name("body") {
            for member in named_children(body) {
                if member.kind() != "enum_member_declaration" {
                    continue;
                }
                let name = self.field_text(member, "name");
                let value = match member.child_by_field_name("value").map(|v| self.text(v)) {
                    None => next,
                    Some(expression) => {
                        // earlier members, bare or qualified with this enum's name
                        let lookup = |reference: &str| {
                            let simple = reference
                                .strip_prefix(enum_name)
                                .and_then(|r| r.strip_prefix('.'))
                                .unwrap_or(reference);
                            members.iter().find(|m| m.name == simple).map(|m| m.value)
                        };
                        integer_expression(expression, lookup).unwrap_or_else(|| {
                            unresolved.push(UnresolvedValue {
                                enum_name: enum_name.to_string(),
                                member: name.to_string(),
                                expression: expression.trim().to_string(),
                                assumed: next,
                            });
                            next
                        })
                    }
                };
                next = value.wrapping_add(1);
                members.push(EnumMember {
                    name: name.to_string(),
                    value,
                    summary: self.doc_summary(member),
                });
            }
        }
        TypeInfo::enumeration(enum_name, namespace, members, self.doc_summary(node))
    }

    fn parameters(&self, list: Node) -> Vec<ParamDecl> {
        named_children(list)
            .into_iter()
            .filter(|p| p.kind() == "parameter")
            .map(|p| self.lower_param(p))
            .collect()
    }

    fn lower_param(&self, node: Node) -> ParamDecl {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        ParamDecl {
            name: self.field_text(node, "name").to_string(),
            type_info: node
                .child_by_field_name("type")
                .map(|t| self.type_from_node(t))
                .unwrap_or_else(|| TypeInfo::reference("object")),
            attributes: self.attributes(node),
            is_receiver: children.iter().any(|c| self.text(*c) == "this"),
            has_default: children
                .iter()
                .any(|c| matches!(c.kind(), "equals_value_clause" | "=")),
        }
    }

    fn type_params(&self, node: Node) -> Vec<String> {
        child_of_kind(node, "type_parameter_list")
            .map(|list| {
                named_children(list)
                    .into_iter()
                    .filter(|p| p.kind() == "type_parameter")
                    .map(|p| {
                        p.child_by_field_name("name")
                            .map(|n| self.text(n))
                            .unwrap_or_else(|| self.text(p))
                            .to_string()
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn bases(&self, node: Node) -> Vec<TypeInfo> {
        child_of_kind(node, "base_list")
            .map(|list| {
                named_children(list)
                    .into_iter()
                    .map(|b| match b.kind() {
                        "identifier" | "generic_name" | "qualified_name" => self.type_from_node(b),
                        // primary-constructor bases carry an argument list
                        _ => {
                            let text = self.text(b);
                            let head = text.split('(').next().unwrap_or(text);
                            TypeInfo::from_display(head)
                        }
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn modifiers(&self, node: Node) -> Vec<String> {
        named_children(node)
            .into_iter()
            .filter(|c| c.kind() == "modifier")
            .map(|c| self.text(c).to_string())
            .collect()
    }

    fn attributes(&self, node: Node) -> Vec<Annotation> {
        named_children(node)
            .into_iter()
            .filter(|c| c.kind() == "attribute_list")
            .flat_map(named_children)
            .filter(|a| a.kind() == "attribute")
            .map(|a| self.lower_attribute(a))
            .collect()
    }

    fn lower_attribute(&self, node: Node) -> Annotation {
        let name_node = node.child_by_field_name("name").or_else(|| {
            named_children(node)
                .into_iter()
                .find(|c| c.kind() != "attribute_argument_list")
        });
        let (name, type_args) = name_node
            .map(|n| self.name_and_type_args(n))
            .unwrap_or_default();
        let name = match name.strip_suffix("Attribute") {
            Some(short) if !short.is_empty() => short.to_string(),
            _ => name,
        };
        let arguments = child_of_kind(node, "attribute_argument_list")
            .map(|list| {
                named_children(list)
                    .into_iter()
                    .filter(|a| a.kind() == "attribute_argument")
                    .map(|a| parse_attribute_argument(self.text(a)))
                    .collect()
            })
            .unwrap_or_default();
        Annotation {
            name,
            type_args,
            arguments,
        }
    }

    /// Simple name plus type argument text of a (possibly qualified or
    /// generic) name node.
    fn name_and_type_args(&self, node: Node) -> (String, Vec<String>) {
        match node.kind() {
            "generic_name" => {
                let children = named_children(node);
                let name = children
                    .iter()
                    .find(|c| c.kind() == "identifier")
                    .map(|c| self.text(*c))
                    .unwrap_or("");
                let args = children
                    .iter()
                    .find(|c| c.kind() == "type_argument_list")
                    .map(|list| {
                        named_children(*list)
                            .into_iter()
                            .map(|a| self.text(a).to_string())
                            .collect()
                    })
                    .unwrap_or_default();
                (name.to_string(), args)
            }
            "qualified_name" | "alias_qualified_name" | "member_access_expression" => {
                match node
                    .child_by_field_name("name")
                    .or_else(|| named_children(node).into_iter().last())
                {
                    Some(last) if last != node => self.name_and_type_args(last),
                    _ => (simple_name(self.text(node)), Vec::new()),
                }
            }
            _ => (simple_name(self.text(node)), Vec::new()),
        }
    }

    fn type_from_node(&self, node: Node) -> TypeInfo {
        match node.kind() {
            "nullable_type" => match named_children(node).first() {
                Some(inner) => self.type_from_node(*inner).nullable(),
                None => TypeInfo::from_display(self.text(node)),
            },
            "array_type" => {
                let element = node
                    .child_by_field_name("type")
                    .or_else(|| named_children(node).into_iter().next());
                match element {
                    Some(element) => TypeInfo::array(self.type_from_node(element)),
                    None => TypeInfo::from_display(self.text(node)),
                }
            }
            "generic_name" => {
                let (name, _) = self.name_and_type_args(node);
                let args = child_of_kind(node, "type_argument_list")
                    .map(|list| {
                        named_children(list)
                            .into_iter()
                            .map(|a| self.type_from_node(a))
                            .collect()
                    })
                    .unwrap_or_default();
                TypeInfo::generic(&name, args)
            }
            "tuple_type" => {
                let elements = named_children(node)
                    .into_iter()
                    .filter(|e| e.kind() == "tuple_element")
                    .map(|e| match e.child_by_field_name("type") {
                        Some(t) => self.type_from_node(t),
                        None => TypeInfo::from_display(self.text(e)),
                    })
                    .collect();
                TypeInfo::tuple(elements)
            }
            "predefined_type" | "identifier" => TypeInfo::reference(self.text(node)),
            _ => TypeInfo::from_display(self.text(node)),
        }
    }

    /// `///` comment block directly above a declaration, reduced to the text
    /// of its `<summary>` element.
    fn doc_summary(&self, node: Node) -> Option<String> {
        let mut lines = Vec::new();
        let mut prev = node.prev_sibling();
        while let Some(sibling) = prev {
            if sibling.kind() != "comment" {
                break;
            }
            let Some(line) = self.text(sibling).strip_prefix("///") else {
                break;
            };
            lines.push(line.trim());
            prev = sibling.prev_sibling();
        }
        if lines.is_empty() {
            return None;
        }
        lines.reverse();
        let doc = lines.join("\n");
        let summary = match (doc.find("<summary>"), doc.find("</summary>")) {
            (Some(start), Some(end)) if end > start => &doc[start + "<summary>".len()..end],
            _ => doc.as_str(),
        };
        let clean = strip_xml_tags(summary);
        let clean = clean.split_whitespace().collect::<Vec<_>>().join(" ");
        (!clean.is_empty()).then_some(clean)
    }

    fn chains(&self, scope: Node) -> Vec<CallChain> {
        let mut out = Vec::new();
        self.visit_invocations(scope, &mut out);
        out
    }

    fn visit_invocations(&self, node: Node, out: &mut Vec<CallChain>) {
        if node.kind() == "invocation_expression" && !is_chain_link(node) {
            out.push(self.lower_chain(node));
        }
        for child in named_children(node) {
            self.visit_invocations(child, out);
        }
    }

    fn lower_chain(&self, outermost: Node) -> CallChain {
        let mut calls = Vec::new();
        let mut lambdas = Vec::new();
        let mut current = outermost;
        let root = loop {
            if current.kind() != "invocation_expression" {
                break self.text(current).to_string();
            }
            let Some(function) = current.child_by_field_name("function") else {
                break String::new();
            };
            let (target, name_node) = if function.kind() == "member_access_expression" {
                (
                    function.child_by_field_name("expression"),
                    function.child_by_field_name("name"),
                )
            } else {
                (None, Some(function))
            };
            let (name, type_args) = name_node
                .map(|n| self.name_and_type_args(n))
                .unwrap_or_default();
            let (args, lambda) = current
                .child_by_field_name("arguments")
                .map(|a| self.arguments(a))
                .unwrap_or_default();
            calls.push(ChainCall {
                name,
                type_args,
                args,
            });
            lambdas.push(lambda);
            match target {
                Some(target) => current = target,
                None => break String::new(),
            }
        };
        calls.reverse();
        lambdas.reverse();
        CallChain {
            root,
            bound_to: self.binding_name(outermost),
            calls,
            lambdas: lambdas
                .into_iter()
                .enumerate()
                .filter_map(|(i, l)| l.map(|l| (i, l)))
                .collect(),
        }
    }

    /// Argument texts, plus the last lambda argument lowered to a method.
    fn arguments(&self, list: Node) -> (Vec<String>, Option<MethodDecl>) {
        let mut texts = Vec::new();
        let mut lambda = None;
        for arg in named_children(list) {
            if arg.kind() != "argument" {
                continue;
            }
            texts.push(self.text(arg).trim().to_string());
            if let Some(expr) = named_children(arg).into_iter().last() {
                if expr.kind().ends_with("lambda_expression") {
                    lambda = Some(self.lower_lambda(expr));
                }
            }
        }
        (texts, lambda)
    }

    fn binding_name(&self, node: Node) -> Option<String> {
        let mut current = node;
        while let Some(parent) = current.parent() {
            match parent.kind() {
                "await_expression" | "parenthesized_expression" | "equals_value_clause" => {
                    current = parent;
                }
                "variable_declarator" => {
                    return parent
                        .child_by_field_name("name")
                        .or_else(|| child_of_kind(parent, "identifier"))
                        .map(|n| self.text(n).to_string());
                }
                "assignment_expression" => {
                    return parent
                        .child_by_field_name("left")
                        .map(|n| self.text(n).to_string());
                }
                _ => return None,
            }
        }
        None
    }
}

/// The invocation is the receiver of a longer chain.
fn is_chain_link(node: Node) -> bool {
    node.parent().is_some_and(|p| {
        p.kind() == "member_access_expression" && p.child_by_field_name("expression") == Some(node)
    })
}

fn join_namespace(outer: Option<&str>, inner: &str) -> String {
    match outer {
        Some(outer) if !outer.is_empty() => format!("{}.{}", outer, inner),
        _ => inner.to_string(),
    }
}

fn simple_name(text: &str) -> String {
    let text = text.trim();
    let text = text.rsplit("::").next().unwrap_or(text);
    text.rsplit('.').next().unwrap_or(text).to_string()
}

fn strip_xml_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Split `Name = value` / `name: value` from a positional expression.
fn parse_attribute_argument(text: &str) -> AnnotationArg {
    let trimmed = text.trim();
    let ident_len = trimmed
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(trimmed.len());
    let starts_ident = trimmed
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    if ident_len > 0 && starts_ident {
        let rest = trimmed[ident_len..].trim_start();
        let value = rest
            .strip_prefix('=')
            .filter(|v| !v.starts_with(['=', '>']))
            .or_else(|| rest.strip_prefix(':').filter(|v| !v.starts_with(':')));
        if let Some(value) = value {
            return AnnotationArg {
                name: Some(trimmed[..ident_len].to_string()),
                value: value.trim().to_string(),
            };
        }
    }
    AnnotationArg {
        name: None,
        value: trimmed.to_string(),
    }
}
