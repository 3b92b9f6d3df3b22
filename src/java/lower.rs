// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lowering of tree-sitter-java syntax trees into the engine's syntax arena.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tree_sitter::{Node as TsNode, Parser};

use super::javadoc::{self, DocName};
use crate::ast::{
    ConstructorCallKind, ConstructorDecl, ContainerMask, LiteralKind, MethodDecl, NodeFlags, NodeId, NodeKind,
    ParsedUnit, Receiver, Span, TypeDecl, TypeKind, TypeRole, VariableDecl,
};
use crate::errors::CompileAbort;
use crate::modifiers::Modifiers;

/// Parse `source` and lower it, keeping only the bodies `containers` asks for.
pub(crate) fn lower(path: &Path, source: Arc<str>, containers: ContainerMask) -> Result<ParsedUnit, CompileAbort> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| CompileAbort::new(path, format!("java grammar unavailable: {}", e)))?;
    let tree = parser
        .parse(source.as_bytes(), None)
        .ok_or_else(|| CompileAbort::new(path, "parser produced no tree"))?;
    let root = tree.root_node();

    let mut lowerer = Lowerer {
        source: Arc::clone(&source),
        unit: ParsedUnit::new(path, source, containers),
        containers,
        declarations: HashMap::new(),
    };
    lowerer.program(root);
    lowerer.doc_comments(root);

    if root.has_error() && lowerer.unit.types.is_empty() {
        return Err(CompileAbort::new(path, "no type declaration could be parsed"));
    }
    Ok(lowerer.unit)
}

fn named<'t>(node: TsNode<'t>) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn all<'t>(node: TsNode<'t>) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn span(node: TsNode<'_>) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

fn is_comment(node: TsNode<'_>) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment")
}

fn type_kind(kind: &str) -> Option<TypeKind> {
    match kind {
        "class_declaration" => Some(TypeKind::Class),
        "interface_declaration" => Some(TypeKind::Interface),
        "enum_declaration" => Some(TypeKind::Enum),
        "annotation_type_declaration" => Some(TypeKind::Annotation),
        "record_declaration" => Some(TypeKind::Record),
        _ => None,
    }
}

/// Where a local's visibility ends.
#[derive(Clone, Copy)]
struct Scope {
    end: usize,
}

struct Lowerer {
    source: Arc<str>,
    unit: ParsedUnit,
    containers: ContainerMask,
    /// Start byte of a lowered declaration, for attaching doc comments.
    declarations: HashMap<usize, NodeId>,
}

impl Lowerer {
    fn text(&self, node: TsNode<'_>) -> String {
        node.utf8_text(self.source.as_bytes()).unwrap_or("").to_string()
    }

    fn push(&mut self, kind: NodeKind, span: Span, parent: Option<NodeId>) -> NodeId {
        self.unit.push(kind, span, parent, NodeFlags::empty())
    }

    fn push_flagged(&mut self, kind: NodeKind, span: Span, parent: Option<NodeId>, flags: NodeFlags) -> NodeId {
        self.unit.push(kind, span, parent, flags)
    }

    fn wants(&self, container: ContainerMask) -> bool {
        self.containers.contains(container)
    }

    fn program(&mut self, root: TsNode<'_>) {
        let mut package = String::new();
        for child in named(root) {
            match child.kind() {
                "package_declaration" => {
                    let id = self.package(child);
                    if let NodeKind::Package { name, .. } = self.unit.kind(id) {
                        package = name.clone();
                    }
                    self.unit.package = Some(id);
                }
                "import_declaration" => {
                    if self.wants(ContainerMask::COMPILATION_UNIT) {
                        let id = self.import(child);
                        self.unit.imports.push(id);
                    }
                }
                kind if type_kind(kind).is_some() => {
                    let id = self.type_declaration(child, None, &package, false);
                    self.unit.types.push(id);
                }
                _ => {}
            }
        }
    }

    fn package(&mut self, node: TsNode<'_>) -> NodeId {
        let (tokens, token_spans) = named(node)
            .into_iter()
            .find(|c| matches!(c.kind(), "identifier" | "scoped_identifier"))
            .map(|name| self.dotted_name(name))
            .unwrap_or_default();
        self.push(
            NodeKind::Package {
                name: tokens.join("."),
                token_spans,
            },
            span(node),
            None,
        )
    }

    fn import(&mut self, node: TsNode<'_>) -> NodeId {
        let children = all(node);
        let is_static = children.iter().any(|c| c.kind() == "static");
        let on_demand = children.iter().any(|c| c.kind() == "asterisk");
        let (tokens, token_spans) = children
            .iter()
            .find(|c| matches!(c.kind(), "identifier" | "scoped_identifier"))
            .map(|name| self.dotted_name(*name))
            .unwrap_or_default();
        self.push(
            NodeKind::Import {
                tokens,
                token_spans,
                on_demand,
                is_static,
            },
            span(node),
            None,
        )
    }

    /// Segments of `a.b.c` written as identifiers or scoped identifiers.
    fn dotted_name(&self, node: TsNode<'_>) -> (Vec<String>, Vec<Span>) {
        let mut tokens = Vec::new();
        let mut spans = Vec::new();
        self.collect_dotted(node, &mut tokens, &mut spans);
        (tokens, spans)
    }

    fn collect_dotted(&self, node: TsNode<'_>, tokens: &mut Vec<String>, spans: &mut Vec<Span>) {
        match node.kind() {
            "identifier" | "type_identifier" => {
                tokens.push(self.text(node));
                spans.push(span(node));
            }
            "scoped_identifier" | "scoped_type_identifier" | "field_access" => {
                for child in named(node) {
                    self.collect_dotted(child, tokens, spans);
                }
            }
            _ => {}
        }
    }

    /// Modifier bits plus the annotations found among them.
    fn modifiers<'t>(&self, node: TsNode<'t>) -> (Modifiers, Vec<TsNode<'t>>) {
        let mut modifiers = Modifiers::empty();
        let mut annotations = Vec::new();
        let Some(list) = all(node).into_iter().find(|c| c.kind() == "modifiers") else {
            return (modifiers, annotations);
        };
        for child in all(list) {
            match child.kind() {
                "marker_annotation" | "annotation" => {
                    if let Some(name) = child.child_by_field_name("name") {
                        if self.text(name).rsplit('.').next() == Some("Deprecated") {
                            modifiers |= Modifiers::DEPRECATED;
                        }
                    }
                    annotations.push(child);
                }
                keyword => modifiers |= Modifiers::from_keyword(keyword),
            }
        }
        (modifiers, annotations)
    }

    fn annotations(&mut self, annotations: &[TsNode<'_>], parent: NodeId) {
        for annotation in annotations {
            if let Some(name) = annotation.child_by_field_name("name") {
                let (tokens, token_spans) = self.dotted_name(name);
                self.push(
                    NodeKind::TypeRef {
                        tokens,
                        token_spans,
                        type_arguments: Vec::new(),
                        dims: 0,
                        role: TypeRole::Other,
                    },
                    span(name),
                    Some(parent),
                );
            }
            if self.wants(ContainerMask::FIELD) {
                if let Some(arguments) = annotation.child_by_field_name("arguments") {
                    self.statement(arguments, parent, Scope { end: annotation.end_byte() });
                }
            }
        }
    }

    fn type_parameters(&self, node: TsNode<'_>) -> Vec<String> {
        node.child_by_field_name("type_parameters")
            .map(|list| {
                named(list)
                    .into_iter()
                    .filter(|p| p.kind() == "type_parameter")
                    .filter_map(|p| {
                        named(p)
                            .into_iter()
                            .find(|c| matches!(c.kind(), "type_identifier" | "identifier"))
                            .map(|c| self.text(c))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn type_declaration(&mut self, node: TsNode<'_>, parent: Option<NodeId>, qualification: &str, local: bool) -> NodeId {
        let kind = type_kind(node.kind()).unwrap_or(TypeKind::Class);
        let name_node = node.child_by_field_name("name");
        let name = name_node.map(|n| self.text(n)).unwrap_or_default();
        let name_span = name_node.map(span).unwrap_or_else(|| span(node));
        let (mut modifiers, annotations) = self.modifiers(node);
        if parent.is_some_and(|p| matches!(self.unit.type_decl(p), Some(t) if t.kind == TypeKind::Interface)) {
            modifiers |= Modifiers::PUBLIC | Modifiers::STATIC;
        }
        if kind == TypeKind::Interface || kind == TypeKind::Annotation {
            modifiers |= Modifiers::INTERFACE | Modifiers::ABSTRACT;
        }
        let id = self.push(
            NodeKind::Type(TypeDecl {
                name: name.clone(),
                name_span,
                kind,
                modifiers,
                qualification: qualification.to_string(),
                superclass: None,
                interfaces: Vec::new(),
                type_parameters: self.type_parameters(node),
                anonymous: false,
                local,
            }),
            span(node),
            parent,
        );
        self.declarations.insert(node.start_byte(), id);
        self.annotations(&annotations, id);

        let superclass = node
            .child_by_field_name("superclass")
            .and_then(|s| named(s).into_iter().next())
            .and_then(|t| self.type_ref(t, id, TypeRole::SuperClass));
        let mut interfaces = Vec::new();
        let interface_lists = all(node)
            .into_iter()
            .filter(|c| matches!(c.kind(), "super_interfaces" | "extends_interfaces"));
        for list in interface_lists {
            for type_list in named(list).into_iter().filter(|c| c.kind() == "type_list") {
                for t in named(type_list) {
                    if let Some(ref_id) = self.type_ref(t, id, TypeRole::SuperInterface) {
                        interfaces.push(ref_id);
                    }
                }
            }
        }
        if let NodeKind::Type(decl) = &mut self.unit.node_mut(id).kind {
            decl.superclass = superclass;
            decl.interfaces = interfaces;
        }

        if !self.wants(ContainerMask::CLASS) {
            return id;
        }
        let member_qualification = if local {
            String::new()
        } else if qualification.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", qualification, name)
        };
        if kind == TypeKind::Record {
            if let Some(components) = node.child_by_field_name("parameters") {
                for component in named(components).into_iter().filter(|c| c.kind() == "formal_parameter") {
                    self.record_component(component, id, node);
                }
            }
        }
        let mut declares_constructor = false;
        if let Some(body) = node.child_by_field_name("body") {
            declares_constructor = self.type_body(body, id, kind, &member_qualification);
        }
        if kind == TypeKind::Class && !declares_constructor {
            self.default_constructor(id, &name, name_span, modifiers);
        }
        id
    }

    /// Lower members; returns whether any constructor was declared.
    fn type_body(&mut self, body: TsNode<'_>, type_id: NodeId, owner: TypeKind, qualification: &str) -> bool {
        let mut declares_constructor = false;
        for member in named(body) {
            match member.kind() {
                "field_declaration" | "constant_declaration" => self.field_declaration(member, type_id, owner),
                "method_declaration" | "annotation_type_element_declaration" => {
                    self.method_declaration(member, type_id, owner)
                }
                "constructor_declaration" | "compact_constructor_declaration" => {
                    declares_constructor = true;
                    self.constructor_declaration(member, type_id, owner);
                }
                "enum_constant" => self.enum_constant(member, type_id),
                "enum_body_declarations" => {
                    declares_constructor |= self.type_body(member, type_id, owner, qualification);
                }
                "block" | "static_initializer" => {
                    if self.wants(ContainerMask::METHOD) {
                        let is_static = member.kind() == "static_initializer";
                        let id = self.push(NodeKind::Initializer { is_static }, span(member), Some(type_id));
                        self.statement(member, id, Scope { end: member.end_byte() });
                    }
                }
                kind if type_kind(kind).is_some() => {
                    self.type_declaration(member, Some(type_id), qualification, false);
                }
                _ => {}
            }
        }
        declares_constructor
    }

    fn default_constructor(&mut self, type_id: NodeId, name: &str, name_span: Span, type_modifiers: Modifiers) {
        let visibility = type_modifiers & (Modifiers::PUBLIC | Modifiers::PROTECTED | Modifiers::PRIVATE);
        let id = self.push_flagged(
            NodeKind::Constructor(ConstructorDecl {
                name: name.to_string(),
                name_span,
                modifiers: visibility,
                parameters: Vec::new(),
                type_parameters: Vec::new(),
                is_default: true,
                constructor_call: None,
            }),
            name_span,
            Some(type_id),
            NodeFlags::IMPLICIT,
        );
        let call = self.push_flagged(
            NodeKind::ExplicitConstructorCall {
                kind: ConstructorCallKind::ImplicitSuper,
                arguments: Vec::new(),
            },
            name_span,
            Some(id),
            NodeFlags::IMPLICIT,
        );
        if let NodeKind::Constructor(decl) = &mut self.unit.node_mut(id).kind {
            decl.constructor_call = Some(call);
        }
    }

    fn field_declaration(&mut self, node: TsNode<'_>, type_id: NodeId, owner: TypeKind) {
        let (mut modifiers, annotations) = self.modifiers(node);
        if owner == TypeKind::Interface || owner == TypeKind::Annotation {
            modifiers |= Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL;
        }
        let type_node = node.child_by_field_name("type");
        let body_span = self
            .unit
            .node(type_id)
            .span;
        let mut cursor = node.walk();
        let declarators: Vec<TsNode<'_>> = node.children_by_field_name("declarator", &mut cursor).collect();
        let mut shared_type: Option<NodeId> = None;
        for (i, declarator) in declarators.iter().enumerate() {
            let Some(name_node) = declarator.child_by_field_name("name") else {
                continue;
            };
            let value = declarator.child_by_field_name("value");
            let field_span = if i == 0 {
                Span::new(node.start_byte(), declarator.end_byte())
            } else {
                span(*declarator)
            };
            let id = self.push(
                NodeKind::Field(VariableDecl {
                    name: self.text(name_node),
                    name_span: span(name_node),
                    type_ref: shared_type,
                    modifiers,
                    has_initializer: value.is_some(),
                    is_argument: false,
                    scope: body_span,
                }),
                field_span,
                Some(type_id),
            );
            if i == 0 {
                self.declarations.insert(node.start_byte(), id);
                self.annotations(&annotations, id);
                shared_type = type_node.and_then(|t| self.type_ref(t, id, TypeRole::Other));
                if let NodeKind::Field(decl) = &mut self.unit.node_mut(id).kind {
                    decl.type_ref = shared_type;
                }
            }
            if let Some(value) = value {
                if self.wants(ContainerMask::FIELD) {
                    self.expression(value, id, Scope { end: value.end_byte() }, NodeFlags::READ);
                }
            }
        }
    }

    fn enum_constant(&mut self, node: TsNode<'_>, type_id: NodeId) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let enum_name = self.unit.type_decl(type_id).map(|t| t.name.clone()).unwrap_or_default();
        let body_span = self.unit.node(type_id).span;
        let id = self.push(
            NodeKind::Field(VariableDecl {
                name: self.text(name_node),
                name_span: span(name_node),
                type_ref: None,
                modifiers: Modifiers::PUBLIC | Modifiers::STATIC | Modifiers::FINAL | Modifiers::ENUM,
                has_initializer: true,
                is_argument: false,
                scope: body_span,
            }),
            span(node),
            Some(type_id),
        );
        self.declarations.insert(node.start_byte(), id);
        let implicit_type = self.push_flagged(
            NodeKind::TypeRef {
                tokens: vec![enum_name],
                token_spans: vec![span(name_node)],
                type_arguments: Vec::new(),
                dims: 0,
                role: TypeRole::Other,
            },
            span(name_node),
            Some(id),
            NodeFlags::IMPLICIT,
        );
        if let NodeKind::Field(decl) = &mut self.unit.node_mut(id).kind {
            decl.type_ref = Some(implicit_type);
        }
        if self.wants(ContainerMask::FIELD) {
            if let Some(arguments) = node.child_by_field_name("arguments") {
                for argument in named(arguments) {
                    self.expression(argument, id, Scope { end: node.end_byte() }, NodeFlags::READ);
                }
            }
            if let Some(body) = node.child_by_field_name("body") {
                self.anonymous_type(body, id, Some(implicit_type));
            }
        }
    }

    fn record_component(&mut self, component: TsNode<'_>, type_id: NodeId, record: TsNode<'_>) {
        let Some(name_node) = component.child_by_field_name("name") else {
            return;
        };
        let id = self.push(
            NodeKind::Field(VariableDecl {
                name: self.text(name_node),
                name_span: span(name_node),
                type_ref: None,
                modifiers: Modifiers::PRIVATE | Modifiers::FINAL,
                has_initializer: false,
                is_argument: false,
                scope: span(record),
            }),
            span(component),
            Some(type_id),
        );
        let type_ref = component
            .child_by_field_name("type")
            .and_then(|t| self.type_ref(t, id, TypeRole::Other));
        if let NodeKind::Field(decl) = &mut self.unit.node_mut(id).kind {
            decl.type_ref = type_ref;
        }
    }

    fn method_declaration(&mut self, node: TsNode<'_>, type_id: NodeId, owner: TypeKind) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let (mut modifiers, annotations) = self.modifiers(node);
        let body = node.child_by_field_name("body");
        if owner == TypeKind::Interface || owner == TypeKind::Annotation {
            modifiers |= Modifiers::PUBLIC;
            if body.is_none() && !modifiers.is_static() {
                modifiers |= Modifiers::ABSTRACT;
            }
        }
        let id = self.push(
            NodeKind::Method(MethodDecl {
                name: self.text(name_node),
                name_span: span(name_node),
                modifiers,
                parameters: Vec::new(),
                return_type: None,
                type_parameters: self.type_parameters(node),
                body: body.map(span),
            }),
            span(node),
            Some(type_id),
        );
        self.declarations.insert(node.start_byte(), id);
        self.annotations(&annotations, id);

        let return_type = node
            .child_by_field_name("type")
            .and_then(|t| self.type_ref(t, id, TypeRole::Other));
        let parameters = node
            .child_by_field_name("parameters")
            .map(|params| self.parameters(params, id, span(node)))
            .unwrap_or_default();
        if let NodeKind::Method(decl) = &mut self.unit.node_mut(id).kind {
            decl.return_type = return_type;
            decl.parameters = parameters;
        }
        if let (Some(body), true) = (body, self.wants(ContainerMask::METHOD)) {
            self.statement(body, id, Scope { end: body.end_byte() });
        }
    }

    fn constructor_declaration(&mut self, node: TsNode<'_>, type_id: NodeId, owner: TypeKind) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let (modifiers, annotations) = self.modifiers(node);
        let id = self.push(
            NodeKind::Constructor(ConstructorDecl {
                name: self.text(name_node),
                name_span: span(name_node),
                modifiers,
                parameters: Vec::new(),
                type_parameters: self.type_parameters(node),
                is_default: false,
                constructor_call: None,
            }),
            span(node),
            Some(type_id),
        );
        self.declarations.insert(node.start_byte(), id);
        self.annotations(&annotations, id);
        let parameters = node
            .child_by_field_name("parameters")
            .map(|params| self.parameters(params, id, span(node)))
            .unwrap_or_default();

        let mut constructor_call = None;
        if self.wants(ContainerMask::METHOD) {
            if let Some(body) = node.child_by_field_name("body") {
                let scope = Scope { end: body.end_byte() };
                let statements: Vec<TsNode<'_>> = named(body).into_iter().filter(|c| !is_comment(*c)).collect();
                let explicit = statements
                    .first()
                    .filter(|s| s.kind() == "explicit_constructor_invocation")
                    .copied();
                match explicit {
                    Some(call) => constructor_call = Some(self.explicit_constructor_call(call, id, scope)),
                    None if owner == TypeKind::Class => {
                        constructor_call = Some(self.push_flagged(
                            NodeKind::ExplicitConstructorCall {
                                kind: ConstructorCallKind::ImplicitSuper,
                                arguments: Vec::new(),
                            },
                            span(name_node),
                            Some(id),
                            NodeFlags::IMPLICIT,
                        ));
                    }
                    None => {}
                }
                for statement in statements.into_iter().filter(|s| s.kind() != "explicit_constructor_invocation") {
                    self.statement(statement, id, scope);
                }
            }
        }
        if let NodeKind::Constructor(decl) = &mut self.unit.node_mut(id).kind {
            decl.parameters = parameters;
            decl.constructor_call = constructor_call;
        }
    }

    fn explicit_constructor_call(&mut self, node: TsNode<'_>, parent: NodeId, scope: Scope) -> NodeId {
        let kind = match node.child_by_field_name("constructor").map(|c| c.kind()) {
            Some("this") => ConstructorCallKind::This,
            _ => ConstructorCallKind::Super,
        };
        let id = self.push(
            NodeKind::ExplicitConstructorCall {
                kind,
                arguments: Vec::new(),
            },
            span(node),
            Some(parent),
        );
        if let Some(object) = node.child_by_field_name("object") {
            self.expression(object, id, scope, NodeFlags::READ);
        }
        let arguments = self.arguments(node, id, scope);
        if let NodeKind::ExplicitConstructorCall { arguments: slot, .. } = &mut self.unit.node_mut(id).kind {
            *slot = arguments;
        }
        id
    }

    fn parameters(&mut self, params: TsNode<'_>, owner: NodeId, owner_span: Span) -> Vec<NodeId> {
        let mut ids = Vec::new();
        for param in named(params) {
            match param.kind() {
                "formal_parameter" => {
                    let name = param.child_by_field_name("name");
                    let type_node = param.child_by_field_name("type");
                    if let Some(name) = name {
                        ids.push(self.local(param, name, type_node, 0, owner, owner_span, true, false));
                    }
                }
                "spread_parameter" => {
                    let type_node = named(param)
                        .into_iter()
                        .find(|c| !matches!(c.kind(), "modifiers" | "variable_declarator"));
                    let name = named(param)
                        .into_iter()
                        .find(|c| c.kind() == "variable_declarator")
                        .and_then(|d| d.child_by_field_name("name"));
                    if let Some(name) = name {
                        ids.push(self.local(param, name, type_node, 1, owner, owner_span, true, false));
                    }
                }
                _ => {}
            }
        }
        ids
    }

    #[allow(clippy::too_many_arguments)]
    fn local(
        &mut self,
        declaration: TsNode<'_>,
        name: TsNode<'_>,
        type_node: Option<TsNode<'_>>,
        extra_dims: usize,
        parent: NodeId,
        scope: Span,
        is_argument: bool,
        has_initializer: bool,
    ) -> NodeId {
        let (modifiers, annotations) = self.modifiers(declaration);
        let id = self.push(
            NodeKind::Local(VariableDecl {
                name: self.text(name),
                name_span: span(name),
                type_ref: None,
                modifiers,
                has_initializer,
                is_argument,
                scope,
            }),
            span(declaration),
            Some(parent),
        );
        self.annotations(&annotations, id);
        let is_var = type_node.is_some_and(|t| t.kind() == "type_identifier" && self.text(t) == "var");
        let type_ref = match type_node {
            Some(t) if !is_var => self.type_ref(t, id, TypeRole::Other),
            _ => None,
        };
        if extra_dims > 0 {
            if let Some(type_ref) = type_ref {
                if let NodeKind::TypeRef { dims, .. } = &mut self.unit.node_mut(type_ref).kind {
                    *dims += extra_dims;
                }
            }
        }
        if let NodeKind::Local(decl) = &mut self.unit.node_mut(id).kind {
            decl.type_ref = type_ref;
        }
        id
    }

    fn local_variables(&mut self, node: TsNode<'_>, parent: NodeId, scope: Scope) {
        let type_node = node.child_by_field_name("type");
        let mut cursor = node.walk();
        let declarators: Vec<TsNode<'_>> = node.children_by_field_name("declarator", &mut cursor).collect();
        for declarator in declarators {
            let Some(name) = declarator.child_by_field_name("name") else {
                continue;
            };
            let value = declarator.child_by_field_name("value");
            let visible = Span::new(declarator.start_byte(), scope.end);
            let id = self.local(node, name, type_node, 0, parent, visible, false, value.is_some());
            self.unit.node_mut(id).span = span(declarator);
            if let Some(value) = value {
                self.expression(value, id, scope, NodeFlags::READ);
            }
        }
    }

    fn arguments(&mut self, node: TsNode<'_>, parent: NodeId, scope: Scope) -> Vec<NodeId> {
        let Some(list) = node.child_by_field_name("arguments") else {
            return Vec::new();
        };
        named(list)
            .into_iter()
            .filter(|a| !is_comment(*a))
            .filter_map(|a| self.expression(a, parent, scope, NodeFlags::READ))
            .collect()
    }

    /// Lower a statement or block; locals declared inside stay visible until `scope.end`.
    fn statement(&mut self, node: TsNode<'_>, parent: NodeId, scope: Scope) {
        match node.kind() {
            "block" | "constructor_body" | "switch_block" | "switch_block_statement_group" | "switch_rule" => {
                let inner = Scope { end: node.end_byte() };
                for child in named(node) {
                    self.statement(child, parent, inner);
                }
            }
            "local_variable_declaration" => self.local_variables(node, parent, scope),
            "enhanced_for_statement" => {
                let visible = span(node);
                if let Some(value) = node.child_by_field_name("value") {
                    self.expression(value, parent, scope, NodeFlags::READ);
                }
                if let Some(name) = node.child_by_field_name("name") {
                    let type_node = node.child_by_field_name("type");
                    self.local(node, name, type_node, 0, parent, visible, false, true);
                }
                if let Some(body) = node.child_by_field_name("body") {
                    self.statement(body, parent, Scope { end: node.end_byte() });
                }
            }
            "for_statement" | "try_with_resources_statement" => {
                let inner = Scope { end: node.end_byte() };
                for child in named(node) {
                    self.statement(child, parent, inner);
                }
            }
            "resource" => {
                if let Some(name) = node.child_by_field_name("name") {
                    let type_node = node.child_by_field_name("type");
                    let visible = Span::new(node.start_byte(), scope.end);
                    let id = self.local(node, name, type_node, 0, parent, visible, false, true);
                    if let Some(value) = node.child_by_field_name("value") {
                        self.expression(value, id, scope, NodeFlags::READ);
                    }
                } else {
                    for child in named(node) {
                        self.expression(child, parent, scope, NodeFlags::READ);
                    }
                }
            }
            "catch_clause" => {
                let visible = span(node);
                for child in named(node) {
                    match child.kind() {
                        "catch_formal_parameter" => {
                            let catch_type = named(child).into_iter().find(|c| c.kind() == "catch_type");
                            let first_type = catch_type.and_then(|t| named(t).into_iter().next());
                            let id = child
                                .child_by_field_name("name")
                                .map(|name| self.local(child, name, first_type, 0, parent, visible, true, false));
                            // union alternatives after the first
                            if let (Some(catch_type), Some(local)) = (catch_type, id) {
                                for alternative in named(catch_type).into_iter().skip(1) {
                                    self.type_ref(alternative, local, TypeRole::Other);
                                }
                            }
                        }
                        _ => self.statement(child, parent, Scope { end: node.end_byte() }),
                    }
                }
            }
            kind if type_kind(kind).is_some() => {
                self.type_declaration(node, Some(parent), "", true);
            }
            "line_comment" | "block_comment" => {}
            "expression_statement" | "return_statement" | "throw_statement" | "if_statement"
            | "while_statement" | "do_statement" | "try_statement" | "finally_clause"
            | "synchronized_statement" | "labeled_statement" | "yield_statement" | "switch_expression"
            | "switch_label" | "assert_statement" | "parenthesized_expression" | "condition" => {
                for child in named(node) {
                    self.statement(child, parent, scope);
                }
            }
            "break_statement" | "continue_statement" => {}
            _ => {
                self.expression(node, parent, scope, NodeFlags::READ);
            }
        }
    }

    fn literal(&mut self, node: TsNode<'_>, kind: LiteralKind, parent: NodeId) -> NodeId {
        self.push(NodeKind::Literal(kind), span(node), Some(parent))
    }

    /// True when `node` is a chain of plain names joined by `.`.
    fn is_name_chain(node: TsNode<'_>) -> bool {
        match node.kind() {
            "identifier" => true,
            "field_access" => {
                node.child_by_field_name("object").is_some_and(Self::is_name_chain)
                    && node.child_by_field_name("field").is_some_and(|f| f.kind() == "identifier")
            }
            _ => false,
        }
    }

    fn expression(&mut self, node: TsNode<'_>, parent: NodeId, scope: Scope, access: NodeFlags) -> Option<NodeId> {
        let node_span = span(node);
        let id = match node.kind() {
            "parenthesized_expression" => {
                let inner = named(node).into_iter().find(|c| !is_comment(*c))?;
                return self.expression(inner, parent, scope, access);
            }
            "identifier" => self.push_flagged(NodeKind::NameRef { name: self.text(node) }, node_span, Some(parent), access),
            "this" => self.push(NodeKind::This, node_span, Some(parent)),
            "super" => self.push(NodeKind::Super, node_span, Some(parent)),
            "field_access" if Self::is_name_chain(node) => {
                let (tokens, token_spans) = self.dotted_name(node);
                self.push_flagged(
                    NodeKind::QualifiedNameRef { tokens, token_spans },
                    node_span,
                    Some(parent),
                    access,
                )
            }
            "field_access" => {
                let field = node.child_by_field_name("field")?;
                let id = self.push_flagged(
                    NodeKind::FieldAccess {
                        receiver: NodeId(0),
                        name: self.text(field),
                        name_span: span(field),
                    },
                    node_span,
                    Some(parent),
                    access,
                );
                let receiver = node
                    .child_by_field_name("object")
                    .and_then(|o| self.expression(o, id, scope, NodeFlags::READ));
                match receiver {
                    Some(receiver) => {
                        if let NodeKind::FieldAccess { receiver: slot, .. } = &mut self.unit.node_mut(id).kind {
                            *slot = receiver;
                        }
                    }
                    None => {
                        self.unit.node_mut(id).kind = NodeKind::NameRef { name: self.text(field) };
                    }
                }
                id
            }
            "method_invocation" => {
                let name = node.child_by_field_name("name")?;
                let object = node.child_by_field_name("object");
                let id = self.push(
                    NodeKind::MessageSend {
                        selector: self.text(name),
                        selector_span: span(name),
                        receiver: Receiver::Implicit,
                        arguments: Vec::new(),
                        has_type_arguments: node.child_by_field_name("type_arguments").is_some(),
                    },
                    node_span,
                    Some(parent),
                );
                let receiver = match object {
                    None => Receiver::Implicit,
                    Some(o) if o.kind() == "super" => Receiver::Super,
                    Some(o) => match self.expression(o, id, scope, NodeFlags::READ) {
                        Some(receiver) => Receiver::Expression(receiver),
                        None => Receiver::Implicit,
                    },
                };
                let arguments = self.arguments(node, id, scope);
                if let NodeKind::MessageSend {
                    receiver: r,
                    arguments: a,
                    ..
                } = &mut self.unit.node_mut(id).kind
                {
                    *r = receiver;
                    *a = arguments;
                }
                id
            }
            "object_creation_expression" => {
                let type_node = node.child_by_field_name("type")?;
                let id = self.push(
                    NodeKind::Allocation {
                        type_ref: NodeId(0),
                        arguments: Vec::new(),
                        anonymous: None,
                    },
                    node_span,
                    Some(parent),
                );
                let outer = named(node).into_iter().next().filter(|first| first.start_byte() < type_node.start_byte());
                if let Some(outer) = outer {
                    if outer.kind() != "type_arguments" {
                        self.expression(outer, id, scope, NodeFlags::READ);
                    }
                }
                let Some(type_ref) = self.type_ref(type_node, id, TypeRole::Other) else {
                    self.unit.node_mut(id).kind = NodeKind::Expression;
                    return Some(id);
                };
                let arguments = self.arguments(node, id, scope);
                let anonymous = named(node)
                    .into_iter()
                    .find(|c| c.kind() == "class_body")
                    .map(|body| self.anonymous_type(body, id, Some(type_ref)));
                if let NodeKind::Allocation {
                    type_ref: t,
                    arguments: a,
                    anonymous: anon,
                } = &mut self.unit.node_mut(id).kind
                {
                    *t = type_ref;
                    *a = arguments;
                    *anon = anonymous;
                }
                id
            }
            "cast_expression" => {
                let id = self.push(
                    NodeKind::Cast {
                        type_ref: NodeId(0),
                        expression: None,
                    },
                    node_span,
                    Some(parent),
                );
                let type_ref = node
                    .child_by_field_name("type")
                    .and_then(|t| self.type_ref(t, id, TypeRole::Other));
                let value = node
                    .child_by_field_name("value")
                    .and_then(|v| self.expression(v, id, scope, NodeFlags::READ));
                match type_ref {
                    Some(type_ref) => {
                        self.unit.node_mut(id).kind = NodeKind::Cast {
                            type_ref,
                            expression: value,
                        };
                    }
                    None => self.unit.node_mut(id).kind = NodeKind::Expression,
                }
                id
            }
            "array_access" => {
                let id = self.push(NodeKind::Expression, node_span, Some(parent));
                let array = node
                    .child_by_field_name("array")
                    .and_then(|a| self.expression(a, id, scope, NodeFlags::READ));
                if let Some(index) = node.child_by_field_name("index") {
                    self.expression(index, id, scope, NodeFlags::READ);
                }
                if let Some(array) = array {
                    self.unit.node_mut(id).kind = NodeKind::ArrayAccess { array };
                }
                id
            }
            "assignment_expression" => {
                let compound = node
                    .child_by_field_name("operator")
                    .is_some_and(|op| self.text(op) != "=");
                let id = self.push(
                    NodeKind::Assignment {
                        left: NodeId(0),
                        compound,
                    },
                    node_span,
                    Some(parent),
                );
                let left_access = if compound {
                    NodeFlags::READ | NodeFlags::WRITE
                } else {
                    NodeFlags::WRITE
                };
                let left = node
                    .child_by_field_name("left")
                    .and_then(|l| self.expression(l, id, scope, left_access));
                if let Some(right) = node.child_by_field_name("right") {
                    self.expression(right, id, scope, NodeFlags::READ);
                }
                match left {
                    Some(left) => {
                        if let NodeKind::Assignment { left: slot, .. } = &mut self.unit.node_mut(id).kind {
                            *slot = left;
                        }
                    }
                    None => self.unit.node_mut(id).kind = NodeKind::Expression,
                }
                id
            }
            "update_expression" => {
                let id = self.push(NodeKind::Expression, node_span, Some(parent));
                for operand in named(node) {
                    self.expression(operand, id, scope, NodeFlags::READ | NodeFlags::WRITE);
                }
                id
            }
            "decimal_integer_literal" | "hex_integer_literal" | "octal_integer_literal" | "binary_integer_literal" => {
                let kind = if self.text(node).ends_with(['l', 'L']) {
                    LiteralKind::Long
                } else {
                    LiteralKind::Int
                };
                self.literal(node, kind, parent)
            }
            "decimal_floating_point_literal" | "hex_floating_point_literal" => {
                let kind = if self.text(node).ends_with(['f', 'F']) {
                    LiteralKind::Float
                } else {
                    LiteralKind::Double
                };
                self.literal(node, kind, parent)
            }
            "string_literal" | "text_block" => self.literal(node, LiteralKind::String, parent),
            "character_literal" => self.literal(node, LiteralKind::Char, parent),
            "true" | "false" => self.literal(node, LiteralKind::Boolean, parent),
            "null_literal" => self.literal(node, LiteralKind::Null, parent),
            "class_literal" => {
                let id = self.literal(node, LiteralKind::Class, parent);
                if let Some(t) = named(node).into_iter().next() {
                    self.type_ref(t, id, TypeRole::Other);
                }
                id
            }
            "lambda_expression" => {
                let id = self.push(NodeKind::Expression, node_span, Some(parent));
                if let Some(params) = node.child_by_field_name("parameters") {
                    match params.kind() {
                        "identifier" => {
                            self.local(params, params, None, 0, id, node_span, true, false);
                        }
                        "formal_parameters" => {
                            self.parameters(params, id, node_span);
                        }
                        _ => {
                            for param in named(params).into_iter().filter(|p| p.kind() == "identifier") {
                                self.local(param, param, None, 0, id, node_span, true, false);
                            }
                        }
                    }
                }
                if let Some(body) = node.child_by_field_name("body") {
                    if body.kind() == "block" {
                        self.statement(body, id, Scope { end: body.end_byte() });
                    } else {
                        self.expression(body, id, scope, NodeFlags::READ);
                    }
                }
                id
            }
            "instanceof_expression" => {
                let id = self.push(NodeKind::Expression, node_span, Some(parent));
                if let Some(left) = node.child_by_field_name("left") {
                    self.expression(left, id, scope, NodeFlags::READ);
                }
                let type_node = node.child_by_field_name("right");
                match node.child_by_field_name("name") {
                    Some(name) => {
                        let visible = Span::new(name.start_byte(), scope.end);
                        self.local(node, name, type_node, 0, id, visible, false, true);
                    }
                    None => {
                        if let Some(t) = type_node {
                            self.type_ref(t, id, TypeRole::Other);
                        }
                    }
                }
                id
            }
            "array_creation_expression" => {
                let id = self.push(NodeKind::Expression, node_span, Some(parent));
                if let Some(t) = node.child_by_field_name("type") {
                    self.type_ref(t, id, TypeRole::Other);
                }
                for child in named(node) {
                    if matches!(child.kind(), "dimensions_expr" | "array_initializer") {
                        self.statement(child, id, scope);
                    }
                }
                id
            }
            "explicit_constructor_invocation" => self.explicit_constructor_call(node, parent, scope),
            "type_identifier" | "scoped_type_identifier" | "generic_type" | "array_type" => {
                return self.type_ref(node, parent, TypeRole::Other);
            }
            "line_comment" | "block_comment" => return None,
            _ => {
                let id = self.push(NodeKind::Expression, node_span, Some(parent));
                for child in named(node) {
                    self.statement(child, id, scope);
                }
                id
            }
        };
        Some(id)
    }

    fn anonymous_type(&mut self, body: TsNode<'_>, parent: NodeId, super_type: Option<NodeId>) -> NodeId {
        let id = self.push(
            NodeKind::Type(TypeDecl {
                name: String::new(),
                name_span: Span::new(body.start_byte(), body.start_byte()),
                kind: TypeKind::Class,
                modifiers: Modifiers::empty(),
                qualification: String::new(),
                superclass: super_type,
                interfaces: Vec::new(),
                type_parameters: Vec::new(),
                anonymous: true,
                local: true,
            }),
            span(body),
            Some(parent),
        );
        if self.wants(ContainerMask::CLASS) {
            self.type_body(body, id, TypeKind::Class, "");
        }
        id
    }

    /// Lower a type; `void` and unparsable types produce nothing.
    fn type_ref(&mut self, node: TsNode<'_>, parent: NodeId, role: TypeRole) -> Option<NodeId> {
        match node.kind() {
            "void_type" => None,
            "annotated_type" => {
                let inner = named(node)
                    .into_iter()
                    .find(|c| !matches!(c.kind(), "marker_annotation" | "annotation"))?;
                self.type_ref(inner, parent, role)
            }
            "array_type" => {
                let element = node.child_by_field_name("element")?;
                let dims = node
                    .child_by_field_name("dimensions")
                    .map(|d| self.text(d).matches('[').count())
                    .unwrap_or(1);
                let id = self.type_ref(element, parent, role)?;
                if let NodeKind::TypeRef { dims: slot, .. } = &mut self.unit.node_mut(id).kind {
                    *slot += dims;
                }
                self.unit.node_mut(id).span = span(node);
                Some(id)
            }
            "generic_type" => {
                let base = named(node)
                    .into_iter()
                    .find(|c| matches!(c.kind(), "type_identifier" | "scoped_type_identifier"))?;
                let (tokens, token_spans) = self.dotted_name(base);
                let id = self.push(
                    NodeKind::TypeRef {
                        tokens,
                        token_spans,
                        type_arguments: Vec::new(),
                        dims: 0,
                        role,
                    },
                    span(node),
                    Some(parent),
                );
                let mut arguments = Vec::new();
                if let Some(list) = named(node).into_iter().find(|c| c.kind() == "type_arguments") {
                    for argument in named(list) {
                        let lowered = if argument.kind() == "wildcard" {
                            named(argument)
                                .into_iter()
                                .find(|c| !matches!(c.kind(), "marker_annotation" | "annotation" | "super" | "extends"))
                                .and_then(|bound| self.type_ref(bound, id, TypeRole::Other))
                        } else {
                            self.type_ref(argument, id, TypeRole::Other)
                        };
                        arguments.extend(lowered);
                    }
                }
                if let NodeKind::TypeRef { type_arguments, .. } = &mut self.unit.node_mut(id).kind {
                    *type_arguments = arguments;
                }
                Some(id)
            }
            "type_identifier" | "scoped_type_identifier" | "identifier" | "scoped_identifier" => {
                let (tokens, token_spans) = self.dotted_name(node);
                if tokens.is_empty() {
                    return None;
                }
                Some(self.push(
                    NodeKind::TypeRef {
                        tokens,
                        token_spans,
                        type_arguments: Vec::new(),
                        dims: 0,
                        role,
                    },
                    span(node),
                    Some(parent),
                ))
            }
            "integral_type" | "floating_point_type" | "boolean_type" => Some(self.push(
                NodeKind::TypeRef {
                    tokens: vec![self.text(node)],
                    token_spans: vec![span(node)],
                    type_arguments: Vec::new(),
                    dims: 0,
                    role,
                },
                span(node),
                Some(parent),
            )),
            _ => None,
        }
    }

    /// Attach `{@link}` / `@see` references to the declaration each doc comment precedes.
    fn doc_comments(&mut self, root: TsNode<'_>) {
        let mut pending = vec![root];
        while let Some(node) = pending.pop() {
            for child in all(node) {
                if child.kind() == "block_comment" {
                    let text = self.text(child);
                    if text.starts_with("/**") {
                        self.doc_comment(child, &text);
                    }
                } else if child.named_child_count() > 0 {
                    pending.push(child);
                }
            }
        }
    }

    fn doc_comment(&mut self, comment: TsNode<'_>, text: &str) {
        let mut sibling = comment.next_named_sibling();
        while let Some(s) = sibling.filter(|s| is_comment(*s)) {
            sibling = s.next_named_sibling();
        }
        let documented = sibling.and_then(|s| self.declarations.get(&s.start_byte()).copied());
        let parent = documented.or_else(|| {
            self.unit
                .ids()
                .filter(|&id| {
                    matches!(self.unit.kind(id), NodeKind::Type(_)) && self.unit.node(id).span.contains(comment.start_byte())
                })
                .last()
        });
        let Some(parent) = parent else {
            return;
        };
        // doc references of a member belong to the type body
        if !self.wants(ContainerMask::CLASS) && !matches!(self.unit.kind(parent), NodeKind::Type(_)) {
            return;
        }

        let flags = NodeFlags::IN_DOC_COMMENT;
        for reference in javadoc::scan(text, comment.start_byte()) {
            let type_ref = reference
                .type_name
                .as_ref()
                .map(|name| self.doc_type_ref(name, reference.span, parent));
            let Some((member, member_span)) = reference.member else {
                continue;
            };
            match reference.arguments {
                Some(arguments) => {
                    let receiver = match type_ref {
                        Some(t) => Receiver::Expression(t),
                        None => Receiver::Implicit,
                    };
                    let id = self.push_flagged(
                        NodeKind::MessageSend {
                            selector: member,
                            selector_span: member_span,
                            receiver,
                            arguments: Vec::new(),
                            has_type_arguments: false,
                        },
                        Span::new(member_span.start, reference.span.end),
                        Some(parent),
                        flags,
                    );
                    let argument_ids: Vec<NodeId> = arguments
                        .iter()
                        .map(|argument| self.doc_type_ref(argument, reference.span, id))
                        .collect();
                    if let NodeKind::MessageSend { arguments: slot, .. } = &mut self.unit.node_mut(id).kind {
                        *slot = argument_ids;
                    }
                }
                None => {
                    let kind = match type_ref {
                        Some(receiver) => NodeKind::FieldAccess {
                            receiver,
                            name: member,
                            name_span: member_span,
                        },
                        None => NodeKind::NameRef { name: member },
                    };
                    self.push_flagged(kind, member_span, Some(parent), flags | NodeFlags::READ);
                }
            }
        }
    }

    fn doc_type_ref(&mut self, name: &DocName, fallback: Span, parent: NodeId) -> NodeId {
        let whole = match (name.spans.first(), name.spans.last()) {
            (Some(first), Some(last)) => Span::new(first.start, last.end),
            _ => fallback,
        };
        self.push_flagged(
            NodeKind::TypeRef {
                tokens: name.tokens.clone(),
                token_spans: name.spans.clone(),
                type_arguments: Vec::new(),
                dims: 0,
                role: TypeRole::Other,
            },
            whole,
            Some(parent),
            NodeFlags::IN_DOC_COMMENT,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str, containers: ContainerMask) -> ParsedUnit {
        lower(Path::new("Widget.java"), Arc::from(source), containers).unwrap()
    }

    fn count(unit: &ParsedUnit, pred: impl Fn(&NodeKind) -> bool) -> usize {
        unit.ids().filter(|&id| pred(unit.kind(id))).count()
    }

    const WIDGET: &str = r#"
package com.acme;

import java.util.List;

/** Uses {@link Helper#assist(int)}. */
public class Widget extends Base implements Runnable {
    private int count = compute();

    public Widget(int size) {
        this.count = size;
    }

    void foo(int x) {
        Widget w = new Widget(1);
        w.foo(x + 1);
        count++;
    }

    public void run() {}

    static class Inner {}
}
"#;

    #[test]
    fn lowers_declarations_and_headers() {
        let unit = parse(WIDGET, ContainerMask::ALL);
        assert_eq!(unit.package_name(), "com.acme");
        assert_eq!(unit.imports.len(), 1);
        assert_eq!(unit.types.len(), 1);
        let widget = unit.type_decl(unit.types[0]).unwrap();
        assert_eq!(widget.name, "Widget");
        assert_eq!(widget.qualification, "com.acme");
        assert!(widget.superclass.is_some());
        assert_eq!(widget.interfaces.len(), 1);
        let inner = unit
            .ids()
            .filter_map(|id| unit.type_decl(id))
            .find(|t| t.name == "Inner")
            .unwrap();
        assert_eq!(inner.qualified_name(), "com.acme.Widget.Inner");
        assert_eq!(count(&unit, |k| matches!(k, NodeKind::Method(_))), 2);
    }

    #[test]
    fn method_bodies_follow_the_container_mask() {
        let with_bodies = parse(WIDGET, ContainerMask::ALL);
        let sends = |unit: &ParsedUnit| {
            count(unit, |k| matches!(k, NodeKind::MessageSend { selector, .. } if selector == "foo"))
        };
        assert_eq!(sends(&with_bodies), 1);
        let headers_only = parse(WIDGET, ContainerMask::COMPILATION_UNIT | ContainerMask::CLASS);
        assert_eq!(sends(&headers_only), 0);
        assert_eq!(count(&headers_only, |k| matches!(k, NodeKind::Method(_))), 2);
        // the field initializer call is gone too
        assert_eq!(
            count(&headers_only, |k| matches!(k, NodeKind::MessageSend { selector, .. } if selector == "compute")),
            0
        );
    }

    #[test]
    fn constructors_get_implicit_super_calls() {
        let unit = parse(WIDGET, ContainerMask::ALL);
        let implicit = count(&unit, |k| {
            matches!(
                k,
                NodeKind::ExplicitConstructorCall {
                    kind: ConstructorCallKind::ImplicitSuper,
                    ..
                }
            )
        });
        // Widget(int) plus the default constructor of Inner
        assert_eq!(implicit, 2);
        let defaults = count(&unit, |k| matches!(k, NodeKind::Constructor(c) if c.is_default));
        assert_eq!(defaults, 1);
    }

    #[test]
    fn locals_and_access_flags() {
        let unit = parse(WIDGET, ContainerMask::ALL);
        let w = unit
            .ids()
            .find(|&id| matches!(unit.kind(id), NodeKind::Local(v) if v.name == "w"))
            .unwrap();
        let NodeKind::Local(decl) = unit.kind(w) else { unreachable!() };
        assert!(decl.has_initializer);
        assert!(decl.type_ref.is_some());
        let written = unit
            .ids()
            .filter(|&id| matches!(unit.kind(id), NodeKind::NameRef { name } if name == "count"))
            .find(|&id| unit.node(id).flags.contains(NodeFlags::WRITE));
        assert!(written.is_some());
    }

    #[test]
    fn doc_comment_references_are_flagged() {
        let unit = parse(WIDGET, ContainerMask::ALL);
        let doc_send = unit
            .ids()
            .find(|&id| matches!(unit.kind(id), NodeKind::MessageSend { selector, .. } if selector == "assist"))
            .unwrap();
        assert!(unit.node(doc_send).flags.contains(NodeFlags::IN_DOC_COMMENT));
        assert_eq!(unit.node(doc_send).parent, Some(unit.types[0]));
    }

    #[test]
    fn unparsable_source_aborts() {
        let result = lower(Path::new("Broken.java"), Arc::from("}}} ((("), ContainerMask::ALL);
        assert!(result.is_err());
    }
}
