// SPDX-License-Identifier: MIT OR Apache-2.0

//! Syntax arena
//!
//! A parsed compilation unit is a flat `Vec<Node>` addressed by `NodeId`.
//! Nodes are pushed parent first, so every node's parent has a smaller id.
//! Source order mostly follows arena order; doc comment references are
//! appended last. Bodies outside the container mask the unit was parsed
//! with are simply absent.

use bitflags::bitflags;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::modifiers::Modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Half-open byte range into the unit's source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(self) -> bool {
        self.end <= self.start
    }

    pub fn contains(self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

bitflags! {
    /// Which syntactic containers get lowered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ContainerMask: u8 {
        /// Package, imports and top-level type headers.
        const COMPILATION_UNIT = 1 << 0;
        /// Member declarations inside type bodies.
        const CLASS = 1 << 1;
        /// Method, constructor and initializer bodies.
        const METHOD = 1 << 2;
        /// Field initializers.
        const FIELD = 1 << 3;
    }
}

impl ContainerMask {
    pub const ALL: ContainerMask = ContainerMask::all();
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u8 {
        /// Reference written inside a `/** ... */` comment.
        const IN_DOC_COMMENT = 1 << 0;
        /// Synthesized: default constructors and implicit `super()` calls.
        const IMPLICIT = 1 << 1;
        const READ = 1 << 2;
        const WRITE = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    /// Empty for anonymous classes.
    pub name: String,
    pub name_span: Span,
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    /// Package plus enclosing type names, dot separated.
    pub qualification: String,
    pub superclass: Option<NodeId>,
    pub interfaces: Vec<NodeId>,
    pub type_parameters: Vec<String>,
    pub anonymous: bool,
    /// Declared inside a method body.
    pub local: bool,
}

impl TypeDecl {
    pub fn qualified_name(&self) -> String {
        if self.qualification.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.qualification, self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub name_span: Span,
    pub modifiers: Modifiers,
    /// `Local` nodes flagged as arguments.
    pub parameters: Vec<NodeId>,
    /// `None` for `void`.
    pub return_type: Option<NodeId>,
    pub type_parameters: Vec<String>,
    pub body: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDecl {
    pub name: String,
    pub name_span: Span,
    pub modifiers: Modifiers,
    pub parameters: Vec<NodeId>,
    pub type_parameters: Vec<String>,
    /// Synthesized for a class that declares no constructor.
    pub is_default: bool,
    /// The explicit or implicit `this(...)` / `super(...)` call, when the body was lowered.
    pub constructor_call: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub name: String,
    pub name_span: Span,
    /// `None` for `var` and untyped lambda parameters.
    pub type_ref: Option<NodeId>,
    pub modifiers: Modifiers,
    pub has_initializer: bool,
    pub is_argument: bool,
    /// Where the name is visible. Fields use their type body.
    pub scope: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// `foo()`
    Implicit,
    /// `expr.foo()`, including `this.foo()`.
    Expression(NodeId),
    /// `super.foo()`
    Super,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorCallKind {
    Super,
    This,
    /// No call written; the compiler inserts `super()`.
    ImplicitSuper,
}

/// Where a type reference appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRole {
    SuperClass,
    SuperInterface,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    Boolean,
    Null,
    /// `Foo.class`
    Class,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Package {
        name: String,
        token_spans: Vec<Span>,
    },
    Import {
        tokens: Vec<String>,
        token_spans: Vec<Span>,
        on_demand: bool,
        is_static: bool,
    },
    Type(TypeDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
    Field(VariableDecl),
    Local(VariableDecl),
    Initializer {
        is_static: bool,
    },
    MessageSend {
        selector: String,
        selector_span: Span,
        receiver: Receiver,
        arguments: Vec<NodeId>,
        has_type_arguments: bool,
    },
    Allocation {
        type_ref: NodeId,
        arguments: Vec<NodeId>,
        /// The anonymous class body, lowered as a `Type` node.
        anonymous: Option<NodeId>,
    },
    ExplicitConstructorCall {
        kind: ConstructorCallKind,
        arguments: Vec<NodeId>,
    },
    FieldAccess {
        receiver: NodeId,
        name: String,
        name_span: Span,
    },
    NameRef {
        name: String,
    },
    /// `a.b.c` where every part is a plain name.
    QualifiedNameRef {
        tokens: Vec<String>,
        token_spans: Vec<Span>,
    },
    TypeRef {
        tokens: Vec<String>,
        token_spans: Vec<Span>,
        type_arguments: Vec<NodeId>,
        dims: usize,
        role: TypeRole,
    },
    This,
    Super,
    Literal(LiteralKind),
    Cast {
        type_ref: NodeId,
        expression: Option<NodeId>,
    },
    ArrayAccess {
        array: NodeId,
    },
    Assignment {
        left: NodeId,
        compound: bool,
    },
    /// Any other expression; its type is unknown to the binder.
    Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub flags: NodeFlags,
}

impl NodeKind {
    pub fn type_ref_name(&self) -> Option<(&[String], &[Span])> {
        match self {
            NodeKind::TypeRef {
                tokens, token_spans, ..
            } => Some((tokens, token_spans)),
            _ => None,
        }
    }
}

/// One lowered compilation unit.
#[derive(Debug, Clone)]
pub struct ParsedUnit {
    pub path: PathBuf,
    pub source: Arc<str>,
    pub containers: ContainerMask,
    pub nodes: Vec<Node>,
    pub package: Option<NodeId>,
    pub imports: Vec<NodeId>,
    /// Top-level type declarations.
    pub types: Vec<NodeId>,
    line_starts: Vec<usize>,
}

impl ParsedUnit {
    pub fn new(path: impl Into<PathBuf>, source: Arc<str>, containers: ContainerMask) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            path: path.into(),
            source,
            containers,
            nodes: Vec::new(),
            package: None,
            imports: Vec::new(),
            types: Vec::new(),
            line_starts,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn push(&mut self, kind: NodeKind, span: Span, parent: Option<NodeId>, flags: NodeFlags) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            span,
            parent,
            flags,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    pub fn text(&self, span: Span) -> &str {
        self.source.get(span.start..span.end).unwrap_or("")
    }

    pub fn package_name(&self) -> &str {
        match self.package.map(|id| self.kind(id)) {
            Some(NodeKind::Package { name, .. }) => name,
            _ => "",
        }
    }

    /// 1-based line and column (in characters) of a byte offset.
    pub fn line_column(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let start = self.line_starts.get(line).copied().unwrap_or(0);
        let column = self
            .source
            .get(start..offset.min(self.source.len()))
            .map(|s| s.chars().count())
            .unwrap_or(0);
        (line + 1, column + 1)
    }

    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            unit: self,
            next: self.node(id).parent,
        }
    }

    pub fn type_decl(&self, id: NodeId) -> Option<&TypeDecl> {
        match self.kind(id) {
            NodeKind::Type(decl) => Some(decl),
            _ => None,
        }
    }

    /// The innermost type declaration strictly enclosing `id`.
    pub fn enclosing_type(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .find(|&a| matches!(self.kind(a), NodeKind::Type(_)))
    }

    /// The innermost method, constructor, field, initializer or type around `id`.
    pub fn enclosing_member(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id).find(|&a| {
            matches!(
                self.kind(a),
                NodeKind::Method(_)
                    | NodeKind::Constructor(_)
                    | NodeKind::Field(_)
                    | NodeKind::Initializer { .. }
                    | NodeKind::Type(_)
            )
        })
    }

    /// Member declarations directly inside a type body.
    pub fn members(&self, type_id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.ids()
            .skip(type_id.index() + 1)
            .filter(move |&id| self.node(id).parent == Some(type_id))
    }

    /// Children in source order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.ids()
            .skip(id.index() + 1)
            .filter(move |&child| self.node(child).parent == Some(id))
    }
}

pub struct Ancestors<'a> {
    unit: &'a ParsedUnit,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.unit.node(current).parent;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_and_column_are_one_based() {
        let unit = ParsedUnit::new("A.java", Arc::from("class A {\n  int x;\n}\n"), ContainerMask::ALL);
        assert_eq!(unit.line_column(0), (1, 1));
        assert_eq!(unit.line_column(12), (2, 3));
    }

    #[test]
    fn ancestors_walk_to_the_root() {
        let mut unit = ParsedUnit::new("A.java", Arc::from("class A {}"), ContainerMask::ALL);
        let root = unit.push(NodeKind::Expression, Span::new(0, 10), None, NodeFlags::empty());
        let mid = unit.push(NodeKind::This, Span::new(1, 5), Some(root), NodeFlags::empty());
        let leaf = unit.push(NodeKind::Super, Span::new(2, 3), Some(mid), NodeFlags::empty());
        assert_eq!(unit.ancestors(leaf).collect::<Vec<_>>(), vec![mid, root]);
        assert_eq!(unit.children(root).collect::<Vec<_>>(), vec![mid]);
    }
}
