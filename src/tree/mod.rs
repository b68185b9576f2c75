//! Syntax tree handed over by a front-end.
//!
//! The tree is a flat arena of nodes. Declarations and expressions carry the
//! resolver binding the front-end attached to them; nothing here resolves
//! anything on its own.

mod span;

pub use span::Span;

use std::fmt;

use crate::semantic::BindingId;

/// Syntax-node category. Detectors subscribe by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    CompilationUnit,
    Package,
    Import,
    Class,
    Interface,
    Enum,
    Record,
    AnnotationType,
    Method,
    Constructor,
    /// Formal parameter list of a method, constructor or record.
    Parameters,
    Parameter,
    /// Field, enum constant or local variable.
    Variable,
    Annotation,
    Block,
    ExpressionStatement,
    Return,
    MethodInvocation,
    /// Argument list of an invocation, instance creation or annotation.
    Arguments,
    NewClass,
    MemberSelect,
    Identifier,
    This,
    Super,
    Literal,
    Binary,
    Unary,
    /// Explicit `this(..)` or `super(..)` constructor call.
    ConstructorCall,
    Other,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::CompilationUnit => "compilation_unit",
            NodeKind::Package => "package",
            NodeKind::Import => "import",
            NodeKind::Class => "class",
            NodeKind::Interface => "interface",
            NodeKind::Enum => "enum",
            NodeKind::Record => "record",
            NodeKind::AnnotationType => "annotation_type",
            NodeKind::Method => "method",
            NodeKind::Constructor => "constructor",
            NodeKind::Parameters => "parameters",
            NodeKind::Parameter => "parameter",
            NodeKind::Variable => "variable",
            NodeKind::Annotation => "annotation",
            NodeKind::Block => "block",
            NodeKind::ExpressionStatement => "expression_statement",
            NodeKind::Return => "return",
            NodeKind::MethodInvocation => "method_invocation",
            NodeKind::Arguments => "arguments",
            NodeKind::NewClass => "new_class",
            NodeKind::MemberSelect => "member_select",
            NodeKind::Identifier => "identifier",
            NodeKind::This => "this",
            NodeKind::Super => "super",
            NodeKind::Literal => "literal",
            NodeKind::Binary => "binary",
            NodeKind::Unary => "unary",
            NodeKind::ConstructorCall => "constructor_call",
            NodeKind::Other => "other",
        }
    }

    /// Class, interface, enum, record or annotation type declaration.
    pub fn is_type_declaration(self) -> bool {
        matches!(
            self,
            NodeKind::Class
                | NodeKind::Interface
                | NodeKind::Enum
                | NodeKind::Record
                | NodeKind::AnnotationType
        )
    }

    pub fn is_method_like(self) -> bool {
        matches!(self, NodeKind::Method | NodeKind::Constructor)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
    Default,
    Synchronized,
    Native,
    Transient,
    Volatile,
    Strictfp,
}

impl Modifier {
    pub fn parse(keyword: &str) -> Option<Self> {
        let modifier = match keyword {
            "public" => Modifier::Public,
            "protected" => Modifier::Protected,
            "private" => Modifier::Private,
            "static" => Modifier::Static,
            "final" => Modifier::Final,
            "abstract" => Modifier::Abstract,
            "default" => Modifier::Default,
            "synchronized" => Modifier::Synchronized,
            "native" => Modifier::Native,
            "transient" => Modifier::Transient,
            "volatile" => Modifier::Volatile,
            "strictfp" => Modifier::Strictfp,
            _ => return None,
        };
        Some(modifier)
    }
}

/// Position of a child inside its parent, for children that are not
/// identified by their kind alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Role {
    #[default]
    Plain,
    /// Member of a type body.
    Member,
    /// Body block of a method, constructor or lambda.
    Body,
    /// Receiver of an invocation or member select.
    Receiver,
    /// Initializer of a variable.
    Initializer,
    /// Operand of a binary or unary expression.
    Operand,
    /// Expression of a statement.
    Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    span: Span,
    role: Role,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    binding: Option<BindingId>,
    type_binding: Option<BindingId>,
    name: Option<String>,
    name_span: Option<Span>,
    modifiers: Vec<Modifier>,
    text: Option<String>,
}

impl NodeData {
    fn new(kind: NodeKind, span: Span, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            span,
            role: Role::Plain,
            parent,
            children: Vec::new(),
            binding: None,
            type_binding: None,
            name: None,
            name_span: None,
            modifiers: Vec::new(),
            text: None,
        }
    }
}

/// Immutable syntax tree of one compilation unit.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    pub fn root(&self) -> Node<'_> {
        Node {
            tree: self,
            id: NodeId(0),
        }
    }

    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node { tree: self, id }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Pre-order enter / post-order exit events over the whole tree.
    pub fn walk(&self) -> Walk<'_> {
        self.root().walk()
    }

    /// All nodes in pre-order.
    pub fn nodes(&self) -> impl Iterator<Item = Node<'_>> + '_ {
        std::iter::once(self.root()).chain(self.root().descendants())
    }
}

/// Borrowed view of one node.
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t Tree,
    id: NodeId,
}

impl<'t> Node<'t> {
    fn data(&self) -> &'t NodeData {
        &self.tree.nodes[self.id.index()]
    }

    fn wrap(&self, id: NodeId) -> Node<'t> {
        Node { tree: self.tree, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t Tree {
        self.tree
    }

    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    pub fn role(&self) -> Role {
        self.data().role
    }

    pub fn span(&self) -> Span {
        self.data().span
    }

    /// Declared or referenced name: type, method, variable, annotation or
    /// invoked method name.
    pub fn name(&self) -> Option<&'t str> {
        self.data().name.as_deref()
    }

    /// Span of the name token, falling back to the node span.
    pub fn name_span(&self) -> Span {
        self.data().name_span.unwrap_or(self.data().span)
    }

    /// Declaration binding: the declared symbol for declarations, the
    /// referenced symbol for invocations, identifiers and annotations.
    pub fn binding(&self) -> Option<BindingId> {
        self.data().binding
    }

    /// Static type of an expression, when the front-end knows it.
    pub fn type_binding(&self) -> Option<BindingId> {
        self.data().type_binding
    }

    /// Literal text, operator, or declared type as written.
    pub fn text(&self) -> Option<&'t str> {
        self.data().text.as_deref()
    }

    pub fn modifiers(&self) -> &'t [Modifier] {
        &self.data().modifiers
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers().contains(&modifier)
    }

    pub fn parent(&self) -> Option<Node<'t>> {
        self.data().parent.map(|p| self.wrap(p))
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'t>> + 't {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |&id| Node { tree, id })
    }

    fn child_with_role(&self, role: Role) -> Option<Node<'t>> {
        self.children().find(|c| c.role() == role)
    }

    fn child_of_kind(&self, kind: NodeKind) -> Option<Node<'t>> {
        self.children().find(|c| c.kind() == kind)
    }

    pub fn annotations(&self) -> impl Iterator<Item = Node<'t>> + 't {
        self.children().filter(|c| c.kind() == NodeKind::Annotation)
    }

    /// Members of a type declaration body.
    pub fn members(&self) -> impl Iterator<Item = Node<'t>> + 't {
        self.children().filter(|c| c.role() == Role::Member)
    }

    /// Formal parameter list node, including its parentheses.
    pub fn parameter_list(&self) -> Option<Node<'t>> {
        self.child_of_kind(NodeKind::Parameters)
    }

    pub fn parameters(&self) -> Vec<Node<'t>> {
        self.parameter_list()
            .map(|list| list.children().filter(|c| c.kind() == NodeKind::Parameter).collect())
            .unwrap_or_default()
    }

    pub fn body(&self) -> Option<Node<'t>> {
        self.child_with_role(Role::Body)
    }

    pub fn receiver(&self) -> Option<Node<'t>> {
        self.child_with_role(Role::Receiver)
    }

    pub fn initializer(&self) -> Option<Node<'t>> {
        self.child_with_role(Role::Initializer)
    }

    pub fn expression(&self) -> Option<Node<'t>> {
        self.child_with_role(Role::Expression)
    }

    pub fn operands(&self) -> Vec<Node<'t>> {
        self.children().filter(|c| c.role() == Role::Operand).collect()
    }

    /// Argument expressions of an invocation, instance creation, explicit
    /// constructor call or annotation.
    pub fn arguments(&self) -> Vec<Node<'t>> {
        self.child_of_kind(NodeKind::Arguments)
            .map(|args| args.children().collect())
            .unwrap_or_default()
    }

    /// Statements of a block, or of the body block of a method.
    pub fn statements(&self) -> Vec<Node<'t>> {
        match self.kind() {
            NodeKind::Block => self.children().collect(),
            _ => self.body().map(|b| b.statements()).unwrap_or_default(),
        }
    }

    /// All nodes below this one, pre-order.
    pub fn descendants(&self) -> impl Iterator<Item = Node<'t>> + 't {
        self.walk()
            .filter_map(|event| match event {
                WalkEvent::Enter(node) => Some(node),
                WalkEvent::Exit(_) => None,
            })
            .skip(1)
    }

    /// Parent, grandparent, and so on up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = Node<'t>> + 't {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// Nearest enclosing type declaration.
    pub fn enclosing_type(&self) -> Option<Node<'t>> {
        self.ancestors().find(|n| n.kind().is_type_declaration())
    }

    pub fn walk(&self) -> Walk<'t> {
        Walk {
            tree: self.tree,
            stack: vec![(self.id, false)],
        }
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.tree, other.tree)
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}({}) @{}", self.kind(), name, self.span()),
            None => write!(f, "{} @{}", self.kind(), self.span()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEvent<'t> {
    /// Node reached, before its children.
    Enter(Node<'t>),
    /// All children done.
    Exit(Node<'t>),
}

/// Depth-first traversal producing enter and exit events.
pub struct Walk<'t> {
    tree: &'t Tree,
    stack: Vec<(NodeId, bool)>,
}

impl<'t> Iterator for Walk<'t> {
    type Item = WalkEvent<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let (id, entered) = self.stack.pop()?;
        let node = self.tree.node(id);
        if entered {
            return Some(WalkEvent::Exit(node));
        }
        self.stack.push((id, true));
        let children = &self.tree.nodes[id.index()].children;
        self.stack
            .extend(children.iter().rev().map(|&child| (child, false)));
        Some(WalkEvent::Enter(node))
    }
}

/// Incremental tree construction. Nodes are opened and closed in source
/// order; an opened node becomes the parent of every node started before it
/// is finished.
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    /// Start a tree whose root is a compilation unit spanning `span`.
    pub fn new(span: Span) -> Self {
        Self {
            nodes: vec![NodeData::new(NodeKind::CompilationUnit, span, None)],
            open: vec![NodeId(0)],
        }
    }

    /// Open a child of the innermost open node.
    pub fn start(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let parent = self.open.last().copied().unwrap_or(NodeId(0));
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData::new(kind, span, Some(parent)));
        self.nodes[parent.index()].children.push(id);
        self.open.push(id);
        id
    }

    /// Close the innermost open node. The root is never closed.
    pub fn finish(&mut self) -> NodeId {
        if self.open.len() > 1 {
            self.open.pop().unwrap_or(NodeId(0))
        } else {
            NodeId(0)
        }
    }

    /// Add a childless node.
    pub fn leaf(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = self.start(kind, span);
        self.finish();
        id
    }

    pub fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(NodeId(0))
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.index()].kind
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>, span: Span) -> &mut Self {
        let node = &mut self.nodes[id.index()];
        node.name = Some(name.into());
        node.name_span = Some(span);
        self
    }

    pub fn set_role(&mut self, id: NodeId, role: Role) -> &mut Self {
        self.nodes[id.index()].role = role;
        self
    }

    pub fn set_binding(&mut self, id: NodeId, binding: BindingId) -> &mut Self {
        self.nodes[id.index()].binding = Some(binding);
        self
    }

    pub fn binding(&self, id: NodeId) -> Option<BindingId> {
        self.nodes[id.index()].binding
    }

    pub fn set_type_binding(&mut self, id: NodeId, binding: BindingId) -> &mut Self {
        self.nodes[id.index()].type_binding = Some(binding);
        self
    }

    pub fn type_binding(&self, id: NodeId) -> Option<BindingId> {
        self.nodes[id.index()].type_binding
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> &mut Self {
        self.nodes[id.index()].text = Some(text.into());
        self
    }

    pub fn add_modifier(&mut self, id: NodeId, modifier: Modifier) -> &mut Self {
        self.nodes[id.index()].modifiers.push(modifier);
        self
    }

    pub fn build(self) -> Tree {
        Tree { nodes: self.nodes }
    }
}
