//! Arena-allocated AST nodes.
//!
//! Every node lives in a `NodeArena` and refers to its children by `NodeId`.
//! `NodeData` is a closed set of child-slot shapes; several kinds share a
//! shape (all function-likes use `FunctionLike`, all identifiers and literals
//! use `Text`), and the node's `kind` tells them apart.

use crate::syntax_kind::SyntaxKind;
use crate::types::*;
use serde::{Deserialize, Serialize};
use tsbind_core::intern::{InternedString, StringInterner};
use tsbind_core::text::TextRange;

// ============================================================================
// Node
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub kind: SyntaxKind,
    pub range: TextRange,
    #[serde(default)]
    pub flags: NodeFlags,
    #[serde(default)]
    pub modifier_flags: ModifierFlags,
    pub data: NodeData,
}

impl Node {
    #[inline]
    pub fn pos(&self) -> u32 {
        self.range.pos
    }

    #[inline]
    pub fn end(&self) -> u32 {
        self.range.end
    }

    #[inline]
    pub fn has_modifier(&self, flags: ModifierFlags) -> bool {
        self.modifier_flags.intersects(flags)
    }
}

/// Child slots of a node, by shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum NodeData {
    /// Tokens, keyword expressions, keyword types, `;`, `debugger`.
    None,
    /// Identifiers, private identifiers and literals. String literal text is unquoted.
    Text { text: InternedString },
    QualifiedName { left: NodeId, right: NodeId },
    ComputedPropertyName { expression: NodeId },
    TypeParameter {
        name: NodeId,
        constraint: Option<NodeId>,
        default: Option<NodeId>,
    },
    Parameter {
        dot_dot_dot_token: bool,
        name: NodeId,
        question_token: bool,
        type_annotation: Option<NodeId>,
        initializer: Option<NodeId>,
    },
    /// `PropertySignature`, `PropertyDeclaration`.
    Property {
        name: NodeId,
        question_token: bool,
        type_annotation: Option<NodeId>,
        initializer: Option<NodeId>,
    },
    /// Every function-like kind, signatures and function/constructor types included.
    FunctionLike {
        name: Option<NodeId>,
        asterisk_token: bool,
        question_token: bool,
        type_parameters: Vec<NodeId>,
        parameters: Vec<NodeId>,
        return_type: Option<NodeId>,
        body: Option<NodeId>,
    },
    ClassStaticBlock { body: NodeId },

    // Types
    TypeReference { type_name: NodeId, type_arguments: Vec<NodeId> },
    TypeQuery { expr_name: NodeId, type_arguments: Vec<NodeId> },
    /// `TypeLiteral` members.
    Members { members: Vec<NodeId> },
    /// `ArrayType`, `ParenthesizedType`, `TypeOperator`.
    WrappedType { type_node: NodeId },
    /// `TupleType`, `UnionType`, `IntersectionType`.
    Types { types: Vec<NodeId> },
    ConditionalType {
        check_type: NodeId,
        extends_type: NodeId,
        true_type: NodeId,
        false_type: NodeId,
    },
    InferType { type_parameter: NodeId },
    IndexedAccessType { object_type: NodeId, index_type: NodeId },
    MappedType {
        type_parameter: NodeId,
        name_type: Option<NodeId>,
        type_node: Option<NodeId>,
        members: Vec<NodeId>,
    },
    LiteralType { literal: NodeId },

    // Binding patterns
    /// `ObjectBindingPattern`, `ArrayBindingPattern`.
    BindingPattern { elements: Vec<NodeId> },
    BindingElement {
        dot_dot_dot_token: bool,
        property_name: Option<NodeId>,
        name: NodeId,
        initializer: Option<NodeId>,
    },

    // Expressions
    /// `ArrayLiteralExpression` elements, `ObjectLiteralExpression` properties.
    Elements { elements: Vec<NodeId> },
    PropertyAccess {
        expression: NodeId,
        question_dot_token: bool,
        name: NodeId,
    },
    ElementAccess {
        expression: NodeId,
        question_dot_token: bool,
        argument_expression: NodeId,
    },
    /// `CallExpression`, `NewExpression`.
    Call {
        expression: NodeId,
        question_dot_token: bool,
        type_arguments: Vec<NodeId>,
        arguments: Vec<NodeId>,
    },
    /// Single-expression wrappers: parenthesized, `delete`, `typeof`, `void`,
    /// `await`, spread, non-null, expression/throw statements, spread
    /// assignments, external module references, decorators.
    Wrapped { expression: NodeId },
    /// `PrefixUnaryExpression`, `PostfixUnaryExpression`.
    Unary { operator: SyntaxKind, operand: NodeId },
    Binary {
        left: NodeId,
        operator: SyntaxKind,
        right: NodeId,
    },
    Conditional {
        condition: NodeId,
        when_true: NodeId,
        when_false: NodeId,
    },
    Yield { asterisk_token: bool, expression: Option<NodeId> },
    /// `ClassDeclaration`, `ClassExpression`.
    Class {
        name: Option<NodeId>,
        type_parameters: Vec<NodeId>,
        heritage_clauses: Vec<NodeId>,
        members: Vec<NodeId>,
    },
    ExpressionWithTypeArguments { expression: NodeId, type_arguments: Vec<NodeId> },
    /// `AsExpression`, `SatisfiesExpression`.
    TypeAssertion { expression: NodeId, type_node: NodeId },
    MetaProperty { keyword_token: SyntaxKind, name: NodeId },

    // Statements
    /// `Block`, `ModuleBlock`, `SourceFile`.
    Statements { statements: Vec<NodeId> },
    VariableStatement { declaration_list: NodeId },
    If {
        expression: NodeId,
        then_statement: NodeId,
        else_statement: Option<NodeId>,
    },
    Do { statement: NodeId, expression: NodeId },
    While { expression: NodeId, statement: NodeId },
    For {
        initializer: Option<NodeId>,
        condition: Option<NodeId>,
        incrementor: Option<NodeId>,
        statement: NodeId,
    },
    /// `ForInStatement`, `ForOfStatement`.
    ForInOrOf {
        await_modifier: bool,
        initializer: NodeId,
        expression: NodeId,
        statement: NodeId,
    },
    /// `BreakStatement`, `ContinueStatement`.
    Jump { label: Option<NodeId> },
    Return { expression: Option<NodeId> },
    With { expression: NodeId, statement: NodeId },
    Switch { expression: NodeId, case_block: NodeId },
    CaseBlock { clauses: Vec<NodeId> },
    Labeled { label: NodeId, statement: NodeId },
    Try {
        try_block: NodeId,
        catch_clause: Option<NodeId>,
        finally_block: Option<NodeId>,
    },

    // Declarations
    VariableDeclaration {
        name: NodeId,
        exclamation_token: bool,
        type_annotation: Option<NodeId>,
        initializer: Option<NodeId>,
    },
    VariableDeclarationList { declarations: Vec<NodeId> },
    Interface {
        name: NodeId,
        type_parameters: Vec<NodeId>,
        heritage_clauses: Vec<NodeId>,
        members: Vec<NodeId>,
    },
    TypeAlias {
        name: NodeId,
        type_parameters: Vec<NodeId>,
        type_node: Option<NodeId>,
    },
    Enum { name: NodeId, members: Vec<NodeId> },
    Module { name: NodeId, body: Option<NodeId> },
    /// `NamespaceExportDeclaration`, `NamespaceImport`, `NamespaceExport`.
    NamedDeclaration { name: NodeId },
    ImportEquals {
        is_type_only: bool,
        name: NodeId,
        module_reference: NodeId,
    },
    Import { import_clause: Option<NodeId>, module_specifier: NodeId },
    ImportClause {
        is_type_only: bool,
        name: Option<NodeId>,
        named_bindings: Option<NodeId>,
    },
    /// `NamedImports`, `NamedExports`.
    NamedBindings { elements: Vec<NodeId> },
    /// `ImportSpecifier`, `ExportSpecifier`.
    Specifier {
        is_type_only: bool,
        property_name: Option<NodeId>,
        name: NodeId,
    },
    ExportAssignment { is_export_equals: bool, expression: NodeId },
    ExportDeclaration {
        is_type_only: bool,
        export_clause: Option<NodeId>,
        module_specifier: Option<NodeId>,
    },
    /// `CaseClause` (with an expression) and `DefaultClause`.
    CaseClause { expression: Option<NodeId>, statements: Vec<NodeId> },
    HeritageClause { token: SyntaxKind, types: Vec<NodeId> },
    CatchClause { variable_declaration: Option<NodeId>, block: NodeId },
    PropertyAssignment { name: NodeId, initializer: NodeId },
    ShorthandPropertyAssignment {
        name: NodeId,
        object_assignment_initializer: Option<NodeId>,
    },
    EnumMember { name: NodeId, initializer: Option<NodeId> },
}

// ============================================================================
// Arena
// ============================================================================

/// Owner of every node of one source file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeArena {
    nodes: Vec<Node>,
    interner: StringInterner,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interner(interner: StringInterner) -> Self {
        Self {
            nodes: Vec::new(),
            interner,
        }
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(node);
        id
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.nodes[id.index()].kind
    }

    #[inline]
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()].data
    }

    #[inline]
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.nodes[id.index()].flags
    }

    #[inline]
    pub fn modifier_flags(&self, id: NodeId) -> ModifierFlags {
        self.nodes[id.index()].modifier_flags
    }

    #[inline]
    pub fn range(&self, id: NodeId) -> TextRange {
        self.nodes[id.index()].range
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId::from_index)
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Interned text of an identifier or literal node.
    pub fn text_key(&self, id: NodeId) -> Option<InternedString> {
        match self.data(id) {
            NodeData::Text { text } => Some(*text),
            _ => None,
        }
    }

    /// Text of an identifier or literal node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.text_key(id).map(|key| self.interner.resolve(key))
    }

    /// The `name` slot of a named declaration.
    pub fn name(&self, id: NodeId) -> Option<NodeId> {
        match self.data(id) {
            NodeData::TypeParameter { name, .. }
            | NodeData::Parameter { name, .. }
            | NodeData::Property { name, .. }
            | NodeData::PropertyAccess { name, .. }
            | NodeData::BindingElement { name, .. }
            | NodeData::MetaProperty { name, .. }
            | NodeData::VariableDeclaration { name, .. }
            | NodeData::Interface { name, .. }
            | NodeData::TypeAlias { name, .. }
            | NodeData::Enum { name, .. }
            | NodeData::Module { name, .. }
            | NodeData::NamedDeclaration { name }
            | NodeData::ImportEquals { name, .. }
            | NodeData::Specifier { name, .. }
            | NodeData::PropertyAssignment { name, .. }
            | NodeData::ShorthandPropertyAssignment { name, .. }
            | NodeData::EnumMember { name, .. } => Some(*name),
            NodeData::FunctionLike { name, .. } | NodeData::Class { name, .. } => *name,
            NodeData::ImportClause { name, .. } => *name,
            _ => None,
        }
    }

    /// The `expression` slot, for the kinds that have one.
    pub fn expression(&self, id: NodeId) -> Option<NodeId> {
        match self.data(id) {
            NodeData::ComputedPropertyName { expression }
            | NodeData::PropertyAccess { expression, .. }
            | NodeData::ElementAccess { expression, .. }
            | NodeData::Call { expression, .. }
            | NodeData::Wrapped { expression }
            | NodeData::ExpressionWithTypeArguments { expression, .. }
            | NodeData::TypeAssertion { expression, .. }
            | NodeData::If { expression, .. }
            | NodeData::Do { expression, .. }
            | NodeData::While { expression, .. }
            | NodeData::ForInOrOf { expression, .. }
            | NodeData::With { expression, .. }
            | NodeData::Switch { expression, .. }
            | NodeData::ExportAssignment { expression, .. } => Some(*expression),
            NodeData::Return { expression } | NodeData::Yield { expression, .. } => *expression,
            NodeData::CaseClause { expression, .. } => *expression,
            _ => None,
        }
    }

    pub fn initializer(&self, id: NodeId) -> Option<NodeId> {
        match self.data(id) {
            NodeData::Parameter { initializer, .. }
            | NodeData::Property { initializer, .. }
            | NodeData::BindingElement { initializer, .. }
            | NodeData::VariableDeclaration { initializer, .. }
            | NodeData::EnumMember { initializer, .. } => *initializer,
            NodeData::PropertyAssignment { initializer, .. } => Some(*initializer),
            _ => None,
        }
    }

    /// Body of a function-like, module or static block.
    pub fn body(&self, id: NodeId) -> Option<NodeId> {
        match self.data(id) {
            NodeData::FunctionLike { body, .. } | NodeData::Module { body, .. } => *body,
            NodeData::ClassStaticBlock { body } => Some(*body),
            _ => None,
        }
    }

    /// Statement list of a block-like node or a case clause.
    pub fn statements(&self, id: NodeId) -> &[NodeId] {
        match self.data(id) {
            NodeData::Statements { statements } | NodeData::CaseClause { statements, .. } => statements,
            _ => &[],
        }
    }

    pub fn parameters(&self, id: NodeId) -> &[NodeId] {
        match self.data(id) {
            NodeData::FunctionLike { parameters, .. } => parameters,
            _ => &[],
        }
    }

    pub fn arguments(&self, id: NodeId) -> &[NodeId] {
        match self.data(id) {
            NodeData::Call { arguments, .. } => arguments,
            _ => &[],
        }
    }

    /// Members of a class, interface, type literal, object literal or enum.
    pub fn members(&self, id: NodeId) -> &[NodeId] {
        match self.data(id) {
            NodeData::Class { members, .. }
            | NodeData::Interface { members, .. }
            | NodeData::Members { members }
            | NodeData::MappedType { members, .. }
            | NodeData::Enum { members, .. } => members,
            NodeData::Elements { elements } if self.kind(id) == SyntaxKind::ObjectLiteralExpression => elements,
            _ => &[],
        }
    }

    /// `?` on parameters, properties and methods.
    pub fn has_question_token(&self, id: NodeId) -> bool {
        match self.data(id) {
            NodeData::Parameter { question_token, .. }
            | NodeData::Property { question_token, .. }
            | NodeData::FunctionLike { question_token, .. } => *question_token,
            _ => false,
        }
    }
}

// ============================================================================
// Source File
// ============================================================================

/// One parsed source file: the binder's unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    pub file_name: String,
    pub text: String,
    pub arena: NodeArena,
    /// The `SourceFile` node holding the top-level statements.
    pub root: NodeId,
    #[serde(default)]
    pub is_declaration_file: bool,
    /// First import/export that makes this file a module.
    #[serde(default)]
    pub external_module_indicator: Option<NodeId>,
    /// Number of diagnostics the parser reported for this file.
    #[serde(default)]
    pub parse_diagnostic_count: usize,
}

impl SourceFile {
    /// Create a source file, computing the external module indicator.
    pub fn new(file_name: impl Into<String>, text: impl Into<String>, arena: NodeArena, root: NodeId) -> Self {
        let mut file = Self {
            file_name: file_name.into(),
            text: text.into(),
            arena,
            root,
            is_declaration_file: false,
            external_module_indicator: None,
            parse_diagnostic_count: 0,
        };
        file.is_declaration_file = file.file_name.ends_with(".d.ts")
            || file.file_name.ends_with(".d.mts")
            || file.file_name.ends_with(".d.cts");
        file.external_module_indicator = file.compute_external_module_indicator();
        file
    }

    pub fn statements(&self) -> &[NodeId] {
        self.arena.statements(self.root)
    }

    #[inline]
    pub fn is_external_module(&self) -> bool {
        self.external_module_indicator.is_some()
    }

    pub fn has_parse_diagnostics(&self) -> bool {
        self.parse_diagnostic_count > 0
    }

    fn compute_external_module_indicator(&self) -> Option<NodeId> {
        self.statements().iter().copied().find(|&statement| {
            let node = self.arena.get(statement);
            if node.has_modifier(ModifierFlags::EXPORT) {
                return true;
            }
            match &node.data {
                NodeData::Import { .. } | NodeData::ExportAssignment { .. } | NodeData::ExportDeclaration { .. } => {
                    true
                }
                NodeData::ImportEquals { module_reference, .. } => {
                    self.arena.kind(*module_reference) == SyntaxKind::ExternalModuleReference
                }
                _ => false,
            }
        })
    }
}
