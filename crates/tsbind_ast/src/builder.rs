//! AST construction without a parser.
//!
//! `AstBuilder` allocates nodes bottom-up. `finish` wraps the top-level
//! statements in a `SourceFile` node, marks ambient contexts, and lays the
//! tree out into synthetic source text: each node starts with one space of
//! leading trivia, then its modifier and keyword text, then its children in
//! source order. Identifier and literal text lands at the node's own range,
//! so first-token scanning and name ranges behave as they would on parsed
//! input.

use crate::node::{Node, NodeArena, NodeData, SourceFile};
use crate::syntax_kind::SyntaxKind;
use crate::types::*;
use crate::visitor::children;
use tsbind_core::intern::StringInterner;
use tsbind_core::text::TextRange;

#[derive(Debug, Default)]
pub struct AstBuilder {
    arena: NodeArena,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interner(interner: StringInterner) -> Self {
        Self {
            arena: NodeArena::with_interner(interner),
        }
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Allocate a node with an empty range; `finish` assigns ranges.
    pub fn node(&mut self, kind: SyntaxKind, data: NodeData) -> NodeId {
        self.arena.alloc(Node {
            kind,
            range: TextRange::default(),
            flags: NodeFlags::NONE,
            modifier_flags: ModifierFlags::NONE,
            data,
        })
    }

    pub fn with_modifiers(&mut self, id: NodeId, modifiers: ModifierFlags) -> NodeId {
        self.arena.get_mut(id).modifier_flags |= modifiers;
        id
    }

    pub fn with_flags(&mut self, id: NodeId, flags: NodeFlags) -> NodeId {
        self.arena.get_mut(id).flags |= flags;
        id
    }

    pub fn export(&mut self, id: NodeId) -> NodeId {
        self.with_modifiers(id, ModifierFlags::EXPORT)
    }

    pub fn declare(&mut self, id: NodeId) -> NodeId {
        self.with_modifiers(id, ModifierFlags::AMBIENT)
    }

    fn text_node(&mut self, kind: SyntaxKind, text: &str) -> NodeId {
        let text = self.arena.interner().intern(text);
        self.node(kind, NodeData::Text { text })
    }

    // ========================================================================
    // Names and literals
    // ========================================================================

    pub fn ident(&mut self, name: &str) -> NodeId {
        self.text_node(SyntaxKind::Identifier, name)
    }

    /// A private name; `name` includes the leading `#`.
    pub fn private_ident(&mut self, name: &str) -> NodeId {
        self.text_node(SyntaxKind::PrivateIdentifier, name)
    }

    /// A string literal; `value` is the unquoted text.
    pub fn string(&mut self, value: &str) -> NodeId {
        self.text_node(SyntaxKind::StringLiteral, value)
    }

    pub fn num(&mut self, value: &str) -> NodeId {
        self.text_node(SyntaxKind::NumericLiteral, value)
    }

    pub fn template(&mut self, value: &str) -> NodeId {
        self.text_node(SyntaxKind::NoSubstitutionTemplateLiteral, value)
    }

    /// `this`, `super`, `true`, `false`, `null`, keyword types.
    pub fn keyword(&mut self, kind: SyntaxKind) -> NodeId {
        self.node(kind, NodeData::None)
    }

    pub fn this(&mut self) -> NodeId {
        self.keyword(SyntaxKind::ThisKeyword)
    }

    pub fn super_(&mut self) -> NodeId {
        self.keyword(SyntaxKind::SuperKeyword)
    }

    pub fn bool_lit(&mut self, value: bool) -> NodeId {
        self.keyword(if value { SyntaxKind::TrueKeyword } else { SyntaxKind::FalseKeyword })
    }

    pub fn computed(&mut self, expression: NodeId) -> NodeId {
        self.node(SyntaxKind::ComputedPropertyName, NodeData::ComputedPropertyName { expression })
    }

    pub fn qualified(&mut self, left: NodeId, right: &str) -> NodeId {
        let right = self.ident(right);
        self.node(SyntaxKind::QualifiedName, NodeData::QualifiedName { left, right })
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub fn prop(&mut self, expression: NodeId, name: &str) -> NodeId {
        let name = self.ident(name);
        self.node(
            SyntaxKind::PropertyAccessExpression,
            NodeData::PropertyAccess {
                expression,
                question_dot_token: false,
                name,
            },
        )
    }

    /// A property access inside an optional chain. `question_dot` marks `?.`.
    pub fn prop_chain(&mut self, expression: NodeId, name: &str, question_dot: bool) -> NodeId {
        let name = self.ident(name);
        let id = self.node(
            SyntaxKind::PropertyAccessExpression,
            NodeData::PropertyAccess {
                expression,
                question_dot_token: question_dot,
                name,
            },
        );
        self.with_flags(id, NodeFlags::OPTIONAL_CHAIN)
    }

    pub fn private_prop(&mut self, expression: NodeId, name: &str) -> NodeId {
        let name = self.private_ident(name);
        self.node(
            SyntaxKind::PropertyAccessExpression,
            NodeData::PropertyAccess {
                expression,
                question_dot_token: false,
                name,
            },
        )
    }

    pub fn elem(&mut self, expression: NodeId, argument_expression: NodeId) -> NodeId {
        self.node(
            SyntaxKind::ElementAccessExpression,
            NodeData::ElementAccess {
                expression,
                question_dot_token: false,
                argument_expression,
            },
        )
    }

    pub fn call(&mut self, expression: NodeId, arguments: Vec<NodeId>) -> NodeId {
        self.node(
            SyntaxKind::CallExpression,
            NodeData::Call {
                expression,
                question_dot_token: false,
                type_arguments: Vec::new(),
                arguments,
            },
        )
    }

    /// A call inside an optional chain. `question_dot` marks `?.(`.
    pub fn call_chain(&mut self, expression: NodeId, arguments: Vec<NodeId>, question_dot: bool) -> NodeId {
        let id = self.node(
            SyntaxKind::CallExpression,
            NodeData::Call {
                expression,
                question_dot_token: question_dot,
                type_arguments: Vec::new(),
                arguments,
            },
        );
        self.with_flags(id, NodeFlags::OPTIONAL_CHAIN)
    }

    pub fn new_expr(&mut self, expression: NodeId, arguments: Vec<NodeId>) -> NodeId {
        self.node(
            SyntaxKind::NewExpression,
            NodeData::Call {
                expression,
                question_dot_token: false,
                type_arguments: Vec::new(),
                arguments,
            },
        )
    }

    fn wrapped(&mut self, kind: SyntaxKind, expression: NodeId) -> NodeId {
        self.node(kind, NodeData::Wrapped { expression })
    }

    pub fn paren(&mut self, expression: NodeId) -> NodeId {
        self.wrapped(SyntaxKind::ParenthesizedExpression, expression)
    }

    pub fn delete(&mut self, expression: NodeId) -> NodeId {
        self.wrapped(SyntaxKind::DeleteExpression, expression)
    }

    pub fn type_of(&mut self, expression: NodeId) -> NodeId {
        self.wrapped(SyntaxKind::TypeOfExpression, expression)
    }

    pub fn void(&mut self, expression: NodeId) -> NodeId {
        self.wrapped(SyntaxKind::VoidExpression, expression)
    }

    pub fn await_expr(&mut self, expression: NodeId) -> NodeId {
        self.wrapped(SyntaxKind::AwaitExpression, expression)
    }

    pub fn non_null(&mut self, expression: NodeId) -> NodeId {
        self.wrapped(SyntaxKind::NonNullExpression, expression)
    }

    pub fn spread(&mut self, expression: NodeId) -> NodeId {
        self.wrapped(SyntaxKind::SpreadElement, expression)
    }

    pub fn spread_assignment(&mut self, expression: NodeId) -> NodeId {
        self.wrapped(SyntaxKind::SpreadAssignment, expression)
    }

    pub fn binary(&mut self, left: NodeId, operator: SyntaxKind, right: NodeId) -> NodeId {
        self.node(SyntaxKind::BinaryExpression, NodeData::Binary { left, operator, right })
    }

    pub fn assign(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.binary(left, SyntaxKind::EqualsToken, right)
    }

    pub fn prefix(&mut self, operator: SyntaxKind, operand: NodeId) -> NodeId {
        self.node(SyntaxKind::PrefixUnaryExpression, NodeData::Unary { operator, operand })
    }

    pub fn postfix(&mut self, operand: NodeId, operator: SyntaxKind) -> NodeId {
        self.node(SyntaxKind::PostfixUnaryExpression, NodeData::Unary { operator, operand })
    }

    pub fn conditional(&mut self, condition: NodeId, when_true: NodeId, when_false: NodeId) -> NodeId {
        self.node(
            SyntaxKind::ConditionalExpression,
            NodeData::Conditional {
                condition,
                when_true,
                when_false,
            },
        )
    }

    pub fn yield_expr(&mut self, expression: Option<NodeId>) -> NodeId {
        self.node(
            SyntaxKind::YieldExpression,
            NodeData::Yield {
                asterisk_token: false,
                expression,
            },
        )
    }

    pub fn array_lit(&mut self, elements: Vec<NodeId>) -> NodeId {
        self.node(SyntaxKind::ArrayLiteralExpression, NodeData::Elements { elements })
    }

    pub fn object_lit(&mut self, properties: Vec<NodeId>) -> NodeId {
        self.node(SyntaxKind::ObjectLiteralExpression, NodeData::Elements { elements: properties })
    }

    pub fn omitted(&mut self) -> NodeId {
        self.node(SyntaxKind::OmittedExpression, NodeData::None)
    }

    pub fn property_assignment(&mut self, name: NodeId, initializer: NodeId) -> NodeId {
        self.node(SyntaxKind::PropertyAssignment, NodeData::PropertyAssignment { name, initializer })
    }

    pub fn shorthand(&mut self, name: &str) -> NodeId {
        let name = self.ident(name);
        self.node(
            SyntaxKind::ShorthandPropertyAssignment,
            NodeData::ShorthandPropertyAssignment {
                name,
                object_assignment_initializer: None,
            },
        )
    }

    pub fn function_expr(&mut self, name: Option<&str>, parameters: Vec<NodeId>, body: NodeId) -> NodeId {
        let name = name.map(|n| self.ident(n));
        self.function_like(SyntaxKind::FunctionExpression, name, parameters, Some(body))
    }

    pub fn arrow(&mut self, parameters: Vec<NodeId>, body: NodeId) -> NodeId {
        self.function_like(SyntaxKind::ArrowFunction, None, parameters, Some(body))
    }

    pub fn class_expr(&mut self, name: Option<&str>, members: Vec<NodeId>) -> NodeId {
        let name = name.map(|n| self.ident(n));
        self.class_like(SyntaxKind::ClassExpression, name, Vec::new(), members)
    }

    pub fn as_expr(&mut self, expression: NodeId, type_node: NodeId) -> NodeId {
        self.node(SyntaxKind::AsExpression, NodeData::TypeAssertion { expression, type_node })
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn block(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.node(SyntaxKind::Block, NodeData::Statements { statements })
    }

    pub fn empty(&mut self) -> NodeId {
        self.node(SyntaxKind::EmptyStatement, NodeData::None)
    }

    pub fn debugger(&mut self) -> NodeId {
        self.node(SyntaxKind::DebuggerStatement, NodeData::None)
    }

    pub fn expr_stmt(&mut self, expression: NodeId) -> NodeId {
        self.wrapped(SyntaxKind::ExpressionStatement, expression)
    }

    /// `"use strict";`
    pub fn use_strict(&mut self) -> NodeId {
        let lit = self.string("use strict");
        self.expr_stmt(lit)
    }

    pub fn var_decl(&mut self, name: &str, initializer: Option<NodeId>) -> NodeId {
        let name = self.ident(name);
        self.var_decl_named(name, initializer)
    }

    /// A variable declaration whose name is an identifier or binding pattern.
    pub fn var_decl_named(&mut self, name: NodeId, initializer: Option<NodeId>) -> NodeId {
        self.node(
            SyntaxKind::VariableDeclaration,
            NodeData::VariableDeclaration {
                name,
                exclamation_token: false,
                type_annotation: None,
                initializer,
            },
        )
    }

    /// A declaration list; `flags` is `NONE` (var), `LET` or `CONST`.
    pub fn var_list(&mut self, flags: NodeFlags, declarations: Vec<NodeId>) -> NodeId {
        let list = self.node(
            SyntaxKind::VariableDeclarationList,
            NodeData::VariableDeclarationList { declarations },
        );
        self.with_flags(list, flags)
    }

    pub fn var_stmt(&mut self, flags: NodeFlags, declarations: Vec<NodeId>) -> NodeId {
        let declaration_list = self.var_list(flags, declarations);
        self.node(SyntaxKind::VariableStatement, NodeData::VariableStatement { declaration_list })
    }

    pub fn if_stmt(&mut self, expression: NodeId, then_statement: NodeId, else_statement: Option<NodeId>) -> NodeId {
        self.node(
            SyntaxKind::IfStatement,
            NodeData::If {
                expression,
                then_statement,
                else_statement,
            },
        )
    }

    pub fn while_stmt(&mut self, expression: NodeId, statement: NodeId) -> NodeId {
        self.node(SyntaxKind::WhileStatement, NodeData::While { expression, statement })
    }

    pub fn do_stmt(&mut self, statement: NodeId, expression: NodeId) -> NodeId {
        self.node(SyntaxKind::DoStatement, NodeData::Do { statement, expression })
    }

    pub fn for_stmt(
        &mut self,
        initializer: Option<NodeId>,
        condition: Option<NodeId>,
        incrementor: Option<NodeId>,
        statement: NodeId,
    ) -> NodeId {
        self.node(
            SyntaxKind::ForStatement,
            NodeData::For {
                initializer,
                condition,
                incrementor,
                statement,
            },
        )
    }

    pub fn for_in(&mut self, initializer: NodeId, expression: NodeId, statement: NodeId) -> NodeId {
        self.for_in_or_of(SyntaxKind::ForInStatement, initializer, expression, statement)
    }

    pub fn for_of(&mut self, initializer: NodeId, expression: NodeId, statement: NodeId) -> NodeId {
        self.for_in_or_of(SyntaxKind::ForOfStatement, initializer, expression, statement)
    }

    fn for_in_or_of(&mut self, kind: SyntaxKind, initializer: NodeId, expression: NodeId, statement: NodeId) -> NodeId {
        self.node(
            kind,
            NodeData::ForInOrOf {
                await_modifier: false,
                initializer,
                expression,
                statement,
            },
        )
    }

    pub fn break_stmt(&mut self, label: Option<&str>) -> NodeId {
        let label = label.map(|l| self.ident(l));
        self.node(SyntaxKind::BreakStatement, NodeData::Jump { label })
    }

    pub fn continue_stmt(&mut self, label: Option<&str>) -> NodeId {
        let label = label.map(|l| self.ident(l));
        self.node(SyntaxKind::ContinueStatement, NodeData::Jump { label })
    }

    pub fn return_stmt(&mut self, expression: Option<NodeId>) -> NodeId {
        self.node(SyntaxKind::ReturnStatement, NodeData::Return { expression })
    }

    pub fn throw_stmt(&mut self, expression: NodeId) -> NodeId {
        self.wrapped(SyntaxKind::ThrowStatement, expression)
    }

    pub fn with_stmt(&mut self, expression: NodeId, statement: NodeId) -> NodeId {
        self.node(SyntaxKind::WithStatement, NodeData::With { expression, statement })
    }

    pub fn labeled(&mut self, label: &str, statement: NodeId) -> NodeId {
        let label = self.ident(label);
        self.node(SyntaxKind::LabeledStatement, NodeData::Labeled { label, statement })
    }

    pub fn try_stmt(&mut self, try_block: NodeId, catch_clause: Option<NodeId>, finally_block: Option<NodeId>) -> NodeId {
        self.node(
            SyntaxKind::TryStatement,
            NodeData::Try {
                try_block,
                catch_clause,
                finally_block,
            },
        )
    }

    pub fn catch_clause(&mut self, variable: Option<&str>, block: NodeId) -> NodeId {
        let variable_declaration = variable.map(|v| self.var_decl(v, None));
        self.node(
            SyntaxKind::CatchClause,
            NodeData::CatchClause {
                variable_declaration,
                block,
            },
        )
    }

    pub fn switch_stmt(&mut self, expression: NodeId, clauses: Vec<NodeId>) -> NodeId {
        let case_block = self.node(SyntaxKind::CaseBlock, NodeData::CaseBlock { clauses });
        self.node(SyntaxKind::SwitchStatement, NodeData::Switch { expression, case_block })
    }

    pub fn case_clause(&mut self, expression: NodeId, statements: Vec<NodeId>) -> NodeId {
        self.node(
            SyntaxKind::CaseClause,
            NodeData::CaseClause {
                expression: Some(expression),
                statements,
            },
        )
    }

    pub fn default_clause(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.node(
            SyntaxKind::DefaultClause,
            NodeData::CaseClause {
                expression: None,
                statements,
            },
        )
    }

    // ========================================================================
    // Functions and classes
    // ========================================================================

    pub fn function_like(
        &mut self,
        kind: SyntaxKind,
        name: Option<NodeId>,
        parameters: Vec<NodeId>,
        body: Option<NodeId>,
    ) -> NodeId {
        self.node(
            kind,
            NodeData::FunctionLike {
                name,
                asterisk_token: false,
                question_token: false,
                type_parameters: Vec::new(),
                parameters,
                return_type: None,
                body,
            },
        )
    }

    pub fn function_decl(&mut self, name: Option<&str>, parameters: Vec<NodeId>, body: Option<NodeId>) -> NodeId {
        let name = name.map(|n| self.ident(n));
        self.function_like(SyntaxKind::FunctionDeclaration, name, parameters, body)
    }

    pub fn param(&mut self, name: &str) -> NodeId {
        let name = self.ident(name);
        self.param_named(name, None)
    }

    /// A parameter whose name is an identifier or binding pattern.
    pub fn param_named(&mut self, name: NodeId, initializer: Option<NodeId>) -> NodeId {
        self.node(
            SyntaxKind::Parameter,
            NodeData::Parameter {
                dot_dot_dot_token: false,
                name,
                question_token: false,
                type_annotation: None,
                initializer,
            },
        )
    }

    pub fn type_param(&mut self, name: &str) -> NodeId {
        let name = self.ident(name);
        self.node(
            SyntaxKind::TypeParameter,
            NodeData::TypeParameter {
                name,
                constraint: None,
                default: None,
            },
        )
    }

    /// Attach type parameters to a function-like, class, interface or type alias.
    pub fn with_type_parameters(&mut self, id: NodeId, params: Vec<NodeId>) -> NodeId {
        match &mut self.arena.get_mut(id).data {
            NodeData::FunctionLike { type_parameters, .. }
            | NodeData::Class { type_parameters, .. }
            | NodeData::Interface { type_parameters, .. }
            | NodeData::TypeAlias { type_parameters, .. } => type_parameters.extend(params),
            _ => {}
        }
        id
    }

    fn class_like(
        &mut self,
        kind: SyntaxKind,
        name: Option<NodeId>,
        heritage_clauses: Vec<NodeId>,
        members: Vec<NodeId>,
    ) -> NodeId {
        self.node(
            kind,
            NodeData::Class {
                name,
                type_parameters: Vec::new(),
                heritage_clauses,
                members,
            },
        )
    }

    pub fn class_decl(&mut self, name: Option<&str>, members: Vec<NodeId>) -> NodeId {
        let name = name.map(|n| self.ident(n));
        self.class_like(SyntaxKind::ClassDeclaration, name, Vec::new(), members)
    }

    pub fn heritage(&mut self, token: SyntaxKind, expressions: Vec<NodeId>) -> NodeId {
        let types = expressions
            .into_iter()
            .map(|expression| {
                self.node(
                    SyntaxKind::ExpressionWithTypeArguments,
                    NodeData::ExpressionWithTypeArguments {
                        expression,
                        type_arguments: Vec::new(),
                    },
                )
            })
            .collect();
        self.node(SyntaxKind::HeritageClause, NodeData::HeritageClause { token, types })
    }

    pub fn with_heritage(&mut self, id: NodeId, clauses: Vec<NodeId>) -> NodeId {
        match &mut self.arena.get_mut(id).data {
            NodeData::Class { heritage_clauses, .. } | NodeData::Interface { heritage_clauses, .. } => {
                heritage_clauses.extend(clauses)
            }
            _ => {}
        }
        id
    }

    pub fn property_decl(&mut self, name: NodeId, initializer: Option<NodeId>) -> NodeId {
        self.property(SyntaxKind::PropertyDeclaration, name, false, initializer)
    }

    pub fn property_sig(&mut self, name: NodeId, optional: bool) -> NodeId {
        self.property(SyntaxKind::PropertySignature, name, optional, None)
    }

    fn property(&mut self, kind: SyntaxKind, name: NodeId, question_token: bool, initializer: Option<NodeId>) -> NodeId {
        self.node(
            kind,
            NodeData::Property {
                name,
                question_token,
                type_annotation: None,
                initializer,
            },
        )
    }

    pub fn method(&mut self, name: NodeId, parameters: Vec<NodeId>, body: Option<NodeId>) -> NodeId {
        self.function_like(SyntaxKind::MethodDeclaration, Some(name), parameters, body)
    }

    pub fn method_sig(&mut self, name: NodeId, parameters: Vec<NodeId>) -> NodeId {
        self.function_like(SyntaxKind::MethodSignature, Some(name), parameters, None)
    }

    pub fn constructor(&mut self, parameters: Vec<NodeId>, body: Option<NodeId>) -> NodeId {
        self.function_like(SyntaxKind::Constructor, None, parameters, body)
    }

    pub fn get_accessor(&mut self, name: NodeId, body: Option<NodeId>) -> NodeId {
        self.function_like(SyntaxKind::GetAccessor, Some(name), Vec::new(), body)
    }

    pub fn set_accessor(&mut self, name: NodeId, parameters: Vec<NodeId>, body: Option<NodeId>) -> NodeId {
        self.function_like(SyntaxKind::SetAccessor, Some(name), parameters, body)
    }

    pub fn static_block(&mut self, body: NodeId) -> NodeId {
        self.node(SyntaxKind::ClassStaticBlockDeclaration, NodeData::ClassStaticBlock { body })
    }

    /// Call, construct and index signatures.
    pub fn signature(&mut self, kind: SyntaxKind, parameters: Vec<NodeId>) -> NodeId {
        self.function_like(kind, None, parameters, None)
    }

    // ========================================================================
    // Types
    // ========================================================================

    pub fn type_ref(&mut self, name: &str) -> NodeId {
        let type_name = self.ident(name);
        self.node(
            SyntaxKind::TypeReference,
            NodeData::TypeReference {
                type_name,
                type_arguments: Vec::new(),
            },
        )
    }

    pub fn type_query(&mut self, expr_name: NodeId) -> NodeId {
        self.node(
            SyntaxKind::TypeQuery,
            NodeData::TypeQuery {
                expr_name,
                type_arguments: Vec::new(),
            },
        )
    }

    pub fn type_literal(&mut self, members: Vec<NodeId>) -> NodeId {
        self.node(SyntaxKind::TypeLiteral, NodeData::Members { members })
    }

    pub fn this_type(&mut self) -> NodeId {
        self.node(SyntaxKind::ThisType, NodeData::None)
    }

    pub fn array_type(&mut self, element: NodeId) -> NodeId {
        self.node(SyntaxKind::ArrayType, NodeData::WrappedType { type_node: element })
    }

    pub fn union_type(&mut self, types: Vec<NodeId>) -> NodeId {
        self.node(SyntaxKind::UnionType, NodeData::Types { types })
    }

    pub fn function_type(&mut self, parameters: Vec<NodeId>, return_type: NodeId) -> NodeId {
        let id = self.function_like(SyntaxKind::FunctionType, None, parameters, None);
        self.set_return_type(id, return_type)
    }

    pub fn constructor_type(&mut self, parameters: Vec<NodeId>, return_type: NodeId) -> NodeId {
        let id = self.function_like(SyntaxKind::ConstructorType, None, parameters, None);
        self.set_return_type(id, return_type)
    }

    fn set_return_type(&mut self, id: NodeId, ty: NodeId) -> NodeId {
        if let NodeData::FunctionLike { return_type, .. } = &mut self.arena.get_mut(id).data {
            *return_type = Some(ty);
        }
        id
    }

    pub fn conditional_type(&mut self, check_type: NodeId, extends_type: NodeId, true_type: NodeId, false_type: NodeId) -> NodeId {
        self.node(
            SyntaxKind::ConditionalType,
            NodeData::ConditionalType {
                check_type,
                extends_type,
                true_type,
                false_type,
            },
        )
    }

    pub fn infer_type(&mut self, name: &str) -> NodeId {
        let type_parameter = self.type_param(name);
        self.node(SyntaxKind::InferType, NodeData::InferType { type_parameter })
    }

    pub fn mapped_type(&mut self, type_parameter: NodeId, type_node: Option<NodeId>) -> NodeId {
        self.node(
            SyntaxKind::MappedType,
            NodeData::MappedType {
                type_parameter,
                name_type: None,
                type_node,
                members: Vec::new(),
            },
        )
    }

    // ========================================================================
    // Binding patterns
    // ========================================================================

    pub fn object_binding(&mut self, elements: Vec<NodeId>) -> NodeId {
        self.node(SyntaxKind::ObjectBindingPattern, NodeData::BindingPattern { elements })
    }

    pub fn array_binding(&mut self, elements: Vec<NodeId>) -> NodeId {
        self.node(SyntaxKind::ArrayBindingPattern, NodeData::BindingPattern { elements })
    }

    pub fn binding_element(&mut self, property_name: Option<NodeId>, name: NodeId, initializer: Option<NodeId>) -> NodeId {
        self.node(
            SyntaxKind::BindingElement,
            NodeData::BindingElement {
                dot_dot_dot_token: false,
                property_name,
                name,
                initializer,
            },
        )
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    pub fn interface(&mut self, name: &str, members: Vec<NodeId>) -> NodeId {
        let name = self.ident(name);
        self.node(
            SyntaxKind::InterfaceDeclaration,
            NodeData::Interface {
                name,
                type_parameters: Vec::new(),
                heritage_clauses: Vec::new(),
                members,
            },
        )
    }

    /// `type name = ty;` (or `type name;` when `ty` is None).
    pub fn type_alias(&mut self, name: &str, type_node: Option<NodeId>) -> NodeId {
        let name = self.ident(name);
        self.node(
            SyntaxKind::TypeAliasDeclaration,
            NodeData::TypeAlias {
                name,
                type_parameters: Vec::new(),
                type_node,
            },
        )
    }

    pub fn enum_decl(&mut self, name: &str, members: Vec<NodeId>) -> NodeId {
        let name = self.ident(name);
        self.node(SyntaxKind::EnumDeclaration, NodeData::Enum { name, members })
    }

    pub fn enum_member(&mut self, name: &str, initializer: Option<NodeId>) -> NodeId {
        let name = self.ident(name);
        self.node(SyntaxKind::EnumMember, NodeData::EnumMember { name, initializer })
    }

    pub fn module_decl(&mut self, name: NodeId, body: Option<NodeId>) -> NodeId {
        self.node(SyntaxKind::ModuleDeclaration, NodeData::Module { name, body })
    }

    pub fn module_block(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.node(SyntaxKind::ModuleBlock, NodeData::Statements { statements })
    }

    /// `namespace name { statements }`
    pub fn namespace(&mut self, name: &str, statements: Vec<NodeId>) -> NodeId {
        let name = self.ident(name);
        let body = self.module_block(statements);
        let id = self.module_decl(name, Some(body));
        self.with_flags(id, NodeFlags::NAMESPACE)
    }

    /// `declare module "name" { statements }`
    pub fn ambient_module(&mut self, name: &str, statements: Option<Vec<NodeId>>) -> NodeId {
        let name = self.string(name);
        let body = statements.map(|s| self.module_block(s));
        let id = self.module_decl(name, body);
        self.declare(id)
    }

    /// `declare global { statements }`
    pub fn global_augmentation(&mut self, statements: Vec<NodeId>) -> NodeId {
        let name = self.ident("global");
        let body = self.module_block(statements);
        let id = self.module_decl(name, Some(body));
        let id = self.with_flags(id, NodeFlags::GLOBAL_AUGMENTATION);
        self.declare(id)
    }

    pub fn import_decl(&mut self, import_clause: Option<NodeId>, module: &str) -> NodeId {
        let module_specifier = self.string(module);
        self.node(
            SyntaxKind::ImportDeclaration,
            NodeData::Import {
                import_clause,
                module_specifier,
            },
        )
    }

    pub fn import_clause(&mut self, name: Option<&str>, named_bindings: Option<NodeId>) -> NodeId {
        let name = name.map(|n| self.ident(n));
        self.node(
            SyntaxKind::ImportClause,
            NodeData::ImportClause {
                is_type_only: false,
                name,
                named_bindings,
            },
        )
    }

    pub fn namespace_import(&mut self, name: &str) -> NodeId {
        let name = self.ident(name);
        self.node(SyntaxKind::NamespaceImport, NodeData::NamedDeclaration { name })
    }

    pub fn named_imports(&mut self, elements: Vec<NodeId>) -> NodeId {
        self.node(SyntaxKind::NamedImports, NodeData::NamedBindings { elements })
    }

    pub fn import_specifier(&mut self, property_name: Option<&str>, name: &str) -> NodeId {
        self.specifier(SyntaxKind::ImportSpecifier, property_name, name)
    }

    pub fn export_specifier(&mut self, property_name: Option<&str>, name: &str) -> NodeId {
        self.specifier(SyntaxKind::ExportSpecifier, property_name, name)
    }

    fn specifier(&mut self, kind: SyntaxKind, property_name: Option<&str>, name: &str) -> NodeId {
        let property_name = property_name.map(|p| self.ident(p));
        let name = self.ident(name);
        self.node(
            kind,
            NodeData::Specifier {
                is_type_only: false,
                property_name,
                name,
            },
        )
    }

    /// `import name = reference;` where `reference` is an entity name or external module reference.
    pub fn import_equals(&mut self, name: &str, module_reference: NodeId) -> NodeId {
        let name = self.ident(name);
        self.node(
            SyntaxKind::ImportEqualsDeclaration,
            NodeData::ImportEquals {
                is_type_only: false,
                name,
                module_reference,
            },
        )
    }

    pub fn external_module_ref(&mut self, module: &str) -> NodeId {
        let expression = self.string(module);
        self.wrapped(SyntaxKind::ExternalModuleReference, expression)
    }

    pub fn export_decl(&mut self, export_clause: Option<NodeId>, module: Option<&str>) -> NodeId {
        let module_specifier = module.map(|m| self.string(m));
        self.node(
            SyntaxKind::ExportDeclaration,
            NodeData::ExportDeclaration {
                is_type_only: false,
                export_clause,
                module_specifier,
            },
        )
    }

    pub fn named_exports(&mut self, elements: Vec<NodeId>) -> NodeId {
        self.node(SyntaxKind::NamedExports, NodeData::NamedBindings { elements })
    }

    pub fn namespace_export(&mut self, name: &str) -> NodeId {
        let name = self.ident(name);
        self.node(SyntaxKind::NamespaceExport, NodeData::NamedDeclaration { name })
    }

    /// `export default expr` or, with `is_export_equals`, `export = expr`.
    pub fn export_assignment(&mut self, expression: NodeId, is_export_equals: bool) -> NodeId {
        self.node(
            SyntaxKind::ExportAssignment,
            NodeData::ExportAssignment {
                is_export_equals,
                expression,
            },
        )
    }

    /// `export as namespace name;`
    pub fn namespace_export_decl(&mut self, name: &str) -> NodeId {
        let name = self.ident(name);
        self.node(SyntaxKind::NamespaceExportDeclaration, NodeData::NamedDeclaration { name })
    }

    // ========================================================================
    // Finishing
    // ========================================================================

    /// Wrap `statements` in a `SourceFile` and lay the tree out.
    pub fn finish(mut self, file_name: &str, statements: Vec<NodeId>) -> SourceFile {
        let root = self.node(SyntaxKind::SourceFile, NodeData::Statements { statements });
        let declaration_file = file_name.ends_with(".d.ts");
        self.mark_ambient(root, declaration_file);
        let mut text = String::new();
        self.layout(root, root, &mut text);
        SourceFile::new(file_name, text, self.arena, root)
    }

    fn mark_ambient(&mut self, id: NodeId, inherited: bool) {
        let node = self.arena.get_mut(id);
        let ambient = inherited || node.modifier_flags.contains(ModifierFlags::AMBIENT);
        if ambient {
            node.flags |= NodeFlags::AMBIENT;
        }
        for child in children(&self.arena, id) {
            self.mark_ambient(child, ambient);
        }
    }

    fn layout(&mut self, id: NodeId, root: NodeId, text: &mut String) {
        let pos = text.len() as u32;
        if id != root {
            text.push(' ');
        }
        text.push_str(&self.leading_text(id));
        let infix = self.infix_text(id);
        for (i, child) in children(&self.arena, id).into_iter().enumerate() {
            self.layout(child, root, text);
            if i == 0 {
                if let Some(op) = infix {
                    text.push(' ');
                    text.push_str(op);
                }
            }
        }
        self.arena.get_mut(id).range = TextRange::new(pos, text.len() as u32);
    }

    /// Text written between the first child and the rest.
    fn infix_text(&self, id: NodeId) -> Option<&'static str> {
        match self.arena.data(id) {
            NodeData::Binary { operator, .. } => operator.operator_text(),
            NodeData::Unary { operator, .. } if self.arena.kind(id) == SyntaxKind::PostfixUnaryExpression => {
                operator.operator_text()
            }
            NodeData::PropertyAccess { question_dot_token, .. } => Some(if *question_dot_token { "?." } else { "." }),
            _ => None,
        }
    }

    /// Modifier keywords and the node's own leading keyword or token.
    fn leading_text(&self, id: NodeId) -> String {
        let node = self.arena.get(id);
        let mut words: Vec<String> = ModifierFlags::KEYWORDS
            .iter()
            .filter(|(flag, _)| node.modifier_flags.contains(*flag))
            .map(|(_, word)| (*word).to_string())
            .collect();

        let own: Option<String> = match (&node.data, node.kind) {
            (NodeData::Text { text }, kind) => {
                let text = self.arena.interner().resolve(*text);
                Some(match kind {
                    SyntaxKind::StringLiteral => format!("\"{text}\""),
                    SyntaxKind::NoSubstitutionTemplateLiteral => format!("`{text}`"),
                    _ => text.to_string(),
                })
            }
            (_, SyntaxKind::VariableDeclarationList) => Some(
                if node.flags.contains(NodeFlags::AWAIT_USING) {
                    "await using"
                } else if node.flags.contains(NodeFlags::USING) {
                    "using"
                } else if node.flags.contains(NodeFlags::CONST) {
                    "const"
                } else if node.flags.contains(NodeFlags::LET) {
                    "let"
                } else {
                    "var"
                }
                .to_string(),
            ),
            (NodeData::FunctionLike { asterisk_token, .. }, SyntaxKind::FunctionDeclaration | SyntaxKind::FunctionExpression) => {
                Some(if *asterisk_token { "function*" } else { "function" }.to_string())
            }
            (_, SyntaxKind::ModuleDeclaration) => {
                if node.flags.intersects(NodeFlags::GLOBAL_AUGMENTATION | NodeFlags::NESTED_NAMESPACE) {
                    None
                } else if node.flags.contains(NodeFlags::NAMESPACE) {
                    Some("namespace".to_string())
                } else {
                    Some("module".to_string())
                }
            }
            (NodeData::Unary { operator, .. }, SyntaxKind::PrefixUnaryExpression) => {
                operator.operator_text().map(str::to_string)
            }
            (NodeData::ExportAssignment { is_export_equals, .. }, _) => {
                Some(if *is_export_equals { "export =" } else { "export default" }.to_string())
            }
            (NodeData::ExportDeclaration { export_clause, .. }, _) => {
                Some(if export_clause.is_none() { "export *" } else { "export" }.to_string())
            }
            (NodeData::HeritageClause { token, .. }, _) => token.keyword_text().map(str::to_string),
            (NodeData::Parameter { dot_dot_dot_token: true, .. }, _)
            | (NodeData::BindingElement { dot_dot_dot_token: true, .. }, _) => Some("...".to_string()),
            (_, kind) => kind_leading_token(kind).map(str::to_string),
        };
        words.extend(own);
        words.join(" ")
    }
}

fn kind_leading_token(kind: SyntaxKind) -> Option<&'static str> {
    if kind.is_keyword() {
        return kind.keyword_text();
    }
    let text = match kind {
        SyntaxKind::ClassDeclaration | SyntaxKind::ClassExpression => "class",
        SyntaxKind::InterfaceDeclaration => "interface",
        SyntaxKind::TypeAliasDeclaration => "type",
        SyntaxKind::EnumDeclaration => "enum",
        SyntaxKind::IfStatement => "if",
        SyntaxKind::DoStatement => "do",
        SyntaxKind::WhileStatement => "while",
        SyntaxKind::ForStatement | SyntaxKind::ForInStatement | SyntaxKind::ForOfStatement => "for",
        SyntaxKind::ContinueStatement => "continue",
        SyntaxKind::BreakStatement => "break",
        SyntaxKind::ReturnStatement => "return",
        SyntaxKind::WithStatement => "with",
        SyntaxKind::SwitchStatement => "switch",
        SyntaxKind::ThrowStatement => "throw",
        SyntaxKind::TryStatement => "try",
        SyntaxKind::DebuggerStatement => "debugger",
        SyntaxKind::EmptyStatement => ";",
        SyntaxKind::CaseClause => "case",
        SyntaxKind::DefaultClause => "default",
        SyntaxKind::CatchClause => "catch",
        SyntaxKind::ImportDeclaration | SyntaxKind::ImportEqualsDeclaration => "import",
        SyntaxKind::NamespaceExportDeclaration => "export as namespace",
        SyntaxKind::NamespaceImport | SyntaxKind::NamespaceExport => "* as",
        SyntaxKind::ExternalModuleReference => "require",
        SyntaxKind::Constructor => "constructor",
        SyntaxKind::GetAccessor => "get",
        SyntaxKind::SetAccessor => "set",
        SyntaxKind::ClassStaticBlockDeclaration => "static",
        SyntaxKind::ConstructSignature | SyntaxKind::ConstructorType | SyntaxKind::NewExpression => "new",
        SyntaxKind::DeleteExpression => "delete",
        SyntaxKind::TypeOfExpression | SyntaxKind::TypeQuery => "typeof",
        SyntaxKind::VoidExpression => "void",
        SyntaxKind::AwaitExpression => "await",
        SyntaxKind::YieldExpression => "yield",
        SyntaxKind::InferType => "infer",
        SyntaxKind::ThisType => "this",
        SyntaxKind::SpreadElement | SyntaxKind::SpreadAssignment => "...",
        SyntaxKind::Block
        | SyntaxKind::ModuleBlock
        | SyntaxKind::CaseBlock
        | SyntaxKind::ObjectLiteralExpression
        | SyntaxKind::ObjectBindingPattern
        | SyntaxKind::TypeLiteral
        | SyntaxKind::MappedType
        | SyntaxKind::NamedImports
        | SyntaxKind::NamedExports => "{",
        SyntaxKind::ArrayLiteralExpression | SyntaxKind::ArrayBindingPattern | SyntaxKind::ComputedPropertyName => "[",
        SyntaxKind::ParenthesizedExpression | SyntaxKind::ParenthesizedType => "(",
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utilities::{skip_trivia, token_range_at};

    fn source_of(file: &SourceFile, id: NodeId) -> &str {
        let range = file.arena.range(id);
        let start = skip_trivia(&file.text, range.pos);
        &file.text[start as usize..range.end as usize]
    }

    #[test]
    fn test_layout_writes_keywords_and_names() {
        let mut b = AstBuilder::new();
        let one = b.num("1");
        let decl = b.var_decl("x", Some(one));
        let stmt = b.var_stmt(NodeFlags::CONST, vec![decl]);
        let file = b.finish("test.ts", vec![stmt]);

        assert_eq!(source_of(&file, stmt), "const x 1");
        let name = file.arena.name(decl).unwrap();
        assert_eq!(source_of(&file, name), "x");
    }

    #[test]
    fn test_ranges_nest_and_do_not_overlap() {
        let mut b = AstBuilder::new();
        let a = b.ident("a");
        let s1 = b.expr_stmt(a);
        let c = b.ident("c");
        let s2 = b.expr_stmt(c);
        let file = b.finish("test.ts", vec![s1, s2]);

        let r1 = file.arena.range(s1);
        let r2 = file.arena.range(s2);
        assert!(r1.end <= r2.pos, "Expected siblings not to overlap, got {:?} and {:?}", r1, r2);
        assert_eq!(file.arena.range(file.root).end as usize, file.text.len());
    }

    #[test]
    fn test_first_token_includes_modifiers() {
        let mut b = AstBuilder::new();
        let body = b.block(vec![]);
        let f = b.function_decl(Some("f"), vec![], Some(body));
        let f = b.export(f);
        let file = b.finish("test.ts", vec![f]);

        let range = token_range_at(&file.text, file.arena.range(f).pos);
        assert_eq!(&file.text[range.pos as usize..range.end as usize], "export");
        assert!(file.is_external_module());
    }

    #[test]
    fn test_declare_marks_subtree_ambient() {
        let mut b = AstBuilder::new();
        let p = b.param("eval");
        let f = b.function_decl(Some("f"), vec![p], None);
        let f = b.declare(f);
        let file = b.finish("test.ts", vec![f]);

        assert!(file.arena.flags(p).contains(NodeFlags::AMBIENT));
        assert!(!file.arena.flags(file.root).contains(NodeFlags::AMBIENT));
    }

    #[test]
    fn test_declaration_file_is_ambient_everywhere() {
        let mut b = AstBuilder::new();
        let decl = b.var_decl("x", None);
        let stmt = b.var_stmt(NodeFlags::NONE, vec![decl]);
        let file = b.finish("lib.d.ts", vec![stmt]);

        assert!(file.is_declaration_file);
        assert!(file.arena.flags(decl).contains(NodeFlags::AMBIENT));
    }

    #[test]
    fn test_use_strict_text_is_quoted() {
        let mut b = AstBuilder::new();
        let stmt = b.use_strict();
        let file = b.finish("test.ts", vec![stmt]);
        let expr = file.arena.expression(stmt).unwrap();
        assert_eq!(source_of(&file, expr), "\"use strict\"");
        assert_eq!(file.arena.text(expr), Some("use strict"));
    }

    #[test]
    fn test_source_file_survives_json() {
        let mut b = AstBuilder::new();
        let decl = b.var_decl("answer", None);
        let stmt = b.var_stmt(NodeFlags::CONST, vec![decl]);
        let stmt = b.export(stmt);
        let file = b.finish("answer.ts", vec![stmt]);

        let json = serde_json::to_string(&file).unwrap();
        let restored: SourceFile = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.file_name, "answer.ts");
        assert_eq!(restored.text, file.text);
        assert_eq!(restored.arena.len(), file.arena.len());
        assert_eq!(restored.external_module_indicator, Some(stmt));
        let name = restored.arena.name(decl).unwrap();
        assert_eq!(restored.arena.text(name), Some("answer"));
    }
}
