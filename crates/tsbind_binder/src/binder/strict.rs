//! Strict-mode and reserved-word checks.
//!
//! These are grammar errors the parser cannot report on its own, because
//! whether code is strict depends on prologues, classes and module-ness.

use super::Binder;
use tsbind_ast::node::NodeData;
use tsbind_ast::types::*;
use tsbind_ast::SyntaxKind;
use tsbind_diagnostics::{messages, DiagnosticMessage};
use tsbind_options::ScriptTarget;

impl Binder<'_> {
    /// Turn strict mode on if `statements` opens with a `"use strict"`
    /// prologue.
    pub(super) fn update_strict_mode_statement_list(&mut self, statements: &[NodeId]) {
        if !self.in_strict_mode && self.has_use_strict_prologue(statements) {
            self.in_strict_mode = true;
        }
    }

    fn has_use_strict_prologue(&self, statements: &[NodeId]) -> bool {
        for &statement in statements {
            let expression = match self.arena.data(statement) {
                NodeData::Wrapped { expression } if self.kind(statement) == SyntaxKind::ExpressionStatement => {
                    *expression
                }
                _ => return false,
            };
            if self.kind(expression) != SyntaxKind::StringLiteral {
                return false;
            }
            // Escapes do not count: the text must be exactly the directive.
            if matches!(self.source_text(expression), "\"use strict\"" | "'use strict'") {
                return true;
            }
        }
        false
    }

    /// Reserved words used as identifiers, and `await`/`yield` where they
    /// are keywords.
    pub(super) fn check_contextual_identifier(&mut self, node: NodeId) {
        if self.file.has_parse_diagnostics()
            || self.arena.flags(node).contains(NodeFlags::AMBIENT)
            || self.is_identifier_name(node)
        {
            return;
        }
        let Some(text) = self.arena.text(node) else {
            return;
        };
        let Some(keyword) = SyntaxKind::from_keyword_text(text) else {
            return;
        };
        let flags = self.arena.flags(node);
        if self.in_strict_mode && keyword.is_future_reserved_word() {
            let message = self.strict_mode_identifier_message(node);
            self.error_on_node(node, message, &[text]);
        } else if keyword == SyntaxKind::AwaitKeyword {
            if self.file.is_external_module() && self.is_in_top_level_context(node) {
                self.error_on_node(
                    node,
                    &messages::IDENTIFIER_EXPECTED_0_IS_A_RESERVED_WORD_AT_THE_TOP_LEVEL_OF_A_MODULE,
                    &[text],
                );
            } else if flags.contains(NodeFlags::AWAIT_CONTEXT) {
                self.error_on_node(
                    node,
                    &messages::IDENTIFIER_EXPECTED_0_IS_A_RESERVED_WORD_THAT_CANNOT_BE_USED_HERE,
                    &[text],
                );
            }
        } else if keyword == SyntaxKind::YieldKeyword && flags.contains(NodeFlags::YIELD_CONTEXT) {
            self.error_on_node(
                node,
                &messages::IDENTIFIER_EXPECTED_0_IS_A_RESERVED_WORD_THAT_CANNOT_BE_USED_HERE,
                &[text],
            );
        }
    }

    /// Positions where any word is a valid name: member names, the right
    /// side of a qualified name, property names in patterns and specifiers.
    fn is_identifier_name(&self, node: NodeId) -> bool {
        let Some(parent) = self.parent_of(node) else {
            return false;
        };
        match (self.kind(parent), self.arena.data(parent)) {
            (
                SyntaxKind::PropertyDeclaration
                | SyntaxKind::PropertySignature
                | SyntaxKind::MethodDeclaration
                | SyntaxKind::MethodSignature
                | SyntaxKind::GetAccessor
                | SyntaxKind::SetAccessor
                | SyntaxKind::EnumMember
                | SyntaxKind::PropertyAssignment
                | SyntaxKind::PropertyAccessExpression,
                _,
            ) => self.arena.name(parent) == Some(node),
            (SyntaxKind::QualifiedName, NodeData::QualifiedName { right, .. }) => *right == node,
            (SyntaxKind::BindingElement, NodeData::BindingElement { property_name, .. })
            | (SyntaxKind::ImportSpecifier, NodeData::Specifier { property_name, .. }) => *property_name == Some(node),
            (SyntaxKind::ExportSpecifier, _) => true,
            _ => false,
        }
    }

    /// Whether the nearest `this` container, arrows included, is the file.
    fn is_in_top_level_context(&self, node: NodeId) -> bool {
        let mut current = node;
        if let Some(parent) = self.parent_of(node) {
            if matches!(
                self.kind(parent),
                SyntaxKind::ClassDeclaration | SyntaxKind::FunctionDeclaration
            ) && self.arena.name(parent) == Some(node)
            {
                current = parent;
            }
        }
        let mut ancestor = self.parent_of(current);
        while let Some(id) = ancestor {
            match self.kind(id) {
                SyntaxKind::SourceFile => return true,
                SyntaxKind::ArrowFunction
                | SyntaxKind::FunctionDeclaration
                | SyntaxKind::FunctionExpression
                | SyntaxKind::ModuleDeclaration
                | SyntaxKind::ClassStaticBlockDeclaration
                | SyntaxKind::PropertyDeclaration
                | SyntaxKind::PropertySignature
                | SyntaxKind::MethodDeclaration
                | SyntaxKind::MethodSignature
                | SyntaxKind::Constructor
                | SyntaxKind::GetAccessor
                | SyntaxKind::SetAccessor
                | SyntaxKind::CallSignature
                | SyntaxKind::ConstructSignature
                | SyntaxKind::IndexSignature
                | SyntaxKind::EnumDeclaration => return false,
                _ => ancestor = self.parent_of(id),
            }
        }
        false
    }

    pub(super) fn check_private_identifier(&mut self, node: NodeId) {
        if self.arena.text(node) == Some("#constructor") && !self.file.has_parse_diagnostics() {
            self.error_on_node(node, &messages::CONSTRUCTOR_IS_A_RESERVED_WORD, &[]);
        }
    }

    fn strict_mode_identifier_message(&self, node: NodeId) -> &'static DiagnosticMessage {
        if self.containing_class(node).is_some() {
            &messages::IDENTIFIER_EXPECTED_0_IS_A_RESERVED_WORD_IN_STRICT_MODE_CLASS
        } else if self.file.external_module_indicator.is_some() {
            &messages::IDENTIFIER_EXPECTED_0_IS_A_RESERVED_WORD_IN_STRICT_MODE_MODULE
        } else {
            &messages::IDENTIFIER_EXPECTED_0_IS_A_RESERVED_WORD_IN_STRICT_MODE
        }
    }

    pub(super) fn check_strict_mode_function_name(&mut self, node: NodeId) {
        if self.in_strict_mode && !self.arena.flags(node).contains(NodeFlags::AMBIENT) {
            self.check_strict_mode_eval_or_arguments(node, self.arena.name(node));
        }
    }

    /// Below ES2015, strict code may only declare functions at the top of
    /// a file, namespace or function body.
    pub(super) fn check_strict_mode_function_declaration(&mut self, node: NodeId) {
        if self.language_version >= ScriptTarget::ES2015 {
            return;
        }
        let scope = self.block_scope_container();
        let scope_kind = self.kind(scope);
        let allowed = matches!(scope_kind, SyntaxKind::SourceFile | SyntaxKind::ModuleDeclaration)
            || scope_kind.is_function_like()
            || scope_kind == SyntaxKind::ClassStaticBlockDeclaration;
        if !allowed {
            let message = if self.containing_class(node).is_some() {
                &messages::FUNCTION_DECLARATIONS_NOT_ALLOWED_IN_BLOCKS_ES5_CLASS
            } else if self.file.external_module_indicator.is_some() {
                &messages::FUNCTION_DECLARATIONS_NOT_ALLOWED_IN_BLOCKS_ES5_MODULE
            } else {
                &messages::FUNCTION_DECLARATIONS_NOT_ALLOWED_IN_BLOCKS_ES5
            };
            self.error_on_node(node, message, &[]);
        }
    }

    pub(super) fn check_strict_mode_binary_expression(&mut self, node: NodeId) {
        if !self.in_strict_mode {
            return;
        }
        if let NodeData::Binary { left, operator, .. } = self.arena.data(node) {
            if operator.is_assignment_operator() && crate::narrowing::is_left_hand_side_expression(self.arena, *left) {
                self.check_strict_mode_eval_or_arguments(node, Some(*left));
            }
        }
    }

    pub(super) fn check_strict_mode_catch_clause(&mut self, node: NodeId) {
        if !self.in_strict_mode {
            return;
        }
        if let NodeData::CatchClause {
            variable_declaration: Some(declaration),
            ..
        } = self.arena.data(node)
        {
            self.check_strict_mode_eval_or_arguments(node, self.arena.name(*declaration));
        }
    }

    pub(super) fn check_strict_mode_delete_expression(&mut self, node: NodeId) {
        if !self.in_strict_mode {
            return;
        }
        if let Some(operand) = self.arena.expression(node) {
            if self.kind(operand) == SyntaxKind::Identifier {
                self.error_on_node(operand, &messages::DELETE_CANNOT_BE_CALLED_ON_AN_IDENTIFIER_IN_STRICT_MODE, &[]);
            }
        }
    }

    pub(super) fn check_strict_mode_postfix_unary_expression(&mut self, node: NodeId) {
        if !self.in_strict_mode {
            return;
        }
        if let NodeData::Unary { operand, .. } = self.arena.data(node) {
            self.check_strict_mode_eval_or_arguments(node, Some(*operand));
        }
    }

    pub(super) fn check_strict_mode_prefix_unary_expression(&mut self, node: NodeId) {
        if !self.in_strict_mode {
            return;
        }
        if let NodeData::Unary { operator, operand } = self.arena.data(node) {
            if matches!(operator, SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken) {
                self.check_strict_mode_eval_or_arguments(node, Some(*operand));
            }
        }
    }

    pub(super) fn check_strict_mode_with_statement(&mut self, node: NodeId) {
        if self.in_strict_mode {
            self.error_on_first_token(node, &messages::WITH_STATEMENTS_ARE_NOT_ALLOWED_IN_STRICT_MODE, &[]);
        }
    }

    /// From ES2015 on, a label cannot sit directly on a declaration.
    pub(super) fn check_strict_mode_labeled_statement(&mut self, node: NodeId) {
        if !self.in_strict_mode || self.language_version < ScriptTarget::ES2015 {
            return;
        }
        if let NodeData::Labeled { label, statement } = self.arena.data(node) {
            let statement_kind = self.kind(*statement);
            if statement_kind.is_declaration_statement() || statement_kind == SyntaxKind::VariableStatement {
                self.error_on_first_token(*label, &messages::A_LABEL_IS_NOT_ALLOWED_HERE, &[]);
            }
        }
    }

    /// `eval` and `arguments` cannot be declared or assigned in strict code.
    pub(super) fn check_strict_mode_eval_or_arguments(&mut self, context: NodeId, name: Option<NodeId>) {
        let Some(name) = name else {
            return;
        };
        if self.kind(name) != SyntaxKind::Identifier {
            return;
        }
        let Some(text) = self.arena.text(name) else {
            return;
        };
        if text != "eval" && text != "arguments" {
            return;
        }
        let message = if self.containing_class(context).is_some() {
            &messages::CODE_CONTAINED_IN_A_CLASS_IS_EVALUATED_IN_STRICT_MODE_0
        } else if self.file.external_module_indicator.is_some() {
            &messages::INVALID_USE_OF_0_MODULES_ARE_AUTOMATICALLY_IN_STRICT_MODE
        } else {
            &messages::INVALID_USE_OF_0_IN_STRICT_MODE
        };
        self.error_on_node(name, message, &[text]);
    }
}
