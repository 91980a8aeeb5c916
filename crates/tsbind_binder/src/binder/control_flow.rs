//! Control flow graph construction.
//!
//! `bind_children` replaces a plain child walk for every node whose
//! evaluation order matters. Each statement and narrowable reference is
//! stamped with the flow node current when it is reached; conditions,
//! assignments and assertion-like calls extend the graph as they are bound.

use super::{ActiveLabel, Binder};
use crate::flow::{FlowGraph, FlowNodeKind};
use crate::narrowing::{is_dotted_name, is_narrowable_operand, is_narrowable_reference, is_narrowing_expression};
use tsbind_ast::node::NodeData;
use tsbind_ast::types::*;
use tsbind_ast::utilities::{
    has_question_dot, is_enum_const, is_optional_chain, is_push_or_unshift_identifier, skip_parentheses,
    ModuleInstanceState,
};
use tsbind_ast::SyntaxKind;
use tsbind_diagnostics::messages;

impl Binder<'_> {
    pub(super) fn bind_children(&mut self, node: NodeId) {
        let save_in_assignment_pattern = self.in_assignment_pattern;
        self.in_assignment_pattern = false;
        if self.check_unreachable(node) {
            self.bind_each_child(node);
            self.in_assignment_pattern = save_in_assignment_pattern;
            return;
        }
        let kind = self.kind(node);
        if kind.is_statement_range() && (self.options.reports_unreachable_code() || kind == SyntaxKind::ReturnStatement) {
            self.set_flow_node(node);
        }
        match kind {
            SyntaxKind::WhileStatement => self.bind_while_statement(node),
            SyntaxKind::DoStatement => self.bind_do_statement(node),
            SyntaxKind::ForStatement => self.bind_for_statement(node),
            SyntaxKind::ForInStatement | SyntaxKind::ForOfStatement => self.bind_for_in_or_of_statement(node),
            SyntaxKind::IfStatement => self.bind_if_statement(node),
            SyntaxKind::ReturnStatement => self.bind_return_statement(node),
            SyntaxKind::ThrowStatement => self.bind_throw_statement(node),
            SyntaxKind::BreakStatement => self.bind_break_or_continue_statement(node, true),
            SyntaxKind::ContinueStatement => self.bind_break_or_continue_statement(node, false),
            SyntaxKind::TryStatement => self.bind_try_statement(node),
            SyntaxKind::SwitchStatement => self.bind_switch_statement(node),
            SyntaxKind::CaseBlock => self.bind_case_block(node),
            SyntaxKind::CaseClause | SyntaxKind::DefaultClause => self.bind_case_or_default_clause(node),
            SyntaxKind::ExpressionStatement => self.bind_expression_statement(node),
            SyntaxKind::LabeledStatement => self.bind_labeled_statement(node),
            SyntaxKind::PrefixUnaryExpression => self.bind_prefix_unary_expression_flow(node),
            SyntaxKind::PostfixUnaryExpression => self.bind_postfix_unary_expression_flow(node),
            SyntaxKind::BinaryExpression => {
                if self.is_destructuring_assignment(node) {
                    // Only a destructuring assignment can continue an
                    // enclosing pattern.
                    self.in_assignment_pattern = save_in_assignment_pattern;
                    self.bind_destructuring_assignment_flow(node);
                } else {
                    self.bind_binary_expression_flow(node);
                }
            }
            SyntaxKind::DeleteExpression => self.bind_delete_expression_flow(node),
            SyntaxKind::ConditionalExpression => self.bind_conditional_expression_flow(node),
            SyntaxKind::VariableDeclaration => self.bind_variable_declaration_flow(node),
            SyntaxKind::PropertyAccessExpression
            | SyntaxKind::ElementAccessExpression
            | SyntaxKind::NonNullExpression => {
                if is_optional_chain(self.arena, node) {
                    self.bind_optional_chain_flow(node);
                } else {
                    self.bind_each_child(node);
                }
            }
            SyntaxKind::CallExpression => self.bind_call_expression_flow(node),
            SyntaxKind::SourceFile | SyntaxKind::Block | SyntaxKind::ModuleBlock => {
                let arena = self.arena;
                self.bind_each_statement_functions_first(arena.statements(node));
            }
            SyntaxKind::BindingElement => self.bind_binding_element_flow(node),
            SyntaxKind::Parameter => self.bind_parameter_flow(node),
            SyntaxKind::ObjectLiteralExpression
            | SyntaxKind::ArrayLiteralExpression
            | SyntaxKind::PropertyAssignment
            | SyntaxKind::SpreadElement => {
                self.in_assignment_pattern = save_in_assignment_pattern;
                self.bind_each_child(node);
            }
            _ => self.bind_each_child(node),
        }
        self.in_assignment_pattern = save_in_assignment_pattern;
    }

    // ========================================================================
    // Flow node construction
    // ========================================================================

    fn create_branch_label(&mut self) -> FlowNodeId {
        self.graph.create_branch_label()
    }

    fn add_antecedent(&mut self, label: FlowNodeId, antecedent: FlowNodeId) {
        self.graph.add_antecedent(label, antecedent);
    }

    fn finish_flow_label(&mut self, label: FlowNodeId) -> FlowNodeId {
        self.graph.finish_label(label)
    }

    /// A condition node, or `antecedent` itself when the condition cannot
    /// narrow. A literal `true`/`false` on the wrong side is unreachable.
    fn create_flow_condition(
        &mut self,
        flags: FlowFlags,
        antecedent: FlowNodeId,
        expression: Option<NodeId>,
    ) -> FlowNodeId {
        if self.graph.is_unreachable(antecedent) {
            return antecedent;
        }
        let Some(expression) = expression else {
            return if flags.contains(FlowFlags::TRUE_CONDITION) {
                antecedent
            } else {
                FlowGraph::UNREACHABLE
            };
        };
        let kind = self.kind(expression);
        let contradicts = (kind == SyntaxKind::TrueKeyword && flags.contains(FlowFlags::FALSE_CONDITION))
            || (kind == SyntaxKind::FalseKeyword && flags.contains(FlowFlags::TRUE_CONDITION));
        if contradicts
            && !self.is_expression_of_optional_chain_root(expression)
            && !self.parent_of(expression).is_some_and(|parent| self.is_nullish_coalesce(parent))
        {
            return FlowGraph::UNREACHABLE;
        }
        if !is_narrowing_expression(self.arena, expression) {
            return antecedent;
        }
        self.graph.set_referenced(antecedent);
        self.graph.alloc(
            flags,
            FlowNodeKind::Condition {
                node: expression,
                antecedent,
            },
        )
    }

    /// Assignments and array mutations. These can also throw, so they feed
    /// the enclosing exception target.
    fn create_flow_mutation(&mut self, flags: FlowFlags, antecedent: FlowNodeId, node: NodeId) -> FlowNodeId {
        self.graph.set_referenced(antecedent);
        self.has_flow_effects = true;
        let kind = if flags.contains(FlowFlags::ARRAY_MUTATION) {
            FlowNodeKind::ArrayMutation { node, antecedent }
        } else {
            FlowNodeKind::Assignment { node, antecedent }
        };
        let result = self.graph.alloc(flags, kind);
        if let Some(exception_target) = self.current_exception_target {
            self.add_antecedent(exception_target, result);
        }
        result
    }

    fn create_flow_switch_clause(
        &mut self,
        antecedent: FlowNodeId,
        switch_statement: NodeId,
        clause_start: usize,
        clause_end: usize,
    ) -> FlowNodeId {
        self.graph.set_referenced(antecedent);
        self.graph.alloc(
            FlowFlags::SWITCH_CLAUSE,
            FlowNodeKind::SwitchClause {
                switch_statement,
                clause_start,
                clause_end,
                antecedent,
            },
        )
    }

    fn create_flow_call(&mut self, antecedent: FlowNodeId, node: NodeId) -> FlowNodeId {
        self.graph.set_referenced(antecedent);
        self.has_flow_effects = true;
        let result = self.graph.alloc(FlowFlags::CALL, FlowNodeKind::Call { node, antecedent });
        if let Some(exception_target) = self.current_exception_target {
            self.add_antecedent(exception_target, result);
        }
        result
    }

    fn pre_switch_flow(&self) -> FlowNodeId {
        self.pre_switch_case_flow.unwrap_or(self.current_flow)
    }

    // ========================================================================
    // Reachability
    // ========================================================================

    /// Returns true when `node` sits in unreachable code. The first
    /// reportable statement of an unreachable region is reported, after
    /// which the region is marked as reported.
    fn check_unreachable(&mut self, node: NodeId) -> bool {
        if !self.graph.is_unreachable(self.current_flow) {
            return false;
        }
        if self.current_flow == FlowGraph::UNREACHABLE {
            let kind = self.kind(node);
            let report = (kind.is_statement_but_not_declaration() && kind != SyntaxKind::EmptyStatement)
                || kind == SyntaxKind::ClassDeclaration
                || self.is_enum_declaration_with_preserved_emit(node)
                || (kind == SyntaxKind::ModuleDeclaration && self.should_report_error_on_module_declaration(node));
            if report {
                self.current_flow = FlowGraph::REPORTED_UNREACHABLE;
                if self.options.reports_unreachable_code() {
                    // Uninitialized `var`s are hoisted, so they are only
                    // ever a suggestion. Ambient code is already an error.
                    let is_error = self.options.unreachable_code_is_error()
                        && !self.arena.flags(node).contains(NodeFlags::AMBIENT)
                        && (kind != SyntaxKind::VariableStatement
                            || self.is_block_scoped_variable_statement(node)
                            || self.variable_declarations(node).iter().any(|&d| self.arena.initializer(d).is_some()));
                    self.error_on_each_unreachable_range(node, is_error);
                }
            }
        }
        true
    }

    fn should_report_error_on_module_declaration(&self, node: NodeId) -> bool {
        match self.module_instance_state(node) {
            ModuleInstanceState::Instantiated => true,
            ModuleInstanceState::ConstEnumOnly => self.options.should_preserve_const_enums(),
            _ => false,
        }
    }

    fn is_enum_declaration_with_preserved_emit(&self, node: NodeId) -> bool {
        self.kind(node) == SyntaxKind::EnumDeclaration
            && (!is_enum_const(self.arena, node) || self.options.should_preserve_const_enums())
    }

    /// Inside a block, runs of executable statements are reported as one
    /// range each. Anywhere else only the node itself is reported.
    fn error_on_each_unreachable_range(&mut self, node: NodeId, is_error: bool) {
        let parent = self.parent_of(node).filter(|&parent| self.kind(parent) == SyntaxKind::Block);
        let Some(block) = parent.filter(|_| self.is_executable_statement(node)) else {
            self.error_or_suggestion_on_node(is_error, node, &messages::UNREACHABLE_CODE_DETECTED);
            return;
        };
        let arena = self.arena;
        let statements = arena.statements(block);
        let index = statements.iter().position(|&s| s == node).unwrap_or(0);
        let mut range: Option<(NodeId, NodeId)> = None;
        for &statement in &statements[index..] {
            if self.is_executable_statement(statement) {
                range = Some(match range {
                    Some((first, _)) => (first, statement),
                    None => (statement, statement),
                });
            } else if let Some((first, last)) = range.take() {
                self.error_or_suggestion_on_range(is_error, first, last, &messages::UNREACHABLE_CODE_DETECTED);
            }
        }
        if let Some((first, last)) = range {
            self.error_or_suggestion_on_range(is_error, first, last, &messages::UNREACHABLE_CODE_DETECTED);
        }
    }

    /// Statements that cannot validly be used before they appear.
    fn is_executable_statement(&self, statement: NodeId) -> bool {
        match self.kind(statement) {
            SyntaxKind::FunctionDeclaration => false,
            SyntaxKind::VariableStatement => {
                self.is_block_scoped_variable_statement(statement)
                    || self
                        .variable_declarations(statement)
                        .iter()
                        .all(|&d| self.arena.initializer(d).is_some())
            }
            _ => !self.is_purely_type_declaration(statement),
        }
    }

    fn is_purely_type_declaration(&self, statement: NodeId) -> bool {
        match self.kind(statement) {
            SyntaxKind::InterfaceDeclaration | SyntaxKind::TypeAliasDeclaration => true,
            SyntaxKind::ModuleDeclaration => {
                self.module_instance_state(statement) != ModuleInstanceState::Instantiated
            }
            SyntaxKind::EnumDeclaration => !self.is_enum_declaration_with_preserved_emit(statement),
            _ => false,
        }
    }

    fn is_block_scoped_variable_statement(&self, statement: NodeId) -> bool {
        let mut flags = self.arena.flags(statement);
        if let NodeData::VariableStatement { declaration_list } = self.arena.data(statement) {
            flags |= self.arena.flags(*declaration_list);
        }
        flags.intersects(NodeFlags::BLOCK_SCOPED)
    }

    fn variable_declarations(&self, statement: NodeId) -> &[NodeId] {
        let arena = self.arena;
        match arena.data(statement) {
            NodeData::VariableStatement { declaration_list } => match arena.data(*declaration_list) {
                NodeData::VariableDeclarationList { declarations } => declarations,
                _ => &[],
            },
            _ => &[],
        }
    }

    // ========================================================================
    // Targets
    // ========================================================================

    /// Make `target` the continue target of every label directly wrapping
    /// the loop `node`.
    fn set_continue_target(&mut self, node: NodeId, target: FlowNodeId) -> FlowNodeId {
        let mut current = node;
        let mut index = self.active_labels.len();
        while index > 0 && self.parent_kind(current) == Some(SyntaxKind::LabeledStatement) {
            index -= 1;
            self.active_labels[index].continue_target = Some(target);
            match self.parent_of(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        target
    }

    fn do_with_conditional_branches(
        &mut self,
        true_target: FlowNodeId,
        false_target: FlowNodeId,
        action: impl FnOnce(&mut Self),
    ) {
        let save_true_target = self.current_true_target;
        let save_false_target = self.current_false_target;
        self.current_true_target = Some(true_target);
        self.current_false_target = Some(false_target);
        action(self);
        self.current_true_target = save_true_target;
        self.current_false_target = save_false_target;
    }

    fn bind_condition(&mut self, node: Option<NodeId>, true_target: FlowNodeId, false_target: FlowNodeId) {
        self.do_with_conditional_branches(true_target, false_target, |binder| binder.bind(node));
        let handled_by_operands = match node {
            Some(node) => {
                self.is_logical_assignment_expression(node)
                    || self.is_logical_expression(node)
                    || (is_optional_chain(self.arena, node) && self.is_outermost_optional_chain(node))
            }
            None => false,
        };
        if !handled_by_operands {
            self.add_conditions(true_target, false_target, node);
        }
    }

    /// Route the current flow into both branch labels through `node`.
    fn add_conditions(&mut self, true_target: FlowNodeId, false_target: FlowNodeId, node: Option<NodeId>) {
        let when_true = self.create_flow_condition(FlowFlags::TRUE_CONDITION, self.current_flow, node);
        self.add_antecedent(true_target, when_true);
        let when_false = self.create_flow_condition(FlowFlags::FALSE_CONDITION, self.current_flow, node);
        self.add_antecedent(false_target, when_false);
    }

    fn bind_iterative_statement(&mut self, node: NodeId, break_target: FlowNodeId, continue_target: FlowNodeId) {
        let save_break_target = self.current_break_target;
        let save_continue_target = self.current_continue_target;
        self.current_break_target = Some(break_target);
        self.current_continue_target = Some(continue_target);
        self.bind(Some(node));
        self.current_break_target = save_break_target;
        self.current_continue_target = save_continue_target;
    }

    // ========================================================================
    // Assignment targets
    // ========================================================================

    fn bind_assignment_target_flow(&mut self, node: NodeId) {
        let arena = self.arena;
        match (self.kind(node), arena.data(node)) {
            (SyntaxKind::ArrayLiteralExpression, NodeData::Elements { elements }) => {
                for &element in elements {
                    if self.kind(element) == SyntaxKind::SpreadElement {
                        if let Some(expression) = arena.expression(element) {
                            self.bind_assignment_target_flow(expression);
                        }
                    } else {
                        self.bind_destructuring_target_flow(element);
                    }
                }
            }
            (SyntaxKind::ObjectLiteralExpression, NodeData::Elements { elements }) => {
                for &property in elements {
                    match arena.data(property) {
                        NodeData::PropertyAssignment { initializer, .. } => {
                            self.bind_destructuring_target_flow(*initializer);
                        }
                        NodeData::ShorthandPropertyAssignment { name, .. } => {
                            self.bind_assignment_target_flow(*name);
                        }
                        NodeData::Wrapped { expression } if self.kind(property) == SyntaxKind::SpreadAssignment => {
                            self.bind_assignment_target_flow(*expression);
                        }
                        _ => {}
                    }
                }
            }
            _ => {
                if is_narrowable_reference(arena, node) {
                    self.current_flow = self.create_flow_mutation(FlowFlags::ASSIGNMENT, self.current_flow, node);
                }
            }
        }
    }

    fn bind_destructuring_target_flow(&mut self, node: NodeId) {
        match self.arena.data(node) {
            NodeData::Binary {
                left,
                operator: SyntaxKind::EqualsToken,
                ..
            } => self.bind_assignment_target_flow(*left),
            _ => self.bind_assignment_target_flow(node),
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn bind_while_statement(&mut self, node: NodeId) {
        let NodeData::While { expression, statement } = *self.arena.data(node) else {
            return;
        };
        let loop_label = self.graph.create_loop_label();
        let pre_while_label = self.set_continue_target(node, loop_label);
        let pre_body_label = self.create_branch_label();
        let post_while_label = self.create_branch_label();
        self.add_antecedent(pre_while_label, self.current_flow);
        self.current_flow = pre_while_label;
        self.bind_condition(Some(expression), pre_body_label, post_while_label);
        self.current_flow = self.finish_flow_label(pre_body_label);
        self.bind_iterative_statement(statement, post_while_label, pre_while_label);
        self.add_antecedent(pre_while_label, self.current_flow);
        self.current_flow = self.finish_flow_label(post_while_label);
    }

    fn bind_do_statement(&mut self, node: NodeId) {
        let NodeData::Do { statement, expression } = *self.arena.data(node) else {
            return;
        };
        let pre_do_label = self.graph.create_loop_label();
        let condition_label = self.create_branch_label();
        let pre_condition_label = self.set_continue_target(node, condition_label);
        let post_do_label = self.create_branch_label();
        self.add_antecedent(pre_do_label, self.current_flow);
        self.current_flow = pre_do_label;
        self.bind_iterative_statement(statement, post_do_label, pre_condition_label);
        self.add_antecedent(pre_condition_label, self.current_flow);
        self.current_flow = self.finish_flow_label(pre_condition_label);
        self.bind_condition(Some(expression), pre_do_label, post_do_label);
        self.current_flow = self.finish_flow_label(post_do_label);
    }

    fn bind_for_statement(&mut self, node: NodeId) {
        let NodeData::For {
            initializer,
            condition,
            incrementor,
            statement,
        } = *self.arena.data(node)
        else {
            return;
        };
        let loop_label = self.graph.create_loop_label();
        let pre_loop_label = self.set_continue_target(node, loop_label);
        let pre_body_label = self.create_branch_label();
        let post_loop_label = self.create_branch_label();
        self.bind(initializer);
        self.add_antecedent(pre_loop_label, self.current_flow);
        self.current_flow = pre_loop_label;
        self.bind_condition(condition, pre_body_label, post_loop_label);
        self.current_flow = self.finish_flow_label(pre_body_label);
        self.bind_iterative_statement(statement, post_loop_label, pre_loop_label);
        self.bind(incrementor);
        self.add_antecedent(pre_loop_label, self.current_flow);
        self.current_flow = self.finish_flow_label(post_loop_label);
    }

    fn bind_for_in_or_of_statement(&mut self, node: NodeId) {
        let NodeData::ForInOrOf {
            initializer,
            expression,
            statement,
            ..
        } = *self.arena.data(node)
        else {
            return;
        };
        let loop_label = self.graph.create_loop_label();
        let pre_loop_label = self.set_continue_target(node, loop_label);
        let post_loop_label = self.create_branch_label();
        self.bind(Some(expression));
        self.add_antecedent(pre_loop_label, self.current_flow);
        self.current_flow = pre_loop_label;
        self.add_antecedent(post_loop_label, self.current_flow);
        self.bind(Some(initializer));
        if self.kind(initializer) != SyntaxKind::VariableDeclarationList {
            self.bind_assignment_target_flow(initializer);
        }
        self.bind_iterative_statement(statement, post_loop_label, pre_loop_label);
        self.add_antecedent(pre_loop_label, self.current_flow);
        self.current_flow = self.finish_flow_label(post_loop_label);
    }

    fn bind_if_statement(&mut self, node: NodeId) {
        let NodeData::If {
            expression,
            then_statement,
            else_statement,
        } = *self.arena.data(node)
        else {
            return;
        };
        let then_label = self.create_branch_label();
        let else_label = self.create_branch_label();
        let post_if_label = self.create_branch_label();
        self.bind_condition(Some(expression), then_label, else_label);
        self.current_flow = self.finish_flow_label(then_label);
        self.bind(Some(then_statement));
        self.add_antecedent(post_if_label, self.current_flow);
        self.current_flow = self.finish_flow_label(else_label);
        self.bind(else_statement);
        self.add_antecedent(post_if_label, self.current_flow);
        self.current_flow = self.finish_flow_label(post_if_label);
    }

    fn bind_return_statement(&mut self, node: NodeId) {
        self.bind(self.arena.expression(node));
        if let Some(return_target) = self.current_return_target {
            self.add_antecedent(return_target, self.current_flow);
        }
        self.current_flow = FlowGraph::UNREACHABLE;
        self.has_explicit_return = true;
        self.has_flow_effects = true;
    }

    fn bind_throw_statement(&mut self, node: NodeId) {
        self.bind(self.arena.expression(node));
        self.current_flow = FlowGraph::UNREACHABLE;
        self.has_flow_effects = true;
    }

    fn bind_break_or_continue_statement(&mut self, node: NodeId, is_break: bool) {
        let NodeData::Jump { label } = *self.arena.data(node) else {
            return;
        };
        self.bind(label);
        let target = match label {
            Some(label) => {
                let name = self.intern(self.text_of(label));
                match self.active_labels.iter_mut().rev().find(|active| active.name == name) {
                    Some(active) => {
                        active.referenced = true;
                        if is_break {
                            Some(active.break_target)
                        } else {
                            active.continue_target
                        }
                    }
                    None => None,
                }
            }
            None if is_break => self.current_break_target,
            None => self.current_continue_target,
        };
        if let Some(target) = target {
            self.add_antecedent(target, self.current_flow);
            self.current_flow = FlowGraph::UNREACHABLE;
            self.has_flow_effects = true;
        }
    }

    /// Any code in the try block may throw, so every mutation inside it
    /// feeds the exception label, as does the flow on entry. A finally
    /// block is entered from normal exits, exceptions and returns; reduce
    /// labels let analysis past the finally see only the relevant subset.
    fn bind_try_statement(&mut self, node: NodeId) {
        let NodeData::Try {
            try_block,
            catch_clause,
            finally_block,
        } = *self.arena.data(node)
        else {
            return;
        };
        let save_return_target = self.current_return_target;
        let save_exception_target = self.current_exception_target;
        let normal_exit_label = self.create_branch_label();
        let return_label = self.create_branch_label();
        let mut exception_label = self.create_branch_label();
        if finally_block.is_some() {
            self.current_return_target = Some(return_label);
        }
        self.add_antecedent(exception_label, self.current_flow);
        self.current_exception_target = Some(exception_label);
        self.bind(Some(try_block));
        self.add_antecedent(normal_exit_label, self.current_flow);
        if let Some(catch_clause) = catch_clause {
            self.current_flow = self.finish_flow_label(exception_label);
            // Exceptions raised inside the catch block go to a fresh label.
            exception_label = self.create_branch_label();
            self.add_antecedent(exception_label, self.current_flow);
            self.current_exception_target = Some(exception_label);
            self.bind(Some(catch_clause));
            self.add_antecedent(normal_exit_label, self.current_flow);
        }
        self.current_return_target = save_return_target;
        self.current_exception_target = save_exception_target;

        let Some(finally_block) = finally_block else {
            self.current_flow = self.finish_flow_label(normal_exit_label);
            return;
        };
        let normal_exits = self.graph.antecedents_of(normal_exit_label);
        let exceptions = self.graph.antecedents_of(exception_label);
        let returns = self.graph.antecedents_of(return_label);
        let finally_label = self.graph.create_branch_label_from(
            normal_exits
                .iter()
                .chain(exceptions.iter())
                .chain(returns.iter())
                .copied(),
        );
        self.current_flow = finally_label;
        self.bind(Some(finally_block));
        if self.graph.is_unreachable(self.current_flow) {
            self.current_flow = FlowGraph::UNREACHABLE;
            return;
        }
        if let Some(return_target) = self.current_return_target {
            if !returns.is_empty() {
                let reduced = self.graph.create_reduce_label(finally_label, returns, self.current_flow);
                self.add_antecedent(return_target, reduced);
            }
        }
        if let Some(exception_target) = self.current_exception_target {
            if !exceptions.is_empty() {
                let reduced = self.graph.create_reduce_label(finally_label, exceptions, self.current_flow);
                self.add_antecedent(exception_target, reduced);
            }
        }
        self.current_flow = if normal_exits.is_empty() {
            FlowGraph::UNREACHABLE
        } else {
            self.graph.create_reduce_label(finally_label, normal_exits, self.current_flow)
        };
    }

    fn bind_switch_statement(&mut self, node: NodeId) {
        let NodeData::Switch { expression, case_block } = *self.arena.data(node) else {
            return;
        };
        let post_switch_label = self.create_branch_label();
        self.bind(Some(expression));
        let save_break_target = self.current_break_target;
        let save_pre_switch_case_flow = self.pre_switch_case_flow;
        self.current_break_target = Some(post_switch_label);
        self.pre_switch_case_flow = Some(self.current_flow);
        self.bind(Some(case_block));
        self.add_antecedent(post_switch_label, self.current_flow);
        let arena = self.arena;
        let has_default = match arena.data(case_block) {
            NodeData::CaseBlock { clauses } => clauses
                .iter()
                .any(|&clause| arena.kind(clause) == SyntaxKind::DefaultClause),
            _ => false,
        };
        let no_exits = self.graph.get(post_switch_label).antecedents().is_empty();
        self.possibly_exhaustive.insert(node, !has_default && no_exits);
        if !has_default {
            let implicit_default = self.create_flow_switch_clause(self.pre_switch_flow(), node, 0, 0);
            self.add_antecedent(post_switch_label, implicit_default);
        }
        self.current_break_target = save_break_target;
        self.pre_switch_case_flow = save_pre_switch_case_flow;
        self.current_flow = self.finish_flow_label(post_switch_label);
    }

    /// Empty clauses share the label of the next non-empty one, so
    /// `case 1: case 2: body` narrows by both tests at once.
    fn bind_case_block(&mut self, node: NodeId) {
        let arena = self.arena;
        let NodeData::CaseBlock { clauses } = arena.data(node) else {
            return;
        };
        let Some(switch_statement) = self.parent_of(node) else {
            return;
        };
        let is_narrowing_switch = match arena.expression(switch_statement) {
            Some(expression) => {
                arena.kind(expression) == SyntaxKind::TrueKeyword || is_narrowing_expression(arena, expression)
            }
            None => false,
        };
        let mut fallthrough_flow = FlowGraph::UNREACHABLE;
        let mut i = 0;
        while i < clauses.len() {
            let clause_start = i;
            while arena.statements(clauses[i]).is_empty() && i + 1 < clauses.len() {
                if fallthrough_flow == FlowGraph::UNREACHABLE {
                    self.current_flow = self.pre_switch_flow();
                }
                self.bind(Some(clauses[i]));
                i += 1;
            }
            let pre_case_label = self.create_branch_label();
            let pre_case_flow = if is_narrowing_switch {
                self.create_flow_switch_clause(self.pre_switch_flow(), switch_statement, clause_start, i + 1)
            } else {
                self.pre_switch_flow()
            };
            self.add_antecedent(pre_case_label, pre_case_flow);
            self.add_antecedent(pre_case_label, fallthrough_flow);
            self.current_flow = self.finish_flow_label(pre_case_label);
            let clause = clauses[i];
            self.bind(Some(clause));
            fallthrough_flow = self.current_flow;
            if !self.graph.is_unreachable(self.current_flow)
                && i != clauses.len() - 1
                && self.options.no_fallthrough_cases_in_switch()
            {
                self.fallthrough_flow_nodes.insert(clause, self.current_flow);
            }
            i += 1;
        }
    }

    /// Clause tests run against the state before the switch.
    fn bind_case_or_default_clause(&mut self, node: NodeId) {
        let arena = self.arena;
        let NodeData::CaseClause { expression, statements } = arena.data(node) else {
            return;
        };
        if let Some(expression) = *expression {
            let save_current_flow = self.current_flow;
            self.current_flow = self.pre_switch_flow();
            self.bind(Some(expression));
            self.current_flow = save_current_flow;
        }
        self.bind_each(statements);
    }

    fn bind_expression_statement(&mut self, node: NodeId) {
        let Some(expression) = self.arena.expression(node) else {
            return;
        };
        self.bind(Some(expression));
        self.maybe_bind_expression_flow_if_call(expression);
    }

    /// A top-level or comma-operand call through a dotted name may be an
    /// assertion, so it gets a flow node.
    fn maybe_bind_expression_flow_if_call(&mut self, node: NodeId) {
        if let NodeData::Call { expression, .. } = *self.arena.data(node) {
            if self.kind(node) == SyntaxKind::CallExpression
                && self.kind(expression) != SyntaxKind::SuperKeyword
                && is_dotted_name(self.arena, expression)
            {
                self.current_flow = self.create_flow_call(self.current_flow, node);
            }
        }
    }

    fn bind_labeled_statement(&mut self, node: NodeId) {
        let NodeData::Labeled { label, statement } = *self.arena.data(node) else {
            return;
        };
        let post_statement_label = self.create_branch_label();
        let name = self.intern(self.text_of(label));
        self.active_labels.push(ActiveLabel {
            name,
            break_target: post_statement_label,
            continue_target: None,
            referenced: false,
        });
        self.bind(Some(label));
        self.bind(Some(statement));
        let referenced = self.active_labels.pop().map_or(true, |active| active.referenced);
        if !referenced && self.options.reports_unused_labels() {
            self.error_or_suggestion_on_node(self.options.unused_label_is_error(), label, &messages::UNUSED_LABEL);
        }
        self.add_antecedent(post_statement_label, self.current_flow);
        self.current_flow = self.finish_flow_label(post_statement_label);
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn bind_prefix_unary_expression_flow(&mut self, node: NodeId) {
        let NodeData::Unary { operator, operand } = *self.arena.data(node) else {
            return;
        };
        if operator == SyntaxKind::ExclamationToken {
            let save_true_target = self.current_true_target;
            self.current_true_target = self.current_false_target;
            self.current_false_target = save_true_target;
            self.bind_each_child(node);
            self.current_false_target = self.current_true_target;
            self.current_true_target = save_true_target;
        } else {
            self.bind_each_child(node);
            if matches!(operator, SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken) {
                self.bind_assignment_target_flow(operand);
            }
        }
    }

    fn bind_postfix_unary_expression_flow(&mut self, node: NodeId) {
        let NodeData::Unary { operator, operand } = *self.arena.data(node) else {
            return;
        };
        self.bind_each_child(node);
        if matches!(operator, SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken) {
            self.bind_assignment_target_flow(operand);
        }
    }

    /// Nested patterns evaluate the right side before the target.
    fn bind_destructuring_assignment_flow(&mut self, node: NodeId) {
        let NodeData::Binary { left, right, .. } = *self.arena.data(node) else {
            return;
        };
        if self.in_assignment_pattern {
            self.in_assignment_pattern = false;
            self.bind(Some(right));
            self.in_assignment_pattern = true;
            self.bind(Some(left));
        } else {
            self.in_assignment_pattern = true;
            self.bind(Some(left));
            self.in_assignment_pattern = false;
            self.bind(Some(right));
        }
        self.bind_assignment_target_flow(left);
    }

    fn bind_binary_expression_flow(&mut self, node: NodeId) {
        let NodeData::Binary { left, operator, right } = *self.arena.data(node) else {
            return;
        };
        if operator.is_logical_or_coalescing_assignment_operator() {
            let targets = self.current_true_target.zip(self.current_false_target);
            match targets {
                Some((true_target, false_target)) if !self.is_top_level_logical_expression(node) => {
                    self.bind_logical_like_expression(node, true_target, false_target);
                }
                _ => {
                    let post_expression_label = self.create_branch_label();
                    let save_current_flow = self.current_flow;
                    let save_has_flow_effects = self.has_flow_effects;
                    self.has_flow_effects = false;
                    self.bind_logical_like_expression(node, post_expression_label, post_expression_label);
                    self.current_flow = if self.has_flow_effects {
                        self.finish_flow_label(post_expression_label)
                    } else {
                        save_current_flow
                    };
                    self.has_flow_effects |= save_has_flow_effects;
                }
            }
            return;
        }
        self.bind(Some(left));
        if operator == SyntaxKind::CommaToken {
            self.maybe_bind_expression_flow_if_call(left);
        }
        self.bind(Some(right));
        if operator == SyntaxKind::CommaToken {
            self.maybe_bind_expression_flow_if_call(right);
        }
        if operator.is_assignment_operator() && !self.is_assignment_target(node) {
            self.bind_assignment_target_flow(left);
            if operator == SyntaxKind::EqualsToken {
                if let NodeData::ElementAccess { expression, .. } = *self.arena.data(left) {
                    if is_narrowable_operand(self.arena, expression) {
                        self.current_flow =
                            self.create_flow_mutation(FlowFlags::ARRAY_MUTATION, self.current_flow, node);
                    }
                }
            }
        }
    }

    /// `a && b` is bound as "if a then b"; `a ||= b` additionally assigns
    /// `a` on the right-hand path.
    fn bind_logical_like_expression(&mut self, node: NodeId, true_target: FlowNodeId, false_target: FlowNodeId) {
        let NodeData::Binary { left, operator, right } = *self.arena.data(node) else {
            return;
        };
        let pre_right_label = self.create_branch_label();
        if matches!(
            operator,
            SyntaxKind::AmpersandAmpersandToken | SyntaxKind::AmpersandAmpersandEqualsToken
        ) {
            self.bind_condition(Some(left), pre_right_label, false_target);
        } else {
            self.bind_condition(Some(left), true_target, pre_right_label);
        }
        self.current_flow = self.finish_flow_label(pre_right_label);
        if operator.is_logical_assignment_operator() {
            self.do_with_conditional_branches(true_target, false_target, |binder| binder.bind(Some(right)));
            self.bind_assignment_target_flow(left);
            self.add_conditions(true_target, false_target, Some(node));
        } else {
            self.bind_condition(Some(right), true_target, false_target);
        }
    }

    fn bind_delete_expression_flow(&mut self, node: NodeId) {
        self.bind_each_child(node);
        if let Some(expression) = self.arena.expression(node) {
            if self.kind(expression) == SyntaxKind::PropertyAccessExpression {
                self.bind_assignment_target_flow(expression);
            }
        }
    }

    fn bind_conditional_expression_flow(&mut self, node: NodeId) {
        let NodeData::Conditional {
            condition,
            when_true,
            when_false,
        } = *self.arena.data(node)
        else {
            return;
        };
        let true_label = self.create_branch_label();
        let false_label = self.create_branch_label();
        let post_expression_label = self.create_branch_label();
        let save_current_flow = self.current_flow;
        let save_has_flow_effects = self.has_flow_effects;
        self.has_flow_effects = false;
        self.bind_condition(Some(condition), true_label, false_label);
        self.current_flow = self.finish_flow_label(true_label);
        self.bind(Some(when_true));
        self.add_antecedent(post_expression_label, self.current_flow);
        self.current_flow = self.finish_flow_label(false_label);
        self.bind(Some(when_false));
        self.add_antecedent(post_expression_label, self.current_flow);
        self.current_flow = if self.has_flow_effects {
            self.finish_flow_label(post_expression_label)
        } else {
            save_current_flow
        };
        self.has_flow_effects |= save_has_flow_effects;
    }

    fn bind_variable_declaration_flow(&mut self, node: NodeId) {
        self.bind_each_child(node);
        let in_for_in_or_of = self
            .parent_of(node)
            .and_then(|list| self.parent_kind(list))
            .is_some_and(|kind| matches!(kind, SyntaxKind::ForInStatement | SyntaxKind::ForOfStatement));
        if self.arena.initializer(node).is_some() || in_for_in_or_of {
            self.bind_initialized_variable_flow(node);
        }
    }

    /// One assignment per bound name, walking into nested patterns.
    fn bind_initialized_variable_flow(&mut self, node: NodeId) {
        let arena = self.arena;
        let name = match self.kind(node) {
            SyntaxKind::VariableDeclaration | SyntaxKind::BindingElement => arena.name(node),
            _ => None,
        };
        match name.map(|name| (name, arena.data(name))) {
            Some((name, NodeData::BindingPattern { elements })) if self.kind(name).is_binding_pattern() => {
                for &element in elements {
                    self.bind_initialized_variable_flow(element);
                }
            }
            _ => {
                self.current_flow = self.create_flow_mutation(FlowFlags::ASSIGNMENT, self.current_flow, node);
            }
        }
    }

    fn bind_call_expression_flow(&mut self, node: NodeId) {
        let arena = self.arena;
        let NodeData::Call {
            expression,
            type_arguments,
            arguments,
            ..
        } = arena.data(node)
        else {
            return;
        };
        let expression = *expression;
        if is_optional_chain(self.arena, node) {
            self.bind_optional_chain_flow(node);
        } else {
            let callee = skip_parentheses(self.arena, expression);
            if matches!(self.kind(callee), SyntaxKind::FunctionExpression | SyntaxKind::ArrowFunction) {
                // An IIFE body continues the current flow, which includes
                // the evaluation of its arguments.
                self.bind_each(type_arguments);
                self.bind_each(arguments);
                self.bind(Some(expression));
            } else {
                self.bind_each_child(node);
                if self.kind(expression) == SyntaxKind::SuperKeyword {
                    self.current_flow = self.create_flow_call(self.current_flow, node);
                }
            }
        }
        if let NodeData::PropertyAccess {
            expression: target,
            name,
            ..
        } = *self.arena.data(expression)
        {
            if self.kind(expression) == SyntaxKind::PropertyAccessExpression
                && is_push_or_unshift_identifier(self.arena, name)
                && is_narrowable_operand(self.arena, target)
            {
                self.current_flow = self.create_flow_mutation(FlowFlags::ARRAY_MUTATION, self.current_flow, node);
            }
        }
    }

    /// Initializers of binding elements run before the pattern binds.
    fn bind_binding_element_flow(&mut self, node: NodeId) {
        let NodeData::BindingElement {
            property_name,
            name,
            initializer,
            ..
        } = *self.arena.data(node)
        else {
            return;
        };
        self.bind(property_name);
        self.bind_initializer(initializer);
        self.bind(Some(name));
    }

    fn bind_parameter_flow(&mut self, node: NodeId) {
        let NodeData::Parameter {
            name,
            type_annotation,
            initializer,
            ..
        } = *self.arena.data(node)
        else {
            return;
        };
        self.bind(type_annotation);
        self.bind_initializer(initializer);
        self.bind(Some(name));
    }

    /// A default value is only evaluated sometimes, so flow after it joins
    /// the paths with and without it.
    fn bind_initializer(&mut self, node: Option<NodeId>) {
        if node.is_none() {
            return;
        }
        let entry_flow = self.current_flow;
        self.bind(node);
        if entry_flow == FlowGraph::UNREACHABLE || entry_flow == self.current_flow {
            return;
        }
        let exit_flow = self.create_branch_label();
        self.add_antecedent(exit_flow, entry_flow);
        self.add_antecedent(exit_flow, self.current_flow);
        self.current_flow = self.finish_flow_label(exit_flow);
    }

    // ========================================================================
    // Optional chains
    // ========================================================================

    fn bind_optional_chain_flow(&mut self, node: NodeId) {
        let targets = self.current_true_target.zip(self.current_false_target);
        match targets {
            Some((true_target, false_target)) if !self.is_top_level_logical_expression(node) => {
                self.bind_optional_chain(node, true_target, false_target);
            }
            _ => {
                let post_expression_label = self.create_branch_label();
                let save_current_flow = self.current_flow;
                let save_has_flow_effects = self.has_flow_effects;
                self.bind_optional_chain(node, post_expression_label, post_expression_label);
                self.current_flow = if self.has_flow_effects {
                    self.finish_flow_label(post_expression_label)
                } else {
                    save_current_flow
                };
                self.has_flow_effects |= save_has_flow_effects;
            }
        }
    }

    /// `a?.b.c` is bound like `a && a.b.c`: the chain root's expression is
    /// the condition and the rest of the chain is its true branch.
    fn bind_optional_chain(&mut self, node: NodeId, true_target: FlowNodeId, false_target: FlowNodeId) {
        let pre_chain_label = if self.is_optional_chain_root(node) {
            Some(self.create_branch_label())
        } else {
            None
        };
        if let Some(expression) = self.arena.expression(node) {
            self.bind_optional_expression(expression, pre_chain_label.unwrap_or(true_target), false_target);
        }
        if let Some(pre_chain_label) = pre_chain_label {
            self.current_flow = self.finish_flow_label(pre_chain_label);
        }
        self.do_with_conditional_branches(true_target, false_target, |binder| {
            binder.bind_optional_chain_rest(node);
        });
        if self.is_outermost_optional_chain(node) {
            self.add_conditions(true_target, false_target, Some(node));
        }
    }

    fn bind_optional_expression(&mut self, node: NodeId, true_target: FlowNodeId, false_target: FlowNodeId) {
        self.do_with_conditional_branches(true_target, false_target, |binder| binder.bind(Some(node)));
        if !is_optional_chain(self.arena, node) || self.is_outermost_optional_chain(node) {
            self.add_conditions(true_target, false_target, Some(node));
        }
    }

    fn bind_optional_chain_rest(&mut self, node: NodeId) {
        let arena = self.arena;
        match arena.data(node) {
            NodeData::PropertyAccess { name, .. } => self.bind(Some(*name)),
            NodeData::ElementAccess {
                argument_expression, ..
            } => self.bind(Some(*argument_expression)),
            NodeData::Call {
                type_arguments,
                arguments,
                ..
            } => {
                self.bind_each(type_arguments);
                self.bind_each(arguments);
            }
            _ => {}
        }
    }

    // ========================================================================
    // Predicates
    // ========================================================================

    fn is_optional_chain_root(&self, node: NodeId) -> bool {
        is_optional_chain(self.arena, node) && has_question_dot(self.arena, node)
    }

    /// Whether `node` ends its optional chain: its parent is not a link of
    /// the same chain.
    fn is_outermost_optional_chain(&self, node: NodeId) -> bool {
        match self.parent_of(node) {
            Some(parent) => {
                !is_optional_chain(self.arena, parent)
                    || self.is_optional_chain_root(parent)
                    || self.arena.expression(parent) != Some(node)
            }
            None => true,
        }
    }

    /// `a` in `a?.b`.
    fn is_expression_of_optional_chain_root(&self, node: NodeId) -> bool {
        self.parent_of(node).is_some_and(|parent| {
            self.is_optional_chain_root(parent) && self.arena.expression(parent) == Some(node)
        })
    }

    fn is_nullish_coalesce(&self, node: NodeId) -> bool {
        matches!(
            self.arena.data(node),
            NodeData::Binary {
                operator: SyntaxKind::QuestionQuestionToken,
                ..
            }
        )
    }

    fn is_destructuring_assignment(&self, node: NodeId) -> bool {
        match self.arena.data(node) {
            NodeData::Binary {
                left,
                operator: SyntaxKind::EqualsToken,
                ..
            } => matches!(
                self.kind(*left),
                SyntaxKind::ObjectLiteralExpression | SyntaxKind::ArrayLiteralExpression
            ),
            _ => false,
        }
    }

    /// `&&`, `||` or `??`, looking through parentheses and `!`.
    fn is_logical_expression(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            match (self.kind(current), self.arena.data(current)) {
                (SyntaxKind::ParenthesizedExpression, NodeData::Wrapped { expression }) => current = *expression,
                (
                    SyntaxKind::PrefixUnaryExpression,
                    NodeData::Unary {
                        operator: SyntaxKind::ExclamationToken,
                        operand,
                    },
                ) => current = *operand,
                (SyntaxKind::BinaryExpression, NodeData::Binary { operator, .. }) => {
                    return operator.is_logical_operator();
                }
                _ => return false,
            }
        }
    }

    fn is_logical_assignment_expression(&self, node: NodeId) -> bool {
        let inner = skip_parentheses(self.arena, node);
        matches!(
            self.arena.data(inner),
            NodeData::Binary { operator, .. } if operator.is_logical_assignment_operator()
        )
    }

    /// The condition slot of an `if`, loop or conditional expression.
    fn is_statement_condition(&self, node: NodeId) -> bool {
        let Some(parent) = self.parent_of(node) else {
            return false;
        };
        match self.arena.data(parent) {
            NodeData::If { expression, .. } | NodeData::While { expression, .. } | NodeData::Do { expression, .. } => {
                *expression == node
            }
            NodeData::For { condition, .. } => *condition == Some(node),
            NodeData::Conditional { condition, .. } => *condition == node,
            _ => false,
        }
    }

    /// A logical expression or optional chain whose value is not itself
    /// consumed as a condition.
    fn is_top_level_logical_expression(&self, node: NodeId) -> bool {
        let mut current = node;
        while let Some(parent) = self.parent_of(current) {
            let transparent = match self.arena.data(parent) {
                NodeData::Wrapped { .. } => self.kind(parent) == SyntaxKind::ParenthesizedExpression,
                NodeData::Unary { operator, .. } => {
                    self.kind(parent) == SyntaxKind::PrefixUnaryExpression
                        && *operator == SyntaxKind::ExclamationToken
                }
                _ => false,
            };
            if !transparent {
                break;
            }
            current = parent;
        }
        if self.is_statement_condition(current) {
            return false;
        }
        match self.parent_of(current) {
            Some(parent) => {
                !self.is_logical_expression(parent)
                    && !(is_optional_chain(self.arena, parent) && self.arena.expression(parent) == Some(current))
            }
            None => true,
        }
    }

    /// Whether `node` is written to: the left of an assignment, the operand
    /// of `++`/`--`, or nested in a destructuring target.
    fn is_assignment_target(&self, node: NodeId) -> bool {
        let mut current = node;
        while let Some(parent) = self.parent_of(current) {
            match (self.kind(parent), self.arena.data(parent)) {
                (SyntaxKind::BinaryExpression, NodeData::Binary { left, operator, .. }) => {
                    return operator.is_assignment_operator() && *left == current;
                }
                (SyntaxKind::PrefixUnaryExpression | SyntaxKind::PostfixUnaryExpression, NodeData::Unary { operator, .. }) => {
                    return matches!(operator, SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken);
                }
                (SyntaxKind::ForInStatement | SyntaxKind::ForOfStatement, NodeData::ForInOrOf { initializer, .. }) => {
                    return *initializer == current;
                }
                (
                    SyntaxKind::ParenthesizedExpression
                    | SyntaxKind::ArrayLiteralExpression
                    | SyntaxKind::SpreadElement
                    | SyntaxKind::NonNullExpression,
                    _,
                ) => current = parent,
                (SyntaxKind::SpreadAssignment, _) => match self.parent_of(parent) {
                    Some(object) => current = object,
                    None => return false,
                },
                (SyntaxKind::ShorthandPropertyAssignment, NodeData::ShorthandPropertyAssignment { name, .. }) => {
                    if *name != current {
                        return false;
                    }
                    match self.parent_of(parent) {
                        Some(object) => current = object,
                        None => return false,
                    }
                }
                (SyntaxKind::PropertyAssignment, NodeData::PropertyAssignment { name, .. }) => {
                    if *name == current {
                        return false;
                    }
                    match self.parent_of(parent) {
                        Some(object) => current = object,
                        None => return false,
                    }
                }
                _ => return false,
            }
        }
        false
    }
}
