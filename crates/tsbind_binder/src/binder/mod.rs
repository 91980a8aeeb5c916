//! The binder implementation.
//!
//! Walks one source file top-down in a single pass and produces its
//! [`Binding`]. Handles:
//! - Symbol creation and declaration merging for every declaration kind
//! - Container tracking (which table a declaration lands in)
//! - Function hoisting within blocks
//! - Control flow graph construction
//! - Strict-mode and reachability diagnostics
//!
//! The tree is never mutated. Parents, symbols, flow nodes and the flags the
//! binder computes are recorded in side tables indexed by `NodeId`.

mod control_flow;
mod declarations;
mod strict;

use crate::binding::{Binding, PatternAmbientModule};
use crate::container::{container_flags, ContainerFlags};
use crate::flow::FlowGraph;
use crate::symbol::{Symbol, SymbolTable};
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use tsbind_ast::node::{NodeArena, NodeData, SourceFile};
use tsbind_ast::types::*;
use tsbind_ast::utilities::{module_instance_state, skip_trivia, token_range_at, ModuleInstanceState};
use tsbind_ast::SyntaxKind;
use tsbind_core::intern::{InternedString, StringInterner};
use tsbind_core::text::{TextRange, TextSpan};
use tsbind_core::FxHashMap;
use tsbind_diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticCollection, DiagnosticMessage};
use tsbind_options::{CompilerOptions, ScriptTarget};

/// A label in scope for `break label` / `continue label`.
#[derive(Debug, Clone)]
struct ActiveLabel {
    name: InternedString,
    break_target: FlowNodeId,
    continue_target: Option<FlowNodeId>,
    referenced: bool,
}

/// Per-file binder state.
pub(crate) struct Binder<'a> {
    file: &'a SourceFile,
    arena: &'a NodeArena,
    options: &'a CompilerOptions,
    interner: StringInterner,
    language_version: ScriptTarget,

    // Output
    symbols: Vec<Symbol>,
    node_symbols: Vec<Option<SymbolId>>,
    local_symbols: FxHashMap<NodeId, SymbolId>,
    locals: FxHashMap<NodeId, SymbolTable>,
    parents: Vec<Option<NodeId>>,
    node_flags: Vec<NodeFlags>,
    flow_nodes: Vec<Option<FlowNodeId>>,
    end_flow_nodes: FxHashMap<NodeId, FlowNodeId>,
    return_flow_nodes: FxHashMap<NodeId, FlowNodeId>,
    fallthrough_flow_nodes: FxHashMap<NodeId, FlowNodeId>,
    possibly_exhaustive: FxHashMap<NodeId, bool>,
    graph: FlowGraph,
    classifiable_names: IndexSet<InternedString, FxBuildHasher>,
    pattern_ambient_modules: Vec<PatternAmbientModule>,
    container_chain: Vec<NodeId>,
    diagnostics: DiagnosticCollection,
    suggestions: Vec<Diagnostic>,

    // Traversal state
    parent: Option<NodeId>,
    container: Option<NodeId>,
    this_container: Option<NodeId>,
    block_scope_container: Option<NodeId>,
    in_strict_mode: bool,
    in_assignment_pattern: bool,
    seen_this_keyword: bool,
    seen_parse_error: bool,

    // Flow state
    current_flow: FlowNodeId,
    current_break_target: Option<FlowNodeId>,
    current_continue_target: Option<FlowNodeId>,
    current_return_target: Option<FlowNodeId>,
    current_true_target: Option<FlowNodeId>,
    current_false_target: Option<FlowNodeId>,
    current_exception_target: Option<FlowNodeId>,
    pre_switch_case_flow: Option<FlowNodeId>,
    active_labels: Vec<ActiveLabel>,
    has_explicit_return: bool,
    has_flow_effects: bool,
}

impl<'a> Binder<'a> {
    pub(crate) fn new(file: &'a SourceFile, options: &'a CompilerOptions) -> Self {
        let arena = &file.arena;
        let count = arena.len();
        let in_strict_mode =
            (options.bind_in_strict_mode() && !file.is_declaration_file) || file.is_external_module();
        Self {
            file,
            arena,
            options,
            interner: arena.interner().clone(),
            language_version: options.emit_script_target(),
            symbols: Vec::new(),
            node_symbols: vec![None; count],
            local_symbols: FxHashMap::default(),
            locals: FxHashMap::default(),
            parents: vec![None; count],
            node_flags: vec![NodeFlags::NONE; count],
            flow_nodes: vec![None; count],
            end_flow_nodes: FxHashMap::default(),
            return_flow_nodes: FxHashMap::default(),
            fallthrough_flow_nodes: FxHashMap::default(),
            possibly_exhaustive: FxHashMap::default(),
            graph: FlowGraph::new(),
            classifiable_names: IndexSet::default(),
            pattern_ambient_modules: Vec::new(),
            container_chain: Vec::new(),
            diagnostics: DiagnosticCollection::new(),
            suggestions: Vec::new(),
            parent: None,
            container: None,
            this_container: None,
            block_scope_container: None,
            in_strict_mode,
            in_assignment_pattern: false,
            seen_this_keyword: false,
            seen_parse_error: false,
            current_flow: FlowGraph::UNREACHABLE,
            current_break_target: None,
            current_continue_target: None,
            current_return_target: None,
            current_true_target: None,
            current_false_target: None,
            current_exception_target: None,
            pre_switch_case_flow: None,
            active_labels: Vec::new(),
            has_explicit_return: false,
            has_flow_effects: false,
        }
    }

    /// Bind the whole file and hand back the results.
    pub(crate) fn bind_file(mut self) -> Binding {
        let root = self.file.root;
        self.bind(Some(root));
        let file_symbol = self.node_symbols[root.index()];
        tracing::debug!(
            symbols = self.symbols.len(),
            flow_nodes = self.graph.len(),
            diagnostics = self.diagnostics.len(),
            "bound file"
        );
        Binding {
            interner: self.interner,
            symbols: self.symbols,
            file_symbol,
            node_symbols: self.node_symbols,
            local_symbols: self.local_symbols,
            locals: self.locals,
            parents: self.parents,
            node_flags: self.node_flags,
            flow: self.graph,
            flow_nodes: self.flow_nodes,
            end_flow_nodes: self.end_flow_nodes,
            return_flow_nodes: self.return_flow_nodes,
            fallthrough_flow_nodes: self.fallthrough_flow_nodes,
            possibly_exhaustive: self.possibly_exhaustive,
            classifiable_names: self.classifiable_names,
            pattern_ambient_modules: self.pattern_ambient_modules,
            container_chain: self.container_chain,
            diagnostics: self.diagnostics,
            suggestions: self.suggestions,
        }
    }

    // ========================================================================
    // Walk
    // ========================================================================

    fn bind(&mut self, node: Option<NodeId>) {
        let Some(node) = node else {
            return;
        };
        self.parents[node.index()] = self.parent;
        let save_in_strict_mode = self.in_strict_mode;

        self.bind_worker(node);

        let has_own_error = self.arena.flags(node).contains(NodeFlags::THIS_NODE_HAS_ERROR);
        if self.kind(node) > SyntaxKind::LAST_TOKEN {
            let save_parent = self.parent;
            let save_seen_parse_error = self.seen_parse_error;
            let flags = container_flags(self.arena, node, self.parent_kind(node));
            self.parent = Some(node);
            self.seen_parse_error = false;
            if flags.is_empty() {
                self.bind_children(node);
            } else {
                self.bind_container(node, flags);
            }
            self.parent = save_parent;
            let subtree_has_error = self.seen_parse_error || has_own_error;
            if subtree_has_error {
                self.node_flags[node.index()] |= NodeFlags::THIS_NODE_OR_ANY_SUB_NODES_HAS_ERROR;
            }
            self.seen_parse_error = save_seen_parse_error || subtree_has_error;
        } else if has_own_error {
            self.node_flags[node.index()] |= NodeFlags::THIS_NODE_OR_ANY_SUB_NODES_HAS_ERROR;
            self.seen_parse_error = true;
        }

        self.in_strict_mode = save_in_strict_mode;
    }

    fn bind_each(&mut self, nodes: &[NodeId]) {
        for &node in nodes {
            self.bind(Some(node));
        }
    }

    fn bind_each_child(&mut self, node: NodeId) {
        let arena = self.arena;
        tsbind_ast::for_each_child(arena, node, |child| self.bind(Some(child)));
    }

    /// Function declarations first, so calls may precede them.
    fn bind_each_statement_functions_first(&mut self, statements: &[NodeId]) {
        for &statement in statements {
            if self.kind(statement) == SyntaxKind::FunctionDeclaration {
                self.bind(Some(statement));
            }
        }
        for &statement in statements {
            if self.kind(statement) != SyntaxKind::FunctionDeclaration {
                self.bind(Some(statement));
            }
        }
    }

    /// Enter a node that scopes declarations or flow.
    fn bind_container(&mut self, node: NodeId, flags: ContainerFlags) {
        let save_container = self.container;
        let save_this_container = self.this_container;
        let save_block_scope_container = self.block_scope_container;

        if flags.contains(ContainerFlags::IS_CONTAINER) {
            self.container = Some(node);
            self.block_scope_container = Some(node);
            if flags.contains(ContainerFlags::HAS_LOCALS) {
                self.container_chain.push(node);
            }
        } else if flags.contains(ContainerFlags::IS_BLOCK_SCOPED_CONTAINER) {
            self.block_scope_container = Some(node);
            self.container_chain.push(node);
        }
        if flags.contains(ContainerFlags::IS_THIS_CONTAINER) {
            self.this_container = Some(node);
        }

        if flags.contains(ContainerFlags::IS_CONTROL_FLOW_CONTAINER) {
            self.bind_control_flow_container(node, flags);
        } else if flags.contains(ContainerFlags::IS_INTERFACE) {
            self.seen_this_keyword = false;
            self.bind_children(node);
            self.node_flags[node.index()].set(NodeFlags::CONTAINS_THIS, self.seen_this_keyword);
        } else {
            self.bind_children(node);
        }

        self.container = save_container;
        self.this_container = save_this_container;
        self.block_scope_container = save_block_scope_container;
    }

    /// A function-like, module block, source file or initialized property
    /// gets its own flow graph. Non-async, non-generator IIFEs and static
    /// blocks continue the enclosing graph instead.
    fn bind_control_flow_container(&mut self, node: NodeId, flags: ContainerFlags) {
        let save_current_flow = self.current_flow;
        let save_break_target = self.current_break_target;
        let save_continue_target = self.current_continue_target;
        let save_return_target = self.current_return_target;
        let save_exception_target = self.current_exception_target;
        let save_active_labels = std::mem::take(&mut self.active_labels);
        let save_has_explicit_return = self.has_explicit_return;

        let kind = self.kind(node);
        let is_immediately_invoked = (flags.contains(ContainerFlags::IS_FUNCTION_EXPRESSION)
            && !self.arena.modifier_flags(node).contains(ModifierFlags::ASYNC)
            && !self.is_generator_function_expression(node)
            && self.immediately_invoked_call(node).is_some())
            || kind == SyntaxKind::ClassStaticBlockDeclaration;

        if !is_immediately_invoked {
            let records_container = flags.intersects(
                ContainerFlags::IS_FUNCTION_EXPRESSION
                    | ContainerFlags::IS_OBJECT_LITERAL_OR_CLASS_EXPRESSION_METHOD_OR_ACCESSOR,
            );
            self.current_flow = self.graph.create_start(records_container.then_some(node));
        }
        self.current_return_target = if is_immediately_invoked || kind == SyntaxKind::Constructor {
            Some(self.graph.create_branch_label())
        } else {
            None
        };
        self.current_exception_target = None;
        self.current_break_target = None;
        self.current_continue_target = None;
        self.has_explicit_return = false;

        self.bind_children(node);

        self.node_flags[node.index()].remove(NodeFlags::HAS_IMPLICIT_RETURN | NodeFlags::HAS_EXPLICIT_RETURN);
        if !self.graph.is_unreachable(self.current_flow)
            && flags.contains(ContainerFlags::IS_FUNCTION_LIKE)
            && self.arena.body(node).is_some()
        {
            self.node_flags[node.index()] |= NodeFlags::HAS_IMPLICIT_RETURN;
            if self.has_explicit_return {
                self.node_flags[node.index()] |= NodeFlags::HAS_EXPLICIT_RETURN;
            }
            self.end_flow_nodes.insert(node, self.current_flow);
        }
        if kind == SyntaxKind::SourceFile {
            self.end_flow_nodes.insert(node, self.current_flow);
        }
        if let Some(return_target) = self.current_return_target {
            self.graph.add_antecedent(return_target, self.current_flow);
            self.current_flow = self.graph.finish_label(return_target);
            if matches!(kind, SyntaxKind::Constructor | SyntaxKind::ClassStaticBlockDeclaration) {
                self.return_flow_nodes.insert(node, self.current_flow);
            }
        }
        if !is_immediately_invoked {
            self.current_flow = save_current_flow;
        }

        self.current_break_target = save_break_target;
        self.current_continue_target = save_continue_target;
        self.current_return_target = save_return_target;
        self.current_exception_target = save_exception_target;
        self.active_labels = save_active_labels;
        self.has_explicit_return = save_has_explicit_return;
    }

    /// Declarations and checks that happen before a node's children are
    /// bound.
    fn bind_worker(&mut self, node: NodeId) {
        match self.kind(node) {
            SyntaxKind::Identifier => {
                self.set_flow_node(node);
                self.check_contextual_identifier(node);
            }
            SyntaxKind::ThisKeyword | SyntaxKind::SuperKeyword | SyntaxKind::MetaProperty => {
                self.set_flow_node(node);
            }
            SyntaxKind::PrivateIdentifier => self.check_private_identifier(node),
            SyntaxKind::QualifiedName => {
                if self.is_part_of_type_query(node) {
                    self.set_flow_node(node);
                }
            }
            SyntaxKind::PropertyAccessExpression | SyntaxKind::ElementAccessExpression => {
                if crate::narrowing::is_narrowable_reference(self.arena, node) {
                    self.set_flow_node(node);
                }
            }
            SyntaxKind::BinaryExpression => {
                if self.is_function_property_assignment(node) {
                    self.bind_function_property_assignment(node);
                } else if self.is_constructor_this_assignment(node) {
                    self.bind_constructor_this_assignment(node);
                }
                self.check_strict_mode_binary_expression(node);
            }
            SyntaxKind::CatchClause => self.check_strict_mode_catch_clause(node),
            SyntaxKind::DeleteExpression => self.check_strict_mode_delete_expression(node),
            SyntaxKind::PostfixUnaryExpression => self.check_strict_mode_postfix_unary_expression(node),
            SyntaxKind::PrefixUnaryExpression => self.check_strict_mode_prefix_unary_expression(node),
            SyntaxKind::WithStatement => self.check_strict_mode_with_statement(node),
            SyntaxKind::LabeledStatement => self.check_strict_mode_labeled_statement(node),
            SyntaxKind::ThisType => self.seen_this_keyword = true,
            SyntaxKind::TypeParameter => self.bind_type_parameter(node),
            SyntaxKind::Parameter => self.bind_parameter(node),
            SyntaxKind::VariableDeclaration => self.bind_variable_declaration_or_binding_element(node),
            SyntaxKind::BindingElement => {
                self.set_flow_node(node);
                self.bind_variable_declaration_or_binding_element(node);
            }
            SyntaxKind::PropertyDeclaration | SyntaxKind::PropertySignature => self.bind_property(node),
            SyntaxKind::PropertyAssignment | SyntaxKind::ShorthandPropertyAssignment => {
                self.bind_property_or_method_or_accessor(node, SymbolFlags::PROPERTY, SymbolFlags::PROPERTY_EXCLUDES);
            }
            SyntaxKind::EnumMember => {
                self.bind_property_or_method_or_accessor(
                    node,
                    SymbolFlags::ENUM_MEMBER,
                    SymbolFlags::ENUM_MEMBER_EXCLUDES,
                );
            }
            SyntaxKind::CallSignature | SyntaxKind::ConstructSignature | SyntaxKind::IndexSignature => {
                self.declare_symbol_and_add_to_symbol_table(node, SymbolFlags::SIGNATURE, SymbolFlags::NONE);
            }
            SyntaxKind::MethodDeclaration | SyntaxKind::MethodSignature => {
                let optional = self.optional_flag(node);
                let excludes = if self.parent_kind(node) == Some(SyntaxKind::ObjectLiteralExpression) {
                    SymbolFlags::PROPERTY_EXCLUDES
                } else {
                    SymbolFlags::METHOD_EXCLUDES
                };
                self.bind_property_or_method_or_accessor(node, SymbolFlags::METHOD | optional, excludes);
            }
            SyntaxKind::FunctionDeclaration => self.bind_function_declaration(node),
            SyntaxKind::Constructor => {
                self.declare_symbol_and_add_to_symbol_table(node, SymbolFlags::CONSTRUCTOR, SymbolFlags::NONE);
            }
            SyntaxKind::GetAccessor => {
                self.bind_property_or_method_or_accessor(
                    node,
                    SymbolFlags::GET_ACCESSOR,
                    SymbolFlags::GET_ACCESSOR_EXCLUDES,
                );
            }
            SyntaxKind::SetAccessor => {
                self.bind_property_or_method_or_accessor(
                    node,
                    SymbolFlags::SET_ACCESSOR,
                    SymbolFlags::SET_ACCESSOR_EXCLUDES,
                );
            }
            SyntaxKind::FunctionType | SyntaxKind::ConstructorType => self.bind_function_or_constructor_type(node),
            SyntaxKind::TypeLiteral | SyntaxKind::MappedType => {
                self.bind_anonymous_declaration(node, SymbolFlags::TYPE_LITERAL, crate::symbol::internal_names::TYPE);
            }
            SyntaxKind::ObjectLiteralExpression => {
                self.bind_anonymous_declaration(
                    node,
                    SymbolFlags::OBJECT_LITERAL,
                    crate::symbol::internal_names::OBJECT,
                );
            }
            SyntaxKind::FunctionExpression | SyntaxKind::ArrowFunction => self.bind_function_expression(node),
            SyntaxKind::ClassDeclaration | SyntaxKind::ClassExpression => {
                self.in_strict_mode = true;
                self.bind_class_like_declaration(node);
            }
            SyntaxKind::InterfaceDeclaration => {
                self.bind_block_scoped_declaration(node, SymbolFlags::INTERFACE, SymbolFlags::INTERFACE_EXCLUDES);
            }
            SyntaxKind::TypeAliasDeclaration => {
                self.bind_block_scoped_declaration(node, SymbolFlags::TYPE_ALIAS, SymbolFlags::TYPE_ALIAS_EXCLUDES);
            }
            SyntaxKind::EnumDeclaration => self.bind_enum_declaration(node),
            SyntaxKind::ModuleDeclaration => self.bind_module_declaration(node),
            SyntaxKind::ImportEqualsDeclaration
            | SyntaxKind::NamespaceImport
            | SyntaxKind::ImportSpecifier
            | SyntaxKind::ExportSpecifier => {
                self.declare_symbol_and_add_to_symbol_table(node, SymbolFlags::ALIAS, SymbolFlags::ALIAS_EXCLUDES);
            }
            SyntaxKind::NamespaceExportDeclaration => self.bind_namespace_export_declaration(node),
            SyntaxKind::ImportClause => {
                if self.arena.name(node).is_some() {
                    self.declare_symbol_and_add_to_symbol_table(node, SymbolFlags::ALIAS, SymbolFlags::ALIAS_EXCLUDES);
                }
            }
            SyntaxKind::ExportDeclaration => self.bind_export_declaration(node),
            SyntaxKind::ExportAssignment => self.bind_export_assignment(node),
            SyntaxKind::SourceFile => {
                self.update_strict_mode_statement_list(self.arena.statements(node));
                self.bind_source_file_if_external_module();
            }
            SyntaxKind::Block => {
                let parent_kind = self.parent_kind(node);
                if parent_kind.is_some_and(|kind| {
                    kind.is_function_like() || kind == SyntaxKind::ClassStaticBlockDeclaration
                }) {
                    self.update_strict_mode_statement_list(self.arena.statements(node));
                }
            }
            SyntaxKind::ModuleBlock => self.update_strict_mode_statement_list(self.arena.statements(node)),
            _ => {}
        }
    }

    // ========================================================================
    // Tree helpers
    // ========================================================================

    #[inline]
    fn kind(&self, node: NodeId) -> SyntaxKind {
        self.arena.kind(node)
    }

    #[inline]
    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.parents[node.index()]
    }

    fn parent_kind(&self, node: NodeId) -> Option<SyntaxKind> {
        self.parent_of(node).map(|parent| self.kind(parent))
    }

    /// The innermost container, falling back to the file.
    fn container(&self) -> NodeId {
        self.container.unwrap_or(self.file.root)
    }

    fn block_scope_container(&self) -> NodeId {
        self.block_scope_container.unwrap_or(self.file.root)
    }

    fn set_flow_node(&mut self, node: NodeId) {
        self.flow_nodes[node.index()] = Some(self.current_flow);
    }

    fn intern(&self, text: &str) -> InternedString {
        self.interner.intern(text)
    }

    /// Identifier or literal text.
    fn text_of(&self, node: NodeId) -> &'a str {
        self.arena.text(node).unwrap_or("")
    }

    /// Source text covered by `node`, without leading trivia.
    fn source_text(&self, node: NodeId) -> &'a str {
        let range = self.arena.range(node);
        let start = skip_trivia(&self.file.text, range.pos) as usize;
        self.file.text.get(start..range.end as usize).unwrap_or("")
    }

    fn find_ancestor(&self, node: NodeId, predicate: impl Fn(SyntaxKind) -> bool) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if predicate(self.kind(id)) {
                return Some(id);
            }
            current = self.parent_of(id);
        }
        None
    }

    fn containing_class(&self, node: NodeId) -> Option<NodeId> {
        self.parent_of(node)
            .and_then(|parent| self.find_ancestor(parent, SyntaxKind::is_class_like))
    }

    fn module_instance_state(&self, module: NodeId) -> ModuleInstanceState {
        let parents = &self.parents;
        module_instance_state(self.arena, module, &|id| parents.get(id.index()).copied().flatten())
    }

    /// Walk up from a binding element through its patterns to the
    /// declaration that owns the whole pattern.
    fn root_declaration(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while self.kind(current) == SyntaxKind::BindingElement {
            match self.parent_of(current).and_then(|pattern| self.parent_of(pattern)) {
                Some(owner) => current = owner,
                None => break,
            }
        }
        current
    }

    /// Node flags of a declaration combined with those of its variable
    /// declaration list and statement.
    fn combined_node_flags(&self, node: NodeId) -> NodeFlags {
        let mut current = self.root_declaration(node);
        let mut flags = self.arena.flags(current);
        if self.kind(current) == SyntaxKind::VariableDeclaration {
            if let Some(list) = self.parent_of(current) {
                current = list;
            }
        }
        if self.kind(current) == SyntaxKind::VariableDeclarationList {
            flags |= self.arena.flags(current);
            if let Some(statement) = self.parent_of(current) {
                if self.kind(statement) == SyntaxKind::VariableStatement {
                    flags |= self.arena.flags(statement);
                }
            }
        }
        flags
    }

    /// Modifier flags of a declaration combined with those of its enclosing
    /// variable statement.
    fn combined_modifier_flags(&self, node: NodeId) -> ModifierFlags {
        let mut current = self.root_declaration(node);
        let mut flags = self.arena.modifier_flags(current);
        if self.kind(current) == SyntaxKind::VariableDeclaration {
            if let Some(list) = self.parent_of(current) {
                current = list;
            }
        }
        if self.kind(current) == SyntaxKind::VariableDeclarationList {
            flags |= self.arena.modifier_flags(current);
            if let Some(statement) = self.parent_of(current) {
                if self.kind(statement) == SyntaxKind::VariableStatement {
                    flags |= self.arena.modifier_flags(statement);
                }
            }
        }
        flags
    }

    fn optional_flag(&self, node: NodeId) -> SymbolFlags {
        if self.arena.has_question_token(node) {
            SymbolFlags::OPTIONAL
        } else {
            SymbolFlags::NONE
        }
    }

    fn is_generator_function_expression(&self, node: NodeId) -> bool {
        matches!(
            self.arena.data(node),
            NodeData::FunctionLike { asterisk_token: true, .. }
        ) && self.kind(node) == SyntaxKind::FunctionExpression
    }

    /// The call that immediately invokes a function expression or arrow,
    /// looking through parentheses.
    fn immediately_invoked_call(&self, function: NodeId) -> Option<NodeId> {
        if !matches!(self.kind(function), SyntaxKind::FunctionExpression | SyntaxKind::ArrowFunction) {
            return None;
        }
        let mut previous = function;
        let mut parent = self.parent_of(function)?;
        while self.kind(parent) == SyntaxKind::ParenthesizedExpression {
            previous = parent;
            parent = self.parent_of(parent)?;
        }
        match self.arena.data(parent) {
            NodeData::Call { expression, .. }
                if self.kind(parent) == SyntaxKind::CallExpression && *expression == previous =>
            {
                Some(parent)
            }
            _ => None,
        }
    }

    fn is_part_of_type_query(&self, node: NodeId) -> bool {
        let mut current = node;
        while matches!(self.kind(current), SyntaxKind::QualifiedName | SyntaxKind::Identifier) {
            match self.parent_of(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        self.kind(current) == SyntaxKind::TypeQuery
    }

    /// Whether the file node or a module declaration counts as ambient.
    fn is_ambient(&self, node: NodeId) -> bool {
        self.arena.flags(node).contains(NodeFlags::AMBIENT)
            || (node == self.file.root && self.file.is_declaration_file)
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// The span a diagnostic about `node` should cover: usually its name,
    /// otherwise its first token.
    fn error_range(&self, node: NodeId) -> TextRange {
        let text = &self.file.text;
        let range = self.arena.range(node);
        match self.kind(node) {
            SyntaxKind::SourceFile => {
                let pos = skip_trivia(text, 0);
                if pos as usize == text.len() {
                    TextRange::new(0, 0)
                } else {
                    token_range_at(text, pos)
                }
            }
            SyntaxKind::VariableDeclaration
            | SyntaxKind::BindingElement
            | SyntaxKind::ClassDeclaration
            | SyntaxKind::ClassExpression
            | SyntaxKind::InterfaceDeclaration
            | SyntaxKind::ModuleDeclaration
            | SyntaxKind::EnumDeclaration
            | SyntaxKind::EnumMember
            | SyntaxKind::FunctionDeclaration
            | SyntaxKind::FunctionExpression
            | SyntaxKind::MethodDeclaration
            | SyntaxKind::GetAccessor
            | SyntaxKind::SetAccessor
            | SyntaxKind::TypeAliasDeclaration
            | SyntaxKind::PropertyDeclaration
            | SyntaxKind::PropertySignature
            | SyntaxKind::NamespaceImport => match self.name_of_declaration(node) {
                Some(name) => self.trimmed_range(name),
                None => token_range_at(text, range.pos),
            },
            SyntaxKind::ArrowFunction => self.arrow_function_error_range(node),
            SyntaxKind::CaseClause | SyntaxKind::DefaultClause => {
                let start = skip_trivia(text, range.pos);
                let end = match self.arena.statements(node).first() {
                    Some(&first) => self.arena.range(first).pos,
                    None => range.end,
                };
                TextRange::new(start, end)
            }
            SyntaxKind::ReturnStatement | SyntaxKind::YieldExpression => token_range_at(text, range.pos),
            SyntaxKind::Constructor => self.constructor_keyword_range(node),
            _ => self.trimmed_range(node),
        }
    }

    /// `node`'s range without leading trivia. Missing nodes keep their
    /// empty range.
    fn trimmed_range(&self, node: NodeId) -> TextRange {
        let range = self.arena.range(node);
        if range.pos == range.end {
            return range;
        }
        TextRange::new(skip_trivia(&self.file.text, range.pos), range.end)
    }

    /// From the start of the constructor through its `constructor` keyword.
    fn constructor_keyword_range(&self, node: NodeId) -> TextRange {
        let text = &self.file.text;
        let range = self.arena.range(node);
        let start = skip_trivia(text, range.pos);
        let mut token = token_range_at(text, start);
        while token.end < range.end {
            let token_text = text.get(token.pos as usize..token.end as usize).unwrap_or("");
            if token_text == "constructor" || token_text.starts_with('"') || token_text.starts_with('\'') {
                break;
            }
            token = token_range_at(text, token.end);
        }
        TextRange::new(start, token.end)
    }

    /// An arrow with a multi-line block body is reported on its first line.
    fn arrow_function_error_range(&self, node: NodeId) -> TextRange {
        let text = &self.file.text;
        let range = self.arena.range(node);
        let start = skip_trivia(text, range.pos);
        if let Some(body) = self.arena.body(node).filter(|&body| self.kind(body) == SyntaxKind::Block) {
            let body_range = self.arena.range(body);
            let body_text = text.get(body_range.pos as usize..body_range.end as usize).unwrap_or("");
            if let Some(offset) = body_text.find(['\n', '\r']) {
                return TextRange::new(start, body_range.pos + offset as u32);
            }
        }
        TextRange::new(start, range.end)
    }

    fn create_diagnostic_for_range(&self, range: TextRange, message: &DiagnosticMessage, args: &[&str]) -> Diagnostic {
        Diagnostic::with_location(
            self.file.file_name.clone(),
            TextSpan::from_bounds(range.pos, range.end),
            message,
            args,
        )
    }

    fn create_diagnostic_for_node(&self, node: NodeId, message: &DiagnosticMessage, args: &[&str]) -> Diagnostic {
        self.create_diagnostic_for_range(self.error_range(node), message, args)
    }

    fn error_on_node(&mut self, node: NodeId, message: &DiagnosticMessage, args: &[&str]) {
        let diagnostic = self.create_diagnostic_for_node(node, message, args);
        self.diagnostics.add(diagnostic);
    }

    fn error_on_first_token(&mut self, node: NodeId, message: &DiagnosticMessage, args: &[&str]) {
        let range = token_range_at(&self.file.text, self.arena.range(node).pos);
        let diagnostic = self.create_diagnostic_for_range(range, message, args);
        self.diagnostics.add(diagnostic);
    }

    fn add_error_or_suggestion(&mut self, is_error: bool, diagnostic: Diagnostic) {
        if is_error {
            self.diagnostics.add(diagnostic);
        } else {
            self.suggestions
                .push(diagnostic.with_category(DiagnosticCategory::Suggestion));
        }
    }

    fn error_or_suggestion_on_node(&mut self, is_error: bool, node: NodeId, message: &DiagnosticMessage) {
        let diagnostic = self.create_diagnostic_for_node(node, message, &[]);
        self.add_error_or_suggestion(is_error, diagnostic);
    }

    fn error_or_suggestion_on_range(&mut self, is_error: bool, first: NodeId, last: NodeId, message: &DiagnosticMessage) {
        let start = token_range_at(&self.file.text, self.arena.range(first).pos).pos;
        let range = TextRange::new(start, self.arena.range(last).end);
        let diagnostic = self.create_diagnostic_for_range(range, message, &[]);
        self.add_error_or_suggestion(is_error, diagnostic);
    }
}
