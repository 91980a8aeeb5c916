//! Declaring symbols: table selection, merging and conflict reporting.

use super::Binder;
use crate::binding::{Pattern, PatternAmbientModule};
use crate::container::{select_table, TableRef, TableSelector};
use crate::symbol::{internal_names, Symbol, SymbolTable};
use tsbind_ast::node::NodeData;
use tsbind_ast::types::*;
use tsbind_ast::utilities::{
    is_ambient_module, is_entity_name_expression, is_enum_const, is_global_scope_augmentation,
    is_signed_numeric_literal, is_string_or_numeric_literal_like, skip_parentheses, ModuleInstanceState,
};
use tsbind_ast::SyntaxKind;
use tsbind_core::intern::InternedString;
use tsbind_diagnostics::messages;

/// The symbols a module member declaration produced. An exported value
/// has both: a local `EXPORT_VALUE` symbol and the export it stands for.
#[derive(Debug, Clone, Copy)]
pub(super) struct ModuleMember {
    pub local: Option<SymbolId>,
    pub export: Option<SymbolId>,
}

impl ModuleMember {
    fn local_only(local: SymbolId) -> Self {
        Self {
            local: Some(local),
            export: None,
        }
    }

    fn export_only(export: SymbolId) -> Self {
        Self {
            local: None,
            export: Some(export),
        }
    }

    /// The symbol recorded for the declaration itself.
    fn symbol(self) -> Option<SymbolId> {
        self.local.or(self.export)
    }
}

impl Binder<'_> {
    // ========================================================================
    // Tables
    // ========================================================================

    fn table(&self, table: TableRef) -> Option<&SymbolTable> {
        match table {
            TableRef::Locals(node) => self.locals.get(&node),
            TableRef::Exports(symbol) => self.symbols[symbol.index()].exports.as_ref(),
            TableRef::Members(symbol) => self.symbols[symbol.index()].members.as_ref(),
            TableRef::GlobalExports(symbol) => self.symbols[symbol.index()].global_exports.as_ref(),
        }
    }

    fn table_mut(&mut self, table: TableRef) -> &mut SymbolTable {
        match table {
            TableRef::Locals(node) => self.locals.entry(node).or_default(),
            TableRef::Exports(symbol) => self.symbols[symbol.index()].exports.get_or_insert_with(SymbolTable::new),
            TableRef::Members(symbol) => self.symbols[symbol.index()].members.get_or_insert_with(SymbolTable::new),
            TableRef::GlobalExports(symbol) => self.symbols[symbol.index()]
                .global_exports
                .get_or_insert_with(SymbolTable::new),
        }
    }

    fn table_get(&self, table: TableRef, name: InternedString) -> Option<SymbolId> {
        self.table(table).and_then(|t| t.get(name))
    }

    fn table_insert(&mut self, table: TableRef, name: InternedString, symbol: SymbolId) {
        self.table_mut(table).set(name, symbol);
    }

    pub(super) fn symbol_of(&self, node: NodeId) -> Option<SymbolId> {
        self.node_symbols[node.index()]
    }

    fn container_symbol(&self) -> Option<SymbolId> {
        self.symbol_of(self.container())
    }

    pub(super) fn new_symbol(&mut self, flags: SymbolFlags, name: &str) -> SymbolId {
        let id = SymbolId::from_index(self.symbols.len());
        let name = self.intern(name);
        self.symbols.push(Symbol::new(id, name, flags));
        id
    }

    // ========================================================================
    // Names
    // ========================================================================

    /// The node naming a declaration. Unnamed function and class
    /// expressions take the name they are assigned to.
    pub(super) fn name_of_declaration(&self, node: NodeId) -> Option<NodeId> {
        match self.arena.data(node) {
            NodeData::Binary { left, .. } => self.element_or_property_access_name(*left).or(Some(*left)),
            NodeData::ExportAssignment { expression, .. } => {
                (self.kind(*expression) == SyntaxKind::Identifier).then_some(*expression)
            }
            _ => self.arena.name(node).or_else(|| {
                if matches!(
                    self.kind(node),
                    SyntaxKind::FunctionExpression | SyntaxKind::ArrowFunction | SyntaxKind::ClassExpression
                ) {
                    self.assigned_name(node)
                } else {
                    None
                }
            }),
        }
    }

    fn assigned_name(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent_of(node)?;
        match self.arena.data(parent) {
            NodeData::PropertyAssignment { name, .. } | NodeData::BindingElement { name, .. } => Some(*name),
            NodeData::Binary { left, right, .. } if *right == node => match self.kind(*left) {
                SyntaxKind::Identifier => Some(*left),
                _ => self.element_or_property_access_name(*left),
            },
            NodeData::VariableDeclaration { name, .. } if self.kind(*name) == SyntaxKind::Identifier => Some(*name),
            _ => None,
        }
    }

    /// `x` of `f.x`, or the literal key of `f["x"]`.
    fn element_or_property_access_name(&self, access: NodeId) -> Option<NodeId> {
        match self.arena.data(access) {
            NodeData::PropertyAccess { name, .. } => (self.kind(*name) == SyntaxKind::Identifier).then_some(*name),
            NodeData::ElementAccess {
                argument_expression, ..
            } => {
                let argument = skip_parentheses(self.arena, *argument_expression);
                is_string_or_numeric_literal_like(self.kind(argument)).then_some(argument)
            }
            _ => None,
        }
    }

    /// A computed name or element access key that is not a literal.
    pub(super) fn has_dynamic_name(&self, node: NodeId) -> bool {
        let Some(name) = self.name_of_declaration(node) else {
            return false;
        };
        let expression = match self.arena.data(name) {
            NodeData::ComputedPropertyName { expression } => *expression,
            NodeData::ElementAccess {
                argument_expression, ..
            } => skip_parentheses(self.arena, *argument_expression),
            _ => return false,
        };
        !is_string_or_numeric_literal_like(self.kind(expression)) && !is_signed_numeric_literal(self.arena, expression)
    }

    /// The key a declaration is stored under.
    pub(super) fn declaration_name(&self, node: NodeId) -> String {
        if let NodeData::ExportAssignment { is_export_equals, .. } = self.arena.data(node) {
            return if *is_export_equals {
                internal_names::EXPORT_EQUALS
            } else {
                internal_names::DEFAULT
            }
            .to_string();
        }
        if let Some(name) = self.name_of_declaration(node) {
            if is_ambient_module(self.arena, node) {
                if is_global_scope_augmentation(self.arena, node) {
                    return internal_names::GLOBAL.to_string();
                }
                return format!("\"{}\"", self.text_of(name));
            }
            return match self.kind(name) {
                SyntaxKind::PrivateIdentifier => match self.containing_class(node).and_then(|c| self.symbol_of(c)) {
                    Some(class_symbol) => format!("__#{}@{}", class_symbol, self.text_of(name)),
                    None => internal_names::MISSING.to_string(),
                },
                SyntaxKind::Identifier
                | SyntaxKind::StringLiteral
                | SyntaxKind::NoSubstitutionTemplateLiteral
                | SyntaxKind::NumericLiteral => self.text_of(name).to_string(),
                SyntaxKind::ComputedPropertyName => self.computed_literal_name(name),
                _ => internal_names::MISSING.to_string(),
            };
        }
        match self.kind(node) {
            SyntaxKind::Constructor => internal_names::CONSTRUCTOR,
            SyntaxKind::FunctionType | SyntaxKind::CallSignature => internal_names::CALL,
            SyntaxKind::ConstructorType | SyntaxKind::ConstructSignature => internal_names::NEW,
            SyntaxKind::IndexSignature => internal_names::INDEX,
            SyntaxKind::ExportDeclaration => internal_names::EXPORT_STAR,
            SyntaxKind::SourceFile => internal_names::EXPORT_EQUALS,
            _ => internal_names::MISSING,
        }
        .to_string()
    }

    /// `["a"]` is stored as `a`, `[-1]` as `-1`.
    fn computed_literal_name(&self, name: NodeId) -> String {
        let Some(expression) = self.arena.expression(name) else {
            return internal_names::MISSING.to_string();
        };
        if is_string_or_numeric_literal_like(self.kind(expression)) {
            return self.text_of(expression).to_string();
        }
        if let NodeData::Unary { operator, operand } = self.arena.data(expression) {
            if is_signed_numeric_literal(self.arena, expression) {
                return format!("{}{}", operator.operator_text().unwrap_or(""), self.text_of(*operand));
            }
        }
        internal_names::MISSING.to_string()
    }

    /// Name of a declaration as written, for messages.
    pub(super) fn display_name(&self, node: NodeId) -> String {
        if let Some(name) = self.arena.name(node) {
            return self.source_text(name).to_string();
        }
        let name = self.declaration_name(node);
        if name == internal_names::MISSING {
            "(Missing)".to_string()
        } else {
            name
        }
    }

    fn is_default_export(&self, node: NodeId) -> bool {
        self.arena.modifier_flags(node).contains(ModifierFlags::DEFAULT)
            || (self.kind(node) == SyntaxKind::ExportSpecifier
                && self.arena.name(node).and_then(|name| self.arena.text(name)) == Some(internal_names::DEFAULT))
    }

    // ========================================================================
    // Declaring
    // ========================================================================

    /// Declare `node` in `table`, merging with a compatible symbol of the
    /// same name or reporting the conflict on every declaration involved.
    pub(super) fn declare_symbol(
        &mut self,
        table: TableRef,
        parent: Option<SymbolId>,
        node: NodeId,
        includes: SymbolFlags,
        excludes: SymbolFlags,
    ) -> SymbolId {
        self.declare_symbol_ex(table, parent, node, includes, excludes, false)
    }

    /// Like [`declare_symbol`](Self::declare_symbol). A replaceable
    /// declaration never conflicts: it yields to an existing symbol, and a
    /// later conflicting declaration discards it.
    pub(super) fn declare_symbol_ex(
        &mut self,
        table: TableRef,
        parent: Option<SymbolId>,
        node: NodeId,
        includes: SymbolFlags,
        excludes: SymbolFlags,
        replaceable_by_method: bool,
    ) -> SymbolId {
        let is_default_export = self.is_default_export(node);
        let name = if is_default_export && parent.is_some() {
            internal_names::DEFAULT.to_string()
        } else {
            self.declaration_name(node)
        };

        let symbol = if name == internal_names::MISSING {
            self.new_symbol(SymbolFlags::NONE, internal_names::MISSING)
        } else {
            let key = self.intern(&name);
            if includes.intersects(SymbolFlags::CLASSIFIABLE) {
                self.classifiable_names.insert(key);
            }
            match self.table_get(table, key) {
                None => {
                    let flags = if replaceable_by_method {
                        SymbolFlags::REPLACEABLE_BY_METHOD
                    } else {
                        SymbolFlags::NONE
                    };
                    let symbol = self.new_symbol(flags, &name);
                    self.table_insert(table, key, symbol);
                    symbol
                }
                Some(existing) => {
                    let existing_flags = self.symbols[existing.index()].flags;
                    if replaceable_by_method && !existing_flags.contains(SymbolFlags::REPLACEABLE_BY_METHOD) {
                        return existing;
                    }
                    let assignment_merge = (includes.intersects(SymbolFlags::VARIABLE)
                        && existing_flags.contains(SymbolFlags::ASSIGNMENT))
                        || (includes.contains(SymbolFlags::ASSIGNMENT)
                            && existing_flags.intersects(SymbolFlags::VARIABLE));
                    if !existing_flags.intersects(excludes) {
                        existing
                    } else if existing_flags.contains(SymbolFlags::REPLACEABLE_BY_METHOD) {
                        let symbol = self.new_symbol(SymbolFlags::NONE, &name);
                        self.table_insert(table, key, symbol);
                        symbol
                    } else if assignment_merge {
                        existing
                    } else {
                        self.report_conflict(existing, node, includes, is_default_export);
                        if existing_flags.intersects(SymbolFlags::ACCESSOR)
                            && existing_flags & SymbolFlags::ACCESSOR != includes & SymbolFlags::ACCESSOR
                        {
                            self.symbols[existing.index()].flags |= SymbolFlags::ACCESSOR;
                        }
                        self.new_symbol(SymbolFlags::NONE, &name)
                    }
                }
            }
        };

        self.add_declaration_to_symbol(symbol, node, includes);
        let slot = &mut self.symbols[symbol.index()].parent;
        match *slot {
            None => *slot = parent,
            Some(existing) => assert!(
                parent == Some(existing),
                "symbol parent changed from {} to {:?}",
                existing,
                parent
            ),
        }
        symbol
    }

    fn report_conflict(&mut self, existing: SymbolId, node: NodeId, includes: SymbolFlags, is_default_export: bool) {
        let existing_flags = self.symbols[existing.index()].flags;
        let declarations = self.symbols[existing.index()].declarations.clone();

        let mut message = if existing_flags.intersects(SymbolFlags::BLOCK_SCOPED_VARIABLE) {
            &messages::CANNOT_REDECLARE_BLOCK_SCOPED_VARIABLE_0
        } else {
            &messages::DUPLICATE_IDENTIFIER_0
        };
        let mut needs_name = true;
        if existing_flags.intersects(SymbolFlags::ENUM) || includes.intersects(SymbolFlags::ENUM) {
            message = &messages::ENUM_DECLARATIONS_CAN_ONLY_MERGE_WITH_NAMESPACE_OR_OTHER_ENUM_DECLARATIONS;
            needs_name = false;
        }
        let mut multiple_default_exports = false;
        if !declarations.is_empty() {
            let is_export_default_assignment = matches!(
                self.arena.data(node),
                NodeData::ExportAssignment {
                    is_export_equals: false,
                    ..
                }
            );
            if is_default_export || is_export_default_assignment {
                message = &messages::A_MODULE_CANNOT_HAVE_MULTIPLE_DEFAULT_EXPORTS;
                needs_name = false;
                multiple_default_exports = true;
            }
        }

        let error_node = self.name_of_declaration(node).unwrap_or(node);
        let display = self.display_name(node);
        let named = [display.as_str()];
        let args: &[&str] = if needs_name { &named } else { &[] };
        let mut diagnostic = self.create_diagnostic_for_node(error_node, message, args);

        if let NodeData::TypeAlias {
            name, type_node: None, ..
        } = self.arena.data(node)
        {
            if self.arena.modifier_flags(node).contains(ModifierFlags::EXPORT)
                && existing_flags.intersects(SymbolFlags::ALIAS | SymbolFlags::TYPE | SymbolFlags::NAMESPACE)
            {
                let suggestion = format!("export type {{ {} }}", self.text_of(*name));
                diagnostic.add_related(self.create_diagnostic_for_node(node, &messages::DID_YOU_MEAN_0, &[&suggestion]));
            }
        }

        for (index, &declaration) in declarations.iter().enumerate() {
            let declaration_error_node = self.name_of_declaration(declaration).unwrap_or(declaration);
            let declaration_display = self.display_name(declaration);
            let named = [declaration_display.as_str()];
            let args: &[&str] = if needs_name { &named } else { &[] };
            let mut previous = self.create_diagnostic_for_node(declaration_error_node, message, args);
            if multiple_default_exports {
                let related = if index == 0 {
                    &messages::ANOTHER_EXPORT_DEFAULT_IS_HERE
                } else {
                    &messages::AND_HERE
                };
                previous.add_related(self.create_diagnostic_for_node(error_node, related, &[]));
            }
            self.diagnostics.add(previous);
            if multiple_default_exports {
                diagnostic.add_related(self.create_diagnostic_for_node(
                    declaration_error_node,
                    &messages::THE_FIRST_EXPORT_DEFAULT_IS_HERE,
                    &[],
                ));
            }
        }
        self.diagnostics.add(diagnostic);
    }

    pub(super) fn add_declaration_to_symbol(&mut self, symbol: SymbolId, node: NodeId, flags: SymbolFlags) {
        self.node_symbols[node.index()] = Some(symbol);
        let entry = &mut self.symbols[symbol.index()];
        entry.flags |= flags;
        if !entry.declarations.contains(&node) {
            entry.declarations.push(node);
        }
        if entry.is_const_enum_only_module()
            && entry.has_flags(SymbolFlags::FUNCTION | SymbolFlags::CLASS | SymbolFlags::REGULAR_ENUM)
        {
            entry.set_const_enum_only_module(false);
        }
        if flags.intersects(SymbolFlags::VALUE) {
            self.set_value_declaration(symbol, node);
        }
    }

    /// Non-ambient declarations win over ambient ones. Otherwise real
    /// declarations win over assignments, and anything wins over a
    /// namespace of a different kind.
    pub(super) fn set_value_declaration(&mut self, symbol: SymbolId, node: NodeId) {
        let replace = match self.symbols[symbol.index()].value_declaration {
            None => true,
            Some(current) => {
                let is_ambient = |id: NodeId| self.arena.flags(id).contains(NodeFlags::AMBIENT);
                match (is_ambient(current), is_ambient(node)) {
                    (false, true) => false,
                    (true, false) => true,
                    _ => {
                        (self.is_assignment_declaration(current) && !self.is_assignment_declaration(node))
                            || (self.kind(current) != self.kind(node)
                                && matches!(self.kind(current), SyntaxKind::ModuleDeclaration | SyntaxKind::Identifier))
                    }
                }
            }
        };
        if replace {
            self.symbols[symbol.index()].value_declaration = Some(node);
        }
    }

    fn is_assignment_declaration(&self, node: NodeId) -> bool {
        matches!(
            self.kind(node),
            SyntaxKind::BinaryExpression
                | SyntaxKind::PropertyAccessExpression
                | SyntaxKind::ElementAccessExpression
                | SyntaxKind::Identifier
                | SyntaxKind::CallExpression
        )
    }

    /// Declare a member of a namespace or module file. Exported values get
    /// a local symbol marked `EXPORT_VALUE` paired with the real export.
    pub(super) fn declare_module_member(
        &mut self,
        node: NodeId,
        flags: SymbolFlags,
        excludes: SymbolFlags,
    ) -> ModuleMember {
        let container = self.container();
        let container_symbol = self.container_symbol();
        let has_export_modifier = self.combined_modifier_flags(node).contains(ModifierFlags::EXPORT);

        if flags.intersects(SymbolFlags::ALIAS) {
            let exported = self.kind(node) == SyntaxKind::ExportSpecifier
                || (self.kind(node) == SyntaxKind::ImportEqualsDeclaration && has_export_modifier);
            if let (true, Some(owner)) = (exported, container_symbol) {
                let export = self.declare_symbol(TableRef::Exports(owner), Some(owner), node, flags, excludes);
                return ModuleMember::export_only(export);
            }
            let local = self.declare_symbol(TableRef::Locals(container), None, node, flags, excludes);
            return ModuleMember::local_only(local);
        }

        let in_export_context = has_export_modifier || self.node_flags[container.index()].contains(NodeFlags::EXPORT_CONTEXT);
        if !is_ambient_module(self.arena, node) && in_export_context {
            if let Some(owner) = container_symbol {
                let unnamed_default = self.arena.modifier_flags(node).contains(ModifierFlags::DEFAULT)
                    && self.declaration_name(node) == internal_names::MISSING;
                if unnamed_default {
                    let export = self.declare_symbol(TableRef::Exports(owner), Some(owner), node, flags, excludes);
                    return ModuleMember::export_only(export);
                }
                let export_kind = if flags.intersects(SymbolFlags::VALUE) {
                    SymbolFlags::EXPORT_VALUE
                } else {
                    SymbolFlags::NONE
                };
                let local = self.declare_symbol(TableRef::Locals(container), None, node, export_kind, excludes);
                let export = self.declare_symbol(TableRef::Exports(owner), Some(owner), node, flags, excludes);
                self.symbols[local.index()].export_symbol = Some(export);
                self.local_symbols.insert(node, local);
                return ModuleMember {
                    local: Some(local),
                    export: Some(export),
                };
            }
        }
        let local = self.declare_symbol(TableRef::Locals(container), None, node, flags, excludes);
        ModuleMember::local_only(local)
    }

    /// Declare `node` in whichever table its container dictates.
    pub(super) fn declare_symbol_and_add_to_symbol_table(
        &mut self,
        node: NodeId,
        flags: SymbolFlags,
        excludes: SymbolFlags,
    ) -> Option<SymbolId> {
        let container = self.container();
        let selector = select_table(self.kind(container), self.kind(node), self.arena.modifier_flags(node));
        let container_symbol = self.container_symbol();
        match (selector, container_symbol) {
            (Some(TableSelector::ModuleMember), _) => self.declare_module_member(node, flags, excludes).symbol(),
            (Some(TableSelector::SourceFileMember), _) => {
                if self.file.is_external_module() {
                    self.declare_module_member(node, flags, excludes).symbol()
                } else {
                    Some(self.declare_symbol(TableRef::Locals(container), None, node, flags, excludes))
                }
            }
            (Some(TableSelector::ContainerExports), Some(owner)) => {
                Some(self.declare_symbol(TableRef::Exports(owner), Some(owner), node, flags, excludes))
            }
            (Some(TableSelector::ContainerMembers), Some(owner)) => {
                Some(self.declare_symbol(TableRef::Members(owner), Some(owner), node, flags, excludes))
            }
            (Some(TableSelector::ContainerLocals), _) => {
                Some(self.declare_symbol(TableRef::Locals(container), None, node, flags, excludes))
            }
            _ => {
                tracing::warn!(
                    node = %node,
                    kind = ?self.kind(node),
                    container = ?self.kind(container),
                    "no symbol table for declaration"
                );
                None
            }
        }
    }

    /// A symbol that lives in no table.
    pub(super) fn bind_anonymous_declaration(&mut self, node: NodeId, flags: SymbolFlags, name: &str) -> SymbolId {
        let symbol = self.new_symbol(flags, name);
        if flags.intersects(SymbolFlags::ENUM_MEMBER | SymbolFlags::CLASS_MEMBER) {
            self.symbols[symbol.index()].parent = self.container_symbol();
        }
        self.add_declaration_to_symbol(symbol, node, flags);
        symbol
    }

    pub(super) fn bind_block_scoped_declaration(&mut self, node: NodeId, flags: SymbolFlags, excludes: SymbolFlags) {
        let scope = self.block_scope_container();
        match self.kind(scope) {
            SyntaxKind::ModuleDeclaration => {
                self.declare_module_member(node, flags, excludes);
            }
            SyntaxKind::SourceFile if self.file.is_external_module() => {
                self.declare_module_member(node, flags, excludes);
            }
            _ => {
                self.declare_symbol(TableRef::Locals(scope), None, node, flags, excludes);
            }
        }
    }

    // ========================================================================
    // Declaration kinds
    // ========================================================================

    pub(super) fn bind_type_parameter(&mut self, node: NodeId) {
        let infer = self.parent_of(node).filter(|&parent| self.kind(parent) == SyntaxKind::InferType);
        match infer {
            Some(infer) => match self.infer_type_container(infer) {
                Some(conditional) => {
                    self.declare_symbol(
                        TableRef::Locals(conditional),
                        None,
                        node,
                        SymbolFlags::TYPE_PARAMETER,
                        SymbolFlags::TYPE_PARAMETER_EXCLUDES,
                    );
                }
                None => {
                    let name = self.declaration_name(node);
                    self.bind_anonymous_declaration(node, SymbolFlags::TYPE_PARAMETER, &name);
                }
            },
            None => {
                self.declare_symbol_and_add_to_symbol_table(
                    node,
                    SymbolFlags::TYPE_PARAMETER,
                    SymbolFlags::TYPE_PARAMETER_EXCLUDES,
                );
            }
        }
    }

    /// The conditional type whose `extends` clause holds an `infer`.
    fn infer_type_container(&self, node: NodeId) -> Option<NodeId> {
        let mut current = node;
        loop {
            let parent = self.parent_of(current)?;
            if let NodeData::ConditionalType { extends_type, .. } = self.arena.data(parent) {
                if *extends_type == current {
                    return Some(parent);
                }
            }
            current = parent;
        }
    }

    pub(super) fn bind_parameter(&mut self, node: NodeId) {
        let name = self.arena.name(node);
        if self.in_strict_mode && !self.arena.flags(node).contains(NodeFlags::AMBIENT) {
            self.check_strict_mode_eval_or_arguments(node, name);
        }
        let is_pattern = name.is_some_and(|name| self.kind(name).is_binding_pattern());
        if is_pattern {
            let index = self
                .parent_of(node)
                .and_then(|parent| self.arena.parameters(parent).iter().position(|&p| p == node))
                .unwrap_or(0);
            self.bind_anonymous_declaration(node, SymbolFlags::FUNCTION_SCOPED_VARIABLE, &format!("__{index}"));
        } else {
            self.declare_symbol_and_add_to_symbol_table(
                node,
                SymbolFlags::FUNCTION_SCOPED_VARIABLE,
                SymbolFlags::PARAMETER_EXCLUDES,
            );
        }

        // A constructor parameter with an accessibility or readonly modifier
        // is also a property of the class.
        let constructor = self.parent_of(node).filter(|&p| self.kind(p) == SyntaxKind::Constructor);
        let is_property = self
            .arena
            .modifier_flags(node)
            .intersects(ModifierFlags::PARAMETER_PROPERTY_MODIFIER);
        if let (Some(constructor), true) = (constructor, is_property) {
            let class_symbol = self.parent_of(constructor).and_then(|class| self.symbol_of(class));
            if let Some(class_symbol) = class_symbol {
                let flags = SymbolFlags::PROPERTY | self.optional_flag(node);
                self.declare_symbol(
                    TableRef::Members(class_symbol),
                    Some(class_symbol),
                    node,
                    flags,
                    SymbolFlags::PROPERTY_EXCLUDES,
                );
            }
        }
    }

    pub(super) fn bind_variable_declaration_or_binding_element(&mut self, node: NodeId) {
        let name = self.arena.name(node);
        if self.in_strict_mode {
            self.check_strict_mode_eval_or_arguments(node, name);
        }
        let Some(name) = name else {
            return;
        };
        if self.kind(name).is_binding_pattern() {
            return;
        }
        if self.is_block_or_catch_scoped(node) {
            self.bind_block_scoped_declaration(
                node,
                SymbolFlags::BLOCK_SCOPED_VARIABLE,
                SymbolFlags::BLOCK_SCOPED_VARIABLE_EXCLUDES,
            );
        } else if self.kind(self.root_declaration(node)) == SyntaxKind::Parameter {
            self.declare_symbol_and_add_to_symbol_table(
                node,
                SymbolFlags::FUNCTION_SCOPED_VARIABLE,
                SymbolFlags::PARAMETER_EXCLUDES,
            );
        } else {
            self.declare_symbol_and_add_to_symbol_table(
                node,
                SymbolFlags::FUNCTION_SCOPED_VARIABLE,
                SymbolFlags::FUNCTION_SCOPED_VARIABLE_EXCLUDES,
            );
        }
    }

    fn is_block_or_catch_scoped(&self, node: NodeId) -> bool {
        if self.combined_node_flags(node).intersects(NodeFlags::BLOCK_SCOPED) {
            return true;
        }
        let root = self.root_declaration(node);
        self.kind(root) == SyntaxKind::VariableDeclaration && self.parent_kind(root) == Some(SyntaxKind::CatchClause)
    }

    pub(super) fn bind_property(&mut self, node: NodeId) {
        let is_auto_accessor = self.kind(node) == SyntaxKind::PropertyDeclaration
            && self.arena.modifier_flags(node).contains(ModifierFlags::ACCESSOR);
        let (includes, excludes) = if is_auto_accessor {
            (SymbolFlags::ACCESSOR, SymbolFlags::ACCESSOR_EXCLUDES)
        } else {
            (SymbolFlags::PROPERTY, SymbolFlags::PROPERTY_EXCLUDES)
        };
        let optional = self.optional_flag(node);
        self.bind_property_or_method_or_accessor(node, includes | optional, excludes);
    }

    pub(super) fn bind_property_or_method_or_accessor(&mut self, node: NodeId, flags: SymbolFlags, excludes: SymbolFlags) {
        let is_literal_or_class_expression_member = matches!(
            self.kind(node),
            SyntaxKind::MethodDeclaration | SyntaxKind::GetAccessor | SyntaxKind::SetAccessor
        ) && matches!(
            self.parent_kind(node),
            Some(SyntaxKind::ObjectLiteralExpression | SyntaxKind::ClassExpression)
        );
        if is_literal_or_class_expression_member {
            self.set_flow_node(node);
        }
        if self.has_dynamic_name(node) {
            self.bind_anonymous_declaration(node, flags, internal_names::COMPUTED);
        } else {
            self.declare_symbol_and_add_to_symbol_table(node, flags, excludes);
        }
    }

    pub(super) fn bind_function_declaration(&mut self, node: NodeId) {
        self.check_strict_mode_function_name(node);
        if self.in_strict_mode {
            self.check_strict_mode_function_declaration(node);
            self.bind_block_scoped_declaration(node, SymbolFlags::FUNCTION, SymbolFlags::FUNCTION_EXCLUDES);
        } else {
            self.declare_symbol_and_add_to_symbol_table(node, SymbolFlags::FUNCTION, SymbolFlags::FUNCTION_EXCLUDES);
        }
    }

    /// `(x) => T` gets the same symbols as `{ (x): T }`.
    pub(super) fn bind_function_or_constructor_type(&mut self, node: NodeId) {
        let name = self.declaration_name(node);
        let signature = self.new_symbol(SymbolFlags::SIGNATURE, &name);
        self.add_declaration_to_symbol(signature, node, SymbolFlags::SIGNATURE);
        let type_literal = self.new_symbol(SymbolFlags::TYPE_LITERAL, internal_names::TYPE);
        self.add_declaration_to_symbol(type_literal, node, SymbolFlags::TYPE_LITERAL);
        let key = self.symbols[signature.index()].name;
        self.table_insert(TableRef::Members(type_literal), key, signature);
    }

    pub(super) fn bind_function_expression(&mut self, node: NodeId) {
        self.set_flow_node(node);
        let mut binding_name = internal_names::FUNCTION;
        if self.kind(node) == SyntaxKind::FunctionExpression {
            if let Some(name) = self.arena.name(node) {
                self.check_strict_mode_function_name(node);
                binding_name = self.text_of(name);
            }
        }
        self.bind_anonymous_declaration(node, SymbolFlags::FUNCTION, binding_name);
    }

    pub(super) fn bind_class_like_declaration(&mut self, node: NodeId) {
        let symbol = if self.kind(node) == SyntaxKind::ClassDeclaration {
            self.bind_block_scoped_declaration(node, SymbolFlags::CLASS, SymbolFlags::CLASS_EXCLUDES);
            self.symbol_of(node)
        } else {
            let name = match self.arena.name(node) {
                Some(name) => {
                    let text = self.text_of(name);
                    let key = self.intern(text);
                    self.classifiable_names.insert(key);
                    text
                }
                None => internal_names::CLASS,
            };
            Some(self.bind_anonymous_declaration(node, SymbolFlags::CLASS, name))
        };
        let Some(symbol) = symbol else {
            return;
        };

        // Every class has a static `prototype`; declaring one is an error.
        let prototype = self.new_symbol(SymbolFlags::PROPERTY | SymbolFlags::PROTOTYPE, internal_names::PROTOTYPE);
        let key = self.symbols[prototype.index()].name;
        if let Some(existing) = self.table_get(TableRef::Exports(symbol), key) {
            if let Some(&first) = self.symbols[existing.index()].declarations.first() {
                self.error_on_node(first, &messages::DUPLICATE_IDENTIFIER_0, &[internal_names::PROTOTYPE]);
            }
        }
        self.table_insert(TableRef::Exports(symbol), key, prototype);
        self.symbols[prototype.index()].parent = Some(symbol);
    }

    pub(super) fn bind_enum_declaration(&mut self, node: NodeId) {
        if is_enum_const(self.arena, node) {
            self.bind_block_scoped_declaration(node, SymbolFlags::CONST_ENUM, SymbolFlags::CONST_ENUM_EXCLUDES);
        } else {
            self.bind_block_scoped_declaration(node, SymbolFlags::REGULAR_ENUM, SymbolFlags::REGULAR_ENUM_EXCLUDES);
        }
    }

    // ========================================================================
    // Modules
    // ========================================================================

    pub(super) fn bind_module_declaration(&mut self, node: NodeId) {
        self.set_export_context_flag(node);
        if is_ambient_module(self.arena, node) {
            if self.arena.modifier_flags(node).contains(ModifierFlags::EXPORT) {
                self.error_on_first_token(node, &messages::EXPORT_MODIFIER_CANNOT_BE_APPLIED_TO_AMBIENT_MODULES, &[]);
            }
            if self.is_module_augmentation_external(node) {
                self.declare_module_symbol(node);
                return;
            }
            let mut pattern = None;
            if let Some(name) = self.arena.name(node) {
                if self.kind(name) == SyntaxKind::StringLiteral {
                    let text = self.text_of(name);
                    match Pattern::parse(text) {
                        Some(parsed) => pattern = Some(parsed),
                        None => self.error_on_first_token(
                            name,
                            &messages::PATTERN_0_CAN_HAVE_AT_MOST_ONE_ASTERISK_CHARACTER,
                            &[text],
                        ),
                    }
                }
            }
            let symbol = self.declare_symbol_and_add_to_symbol_table(
                node,
                SymbolFlags::VALUE_MODULE,
                SymbolFlags::VALUE_MODULE_EXCLUDES,
            );
            if let (Some(pattern), Some(symbol)) = (pattern.filter(Pattern::has_wildcard), symbol) {
                self.pattern_ambient_modules.push(PatternAmbientModule { pattern, symbol });
            }
            return;
        }

        let previous = self.symbol_of(node);
        let state = self.declare_module_symbol(node);
        if state == ModuleInstanceState::NonInstantiated {
            return;
        }
        let Some(symbol) = self.symbol_of(node).or(previous) else {
            return;
        };
        let entry = &mut self.symbols[symbol.index()];
        let only_const_enums = !entry.has_flags(SymbolFlags::FUNCTION | SymbolFlags::CLASS | SymbolFlags::REGULAR_ENUM)
            && state == ModuleInstanceState::ConstEnumOnly
            && entry.const_enum_only_module != Some(false);
        entry.set_const_enum_only_module(only_const_enums);
    }

    fn declare_module_symbol(&mut self, node: NodeId) -> ModuleInstanceState {
        let state = self.module_instance_state(node);
        let (flags, excludes) = if state != ModuleInstanceState::NonInstantiated {
            (SymbolFlags::VALUE_MODULE, SymbolFlags::VALUE_MODULE_EXCLUDES)
        } else {
            (SymbolFlags::NAMESPACE_MODULE, SymbolFlags::NAMESPACE_MODULE_EXCLUDES)
        };
        self.declare_symbol_and_add_to_symbol_table(node, flags, excludes);
        state
    }

    /// `declare module "x"` at the top of a module file, or nested directly
    /// in a top-level ambient module of a script.
    fn is_module_augmentation_external(&self, node: NodeId) -> bool {
        let Some(parent) = self.parent_of(node) else {
            return false;
        };
        match self.kind(parent) {
            SyntaxKind::SourceFile => self.file.is_external_module(),
            SyntaxKind::ModuleBlock => self.parent_of(parent).is_some_and(|grandparent| {
                is_ambient_module(self.arena, grandparent)
                    && self.parent_kind(grandparent) == Some(SyntaxKind::SourceFile)
                    && !self.file.is_external_module()
            }),
            _ => false,
        }
    }

    /// An ambient file or module without explicit export statements
    /// exports every declaration implicitly.
    pub(super) fn set_export_context_flag(&mut self, node: NodeId) {
        let is_context = self.is_ambient(node) && !self.has_export_declarations(node);
        self.node_flags[node.index()].set(NodeFlags::EXPORT_CONTEXT, is_context);
    }

    fn has_export_declarations(&self, node: NodeId) -> bool {
        let statements = match self.arena.data(node) {
            NodeData::Module { body: Some(body), .. } if self.kind(*body) == SyntaxKind::ModuleBlock => {
                self.arena.statements(*body)
            }
            _ => self.arena.statements(node),
        };
        statements.iter().any(|&statement| {
            matches!(
                self.kind(statement),
                SyntaxKind::ExportDeclaration | SyntaxKind::ExportAssignment
            )
        })
    }

    pub(super) fn bind_source_file_if_external_module(&mut self) {
        let root = self.file.root;
        self.set_export_context_flag(root);
        if self.file.is_external_module() {
            let name = format!("\"{}\"", remove_file_extension(&self.file.file_name));
            self.bind_anonymous_declaration(root, SymbolFlags::VALUE_MODULE, &name);
        }
    }

    pub(super) fn bind_namespace_export_declaration(&mut self, node: NodeId) {
        if !self.arena.modifier_flags(node).is_empty() {
            self.error_on_node(node, &messages::MODIFIERS_CANNOT_APPEAR_HERE, &[]);
        }
        if self.parent_kind(node) != Some(SyntaxKind::SourceFile) {
            self.error_on_node(node, &messages::GLOBAL_MODULE_EXPORTS_MAY_ONLY_APPEAR_AT_TOP_LEVEL, &[]);
        } else if !self.file.is_external_module() {
            self.error_on_node(node, &messages::GLOBAL_MODULE_EXPORTS_MAY_ONLY_APPEAR_IN_MODULE_FILES, &[]);
        } else if !self.file.is_declaration_file {
            self.error_on_node(node, &messages::GLOBAL_MODULE_EXPORTS_MAY_ONLY_APPEAR_IN_DECLARATION_FILES, &[]);
        } else if let Some(file_symbol) = self.symbol_of(self.file.root) {
            self.declare_symbol(
                TableRef::GlobalExports(file_symbol),
                Some(file_symbol),
                node,
                SymbolFlags::ALIAS,
                SymbolFlags::ALIAS_EXCLUDES,
            );
        }
    }

    pub(super) fn bind_export_declaration(&mut self, node: NodeId) {
        let NodeData::ExportDeclaration { export_clause, .. } = self.arena.data(node) else {
            return;
        };
        let export_clause = *export_clause;
        match (self.container_symbol(), export_clause) {
            (None, _) => {
                let name = self.declaration_name(node);
                self.bind_anonymous_declaration(node, SymbolFlags::EXPORT_STAR, &name);
            }
            (Some(owner), None) => {
                self.declare_symbol(TableRef::Exports(owner), Some(owner), node, SymbolFlags::EXPORT_STAR, SymbolFlags::NONE);
            }
            (Some(owner), Some(clause)) if self.kind(clause) == SyntaxKind::NamespaceExport => {
                self.parents[clause.index()] = Some(node);
                self.declare_symbol(
                    TableRef::Exports(owner),
                    Some(owner),
                    clause,
                    SymbolFlags::ALIAS,
                    SymbolFlags::ALIAS_EXCLUDES,
                );
            }
            _ => {}
        }
    }

    pub(super) fn bind_export_assignment(&mut self, node: NodeId) {
        let NodeData::ExportAssignment {
            is_export_equals,
            expression,
        } = self.arena.data(node)
        else {
            return;
        };
        let (is_export_equals, expression) = (*is_export_equals, *expression);
        let Some(owner) = self.container_symbol() else {
            let name = self.declaration_name(node);
            self.bind_anonymous_declaration(node, SymbolFlags::VALUE, &name);
            return;
        };
        let is_alias = is_entity_name_expression(self.arena, expression)
            || self.kind(expression) == SyntaxKind::ClassExpression;
        let flags = if is_alias {
            SymbolFlags::ALIAS
        } else {
            SymbolFlags::PROPERTY
        };
        let symbol = self.declare_symbol(TableRef::Exports(owner), Some(owner), node, flags, SymbolFlags::ALL);
        if is_export_equals {
            self.set_value_declaration(symbol, node);
        }
    }

    // ========================================================================
    // Function property assignments
    // ========================================================================

    /// `F.x = ...` or `F[k] = ...`.
    pub(super) fn is_function_property_assignment(&self, node: NodeId) -> bool {
        let NodeData::Binary {
            left,
            operator: SyntaxKind::EqualsToken,
            ..
        } = self.arena.data(node)
        else {
            return false;
        };
        match self.arena.data(*left) {
            NodeData::PropertyAccess { expression, name, .. } => {
                self.kind(*expression) == SyntaxKind::Identifier && self.kind(*name) == SyntaxKind::Identifier
            }
            NodeData::ElementAccess { expression, .. } => self.kind(*expression) == SyntaxKind::Identifier,
            _ => false,
        }
    }

    /// Record `f.x = ...` as an export of `f` when `f` is a function
    /// declaration or a const bound to a function expression or arrow.
    pub(super) fn bind_function_property_assignment(&mut self, node: NodeId) {
        let NodeData::Binary { left, right, .. } = self.arena.data(node) else {
            return;
        };
        let (left, right) = (*left, *right);
        let Some(target) = self.arena.expression(left) else {
            return;
        };
        let parent_name = self.intern(self.text_of(target));
        let found = self
            .lookup_name(parent_name, self.block_scope_container())
            .or_else(|| self.lookup_name(parent_name, self.container()));
        let Some(function_symbol) = found.and_then(|symbol| self.function_symbol_of(symbol)) else {
            return;
        };

        self.parents[left.index()] = Some(node);
        self.parents[right.index()] = Some(node);
        let flags = SymbolFlags::PROPERTY | SymbolFlags::ASSIGNMENT;
        if self.has_dynamic_name(node) {
            self.bind_anonymous_declaration(node, flags, internal_names::COMPUTED);
        } else {
            self.declare_symbol(
                TableRef::Exports(function_symbol),
                Some(function_symbol),
                node,
                flags,
                SymbolFlags::PROPERTY_EXCLUDES & !SymbolFlags::ASSIGNMENT,
            );
        }
    }

    /// `this.x = ...` directly inside a class constructor of a JavaScript
    /// file.
    pub(super) fn is_constructor_this_assignment(&self, node: NodeId) -> bool {
        if !self.is_in_js_file() {
            return false;
        }
        let NodeData::Binary {
            left,
            operator: SyntaxKind::EqualsToken,
            ..
        } = self.arena.data(node)
        else {
            return false;
        };
        let is_this_property = match self.arena.data(*left) {
            NodeData::PropertyAccess { expression, name, .. } => {
                self.kind(*expression) == SyntaxKind::ThisKeyword && self.kind(*name) == SyntaxKind::Identifier
            }
            _ => false,
        };
        is_this_property && self.this_container.map(|c| self.kind(c)) == Some(SyntaxKind::Constructor)
    }

    /// Declare the property among the class members. It gives way to a
    /// method of the same name whichever comes first.
    pub(super) fn bind_constructor_this_assignment(&mut self, node: NodeId) {
        let Some(class_symbol) = self
            .this_container
            .and_then(|constructor| self.parent_of(constructor))
            .and_then(|class| self.symbol_of(class))
        else {
            return;
        };
        let NodeData::Binary { left, right, .. } = self.arena.data(node) else {
            return;
        };
        let (left, right) = (*left, *right);
        self.parents[left.index()] = Some(node);
        self.parents[right.index()] = Some(node);
        self.declare_symbol_ex(
            TableRef::Members(class_symbol),
            Some(class_symbol),
            node,
            SymbolFlags::PROPERTY | SymbolFlags::ASSIGNMENT,
            SymbolFlags::NONE,
            true,
        );
    }

    fn is_in_js_file(&self) -> bool {
        [".js", ".jsx", ".mjs", ".cjs"]
            .iter()
            .any(|extension| self.file.file_name.ends_with(extension))
    }

    fn lookup_name(&self, name: InternedString, container: NodeId) -> Option<SymbolId> {
        if let Some(local) = self.locals.get(&container).and_then(|locals| locals.get(name)) {
            return Some(self.symbols[local.index()].export_or_self());
        }
        let owner = self.symbol_of(container)?;
        self.table_get(TableRef::Exports(owner), name)
    }

    fn function_symbol_of(&self, symbol: SymbolId) -> Option<SymbolId> {
        let declaration = self.symbols[symbol.index()].value_declaration?;
        match self.kind(declaration) {
            SyntaxKind::FunctionDeclaration => Some(symbol),
            SyntaxKind::VariableDeclaration => {
                let list = self.parent_of(declaration)?;
                if !self.arena.flags(list).contains(NodeFlags::CONST) {
                    return None;
                }
                let initializer = self.arena.initializer(declaration)?;
                if matches!(
                    self.kind(initializer),
                    SyntaxKind::FunctionExpression | SyntaxKind::ArrowFunction
                ) {
                    self.symbol_of(initializer)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

/// `src/a.ts` -> `src/a`, `lib.d.ts` -> `lib`.
fn remove_file_extension(path: &str) -> &str {
    const EXTENSIONS: [&str; 10] = [
        ".d.ts", ".d.mts", ".d.cts", ".ts", ".tsx", ".mts", ".cts", ".js", ".jsx", ".json",
    ];
    EXTENSIONS
        .iter()
        .find_map(|extension| path.strip_suffix(extension))
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::remove_file_extension;

    #[test]
    fn test_remove_file_extension() {
        assert_eq!(remove_file_extension("src/a.ts"), "src/a");
        assert_eq!(remove_file_extension("lib.d.ts"), "lib");
        assert_eq!(remove_file_extension("mod.mjs"), "mod.mjs");
    }
}
