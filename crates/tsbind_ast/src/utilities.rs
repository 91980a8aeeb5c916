//! Syntactic helpers that need only the arena and the source text.
//!
//! Anything that walks up the tree takes a parent lookup, since parents are
//! assigned by the binder while it walks down.

use crate::node::{NodeArena, NodeData};
use crate::syntax_kind::SyntaxKind;
use crate::types::*;
use crate::visitor::for_each_child;
use tsbind_core::text::{TextPos, TextRange};
use tsbind_core::FxHashMap;

// ============================================================================
// Text scanning
// ============================================================================

/// Skip whitespace and comments starting at `pos`.
pub fn skip_trivia(text: &str, pos: TextPos) -> TextPos {
    let bytes = text.as_bytes();
    let mut i = pos as usize;
    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c => i += 1,
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    i += 1;
                }
                i = (i + 2).min(bytes.len());
            }
            _ => break,
        }
    }
    i as TextPos
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Range of the token that starts at or after `pos`.
pub fn token_range_at(text: &str, pos: TextPos) -> TextRange {
    let start = skip_trivia(text, pos) as usize;
    let rest = match text.get(start..) {
        Some(rest) => rest,
        None => return TextRange::empty(start as TextPos),
    };
    let mut chars = rest.char_indices();
    let len = match chars.next() {
        None => 0,
        Some((_, quote @ ('"' | '\'' | '`'))) => {
            let mut end = rest.len();
            let mut escaped = false;
            for (i, c) in chars {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == quote {
                    end = i + c.len_utf8();
                    break;
                }
            }
            end
        }
        Some((_, c)) if c == '#' || is_identifier_part(c) => chars
            .find(|&(_, c)| !is_identifier_part(c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len()),
        Some((_, c)) => c.len_utf8(),
    };
    TextRange::new(start as TextPos, (start + len) as TextPos)
}

// ============================================================================
// Node predicates
// ============================================================================

pub fn is_string_literal_like(kind: SyntaxKind) -> bool {
    matches!(kind, SyntaxKind::StringLiteral | SyntaxKind::NoSubstitutionTemplateLiteral)
}

pub fn is_string_or_numeric_literal_like(kind: SyntaxKind) -> bool {
    is_string_literal_like(kind) || kind == SyntaxKind::NumericLiteral
}

/// `+1` or `-1`.
pub fn is_signed_numeric_literal(arena: &NodeArena, id: NodeId) -> bool {
    match arena.data(id) {
        NodeData::Unary { operator, operand } if arena.kind(id) == SyntaxKind::PrefixUnaryExpression => {
            matches!(operator, SyntaxKind::PlusToken | SyntaxKind::MinusToken)
                && arena.kind(*operand) == SyntaxKind::NumericLiteral
        }
        _ => false,
    }
}

pub fn skip_parentheses(arena: &NodeArena, mut id: NodeId) -> NodeId {
    while arena.kind(id) == SyntaxKind::ParenthesizedExpression {
        match arena.expression(id) {
            Some(inner) => id = inner,
            None => break,
        }
    }
    id
}

/// `a`, `a.b`, `a.b.c`.
pub fn is_entity_name_expression(arena: &NodeArena, id: NodeId) -> bool {
    match arena.data(id) {
        NodeData::Text { .. } => arena.kind(id) == SyntaxKind::Identifier,
        NodeData::PropertyAccess { expression, name, .. } => {
            arena.kind(*name) == SyntaxKind::Identifier && is_entity_name_expression(arena, *expression)
        }
        _ => false,
    }
}

pub fn is_left_hand_side_expression_kind(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::PropertyAccessExpression
            | SyntaxKind::ElementAccessExpression
            | SyntaxKind::NewExpression
            | SyntaxKind::CallExpression
            | SyntaxKind::ArrayLiteralExpression
            | SyntaxKind::ParenthesizedExpression
            | SyntaxKind::ObjectLiteralExpression
            | SyntaxKind::ClassExpression
            | SyntaxKind::FunctionExpression
            | SyntaxKind::Identifier
            | SyntaxKind::PrivateIdentifier
            | SyntaxKind::RegularExpressionLiteral
            | SyntaxKind::NumericLiteral
            | SyntaxKind::BigIntLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::NoSubstitutionTemplateLiteral
            | SyntaxKind::FalseKeyword
            | SyntaxKind::NullKeyword
            | SyntaxKind::ThisKeyword
            | SyntaxKind::TrueKeyword
            | SyntaxKind::SuperKeyword
            | SyntaxKind::NonNullExpression
            | SyntaxKind::ExpressionWithTypeArguments
            | SyntaxKind::MetaProperty
            | SyntaxKind::ImportKeyword
    )
}

/// A property access, element access, call or non-null expression that is part of `?.` chain.
pub fn is_optional_chain(arena: &NodeArena, id: NodeId) -> bool {
    matches!(
        arena.kind(id),
        SyntaxKind::PropertyAccessExpression
            | SyntaxKind::ElementAccessExpression
            | SyntaxKind::CallExpression
            | SyntaxKind::NonNullExpression
    ) && arena.flags(id).contains(NodeFlags::OPTIONAL_CHAIN)
}

/// Whether this chain link carries the `?.` token itself.
pub fn has_question_dot(arena: &NodeArena, id: NodeId) -> bool {
    match arena.data(id) {
        NodeData::PropertyAccess { question_dot_token, .. }
        | NodeData::ElementAccess { question_dot_token, .. }
        | NodeData::Call { question_dot_token, .. } => *question_dot_token,
        _ => false,
    }
}

pub fn is_enum_const(arena: &NodeArena, id: NodeId) -> bool {
    arena.modifier_flags(id).contains(ModifierFlags::CONST)
}

/// `declare module "x"` or `declare global`.
pub fn is_ambient_module(arena: &NodeArena, id: NodeId) -> bool {
    match arena.data(id) {
        NodeData::Module { name, .. } => {
            arena.kind(*name) == SyntaxKind::StringLiteral || is_global_scope_augmentation(arena, id)
        }
        _ => false,
    }
}

pub fn is_global_scope_augmentation(arena: &NodeArena, id: NodeId) -> bool {
    arena.flags(id).contains(NodeFlags::GLOBAL_AUGMENTATION)
}

pub fn is_push_or_unshift_identifier(arena: &NodeArena, id: NodeId) -> bool {
    arena.kind(id) == SyntaxKind::Identifier && matches!(arena.text(id), Some("push" | "unshift"))
}

/// Whether `statement` (or one of its variable declarations) is named like `name`.
pub fn node_has_name(arena: &NodeArena, statement: NodeId, name: NodeId) -> bool {
    if let Some(own) = arena.name(statement) {
        return arena.kind(own) == SyntaxKind::Identifier && arena.text_key(own) == arena.text_key(name);
    }
    match arena.data(statement) {
        NodeData::VariableStatement { declaration_list } => match arena.data(*declaration_list) {
            NodeData::VariableDeclarationList { declarations } => {
                declarations.iter().any(|&d| node_has_name(arena, d, name))
            }
            _ => false,
        },
        _ => false,
    }
}

// ============================================================================
// Module instance state
// ============================================================================

/// Whether a namespace body produces a runtime value.
///
/// Variant order matters: merging states takes the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ModuleInstanceState {
    Unknown,
    NonInstantiated,
    Instantiated,
    ConstEnumOnly,
}

/// Instance state of a module declaration.
///
/// `parent_of` must answer for every ancestor of `module`; nodes below it
/// are tracked on an explicit ancestor stack, so their parents need not be
/// known yet.
pub fn module_instance_state(
    arena: &NodeArena,
    module: NodeId,
    parent_of: &dyn Fn(NodeId) -> Option<NodeId>,
) -> ModuleInstanceState {
    let mut walker = InstanceStateWalker {
        arena,
        parent_of,
        visited: FxHashMap::default(),
    };
    walker.module_state(module, &[])
}

struct InstanceStateWalker<'a> {
    arena: &'a NodeArena,
    parent_of: &'a dyn Fn(NodeId) -> Option<NodeId>,
    visited: FxHashMap<NodeId, ModuleInstanceState>,
}

fn push(ancestors: &[NodeId], node: NodeId) -> Vec<NodeId> {
    let mut next = ancestors.to_vec();
    next.push(node);
    next
}

impl InstanceStateWalker<'_> {
    fn module_state(&mut self, module: NodeId, ancestors: &[NodeId]) -> ModuleInstanceState {
        match self.arena.body(module) {
            Some(body) => self.cached(body, &push(ancestors, module)),
            None => ModuleInstanceState::Instantiated,
        }
    }

    fn cached(&mut self, node: NodeId, ancestors: &[NodeId]) -> ModuleInstanceState {
        if let Some(&state) = self.visited.get(&node) {
            // A cycle through alias targets counts as non-instantiated.
            return if state == ModuleInstanceState::Unknown {
                ModuleInstanceState::NonInstantiated
            } else {
                state
            };
        }
        self.visited.insert(node, ModuleInstanceState::Unknown);
        let state = self.worker(node, ancestors);
        self.visited.insert(node, state);
        state
    }

    fn worker(&mut self, node: NodeId, ancestors: &[NodeId]) -> ModuleInstanceState {
        let arena = self.arena;
        match arena.kind(node) {
            SyntaxKind::InterfaceDeclaration | SyntaxKind::TypeAliasDeclaration => {
                return ModuleInstanceState::NonInstantiated;
            }
            SyntaxKind::EnumDeclaration if is_enum_const(arena, node) => {
                return ModuleInstanceState::ConstEnumOnly;
            }
            SyntaxKind::ImportDeclaration | SyntaxKind::ImportEqualsDeclaration
                if !arena.modifier_flags(node).contains(ModifierFlags::EXPORT) =>
            {
                return ModuleInstanceState::NonInstantiated;
            }
            SyntaxKind::ExportDeclaration => {
                if let NodeData::ExportDeclaration {
                    export_clause: Some(clause),
                    module_specifier: None,
                    ..
                } = arena.data(node)
                {
                    if arena.kind(*clause) == SyntaxKind::NamedExports {
                        let ancestors = push(&push(ancestors, node), *clause);
                        let mut state = ModuleInstanceState::NonInstantiated;
                        for &specifier in arena.members_of_named_bindings(*clause) {
                            let specifier_state = self.alias_target_state(specifier, &ancestors);
                            if specifier_state > state {
                                state = specifier_state;
                            }
                            if state == ModuleInstanceState::Instantiated {
                                return state;
                            }
                        }
                        return state;
                    }
                }
            }
            SyntaxKind::ModuleBlock => {
                let ancestors = push(ancestors, node);
                let mut state = ModuleInstanceState::NonInstantiated;
                for &child in arena.statements(node) {
                    match self.cached(child, &ancestors) {
                        ModuleInstanceState::Instantiated => return ModuleInstanceState::Instantiated,
                        ModuleInstanceState::ConstEnumOnly => state = ModuleInstanceState::ConstEnumOnly,
                        _ => {}
                    }
                }
                return state;
            }
            SyntaxKind::ModuleDeclaration => return self.module_state(node, ancestors),
            _ => {}
        }
        ModuleInstanceState::Instantiated
    }

    fn alias_target_state(&mut self, specifier: NodeId, ancestors: &[NodeId]) -> ModuleInstanceState {
        let arena = self.arena;
        let name = match arena.data(specifier) {
            NodeData::Specifier { property_name, name, .. } => property_name.unwrap_or(*name),
            _ => return ModuleInstanceState::Instantiated,
        };
        if arena.kind(name) != SyntaxKind::Identifier {
            return ModuleInstanceState::Instantiated;
        }

        let mut stack = ancestors.to_vec();
        let mut current = specifier;
        loop {
            let parent = match stack.pop() {
                Some(parent) => parent,
                None => match (self.parent_of)(current) {
                    Some(parent) => parent,
                    None => break,
                },
            };
            if matches!(
                arena.kind(parent),
                SyntaxKind::Block | SyntaxKind::ModuleBlock | SyntaxKind::SourceFile
            ) {
                let statement_ancestors = push(&stack, parent);
                let mut found = ModuleInstanceState::Unknown;
                for &statement in arena.statements(parent) {
                    if !node_has_name(arena, statement, name) {
                        continue;
                    }
                    let state = self.cached(statement, &statement_ancestors);
                    if found == ModuleInstanceState::Unknown || state > found {
                        found = state;
                    }
                    if found == ModuleInstanceState::Instantiated {
                        return found;
                    }
                    if arena.kind(statement) == SyntaxKind::ImportEqualsDeclaration {
                        // Re-exported import aliases are ambiguous; treat them as values.
                        found = ModuleInstanceState::Instantiated;
                    }
                }
                if found != ModuleInstanceState::Unknown {
                    return found;
                }
            }
            current = parent;
        }
        ModuleInstanceState::Instantiated
    }
}

impl NodeArena {
    /// Elements of `NamedImports` / `NamedExports`.
    pub fn members_of_named_bindings(&self, id: NodeId) -> &[NodeId] {
        match self.data(id) {
            NodeData::NamedBindings { elements } => elements,
            _ => &[],
        }
    }
}

/// Every node in the subtree rooted at `id`, in pre-order.
pub fn descendants(arena: &NodeArena, id: NodeId) -> Vec<NodeId> {
    let mut out = vec![id];
    let mut i = 0;
    while i < out.len() {
        let mut kids = Vec::new();
        for_each_child(arena, out[i], |c| kids.push(c));
        out.splice(i + 1..i + 1, kids);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::AstBuilder;
    use crate::node::SourceFile;

    fn parents(file: &SourceFile) -> FxHashMap<NodeId, NodeId> {
        let mut map = FxHashMap::default();
        for id in descendants(&file.arena, file.root) {
            for_each_child(&file.arena, id, |child| {
                map.insert(child, id);
            });
        }
        map
    }

    fn state_of(file: &SourceFile, module: NodeId) -> ModuleInstanceState {
        let map = parents(file);
        module_instance_state(&file.arena, module, &|id| map.get(&id).copied())
    }

    // ========================================================================
    // Scanning
    // ========================================================================

    #[test]
    fn test_skip_trivia_skips_comments() {
        let text = "  // line\n /* block */ x";
        assert_eq!(skip_trivia(text, 0), 23);
    }

    #[test]
    fn test_token_range_at_identifier_and_string() {
        let text = "  export default";
        assert_eq!(token_range_at(text, 0), TextRange::new(2, 8));
        let text = " \"a b\" rest";
        assert_eq!(token_range_at(text, 0), TextRange::new(1, 6));
        let text = " #name rest";
        assert_eq!(token_range_at(text, 0), TextRange::new(1, 6));
        let text = " {";
        assert_eq!(token_range_at(text, 0), TextRange::new(1, 2));
    }

    // ========================================================================
    // Module instance state
    // ========================================================================

    #[test]
    fn test_types_only_namespace_is_non_instantiated() {
        let mut b = AstBuilder::new();
        let i = b.interface("I", vec![]);
        let ns = b.namespace("N", vec![i]);
        let file = b.finish("test.ts", vec![ns]);
        assert_eq!(state_of(&file, ns), ModuleInstanceState::NonInstantiated);
    }

    #[test]
    fn test_const_enum_namespace_is_const_enum_only() {
        let mut b = AstBuilder::new();
        let e = b.enum_decl("E", vec![]);
        let e = b.with_modifiers(e, ModifierFlags::CONST);
        let ns = b.namespace("N", vec![e]);
        let file = b.finish("test.ts", vec![ns]);
        assert_eq!(state_of(&file, ns), ModuleInstanceState::ConstEnumOnly);
    }

    #[test]
    fn test_value_makes_namespace_instantiated() {
        let mut b = AstBuilder::new();
        let d = b.var_decl("x", None);
        let v = b.var_stmt(NodeFlags::NONE, vec![d]);
        let ns = b.namespace("N", vec![v]);
        let file = b.finish("test.ts", vec![ns]);
        assert_eq!(state_of(&file, ns), ModuleInstanceState::Instantiated);
    }

    #[test]
    fn test_export_specifier_resolves_alias_target() {
        let mut b = AstBuilder::new();
        let i = b.interface("I", vec![]);
        let spec = b.export_specifier(None, "I");
        let clause = b.named_exports(vec![spec]);
        let export = b.export_decl(Some(clause), None);
        let ns = b.namespace("N", vec![i, export]);
        let file = b.finish("test.ts", vec![ns]);
        assert_eq!(state_of(&file, ns), ModuleInstanceState::NonInstantiated);
    }

    #[test]
    fn test_export_of_unknown_name_is_instantiated() {
        let mut b = AstBuilder::new();
        let spec = b.export_specifier(None, "missing");
        let clause = b.named_exports(vec![spec]);
        let export = b.export_decl(Some(clause), None);
        let ns = b.namespace("N", vec![export]);
        let file = b.finish("test.ts", vec![ns]);
        assert_eq!(state_of(&file, ns), ModuleInstanceState::Instantiated);
    }

    #[test]
    fn test_bodiless_module_is_instantiated() {
        let mut b = AstBuilder::new();
        let m = b.ambient_module("fs", None);
        let file = b.finish("test.ts", vec![m]);
        assert_eq!(state_of(&file, m), ModuleInstanceState::Instantiated);
        assert!(is_ambient_module(&file.arena, m));
    }

    // ========================================================================
    // Predicates
    // ========================================================================

    #[test]
    fn test_entity_name_expression() {
        let mut b = AstBuilder::new();
        let a = b.ident("a");
        let ab = b.prop(a, "b");
        let one = b.num("1");
        let call = b.call(ab, vec![one]);
        assert!(is_entity_name_expression(b.arena(), ab));
        assert!(!is_entity_name_expression(b.arena(), call));
    }

    #[test]
    fn test_signed_numeric_literal() {
        let mut b = AstBuilder::new();
        let one = b.num("1");
        let neg = b.prefix(SyntaxKind::MinusToken, one);
        let x = b.ident("x");
        let not = b.prefix(SyntaxKind::ExclamationToken, x);
        assert!(is_signed_numeric_literal(b.arena(), neg));
        assert!(!is_signed_numeric_literal(b.arena(), not));
    }
}
