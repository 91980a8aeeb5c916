//! Container classification and symbol table selection.
//!
//! Every node is classified once on the way down. Containers own symbol
//! tables; control flow containers start a fresh flow graph; block scoped
//! containers only hold `let`/`const`/`class` locals.

use tsbind_ast::node::NodeArena;
use tsbind_ast::types::{ModifierFlags, NodeId, SymbolId};
use tsbind_ast::SyntaxKind;

bitflags::bitflags! {
    /// How a node participates in scoping and flow.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ContainerFlags: u16 {
        const NONE = 0;
        /// Owns a symbol table; declarations inside go into it.
        const IS_CONTAINER = 1 << 0;
        /// Only block-scoped declarations go here.
        const IS_BLOCK_SCOPED_CONTAINER = 1 << 1;
        /// Starts a new control flow graph.
        const IS_CONTROL_FLOW_CONTAINER = 1 << 2;
        const IS_FUNCTION_LIKE = 1 << 3;
        const IS_FUNCTION_EXPRESSION = 1 << 4;
        const HAS_LOCALS = 1 << 5;
        const IS_INTERFACE = 1 << 6;
        const IS_OBJECT_LITERAL_OR_CLASS_EXPRESSION_METHOD_OR_ACCESSOR = 1 << 7;
        /// Decides what `this` refers to inside it.
        const IS_THIS_CONTAINER = 1 << 8;
    }
}

/// Classify `node`. `parent_kind` decides whether a method or accessor
/// belongs to an object literal or class expression.
pub fn container_flags(arena: &NodeArena, node: NodeId, parent_kind: Option<SyntaxKind>) -> ContainerFlags {
    let function_like = ContainerFlags::IS_CONTAINER
        | ContainerFlags::IS_CONTROL_FLOW_CONTAINER
        | ContainerFlags::HAS_LOCALS
        | ContainerFlags::IS_FUNCTION_LIKE;
    match arena.kind(node) {
        SyntaxKind::ClassExpression
        | SyntaxKind::ClassDeclaration
        | SyntaxKind::EnumDeclaration
        | SyntaxKind::ObjectLiteralExpression
        | SyntaxKind::TypeLiteral => ContainerFlags::IS_CONTAINER,
        SyntaxKind::InterfaceDeclaration => ContainerFlags::IS_CONTAINER | ContainerFlags::IS_INTERFACE,
        SyntaxKind::ModuleDeclaration
        | SyntaxKind::TypeAliasDeclaration
        | SyntaxKind::MappedType
        | SyntaxKind::IndexSignature => ContainerFlags::IS_CONTAINER | ContainerFlags::HAS_LOCALS,
        SyntaxKind::SourceFile => {
            ContainerFlags::IS_CONTAINER | ContainerFlags::IS_CONTROL_FLOW_CONTAINER | ContainerFlags::HAS_LOCALS
        }
        SyntaxKind::GetAccessor | SyntaxKind::SetAccessor | SyntaxKind::MethodDeclaration
            if is_object_literal_or_class_expression(parent_kind) =>
        {
            function_like
                | ContainerFlags::IS_OBJECT_LITERAL_OR_CLASS_EXPRESSION_METHOD_OR_ACCESSOR
                | ContainerFlags::IS_THIS_CONTAINER
        }
        SyntaxKind::GetAccessor
        | SyntaxKind::SetAccessor
        | SyntaxKind::MethodDeclaration
        | SyntaxKind::Constructor
        | SyntaxKind::FunctionDeclaration
        | SyntaxKind::MethodSignature
        | SyntaxKind::CallSignature
        | SyntaxKind::FunctionType
        | SyntaxKind::ConstructSignature
        | SyntaxKind::ConstructorType
        | SyntaxKind::ClassStaticBlockDeclaration => function_like | ContainerFlags::IS_THIS_CONTAINER,
        SyntaxKind::FunctionExpression => {
            function_like | ContainerFlags::IS_FUNCTION_EXPRESSION | ContainerFlags::IS_THIS_CONTAINER
        }
        SyntaxKind::ArrowFunction => function_like | ContainerFlags::IS_FUNCTION_EXPRESSION,
        SyntaxKind::ModuleBlock => ContainerFlags::IS_CONTROL_FLOW_CONTAINER,
        SyntaxKind::PropertyDeclaration => {
            if arena.initializer(node).is_some() {
                ContainerFlags::IS_CONTROL_FLOW_CONTAINER | ContainerFlags::IS_THIS_CONTAINER
            } else {
                ContainerFlags::NONE
            }
        }
        SyntaxKind::CatchClause
        | SyntaxKind::ForStatement
        | SyntaxKind::ForInStatement
        | SyntaxKind::ForOfStatement
        | SyntaxKind::CaseBlock => ContainerFlags::IS_BLOCK_SCOPED_CONTAINER | ContainerFlags::HAS_LOCALS,
        SyntaxKind::Block => match parent_kind {
            Some(kind) if kind.is_function_like() || kind == SyntaxKind::ClassStaticBlockDeclaration => {
                ContainerFlags::NONE
            }
            _ => ContainerFlags::IS_BLOCK_SCOPED_CONTAINER | ContainerFlags::HAS_LOCALS,
        },
        _ => ContainerFlags::NONE,
    }
}

fn is_object_literal_or_class_expression(kind: Option<SyntaxKind>) -> bool {
    matches!(
        kind,
        Some(SyntaxKind::ObjectLiteralExpression | SyntaxKind::ClassExpression)
    )
}

/// Which table of the current container a declaration goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSelector {
    /// Namespace body: exported members get a local and an export symbol.
    ModuleMember,
    /// Module member for module files, locals for scripts.
    SourceFileMember,
    /// The container symbol's `exports` (enum members, static class members).
    ContainerExports,
    /// The container symbol's `members`.
    ContainerMembers,
    /// The container node's `locals`.
    ContainerLocals,
}

/// Pick the table for a declaration of `node_kind` with `modifiers`, made
/// directly inside a container of `container_kind`.
pub fn select_table(
    container_kind: SyntaxKind,
    node_kind: SyntaxKind,
    modifiers: ModifierFlags,
) -> Option<TableSelector> {
    match container_kind {
        SyntaxKind::ModuleDeclaration => Some(TableSelector::ModuleMember),
        SyntaxKind::SourceFile => Some(TableSelector::SourceFileMember),
        SyntaxKind::ClassExpression | SyntaxKind::ClassDeclaration => {
            if node_kind == SyntaxKind::ClassStaticBlockDeclaration || modifiers.contains(ModifierFlags::STATIC) {
                Some(TableSelector::ContainerExports)
            } else {
                Some(TableSelector::ContainerMembers)
            }
        }
        SyntaxKind::EnumDeclaration => Some(TableSelector::ContainerExports),
        SyntaxKind::TypeLiteral | SyntaxKind::ObjectLiteralExpression | SyntaxKind::InterfaceDeclaration => {
            Some(TableSelector::ContainerMembers)
        }
        SyntaxKind::FunctionType
        | SyntaxKind::ConstructorType
        | SyntaxKind::CallSignature
        | SyntaxKind::ConstructSignature
        | SyntaxKind::IndexSignature
        | SyntaxKind::MethodDeclaration
        | SyntaxKind::MethodSignature
        | SyntaxKind::Constructor
        | SyntaxKind::GetAccessor
        | SyntaxKind::SetAccessor
        | SyntaxKind::FunctionDeclaration
        | SyntaxKind::FunctionExpression
        | SyntaxKind::ArrowFunction
        | SyntaxKind::ClassStaticBlockDeclaration
        | SyntaxKind::TypeAliasDeclaration
        | SyntaxKind::MappedType => Some(TableSelector::ContainerLocals),
        _ => None,
    }
}

/// A concrete symbol table: a node's locals or one of a symbol's tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TableRef {
    Locals(NodeId),
    Exports(SymbolId),
    Members(SymbolId),
    GlobalExports(SymbolId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsbind_ast::builder::AstBuilder;

    #[test]
    fn test_function_body_block_is_not_a_scope() {
        let mut b = AstBuilder::new();
        let body = b.block(vec![]);
        let arena = b.arena();
        assert_eq!(
            container_flags(arena, body, Some(SyntaxKind::FunctionDeclaration)),
            ContainerFlags::NONE
        );
        let flags = container_flags(arena, body, Some(SyntaxKind::IfStatement));
        assert!(flags.contains(ContainerFlags::IS_BLOCK_SCOPED_CONTAINER | ContainerFlags::HAS_LOCALS));
    }

    #[test]
    fn test_method_flags_depend_on_parent() {
        let mut b = AstBuilder::new();
        let name = b.ident("m");
        let body = b.block(vec![]);
        let method = b.method(name, vec![], Some(body));
        let arena = b.arena();
        let in_literal = container_flags(arena, method, Some(SyntaxKind::ObjectLiteralExpression));
        let in_class = container_flags(arena, method, Some(SyntaxKind::ClassDeclaration));
        assert!(in_literal.contains(ContainerFlags::IS_OBJECT_LITERAL_OR_CLASS_EXPRESSION_METHOD_OR_ACCESSOR));
        assert!(!in_class.contains(ContainerFlags::IS_OBJECT_LITERAL_OR_CLASS_EXPRESSION_METHOD_OR_ACCESSOR));
        assert!(in_class.contains(ContainerFlags::IS_FUNCTION_LIKE | ContainerFlags::IS_THIS_CONTAINER));
    }

    #[test]
    fn test_arrow_is_not_a_this_container() {
        let mut b = AstBuilder::new();
        let body = b.block(vec![]);
        let arrow = b.arrow(vec![], body);
        let arena = b.arena();
        let flags = container_flags(arena, arrow, None);
        assert!(flags.contains(ContainerFlags::IS_FUNCTION_EXPRESSION | ContainerFlags::HAS_LOCALS));
        assert!(!flags.contains(ContainerFlags::IS_THIS_CONTAINER));
        assert_eq!(container_flags(arena, body, Some(SyntaxKind::ArrowFunction)), ContainerFlags::NONE);
    }

    #[test]
    fn test_property_with_initializer_is_flow_container() {
        let mut b = AstBuilder::new();
        let name = b.ident("p");
        let one = b.num("1");
        let with_init = b.property_decl(name, Some(one));
        let name = b.ident("q");
        let without = b.property_decl(name, None);
        let arena = b.arena();
        assert!(container_flags(arena, with_init, None).contains(ContainerFlags::IS_CONTROL_FLOW_CONTAINER));
        assert_eq!(container_flags(arena, without, None), ContainerFlags::NONE);
    }

    #[test]
    fn test_select_table_for_class_members() {
        assert_eq!(
            select_table(SyntaxKind::ClassDeclaration, SyntaxKind::PropertyDeclaration, ModifierFlags::STATIC),
            Some(TableSelector::ContainerExports)
        );
        assert_eq!(
            select_table(SyntaxKind::ClassExpression, SyntaxKind::MethodDeclaration, ModifierFlags::NONE),
            Some(TableSelector::ContainerMembers)
        );
        assert_eq!(
            select_table(
                SyntaxKind::ClassDeclaration,
                SyntaxKind::ClassStaticBlockDeclaration,
                ModifierFlags::NONE
            ),
            Some(TableSelector::ContainerExports)
        );
    }

    #[test]
    fn test_select_table_by_container() {
        let none = ModifierFlags::NONE;
        let var = SyntaxKind::VariableDeclaration;
        assert_eq!(select_table(SyntaxKind::EnumDeclaration, SyntaxKind::EnumMember, none), Some(TableSelector::ContainerExports));
        assert_eq!(select_table(SyntaxKind::InterfaceDeclaration, SyntaxKind::PropertySignature, none), Some(TableSelector::ContainerMembers));
        assert_eq!(select_table(SyntaxKind::ArrowFunction, var, none), Some(TableSelector::ContainerLocals));
        assert_eq!(select_table(SyntaxKind::ModuleDeclaration, var, none), Some(TableSelector::ModuleMember));
        assert_eq!(select_table(SyntaxKind::SourceFile, var, none), Some(TableSelector::SourceFileMember));
        assert_eq!(select_table(SyntaxKind::Block, var, none), None);
    }
}
