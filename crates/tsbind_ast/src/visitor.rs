//! Generic child traversal.
//!
//! `for_each_child` visits the direct children of a node in source order.
//! The binder depends on this order for left-to-right declaration and
//! deterministic diagnostics.

use crate::node::{NodeArena, NodeData};
use crate::types::NodeId;

/// Visit every direct child of `id`, in source order.
pub fn for_each_child(arena: &NodeArena, id: NodeId, mut f: impl FnMut(NodeId)) {
    let mut one = |child: &NodeId| f(*child);
    visit_slots(arena.data(id), &mut one);
}

/// Collect the direct children of `id`, in source order.
pub fn children(arena: &NodeArena, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    for_each_child(arena, id, |child| out.push(child));
    out
}

fn visit_slots(data: &NodeData, f: &mut impl FnMut(&NodeId)) {
    macro_rules! opt {
        ($slot:expr) => {
            if let Some(child) = $slot {
                f(child);
            }
        };
    }
    macro_rules! list {
        ($slot:expr) => {
            for child in $slot.iter() {
                f(child);
            }
        };
    }

    match data {
        NodeData::None | NodeData::Text { .. } => {}
        NodeData::QualifiedName { left, right } => {
            f(left);
            f(right);
        }
        NodeData::ComputedPropertyName { expression }
        | NodeData::Wrapped { expression }
        | NodeData::ExportAssignment { expression, .. } => f(expression),
        NodeData::TypeParameter {
            name,
            constraint,
            default,
        } => {
            f(name);
            opt!(constraint);
            opt!(default);
        }
        NodeData::Parameter {
            name,
            type_annotation,
            initializer,
            ..
        }
        | NodeData::Property {
            name,
            type_annotation,
            initializer,
            ..
        }
        | NodeData::VariableDeclaration {
            name,
            type_annotation,
            initializer,
            ..
        } => {
            f(name);
            opt!(type_annotation);
            opt!(initializer);
        }
        NodeData::FunctionLike {
            name,
            type_parameters,
            parameters,
            return_type,
            body,
            ..
        } => {
            opt!(name);
            list!(type_parameters);
            list!(parameters);
            opt!(return_type);
            opt!(body);
        }
        NodeData::ClassStaticBlock { body } => f(body),
        NodeData::TypeReference {
            type_name,
            type_arguments,
        } => {
            f(type_name);
            list!(type_arguments);
        }
        NodeData::TypeQuery {
            expr_name,
            type_arguments,
        } => {
            f(expr_name);
            list!(type_arguments);
        }
        NodeData::Members { members } => list!(members),
        NodeData::WrappedType { type_node } => f(type_node),
        NodeData::Types { types } => list!(types),
        NodeData::ConditionalType {
            check_type,
            extends_type,
            true_type,
            false_type,
        } => {
            f(check_type);
            f(extends_type);
            f(true_type);
            f(false_type);
        }
        NodeData::InferType { type_parameter } => f(type_parameter),
        NodeData::IndexedAccessType {
            object_type,
            index_type,
        } => {
            f(object_type);
            f(index_type);
        }
        NodeData::MappedType {
            type_parameter,
            name_type,
            type_node,
            members,
        } => {
            f(type_parameter);
            opt!(name_type);
            opt!(type_node);
            list!(members);
        }
        NodeData::LiteralType { literal } => f(literal),
        NodeData::BindingPattern { elements }
        | NodeData::Elements { elements }
        | NodeData::NamedBindings { elements } => list!(elements),
        NodeData::BindingElement {
            property_name,
            name,
            initializer,
            ..
        } => {
            opt!(property_name);
            f(name);
            opt!(initializer);
        }
        NodeData::PropertyAccess { expression, name, .. } => {
            f(expression);
            f(name);
        }
        NodeData::ElementAccess {
            expression,
            argument_expression,
            ..
        } => {
            f(expression);
            f(argument_expression);
        }
        NodeData::Call {
            expression,
            type_arguments,
            arguments,
            ..
        } => {
            f(expression);
            list!(type_arguments);
            list!(arguments);
        }
        NodeData::Unary { operand, .. } => f(operand),
        NodeData::Binary { left, right, .. } => {
            f(left);
            f(right);
        }
        NodeData::Conditional {
            condition,
            when_true,
            when_false,
        } => {
            f(condition);
            f(when_true);
            f(when_false);
        }
        NodeData::Yield { expression, .. } => opt!(expression),
        NodeData::Class {
            name,
            type_parameters,
            heritage_clauses,
            members,
        } => {
            opt!(name);
            list!(type_parameters);
            list!(heritage_clauses);
            list!(members);
        }
        NodeData::ExpressionWithTypeArguments {
            expression,
            type_arguments,
        } => {
            f(expression);
            list!(type_arguments);
        }
        NodeData::TypeAssertion { expression, type_node } => {
            f(expression);
            f(type_node);
        }
        NodeData::MetaProperty { name, .. } => f(name),
        NodeData::Statements { statements } => list!(statements),
        NodeData::VariableStatement { declaration_list } => f(declaration_list),
        NodeData::If {
            expression,
            then_statement,
            else_statement,
        } => {
            f(expression);
            f(then_statement);
            opt!(else_statement);
        }
        NodeData::Do { statement, expression } => {
            f(statement);
            f(expression);
        }
        NodeData::While { expression, statement } | NodeData::With { expression, statement } => {
            f(expression);
            f(statement);
        }
        NodeData::For {
            initializer,
            condition,
            incrementor,
            statement,
        } => {
            opt!(initializer);
            opt!(condition);
            opt!(incrementor);
            f(statement);
        }
        NodeData::ForInOrOf {
            initializer,
            expression,
            statement,
            ..
        } => {
            f(initializer);
            f(expression);
            f(statement);
        }
        NodeData::Jump { label } => opt!(label),
        NodeData::Return { expression } => opt!(expression),
        NodeData::Switch { expression, case_block } => {
            f(expression);
            f(case_block);
        }
        NodeData::CaseBlock { clauses } => list!(clauses),
        NodeData::Labeled { label, statement } => {
            f(label);
            f(statement);
        }
        NodeData::Try {
            try_block,
            catch_clause,
            finally_block,
        } => {
            f(try_block);
            opt!(catch_clause);
            opt!(finally_block);
        }
        NodeData::VariableDeclarationList { declarations } => list!(declarations),
        NodeData::Interface {
            name,
            type_parameters,
            heritage_clauses,
            members,
        } => {
            f(name);
            list!(type_parameters);
            list!(heritage_clauses);
            list!(members);
        }
        NodeData::TypeAlias {
            name,
            type_parameters,
            type_node,
        } => {
            f(name);
            list!(type_parameters);
            opt!(type_node);
        }
        NodeData::Enum { name, members } => {
            f(name);
            list!(members);
        }
        NodeData::Module { name, body } => {
            f(name);
            opt!(body);
        }
        NodeData::NamedDeclaration { name } => f(name),
        NodeData::ImportEquals {
            name,
            module_reference,
            ..
        } => {
            f(name);
            f(module_reference);
        }
        NodeData::Import {
            import_clause,
            module_specifier,
        } => {
            opt!(import_clause);
            f(module_specifier);
        }
        NodeData::ImportClause {
            name, named_bindings, ..
        } => {
            opt!(name);
            opt!(named_bindings);
        }
        NodeData::Specifier {
            property_name, name, ..
        } => {
            opt!(property_name);
            f(name);
        }
        NodeData::ExportDeclaration {
            export_clause,
            module_specifier,
            ..
        } => {
            opt!(export_clause);
            opt!(module_specifier);
        }
        NodeData::CaseClause { expression, statements } => {
            opt!(expression);
            list!(statements);
        }
        NodeData::HeritageClause { types, .. } => list!(types),
        NodeData::CatchClause {
            variable_declaration,
            block,
        } => {
            opt!(variable_declaration);
            f(block);
        }
        NodeData::PropertyAssignment { name, initializer } => {
            f(name);
            f(initializer);
        }
        NodeData::ShorthandPropertyAssignment {
            name,
            object_assignment_initializer,
        } => {
            f(name);
            opt!(object_assignment_initializer);
        }
        NodeData::EnumMember { name, initializer } => {
            f(name);
            opt!(initializer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::AstBuilder;
    use crate::SyntaxKind;

    #[test]
    fn test_children_in_source_order() {
        let mut b = AstBuilder::new();
        let a = b.ident("a");
        let one = b.num("1");
        let two = b.num("2");
        let cond = b.conditional(a, one, two);
        assert_eq!(children(b.arena(), cond), vec![a, one, two]);
    }

    #[test]
    fn test_do_statement_visits_body_before_condition() {
        let mut b = AstBuilder::new();
        let body = b.block(vec![]);
        let cond = b.ident("x");
        let stmt = b.do_stmt(body, cond);
        assert_eq!(children(b.arena(), stmt), vec![body, cond]);
        assert_eq!(b.arena().kind(stmt), SyntaxKind::DoStatement);
    }

    #[test]
    fn test_leaf_has_no_children() {
        let mut b = AstBuilder::new();
        let id = b.ident("leaf");
        let mut count = 0;
        for_each_child(b.arena(), id, |_| count += 1);
        assert_eq!(count, 0, "Expected identifier to have no children, got {}", count);
    }
}
