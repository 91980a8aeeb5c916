//! Syntactic predicates deciding which expressions get condition and
//! assignment flow nodes.
//!
//! A reference is narrowable when the checker could later narrow its type;
//! only conditions that mention such a reference are worth a flow node.

use tsbind_ast::node::{NodeArena, NodeData};
use tsbind_ast::types::NodeId;
use tsbind_ast::utilities::{is_entity_name_expression, is_optional_chain, is_string_literal_like, is_string_or_numeric_literal_like};
use tsbind_ast::SyntaxKind;

/// `x`, `this`, `super`, `import.meta`, property and literal element access
/// chains over those, and assignments whose target is such a reference.
pub fn is_narrowable_reference(arena: &NodeArena, expr: NodeId) -> bool {
    match (arena.kind(expr), arena.data(expr)) {
        (SyntaxKind::Identifier | SyntaxKind::ThisKeyword | SyntaxKind::SuperKeyword | SyntaxKind::MetaProperty, _) => {
            true
        }
        (SyntaxKind::PropertyAccessExpression, NodeData::PropertyAccess { expression, .. })
        | (SyntaxKind::ParenthesizedExpression | SyntaxKind::NonNullExpression, NodeData::Wrapped { expression }) => {
            is_narrowable_reference(arena, *expression)
        }
        (
            SyntaxKind::ElementAccessExpression,
            NodeData::ElementAccess {
                expression,
                argument_expression,
                ..
            },
        ) => {
            is_string_or_numeric_literal_like(arena.kind(*argument_expression))
                || (is_entity_name_expression(arena, *argument_expression)
                    && is_narrowable_reference(arena, *expression))
        }
        (SyntaxKind::BinaryExpression, NodeData::Binary { left, operator, right }) => {
            (*operator == SyntaxKind::CommaToken && is_narrowable_reference(arena, *right))
                || (operator.is_assignment_operator() && is_left_hand_side_expression(arena, *left))
        }
        _ => false,
    }
}

/// A narrowable reference, or an optional chain built on one.
pub fn contains_narrowable_reference(arena: &NodeArena, expr: NodeId) -> bool {
    if is_narrowable_reference(arena, expr) {
        return true;
    }
    if is_optional_chain(arena, expr) {
        if let Some(inner) = arena.expression(expr) {
            return contains_narrowable_reference(arena, inner);
        }
    }
    false
}

/// Operand of `instanceof`, `===` and friends: looks through parentheses,
/// plain assignments and comma expressions.
pub fn is_narrowable_operand(arena: &NodeArena, expr: NodeId) -> bool {
    match (arena.kind(expr), arena.data(expr)) {
        (SyntaxKind::ParenthesizedExpression, NodeData::Wrapped { expression }) => {
            is_narrowable_operand(arena, *expression)
        }
        (SyntaxKind::BinaryExpression, NodeData::Binary { left, operator, right }) => match operator {
            SyntaxKind::EqualsToken => is_narrowable_operand(arena, *left),
            SyntaxKind::CommaToken => is_narrowable_operand(arena, *right),
            _ => contains_narrowable_reference(arena, expr),
        },
        _ => contains_narrowable_reference(arena, expr),
    }
}

/// Whether a condition on `expr` can narrow anything.
pub fn is_narrowing_expression(arena: &NodeArena, expr: NodeId) -> bool {
    match (arena.kind(expr), arena.data(expr)) {
        (SyntaxKind::Identifier | SyntaxKind::ThisKeyword, _) => true,
        (SyntaxKind::PropertyAccessExpression | SyntaxKind::ElementAccessExpression, _) => {
            contains_narrowable_reference(arena, expr)
        }
        (SyntaxKind::CallExpression, _) => has_narrowable_argument(arena, expr),
        (
            SyntaxKind::ParenthesizedExpression | SyntaxKind::NonNullExpression | SyntaxKind::TypeOfExpression,
            NodeData::Wrapped { expression },
        ) => is_narrowing_expression(arena, *expression),
        (SyntaxKind::BinaryExpression, _) => is_narrowing_binary_expression(arena, expr),
        (SyntaxKind::PrefixUnaryExpression, NodeData::Unary { operator, operand }) => {
            *operator == SyntaxKind::ExclamationToken && is_narrowing_expression(arena, *operand)
        }
        _ => false,
    }
}

fn has_narrowable_argument(arena: &NodeArena, call: NodeId) -> bool {
    let NodeData::Call {
        expression, arguments, ..
    } = arena.data(call)
    else {
        return false;
    };
    if arguments.iter().any(|&argument| contains_narrowable_reference(arena, argument)) {
        return true;
    }
    match arena.data(*expression) {
        NodeData::PropertyAccess { expression: target, .. } => contains_narrowable_reference(arena, *target),
        _ => false,
    }
}

fn is_narrowing_binary_expression(arena: &NodeArena, expr: NodeId) -> bool {
    let NodeData::Binary { left, operator, right } = arena.data(expr) else {
        return false;
    };
    let (left, right) = (*left, *right);
    match operator {
        SyntaxKind::EqualsToken
        | SyntaxKind::BarBarEqualsToken
        | SyntaxKind::AmpersandAmpersandEqualsToken
        | SyntaxKind::QuestionQuestionEqualsToken => contains_narrowable_reference(arena, left),
        SyntaxKind::EqualsEqualsToken
        | SyntaxKind::ExclamationEqualsToken
        | SyntaxKind::EqualsEqualsEqualsToken
        | SyntaxKind::ExclamationEqualsEqualsToken => {
            is_narrowable_operand(arena, left)
                || is_narrowable_operand(arena, right)
                || is_narrowing_type_of_operands(arena, right, left)
                || is_narrowing_type_of_operands(arena, left, right)
                || (is_boolean_literal(arena, right) && is_narrowing_expression(arena, left))
                || (is_boolean_literal(arena, left) && is_narrowing_expression(arena, right))
        }
        SyntaxKind::InstanceOfKeyword => is_narrowable_operand(arena, left),
        SyntaxKind::InKeyword | SyntaxKind::CommaToken => is_narrowing_expression(arena, right),
        _ => false,
    }
}

/// `typeof x === "string"`.
fn is_narrowing_type_of_operands(arena: &NodeArena, type_of: NodeId, literal: NodeId) -> bool {
    match (arena.kind(type_of), arena.data(type_of)) {
        (SyntaxKind::TypeOfExpression, NodeData::Wrapped { expression }) => {
            is_narrowable_operand(arena, *expression) && is_string_literal_like(arena.kind(literal))
        }
        _ => false,
    }
}

fn is_boolean_literal(arena: &NodeArena, expr: NodeId) -> bool {
    matches!(arena.kind(expr), SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword)
}

/// Identifiers and the member/call-free expressions the parser treats as
/// left-hand sides.
pub fn is_left_hand_side_expression(arena: &NodeArena, expr: NodeId) -> bool {
    let kind = arena.kind(expr);
    tsbind_ast::utilities::is_left_hand_side_expression_kind(kind)
        || matches!(
            kind,
            SyntaxKind::Identifier
                | SyntaxKind::PrivateIdentifier
                | SyntaxKind::ThisKeyword
                | SyntaxKind::SuperKeyword
                | SyntaxKind::NullKeyword
                | SyntaxKind::TrueKeyword
                | SyntaxKind::FalseKeyword
                | SyntaxKind::NumericLiteral
                | SyntaxKind::BigIntLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::NoSubstitutionTemplateLiteral
                | SyntaxKind::RegularExpressionLiteral
                | SyntaxKind::ArrayLiteralExpression
                | SyntaxKind::ObjectLiteralExpression
                | SyntaxKind::ParenthesizedExpression
                | SyntaxKind::FunctionExpression
                | SyntaxKind::ClassExpression
                | SyntaxKind::NonNullExpression
        )
}

/// `a`, `this.a.b`, `(a).b`: a possible assertion call target.
pub fn is_dotted_name(arena: &NodeArena, expr: NodeId) -> bool {
    match (arena.kind(expr), arena.data(expr)) {
        (SyntaxKind::Identifier | SyntaxKind::ThisKeyword | SyntaxKind::SuperKeyword | SyntaxKind::MetaProperty, _) => {
            true
        }
        (SyntaxKind::PropertyAccessExpression, NodeData::PropertyAccess { expression, .. })
        | (SyntaxKind::ParenthesizedExpression, NodeData::Wrapped { expression }) => is_dotted_name(arena, *expression),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsbind_ast::builder::AstBuilder;

    #[test]
    fn test_identifier_and_property_chain_are_narrowable() {
        let mut b = AstBuilder::new();
        let x = b.ident("x");
        let access = b.prop(x, "y");
        assert!(is_narrowable_reference(b.arena(), access));
        assert!(is_narrowing_expression(b.arena(), access));
    }

    #[test]
    fn test_element_access_with_literal_key() {
        let mut b = AstBuilder::new();
        let x = b.ident("x");
        let key = b.string("k");
        let access = b.elem(x, key);
        assert!(is_narrowable_reference(b.arena(), access));

        let call = b.call(x, vec![]);
        let dynamic_key = b.elem(call, x);
        assert!(
            !is_narrowable_reference(b.arena(), dynamic_key),
            "Expected element access on a call with an identifier key to be opaque"
        );
    }

    #[test]
    fn test_typeof_comparison_narrows() {
        let mut b = AstBuilder::new();
        let x = b.ident("x");
        let type_of = b.type_of(x);
        let lit = b.string("string");
        let cmp = b.binary(type_of, SyntaxKind::EqualsEqualsEqualsToken, lit);
        assert!(is_narrowing_expression(b.arena(), cmp));
    }

    #[test]
    fn test_literal_comparison_does_not_narrow() {
        let mut b = AstBuilder::new();
        let one = b.num("1");
        let two = b.num("2");
        let cmp = b.binary(one, SyntaxKind::EqualsEqualsEqualsToken, two);
        assert!(!is_narrowing_expression(b.arena(), cmp));
        let not = b.prefix(SyntaxKind::ExclamationToken, cmp);
        assert!(!is_narrowing_expression(b.arena(), not));
    }

    #[test]
    fn test_call_with_reference_argument_narrows() {
        let mut b = AstBuilder::new();
        let f = b.ident("isString");
        let x = b.ident("x");
        let call = b.call(f, vec![x]);
        assert!(is_narrowing_expression(b.arena(), call));
        let g = b.ident("g");
        let one = b.num("1");
        let opaque = b.call(g, vec![one]);
        assert!(!is_narrowing_expression(b.arena(), opaque));
    }

    #[test]
    fn test_bare_super_is_not_a_narrowing_condition() {
        let mut b = AstBuilder::new();
        let sup = b.super_();
        assert!(is_narrowable_reference(b.arena(), sup));
        assert!(
            !is_narrowing_expression(b.arena(), sup),
            "Expected a bare 'super' condition to get no flow node"
        );
        let this = b.this();
        assert!(is_narrowing_expression(b.arena(), this));
        let sup = b.super_();
        let access = b.prop(sup, "x");
        assert!(is_narrowing_expression(b.arena(), access));
    }

    #[test]
    fn test_optional_chain_contains_reference() {
        let mut b = AstBuilder::new();
        let a = b.ident("a");
        let chain = b.prop_chain(a, "b", true);
        assert!(contains_narrowable_reference(b.arena(), chain));
    }

    #[test]
    fn test_dotted_name() {
        let mut b = AstBuilder::new();
        let this = b.this();
        let access = b.prop(this, "assert");
        assert!(is_dotted_name(b.arena(), access));
        let f = b.ident("f");
        let call = b.call(f, vec![]);
        let on_call = b.prop(call, "g");
        assert!(!is_dotted_name(b.arena(), on_call));
    }
}
