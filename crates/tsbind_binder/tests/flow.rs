//! Control flow graph and reachability tests.

use tsbind_ast::utilities::skip_trivia;
use tsbind_ast::{AstBuilder, FlowFlags, FlowNodeId, NodeFlags, NodeId, SourceFile, SyntaxKind};
use tsbind_binder::{bind_source_file, Binding, FlowNodeKind};
use tsbind_diagnostics::DiagnosticCategory;
use tsbind_options::CompilerOptions;

fn bind(file: &SourceFile) -> Binding {
    bind_source_file(file, &CompilerOptions::default())
}

fn bind_with(file: &SourceFile, options: CompilerOptions) -> Binding {
    bind_source_file(file, &options)
}

/// The assignment flow node recorded for `target`.
fn assignment_to(binding: &Binding, target: NodeId) -> Option<FlowNodeId> {
    binding
        .flow()
        .iter()
        .find(|(_, node)| matches!(node.kind, FlowNodeKind::Assignment { node, .. } if node == target))
        .map(|(id, _)| id)
}

/// The condition flow node with `flags` recorded for `expression`.
fn condition_on(binding: &Binding, expression: NodeId, flags: FlowFlags) -> Option<FlowNodeId> {
    binding
        .flow()
        .iter()
        .find(|(_, node)| {
            node.flags.contains(flags)
                && matches!(node.kind, FlowNodeKind::Condition { node: recorded, .. } if recorded == expression)
        })
        .map(|(id, _)| id)
}

/// The single loop label of a file with one loop.
fn only_loop_label(binding: &Binding) -> FlowNodeId {
    let labels: Vec<FlowNodeId> = binding
        .flow()
        .iter()
        .filter(|(_, node)| matches!(node.kind, FlowNodeKind::LoopLabel { .. }))
        .map(|(id, _)| id)
        .collect();
    assert_eq!(labels.len(), 1, "Expected one loop label, got {}", labels.len());
    labels[0]
}

/// `function f() { return; a(); b(); }`, returning the file and the two
/// dead statements.
fn dead_code_after_return() -> (SourceFile, NodeId, NodeId) {
    let mut b = AstBuilder::new();
    let ret = b.return_stmt(None);
    let a = b.ident("a");
    let call_a = b.call(a, vec![]);
    let first = b.expr_stmt(call_a);
    let c = b.ident("b");
    let call_b = b.call(c, vec![]);
    let second = b.expr_stmt(call_b);
    let body = b.block(vec![ret, first, second]);
    let f = b.function_decl(Some("f"), vec![], Some(body));
    (b.finish("test.ts", vec![f]), first, second)
}

// ============================================================================
// Reachability
// ============================================================================

#[test]
fn test_code_after_return_is_one_suggestion() {
    let (file, first, second) = dead_code_after_return();
    let binding = bind(&file);

    assert!(binding.diagnostics().is_empty());
    let suggestions = binding.suggestions();
    assert_eq!(suggestions.len(), 1, "Expected one unreachable range, got {}", suggestions.len());
    let suggestion = &suggestions[0];
    assert_eq!(suggestion.code, 7027);
    assert_eq!(suggestion.category, DiagnosticCategory::Suggestion);

    let span = suggestion.span.unwrap();
    assert_eq!(span.start, skip_trivia(&file.text, file.arena.range(first).pos));
    assert_eq!(span.end(), file.arena.range(second).end);
}

#[test]
fn test_unreachable_code_is_an_error_when_disallowed() {
    let (file, _, _) = dead_code_after_return();
    let options = CompilerOptions {
        allow_unreachable_code: Some(false),
        ..Default::default()
    };
    let binding = bind_with(&file, options);
    assert!(binding.suggestions().is_empty());
    let codes: Vec<u32> = binding.diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![7027]);
}

#[test]
fn test_unreachable_code_is_silent_when_allowed() {
    let (file, _, _) = dead_code_after_return();
    let options = CompilerOptions {
        allow_unreachable_code: Some(true),
        ..Default::default()
    };
    let binding = bind_with(&file, options);
    assert!(binding.suggestions().is_empty());
    assert!(binding.diagnostics().is_empty());
}

#[test]
fn test_hoisted_function_after_return_is_not_reported() {
    let mut b = AstBuilder::new();
    let ret = b.return_stmt(None);
    let inner_body = b.block(vec![]);
    let g = b.function_decl(Some("g"), vec![], Some(inner_body));
    let body = b.block(vec![ret, g]);
    let f = b.function_decl(Some("f"), vec![], Some(body));
    let file = b.finish("test.ts", vec![f]);

    let binding = bind(&file);
    assert!(binding.suggestions().is_empty(), "Expected no reports, got {:?}", binding.suggestions());
}

// ============================================================================
// Implicit returns
// ============================================================================

#[test]
fn test_return_flags() {
    let mut b = AstBuilder::new();
    let one = b.num("1");
    let ret = b.return_stmt(Some(one));
    let body = b.block(vec![ret]);
    let always = b.function_decl(Some("always"), vec![], Some(body));

    let c = b.param("c");
    let cond = b.ident("c");
    let two = b.num("2");
    let ret = b.return_stmt(Some(two));
    let if_stmt = b.if_stmt(cond, ret, None);
    let body = b.block(vec![if_stmt]);
    let sometimes = b.function_decl(Some("sometimes"), vec![c], Some(body));
    let file = b.finish("test.ts", vec![always, sometimes]);

    let binding = bind(&file);
    let flags = binding.binder_flags(always);
    assert!(!flags.intersects(NodeFlags::HAS_IMPLICIT_RETURN | NodeFlags::HAS_EXPLICIT_RETURN));
    assert!(binding.end_flow_of(always).is_none());

    let flags = binding.binder_flags(sometimes);
    assert!(
        flags.contains(NodeFlags::HAS_IMPLICIT_RETURN | NodeFlags::HAS_EXPLICIT_RETURN),
        "Expected implicit and explicit return, got {:?}",
        flags
    );
    assert!(binding.end_flow_of(sometimes).is_some());
}

// ============================================================================
// Conditions and assignments
// ============================================================================

#[test]
fn test_if_branch_sees_true_condition() {
    let mut b = AstBuilder::new();
    let x = b.ident("x");
    let a = b.ident("a");
    let use_a = b.expr_stmt(a);
    let then_block = b.block(vec![use_a]);
    let if_stmt = b.if_stmt(x, then_block, None);
    let file = b.finish("test.ts", vec![if_stmt]);

    let binding = bind(&file);
    let flow = binding.flow_node_of(a).unwrap();
    let node = binding.flow().get(flow);
    assert!(node.flags.contains(FlowFlags::TRUE_CONDITION), "Expected a true condition, got {:?}", node.flags);
    assert_eq!(node.node(), Some(x));
}

#[test]
fn test_else_branch_sees_false_condition() {
    // if (a) { a.b; } else { a.c; } done;
    let mut b = AstBuilder::new();
    let a = b.ident("a");
    let then_a = b.ident("a");
    let then_access = b.prop(then_a, "b");
    let then_stmt = b.expr_stmt(then_access);
    let then_block = b.block(vec![then_stmt]);
    let else_a = b.ident("a");
    let else_access = b.prop(else_a, "c");
    let else_stmt = b.expr_stmt(else_access);
    let else_block = b.block(vec![else_stmt]);
    let if_stmt = b.if_stmt(a, then_block, Some(else_block));
    let done = b.ident("done");
    let done_stmt = b.expr_stmt(done);
    let file = b.finish("test.ts", vec![if_stmt, done_stmt]);

    let binding = bind(&file);
    let graph = binding.flow();
    let when_true = condition_on(&binding, a, FlowFlags::TRUE_CONDITION).unwrap();
    let when_false = condition_on(&binding, a, FlowFlags::FALSE_CONDITION).unwrap();
    assert_eq!(binding.flow_node_of(then_access), Some(when_true));
    assert_eq!(binding.flow_node_of(else_access), Some(when_false));
    assert_eq!(graph.get(when_false).node(), Some(a));
    assert_eq!(graph.get(when_true).antecedent(), graph.get(when_false).antecedent());

    let after = binding.flow_node_of(done).unwrap();
    assert_eq!(graph.get(after).antecedents(), &[when_true, when_false]);
}

/// `if (a <op> b) { x; } else { y; }`, returning the file and the
/// identifiers `a`, `b`, `x` and `y`.
fn if_on_logical(operator: SyntaxKind) -> (SourceFile, [NodeId; 4]) {
    let mut b = AstBuilder::new();
    let a = b.ident("a");
    let right = b.ident("b");
    let condition = b.binary(a, operator, right);
    let x = b.ident("x");
    let x_stmt = b.expr_stmt(x);
    let then_block = b.block(vec![x_stmt]);
    let y = b.ident("y");
    let y_stmt = b.expr_stmt(y);
    let else_block = b.block(vec![y_stmt]);
    let if_stmt = b.if_stmt(condition, then_block, Some(else_block));
    (b.finish("test.ts", vec![if_stmt]), [a, right, x, y])
}

#[test]
fn test_and_condition_requires_both_operands() {
    let (file, [a, right, x, y]) = if_on_logical(SyntaxKind::AmpersandAmpersandToken);
    let binding = bind(&file);
    let graph = binding.flow();

    let a_true = condition_on(&binding, a, FlowFlags::TRUE_CONDITION).unwrap();
    let a_false = condition_on(&binding, a, FlowFlags::FALSE_CONDITION).unwrap();
    let b_true = condition_on(&binding, right, FlowFlags::TRUE_CONDITION).unwrap();
    let b_false = condition_on(&binding, right, FlowFlags::FALSE_CONDITION).unwrap();
    assert_eq!(binding.flow_node_of(right), Some(a_true), "Expected b to be evaluated only when a holds");
    assert_eq!(binding.flow_node_of(x), Some(b_true));
    assert_eq!(graph.get(b_true).antecedent(), Some(a_true));

    let else_flow = binding.flow_node_of(y).unwrap();
    assert_eq!(graph.get(else_flow).antecedents(), &[a_false, b_false]);
}

#[test]
fn test_or_condition_takes_either_operand() {
    let (file, [a, right, x, y]) = if_on_logical(SyntaxKind::BarBarToken);
    let binding = bind(&file);
    let graph = binding.flow();

    let a_true = condition_on(&binding, a, FlowFlags::TRUE_CONDITION).unwrap();
    let a_false = condition_on(&binding, a, FlowFlags::FALSE_CONDITION).unwrap();
    let b_true = condition_on(&binding, right, FlowFlags::TRUE_CONDITION).unwrap();
    let b_false = condition_on(&binding, right, FlowFlags::FALSE_CONDITION).unwrap();
    assert_eq!(binding.flow_node_of(right), Some(a_false));

    let then_flow = binding.flow_node_of(x).unwrap();
    assert_eq!(graph.get(then_flow).antecedents(), &[a_true, b_true]);
    assert_eq!(binding.flow_node_of(y), Some(b_false));
    assert_eq!(graph.get(b_false).antecedent(), Some(a_false));
}

#[test]
fn test_nullish_condition_evaluates_right_only_when_left_fails() {
    let (file, [a, right, x, y]) = if_on_logical(SyntaxKind::QuestionQuestionToken);
    let binding = bind(&file);
    let graph = binding.flow();

    let a_true = condition_on(&binding, a, FlowFlags::TRUE_CONDITION).unwrap();
    let a_false = condition_on(&binding, a, FlowFlags::FALSE_CONDITION).unwrap();
    assert_eq!(binding.flow_node_of(right), Some(a_false));
    let then_flow = binding.flow_node_of(x).unwrap();
    assert!(
        graph.get(then_flow).antecedents().contains(&a_true),
        "Expected the then branch to be reachable through a, got {:?}",
        graph.get(then_flow)
    );
    let b_false = condition_on(&binding, right, FlowFlags::FALSE_CONDITION).unwrap();
    assert_eq!(binding.flow_node_of(y), Some(b_false));
}

#[test]
fn test_optional_chain_condition_narrows_its_root() {
    // if (a?.b) { x; } else { y; }
    let mut b = AstBuilder::new();
    let a = b.ident("a");
    let chain = b.prop_chain(a, "b", true);
    let x = b.ident("x");
    let x_stmt = b.expr_stmt(x);
    let then_block = b.block(vec![x_stmt]);
    let y = b.ident("y");
    let y_stmt = b.expr_stmt(y);
    let else_block = b.block(vec![y_stmt]);
    let if_stmt = b.if_stmt(chain, then_block, Some(else_block));
    let file = b.finish("test.ts", vec![if_stmt]);

    let binding = bind(&file);
    let graph = binding.flow();
    let root_true = condition_on(&binding, a, FlowFlags::TRUE_CONDITION).unwrap();
    let root_false = condition_on(&binding, a, FlowFlags::FALSE_CONDITION).unwrap();
    let chain_true = condition_on(&binding, chain, FlowFlags::TRUE_CONDITION).unwrap();
    let chain_false = condition_on(&binding, chain, FlowFlags::FALSE_CONDITION).unwrap();

    assert_eq!(binding.flow_node_of(x), Some(chain_true));
    assert_eq!(graph.get(chain_true).antecedent(), Some(root_true));
    let else_flow = binding.flow_node_of(y).unwrap();
    assert_eq!(graph.get(else_flow).antecedents(), &[root_false, chain_false]);
}

#[test]
fn test_assignment_reaches_later_reference() {
    let mut b = AstBuilder::new();
    let decl = b.var_decl("x", None);
    let let_x = b.var_stmt(NodeFlags::LET, vec![decl]);
    let target = b.ident("x");
    let one = b.num("1");
    let assign = b.assign(target, one);
    let assign_stmt = b.expr_stmt(assign);
    let reference = b.ident("x");
    let use_stmt = b.expr_stmt(reference);
    let file = b.finish("test.ts", vec![let_x, assign_stmt, use_stmt]);

    let binding = bind(&file);
    let assignment = assignment_to(&binding, target).unwrap();
    assert_eq!(binding.flow_node_of(reference), Some(assignment));
}

#[test]
fn test_try_mutation_reaches_finally_through_exception_path() {
    // let x; try { x = 1; throw e; } finally { consume(x); }
    let mut b = AstBuilder::new();
    let decl = b.var_decl("x", None);
    let let_x = b.var_stmt(NodeFlags::LET, vec![decl]);
    let target = b.ident("x");
    let one = b.num("1");
    let assign = b.assign(target, one);
    let assign_stmt = b.expr_stmt(assign);
    let e = b.ident("e");
    let throw = b.throw_stmt(e);
    let try_block = b.block(vec![assign_stmt, throw]);
    let consume = b.ident("consume");
    let reference = b.ident("x");
    let call = b.call(consume, vec![reference]);
    let call_stmt = b.expr_stmt(call);
    let finally_block = b.block(vec![call_stmt]);
    let try_stmt = b.try_stmt(try_block, None, Some(finally_block));
    let file = b.finish("test.ts", vec![let_x, try_stmt]);

    let binding = bind(&file);
    let graph = binding.flow();
    let assignment = assignment_to(&binding, target).unwrap();
    let in_finally = binding.flow_node_of(reference).unwrap();
    assert!(graph.reaches(in_finally, assignment), "Expected the assignment to reach the finally block");

    // Every path through the try block throws.
    let end = binding.end_flow_of(file.root).unwrap();
    assert!(graph.is_unreachable(end));
}

#[test]
fn test_array_push_is_a_mutation() {
    let mut b = AstBuilder::new();
    let items = b.ident("items");
    let push = b.prop(items, "push");
    let one = b.num("1");
    let call = b.call(push, vec![one]);
    let stmt = b.expr_stmt(call);
    let file = b.finish("test.ts", vec![stmt]);

    let binding = bind(&file);
    let found = binding
        .flow()
        .iter()
        .any(|(_, node)| matches!(node.kind, FlowNodeKind::ArrayMutation { node, .. } if node == call));
    assert!(found, "Expected an array mutation node for items.push(1)");
}

// ============================================================================
// Loops
// ============================================================================

#[test]
fn test_while_loop_entry_is_first_antecedent() {
    // let x = 0; while (c) { x = 1; }
    let mut b = AstBuilder::new();
    let zero = b.num("0");
    let decl = b.var_decl("x", Some(zero));
    let let_x = b.var_stmt(NodeFlags::LET, vec![decl]);
    let c = b.ident("c");
    let target = b.ident("x");
    let one = b.num("1");
    let assign = b.assign(target, one);
    let assign_stmt = b.expr_stmt(assign);
    let body = b.block(vec![assign_stmt]);
    let while_stmt = b.while_stmt(c, body);
    let file = b.finish("test.ts", vec![let_x, while_stmt]);

    let binding = bind(&file);
    let graph = binding.flow();
    let label = only_loop_label(&binding);
    assert_eq!(binding.flow_node_of(c), Some(label));

    let entry = assignment_to(&binding, decl).unwrap();
    let back_edge = assignment_to(&binding, target).unwrap();
    assert_eq!(
        graph.get(label).antecedents(),
        &[entry, back_edge],
        "Expected the loop entry before the back edge"
    );
}

#[test]
fn test_do_loop_entry_is_first_antecedent() {
    // let x = 0; do { x = 1; } while (c);
    let mut b = AstBuilder::new();
    let zero = b.num("0");
    let decl = b.var_decl("x", Some(zero));
    let let_x = b.var_stmt(NodeFlags::LET, vec![decl]);
    let target = b.ident("x");
    let one = b.num("1");
    let assign = b.assign(target, one);
    let assign_stmt = b.expr_stmt(assign);
    let body = b.block(vec![assign_stmt]);
    let c = b.ident("c");
    let do_stmt = b.do_stmt(body, c);
    let file = b.finish("test.ts", vec![let_x, do_stmt]);

    let binding = bind(&file);
    let graph = binding.flow();
    let label = only_loop_label(&binding);
    let entry = assignment_to(&binding, decl).unwrap();
    let repeat = condition_on(&binding, c, FlowFlags::TRUE_CONDITION).unwrap();
    assert_eq!(graph.get(label).antecedents(), &[entry, repeat]);
    assert_eq!(graph.get(repeat).antecedent(), assignment_to(&binding, target));
}

#[test]
fn test_for_loop_incrementor_feeds_back_edge() {
    // for (let i = 0; i < n; i++) {}
    let mut b = AstBuilder::new();
    let zero = b.num("0");
    let decl = b.var_decl("i", Some(zero));
    let init = b.var_list(NodeFlags::LET, vec![decl]);
    let i = b.ident("i");
    let n = b.ident("n");
    let condition = b.binary(i, SyntaxKind::LessThanToken, n);
    let operand = b.ident("i");
    let incrementor = b.postfix(operand, SyntaxKind::PlusPlusToken);
    let body = b.block(vec![]);
    let for_stmt = b.for_stmt(Some(init), Some(condition), Some(incrementor), body);
    let file = b.finish("test.ts", vec![for_stmt]);

    let binding = bind(&file);
    let graph = binding.flow();
    let label = only_loop_label(&binding);
    assert_eq!(binding.flow_node_of(i), Some(label));
    let entry = assignment_to(&binding, decl).unwrap();
    let increment = assignment_to(&binding, operand).unwrap();
    assert_eq!(graph.get(label).antecedents(), &[entry, increment]);
}

#[test]
fn test_for_of_continue_and_break() {
    // for (const item of items) { if (skip) continue; if (stop) break; item; } done;
    let mut b = AstBuilder::new();
    let decl = b.var_decl("item", None);
    let init = b.var_list(NodeFlags::CONST, vec![decl]);
    let items = b.ident("items");
    let skip = b.ident("skip");
    let cont = b.continue_stmt(None);
    let skip_if = b.if_stmt(skip, cont, None);
    let stop = b.ident("stop");
    let brk = b.break_stmt(None);
    let stop_if = b.if_stmt(stop, brk, None);
    let item = b.ident("item");
    let item_stmt = b.expr_stmt(item);
    let body = b.block(vec![skip_if, stop_if, item_stmt]);
    let for_of = b.for_of(init, items, body);
    let done = b.ident("done");
    let done_stmt = b.expr_stmt(done);
    let file = b.finish("test.ts", vec![for_of, done_stmt]);

    let binding = bind(&file);
    let graph = binding.flow();
    let label = only_loop_label(&binding);
    let entry = binding.flow_node_of(items).unwrap();
    let continued = condition_on(&binding, skip, FlowFlags::TRUE_CONDITION).unwrap();
    let stopped = condition_on(&binding, stop, FlowFlags::TRUE_CONDITION).unwrap();
    let body_end = condition_on(&binding, stop, FlowFlags::FALSE_CONDITION).unwrap();

    assert_eq!(graph.get(label).antecedents(), &[entry, continued, body_end]);
    assert_eq!(binding.flow_node_of(item), Some(body_end));

    let after = binding.flow_node_of(done).unwrap();
    assert_eq!(graph.get(after).antecedents(), &[label, stopped]);
    assert!(!graph.is_unreachable(after));
}

// ============================================================================
// Switch
// ============================================================================

fn switch_in_function(with_default: bool) -> (SourceFile, NodeId) {
    let mut b = AstBuilder::new();
    let k = b.param("k");
    let subject = b.ident("k");
    let mut clauses = Vec::new();
    for value in ["1", "2"] {
        let test = b.num(value);
        let result = b.num(value);
        let ret = b.return_stmt(Some(result));
        clauses.push(b.case_clause(test, vec![ret]));
    }
    if with_default {
        let zero = b.num("0");
        let ret = b.return_stmt(Some(zero));
        clauses.push(b.default_clause(vec![ret]));
    }
    let switch = b.switch_stmt(subject, clauses);
    let body = b.block(vec![switch]);
    let f = b.function_decl(Some("f"), vec![k], Some(body));
    (b.finish("test.ts", vec![f]), switch)
}

#[test]
fn test_switch_without_default_may_be_exhaustive() {
    let (file, switch) = switch_in_function(false);
    let binding = bind(&file);
    assert!(binding.is_possibly_exhaustive(switch));
    let implicit_default = binding.flow().iter().any(|(_, node)| {
        matches!(
            node.kind,
            FlowNodeKind::SwitchClause { switch_statement, clause_start: 0, clause_end: 0, .. } if switch_statement == switch
        )
    });
    assert!(implicit_default, "Expected an implicit default clause node");
}

#[test]
fn test_switch_with_default_is_not_possibly_exhaustive() {
    let (file, switch) = switch_in_function(true);
    let binding = bind(&file);
    assert!(!binding.is_possibly_exhaustive(switch));
    assert_eq!(file.arena.kind(switch), SyntaxKind::SwitchStatement);
}

#[test]
fn test_fallthrough_recorded_only_when_checked() {
    let build = || {
        let mut b = AstBuilder::new();
        let subject = b.ident("k");
        let one = b.num("1");
        let a = b.ident("a");
        let call = b.call(a, vec![]);
        let body = b.expr_stmt(call);
        let first = b.case_clause(one, vec![body]);
        let brk = b.break_stmt(None);
        let second = b.default_clause(vec![brk]);
        let switch = b.switch_stmt(subject, vec![first, second]);
        (b.finish("test.ts", vec![switch]), first)
    };

    let (file, first) = build();
    assert!(bind(&file).fallthrough_flow_of(first).is_none());

    let (file, first) = build();
    let options = CompilerOptions {
        no_fallthrough_cases_in_switch: Some(true),
        ..Default::default()
    };
    assert!(bind_with(&file, options).fallthrough_flow_of(first).is_some());
}

// ============================================================================
// Labels
// ============================================================================

#[test]
fn test_unused_label_is_a_suggestion() {
    let mut b = AstBuilder::new();
    let x = b.ident("x");
    let stmt = b.expr_stmt(x);
    let labeled = b.labeled("outer", stmt);
    let file = b.finish("test.ts", vec![labeled]);

    let binding = bind(&file);
    assert!(binding.diagnostics().is_empty());
    assert_eq!(binding.suggestions().len(), 1);
    let suggestion = &binding.suggestions()[0];
    assert_eq!(suggestion.code, 7028);
    let span = suggestion.span.unwrap();
    assert_eq!(&file.text[span.to_range()], "outer");
}

#[test]
fn test_unused_label_is_an_error_when_disallowed() {
    let mut b = AstBuilder::new();
    let x = b.ident("x");
    let stmt = b.expr_stmt(x);
    let labeled = b.labeled("outer", stmt);
    let file = b.finish("test.ts", vec![labeled]);

    let options = CompilerOptions {
        allow_unused_labels: Some(false),
        ..Default::default()
    };
    let binding = bind_with(&file, options);
    assert!(binding.suggestions().is_empty());
    assert_eq!(binding.diagnostics().error_count(), 1);
}

#[test]
fn test_label_used_by_break_is_not_reported() {
    // outer: while (true) { break outer; }
    let mut b = AstBuilder::new();
    let brk = b.break_stmt(Some("outer"));
    let body = b.block(vec![brk]);
    let cond = b.bool_lit(true);
    let loop_stmt = b.while_stmt(cond, body);
    let labeled = b.labeled("outer", loop_stmt);
    let after = b.ident("done");
    let after_stmt = b.expr_stmt(after);
    let file = b.finish("test.ts", vec![labeled, after_stmt]);

    let binding = bind(&file);
    assert!(binding.suggestions().is_empty(), "Expected no reports, got {:?}", binding.suggestions());
    let flow = binding.flow_node_of(after).unwrap();
    assert!(!binding.flow().is_unreachable(flow), "Expected code after the labeled loop to be reachable");
}
