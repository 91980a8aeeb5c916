//! Strict-mode diagnostics.

use tsbind_ast::{AstBuilder, NodeFlags, SourceFile, SyntaxKind};
use tsbind_binder::{bind_source_file, Binding};
use tsbind_options::{CompilerOptions, ScriptTarget};

fn always_strict() -> CompilerOptions {
    CompilerOptions {
        always_strict: Some(true),
        ..Default::default()
    }
}

fn codes(binding: &Binding) -> Vec<u32> {
    binding.diagnostics().iter().map(|d| d.code).collect()
}

/// `function f(eval) {}`, optionally `declare`d.
fn function_with_eval_parameter(ambient: bool) -> SourceFile {
    let mut b = AstBuilder::new();
    let p = b.param("eval");
    let body = if ambient { None } else { Some(b.block(vec![])) };
    let mut f = b.function_decl(Some("f"), vec![p], body);
    if ambient {
        f = b.declare(f);
    }
    b.finish("test.ts", vec![f])
}

// ============================================================================
// eval and arguments
// ============================================================================

#[test]
fn test_eval_parameter_is_an_error_in_strict_code() {
    let file = function_with_eval_parameter(false);
    let binding = bind_source_file(&file, &always_strict());
    assert_eq!(codes(&binding), vec![1100]);
    assert_eq!(binding.diagnostics().diagnostics()[0].message_text, "Invalid use of 'eval' in strict mode.");
}

#[test]
fn test_eval_parameter_is_allowed_in_ambient_code() {
    let file = function_with_eval_parameter(true);
    let binding = bind_source_file(&file, &always_strict());
    assert!(binding.diagnostics().is_empty(), "Expected no errors, got {:?}", codes(&binding));
}

#[test]
fn test_eval_parameter_is_allowed_in_sloppy_code() {
    let file = function_with_eval_parameter(false);
    let binding = bind_source_file(&file, &CompilerOptions::default());
    assert!(binding.diagnostics().is_empty());
}

#[test]
fn test_use_strict_prologue_enables_checks() {
    let mut b = AstBuilder::new();
    let directive = b.use_strict();
    let target = b.ident("arguments");
    let zero = b.num("0");
    let assign = b.assign(target, zero);
    let stmt = b.expr_stmt(assign);
    let file = b.finish("test.ts", vec![directive, stmt]);

    let binding = bind_source_file(&file, &CompilerOptions::default());
    assert_eq!(codes(&binding), vec![1100]);
}

#[test]
fn test_prologue_after_other_statements_is_ignored() {
    let mut b = AstBuilder::new();
    let x = b.ident("x");
    let first = b.expr_stmt(x);
    let directive = b.use_strict();
    let target = b.ident("eval");
    let zero = b.num("0");
    let assign = b.assign(target, zero);
    let stmt = b.expr_stmt(assign);
    let file = b.finish("test.ts", vec![first, directive, stmt]);

    let binding = bind_source_file(&file, &CompilerOptions::default());
    assert!(binding.diagnostics().is_empty());
}

#[test]
fn test_module_message_mentions_modules() {
    let mut b = AstBuilder::new();
    let decl = b.var_decl("eval", None);
    let stmt = b.var_stmt(NodeFlags::LET, vec![decl]);
    let stmt = b.export(stmt);
    let file = b.finish("mod.ts", vec![stmt]);

    let binding = bind_source_file(&file, &CompilerOptions::default());
    assert_eq!(codes(&binding), vec![1215]);
}

#[test]
fn test_class_body_is_strict() {
    let mut b = AstBuilder::new();
    let decl = b.var_decl("arguments", None);
    let var = b.var_stmt(NodeFlags::NONE, vec![decl]);
    let body = b.block(vec![var]);
    let name = b.ident("m");
    let method = b.method(name, vec![], Some(body));
    let class = b.class_decl(Some("C"), vec![method]);
    let file = b.finish("test.ts", vec![class]);

    let binding = bind_source_file(&file, &CompilerOptions::default());
    assert_eq!(codes(&binding), vec![1210]);
}

// ============================================================================
// Statements and operators
// ============================================================================

#[test]
fn test_with_and_delete_in_strict_code() {
    let mut b = AstBuilder::new();
    let scope = b.ident("scope");
    let body = b.block(vec![]);
    let with = b.with_stmt(scope, body);
    let x = b.ident("x");
    let delete = b.delete(x);
    let delete_stmt = b.expr_stmt(delete);
    let file = b.finish("test.ts", vec![with, delete_stmt]);

    let binding = bind_source_file(&file, &always_strict());
    assert_eq!(codes(&binding), vec![1101, 1102]);

    let with_span = binding.diagnostics().diagnostics()[0].span.unwrap();
    assert_eq!(&file.text[with_span.to_range()], "with");
    let delete_span = binding.diagnostics().diagnostics()[1].span.unwrap();
    assert_eq!(&file.text[delete_span.to_range()], "x");
}

#[test]
fn test_increment_of_arguments() {
    let mut b = AstBuilder::new();
    let target = b.ident("arguments");
    let inc = b.postfix(target, SyntaxKind::PlusPlusToken);
    let stmt = b.expr_stmt(inc);
    let file = b.finish("test.ts", vec![stmt]);

    let binding = bind_source_file(&file, &always_strict());
    assert_eq!(codes(&binding), vec![1100]);
}

#[test]
fn test_function_in_block_depends_on_target() {
    let build = || {
        let mut b = AstBuilder::new();
        let body = b.block(vec![]);
        let g = b.function_decl(Some("g"), vec![], Some(body));
        let block = b.block(vec![g]);
        let cond = b.ident("ok");
        let if_stmt = b.if_stmt(cond, block, None);
        b.finish("test.ts", vec![if_stmt])
    };

    let es5 = bind_source_file(&build(), &always_strict());
    assert_eq!(codes(&es5), vec![1250]);

    let options = CompilerOptions {
        target: Some(ScriptTarget::ES2015),
        ..always_strict()
    };
    let es2015 = bind_source_file(&build(), &options);
    assert!(es2015.diagnostics().is_empty());
}

#[test]
fn test_strict_function_in_block_is_block_scoped() {
    let mut b = AstBuilder::new();
    let body = b.block(vec![]);
    let g = b.function_decl(Some("g"), vec![], Some(body));
    let block = b.block(vec![g]);
    let file = b.finish("test.ts", vec![block]);

    let options = CompilerOptions {
        target: Some(ScriptTarget::ES2015),
        ..always_strict()
    };
    let binding = bind_source_file(&file, &options);
    assert!(binding.local(block, "g").is_some());
    assert!(binding.local(file.root, "g").is_none());
}

#[test]
fn test_label_on_declaration_in_strict_code() {
    let mut b = AstBuilder::new();
    let decl = b.var_decl("x", None);
    let stmt = b.var_stmt(NodeFlags::LET, vec![decl]);
    let labeled = b.labeled("here", stmt);
    let file = b.finish("test.ts", vec![labeled]);

    let options = CompilerOptions {
        target: Some(ScriptTarget::ES2015),
        allow_unused_labels: Some(true),
        ..always_strict()
    };
    let binding = bind_source_file(&file, &options);
    assert_eq!(codes(&binding), vec![1344]);
}

// ============================================================================
// Reserved words
// ============================================================================

#[test]
fn test_future_reserved_word_in_strict_code() {
    let mut b = AstBuilder::new();
    let decl = b.var_decl("package", None);
    let stmt = b.var_stmt(NodeFlags::NONE, vec![decl]);
    let file = b.finish("test.ts", vec![stmt]);

    let sloppy = bind_source_file(&file, &CompilerOptions::default());
    assert!(sloppy.diagnostics().is_empty());
    let strict = bind_source_file(&file, &always_strict());
    assert_eq!(codes(&strict), vec![1212]);
}

#[test]
fn test_reserved_word_as_member_name_is_fine() {
    let mut b = AstBuilder::new();
    let name = b.ident("package");
    let field = b.property_decl(name, None);
    let class = b.class_decl(Some("C"), vec![field]);
    let file = b.finish("test.ts", vec![class]);

    let binding = bind_source_file(&file, &always_strict());
    assert!(binding.diagnostics().is_empty(), "Expected no errors, got {:?}", codes(&binding));
}

#[test]
fn test_private_constructor_name_is_reserved() {
    let mut b = AstBuilder::new();
    let name = b.private_ident("#constructor");
    let field = b.property_decl(name, None);
    let class = b.class_decl(Some("C"), vec![field]);
    let file = b.finish("test.ts", vec![class]);

    let binding = bind_source_file(&file, &CompilerOptions::default());
    assert_eq!(codes(&binding), vec![18012]);
}
