//! Program-level binding.

use tsbind_ast::{AstBuilder, NodeFlags, SourceFile};
use tsbind_binder::{bind_program, BoundFile};
use tsbind_options::CompilerOptions;

/// `let a; let a;`
fn redeclared(file_name: &str) -> SourceFile {
    let mut b = AstBuilder::new();
    let first = b.var_decl("a", None);
    let s1 = b.var_stmt(NodeFlags::LET, vec![first]);
    let second = b.var_decl("a", None);
    let s2 = b.var_stmt(NodeFlags::LET, vec![second]);
    b.finish(file_name, vec![s1, s2])
}

/// `function f() { return; g(); }`
fn dead_code(file_name: &str) -> SourceFile {
    let mut b = AstBuilder::new();
    let ret = b.return_stmt(None);
    let callee = b.ident("g");
    let call = b.call(callee, vec![]);
    let stmt = b.expr_stmt(call);
    let body = b.block(vec![ret, stmt]);
    let f = b.function_decl(Some("f"), vec![], Some(body));
    b.finish(file_name, vec![f])
}

// ============================================================================
// BoundFile
// ============================================================================

#[test]
fn test_bound_file_binds_once() {
    let file = BoundFile::new(dead_code("a.ts"));
    assert!(!file.is_bound());
    assert!(file.binding().is_none());

    let first = file.bind(&CompilerOptions::default());
    assert_eq!(first.suggestions().len(), 1);
    assert!(file.is_bound());

    let strict = CompilerOptions {
        allow_unreachable_code: Some(false),
        ..Default::default()
    };
    let second = file.bind(&strict);
    assert!(std::ptr::eq(first, second), "Expected the cached binding to be reused");
    assert!(second.diagnostics().is_empty());
}

// ============================================================================
// bind_program
// ============================================================================

#[test]
fn test_program_stats_follow_input_order() {
    let files: Vec<BoundFile> = (0..8)
        .map(|i| {
            let name = format!("file{i}.ts");
            BoundFile::new(if i % 2 == 0 { redeclared(&name) } else { dead_code(&name) })
        })
        .collect();

    let stats = bind_program(&files, &CompilerOptions::default());
    let names: Vec<&str> = stats.files.iter().map(|f| f.file_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["file0.ts", "file1.ts", "file2.ts", "file3.ts", "file4.ts", "file5.ts", "file6.ts", "file7.ts"]
    );
    for (i, file) in stats.files.iter().enumerate() {
        if i % 2 == 0 {
            assert_eq!(file.error_count, 2, "Expected two errors in {}, got {}", file.file_name, file.error_count);
            assert_eq!(file.suggestion_count, 0);
        } else {
            assert_eq!(file.error_count, 0);
            assert_eq!(file.suggestion_count, 1);
        }
        assert!(file.flow_node_count > 0);
    }

    assert!(files.iter().all(BoundFile::is_bound));
    assert_eq!(stats.error_count(), 8);
    assert_eq!(stats.suggestion_count(), 4);
    assert!(stats.has_errors());
}

#[test]
fn test_program_without_errors() {
    let files = vec![BoundFile::new(dead_code("only.ts"))];
    let stats = bind_program(&files, &CompilerOptions::default());
    assert!(!stats.has_errors());
    assert_eq!(stats.symbol_count(), files[0].binding().map_or(0, |b| b.symbol_count()));
}

#[test]
fn test_empty_program() {
    let stats = bind_program(&[], &CompilerOptions::default());
    assert!(stats.files.is_empty());
    assert_eq!(stats.symbol_count(), 0);
    assert!(!stats.has_errors());
}
