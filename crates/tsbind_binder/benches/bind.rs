use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tsbind_ast::{AstBuilder, NodeFlags, SourceFile, SyntaxKind};
use tsbind_binder::bind_source_file;
use tsbind_options::CompilerOptions;

/// `count` functions, each with a loop, a branch and a few locals.
fn build_file(count: usize) -> SourceFile {
    let mut b = AstBuilder::new();
    let mut statements = Vec::with_capacity(count + 1);

    let shared = b.var_decl("total", None);
    statements.push(b.var_stmt(NodeFlags::LET, vec![shared]));

    for i in 0..count {
        let p = b.param("n");

        let zero = b.num("0");
        let acc = b.var_decl("acc", Some(zero));
        let locals = b.var_stmt(NodeFlags::LET, vec![acc]);

        let n = b.ident("n");
        let zero = b.num("0");
        let cond = b.binary(n, SyntaxKind::GreaterThanToken, zero);
        let acc = b.ident("acc");
        let n = b.ident("n");
        let add = b.binary(acc, SyntaxKind::PlusEqualsToken, n);
        let add = b.expr_stmt(add);
        let n = b.ident("n");
        let dec = b.postfix(n, SyntaxKind::MinusMinusToken);
        let dec = b.expr_stmt(dec);
        let body = b.block(vec![add, dec]);
        let loop_stmt = b.while_stmt(cond, body);

        let acc = b.ident("acc");
        let limit = b.num("100");
        let over = b.binary(acc, SyntaxKind::GreaterThanToken, limit);
        let acc = b.ident("acc");
        let early = b.return_stmt(Some(acc));
        let branch = b.if_stmt(over, early, None);

        let total = b.ident("total");
        let acc = b.ident("acc");
        let store = b.assign(total, acc);
        let store = b.expr_stmt(store);
        let acc = b.ident("acc");
        let ret = b.return_stmt(Some(acc));

        let body = b.block(vec![locals, loop_stmt, branch, store, ret]);
        let name = format!("f{i}");
        statements.push(b.function_decl(Some(&name), vec![p], Some(body)));
    }

    b.finish("bench.ts", statements)
}

fn bench_bind_small(c: &mut Criterion) {
    let file = build_file(10);
    let options = CompilerOptions::default();
    c.bench_function("bind_small", |b| {
        b.iter(|| bind_source_file(black_box(&file), black_box(&options)))
    });
}

fn bench_bind_large(c: &mut Criterion) {
    let file = build_file(1000);
    let options = CompilerOptions {
        always_strict: Some(true),
        ..Default::default()
    };
    c.bench_function("bind_large", |b| {
        b.iter(|| bind_source_file(black_box(&file), black_box(&options)))
    });
}

criterion_group!(benches, bench_bind_small, bench_bind_large);
criterion_main!(benches);
