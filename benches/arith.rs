use bramble::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Int(i64),
    Add,
    Sub,
    Mul,
    Div,
    Open,
    Close,
    Space,
}

fn tokenizer() -> Tokenizer<NoPosition, Token> {
    Tokenizer::builder(NoPosition)
        .pattern(r"\d+", |m| Token::Int(m.as_str().parse().unwrap_or_default()))
        .pattern(r"\+", |_| Token::Add)
        .pattern(r"-", |_| Token::Sub)
        .pattern(r"\*", |_| Token::Mul)
        .pattern(r"/", |_| Token::Div)
        .pattern(r"\(", |_| Token::Open)
        .pattern(r"\)", |_| Token::Close)
        .pattern(r"\s+", |_| Token::Space)
        .build()
        .unwrap()
}

// Right-associative, so the grammar is free of left recursion.
fn grammar() -> Parser<Token, i64> {
    let expr: Rule<Token, i64> = declare();

    let atom = one_of([
        select(|t: &Token| match t {
            Token::Int(n) => Some(*n),
            _ => None,
        }),
        seq((just(Token::Open), expr.clone(), just(Token::Close)), |(_, x, _)| x),
    ]);
    let product = recursive(|product| {
        let op = one_of([just(Token::Mul), just(Token::Div)]);
        one_of([
            seq((atom.clone(), op, product), |(l, op, r)| match op {
                Token::Mul => l * r,
                _ => l.checked_div(r).unwrap_or_default(),
            }),
            atom,
        ])
    });
    let op = one_of([just(Token::Add), just(Token::Sub)]);
    expr.define(one_of([
        seq((product.clone(), op, expr.clone()), |(l, op, r)| match op {
            Token::Add => l + r,
            _ => l - r,
        }),
        product,
    ]));

    Parser::new(seq((expr, end_of_input()), |(x, ())| x))
}

// A flat chain of terms. Deep nesting backtracks exponentially, since nothing is memoized.
fn source(terms: usize) -> String {
    (0..terms)
        .map(|i| format!("({} - 1) * 2", i))
        .collect::<Vec<_>>()
        .join(" + ")
}

fn bench_tokenize(c: &mut Criterion) {
    let tokenizer = tokenizer();
    let src = source(256);
    c.bench_function("tokenize", move |b| {
        b.iter(|| black_box(tokenizer.tokenize(black_box(src.as_str())).count()))
    });
}

fn bench_parse(c: &mut Criterion) {
    let tokenizer = tokenizer();
    let parser = grammar();
    let mut group = c.benchmark_group("parse");
    for terms in [4, 16, 64] {
        let tokens: Vec<Token> = tokenizer
            .tokenize_values(source(terms))
            .filter_map(Result::ok)
            .filter(|t| *t != Token::Space)
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(terms), &tokens, |b, tokens| {
            b.iter(|| black_box(parser.parse(black_box(tokens.clone())).is_ok()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_parse);
criterion_main!(benches);
