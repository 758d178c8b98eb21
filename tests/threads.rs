use bramble::prelude::*;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Barrier,
};

fn assert_send_sync<X: Send + Sync>() {}

#[test]
fn grammars_are_send_and_sync() {
    assert_send_sync::<Rule<char, usize>>();
    assert_send_sync::<Parser<char, usize>>();
    #[cfg(feature = "regex")]
    assert_send_sync::<Tokenizer<CharOffset, char>>();
}

// Counts nesting depth of parentheses around an `x`. The nested occurrence goes through `lazy`, whose supplier bumps
// `built` every time it runs.
fn nesting(built: &'static AtomicUsize) -> Rule<char, usize> {
    let nested: Rule<char, usize> = declare();
    let inner = lazy({
        let nested = nested.clone();
        move || {
            built.fetch_add(1, Ordering::SeqCst);
            nested.clone()
        }
    });
    nested.define(one_of([
        just('x').to(0),
        seq((just('('), inner, just(')')), |(_, depth, _)| depth + 1),
    ]));
    seq((nested, end_of_input()), |(depth, ())| depth)
}

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

#[test]
fn parser_shared_between_threads() {
    static BUILT: AtomicUsize = AtomicUsize::new(0);
    let parser = Arc::new(Parser::new(nesting(&BUILT)));

    let handles: Vec<_> = ["x", "(x)", "((x))", "(((x)))", "((x)"]
        .into_iter()
        .map(|src| {
            let parser = parser.clone();
            std::thread::spawn(move || parser.parse(chars(src)).map_err(|e| e.consumed()))
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results, vec![Ok(0), Ok(1), Ok(2), Ok(3), Err(4)]);
    assert_eq!(BUILT.load(Ordering::SeqCst), 1);
}

#[test]
fn lazy_rule_resolves_once_under_contention() {
    const THREADS: usize = 8;
    static BUILT: AtomicUsize = AtomicUsize::new(0);
    // Not analysed up front, so the first parses race to resolve the lazy rule.
    let rule = nesting(&BUILT);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|depth| {
            let rule = rule.clone();
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                let src = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
                barrier.wait();
                parse(&rule, chars(&src))
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results, (0..THREADS).map(Ok).collect::<Vec<Result<usize, ParseErrors<char>>>>());
    assert_eq!(BUILT.load(Ordering::SeqCst), 1);
}
