use bramble::prelude::*;

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

#[test]
fn every_split_is_an_outcome() {
    let a = just('a');
    let split = seq((repeat(a.clone()), repeat(a)), |(x, y)| (x.len(), y.len()));

    let outcomes = split.outcomes(chars("aaa"));
    let complete: Vec<_> = outcomes
        .iter()
        .filter(|result| result.consumed == 3)
        .filter_map(|result| result.outcome.clone().ok())
        .collect();
    assert_eq!(complete, vec![(0, 3), (1, 2), (2, 1), (3, 0)]);
}

#[test]
fn first_complete_parse_is_chosen() {
    let a = just('a');
    let split = seq((repeat(a.clone()), repeat(a), end_of_input()), |(x, y, ())| (x.len(), y.len()));
    assert_eq!(parse(&split, chars("aaa")), Ok((0, 3)));
}

#[test]
fn alternatives_share_their_input() {
    // Both alternatives match "ab", the second one only through a longer route.
    let direct = seq((just('a'), just('b')), |_| "direct");
    let spelled = seq((any(), any()), |_| "spelled");
    let either_way = one_of([direct, spelled]);

    let results: Vec<_> = either_way
        .outcomes(chars("ab"))
        .iter()
        .filter_map(|result| result.outcome.clone().ok())
        .collect();
    assert_eq!(results, vec!["direct", "spelled"]);
}

#[test]
fn outcomes_are_produced_lazily() {
    let a = just('a');
    let many = repeat(a);
    let outcomes = many.outcomes(chars("aaaa"));

    assert_eq!(outcomes.head().outcome, Ok(Vec::new()));
    assert!(!outcomes.is_forced());
}

#[test]
fn palindromes() {
    // pal := 'a' pal 'a' | 'b' pal 'b' | 'a' | 'b' | epsilon
    let pal = recursive(|pal| {
        one_of([
            seq((just('a'), pal.clone(), just('a')), |(_, n, _)| n + 2),
            seq((just('b'), pal, just('b')), |(_, n, _)| n + 2),
            just('a').to(1),
            just('b').to(1),
            epsilon().to(0),
        ])
    });
    let whole = seq((pal, end_of_input()), |(n, ())| n);

    assert_eq!(parse(&whole, chars("abba")), Ok(4));
    assert_eq!(parse(&whole, chars("ababa")), Ok(5));
    assert_eq!(parse(&whole, chars("")), Ok(0));

    let errors = parse(&whole, chars("abab")).unwrap_err();
    assert_eq!(errors.consumed(), 4);
    assert!(!errors.is_left_recursion());
}

#[cfg(feature = "either")]
#[test]
fn either_keeps_both_readings() {
    let digit = select(|c: &char| c.to_digit(10));
    let letter = terminal(|c: &char| c.is_alphabetic());
    let token = either(digit, letter);
    let tokens = seq((repeat(token), end_of_input()), |(tokens, ())| tokens);

    assert_eq!(
        parse(&tokens, chars("a1")),
        Ok(vec![either::Either::Right('a'), either::Either::Left(1)]),
    );
}
