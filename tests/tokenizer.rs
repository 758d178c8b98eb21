#![cfg(feature = "regex")]

use bramble::{
    lexer::{LexError, LexErrorKind},
    prelude::*,
};

#[derive(Copy, Clone, Debug, PartialEq)]
enum Type {
    Identifier,
    Integer,
    Float,
    Space,
}

#[derive(Clone, Debug, PartialEq)]
struct Token {
    ty: Type,
    value: String,
}

fn token(ty: Type, value: &str) -> Token {
    Token {
        ty,
        value: value.to_string(),
    }
}

fn tokenizer<K: PositionTracker>(tracker: K) -> Tokenizer<K, Token> {
    Tokenizer::builder(tracker)
        .pattern(r"\p{Alphabetic}[\p{Alphabetic}0-9]+", |m| token(Type::Identifier, m.as_str()))
        .pattern(r"\d+", |m| token(Type::Integer, m.as_str()))
        .pattern(r"\d*\.\d", |m| token(Type::Float, m.as_str()))
        .pattern(r"\s+", |m| token(Type::Space, m.as_str()))
        .build()
        .unwrap()
}

#[test]
fn simple() {
    let tokens: Vec<_> = tokenizer(CharOffset)
        .tokenize("foo bar 123 baz789 45.6 45 .6 hello")
        .collect::<Result<_, _>>()
        .unwrap();

    let expected = [
        (0, Type::Identifier, "foo", 3),
        (3, Type::Space, " ", 4),
        (4, Type::Identifier, "bar", 7),
        (7, Type::Space, " ", 8),
        (8, Type::Integer, "123", 11),
        (11, Type::Space, " ", 12),
        (12, Type::Identifier, "baz789", 18),
        (18, Type::Space, " ", 19),
        (19, Type::Float, "45.6", 23),
        (23, Type::Space, " ", 24),
        (24, Type::Integer, "45", 26),
        (26, Type::Space, " ", 27),
        (27, Type::Float, ".6", 29),
        (29, Type::Space, " ", 30),
        (30, Type::Identifier, "hello", 35),
    ]
    .into_iter()
    .map(|(start, ty, value, end)| Positioned {
        start,
        value: token(ty, value),
        end,
    })
    .collect::<Vec<_>>();

    assert_eq!(tokens, expected);
}

#[test]
fn longest_match_beats_earlier_pattern() {
    #[derive(Clone, Debug, PartialEq)]
    enum Word {
        Reserved,
        Other(String),
    }

    let tokenizer = Tokenizer::builder(NoPosition)
        .pattern("reserved", |_| Word::Reserved)
        .pattern(r"\w+", |m| Word::Other(m.as_str().to_string()))
        .build()
        .unwrap();

    assert_eq!(tokenizer.tokenize_values("reserved").collect::<Vec<_>>(), vec![Ok(Word::Reserved)]);
    assert_eq!(
        tokenizer.tokenize_values("reservednot").collect::<Vec<_>>(),
        vec![Ok(Word::Other("reservednot".to_string()))],
    );
}

#[test]
fn unmatched_text_stops_tokenizing() {
    let mut tokens = tokenizer(CharOffset).tokenize("héllo 12 ?? 34");
    let mut ok = 0;
    let error = loop {
        match tokens.next() {
            Some(Ok(_)) => ok += 1,
            Some(Err(error)) => break error,
            None => panic!("expected an error"),
        }
    };
    assert_eq!(ok, 4);
    assert_eq!(
        error,
        LexError {
            offset: 10,
            position: 9,
            kind: LexErrorKind::NoMatch,
        },
    );
    assert_eq!(error.to_string(), "no pattern matches at offset 10");
    assert!(tokens.next().is_none());
}

#[test]
fn line_and_column_positions() {
    let spans: Vec<_> = tokenizer(LineCol)
        .tokenize("ab\n  cd\r\nef")
        .map(|token| {
            let token = token.unwrap();
            (token.value.ty, token.start.to_string(), token.end.to_string())
        })
        .collect();

    let expected = [
        (Type::Identifier, "1:1", "1:3"),
        (Type::Space, "1:3", "2:3"),
        (Type::Identifier, "2:3", "2:5"),
        (Type::Space, "2:5", "3:1"),
        (Type::Identifier, "3:1", "3:3"),
    ]
    .map(|(ty, start, end)| (ty, start.to_string(), end.to_string()));
    assert_eq!(spans, expected);
}

#[test]
fn tokenizers_are_shareable() {
    let tokenizer = tokenizer(ByteOffset);
    let handles: Vec<_> = ["abc 1", "def 23"]
        .into_iter()
        .map(|src| {
            let tokenizer = tokenizer.clone();
            std::thread::spawn(move || tokenizer.tokenize(src).map(|t| t.unwrap().end).last())
        })
        .collect();
    let ends: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(ends, vec![Some(5), Some(6)]);
}

#[cfg(feature = "serde")]
#[test]
fn positioned_tokens_serialize() {
    let tokens: Vec<_> = tokenizer(LineCol)
        .tokenize("ab")
        .map(|t| t.unwrap().map(|token| token.value))
        .collect();
    assert_eq!(
        serde_json::to_string(&tokens).unwrap(),
        r#"[{"start":{"line":1,"column":1},"value":"ab","end":{"line":1,"column":3}}]"#,
    );

    let start: bramble::position::LineColumn = serde_json::from_str(r#"{"line":4,"column":2}"#).unwrap();
    assert_eq!(start, bramble::position::LineColumn { line: 4, column: 2 });
}
