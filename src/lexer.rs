//! Tokenizer built on chumsky combinators. The whole input is lexed up
//! front and [`Lexer::next_token`] hands the tokens out one at a time.

use crate::diagnostic::{LineIndex, Position};
use crate::token::{lookup_ident, Token, TokenKind};
use chumsky::prelude::*;
use std::rc::Rc;

/// Namespaced builtins that lex as a single identifier.
const NAMESPACED_BUILTINS: &[&str] = &[
    "math.rand",
    "math.randomInt",
    "math.randomFloat",
    "math.abs",
    "math.pow",
    "math.sqrt",
    "math.floor",
    "math.ceil",
    "json.parse",
    "json.stringify",
];

/// Any identifier after one of these prefixes lexes as a single identifier.
const TYPE_NAMESPACES: &[&str] = &["string", "array", "integer", "float", "hash", "object"];

type Spanned = (TokenKind, String, SimpleSpan);

fn is_letter(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_namespaced(dotted: &str) -> bool {
    let prefix = dotted.split('.').next().unwrap_or_default();
    TYPE_NAMESPACES.contains(&prefix) || NAMESPACED_BUILTINS.contains(&dotted)
}

/// Never fails: characters no other rule accepts become ILLEGAL tokens.
fn lexer<'a>() -> impl Parser<'a, &'a str, Vec<Spanned>, extra::Err<Simple<'a, char>>> {
    let word = any()
        .filter(|c: &char| is_letter(*c))
        .then(any().filter(|c: &char| is_letter(*c) || c.is_ascii_digit()).repeated())
        .to_slice();

    let ident = word
        .clone()
        .then(just('.'))
        .then(word.clone())
        .to_slice()
        .filter(|s: &&str| is_namespaced(s))
        .or(word)
        .map(|s: &str| (lookup_ident(s), s.to_string()));

    let number = text::digits(10)
        .then(just('.').then(text::digits(10)).or_not())
        .to_slice()
        .map(|s: &str| {
            let kind = if s.contains('.') { TokenKind::Float } else { TokenKind::Int };
            (kind, s.to_string())
        });

    let escape = just('\\').ignore_then(choice((
        just('n').to("\n"),
        just('r').to("\r"),
        just('t').to("\t"),
        just('"').to("\""),
        just('\\').to("\\"),
        just('\n').to(""),
    )));
    let unknown_escape = just('\\').then(any()).to_slice();

    let string = just('"')
        .ignore_then(
            none_of("\\\"")
                .to_slice()
                .or(escape)
                .or(unknown_escape)
                .repeated()
                .collect::<Vec<&str>>(),
        )
        .then_ignore(just('"'))
        .map(|parts: Vec<&str>| (TokenKind::String, parts.concat()));

    let unterminated = just('"')
        .then(any().repeated())
        .to((TokenKind::Illegal, "\"".to_string()));

    let compound = choice((
        just("==").to(TokenKind::Eq),
        just("!=").to(TokenKind::NotEq),
        just("<=").to(TokenKind::LtEq),
        just(">=").to(TokenKind::GtEq),
        just("++").to(TokenKind::Increment),
        just("+=").to(TokenKind::PlusAssign),
        just("--").to(TokenKind::Decrement),
        just("-=").to(TokenKind::MinusAssign),
        just("*=").to(TokenKind::AsteriskAssign),
        just("&&").to(TokenKind::And),
        just("||").to(TokenKind::Or),
        just("::").to(TokenKind::Scope),
        just(":=").to(TokenKind::Bind),
    ));

    let single = choice((
        just('=').to(TokenKind::Assign),
        just('+').to(TokenKind::Plus),
        just('-').to(TokenKind::Minus),
        just('*').to(TokenKind::Asterisk),
        just('/').to(TokenKind::Slash),
        just('%').to(TokenKind::Modulus),
        just('!').to(TokenKind::Bang),
        just('<').to(TokenKind::Lt),
        just('>').to(TokenKind::Gt),
        just(':').to(TokenKind::Colon),
        just(',').to(TokenKind::Comma),
        just(';').to(TokenKind::Semicolon),
        just('.').to(TokenKind::Period),
        just('(').to(TokenKind::LParen),
        just(')').to(TokenKind::RParen),
        just('{').to(TokenKind::LBrace),
        just('}').to(TokenKind::RBrace),
        just('[').to(TokenKind::LBracket),
        just(']').to(TokenKind::RBracket),
    ));

    let op = compound
        .or(single)
        .map(|kind: TokenKind| (kind, kind.name().to_string()));

    let illegal = any().map(|c: char| (TokenKind::Illegal, c.to_string()));

    let comment = just("//")
        .then(any().and_is(just('\n').not()).repeated())
        .ignored();
    let blank = any()
        .filter(|c: &char| c.is_whitespace())
        .ignored()
        .or(comment)
        .repeated();

    let token = choice((number, string, unterminated, ident, op, illegal))
        .map_with(|(kind, literal), e| (kind, literal, e.span()));

    blank
        .clone()
        .ignore_then(token.then_ignore(blank).repeated().collect())
}

pub struct Lexer {
    tokens: std::vec::IntoIter<Token>,
    eof: Token,
    file: Rc<str>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self::with_file(input, "<input>")
    }

    pub fn with_file(input: &str, file: &str) -> Self {
        let file: Rc<str> = Rc::from(file);
        let index = LineIndex::new(input);
        let position = |offset: usize| {
            let (line, column) = index.line_col(input, offset);
            Position::new(Rc::clone(&file), line, column)
        };

        let spanned = lexer().parse(input).into_output().unwrap_or_else(|| {
            vec![(TokenKind::Illegal, input.to_string(), SimpleSpan::from(0..input.len()))]
        });
        let tokens: Vec<Token> = spanned
            .into_iter()
            .map(|(kind, literal, span)| Token::new(kind, literal, &position(span.start)))
            .collect();
        let eof = Token::new(TokenKind::Eof, "", &position(input.len()));

        Self {
            tokens: tokens.into_iter(),
            eof,
            file,
        }
    }

    pub fn file(&self) -> Rc<str> {
        Rc::clone(&self.file)
    }

    /// Returns the next token. After the input is exhausted every call
    /// returns an EOF token.
    pub fn next_token(&mut self) -> Token {
        self.tokens.next().unwrap_or_else(|| self.eof.clone())
    }
}

impl Iterator for Lexer {
    type Item = Token;

    /// Yields tokens up to, not including, EOF.
    fn next(&mut self) -> Option<Token> {
        self.tokens.next()
    }
}
