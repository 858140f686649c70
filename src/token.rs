use crate::diagnostic::Position;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Illegal,
    Eof,

    // Literals and Identifiers
    Ident,
    Int,
    Float,
    String,

    // Keywords
    Function,
    DefFn,
    Let,
    True,
    False,
    If,
    Elif,
    Else,
    Return,
    While,
    Import,

    // Arithmetic Operators
    Plus,
    Minus,
    Asterisk,
    Slash,
    Modulus,
    Increment,
    Decrement,

    // Assignment
    Assign,
    PlusAssign,
    MinusAssign,
    AsteriskAssign,
    Bind,

    // Comparison Operators
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,

    // Logical Operators
    And,
    Or,
    Bang,

    // Delimiters
    Comma,
    Semicolon,
    Colon,
    Scope,
    Period,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::Float => "FLOAT",
            TokenKind::String => "STRING",
            TokenKind::Function => "FUNCTION",
            TokenKind::DefFn => "DEF_FN",
            TokenKind::Let => "LET",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::If => "IF",
            TokenKind::Elif => "ELIF",
            TokenKind::Else => "ELSE",
            TokenKind::Return => "RETURN",
            TokenKind::While => "WHILE",
            TokenKind::Import => "IMPORT",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Modulus => "%",
            TokenKind::Increment => "++",
            TokenKind::Decrement => "--",
            TokenKind::Assign => "=",
            TokenKind::PlusAssign => "+=",
            TokenKind::MinusAssign => "-=",
            TokenKind::AsteriskAssign => "*=",
            TokenKind::Bind => ":=",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::And => "&&",
            TokenKind::Or => "||",
            TokenKind::Bang => "!",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::Scope => "::",
            TokenKind::Period => ".",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub line: usize,
    pub column: usize,
    pub file: Rc<str>,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, position: &Position) -> Self {
        Self {
            kind,
            literal: literal.into(),
            line: position.line,
            column: position.column,
            file: Rc::clone(&position.file),
        }
    }

    pub fn position(&self) -> Position {
        Position::new(Rc::clone(&self.file), self.line, self.column)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Maps a word to its keyword kind. Word operators (`and`, `is`, ...) map to
/// the same kinds as their symbolic spellings.
pub fn lookup_ident(ident: &str) -> TokenKind {
    match ident {
        "fn" => TokenKind::Function,
        "func" => TokenKind::DefFn,
        "let" => TokenKind::Let,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "if" => TokenKind::If,
        "elif" => TokenKind::Elif,
        "else" => TokenKind::Else,
        "return" => TokenKind::Return,
        "when" | "while" => TokenKind::While,
        "import" => TokenKind::Import,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "is" => TokenKind::Eq,
        "is_not" => TokenKind::NotEq,
        _ => TokenKind::Ident,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_keywords() {
        assert_eq!(lookup_ident("fn"), TokenKind::Function);
        assert_eq!(lookup_ident("func"), TokenKind::DefFn);
        assert_eq!(lookup_ident("when"), TokenKind::While);
        assert_eq!(lookup_ident("while"), TokenKind::While);
        assert_eq!(lookup_ident("is_not"), TokenKind::NotEq);
        assert_eq!(lookup_ident("counter"), TokenKind::Ident);
    }
}
