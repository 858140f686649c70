use crate::ast::{
    AssignOp, Block, Expr, ExprKind, FunctionLiteral, Identifier, InfixOp, Parameter, PostfixOp,
    PrefixOp, Program, Stmt, StmtKind,
};
use crate::config::DEFAULT_MAX_DEPTH;
use crate::diagnostic::{Diagnostic, Label, Position};
use crate::lexer::Lexer;
use crate::stack::ensure_sufficient_stack;
use crate::token::{Token, TokenKind};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: Position,
    pub width: usize,
    pub expected: Option<TokenKind>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, token: &Token) -> Self {
        Self {
            message: message.into(),
            position: token.position(),
            width: token.literal.chars().count(),
            expected: None,
        }
    }

    pub fn with_expected(mut self, expected: TokenKind) -> Self {
        self.expected = Some(expected);
        self
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.message.clone())
            .with_code("E0101")
            .with_label(Label::primary(self.position.clone(), self.width, ""));

        match self.expected {
            Some(expected) => diag.with_help(format!("expected `{}` here", expected)),
            None => diag,
        }
    }
}

pub struct ParseResult {
    pub program: Program,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Binding power, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Assign,
    Equals,
    AndOr,
    LessGreater,
    Sum,
    Modulus,
    Product,
    Prefix,
    Call,
    Index,
}

fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Assign
        | TokenKind::PlusAssign
        | TokenKind::MinusAssign
        | TokenKind::AsteriskAssign
        | TokenKind::Bind => Precedence::Assign,
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
        TokenKind::And | TokenKind::Or => Precedence::AndOr,
        TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Modulus => Precedence::Modulus,
        TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
        TokenKind::LParen | TokenKind::Period => Precedence::Call,
        TokenKind::LBracket | TokenKind::Scope => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

fn infix_op(kind: TokenKind) -> Option<InfixOp> {
    Some(match kind {
        TokenKind::Plus => InfixOp::Add,
        TokenKind::Minus => InfixOp::Sub,
        TokenKind::Asterisk => InfixOp::Mul,
        TokenKind::Slash => InfixOp::Div,
        TokenKind::Modulus => InfixOp::Mod,
        TokenKind::Eq => InfixOp::Eq,
        TokenKind::NotEq => InfixOp::NotEq,
        TokenKind::Lt => InfixOp::Lt,
        TokenKind::Gt => InfixOp::Gt,
        TokenKind::LtEq => InfixOp::LtEq,
        TokenKind::GtEq => InfixOp::GtEq,
        TokenKind::And => InfixOp::And,
        TokenKind::Or => InfixOp::Or,
        _ => return None,
    })
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::Assign => AssignOp::Assign,
        TokenKind::PlusAssign => AssignOp::Add,
        TokenKind::MinusAssign => AssignOp::Sub,
        TokenKind::AsteriskAssign => AssignOp::Mul,
        _ => return None,
    })
}

/// Pratt parser over a [`Lexer`]. Errors are collected and parsing resumes at
/// the next statement.
pub struct Parser {
    lexer: Lexer,
    previous: Token,
    current: Token,
    peek: Token,
    errors: Vec<ParseError>,
    depth: usize,
    max_depth: usize,
    /// Unclosed `{` up to and including `current`.
    open_braces: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();
        let open_braces = usize::from(current.is(TokenKind::LBrace));
        Self {
            lexer,
            open_braces,
            previous: current.clone(),
            current,
            peek,
            errors: Vec::new(),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.previous = std::mem::replace(&mut self.current, std::mem::replace(&mut self.peek, next));
        match self.current.kind {
            TokenKind::LBrace => self.open_braces += 1,
            TokenKind::RBrace => self.open_braces = self.open_braces.saturating_sub(1),
            _ => {}
        }
    }

    fn current_is(&self, kind: TokenKind) -> bool {
        self.current.is(kind)
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.is(kind)
    }

    fn peek_precedence(&self) -> Precedence {
        precedence_of(self.peek.kind)
    }

    fn current_precedence(&self) -> Precedence {
        precedence_of(self.current.kind)
    }

    /// Advances when the next token has the expected kind.
    fn expect_peek(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.peek_is(kind) {
            self.next_token();
            Ok(())
        } else {
            Err(ParseError::new(
                format!("expected next token to be {}, got {} instead", kind, self.peek.kind),
                &self.peek,
            )
            .with_expected(kind))
        }
    }

    /// Skips to the start of the next top-level statement, past the end of
    /// any block the error occurred in.
    fn synchronize(&mut self) {
        loop {
            match self.current.kind {
                TokenKind::Eof => return,
                TokenKind::Semicolon if self.open_braces == 0 => {
                    self.next_token();
                    return;
                }
                _ => self.next_token(),
            }
            if self.open_braces == 0
                && matches!(
                    self.current.kind,
                    TokenKind::Let | TokenKind::Return | TokenKind::DefFn | TokenKind::Eof
                )
            {
                return;
            }
        }
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.current_is(TokenKind::Eof) {
            match self.parse_statement() {
                Ok(stmt) => {
                    statements.push(stmt);
                    self.next_token();
                }
                Err(err) => {
                    tracing::trace!(error = %err, "parse error, resynchronizing");
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }
        Program { statements }
    }

    pub fn parse_with_errors(mut self) -> ParseResult {
        let program = self.parse_program();
        ParseResult {
            program,
            errors: self.errors,
        }
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.current.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Result<Stmt, ParseError> {
        let token = self.current.clone();
        self.expect_peek(TokenKind::Ident)?;
        let name = self.current_identifier();
        self.expect_peek(TokenKind::Assign)?;
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Ok(Stmt {
            kind: StmtKind::Let { name, value },
            token,
        })
    }

    fn parse_return_statement(&mut self) -> Result<Stmt, ParseError> {
        let token = self.current.clone();
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Ok(Stmt {
            kind: StmtKind::Return(value),
            token,
        })
    }

    fn parse_expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let token = self.current.clone();
        let expr = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Ok(Stmt {
            kind: StmtKind::Expr(expr),
            token,
        })
    }

    /// Parses statements until `}` or end of input. The current token must be `{`.
    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let token = self.current.clone();
        let mut statements = Vec::new();
        self.next_token();
        while !self.current_is(TokenKind::RBrace) && !self.current_is(TokenKind::Eof) {
            statements.push(self.parse_statement()?);
            self.next_token();
        }
        Ok(Block { token, statements })
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Result<Expr, ParseError> {
        if self.depth >= self.max_depth {
            return Err(ParseError::new(
                format!("expression nesting exceeds the maximum depth of {}", self.max_depth),
                &self.current,
            ));
        }
        self.depth += 1;
        let result = ensure_sufficient_stack(|| self.parse_expression_inner(precedence));
        self.depth -= 1;
        result
    }

    fn parse_expression_inner(&mut self, precedence: Precedence) -> Result<Expr, ParseError> {
        if matches!(self.current.kind, TokenKind::Increment | TokenKind::Decrement) {
            return self.parse_postfix_expression();
        }

        let mut left = self.parse_prefix()?;
        while !self.peek_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            self.next_token();
            left = self.parse_infix(left)?;
        }
        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let token = self.current.clone();
        let kind = match token.kind {
            TokenKind::Ident => ExprKind::Identifier(self.current_identifier()),
            TokenKind::Int => match token.literal.parse::<i64>() {
                Ok(value) => ExprKind::Integer(value),
                Err(_) => {
                    return Err(ParseError::new(
                        format!("could not parse {} as integer", token.literal),
                        &token,
                    ))
                }
            },
            TokenKind::Float => match token.literal.parse::<f64>() {
                Ok(value) => ExprKind::Float(value),
                Err(_) => {
                    return Err(ParseError::new(
                        format!("could not parse {} as float", token.literal),
                        &token,
                    ))
                }
            },
            TokenKind::String => ExprKind::String(Rc::from(token.literal.as_str())),
            TokenKind::True => ExprKind::Boolean(true),
            TokenKind::False => ExprKind::Boolean(false),
            TokenKind::Bang | TokenKind::Minus => {
                let op = if token.is(TokenKind::Bang) { PrefixOp::Not } else { PrefixOp::Neg };
                self.next_token();
                let right = self.parse_expression(Precedence::Prefix)?;
                ExprKind::Prefix {
                    op,
                    right: Box::new(right),
                }
            }
            TokenKind::LParen => {
                self.next_token();
                let expr = self.parse_expression(Precedence::Lowest)?;
                self.expect_peek(TokenKind::RParen)?;
                return Ok(expr);
            }
            TokenKind::LBracket => ExprKind::Array(self.parse_expression_list(TokenKind::RBracket)?),
            TokenKind::LBrace => self.parse_hash_literal()?,
            TokenKind::If => self.parse_if_expression()?,
            TokenKind::While => self.parse_while_expression()?,
            TokenKind::Function => {
                self.expect_peek(TokenKind::LParen)?;
                ExprKind::Function(Rc::new(self.parse_function_rest(token.clone())?))
            }
            TokenKind::DefFn => {
                self.expect_peek(TokenKind::Ident)?;
                let name = self.current_identifier();
                self.expect_peek(TokenKind::LParen)?;
                let function = Rc::new(self.parse_function_rest(token.clone())?);
                ExprKind::FunctionDefine { name, function }
            }
            TokenKind::Import => {
                self.expect_peek(TokenKind::LParen)?;
                self.next_token();
                let name = self.parse_expression(Precedence::Lowest)?;
                self.expect_peek(TokenKind::RParen)?;
                ExprKind::Import(Box::new(name))
            }
            TokenKind::Illegal => {
                return Err(ParseError::new(format!("illegal token `{}`", token.literal), &token))
            }
            other => {
                return Err(ParseError::new(
                    format!("no prefix parse function for {} found", other),
                    &token,
                ))
            }
        };
        Ok(Expr { kind, token })
    }

    fn parse_infix(&mut self, left: Expr) -> Result<Expr, ParseError> {
        let token = self.current.clone();

        if let Some(op) = infix_op(token.kind) {
            let precedence = self.current_precedence();
            self.next_token();
            let right = self.parse_expression(precedence)?;
            return Ok(Expr {
                kind: ExprKind::Infix {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                token,
            });
        }

        if let Some(op) = assign_op(token.kind) {
            let name = self.assignment_target(left, &token)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            return Ok(Expr {
                kind: ExprKind::Assign {
                    name,
                    op,
                    value: Box::new(value),
                },
                token,
            });
        }

        let kind = match token.kind {
            TokenKind::Bind => {
                let name = self.assignment_target(left, &token)?;
                self.next_token();
                let value = self.parse_expression(Precedence::Lowest)?;
                ExprKind::Bind {
                    name,
                    value: Box::new(value),
                }
            }
            TokenKind::LParen => ExprKind::Call {
                function: Box::new(left),
                args: self.parse_expression_list(TokenKind::RParen)?,
            },
            TokenKind::LBracket => {
                self.next_token();
                let index = self.parse_expression(Precedence::Lowest)?;
                self.expect_peek(TokenKind::RBracket)?;
                ExprKind::Index {
                    left: Box::new(left),
                    index: Box::new(index),
                }
            }
            TokenKind::Scope => {
                self.expect_peek(TokenKind::Ident)?;
                let selector = Expr {
                    kind: ExprKind::String(Rc::from(self.current.literal.as_str())),
                    token: self.current.clone(),
                };
                ExprKind::Index {
                    left: Box::new(left),
                    index: Box::new(selector),
                }
            }
            TokenKind::Period => {
                self.expect_peek(TokenKind::Ident)?;
                let method = self.current_identifier();
                self.expect_peek(TokenKind::LParen)?;
                ExprKind::ObjectCall {
                    receiver: Box::new(left),
                    method,
                    args: self.parse_expression_list(TokenKind::RParen)?,
                }
            }
            other => {
                return Err(ParseError::new(
                    format!("no infix parse function for {} found", other),
                    &token,
                ))
            }
        };
        Ok(Expr { kind, token })
    }

    /// `x++` and `x--` apply to the identifier read just before the operator.
    fn parse_postfix_expression(&mut self) -> Result<Expr, ParseError> {
        let token = self.current.clone();
        let op = if token.is(TokenKind::Increment) {
            PostfixOp::Increment
        } else {
            PostfixOp::Decrement
        };
        if !self.previous.is(TokenKind::Ident) {
            return Err(ParseError::new(
                format!(
                    "postfix operator {} must follow an identifier, got {}",
                    op.as_str(),
                    self.previous.kind
                ),
                &token,
            ));
        }
        Ok(Expr {
            kind: ExprKind::Postfix {
                op,
                target: self.previous.clone(),
            },
            token,
        })
    }

    fn assignment_target(&self, left: Expr, operator: &Token) -> Result<Identifier, ParseError> {
        match left.kind {
            ExprKind::Identifier(ident) => Ok(ident),
            _ => Err(ParseError::new(
                format!(
                    "expected identifier expression on left of {} but got {}",
                    operator.kind, left
                ),
                operator,
            )),
        }
    }

    fn current_identifier(&self) -> Identifier {
        Identifier {
            token: self.current.clone(),
            name: Rc::from(self.current.literal.as_str()),
        }
    }

    /// Comma separated expressions up to `end`; a trailing comma is allowed.
    fn parse_expression_list(&mut self, end: TokenKind) -> Result<Vec<Expr>, ParseError> {
        let mut list = Vec::new();
        if self.peek_is(end) {
            self.next_token();
            return Ok(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            if self.peek_is(end) {
                break;
            }
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }
        self.expect_peek(end)?;
        Ok(list)
    }

    fn parse_hash_literal(&mut self) -> Result<ExprKind, ParseError> {
        let mut pairs = Vec::new();
        while !self.peek_is(TokenKind::RBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect_peek(TokenKind::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));
            if !self.peek_is(TokenKind::RBrace) {
                self.expect_peek(TokenKind::Comma)?;
            }
        }
        self.expect_peek(TokenKind::RBrace)?;
        Ok(ExprKind::Hash(pairs))
    }

    /// `(condition) { ... }` shared by `if`, `elif` and `while`.
    fn parse_condition_and_block(&mut self) -> Result<(Expr, Block), ParseError> {
        self.expect_peek(TokenKind::LParen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;
        self.expect_peek(TokenKind::LBrace)?;
        let block = self.parse_block()?;
        Ok((condition, block))
    }

    fn parse_if_expression(&mut self) -> Result<ExprKind, ParseError> {
        let (condition, consequence) = self.parse_condition_and_block()?;

        let alternative = if self.peek_is(TokenKind::Elif) {
            self.next_token();
            Some(self.parse_nested_if()?)
        } else if self.peek_is(TokenKind::Else) {
            self.next_token();
            if self.peek_is(TokenKind::If) {
                self.next_token();
                Some(self.parse_nested_if()?)
            } else {
                self.expect_peek(TokenKind::LBrace)?;
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        Ok(ExprKind::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    /// Wraps an `elif` / `else if` chain in a single-statement block.
    fn parse_nested_if(&mut self) -> Result<Block, ParseError> {
        let token = self.current.clone();
        let kind = self.parse_if_expression()?;
        let nested = Expr {
            kind,
            token: token.clone(),
        };
        Ok(Block {
            token: token.clone(),
            statements: vec![Stmt {
                kind: StmtKind::Expr(nested),
                token,
            }],
        })
    }

    fn parse_while_expression(&mut self) -> Result<ExprKind, ParseError> {
        let (condition, body) = self.parse_condition_and_block()?;
        Ok(ExprKind::While {
            condition: Box::new(condition),
            body,
        })
    }

    /// Parameters and body; the current token is the opening `(`.
    fn parse_function_rest(&mut self, token: Token) -> Result<FunctionLiteral, ParseError> {
        let params = self.parse_parameters()?;
        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block()?;
        Ok(FunctionLiteral { token, params, body })
    }

    fn parse_parameters(&mut self) -> Result<Vec<Parameter>, ParseError> {
        let mut params = Vec::new();
        if self.peek_is(TokenKind::RParen) {
            self.next_token();
            return Ok(params);
        }

        loop {
            self.expect_peek(TokenKind::Ident)?;
            let name = self.current_identifier();
            let default = if self.peek_is(TokenKind::Assign) {
                self.next_token();
                self.next_token();
                Some(self.parse_expression(Precedence::Lowest)?)
            } else {
                None
            };
            params.push(Parameter { name, default });

            if self.peek_is(TokenKind::Comma) {
                self.next_token();
            } else {
                self.expect_peek(TokenKind::RParen)?;
                return Ok(params);
            }
        }
    }
}

/// Parses `source`, returning the program or every syntax error found.
pub fn parse(source: &str, file: &str) -> Result<Program, Vec<ParseError>> {
    let result = Parser::new(Lexer::with_file(source, file)).parse_with_errors();
    if result.is_ok() {
        Ok(result.program)
    } else {
        Err(result.errors)
    }
}
