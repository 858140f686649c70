use std::fmt;
use std::rc::Rc;

use crate::object::format_float;
use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
}

impl InfixOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Mod => "%",
            InfixOp::Eq => "==",
            InfixOp::NotEq => "!=",
            InfixOp::Lt => "<",
            InfixOp::Gt => ">",
            InfixOp::LtEq => "<=",
            InfixOp::GtEq => ">=",
            InfixOp::And => "&&",
            InfixOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Not,
    Neg,
}

impl PrefixOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrefixOp::Not => "!",
            PrefixOp::Neg => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

impl PostfixOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostfixOp::Increment => "++",
            PostfixOp::Decrement => "--",
        }
    }
}

/// `=` or one of the compound forms `+=`, `-=`, `*=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
}

impl AssignOp {
    /// The arithmetic operator applied by a compound assignment.
    pub fn infix(&self) -> Option<InfixOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(InfixOp::Add),
            AssignOp::Sub => Some(InfixOp::Sub),
            AssignOp::Mul => Some(InfixOp::Mul),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: Token,
    pub name: Rc<str>,
}

/// Function parameter with optional default value
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Identifier,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub token: Token,
    pub statements: Vec<Stmt>,
}

/// Parameters and body shared between a function expression and the
/// closures created from it.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub token: Token,
    pub params: Vec<Parameter>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Let { name: Identifier, value: Expr },
    Return(Expr),
    Expr(Expr),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub token: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Identifier(Identifier),
    Integer(i64),
    Float(f64),
    String(Rc<str>),
    Boolean(bool),
    Array(Vec<Expr>),
    /// Pairs in source order
    Hash(Vec<(Expr, Expr)>),
    Prefix {
        op: PrefixOp,
        right: Box<Expr>,
    },
    /// `x++` / `x--`; the target is the token read just before the operator.
    Postfix {
        op: PostfixOp,
        target: Token,
    },
    Infix {
        left: Box<Expr>,
        op: InfixOp,
        right: Box<Expr>,
    },
    Assign {
        name: Identifier,
        op: AssignOp,
        value: Box<Expr>,
    },
    Bind {
        name: Identifier,
        value: Box<Expr>,
    },
    If {
        condition: Box<Expr>,
        consequence: Block,
        alternative: Option<Block>,
    },
    While {
        condition: Box<Expr>,
        body: Block,
    },
    Function(Rc<FunctionLiteral>),
    /// `func name(params) { body }`, binds itself in the enclosing scope
    FunctionDefine {
        name: Identifier,
        function: Rc<FunctionLiteral>,
    },
    Call {
        function: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        left: Box<Expr>,
        index: Box<Expr>,
    },
    /// `receiver.method(args)`
    ObjectCall {
        receiver: Box<Expr>,
        method: Identifier,
        args: Vec<Expr>,
    },
    Import(Box<Expr>),
}

fn join<T: fmt::Display>(items: &[T], sep: &str) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(sep)
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.default {
            Some(default) => write!(f, "{} = {}", self.name, default),
            None => write!(f, "{}", self.name),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            return f.write_str("{ }");
        }
        write!(f, "{{ {} }}", join(&self.statements, " "))
    }
}

impl fmt::Display for FunctionLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {}", join(&self.params, ", "), self.body)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(&self.statements, "\n"))
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StmtKind::Let { name, value } => write!(f, "let {} = {};", name, value),
            StmtKind::Return(value) => write!(f, "return {};", value),
            StmtKind::Expr(expr) => write!(f, "{};", expr),
            StmtKind::Block(block) => write!(f, "{}", block),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Identifier(ident) => write!(f, "{}", ident),
            ExprKind::Integer(value) => write!(f, "{}", value),
            ExprKind::Float(value) => f.write_str(&format_float(*value)),
            ExprKind::String(value) => write!(f, "\"{}\"", escape_string(value)),
            ExprKind::Boolean(value) => write!(f, "{}", value),
            ExprKind::Array(elements) => write!(f, "[{}]", join(elements, ", ")),
            ExprKind::Hash(pairs) => {
                let pairs: Vec<String> = pairs.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", pairs.join(", "))
            }
            ExprKind::Prefix { op, right } => write!(f, "({}{})", op.as_str(), right),
            ExprKind::Postfix { op, target } => write!(f, "{}{}", target.literal, op.as_str()),
            ExprKind::Infix { left, op, right } => write!(f, "({} {} {})", left, op.as_str(), right),
            ExprKind::Assign { name, op, value } => write!(f, "({} {} {})", name, op.as_str(), value),
            ExprKind::Bind { name, value } => write!(f, "({} := {})", name, value),
            ExprKind::If { condition, consequence, alternative } => {
                write!(f, "if ({}) {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {}", alternative)?;
                }
                Ok(())
            }
            ExprKind::While { condition, body } => write!(f, "while ({}) {}", condition, body),
            ExprKind::Function(function) => write!(f, "fn{}", function),
            ExprKind::FunctionDefine { name, function } => write!(f, "func {}{}", name, function),
            ExprKind::Call { function, args } => write!(f, "{}({})", function, join(args, ", ")),
            ExprKind::Index { left, index } => write!(f, "({}[{}])", left, index),
            ExprKind::ObjectCall { receiver, method, args } => {
                write!(f, "({}).{}({})", receiver, method, join(args, ", "))
            }
            ExprKind::Import(name) => write!(f, "import({})", name),
        }
    }
}
