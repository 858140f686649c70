use super::builtins::Builtins;
use super::control_flow::Flow;
use super::error::{join_parse_errors, EvalError, EvalErrorKind, RunError};
use super::modules;
use super::parser::Parser;
use crate::ast::{
    AssignOp, Block, Expr, ExprKind, FunctionLiteral, Identifier, InfixOp, PostfixOp, PrefixOp,
    Program, Stmt, StmtKind,
};
use crate::config::Config;
use crate::lexer::Lexer;
use crate::object::methods::element_at;
use crate::object::{
    Environment, Function, HashPair, Module, NativeFn, Object, ObjectType, Pairs, MAX_BUILD_LEN,
};
use crate::stack::ensure_sufficient_stack;
use crate::token::Token;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// Unwraps a `Flow::Value`, returning a `Flow::Return` from the enclosing
/// function unchanged.
macro_rules! value {
    ($flow:expr) => {
        match $flow {
            Flow::Value(value) => value,
            ret @ Flow::Return(_) => return Ok(ret),
        }
    };
}

/// Evaluates a list of expressions left to right with the same early exits
/// as [`value!`].
macro_rules! values {
    ($self:ident, $exprs:expr, $env:expr) => {{
        let exprs = $exprs;
        let mut values = Vec::with_capacity(exprs.len());
        for expr in exprs {
            values.push(value!($self.eval_expression(expr, $env)?));
        }
        values
    }};
}

/// Where `print` and `println` write.
#[derive(Debug, Clone, Default)]
pub enum Output {
    #[default]
    Stdout,
    /// Collects everything written, for tests and embedding hosts.
    Buffer(Rc<RefCell<String>>),
}

impl Output {
    pub fn stdout() -> Self {
        Output::Stdout
    }

    pub fn buffer() -> Self {
        Output::Buffer(Rc::new(RefCell::new(String::new())))
    }

    pub fn write(&self, text: &str) {
        match self {
            Output::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(text.as_bytes()).ok();
                stdout.flush().ok();
            }
            Output::Buffer(buffer) => buffer.borrow_mut().push_str(text),
        }
    }

    /// Text written so far; always empty for stdout.
    pub fn contents(&self) -> String {
        match self {
            Output::Stdout => String::new(),
            Output::Buffer(buffer) => buffer.borrow().clone(),
        }
    }
}

pub struct Interpreter {
    env: Environment,
    builtins: Rc<Builtins>,
    config: Rc<Config>,
    output: Output,
    depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            env: Environment::new(),
            builtins: Rc::new(Builtins::standard()),
            config: Rc::new(config),
            output: Output::default(),
            depth: 0,
        }
    }

    pub fn with_builtins(mut self, builtins: Rc<Builtins>) -> Self {
        self.builtins = builtins;
        self
    }

    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    /// A fresh interpreter for a module body, sharing everything but the scope.
    fn for_module(&self) -> Self {
        Self {
            env: Environment::new(),
            builtins: Rc::clone(&self.builtins),
            config: Rc::clone(&self.config),
            output: self.output.clone(),
            depth: self.depth,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Parses and runs `source` in this interpreter's global scope, so
    /// bindings persist across calls.
    pub fn eval_source(&mut self, source: &str, file: &str) -> Result<Object, RunError> {
        let result = Parser::new(Lexer::with_file(source, file))
            .with_max_depth(self.config.max_depth)
            .parse_with_errors();
        if !result.is_ok() {
            return Err(RunError::Parse(result.errors));
        }
        Ok(self.run(&result.program)?)
    }

    /// Evaluates every statement, yielding the value of the last one. A
    /// top-level `return` stops the program with its value.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
    pub fn run(&mut self, program: &Program) -> Result<Object, EvalError> {
        let env = self.env.clone();
        let flow = self.eval_statements(&program.statements, &env)?;
        Ok(flow.into_value())
    }

    fn eval_statements(&mut self, statements: &[Stmt], env: &Environment) -> Result<Flow, EvalError> {
        let mut result = Object::Null;
        for statement in statements {
            result = value!(self.eval_statement(statement, env)?);
        }
        Ok(Flow::Value(result))
    }

    /// Blocks run in the scope they appear in.
    fn eval_block(&mut self, block: &Block, env: &Environment) -> Result<Flow, EvalError> {
        self.eval_statements(&block.statements, env)
    }

    fn eval_statement(&mut self, statement: &Stmt, env: &Environment) -> Result<Flow, EvalError> {
        match &statement.kind {
            StmtKind::Let { name, value } => {
                let value = value!(self.eval_expression(value, env)?);
                env.define(name.name.clone(), value);
                Ok(Flow::Value(Object::Null))
            }
            StmtKind::Return(value) => {
                let value = value!(self.eval_expression(value, env)?);
                Ok(Flow::Return(value))
            }
            StmtKind::Expr(expr) => self.eval_expression(expr, env),
            StmtKind::Block(block) => self.eval_block(block, env),
        }
    }

    /// Depth-guarded entry for every expression. Errors raised below without
    /// a position take this expression's token.
    fn eval_expression(&mut self, expr: &Expr, env: &Environment) -> Result<Flow, EvalError> {
        if self.depth >= self.config.max_depth {
            return Err(EvalError::new(EvalErrorKind::DepthExceeded(self.config.max_depth)).at(&expr.token));
        }
        self.depth += 1;
        let result = ensure_sufficient_stack(|| self.eval_expression_kind(expr, env));
        self.depth -= 1;
        result.map_err(|err| err.at(&expr.token))
    }

    fn eval_expression_kind(&mut self, expr: &Expr, env: &Environment) -> Result<Flow, EvalError> {
        let value = match &expr.kind {
            ExprKind::Identifier(ident) => self.eval_identifier(ident, env)?,
            ExprKind::Integer(value) => Object::Integer(*value),
            ExprKind::Float(value) => Object::Float(*value),
            ExprKind::String(value) => Object::String(value.clone()),
            ExprKind::Boolean(value) => Object::Boolean(*value),
            ExprKind::Array(elements) => Object::from(values!(self, elements, env)),
            ExprKind::Hash(entries) => {
                let mut pairs = Pairs::new();
                for (key_expr, value_expr) in entries {
                    let key = value!(self.eval_expression(key_expr, env)?);
                    let hash_key = key
                        .hash_key()
                        .ok_or_else(|| EvalError::new(EvalErrorKind::NotHashable(key.object_type())).at(&key_expr.token))?;
                    let value = value!(self.eval_expression(value_expr, env)?);
                    pairs.insert(hash_key, HashPair { key, value });
                }
                Object::new_hash(pairs)
            }
            ExprKind::Prefix { op, right } => {
                let right = value!(self.eval_expression(right, env)?);
                eval_prefix(*op, right)?
            }
            ExprKind::Postfix { op, target } => self.eval_postfix(*op, target, env)?,
            ExprKind::Infix { left, op, right } => {
                let left = value!(self.eval_expression(left, env)?);
                match op {
                    InfixOp::And if !left.is_truthy() => Object::Boolean(false),
                    InfixOp::Or if left.is_truthy() => Object::Boolean(true),
                    InfixOp::And | InfixOp::Or => {
                        let right = value!(self.eval_expression(right, env)?);
                        Object::Boolean(right.is_truthy())
                    }
                    _ => {
                        let right = value!(self.eval_expression(right, env)?);
                        eval_infix(*op, left, right)?
                    }
                }
            }
            ExprKind::Assign { name, op, value } => {
                let value = value!(self.eval_expression(value, env)?);
                self.eval_assign(name, *op, value, env)?
            }
            ExprKind::Bind { name, value } => {
                let value = value!(self.eval_expression(value, env)?);
                env.define(name.name.clone(), value.deep_copy());
                Object::Null
            }
            ExprKind::If {
                condition,
                consequence,
                alternative,
            } => {
                let condition = value!(self.eval_expression(condition, env)?);
                if condition.is_truthy() {
                    return self.eval_block(consequence, env);
                }
                match alternative {
                    Some(alternative) => return self.eval_block(alternative, env),
                    None => Object::Null,
                }
            }
            ExprKind::While { condition, body } => {
                let mut last = Object::Null;
                loop {
                    let condition = value!(self.eval_expression(condition, env)?);
                    if !condition.is_truthy() {
                        break;
                    }
                    last = value!(self.eval_block(body, env)?);
                }
                last
            }
            ExprKind::Function(literal) => make_function(literal, env),
            ExprKind::FunctionDefine { name, function } => {
                env.define(name.name.clone(), make_function(function, env));
                Object::Null
            }
            ExprKind::Call { function, args } => {
                let callee = value!(self.eval_expression(function, env)?);
                let args = values!(self, args, env);
                let name = match &function.kind {
                    ExprKind::Identifier(ident) => ident.name.to_string(),
                    _ => function.to_string(),
                };
                self.apply_function(&name, callee, args)?
            }
            ExprKind::Index { left, index } => {
                let left = value!(self.eval_expression(left, env)?);
                let index = value!(self.eval_expression(index, env)?);
                eval_index(left, index)?
            }
            ExprKind::ObjectCall {
                receiver,
                method,
                args,
            } => {
                let receiver = value!(self.eval_expression(receiver, env)?);
                let args = values!(self, args, env);
                self.eval_method_call(receiver, method, args)?
            }
            ExprKind::Import(name) => {
                let name = value!(self.eval_expression(name, env)?);
                match name {
                    Object::String(name) => self.import_module(&name)?,
                    other => {
                        return Err(EvalError::import(format!(
                            "ImportError: invalid import path '{}'",
                            other.inspect()
                        )))
                    }
                }
            }
        };
        Ok(Flow::Value(value))
    }

    /// Scopes first, then the builtin table.
    fn eval_identifier(&self, ident: &Identifier, env: &Environment) -> Result<Object, EvalError> {
        if let Some(value) = env.get(&ident.name) {
            return Ok(value);
        }
        if let Some(builtin) = self.builtins.get(&ident.name) {
            return Ok(Object::Builtin(builtin));
        }
        Err(EvalErrorKind::NotFound(ident.name.to_string()).into())
    }

    fn eval_assign(
        &mut self,
        name: &Identifier,
        op: AssignOp,
        value: Object,
        env: &Environment,
    ) -> Result<Object, EvalError> {
        let Some(infix) = op.infix() else {
            env.set(&name.name, value.clone());
            return Ok(value);
        };
        let current = env
            .get(&name.name)
            .ok_or_else(|| EvalError::from(EvalErrorKind::Unknown(name.name.to_string())))?;
        let updated = eval_infix(infix, current, value)?;
        env.assign(&name.name, updated.clone());
        Ok(updated)
    }

    /// Rebinds the target and evaluates to its previous value.
    fn eval_postfix(&mut self, op: PostfixOp, target: &Token, env: &Environment) -> Result<Object, EvalError> {
        let name = target.literal.as_str();
        let current = env
            .get(name)
            .ok_or_else(|| EvalError::from(EvalErrorKind::Unknown(name.to_string())).at(target))?;
        let delta = match op {
            PostfixOp::Increment => 1,
            PostfixOp::Decrement => -1,
        };
        let updated = match &current {
            Object::Integer(value) => Object::Integer(value.wrapping_add(delta)),
            Object::Float(value) => Object::Float(value + delta as f64),
            other => {
                return Err(EvalError::new(EvalErrorKind::UnknownOperator(format!(
                    "{}{}",
                    other.object_type(),
                    op.as_str()
                )))
                .at(target))
            }
        };
        env.assign(name, updated);
        Ok(current)
    }

    fn eval_method_call(
        &mut self,
        receiver: Object,
        method: &Identifier,
        args: Vec<Object>,
    ) -> Result<Object, EvalError> {
        if let Object::Module(module) = &receiver {
            let export = module_export(module, &method.name);
            return match export {
                Some(function) => self.apply_function(&method.name, function, args),
                None => Err(no_member(&receiver, &method.name)),
            };
        }
        match receiver.invoke_method(&method.name, &args) {
            Some(result) => result,
            None => Err(no_member(&receiver, &method.name)),
        }
    }

    /// Calls a function or builtin with already evaluated arguments.
    pub fn apply_function(&mut self, name: &str, callee: Object, args: Vec<Object>) -> Result<Object, EvalError> {
        match callee {
            Object::Function(function) => self.call_function(name, &function, args),
            Object::Builtin(builtin) => match builtin.func {
                NativeFn::Pure(func) => func(&args),
                NativeFn::Output(func) => {
                    let text = func(&args)?;
                    self.output.write(&text);
                    Ok(Object::Null)
                }
            },
            other => Err(EvalErrorKind::NotCallable(other.object_type()).into()),
        }
    }

    #[tracing::instrument(level = "trace", skip_all, fields(function = name, args = args.len()))]
    fn call_function(&mut self, name: &str, function: &Function, args: Vec<Object>) -> Result<Object, EvalError> {
        let params = &function.literal.params;
        if args.len() > params.len() {
            return Err(arity_error(name, &function.literal, args.len()));
        }

        let call_env = Environment::enclosed(&function.env);
        let given = args.len();
        let mut args = args.into_iter();
        for param in params {
            let value = match (args.next(), &param.default) {
                (Some(value), _) => value,
                (None, Some(default)) => self.eval_expression(default, &call_env)?.into_value(),
                (None, None) => return Err(arity_error(name, &function.literal, given)),
            };
            call_env.define(param.name.name.clone(), value);
        }

        let flow = self.eval_block(&function.literal.body, &call_env)?;
        Ok(flow.into_value())
    }

    #[tracing::instrument(level = "debug", skip_all, fields(module = name))]
    fn import_module(&mut self, name: &str) -> Result<Object, EvalError> {
        let module = modules::resolve(name, &self.config)?;
        let result = Parser::new(Lexer::with_file(&module.source, &module.file))
            .with_max_depth(self.config.max_depth)
            .parse_with_errors();
        if !result.is_ok() {
            return Err(EvalError::import(join_parse_errors(&result.errors)));
        }

        let mut interpreter = self.for_module();
        interpreter.run(&result.program)?;
        let exports = interpreter.env.exported();
        tracing::debug!(module = name, exports = exports.len(), "module imported");

        Ok(Object::Module(Rc::new(Module {
            name: module.name,
            attrs: Rc::new(RefCell::new(exports)),
        })))
    }
}

fn make_function(literal: &Rc<FunctionLiteral>, env: &Environment) -> Object {
    Object::Function(Rc::new(Function {
        literal: Rc::clone(literal),
        env: env.clone(),
    }))
}

fn arity_error(name: &str, literal: &FunctionLiteral, got: usize) -> EvalError {
    let max = literal.params.len();
    let min = literal.params.iter().filter(|p| p.default.is_none()).count();
    let expected = if min == max {
        max.to_string()
    } else {
        format!("{} to {}", min, max)
    };
    EvalErrorKind::Arity {
        name: name.to_string(),
        expected,
        got,
    }
    .into()
}

fn no_member(receiver: &Object, member: &str) -> EvalError {
    EvalErrorKind::NoMember {
        ty: receiver.object_type(),
        member: member.to_string(),
    }
    .into()
}

fn module_export(module: &Module, name: &str) -> Option<Object> {
    let key = Object::from(name).hash_key()?;
    module.attrs.borrow().get(&key).map(|pair| pair.value.clone())
}

fn eval_prefix(op: PrefixOp, right: Object) -> Result<Object, EvalError> {
    match (op, right) {
        (PrefixOp::Not, right) => Ok(Object::Boolean(!right.is_truthy())),
        (PrefixOp::Neg, Object::Integer(value)) => Ok(Object::Integer(value.wrapping_neg())),
        (PrefixOp::Neg, Object::Float(value)) => Ok(Object::Float(-value)),
        (PrefixOp::Neg, right) => {
            Err(EvalErrorKind::UnknownOperator(format!("-{}", right.object_type())).into())
        }
    }
}

fn unknown_infix(op: InfixOp, left: &Object, right: &Object) -> EvalError {
    EvalErrorKind::UnknownOperator(format!(
        "{} {} {}",
        left.object_type(),
        op.as_str(),
        right.object_type()
    ))
    .into()
}

/// Applies a binary operator to two evaluated operands.
pub fn eval_infix(op: InfixOp, left: Object, right: Object) -> Result<Object, EvalError> {
    match (&left, &right) {
        (Object::Integer(a), Object::Integer(b)) => eval_integer_infix(op, *a, *b),
        (Object::Float(a), Object::Float(b)) => eval_float_infix(op, *a, *b),
        (Object::Integer(a), Object::Float(b)) => eval_float_infix(op, *a as f64, *b),
        (Object::Float(a), Object::Integer(b)) => eval_float_infix(op, *a, *b as f64),
        (Object::String(a), Object::String(b)) => match op {
            InfixOp::Add => Ok(Object::from(format!("{}{}", a, b))),
            InfixOp::Eq => Ok(Object::Boolean(a == b)),
            InfixOp::NotEq => Ok(Object::Boolean(a != b)),
            _ => Err(unknown_infix(op, &left, &right)),
        },
        (Object::String(s), Object::Integer(n)) if op == InfixOp::Mul => {
            let count = usize::try_from(*n).unwrap_or(0);
            match s.len().checked_mul(count) {
                Some(len) if len <= MAX_BUILD_LEN => Ok(Object::from(s.repeat(count))),
                _ => Err(EvalError::custom(format!(
                    "string repeat too large: {} bytes times {}",
                    s.len(),
                    count
                ))),
            }
        }
        (Object::Array(a), Object::Array(b)) if op == InfixOp::Add => {
            let mut joined = a.borrow().clone();
            joined.extend(b.borrow().iter().cloned());
            Ok(Object::from(joined))
        }
        _ => match op {
            InfixOp::Eq => Ok(Object::Boolean(identical(&left, &right))),
            InfixOp::NotEq => Ok(Object::Boolean(!identical(&left, &right))),
            InfixOp::And => Ok(Object::Boolean(left.is_truthy() && right.is_truthy())),
            InfixOp::Or => Ok(Object::Boolean(left.is_truthy() || right.is_truthy())),
            _ if left.object_type() != right.object_type() => Err(EvalErrorKind::TypeMismatch {
                left: left.object_type(),
                op: op.as_str(),
                right: right.object_type(),
            }
            .into()),
            _ => Err(unknown_infix(op, &left, &right)),
        },
    }
}

fn eval_integer_infix(op: InfixOp, a: i64, b: i64) -> Result<Object, EvalError> {
    Ok(match op {
        InfixOp::Add => Object::Integer(a.wrapping_add(b)),
        InfixOp::Sub => Object::Integer(a.wrapping_sub(b)),
        InfixOp::Mul => Object::Integer(a.wrapping_mul(b)),
        InfixOp::Div if b == 0 => return Err(EvalErrorKind::DivisionByZero.into()),
        InfixOp::Div => Object::Integer(a.wrapping_div(b)),
        InfixOp::Mod if b == 0 => return Err(EvalErrorKind::DivisionByZero.into()),
        InfixOp::Mod => Object::Integer(a.wrapping_rem(b)),
        InfixOp::Lt => Object::Boolean(a < b),
        InfixOp::Gt => Object::Boolean(a > b),
        InfixOp::LtEq => Object::Boolean(a <= b),
        InfixOp::GtEq => Object::Boolean(a >= b),
        InfixOp::Eq => Object::Boolean(a == b),
        InfixOp::NotEq => Object::Boolean(a != b),
        InfixOp::And => Object::Boolean(a != 0 && b != 0),
        InfixOp::Or => Object::Boolean(a != 0 || b != 0),
    })
}

fn eval_float_infix(op: InfixOp, a: f64, b: f64) -> Result<Object, EvalError> {
    Ok(match op {
        InfixOp::Add => Object::Float(a + b),
        InfixOp::Sub => Object::Float(a - b),
        InfixOp::Mul => Object::Float(a * b),
        InfixOp::Div | InfixOp::Mod if b == 0.0 => return Err(EvalErrorKind::DivisionByZero.into()),
        InfixOp::Div => Object::Float(a / b),
        InfixOp::Mod => Object::Float(a % b),
        InfixOp::Lt => Object::Boolean(a < b),
        InfixOp::Gt => Object::Boolean(a > b),
        InfixOp::LtEq => Object::Boolean(a <= b),
        InfixOp::GtEq => Object::Boolean(a >= b),
        InfixOp::Eq => Object::Boolean(a == b),
        InfixOp::NotEq => Object::Boolean(a != b),
        InfixOp::And => Object::Boolean(a != 0.0 && b != 0.0),
        InfixOp::Or => Object::Boolean(a != 0.0 || b != 0.0),
    })
}

/// Language-level `==` for operands that are not both numbers or strings:
/// reference types compare by identity, different types are never equal.
fn identical(left: &Object, right: &Object) -> bool {
    match (left, right) {
        (Object::Boolean(a), Object::Boolean(b)) => a == b,
        (Object::Null, Object::Null) => true,
        (Object::Array(a), Object::Array(b)) | (Object::Set(a), Object::Set(b)) => Rc::ptr_eq(a, b),
        (Object::Hash(a), Object::Hash(b)) => Rc::ptr_eq(a, b),
        (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
        (Object::Module(a), Object::Module(b)) => Rc::ptr_eq(a, b),
        (Object::Builtin(a), Object::Builtin(b)) => a.name == b.name,
        _ => false,
    }
}

fn hash_lookup(pairs: &RefCell<Pairs>, index: &Object) -> Result<Object, EvalError> {
    let key = index
        .hash_key()
        .ok_or_else(|| EvalError::from(EvalErrorKind::NotHashable(index.object_type())))?;
    Ok(pairs
        .borrow()
        .get(&key)
        .map(|pair| pair.value.clone())
        .unwrap_or(Object::Null))
}

/// `left[index]`. Out-of-range reads give Null.
pub fn eval_index(left: Object, index: Object) -> Result<Object, EvalError> {
    match (&left, &index) {
        (Object::Array(elements), Object::Integer(i)) => Ok(element_at(&elements.borrow(), *i)),
        (Object::String(s), Object::Integer(i)) => Ok(usize::try_from(*i)
            .ok()
            .and_then(|i| s.chars().nth(i))
            .map(|c| Object::from(c.to_string()))
            .unwrap_or(Object::Null)),
        (Object::Array(_), other) | (Object::String(_), other) => Err(EvalError::type_error(format!(
            "index must be {}, got {}",
            ObjectType::Integer,
            other.object_type()
        ))),
        (Object::Hash(pairs), _) => hash_lookup(pairs, &index),
        (Object::Module(module), _) => hash_lookup(&module.attrs, &index),
        _ => Err(EvalErrorKind::IndexNotSupported(left.object_type()).into()),
    }
}
