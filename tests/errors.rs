//! Parse and runtime error reporting

mod common;

use common::{eval_err, run_err};
use eso::diagnostic::render_diagnostics;
use eso::{Config, Interpreter, RunError};

fn parse_errors(source: &str) -> Vec<String> {
    match run_err(source) {
        RunError::Parse(errors) => errors.iter().map(ToString::to_string).collect(),
        RunError::Eval(err) => panic!("expected parse errors, got runtime error {}", err),
    }
}

// =============================================================================
// SYNTAX ERRORS
// =============================================================================

#[test]
fn test_missing_paren_reports_position() {
    let errors = parse_errors("let x = (1 + 2;");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("<input>:1:"), "{}", errors[0]);
    assert!(errors[0].contains("expected next token to be"), "{}", errors[0]);
}

#[test]
fn test_multiple_syntax_errors_in_one_pass() {
    let errors = parse_errors("let = 1;\nlet y = 2;\nlet z = ;\n");
    assert_eq!(errors.len(), 2, "{:?}", errors);
    assert!(errors[0].starts_with("<input>:1:"));
    assert!(errors[1].starts_with("<input>:3:"));
}

#[test]
fn test_bind_requires_identifier() {
    let errors = parse_errors("1 := 2;");
    assert!(errors[0].contains("expected identifier expression on left of"), "{:?}", errors);
}

#[test]
fn test_illegal_character() {
    let errors = parse_errors("let a = 1 @ 2;");
    assert!(errors.iter().any(|e| e.contains("illegal token `@`")), "{:?}", errors);
}

#[test]
fn test_unterminated_string() {
    assert!(!parse_errors("let s = \"abc").is_empty());
}

#[test]
fn test_program_with_syntax_error_does_not_run() {
    let mut interpreter = Interpreter::new();
    assert!(interpreter.eval_source("let ran = 1; let = ;", "main.eso").is_err());
    assert!(interpreter.env().get("ran").is_none());
}

#[test]
fn test_parse_nesting_limit() {
    let source = format!("{}1{}", "(".repeat(40), ")".repeat(40));
    let mut interpreter = Interpreter::with_config(Config::default().with_max_depth(20));
    match interpreter.eval_source(&source, "deep.eso") {
        Err(RunError::Parse(errors)) => assert!(errors[0].message.contains("maximum depth of 20")),
        other => panic!("expected nesting error, got {:?}", other),
    }
}

// =============================================================================
// RUNTIME ERRORS
// =============================================================================

#[test]
fn test_type_mismatch() {
    assert_eq!(eval_err("5 + true"), "type mismatch: INTEGER + BOOLEAN");
    assert_eq!(eval_err(r#""a" * "b""#), "unknown operator: STRING * STRING");
    assert_eq!(eval_err("-true"), "unknown operator: -BOOLEAN");
}

#[test]
fn test_division_by_zero_is_an_error() {
    assert_eq!(eval_err("let x = 10; x / (5 - 5)"), "Can't divide by zero");
    assert_eq!(eval_err("10 % 0"), "Can't divide by zero");
}

#[test]
fn test_unknown_identifier() {
    assert_eq!(eval_err("foobar + 1"), "cannot find 'foobar' in scope");
}

#[test]
fn test_compound_assign_to_unbound_name() {
    assert_eq!(eval_err("missing += 1"), "missing is unknown");
}

#[test]
fn test_calling_non_function() {
    assert_eq!(eval_err("let x = 5; x(1)"), "not a function: INTEGER");
}

#[test]
fn test_arity_errors() {
    assert_eq!(
        eval_err("let f = fn(a, b) { a }; f(1)"),
        "wrong number of arguments to `f`: expected 2, got 1"
    );
    assert_eq!(
        eval_err("let f = fn(a, b = 2) { a }; f(1, 2, 3)"),
        "wrong number of arguments to `f`: expected 1 to 2, got 3"
    );
}

#[test]
fn test_unknown_method() {
    assert_eq!(eval_err("let n = 5; n.frobnicate()"), "value of type `INTEGER` has no member `frobnicate`");
}

#[test]
fn test_unhashable_key() {
    assert_eq!(eval_err("{[1]: 2}"), "unusable as hash key: ARRAY");
    assert_eq!(eval_err(r#"let h = {"a": 1}; h[fn() { 1 }]"#), "unusable as hash key: FUNCTION");
}

#[test]
fn test_index_not_supported() {
    assert_eq!(eval_err("5[0]"), "index operator not supported: INTEGER");
}

#[test]
fn test_oversized_builds_are_errors() {
    assert_eq!(
        eval_err(r#""ab" * 9223372036854775807"#),
        "string repeat too large: 2 bytes times 9223372036854775807"
    );
    assert_eq!(
        eval_err("array.new(9223372036854775807)"),
        "array.new() size 9223372036854775807 exceeds the limit of 16777216"
    );
    assert_eq!(eval_err("let a = [1]; a.append(a); json.stringify(a)"), "json.stringify: cannot serialize ARRAY that contains itself");
}

#[test]
fn test_error_inside_function_stops_program() {
    let mut interpreter = Interpreter::new();
    let result = interpreter.eval_source("let f = fn() { 1 / 0 }; let after = f(); let reached = true;", "main.eso");
    assert!(result.is_err());
    assert!(interpreter.env().get("reached").is_none());
}

#[test]
fn test_runtime_error_position_points_at_operator() {
    let err = run_err("let a = 1;\nlet b = a / 0;");
    assert_eq!(err.to_string(), "<input>:2:11: Can't divide by zero");
}

#[test]
fn test_runaway_recursion_hits_depth_limit() {
    let config = Config::default().with_max_depth(500);
    let mut interpreter = Interpreter::with_config(config);
    match interpreter.eval_source("let f = fn(n) { f(n + 1) }; f(0)", "main.eso") {
        Err(RunError::Eval(err)) => assert_eq!(err.message(), "maximum recursion depth of 500 exceeded"),
        other => panic!("expected depth error, got {:?}", other),
    }
}

#[test]
fn test_interpreter_survives_runtime_error() {
    let mut interpreter = Interpreter::new();
    assert!(interpreter.eval_source("let x = 1; x + true", "repl").is_err());
    assert_eq!(interpreter.eval_source("x + 1", "repl").map(|v| v.inspect()), Ok("2".to_string()));
}

// =============================================================================
// DIAGNOSTIC RENDERING
// =============================================================================

#[test]
fn test_rendered_runtime_error() {
    let source = "let a = 1;\nlet b = a / 0;";
    let err = run_err(source);
    let rendered = render_diagnostics(source, &err.to_diagnostics(), false);
    assert!(rendered.contains("error[E0203]: Can't divide by zero"), "{}", rendered);
    assert!(rendered.contains("let b = a / 0;"), "{}", rendered);
    assert!(rendered.ends_with("error: aborting due to 1 error\n"), "{}", rendered);
}

#[test]
fn test_rendered_parse_errors_are_counted() {
    let source = "let = 1;\nlet = 2;";
    let err = run_err(source);
    let rendered = render_diagnostics(source, &err.to_diagnostics(), false);
    assert!(rendered.contains("error[E0101]"), "{}", rendered);
    assert!(rendered.ends_with("error: aborting due to 2 errors\n"), "{}", rendered);
}
