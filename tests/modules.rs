//! Module imports: embedded standard library and search-path files

mod common;

use common::{eval_err, inspect, run_err, run_ok, TempModule};
use eso::{Object, RunError};
use pretty_assertions::assert_eq;

// =============================================================================
// STANDARD LIBRARY
// =============================================================================

#[test]
fn test_import_stdlib_array() {
    let source = r#"
        let arr = import("eso/array");
        let nums = [1, 2, 3, 4, 5];
        let evens = arr.Filter(nums, fn(x) { x % 2 == 0 });
        let doubled = arr::Map(nums, fn(x) { x * 2 });
        [evens, doubled, arr.Sum(nums), arr.Reduce(nums, fn(a, b) { a * b }, 1)]
    "#;
    assert_eq!(inspect(source), "[[2, 4], [2, 4, 6, 8, 10], 15, 120]");
}

#[test]
fn test_stdlib_array_search_helpers() {
    let source = r#"
        let arr = import("eso/array");
        let nums = [4, 9, 2, 7];
        [
            arr.Max(nums),
            arr.Min(nums),
            arr.Find(nums, fn(x) { x > 5 }),
            arr.FindIndex(nums, fn(x) { x > 100 }),
            arr.Find(nums, fn(x) { x > 100 }),
            arr.Max([]),
            arr.Reverse(nums),
            arr.Range(2, 5)
        ]
    "#;
    assert_eq!(inspect(source), "[9, 2, 9, -1, null, null, [7, 2, 9, 4], [2, 3, 4]]");
}

#[test]
fn test_import_with_dotted_stdlib_name() {
    assert_eq!(run_ok(r#"let m = import("eso.math"); m.Factorial(5)"#), Object::Integer(120));
}

#[test]
fn test_stdlib_math() {
    let source = r#"
        let m = import("eso/math");
        [m.Gcd(12, -18), m.Lcm(4, 6), m.Lcm(0, 3), m.Fib(10), m.IsPrime(97), m.IsPrime(91), m.Clamp(15, 0, 10)]
    "#;
    assert_eq!(inspect(source), "[6, 12, 0, 55, true, false, 10]");
}

#[test]
fn test_stdlib_string() {
    let source = r#"
        let s = import("eso/string");
        [s.Capitalize("hello"), s.Words("  a  b c "), s.IsPalindrome("Level"), s.PadLeft("7", 3, "0"), s.Repeat("ab", 2)]
    "#;
    assert_eq!(inspect(source), "[Hello, [a, b, c], true, 007, abab]");
}

#[test]
fn test_stdlib_set() {
    let source = r#"
        let sets = import("eso/set");
        let a = Set([1, 2, 3]);
        let b = Set([2, 3, 4]);
        [sets.Union(a, b), sets.Intersection(a, b), sets.Difference(a, b), sets.IsSubset(Set([2]), a)]
    "#;
    assert_eq!(inspect(source), "[{1, 2, 3, 4}, {2, 3}, {1}, true]");
}

#[test]
fn test_stdlib_bool() {
    let source = r#"
        let b = import("eso/bool");
        [b.Not(true), b.Xor(true, false), b.Xor(true, true), b.ToString(false)]
    "#;
    assert_eq!(inspect(source), "[false, true, false, false]");
}

#[test]
fn test_stdlib_helpers_are_not_exported() {
    assert_eq!(
        eval_err(r#"let m = import("eso/math"); m.gcd(4, 6)"#),
        "value of type `MODULE` has no member `gcd`"
    );
}

#[test]
fn test_module_inspect() {
    assert_eq!(inspect(r#"import("eso/bool")"#), "<module eso/bool>");
}

#[test]
fn test_unknown_stdlib_module() {
    assert_eq!(eval_err(r#"import("eso/http")"#), "ImportError: no module named 'eso/http'");
}

#[test]
fn test_invalid_import_path() {
    assert_eq!(eval_err("import(42)"), "ImportError: invalid import path '42'");
}

// =============================================================================
// SEARCH PATH MODULES
// =============================================================================

#[test]
fn test_import_file_module() {
    let dir = TempModule::new("file_module");
    dir.write("greet", r#"let Hello = fn(name) { "hello " + name }; let Version = 2;"#);
    let result = dir.run(r#"let g = import("greet"); [g.Hello("eso"), g::Version, g["Version"]]"#);
    assert_eq!(result.map(|v| v.inspect()), Ok("[hello eso, 2, 2]".to_string()));
}

#[test]
fn test_only_uppercase_names_are_exported() {
    let dir = TempModule::new("exports");
    dir.write("lib", "let x = 1; let X = 2; let helper = fn() { x }; let Public = fn() { helper() + X };");
    let result = dir.run(r#"let lib = import("lib"); [lib["x"], lib::X, lib.Public()]"#);
    assert_eq!(result.map(|v| v.inspect()), Ok("[null, 2, 3]".to_string()));
}

#[test]
fn test_dotted_name_maps_to_subdirectory() {
    let dir = TempModule::new("nested");
    dir.write("util.text", r#"let Shout = fn(s) { s.upper_case() + "!" };"#);
    let result = dir.run(r#"let t = import("util.text"); t.Shout("hey")"#);
    assert_eq!(result, Ok(Object::from("HEY!")));
}

#[test]
fn test_module_can_import_module() {
    let dir = TempModule::new("chained");
    dir.write("base", "let Two = 2;");
    dir.write("derived", r#"let base = import("base"); let Four = base::Two * 2;"#);
    let result = dir.run(r#"import("derived")::Four"#);
    assert_eq!(result, Ok(Object::Integer(4)));
}

#[test]
fn test_module_scope_is_isolated() {
    let dir = TempModule::new("isolated");
    dir.write("peek", "let Seen = secret;");
    let result = dir.run(r#"let secret = 1; import("peek")"#);
    match result {
        Err(RunError::Eval(err)) => assert_eq!(err.message(), "cannot find 'secret' in scope"),
        other => panic!("expected scope error, got {:?}", other),
    }
}

#[test]
fn test_missing_module() {
    let dir = TempModule::new("missing");
    let result = dir.run(r#"import("nothing.here")"#);
    match result {
        Err(RunError::Eval(err)) => assert_eq!(err.message(), "ImportError: no module named 'nothing.here'"),
        other => panic!("expected import error, got {:?}", other),
    }
    assert!(dir.path().is_dir());
}

#[test]
fn test_parse_error_in_module() {
    let dir = TempModule::new("broken");
    dir.write("broken", "let = 1;\nlet ok = 2;\nlet z = ;");
    match dir.run(r#"import("broken")"#) {
        Err(RunError::Eval(err)) => {
            let message = err.message();
            assert_eq!(message.lines().count(), 2, "{}", message);
            assert!(message.contains("broken.eso:1:"), "{}", message);
        }
        other => panic!("expected module parse error, got {:?}", other),
    }
}

#[test]
fn test_runtime_error_in_module_keeps_module_position() {
    let dir = TempModule::new("failing");
    dir.write("failing", "let A = 1;\nlet B = A / 0;");
    match dir.run(r#"import("failing")"#) {
        Err(RunError::Eval(err)) => {
            assert_eq!(err.message(), "Can't divide by zero");
            let position = err.position.expect("module error keeps a position");
            assert!(position.file.ends_with("failing.eso"), "{}", position);
            assert_eq!(position.line, 2);
        }
        other => panic!("expected runtime error, got {:?}", other),
    }
}

#[test]
fn test_prepended_search_path_wins() {
    let first = TempModule::new("first_path");
    let second = TempModule::new("second_path");
    first.write("pick", "let Which = \"first\";");
    second.write("pick", "let Which = \"second\";");

    let config = first.config().with_search_path(second.path());
    let mut interpreter = eso::Interpreter::with_config(config);
    let result = interpreter.eval_source(r#"import("pick")::Which"#, "main.eso");
    assert_eq!(result, Ok(Object::from("second")));
}

#[test]
fn test_import_without_search_path_fails() {
    match run_err(r#"import("definitely_not_a_module_name")"#) {
        RunError::Eval(err) => assert!(err.message().starts_with("ImportError: no module named")),
        other => panic!("unexpected {:?}", other),
    }
}
