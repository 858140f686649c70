//! Builtin functions and per-type methods as seen from scripts

mod common;

use common::{eval_err, inspect, run_ok, run_printed};
use eso::Object;
use pretty_assertions::assert_eq;

// =============================================================================
// GENERAL BUILTINS
// =============================================================================

#[test]
fn test_count_and_len() {
    assert_eq!(inspect(r#"[count("héllo"), len([1, 2]), count({"a": 1}), count(Set([1, 1, 2]))]"#), "[5, 2, 1, 2]");
}

#[test]
fn test_type_of() {
    let source = r#"[type_of(1), type_of(1.5), type_of("s"), type_of(true), type_of([]), type_of({}), type_of(Set()), type_of(fn() {}), type_of(len)]"#;
    assert_eq!(inspect(source), "[INTEGER, FLOAT, STRING, BOOLEAN, ARRAY, HASH, SET, FUNCTION, BUILTIN]");
}

#[test]
fn test_conversions() {
    assert_eq!(inspect(r#"[int("42"), int("0x1f"), int(3.7), float("2.5"), float(2), str([1, "a"])]"#), "[42, 31, 3, 2.5, 2.0, [1, a]]");
    assert_eq!(eval_err(r#"int("abc")"#), "could not convert 'abc' to INTEGER");
}

#[test]
fn test_builtin_arity_message() {
    assert_eq!(eval_err("count()"), "TypeError: count() takes exactly 1 argument (0 given)");
}

#[test]
fn test_builtins_can_be_shadowed() {
    assert_eq!(run_ok("let count = fn(x) { 99 }; count([1])"), Object::Integer(99));
}

#[test]
fn test_builtins_are_values() {
    assert_eq!(run_ok("let size = len; size([1, 2, 3])"), Object::Integer(3));
}

#[test]
fn test_print_formats_values() {
    assert_eq!(
        run_printed(r#"println(1, 2.0, "s", [1, "a"], {"k": "v"}, Set([3]), true)"#),
        "1 2.0 s [1, a] {\"k\": \"v\"} {3} true\n"
    );
}

// =============================================================================
// NAMESPACED BUILTINS
// =============================================================================

#[test]
fn test_array_namespace() {
    let source = r#"
        let a = [3, 1, 2];
        let sorted = array.sort(a);
        [array.new(3, 0), array.get(a, 1), array.getFirst(a), array.getLast(a), array.indexOf(a, 2), sorted, a, array.rest(a)]
    "#;
    assert_eq!(inspect(source), "[[0, 0, 0], 1, 3, 2, 2, [1, 2, 3], [3, 1, 2], [1, 2]]");
}

#[test]
fn test_array_namespace_mutation() {
    assert_eq!(inspect("let a = [1]; array.append(a, 2, 3); let last = array.pop(a); [a, last]"), "[[1, 2], 3]");
}

#[test]
fn test_string_namespace() {
    assert_eq!(
        inspect(r#"[string.upper("abc"), string.lower("ABC"), string.contains("haystack", "st")]"#),
        "[ABC, abc, true]"
    );
}

#[test]
fn test_math_namespace() {
    assert_eq!(
        inspect("[math.abs(-4), math.abs(-2.5), math.pow(2, 10), math.sqrt(16), math.floor(2.7), math.ceil(2.1)]"),
        "[4, 2.5, 1024, 4.0, 2, 3]"
    );
    assert_eq!(eval_err("math.sqrt(-1)"), "math.sqrt: negative number -1");
}

#[test]
fn test_random_ranges() {
    let source = r#"
        let ok = true;
        let i = 0;
        while (i < 50) {
            let n = math.randomInt(1, 3);
            let f = math.randomFloat();
            ok = ok && n >= 1 && n <= 3 && f >= 0.0 && f < 1.0;
            i += 1;
        }
        ok
    "#;
    assert_eq!(run_ok(source), Object::Boolean(true));
}

#[test]
fn test_json_round_trip_through_script() {
    let source = r#"
        let data = json.parse("{\"name\": \"eso\", \"tags\": [1, 2.5, null], \"ok\": true}");
        [data["name"], data["tags"], data["ok"], json.stringify({"a": [1, "x"], "b": false})]
    "#;
    assert_eq!(inspect(source), r#"[eso, [1, 2.5, null], true, {"a":[1,"x"],"b":false}]"#);
}

#[test]
fn test_json_parse_error() {
    assert!(eval_err(r#"json.parse("{oops")"#).starts_with("json.parse:"));
}

// =============================================================================
// METHODS
// =============================================================================

#[test]
fn test_string_methods() {
    let source = r#"
        let s = "  Hello World  ";
        let t = s.trim();
        [t.length(), t.upper_case(), t.lower_case(), t.reverse(), t.contains("World"), t.split(" "), "12".to_int(), "x".to_int(), "".empty()]
    "#;
    assert_eq!(inspect(source), "[11, HELLO WORLD, hello world, dlroW olleH, true, [Hello, World], 12, 0, true]");
}

#[test]
fn test_number_methods() {
    assert_eq!(
        inspect("let n = -5; let f = 2.5; [n.abs(), n.to_string(), n.to_float(), f.round(), f.floor(), f.ceil(), f.to_int()]"),
        "[5, -5, -5.0, 3, 2, 3, 2]"
    );
}

#[test]
fn test_array_methods_mutate_in_place() {
    let source = r#"
        let a = [3, 1, 2];
        a.append(4).sort();
        let popped = a.pop();
        [a, popped, a.index_of(2), a.index_of(9), a.contains(3), a.join("-"), a.get(10)]
    "#;
    assert_eq!(inspect(source), "[[1, 2, 3], 4, 1, -1, true, 1-2-3, null]");
}

#[test]
fn test_array_fill() {
    assert_eq!(inspect("let a = [0, 0, 0, 0]; a.fill(7, 1, 3); a"), "[0, 7, 7, 0]");
}

#[test]
fn test_sort_rejects_mixed_types() {
    assert!(eval_err(r#"[1, "a"].sort()"#).starts_with("TypeError"));
}

#[test]
fn test_hash_methods() {
    let source = r#"
        let h = {"a": 1};
        h.set("b", 2);
        h.set("c", 3).delete("a");
        [h.keys(), h.values(), h.entries(), h.get("z", 0), h.contains("b"), h.length()]
    "#;
    assert_eq!(inspect(source), "[[b, c], [2, 3], [[b, 2], [c, 3]], 0, true, 2]");
}

#[test]
fn test_set_methods() {
    let source = r#"
        let s = Set([1, 2]);
        s.insert(2);
        s.insert("2");
        s.delete(1);
        [s, s.size(), s.contains("2"), s.isEmpty(), s.to_array()]
    "#;
    assert_eq!(inspect(source), "[{2}, 1, true, false, [2]]");
}

#[test]
fn test_method_argument_errors() {
    assert_eq!(
        eval_err(r#""abc".contains(1)"#),
        "TypeError: String.contains() expected argument #1 to be `STRING` got `INTEGER`"
    );
}
