use std::collections::HashMap;

use pretty_assertions::assert_eq;
use redex_core::{Attributes, EmptySymbols, Ex};
use redex_rewrite::{is_match_q, match_pattern, substitute, Bindings, Matcher};

fn sym(s: &str) -> Ex { Ex::symbol(s) }
fn int(n: i64) -> Ex { Ex::int(n) }
fn call(h: &str, args: Vec<Ex>) -> Ex { Ex::call(h, args) }
fn nb(x: &str) -> Ex { call("NamedBlank", vec![sym(x)]) }
fn nb_typed(x: &str, ty: &str) -> Ex { call("NamedBlank", vec![sym(x), sym(ty)]) }

fn attrs(entries: &[(&str, Attributes)]) -> HashMap<String, Attributes> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn named_blanks_bind_positionally() {
    let b = match_pattern(&call("f", vec![int(1), sym("a")]), &call("f", vec![nb("x"), nb("y")]), &EmptySymbols)
        .unwrap();
    assert_eq!(b.get("x"), Some(&int(1)));
    assert_eq!(b.get("y"), Some(&sym("a")));
    assert!(!is_match_q(&call("g", vec![int(1), int(2)]), &call("f", vec![nb("x"), nb("y")]), &EmptySymbols));
    assert!(!is_match_q(&call("f", vec![int(1)]), &call("f", vec![nb("x"), nb("y")]), &EmptySymbols));
}

#[test]
fn repeated_names_must_agree() {
    let pat = call("f", vec![nb("x"), nb("x")]);
    assert!(is_match_q(&call("f", vec![int(1), int(1)]), &pat, &EmptySymbols));
    assert!(!is_match_q(&call("f", vec![int(1), int(2)]), &pat, &EmptySymbols));
}

#[test]
fn head_constraints_and_literals() {
    let pat = call("f", vec![nb_typed("x", "Integer")]);
    assert!(is_match_q(&call("f", vec![int(3)]), &pat, &EmptySymbols));
    assert!(!is_match_q(&call("f", vec![Ex::string("3")]), &pat, &EmptySymbols));
    assert!(is_match_q(&call("f", vec![call("g", vec![])]), &call("f", vec![call("Blank", vec![sym("g")])]), &EmptySymbols));
    // Literal atoms match by identity, not numeric value.
    assert!(is_match_q(&int(1), &int(1), &EmptySymbols));
    assert!(!is_match_q(&Ex::real(1.0), &int(1), &EmptySymbols));
}

#[test]
fn sequences_take_runs_of_arguments() {
    let pat = call("f", vec![call("NamedBlankSequence", vec![sym("x")]), nb("y")]);
    let b = match_pattern(&call("f", vec![int(1), int(2), int(3)]), &pat, &EmptySymbols).unwrap();
    assert_eq!(b.get("x"), Some(&call("Sequence", vec![int(1), int(2)])));
    assert_eq!(b.get("y"), Some(&int(3)));
    assert!(!is_match_q(&call("f", vec![int(1)]), &pat, &EmptySymbols));

    let null = call("f", vec![call("NamedBlankNullSequence", vec![sym("x")])]);
    let b = match_pattern(&call("f", vec![]), &null, &EmptySymbols).unwrap();
    assert_eq!(b.get("x"), Some(&call("Sequence", vec![])));
}

#[test]
fn optional_may_be_absent() {
    let pat = call("g", vec![nb("x"), call("Optional", vec![nb("y")])]);
    let b = match_pattern(&call("g", vec![int(1)]), &pat, &EmptySymbols).unwrap();
    assert_eq!(b.get("x"), Some(&int(1)));
    assert!(!b.contains_key("y"));
    let b = match_pattern(&call("g", vec![int(1), int(2)]), &pat, &EmptySymbols).unwrap();
    assert_eq!(b.get("y"), Some(&int(2)));
}

#[test]
fn conditions_tests_and_alternatives() {
    let positive = call("Condition", vec![nb("x"), call("Greater", vec![sym("x"), int(0)])]);
    assert!(is_match_q(&int(5), &positive, &EmptySymbols));
    assert!(!is_match_q(&int(-1), &positive, &EmptySymbols));
    assert!(!is_match_q(&sym("a"), &positive, &EmptySymbols));

    let even = call("PatternTest", vec![call("Blank", vec![]), sym("EvenQ")]);
    assert!(is_match_q(&int(4), &even, &EmptySymbols));
    assert!(!is_match_q(&int(3), &even, &EmptySymbols));
    let unknown = call("PatternTest", vec![call("Blank", vec![]), sym("NoSuchQ")]);
    assert!(!is_match_q(&int(4), &unknown, &EmptySymbols));

    let alt = call("f", vec![call("Alternative", vec![int(1), int(2)])]);
    assert!(is_match_q(&call("f", vec![int(2)]), &alt, &EmptySymbols));
    assert!(!is_match_q(&call("f", vec![int(3)]), &alt, &EmptySymbols));
}

#[test]
fn pattern_wraps_a_subpattern() {
    let pat = call("Pattern", vec![sym("p"), call("g", vec![nb("x")])]);
    let b = match_pattern(&call("g", vec![int(7)]), &pat, &EmptySymbols).unwrap();
    assert_eq!(b.get("p"), Some(&call("g", vec![int(7)])));
    assert_eq!(b.get("x"), Some(&int(7)));
    assert!(is_match_q(&sym("a"), &call("HoldPattern", vec![sym("a")]), &EmptySymbols));
}

#[test]
fn failed_match_leaves_bindings_untouched() {
    let m = Matcher::new(&EmptySymbols);
    let mut binds = Bindings::new();
    binds.insert("z".into(), int(0));
    let ok = m.match_into(&call("f", vec![int(1), int(2)]), &call("f", vec![nb("x"), nb("x")]), &mut binds);
    assert!(!ok);
    assert_eq!(binds.len(), 1);
    assert_eq!(binds.get("z"), Some(&int(0)));

    // A prior binding constrains the match.
    let ok = m.match_into(&call("f", vec![int(1)]), &call("f", vec![nb("z")]), &mut binds);
    assert!(!ok);
    assert_eq!(binds.len(), 1);
}

#[test]
fn orderless_heads_match_any_arrangement() {
    let syms = attrs(&[("g", Attributes::ORDERLESS)]);
    let pat = call("g", vec![nb_typed("x", "String"), int(1)]);
    let b = match_pattern(&call("g", vec![int(1), Ex::string("a")]), &pat, &syms).unwrap();
    assert_eq!(b.get("x"), Some(&Ex::string("a")));
    assert!(!is_match_q(&call("g", vec![int(1), Ex::string("a")]), &pat, &EmptySymbols));

    let rest = call("g", vec![int(1), call("NamedBlankNullSequence", vec![sym("r")])]);
    let b = match_pattern(&call("g", vec![int(3), int(1), int(2)]), &rest, &syms).unwrap();
    assert_eq!(b.get("r"), Some(&call("Sequence", vec![int(3), int(2)])));
}

#[test]
fn flat_heads_group_contiguous_runs() {
    let syms = attrs(&[("h", Attributes::FLAT)]);
    let pat = call("h", vec![nb("x"), nb("y")]);
    let b = match_pattern(&call("h", vec![sym("a"), sym("b"), sym("c")]), &pat, &syms).unwrap();
    assert_eq!(b.get("x"), Some(&sym("a")));
    assert_eq!(b.get("y"), Some(&call("h", vec![sym("b"), sym("c")])));
    assert!(!is_match_q(&call("h", vec![sym("a"), sym("b"), sym("c")]), &pat, &EmptySymbols));
}

#[test]
fn flat_orderless_last_pattern_absorbs_the_rest() {
    let syms = attrs(&[("Plus", Attributes::FLAT | Attributes::ORDERLESS)]);
    let pat = call("Plus", vec![int(1), nb("x")]);
    let b = match_pattern(&call("Plus", vec![sym("a"), int(1), sym("b")]), &pat, &syms).unwrap();
    assert_eq!(b.get("x"), Some(&call("Plus", vec![sym("a"), sym("b")])));
}

#[test]
fn flat_orderless_matching_ignores_pattern_argument_order() {
    let syms = attrs(&[("Plus", Attributes::FLAT | Attributes::ORDERLESS)]);
    let target = call("Plus", vec![int(1), sym("a"), sym("b")]);
    let leading = call("Plus", vec![int(1), nb("y")]);
    let trailing = call("Plus", vec![nb("y"), int(1)]);
    assert_eq!(is_match_q(&target, &leading, &syms), is_match_q(&target, &trailing, &syms));
    let b = match_pattern(&target, &trailing, &syms).unwrap();
    assert_eq!(b.get("y"), Some(&call("Plus", vec![sym("a"), sym("b")])));

    // Typed single slot listed before and after the absorbing one.
    let typed = call("Plus", vec![nb("rest"), nb_typed("n", "Integer")]);
    let b = match_pattern(&call("Plus", vec![sym("a"), int(5), sym("b")]), &typed, &syms).unwrap();
    assert_eq!(b.get("n"), Some(&int(5)));
    assert_eq!(b.get("rest"), Some(&call("Plus", vec![sym("a"), sym("b")])));
}

#[test]
fn predicate_hook_overrides_builtins() {
    let small = |f: &Ex, e: &Ex| f.is_symbol("SmallQ") && matches!(e, Ex::Integer(n) if *n < 10);
    let m = Matcher::new(&EmptySymbols).with_predicate(&small);
    let pat = call("PatternTest", vec![call("Blank", vec![]), sym("SmallQ")]);
    assert!(m.matches(&int(3), &pat));
    assert!(!m.matches(&int(30), &pat));
    assert!(!is_match_q(&int(3), &pat, &EmptySymbols));
}

#[test]
fn substitution_copies_and_splices() {
    let mut b = Bindings::new();
    b.insert("x".into(), call("Sequence", vec![int(1), int(2)]));
    b.insert("y".into(), sym("a"));
    let out = substitute(&call("g", vec![sym("x"), sym("y"), sym("z")]), &b);
    assert_eq!(out, call("g", vec![int(1), int(2), sym("a"), sym("z")]));

    let bound = b.get("y").unwrap();
    let leaf = out.as_expr().unwrap().arg(2).unwrap();
    match (bound, leaf) {
        (Ex::Symbol(s1), Ex::Symbol(s2)) => assert!(!s1.shares_storage(s2)),
        _ => unreachable!(),
    }
}
