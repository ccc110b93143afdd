use pretty_assertions::assert_eq;
use redex_core::Ex;

fn sym(s: &str) -> Ex { Ex::symbol(s) }
fn call(h: &str, args: Vec<Ex>) -> Ex { Ex::call(h, args) }

fn cond(value: Ex, c: Ex) -> Ex { call("ConditionalExpression", vec![value, c]) }

#[test]
fn single_condition_is_hoisted() {
    // F[ConditionalExpression[x, c1], y] -> ConditionalExpression[F[x, y], And[c1]]
    let e = call("F", vec![cond(sym("x"), sym("c1")), sym("y")]);
    let out = e.as_expr().unwrap().propagate_conditionals().unwrap();
    assert_eq!(out, cond(call("F", vec![sym("x"), sym("y")]), call("And", vec![sym("c1")])));
}

#[test]
fn conditions_are_joined_in_argument_order() {
    let e = call("F", vec![cond(sym("a"), sym("c2")), sym("b"), cond(sym("c"), sym("c1"))]);
    let out = e.as_expr().unwrap().propagate_conditionals().unwrap();
    assert_eq!(
        out,
        cond(call("F", vec![sym("a"), sym("b"), sym("c")]), call("And", vec![sym("c2"), sym("c1")]))
    );
}

#[test]
fn no_condition_reports_not_found() {
    let e = call("F", vec![sym("x"), sym("y")]);
    assert!(e.as_expr().unwrap().propagate_conditionals().is_none());
}

#[test]
fn malformed_conditionals_are_left_alone() {
    // A ConditionalExpression with the wrong arity is just an argument.
    let odd = call("ConditionalExpression", vec![sym("x")]);
    let e = call("F", vec![odd]);
    assert!(e.as_expr().unwrap().propagate_conditionals().is_none());
}
