use pretty_assertions::assert_eq;
use redex_core::{Attributes, Ex, RedexError};
use redex_rewrite::{rewrite_all, rewrite_once, rewrite_rules, rewrite_with_limit, DefKind, EvalState, Rule};

fn sym(s: &str) -> Ex { Ex::symbol(s) }
fn int(n: i64) -> Ex { Ex::int(n) }
fn call(h: &str, args: Vec<Ex>) -> Ex { Ex::call(h, args) }
fn nb(x: &str) -> Ex { call("NamedBlank", vec![sym(x)]) }

fn init_logs() { let _ = env_logger::builder().is_test(true).try_init(); }

#[test]
fn down_values_rewrite_to_fixpoint() {
    init_logs();
    let mut st = EvalState::new();
    st.define(Rule::delayed(call("f", vec![nb("x")]), call("g", vec![sym("x")]))).unwrap();
    st.define(Rule::immediate(sym("a"), sym("b"))).unwrap();
    st.define(Rule::immediate(sym("b"), sym("c"))).unwrap();
    assert!(st.rules(DefKind::Down, "f").is_some());
    assert!(st.rules(DefKind::Own, "a").is_some());

    let out = rewrite_all(&call("h", vec![call("f", vec![sym("a")])]), &st).unwrap();
    assert_eq!(out, call("h", vec![call("g", vec![sym("c")])]));
}

#[test]
fn rewrite_once_is_a_single_pass() {
    let mut st = EvalState::new();
    st.define(Rule::immediate(sym("a"), sym("b"))).unwrap();
    st.define(Rule::immediate(sym("b"), sym("c"))).unwrap();
    assert_eq!(rewrite_once(&call("h", vec![sym("a")]), &st), call("h", vec![sym("b")]));
}

#[test]
fn redefinition_overwrites_identical_lhs() {
    let mut st = EvalState::new();
    st.define(Rule::immediate(sym("a"), int(1))).unwrap();
    st.define(Rule::immediate(sym("a"), int(2))).unwrap();
    assert_eq!(st.rules(DefKind::Own, "a").map(|rs| rs.len()), Some(1));
    assert_eq!(rewrite_all(&sym("a"), &st).unwrap(), int(2));
}

#[test]
fn conditional_definitions_pick_a_branch() {
    let mut st = EvalState::new();
    let guarded = |op: &str| call("sign", vec![call("Condition", vec![nb("x"), call(op, vec![sym("x"), int(0)])])]);
    st.define(Rule::delayed(guarded("Greater"), sym("pos"))).unwrap();
    st.define(Rule::delayed(guarded("Less"), sym("neg"))).unwrap();
    let input = call("List", vec![call("sign", vec![int(3)]), call("sign", vec![int(-2)]), call("sign", vec![int(0)])]);
    let out = rewrite_all(&input, &st).unwrap();
    assert_eq!(out, call("List", vec![sym("pos"), sym("neg"), call("sign", vec![int(0)])]));
}

#[test]
fn up_and_sub_values() {
    let mut st = EvalState::new();
    st.define_up("q", Rule::immediate(call("area", vec![sym("q")]), int(42))).unwrap();
    st.define(Rule::immediate(Ex::expr(call("g", vec![nb("n")]), vec![nb("x")]), call("pair", vec![sym("n"), sym("x")])))
        .unwrap();
    assert!(st.rules(DefKind::Up, "q").is_some());
    assert!(st.rules(DefKind::Sub, "g").is_some());

    assert_eq!(rewrite_all(&call("area", vec![sym("q")]), &st).unwrap(), int(42));
    let curried = Ex::expr(call("g", vec![int(1)]), vec![int(2)]);
    assert_eq!(rewrite_all(&curried, &st).unwrap(), call("pair", vec![int(1), int(2)]));
}

#[test]
fn flat_orderless_heads_are_normalized() {
    let st = EvalState::with_standard_attributes();
    let input = call("Plus", vec![sym("c"), sym("a"), call("Plus", vec![sym("d"), sym("b")])]);
    let out = rewrite_all(&input, &st).unwrap();
    assert_eq!(out, call("Plus", vec![sym("a"), sym("b"), sym("c"), sym("d")]));
}

#[test]
fn down_values_match_inside_flat_orderless_arguments() {
    let mut st = EvalState::with_standard_attributes();
    let lhs = call("g", vec![call("Plus", vec![nb("y"), int(1)])]);
    st.define(Rule::delayed(lhs, call("hit", vec![sym("y")]))).unwrap();
    let input = call("g", vec![call("Plus", vec![sym("a"), int(1), sym("b")])]);
    let out = rewrite_all(&input, &st).unwrap();
    assert_eq!(out, call("hit", vec![call("Plus", vec![sym("a"), sym("b")])]));
}

#[test]
fn sequences_splice_into_the_parent() {
    let mut st = EvalState::new();
    st.define(Rule::immediate(sym("both"), call("Sequence", vec![int(1), int(2)]))).unwrap();
    let out = rewrite_all(&call("f", vec![sym("both"), int(3)]), &st).unwrap();
    assert_eq!(out, call("f", vec![int(1), int(2), int(3)]));
}

#[test]
fn conditions_are_hoisted_during_rewriting() {
    let st = EvalState::new();
    let input = call("F", vec![call("ConditionalExpression", vec![sym("x"), sym("c1")]), sym("y")]);
    let out = rewrite_all(&input, &st).unwrap();
    let expected = call(
        "ConditionalExpression",
        vec![call("F", vec![sym("x"), sym("y")]), call("And", vec![sym("c1")])],
    );
    assert_eq!(out, expected);
}

#[test]
fn non_terminating_rules_hit_the_limit() {
    let mut st = EvalState::new();
    st.define(Rule::immediate(sym("a"), call("f", vec![sym("a")]))).unwrap();
    let err = rewrite_with_limit(&sym("a"), &st, 10).unwrap_err();
    assert_eq!(err, RedexError::IterationLimit { limit: 10 });
}

#[test]
fn normal_form_is_tied_to_the_generation() {
    let mut st = EvalState::new();
    st.define(Rule::immediate(sym("a"), sym("b"))).unwrap();
    let out = rewrite_all(&call("h", vec![sym("a")]), &st).unwrap();
    assert!(out.is_normal_under(st.generation()));
    assert_eq!(rewrite_all(&out, &st).unwrap(), call("h", vec![sym("b")]));

    let before = st.generation();
    st.define(Rule::immediate(sym("b"), sym("c"))).unwrap();
    assert!(st.generation() > before);
    assert!(!out.is_normal_under(st.generation()));
    assert_eq!(rewrite_all(&out, &st).unwrap(), call("h", vec![sym("c")]));
}

#[test]
fn protected_symbols_and_non_patterns_are_rejected() {
    let mut st = EvalState::new();
    st.set_attributes("f", Attributes::PROTECTED);
    let err = st.define(Rule::immediate(call("f", vec![nb("x")]), int(1))).unwrap_err();
    assert_eq!(err, RedexError::Protected("f".into()));
    assert!(!st.is_defined("f"));

    assert!(matches!(st.define(Rule::immediate(int(1), int(2))), Err(RedexError::NotAPattern(_))));
    assert!(matches!(
        st.define(Rule::immediate(call("Blank", vec![]), int(2))),
        Err(RedexError::NotAPattern(_))
    ));
}

#[test]
fn clearing_definitions_stops_rewriting() {
    let mut st = EvalState::new();
    st.define(Rule::immediate(sym("a"), sym("b"))).unwrap();
    assert!(st.is_defined("a"));
    st.clear_definitions("a");
    assert!(!st.is_defined("a"));
    assert_eq!(rewrite_all(&sym("a"), &st).unwrap(), sym("a"));
}

#[test]
fn explicit_rule_lists_repeat_until_stable() {
    let st = EvalState::new();
    let rules = [Rule::immediate(sym("a"), sym("b")), Rule::immediate(sym("b"), sym("c"))];
    assert_eq!(rewrite_rules(&call("f", vec![sym("a")]), &rules, &st, 10).unwrap(), call("f", vec![sym("c")]));

    let looping = [Rule::immediate(sym("a"), call("f", vec![sym("a")]))];
    assert_eq!(
        rewrite_rules(&sym("a"), &looping, &st, 5).unwrap_err(),
        RedexError::IterationLimit { limit: 5 }
    );
}

#[test]
fn rules_round_trip_through_json() {
    let rule = Rule::delayed(call("f", vec![nb("x")]), call("g", vec![sym("x"), Ex::real(0.5), Ex::string("s")]));
    let text = serde_json::to_string(&rule).unwrap();
    let back: Rule = serde_json::from_str(&text).unwrap();
    assert_eq!(back, rule);
    assert!(back.is_delayed());
}
