//! Rule application.
//!
//! Every successful application instantiates a deep copy of the right-hand
//! side, so one rule can fire at many sites without the results aliasing.

use log::trace;
use redex_core::{Ex, Expression, SymbolTable};

use crate::matcher::{is_sequence_like, remaining, substitute, Bindings, Matcher};
use crate::permutations::Permutations;
use crate::rule::Rule;

/// Replaces, in place, every element of `components` that matches the rule
/// as a whole. Returns how many elements were replaced.
pub fn iterable_replace(components: &mut [Ex], rule: &Rule, syms: &dyn SymbolTable) -> usize {
    let m = Matcher::new(syms);
    let mut replaced = 0;
    for c in components.iter_mut() {
        if let Some(b) = m.match_with(c, rule.lhs()) {
            *c = substitute(rule.rhs(), &b);
            replaced += 1;
        }
    }
    replaced
}

/// One application of a rule with `lhs_components.len()` components to an
/// orderless argument list: finds distinct elements matching the components,
/// removes them and appends the instantiated `rhs`. The other elements keep
/// their relative order. Returns `false`, leaving `components` untouched, when
/// no assignment exists.
pub fn commutative_replace(
    components: &mut Vec<Ex>,
    lhs_components: &[Ex],
    rhs: &Ex,
    syms: &dyn SymbolTable,
) -> bool {
    commutative_replace_with(&Matcher::new(syms), components, lhs_components, rhs)
}

pub(crate) fn commutative_replace_with(
    m: &Matcher<'_>,
    components: &mut Vec<Ex>,
    lhs_components: &[Ex],
    rhs: &Ex,
) -> bool {
    let k = lhs_components.len();
    if k == 0 || k > components.len() {
        return false;
    }
    let found = if k == 2 {
        find_pair(m, components, lhs_components)
    } else {
        Permutations::new(components.len(), k).find_map(|picks| {
            let mut b = Bindings::new();
            let ok = lhs_components.iter().zip(&picks).all(|(p, &i)| m.match_into(&components[i], p, &mut b));
            ok.then_some((picks, b))
        })
    };
    let Some((picks, binds)) = found else {
        trace!("no assignment of {} components among {} arguments", k, components.len());
        return false;
    };
    let mut next = remaining(components, &picks);
    next.push(substitute(rhs, &binds));
    *components = next;
    true
}

fn find_pair(m: &Matcher<'_>, components: &[Ex], lhs: &[Ex]) -> Option<(Vec<usize>, Bindings)> {
    for (i, first) in components.iter().enumerate() {
        let mut b = Bindings::new();
        if !m.match_into(first, &lhs[0], &mut b) {
            continue;
        }
        for (j, second) in components.iter().enumerate() {
            if j != i && m.match_into(second, &lhs[1], &mut b) {
                return Some((vec![i, j], b));
            }
        }
    }
    None
}

/// Applies `rule` at the outermost positions where it matches.
pub fn replace(ex: &Ex, rule: &Rule, syms: &dyn SymbolTable) -> Ex { replace_all(ex, std::slice::from_ref(rule), syms) }

/// Single top-down pass: at each node the first rule that matches wins and
/// the result is not visited again. An orderless node that no rule matches
/// as a whole may still have a subset of its arguments rewritten by a rule
/// with the same head and fewer arguments.
pub fn replace_all(ex: &Ex, rules: &[Rule], syms: &dyn SymbolTable) -> Ex {
    let m = Matcher::new(syms);
    replace_with(&m, ex, rules).unwrap_or_else(|| ex.clone())
}

/// `None` when nothing changed.
pub(crate) fn replace_with(m: &Matcher<'_>, ex: &Ex, rules: &[Rule]) -> Option<Ex> {
    for r in rules {
        if let Some(b) = m.match_with(ex, r.lhs()) {
            return Some(substitute(r.rhs(), &b));
        }
    }
    let e = ex.as_expr()?;
    if let Some(out) = subset_replace(m, e, rules) {
        return Some(out);
    }
    let head = replace_with(m, e.head(), rules);
    let mut args: Option<Vec<Ex>> = None;
    for (i, a) in e.args().iter().enumerate() {
        match replace_with(m, a, rules) {
            Some(r) => {
                let out = args.get_or_insert_with(|| e.args()[..i].to_vec());
                match r {
                    Ex::Expr(s) if s.has_head("Sequence") => out.extend(s.into_parts().1),
                    other => out.push(other),
                }
            }
            None => {
                if let Some(out) = args.as_mut() {
                    out.push(a.clone());
                }
            }
        }
    }
    if head.is_none() && args.is_none() {
        return None;
    }
    let head = head.unwrap_or_else(|| e.head().clone());
    Some(Ex::expr(head, args.unwrap_or_else(|| e.args().to_vec())))
}

fn subset_replace(m: &Matcher<'_>, e: &Expression, rules: &[Rule]) -> Option<Ex> {
    let head = e.head_name()?;
    if !m.symbols().is_orderless(head) {
        return None;
    }
    for r in rules {
        let Some(lhs) = r.lhs().as_call(head) else { continue };
        if lhs.arg_count() == 0 || lhs.arg_count() >= e.arg_count() || lhs.args().iter().any(is_sequence_like) {
            continue;
        }
        let mut args = e.args().to_vec();
        if commutative_replace_with(m, &mut args, lhs.args(), r.rhs()) {
            return Some(Ex::expr(e.head().clone(), args));
        }
    }
    None
}
