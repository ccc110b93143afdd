//! Pattern matching.
//!
//! Matching is a pure predicate over the target. Every internal step works
//! on a local copy of the bindings and only commits it on success, so a
//! failed attempt never leaks partial bindings to the caller.
//!
//! Pattern vocabulary: `Blank[h?]`, `NamedBlank[x, h?]`, `Pattern[x, p]`,
//! `BlankSequence[h?]`, `BlankNullSequence[h?]`, `NamedBlankSequence[x, h?]`,
//! `NamedBlankNullSequence[x, h?]`, `Condition[p, c]`, `PatternTest[p, f]`,
//! `Alternative[p...]`, `Optional[p]` and `HoldPattern[p]`.

use std::collections::HashMap;

use log::trace;
use redex_core::{Equality, Ex, Expression, SymbolTable};

use crate::permutations::Permutations;

pub type Bindings = HashMap<String, Ex>;

const PATTERN_HEADS: &[&str] = &[
    "Blank",
    "NamedBlank",
    "Pattern",
    "BlankSequence",
    "BlankNullSequence",
    "NamedBlankSequence",
    "NamedBlankNullSequence",
    "Condition",
    "PatternTest",
    "Alternative",
    "Alternatives",
    "Optional",
    "HoldPattern",
];

pub fn is_pattern_head(name: &str) -> bool { PATTERN_HEADS.contains(&name) }

/// Whether `ex` contains no pattern construct, i.e. it can only match terms
/// that are `same_q` to it.
pub fn is_pattern_free(ex: &Ex) -> bool {
    match ex {
        Ex::Expr(e) => !e.head_name().map_or(false, is_pattern_head) && e.parts().all(is_pattern_free),
        _ => true,
    }
}

/// The term a left-hand side is keyed on, looking through `HoldPattern[p]`
/// and `Condition[p, c]`.
pub fn pattern_core(lhs: &Ex) -> &Ex {
    match lhs.as_expr() {
        Some(e) if (e.has_head("HoldPattern") && e.arg_count() == 1) || (e.has_head("Condition") && e.arg_count() == 2) => {
            pattern_core(&e.args()[0])
        }
        _ => lhs,
    }
}

pub fn is_match_q(expr: &Ex, pattern: &Ex, syms: &dyn SymbolTable) -> bool { Matcher::new(syms).matches(expr, pattern) }

pub fn match_pattern(expr: &Ex, pattern: &Ex, syms: &dyn SymbolTable) -> Option<Bindings> {
    Matcher::new(syms).match_with(expr, pattern)
}

/// Matching context: the symbol table plus optional hooks that decide
/// `Condition` tests and `PatternTest` predicates. Without hooks a small
/// built-in vocabulary is understood.
pub struct Matcher<'a> {
    syms: &'a dyn SymbolTable,
    pub eval_pred: Option<&'a dyn Fn(&Ex, &Ex) -> bool>,
    pub eval_cond: Option<&'a dyn Fn(&Ex, &Bindings) -> bool>,
}

struct SeqSpec<'p> {
    min: usize,
    name: Option<&'p str>,
    ty: Option<&'p Ex>,
}

fn sequence_spec(p: &Ex) -> Option<SeqSpec<'_>> {
    let e = p.as_expr()?;
    let named = |min| {
        let name = e.arg(0)?.as_symbol()?;
        Some(SeqSpec { min, name: Some(name), ty: e.arg(1) })
    };
    match e.head_name()? {
        "BlankSequence" => Some(SeqSpec { min: 1, name: None, ty: e.arg(0) }),
        "BlankNullSequence" => Some(SeqSpec { min: 0, name: None, ty: e.arg(0) }),
        "NamedBlankSequence" => named(1),
        "NamedBlankNullSequence" => named(0),
        "Pattern" if e.arg_count() == 2 => {
            let name = e.args()[0].as_symbol()?;
            let inner = sequence_spec(&e.args()[1])?;
            if inner.name.is_some() {
                return None;
            }
            Some(SeqSpec { name: Some(name), ..inner })
        }
        _ => None,
    }
}

fn optional_inner(p: &Ex) -> Option<&Ex> { p.as_call("Optional").and_then(|e| e.arg(0)) }

pub(crate) fn is_sequence_like(p: &Ex) -> bool { sequence_spec(p).is_some() || optional_inner(p).is_some() }

fn min_required(pats: &[Ex]) -> usize {
    pats.iter()
        .map(|p| match sequence_spec(p) {
            Some(spec) => spec.min,
            None if optional_inner(p).is_some() => 0,
            None => 1,
        })
        .sum()
}

fn head_matches(ty: &Ex, expr: &Ex) -> bool {
    match ty {
        Ex::Symbol(s) => expr.head_name() == Some(s.name()),
        _ => ty.same_q(&expr.head()),
    }
}

fn bind(binds: &mut Bindings, name: &str, value: &Ex) -> bool {
    match binds.get(name) {
        Some(prev) => prev.same_q(value),
        None => {
            binds.insert(name.to_string(), value.clone());
            true
        }
    }
}

/// Targets not picked by `picked`, in their original order.
pub(crate) fn remaining(exprs: &[Ex], picked: &[usize]) -> Vec<Ex> {
    let mut taken = vec![false; exprs.len()];
    for &i in picked {
        taken[i] = true;
    }
    exprs.iter().zip(taken).filter(|(_, t)| !t).map(|(e, _)| e.clone()).collect()
}

/// A run of arguments of a flat head seen as one term.
fn grouped(head: &Ex, mut items: Vec<Ex>) -> Ex {
    if items.len() == 1 {
        return items.remove(0);
    }
    Ex::expr(head.clone(), items)
}

impl<'a> Matcher<'a> {
    pub fn new(syms: &'a dyn SymbolTable) -> Self { Self { syms, eval_pred: None, eval_cond: None } }

    pub fn with_predicate(mut self, f: &'a dyn Fn(&Ex, &Ex) -> bool) -> Self {
        self.eval_pred = Some(f);
        self
    }

    pub fn with_condition(mut self, f: &'a dyn Fn(&Ex, &Bindings) -> bool) -> Self {
        self.eval_cond = Some(f);
        self
    }

    pub fn symbols(&self) -> &'a dyn SymbolTable { self.syms }

    pub fn matches(&self, expr: &Ex, pat: &Ex) -> bool { self.match_with(expr, pat).is_some() }

    pub fn match_with(&self, expr: &Ex, pat: &Ex) -> Option<Bindings> {
        let mut b = Bindings::new();
        let ok = self.match_into(expr, pat, &mut b);
        trace!("match {} against {}: {}", expr, pat, ok);
        if ok { Some(b) } else { None }
    }

    /// Extends `binds` with the bindings of a successful match. On failure
    /// `binds` is left as it was.
    pub fn match_into(&self, expr: &Ex, pat: &Ex, binds: &mut Bindings) -> bool { self.match_pat(pat, expr, binds) }

    fn match_pat(&self, pat: &Ex, expr: &Ex, binds: &mut Bindings) -> bool {
        let p = match pat {
            Ex::Expr(p) => p,
            _ => return pat.same_q(expr),
        };
        match p.head_name() {
            Some("Blank") => p.arg(0).map_or(true, |ty| head_matches(ty, expr)),
            Some("NamedBlank") => {
                let Some(name) = p.arg(0).and_then(Ex::as_symbol) else { return false };
                if let Some(ty) = p.arg(1) {
                    if !head_matches(ty, expr) {
                        return false;
                    }
                }
                bind(binds, name, expr)
            }
            Some("BlankSequence" | "BlankNullSequence" | "NamedBlankSequence" | "NamedBlankNullSequence") => {
                // Outside an argument list a term is a one-element sequence.
                match sequence_spec(pat) {
                    Some(spec) => self.match_sequence(&spec, std::slice::from_ref(expr), binds),
                    None => false,
                }
            }
            Some("Pattern") if p.arg_count() == 2 => {
                let Some(name) = p.args()[0].as_symbol() else { return false };
                let mut local = binds.clone();
                if self.match_pat(&p.args()[1], expr, &mut local) && bind(&mut local, name, expr) {
                    *binds = local;
                    return true;
                }
                false
            }
            Some("HoldPattern" | "Optional") if p.arg_count() >= 1 => self.match_pat(&p.args()[0], expr, binds),
            Some("Condition") if p.arg_count() == 2 => {
                let mut local = binds.clone();
                if self.match_pat(&p.args()[0], expr, &mut local) && self.condition_holds(&p.args()[1], &local) {
                    *binds = local;
                    return true;
                }
                false
            }
            Some("PatternTest") if p.arg_count() == 2 => {
                let mut local = binds.clone();
                if self.match_pat(&p.args()[0], expr, &mut local) && self.predicate_holds(&p.args()[1], expr) {
                    *binds = local;
                    return true;
                }
                false
            }
            Some("Alternative" | "Alternatives") => {
                for alt in p.args() {
                    let mut local = binds.clone();
                    if self.match_pat(alt, expr, &mut local) {
                        *binds = local;
                        return true;
                    }
                }
                false
            }
            _ => self.match_composite(p, expr, binds),
        }
    }

    fn match_composite(&self, p: &Expression, expr: &Ex, binds: &mut Bindings) -> bool {
        let Ex::Expr(e) = expr else { return false };
        let attrs = p.head_name().map(|h| self.syms.attributes(h)).unwrap_or_default();
        let has_sequences = p.args().iter().any(is_sequence_like);
        if !has_sequences && !attrs.is_flat() && p.arg_count() != e.arg_count() {
            return false;
        }
        let mut local = binds.clone();
        if !self.match_pat(p.head(), e.head(), &mut local) {
            return false;
        }
        let ok = if attrs.is_orderless() {
            self.match_orderless(e.head(), attrs.is_flat(), p.args(), e.args(), &mut local)
        } else if attrs.is_flat() && !has_sequences {
            self.match_flat(e.head(), p.args(), e.args(), &mut local)
        } else {
            self.match_args(p.args(), e.args(), &mut local)
        };
        if ok {
            *binds = local;
        }
        ok
    }

    fn match_sequence(&self, spec: &SeqSpec<'_>, slice: &[Ex], binds: &mut Bindings) -> bool {
        if slice.len() < spec.min {
            return false;
        }
        if let Some(ty) = spec.ty {
            if !slice.iter().all(|e| head_matches(ty, e)) {
                return false;
            }
        }
        match spec.name {
            Some(name) => bind(binds, name, &Ex::call("Sequence", slice.to_vec())),
            None => true,
        }
    }

    /// Positional matching with sequence patterns taking runs of arguments.
    fn match_args(&self, pats: &[Ex], exprs: &[Ex], binds: &mut Bindings) -> bool {
        let Some((p0, rest)) = pats.split_first() else { return exprs.is_empty() };
        if let Some(spec) = sequence_spec(p0) {
            let max_take = exprs.len().saturating_sub(min_required(rest));
            for k in spec.min..=max_take {
                let mut local = binds.clone();
                if self.match_sequence(&spec, &exprs[..k], &mut local) && self.match_args(rest, &exprs[k..], &mut local) {
                    *binds = local;
                    return true;
                }
            }
            return false;
        }
        if let Some(inner) = optional_inner(p0) {
            if let Some((e0, erest)) = exprs.split_first() {
                let mut local = binds.clone();
                if self.match_pat(inner, e0, &mut local) && self.match_args(rest, erest, &mut local) {
                    *binds = local;
                    return true;
                }
            }
            return self.match_args(rest, exprs, binds);
        }
        let Some((e0, erest)) = exprs.split_first() else { return false };
        let mut local = binds.clone();
        if self.match_pat(p0, e0, &mut local) && self.match_args(rest, erest, &mut local) {
            *binds = local;
            return true;
        }
        false
    }

    /// Tries `fixed[i]` against `exprs[picks[i]]` for every `i`.
    fn assign(&self, fixed: &[&Ex], picks: &[usize], exprs: &[Ex], binds: &mut Bindings) -> bool {
        fixed.iter().zip(picks).all(|(p, &i)| self.match_pat(p, &exprs[i], binds))
    }

    /// Orderless heads: single-term patterns are assigned to arguments by
    /// enumerating ordered selections; what is left over is matched, in its
    /// original order, against the sequence patterns.
    fn match_orderless(&self, head: &Ex, flat: bool, pats: &[Ex], exprs: &[Ex], binds: &mut Bindings) -> bool {
        let (seqs, fixed): (Vec<&Ex>, Vec<&Ex>) = pats.iter().partition(|p| is_sequence_like(p));
        if fixed.len() > exprs.len() {
            return false;
        }
        if seqs.is_empty() && fixed.len() < exprs.len() {
            return flat && self.match_flat_orderless(head, &fixed, exprs, binds);
        }
        let seqs: Vec<Ex> = seqs.into_iter().cloned().collect();
        for picks in Permutations::new(exprs.len(), fixed.len()) {
            let mut local = binds.clone();
            if !self.assign(&fixed, &picks, exprs, &mut local) {
                continue;
            }
            let rest = remaining(exprs, &picks);
            if self.match_args(&seqs, &rest, &mut local) {
                *binds = local;
                return true;
            }
        }
        false
    }

    /// Flat and orderless with more arguments than patterns: one pattern
    /// takes the leftover arguments as `head[rest...]` and every other pattern
    /// takes a single argument. Each pattern gets a turn as the absorbing one,
    /// so the outcome does not depend on how the pattern lists its arguments.
    fn match_flat_orderless(&self, head: &Ex, fixed: &[&Ex], exprs: &[Ex], binds: &mut Bindings) -> bool {
        for (absorber, wide) in fixed.iter().enumerate() {
            let singles: Vec<&Ex> =
                fixed.iter().enumerate().filter(|(i, _)| *i != absorber).map(|(_, p)| *p).collect();
            for picks in Permutations::new(exprs.len(), singles.len()) {
                let mut local = binds.clone();
                if !self.assign(&singles, &picks, exprs, &mut local) {
                    continue;
                }
                let group = grouped(head, remaining(exprs, &picks));
                if self.match_pat(wide, &group, &mut local) {
                    *binds = local;
                    return true;
                }
            }
        }
        false
    }

    /// Flat ordered heads: every pattern takes a contiguous non-empty run.
    fn match_flat(&self, head: &Ex, pats: &[Ex], exprs: &[Ex], binds: &mut Bindings) -> bool {
        let Some((p0, rest)) = pats.split_first() else { return exprs.is_empty() };
        if exprs.len() < pats.len() {
            return false;
        }
        let max_take = exprs.len() - rest.len();
        let min_take = if rest.is_empty() { max_take } else { 1 };
        for k in min_take..=max_take {
            let group = grouped(head, exprs[..k].to_vec());
            let mut local = binds.clone();
            if self.match_pat(p0, &group, &mut local) && self.match_flat(head, rest, &exprs[k..], &mut local) {
                *binds = local;
                return true;
            }
        }
        false
    }

    fn condition_holds(&self, cond: &Ex, binds: &Bindings) -> bool {
        if let Some(f) = self.eval_cond {
            return f(cond, binds);
        }
        truth_value(&substitute(cond, binds), self.syms) == Some(true)
    }

    fn predicate_holds(&self, pred: &Ex, expr: &Ex) -> bool {
        if let Some(f) = self.eval_pred {
            return f(pred, expr);
        }
        pred.as_symbol().and_then(|name| builtin_predicate(name, expr)).unwrap_or(false)
    }
}

fn builtin_predicate(name: &str, e: &Ex) -> Option<bool> {
    Some(match name {
        "IntegerQ" => matches!(e, Ex::Integer(_)),
        "NumberQ" => matches!(e, Ex::Integer(_) | Ex::Real(_)),
        "StringQ" => matches!(e, Ex::String(_)),
        "AtomQ" => e.is_atom(),
        "EvenQ" => matches!(e, Ex::Integer(n) if n % 2 == 0),
        "OddQ" => matches!(e, Ex::Integer(n) if n % 2 != 0),
        _ => return None,
    })
}

fn as_number(e: &Ex) -> Option<f64> {
    match e {
        Ex::Integer(n) => Some(*n as f64),
        Ex::Real(f) => Some(*f),
        _ => None,
    }
}

/// Decides a condition that has already had its bindings substituted.
/// `None` when the condition cannot be decided without an evaluator.
pub fn truth_value(cond: &Ex, syms: &dyn SymbolTable) -> Option<bool> {
    if let Some(name) = cond.as_symbol() {
        return match name {
            "True" => Some(true),
            "False" => Some(false),
            _ => None,
        };
    }
    let e = cond.as_expr()?;
    match (e.head_name()?, e.args()) {
        ("Not", [a]) => truth_value(a, syms).map(|b| !b),
        ("And", args) => {
            let mut known = true;
            for a in args {
                match truth_value(a, syms) {
                    Some(false) => return Some(false),
                    Some(true) => {}
                    None => known = false,
                }
            }
            known.then_some(true)
        }
        ("Or", args) => {
            let mut known = true;
            for a in args {
                match truth_value(a, syms) {
                    Some(true) => return Some(true),
                    Some(false) => {}
                    None => known = false,
                }
            }
            known.then_some(false)
        }
        ("SameQ", [a, b]) => Some(a.same_q(b)),
        ("UnsameQ", [a, b]) => Some(!a.same_q(b)),
        ("Equal", [a, b]) => match a.is_equal(b, syms) {
            Equality::Equal => Some(true),
            Equality::NotEqual => Some(false),
            Equality::Undecidable => None,
        },
        ("Unequal", [a, b]) => match a.is_equal(b, syms) {
            Equality::Equal => Some(false),
            Equality::NotEqual => Some(true),
            Equality::Undecidable => None,
        },
        (op @ ("Less" | "Greater" | "LessEqual" | "GreaterEqual"), [a, b]) => {
            let (x, y) = (as_number(a)?, as_number(b)?);
            Some(match op {
                "Less" => x < y,
                "Greater" => x > y,
                "LessEqual" => x <= y,
                _ => x >= y,
            })
        }
        (name, [a]) => builtin_predicate(name, a),
        _ => None,
    }
}

/// Instantiates `template` with `binds`. The result shares no storage with
/// either input; bound sequences splice into argument lists.
pub fn substitute(template: &Ex, binds: &Bindings) -> Ex {
    match template {
        Ex::Symbol(s) => binds.get(s.name()).map_or_else(|| template.deep_copy(), Ex::deep_copy),
        Ex::Expr(e) => {
            let head = substitute(e.head(), binds);
            let mut args = Vec::with_capacity(e.arg_count());
            for a in e.args() {
                match substitute(a, binds) {
                    Ex::Expr(s) if s.has_head("Sequence") => args.extend(s.into_parts().1),
                    other => args.push(other),
                }
            }
            Ex::expr(head, args)
        }
        other => other.deep_copy(),
    }
}
