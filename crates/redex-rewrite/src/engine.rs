use std::collections::HashMap;

use log::{debug, trace};
use redex_core::{Ex, Expression, RedexError, Result, SymbolTable};

use crate::defs::DefKind;
use crate::matcher::{substitute, Matcher};
use crate::nets::{build_net_for_rules, PatternNet};
use crate::replace::replace_with;
use crate::rule::Rule;
use crate::state::EvalState;

/// Rule applications allowed by [`rewrite_all`].
pub const DEFAULT_LIMIT: usize = 4096;

struct Rewriter<'a> {
    state: &'a EvalState,
    matcher: Matcher<'a>,
    nets: HashMap<(DefKind, String), PatternNet>,
    generation: u64,
    steps: usize,
    limit: usize,
    exhausted: bool,
}

impl<'a> Rewriter<'a> {
    fn new(state: &'a EvalState, limit: usize) -> Self {
        Self {
            state,
            matcher: Matcher::new(state),
            nets: HashMap::new(),
            generation: state.generation(),
            steps: 0,
            limit,
            exhausted: false,
        }
    }

    /// Spends one unit of budget. `false` once the budget is gone.
    fn charge(&mut self) -> bool {
        if self.steps >= self.limit {
            self.exhausted = true;
            return false;
        }
        self.steps += 1;
        true
    }

    fn apply_defs(&mut self, kind: DefKind, sym: &str, ex: &Ex) -> Option<Ex> {
        let state = self.state;
        let rules = state.rules(kind, sym)?.as_slice();
        let net = self
            .nets
            .entry((kind, sym.to_string()))
            .or_insert_with(|| build_net_for_rules(rules, state));
        let candidates = net.candidates(ex);
        for idx in candidates {
            let rule = &rules[idx];
            if let Some(b) = self.matcher.match_with(ex, rule.lhs()) {
                if !self.charge() {
                    return None;
                }
                trace!("{:?} value of {} rewrote {}", kind, sym, ex);
                return Some(substitute(rule.rhs(), &b));
            }
        }
        None
    }

    fn apply_top(&mut self, ex: &Ex) -> Option<Ex> {
        let e = match ex {
            Ex::Symbol(s) => return self.apply_defs(DefKind::Own, s.name(), ex),
            Ex::Expr(e) => e,
            _ => return None,
        };
        for a in e.args() {
            let name = match a {
                Ex::Symbol(s) => Some(s.name()),
                Ex::Expr(inner) => inner.head_name(),
                _ => None,
            };
            if let Some(r) = name.and_then(|n| self.apply_defs(DefKind::Up, n, ex)) {
                return Some(r);
            }
        }
        match e.head() {
            Ex::Symbol(h) => self.apply_defs(DefKind::Down, h.name(), ex),
            Ex::Expr(h) => h.head_name().and_then(|n| self.apply_defs(DefKind::Sub, n, ex)),
            _ => None,
        }
    }

    /// One bottom-up pass. `None` when the term is already in normal form.
    fn step(&mut self, ex: &Ex) -> Option<Ex> {
        let e = match ex {
            Ex::Expr(e) if e.is_normal_under(self.generation) => return None,
            Ex::Expr(e) => e,
            _ => return self.apply_top(ex),
        };
        let head = self.step(e.head());
        let mut args: Option<Vec<Ex>> = None;
        for (i, a) in e.args().iter().enumerate() {
            match self.step(a) {
                Some(r) => args.get_or_insert_with(|| e.args()[..i].to_vec()).push(r),
                None => {
                    if let Some(out) = args.as_mut() {
                        out.push(a.clone());
                    }
                }
            }
        }
        let rebuilt = head.is_some() || args.is_some();
        let node = if rebuilt {
            Expression::new(head.unwrap_or_else(|| e.head().clone()), args.unwrap_or_else(|| e.args().to_vec()))
        } else {
            e.clone()
        };
        let (node, normalized) = normalize(node, self.state);
        if let Some(r) = self.apply_top(&node) {
            return Some(r);
        }
        (rebuilt || normalized).then_some(node)
    }
}

/// Splices `Sequence` arguments and nested applications of a flat head,
/// sorts orderless arguments and hoists embedded conditions. Children are
/// assumed normalized already.
pub fn normalize(mut e: Expression, syms: &dyn SymbolTable) -> (Ex, bool) {
    let mut changed = false;
    if e.args().iter().any(|a| a.as_call("Sequence").is_some()) {
        splice(&mut e, "Sequence");
        changed = true;
    }
    if let Some(h) = e.head_name().map(str::to_owned) {
        let attrs = syms.attributes(&h);
        if attrs.is_flat() && e.args().iter().any(|a| a.as_call(&h).is_some()) {
            splice(&mut e, &h);
            changed = true;
        }
        if attrs.is_orderless() && e.sort_args() {
            changed = true;
        }
        if h != "ConditionalExpression" {
            if let Some(c) = e.propagate_conditionals() {
                return (c, true);
            }
        }
    }
    (Ex::Expr(e), changed)
}

fn splice(e: &mut Expression, head: &str) {
    let args = std::mem::take(e.args_mut());
    let mut out = Vec::with_capacity(args.len());
    for a in args {
        match a {
            Ex::Expr(inner) if inner.has_head(head) => out.extend(inner.into_parts().1),
            other => out.push(other),
        }
    }
    e.set_args(out);
}

/// A single bottom-up pass with the definitions in `state`.
pub fn rewrite_once(ex: &Ex, state: &EvalState) -> Ex {
    let mut rw = Rewriter::new(state, usize::MAX);
    rw.step(ex).unwrap_or_else(|| ex.clone())
}

/// Rewrites with the definitions in `state` until nothing changes, or fails
/// with [`RedexError::IterationLimit`] after `limit` rule applications. The
/// result is marked as normal form for the state's current generation.
pub fn rewrite_with_limit(ex: &Ex, state: &EvalState, limit: usize) -> Result<Ex> {
    let mut rw = Rewriter::new(state, limit);
    let mut cur = ex.clone();
    while let Some(next) = rw.step(&cur) {
        if rw.exhausted {
            debug!("rewrite budget of {} exhausted at {}", limit, next);
            return Err(RedexError::IterationLimit { limit });
        }
        cur = next;
    }
    if rw.exhausted {
        return Err(RedexError::IterationLimit { limit });
    }
    debug!("normal form after {} rule applications: {}", rw.steps, cur);
    cur.mark_normal_form(rw.generation);
    Ok(cur)
}

pub fn rewrite_all(ex: &Ex, state: &EvalState) -> Result<Ex> { rewrite_with_limit(ex, state, DEFAULT_LIMIT) }

/// Repeated `replace_all` with an explicit rule list, normalizing after each
/// round with the attributes of `state`, until nothing changes. Fails with
/// [`RedexError::IterationLimit`] if the term still changes after `limit`
/// rounds.
pub fn rewrite_rules(ex: &Ex, rules: &[Rule], state: &EvalState, limit: usize) -> Result<Ex> {
    let m = Matcher::new(state);
    let mut cur = normalize_deep(ex, state).unwrap_or_else(|| ex.clone());
    for _ in 0..limit {
        let Some(next) = replace_with(&m, &cur, rules) else { return Ok(cur) };
        cur = normalize_deep(&next, state).unwrap_or(next);
    }
    match replace_with(&m, &cur, rules) {
        None => Ok(cur),
        Some(_) => Err(RedexError::IterationLimit { limit }),
    }
}

/// Bottom-up [`normalize`] of a whole term. `None` when nothing changed.
fn normalize_deep(ex: &Ex, syms: &dyn SymbolTable) -> Option<Ex> {
    let e = ex.as_expr()?;
    let head = normalize_deep(e.head(), syms);
    let mut args: Option<Vec<Ex>> = None;
    for (i, a) in e.args().iter().enumerate() {
        match normalize_deep(a, syms) {
            Some(r) => args.get_or_insert_with(|| e.args()[..i].to_vec()).push(r),
            None => {
                if let Some(out) = args.as_mut() {
                    out.push(a.clone());
                }
            }
        }
    }
    let rebuilt = head.is_some() || args.is_some();
    let node = if rebuilt {
        Expression::new(head.unwrap_or_else(|| e.head().clone()), args.unwrap_or_else(|| e.args().to_vec()))
    } else {
        e.clone()
    };
    let (out, normalized) = normalize(node, syms);
    (rebuilt || normalized).then_some(out)
}
