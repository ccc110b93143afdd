use std::collections::HashMap;

use redex_core::{Ex, SymbolTable};

use crate::matcher::{is_pattern_free, is_pattern_head, is_sequence_like, pattern_core};
use crate::rule::Rule;

/// A pattern-free term with no flat or orderless node matches exactly the
/// terms that are `same_q` to it, so its fingerprint is a sound key.
fn is_rigid_literal(ex: &Ex, syms: &dyn SymbolTable) -> bool {
    fn rigid(ex: &Ex, syms: &dyn SymbolTable) -> bool {
        match ex {
            Ex::Expr(e) => {
                !e.head_name().map_or(false, |h| syms.is_flat(h) || syms.is_orderless(h))
                    && e.parts().all(|p| rigid(p, syms))
            }
            _ => true,
        }
    }
    is_pattern_free(ex) && rigid(ex, syms)
}

/// Pre-selects the rules whose left-hand side can possibly match a term.
///
/// Each rule lands in exactly one bucket: pattern-free left-hand sides by
/// fingerprint, fixed-arity composites by (head, arity), variadic or flat
/// composites by head, everything else in the general bucket.
#[derive(Debug, Default)]
pub struct PatternNet {
    size: usize,
    literal: HashMap<u64, Vec<usize>>,
    by_head_arity: HashMap<(String, usize), Vec<usize>>,
    by_head_any: HashMap<String, Vec<usize>>,
    general: Vec<usize>,
}

impl PatternNet {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.size }
    pub fn is_empty(&self) -> bool { self.size == 0 }

    pub fn insert_rule(&mut self, lhs: &Ex, id: usize, syms: &dyn SymbolTable) {
        self.size += 1;
        let core = pattern_core(lhs);
        match core {
            Ex::Expr(e) => match e.head_name() {
                Some(_) if is_rigid_literal(core, syms) => {
                    self.literal.entry(core.hash64()).or_default().push(id)
                }
                Some(h) if syms.is_flat(h) || e.args().iter().any(is_sequence_like) => {
                    self.by_head_any.entry(h.to_string()).or_default().push(id)
                }
                Some(h) if !is_pattern_head(h) => {
                    self.by_head_arity.entry((h.to_string(), e.arg_count())).or_default().push(id)
                }
                _ => self.general.push(id),
            },
            atom if is_rigid_literal(atom, syms) => self.literal.entry(atom.hash64()).or_default().push(id),
            _ => self.general.push(id),
        }
    }

    /// Candidate rule ids for `expr`, in insertion order.
    pub fn candidates(&self, expr: &Ex) -> Vec<usize> {
        let mut v: Vec<usize> = Vec::new();
        if let Some(xs) = self.literal.get(&expr.hash64()) {
            v.extend(xs.iter().copied());
        }
        if let Ex::Expr(e) = expr {
            if let Some(h) = e.head_name() {
                if let Some(xs) = self.by_head_arity.get(&(h.to_string(), e.arg_count())) {
                    v.extend(xs.iter().copied());
                }
                if let Some(xs) = self.by_head_any.get(h) {
                    v.extend(xs.iter().copied());
                }
            }
        }
        v.extend(self.general.iter().copied());
        v.sort_unstable();
        v.dedup();
        v
    }
}

pub fn build_net_for_rules(rules: &[Rule], syms: &dyn SymbolTable) -> PatternNet {
    let mut net = PatternNet::new();
    for (i, r) in rules.iter().enumerate() {
        net.insert_rule(r.lhs(), i, syms);
    }
    net
}
