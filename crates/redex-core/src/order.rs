//! Canonical ordering of terms, used to sort orderless argument lists.

use std::cmp::Ordering;

use crate::expr::{Ex, Expression};

fn rank(e: &Ex) -> u8 {
    match e {
        Ex::Integer(_) | Ex::Real(_) => 0,
        Ex::String(_) => 1,
        Ex::Symbol(_) => 2,
        Ex::Expr(_) => 3,
    }
}

/// Total order over terms. `Less` means `a` sorts before `b`.
///
/// Numbers come first by value (an integer precedes an equal real), then
/// strings, then symbols, then composites by head, argument count and
/// arguments. Only `same_q` terms compare `Equal`.
pub fn ex_order(a: &Ex, b: &Ex) -> Ordering {
    match (a, b) {
        (Ex::Integer(x), Ex::Integer(y)) => x.cmp(y),
        (Ex::Real(x), Ex::Real(y)) => x.total_cmp(y),
        (Ex::Integer(x), Ex::Real(y)) => (*x as f64).total_cmp(y).then(Ordering::Less),
        (Ex::Real(x), Ex::Integer(y)) => x.total_cmp(&(*y as f64)).then(Ordering::Greater),
        (Ex::String(x), Ex::String(y)) => x.cmp(y),
        (Ex::Symbol(x), Ex::Symbol(y)) => x.name().cmp(y.name()),
        (Ex::Expr(x), Ex::Expr(y)) => expression_order(x, y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn expression_order(a: &Expression, b: &Expression) -> Ordering {
    ex_order(a.head(), b.head())
        .then_with(|| a.arg_count().cmp(&b.arg_count()))
        .then_with(|| {
            a.args()
                .iter()
                .zip(b.args())
                .map(|(x, y)| ex_order(x, y))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        })
}

impl Expression {
    /// Whether argument `i` sorts strictly before argument `j`. `false` when
    /// either index is out of range.
    pub fn args_less(&self, i: usize, j: usize) -> bool {
        match (self.arg(i), self.arg(j)) {
            (Some(a), Some(b)) => ex_order(a, b) == Ordering::Less,
            _ => false,
        }
    }

    /// Panics if `i != j` and either index is out of range.
    pub fn swap_args(&mut self, i: usize, j: usize) {
        if i != j {
            self.args_mut().swap(i, j);
        }
    }

    /// Sorts the arguments canonically. Returns whether anything moved; an
    /// already sorted node keeps its cached fingerprint.
    pub fn sort_args(&mut self) -> bool {
        let sorted = self.args().windows(2).all(|w| ex_order(&w[0], &w[1]) != Ordering::Greater);
        if sorted {
            return false;
        }
        self.args_mut().sort_by(ex_order);
        true
    }
}
