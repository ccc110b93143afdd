//! Three-valued equality and strict identity.
//!
//! `Undecidable` is a first-class verdict: two symbolic terms that differ
//! syntactically may still coincide once further rules apply, so only atoms
//! with fixed values are ever reported `NotEqual`.

use serde::{Deserialize, Serialize};

use crate::expr::{Ex, Expression, Symbol};
use crate::symbols::SymbolTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Equality {
    Equal,
    NotEqual,
    Undecidable,
}

impl Equality {
    pub fn from_bool(b: bool) -> Self {
        if b { Equality::Equal } else { Equality::NotEqual }
    }

    pub fn is_equal(self) -> bool { self == Equality::Equal }

    /// Symbol form used when a verdict is reified as a term.
    pub fn to_ex(self) -> Ex {
        match self {
            Equality::Equal => Ex::symbol("True"),
            Equality::NotEqual => Ex::symbol("False"),
            Equality::Undecidable => Ex::symbol("Indeterminate"),
        }
    }
}

fn symbol_equality(a: &Symbol, b: &Symbol) -> Equality {
    match (a.name(), b.name()) {
        (x, y) if x == y => Equality::Equal,
        ("True", "False") | ("False", "True") => Equality::NotEqual,
        _ => Equality::Undecidable,
    }
}

/// Exact comparison: the real must be integral and inside the `i64` range.
fn integer_equals_real(a: i64, b: f64) -> bool {
    // -2^63 is exact; 2^63 is the first value past i64::MAX.
    const LOW: f64 = -9_223_372_036_854_775_808.0;
    const HIGH: f64 = 9_223_372_036_854_775_808.0;
    b.fract() == 0.0 && (LOW..HIGH).contains(&b) && b as i64 == a
}

impl Ex {
    pub fn is_equal(&self, other: &Ex, syms: &dyn SymbolTable) -> Equality {
        match (self, other) {
            (Ex::Integer(a), Ex::Integer(b)) => Equality::from_bool(a == b),
            (Ex::Real(a), Ex::Real(b)) => Equality::from_bool(a.to_bits() == b.to_bits() || a == b),
            (Ex::Integer(a), Ex::Real(b)) | (Ex::Real(b), Ex::Integer(a)) => {
                Equality::from_bool(integer_equals_real(*a, *b))
            }
            (Ex::String(a), Ex::String(b)) => Equality::from_bool(a == b),
            (Ex::String(_), Ex::Integer(_) | Ex::Real(_))
            | (Ex::Integer(_) | Ex::Real(_), Ex::String(_)) => Equality::NotEqual,
            (Ex::Symbol(a), Ex::Symbol(b)) => symbol_equality(a, b),
            (Ex::Expr(a), Ex::Expr(b)) => a.is_equal(b, syms),
            _ => Equality::Undecidable,
        }
    }

    /// Strict syntactic identity. Never consults definitions.
    pub fn same_q(&self, other: &Ex) -> bool {
        match (self, other) {
            (Ex::Symbol(a), Ex::Symbol(b)) => a == b,
            (Ex::Integer(a), Ex::Integer(b)) => a == b,
            (Ex::Real(a), Ex::Real(b)) => a.to_bits() == b.to_bits(),
            (Ex::String(a), Ex::String(b)) => a == b,
            (Ex::Expr(a), Ex::Expr(b)) => a.same_q(b),
            _ => false,
        }
    }
}

impl Expression {
    pub fn is_equal(&self, other: &Expression, syms: &dyn SymbolTable) -> Equality {
        if self.arg_count() != other.arg_count() {
            return Equality::NotEqual;
        }
        if self.hash64() == other.hash64() && self.same_q(other) {
            return Equality::Equal;
        }
        if self.head().is_equal(other.head(), syms) != Equality::Equal {
            return Equality::Undecidable;
        }
        let orderless = self.head_name().map_or(false, |h| syms.is_orderless(h));
        if orderless {
            commutative_is_equal(self.args(), other.args(), syms)
        } else {
            function_is_equal(self.args(), other.args(), syms)
        }
    }

    pub fn same_q(&self, other: &Expression) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if let (Some(a), Some(b)) = (self.cached_hash(), other.cached_hash()) {
            if a != b {
                return false;
            }
        }
        self.head().same_q(other.head()) && function_same_q(self.args(), other.args())
    }
}

/// Position-wise equality for ordered arguments. Any position that is not
/// `Equal` blocks the `Equal` verdict and yields `Undecidable`.
pub fn function_is_equal(a: &[Ex], b: &[Ex], syms: &dyn SymbolTable) -> Equality {
    if a.len() != b.len() {
        return Equality::NotEqual;
    }
    for (x, y) in a.iter().zip(b) {
        if x.is_equal(y, syms) != Equality::Equal {
            return Equality::Undecidable;
        }
    }
    Equality::Equal
}

/// Multiset equality for orderless arguments.
///
/// Each element of `a` takes the first still-unmatched element of `b` that
/// compares `Equal`. There is no backtracking, so an early greedy pick can
/// starve a later element and report `Undecidable` where a different pairing
/// would have succeeded. A failed pairing never yields `NotEqual`.
pub fn commutative_is_equal(a: &[Ex], b: &[Ex], syms: &dyn SymbolTable) -> Equality {
    if a.len() != b.len() {
        return Equality::NotEqual;
    }
    let mut taken = vec![false; b.len()];
    for x in a {
        let found = b
            .iter()
            .enumerate()
            .find(|(j, y)| !taken[*j] && x.is_equal(y, syms) == Equality::Equal)
            .map(|(j, _)| j);
        match found {
            Some(j) => taken[j] = true,
            None => return Equality::Undecidable,
        }
    }
    Equality::Equal
}

pub fn function_same_q(a: &[Ex], b: &[Ex]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_q(y))
}
