use redex_core::Ex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Delayed {
    No,
    Yes,
}

/// `lhs -> rhs` (or `lhs :> rhs`). Immutable once built; application always
/// works on a fresh copy of the right-hand side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    lhs: Ex,
    rhs: Ex,
    delayed: Delayed,
}

impl Rule {
    pub fn immediate(lhs: Ex, rhs: Ex) -> Self {
        Self { lhs, rhs, delayed: Delayed::No }
    }

    pub fn delayed(lhs: Ex, rhs: Ex) -> Self {
        Self { lhs, rhs, delayed: Delayed::Yes }
    }

    /// Reads `Rule[lhs, rhs]` or `RuleDelayed[lhs, rhs]`.
    pub fn from_ex(ex: &Ex) -> Option<Self> {
        let e = ex.as_expr()?;
        let delayed = match e.head_name()? {
            "Rule" => Delayed::No,
            "RuleDelayed" => Delayed::Yes,
            _ => return None,
        };
        match e.args() {
            [lhs, rhs] => Some(Self { lhs: lhs.clone(), rhs: rhs.clone(), delayed }),
            _ => None,
        }
    }

    pub fn to_ex(&self) -> Ex {
        let head = match self.delayed {
            Delayed::No => "Rule",
            Delayed::Yes => "RuleDelayed",
        };
        Ex::call(head, vec![self.lhs.clone(), self.rhs.clone()])
    }

    pub fn lhs(&self) -> &Ex { &self.lhs }

    pub fn rhs(&self) -> &Ex { &self.rhs }

    pub fn is_delayed(&self) -> bool { self.delayed == Delayed::Yes }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RuleSet(Vec<Rule>);

impl RuleSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, r: Rule) {
        self.0.push(r);
    }

    /// Replaces a rule whose left-hand side is identical, else appends.
    /// Returns whether an existing rule was overwritten.
    pub fn upsert(&mut self, r: Rule) -> bool {
        match self.0.iter_mut().find(|old| old.lhs.same_q(&r.lhs)) {
            Some(old) => {
                *old = r;
                true
            }
            None => {
                self.0.push(r);
                false
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Rule] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
