use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{RedexError, Result};
use crate::hash::{evaluation_stamp, HashCache};

/// An interned-by-value symbol name. Cloning shares the backing storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn new(name: impl Into<Arc<str>>) -> Self { Symbol(name.into()) }

    pub fn name(&self) -> &str { &self.0 }

    /// Copies the name into fresh storage.
    pub fn deep_copy(&self) -> Self { Symbol(Arc::from(self.name())) }

    pub fn shares_storage(&self, other: &Symbol) -> bool { Arc::ptr_eq(&self.0, &other.0) }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// A term: either a composite expression or an atomic leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Ex {
    Expr(Expression),
    Symbol(Symbol),
    Integer(i64),
    Real(f64),
    String(Arc<str>),
}

impl Ex {
    pub fn symbol(name: impl Into<Arc<str>>) -> Self { Ex::Symbol(Symbol::new(name)) }
    pub fn int(n: i64) -> Self { Ex::Integer(n) }
    pub fn real(f: f64) -> Self { Ex::Real(f) }
    pub fn string(s: impl Into<Arc<str>>) -> Self { Ex::String(s.into()) }

    /// `head[args...]` with a symbol head.
    pub fn call(head: &str, args: Vec<Ex>) -> Self { Ex::Expr(Expression::new(Ex::symbol(head), args)) }

    /// `head[args...]` with an arbitrary head.
    pub fn expr(head: Ex, args: Vec<Ex>) -> Self { Ex::Expr(Expression::new(head, args)) }

    pub fn is_atom(&self) -> bool { !matches!(self, Ex::Expr(_)) }

    pub fn as_expr(&self) -> Option<&Expression> {
        match self {
            Ex::Expr(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_expr_mut(&mut self) -> Option<&mut Expression> {
        match self {
            Ex::Expr(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Ex::Symbol(s) => Some(s.name()),
            _ => None,
        }
    }

    pub fn is_symbol(&self, name: &str) -> bool { self.as_symbol() == Some(name) }

    /// The composite with symbol head `head`, if this is one.
    pub fn as_call(&self, head: &str) -> Option<&Expression> {
        self.as_expr().filter(|e| e.has_head(head))
    }

    /// Matches curried forms such as `Derivative[1][f]`: returns the outer
    /// expression and its composite head when that head is `op_head[...]`.
    pub fn as_operator(&self, op_head: &str) -> Option<(&Expression, &Expression)> {
        let outer = self.as_expr()?;
        let inner = outer.head().as_call(op_head)?;
        Some((outer, inner))
    }

    /// The head of any term. Atoms report their kind as a symbol.
    pub fn head(&self) -> Ex {
        match self {
            Ex::Expr(e) => e.head().clone(),
            Ex::Symbol(_) => Ex::symbol("Symbol"),
            Ex::Integer(_) => Ex::symbol("Integer"),
            Ex::Real(_) => Ex::symbol("Real"),
            Ex::String(_) => Ex::symbol("String"),
        }
    }

    /// Name of the head when the head is a symbol.
    pub fn head_name(&self) -> Option<&str> {
        match self {
            Ex::Expr(e) => e.head_name(),
            Ex::Symbol(_) => Some("Symbol"),
            Ex::Integer(_) => Some("Integer"),
            Ex::Real(_) => Some("Real"),
            Ex::String(_) => Some("String"),
        }
    }

    /// Copy that may share immutable leaves with `self`.
    pub fn copy(&self) -> Ex { self.clone() }

    /// Copy that shares no storage with `self`, leaves included.
    pub fn deep_copy(&self) -> Ex {
        match self {
            Ex::Expr(e) => Ex::Expr(e.deep_copy()),
            Ex::Symbol(s) => Ex::Symbol(s.deep_copy()),
            Ex::Integer(n) => Ex::Integer(*n),
            Ex::Real(f) => Ex::Real(*f),
            Ex::String(s) => Ex::String(Arc::from(&**s)),
        }
    }

    /// Atoms are always in normal form.
    pub fn needs_eval(&self) -> bool {
        match self {
            Ex::Expr(e) => e.needs_eval(),
            _ => false,
        }
    }

    pub fn mark_normal_form(&mut self, generation: u64) {
        if let Ex::Expr(e) = self {
            e.mark_normal_form(generation);
        }
    }

    pub fn is_normal_under(&self, generation: u64) -> bool {
        match self {
            Ex::Expr(e) => e.is_normal_under(generation),
            _ => true,
        }
    }
}

impl From<Expression> for Ex {
    fn from(e: Expression) -> Self { Ex::Expr(e) }
}

impl From<i64> for Ex {
    fn from(n: i64) -> Self { Ex::Integer(n) }
}

impl From<f64> for Ex {
    fn from(f: f64) -> Self { Ex::Real(f) }
}

fn needs_eval_default() -> bool { true }

/// A composite term `head[args...]`. The head is stored apart from the
/// arguments so a node always has at least one part.
#[derive(Serialize, Deserialize)]
pub struct Expression {
    head: Box<Ex>,
    args: Vec<Ex>,
    #[serde(skip, default = "needs_eval_default")]
    needs_eval: bool,
    #[serde(skip)]
    pub(crate) cache: HashCache,
}

impl Expression {
    pub fn new(head: Ex, args: Vec<Ex>) -> Self {
        Self { head: Box::new(head), args, needs_eval: true, cache: HashCache::default() }
    }

    pub fn from_head(head: Ex) -> Self { Self::new(head, Vec::new()) }

    /// Builds from a full parts list where `parts[0]` is the head.
    pub fn from_parts(parts: Vec<Ex>) -> Result<Self> {
        let mut it = parts.into_iter();
        let head = it
            .next()
            .ok_or_else(|| RedexError::Malformed("expression has no head".into()))?;
        Ok(Self::new(head, it.collect()))
    }

    pub fn head(&self) -> &Ex { &self.head }

    pub fn head_name(&self) -> Option<&str> { self.head.as_symbol() }

    pub fn has_head(&self, name: &str) -> bool { self.head_name() == Some(name) }

    pub fn args(&self) -> &[Ex] { &self.args }

    pub fn arg(&self, i: usize) -> Option<&Ex> { self.args.get(i) }

    pub fn arg_count(&self) -> usize { self.args.len() }

    /// Number of parts, head included.
    pub fn part_count(&self) -> usize { self.args.len() + 1 }

    /// Part `0` is the head.
    pub fn part(&self, i: usize) -> Option<&Ex> {
        if i == 0 { Some(&self.head) } else { self.args.get(i - 1) }
    }

    pub fn parts(&self) -> impl Iterator<Item = &Ex> + '_ {
        std::iter::once(&*self.head).chain(self.args.iter())
    }

    /// Mutable access to the arguments. Any outstanding fingerprint is
    /// dropped and the node is flagged for re-evaluation.
    pub fn args_mut(&mut self) -> &mut Vec<Ex> {
        self.touch();
        &mut self.args
    }

    pub fn head_mut(&mut self) -> &mut Ex {
        self.touch();
        &mut self.head
    }

    pub fn set_args(&mut self, args: Vec<Ex>) {
        self.touch();
        self.args = args;
    }

    pub fn push_arg(&mut self, arg: Ex) {
        self.touch();
        self.args.push(arg);
    }

    pub fn extend_args(&mut self, args: impl IntoIterator<Item = Ex>) {
        self.touch();
        self.args.extend(args);
    }

    pub fn into_parts(self) -> (Ex, Vec<Ex>) { (*self.head, self.args) }

    pub fn needs_eval(&self) -> bool { self.needs_eval }

    pub fn set_needs_eval(&mut self, v: bool) { self.needs_eval = v; }

    pub fn clear_hashes(&mut self) { self.cache.clear(); }

    /// Flags the whole subtree as evaluated and stamps every node for
    /// `generation`. Memoized fingerprints are kept.
    pub fn mark_normal_form(&mut self, generation: u64) {
        for part in std::iter::once(&mut *self.head).chain(self.args.iter_mut()) {
            part.mark_normal_form(generation);
        }
        self.needs_eval = false;
        self.cache.set_evaled(evaluation_stamp(self.hash64(), generation));
    }

    /// Whether this node was marked as normal form for `generation` and has
    /// not been mutated since.
    pub fn is_normal_under(&self, generation: u64) -> bool {
        !self.needs_eval && self.is_evaluated_under(evaluation_stamp(self.hash64(), generation))
    }

    fn touch(&mut self) {
        self.cache.clear();
        self.needs_eval = true;
    }

    /// New argument vector holding copies of the children. Leaves may be
    /// shared with `self`.
    pub fn shallow_copy(&self) -> Self { self.clone() }

    pub fn deep_copy(&self) -> Self {
        Self {
            head: Box::new(self.head.deep_copy()),
            args: self.args.iter().map(Ex::deep_copy).collect(),
            needs_eval: self.needs_eval,
            cache: self.cache.snapshot(),
        }
    }
}

impl Clone for Expression {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
            args: self.args.clone(),
            needs_eval: self.needs_eval,
            cache: self.cache.snapshot(),
        }
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("head", &self.head)
            .field("args", &self.args)
            .field("needs_eval", &self.needs_eval)
            .finish()
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool { self.same_q(other) }
}

impl Eq for Expression {}

impl PartialEq for Ex {
    fn eq(&self, other: &Self) -> bool { self.same_q(other) }
}

impl Eq for Ex {}

impl std::hash::Hash for Ex {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) { state.write_u64(self.hash64()); }
}

impl std::hash::Hash for Expression {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) { state.write_u64(self.hash64()); }
}
