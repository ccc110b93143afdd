use std::collections::HashMap;
use std::fmt;

use log::debug;
use redex_core::{Attributes, Ex, RedexError, Renderer, Result, SymbolTable};

use crate::defs::{DefKind, DefinitionStore};
use crate::matcher::{is_pattern_head, pattern_core};
use crate::rule::{Rule, RuleSet};

/// The rule table and symbol information of one evaluation session.
///
/// Every session owns its own state and passes it by reference. It is not
/// internally synchronized; share it across threads only behind a lock.
#[derive(Default)]
pub struct EvalState {
    defs: DefinitionStore,
    attributes: HashMap<String, Attributes>,
    renderers: HashMap<String, Renderer>,
    generation: u64,
}

impl EvalState {
    pub fn new() -> Self { Self::default() }

    /// `Plus` and `Times` as flat, orderless, one-identity heads.
    pub fn with_standard_attributes() -> Self {
        let mut st = Self::new();
        let arith = Attributes::FLAT | Attributes::ORDERLESS | Attributes::ONE_IDENTITY;
        st.set_attributes("Plus", arith);
        st.set_attributes("Times", arith);
        st
    }

    /// Standard attributes plus the infix renderers from [`crate::forms`].
    pub fn standard() -> Self {
        let mut st = Self::with_standard_attributes();
        crate::forms::register_standard_forms(&mut st);
        st
    }

    /// Bumped by every change to definitions or attributes. Normal-form
    /// stamps from an older generation are ignored.
    pub fn generation(&self) -> u64 { self.generation }

    fn bump(&mut self) { self.generation = self.generation.wrapping_add(1); }

    pub fn rules(&self, kind: DefKind, sym: &str) -> Option<&RuleSet> { self.defs.rules(kind, sym) }

    pub fn is_defined(&self, sym: &str) -> bool { self.defs.is_defined(sym) }

    /// Attaches `rule` to the symbol its left-hand side is keyed on:
    /// own values for `x`, down values for `f[...]`, sub values for
    /// `f[...][...]`. A rule with an identical left-hand side is overwritten.
    pub fn define(&mut self, rule: Rule) -> Result<()> {
        let (kind, sym) = definition_target(rule.lhs())
            .ok_or_else(|| RedexError::NotAPattern(rule.lhs().to_string()))?;
        self.attach(kind, sym, rule)
    }

    /// Attaches `rule` as an up value of `sym`, so it is tried on any
    /// expression that has `sym` (or `sym[...]`) as an argument.
    pub fn define_up(&mut self, sym: &str, rule: Rule) -> Result<()> { self.attach(DefKind::Up, sym.to_string(), rule) }

    fn attach(&mut self, kind: DefKind, sym: String, rule: Rule) -> Result<()> {
        if self.attributes(&sym).contains(Attributes::PROTECTED) {
            return Err(RedexError::Protected(sym));
        }
        let replaced = self.defs.rules_mut(kind, &sym).upsert(rule);
        debug!("defined {:?} value for {} (replaced: {})", kind, sym, replaced);
        self.bump();
        Ok(())
    }

    pub fn clear_definitions(&mut self, sym: &str) {
        self.defs.clear(sym);
        self.bump();
    }

    pub fn set_attributes(&mut self, sym: &str, attrs: Attributes) {
        self.attributes.insert(sym.to_string(), attrs);
        self.bump();
    }

    pub fn add_attributes(&mut self, sym: &str, attrs: Attributes) {
        let cur = self.attributes(sym);
        self.set_attributes(sym, cur | attrs);
    }

    pub fn register_renderer(&mut self, head: &str, render: Renderer) { self.renderers.insert(head.to_string(), render); }
}

impl fmt::Debug for EvalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut renderers: Vec<&String> = self.renderers.keys().collect();
        renderers.sort();
        f.debug_struct("EvalState")
            .field("defs", &self.defs)
            .field("attributes", &self.attributes)
            .field("renderers", &renderers)
            .field("generation", &self.generation)
            .finish()
    }
}

impl SymbolTable for EvalState {
    fn attributes(&self, name: &str) -> Attributes { self.attributes.get(name).copied().unwrap_or_default() }

    fn renderer(&self, name: &str) -> Option<Renderer> { self.renderers.get(name).copied() }
}

fn definition_target(lhs: &Ex) -> Option<(DefKind, String)> {
    match pattern_core(lhs) {
        Ex::Symbol(s) => Some((DefKind::Own, s.name().to_string())),
        Ex::Expr(e) => match e.head() {
            Ex::Symbol(s) if !is_pattern_head(s.name()) => Some((DefKind::Down, s.name().to_string())),
            Ex::Expr(h) => h
                .head_name()
                .filter(|n| !is_pattern_head(n))
                .map(|n| (DefKind::Sub, n.to_string())),
            _ => None,
        },
        _ => None,
    }
}
