use std::collections::HashMap;

use crate::rule::RuleSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefKind { Own, Down, Up, Sub }

#[derive(Debug, Default)]
pub struct DefinitionStore {
    own: HashMap<String, RuleSet>,
    down: HashMap<String, RuleSet>,
    up: HashMap<String, RuleSet>,
    sub: HashMap<String, RuleSet>,
}

impl DefinitionStore {
    pub fn new() -> Self { Self::default() }

    fn map(&self, kind: DefKind) -> &HashMap<String, RuleSet> {
        match kind {
            DefKind::Own => &self.own,
            DefKind::Down => &self.down,
            DefKind::Up => &self.up,
            DefKind::Sub => &self.sub,
        }
    }

    pub fn rules(&self, kind: DefKind, sym: &str) -> Option<&RuleSet> {
        self.map(kind).get(sym).filter(|rs| !rs.is_empty())
    }

    pub fn rules_mut(&mut self, kind: DefKind, sym: &str) -> &mut RuleSet {
        let map = match kind {
            DefKind::Own => &mut self.own,
            DefKind::Down => &mut self.down,
            DefKind::Up => &mut self.up,
            DefKind::Sub => &mut self.sub,
        };
        map.entry(sym.to_string()).or_insert_with(RuleSet::new)
    }

    pub fn is_defined(&self, sym: &str) -> bool {
        [DefKind::Own, DefKind::Down, DefKind::Up, DefKind::Sub]
            .into_iter()
            .any(|k| self.rules(k, sym).is_some())
    }

    /// Drops every definition attached to `sym`.
    pub fn clear(&mut self, sym: &str) {
        self.own.remove(sym);
        self.down.remove(sym);
        self.up.remove(sym);
        self.sub.remove(sym);
    }
}
