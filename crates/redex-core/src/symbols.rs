use std::collections::HashMap;

use crate::attrs::Attributes;
use crate::expr::Expression;
use crate::pretty::FormatParams;

/// A custom renderer for a head. Returning `None` falls back to the default
/// `head[args]` form.
pub type Renderer = fn(&Expression, &FormatParams, &dyn SymbolTable) -> Option<String>;

/// Read access to the per-symbol information the comparator, matcher and
/// renderer need from an evaluation session.
pub trait SymbolTable {
    fn attributes(&self, name: &str) -> Attributes;

    fn renderer(&self, _name: &str) -> Option<Renderer> { None }

    fn is_orderless(&self, name: &str) -> bool { self.attributes(name).is_orderless() }

    fn is_flat(&self, name: &str) -> bool { self.attributes(name).is_flat() }
}

/// No attributes, no renderers.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptySymbols;

impl SymbolTable for EmptySymbols {
    fn attributes(&self, _name: &str) -> Attributes { Attributes::empty() }
}

impl SymbolTable for HashMap<String, Attributes> {
    fn attributes(&self, name: &str) -> Attributes { self.get(name).copied().unwrap_or_default() }
}
