use crate::error::Result;
use crate::expr::{Ex, Expression};

/// Scratch node for incremental construction. The first pushed part becomes
/// the head; nothing can be compared or matched until [`finish`] yields a
/// well-formed [`Expression`].
///
/// [`finish`]: ExprBuilder::finish
#[derive(Debug, Default, Clone)]
pub struct ExprBuilder {
    parts: Vec<Ex>,
}

impl ExprBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn with_capacity(n: usize) -> Self { Self { parts: Vec::with_capacity(n) } }

    pub fn with_head(head: Ex) -> Self { Self { parts: vec![head] } }

    pub fn push(&mut self, part: Ex) -> &mut Self {
        self.parts.push(part);
        self
    }

    pub fn extend(&mut self, parts: impl IntoIterator<Item = Ex>) -> &mut Self {
        self.parts.extend(parts);
        self
    }

    pub fn part(mut self, part: Ex) -> Self {
        self.parts.push(part);
        self
    }

    pub fn has_head(&self) -> bool { !self.parts.is_empty() }

    pub fn len(&self) -> usize { self.parts.len() }

    pub fn is_empty(&self) -> bool { self.parts.is_empty() }

    pub fn finish(self) -> Result<Expression> { Expression::from_parts(self.parts) }
}
