use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Per-symbol evaluation attributes consulted by the comparator and matcher.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Attributes: u32 {
        const FLAT         = 0b0001;
        const ORDERLESS    = 0b0010;
        const ONE_IDENTITY = 0b0100;
        const PROTECTED    = 0b1000;
    }
}

impl Default for Attributes {
    fn default() -> Self { Attributes::empty() }
}

impl Attributes {
    /// Heads whose argument list is an unordered multiset.
    pub fn is_orderless(self) -> bool { self.contains(Attributes::ORDERLESS) }

    /// Heads whose nested applications flatten into one argument list.
    pub fn is_flat(self) -> bool { self.contains(Attributes::FLAT) }
}
