pub mod attrs;
pub mod builder;
pub mod compare;
pub mod conditional;
pub mod error;
pub mod expr;
pub mod hash;
pub mod order;
pub mod pretty;
pub mod symbols;

pub use attrs::Attributes;
pub use builder::ExprBuilder;
pub use compare::{commutative_is_equal, function_is_equal, function_same_q, Equality};
pub use error::{RedexError, Result};
pub use expr::{Ex, Expression, Symbol};
pub use hash::{evaluation_stamp, HashCache};
pub use order::ex_order;
pub use pretty::{string_form, Form, FormatParams};
pub use symbols::{EmptySymbols, Renderer, SymbolTable};
