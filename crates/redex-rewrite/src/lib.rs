pub mod defs;
pub mod engine;
pub mod forms;
pub mod matcher;
pub mod nets;
pub mod permutations;
pub mod replace;
pub mod rule;
pub mod state;

pub use defs::{DefKind, DefinitionStore};
pub use engine::{normalize, rewrite_all, rewrite_once, rewrite_rules, rewrite_with_limit, DEFAULT_LIMIT};
pub use forms::register_standard_forms;
pub use matcher::{is_match_q, match_pattern, substitute, truth_value, Bindings, Matcher};
pub use nets::{build_net_for_rules, PatternNet};
pub use permutations::{permutation_count, Permutations};
pub use replace::{commutative_replace, iterable_replace, replace, replace_all};
pub use rule::{Delayed, Rule, RuleSet};
pub use state::EvalState;
