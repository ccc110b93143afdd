use thiserror::Error;

pub type Result<T> = std::result::Result<T, RedexError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RedexError {
    #[error("Malformed expression: {0}")]
    Malformed(String),
    #[error("Iteration limit of {limit} exceeded")]
    IterationLimit { limit: usize },
    #[error("Not a pattern: {0}")]
    NotAPattern(String),
    #[error("Symbol {0} is Protected")]
    Protected(String),
}
