#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected {0}, expected 'set'")]
    ExpectedSet(String),
    #[error("{0} is not a valid conditional type")]
    InvalidConditional(String),
    #[error("{0} is not a valid combiner type")]
    InvalidCombiner(String),
    #[error("unexpected {0}, expected ']'")]
    UnclosedConditional(String),
    #[error("unexpected {0}, expected ')'")]
    UnclosedCombiner(String),
    #[error("unexpected {0}, expected a variable or number")]
    UnexpectedToken(String),
    #[error("cannot assign to a number")]
    AssignToNumber,
    #[error("{0} does not fit in a value")]
    NumberTooLarge(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
#[error("{error} on line {line}")]
pub struct LineError {
    pub line: usize,
    pub error: ParseError,
}
