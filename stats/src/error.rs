use derive_more::Display;
use std::num::ParseIntError;

/// The status page did not contain the counters we look for.
#[derive(thiserror::Error, Debug)]
pub enum DocumentParseError {
    #[error("could not find a table with summary {summary:?} in the document")]
    MissingTable { summary: &'static str },
    #[error("the statistics table has no {label:?} row")]
    MissingRow { label: &'static str },
    #[error("the {label:?} row holds {value:?}, which is not a byte count: {source}")]
    InvalidCounter {
        label: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: &'static str, reason: String },
}

/// Which side of a delta calculation an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Operand {
    #[display("previous")]
    Previous,
    #[display("current")]
    Current,
}

/// A delta was requested with an operand that has no counters, usually
/// because nothing has been recorded yet.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot compute usage: the {operand} stats are empty")]
pub struct EmptyStatsError {
    pub operand: Operand,
}
