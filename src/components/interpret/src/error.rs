use bind_with::BindErrorKind;
use compiler::Cancelled;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterpretError {
    #[error("null reference")]
    NullReference,
    #[error("'{0}' has no body")]
    AbstractCall(String),
    #[error("'{ty}' does not contain a definition for '{name}'")]
    UnknownMember { ty: String, name: String },
    #[error("unknown type '{0}'")]
    UnknownType(String),
    #[error("'{ty}' has no accessible constructor taking {arity} arguments")]
    NoConstructor { ty: String, arity: usize },
    #[error("constructor of '{0}' was never chained")]
    UnchainedConstructor(String),
    #[error("cannot cast '{from}' to '{to}'")]
    InvalidCast { from: String, to: String },
    #[error("integer literal {0} does not fit in 32 bits")]
    IntegerOverflow(i64),
    #[error("type error: {0}")]
    TypeError(&'static str),
    #[error("{0}")]
    With(BindErrorKind),
    #[error("call depth exceeded")]
    StackOverflow,
    #[error("execution timed out")]
    TimedOut,
    #[error("compilation was cancelled")]
    Cancelled,
}

impl From<Cancelled> for InterpretError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}
