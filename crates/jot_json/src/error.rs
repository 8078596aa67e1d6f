use alloc::borrow::Cow;
use alloc::string::String;
use core::error::Error;
use core::fmt::{Display, Formatter};

use crate::read::JsonToken;

// -----------------------------------------------------------------------------
// JsonError

/// Error raised by the streaming layer.
///
/// Parse errors always carry the 1-based line and column of the offending
/// character. Structural errors describe the scope violation without
/// consuming input or mutating the scope stack.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonError {
    /// The input violates the active grammar (strict or lenient).
    Syntax {
        line: usize,
        column: usize,
        detail: Cow<'static, str>,
    },
    /// The caller asked for one kind of token but the input holds another.
    Unexpected {
        expected: JsonToken,
        found: JsonToken,
        line: usize,
        column: usize,
    },
    /// An operation is illegal in the current scope.
    Scope { detail: Cow<'static, str> },
    /// The cursor was closed and can no longer be used.
    Closed,
    /// The writer was finished while the document was still open.
    IncompleteDocument,
    /// A retained number literal does not fit the requested representation.
    NumberRange {
        text: String,
        target: &'static str,
    },
    /// Caller-supplied literal text is not a number under the active
    /// grammar.
    MalformedNumber { text: String },
    /// A non-finite number was produced in strict mode.
    NonFinite(f64),
    /// The underlying sink refused the write.
    Sink,
}

impl JsonError {
    pub(crate) fn syntax(
        line: usize,
        column: usize,
        detail: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::Syntax { line, column, detail: detail.into() }
    }

    pub(crate) fn scope(detail: impl Into<Cow<'static, str>>) -> Self {
        Self::Scope { detail: detail.into() }
    }
}

impl Display for JsonError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Syntax { line, column, detail } => {
                write!(f, "JSON syntax error at line {line} column {column}: {detail}")
            },
            Self::Unexpected { expected, found, line, column } => {
                write!(
                    f,
                    "expected {expected:?} but found {found:?} at line {line} column {column}",
                )
            },
            Self::Scope { detail } => {
                write!(f, "operation illegal in the current scope: {detail}")
            },
            Self::Closed => {
                write!(f, "cursor already closed")
            },
            Self::IncompleteDocument => {
                write!(f, "document incomplete")
            },
            Self::NumberRange { text, target } => {
                write!(f, "number {text:?} does not fit {target}")
            },
            Self::MalformedNumber { text } => {
                write!(f, "{text:?} is not a JSON number literal")
            },
            Self::NonFinite(v) => {
                write!(f, "non-finite number {v} forbidden outside lenient mode")
            },
            Self::Sink => {
                write!(f, "sink rejected the write")
            },
        }
    }
}

impl Error for JsonError {}

impl From<core::fmt::Error> for JsonError {
    fn from(_: core::fmt::Error) -> Self {
        Self::Sink
    }
}
