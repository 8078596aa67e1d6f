use core::error::Error;
use core::fmt::{Display, Formatter};

use jot_json::JsonError;

// -----------------------------------------------------------------------------
// ResolveError

/// No adapter could be resolved for a type.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// Every factory in the chain declined the descriptor.
    NoFactory { path: &'static str },
    /// A factory produced an adapter for a different type.
    AdapterTypeMismatch { path: &'static str },
    /// A recursion placeholder was invoked before resolution completed.
    PlaceholderUnfilled { path: &'static str },
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoFactory { path } => {
                write!(f, "no adapter factory accepts `{path}`")
            },
            Self::AdapterTypeMismatch { path } => {
                write!(f, "factory produced an adapter of the wrong type for `{path}`")
            },
            Self::PlaceholderUnfilled { path } => {
                write!(f, "adapter for `{path}` used before its resolution completed")
            },
        }
    }
}

impl Error for ResolveError {}

// -----------------------------------------------------------------------------
// BindError

/// A type's declared members cannot be turned into a codec.
#[derive(Debug, Clone, PartialEq)]
pub enum BindError {
    /// Two members map to the same serialized name after renames and the
    /// naming policy are applied.
    DuplicateName { path: &'static str, name: String },
    /// A string does not name any variant of the target enum.
    UnknownVariant { path: &'static str, name: String },
}

impl Display for BindError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DuplicateName { path, name } => {
                write!(f, "`{path}` declares multiple members serialized as {name:?}")
            },
            Self::UnknownVariant { path, name } => {
                write!(f, "{name:?} is not a variant of `{path}`")
            },
        }
    }
}

impl Error for BindError {}

// -----------------------------------------------------------------------------
// ConstructError

/// No way to produce an instance of a type during deserialization.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstructError {
    NoConstructor { path: &'static str },
}

impl Display for ConstructError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoConstructor { path } => {
                write!(
                    f,
                    "cannot construct `{path}`: mark it `#[jot(default)]` or register a \
                     constructor on the builder",
                )
            },
        }
    }
}

impl Error for ConstructError {}

// -----------------------------------------------------------------------------
// JotError

/// Top-level error of the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum JotError {
    /// The streaming layer rejected the document.
    Json(JsonError),
    Resolve(ResolveError),
    Bind(BindError),
    Construct(ConstructError),
    /// JSON `null` arrived for a member that cannot represent it, under
    /// [`NullPolicy::Reject`](crate::NullPolicy::Reject).
    NullValue { path: &'static str, member: String },
    /// A well-formed token carries a value the adapter cannot accept.
    Invalid { path: &'static str, detail: String },
}

impl Display for JotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(e) => Display::fmt(e, f),
            Self::Resolve(e) => Display::fmt(e, f),
            Self::Bind(e) => Display::fmt(e, f),
            Self::Construct(e) => Display::fmt(e, f),
            Self::NullValue { path, member } => {
                write!(f, "member {member:?} of `{path}` does not accept null")
            },
            Self::Invalid { path, detail } => {
                write!(f, "invalid value for `{path}`: {detail}")
            },
        }
    }
}

impl Error for JotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Resolve(e) => Some(e),
            Self::Bind(e) => Some(e),
            Self::Construct(e) => Some(e),
            _ => None,
        }
    }
}

impl From<JsonError> for JotError {
    fn from(e: JsonError) -> Self {
        Self::Json(e)
    }
}

impl From<ResolveError> for JotError {
    fn from(e: ResolveError) -> Self {
        Self::Resolve(e)
    }
}

impl From<BindError> for JotError {
    fn from(e: BindError) -> Self {
        Self::Bind(e)
    }
}

impl From<ConstructError> for JotError {
    fn from(e: ConstructError) -> Self {
        Self::Construct(e)
    }
}
