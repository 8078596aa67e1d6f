// -----------------------------------------------------------------------------
// Scope

/// One frame of the grammar automaton shared by [`JsonReader`] and
/// [`JsonWriter`].
///
/// Both cursors keep a stack of scopes. The top of the stack decides which
/// tokens are legal next; a violation produces an error and leaves the stack
/// untouched.
///
/// [`JsonReader`]: crate::JsonReader
/// [`JsonWriter`]: crate::JsonWriter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Inside `[`, before the first element.
    EmptyArray,
    /// Inside `[`, at least one element consumed or produced.
    NonemptyArray,
    /// Inside `{`, before the first member name.
    EmptyObject,
    /// A member name has been consumed or produced; a value must follow.
    DanglingName,
    /// Inside `{`, at least one complete member behind us.
    NonemptyObject,
    /// Start of the document, nothing consumed or produced yet.
    EmptyDocument,
    /// The single top-level value is behind us.
    NonemptyDocument,
    /// The cursor has been closed; every further operation fails.
    Closed,
}

impl Scope {
    /// Whether this scope sits inside an object (names are in play).
    pub fn in_object(self) -> bool {
        matches!(
            self,
            Scope::EmptyObject | Scope::DanglingName | Scope::NonemptyObject,
        )
    }

    /// Whether this scope sits inside an array.
    pub fn in_array(self) -> bool {
        matches!(self, Scope::EmptyArray | Scope::NonemptyArray)
    }
}
