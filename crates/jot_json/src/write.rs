use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Write;

use crate::error::JsonError;
use crate::read::is_number;
use crate::scope::Scope;

// -----------------------------------------------------------------------------
// JsonWriter

/// Push cursor producing JSON text into a [`core::fmt::Write`] sink.
///
/// The same [`Scope`] stack as [`JsonReader`](crate::JsonReader) guards the
/// grammar: an ill-placed call fails without emitting anything or mutating
/// the stack.
///
/// Member names are deferred: [`JsonWriter::name`] stores the name and the
/// following value call emits both. With the "serialize nulls" switch off, a
/// deferred name followed by [`JsonWriter::null_value`] therefore emits
/// nothing at all.
pub struct JsonWriter<'w> {
    sink: &'w mut dyn Write,
    stack: Vec<Scope>,
    pending: Option<PendingName>,
    lenient: bool,
    serialize_nulls: bool,
    indent: Option<String>,
}

struct PendingName {
    name: String,
    /// Whether this would be the first member of its object.
    first: bool,
}

impl<'w> JsonWriter<'w> {
    /// Creates a strict, compact writer. Nulls are serialized until
    /// [`JsonWriter::set_serialize_nulls`] says otherwise.
    pub fn new(sink: &'w mut dyn Write) -> Self {
        Self {
            sink,
            stack: vec![Scope::EmptyDocument],
            pending: None,
            lenient: false,
            serialize_nulls: true,
            indent: None,
        }
    }

    /// Creates a lenient writer.
    pub fn lenient(sink: &'w mut dyn Write) -> Self {
        let mut writer = Self::new(sink);
        writer.lenient = true;
        writer
    }

    pub fn set_lenient(&mut self, lenient: bool) {
        self.lenient = lenient;
    }

    pub fn is_lenient(&self) -> bool {
        self.lenient
    }

    pub fn set_serialize_nulls(&mut self, serialize_nulls: bool) {
        self.serialize_nulls = serialize_nulls;
    }

    pub fn serialize_nulls(&self) -> bool {
        self.serialize_nulls
    }

    /// Enables pretty printing with the given indent unit, or disables it
    /// with `None`.
    pub fn set_indent(&mut self, indent: Option<&str>) {
        self.indent = indent.map(ToString::to_string);
    }

    /// The scope currently on top of the stack.
    pub fn scope(&self) -> Scope {
        self.stack.last().copied().unwrap_or(Scope::Closed)
    }

    // ------------------------------------------------------------------------
    // Structure

    pub fn begin_array(&mut self) -> Result<(), JsonError> {
        self.before_value()?;
        self.stack.push(Scope::EmptyArray);
        self.sink.write_char('[')?;
        Ok(())
    }

    pub fn end_array(&mut self) -> Result<(), JsonError> {
        self.end_container(Scope::EmptyArray, Scope::NonemptyArray, ']')
    }

    pub fn begin_object(&mut self) -> Result<(), JsonError> {
        self.before_value()?;
        self.stack.push(Scope::EmptyObject);
        self.sink.write_char('{')?;
        Ok(())
    }

    pub fn end_object(&mut self) -> Result<(), JsonError> {
        if self.pending.is_some() {
            return Err(JsonError::scope("member name written without a value"));
        }
        self.end_container(Scope::EmptyObject, Scope::NonemptyObject, '}')
    }

    /// Defers an object member name; the next value call emits it.
    pub fn name(&mut self, name: &str) -> Result<(), JsonError> {
        if self.pending.is_some() {
            return Err(JsonError::scope("two member names in a row"));
        }
        match self.scope() {
            Scope::EmptyObject => {
                self.pending = Some(PendingName { name: name.to_string(), first: true });
                self.set_top(Scope::DanglingName);
                Ok(())
            },
            Scope::NonemptyObject => {
                self.pending = Some(PendingName { name: name.to_string(), first: false });
                self.set_top(Scope::DanglingName);
                Ok(())
            },
            Scope::EmptyDocument | Scope::NonemptyDocument if self.lenient => {
                // tolerated at the top level as a plain string value
                self.string_value(name)
            },
            Scope::Closed => Err(JsonError::Closed),
            _ => Err(JsonError::scope("member name outside an object")),
        }
    }

    // ------------------------------------------------------------------------
    // Values

    pub fn string_value(&mut self, v: &str) -> Result<(), JsonError> {
        self.before_value()?;
        write_quoted(self.sink, v)?;
        self.value_done();
        Ok(())
    }

    pub fn bool_value(&mut self, v: bool) -> Result<(), JsonError> {
        self.before_value()?;
        self.sink.write_str(if v { "true" } else { "false" })?;
        self.value_done();
        Ok(())
    }

    /// Emits `null`, or nothing at all when a name is deferred and the
    /// "serialize nulls" switch is off.
    pub fn null_value(&mut self) -> Result<(), JsonError> {
        if !self.serialize_nulls {
            if let Some(pending) = self.pending.take() {
                let restored =
                    if pending.first { Scope::EmptyObject } else { Scope::NonemptyObject };
                self.set_top(restored);
                return Ok(());
            }
        }
        self.before_value()?;
        self.sink.write_str("null")?;
        self.value_done();
        Ok(())
    }

    pub fn i64_value(&mut self, v: i64) -> Result<(), JsonError> {
        self.before_value()?;
        write!(self.sink, "{v}")?;
        self.value_done();
        Ok(())
    }

    pub fn u64_value(&mut self, v: u64) -> Result<(), JsonError> {
        self.before_value()?;
        write!(self.sink, "{v}")?;
        self.value_done();
        Ok(())
    }

    /// Emits a floating-point value. Non-finite values are an error outside
    /// lenient mode.
    pub fn f64_value(&mut self, v: f64) -> Result<(), JsonError> {
        if !v.is_finite() && !self.lenient {
            return Err(JsonError::NonFinite(v));
        }
        self.before_value()?;
        if v.is_nan() {
            self.sink.write_str("NaN")?;
        } else if v == f64::INFINITY {
            self.sink.write_str("Infinity")?;
        } else if v == f64::NEG_INFINITY {
            self.sink.write_str("-Infinity")?;
        } else {
            write!(self.sink, "{v}")?;
        }
        self.value_done();
        Ok(())
    }

    /// Emits a number from already-formatted literal text, preserving it
    /// verbatim. The text must satisfy the active number grammar.
    pub fn number_value(&mut self, text: &str) -> Result<(), JsonError> {
        let valid = is_number(text, self.lenient)
            || (self.lenient && matches!(text, "NaN" | "Infinity" | "-Infinity"));
        if !valid {
            return Err(JsonError::MalformedNumber { text: text.to_string() });
        }
        self.before_value()?;
        self.sink.write_str(text)?;
        self.value_done();
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Completion

    /// Finishes the document.
    ///
    /// Strict mode fails with [`JsonError::IncompleteDocument`] unless
    /// exactly one complete top-level value has been produced. Lenient mode
    /// auto-closes open arrays and objects (a deferred name receives `null`).
    /// Afterwards the writer is closed and every operation fails.
    pub fn finish(&mut self) -> Result<(), JsonError> {
        if self.scope() == Scope::Closed {
            return Err(JsonError::Closed);
        }
        if self.lenient {
            if self.pending.is_some() {
                self.null_value()?;
            }
            while self.stack.len() > 1 {
                match self.scope() {
                    Scope::EmptyArray => {
                        self.stack.pop();
                        self.sink.write_char(']')?;
                        self.value_done();
                    },
                    Scope::NonemptyArray => {
                        self.stack.pop();
                        self.newline_indent()?;
                        self.sink.write_char(']')?;
                        self.value_done();
                    },
                    Scope::EmptyObject => {
                        self.stack.pop();
                        self.sink.write_char('}')?;
                        self.value_done();
                    },
                    Scope::NonemptyObject => {
                        self.stack.pop();
                        self.newline_indent()?;
                        self.sink.write_char('}')?;
                        self.value_done();
                    },
                    Scope::DanglingName => {
                        self.sink.write_str("null")?;
                        self.set_top(Scope::NonemptyObject);
                    },
                    _ => break,
                }
            }
        } else if self.pending.is_some() || self.stack.len() > 1 {
            return Err(JsonError::IncompleteDocument);
        }
        if self.scope() == Scope::EmptyDocument {
            return Err(JsonError::IncompleteDocument);
        }
        self.stack.clear();
        self.stack.push(Scope::Closed);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Internals

    fn end_container(
        &mut self,
        empty: Scope,
        nonempty: Scope,
        close: char,
    ) -> Result<(), JsonError> {
        let top = self.scope();
        if top == Scope::Closed {
            return Err(JsonError::Closed);
        }
        if top == empty {
            self.stack.pop();
            self.sink.write_char(close)?;
            self.value_done();
            Ok(())
        } else if top == nonempty {
            self.stack.pop();
            self.newline_indent()?;
            self.sink.write_char(close)?;
            self.value_done();
            Ok(())
        } else {
            Err(JsonError::scope("no open container of the requested kind"))
        }
    }

    /// Emits whatever must precede a value in the current scope, including a
    /// deferred member name.
    fn before_value(&mut self) -> Result<(), JsonError> {
        match self.scope() {
            Scope::Closed => Err(JsonError::Closed),
            Scope::EmptyDocument => {
                self.set_top(Scope::NonemptyDocument);
                Ok(())
            },
            Scope::NonemptyDocument => {
                if !self.lenient {
                    return Err(JsonError::scope("multiple top-level values"));
                }
                self.sink.write_char('\n')?;
                Ok(())
            },
            Scope::EmptyArray => {
                self.set_top(Scope::NonemptyArray);
                self.newline_indent()
            },
            Scope::NonemptyArray => {
                self.sink.write_char(',')?;
                self.newline_indent()
            },
            Scope::DanglingName => self.write_deferred(),
            Scope::EmptyObject | Scope::NonemptyObject => {
                Err(JsonError::scope("value in object without a preceding name"))
            },
        }
    }

    fn write_deferred(&mut self) -> Result<(), JsonError> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        if !pending.first {
            self.sink.write_char(',')?;
        }
        self.newline_indent()?;
        write_quoted(self.sink, &pending.name)?;
        self.sink.write_char(':')?;
        if self.indent.is_some() {
            self.sink.write_char(' ')?;
        }
        Ok(())
    }

    /// Scope bookkeeping after a complete value.
    fn value_done(&mut self) {
        if self.scope() == Scope::DanglingName {
            self.set_top(Scope::NonemptyObject);
        }
    }

    fn newline_indent(&mut self) -> Result<(), JsonError> {
        let Some(indent) = &self.indent else {
            return Ok(());
        };
        self.sink.write_char('\n')?;
        for _ in 0..self.stack.len().saturating_sub(1) {
            self.sink.write_str(indent)?;
        }
        Ok(())
    }

    fn set_top(&mut self, scope: Scope) {
        if let Some(top) = self.stack.last_mut() {
            *top = scope;
        }
    }
}

impl core::fmt::Debug for JsonWriter<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JsonWriter")
            .field("scope", &self.scope())
            .field("lenient", &self.lenient)
            .field("serialize_nulls", &self.serialize_nulls)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// String escaping

/// Writes `s` as a quoted JSON string with the mandatory escapes, plus
/// U+2028/U+2029 which are line terminators in JavaScript source.
pub(crate) fn write_quoted(sink: &mut dyn Write, s: &str) -> Result<(), JsonError> {
    sink.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => sink.write_str("\\\"")?,
            '\\' => sink.write_str("\\\\")?,
            '\n' => sink.write_str("\\n")?,
            '\r' => sink.write_str("\\r")?,
            '\t' => sink.write_str("\\t")?,
            '\u{0008}' => sink.write_str("\\b")?,
            '\u{000C}' => sink.write_str("\\f")?,
            '\u{2028}' => sink.write_str("\\u2028")?,
            '\u{2029}' => sink.write_str("\\u2029")?,
            c if (c as u32) < 0x20 => write!(sink, "\\u{:04x}", c as u32)?,
            c => sink.write_char(c)?,
        }
    }
    sink.write_char('"')?;
    Ok(())
}

// -----------------------------------------------------------------------------
// Tests
