use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::error::JsonError;
use crate::read::{is_number, JsonReader, JsonToken};
use crate::write::JsonWriter;

// -----------------------------------------------------------------------------
// JsonNumber

/// A JSON number, retained as its literal text.
///
/// Keeping the text instead of an eagerly chosen numeric representation
/// preserves formatting (`1.2300` stays `1.2300`) and defers narrowing to
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonNumber(Box<str>);

impl JsonNumber {
    /// Wraps already-validated literal text.
    pub(crate) fn from_verbatim(text: &str) -> Self {
        Self(text.into())
    }

    /// Validates `text` against the JSON number grammar.
    pub fn from_text(text: &str) -> Option<Self> {
        is_number(text, false).then(|| Self(text.into()))
    }

    pub fn from_i64(v: i64) -> Self {
        Self(format!("{v}").into_boxed_str())
    }

    pub fn from_u64(v: u64) -> Self {
        Self(format!("{v}").into_boxed_str())
    }

    /// `None` for non-finite values, which have no JSON literal.
    pub fn from_f64(v: f64) -> Option<Self> {
        v.is_finite().then(|| Self(format!("{v}").into_boxed_str()))
    }

    /// The literal text.
    pub fn text(&self) -> &str {
        &self.0
    }

    /// Exact narrowing to `i64`; `None` when lossy or out of range.
    pub fn as_i64(&self) -> Option<i64> {
        if let Ok(v) = self.0.parse::<i64>() {
            return Some(v);
        }
        let d = self.0.parse::<f64>().ok()?;
        let v = d as i64;
        ((v as f64) == d && d.is_finite()).then_some(v)
    }

    /// Exact narrowing to `u64`; `None` when lossy or out of range.
    pub fn as_u64(&self) -> Option<u64> {
        if let Ok(v) = self.0.parse::<u64>() {
            return Some(v);
        }
        let d = self.0.parse::<f64>().ok()?;
        let v = d as u64;
        ((v as f64) == d && d.is_finite() && d >= 0.0).then_some(v)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.text() {
            "NaN" => Some(f64::NAN),
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            t => t.parse().ok(),
        }
    }
}

impl core::fmt::Display for JsonNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

// -----------------------------------------------------------------------------
// JsonObject

/// Insertion-ordered object members with unique names.
///
/// Re-inserting an existing name replaces the value in place and keeps the
/// original position (last write wins).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonObject {
    members: Vec<(String, JsonValue)>,
}

impl JsonObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.members.iter().any(|(k, _)| k == name)
    }

    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.members.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut JsonValue> {
        self.members.iter_mut().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Inserts a member, returning the previous value under that name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Option<JsonValue> {
        let name = name.into();
        let value = value.into();
        match self.members.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => Some(core::mem::replace(slot, value)),
            None => {
                self.members.push((name, value));
                None
            },
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<JsonValue> {
        let index = self.members.iter().position(|(k, _)| k == name)?;
        Some(self.members.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.members.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, JsonValue)> for JsonObject {
    fn from_iter<I: IntoIterator<Item = (String, JsonValue)>>(iter: I) -> Self {
        let mut object = Self::new();
        for (name, value) in iter {
            object.insert(name, value);
        }
        object
    }
}

// -----------------------------------------------------------------------------
// JsonValue

/// In-memory JSON tree.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(JsonNumber),
    String(String),
    Array(Vec<JsonValue>),
    Object(JsonObject),
}

impl JsonValue {
    /// Builds a tree by replaying one complete value from the reader.
    pub fn read(reader: &mut JsonReader<'_>) -> Result<Self, JsonError> {
        match reader.peek()? {
            JsonToken::BeginArray => {
                reader.begin_array()?;
                let mut items = Vec::new();
                while reader.has_next()? {
                    items.push(Self::read(reader)?);
                }
                reader.end_array()?;
                Ok(Self::Array(items))
            },
            JsonToken::BeginObject => {
                reader.begin_object()?;
                let mut object = JsonObject::new();
                while reader.has_next()? {
                    let name = reader.next_name()?;
                    let value = Self::read(reader)?;
                    object.insert(name, value);
                }
                reader.end_object()?;
                Ok(Self::Object(object))
            },
            JsonToken::String => Ok(Self::String(reader.next_string()?)),
            JsonToken::Number => {
                Ok(Self::Number(JsonNumber::from_verbatim(reader.next_number()?)))
            },
            JsonToken::Boolean => Ok(Self::Bool(reader.next_bool()?)),
            JsonToken::Null => {
                reader.next_null()?;
                Ok(Self::Null)
            },
            _ => Err(JsonError::scope("no value at the current position")),
        }
    }

    /// Replays the tree into a writer.
    pub fn write(&self, writer: &mut JsonWriter<'_>) -> Result<(), JsonError> {
        match self {
            Self::Null => writer.null_value(),
            Self::Bool(v) => writer.bool_value(*v),
            Self::Number(n) => writer.number_value(n.text()),
            Self::String(s) => writer.string_value(s),
            Self::Array(items) => {
                writer.begin_array()?;
                for item in items {
                    item.write(writer)?;
                }
                writer.end_array()
            },
            Self::Object(object) => {
                writer.begin_object()?;
                for (name, value) in object.iter() {
                    writer.name(name)?;
                    value.write(writer)?;
                }
                writer.end_object()
            },
        }
    }

    /// Parses one complete strict-JSON document.
    pub fn from_text(text: &str) -> Result<Self, JsonError> {
        let mut reader = JsonReader::new(text);
        let value = Self::read(&mut reader)?;
        reader.end_document()?;
        Ok(value)
    }

    /// Renders the tree as compact strict JSON.
    pub fn to_text(&self) -> Result<String, JsonError> {
        let mut out = String::new();
        let mut writer = JsonWriter::new(&mut out);
        self.write(&mut writer)?;
        writer.finish()?;
        Ok(out)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&JsonNumber> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<JsonValue>> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&JsonObject> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut JsonObject> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl From<bool> for JsonValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for JsonValue {
    fn from(v: i64) -> Self {
        Self::Number(JsonNumber::from_i64(v))
    }
}

impl From<u64> for JsonValue {
    fn from(v: u64) -> Self {
        Self::Number(JsonNumber::from_u64(v))
    }
}

impl From<JsonNumber> for JsonValue {
    fn from(v: JsonNumber) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for JsonValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for JsonValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<JsonValue>> for JsonValue {
    fn from(v: Vec<JsonValue>) -> Self {
        Self::Array(v)
    }
}

impl From<JsonObject> for JsonValue {
    fn from(v: JsonObject) -> Self {
        Self::Object(v)
    }
}

// -----------------------------------------------------------------------------
// TreeWriter

/// One frame of a tree under construction.
#[derive(Debug)]
enum Frame {
    Array(Vec<JsonValue>),
    Object(JsonObject, Option<String>),
}

/// The streaming-writer surface, producing a [`JsonValue`] instead of text.
#[derive(Debug, Default)]
pub struct TreeWriter {
    stack: Vec<Frame>,
    product: Option<JsonValue>,
}

impl TreeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_array(&mut self) -> Result<(), JsonError> {
        self.check_slot()?;
        self.stack.push(Frame::Array(Vec::new()));
        Ok(())
    }

    pub fn end_array(&mut self) -> Result<(), JsonError> {
        match self.stack.last() {
            Some(Frame::Array(_)) => {},
            _ => return Err(JsonError::scope("no open array")),
        }
        let Some(Frame::Array(items)) = self.stack.pop() else {
            return Err(JsonError::scope("no open array"));
        };
        self.plug(JsonValue::Array(items))
    }

    pub fn begin_object(&mut self) -> Result<(), JsonError> {
        self.check_slot()?;
        self.stack.push(Frame::Object(JsonObject::new(), None));
        Ok(())
    }

    pub fn end_object(&mut self) -> Result<(), JsonError> {
        match self.stack.last() {
            Some(Frame::Object(_, None)) => {},
            Some(Frame::Object(_, Some(_))) => {
                return Err(JsonError::scope("member name written without a value"));
            },
            _ => return Err(JsonError::scope("no open object")),
        }
        let Some(Frame::Object(object, _)) = self.stack.pop() else {
            return Err(JsonError::scope("no open object"));
        };
        self.plug(JsonValue::Object(object))
    }

    pub fn name(&mut self, name: &str) -> Result<(), JsonError> {
        match self.stack.last_mut() {
            Some(Frame::Object(_, pending)) => {
                if pending.is_some() {
                    return Err(JsonError::scope("two member names in a row"));
                }
                *pending = Some(name.to_string());
                Ok(())
            },
            _ => Err(JsonError::scope("member name outside an object")),
        }
    }

    pub fn null_value(&mut self) -> Result<(), JsonError> {
        self.check_slot()?;
        self.plug(JsonValue::Null)
    }

    pub fn bool_value(&mut self, v: bool) -> Result<(), JsonError> {
        self.check_slot()?;
        self.plug(JsonValue::Bool(v))
    }

    pub fn i64_value(&mut self, v: i64) -> Result<(), JsonError> {
        self.check_slot()?;
        self.plug(JsonValue::from(v))
    }

    pub fn u64_value(&mut self, v: u64) -> Result<(), JsonError> {
        self.check_slot()?;
        self.plug(JsonValue::from(v))
    }

    pub fn f64_value(&mut self, v: f64) -> Result<(), JsonError> {
        self.check_slot()?;
        let number = JsonNumber::from_f64(v).ok_or(JsonError::NonFinite(v))?;
        self.plug(JsonValue::Number(number))
    }

    pub fn string_value(&mut self, v: &str) -> Result<(), JsonError> {
        self.check_slot()?;
        self.plug(JsonValue::String(v.to_string()))
    }

    pub fn number_value(&mut self, text: &str) -> Result<(), JsonError> {
        self.check_slot()?;
        let number = JsonNumber::from_text(text)
            .ok_or_else(|| JsonError::MalformedNumber { text: text.to_string() })?;
        self.plug(JsonValue::Number(number))
    }

    /// Finishes construction and yields the tree.
    pub fn finish(mut self) -> Result<JsonValue, JsonError> {
        if !self.stack.is_empty() {
            return Err(JsonError::IncompleteDocument);
        }
        self.product.take().ok_or(JsonError::IncompleteDocument)
    }

    /// Whether a value may be produced in the current position.
    fn check_slot(&self) -> Result<(), JsonError> {
        match self.stack.last() {
            Some(Frame::Object(_, None)) => {
                Err(JsonError::scope("value in object without a preceding name"))
            },
            Some(_) => Ok(()),
            None if self.product.is_some() => {
                Err(JsonError::scope("multiple top-level values"))
            },
            None => Ok(()),
        }
    }

    fn plug(&mut self, value: JsonValue) -> Result<(), JsonError> {
        match self.stack.last_mut() {
            Some(Frame::Array(items)) => {
                items.push(value);
                Ok(())
            },
            Some(Frame::Object(object, pending)) => {
                let Some(name) = pending.take() else {
                    return Err(JsonError::scope("value in object without a preceding name"));
                };
                object.insert(name, value);
                Ok(())
            },
            None => {
                if self.product.is_some() {
                    return Err(JsonError::scope("multiple top-level values"));
                }
                self.product = Some(value);
                Ok(())
            },
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_round_trip_is_idempotent() {
        let text = r#"{"a":[1,2.50,null],"b":{"c":"x","d":false},"e":"✓"}"#;
        let tree = JsonValue::from_text(text).unwrap();
        let rendered = tree.to_text().unwrap();
        assert_eq!(rendered, text);
        assert_eq!(JsonValue::from_text(&rendered).unwrap(), tree);
    }

    #[test]
    fn number_formatting_survives_the_tree() {
        let tree = JsonValue::from_text("[1.2300,1e3]").unwrap();
        assert_eq!(tree.to_text().unwrap(), "[1.2300,1e3]");
    }

    #[test]
    fn object_preserves_insertion_order() {
        let mut object = JsonObject::new();
        object.insert("z", JsonValue::from(1_i64));
        object.insert("a", JsonValue::from(2_i64));
        object.insert("m", JsonValue::from(3_i64));
        let text = JsonValue::Object(object).to_text().unwrap();
        assert_eq!(text, r#"{"z":1,"a":2,"m":3}"#);
    }

    #[test]
    fn insert_is_last_write_wins_in_place() {
        let mut object = JsonObject::new();
        object.insert("a", JsonValue::from(1_i64));
        object.insert("b", JsonValue::from(2_i64));
        let old = object.insert("a", JsonValue::from(9_i64));
        assert_eq!(old, Some(JsonValue::from(1_i64)));
        assert_eq!(object.len(), 2);
        let text = JsonValue::Object(object).to_text().unwrap();
        assert_eq!(text, r#"{"a":9,"b":2}"#);
    }

    #[test]
    fn duplicate_names_in_input_collapse_to_the_last() {
        let tree = JsonValue::from_text(r#"{"a":1,"a":2}"#).unwrap();
        let object = tree.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(object.get("a").unwrap().as_number().unwrap().as_i64(), Some(2));
    }

    #[test]
    fn reads_from_a_lenient_reader() {
        let mut reader = JsonReader::lenient("{a: [1, 'two', NaN]}");
        let tree = JsonValue::read(&mut reader).unwrap();
        let items = tree.as_object().unwrap().get("a").unwrap().as_array().unwrap();
        assert_eq!(items[0].as_number().unwrap().as_i64(), Some(1));
        assert_eq!(items[1].as_str(), Some("two"));
        assert!(items[2].as_number().unwrap().as_f64().unwrap().is_nan());
    }

    #[test]
    fn tree_writer_matches_parsed_text() {
        let mut w = TreeWriter::new();
        w.begin_object().unwrap();
        w.name("a").unwrap();
        w.begin_array().unwrap();
        w.i64_value(1).unwrap();
        w.string_value("x").unwrap();
        w.null_value().unwrap();
        w.end_array().unwrap();
        w.name("b").unwrap();
        w.bool_value(true).unwrap();
        w.end_object().unwrap();
        let built = w.finish().unwrap();

        let parsed = JsonValue::from_text(r#"{"a":[1,"x",null],"b":true}"#).unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn tree_writer_enforces_scopes() {
        let mut w = TreeWriter::new();
        w.begin_object().unwrap();
        assert!(matches!(w.i64_value(1).unwrap_err(), JsonError::Scope { .. }));
        assert!(matches!(w.end_array().unwrap_err(), JsonError::Scope { .. }));
        w.name("a").unwrap();
        assert!(matches!(w.name("b").unwrap_err(), JsonError::Scope { .. }));
        assert!(matches!(w.end_object().unwrap_err(), JsonError::Scope { .. }));
        w.i64_value(1).unwrap();
        w.end_object().unwrap();
        assert_eq!(w.finish().unwrap().to_text().unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn tree_writer_rejects_unfinished_documents() {
        let mut w = TreeWriter::new();
        w.begin_array().unwrap();
        assert_eq!(w.finish().unwrap_err(), JsonError::IncompleteDocument);

        let w = TreeWriter::new();
        assert_eq!(w.finish().unwrap_err(), JsonError::IncompleteDocument);
    }

    #[test]
    fn agrees_with_serde_json_on_structure() {
        let text = r#"{"a":[1,2,{"b":"x"}],"c":null,"d":1.5}"#;
        let tree = JsonValue::from_text(text).unwrap();
        let reference: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(
            tree.as_object().unwrap().get("d").unwrap().as_number().unwrap().as_f64(),
            reference["d"].as_f64(),
        );
        let reparsed: serde_json::Value =
            serde_json::from_str(&tree.to_text().unwrap()).unwrap();
        assert_eq!(reparsed, reference);
    }
}
