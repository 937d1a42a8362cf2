//! # Document Trees
//!
//! Every parser output ends up as a [`Document`]: an immutable tree of
//! mappings, sequences and scalars built from an already-parsed value.
//! Mapping keys keep their insertion order. The root may carry a
//! [`Provenance`] pointing back at the record it was built from.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};
use thiserror::Error;

use crate::provenance::Provenance;

mod finite;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// The value has no mapping/sequence/scalar representation.
    #[error("cannot represent {type_name} as a document: {reason}")]
    Unsupported {
        type_name: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScalarKind {
    Null,
    Bool,
    Number,
    Str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeKind {
    Scalar,
    Sequence,
    Mapping,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    Str(String),
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Null => ScalarKind::Null,
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Number(_) => ScalarKind::Number,
            Scalar::Str(_) => ScalarKind::Str,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Scalar::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => n.as_f64(),
            _ => None,
        }
    }
}

/// One node of a document tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Vec<Node>),
    Mapping(IndexMap<String, Node>),
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Scalar(Scalar::Null),
            Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Node::Scalar(Scalar::Number(n)),
            Value::String(s) => Node::Scalar(Scalar::Str(s)),
            Value::Array(items) => Node::Sequence(items.into_iter().map(Node::from).collect()),
            Value::Object(entries) => Node::Mapping(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Node::from(value)))
                    .collect(),
            ),
        }
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Scalar(_) => NodeKind::Scalar,
            Node::Sequence(_) => NodeKind::Sequence,
            Node::Mapping(_) => NodeKind::Mapping,
        }
    }

    /// Child of a mapping node.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping()?.get(key)
    }

    /// Element of a sequence node.
    pub fn at(&self, index: usize) -> Option<&Node> {
        self.as_sequence()?.get(index)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Number of children; a null scalar counts as zero and any other
    /// scalar as one.
    pub fn len(&self) -> usize {
        match self {
            Node::Scalar(scalar) if scalar.is_null() => 0,
            Node::Scalar(_) => 1,
            Node::Sequence(items) => items.len(),
            Node::Mapping(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_value(&self) -> Value {
        match self {
            Node::Scalar(Scalar::Null) => Value::Null,
            Node::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            Node::Scalar(Scalar::Number(n)) => Value::Number(n.clone()),
            Node::Scalar(Scalar::Str(s)) => Value::String(s.clone()),
            Node::Sequence(items) => Value::Array(items.iter().map(Node::to_value).collect()),
            Node::Mapping(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, node)| (key.clone(), node.to_value()))
                    .collect(),
            ),
        }
    }
}

/// Immutable tree root, optionally linked to its source record.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Node,
    source: Option<Provenance>,
}

impl Document {
    /// Builds a tree with the shape of `value`. Never fails.
    pub fn from_value(value: Value) -> Self {
        Self {
            root: Node::from(value),
            source: None,
        }
    }

    /// Builds a tree from any serializable value.
    ///
    /// Values with no tree form, such as maps keyed by sequences or
    /// non-finite floats, are a caller error and are reported rather than
    /// coerced.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, DocumentError> {
        let unsupported = |reason: String| DocumentError::Unsupported {
            type_name: std::any::type_name::<T>(),
            reason,
        };
        finite::check(value).map_err(|e| unsupported(e.to_string()))?;
        let value = serde_json::to_value(value).map_err(|e| unsupported(e.to_string()))?;
        Ok(Self::from_value(value))
    }

    pub fn with_source(mut self, source: Provenance) -> Self {
        self.source = Some(source);
        self
    }

    pub fn source(&self) -> Option<&Provenance> {
        self.source.as_ref()
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    pub fn kind(&self) -> NodeKind {
        self.root.kind()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.root.get(key)
    }

    pub fn at(&self, index: usize) -> Option<&Node> {
        self.root.at(index)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        self.root.as_scalar()
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        self.root.as_sequence()
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, Node>> {
        self.root.as_mapping()
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn to_value(&self) -> Value {
        self.root.to_value()
    }

    /// The first non-empty document, in priority order.
    pub fn first_present<I>(candidates: I) -> Option<Document>
    where
        I: IntoIterator<Item = Document>,
    {
        candidates.into_iter().find(|doc| !doc.is_empty())
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Document::from_value(value)
    }
}

// The provenance is a runtime link and has no serialized form.
impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}
