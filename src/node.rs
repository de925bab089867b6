//! Parsed document storage
//!
//! A document is held as a flat arena of [`Node`]s. Containers refer to
//! their children by [`NodeId`], so the whole tree is owned by one
//! [`Store`] and every view into it borrows that store.
//!
//! Parsing is delegated to `serde_json`; the arena is filled directly from
//! the deserializer through a [`DeserializeSeed`], so no intermediate
//! `serde_json::Value` is built and duplicate member names are kept.

use std::fmt;

use serde::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Index of a node inside its [`Store`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// One node of a parsed document
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    /// Integer literal representable as `i64`
    Integer(i64),
    /// Integer literal above `i64::MAX`; neither an integer nor a double
    Unsigned(u64),
    /// Number with a fraction or exponent
    Double(f64),
    String(String),
    Array(Vec<NodeId>),
    /// Members in document order; duplicate names are preserved
    Object(Vec<(String, NodeId)>),
}

/// Shared node backing views of absent-but-allowed members
pub(crate) static EMPTY_OBJECT: Node = Node::Object(Vec::new());

/// Type tag of a [`Node`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Null,
    Bool,
    Integer,
    Unsigned,
    Double,
    String,
    Array,
    Object,
}

impl NodeKind {
    /// Kind name with its article, as used in diagnostics ("an integer")
    pub fn describe(&self) -> &'static str {
        match self {
            NodeKind::Null => "null",
            NodeKind::Bool => "a boolean",
            NodeKind::Integer => "an integer",
            NodeKind::Unsigned => "an unsigned integer",
            NodeKind::Double => "a double",
            NodeKind::String => "a string",
            NodeKind::Array => "an array",
            NodeKind::Object => "an object",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Null => "null",
            NodeKind::Bool => "boolean",
            NodeKind::Integer => "integer",
            NodeKind::Unsigned => "unsigned",
            NodeKind::Double => "double",
            NodeKind::String => "string",
            NodeKind::Array => "array",
            NodeKind::Object => "object",
        };
        f.write_str(name)
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Null => NodeKind::Null,
            Node::Bool(_) => NodeKind::Bool,
            Node::Integer(_) => NodeKind::Integer,
            Node::Unsigned(_) => NodeKind::Unsigned,
            Node::Double(_) => NodeKind::Double,
            Node::String(_) => NodeKind::String,
            Node::Array(_) => NodeKind::Array,
            Node::Object(_) => NodeKind::Object,
        }
    }
}

/// Owner of every node of one parsed document
#[derive(Debug, Clone)]
pub struct Store {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Store {
    /// Parse a complete document. Trailing non-whitespace is an error.
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        let mut nodes = Vec::new();
        let mut de = serde_json::Deserializer::from_str(text);
        let root = NodeSeed { nodes: &mut nodes }.deserialize(&mut de)?;
        de.end()?;
        Ok(Self { nodes, root })
    }

    /// The root node
    pub fn root(&self) -> &Node {
        self.get(self.root)
    }

    /// Resolve a node id issued by this store
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Total number of nodes in the document
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Appends one parsed value (and its descendants) to the arena
struct NodeSeed<'s> {
    nodes: &'s mut Vec<Node>,
}

impl NodeSeed<'_> {
    fn push(self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }
}

impl<'de> DeserializeSeed<'de> for NodeSeed<'_> {
    type Value = NodeId;

    fn deserialize<D>(self, deserializer: D) -> Result<NodeId, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for NodeSeed<'_> {
    type Value = NodeId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<NodeId, E> {
        Ok(self.push(Node::Null))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<NodeId, E> {
        Ok(self.push(Node::Bool(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<NodeId, E> {
        Ok(self.push(Node::Integer(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<NodeId, E> {
        let node = match i64::try_from(v) {
            Ok(v) => Node::Integer(v),
            Err(_) => Node::Unsigned(v),
        };
        Ok(self.push(node))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<NodeId, E> {
        Ok(self.push(Node::Double(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<NodeId, E> {
        Ok(self.push(Node::String(v.to_owned())))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<NodeId, E> {
        Ok(self.push(Node::String(v)))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<NodeId, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(id) = seq.next_element_seed(NodeSeed { nodes: &mut *self.nodes })? {
            items.push(id);
        }
        Ok(self.push(Node::Array(items)))
    }

    fn visit_map<A>(self, mut map: A) -> Result<NodeId, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut members = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(key) = map.next_key::<String>()? {
            let id = map.next_value_seed(NodeSeed { nodes: &mut *self.nodes })?;
            members.push((key, id));
        }
        Ok(self.push(Node::Object(members)))
    }
}

/// Serializable subtree rooted at one node
#[derive(Clone, Copy)]
pub(crate) struct Subtree<'a> {
    pub(crate) store: &'a Store,
    pub(crate) node: &'a Node,
}

impl Subtree<'_> {
    /// Convert to a `serde_json::Value`; objects keep the last duplicate
    pub(crate) fn to_value(&self) -> serde_json::Value {
        use serde_json::Value;

        match self.node {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Integer(i) => Value::from(*i),
            Node::Unsigned(u) => Value::from(*u),
            Node::Double(d) => serde_json::Number::from_f64(*d).map_or(Value::Null, Value::Number),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(items) => Value::Array(items.iter().map(|id| self.child(*id).to_value()).collect()),
            Node::Object(members) => Value::Object(
                members
                    .iter()
                    .map(|(name, id)| (name.clone(), self.child(*id).to_value()))
                    .collect(),
            ),
        }
    }

    fn child(&self, id: NodeId) -> Self {
        Subtree {
            store: self.store,
            node: self.store.get(id),
        }
    }
}

impl Serialize for Subtree<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.node {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Integer(i) => serializer.serialize_i64(*i),
            Node::Unsigned(u) => serializer.serialize_u64(*u),
            Node::Double(d) => serializer.serialize_f64(*d),
            Node::String(s) => serializer.serialize_str(s),
            Node::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for id in items {
                    seq.serialize_element(&self.child(*id))?;
                }
                seq.end()
            }
            Node::Object(members) => {
                let mut map = serializer.serialize_map(Some(members.len()))?;
                for (name, id) in members {
                    map.serialize_entry(name, &self.child(*id))?;
                }
                map.end()
            }
        }
    }
}
