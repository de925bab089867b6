//! Typed, fail-fast accessors over a parsed document
//!
//! A [`NodeView`] is a named, borrowed handle onto one node of a
//! [`Document`](crate::Document). Views are cheap to create, never own
//! storage, and cannot outlive the document they were derived from.
//!
//! Every member accessor follows the same rule: the member is looked up by
//! exact name, and a missing or wrongly typed member is an error naming
//! both the key and the enclosing view. The `*_or` variants return the
//! supplied default only when the key is absent; a present member of the
//! wrong type is still an error.

use std::fmt;

use crate::error::{JsonError, Result};
use crate::node::{Node, NodeId, NodeKind, Store, Subtree, EMPTY_OBJECT};

/// Suffix appended to the name of views over array elements
const ARRAY_ITEM_SUFFIX: &str = " (array item)";

/// A named, non-owning view of one node
#[derive(Clone)]
pub struct NodeView<'a> {
    name: String,
    store: &'a Store,
    node: &'a Node,
}

impl<'a> NodeView<'a> {
    pub(crate) fn new(name: impl Into<String>, store: &'a Store, node: &'a Node) -> Self {
        Self {
            name: name.into(),
            store,
            node,
        }
    }

    /// Diagnostic name of this view ("root", "servers (array item)", ...)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type of the underlying node
    pub fn kind(&self) -> NodeKind {
        self.node.kind()
    }

    pub fn get_boolean(&self, key: &str) -> Result<bool> {
        match self.member(key) {
            Some(Node::Bool(value)) => Ok(*value),
            _ => Err(self.missing_or_mistyped(key, NodeKind::Bool)),
        }
    }

    pub fn get_boolean_or(&self, key: &str, default: bool) -> Result<bool> {
        if self.has_object(key) {
            self.get_boolean(key)
        } else {
            Ok(default)
        }
    }

    /// Get a 64-bit signed integer. Fractional numbers are not integers.
    pub fn get_integer(&self, key: &str) -> Result<i64> {
        match self.member(key) {
            Some(Node::Integer(value)) => Ok(*value),
            _ => Err(self.missing_or_mistyped(key, NodeKind::Integer)),
        }
    }

    pub fn get_integer_or(&self, key: &str, default: i64) -> Result<i64> {
        if self.has_object(key) {
            self.get_integer(key)
        } else {
            Ok(default)
        }
    }

    /// Get a double. Integer literals are not doubles.
    pub fn get_double(&self, key: &str) -> Result<f64> {
        match self.member(key) {
            Some(Node::Double(value)) => Ok(*value),
            _ => Err(self.missing_or_mistyped(key, NodeKind::Double)),
        }
    }

    pub fn get_double_or(&self, key: &str, default: f64) -> Result<f64> {
        if self.has_object(key) {
            self.get_double(key)
        } else {
            Ok(default)
        }
    }

    pub fn get_string(&self, key: &str) -> Result<&'a str> {
        match self.member(key) {
            Some(Node::String(value)) => Ok(value.as_str()),
            _ => Err(self.missing_or_mistyped(key, NodeKind::String)),
        }
    }

    pub fn get_string_or<'d>(&self, key: &str, default: &'d str) -> Result<&'d str>
    where
        'a: 'd,
    {
        if self.has_object(key) {
            self.get_string(key)
        } else {
            Ok(default)
        }
    }

    /// Get a child view of the member `key`, whatever its type.
    ///
    /// When the member is absent and `allow_empty` is set, the returned view
    /// is an empty object named after `key`.
    pub fn get_object(&self, key: &str, allow_empty: bool) -> Result<NodeView<'a>> {
        match self.member(key) {
            Some(node) => Ok(NodeView::new(key, self.store, node)),
            None if allow_empty => Ok(NodeView::new(key, self.store, &EMPTY_OBJECT)),
            None => Err(self.missing_or_mistyped(key, NodeKind::Object)),
        }
    }

    /// Get one child view per element of the array member `key`
    pub fn get_object_array(&self, key: &str) -> Result<Vec<NodeView<'a>>> {
        match self.member(key) {
            Some(Node::Array(items)) => Ok(self.item_views(key, items)),
            _ => Err(self.missing_or_mistyped(key, NodeKind::Array)),
        }
    }

    /// Get one child view per element of this node, which must be an array
    pub fn as_object_array(&self) -> Result<Vec<NodeView<'a>>> {
        match self.node {
            Node::Array(items) => Ok(self.item_views(&self.name, items)),
            _ => Err(self.not_a(NodeKind::Array)),
        }
    }

    /// Get the array member `key`, every element of which must be a string
    pub fn get_string_array(&self, key: &str) -> Result<Vec<&'a str>> {
        let Some(Node::Array(items)) = self.member(key) else {
            return Err(self.missing_or_mistyped(key, NodeKind::Array));
        };

        items
            .iter()
            .map(|id| match self.store.get(*id) {
                Node::String(value) => Ok(value.as_str()),
                _ => Err(JsonError::NonStringArrayItem {
                    key: key.to_string(),
                }),
            })
            .collect()
    }

    /// This node as a string scalar
    pub fn as_string(&self) -> Result<&'a str> {
        match self.node {
            Node::String(value) => Ok(value.as_str()),
            _ => Err(self.not_a(NodeKind::String)),
        }
    }

    /// Whether a member named `key` exists. Never fails.
    pub fn has_object(&self, key: &str) -> bool {
        self.member(key).is_some()
    }

    /// True only for an object with no members; false for every other kind
    pub fn is_empty(&self) -> bool {
        matches!(self.node, Node::Object(members) if members.is_empty())
    }

    /// Visit each member in document order until `callback` returns `false`.
    ///
    /// Fails if this node is not an object.
    pub fn iterate<F>(&self, mut callback: F) -> Result<()>
    where
        F: FnMut(&str, NodeView<'a>) -> bool,
    {
        let Node::Object(members) = self.node else {
            return Err(self.not_a(NodeKind::Object));
        };

        for (name, id) in members {
            let child = NodeView::new(name.as_str(), self.store, self.store.get(*id));
            if !callback(name.as_str(), child) {
                break;
            }
        }
        Ok(())
    }

    pub(crate) fn subtree(&self) -> Subtree<'a> {
        Subtree {
            store: self.store,
            node: self.node,
        }
    }

    /// First member named `key`; non-objects have no members
    fn member(&self, key: &str) -> Option<&'a Node> {
        match self.node {
            Node::Object(members) => members
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, id)| self.store.get(*id)),
            _ => None,
        }
    }

    fn item_views(&self, name: &str, items: &'a [NodeId]) -> Vec<NodeView<'a>> {
        let item_name = format!("{name}{ARRAY_ITEM_SUFFIX}");
        items
            .iter()
            .map(|id| NodeView::new(item_name.clone(), self.store, self.store.get(*id)))
            .collect()
    }

    fn missing_or_mistyped(&self, key: &str, expected: NodeKind) -> JsonError {
        JsonError::MissingOrMistyped {
            key: key.to_string(),
            node: self.name.clone(),
            expected: expected.describe(),
        }
    }

    fn not_a(&self, expected: NodeKind) -> JsonError {
        JsonError::NotA {
            node: self.name.clone(),
            expected: expected.describe(),
        }
    }
}

impl fmt::Debug for NodeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeView")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Compact serialization of the subtree
impl fmt::Display for NodeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(&self.subtree()).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
