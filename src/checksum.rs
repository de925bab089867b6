//! Structural hashing of document subtrees

use sha2::{Digest, Sha256};
use std::fmt;
use tracing::trace;

use crate::view::NodeView;

/// 64-bit hash of a subtree's canonical (compact) serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructuralHash(u64);

impl StructuralHash {
    /// Hash raw canonical bytes: the leading 8 bytes of their SHA-256
    pub fn from_bytes(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        Self(u64::from_be_bytes(prefix))
    }

    /// Hash the canonical form of a view's subtree
    pub fn of(view: &NodeView<'_>) -> Self {
        let canonical = serde_json::to_vec(&view.subtree()).unwrap_or_default();
        trace!(node = view.name(), bytes = canonical.len(), "hashing subtree");
        Self::from_bytes(&canonical)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for StructuralHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<StructuralHash> for u64 {
    fn from(hash: StructuralHash) -> Self {
        hash.0
    }
}

impl NodeView<'_> {
    /// Structural hash of this subtree.
    ///
    /// Equal serialized content gives equal hashes; whitespace in the source
    /// text does not matter, member order does.
    pub fn hash(&self) -> u64 {
        StructuralHash::of(self).value()
    }
}
