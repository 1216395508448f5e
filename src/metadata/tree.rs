// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 luks2-unlock Contributors
//! Navigable view over decoded LUKS2 JSON metadata.
//!
//! The parser modules never see raw JSON; they query a [`MetadataTree`] by
//! child name and property key. Nodes are cheap borrowed handles into the
//! tree, which is owned by the in-flight unlock operation and dropped with it.

use serde_json::Value;

use crate::error::{Result, UnlockError};

/// Owned, decoded metadata tree for one unlock attempt.
#[derive(Debug)]
pub struct MetadataTree {
    root: Value,
}

/// Borrowed handle to one object node in the tree.
#[derive(Clone, Copy)]
pub struct MetadataNode<'a> {
    value: &'a Value,
}

impl MetadataTree {
    /// Decodes the JSON metadata area into a tree.
    ///
    /// The on-disk JSON area is NUL-padded to the header size; trailing
    /// padding is stripped before parsing.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let end = bytes
            .iter()
            .rposition(|&b| b != 0)
            .map(|p| p + 1)
            .unwrap_or(0);
        let root: Value = serde_json::from_slice(&bytes[..end])
            .map_err(|e| UnlockError::Format(format!("JSON metadata: {e}")))?;
        if !root.is_object() {
            return Err(UnlockError::Format("metadata root is not an object".into()));
        }
        Ok(Self { root })
    }

    /// Handle to the root node.
    pub fn root(&self) -> MetadataNode<'_> {
        MetadataNode { value: &self.root }
    }
}

impl<'a> MetadataNode<'a> {
    /// Looks up a child object by name.
    pub fn find_child(&self, name: &str) -> Option<MetadataNode<'a>> {
        match self.value.get(name) {
            Some(v) if v.is_object() => Some(MetadataNode { value: v }),
            _ => None,
        }
    }

    /// Reads a string property.
    pub fn read_string(&self, key: &str) -> Option<&'a str> {
        self.value.get(key)?.as_str()
    }

    /// Reads an unsigned 32-bit numeric property.
    pub fn read_u32(&self, key: &str) -> Option<u32> {
        self.value.get(key)?.as_u64()?.try_into().ok()
    }

    /// Iterates child objects in tree order. The order is whatever the
    /// underlying map yields; callers must not rely on numeric sorting.
    pub fn children(&self) -> impl Iterator<Item = (&'a str, MetadataNode<'a>)> {
        self.value
            .as_object()
            .into_iter()
            .flatten()
            .filter(|(_, v)| v.is_object())
            .map(|(k, v)| (k.as_str(), MetadataNode { value: v }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(json: &str) -> MetadataTree {
        MetadataTree::from_json(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_and_navigate() {
        let t = tree(r#"{"keyslots":{"0":{"type":"luks2","key_size":32}}}"#);
        let slot = t
            .root()
            .find_child("keyslots")
            .and_then(|n| n.find_child("0"))
            .unwrap();
        assert_eq!(slot.read_string("type"), Some("luks2"));
        assert_eq!(slot.read_u32("key_size"), Some(32));
    }

    #[test]
    fn test_nul_padding_stripped() {
        let mut bytes = br#"{"digests":{}}"#.to_vec();
        bytes.extend_from_slice(&[0u8; 100]);
        let t = MetadataTree::from_json(&bytes).unwrap();
        assert!(t.root().find_child("digests").is_some());
    }

    #[test]
    fn test_invalid_json_is_format_error() {
        let err = MetadataTree::from_json(b"{not json").unwrap_err();
        assert!(matches!(err, UnlockError::Format(_)));
    }

    #[test]
    fn test_non_object_root_rejected() {
        assert!(MetadataTree::from_json(b"[1,2,3]").is_err());
    }

    #[test]
    fn test_missing_child_and_wrong_types() {
        let t = tree(r#"{"a":{"s":"x","n":7,"neg":-1},"plain":3}"#);
        let a = t.root().find_child("a").unwrap();
        assert!(t.root().find_child("b").is_none());
        // Non-object values are not children.
        assert!(t.root().find_child("plain").is_none());
        assert_eq!(a.read_string("n"), None);
        assert_eq!(a.read_u32("s"), None);
        assert_eq!(a.read_u32("neg"), None);
    }

    #[test]
    fn test_children_iteration() {
        let t = tree(r#"{"slots":{"0":{},"1":{},"skip":"me"}}"#);
        let names: Vec<&str> = t
            .root()
            .find_child("slots")
            .unwrap()
            .children()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"0"));
        assert!(names.contains(&"1"));
    }
}
