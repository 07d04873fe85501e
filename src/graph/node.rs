//! Defines `MemberRef`, the two ways a caller can point at a member of a
//! container: by the name it was registered under, or by its handle.

use crate::store::{NodeId, NodeRecord};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberRef {
    Name(String),
    Node(NodeId),
}

impl MemberRef {
    /// Finds the `(key, node)` entry this reference designates in `container`.
    pub(crate) fn resolve(&self, container: &NodeRecord) -> Option<(String, NodeId)> {
        match self {
            MemberRef::Name(name) => container.members.get(name).map(|&n| (name.clone(), n)),
            MemberRef::Node(node) => container.member_key(*node).map(|k| (k.to_string(), *node)),
        }
    }

    pub(crate) fn describe(&self, names: impl Fn(NodeId) -> String) -> String {
        match self {
            MemberRef::Name(name) => name.clone(),
            MemberRef::Node(node) => names(*node),
        }
    }
}

impl From<&str> for MemberRef {
    fn from(name: &str) -> Self { MemberRef::Name(name.to_string()) }
}

impl From<String> for MemberRef {
    fn from(name: String) -> Self { MemberRef::Name(name) }
}

impl From<NodeId> for MemberRef {
    fn from(node: NodeId) -> Self { MemberRef::Node(node) }
}
