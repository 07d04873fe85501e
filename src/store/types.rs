use indexmap::IndexMap;
use smallvec::SmallVec;
use std::cell::OnceCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EdgeId(pub u32);

impl EdgeId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

/// The concrete kind of a node. Fixes its type tag, whether it may hold
/// members, and its scheduling role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A plain composite container.
    Assembly,
    /// The outermost composite handed to the backend.
    Network,
    /// A leaf population of computational units.
    NeuronGroup,
    /// A leaf that turns external input into signals (pure producer).
    Encoder,
    /// A leaf that generates signals on its own (pure producer).
    Generator,
    /// A leaf that reads signals out of the network (pure consumer).
    Decoder,
}

/// Scheduling role of a member inside the container being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Source,
    Sink,
    Interior,
}

impl NodeKind {
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Assembly => "<asb>",
            NodeKind::Network => "<net>",
            NodeKind::NeuronGroup => "<neg>",
            NodeKind::Encoder => "<enc>",
            NodeKind::Generator => "<gen>",
            NodeKind::Decoder => "<dec>",
        }
    }

    /// Terminal kinds never contain members.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, NodeKind::Assembly | NodeKind::Network)
    }

    /// The role the kind forces, independent of topology.
    pub fn role(&self) -> Role {
        match self {
            NodeKind::Encoder | NodeKind::Generator => Role::Source,
            NodeKind::Decoder => Role::Sink,
            _ => Role::Interior,
        }
    }
}

pub const EDGE_TAG: &str = "<con>";

/// One node of the hierarchy as stored in the arena.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub name: String,
    pub kind: NodeKind,
    /// Free-form type labels attached by callers.
    pub labels: Vec<String>,
    pub members: IndexMap<String, NodeId>,
    pub edges: IndexMap<String, EdgeId>,
    /// Containers holding this node. Non-owning.
    pub supers: SmallVec<[NodeId; 2]>,
    /// Edges ending at this node. Lookup only.
    pub inbound: SmallVec<[EdgeId; 4]>,
    /// Edges starting at this node. Lookup only.
    pub outbound: SmallVec<[EdgeId; 4]>,
    /// Total unit count: the leaf's own count, or the sum over members.
    pub num: usize,
    pub hidden: bool,
    pub(crate) id: OnceCell<String>,
}

impl NodeRecord {
    pub fn new(name: String, kind: NodeKind, num: usize) -> Self {
        Self {
            name,
            kind,
            labels: Vec::new(),
            members: IndexMap::new(),
            edges: IndexMap::new(),
            supers: SmallVec::new(),
            inbound: SmallVec::new(),
            outbound: SmallVec::new(),
            num,
            hidden: false,
            id: OnceCell::new(),
        }
    }

    pub fn has_member(&self, node: NodeId) -> bool {
        self.members.values().any(|&m| m == node)
    }

    pub fn member_key(&self, node: NodeId) -> Option<&str> {
        self.members
            .iter()
            .find(|(_, &m)| m == node)
            .map(|(k, _)| k.as_str())
    }

    pub fn edge_key(&self, edge: EdgeId) -> Option<&str> {
        self.edges
            .iter()
            .find(|(_, &e)| e == edge)
            .map(|(k, _)| k.as_str())
    }

    pub fn is_isolated(&self) -> bool {
        self.inbound.is_empty() && self.outbound.is_empty()
    }
}

/// A directed link between two members of the same container.
#[derive(Debug, Clone)]
pub struct EdgeRecord {
    pub name: String,
    pub pre: NodeId,
    pub post: NodeId,
    /// Containers holding this edge. Non-owning.
    pub owners: SmallVec<[NodeId; 2]>,
    pub hidden: bool,
    pub(crate) id: OnceCell<String>,
}

impl EdgeRecord {
    pub fn new(name: String, pre: NodeId, post: NodeId) -> Self {
        Self {
            name,
            pre,
            post,
            owners: SmallVec::new(),
            hidden: false,
            id: OnceCell::new(),
        }
    }

    pub fn links(&self, node: NodeId) -> bool {
        self.pre == node || self.post == node
    }

    /// Points every endpoint equal to `old` at `new`. Returns whether anything changed.
    pub fn replace_endpoint(&mut self, old: NodeId, new: NodeId) -> bool {
        let mut changed = false;
        if self.pre == old {
            self.pre = new;
            changed = true;
        }
        if self.post == old {
            self.post = new;
            changed = true;
        }
        changed
    }
}
