//! Hierarchical identifiers. An id is derived from the parent chain on first
//! request and cached on the record; later membership changes never alter it.
//!
//! Formats:
//! - root: `name<tag>`
//! - one parent: `<parent id>_name<tag>`
//! - several parents: `/<id 1>,<id 2>,/_name<tag>`

use super::AssemblyGraph;
use crate::error::Result;
use crate::store::{EdgeId, NodeId, Registry, EDGE_TAG};

impl AssemblyGraph {
    /// The cached hierarchical id of `node`, computed on first use.
    pub fn hierarchical_id(&self, node: NodeId) -> Result<&str> {
        self.store.node(node)?;
        Ok(node_id(&self.store, node))
    }

    /// The cached hierarchical id of `edge`, derived from the containers owning it.
    pub fn edge_hierarchical_id(&self, edge: EdgeId) -> Result<&str> {
        self.store.edge(edge)?;
        Ok(edge_id(&self.store, edge))
    }
}

pub(crate) fn node_id(store: &Registry, node: NodeId) -> &str {
    let record = store.n(node);
    record.id.get_or_init(|| {
        let short = format!("{}{}", record.name, record.kind.tag());
        // Terminates: the containment hierarchy is kept acyclic by the mutation API.
        let parents: Vec<&str> = record.supers.iter().map(|&s| node_id(store, s)).collect();
        compose(&parents, &short)
    })
}

pub(crate) fn edge_id(store: &Registry, edge: EdgeId) -> &str {
    let record = store.e(edge);
    record.id.get_or_init(|| {
        let short = format!("{}{}", record.name, EDGE_TAG);
        let owners: Vec<&str> = record.owners.iter().map(|&o| node_id(store, o)).collect();
        compose(&owners, &short)
    })
}

fn compose(parents: &[&str], short: &str) -> String {
    match parents {
        [] => short.to_string(),
        [only] => format!("{}_{}", only, short),
        many => {
            let mut prefix = String::from("/");
            for parent in many {
                prefix.push_str(parent);
                prefix.push(',');
            }
            prefix.push('/');
            format!("{}_{}", prefix, short)
        }
    }
}
