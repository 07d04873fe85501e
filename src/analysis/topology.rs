use crate::store::{NodeId, Registry};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Strongly connected components formed by the edges `container` owns
/// between its direct members.
///
/// Only components that actually loop are returned: more than one member,
/// or a single member with an edge to itself. Members inside a component and
/// the components themselves follow the container's insertion order.
pub fn cycle_components(store: &Registry, container: NodeId) -> Vec<Vec<NodeId>> {
    let record = store.n(container);
    let mut graph: DiGraph<NodeId, ()> =
        DiGraph::with_capacity(record.members.len(), record.edges.len());
    let mut position: HashMap<NodeId, usize> = HashMap::with_capacity(record.members.len());
    for &member in record.members.values() {
        position.insert(member, graph.add_node(member).index());
    }

    let mut self_loops = Vec::new();
    for &edge in record.edges.values() {
        let e = store.e(edge);
        // Edges always link two members of their owner; anything else is skipped.
        let (Some(&pre), Some(&post)) = (position.get(&e.pre), position.get(&e.post)) else {
            continue;
        };
        if pre == post {
            self_loops.push(pre);
        }
        graph.add_edge(NodeIndex::new(pre), NodeIndex::new(post), ());
    }

    let mut components: Vec<Vec<usize>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || self_loops.contains(&scc[0].index()))
        .map(|scc| {
            let mut positions: Vec<usize> = scc.into_iter().map(|ix| ix.index()).collect();
            positions.sort_unstable();
            positions
        })
        .collect();
    components.sort_by_key(|c| c[0]);

    components
        .into_iter()
        .map(|c| c.into_iter().map(|pos| graph[NodeIndex::new(pos)]).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AssemblyGraph;
    use crate::store::NodeKind;

    fn chain(g: &mut AssemblyGraph, net: NodeId, names: &[&str]) -> Vec<NodeId> {
        names
            .iter()
            .map(|&n| {
                let node = g.create_leaf(n, NodeKind::NeuronGroup, 1).unwrap();
                g.add_member(net, n, node).unwrap();
                node
            })
            .collect()
    }

    fn link(g: &mut AssemblyGraph, net: NodeId, pre: NodeId, post: NodeId) {
        let e = g.create_edge(pre, post).unwrap();
        let name = g.edge(e).unwrap().name.clone();
        g.add_edge(net, name, e).unwrap();
    }

    #[test]
    fn test_diamond_has_no_cycle() {
        let mut g = AssemblyGraph::new();
        let net = g.create_node("net", NodeKind::Network);
        let n = chain(&mut g, net, &["a", "b", "c", "d"]);
        link(&mut g, net, n[0], n[1]);
        link(&mut g, net, n[0], n[2]);
        link(&mut g, net, n[1], n[3]);
        link(&mut g, net, n[2], n[3]);
        assert!(cycle_components(&g.store, net).is_empty());
    }

    #[test]
    fn test_components_in_member_order() {
        let mut g = AssemblyGraph::new();
        let net = g.create_node("net", NodeKind::Network);
        let n = chain(&mut g, net, &["a", "b", "c", "d", "e"]);
        // d <-> e, b -> c -> a -> b, plus a self loop on nothing else
        link(&mut g, net, n[4], n[3]);
        link(&mut g, net, n[3], n[4]);
        link(&mut g, net, n[1], n[2]);
        link(&mut g, net, n[2], n[0]);
        link(&mut g, net, n[0], n[1]);

        let components = cycle_components(&g.store, net);
        assert_eq!(components, vec![vec![n[0], n[1], n[2]], vec![n[3], n[4]]]);
    }

    #[test]
    fn test_self_loop_is_a_component() {
        let mut g = AssemblyGraph::new();
        let net = g.create_node("net", NodeKind::Network);
        let n = chain(&mut g, net, &["a", "b"]);
        link(&mut g, net, n[1], n[1]);
        link(&mut g, net, n[0], n[1]);
        assert_eq!(cycle_components(&g.store, net), vec![vec![n[1]]]);
    }
}
