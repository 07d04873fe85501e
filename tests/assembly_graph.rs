use std::collections::HashSet;

use assembly_core::{
    AssemblyGraph, Backend, BackendError, BuildMode, BuildStep, BuildTarget, BuildWarning,
    GraphConfig, GraphError, MemberRef, NodeId, NodeKind, RecordingBackend,
};
use rstest::rstest;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

fn key(graph: &AssemblyGraph, container: NodeId, name: &str) -> NodeId {
    graph.node(container).unwrap().members[name]
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(3)]
fn added_member_is_listed_and_has_container_as_ancestor(#[case] nesting: usize) {
    let mut graph = AssemblyGraph::new();
    let root = graph.create_node("root", NodeKind::Network);
    let mut container = root;
    for i in 0..nesting {
        let name = format!("sub{}", i);
        let sub = graph.create_node(name.clone(), NodeKind::Assembly);
        graph.add_member(container, name, sub).unwrap();
        container = sub;
    }
    let n = graph.create_leaf("n", NodeKind::NeuronGroup, 4).unwrap();
    graph.add_member(container, "n", n).unwrap();

    assert!(graph.members(container, false).unwrap().contains(&n));
    let chain = graph.ancestor_chain(n).unwrap();
    assert_eq!(chain.len(), nesting + 1);
    assert_eq!(chain.first(), Some(&container));
    assert_eq!(chain.last(), Some(&root));
    assert_eq!(graph.node(root).unwrap().num, 4);
}

#[test]
fn chain_builds_decoder_last_and_marks_compiled() {
    init_tracing();
    let mut graph = AssemblyGraph::new();
    let net = graph
        .builder("net", NodeKind::Network)
        .leaf("D", NodeKind::Decoder, 1)
        .and_then(|b| b.leaf("H", NodeKind::NeuronGroup, 8))
        .and_then(|b| b.leaf("E", NodeKind::Encoder, 2))
        .and_then(|b| b.connect("E_H", "E", "H"))
        .and_then(|b| b.connect("H_D", "H", "D"))
        .unwrap()
        .finish();

    let mut backend = RecordingBackend::default();
    let plan = graph.build(net, &mut backend).unwrap();
    assert_eq!(backend.names(), vec!["E", "E_H", "H", "H_D", "D"]);
    assert_eq!(backend.steps, plan.steps);
    assert_eq!(backend.steps[2].id, "net<net>_H<neg>");
    assert_eq!(backend.steps[1].id, "net<net>_E_H<con>");
    assert!(graph.is_compiled());
}

#[test]
fn two_node_cycle_builds_everything_once_with_one_delayed_edge() {
    init_tracing();
    let mut graph = AssemblyGraph::new();
    let net = graph
        .builder("net", NodeKind::Network)
        .leaf("A", NodeKind::NeuronGroup, 1)
        .and_then(|b| b.leaf("B", NodeKind::NeuronGroup, 1))
        .and_then(|b| b.connect("A_B", "A", "B"))
        .and_then(|b| b.connect("B_A", "B", "A"))
        .unwrap()
        .finish();

    let mut backend = RecordingBackend::default();
    let plan = graph.build(net, &mut backend).unwrap();

    let targets: HashSet<BuildTarget> = backend.steps.iter().map(|s| s.target).collect();
    assert_eq!(backend.steps.len(), 4);
    assert_eq!(targets.len(), 4);
    let delayed: Vec<&BuildStep> =
        backend.steps.iter().filter(|s| s.mode == BuildMode::Delayed).collect();
    assert_eq!(delayed.len(), 1);
    assert_eq!(delayed[0].name, "B_A");
    assert!(matches!(plan.warnings.as_slice(), [BuildWarning::Cycle { .. }]));
    assert!(plan.warnings[0].describe(graph.store()).contains("[A, B]"));
}

#[test]
fn isolated_node_warns_and_builds_once() {
    init_tracing();
    let mut graph = AssemblyGraph::new();
    let net = graph
        .builder("net", NodeKind::Network)
        .leaf("lonely", NodeKind::NeuronGroup, 3)
        .unwrap()
        .finish();
    let lonely = key(&graph, net, "lonely");

    let mut backend = RecordingBackend::default();
    let plan = graph.build(net, &mut backend).unwrap();
    assert_eq!(backend.names(), vec!["lonely"]);
    assert_eq!(plan.warnings, vec![BuildWarning::Isolated { container: net, node: lonely }]);
}

#[test]
fn member_moved_out_of_fed_composite_is_isolated() {
    let mut graph = AssemblyGraph::new();
    let sub = graph
        .builder("sub", NodeKind::Assembly)
        .leaf("x", NodeKind::NeuronGroup, 1)
        .unwrap()
        .finish();
    let net = graph
        .builder("net", NodeKind::Network)
        .leaf("enc", NodeKind::Encoder, 1)
        .and_then(|b| b.member("sub", sub))
        .and_then(|b| b.connect("in", "enc", "sub"))
        .unwrap()
        .finish();
    let x = key(&graph, sub, "x");
    assert!(graph.plan(net).unwrap().warnings.is_empty());

    graph.remove_member(sub, "x").unwrap();
    let net2 = graph.builder("net2", NodeKind::Network).member("x", x).unwrap().finish();
    let plan = graph.plan(net2).unwrap();
    assert_eq!(plan.names(), vec!["x"]);
    assert_eq!(plan.warnings, vec![BuildWarning::Isolated { container: net2, node: x }]);
}

#[test]
fn scheduling_twice_is_identical() {
    let mut graph = AssemblyGraph::new();
    let sub = graph
        .builder("sub", NodeKind::Assembly)
        .leaf("p", NodeKind::NeuronGroup, 1)
        .and_then(|b| b.leaf("q", NodeKind::NeuronGroup, 1))
        .and_then(|b| b.connect("pq", "p", "q"))
        .and_then(|b| b.connect("qp", "q", "p"))
        .unwrap()
        .finish();
    let net = graph
        .builder("net", NodeKind::Network)
        .leaf("gen", NodeKind::Generator, 1)
        .and_then(|b| b.member("sub", sub))
        .and_then(|b| b.leaf("out", NodeKind::Decoder, 1))
        .and_then(|b| b.connect("drive", "gen", "sub"))
        .and_then(|b| b.connect("read", "sub", "out"))
        .unwrap()
        .finish();

    let mut first = RecordingBackend::default();
    let mut second = RecordingBackend::default();
    graph.build(net, &mut first).unwrap();
    graph.build(net, &mut second).unwrap();
    assert_eq!(first.steps, second.steps);
    assert_eq!(first.steps.last().map(|s| s.name.as_str()), Some("out"));
}

#[test]
fn select_then_merge_round_trip() {
    let mut graph = AssemblyGraph::new();
    let net = graph
        .builder("net", NodeKind::Network)
        .leaf("a", NodeKind::NeuronGroup, 1)
        .and_then(|b| b.leaf("b", NodeKind::NeuronGroup, 2))
        .and_then(|b| b.leaf("c", NodeKind::NeuronGroup, 4))
        .and_then(|b| b.connect("ab", "a", "b"))
        .and_then(|b| b.connect("bc", "b", "c"))
        .unwrap()
        .finish();
    let selection: Vec<MemberRef> = vec!["a".into(), "b".into()];
    let sel = graph.select(net, &selection, "sel", true).unwrap();
    assert_eq!(graph.node(sel).unwrap().edges.len(), 1);

    // Merging back into the source adds nothing.
    graph.merge(net, sel).unwrap();
    assert_eq!(graph.node(net).unwrap().members.len(), 3);
    assert_eq!(graph.node(net).unwrap().edges.len(), 2);

    // Merging into a structural copy keeps every node once and only suffixes names.
    let fresh = graph.structure_copy(net, "fresh").unwrap();
    graph.merge(fresh, sel).unwrap();
    let record = graph.node(fresh).unwrap();
    assert_eq!(
        record.members.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["a", "b", "c", "a(1)", "b(1)"]
    );
    assert_eq!(
        record.edges.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["ab", "bc", "ab(1)"]
    );
    let unique: HashSet<NodeId> = record.members.values().copied().collect();
    assert_eq!(unique.len(), record.members.len());
    assert_eq!(record.num, 7 + 3);
}

#[test]
fn dangling_edge_changes_nothing() {
    let mut graph = AssemblyGraph::new();
    let net = graph
        .builder("net", NodeKind::Network)
        .leaf("a", NodeKind::NeuronGroup, 1)
        .unwrap()
        .finish();
    let a = key(&graph, net, "a");
    let stranger = graph.create_leaf("stranger", NodeKind::NeuronGroup, 1).unwrap();
    let edge = graph.create_edge(a, stranger).unwrap();
    let before = graph.node(net).unwrap().clone();

    let err = graph.add_edge(net, "a_stranger", edge).unwrap_err();
    assert!(matches!(err, GraphError::DanglingEdge { .. }));
    let after = graph.node(net).unwrap();
    assert_eq!(after.edges, before.edges);
    assert!(graph.node(a).unwrap().outbound.is_empty());
    assert!(graph.edge(edge).unwrap().owners.is_empty());
}

struct Refuse(&'static str);

impl Backend for Refuse {
    fn build(&mut self, step: &BuildStep) -> Result<(), BackendError> {
        if step.name == self.0 {
            Err(BackendError::new("unsupported neuron model"))
        } else {
            Ok(())
        }
    }
}

#[test]
fn backend_failure_aborts_and_leaves_graph_stale() {
    let config = GraphConfig { warn_isolated: false, ..GraphConfig::default() };
    let mut graph = AssemblyGraph::with_config(config);
    let net = graph
        .builder("net", NodeKind::Network)
        .leaf("x", NodeKind::NeuronGroup, 1)
        .unwrap()
        .finish();

    let err = graph.build(net, &mut Refuse("x")).unwrap_err();
    assert_eq!(
        err,
        GraphError::Backend {
            target: "net<net>_x<neg>".into(),
            message: "unsupported neuron model".into(),
        }
    );
    assert!(!graph.is_compiled());
}
