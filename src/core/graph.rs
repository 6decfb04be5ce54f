//! Include dependency graph
//!
//! Files are stored by value in an arena and edges are indices into it, so a
//! frozen graph can be shared freely across threads during sorting and
//! staleness evaluation.
//!
//! An edge `u -> v` means "u includes v". Build order places every
//! dependency before its dependents.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::classify::FileKind;
use crate::core::include::extract_includes;
use crate::error::GraphError;

/// Index of a node inside a [`DependencyGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the graph's arena (insertion order)
    pub fn index(self) -> usize {
        self.0
    }
}

/// One discovered source or header file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    kind: FileKind,
    path: PathBuf,
    children: Vec<NodeId>,
}

impl FileNode {
    /// Kind of file this node represents
    pub fn kind(&self) -> FileKind {
        self.kind
    }

    /// Path of the file on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Headers this file includes, in the order they were first seen
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Why a quoted include did not become an edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "lowercase")]
pub enum UnresolvedReason {
    /// No discovered header has this filename
    Missing,
    /// Several discovered headers match
    Ambiguous { candidates: Vec<PathBuf> },
}

/// A local include that was skipped during graph construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedInclude {
    /// File containing the directive
    pub from: PathBuf,
    /// Quoted include text
    pub name: String,
    /// Why it was skipped
    #[serde(flatten)]
    pub reason: UnresolvedReason,
}

/// Directed acyclic graph of project files and their includes
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    nodes: Vec<FileNode>,
    by_path: HashMap<PathBuf, NodeId>,
    headers_by_name: HashMap<String, Vec<NodeId>>,
    unresolved: Vec<UnresolvedInclude>,
}

impl DependencyGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a discovered file, returning its id
    ///
    /// Adding the same path twice returns the existing node.
    pub fn add_node(&mut self, kind: FileKind, path: PathBuf) -> NodeId {
        if let Some(&id) = self.by_path.get(&path) {
            return id;
        }

        let id = NodeId(self.nodes.len());
        if kind == FileKind::Header {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                self.headers_by_name
                    .entry(name.to_string())
                    .or_default()
                    .push(id);
            }
        }
        self.by_path.insert(path.clone(), id);
        self.nodes.push(FileNode {
            kind,
            path,
            children: Vec::new(),
        });
        id
    }

    /// Record that `from` includes `to`; duplicate edges are ignored
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        let children = &mut self.nodes[from.0].children;
        if !children.contains(&to) {
            children.push(to);
        }
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> &FileNode {
        &self.nodes[id.0]
    }

    /// Find the node for a path
    pub fn find(&self, path: &Path) -> Option<NodeId> {
        self.by_path.get(path).copied()
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.children.len()).sum()
    }

    /// Includes that could not be matched to a discovered header
    pub fn unresolved(&self) -> &[UnresolvedInclude] {
        &self.unresolved
    }

    /// Match an include name against the discovered headers
    ///
    /// Matching is by filename. When several headers share the filename,
    /// the include text is used as a path suffix to pick one.
    pub fn resolve_include(&self, name: &str) -> Result<NodeId, UnresolvedReason> {
        let Some(file) = Path::new(name).file_name().and_then(|n| n.to_str()) else {
            return Err(UnresolvedReason::Missing);
        };
        let candidates = match self.headers_by_name.get(file) {
            Some(candidates) if !candidates.is_empty() => candidates,
            _ => return Err(UnresolvedReason::Missing),
        };
        if let [only] = candidates.as_slice() {
            return Ok(*only);
        }

        let suffix = Path::new(name);
        let narrowed: Vec<NodeId> = candidates
            .iter()
            .copied()
            .filter(|id| self.nodes[id.0].path.ends_with(suffix))
            .collect();
        match narrowed.as_slice() {
            [only] => Ok(*only),
            _ => Err(UnresolvedReason::Ambiguous {
                candidates: candidates
                    .iter()
                    .map(|id| self.nodes[id.0].path.clone())
                    .collect(),
            }),
        }
    }

    /// Compute a build order with Kahn's algorithm
    ///
    /// For every edge `u -> v` the result places `v` before `u`. Nodes that
    /// become ready at the same time keep insertion order, so the output is
    /// deterministic for a given graph.
    pub fn topological_sort(&self) -> Result<Vec<NodeId>, GraphError> {
        let count = self.nodes.len();
        let mut pending: Vec<usize> = self.nodes.iter().map(|n| n.children.len()).collect();
        let mut dependents: Vec<Vec<NodeId>> = vec![Vec::new(); count];
        for (index, node) in self.nodes.iter().enumerate() {
            for child in &node.children {
                dependents[child.0].push(NodeId(index));
            }
        }

        let mut queue: VecDeque<NodeId> = (0..count)
            .filter(|&i| pending[i] == 0)
            .map(NodeId)
            .collect();
        let mut order = Vec::with_capacity(count);

        while let Some(id) = queue.pop_front() {
            order.push(id);
            for &dependent in &dependents[id.0] {
                pending[dependent.0] -= 1;
                if pending[dependent.0] == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        if order.len() < count {
            let files = (0..count)
                .filter(|&i| pending[i] > 0)
                .map(|i| self.nodes[i].path.clone())
                .collect();
            return Err(GraphError::CycleDetected { files });
        }

        Ok(order)
    }

    /// Transitive include set of every node, indexed by [`NodeId::index`]
    ///
    /// `order` must be a topological order from [`Self::topological_sort`];
    /// each closure is assembled from the already-computed closures of its
    /// children.
    pub fn include_closures(&self, order: &[NodeId]) -> Vec<BTreeSet<NodeId>> {
        let mut closures: Vec<BTreeSet<NodeId>> = vec![BTreeSet::new(); self.nodes.len()];
        for &id in order {
            let mut closure = BTreeSet::new();
            for &child in &self.nodes[id.0].children {
                closure.insert(child);
                closure.extend(closures[child.0].iter().copied());
            }
            closures[id.0] = closure;
        }
        closures
    }
}

/// Build the include graph for the discovered sources and headers
///
/// Sources are added first, then headers, each in discovery order. Every
/// file is read for local includes; names that match no header (or several)
/// are recorded in [`DependencyGraph::unresolved`] and otherwise ignored.
pub fn build_graph(
    sources: &[PathBuf],
    headers: &[PathBuf],
) -> Result<DependencyGraph, GraphError> {
    let mut graph = DependencyGraph::new();
    for source in sources {
        graph.add_node(FileKind::Source, source.clone());
    }
    for header in headers {
        graph.add_node(FileKind::Header, header.clone());
    }

    for index in 0..graph.nodes.len() {
        let from = NodeId(index);
        let path = graph.nodes[index].path.clone();

        for name in extract_includes(&path)? {
            match graph.resolve_include(&name) {
                Ok(to) => graph.add_edge(from, to),
                Err(reason) => {
                    tracing::debug!(
                        "Skipping include \"{name}\" in {}: {reason:?}",
                        path.display()
                    );
                    graph.unresolved.push(UnresolvedInclude {
                        from: path.clone(),
                        name,
                        reason,
                    });
                }
            }
        }
    }

    tracing::debug!(
        "Dependency graph: {} nodes, {} edges, {} unresolved includes",
        graph.len(),
        graph.edge_count(),
        graph.unresolved.len()
    );

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    fn position(order: &[NodeId], id: NodeId) -> usize {
        order.iter().position(|&x| x == id).unwrap()
    }

    #[test]
    fn test_build_graph_wires_local_includes() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let main = write(
            root,
            "src/main.cpp",
            "#include <vector>\n#include \"util.h\"\nint main() {}\n",
        );
        let util = write(root, "include/util.h", "#pragma once\n");

        let graph = build_graph(&[main.clone()], &[util.clone()]).unwrap();

        let main_id = graph.find(&main).unwrap();
        let util_id = graph.find(&util).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.node(main_id).kind(), FileKind::Source);
        assert_eq!(graph.node(util_id).kind(), FileKind::Header);
        assert_eq!(graph.node(main_id).children(), &[util_id]);
        assert!(graph.unresolved().is_empty());
    }

    #[test]
    fn test_build_graph_records_missing_include() {
        let temp = TempDir::new().unwrap();
        let main = write(temp.path(), "src/main.cpp", "#include \"third_party.h\"\n");

        let graph = build_graph(&[main.clone()], &[]).unwrap();

        assert_eq!(graph.edge_count(), 0);
        assert_eq!(
            graph.unresolved(),
            &[UnresolvedInclude {
                from: main,
                name: "third_party.h".to_string(),
                reason: UnresolvedReason::Missing,
            }]
        );
    }

    #[test]
    fn test_build_graph_ambiguous_include_is_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let main = write(root, "src/main.cpp", "#include \"config.h\"\n");
        let a = write(root, "include/a/config.h", "");
        let b = write(root, "include/b/config.h", "");

        let graph = build_graph(&[main], &[a, b]).unwrap();

        assert_eq!(graph.edge_count(), 0);
        assert!(matches!(
            graph.unresolved()[0].reason,
            UnresolvedReason::Ambiguous { ref candidates } if candidates.len() == 2
        ));
    }

    #[test]
    fn test_build_graph_path_suffix_disambiguates() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let main = write(root, "src/main.cpp", "#include \"b/config.h\"\n");
        let a = write(root, "include/a/config.h", "");
        let b = write(root, "include/b/config.h", "");

        let graph = build_graph(&[main.clone()], &[a, b.clone()]).unwrap();

        let main_id = graph.find(&main).unwrap();
        assert_eq!(graph.node(main_id).children(), &[graph.find(&b).unwrap()]);
    }

    #[test]
    fn test_build_graph_collapses_duplicate_includes() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let main = write(root, "src/main.cpp", "#include \"util.h\"\n#include \"util.h\"\n");
        let util = write(root, "include/util.h", "");

        let graph = build_graph(&[main], &[util]).unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_build_graph_unreadable_file() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("src/gone.cpp");

        let result = build_graph(&[missing], &[]);
        assert!(matches!(result, Err(GraphError::ReadFile { .. })));
    }

    #[test]
    fn test_sort_places_dependencies_first() {
        let mut graph = DependencyGraph::new();
        let main = graph.add_node(FileKind::Source, PathBuf::from("src/main.cpp"));
        let app = graph.add_node(FileKind::Header, PathBuf::from("include/app.h"));
        let util = graph.add_node(FileKind::Header, PathBuf::from("include/util.h"));
        graph.add_edge(main, app);
        graph.add_edge(app, util);
        graph.add_edge(main, util);

        let order = graph.topological_sort().unwrap();
        assert_eq!(order, vec![util, app, main]);
    }

    #[test]
    fn test_sort_ties_keep_insertion_order() {
        let mut graph = DependencyGraph::new();
        let a = graph.add_node(FileKind::Source, PathBuf::from("a.cpp"));
        let b = graph.add_node(FileKind::Source, PathBuf::from("b.cpp"));
        let c = graph.add_node(FileKind::Source, PathBuf::from("c.cpp"));

        assert_eq!(graph.topological_sort().unwrap(), vec![a, b, c]);
    }

    #[test]
    fn test_sort_detects_header_cycle() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let main = write(root, "src/main.cpp", "#include \"util.h\"\n");
        let util = write(root, "include/util.h", "");
        let a = write(root, "include/a.h", "#include \"b.h\"\n");
        let b = write(root, "include/b.h", "#include \"a.h\"\n");

        let graph = build_graph(&[main], &[a.clone(), b.clone(), util]).unwrap();

        match graph.topological_sort() {
            Err(GraphError::CycleDetected { files }) => {
                assert_eq!(files, vec![a, b]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_sort_detects_self_include() {
        let mut graph = DependencyGraph::new();
        let a = graph.add_node(FileKind::Header, PathBuf::from("a.h"));
        graph.add_edge(a, a);

        assert!(matches!(
            graph.topological_sort(),
            Err(GraphError::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_add_node_is_idempotent_per_path() {
        let mut graph = DependencyGraph::new();
        let first = graph.add_node(FileKind::Header, PathBuf::from("include/x.h"));
        let second = graph.add_node(FileKind::Header, PathBuf::from("include/x.h"));
        assert_eq!(first, second);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_include_closures_are_transitive() {
        let mut graph = DependencyGraph::new();
        let main = graph.add_node(FileKind::Source, PathBuf::from("main.cpp"));
        let a = graph.add_node(FileKind::Header, PathBuf::from("a.h"));
        let b = graph.add_node(FileKind::Header, PathBuf::from("b.h"));
        let c = graph.add_node(FileKind::Header, PathBuf::from("c.h"));
        graph.add_edge(main, a);
        graph.add_edge(a, b);
        graph.add_edge(b, c);

        let order = graph.topological_sort().unwrap();
        let closures = graph.include_closures(&order);

        assert_eq!(closures[main.index()], BTreeSet::from([a, b, c]));
        assert_eq!(closures[a.index()], BTreeSet::from([b, c]));
        assert!(closures[c.index()].is_empty());
    }

    /// Random DAG: `n` nodes, edges only from a higher to a lower index
    fn arbitrary_dag() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
        (1usize..24).prop_flat_map(|n| {
            let edges = proptest::collection::vec((0..n, 0..n), 0..n * 3).prop_map(|pairs| {
                pairs
                    .into_iter()
                    .filter(|(u, v)| u > v)
                    .collect::<Vec<_>>()
            });
            (Just(n), edges)
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_sort_is_complete_and_ordered((n, edges) in arbitrary_dag()) {
            let mut graph = DependencyGraph::new();
            let ids: Vec<NodeId> = (0..n)
                .map(|i| graph.add_node(FileKind::Header, PathBuf::from(format!("h{i}.h"))))
                .collect();
            for &(u, v) in &edges {
                graph.add_edge(ids[u], ids[v]);
            }

            let order = graph.topological_sort().unwrap();
            prop_assert_eq!(order.len(), graph.len());
            for &(u, v) in &edges {
                prop_assert!(position(&order, ids[v]) < position(&order, ids[u]));
            }
        }

        #[test]
        fn test_sort_is_deterministic((n, edges) in arbitrary_dag()) {
            let mut graph = DependencyGraph::new();
            for i in 0..n {
                graph.add_node(FileKind::Header, PathBuf::from(format!("h{i}.h")));
            }
            for &(u, v) in &edges {
                graph.add_edge(NodeId(u), NodeId(v));
            }
            prop_assert_eq!(graph.topological_sort().unwrap(), graph.topological_sort().unwrap());
        }
    }
}
