//! Namespace include graph.
//!
//! Every namespace of every repository is a node; an edge points from a
//! namespace to each namespace its repository includes. Namespaces are built
//! in DFS post-order so that everything a namespace can reference is complete
//! before it is built.

use girbind_core::idl::IdlRepository;
use girbind_core::{BuildError, versioned_namespace};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, DfsPostOrder};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct NamespaceNode {
    name: String,
    versioned: String,
    /// Repository index and namespace index within it.
    location: (usize, usize),
}

#[derive(Debug, Clone)]
pub struct IncludeGraph {
    graph: DiGraph<NamespaceNode, ()>,
    nodes: FxHashMap<String, NodeIndex>,
}

impl IncludeGraph {
    /// Build the graph over all namespaces of `repositories`.
    ///
    /// Fails when two namespaces share an identity key. Includes that name no
    /// known namespace are skipped with a warning.
    pub fn new(repositories: &[IdlRepository]) -> Result<Self, BuildError> {
        let mut graph = DiGraph::new();
        let mut nodes = FxHashMap::default();

        for (r, repo) in repositories.iter().enumerate() {
            for (n, ns) in repo.namespaces.iter().enumerate() {
                let versioned = versioned_namespace(&ns.name, &ns.version);
                if nodes.contains_key(&versioned) {
                    return Err(BuildError::DuplicateNamespace(versioned));
                }
                let node = graph.add_node(NamespaceNode {
                    name: ns.name.clone(),
                    versioned: versioned.clone(),
                    location: (r, n),
                });
                nodes.insert(versioned, node);
            }
        }

        for repo in repositories {
            for ns in &repo.namespaces {
                let from = nodes[&versioned_namespace(&ns.name, &ns.version)];
                for include in &repo.includes {
                    let key = versioned_namespace(&include.name, &include.version);
                    match nodes.get(&key) {
                        Some(&to) => {
                            graph.update_edge(from, to, ());
                        }
                        None => warn!(namespace = %graph[from].versioned, include = key.as_str(), "included namespace not found"),
                    }
                }
            }
        }

        debug!(namespaces = graph.node_count(), edges = graph.edge_count(), "built include graph");
        Ok(Self { graph, nodes })
    }

    /// Identity keys, dependencies before dependents.
    ///
    /// Among independent namespaces the order of the input repositories is kept.
    pub fn emission_order(&self) -> Vec<&str> {
        let mut order = Vec::with_capacity(self.graph.node_count());
        let mut dfs = DfsPostOrder::empty(&self.graph);
        for start in self.graph.node_indices() {
            dfs.move_to(start);
            while let Some(node) = dfs.next(&self.graph) {
                order.push(self.graph[node].versioned.as_str());
            }
        }
        order
    }

    /// Every namespace reachable from `versioned`, as IDL name to identity key.
    pub fn transitive_includes(&self, versioned: &str) -> FxHashMap<String, String> {
        let Some(&start) = self.nodes.get(versioned) else {
            return FxHashMap::default();
        };

        let mut out = FxHashMap::default();
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(node) = dfs.next(&self.graph) {
            if node == start {
                continue;
            }
            let n = &self.graph[node];
            out.insert(n.name.clone(), n.versioned.clone());
        }
        out
    }

    pub(crate) fn location(&self, versioned: &str) -> Option<(usize, usize)> {
        self.nodes.get(versioned).map(|&n| self.graph[n].location)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use girbind_core::idl::IdlNamespace;

    fn repo(name: &str, version: &str, includes: &[(&str, &str)]) -> IdlRepository {
        let mut repo = IdlRepository::new(IdlNamespace::new(name, version));
        for &(n, v) in includes {
            repo = repo.with_include(n, v);
        }
        repo
    }

    #[test]
    fn dependencies_come_first() {
        let repos = vec![
            repo("Gtk", "4.0", &[("Gio", "2.0"), ("GObject", "2.0")]),
            repo("Gio", "2.0", &[("GObject", "2.0")]),
            repo("GObject", "2.0", &[]),
        ];
        let graph = IncludeGraph::new(&repos).unwrap();
        assert_eq!(graph.emission_order(), vec!["GObject-2", "Gio-2", "Gtk-4"]);
        assert_eq!(graph.location("Gio-2"), Some((1, 0)));
    }

    #[test]
    fn includes_are_transitive() {
        let repos = vec![
            repo("Gtk", "4.0", &[("Gio", "2.0")]),
            repo("Gio", "2.0", &[("GObject", "2.0")]),
            repo("GObject", "2.0", &[]),
        ];
        let graph = IncludeGraph::new(&repos).unwrap();
        let includes = graph.transitive_includes("Gtk-4");
        assert_eq!(includes.len(), 2);
        assert_eq!(includes.get("GObject").map(String::as_str), Some("GObject-2"));
        assert!(graph.transitive_includes("GObject-2").is_empty());
    }

    #[test]
    fn duplicate_namespace_is_an_error() {
        let repos = vec![repo("GLib", "2.0", &[]), repo("GLib", "2.0", &[])];
        assert!(matches!(
            IncludeGraph::new(&repos),
            Err(BuildError::DuplicateNamespace(key)) if key == "GLib-2"
        ));
    }

    #[test]
    fn missing_include_is_skipped() {
        let repos = vec![repo("Pango", "1.0", &[("HarfBuzz", "0.0")])];
        let graph = IncludeGraph::new(&repos).unwrap();
        assert_eq!(graph.emission_order(), vec!["Pango-1"]);
        assert!(graph.transitive_includes("Pango-1").is_empty());
    }
}
