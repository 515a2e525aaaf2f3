//! Explicit weighted graphs with named vertices.
//!
//! The JSON form matches what the CLI reads:
//! `{"edges": [{"from": "a", "to": "b", "cost": 1.0, "directed": false}]}`.
//! Vertices are created on first mention.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::node::{Neighbor, Neighbors, SearchNode};

/// One edge of the JSON description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub from: String,
    pub to: String,
    pub cost: f64,
    #[serde(default)]
    pub directed: bool,
}

/// Serialized graph description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSpec {
    /// Vertices with no edges can be listed explicitly
    #[serde(default)]
    pub nodes: Vec<String>,
    pub edges: Vec<EdgeSpec>,
}

/// Adjacency-list graph with `f64` edge costs
#[derive(Debug, Clone, Default)]
pub struct Graph {
    names: Vec<String>,
    ids: FxHashMap<String, usize>,
    adjacency: Vec<Vec<(usize, f64)>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a parsed description, rejecting negative costs
    pub fn from_spec(spec: &GraphSpec) -> Result<Self> {
        let mut graph = Graph::new();
        for name in &spec.nodes {
            graph.add_node(name);
        }
        for edge in &spec.edges {
            if edge.directed {
                graph.add_edge(&edge.from, &edge.to, edge.cost)?;
            } else {
                graph.add_undirected_edge(&edge.from, &edge.to, edge.cost)?;
            }
        }
        Ok(graph)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let spec: GraphSpec = serde_json::from_str(json)?;
        Self::from_spec(&spec)
    }

    /// Return the id for `name`, creating the vertex if needed
    pub fn add_node(&mut self, name: &str) -> usize {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        self.adjacency.push(Vec::new());
        id
    }

    pub fn add_edge(&mut self, from: &str, to: &str, cost: f64) -> Result<()> {
        if cost < 0.0 || cost.is_nan() {
            return Err(SearchError::NegativeCost {
                from: from.to_string(),
                to: to.to_string(),
                cost,
            });
        }
        let a = self.add_node(from);
        let b = self.add_node(to);
        self.adjacency[a].push((b, cost));
        Ok(())
    }

    pub fn add_undirected_edge(&mut self, a: &str, b: &str, cost: f64) -> Result<()> {
        self.add_edge(a, b, cost)?;
        self.add_edge(b, a, cost)
    }

    /// Searchable handle for a named vertex
    pub fn node(&self, name: &str) -> Result<GraphNode<'_>> {
        self.ids
            .get(name)
            .map(|&id| GraphNode { graph: self, id })
            .ok_or_else(|| SearchError::UnknownNode(name.to_string()))
    }

    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }
}

/// A vertex of a [`Graph`]; equal when it names the same vertex
#[derive(Debug, Clone, Copy)]
pub struct GraphNode<'g> {
    graph: &'g Graph,
    id: usize,
}

impl<'g> GraphNode<'g> {
    pub fn name(&self) -> &'g str {
        &self.graph.names[self.id]
    }
}

impl PartialEq for GraphNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.graph, other.graph)
    }
}

impl Eq for GraphNode<'_> {}

impl Hash for GraphNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl SearchNode for GraphNode<'_> {
    type Cost = f64;

    fn neighbors(&self) -> Neighbors<Self, f64> {
        self.graph.adjacency[self.id]
            .iter()
            .map(|&(id, cost)| {
                Neighbor::new(
                    GraphNode {
                        graph: self.graph,
                        id,
                    },
                    cost,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::dijkstra;

    #[test]
    fn test_from_json() {
        let graph = Graph::from_json(
            r#"{"edges": [
                {"from": "a", "to": "b", "cost": 1.5},
                {"from": "b", "to": "c", "cost": 2.0, "directed": true}
            ]}"#,
        )
        .unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);

        let a = graph.node("a").unwrap();
        let c = graph.node("c").unwrap();
        let path = dijkstra(&a, &c).unwrap();
        assert_eq!(path.cost(), 3.5);
        let names: Vec<&str> = path.iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        // c -> b is not an edge
        assert!(dijkstra(&c, &a).is_none());
    }

    #[test]
    fn test_same_vertex_looked_up_twice_is_equal() {
        let mut graph = Graph::new();
        graph.add_undirected_edge("x", "y", 1.0).unwrap();
        assert_eq!(graph.node("x").unwrap(), graph.node("x").unwrap());
        assert_ne!(graph.node("x").unwrap(), graph.node("y").unwrap());
    }

    #[test]
    fn test_rejects_negative_cost() {
        let mut graph = Graph::new();
        let err = graph.add_edge("a", "b", -1.0).unwrap_err();
        assert!(matches!(err, SearchError::NegativeCost { .. }));
    }

    #[test]
    fn test_unknown_node() {
        let graph = Graph::new();
        assert!(matches!(graph.node("nope"), Err(SearchError::UnknownNode(_))));
    }

    #[test]
    fn test_isolated_nodes_listed() {
        let spec = GraphSpec {
            nodes: vec!["lonely".to_string()],
            edges: vec![],
        };
        let graph = Graph::from_spec(&spec).unwrap();
        let lonely = graph.node("lonely").unwrap();
        assert_eq!(dijkstra(&lonely, &lonely).unwrap().cost(), 0.0);
    }
}
