use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::types::graph_query::GraphQuery;

pub mod graph_file;
pub mod graph_query;

/// Dense vertex identifier, always in `0..vertex_count`.
pub type VertexId = usize;

/// Integer edge weight.
pub type Weight = i64;

/// Describes where the weights of a dataset conceptually live.
///
/// This is metadata only: the engines always read weights from edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightModel {
    #[default]
    Edge,
    Node,
}

impl WeightModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightModel::Edge => "edge",
            WeightModel::Node => "node",
        }
    }
}

impl fmt::Display for WeightModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightModel {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "edge" => Ok(WeightModel::Edge),
            "node" => Ok(WeightModel::Node),
            other => Err(GraphError::InvalidDescription(format!(
                "unknown weight model '{}'",
                other
            ))),
        }
    }
}

/// An outgoing edge stored in the adjacency list of its source vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Target vertex of the edge
    pub to: VertexId,
    /// Integer weight carried by the edge
    pub weight: Weight,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, w={})", self.to, self.weight)
    }
}

/// Adjacency-list graph with a fixed number of vertices.
///
/// Vertices are the dense indices `0..n`. Edges are appended through [`Graph::add_edge`] only
/// and keep their insertion order, which the traversal engines rely on for deterministic
/// tie-breaking. Derived graphs (transpose, condensation) are always new instances.
///
/// An undirected graph stores every edge in both adjacency lists, so its raw entry count is
/// twice the logical edge count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    /// Adjacency list, one ordered edge sequence per vertex
    adjacency: Vec<Vec<Edge>>,
    /// Whether edges are one-way
    directed: bool,
    /// Descriptive weight placement tag
    weight_model: WeightModel,
}

impl Graph {
    /// Creates a graph with `vertex_count` isolated vertices.
    pub fn new(vertex_count: usize, directed: bool, weight_model: WeightModel) -> Self {
        Self {
            adjacency: vec![Vec::new(); vertex_count],
            directed,
            weight_model,
        }
    }

    /// Shorthand for a directed graph with edge weights, the shape every engine expects.
    pub fn directed(vertex_count: usize) -> Self {
        Self::new(vertex_count, true, WeightModel::Edge)
    }

    /// Builds a directed graph from `(u, v, w)` triples in order.
    pub fn from_edges(vertex_count: usize, edges: &[(VertexId, VertexId, Weight)]) -> Result<Self> {
        let mut graph = Self::directed(vertex_count);
        for &(u, v, w) in edges {
            graph.add_edge(u, v, w)?;
        }
        Ok(graph)
    }

    /// Appends the edge `u -> v`; undirected graphs also get `v -> u`.
    ///
    /// The vertex count never grows: an endpoint outside `0..n` is rejected.
    pub fn add_edge(&mut self, u: VertexId, v: VertexId, weight: Weight) -> Result<()> {
        self.check_vertex(u)?;
        self.check_vertex(v)?;

        self.adjacency[u].push(Edge { to: v, weight });
        if !self.directed {
            self.adjacency[v].push(Edge { to: u, weight });
        }
        Ok(())
    }

    /// Fails with `VertexOutOfRange` unless `vertex` is a valid index.
    pub fn check_vertex(&self, vertex: VertexId) -> Result<()> {
        if vertex < self.adjacency.len() {
            Ok(())
        } else {
            Err(GraphError::VertexOutOfRange {
                vertex,
                vertex_count: self.adjacency.len(),
            })
        }
    }

    /// Fails with `NotDirected` for undirected graphs. `algorithm` names the caller.
    pub fn require_directed(&self, algorithm: &'static str) -> Result<()> {
        if self.directed {
            Ok(())
        } else {
            Err(GraphError::NotDirected { algorithm })
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Logical edge count: raw adjacency entries, halved for undirected graphs.
    pub fn edge_count(&self) -> usize {
        let raw: usize = self.adjacency.iter().map(Vec::len).sum();
        if self.directed {
            raw
        } else {
            raw / 2
        }
    }

    /// Outgoing edges of `u` in insertion order.
    ///
    /// # Panics
    /// Panics if `u` is not a vertex of this graph.
    pub fn adjacent_edges(&self, u: VertexId) -> &[Edge] {
        &self.adjacency[u]
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn weight_model(&self) -> WeightModel {
        self.weight_model
    }

    /// In-degree of every vertex, counting parallel edges separately.
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut in_degree = vec![0usize; self.vertex_count()];
        for edges in &self.adjacency {
            for edge in edges {
                in_degree[edge.to] += 1;
            }
        }
        in_degree
    }

    /// Returns a new graph with every edge reversed.
    ///
    /// Edges land in the transposed adjacency lists in source-vertex order, then in the
    /// original insertion order.
    pub fn transpose(&self) -> Result<Graph> {
        self.require_directed("transpose")?;

        let mut transposed = Graph::new(self.vertex_count(), true, self.weight_model);
        for (u, edges) in self.adjacency.iter().enumerate() {
            for edge in edges {
                transposed.adjacency[edge.to].push(Edge { to: u, weight: edge.weight });
            }
        }
        Ok(transposed)
    }
}

impl GraphQuery for Graph {
    fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    fn read_neighbor(&self, vertex_id: VertexId) -> Vec<VertexId> {
        match self.adjacency.get(vertex_id) {
            Some(edges) => edges.iter().map(|edge| edge.to).collect(),
            None => vec![], // Out-of-range vertices have no neighbors
        }
    }

    fn has_vertex(&self, vertex_id: VertexId) -> bool {
        vertex_id < self.adjacency.len()
    }

    fn has_edge(&self, src_id: VertexId, dst_id: VertexId) -> bool {
        self.adjacency
            .get(src_id)
            .map(|edges| edges.iter().any(|edge| edge.to == dst_id))
            .unwrap_or(false)
    }

    fn vertex_list(&self) -> Vec<VertexId> {
        (0..self.adjacency.len()).collect()
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Graph (n={}, edges={}):", self.vertex_count(), self.edge_count())?;
        for (u, edges) in self.adjacency.iter().enumerate() {
            let rendered: Vec<String> = edges.iter().map(Edge::to_string).collect();
            writeln!(f, "  {} -> [{}]", u, rendered.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test_graph {
    use crate::error::GraphError;
    use crate::types::graph_query::GraphQuery;
    use crate::types::{Edge, Graph, WeightModel};

    /// Directed edges are stored once, in insertion order, and counted raw.
    #[test]
    fn test_directed_add_edge() {
        let mut graph = Graph::directed(3);
        graph.add_edge(0, 1, 5).unwrap();
        graph.add_edge(0, 2, 7).unwrap();
        graph.add_edge(1, 2, -1).unwrap();

        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(
            graph.adjacent_edges(0),
            &[Edge { to: 1, weight: 5 }, Edge { to: 2, weight: 7 }]
        );
        assert!(graph.adjacent_edges(2).is_empty());
    }

    /// Undirected edges are mirrored, and the logical count halves the raw count.
    #[test]
    fn test_undirected_add_edge() {
        let mut graph = Graph::new(3, false, WeightModel::Node);
        graph.add_edge(0, 1, 2).unwrap();
        graph.add_edge(1, 2, 3).unwrap();

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.adjacent_edges(1).len(), 2);
        assert_eq!(graph.adjacent_edges(2), &[Edge { to: 1, weight: 3 }]);
        assert_eq!(graph.weight_model(), WeightModel::Node);
        assert!(!graph.is_directed());
    }

    /// Out-of-range endpoints are rejected and the vertex count stays fixed.
    #[test]
    fn test_add_edge_out_of_range() {
        let mut graph = Graph::directed(2);
        let err = graph.add_edge(0, 2, 1).unwrap_err();
        assert!(matches!(
            err,
            GraphError::VertexOutOfRange { vertex: 2, vertex_count: 2 }
        ));
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_transpose() {
        let graph = Graph::from_edges(3, &[(0, 1, 4), (0, 2, 1), (2, 1, 9)]).unwrap();
        let transposed = graph.transpose().unwrap();

        assert_eq!(transposed.edge_count(), 3);
        assert!(transposed.adjacent_edges(0).is_empty());
        assert_eq!(
            transposed.adjacent_edges(1),
            &[Edge { to: 0, weight: 4 }, Edge { to: 2, weight: 9 }]
        );
        assert_eq!(transposed.adjacent_edges(2), &[Edge { to: 0, weight: 1 }]);
        assert_eq!(transposed.transpose().unwrap(), graph);
    }

    #[test]
    fn test_transpose_undirected_fails() {
        let graph = Graph::new(2, false, WeightModel::Edge);
        assert!(matches!(
            graph.transpose(),
            Err(GraphError::NotDirected { algorithm: "transpose" })
        ));
    }

    #[test]
    fn test_in_degrees_count_parallel_edges() {
        let graph = Graph::from_edges(3, &[(0, 2, 1), (1, 2, 1), (0, 2, 3), (2, 2, 1)]).unwrap();
        assert_eq!(graph.in_degrees(), vec![0, 0, 4]);
    }

    /// Tests the read-only query view of the graph.
    #[test]
    fn test_graph_query() {
        let graph = Graph::from_edges(4, &[(0, 1, 1), (0, 3, 1), (3, 2, 1)]).unwrap();

        assert_eq!(graph.read_neighbor(0), vec![1, 3]);
        assert_eq!(graph.read_neighbor(9), Vec::<usize>::new());
        assert!(graph.has_vertex(3));
        assert!(!graph.has_vertex(4));
        assert!(graph.has_edge(3, 2));
        assert!(!graph.has_edge(2, 3));
        assert_eq!(graph.vertex_list(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_display() {
        let graph = Graph::from_edges(2, &[(0, 1, 3)]).unwrap();
        let rendered = graph.to_string();
        assert!(rendered.starts_with("Graph (n=2, edges=1):"));
        assert!(rendered.contains("0 -> [(1, w=3)]"));
        assert!(rendered.contains("1 -> []"));
    }

    #[test]
    fn test_weight_model_parse() {
        assert_eq!("edge".parse::<WeightModel>().unwrap(), WeightModel::Edge);
        assert_eq!("node".parse::<WeightModel>().unwrap(), WeightModel::Node);
        assert!("vertex".parse::<WeightModel>().is_err());
    }
}
