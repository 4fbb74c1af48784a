use log::debug;
use serde::Serialize;

use crate::algorithms::topo::{KahnTopologicalSort, TopologicalSort};
use crate::error::{GraphError, Result};
use crate::metrics::{Counter, Metrics};
use crate::types::graph_query::GraphQuery;
use crate::types::{Graph, VertexId, Weight};

/// Whether a path computation minimizes or maximizes total weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    Shortest,
    Longest,
}

impl PathKind {
    /// Whether `candidate` replaces the current best distance.
    fn improves(&self, candidate: Weight, current: Option<Weight>) -> bool {
        match (self, current) {
            (_, None) => true,
            (PathKind::Shortest, Some(current)) => candidate < current,
            (PathKind::Longest, Some(current)) => candidate > current,
        }
    }
}

/// Single-source distances and predecessor links over a DAG.
///
/// `None` marks a vertex the source cannot reach (distance) or a vertex without predecessor
/// (parent). The source itself has distance 0 and no parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResult {
    kind: PathKind,
    source: VertexId,
    dist: Vec<Option<Weight>>,
    parent: Vec<Option<VertexId>>,
}

impl PathResult {
    pub fn kind(&self) -> PathKind {
        self.kind
    }

    pub fn source(&self) -> VertexId {
        self.source
    }

    /// Best distance from the source to `vertex`, `None` if unreachable or out of range.
    pub fn distance(&self, vertex: VertexId) -> Option<Weight> {
        self.dist.get(vertex).copied().flatten()
    }

    /// Predecessor of `vertex` on its best path.
    pub fn parent(&self, vertex: VertexId) -> Option<VertexId> {
        self.parent.get(vertex).copied().flatten()
    }

    pub fn is_reachable(&self, vertex: VertexId) -> bool {
        self.distance(vertex).is_some()
    }

    /// Distances of every vertex, indexed by vertex.
    pub fn distances(&self) -> &[Option<Weight>] {
        &self.dist
    }

    /// Reachable vertices with their distances, ascending by vertex.
    pub fn reachable(&self) -> impl Iterator<Item = (VertexId, Weight)> + '_ {
        self.dist
            .iter()
            .enumerate()
            .filter_map(|(vertex, dist)| dist.map(|d| (vertex, d)))
    }

    /// Walks the parent links back from `dest` and returns the path source-first.
    ///
    /// # Returns
    /// `None` when `dest` is unreachable from the source (or not a vertex).
    pub fn reconstruct_path(&self, dest: VertexId) -> Option<Vec<VertexId>> {
        if !self.is_reachable(dest) {
            return None;
        }

        let mut path = vec![dest];
        let mut current = dest;
        while let Some(pred) = self.parent[current] {
            path.push(pred);
            current = pred;
        }
        path.reverse();
        Some(path)
    }
}

/// The heaviest path of a DAG and its total weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriticalPath {
    pub path: Vec<VertexId>,
    pub length: Weight,
}

/// Shortest, longest and critical paths over a directed acyclic graph.
///
/// Every query first derives a topological order with Kahn's algorithm and fails with
/// `NotADag` if the graph has a cycle. Vertices are then relaxed once each, in that order.
pub struct DagPaths<'g> {
    graph: &'g Graph,
    metrics: Metrics,
}

impl<'g> DagPaths<'g> {
    /// Creates the engine. Fails with `NotDirected` for undirected graphs.
    pub fn new(graph: &'g Graph) -> Result<Self> {
        graph.require_directed("DAG shortest path")?;
        Ok(Self {
            graph,
            metrics: Metrics::new(),
        })
    }

    /// Minimum-weight distances from `source`.
    pub fn shortest_paths(&mut self, source: VertexId) -> Result<PathResult> {
        self.single_source(source, PathKind::Shortest)
    }

    /// Maximum-weight distances from `source`. Negative weights are allowed.
    pub fn longest_paths(&mut self, source: VertexId) -> Result<PathResult> {
        self.single_source(source, PathKind::Longest)
    }

    /// Finds the heaviest path between any two vertices.
    ///
    /// Runs the longest-path relaxation from every vertex and keeps the largest finite
    /// distance. Ties keep the first pair found, enumerating sources ascending and then
    /// destinations ascending; this tie-break is an artifact of enumeration order.
    ///
    /// # Returns
    /// `None` when the graph is empty or no path has positive length.
    ///
    /// # Complexity
    /// * Time: O(V * (V + E))
    pub fn find_critical_path(&mut self) -> Result<Option<CriticalPath>> {
        let order = self.topological_order()?;
        self.metrics.reset();
        self.metrics.start_timer();

        // Only the result of the source holding the current best is kept
        let mut best: Option<(Weight, VertexId, PathResult)> = None;
        for source in 0..self.graph.vertex_count() {
            let result = relax(self.graph, &order, source, PathKind::Longest, &mut self.metrics);

            let mut improved: Option<(Weight, VertexId)> = None;
            for (dest, dist) in result.reachable() {
                let best_length = improved
                    .map(|(length, _)| length)
                    .or_else(|| best.as_ref().map(|(length, _, _)| *length))
                    .unwrap_or(0);
                if dist > best_length {
                    improved = Some((dist, dest));
                }
            }
            if let Some((length, dest)) = improved {
                best = Some((length, dest, result));
            }
        }

        self.metrics.stop_timer();

        Ok(best.and_then(|(length, dest, result)| {
            let path = result.reconstruct_path(dest)?;
            debug!("Critical path of length {}: {:?}.", length, path);
            Some(CriticalPath { path, length })
        }))
    }

    /// Metrics of the latest query.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn single_source(&mut self, source: VertexId, kind: PathKind) -> Result<PathResult> {
        if !self.graph.has_vertex(source) {
            return Err(GraphError::VertexOutOfRange {
                vertex: source,
                vertex_count: self.graph.vertex_count(),
            });
        }
        let order = self.topological_order()?;

        self.metrics.reset();
        self.metrics.start_timer();
        let result = relax(self.graph, &order, source, kind, &mut self.metrics);
        self.metrics.stop_timer();

        debug!(
            "{:?} paths from {}: {} of {} vertices reachable.",
            kind,
            source,
            result.reachable().count(),
            self.graph.vertex_count()
        );
        Ok(result)
    }

    fn topological_order(&self) -> Result<Vec<VertexId>> {
        KahnTopologicalSort::new(self.graph)?
            .sort()
            .ok_or(GraphError::NotADag)
    }
}

/// Dynamic programming over `order`: each reachable vertex relaxes its outgoing edges once.
///
/// Because every predecessor of a vertex precedes it in `order`, its distance is final by
/// the time it is processed.
fn relax(
    graph: &Graph,
    order: &[VertexId],
    source: VertexId,
    kind: PathKind,
    metrics: &mut Metrics,
) -> PathResult {
    let vertex_count = graph.vertex_count();
    let mut dist: Vec<Option<Weight>> = vec![None; vertex_count];
    let mut parent: Vec<Option<VertexId>> = vec![None; vertex_count];
    dist[source] = Some(0);

    for &u in order {
        let Some(dist_u) = dist[u] else {
            continue; // Not reachable from the source
        };

        for edge in graph.adjacent_edges(u) {
            metrics.increment(Counter::Relaxations);
            let candidate = dist_u.saturating_add(edge.weight);
            if kind.improves(candidate, dist[edge.to]) {
                dist[edge.to] = Some(candidate);
                parent[edge.to] = Some(u);
            }
        }
    }

    PathResult {
        kind,
        source,
        dist,
        parent,
    }
}
