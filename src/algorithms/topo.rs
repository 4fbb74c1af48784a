use std::collections::VecDeque;
use std::fmt;

use log::debug;
use serde::Serialize;

use crate::error::Result;
use crate::metrics::{Counter, Metrics};
use crate::types::graph_query::GraphQuery;
use crate::types::{Graph, VertexId};

/// Selects one of the topological sort strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TopoStrategy {
    /// In-degree elimination with a FIFO frontier
    Kahn,
    /// Depth-first post-order with recursion-path cycle detection
    Dfs,
}

impl fmt::Display for TopoStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopoStrategy::Kahn => f.write_str("Kahn"),
            TopoStrategy::Dfs => f.write_str("DFS"),
        }
    }
}

/// Trait for computing a topological order of a directed graph.
///
/// Implementors return every vertex exactly once such that for each edge `(u, v)`, `u`
/// comes before `v`. A cycle is an expected input, not a failure: it is reported as `None`.
/// Different strategies may return different valid orders for the same graph.
pub trait TopologicalSort {
    /// Computes the order, or `None` if the graph contains a cycle.
    fn sort(&mut self) -> Option<Vec<VertexId>>;

    /// Metrics of the latest `sort` run.
    fn metrics(&self) -> &Metrics;

    /// Which strategy this is.
    fn strategy(&self) -> TopoStrategy;
}

/// Kahn's algorithm: repeatedly removes vertices whose remaining in-degree is zero.
pub struct KahnTopologicalSort<'g> {
    graph: &'g Graph,
    metrics: Metrics,
}

/// Depth-first topological sort: a vertex is emitted after all of its descendants.
pub struct DfsTopologicalSort<'g> {
    graph: &'g Graph,
    metrics: Metrics,
}

impl<'g> KahnTopologicalSort<'g> {
    /// Creates the engine. Fails with `NotDirected` for undirected graphs.
    pub fn new(graph: &'g Graph) -> Result<Self> {
        graph.require_directed("topological sort")?;
        Ok(Self {
            graph,
            metrics: Metrics::new(),
        })
    }
}

impl TopologicalSort for KahnTopologicalSort<'_> {
    /// Kahn's in-degree elimination.
    ///
    /// The frontier is seeded with every zero in-degree vertex in ascending index order and
    /// processed first-in first-out; successors are enqueued in adjacency order as their
    /// in-degree drops to zero. No secondary sort key is applied. If fewer than `n` vertices
    /// are dequeued the graph has a cycle.
    fn sort(&mut self) -> Option<Vec<VertexId>> {
        let graph = self.graph;
        let vertex_count = graph.vertex_count();
        let metrics = &mut self.metrics;
        metrics.reset();
        metrics.start_timer();

        let mut in_degree = graph.in_degrees();
        let mut queue = VecDeque::new();
        for (vertex, &degree) in in_degree.iter().enumerate() {
            if degree == 0 {
                queue.push_back(vertex);
                metrics.increment(Counter::Pushes);
            }
        }

        let mut order = Vec::with_capacity(vertex_count);
        while let Some(u) = queue.pop_front() {
            metrics.increment(Counter::Pops);
            order.push(u);

            for edge in graph.adjacent_edges(u) {
                let v = edge.to;
                in_degree[v] -= 1;
                if in_degree[v] == 0 {
                    queue.push_back(v);
                    metrics.increment(Counter::Pushes);
                }
            }
        }

        metrics.stop_timer();

        if order.len() != vertex_count {
            debug!(
                "Kahn: cycle detected, {} of {} vertices ordered.",
                order.len(),
                vertex_count
            );
            return None;
        }
        Some(order)
    }

    fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn strategy(&self) -> TopoStrategy {
        TopoStrategy::Kahn
    }
}

impl<'g> DfsTopologicalSort<'g> {
    /// Creates the engine. Fails with `NotDirected` for undirected graphs.
    pub fn new(graph: &'g Graph) -> Result<Self> {
        graph.require_directed("topological sort")?;
        Ok(Self {
            graph,
            metrics: Metrics::new(),
        })
    }
}

impl TopologicalSort for DfsTopologicalSort<'_> {
    /// Depth-first post-order.
    ///
    /// Roots are tried in ascending index order and edges in adjacency order. A vertex stays
    /// marked as on the recursion path until all its edges are explored; an edge into a marked
    /// vertex is a back edge, which aborts the whole sort. Finished vertices are pushed on a
    /// completion stack, and the order is that stack read from the top.
    fn sort(&mut self) -> Option<Vec<VertexId>> {
        let graph = self.graph;
        let vertex_count = graph.vertex_count();
        let metrics = &mut self.metrics;
        metrics.reset();
        metrics.start_timer();

        let mut visited = vec![false; vertex_count];
        let mut on_path = vec![false; vertex_count];
        let mut finished = Vec::with_capacity(vertex_count);

        for root in 0..vertex_count {
            if visited[root] {
                continue;
            }

            visited[root] = true;
            on_path[root] = true;
            metrics.increment(Counter::Visits);
            // (vertex, next adjacency position) frames of the simulated recursion
            let mut call_stack = vec![(root, 0usize)];

            while let Some((u, next_edge)) = call_stack.last_mut() {
                let u = *u;
                let edges = graph.adjacent_edges(u);

                if *next_edge < edges.len() {
                    let v = edges[*next_edge].to;
                    *next_edge += 1;
                    metrics.increment(Counter::EdgesExplored);

                    if !visited[v] {
                        visited[v] = true;
                        on_path[v] = true;
                        metrics.increment(Counter::Visits);
                        call_stack.push((v, 0));
                    } else if on_path[v] {
                        metrics.stop_timer();
                        debug!("DFS: back edge {} -> {}, graph is cyclic.", u, v);
                        return None;
                    }
                } else {
                    on_path[u] = false;
                    finished.push(u);
                    call_stack.pop();
                }
            }
        }

        metrics.stop_timer();

        finished.reverse();
        Some(finished)
    }

    fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn strategy(&self) -> TopoStrategy {
        TopoStrategy::Dfs
    }
}

/// Runs `strategy` on `graph` and returns the order together with the run's metrics.
pub fn topological_sort(
    graph: &Graph,
    strategy: TopoStrategy,
) -> Result<(Option<Vec<VertexId>>, Metrics)> {
    let mut sorter: Box<dyn TopologicalSort + '_> = match strategy {
        TopoStrategy::Kahn => Box::new(KahnTopologicalSort::new(graph)?),
        TopoStrategy::Dfs => Box::new(DfsTopologicalSort::new(graph)?),
    };
    let order = sorter.sort();
    Ok((order, sorter.metrics().clone()))
}

/// Checks that `order` lists every vertex exactly once and respects every edge direction.
pub fn is_topological_order<G: GraphQuery>(graph: &G, order: &[VertexId]) -> bool {
    let vertex_count = graph.vertex_count();
    if order.len() != vertex_count {
        return false;
    }

    let mut position = vec![usize::MAX; vertex_count];
    for (pos, &vertex) in order.iter().enumerate() {
        if !graph.has_vertex(vertex) || position[vertex] != usize::MAX {
            return false;
        }
        position[vertex] = pos;
    }

    graph.vertex_list().into_iter().all(|u| {
        graph
            .read_neighbor(u)
            .into_iter()
            .all(|v| position[u] < position[v])
    })
}

#[cfg(test)]
mod test_topo {
    use crate::algorithms::topo::{
        is_topological_order, topological_sort, DfsTopologicalSort, KahnTopologicalSort,
        TopoStrategy, TopologicalSort,
    };
    use crate::error::GraphError;
    use crate::metrics::Counter;
    use crate::types::{Graph, WeightModel};

    fn diamond() -> Graph {
        Graph::from_edges(4, &[(0, 1, 1), (0, 2, 4), (1, 3, 2), (2, 3, 1)]).unwrap()
    }

    #[test]
    fn test_kahn_diamond() {
        let graph = diamond();
        let mut kahn = KahnTopologicalSort::new(&graph).unwrap();

        assert_eq!(kahn.sort(), Some(vec![0, 1, 2, 3]));
        assert_eq!(kahn.metrics().counter(Counter::Pushes), 4);
        assert_eq!(kahn.metrics().counter(Counter::Pops), 4);
        assert_eq!(kahn.strategy(), TopoStrategy::Kahn);
    }

    #[test]
    fn test_dfs_diamond() {
        let graph = diamond();
        let mut dfs = DfsTopologicalSort::new(&graph).unwrap();

        // 0 -> 1 -> 3 finishes 3, 1, then 2, then 0
        assert_eq!(dfs.sort(), Some(vec![0, 2, 1, 3]));
        assert_eq!(dfs.metrics().counter(Counter::Visits), 4);
        assert_eq!(dfs.metrics().counter(Counter::EdgesExplored), 4);
    }

    /// Simultaneously free vertices follow scan order, not value order.
    #[test]
    fn test_kahn_enqueue_order() {
        // 3 and 1 are sources; 3 unlocks 2 before 1 unlocks 0
        let graph = Graph::from_edges(4, &[(3, 2, 1), (1, 0, 1)]).unwrap();
        let mut kahn = KahnTopologicalSort::new(&graph).unwrap();
        assert_eq!(kahn.sort(), Some(vec![1, 3, 0, 2]));

        let mut dfs = DfsTopologicalSort::new(&graph).unwrap();
        assert_eq!(dfs.sort(), Some(vec![3, 2, 1, 0]));
    }

    #[test]
    fn test_cycle_yields_no_order() {
        let graph = Graph::from_edges(3, &[(0, 1, 1), (1, 2, 1), (2, 0, 1)]).unwrap();

        let mut kahn = KahnTopologicalSort::new(&graph).unwrap();
        assert_eq!(kahn.sort(), None);
        assert_eq!(kahn.metrics().counter(Counter::Pops), 0);

        let mut dfs = DfsTopologicalSort::new(&graph).unwrap();
        assert_eq!(dfs.sort(), None);
    }

    /// A cycle downstream of an acyclic prefix still aborts the whole sort.
    #[test]
    fn test_partial_cycle() {
        let graph = Graph::from_edges(5, &[(0, 1, 1), (1, 2, 1), (2, 3, 1), (3, 2, 1), (4, 0, 1)])
            .unwrap();

        assert_eq!(topological_sort(&graph, TopoStrategy::Kahn).unwrap().0, None);
        assert_eq!(topological_sort(&graph, TopoStrategy::Dfs).unwrap().0, None);
    }

    #[test]
    fn test_self_loop_is_cycle() {
        let graph = Graph::from_edges(2, &[(0, 1, 1), (1, 1, 1)]).unwrap();
        assert_eq!(topological_sort(&graph, TopoStrategy::Kahn).unwrap().0, None);
        assert_eq!(topological_sort(&graph, TopoStrategy::Dfs).unwrap().0, None);
    }

    #[test]
    fn test_requires_directed_graph() {
        let graph = Graph::new(2, false, WeightModel::Edge);
        assert!(matches!(
            KahnTopologicalSort::new(&graph),
            Err(GraphError::NotDirected { .. })
        ));
        assert!(matches!(
            DfsTopologicalSort::new(&graph),
            Err(GraphError::NotDirected { .. })
        ));
    }

    /// Both strategies agree on validity even when their orders differ.
    #[test]
    fn test_orders_are_valid() {
        let graph = Graph::from_edges(
            7,
            &[(5, 2, 1), (5, 0, 1), (4, 0, 1), (4, 1, 1), (2, 3, 1), (3, 1, 1), (6, 5, 1)],
        )
        .unwrap();

        for strategy in [TopoStrategy::Kahn, TopoStrategy::Dfs] {
            let (order, metrics) = topological_sort(&graph, strategy).unwrap();
            let order = order.unwrap();
            assert!(is_topological_order(&graph, &order), "{} order {:?}", strategy, order);
            assert!(metrics.counters().count() > 0);
        }
    }

    #[test]
    fn test_is_topological_order_rejects() {
        let graph = diamond();
        assert!(!is_topological_order(&graph, &[0, 1, 3, 2]));
        assert!(!is_topological_order(&graph, &[0, 1, 2]));
        assert!(!is_topological_order(&graph, &[0, 0, 1, 2]));
        assert!(!is_topological_order(&graph, &[0, 1, 2, 7]));
        assert!(is_topological_order(&graph, &[0, 2, 1, 3]));
    }

    #[test]
    fn test_long_chain_no_stack_overflow() {
        let n = 200_000;
        let mut graph = Graph::directed(n);
        for v in 0..n - 1 {
            graph.add_edge(v, v + 1, 1).unwrap();
        }

        // The first root descends through the whole chain
        let mut dfs = DfsTopologicalSort::new(&graph).unwrap();
        let order = dfs.sort().unwrap();
        assert_eq!(order.len(), n);
        assert_eq!(order.first(), Some(&0));
        assert_eq!(order.last(), Some(&(n - 1)));
    }

    #[test]
    fn test_empty_graph() {
        let graph = Graph::directed(0);
        assert_eq!(KahnTopologicalSort::new(&graph).unwrap().sort(), Some(vec![]));
        assert_eq!(DfsTopologicalSort::new(&graph).unwrap().sort(), Some(vec![]));
    }
}
