use log::debug;
use rustc_hash::FxHashSet;

use crate::error::{GraphError, Result};
use crate::metrics::{Counter, Metrics};
use crate::types::{Graph, VertexId};

/// Partition of the vertex set into strongly connected components.
///
/// Component ids are assigned in the order components are closed by Tarjan's traversal.
/// A component closes only after every component reachable from it has closed, so the
/// id order is a reverse topological order of the condensation graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SccDecomposition {
    /// Components in close order, each sorted ascending
    components: Vec<Vec<VertexId>>,
    /// Maps a vertex to the id of its component
    component_of: Vec<usize>,
}

impl SccDecomposition {
    pub fn components(&self) -> &[Vec<VertexId>] {
        &self.components
    }

    /// Component id of `vertex`.
    ///
    /// # Panics
    /// Panics if `vertex` is out of range.
    pub fn component_of(&self, vertex: VertexId) -> usize {
        self.component_of[vertex]
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn into_components(self) -> Vec<Vec<VertexId>> {
        self.components
    }
}

/// Tarjan's strongly connected components engine over a directed graph.
///
/// The traversal state lives in a per-call context, so [`TarjanScc::find_sccs`] can be run
/// again on the same engine. The engine keeps the latest decomposition for the component-id
/// and condensation queries.
pub struct TarjanScc<'g> {
    /// Graph under analysis, read-only
    graph: &'g Graph,
    /// Counters and timing of the latest `find_sccs` run
    metrics: Metrics,
    /// Result of the latest `find_sccs` run
    decomposition: Option<SccDecomposition>,
}

/// Per-call traversal state of Tarjan's algorithm.
struct TarjanState {
    /// Next discovery index to hand out
    next_index: usize,
    /// Discovery index per vertex, `None` while unvisited
    index: Vec<Option<usize>>,
    /// Smallest discovery index reachable within the active part of the traversal
    low_link: Vec<usize>,
    /// Whether the vertex is still on the component stack
    on_stack: Vec<bool>,
    /// Vertices of components that are not closed yet
    stack: Vec<VertexId>,
    /// Closed components in close order
    components: Vec<Vec<VertexId>>,
    /// Component id per vertex, filled when its component closes
    component_of: Vec<usize>,
}

/// One simulated recursion level: the vertex and the next adjacency position to examine.
struct Frame {
    vertex: VertexId,
    next_edge: usize,
}

impl TarjanState {
    fn new(vertex_count: usize) -> Self {
        Self {
            next_index: 0,
            index: vec![None; vertex_count],
            low_link: vec![0; vertex_count],
            on_stack: vec![false; vertex_count],
            stack: Vec::new(),
            components: Vec::new(),
            component_of: vec![usize::MAX; vertex_count],
        }
    }

    /// Assigns the discovery index of `vertex` and pushes it on the component stack.
    fn enter(&mut self, vertex: VertexId, metrics: &mut Metrics) {
        self.index[vertex] = Some(self.next_index);
        self.low_link[vertex] = self.next_index;
        self.next_index += 1;

        self.stack.push(vertex);
        self.on_stack[vertex] = true;
        metrics.increment(Counter::Visits);
    }

    /// Pops the component rooted at `root` if `root` is a component root.
    fn close_if_root(&mut self, root: VertexId, metrics: &mut Metrics) {
        if Some(self.low_link[root]) != self.index[root] {
            return;
        }

        let component_id = self.components.len();
        let mut component = Vec::new();
        while let Some(member) = self.stack.pop() {
            self.on_stack[member] = false;
            self.component_of[member] = component_id;
            component.push(member);
            if member == root {
                break;
            }
        }

        component.sort_unstable();
        self.components.push(component);
        metrics.increment(Counter::ComponentsFound);
    }
}

impl<'g> TarjanScc<'g> {
    /// Creates the engine. Fails with `NotDirected` for undirected graphs.
    pub fn new(graph: &'g Graph) -> Result<Self> {
        graph.require_directed("SCC")?;
        Ok(Self {
            graph,
            metrics: Metrics::new(),
            decomposition: None,
        })
    }

    /// Computes the strongly connected components of the graph.
    ///
    /// # Algorithm
    ///
    /// A single depth-first pass assigns each vertex a discovery index and a low-link value.
    /// A vertex whose low-link equals its own index is the root of a component; the component
    /// stack is popped down to it. The depth-first search runs on an explicit stack of
    /// `(vertex, next edge)` frames so deep graphs cannot exhaust the call stack, while the
    /// low-link updates happen in the same order as the recursive formulation.
    ///
    /// # Returns
    ///
    /// The components in close order, each sorted ascending. Self-loops and acyclic vertices
    /// form singleton components.
    ///
    /// # Complexity
    ///
    /// * Time: O(V + E)
    /// * Space: O(V)
    pub fn find_sccs(&mut self) -> &[Vec<VertexId>] {
        let graph = self.graph;
        let vertex_count = graph.vertex_count();
        let metrics = &mut self.metrics;
        metrics.reset();

        let mut state = TarjanState::new(vertex_count);
        metrics.start_timer();

        // Process all vertices (handles disconnected parts)
        for start in 0..vertex_count {
            if state.index[start].is_some() {
                continue;
            }

            state.enter(start, metrics);
            let mut call_stack = vec![Frame { vertex: start, next_edge: 0 }];

            while let Some(frame) = call_stack.last_mut() {
                let v = frame.vertex;
                let edges = graph.adjacent_edges(v);

                if frame.next_edge < edges.len() {
                    let w = edges[frame.next_edge].to;
                    frame.next_edge += 1;
                    metrics.increment(Counter::EdgesExplored);

                    match state.index[w] {
                        None => {
                            // Tree edge: descend into w
                            state.enter(w, metrics);
                            call_stack.push(Frame { vertex: w, next_edge: 0 });
                        }
                        Some(w_index) if state.on_stack[w] => {
                            // Edge into the active part of the traversal
                            state.low_link[v] = state.low_link[v].min(w_index);
                        }
                        Some(_) => {
                            // Edge into an already closed component
                        }
                    }
                } else {
                    state.close_if_root(v, metrics);

                    // Return to the parent frame and propagate the low-link upward
                    call_stack.pop();
                    if let Some(parent) = call_stack.last() {
                        let p = parent.vertex;
                        state.low_link[p] = state.low_link[p].min(state.low_link[v]);
                    }
                }
            }
        }

        metrics.stop_timer();
        debug!(
            "Tarjan SCC: {} vertices, {} components.",
            vertex_count,
            state.components.len()
        );

        let decomposition = self.decomposition.insert(SccDecomposition {
            components: state.components,
            component_of: state.component_of,
        });
        decomposition.components()
    }

    /// The decomposition computed by the latest `find_sccs` call.
    pub fn decomposition(&self) -> Result<&SccDecomposition> {
        self.decomposition.as_ref().ok_or(GraphError::SccNotComputed)
    }

    /// Component id of `vertex`; requires a prior `find_sccs` call.
    pub fn component_of(&self, vertex: VertexId) -> Result<usize> {
        let decomposition = self.decomposition()?;
        self.graph.check_vertex(vertex)?;
        Ok(decomposition.component_of(vertex))
    }

    /// Components that contain a cycle: more than one vertex, or a single vertex with a self-loop.
    pub fn cyclic_components(&self) -> Result<Vec<&[VertexId]>> {
        let decomposition = self.decomposition()?;
        Ok(decomposition
            .components()
            .iter()
            .filter(|component| match component.as_slice() {
                [single] => self.graph.adjacent_edges(*single).iter().any(|e| e.to == *single),
                _ => true,
            })
            .map(Vec::as_slice)
            .collect())
    }

    /// Builds the condensation graph: one vertex per component, one edge per ordered pair of
    /// distinct components joined by at least one original edge.
    ///
    /// Original edges are scanned by ascending source vertex, then adjacency order. The first
    /// edge seen for a component pair supplies the condensation edge weight; later parallel
    /// edges are dropped. The result is acyclic by construction.
    pub fn build_condensation_graph(&self) -> Result<Graph> {
        let decomposition = self.decomposition()?;

        let mut condensation = Graph::new(decomposition.len(), true, self.graph.weight_model());
        let mut added_edges = FxHashSet::<(usize, usize)>::default();

        for u in 0..self.graph.vertex_count() {
            let component_u = decomposition.component_of(u);
            for edge in self.graph.adjacent_edges(u) {
                let component_v = decomposition.component_of(edge.to);
                if component_u != component_v && added_edges.insert((component_u, component_v)) {
                    condensation.add_edge(component_u, component_v, edge.weight)?;
                }
            }
        }

        debug!(
            "Condensation graph: {} vertices, {} edges.",
            condensation.vertex_count(),
            condensation.edge_count()
        );
        Ok(condensation)
    }

    /// Metrics of the latest `find_sccs` run.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
