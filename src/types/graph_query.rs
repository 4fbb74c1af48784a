use crate::types::VertexId;

/// A trait that defines read-only query operations over a graph.
///
/// This trait provides the traversal-facing view of a graph: neighbor lookup, vertex and
/// edge existence, and the full vertex list. Validators and reports use it so they never
/// depend on how adjacency is stored.
pub trait GraphQuery {
    /// Number of vertices; valid identifiers are `0..vertex_count()`.
    fn vertex_count(&self) -> usize;

    /// Retrieves the targets of all outgoing edges of `vertex_id`, in insertion order.
    ///
    /// # Returns
    ///
    /// An empty vector when the vertex has no neighbors or does not exist.
    fn read_neighbor(&self, vertex_id: VertexId) -> Vec<VertexId>;

    /// Checks if a specific vertex exists in the graph.
    fn has_vertex(&self, vertex_id: VertexId) -> bool;

    /// Determines if at least one edge `src_id -> dst_id` exists.
    fn has_edge(&self, src_id: VertexId, dst_id: VertexId) -> bool;

    /// Retrieves a list of all vertices, ascending.
    fn vertex_list(&self) -> Vec<VertexId>;
}
