use thiserror::Error;

/// Errors raised by graph construction, the analysis engines and description file I/O.
///
/// Precondition violations (`NotDirected`, `SccNotComputed`, `VertexOutOfRange`) are raised
/// before any work is done. A cycle reaching the path engine is reported as `NotADag`; the
/// topological sort engines report cycles as data instead (`Ok(None)`).
#[derive(Debug, Error)]
pub enum GraphError {
    /// A directed-only operation was requested on an undirected graph.
    #[error("{algorithm} requires directed graph")]
    NotDirected { algorithm: &'static str },

    /// Component queries or condensation were requested before `find_sccs`.
    #[error("must call find_sccs first")]
    SccNotComputed,

    /// The path engine found a cycle while deriving its topological order.
    #[error("invalid argument: graph contains a cycle - not a DAG")]
    NotADag,

    /// A vertex index outside `[0, vertex_count)`.
    #[error("vertex {vertex} out of range for graph with {vertex_count} vertices")]
    VertexOutOfRange { vertex: usize, vertex_count: usize },

    /// The graph description file parsed but holds unusable values.
    #[error("invalid graph description: {0}")]
    InvalidDescription(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;
