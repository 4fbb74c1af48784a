//! Graph analysis for task-dependency scheduling: strongly connected components,
//! topological ordering, and shortest/longest/critical paths over weighted DAGs.

pub mod algorithms {
    pub mod analysis;
    pub mod path;
    pub mod scc;
    pub mod topo;
}
pub mod error;
pub mod generator;
pub mod metrics;
pub mod types;

pub use error::{GraphError, Result};
pub use metrics::{Counter, Metrics};
pub use types::{Edge, Graph, VertexId, Weight, WeightModel};
