use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::types::{Graph, VertexId, WeightModel};

/// Largest vertex count a description may declare.
pub const MAX_VERTICES: i64 = 1 << 26;

/// On-disk encoding of a graph description, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionFormat {
    Json,
    Yaml,
}

impl DescriptionFormat {
    /// `.yaml` and `.yml` select YAML; every other extension is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                DescriptionFormat::Yaml
            }
            _ => DescriptionFormat::Json,
        }
    }

    /// Whether `path` has an extension this loader understands.
    pub fn is_supported(path: &Path) -> bool {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => ["json", "yaml", "yml"]
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known)),
            None => false,
        }
    }
}

/// One `{u, v, w}` entry of the edge list. `w` defaults to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub u: i64,
    pub v: i64,
    #[serde(default = "default_weight")]
    pub w: i64,
}

/// Serialized graph description: vertex count, ordered edge list and a default source.
///
/// Integer fields are read signed so negative values are reported as invalid descriptions
/// rather than as parse failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDescription {
    pub directed: bool,
    pub n: i64,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
    #[serde(default)]
    pub source: i64,
    #[serde(default = "default_weight_model")]
    pub weight_model: String,
}

/// A validated graph together with the default source vertex of its description.
#[derive(Debug, Clone)]
pub struct LoadedGraph {
    pub graph: Graph,
    pub source: VertexId,
}

fn default_weight() -> i64 {
    1
}

fn default_weight_model() -> String {
    WeightModel::Edge.as_str().to_string()
}

impl GraphDescription {
    /// Reads and parses a description file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let description = Self::parse_str(&content, DescriptionFormat::from_path(path))?;
        debug!(
            "Loaded {}: n={}, {} edge records.",
            path.display(),
            description.n,
            description.edges.len()
        );
        Ok(description)
    }

    /// Parses a description. Lines starting with `#` are header comments and are dropped
    /// before JSON parsing; YAML treats them as comments natively.
    pub fn parse_str(content: &str, format: DescriptionFormat) -> Result<Self> {
        match format {
            DescriptionFormat::Json => {
                let body: String = content
                    .lines()
                    .filter(|line| !line.trim_start().starts_with('#'))
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(serde_json::from_str(&body)?)
            }
            DescriptionFormat::Yaml => Ok(serde_yaml::from_str(content)?),
        }
    }

    /// Captures `graph` as a description. Undirected graphs list each logical edge once.
    pub fn from_graph(graph: &Graph, source: VertexId) -> Self {
        let mut edges = Vec::with_capacity(graph.edge_count());
        let mut mirrored = vec![Vec::<(VertexId, i64)>::new(); graph.vertex_count()];

        for u in 0..graph.vertex_count() {
            for edge in graph.adjacent_edges(u) {
                if !graph.is_directed() {
                    // Skip the mirror entry written when the edge was inserted from the other end.
                    let pending = &mut mirrored[u];
                    if let Some(pos) = pending.iter().position(|&(v, w)| v == edge.to && w == edge.weight) {
                        pending.remove(pos);
                        continue;
                    }
                    mirrored[edge.to].push((u, edge.weight));
                }
                edges.push(EdgeRecord {
                    u: u as i64,
                    v: edge.to as i64,
                    w: edge.weight,
                });
            }
        }

        GraphDescription {
            directed: graph.is_directed(),
            n: graph.vertex_count() as i64,
            edges,
            source: source as i64,
            weight_model: graph.weight_model().as_str().to_string(),
        }
    }

    /// Validates the description and builds the graph, inserting edges in list order.
    ///
    /// `n` must lie in `0..=MAX_VERTICES`.
    pub fn build(&self) -> Result<LoadedGraph> {
        if self.n < 0 {
            return Err(GraphError::InvalidDescription(format!(
                "vertex count must be non-negative, got {}",
                self.n
            )));
        }
        if self.n > MAX_VERTICES {
            return Err(GraphError::InvalidDescription(format!(
                "vertex count {} exceeds the limit of {}",
                self.n, MAX_VERTICES
            )));
        }
        let vertex_count = self.n as usize;
        let weight_model: WeightModel = self.weight_model.parse()?;

        let source = to_vertex(self.source, vertex_count, "source")?;
        if vertex_count > 0 && source >= vertex_count {
            return Err(GraphError::InvalidDescription(format!(
                "source {} out of range for {} vertices",
                self.source, vertex_count
            )));
        }

        let mut graph = Graph::new(vertex_count, self.directed, weight_model);
        for (position, record) in self.edges.iter().enumerate() {
            let u = to_vertex(record.u, vertex_count, "edge source")?;
            let v = to_vertex(record.v, vertex_count, "edge target")?;
            graph.add_edge(u, v, record.w).map_err(|_| {
                GraphError::InvalidDescription(format!(
                    "edge #{} ({} -> {}) references a vertex outside 0..{}",
                    position, record.u, record.v, vertex_count
                ))
            })?;
        }

        Ok(LoadedGraph { graph, source })
    }

    /// Renders the description in `format`.
    pub fn render(&self, format: DescriptionFormat) -> Result<String> {
        match format {
            DescriptionFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            DescriptionFormat::Yaml => Ok(serde_yaml::to_string(self)?),
        }
    }

    /// Writes the description to `path`, preceded by a `# header` line when given.
    pub fn save(&self, path: &Path, header: Option<&str>) -> Result<()> {
        let mut content = String::new();
        if let Some(header) = header {
            for line in header.lines() {
                content.push_str("# ");
                content.push_str(line);
                content.push('\n');
            }
        }
        content.push_str(&self.render(DescriptionFormat::from_path(path))?);
        content.push('\n');
        fs::write(path, content)?;
        Ok(())
    }
}

fn to_vertex(value: i64, vertex_count: usize, what: &str) -> Result<VertexId> {
    if value < 0 {
        return Err(GraphError::InvalidDescription(format!(
            "{} {} is negative (graph has {} vertices)",
            what, value, vertex_count
        )));
    }
    Ok(value as VertexId)
}
