use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use log::{debug, info};
use serde::Serialize;

use crate::algorithms::path::{CriticalPath, DagPaths, PathKind, PathResult};
use crate::algorithms::scc::TarjanScc;
use crate::algorithms::topo::{topological_sort, TopoStrategy};
use crate::error::Result;
use crate::metrics::MetricsSnapshot;
use crate::types::graph_file::{DescriptionFormat, GraphDescription, LoadedGraph};
use crate::types::{Graph, VertexId, Weight};

/// Analyses that can be requested for a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Every analysis below
    All,
    /// Strongly connected components and condensation
    Scc,
    /// Kahn and DFS topological orders
    Topo,
    /// Shortest and longest paths from the source
    Path,
    /// Critical path of the whole graph
    Critical,
}

/// Configuration for a dataset analysis run.
///
/// # Fields
///
/// * `tasks` - Analyses to run; `Task::All` enables every one
/// * `source_override` - Source vertex for path analysis, replacing the description's `source`
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub tasks: Vec<Task>,
    pub source_override: Option<VertexId>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tasks: vec![Task::All],
            source_override: None,
        }
    }
}

impl AnalysisConfig {
    fn wants(&self, task: Task) -> bool {
        self.tasks.iter().any(|t| *t == Task::All || *t == task)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphInfo {
    pub vertices: usize,
    pub edges: usize,
    pub directed: bool,
    pub weight_model: String,
    pub source: VertexId,
}

#[derive(Debug, Clone, Serialize)]
pub struct SccReport {
    /// Components in close order, each sorted ascending
    pub components: Vec<Vec<VertexId>>,
    /// Components that contain a cycle
    pub cyclic_components: Vec<Vec<VertexId>>,
    pub condensation_vertices: usize,
    pub condensation_edges: usize,
    pub metrics: MetricsSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopoReport {
    pub strategy: TopoStrategy,
    /// `None` when the graph contains a cycle
    pub order: Option<Vec<VertexId>>,
    pub metrics: MetricsSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathEntry {
    pub vertex: VertexId,
    pub distance: Weight,
    pub path: Vec<VertexId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathTable {
    pub kind: PathKind,
    pub source: VertexId,
    /// Reachable vertices only, ascending
    pub entries: Vec<PathEntry>,
    pub metrics: MetricsSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct CriticalReport {
    pub critical_path: Option<CriticalPath>,
    pub metrics: MetricsSnapshot,
}

/// Everything computed for one dataset.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetReport {
    pub dataset: String,
    pub graph: GraphInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scc: Option<SccReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub topological_sort: Vec<TopoReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<PathTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical: Option<CriticalReport>,
    /// Reasons for skipped analyses
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl PathTable {
    fn from_result(result: &PathResult, metrics: MetricsSnapshot) -> Self {
        let entries = result
            .reachable()
            .filter_map(|(vertex, distance)| {
                result.reconstruct_path(vertex).map(|path| PathEntry {
                    vertex,
                    distance,
                    path,
                })
            })
            .collect();

        Self {
            kind: result.kind(),
            source: result.source(),
            entries,
            metrics,
        }
    }
}

/// Runs the configured analyses over an already loaded description.
///
/// Directed-only analyses are skipped for undirected graphs, and path analyses are skipped
/// when Kahn's algorithm finds a cycle; each skip is recorded in `notes`. Only invalid input
/// (a bad description or an out-of-range source override) is an error.
pub fn analyze(
    dataset: &str,
    description: &GraphDescription,
    config: &AnalysisConfig,
) -> Result<DatasetReport> {
    let LoadedGraph { graph, source } = description.build()?;
    let source = match config.source_override {
        Some(vertex) => {
            graph.check_vertex(vertex)?;
            vertex
        }
        None => source,
    };

    info!(
        "Analyzing {}: {} vertices, {} edges.",
        dataset,
        graph.vertex_count(),
        graph.edge_count()
    );

    let mut report = DatasetReport {
        dataset: dataset.to_string(),
        graph: GraphInfo {
            vertices: graph.vertex_count(),
            edges: graph.edge_count(),
            directed: graph.is_directed(),
            weight_model: graph.weight_model().to_string(),
            source,
        },
        scc: None,
        topological_sort: Vec::new(),
        paths: Vec::new(),
        critical: None,
        notes: Vec::new(),
    };

    if !graph.is_directed() {
        report
            .notes
            .push("directed-only analyses skipped: graph is undirected".to_string());
        return Ok(report);
    }

    if config.wants(Task::Scc) {
        report.scc = Some(scc_report(&graph)?);
    }

    if config.wants(Task::Topo) {
        for strategy in [TopoStrategy::Kahn, TopoStrategy::Dfs] {
            let (order, metrics) = topological_sort(&graph, strategy)?;
            report.topological_sort.push(TopoReport {
                strategy,
                order,
                metrics: metrics.snapshot(),
            });
        }
    }

    let wants_paths = config.wants(Task::Path);
    let wants_critical = config.wants(Task::Critical);
    if wants_paths || wants_critical {
        if topological_sort(&graph, TopoStrategy::Kahn)?.0.is_none() {
            report
                .notes
                .push("path analysis skipped: graph contains a cycle (not a DAG)".to_string());
            return Ok(report);
        }

        let mut engine = DagPaths::new(&graph)?;
        if wants_paths {
            if graph.vertex_count() == 0 {
                report
                    .notes
                    .push("single-source paths skipped: graph has no vertices".to_string());
            } else {
                let shortest = engine.shortest_paths(source)?;
                report
                    .paths
                    .push(PathTable::from_result(&shortest, engine.metrics().snapshot()));
                let longest = engine.longest_paths(source)?;
                report
                    .paths
                    .push(PathTable::from_result(&longest, engine.metrics().snapshot()));
            }
        }
        if wants_critical {
            let critical_path = engine.find_critical_path()?;
            report.critical = Some(CriticalReport {
                critical_path,
                metrics: engine.metrics().snapshot(),
            });
        }
    }

    debug!("Finished {} with {} notes.", dataset, report.notes.len());
    Ok(report)
}

fn scc_report(graph: &Graph) -> Result<SccReport> {
    let mut scc = TarjanScc::new(graph)?;
    let components = scc.find_sccs().to_vec();
    let cyclic_components = scc
        .cyclic_components()?
        .into_iter()
        .map(<[VertexId]>::to_vec)
        .collect();
    let condensation = scc.build_condensation_graph()?;

    Ok(SccReport {
        components,
        cyclic_components,
        condensation_vertices: condensation.vertex_count(),
        condensation_edges: condensation.edge_count(),
        metrics: scc.metrics().snapshot(),
    })
}

/// Loads a description file and analyzes it, naming the dataset after the file.
pub fn analyze_file(path: &Path, config: &AnalysisConfig) -> Result<DatasetReport> {
    let description = GraphDescription::load(path)?;
    let dataset = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    analyze(&dataset, &description, config)
}

/// Expands directories into the description files they contain, sorted by name.
///
/// Plain file paths are kept as given, whatever their extension.
pub fn collect_datasets(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut datasets = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in fs::read_dir(path)? {
                let entry_path = entry?.path();
                if entry_path.is_file() && DescriptionFormat::is_supported(&entry_path) {
                    found.push(entry_path);
                }
            }
            found.sort();
            datasets.extend(found);
        } else {
            datasets.push(path.clone());
        }
    }
    Ok(datasets)
}

fn join(vertices: &[VertexId]) -> String {
    let rendered: Vec<String> = vertices.iter().map(VertexId::to_string).collect();
    format!("[{}]", rendered.join(", "))
}

fn write_metrics(f: &mut fmt::Formatter<'_>, indent: &str, metrics: &MetricsSnapshot) -> fmt::Result {
    writeln!(f, "{}Execution Time: {:.3} ms", indent, metrics.elapsed_ms)?;
    for (name, value) in &metrics.counters {
        writeln!(f, "{}  {}: {}", indent, name, value)?;
    }
    Ok(())
}

impl fmt::Display for DatasetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset: {}", self.dataset)?;
        writeln!(f, "Graph Info:")?;
        writeln!(f, "  Nodes: {}", self.graph.vertices)?;
        writeln!(f, "  Edges: {}", self.graph.edges)?;
        writeln!(f, "  Directed: {}", self.graph.directed)?;
        writeln!(f, "  Weight Model: {}", self.graph.weight_model)?;
        writeln!(f, "  Source Node: {}", self.graph.source)?;

        if let Some(scc) = &self.scc {
            writeln!(f, "### Strongly Connected Components (Tarjan) ###")?;
            writeln!(f, "  Number of SCCs: {}", scc.components.len())?;
            for (id, component) in scc.components.iter().enumerate() {
                writeln!(f, "    SCC {} (size {}): {}", id, component.len(), join(component))?;
            }
            writeln!(f, "  Cyclic SCCs: {}", scc.cyclic_components.len())?;
            writeln!(
                f,
                "  Condensation Graph: {} nodes, {} edges",
                scc.condensation_vertices, scc.condensation_edges
            )?;
            write_metrics(f, "  ", &scc.metrics)?;
        }

        if !self.topological_sort.is_empty() {
            writeln!(f, "### Topological Sort ###")?;
            for topo in &self.topological_sort {
                match &topo.order {
                    Some(order) => writeln!(f, "  {}: {}", topo.strategy, join(order))?,
                    None => writeln!(f, "  {}: graph contains a cycle (not a DAG)", topo.strategy)?,
                }
                write_metrics(f, "    ", &topo.metrics)?;
            }
        }

        for table in &self.paths {
            let title = match table.kind {
                PathKind::Shortest => "Shortest",
                PathKind::Longest => "Longest",
            };
            writeln!(f, "### {} Paths from {} ###", title, table.source)?;
            for entry in &table.entries {
                writeln!(
                    f,
                    "    To {}: {} (path: {})",
                    entry.vertex,
                    entry.distance,
                    join(&entry.path)
                )?;
            }
            write_metrics(f, "  ", &table.metrics)?;
        }

        if let Some(critical) = &self.critical {
            writeln!(f, "### Critical Path ###")?;
            match &critical.critical_path {
                Some(critical_path) => {
                    writeln!(f, "  Path: {}", join(&critical_path.path))?;
                    writeln!(f, "  Length: {}", critical_path.length)?;
                }
                None => writeln!(f, "  No path with positive length")?,
            }
            write_metrics(f, "  ", &critical.metrics)?;
        }

        for note in &self.notes {
            writeln!(f, "Note: {}", note)?;
        }
        Ok(())
    }
}
