use std::path::{Path, PathBuf};

use schedgraph::algorithms::analysis::{analyze_file, collect_datasets, AnalysisConfig};
use schedgraph::algorithms::path::DagPaths;
use schedgraph::algorithms::scc::TarjanScc;
use schedgraph::algorithms::topo::{topological_sort, TopoStrategy};
use schedgraph::generator::{generate_dataset, GeneratorConfig};
use schedgraph::types::graph_file::{GraphDescription, LoadedGraph};

fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
}

fn load(name: &str) -> LoadedGraph {
    GraphDescription::load(&data_dir().join(name))
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn test_path_graph() {
    let LoadedGraph { graph, source } = load("path_graph.json");
    let mut engine = DagPaths::new(&graph).unwrap();

    let shortest = engine.shortest_paths(source).unwrap();
    let longest = engine.longest_paths(source).unwrap();
    assert_eq!(shortest.distances().to_vec(), vec![Some(0), Some(5), Some(8)]);
    assert_eq!(longest.distances().to_vec(), vec![Some(0), Some(5), Some(8)]);
}

#[test]
fn test_diamond_yaml() {
    let LoadedGraph { graph, source } = load("diamond.yaml");
    let mut engine = DagPaths::new(&graph).unwrap();

    assert_eq!(engine.shortest_paths(source).unwrap().distance(3), Some(3));
    let longest = engine.longest_paths(source).unwrap();
    assert_eq!(longest.distance(3), Some(5));
    assert_eq!(longest.reconstruct_path(3), Some(vec![0, 2, 3]));
}

#[test]
fn test_cycle_with_header() {
    let LoadedGraph { graph, .. } = load("cycle.json");

    for strategy in [TopoStrategy::Kahn, TopoStrategy::Dfs] {
        assert!(topological_sort(&graph, strategy).unwrap().0.is_none());
    }
    let mut scc = TarjanScc::new(&graph).unwrap();
    assert_eq!(scc.find_sccs().to_vec(), vec![vec![0, 1, 2]]);
}

#[test]
fn test_two_sccs_condensation() {
    let LoadedGraph { graph, .. } = load("two_sccs.json");
    let mut scc = TarjanScc::new(&graph).unwrap();
    assert_eq!(scc.find_sccs().len(), 2);

    let condensation = scc.build_condensation_graph().unwrap();
    assert_eq!(condensation.vertex_count(), 2);
    assert_eq!(condensation.edge_count(), 1);

    let from = scc.component_of(0).unwrap();
    let to = scc.component_of(2).unwrap();
    assert_eq!(condensation.adjacent_edges(from)[0].to, to);
}

#[test]
fn test_disconnected() {
    let LoadedGraph { graph, source } = load("disconnected.json");
    let mut engine = DagPaths::new(&graph).unwrap();
    let shortest = engine.shortest_paths(source).unwrap();

    assert_eq!(shortest.distance(2), None);
    assert_eq!(shortest.distance(3), None);
    assert_eq!(shortest.reconstruct_path(2), None);
}

#[test]
fn test_schedule_critical_path() {
    let LoadedGraph { graph, .. } = load("schedule.yml");
    let mut engine = DagPaths::new(&graph).unwrap();
    let critical = engine.find_critical_path().unwrap().unwrap();

    assert_eq!(critical.path, vec![0, 1, 3, 4]);
    assert_eq!(critical.length, 12);
}

/// Every bundled dataset analyzes cleanly; only the cyclic ones skip path analysis.
#[test]
fn test_analyze_data_directory() {
    let datasets = collect_datasets(&[data_dir()]).unwrap();
    assert_eq!(datasets.len(), 6);

    let config = AnalysisConfig::default();
    for dataset in &datasets {
        let report = analyze_file(dataset, &config).unwrap();
        let cyclic = report.dataset == "cycle.json" || report.dataset == "two_sccs.json";
        assert_eq!(report.critical.is_none(), cyclic, "{}", report.dataset);
        assert_eq!(report.notes.is_empty(), !cyclic, "{}", report.dataset);
    }
}

#[test]
fn test_generated_dataset_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("generated.json");
    let description = generate_dataset(&GeneratorConfig {
        vertices: 40,
        edges: 100,
        cyclic: true,
        sccs: 4,
        seed: 42,
    });
    description.save(&path, Some("Generated cyclic dataset")).unwrap();

    let reloaded = GraphDescription::load(&path).unwrap();
    assert_eq!(reloaded, description);

    let report = analyze_file(&path, &AnalysisConfig::default()).unwrap();
    assert_eq!(report.graph.vertices, 40);
    assert!(report.scc.unwrap().components.len() < 40);
}
