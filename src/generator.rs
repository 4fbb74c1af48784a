use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;

use crate::types::graph_file::{EdgeRecord, GraphDescription};
use crate::types::WeightModel;

/// Parameters of a synthetic dataset.
///
/// # Fields
///
/// * `vertices` - Number of vertices `n`
/// * `edges` - Target number of distinct edges
/// * `cyclic` - Plant cycles before adding random edges
/// * `sccs` - Number of ring blocks to plant when `cyclic`; `<= 1` plants one small ring
/// * `seed` - Seed of the random generator; equal seeds give equal datasets
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub vertices: usize,
    pub edges: usize,
    pub cyclic: bool,
    pub sccs: usize,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            vertices: 10,
            edges: 15,
            cyclic: false,
            sccs: 1,
            seed: 42,
        }
    }
}

struct EdgeCollector {
    edges: Vec<EdgeRecord>,
    seen: FxHashSet<(usize, usize)>,
}

impl EdgeCollector {
    fn add(&mut self, u: usize, v: usize, w: i64) {
        if self.seen.insert((u, v)) {
            self.edges.push(EdgeRecord {
                u: u as i64,
                v: v as i64,
                w,
            });
        }
    }
}

fn weight(rng: &mut StdRng) -> i64 {
    rng.gen_range(1..=10)
}

/// Generates a directed edge-weighted dataset with source 0.
///
/// Planted rings come first. Random edges between distinct vertices follow until `edges`
/// distinct pairs exist or `10 * edges` attempts have been spent. Pairs already present are
/// skipped, so the result may hold fewer edges than requested.
pub fn generate_dataset(config: &GeneratorConfig) -> GraphDescription {
    let n = config.vertices;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut collector = EdgeCollector {
        edges: Vec::new(),
        seen: FxHashSet::default(),
    };

    if config.cyclic && n > 0 {
        let blocks = config.sccs.min(n);
        if blocks > 1 {
            let block_size = n / blocks;
            for block in 0..blocks {
                let start = block * block_size;
                let end = if block == blocks - 1 { n } else { start + block_size };
                for vertex in start..end - 1 {
                    let w = weight(&mut rng);
                    collector.add(vertex, vertex + 1, w);
                }
                if end - start > 1 {
                    let w = weight(&mut rng);
                    collector.add(end - 1, start, w);
                }
            }
            for block in 0..blocks - 1 {
                let from = block * block_size + rng.gen_range(0..block_size);
                let to = (block + 1) * block_size;
                let w = weight(&mut rng);
                collector.add(from, to, w);
            }
        } else {
            let ring = n.min(4);
            if ring > 1 {
                for vertex in 0..ring {
                    let w = weight(&mut rng);
                    collector.add(vertex, (vertex + 1) % ring, w);
                }
            }
        }
    }

    if n > 1 {
        let max_attempts = config.edges.saturating_mul(10);
        let mut attempts = 0;
        while collector.edges.len() < config.edges && attempts < max_attempts {
            let u = rng.gen_range(0..n);
            let v = rng.gen_range(0..n);
            if u != v {
                let w = weight(&mut rng);
                collector.add(u, v, w);
            }
            attempts += 1;
        }
    }

    info!(
        "Generated dataset: {} vertices, {} edges (seed {}).",
        n,
        collector.edges.len(),
        config.seed
    );

    GraphDescription {
        directed: true,
        n: n as i64,
        edges: collector.edges,
        source: 0,
        weight_model: WeightModel::Edge.as_str().to_string(),
    }
}

#[cfg(test)]
mod test_generator {
    use crate::algorithms::scc::TarjanScc;
    use crate::algorithms::topo::{topological_sort, TopoStrategy};
    use crate::generator::{generate_dataset, GeneratorConfig};

    #[test]
    fn test_same_seed_same_dataset() {
        let config = GeneratorConfig {
            vertices: 30,
            edges: 60,
            ..GeneratorConfig::default()
        };
        assert_eq!(generate_dataset(&config), generate_dataset(&config));

        let other = GeneratorConfig { seed: 7, ..config.clone() };
        assert_ne!(generate_dataset(&config), generate_dataset(&other));
    }

    #[test]
    fn test_edges_are_valid() {
        let description = generate_dataset(&GeneratorConfig {
            vertices: 20,
            edges: 50,
            ..GeneratorConfig::default()
        });
        assert_eq!(description.edges.len(), 50);

        let mut pairs: Vec<_> = description.edges.iter().map(|e| (e.u, e.v)).collect();
        pairs.sort();
        pairs.dedup();
        assert_eq!(pairs.len(), 50);
        for edge in &description.edges {
            assert_ne!(edge.u, edge.v);
            assert!((1..=10).contains(&edge.w));
        }
        assert!(description.build().is_ok());
    }

    /// Without extra random edges, each planted block is exactly one component.
    #[test]
    fn test_planted_blocks() {
        let description = generate_dataset(&GeneratorConfig {
            vertices: 12,
            edges: 0,
            cyclic: true,
            sccs: 3,
            seed: 42,
        });
        // Three rings of four plus two links
        assert_eq!(description.edges.len(), 14);

        let loaded = description.build().unwrap();
        let mut scc = TarjanScc::new(&loaded.graph).unwrap();
        assert_eq!(scc.find_sccs().len(), 3);
        assert!(scc.find_sccs().iter().all(|component| component.len() == 4));
    }

    #[test]
    fn test_single_ring() {
        let description = generate_dataset(&GeneratorConfig {
            vertices: 10,
            edges: 0,
            cyclic: true,
            sccs: 1,
            seed: 42,
        });
        let pairs: Vec<_> = description.edges.iter().map(|e| (e.u, e.v)).collect();
        assert_eq!(pairs, vec![(0, 1), (1, 2), (2, 3), (3, 0)]);

        let loaded = description.build().unwrap();
        let (order, _) = topological_sort(&loaded.graph, TopoStrategy::Kahn).unwrap();
        assert!(order.is_none());
    }

    #[test]
    fn test_degenerate_sizes() {
        let empty = generate_dataset(&GeneratorConfig {
            vertices: 0,
            edges: 10,
            cyclic: true,
            ..GeneratorConfig::default()
        });
        assert!(empty.edges.is_empty());

        let single = generate_dataset(&GeneratorConfig {
            vertices: 1,
            edges: 10,
            cyclic: true,
            ..GeneratorConfig::default()
        });
        assert!(single.edges.is_empty());
        assert!(single.build().is_ok());
    }
}
