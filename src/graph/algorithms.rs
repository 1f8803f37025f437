//! Graph algorithms shared by the analytics modules

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use petgraph::Direction;

use crate::error::{EngineError, EngineResult};
use crate::graph::{Graph, GraphBuilder};

/// Collapse a directed graph into its undirected view.
///
/// Each pair `u -> v` / `v -> u` becomes a single edge whose weight is the
/// maximum of the two directed weights. Undirected input is returned as is.
pub fn to_undirected(graph: &Graph) -> Graph {
    if !graph.is_directed() {
        return graph.clone();
    }

    let mut builder = GraphBuilder::with_capacity(graph.node_count(), false);
    for (idx, label) in graph.labels().iter().enumerate() {
        // labels of a built graph are unique
        let added = builder.add_node(label);
        debug_assert_eq!(added.ok(), Some(idx as u32));
    }
    for (src, dst, weight) in graph.edges() {
        builder.add_edge(src as u32, dst as u32, weight);
    }

    let undirected = builder.build();
    log::debug!(
        "Undirected view has {} edges (directed graph had {})",
        undirected.edge_count(),
        graph.edge_count()
    );
    undirected
}

/// Hop distances from `source`, following edges in `direction`
pub fn bfs_distances(graph: &Graph, source: usize, direction: Direction) -> Vec<Option<usize>> {
    let mut dist = vec![None; graph.node_count()];
    let mut queue = VecDeque::new();

    dist[source] = Some(0);
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        let next = dist[v].map_or(0, |d| d + 1);
        for (w, _) in graph.neighbors_directed(v, direction) {
            if dist[w].is_none() {
                dist[w] = Some(next);
                queue.push_back(w);
            }
        }
    }

    dist
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct HeapEntry {
    cost: f64,
    node: usize,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // min-heap on cost, ties on node index
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn check_positive_weights(graph: &Graph) -> EngineResult<()> {
    match graph.edges().find(|&(_, _, w)| w <= 0.0) {
        Some((src, dst, w)) => Err(EngineError::Computation(format!(
            "weighted shortest paths need positive weights, edge {} -> {} has {}",
            graph.label(src),
            graph.label(dst),
            w
        ))),
        None => Ok(()),
    }
}

/// Weighted distances from `source` (Dijkstra), following edges in `direction`
pub fn dijkstra_distances(
    graph: &Graph,
    source: usize,
    direction: Direction,
) -> EngineResult<Vec<Option<f64>>> {
    check_positive_weights(graph)?;

    let mut dist: Vec<Option<f64>> = vec![None; graph.node_count()];
    let mut heap = BinaryHeap::new();
    dist[source] = Some(0.0);
    heap.push(HeapEntry {
        cost: 0.0,
        node: source,
    });

    while let Some(HeapEntry { cost, node }) = heap.pop() {
        if dist[node].is_some_and(|d| cost > d) {
            continue;
        }
        for (next, weight) in graph.neighbors_directed(node, direction) {
            let candidate = cost + weight;
            if dist[next].map_or(true, |d| candidate < d) {
                dist[next] = Some(candidate);
                heap.push(HeapEntry {
                    cost: candidate,
                    node: next,
                });
            }
        }
    }

    Ok(dist)
}

/// Single-source shortest-path DAG as used by Brandes' algorithm
#[derive(Debug, Clone)]
pub struct ShortestPathDag {
    pub source: usize,
    /// Nodes in non-decreasing distance order
    pub order: Vec<usize>,
    /// Number of shortest paths from the source to each node
    pub sigma: Vec<f64>,
    /// Immediate predecessors of each node on shortest paths
    pub predecessors: Vec<Vec<usize>>,
}

/// BFS shortest-path DAG over an arbitrary neighbor function.
///
/// Every tied shortest path is counted in `sigma`.
pub fn shortest_path_dag_with<F, I>(node_count: usize, source: usize, neighbors: F) -> ShortestPathDag
where
    F: Fn(usize) -> I,
    I: IntoIterator<Item = usize>,
{
    let mut order = Vec::with_capacity(node_count);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut sigma = vec![0.0; node_count];
    let mut dist: Vec<i64> = vec![-1; node_count];
    let mut queue = VecDeque::new();

    sigma[source] = 1.0;
    dist[source] = 0;
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        order.push(v);
        for w in neighbors(v) {
            if dist[w] < 0 {
                dist[w] = dist[v] + 1;
                queue.push_back(w);
            }
            if dist[w] == dist[v] + 1 {
                sigma[w] += sigma[v];
                predecessors[w].push(v);
            }
        }
    }

    ShortestPathDag {
        source,
        order,
        sigma,
        predecessors,
    }
}

/// Shortest-path DAG from `source` along out-edges, by hops or by weight
pub fn shortest_path_dag(graph: &Graph, source: usize, weighted: bool) -> EngineResult<ShortestPathDag> {
    if !weighted {
        return Ok(shortest_path_dag_with(graph.node_count(), source, |v| {
            graph.successors(v).map(|(w, _)| w)
        }));
    }

    check_positive_weights(graph)?;

    let n = graph.node_count();
    let mut order = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0; n];
    let mut dist: Vec<Option<f64>> = vec![None; n];
    let mut settled = vec![false; n];
    let mut heap = BinaryHeap::new();

    sigma[source] = 1.0;
    dist[source] = Some(0.0);
    heap.push(HeapEntry {
        cost: 0.0,
        node: source,
    });

    while let Some(HeapEntry { cost, node }) = heap.pop() {
        if settled[node] {
            continue;
        }
        settled[node] = true;
        order.push(node);

        for (next, weight) in graph.successors(node) {
            let candidate = cost + weight;
            match dist[next] {
                Some(d) if candidate > d => {}
                Some(d) if candidate == d => {
                    sigma[next] += sigma[node];
                    predecessors[next].push(node);
                }
                _ => {
                    dist[next] = Some(candidate);
                    sigma[next] = sigma[node];
                    predecessors[next] = vec![node];
                    heap.push(HeapEntry {
                        cost: candidate,
                        node: next,
                    });
                }
            }
        }
    }

    Ok(ShortestPathDag {
        source,
        order,
        sigma,
        predecessors,
    })
}
