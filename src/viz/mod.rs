//! Visualization generation module.
//!
//! Turns engine results into chart-ready structures and exchange formats.
//! Nothing is rendered here: figures are written as JSON for a plotting
//! front end, next to GraphML, Graphviz DOT and CSV exports of the same
//! data and a small HTML index.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, UnGraph};
use serde::{Deserialize, Serialize};

use crate::centrality::CentralityResult;
use crate::cluster::Partition;
use crate::graph::Graph;
use crate::layout::Layout;

/// Line segments for all edges; `None` separates consecutive segments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeTrace {
    pub x: Vec<Option<f64>>,
    pub y: Vec<Option<f64>>,
}

/// One marker per node, coloured by a numeric value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeTrace {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub labels: Vec<String>,
    /// Hover text, `"{label}<br>{measure}: {score:.2}"`
    pub text: Vec<String>,
    pub color: Vec<f64>,
}

/// Node-link figure coloured by centrality
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphFigure {
    pub title: String,
    pub colorbar_title: String,
    pub edges: EdgeTrace,
    pub nodes: NodeTrace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub node: String,
    pub value: f64,
}

/// One bar per node, in node order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterNode {
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub community: usize,
}

/// Node-link figure coloured by community
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterFigure {
    pub title: String,
    pub community_count: usize,
    pub edges: EdgeTrace,
    pub nodes: Vec<ClusterNode>,
}

fn position(layout: &Layout, label: &str) -> [f64; 2] {
    layout.position(label).unwrap_or([0.0, 0.0])
}

fn edge_trace(graph: &Graph, layout: &Layout) -> EdgeTrace {
    let mut trace = EdgeTrace::default();
    for (src, dst, _) in graph.edges() {
        let [x0, y0] = position(layout, graph.label(src));
        let [x1, y1] = position(layout, graph.label(dst));
        trace.x.extend([Some(x0), Some(x1), None]);
        trace.y.extend([Some(y0), Some(y1), None]);
    }
    trace
}

/// Node-link figure with markers coloured by centrality score
pub fn graph_figure(graph: &Graph, centrality: &CentralityResult, layout: &Layout) -> GraphFigure {
    let title = centrality.method.title().to_string();
    let mut nodes = NodeTrace::default();

    for label in graph.labels() {
        let [x, y] = position(layout, label);
        let score = centrality.get(label).unwrap_or_default();
        nodes.x.push(x);
        nodes.y.push(y);
        nodes.labels.push(label.clone());
        nodes.text.push(format!("{label}<br>{title}: {score:.2}"));
        nodes.color.push(score);
    }

    GraphFigure {
        colorbar_title: title.clone(),
        title,
        edges: edge_trace(graph, layout),
        nodes,
    }
}

/// Bar chart of scores, one bar per node
pub fn centrality_bar_chart(graph: &Graph, centrality: &CentralityResult) -> BarChart {
    let title = centrality.method.title().to_string();
    BarChart {
        x_label: "Node".to_string(),
        y_label: title.clone(),
        title,
        bars: graph
            .labels()
            .iter()
            .map(|label| Bar {
                node: label.clone(),
                value: centrality.get(label).unwrap_or_default(),
            })
            .collect(),
    }
}

/// Node-link figure with nodes coloured by community
pub fn cluster_figure(graph: &Graph, partition: &Partition, layout: &Layout) -> ClusterFigure {
    // clustering methods that symmetrize are drawn undirected
    let drawn = if partition.method.requires_undirected() {
        graph.to_undirected()
    } else {
        graph.clone()
    };

    let nodes = drawn
        .labels()
        .iter()
        .map(|label| {
            let [x, y] = position(layout, label);
            ClusterNode {
                label: label.clone(),
                x,
                y,
                community: partition.community_of(label).unwrap_or_default(),
            }
        })
        .collect();

    ClusterFigure {
        title: partition.method.title().to_string(),
        community_count: partition.community_count(),
        edges: edge_trace(&drawn, layout),
        nodes,
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// GraphML document with label, score, community and position per node
pub fn to_graphml(
    graph: &Graph,
    centrality: &CentralityResult,
    partition: &Partition,
    layout: &Layout,
) -> String {
    let mut out = String::new();
    let edge_default = if graph.is_directed() { "directed" } else { "undirected" };

    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">\n");
    out.push_str("  <key id=\"label\" for=\"node\" attr.name=\"label\" attr.type=\"string\"/>\n");
    out.push_str("  <key id=\"score\" for=\"node\" attr.name=\"score\" attr.type=\"double\"/>\n");
    out.push_str(
        "  <key id=\"community\" for=\"node\" attr.name=\"community\" attr.type=\"int\"/>\n",
    );
    out.push_str("  <key id=\"x\" for=\"node\" attr.name=\"x\" attr.type=\"double\"/>\n");
    out.push_str("  <key id=\"y\" for=\"node\" attr.name=\"y\" attr.type=\"double\"/>\n");
    out.push_str("  <key id=\"weight\" for=\"edge\" attr.name=\"weight\" attr.type=\"double\"/>\n");
    out.push_str(&format!("  <graph id=\"G\" edgedefault=\"{edge_default}\">\n"));

    for (node, label) in graph.labels().iter().enumerate() {
        let [x, y] = position(layout, label);
        out.push_str(&format!("    <node id=\"n{node}\">\n"));
        out.push_str(&format!("      <data key=\"label\">{}</data>\n", escape_xml(label)));
        out.push_str(&format!(
            "      <data key=\"score\">{}</data>\n",
            centrality.get(label).unwrap_or_default()
        ));
        out.push_str(&format!(
            "      <data key=\"community\">{}</data>\n",
            partition.community_of(label).unwrap_or_default()
        ));
        out.push_str(&format!("      <data key=\"x\">{x}</data>\n"));
        out.push_str(&format!("      <data key=\"y\">{y}</data>\n"));
        out.push_str("    </node>\n");
    }

    for (edge, (src, dst, weight)) in graph.edges().enumerate() {
        out.push_str(&format!(
            "    <edge id=\"e{edge}\" source=\"n{src}\" target=\"n{dst}\">\n"
        ));
        out.push_str(&format!("      <data key=\"weight\">{weight}</data>\n"));
        out.push_str("    </edge>\n");
    }

    out.push_str("  </graph>\n");
    out.push_str("</graphml>\n");
    out
}

/// Graphviz DOT rendering of the graph, edges labelled with their weight
pub fn to_dot(graph: &Graph) -> String {
    let labels = graph.labels().to_vec();
    let edges = graph.edges().map(|(src, dst, w)| (src as u32, dst as u32, w));

    if graph.is_directed() {
        let mut pg: DiGraph<String, f64> = DiGraph::with_capacity(graph.node_count(), graph.edge_count());
        for label in labels {
            pg.add_node(label);
        }
        pg.extend_with_edges(edges);
        format!("{}", Dot::new(&pg))
    } else {
        let mut pg: UnGraph<String, f64> = UnGraph::with_capacity(graph.node_count(), graph.edge_count());
        for label in labels {
            pg.add_node(label);
        }
        pg.extend_with_edges(edges);
        format!("{}", Dot::new(&pg))
    }
}

/// Generate visualizations from analysis results
pub fn generate_visualizations(
    graph: &Graph,
    centrality: &CentralityResult,
    partition: &Partition,
    layout: &Layout,
    output_dir: &Path,
) -> Result<()> {
    log::info!("Generating visualizations for {} nodes", graph.node_count());

    // Create visualizations directory
    let viz_dir = output_dir.join("visualizations");
    fs::create_dir_all(&viz_dir)?;

    write_figure(&viz_dir.join("graph_figure.json"), &graph_figure(graph, centrality, layout))?;
    write_figure(&viz_dir.join("centrality_bar.json"), &centrality_bar_chart(graph, centrality))?;
    write_figure(&viz_dir.join("cluster_figure.json"), &cluster_figure(graph, partition, layout))?;

    fs::write(viz_dir.join("graph.graphml"), to_graphml(graph, centrality, partition, layout))?;
    fs::write(viz_dir.join("graph.dot"), to_dot(graph))?;

    generate_node_table(graph, centrality, partition, layout, &viz_dir)?;
    generate_html_index(centrality, partition, &viz_dir)?;

    log::info!("Visualizations generated successfully");

    Ok(())
}

fn write_figure<T: Serialize>(path: &Path, figure: &T) -> Result<()> {
    log::debug!("Writing {}", path.display());
    fs::write(path, serde_json::to_string_pretty(figure)?)?;
    Ok(())
}

/// Create a CSV file with per-node results for external tools
fn generate_node_table(
    graph: &Graph,
    centrality: &CentralityResult,
    partition: &Partition,
    layout: &Layout,
    viz_dir: &Path,
) -> Result<()> {
    let mut nodes_file = File::create(viz_dir.join("nodes.csv"))?;

    // Write header
    writeln!(nodes_file, "id,label,score,community,x,y")?;

    for (node, label) in graph.labels().iter().enumerate() {
        let [x, y] = position(layout, label);
        writeln!(
            nodes_file,
            "{},{},{:.6},{},{:.6},{:.6}",
            node,
            csv_field(label),
            centrality.get(label).unwrap_or_default(),
            partition.community_of(label).unwrap_or_default(),
            x,
            y
        )?;
    }

    Ok(())
}

fn csv_field(text: &str) -> String {
    if text.contains([',', '"', '\n']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

/// Generate an HTML index listing the run's outputs
fn generate_html_index(
    centrality: &CentralityResult,
    partition: &Partition,
    viz_dir: &Path,
) -> Result<()> {
    let mut index_file = File::create(viz_dir.join("index.html"))?;
    let groups: BTreeMap<usize, Vec<String>> = partition.groups();

    writeln!(index_file, "<!DOCTYPE html>")?;
    writeln!(index_file, "<html lang=\"en\">")?;
    writeln!(index_file, "<head>")?;
    writeln!(index_file, "  <meta charset=\"UTF-8\">")?;
    writeln!(index_file, "  <title>Graph Analysis</title>")?;
    writeln!(index_file, "  <style>")?;
    writeln!(index_file, "    body {{ font-family: Arial, sans-serif; margin: 20px; }}")?;
    writeln!(index_file, "    h1, h2 {{ color: #333; }}")?;
    writeln!(index_file, "    .community-card {{ border: 1px solid #ddd; margin: 10px; padding: 15px; border-radius: 5px; }}")?;
    writeln!(index_file, "  </style>")?;
    writeln!(index_file, "</head>")?;
    writeln!(index_file, "<body>")?;
    writeln!(index_file, "  <h1>Graph Analysis</h1>")?;

    writeln!(index_file, "  <h2>{}</h2>", escape_xml(centrality.method.title()))?;
    writeln!(index_file, "  <ol>")?;
    for (label, score) in centrality.ranking().into_iter().take(20) {
        writeln!(index_file, "    <li>{}: {:.4}</li>", escape_xml(label), score)?;
    }
    writeln!(index_file, "  </ol>")?;

    writeln!(index_file, "  <h2>{}</h2>", escape_xml(partition.method.title()))?;
    for (community, members) in &groups {
        writeln!(index_file, "  <div class=\"community-card\">")?;
        writeln!(index_file, "    <h3>Community {} ({} nodes)</h3>", community, members.len())?;
        let members: Vec<String> = members.iter().map(|m| escape_xml(m)).collect();
        writeln!(index_file, "    <p>{}</p>", members.join(", "))?;
        writeln!(index_file, "  </div>")?;
    }

    writeln!(index_file, "</body>")?;
    writeln!(index_file, "</html>")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::centrality::{compute, CentralityMethod};
    use crate::cluster::ClusterMethod;
    use crate::config::{CentralityConfig, LayoutConfig};
    use crate::graph::AdjacencyMatrix;
    use crate::layout::layout;

    fn fixture() -> (Graph, CentralityResult, Partition, Layout) {
        let g = Graph::from_matrix(&AdjacencyMatrix::from_edges(
            &["A", "B", "C"],
            &[("A", "B", 1.0), ("B", "C", 2.0)],
        ))
        .unwrap();
        let centrality = compute(&g, CentralityMethod::InDegree, &CentralityConfig::default()).unwrap();
        let partition = Partition::from_assignment(&g, ClusterMethod::GirvanNewman, &[0, 0, 1]);
        let layout = layout(&g, &LayoutConfig::default()).unwrap();
        (g, centrality, partition, layout)
    }

    #[test]
    fn graph_figure_has_a_marker_per_node_and_segment_per_edge() {
        let (g, centrality, _, layout) = fixture();
        let figure = graph_figure(&g, &centrality, &layout);

        assert_eq!(figure.nodes.x.len(), 3);
        assert_eq!(figure.edges.x.len(), 6);
        assert_eq!(figure.edges.x[2], None);
        assert_eq!(figure.nodes.text[1], "B<br>In-degree Centrality: 0.50");
    }

    #[test]
    fn bar_chart_follows_node_order() {
        let (g, centrality, _, _) = fixture();
        let chart = centrality_bar_chart(&g, &centrality);

        let nodes: Vec<&str> = chart.bars.iter().map(|b| b.node.as_str()).collect();
        assert_eq!(nodes, vec!["A", "B", "C"]);
        assert_eq!(chart.y_label, "In-degree Centrality");
    }

    #[test]
    fn exports_mention_every_node() {
        let (g, centrality, partition, layout) = fixture();
        let graphml = to_graphml(&g, &centrality, &partition, &layout);
        let dot = to_dot(&g);

        assert_eq!(graphml.matches("<node id=").count(), 3);
        assert_eq!(graphml.matches("<edge id=").count(), 2);
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("\"C\""));
    }

    #[test]
    fn cluster_figure_colours_by_community() {
        let (g, _, partition, layout) = fixture();
        let figure = cluster_figure(&g, &partition, &layout);

        assert_eq!(figure.community_count, 2);
        assert_eq!(figure.nodes[2].community, 1);
    }
}
