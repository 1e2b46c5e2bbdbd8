//! Layered placement of trajectory graphs.
//!
//! [`GraphLayout`] is the seam for an external layered-DAG engine;
//! [`LayeredLayout`] is the built-in longest-path implementation used by the
//! JSON render model.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use crate::config::{Direction, LayoutConfig};
use crate::models::TrajectoryNode;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Nodes and directed edges (source, target) by node id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutGraph {
    pub nodes: Vec<String>,
    pub edges: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    pub id: String,
    pub layer: usize,
    pub position: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutedEdge {
    pub source: String,
    pub target: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<RoutedEdge>,
}

pub trait GraphLayout {
    fn layout(&self, graph: &LayoutGraph) -> Layout;
}

impl LayoutGraph {
    /// Child edges derived from parent ids. Parents that are not in the node
    /// list are ignored.
    pub fn from_trajectory(nodes: &[TrajectoryNode]) -> Self {
        let ids: Vec<String> = nodes.iter().map(|node| node.id.clone()).collect();
        let mut edges = Vec::new();
        for node in nodes {
            for parent in &node.parent_ids {
                if ids.contains(parent) {
                    edges.push((parent.clone(), node.id.clone()));
                }
            }
        }
        Self { nodes: ids, edges }
    }
}

#[derive(Debug, Clone)]
pub struct LayeredLayout {
    direction: Direction,
    rank_sep: f64,
    node_sep: f64,
}

impl LayeredLayout {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            direction: config.direction,
            rank_sep: config.rank_sep,
            node_sep: config.node_sep,
        }
    }

    /// Longest-path layer per node, in node-list order. Nodes caught in a
    /// cycle stay on layer 0.
    fn assign_layers(graph: &LayoutGraph) -> Vec<usize> {
        let index: HashMap<&str, usize> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); graph.nodes.len()];
        let mut in_degree = vec![0usize; graph.nodes.len()];
        for (source, target) in &graph.edges {
            if let (Some(&s), Some(&t)) = (index.get(source.as_str()), index.get(target.as_str()))
            {
                children[s].push(t);
                in_degree[t] += 1;
            }
        }

        let mut layers = vec![0usize; graph.nodes.len()];
        let mut queue: VecDeque<usize> = (0..graph.nodes.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();
        while let Some(current) = queue.pop_front() {
            for &child in &children[current] {
                layers[child] = layers[child].max(layers[current] + 1);
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    queue.push_back(child);
                }
            }
        }
        layers
    }

    fn place(&self, layer: usize, slot: usize, width: usize) -> Point {
        let along = layer as f64 * self.rank_sep;
        let across = (slot as f64 - (width as f64 - 1.0) / 2.0) * self.node_sep;
        match self.direction {
            Direction::TopBottom => Point { x: across, y: along },
            Direction::LeftRight => Point { x: along, y: across },
        }
    }
}

impl GraphLayout for LayeredLayout {
    fn layout(&self, graph: &LayoutGraph) -> Layout {
        let layers = Self::assign_layers(graph);
        let depth = layers.iter().copied().max().map_or(0, |max| max + 1);

        let mut widths = vec![0usize; depth];
        for &layer in &layers {
            widths[layer] += 1;
        }

        let mut filled = vec![0usize; depth];
        let mut positions: HashMap<&str, Point> = HashMap::new();
        let mut nodes = Vec::with_capacity(graph.nodes.len());
        for (id, &layer) in graph.nodes.iter().zip(&layers) {
            let position = self.place(layer, filled[layer], widths[layer]);
            filled[layer] += 1;
            positions.insert(id.as_str(), position);
            nodes.push(PositionedNode {
                id: id.clone(),
                layer,
                position,
            });
        }

        let edges = graph
            .edges
            .iter()
            .filter_map(|(source, target)| {
                let from = *positions.get(source.as_str())?;
                let to = *positions.get(target.as_str())?;
                let mid = Point {
                    x: (from.x + to.x) / 2.0,
                    y: (from.y + to.y) / 2.0,
                };
                Some(RoutedEdge {
                    source: source.clone(),
                    target: target.clone(),
                    points: vec![from, mid, to],
                })
            })
            .collect();

        Layout { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InteractionRecord;
    use crate::trajectory;

    fn chain(len: usize) -> Vec<TrajectoryNode> {
        trajectory::build(&vec![InteractionRecord::default(); len])
    }

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> LayoutGraph {
        LayoutGraph {
            nodes: nodes.iter().map(|n| n.to_string()).collect(),
            edges: edges
                .iter()
                .map(|(s, t)| (s.to_string(), t.to_string()))
                .collect(),
        }
    }

    #[test]
    fn trajectory_edges_follow_parents() {
        let graph = LayoutGraph::from_trajectory(&chain(3));
        assert_eq!(graph.nodes, vec!["0", "1", "2"]);
        assert_eq!(
            graph.edges,
            vec![
                ("0".to_string(), "1".to_string()),
                ("1".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn chain_gets_one_node_per_layer() {
        let layout = LayeredLayout::new(&LayoutConfig::default());
        let result = layout.layout(&LayoutGraph::from_trajectory(&chain(4)));
        let layers: Vec<usize> = result.nodes.iter().map(|n| n.layer).collect();
        assert_eq!(layers, vec![0, 1, 2, 3]);
        assert_eq!(result.nodes[2].position, Point { x: 0.0, y: 120.0 });
        assert_eq!(result.edges.len(), 3);
        assert_eq!(result.edges[0].points.len(), 3);
        assert_eq!(result.edges[0].points[1], Point { x: 0.0, y: 30.0 });
    }

    #[test]
    fn single_node_and_empty_graph_lay_out() {
        let layout = LayeredLayout::new(&LayoutConfig::default());
        let single = layout.layout(&LayoutGraph::from_trajectory(&chain(1)));
        assert_eq!(single.nodes.len(), 1);
        assert!(single.edges.is_empty());
        assert_eq!(layout.layout(&LayoutGraph::default()), Layout::default());
    }

    #[test]
    fn left_to_right_swaps_axes() {
        let config = LayoutConfig {
            direction: Direction::LeftRight,
            ..LayoutConfig::default()
        };
        let result = LayeredLayout::new(&config).layout(&LayoutGraph::from_trajectory(&chain(2)));
        assert_eq!(result.nodes[1].position, Point { x: 60.0, y: 0.0 });
    }

    #[test]
    fn branching_dag_uses_longest_path() {
        let layout = LayeredLayout::new(&LayoutConfig::default());
        let result = layout.layout(&graph(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d"), ("a", "d")],
        ));
        let layers: Vec<usize> = result.nodes.iter().map(|n| n.layer).collect();
        assert_eq!(layers, vec![0, 1, 1, 2]);
        assert_eq!(result.nodes[1].position.x, -20.0);
        assert_eq!(result.nodes[2].position.x, 20.0);
    }

    #[test]
    fn dangling_parent_is_ignored() {
        let mut nodes = chain(2);
        nodes[0].parent_ids.push("99".to_string());
        let graph = LayoutGraph::from_trajectory(&nodes);
        assert_eq!(graph.edges.len(), 1);
    }
}
