//! Per-tick geometry derived from simulation positions
//!
//! Recomputed after every step: edge endpoints, node centres, node label
//! anchors (fixed pixel offset) and edge label anchors (segment midpoint).
//! Coordinates are canvas-local; the widget offsets them by the canvas
//! origin when painting.

use egui::{Pos2, Vec2};
use oracle_types::{GraphEdge, GraphNode};

use super::force_sim::ForceSimulation;

/// Offset of a node label from the node centre
pub const NODE_LABEL_OFFSET: Vec2 = Vec2::new(15.0, 5.0);

/// Pointer distance within which an edge counts as hit
pub const EDGE_HIT_TOLERANCE: f32 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeGeometry {
    pub id: String,
    pub name: String,
    pub node_type: String,
    pub center: Pos2,
    pub label_pos: Pos2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeGeometry {
    pub id: String,
    pub label: String,
    pub from: Pos2,
    pub to: Pos2,
    pub label_pos: Pos2,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickGeometry {
    pub nodes: Vec<NodeGeometry>,
    pub edges: Vec<EdgeGeometry>,
}

impl TickGeometry {
    /// Project simulation positions onto the graph records.
    ///
    /// Edges with an endpoint missing from the simulation are skipped.
    pub fn compute(sim: &ForceSimulation, nodes: &[GraphNode], edges: &[GraphEdge]) -> Self {
        let nodes = nodes
            .iter()
            .filter_map(|node| {
                let center = sim.position(&node.id)?;
                Some(NodeGeometry {
                    id: node.id.clone(),
                    name: node.name.clone(),
                    node_type: node.node_type.clone(),
                    center,
                    label_pos: center + NODE_LABEL_OFFSET,
                })
            })
            .collect();

        let edges = edges
            .iter()
            .filter_map(|edge| {
                let from = sim.position(&edge.source)?;
                let to = sim.position(&edge.target)?;
                Some(EdgeGeometry {
                    id: edge.id.clone(),
                    label: edge.label.clone(),
                    from,
                    to,
                    label_pos: midpoint(from, to),
                })
            })
            .collect();

        Self { nodes, edges }
    }

    /// Topmost node within `radius` of `pos`
    pub fn node_at(&self, pos: Pos2, radius: f32) -> Option<&NodeGeometry> {
        self.nodes
            .iter()
            .rev()
            .find(|n| (pos - n.center).length() <= radius)
    }

    /// Closest edge within [`EDGE_HIT_TOLERANCE`] of `pos`
    pub fn edge_at(&self, pos: Pos2) -> Option<&EdgeGeometry> {
        self.edges
            .iter()
            .map(|e| (e, distance_to_segment(pos, e.from, e.to)))
            .filter(|(_, d)| *d <= EDGE_HIT_TOLERANCE)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(e, _)| e)
    }
}

pub fn midpoint(a: Pos2, b: Pos2) -> Pos2 {
    Pos2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Shortest distance from `p` to the segment `a`-`b`
pub fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return (p - a).length();
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).length()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::force_sim::SimNode;

    fn node(id: &str) -> GraphNode {
        GraphNode {
            id: id.into(),
            name: id.to_uppercase(),
            node_type: "server".into(),
        }
    }

    fn edge(id: &str, source: &str, target: &str) -> GraphEdge {
        GraphEdge {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: "TCP".into(),
        }
    }

    fn fixed_sim() -> ForceSimulation {
        ForceSimulation::new([
            SimNode::new("a").with_position(Pos2::new(0.0, 0.0)),
            SimNode::new("b").with_position(Pos2::new(100.0, 50.0)),
        ])
    }

    #[test]
    fn test_labels_follow_positions() {
        let geometry = TickGeometry::compute(
            &fixed_sim(),
            &[node("a"), node("b")],
            &[edge("e", "a", "b")],
        );
        assert_eq!(geometry.nodes[1].label_pos, Pos2::new(115.0, 55.0));
        assert_eq!(geometry.edges[0].from, Pos2::new(0.0, 0.0));
        assert_eq!(geometry.edges[0].to, Pos2::new(100.0, 50.0));
        assert_eq!(geometry.edges[0].label_pos, Pos2::new(50.0, 25.0));
    }

    #[test]
    fn test_edges_to_unknown_nodes_are_skipped() {
        let geometry = TickGeometry::compute(
            &fixed_sim(),
            &[node("a"), node("b")],
            &[edge("e", "a", "ghost")],
        );
        assert!(geometry.edges.is_empty());
    }

    #[test]
    fn test_hit_testing() {
        let geometry = TickGeometry::compute(
            &fixed_sim(),
            &[node("a"), node("b")],
            &[edge("e", "a", "b")],
        );
        assert_eq!(geometry.node_at(Pos2::new(3.0, 4.0), 10.0).unwrap().id, "a");
        assert!(geometry.node_at(Pos2::new(50.0, 25.0), 10.0).is_none());
        assert_eq!(geometry.edge_at(Pos2::new(50.0, 27.0)).unwrap().id, "e");
        assert!(geometry.edge_at(Pos2::new(50.0, 60.0)).is_none());
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Pos2::new(0.0, 0.0);
        let b = Pos2::new(10.0, 0.0);
        assert_eq!(distance_to_segment(Pos2::new(5.0, 3.0), a, b), 3.0);
        assert_eq!(distance_to_segment(Pos2::new(13.0, 4.0), a, b), 5.0);
        assert_eq!(distance_to_segment(Pos2::new(0.0, 2.0), a, a), 2.0);
    }
}
