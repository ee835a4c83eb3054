//! Interaction state - selection, popup anchor, drag
//!
//! Kept free of egui input types so every rule can be driven directly from
//! tests. The widget translates pointer events into these calls.

use egui::Pos2;
use oracle_types::{Destination, GraphNode, NavigationIntent, NodeCategory};

use super::force_sim::ForceSimulation;

// =============================================================================
// SELECTION
// =============================================================================

/// A selected node and the category it was classified into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedNode {
    pub id: String,
    pub category: NodeCategory,
}

/// What is selected and where its popup is anchored.
///
/// Node and edge selection are mutually exclusive; the anchor is set iff
/// one of them is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    node: Option<SelectedNode>,
    edge: Option<String>,
    anchor: Option<Pos2>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a node, classify it and anchor its popup at the pointer
    pub fn select_node(&mut self, node: &GraphNode, pointer: Pos2) {
        let category = NodeCategory::classify(&node.node_type);
        tracing::debug!(node = %node.id, category = category.as_str(), "node selected");
        self.node = Some(SelectedNode {
            id: node.id.clone(),
            category,
        });
        self.edge = None;
        self.anchor = Some(pointer);
    }

    /// Select an edge and anchor its popup at the pointer
    pub fn select_edge(&mut self, edge_id: &str, pointer: Pos2) {
        tracing::debug!(edge = %edge_id, "edge selected");
        self.edge = Some(edge_id.to_string());
        self.node = None;
        self.anchor = Some(pointer);
    }

    /// Clear both selections and the anchor
    pub fn close_popup(&mut self) {
        self.node = None;
        self.edge = None;
        self.anchor = None;
    }

    /// Navigation intent for the current selection; closes the popup.
    pub fn drill_down(&mut self) -> Option<NavigationIntent> {
        let intent = if let Some(node) = &self.node {
            Some(NavigationIntent::new(
                node.category.destination(),
                node.id.clone(),
            ))
        } else {
            self.edge
                .as_ref()
                .map(|id| NavigationIntent::new(Destination::DataFlows, id.clone()))
        };
        if let Some(intent) = &intent {
            tracing::info!(route = %intent.route(), "drill-down");
        }
        self.close_popup();
        intent
    }

    pub fn node(&self) -> Option<&SelectedNode> {
        self.node.as_ref()
    }

    pub fn edge(&self) -> Option<&str> {
        self.edge.as_deref()
    }

    pub fn anchor(&self) -> Option<Pos2> {
        self.anchor
    }

    pub fn is_open(&self) -> bool {
        self.anchor.is_some()
    }
}

// =============================================================================
// DRAG
// =============================================================================

/// Tracks in-flight drags and drives pinning/reheating on the simulation.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    /// Node ids currently being dragged
    active: Vec<String>,
    alpha_target: f32,
}

impl DragController {
    pub fn new(alpha_target: f32) -> Self {
        Self {
            active: Vec::new(),
            alpha_target,
        }
    }

    /// Reheat the simulation if no other drag is in flight, then pin the
    /// node under the pointer.
    pub fn start(&mut self, sim: &mut ForceSimulation, id: &str, pointer: Pos2) {
        if self.active.is_empty() {
            sim.reheat(self.alpha_target);
        }
        sim.pin(id, pointer);
        self.active.push(id.to_string());
    }

    /// Track the pointer with the pinned position
    pub fn drag(&mut self, sim: &mut ForceSimulation, id: &str, pointer: Pos2) {
        if self.is_dragging(id) {
            sim.pin(id, pointer);
        }
    }

    /// Release the pin; the last drag to end lets the energy decay.
    pub fn end(&mut self, sim: &mut ForceSimulation, id: &str) {
        self.active.retain(|a| a != id);
        if self.active.is_empty() {
            sim.cool();
        }
        sim.unpin(id);
    }

    pub fn is_dragging(&self, id: &str) -> bool {
        self.active.iter().any(|a| a == id)
    }

    /// The most recently started drag
    pub fn current(&self) -> Option<&str> {
        self.active.last().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}
