//! Threat Model Graph Visualization Module
//!
//! Technical assets are drawn as nodes and data flows as edges, laid out by
//! a force simulation that keeps stepping until it cools.
//!
//! # Architecture
//!
//! ```text
//! ThreatModel (current model)
//!        │
//!        ▼
//! project() ──► GraphData {nodes, edges}
//!        │
//!        ▼
//! ForceSimulation (link + charge + center)
//!        │  advance() once per frame
//!        ▼
//! TickGeometry (endpoints, centres, label anchors)
//!        │
//!        ├──► painter (edges, nodes, labels)
//!        │
//!        └──► Selection / DragController (pointer input)
//!                    │
//!                    ▼
//!              popup ──► NavigationIntent (drill-down)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut graph = ThreatGraphWidget::new(GraphSettings::default());
//! graph.sync(store.current_model().as_deref());
//! if let Some(intent) = graph.ui(ui, store.current_model().as_deref()) {
//!     router.push(intent.route());
//! }
//! ```

pub mod colors;
pub mod force_sim;
pub mod geometry;
pub mod interaction;
pub mod popup;
pub mod projection;

pub use force_sim::{
    CenterForce, Force, ForceSettings, ForceSimulation, LinkForce, ManyBodyForce, SimLink,
    SimNode,
};
pub use geometry::{EdgeGeometry, NodeGeometry, TickGeometry};
pub use interaction::{DragController, SelectedNode, Selection};
pub use popup::{AssetPopupData, EdgePopupData, PopupAction};
pub use projection::{project, project_current};

use egui::{Align2, FontId, Pos2, Sense, Stroke, Vec2};
use oracle_types::{GraphData, NavigationIntent, ThreatModel};
use serde::{Deserialize, Serialize};

/// Radius of a node circle
pub const DEFAULT_NODE_RADIUS: f32 = 10.0;

/// Canvas and layout parameters for the widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    #[serde(flatten)]
    pub force: ForceSettings,
    pub node_radius: f32,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            force: ForceSettings::default(),
            node_radius: DEFAULT_NODE_RADIUS,
        }
    }
}

impl GraphSettings {
    pub fn canvas_size(&self) -> Vec2 {
        Vec2::new(self.force.width, self.force.height)
    }
}

// =============================================================================
// GRAPH WIDGET
// =============================================================================

/// Force-directed view of the current threat model
pub struct ThreatGraphWidget {
    settings: GraphSettings,
    /// Projection currently being simulated
    data: GraphData,
    simulation: Option<ForceSimulation>,
    /// Positions from the latest tick
    geometry: TickGeometry,
    selection: Selection,
    drag: DragController,
}

impl Default for ThreatGraphWidget {
    fn default() -> Self {
        Self::new(GraphSettings::default())
    }
}

impl ThreatGraphWidget {
    pub fn new(settings: GraphSettings) -> Self {
        let drag = DragController::new(settings.force.drag_alpha_target);
        Self {
            settings,
            data: GraphData::default(),
            simulation: None,
            geometry: TickGeometry::default(),
            selection: Selection::new(),
            drag,
        }
    }

    /// Replace the graph inputs.
    ///
    /// The running simulation is stopped and a fresh one is built; selection
    /// and in-flight drags are discarded.
    pub fn set_data(&mut self, data: GraphData) {
        if let Some(sim) = self.simulation.as_mut() {
            sim.stop();
        }
        tracing::debug!(
            nodes = data.nodes.len(),
            edges = data.edges.len(),
            "graph data set"
        );

        let sim = ForceSimulation::from_graph(&data, &self.settings.force);
        self.geometry = TickGeometry::compute(&sim, &data.nodes, &data.edges);
        self.simulation = Some(sim);
        self.data = data;
        self.selection.close_popup();
        self.drag.clear();
    }

    /// Re-project `model` and reset the graph if the projection changed.
    ///
    /// Returns whether the data was replaced.
    pub fn sync(&mut self, model: Option<&ThreatModel>) -> bool {
        let data = project_current(model);
        if self.simulation.is_some() && data == self.data {
            return false;
        }
        self.set_data(data);
        true
    }

    /// Stop the simulation and drop all graph state
    pub fn clear(&mut self) {
        if let Some(sim) = self.simulation.as_mut() {
            sim.stop();
        }
        self.simulation = None;
        self.data = GraphData::default();
        self.geometry = TickGeometry::default();
        self.selection.close_popup();
        self.drag.clear();
    }

    pub fn data(&self) -> &GraphData {
        &self.data
    }

    pub fn simulation(&self) -> Option<&ForceSimulation> {
        self.simulation.as_ref()
    }

    pub fn geometry(&self) -> &TickGeometry {
        &self.geometry
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    /// Is the simulation still scheduled for per-frame stepping?
    pub fn is_animating(&self) -> bool {
        self.simulation.as_ref().is_some_and(ForceSimulation::is_running)
    }

    // =========================================================================
    // FRAME
    // =========================================================================

    /// Step the simulation once (if active) and refresh geometry.
    ///
    /// Returns whether another frame is needed.
    pub fn step(&mut self) -> bool {
        let Some(sim) = self.simulation.as_mut() else {
            return false;
        };
        let running = sim.advance();
        self.geometry = TickGeometry::compute(sim, &self.data.nodes, &self.data.edges);
        running
    }

    // =========================================================================
    // POINTER INPUT (canvas-local positions)
    // =========================================================================

    /// Click on the canvas: select a node, else an edge, else close the popup.
    ///
    /// `screen` is where the popup gets anchored.
    pub fn click(&mut self, local: Pos2, screen: Pos2) {
        let radius = self.settings.node_radius;
        if let Some(hit) = self.geometry.node_at(local, radius) {
            if let Some(node) = self.data.node(&hit.id) {
                self.selection.select_node(node, screen);
                return;
            }
        }
        if let Some(hit) = self.geometry.edge_at(local) {
            let id = hit.id.clone();
            self.selection.select_edge(&id, screen);
            return;
        }
        self.selection.close_popup();
    }

    /// Start dragging the node under `local`, if any. Returns the node id.
    pub fn drag_start(&mut self, local: Pos2) -> Option<String> {
        let hit = self.geometry.node_at(local, self.settings.node_radius)?;
        let (id, center) = (hit.id.clone(), hit.center);
        let sim = self.simulation.as_mut()?;
        self.drag.start(sim, &id, center);
        Some(id)
    }

    pub fn drag_move(&mut self, local: Pos2) {
        let (Some(sim), Some(id)) = (self.simulation.as_mut(), self.drag.current()) else {
            return;
        };
        let id = id.to_string();
        self.drag.drag(sim, &id, local);
    }

    pub fn drag_end(&mut self) {
        let (Some(sim), Some(id)) = (self.simulation.as_mut(), self.drag.current()) else {
            return;
        };
        let id = id.to_string();
        self.drag.end(sim, &id);
    }

    /// Navigation intent for the selection; closes the popup
    pub fn drill_down(&mut self) -> Option<NavigationIntent> {
        self.selection.drill_down()
    }

    pub fn close_popup(&mut self) {
        self.selection.close_popup();
    }

    // =========================================================================
    // UI
    // =========================================================================

    /// Main UI function.
    ///
    /// `model` backs the detail popups. Returns a navigation intent when the
    /// user drills into the selected element this frame.
    pub fn ui(
        &mut self,
        ui: &mut egui::Ui,
        model: Option<&ThreatModel>,
    ) -> Option<NavigationIntent> {
        if self.data.nodes.is_empty() || self.data.edges.is_empty() {
            self.render_empty_state(ui);
            return None;
        }

        let (response, painter) =
            ui.allocate_painter(self.settings.canvas_size(), Sense::click_and_drag());
        let origin = response.rect.min.to_vec2();

        let needs_repaint = self.step();

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.drag_start(pos - origin);
            }
        } else if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.drag_move(pos - origin);
            }
        }
        if response.drag_stopped() {
            self.drag_end();
        }
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.click(pos - origin, pos);
            }
        }

        self.paint(&painter, origin);
        self.render_legend(&painter, response.rect);

        let intent = self.render_popup(ui.ctx(), model);

        if needs_repaint || self.is_animating() {
            ui.ctx().request_repaint();
        }
        intent
    }

    fn paint(&self, painter: &egui::Painter, origin: Vec2) {
        let selected_edge = self.selection.edge();
        let selected_node = self.selection.node().map(|n| n.id.as_str());

        for edge in &self.geometry.edges {
            let (color, width) = if selected_edge == Some(edge.id.as_str()) {
                (colors::EDGE_SELECTED, 3.0)
            } else {
                (colors::EDGE_COLOR, 2.0)
            };
            painter.line_segment(
                [edge.from + origin, edge.to + origin],
                Stroke::new(width, color),
            );
            painter.text(
                edge.label_pos + origin,
                Align2::CENTER_CENTER,
                &edge.label,
                FontId::proportional(10.0),
                colors::EDGE_LABEL_COLOR,
            );
        }

        for node in &self.geometry.nodes {
            let stroke = if selected_node == Some(node.id.as_str()) {
                Stroke::new(2.5, colors::SELECTED_STROKE)
            } else {
                Stroke::new(1.5, colors::NODE_STROKE)
            };
            painter.circle(
                node.center + origin,
                self.settings.node_radius,
                colors::node_fill(&node.node_type),
                stroke,
            );
            painter.text(
                node.label_pos + origin,
                Align2::LEFT_BOTTOM,
                &node.name,
                FontId::proportional(12.0),
                colors::LABEL_COLOR,
            );
        }
    }

    fn render_popup(
        &mut self,
        ctx: &egui::Context,
        model: Option<&ThreatModel>,
    ) -> Option<NavigationIntent> {
        let (model, anchor) = (model?, self.selection.anchor()?);

        let action = if let Some(node) = self.selection.node() {
            let data = AssetPopupData::build(model, &node.id, node.category)?;
            popup::render_asset_popup(ctx, &data, anchor)
        } else {
            let data = EdgePopupData::build(model, self.selection.edge()?)?;
            popup::render_edge_popup(ctx, &data, anchor)
        };

        match action? {
            PopupAction::Close => {
                self.selection.close_popup();
                None
            }
            PopupAction::DrillDown => self.selection.drill_down(),
        }
    }

    fn render_empty_state(&self, ui: &mut egui::Ui) {
        ui.centered_and_justified(|ui| {
            ui.label("No data available to visualize.");
        });
    }

    fn render_legend(&self, painter: &egui::Painter, rect: egui::Rect) {
        let mut pos = rect.left_bottom() + Vec2::new(16.0, -16.0);
        for (asset_type, label) in colors::legend() {
            painter.circle_filled(pos, 5.0, colors::asset_type_fill(asset_type));
            let galley_rect = painter.text(
                pos + Vec2::new(9.0, 0.0),
                Align2::LEFT_CENTER,
                label,
                FontId::proportional(11.0),
                colors::MUTED_TEXT,
            );
            pos.x = galley_rect.right() + 18.0;
        }
    }
}

impl Drop for ThreatGraphWidget {
    fn drop(&mut self) {
        if let Some(sim) = self.simulation.as_mut() {
            sim.stop();
        }
    }
}
