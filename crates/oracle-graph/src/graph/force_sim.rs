//! Force Simulation for the threat model graph
//!
//! A velocity-Verlet force-directed layout with the same contract as
//! d3-force: a cooling `alpha` that decays toward `alpha_target`, composable
//! forces behind the [`Force`] trait, and fixed positions (`fx`/`fy`) for
//! dragged nodes. Designed for tens of nodes, so the many-body force is a
//! plain pairwise loop rather than Barnes-Hut.
//!
//! # Usage
//! ```ignore
//! let mut sim = ForceSimulation::from_graph(&data, &ForceSettings::default());
//!
//! // Each frame:
//! if sim.advance() {
//!     ctx.request_repaint();
//! }
//! for node in sim.nodes() {
//!     draw_circle(node.position(), 10.0);
//! }
//! ```

use std::collections::HashMap;

use egui::{Pos2, Vec2};
use oracle_types::GraphData;
use serde::{Deserialize, Serialize};

const INITIAL_RADIUS: f32 = 10.0;

/// Default rest length of a link
pub const DEFAULT_LINK_DISTANCE: f32 = 100.0;
/// Default many-body strength (negative repels)
pub const DEFAULT_CHARGE_STRENGTH: f32 = -200.0;
/// Target energy applied while a node is being dragged
pub const DEFAULT_DRAG_ALPHA_TARGET: f32 = 0.3;

// =============================================================================
// RANDOM SOURCE
// =============================================================================

/// Linear congruential generator used to break exact coincidences.
///
/// Deterministic so that two runs over the same input lay out identically.
#[derive(Debug, Clone)]
struct Lcg(u32);

impl Lcg {
    fn new() -> Self {
        Self(1)
    }

    fn next(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (self.0 as f64 / 4_294_967_296.0) as f32
    }

    fn jiggle(&mut self) -> f32 {
        (self.next() - 0.5) * 1e-6
    }
}

// =============================================================================
// SIMULATION NODE / LINK
// =============================================================================

/// A node in the force simulation
#[derive(Debug, Clone)]
pub struct SimNode {
    /// Unique identifier (graph node id)
    pub id: String,

    /// Position in the node array, assigned by the simulation
    pub index: usize,

    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,

    /// Fixed x position; while set, physics does not move the node
    pub fx: Option<f32>,

    /// Fixed y position
    pub fy: Option<f32>,
}

impl SimNode {
    /// Create a node without a position; the simulation places it on its
    /// initial spiral.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            index: 0,
            x: f32::NAN,
            y: f32::NAN,
            vx: 0.0,
            vy: 0.0,
            fx: None,
            fy: None,
        }
    }

    /// Builder: set initial position
    pub fn with_position(mut self, pos: Pos2) -> Self {
        self.x = pos.x;
        self.y = pos.y;
        self
    }

    pub fn position(&self) -> Pos2 {
        Pos2::new(self.x, self.y)
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.vx, self.vy)
    }

    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }
}

/// A link between two nodes, keyed by node id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimLink {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl SimLink {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

// =============================================================================
// FORCES
// =============================================================================

/// A force applied on every simulation tick.
///
/// Forces only write velocities (or, for centering, positions); the
/// simulation integrates velocities afterwards.
pub trait Force: std::fmt::Debug {
    /// Called whenever the node set changes.
    fn initialize(&mut self, _nodes: &[SimNode]) {}

    fn apply(&mut self, nodes: &mut [SimNode], alpha: f32);
}

#[derive(Debug, Clone, Copy)]
struct ResolvedLink {
    source: usize,
    target: usize,
    strength: f32,
    bias: f32,
}

/// Spring force keeping linked nodes at `distance`.
///
/// Strength per link is `1 / min(degree(source), degree(target))` and the
/// correction is split between the endpoints by degree, so hubs move less.
/// Links naming an unknown node are dropped.
#[derive(Debug, Clone)]
pub struct LinkForce {
    links: Vec<SimLink>,
    distance: f32,
    resolved: Vec<ResolvedLink>,
    random: Lcg,
}

impl LinkForce {
    pub fn new(links: Vec<SimLink>) -> Self {
        Self {
            links,
            distance: DEFAULT_LINK_DISTANCE,
            resolved: Vec::new(),
            random: Lcg::new(),
        }
    }

    /// Builder: set rest length
    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = distance;
        self
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Number of links whose endpoints both exist
    pub fn resolved_len(&self) -> usize {
        self.resolved.len()
    }
}

impl Force for LinkForce {
    fn initialize(&mut self, nodes: &[SimNode]) {
        let index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        let mut count = vec![0usize; nodes.len()];
        let mut pairs = Vec::with_capacity(self.links.len());
        for link in &self.links {
            match (
                index.get(link.source.as_str()),
                index.get(link.target.as_str()),
            ) {
                (Some(&s), Some(&t)) => {
                    count[s] += 1;
                    count[t] += 1;
                    pairs.push((s, t));
                }
                _ => {
                    tracing::warn!(
                        link = %link.id,
                        source = %link.source,
                        target = %link.target,
                        "dropping link with unknown endpoint"
                    );
                }
            }
        }

        self.resolved = pairs
            .into_iter()
            .map(|(s, t)| {
                let (cs, ct) = (count[s] as f32, count[t] as f32);
                ResolvedLink {
                    source: s,
                    target: t,
                    strength: 1.0 / cs.min(ct),
                    bias: cs / (cs + ct),
                }
            })
            .collect();
    }

    fn apply(&mut self, nodes: &mut [SimNode], alpha: f32) {
        for link in &self.resolved {
            let (s, t) = (&nodes[link.source], &nodes[link.target]);
            let mut x = t.x + t.vx - s.x - s.vx;
            let mut y = t.y + t.vy - s.y - s.vy;
            if x == 0.0 {
                x = self.random.jiggle();
            }
            if y == 0.0 {
                y = self.random.jiggle();
            }
            let len = (x * x + y * y).sqrt();
            let l = (len - self.distance) / len * alpha * link.strength;
            x *= l;
            y *= l;

            let target = &mut nodes[link.target];
            target.vx -= x * link.bias;
            target.vy -= y * link.bias;

            let source = &mut nodes[link.source];
            source.vx += x * (1.0 - link.bias);
            source.vy += y * (1.0 - link.bias);
        }
    }
}

/// Pairwise charge between all nodes (negative strength repels).
#[derive(Debug, Clone)]
pub struct ManyBodyForce {
    strength: f32,
    distance_min2: f32,
    random: Lcg,
}

impl ManyBodyForce {
    pub fn new(strength: f32) -> Self {
        Self {
            strength,
            distance_min2: 1.0,
            random: Lcg::new(),
        }
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }
}

impl Default for ManyBodyForce {
    fn default() -> Self {
        Self::new(DEFAULT_CHARGE_STRENGTH)
    }
}

impl Force for ManyBodyForce {
    fn apply(&mut self, nodes: &mut [SimNode], alpha: f32) {
        let positions: Vec<(f32, f32)> = nodes.iter().map(|n| (n.x, n.y)).collect();

        for (i, node) in nodes.iter_mut().enumerate() {
            for (j, &(ox, oy)) in positions.iter().enumerate() {
                if i == j {
                    continue;
                }
                let mut x = ox - positions[i].0;
                let mut y = oy - positions[i].1;
                let mut l = x * x + y * y;
                if x == 0.0 {
                    x = self.random.jiggle();
                    l += x * x;
                }
                if y == 0.0 {
                    y = self.random.jiggle();
                    l += y * y;
                }
                if l < self.distance_min2 {
                    l = (self.distance_min2 * l).sqrt();
                }
                let w = self.strength * alpha / l;
                node.vx += x * w;
                node.vy += y * w;
            }
        }
    }
}

/// Translates all nodes so their centroid sits on `center`.
#[derive(Debug, Clone)]
pub struct CenterForce {
    center: Pos2,
    strength: f32,
}

impl CenterForce {
    pub fn new(center: Pos2) -> Self {
        Self {
            center,
            strength: 1.0,
        }
    }

    pub fn center(&self) -> Pos2 {
        self.center
    }
}

impl Force for CenterForce {
    fn apply(&mut self, nodes: &mut [SimNode], _alpha: f32) {
        if nodes.is_empty() {
            return;
        }
        let n = nodes.len() as f32;
        let (sx, sy) = nodes
            .iter()
            .fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
        let dx = (sx / n - self.center.x) * self.strength;
        let dy = (sy / n - self.center.y) * self.strength;
        for node in nodes.iter_mut() {
            node.x -= dx;
            node.y -= dy;
        }
    }
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Parameters for the standard link + charge + center composition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceSettings {
    pub width: f32,
    pub height: f32,
    pub link_distance: f32,
    pub charge_strength: f32,
    pub drag_alpha_target: f32,
}

impl Default for ForceSettings {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            link_distance: DEFAULT_LINK_DISTANCE,
            charge_strength: DEFAULT_CHARGE_STRENGTH,
            drag_alpha_target: DEFAULT_DRAG_ALPHA_TARGET,
        }
    }
}

impl ForceSettings {
    pub fn center(&self) -> Pos2 {
        Pos2::new(self.width / 2.0, self.height / 2.0)
    }
}

// =============================================================================
// FORCE SIMULATION
// =============================================================================

/// Force-directed layout simulation
///
/// Each tick:
/// - `alpha += (alpha_target - alpha) * alpha_decay`
/// - every force is applied with the current alpha
/// - free nodes integrate velocity (damped by `velocity_decay`), pinned
///   nodes snap to `fx`/`fy` with zero velocity
#[derive(Debug)]
pub struct ForceSimulation {
    /// Nodes in the simulation
    nodes: Vec<SimNode>,

    /// Quick lookup by ID
    node_index: HashMap<String, usize>,

    /// Named forces, applied in insertion order
    forces: Vec<(String, Box<dyn Force>)>,

    alpha: f32,
    alpha_min: f32,
    alpha_decay: f32,
    alpha_target: f32,
    velocity_decay: f32,

    /// Is the per-frame stepping scheduled?
    running: bool,

    ticks: u64,
}

impl ForceSimulation {
    /// Create a simulation over `nodes` with no forces
    pub fn new(nodes: impl IntoIterator<Item = SimNode>) -> Self {
        let alpha_min = 0.001_f32;
        let mut sim = Self {
            nodes: nodes.into_iter().collect(),
            node_index: HashMap::new(),
            forces: Vec::new(),
            alpha: 1.0,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            alpha_target: 0.0,
            velocity_decay: 0.4,
            running: true,
            ticks: 0,
        };
        sim.initialize_nodes();
        sim
    }

    /// Standard composition: link (keyed by node id), many-body, center.
    pub fn from_graph(data: &GraphData, settings: &ForceSettings) -> Self {
        let nodes = data.nodes.iter().map(|n| SimNode::new(n.id.clone()));
        let links = data
            .edges
            .iter()
            .map(|e| SimLink::new(e.id.clone(), e.source.clone(), e.target.clone()))
            .collect();

        let sim = Self::new(nodes)
            .with_force(
                "link",
                LinkForce::new(links).with_distance(settings.link_distance),
            )
            .with_force("charge", ManyBodyForce::new(settings.charge_strength))
            .with_force("center", CenterForce::new(settings.center()));

        tracing::debug!(
            nodes = sim.len(),
            edges = data.edges.len(),
            "force simulation created"
        );
        sim
    }

    /// Builder: add or replace a named force
    pub fn with_force(mut self, name: impl Into<String>, force: impl Force + 'static) -> Self {
        self.set_force(name, force);
        self
    }

    /// Add or replace a named force
    pub fn set_force(&mut self, name: impl Into<String>, force: impl Force + 'static) {
        let name = name.into();
        let mut force: Box<dyn Force> = Box::new(force);
        force.initialize(&self.nodes);
        if let Some(slot) = self.forces.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = force;
        } else {
            self.forces.push((name, force));
        }
    }

    /// Remove a named force
    pub fn remove_force(&mut self, name: &str) {
        self.forces.retain(|(n, _)| n != name);
    }

    /// Place nodes lacking a position on a phyllotaxis spiral
    fn initialize_nodes(&mut self) {
        let initial_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
        self.node_index.clear();
        for (i, node) in self.nodes.iter_mut().enumerate() {
            node.index = i;
            if let Some(fx) = node.fx {
                node.x = fx;
            }
            if let Some(fy) = node.fy {
                node.y = fy;
            }
            if node.x.is_nan() || node.y.is_nan() {
                let radius = INITIAL_RADIUS * (0.5 + i as f32).sqrt();
                let angle = i as f32 * initial_angle;
                node.x = radius * angle.cos();
                node.y = radius * angle.sin();
            }
            if node.vx.is_nan() || node.vy.is_nan() {
                node.vx = 0.0;
                node.vy = 0.0;
            }
            self.node_index.insert(node.id.clone(), i);
        }
    }

    // =========================================================================
    // STEPPING
    // =========================================================================

    /// Run exactly one simulation step, regardless of `running`
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

        for (_, force) in self.forces.iter_mut() {
            force.apply(&mut self.nodes, self.alpha);
        }

        let keep = 1.0 - self.velocity_decay;
        for node in self.nodes.iter_mut() {
            match node.fx {
                Some(fx) => {
                    node.x = fx;
                    node.vx = 0.0;
                }
                None => {
                    node.vx *= keep;
                    node.x += node.vx;
                }
            }
            match node.fy {
                Some(fy) => {
                    node.y = fy;
                    node.vy = 0.0;
                }
                None => {
                    node.vy *= keep;
                    node.y += node.vy;
                }
            }
        }
        self.ticks += 1;
    }

    /// Frame callback: step once if scheduled, and unschedule once cooled.
    ///
    /// Returns whether another frame is needed.
    pub fn advance(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.tick();
        if self.alpha < self.alpha_min {
            self.running = false;
            tracing::debug!(ticks = self.ticks, "force simulation cooled");
        }
        self.running
    }

    /// Schedule stepping again (does not reset alpha)
    pub fn restart(&mut self) {
        self.running = true;
    }

    /// Cancel per-frame stepping
    pub fn stop(&mut self) {
        if self.running {
            tracing::debug!(ticks = self.ticks, "force simulation stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Raise the target energy and resume stepping
    pub fn reheat(&mut self, alpha_target: f32) {
        self.alpha_target = alpha_target;
        self.restart();
    }

    /// Let the energy decay back toward zero
    pub fn cool(&mut self) {
        self.alpha_target = 0.0;
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn alpha_min(&self) -> f32 {
        self.alpha_min
    }

    /// Number of steps taken so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    // =========================================================================
    // NODES
    // =========================================================================

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&SimNode> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx])
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut SimNode> {
        self.node_index
            .get(id)
            .copied()
            .map(|idx| &mut self.nodes[idx])
    }

    pub fn position(&self, id: &str) -> Option<Pos2> {
        self.node(id).map(SimNode::position)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // =========================================================================
    // PINNING (for drag)
    // =========================================================================

    /// Fix a node at `pos`; physics stops moving it
    pub fn pin(&mut self, id: &str, pos: Pos2) {
        if let Some(node) = self.node_mut(id) {
            node.fx = Some(pos.x);
            node.fy = Some(pos.y);
        }
    }

    /// Release a fixed node back to physics
    pub fn unpin(&mut self, id: &str) {
        if let Some(node) = self.node_mut(id) {
            node.fx = None;
            node.fy = None;
        }
    }

    // =========================================================================
    // HIT TESTING
    // =========================================================================

    /// Topmost node whose circle of `radius` contains `pos`
    pub fn node_at(&self, pos: Pos2, radius: f32) -> Option<&SimNode> {
        self.nodes
            .iter()
            .rev()
            .find(|n| (pos - n.position()).length() <= radius)
    }
}

// =============================================================================
// TESTS
// =============================================================================
