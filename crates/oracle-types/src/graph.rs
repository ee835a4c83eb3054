//! Graph Projection Types
//!
//! The minimal node/edge shapes the graph widget consumes, the category a
//! node is classified into, and the navigation contract emitted on
//! drill-down. These are DATA CONTRACTS only - no egui, no simulation.

use serde::{Deserialize, Serialize};

use crate::model::{TechnicalAssetType, TrustBoundaryType};

// ============================================================================
// NODES AND EDGES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    /// Raw type tag of the underlying record (e.g. `"database"`).
    #[serde(rename = "type")]
    pub node_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    /// Source node id
    pub source: String,
    /// Target node id
    pub target: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphData {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.iter().find(|e| e.id == id)
    }
}

// ============================================================================
// NODE CATEGORY
// ============================================================================

const TECHNICAL_KEYWORDS: &[&str] = &[
    "server",
    "application",
    "database",
    "container",
    "api",
    "service",
    "network_device",
];

const TRUST_KEYWORDS: &[&str] = &[
    "network_segment",
    "security_zone",
    "organizational_boundary",
    "physical_boundary",
];

/// Which editor a graph node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    #[default]
    Technical,
    Data,
    Trust,
}

impl NodeCategory {
    /// Classify a raw type tag by substring membership.
    ///
    /// Technical keywords are tested first, then trust keywords; anything
    /// else falls back to [`NodeCategory::Technical`].
    pub fn classify(node_type: &str) -> Self {
        if TECHNICAL_KEYWORDS.iter().any(|k| node_type.contains(k)) {
            NodeCategory::Technical
        } else if TRUST_KEYWORDS.iter().any(|k| node_type.contains(k)) {
            NodeCategory::Trust
        } else {
            NodeCategory::Technical
        }
    }

    pub fn for_asset_type(asset_type: TechnicalAssetType) -> Self {
        match asset_type {
            TechnicalAssetType::Server
            | TechnicalAssetType::Application
            | TechnicalAssetType::Database
            | TechnicalAssetType::Container
            | TechnicalAssetType::Api
            | TechnicalAssetType::Service
            | TechnicalAssetType::NetworkDevice => NodeCategory::Technical,
            TechnicalAssetType::Other => NodeCategory::Technical,
        }
    }

    pub fn for_boundary_type(boundary_type: TrustBoundaryType) -> Self {
        match boundary_type {
            TrustBoundaryType::NetworkSegment
            | TrustBoundaryType::SecurityZone
            | TrustBoundaryType::OrganizationalBoundary
            | TrustBoundaryType::PhysicalBoundary => NodeCategory::Trust,
            TrustBoundaryType::Other => NodeCategory::Technical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeCategory::Technical => "technical",
            NodeCategory::Data => "data",
            NodeCategory::Trust => "trust",
        }
    }

    pub fn destination(&self) -> Destination {
        match self {
            NodeCategory::Technical => Destination::TechnicalAssets,
            NodeCategory::Data => Destination::DataAssets,
            NodeCategory::Trust => Destination::TrustBoundaries,
        }
    }
}

// ============================================================================
// NAVIGATION
// ============================================================================

/// Editor page a drill-down navigates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Destination {
    TechnicalAssets,
    DataAssets,
    TrustBoundaries,
    DataFlows,
}

impl Destination {
    pub fn path(&self) -> &'static str {
        match self {
            Destination::TechnicalAssets => "/technical-assets",
            Destination::DataAssets => "/data-assets",
            Destination::TrustBoundaries => "/trust-boundaries",
            Destination::DataFlows => "/data-flows",
        }
    }
}

/// Emitted to the surrounding router when the user drills into an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationIntent {
    pub destination: Destination,
    pub entity_id: String,
}

impl NavigationIntent {
    pub fn new(destination: Destination, entity_id: impl Into<String>) -> Self {
        Self {
            destination,
            entity_id: entity_id.into(),
        }
    }

    /// Router path with the entity id as the `id` query parameter.
    pub fn route(&self) -> String {
        format!("{}?id={}", self.destination.path(), self.entity_id)
    }
}
