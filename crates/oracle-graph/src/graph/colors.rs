//! Color palette for the threat model graph
//!
//! Node fills are keyed by technical asset type; anything unrecognised
//! gets the neutral "other" fill.

use egui::Color32;
use oracle_types::{NodeCategory, TechnicalAssetType};

pub const EDGE_COLOR: Color32 = Color32::from_rgb(153, 153, 153);
pub const EDGE_SELECTED: Color32 = Color32::from_rgb(59, 130, 246);
pub const LABEL_COLOR: Color32 = Color32::from_rgb(51, 51, 51);
pub const EDGE_LABEL_COLOR: Color32 = Color32::from_rgb(102, 102, 102);
pub const NODE_STROKE: Color32 = Color32::WHITE;
pub const SELECTED_STROKE: Color32 = Color32::from_rgb(234, 88, 12);
pub const MUTED_TEXT: Color32 = Color32::from_rgb(107, 114, 128);

// =============================================================================
// NODE COLORS
// =============================================================================

/// Resolve a raw node type tag back to the asset enum
pub fn asset_type_of(node_type: &str) -> Option<TechnicalAssetType> {
    TechnicalAssetType::all()
        .iter()
        .copied()
        .find(|t| t.as_str() == node_type)
}

pub fn asset_type_fill(asset_type: TechnicalAssetType) -> Color32 {
    match asset_type {
        TechnicalAssetType::Server => Color32::from_rgb(66, 133, 244), // Blue
        TechnicalAssetType::Application => Color32::from_rgb(52, 168, 83), // Green
        TechnicalAssetType::Database => Color32::from_rgb(234, 67, 53), // Red
        TechnicalAssetType::Container => Color32::from_rgb(0, 172, 193), // Cyan
        TechnicalAssetType::Api => Color32::from_rgb(171, 71, 188),    // Purple
        TechnicalAssetType::Service => Color32::from_rgb(251, 188, 5), // Amber
        TechnicalAssetType::NetworkDevice => Color32::from_rgb(121, 85, 72), // Brown
        TechnicalAssetType::Other => Color32::from_rgb(158, 158, 158), // Gray
    }
}

/// Fill for a graph node given its raw type tag
pub fn node_fill(node_type: &str) -> Color32 {
    asset_type_of(node_type)
        .map(asset_type_fill)
        .unwrap_or_else(|| asset_type_fill(TechnicalAssetType::Other))
}

/// Badge color for the popup category line
pub fn category_color(category: NodeCategory) -> Color32 {
    match category {
        NodeCategory::Technical => Color32::from_rgb(66, 133, 244),
        NodeCategory::Data => Color32::from_rgb(52, 168, 83),
        NodeCategory::Trust => Color32::from_rgb(234, 88, 12),
    }
}

/// Types shown in the legend
pub fn legend() -> [(TechnicalAssetType, &'static str); 4] {
    [
        (TechnicalAssetType::Server, "Server"),
        (TechnicalAssetType::Application, "Application"),
        (TechnicalAssetType::Database, "Database"),
        (TechnicalAssetType::Service, "Service"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_asset_type_round_trips() {
        for t in TechnicalAssetType::all() {
            assert_eq!(asset_type_of(t.as_str()), Some(*t));
        }
    }

    #[test]
    fn test_unknown_type_gets_other_fill() {
        assert_eq!(
            node_fill("widget"),
            asset_type_fill(TechnicalAssetType::Other)
        );
        assert_ne!(node_fill("database"), node_fill("server"));
    }
}
