//! Model -> graph projection
//!
//! Technical assets become nodes, data flows become edges labelled with the
//! upper-cased protocol. Flow endpoints are copied as-is; dangling ones are
//! dealt with by the simulation and geometry layers.

use oracle_types::{GraphData, GraphEdge, GraphNode, ThreatModel};

pub fn project(model: &ThreatModel) -> GraphData {
    let nodes = model
        .technical_assets
        .iter()
        .map(|asset| GraphNode {
            id: asset.id.clone(),
            name: asset.name.clone(),
            node_type: asset.asset_type.as_str().to_string(),
        })
        .collect();

    let edges = model
        .data_flows
        .iter()
        .map(|flow| GraphEdge {
            id: flow.id.clone(),
            source: flow.source_id.clone(),
            target: flow.target_id.clone(),
            label: flow.protocol.label(),
        })
        .collect();

    GraphData { nodes, edges }
}

/// Projection of the current model, empty when there is none
pub fn project_current(model: Option<&ThreatModel>) -> GraphData {
    model.map(project).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use oracle_types::{DataFlow, Protocol, TechnicalAsset, TechnicalAssetType};

    fn model() -> ThreatModel {
        let mut web = TechnicalAsset::new("Web", TechnicalAssetType::Server);
        web.id = "ta-1".into();
        let mut db = TechnicalAsset::new("DB", TechnicalAssetType::NetworkDevice);
        db.id = "ta-2".into();
        let mut flow = DataFlow::new("ta-1", "ta-2", Protocol::Https);
        flow.id = "df-1".into();

        ThreatModel {
            id: "model-1".into(),
            name: "Test".into(),
            description: None,
            version: "1.0".into(),
            created: Utc::now(),
            updated: Utc::now(),
            technical_assets: vec![web, db],
            trust_boundaries: Vec::new(),
            data_flows: vec![flow],
            data_assets: Vec::new(),
        }
    }

    #[test]
    fn test_project_nodes_and_edges() {
        let data = project(&model());
        assert_eq!(data.nodes.len(), 2);
        assert_eq!(data.nodes[1].node_type, "network_device");
        assert_eq!(data.edges.len(), 1);
        assert_eq!(data.edges[0].label, "HTTPS");
        assert_eq!(data.edges[0].source, "ta-1");
        assert_eq!(data.edges[0].target, "ta-2");
    }

    #[test]
    fn test_project_current_without_model_is_empty() {
        assert!(project_current(None).is_empty());
        assert!(project_current(None).edges.is_empty());
        assert_eq!(project_current(Some(&model())).nodes.len(), 2);
    }
}
