//! End-to-end walk through the sample model: store -> projection -> widget
//! -> popup -> drill-down.

use egui::Pos2;
use threat_oracle::oracle_graph::{AssetPopupData, EdgePopupData};
use threat_oracle::oracle_types::{Destination, NodeCategory};
use threat_oracle::{project, ModelStore, StoreEvent, TechnicalAsset, ThreatGraphWidget};

fn settled_widget(store: &ModelStore) -> ThreatGraphWidget {
    let mut widget = ThreatGraphWidget::default();
    let model = store.current_model();
    assert!(widget.sync(model.as_deref()));
    for _ in 0..400 {
        if !widget.step() {
            break;
        }
    }
    widget
}

fn center_of(widget: &ThreatGraphWidget, id: &str) -> Pos2 {
    widget
        .geometry()
        .nodes
        .iter()
        .find(|n| n.id == id)
        .map(|n| n.center)
        .unwrap()
}

#[test]
fn test_sample_projects_to_four_nodes_three_edges() {
    let store = ModelStore::with_sample();
    let graph = project(&store.current_model().unwrap());

    assert_eq!(graph.nodes.len(), 4);
    assert_eq!(graph.edges.len(), 3);
    let labels: Vec<_> = graph.edges.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["HTTPS", "TCP", "HTTPS"]);
}

#[test]
fn test_click_database_server_shows_related_records() {
    let store = ModelStore::with_sample();
    let model = store.current_model().unwrap();
    let mut widget = settled_widget(&store);

    let center = center_of(&widget, "ta-003");
    widget.click(center, center);

    let selected = widget.selection().node().cloned().unwrap();
    assert_eq!(selected.id, "ta-003");
    assert_eq!(selected.category, NodeCategory::Technical);

    let popup = AssetPopupData::build(&model, &selected.id, selected.category).unwrap();
    assert_eq!(popup.name, "Database Server");
    let flows: Vec<_> = popup.related_flows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(flows, vec!["df-002"]);
    let data: Vec<_> = popup
        .related_data_assets
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(data, vec!["da-001"]);

    let intent = widget.drill_down().unwrap();
    assert_eq!(intent.destination, Destination::TechnicalAssets);
    assert_eq!(intent.route(), "/technical-assets?id=ta-003");
    assert!(!widget.selection().is_open());
}

#[test]
fn test_edge_popup_after_endpoint_deleted() {
    let mut store = ModelStore::with_sample();
    assert!(store.delete_technical_asset("ta-003"));
    let model = store.current_model().unwrap();

    let popup = EdgePopupData::build(&model, "df-002").unwrap();
    assert_eq!(popup.title, "App to DB Traffic");
    assert_eq!(popup.target, "Unknown");
    assert!(!threat_oracle::is_consistent(&model));
}

#[test]
fn test_widget_follows_store_changes() {
    let mut store = ModelStore::with_sample();
    let events = store.subscribe();
    let mut widget = settled_widget(&store);

    let id = store
        .add_technical_asset(TechnicalAsset::new(
            "Cache",
            threat_oracle::oracle_types::TechnicalAssetType::Service,
        ))
        .unwrap();
    assert!(matches!(
        events.try_recv().unwrap(),
        StoreEvent::EntityAdded { ref entity_id, .. } if *entity_id == id
    ));

    let model = store.current_model();
    assert!(widget.sync(model.as_deref()));
    assert_eq!(widget.data().nodes.len(), 5);
    assert!(widget.is_animating());
    assert!(!widget.sync(model.as_deref()));
}

#[test]
fn test_dragging_reheats_until_release() {
    let store = ModelStore::with_sample();
    let mut widget = settled_widget(&store);
    assert!(!widget.is_animating());

    let center = center_of(&widget, "ta-001");
    assert_eq!(widget.drag_start(center).as_deref(), Some("ta-001"));
    let target = center + egui::vec2(40.0, -25.0);
    widget.drag_move(target);
    assert!(widget.step());
    assert_eq!(center_of(&widget, "ta-001"), target);

    widget.drag_end();
    assert!(widget.simulation().unwrap().alpha_target() == 0.0);
}
