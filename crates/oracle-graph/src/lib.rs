//! Threat Oracle Graph Widget
//!
//! This crate contains ONLY the graph widget - no store, no app shell.
//! The host owns the model store and routes the navigation intents the
//! widget emits.

pub mod graph;

pub use graph::{
    project,
    project_current,
    // Popups
    AssetPopupData,
    // Simulation
    CenterForce,
    DragController,
    EdgePopupData,
    Force,
    ForceSettings,
    ForceSimulation,
    // Widget
    GraphSettings,
    LinkForce,
    ManyBodyForce,
    PopupAction,
    SelectedNode,
    Selection,
    SimLink,
    SimNode,
    ThreatGraphWidget,
    TickGeometry,
};
