//! Threat Oracle
//!
//! An in-memory threat-model store and the pieces around it:
//!
//! - [`store`] - the model list, the current-model selector, typed patches,
//!   id generation and change events
//! - [`interchange`] - JSON export and validated import
//! - [`integrity`] - read-only report of dangling references
//! - [`sample`] - the bundled demonstration model
//! - [`config`] / [`telemetry`] - YAML + environment configuration and
//!   `tracing` setup
//!
//! Records live in `oracle-types`; the force-directed graph view lives in
//! `oracle-graph`. Both are re-exported.
//!
//! ```ignore
//! use threat_oracle::{ModelStore, ThreatGraphWidget};
//!
//! let mut store = ModelStore::with_sample();
//! let mut graph = ThreatGraphWidget::default();
//!
//! // inside an egui frame
//! if let Some(intent) = graph.ui(ui, store.current_model().as_deref()) {
//!     router.push(intent.route());
//! }
//! ```

pub mod config;
pub mod error;
pub mod integrity;
pub mod interchange;
pub mod sample;
pub mod store;
pub mod telemetry;

pub use oracle_graph;
pub use oracle_types;

pub use config::OracleConfig;
pub use error::{ConfigError, ImportError, InterchangeError};
pub use integrity::{check_references, is_consistent, ReferenceIssue, UNKNOWN_ASSET};
pub use interchange::{export_file_name, export_json, parse_import, write_export};
pub use oracle_graph::{project, project_current, GraphSettings, ThreatGraphWidget};
pub use oracle_types::{
    DataAsset, DataFlow, EntityKind, NavigationIntent, NewModel, TechnicalAsset, ThreatModel,
    TrustBoundary,
};
pub use sample::sample_model;
pub use store::{
    Confirm, DataAssetPatch, DataFlowPatch, IdStrategy, ModelPatch, ModelStore, StoreEvent,
    TechnicalAssetPatch, TrustBoundaryPatch,
};
pub use telemetry::init_tracing;
