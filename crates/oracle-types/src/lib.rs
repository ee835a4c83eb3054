//! Shared Types for Threat Oracle
//!
//! This crate is the SINGLE SOURCE OF TRUTH for every record that crosses a
//! component boundary: the model store, the graph widget and the JSON
//! interchange format all speak these types.
//!
//! ## Boundaries
//!
//! ```text
//! ┌──────────────────┐  Arc<ThreatModel>  ┌──────────────────┐
//! │  ModelStore      │ ─────────────────► │  Graph widget    │
//! │  (threat-oracle) │                    │  (oracle-graph)  │
//! └──────────────────┘                    └──────────────────┘
//!          │  JSON (export / import)
//!          ▼
//! ```
//!
//! ## Rules
//!
//! 1. Plain data only - no egui, no store logic
//! 2. Entity fields serialize snake_case, model collections camelCase
//! 3. Reference fields are plain string ids and are never validated here

pub mod graph;
pub mod model;

pub use graph::*;
pub use model::*;
