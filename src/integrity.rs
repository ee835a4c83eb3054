//! Dangling reference report
//!
//! References between records are never enforced by the store. This module
//! lists the ones that point nowhere so a caller can surface them; it never
//! rejects anything.

use std::collections::HashSet;
use std::fmt;

use oracle_types::{EntityKind, ThreatModel};
use serde::Serialize;

/// Display fallback for a missing technical asset
pub const UNKNOWN_ASSET: &str = "Unknown Asset";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceIssue {
    /// Kind of the record holding the reference
    pub kind: EntityKind,
    pub entity_id: String,
    /// Field holding the reference (`source_id`, `stored_in`, ...)
    pub field: &'static str,
    /// The id that does not resolve
    pub missing_id: String,
}

impl fmt::Display for ReferenceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} references missing {}",
            self.kind.display_name(),
            self.entity_id,
            self.field,
            self.missing_id
        )
    }
}

struct Ids<'a> {
    assets: HashSet<&'a str>,
    boundaries: HashSet<&'a str>,
    flows: HashSet<&'a str>,
    data: HashSet<&'a str>,
}

impl<'a> Ids<'a> {
    fn of(model: &'a ThreatModel) -> Self {
        Self {
            assets: model.technical_assets.iter().map(|a| a.id.as_str()).collect(),
            boundaries: model.trust_boundaries.iter().map(|b| b.id.as_str()).collect(),
            flows: model.data_flows.iter().map(|f| f.id.as_str()).collect(),
            data: model.data_assets.iter().map(|d| d.id.as_str()).collect(),
        }
    }
}

/// Every reference in `model` that does not resolve, in collection order
pub fn check_references(model: &ThreatModel) -> Vec<ReferenceIssue> {
    let ids = Ids::of(model);
    let mut issues = Vec::new();

    for flow in &model.data_flows {
        let kind = EntityKind::DataFlow;
        check(&mut issues, kind, &flow.id, "source_id", &flow.source_id, &ids.assets);
        check(&mut issues, kind, &flow.id, "target_id", &flow.target_id, &ids.assets);
        if let Some(boundary) = &flow.trust_boundary_id {
            check(&mut issues, kind, &flow.id, "trust_boundary_id", boundary, &ids.boundaries);
        }
        for data in &flow.data_assets {
            check(&mut issues, kind, &flow.id, "data_assets", data, &ids.data);
        }
    }

    for asset in &model.data_assets {
        let kind = EntityKind::DataAsset;
        for target in &asset.stored_in {
            check(&mut issues, kind, &asset.id, "stored_in", target, &ids.assets);
        }
        for target in &asset.processed_by {
            check(&mut issues, kind, &asset.id, "processed_by", target, &ids.assets);
        }
        for target in &asset.transmitted_in {
            check(&mut issues, kind, &asset.id, "transmitted_in", target, &ids.flows);
        }
    }

    issues
}

fn check(
    issues: &mut Vec<ReferenceIssue>,
    kind: EntityKind,
    entity_id: &str,
    field: &'static str,
    target: &str,
    known: &HashSet<&str>,
) {
    if !known.contains(target) {
        issues.push(ReferenceIssue {
            kind,
            entity_id: entity_id.to_string(),
            field,
            missing_id: target.to_string(),
        });
    }
}

pub fn is_consistent(model: &ThreatModel) -> bool {
    check_references(model).is_empty()
}

/// Technical asset name for display, or [`UNKNOWN_ASSET`]
pub fn asset_name<'a>(model: &'a ThreatModel, id: &str) -> &'a str {
    model
        .technical_asset(id)
        .map(|a| a.name.as_str())
        .unwrap_or(UNKNOWN_ASSET)
}
