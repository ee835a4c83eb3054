//! Partial updates
//!
//! A patch is a shallow merge: every `Some` field overwrites the target,
//! `None` leaves it alone. Optional record fields take `Option<Option<T>>`
//! so `Some(None)` clears them. Ids are never patchable.

use oracle_types::{
    AuthenticationMethod, Classification, DataAsset, DataAssetType, DataFlow,
    EncryptionRequirement, Level, Medium, Metadata, Protocol, SecurityLevel, TechnicalAsset,
    TechnicalAssetType, ThreatModel, TrustBoundary, TrustBoundaryType,
};

/// A partial update for records of type `T`
pub trait Patch<T> {
    fn apply(self, target: &mut T);
}

macro_rules! merge {
    ($patch:ident => $target:ident { $($field:ident),* $(,)? }) => {
        $(
            if let Some(value) = $patch.$field {
                $target.$field = value;
            }
        )*
    };
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TechnicalAssetPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub asset_type: Option<TechnicalAssetType>,
    pub owner: Option<Option<String>>,
    pub criticality: Option<Level>,
    pub technology_stack: Option<Vec<String>>,
    pub version: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub metadata: Option<Metadata>,
}

impl Patch<TechnicalAsset> for TechnicalAssetPatch {
    fn apply(self, target: &mut TechnicalAsset) {
        let patch = self;
        merge!(patch => target {
            name, description, asset_type, owner, criticality,
            technology_stack, version, tags, metadata,
        });
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrustBoundaryPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub boundary_type: Option<TrustBoundaryType>,
    pub security_level: Option<SecurityLevel>,
    pub owner: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub metadata: Option<Metadata>,
}

impl Patch<TrustBoundary> for TrustBoundaryPatch {
    fn apply(self, target: &mut TrustBoundary) {
        let patch = self;
        merge!(patch => target {
            name, description, boundary_type, security_level, owner, tags, metadata,
        });
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFlowPatch {
    pub name: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub source_id: Option<String>,
    pub target_id: Option<String>,
    pub protocol: Option<Protocol>,
    pub port: Option<Option<u16>>,
    pub is_encrypted: Option<bool>,
    pub authentication_method: Option<AuthenticationMethod>,
    pub data_assets: Option<Vec<String>>,
    pub crosses_trust_boundary: Option<bool>,
    pub trust_boundary_id: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub metadata: Option<Metadata>,
}

impl Patch<DataFlow> for DataFlowPatch {
    fn apply(self, target: &mut DataFlow) {
        let patch = self;
        merge!(patch => target {
            name, description, source_id, target_id, protocol, port, is_encrypted,
            authentication_method, data_assets, crosses_trust_boundary,
            trust_boundary_id, tags, metadata,
        });
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataAssetPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub asset_type: Option<DataAssetType>,
    pub medium: Option<Medium>,
    pub classification: Option<Classification>,
    pub format: Option<Option<String>>,
    pub volume: Option<Option<String>>,
    pub owner: Option<Option<String>>,
    pub retention_period: Option<Option<String>>,
    pub regulatory_requirements: Option<Vec<String>>,
    pub encryption_requirements: Option<Option<EncryptionRequirement>>,
    pub integrity_requirements: Option<Option<Level>>,
    pub availability_requirements: Option<Option<Level>>,
    pub stored_in: Option<Vec<String>>,
    pub processed_by: Option<Vec<String>>,
    pub transmitted_in: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub metadata: Option<Metadata>,
}

impl Patch<DataAsset> for DataAssetPatch {
    fn apply(self, target: &mut DataAsset) {
        let patch = self;
        merge!(patch => target {
            name, description, asset_type, medium, classification, format, volume,
            owner, retention_period, regulatory_requirements, encryption_requirements,
            integrity_requirements, availability_requirements, stored_in,
            processed_by, transmitted_in, tags, metadata,
        });
    }
}

/// Model-level update; may also replace whole collections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub version: Option<String>,
    pub technical_assets: Option<Vec<TechnicalAsset>>,
    pub trust_boundaries: Option<Vec<TrustBoundary>>,
    pub data_flows: Option<Vec<DataFlow>>,
    pub data_assets: Option<Vec<DataAsset>>,
}

impl ModelPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl Patch<ThreatModel> for ModelPatch {
    fn apply(self, target: &mut ThreatModel) {
        let patch = self;
        merge!(patch => target {
            name, description, version, technical_assets, trust_boundaries,
            data_flows, data_assets,
        });
    }
}
