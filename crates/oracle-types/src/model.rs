//! Threat model records
//!
//! A [`ThreatModel`] exclusively owns four entity collections. Child records
//! have no lifecycle of their own; ids are unique only within the owning
//! collection.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-form metadata attached to every entity.
pub type Metadata = BTreeMap<String, serde_json::Value>;

// ============================================================================
// ENTITY KIND
// ============================================================================

/// The four child collections of a threat model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    TechnicalAsset,
    TrustBoundary,
    DataFlow,
    DataAsset,
}

impl EntityKind {
    /// Id prefix used when the store synthesizes a new id.
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::TechnicalAsset => "ta",
            EntityKind::TrustBoundary => "tb",
            EntityKind::DataFlow => "df",
            EntityKind::DataAsset => "da",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EntityKind::TechnicalAsset => "Technical Asset",
            EntityKind::TrustBoundary => "Trust Boundary",
            EntityKind::DataFlow => "Data Flow",
            EntityKind::DataAsset => "Data Asset",
        }
    }
}

/// A record owned by one of the four collections of a [`ThreatModel`].
///
/// The store is generic over this trait so the add/update/delete rules are
/// written once for all four kinds.
pub trait Entity: Clone {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    fn collection(model: &ThreatModel) -> &[Self];

    fn collection_mut(model: &mut ThreatModel) -> &mut Vec<Self>;
}

// ============================================================================
// THREAT MODEL
// ============================================================================

/// The unit of ownership: one threat model and its four collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatModel {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(rename = "technicalAssets", default)]
    pub technical_assets: Vec<TechnicalAsset>,
    #[serde(rename = "trustBoundaries", default)]
    pub trust_boundaries: Vec<TrustBoundary>,
    #[serde(rename = "dataFlows", default)]
    pub data_flows: Vec<DataFlow>,
    #[serde(rename = "dataAssets", default)]
    pub data_assets: Vec<DataAsset>,
}

impl ThreatModel {
    pub fn technical_asset(&self, id: &str) -> Option<&TechnicalAsset> {
        self.technical_assets.iter().find(|a| a.id == id)
    }

    pub fn trust_boundary(&self, id: &str) -> Option<&TrustBoundary> {
        self.trust_boundaries.iter().find(|b| b.id == id)
    }

    pub fn data_flow(&self, id: &str) -> Option<&DataFlow> {
        self.data_flows.iter().find(|f| f.id == id)
    }

    pub fn data_asset(&self, id: &str) -> Option<&DataAsset> {
        self.data_assets.iter().find(|a| a.id == id)
    }

    /// Total number of child records across all four collections.
    pub fn entity_count(&self) -> usize {
        self.technical_assets.len()
            + self.trust_boundaries.len()
            + self.data_flows.len()
            + self.data_assets.len()
    }
}

/// Model fields supplied by a caller; the store assigns id and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewModel {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: String,
    #[serde(rename = "technicalAssets", default)]
    pub technical_assets: Vec<TechnicalAsset>,
    #[serde(rename = "trustBoundaries", default)]
    pub trust_boundaries: Vec<TrustBoundary>,
    #[serde(rename = "dataFlows", default)]
    pub data_flows: Vec<DataFlow>,
    #[serde(rename = "dataAssets", default)]
    pub data_assets: Vec<DataAsset>,
}

impl NewModel {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ============================================================================
// SHARED LEVELS
// ============================================================================

/// Four-step ordinal used for criticality and integrity/availability needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
            Level::Critical => "critical",
        }
    }
}

// ============================================================================
// TECHNICAL ASSET
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechnicalAssetType {
    Server,
    Application,
    Database,
    Container,
    Api,
    Service,
    NetworkDevice,
    Other,
}

impl TechnicalAssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TechnicalAssetType::Server => "server",
            TechnicalAssetType::Application => "application",
            TechnicalAssetType::Database => "database",
            TechnicalAssetType::Container => "container",
            TechnicalAssetType::Api => "api",
            TechnicalAssetType::Service => "service",
            TechnicalAssetType::NetworkDevice => "network_device",
            TechnicalAssetType::Other => "other",
        }
    }

    pub fn all() -> &'static [TechnicalAssetType] {
        &[
            TechnicalAssetType::Server,
            TechnicalAssetType::Application,
            TechnicalAssetType::Database,
            TechnicalAssetType::Container,
            TechnicalAssetType::Api,
            TechnicalAssetType::Service,
            TechnicalAssetType::NetworkDevice,
            TechnicalAssetType::Other,
        ]
    }
}

/// A system component: server, application, database, etc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalAsset {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub asset_type: TechnicalAssetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub criticality: Level,
    #[serde(default)]
    pub technology_stack: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl TechnicalAsset {
    /// Build a draft with an empty id; the store assigns the real one.
    pub fn new(name: impl Into<String>, asset_type: TechnicalAssetType) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            description: None,
            asset_type,
            owner: None,
            criticality: Level::default(),
            technology_stack: Vec::new(),
            version: None,
            tags: Vec::new(),
            metadata: Metadata::new(),
        }
    }
}

impl Entity for TechnicalAsset {
    const KIND: EntityKind = EntityKind::TechnicalAsset;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn collection(model: &ThreatModel) -> &[Self] {
        &model.technical_assets
    }

    fn collection_mut(model: &mut ThreatModel) -> &mut Vec<Self> {
        &mut model.technical_assets
    }
}

// ============================================================================
// TRUST BOUNDARY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustBoundaryType {
    NetworkSegment,
    SecurityZone,
    OrganizationalBoundary,
    PhysicalBoundary,
    Other,
}

impl TrustBoundaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrustBoundaryType::NetworkSegment => "network_segment",
            TrustBoundaryType::SecurityZone => "security_zone",
            TrustBoundaryType::OrganizationalBoundary => "organizational_boundary",
            TrustBoundaryType::PhysicalBoundary => "physical_boundary",
            TrustBoundaryType::Other => "other",
        }
    }

    pub fn all() -> &'static [TrustBoundaryType] {
        &[
            TrustBoundaryType::NetworkSegment,
            TrustBoundaryType::SecurityZone,
            TrustBoundaryType::OrganizationalBoundary,
            TrustBoundaryType::PhysicalBoundary,
            TrustBoundaryType::Other,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    Public,
    Dmz,
    #[default]
    Internal,
    Restricted,
    HighlyRestricted,
}

impl SecurityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityLevel::Public => "public",
            SecurityLevel::Dmz => "dmz",
            SecurityLevel::Internal => "internal",
            SecurityLevel::Restricted => "restricted",
            SecurityLevel::HighlyRestricted => "highly_restricted",
        }
    }
}

/// A named security zone; flows that cross it are flagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustBoundary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub boundary_type: TrustBoundaryType,
    #[serde(default)]
    pub security_level: SecurityLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl TrustBoundary {
    pub fn new(name: impl Into<String>, boundary_type: TrustBoundaryType) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            description: None,
            boundary_type,
            security_level: SecurityLevel::default(),
            owner: None,
            tags: Vec::new(),
            metadata: Metadata::new(),
        }
    }
}

impl Entity for TrustBoundary {
    const KIND: EntityKind = EntityKind::TrustBoundary;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn collection(model: &ThreatModel) -> &[Self] {
        &model.trust_boundaries
    }

    fn collection_mut(model: &mut ThreatModel) -> &mut Vec<Self> {
        &mut model.trust_boundaries
    }
}

// ============================================================================
// DATA FLOW
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Http,
    Https,
    Tcp,
    Udp,
    Ssh,
    Ftp,
    Sftp,
    Smtp,
    Sql,
    Other,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Ssh => "ssh",
            Protocol::Ftp => "ftp",
            Protocol::Sftp => "sftp",
            Protocol::Smtp => "smtp",
            Protocol::Sql => "sql",
            Protocol::Other => "other",
        }
    }

    /// Upper-cased protocol name, used for edge labels ("HTTPS").
    pub fn label(&self) -> String {
        self.as_str().to_uppercase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationMethod {
    #[default]
    None,
    Basic,
    Token,
    Certificate,
    Oauth,
    Other,
}

impl AuthenticationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthenticationMethod::None => "none",
            AuthenticationMethod::Basic => "basic",
            AuthenticationMethod::Token => "token",
            AuthenticationMethod::Certificate => "certificate",
            AuthenticationMethod::Oauth => "oauth",
            AuthenticationMethod::Other => "other",
        }
    }
}

/// A directed edge between two technical assets.
///
/// `source_id`, `target_id`, `trust_boundary_id` and `data_assets` are
/// unchecked references; consumers render a missing target as "Unknown".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFlow {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub source_id: String,
    pub target_id: String,
    pub protocol: Protocol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default)]
    pub is_encrypted: bool,
    #[serde(default)]
    pub authentication_method: AuthenticationMethod,
    #[serde(default)]
    pub data_assets: Vec<String>,
    #[serde(default)]
    pub crosses_trust_boundary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_boundary_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl DataFlow {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        protocol: Protocol,
    ) -> Self {
        Self {
            id: String::new(),
            name: None,
            description: None,
            source_id: source_id.into(),
            target_id: target_id.into(),
            protocol,
            port: None,
            is_encrypted: false,
            authentication_method: AuthenticationMethod::default(),
            data_assets: Vec::new(),
            crosses_trust_boundary: false,
            trust_boundary_id: None,
            tags: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// Name shown in lists: the flow name, else `"<PROTOCOL> Flow (<id>)"`.
    pub fn list_label(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("{} Flow ({})", self.protocol.label(), self.id),
        }
    }

    /// Title shown in a detail view: the flow name, else `"<PROTOCOL> Flow"`.
    pub fn title(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("{} Flow", self.protocol.label()),
        }
    }

    pub fn touches(&self, asset_id: &str) -> bool {
        self.source_id == asset_id || self.target_id == asset_id
    }
}

impl Entity for DataFlow {
    const KIND: EntityKind = EntityKind::DataFlow;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn collection(model: &ThreatModel) -> &[Self] {
        &model.data_flows
    }

    fn collection_mut(model: &mut ThreatModel) -> &mut Vec<Self> {
        &mut model.data_flows
    }
}

// ============================================================================
// DATA ASSET
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataAssetType {
    Pii,
    Pfi,
    Phi,
    IntellectualProperty,
    AuthenticationData,
    Configuration,
    Logs,
    BusinessData,
    OperationalData,
    Other,
}

impl DataAssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataAssetType::Pii => "pii",
            DataAssetType::Pfi => "pfi",
            DataAssetType::Phi => "phi",
            DataAssetType::IntellectualProperty => "intellectual_property",
            DataAssetType::AuthenticationData => "authentication_data",
            DataAssetType::Configuration => "configuration",
            DataAssetType::Logs => "logs",
            DataAssetType::BusinessData => "business_data",
            DataAssetType::OperationalData => "operational_data",
            DataAssetType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Medium {
    #[default]
    Digital,
    Physical,
    Hybrid,
}

impl Medium {
    pub fn as_str(&self) -> &'static str {
        match self {
            Medium::Digital => "digital",
            Medium::Physical => "physical",
            Medium::Hybrid => "hybrid",
        }
    }
}

/// Six-level sensitivity ordinal, `Public < ... < TopSecret`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Public,
    #[default]
    Internal,
    Confidential,
    Restricted,
    Secret,
    TopSecret,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Public => "public",
            Classification::Internal => "internal",
            Classification::Confidential => "confidential",
            Classification::Restricted => "restricted",
            Classification::Secret => "secret",
            Classification::TopSecret => "top_secret",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionRequirement {
    None,
    InTransit,
    AtRest,
    Both,
    EndToEnd,
}

impl EncryptionRequirement {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncryptionRequirement::None => "none",
            EncryptionRequirement::InTransit => "in_transit",
            EncryptionRequirement::AtRest => "at_rest",
            EncryptionRequirement::Both => "both",
            EncryptionRequirement::EndToEnd => "end_to_end",
        }
    }
}

/// A unit of information, classified by sensitivity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataAsset {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub asset_type: DataAssetType,
    #[serde(default)]
    pub medium: Medium,
    #[serde(default)]
    pub classification: Classification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_period: Option<String>,
    #[serde(default)]
    pub regulatory_requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_requirements: Option<EncryptionRequirement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity_requirements: Option<Level>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_requirements: Option<Level>,
    #[serde(default)]
    pub stored_in: Vec<String>,
    #[serde(default)]
    pub processed_by: Vec<String>,
    #[serde(default)]
    pub transmitted_in: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl DataAsset {
    pub fn new(name: impl Into<String>, asset_type: DataAssetType) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            description: None,
            asset_type,
            medium: Medium::default(),
            classification: Classification::default(),
            format: None,
            volume: None,
            owner: None,
            retention_period: None,
            regulatory_requirements: Vec::new(),
            encryption_requirements: None,
            integrity_requirements: None,
            availability_requirements: None,
            stored_in: Vec::new(),
            processed_by: Vec::new(),
            transmitted_in: Vec::new(),
            tags: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// True when the asset is stored in or processed by the technical asset.
    pub fn resides_on(&self, asset_id: &str) -> bool {
        self.stored_in.iter().any(|id| id == asset_id)
            || self.processed_by.iter().any(|id| id == asset_id)
    }
}

impl Entity for DataAsset {
    const KIND: EntityKind = EntityKind::DataAsset;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn collection(model: &ThreatModel) -> &[Self] {
        &model.data_assets
    }

    fn collection_mut(model: &mut ThreatModel) -> &mut Vec<Self> {
        &mut model.data_assets
    }
}

/// Turn an enum tag into display text (`network_device` -> `network device`).
pub fn humanize(tag: &str) -> String {
    tag.replace('_', " ")
}
