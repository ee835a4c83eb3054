//! Bundled demonstration model
//!
//! A three-tier web application: web, app, database and auth servers in
//! three zones, with the data that lives on and moves between them.

use chrono::Utc;
use oracle_types::{
    AuthenticationMethod, Classification, DataAsset, DataAssetType, DataFlow,
    EncryptionRequirement, Level, Medium, Protocol, SecurityLevel, TechnicalAsset,
    TechnicalAssetType, ThreatModel, TrustBoundary, TrustBoundaryType,
};

pub const SAMPLE_MODEL_ID: &str = "model-001";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[allow(clippy::too_many_arguments)]
fn technical_asset(
    id: &str,
    name: &str,
    description: &str,
    asset_type: TechnicalAssetType,
    owner: &str,
    criticality: Level,
    stack: &[&str],
    version: &str,
    tags: &[&str],
) -> TechnicalAsset {
    TechnicalAsset {
        id: id.into(),
        description: Some(description.into()),
        owner: Some(owner.into()),
        criticality,
        technology_stack: strings(stack),
        version: Some(version.into()),
        tags: strings(tags),
        ..TechnicalAsset::new(name, asset_type)
    }
}

fn trust_boundary(
    id: &str,
    name: &str,
    description: &str,
    boundary_type: TrustBoundaryType,
    security_level: SecurityLevel,
    owner: &str,
    tags: &[&str],
) -> TrustBoundary {
    TrustBoundary {
        id: id.into(),
        description: Some(description.into()),
        security_level,
        owner: Some(owner.into()),
        tags: strings(tags),
        ..TrustBoundary::new(name, boundary_type)
    }
}

fn technical_assets() -> Vec<TechnicalAsset> {
    vec![
        technical_asset(
            "ta-001",
            "Web Server",
            "Main web server hosting the application",
            TechnicalAssetType::Server,
            "Infrastructure Team",
            Level::High,
            &["Nginx", "Ubuntu 20.04"],
            "1.0.0",
            &["frontend", "public-facing"],
        ),
        technical_asset(
            "ta-002",
            "Application Server",
            "Application logic server",
            TechnicalAssetType::Application,
            "Development Team",
            Level::High,
            &["Node.js", "Express"],
            "2.1.0",
            &["backend", "api"],
        ),
        technical_asset(
            "ta-003",
            "Database Server",
            "Primary database server",
            TechnicalAssetType::Database,
            "Database Team",
            Level::Critical,
            &["PostgreSQL", "Ubuntu 20.04"],
            "13.2",
            &["data", "persistent"],
        ),
        technical_asset(
            "ta-004",
            "Authentication Service",
            "Handles user authentication and authorization",
            TechnicalAssetType::Service,
            "Security Team",
            Level::Critical,
            &["Java", "Spring Boot"],
            "1.5.0",
            &["security", "auth"],
        ),
    ]
}

fn trust_boundaries() -> Vec<TrustBoundary> {
    vec![
        trust_boundary(
            "tb-001",
            "Public DMZ",
            "Demilitarized zone for public-facing services",
            TrustBoundaryType::NetworkSegment,
            SecurityLevel::Dmz,
            "Network Team",
            &["external", "public"],
        ),
        trust_boundary(
            "tb-002",
            "Internal Network",
            "Internal corporate network",
            TrustBoundaryType::NetworkSegment,
            SecurityLevel::Internal,
            "Network Team",
            &["internal"],
        ),
        trust_boundary(
            "tb-003",
            "Database Zone",
            "Restricted zone for database servers",
            TrustBoundaryType::SecurityZone,
            SecurityLevel::Restricted,
            "Database Team",
            &["data", "restricted"],
        ),
    ]
}

fn data_assets() -> Vec<DataAsset> {
    vec![
        DataAsset {
            id: "da-001".into(),
            description: Some(
                "Customer personal information including names, addresses, and contact details"
                    .into(),
            ),
            medium: Medium::Digital,
            classification: Classification::Confidential,
            format: Some("JSON".into()),
            volume: Some("10GB".into()),
            owner: Some("Data Management Team".into()),
            retention_period: Some("7 years".into()),
            regulatory_requirements: strings(&["GDPR", "CCPA"]),
            encryption_requirements: Some(EncryptionRequirement::Both),
            integrity_requirements: Some(Level::High),
            availability_requirements: Some(Level::Medium),
            stored_in: strings(&["ta-003"]),
            processed_by: strings(&["ta-002"]),
            transmitted_in: strings(&["df-002"]),
            tags: strings(&["customer", "personal"]),
            ..DataAsset::new("Customer Records", DataAssetType::Pii)
        },
        DataAsset {
            id: "da-002".into(),
            description: Some("User authentication credentials and session tokens".into()),
            medium: Medium::Digital,
            classification: Classification::Restricted,
            format: Some("Encrypted Database Records".into()),
            owner: Some("Security Team".into()),
            encryption_requirements: Some(EncryptionRequirement::Both),
            integrity_requirements: Some(Level::Critical),
            availability_requirements: Some(Level::High),
            stored_in: strings(&["ta-004"]),
            processed_by: strings(&["ta-004"]),
            transmitted_in: strings(&["df-003"]),
            tags: strings(&["security", "credentials"]),
            ..DataAsset::new("Authentication Credentials", DataAssetType::AuthenticationData)
        },
        DataAsset {
            id: "da-003".into(),
            description: Some("Application and system configuration settings".into()),
            medium: Medium::Digital,
            classification: Classification::Internal,
            format: Some("YAML/JSON".into()),
            owner: Some("Operations Team".into()),
            encryption_requirements: Some(EncryptionRequirement::AtRest),
            integrity_requirements: Some(Level::High),
            availability_requirements: Some(Level::High),
            stored_in: strings(&["ta-001", "ta-002"]),
            tags: strings(&["configuration", "settings"]),
            ..DataAsset::new("System Configuration", DataAssetType::Configuration)
        },
        DataAsset {
            id: "da-004".into(),
            description: Some("Physical printed reports containing business analytics".into()),
            medium: Medium::Physical,
            classification: Classification::Confidential,
            owner: Some("Business Intelligence Team".into()),
            retention_period: Some("5 years".into()),
            integrity_requirements: Some(Level::Medium),
            availability_requirements: Some(Level::Low),
            tags: strings(&["reports", "physical", "analytics"]),
            ..DataAsset::new("Printed Reports", DataAssetType::BusinessData)
        },
    ]
}

fn data_flows() -> Vec<DataFlow> {
    vec![
        DataFlow {
            id: "df-001".into(),
            name: Some("Web to App Traffic".into()),
            description: Some("HTTP traffic from web server to application server".into()),
            port: Some(443),
            is_encrypted: true,
            authentication_method: AuthenticationMethod::Token,
            data_assets: strings(&["da-003"]),
            crosses_trust_boundary: true,
            trust_boundary_id: Some("tb-001".into()),
            tags: strings(&["api", "encrypted"]),
            ..DataFlow::new("ta-001", "ta-002", Protocol::Https)
        },
        DataFlow {
            id: "df-002".into(),
            name: Some("App to DB Traffic".into()),
            description: Some("Database queries from application to database".into()),
            port: Some(5432),
            is_encrypted: true,
            authentication_method: AuthenticationMethod::Certificate,
            data_assets: strings(&["da-001"]),
            crosses_trust_boundary: true,
            trust_boundary_id: Some("tb-003".into()),
            tags: strings(&["data", "encrypted"]),
            ..DataFlow::new("ta-002", "ta-003", Protocol::Tcp)
        },
        DataFlow {
            id: "df-003".into(),
            name: Some("Auth Traffic".into()),
            description: Some("Authentication requests to auth service".into()),
            port: Some(8443),
            is_encrypted: true,
            authentication_method: AuthenticationMethod::Certificate,
            data_assets: strings(&["da-002"]),
            tags: strings(&["auth", "encrypted"]),
            ..DataFlow::new("ta-002", "ta-004", Protocol::Https)
        },
    ]
}

/// The demonstration model `model-001`, stamped with the current time
pub fn sample_model() -> ThreatModel {
    let now = Utc::now();
    ThreatModel {
        id: SAMPLE_MODEL_ID.into(),
        name: "Sample Threat Model".into(),
        description: Some("A sample threat model for demonstration purposes".into()),
        version: "0.1.0".into(),
        created: now,
        updated: now,
        technical_assets: technical_assets(),
        trust_boundaries: trust_boundaries(),
        data_flows: data_flows(),
        data_assets: data_assets(),
    }
}
