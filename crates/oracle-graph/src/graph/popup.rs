//! Detail popups for a selected node or edge
//!
//! The `*PopupData` builders are pure projections over the current model:
//! given an id they look up the record and its related records and flatten
//! them into display rows. Rendering is a thin egui::Window over that data.

use egui::{Color32, Pos2, RichText, Ui};
use oracle_types::{humanize, NodeCategory, ThreatModel};

use super::colors::{category_color, MUTED_TEXT};

/// Display fallback for a flow endpoint that is not in the model
pub const UNKNOWN: &str = "Unknown";

const POPUP_WIDTH: f32 = 280.0;

// =============================================================================
// POPUP DATA
// =============================================================================

/// One "Label: value" row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoRow {
    pub label: &'static str,
    pub value: String,
}

impl InfoRow {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// A titled group of rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoSection {
    pub heading: &'static str,
    pub rows: Vec<InfoRow>,
}

/// A related record listed under the main one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedItem {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPopupData {
    pub entity_id: String,
    pub name: String,
    pub category: NodeCategory,
    pub sections: Vec<InfoSection>,
    pub related_flows: Vec<RelatedItem>,
    /// Only populated for technical assets
    pub related_data_assets: Vec<RelatedItem>,
    pub tags: Vec<String>,
}

impl AssetPopupData {
    /// Look the id up in the collection matching `category`.
    ///
    /// Returns `None` when the record does not exist.
    pub fn build(model: &ThreatModel, id: &str, category: NodeCategory) -> Option<Self> {
        let (name, sections, tags) = match category {
            NodeCategory::Technical => {
                let asset = model.technical_asset(id)?;
                let mut details = vec![InfoRow::new("Criticality", asset.criticality.as_str())];
                if !asset.technology_stack.is_empty() {
                    details.push(InfoRow::new("Tech Stack", asset.technology_stack.join(", ")));
                }
                if let Some(version) = &asset.version {
                    details.push(InfoRow::new("Version", version.as_str()));
                }
                let basic = basic_info(
                    &asset.id,
                    asset.asset_type.as_str(),
                    asset.description.as_deref(),
                    asset.owner.as_deref(),
                );
                (
                    asset.name.clone(),
                    vec![
                        basic,
                        InfoSection {
                            heading: "Technical Details",
                            rows: details,
                        },
                    ],
                    asset.tags.clone(),
                )
            }
            NodeCategory::Data => {
                let asset = model.data_asset(id)?;
                let mut details = vec![
                    InfoRow::new("Classification", asset.classification.as_str()),
                    InfoRow::new("Medium", asset.medium.as_str()),
                ];
                if let Some(encryption) = asset.encryption_requirements {
                    details.push(InfoRow::new("Encryption", humanize(encryption.as_str())));
                }
                let basic = basic_info(
                    &asset.id,
                    asset.asset_type.as_str(),
                    asset.description.as_deref(),
                    asset.owner.as_deref(),
                );
                (
                    asset.name.clone(),
                    vec![
                        basic,
                        InfoSection {
                            heading: "Data Classification",
                            rows: details,
                        },
                    ],
                    asset.tags.clone(),
                )
            }
            NodeCategory::Trust => {
                let boundary = model.trust_boundary(id)?;
                let basic = basic_info(
                    &boundary.id,
                    boundary.boundary_type.as_str(),
                    boundary.description.as_deref(),
                    boundary.owner.as_deref(),
                );
                (
                    boundary.name.clone(),
                    vec![
                        basic,
                        InfoSection {
                            heading: "Security Information",
                            rows: vec![InfoRow::new(
                                "Security Level",
                                boundary.security_level.as_str(),
                            )],
                        },
                    ],
                    boundary.tags.clone(),
                )
            }
        };

        let related_flows = model
            .data_flows
            .iter()
            .filter(|flow| flow.touches(id))
            .map(|flow| RelatedItem {
                id: flow.id.clone(),
                label: flow.list_label(),
            })
            .collect();

        let related_data_assets = if category == NodeCategory::Technical {
            model
                .data_assets
                .iter()
                .filter(|asset| asset.resides_on(id))
                .map(|asset| RelatedItem {
                    id: asset.id.clone(),
                    label: asset.name.clone(),
                })
                .collect()
        } else {
            Vec::new()
        };

        Some(Self {
            entity_id: id.to_string(),
            name,
            category,
            sections,
            related_flows,
            related_data_assets,
            tags,
        })
    }
}

fn basic_info(
    id: &str,
    type_tag: &str,
    description: Option<&str>,
    owner: Option<&str>,
) -> InfoSection {
    let mut rows = vec![InfoRow::new("ID", id), InfoRow::new("Type", humanize(type_tag))];
    if let Some(description) = description.filter(|d| !d.is_empty()) {
        rows.push(InfoRow::new("Description", description));
    }
    if let Some(owner) = owner.filter(|o| !o.is_empty()) {
        rows.push(InfoRow::new("Owner", owner));
    }
    InfoSection {
        heading: "Basic Information",
        rows,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgePopupData {
    pub flow_id: String,
    pub title: String,
    pub sections: Vec<InfoSection>,
    /// `"<name> (<type>)"` or [`UNKNOWN`]
    pub source: String,
    pub target: String,
    pub tags: Vec<String>,
}

impl EdgePopupData {
    pub fn build(model: &ThreatModel, id: &str) -> Option<Self> {
        let flow = model.data_flow(id)?;
        let source = model.technical_asset(&flow.source_id);
        let target = model.technical_asset(&flow.target_id);
        let name_of = |asset: Option<&oracle_types::TechnicalAsset>| {
            asset.map_or_else(|| UNKNOWN.to_string(), |a| a.name.clone())
        };
        let describe = |asset: Option<&oracle_types::TechnicalAsset>| {
            asset.map_or_else(
                || UNKNOWN.to_string(),
                |a| format!("{} ({})", a.name, humanize(a.asset_type.as_str())),
            )
        };

        let mut basic = vec![
            InfoRow::new("ID", flow.id.as_str()),
            InfoRow::new("Protocol", flow.protocol.label()),
        ];
        if let Some(description) = flow.description.as_deref().filter(|d| !d.is_empty()) {
            basic.push(InfoRow::new("Description", description));
        }
        basic.push(InfoRow::new(
            "Direction",
            format!("{} → {}", name_of(source), name_of(target)),
        ));

        let mut connection = Vec::new();
        if let Some(port) = flow.port {
            connection.push(InfoRow::new("Port", port.to_string()));
        }
        connection.push(InfoRow::new("Encrypted", yes_no(flow.is_encrypted)));
        connection.push(InfoRow::new(
            "Auth Method",
            humanize(flow.authentication_method.as_str()),
        ));

        let mut security = vec![InfoRow::new(
            "Crosses Boundary",
            yes_no(flow.crosses_trust_boundary),
        )];
        if let Some(boundary_id) = &flow.trust_boundary_id {
            let boundary = model
                .trust_boundary(boundary_id)
                .map_or_else(|| boundary_id.clone(), |b| b.name.clone());
            security.push(InfoRow::new("Boundary", boundary));
        }

        Some(Self {
            flow_id: flow.id.clone(),
            title: flow.title(),
            sections: vec![
                InfoSection {
                    heading: "Basic Information",
                    rows: basic,
                },
                InfoSection {
                    heading: "Connection Details",
                    rows: connection,
                },
                InfoSection {
                    heading: "Security Information",
                    rows: security,
                },
            ],
            source: describe(source),
            target: describe(target),
            tags: flow.tags.clone(),
        })
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

// =============================================================================
// RENDER
// =============================================================================

/// What the user clicked inside a popup this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupAction {
    Close,
    DrillDown,
}

/// Render the node popup anchored at `anchor` (screen coordinates)
pub fn render_asset_popup(
    ctx: &egui::Context,
    data: &AssetPopupData,
    anchor: Pos2,
) -> Option<PopupAction> {
    let mut action = None;
    popup_window(ctx, &data.name, anchor).show(ctx, |ui| {
        ui.label(
            RichText::new(data.category.as_str()).color(category_color(data.category)),
        );
        ui.separator();

        for section in &data.sections {
            render_section(ui, section);
        }
        if !data.related_flows.is_empty() {
            render_related(ui, "Related Data Flows", &data.related_flows);
        }
        if !data.related_data_assets.is_empty() {
            render_related(ui, "Related Data Assets", &data.related_data_assets);
        }
        render_tags(ui, &data.tags);
        action = render_footer(ui);
    });
    action
}

/// Render the edge popup anchored at `anchor` (screen coordinates)
pub fn render_edge_popup(
    ctx: &egui::Context,
    data: &EdgePopupData,
    anchor: Pos2,
) -> Option<PopupAction> {
    let mut action = None;
    popup_window(ctx, &data.title, anchor).show(ctx, |ui| {
        for section in &data.sections {
            render_section(ui, section);
        }
        render_section(
            ui,
            &InfoSection {
                heading: "Connected Assets",
                rows: vec![
                    InfoRow::new("Source", data.source.as_str()),
                    InfoRow::new("Target", data.target.as_str()),
                ],
            },
        );
        render_tags(ui, &data.tags);
        action = render_footer(ui);
    });
    action
}

fn popup_window<'a>(ctx: &egui::Context, title: &str, anchor: Pos2) -> egui::Window<'a> {
    // Keep the window on screen when the click was near the right/bottom edge
    let screen = ctx.screen_rect();
    let pos = Pos2::new(
        anchor.x.min(screen.right() - POPUP_WIDTH).max(screen.left()),
        anchor.y.max(screen.top()),
    );
    egui::Window::new(title.to_string())
        .id(egui::Id::new("threat_graph_popup"))
        .fixed_pos(pos)
        .default_width(POPUP_WIDTH)
        .collapsible(false)
        .resizable(false)
}

fn render_section(ui: &mut Ui, section: &InfoSection) {
    ui.add_space(4.0);
    ui.label(RichText::new(section.heading).strong());
    egui::Grid::new(section.heading)
        .num_columns(2)
        .spacing([8.0, 2.0])
        .show(ui, |ui| {
            for row in &section.rows {
                ui.label(RichText::new(format!("{}:", row.label)).color(MUTED_TEXT));
                ui.label(row.value.as_str());
                ui.end_row();
            }
        });
}

fn render_related(ui: &mut Ui, heading: &str, items: &[RelatedItem]) {
    ui.add_space(4.0);
    ui.label(RichText::new(heading).strong());
    for item in items {
        ui.label(format!("• {}", item.label));
    }
}

fn render_tags(ui: &mut Ui, tags: &[String]) {
    if tags.is_empty() {
        return;
    }
    ui.add_space(4.0);
    ui.label(RichText::new("Tags").strong());
    ui.horizontal_wrapped(|ui| {
        for tag in tags {
            ui.label(
                RichText::new(tag)
                    .small()
                    .background_color(Color32::from_rgb(229, 231, 235)),
            );
        }
    });
}

fn render_footer(ui: &mut Ui) -> Option<PopupAction> {
    let mut action = None;
    ui.add_space(8.0);
    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("Close").clicked() {
            action = Some(PopupAction::Close);
        }
        if ui.button("View Details »").clicked() {
            action = Some(PopupAction::DrillDown);
        }
    });
    action
}
