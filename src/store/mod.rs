//! In-memory threat model store
//!
//! Holds the list of threat models and the identity of the current one.
//! Child-entity operations always target the current model and are silent
//! no-ops when there is none.
//!
//! # Copy-on-write
//!
//! Models are shared as `Arc<ThreatModel>` inside an `Arc<Vec<_>>`. A
//! mutation clones the affected model, edits the clone, and swaps in a new
//! list. Snapshots handed out earlier never change.
//!
//! # Usage
//!
//! ```ignore
//! let mut store = ModelStore::with_sample();
//! let events = store.subscribe();
//!
//! let id = store.add_technical_asset(TechnicalAsset::new("Cache", TechnicalAssetType::Service));
//! let snapshot = store.current_model();
//! ```

pub mod events;
pub mod ids;
pub mod patch;

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use crossbeam_channel::Receiver;
use oracle_types::{
    DataAsset, DataFlow, Entity, EntityKind, NewModel, TechnicalAsset, ThreatModel,
    TrustBoundary,
};

use crate::config::OracleConfig;

pub use events::{EmitterStats, StoreEmitter, StoreEvent};
pub use ids::{IdGenerator, IdStrategy, MODEL_PREFIX};
pub use patch::{
    DataAssetPatch, DataFlowPatch, ModelPatch, Patch, TechnicalAssetPatch, TrustBoundaryPatch,
};

/// Prompt shown before a model is deleted
pub const DELETE_MODEL_PROMPT: &str =
    "Are you sure you want to delete this model? This action cannot be undone.";

/// Prompt shown before a child entity is deleted
pub fn delete_entity_prompt(kind: EntityKind) -> String {
    format!(
        "Are you sure you want to delete this {}? This action cannot be undone.",
        kind.display_name().to_lowercase()
    )
}

/// User confirmation for destructive actions.
///
/// Any `Fn(&str) -> bool` qualifies, e.g. `|_prompt| true` in tests or a
/// dialog callback in a UI.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Debug, Default)]
pub struct ModelStore {
    models: Arc<Vec<Arc<ThreatModel>>>,
    current_model_id: Option<String>,
    ids: IdGenerator,
    events: StoreEmitter,
}

impl ModelStore {
    /// Empty store with UUID ids
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id_strategy(strategy: IdStrategy) -> Self {
        Self {
            ids: IdGenerator::new(strategy),
            ..Self::default()
        }
    }

    /// Empty store using the configured id strategy
    pub fn from_config(config: &OracleConfig) -> Self {
        Self::with_id_strategy(config.id_strategy)
    }

    /// Store seeded with the bundled sample model, which is current
    pub fn with_sample() -> Self {
        let mut store = Self::new();
        store.insert_model(crate::sample::sample_model());
        store
    }

    /// Insert a fully formed model as-is (ids and timestamps kept) and make
    /// it current. A model with the same id is replaced.
    pub fn insert_model(&mut self, model: ThreatModel) {
        let model_id = model.id.clone();
        let mut models: Vec<_> = self
            .models
            .iter()
            .filter(|m| m.id != model_id)
            .cloned()
            .collect();
        models.push(Arc::new(model));
        self.models = Arc::new(models);
        self.current_model_id = Some(model_id.clone());
        tracing::info!(model = %model_id, "model inserted");
        self.events.emit(StoreEvent::ModelAdded { model_id });
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Snapshot of the model list
    pub fn models(&self) -> Arc<Vec<Arc<ThreatModel>>> {
        Arc::clone(&self.models)
    }

    pub fn model(&self, id: &str) -> Option<Arc<ThreatModel>> {
        self.models.iter().find(|m| m.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// The selected id, which may not name an existing model
    pub fn current_model_id(&self) -> Option<&str> {
        self.current_model_id.as_deref()
    }

    /// The model whose id equals the current id, or none
    pub fn current_model(&self) -> Option<Arc<ThreatModel>> {
        self.current_model_id.as_deref().and_then(|id| self.model(id))
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.ids.strategy()
    }

    /// Receive one [`StoreEvent`] per effective mutation from now on
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn event_stats(&self) -> EmitterStats {
        self.events.stats()
    }

    // =========================================================================
    // MODELS
    // =========================================================================

    /// Create a model from caller-supplied fields, append it and make it
    /// current. Returns the new id.
    pub fn add_model(&mut self, new: NewModel) -> String {
        let models = Arc::clone(&self.models);
        let id = self
            .ids
            .next(MODEL_PREFIX, |candidate| models.iter().any(|m| m.id == candidate));
        let now = Utc::now();
        let model = ThreatModel {
            id: id.clone(),
            name: new.name,
            description: new.description,
            version: new.version,
            created: now,
            updated: now,
            technical_assets: new.technical_assets,
            trust_boundaries: new.trust_boundaries,
            data_flows: new.data_flows,
            data_assets: new.data_assets,
        };
        tracing::info!(model = %id, name = %model.name, "model added");

        let mut list = Vec::clone(&self.models);
        list.push(Arc::new(model));
        self.models = Arc::new(list);
        self.current_model_id = Some(id.clone());
        self.events.emit(StoreEvent::ModelAdded {
            model_id: id.clone(),
        });
        id
    }

    /// Shallow-merge `patch` into the model and refresh `updated`.
    ///
    /// Returns false when no model has that id.
    pub fn update_model(&mut self, id: &str, patch: ModelPatch) -> bool {
        let Some(index) = self.index_of(id) else {
            tracing::debug!(model = %id, "update_model: no such model");
            return false;
        };
        let mut model = ThreatModel::clone(&self.models[index]);
        patch.apply(&mut model);
        touch(&mut model);
        self.replace_model(index, model);
        tracing::debug!(model = %id, "model updated");
        self.events.emit(StoreEvent::ModelUpdated {
            model_id: id.to_string(),
        });
        true
    }

    /// Remove a model. If it was current, the first remaining model becomes
    /// current (or none).
    pub fn delete_model(&mut self, id: &str) -> bool {
        let Some(index) = self.index_of(id) else {
            tracing::debug!(model = %id, "delete_model: no such model");
            return false;
        };
        let mut list = Vec::clone(&self.models);
        list.remove(index);
        self.models = Arc::new(list);

        if self.current_model_id.as_deref() == Some(id) {
            self.current_model_id = self.models.first().map(|m| m.id.clone());
        }
        tracing::info!(
            model = %id,
            current = ?self.current_model_id,
            "model deleted"
        );
        self.events.emit(StoreEvent::ModelDeleted {
            model_id: id.to_string(),
            current_model_id: self.current_model_id.clone(),
        });
        true
    }

    /// [`ModelStore::delete_model`] behind a confirmation; declining is a no-op
    pub fn delete_model_confirmed(&mut self, id: &str, confirm: &impl Confirm) -> bool {
        if !confirm.confirm(DELETE_MODEL_PROMPT) {
            tracing::debug!(model = %id, "model deletion declined");
            return false;
        }
        self.delete_model(id)
    }

    /// Select a model by id. Not checked against the model list; an unknown
    /// id leaves [`ModelStore::current_model`] returning none.
    pub fn set_current_model(&mut self, id: impl Into<String>) {
        let id = id.into();
        if self.current_model_id.as_deref() == Some(id.as_str()) {
            return;
        }
        if self.index_of(&id).is_none() {
            tracing::warn!(model = %id, "current model set to an unknown id");
        }
        self.current_model_id = Some(id);
        self.events.emit(StoreEvent::CurrentModelChanged {
            model_id: self.current_model_id.clone(),
        });
    }

    pub fn clear_current_model(&mut self) {
        if self.current_model_id.take().is_some() {
            self.events
                .emit(StoreEvent::CurrentModelChanged { model_id: None });
        }
    }

    // =========================================================================
    // ENTITIES (generic over the four kinds)
    // =========================================================================

    /// Append `entity` to its collection in the current model under a fresh
    /// id. Returns the id, or `None` when there is no current model.
    pub fn add_entity<E: Entity>(&mut self, mut entity: E) -> Option<String> {
        let Some(index) = self.current_index() else {
            tracing::debug!(kind = E::KIND.display_name(), "add ignored: no current model");
            return None;
        };
        let mut model = ThreatModel::clone(&self.models[index]);
        let id = self.ids.next(E::KIND.prefix(), |candidate| {
            E::collection(&model).iter().any(|e| e.id() == candidate)
        });
        entity.set_id(id.clone());
        E::collection_mut(&mut model).push(entity);
        touch(&mut model);

        let model_id = model.id.clone();
        self.replace_model(index, model);
        tracing::debug!(model = %model_id, entity = %id, kind = E::KIND.display_name(), "entity added");
        self.events.emit(StoreEvent::EntityAdded {
            model_id,
            kind: E::KIND,
            entity_id: id.clone(),
        });
        Some(id)
    }

    /// Shallow-merge `patch` into the record with `id` in the current model.
    ///
    /// Returns false when there is no current model or no such record.
    pub fn update_entity<E, P>(&mut self, id: &str, patch: P) -> bool
    where
        E: Entity,
        P: Patch<E>,
    {
        let Some(index) = self.current_index() else {
            tracing::debug!(kind = E::KIND.display_name(), "update ignored: no current model");
            return false;
        };
        let mut model = ThreatModel::clone(&self.models[index]);
        let Some(record) = E::collection_mut(&mut model)
            .iter_mut()
            .find(|e| e.id() == id)
        else {
            tracing::debug!(entity = %id, kind = E::KIND.display_name(), "update ignored: no such record");
            return false;
        };
        patch.apply(record);
        touch(&mut model);

        let model_id = model.id.clone();
        self.replace_model(index, model);
        tracing::debug!(model = %model_id, entity = %id, kind = E::KIND.display_name(), "entity updated");
        self.events.emit(StoreEvent::EntityUpdated {
            model_id,
            kind: E::KIND,
            entity_id: id.to_string(),
        });
        true
    }

    /// Remove the record with `id` from the current model.
    pub fn delete_entity<E: Entity>(&mut self, id: &str) -> bool {
        let Some(index) = self.current_index() else {
            tracing::debug!(kind = E::KIND.display_name(), "delete ignored: no current model");
            return false;
        };
        if !E::collection(&self.models[index]).iter().any(|e| e.id() == id) {
            return false;
        }
        let mut model = ThreatModel::clone(&self.models[index]);
        E::collection_mut(&mut model).retain(|e| e.id() != id);
        touch(&mut model);

        let model_id = model.id.clone();
        self.replace_model(index, model);
        tracing::debug!(model = %model_id, entity = %id, kind = E::KIND.display_name(), "entity deleted");
        self.events.emit(StoreEvent::EntityDeleted {
            model_id,
            kind: E::KIND,
            entity_id: id.to_string(),
        });
        true
    }

    /// [`ModelStore::delete_entity`] behind a confirmation
    pub fn delete_entity_confirmed<E: Entity>(&mut self, id: &str, confirm: &impl Confirm) -> bool {
        if !confirm.confirm(&delete_entity_prompt(E::KIND)) {
            tracing::debug!(entity = %id, kind = E::KIND.display_name(), "deletion declined");
            return false;
        }
        self.delete_entity::<E>(id)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn index_of(&self, id: &str) -> Option<usize> {
        self.models.iter().position(|m| m.id == id)
    }

    fn current_index(&self) -> Option<usize> {
        self.current_model_id
            .as_deref()
            .and_then(|id| self.index_of(id))
    }

    /// Swap in a new list with `model` at `index`
    fn replace_model(&mut self, index: usize, model: ThreatModel) {
        let mut list = Vec::clone(&self.models);
        list[index] = Arc::new(model);
        self.models = Arc::new(list);
    }
}

/// Refresh `updated`; strictly increasing even within one clock tick
fn touch(model: &mut ThreatModel) {
    let now = Utc::now();
    model.updated = if now > model.updated {
        now
    } else {
        model.updated + TimeDelta::microseconds(1)
    };
}

// =============================================================================
// PER-KIND OPERATIONS
// =============================================================================

macro_rules! entity_ops {
    ($ty:ty, $patch:ty, $add:ident, $update:ident, $delete:ident, $delete_confirmed:ident) => {
        impl ModelStore {
            pub fn $add(&mut self, record: $ty) -> Option<String> {
                self.add_entity(record)
            }

            pub fn $update(&mut self, id: &str, patch: $patch) -> bool {
                self.update_entity::<$ty, _>(id, patch)
            }

            pub fn $delete(&mut self, id: &str) -> bool {
                self.delete_entity::<$ty>(id)
            }

            pub fn $delete_confirmed(&mut self, id: &str, confirm: &impl Confirm) -> bool {
                self.delete_entity_confirmed::<$ty>(id, confirm)
            }
        }
    };
}

entity_ops!(
    TechnicalAsset,
    TechnicalAssetPatch,
    add_technical_asset,
    update_technical_asset,
    delete_technical_asset,
    delete_technical_asset_confirmed
);
entity_ops!(
    TrustBoundary,
    TrustBoundaryPatch,
    add_trust_boundary,
    update_trust_boundary,
    delete_trust_boundary,
    delete_trust_boundary_confirmed
);
entity_ops!(
    DataFlow,
    DataFlowPatch,
    add_data_flow,
    update_data_flow,
    delete_data_flow,
    delete_data_flow_confirmed
);
entity_ops!(
    DataAsset,
    DataAssetPatch,
    add_data_asset,
    update_data_asset,
    delete_data_asset,
    delete_data_asset_confirmed
);

#[cfg(test)]
mod tests {
    use super::*;
    use oracle_types::{Level, Protocol, TechnicalAssetType, TrustBoundaryType};

    fn store_with_model() -> (ModelStore, String) {
        let mut store = ModelStore::with_id_strategy(IdStrategy::Sequential);
        let id = store.add_model(NewModel::new("Payments", "1.0"));
        (store, id)
    }

    fn server(name: &str) -> TechnicalAsset {
        TechnicalAsset::new(name, TechnicalAssetType::Server)
    }

    #[test]
    fn test_add_model_becomes_current() {
        let (store, id) = store_with_model();
        assert_eq!(id, "model-1");
        assert_eq!(store.current_model_id(), Some("model-1"));
        let model = store.current_model().unwrap();
        assert_eq!(model.name, "Payments");
        assert_eq!(model.created, model.updated);
        assert_eq!(model.entity_count(), 0);
    }

    #[test]
    fn test_child_ops_without_current_model_are_noops() {
        let mut store = ModelStore::new();
        let events = store.subscribe();
        assert!(store.add_technical_asset(server("Web")).is_none());
        assert!(!store.update_technical_asset("ta-1", TechnicalAssetPatch::default()));
        assert!(!store.delete_technical_asset("ta-1"));
        assert!(store.is_empty());
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_add_update_delete_entity() {
        let (mut store, model_id) = store_with_model();
        let before = store.current_model().unwrap();

        let id = store.add_technical_asset(server("Web")).unwrap();
        assert!(id.starts_with("ta-"));
        let after_add = store.current_model().unwrap();
        assert_eq!(after_add.technical_assets.len(), 1);
        assert!(after_add.updated > before.updated);

        assert!(store.update_technical_asset(
            &id,
            TechnicalAssetPatch {
                criticality: Some(Level::High),
                ..Default::default()
            }
        ));
        let updated = store.current_model().unwrap();
        assert_eq!(updated.technical_assets[0].criticality, Level::High);
        assert_eq!(updated.technical_assets[0].name, "Web");
        assert!(updated.updated > after_add.updated);

        assert!(store.delete_technical_asset(&id));
        let after_delete = store.current_model().unwrap();
        assert!(after_delete.technical_assets.is_empty());
        assert!(after_delete.updated > updated.updated);
        assert_eq!(store.model(&model_id).unwrap().id, model_id);

        // the first snapshot never changed
        assert!(before.technical_assets.is_empty());
    }

    #[test]
    fn test_update_and_delete_unknown_record() {
        let (mut store, _) = store_with_model();
        let before = store.current_model().unwrap();
        assert!(!store.update_data_flow("df-404", DataFlowPatch::default()));
        assert!(!store.delete_data_flow("df-404"));
        assert!(Arc::ptr_eq(&before, &store.current_model().unwrap()));
    }

    #[test]
    fn test_ids_never_collide_with_existing() {
        let (mut store, model_id) = store_with_model();
        let mut seeded = server("Seeded");
        seeded.id = "ta-2".into();
        store.update_model(
            &model_id,
            ModelPatch {
                technical_assets: Some(vec![seeded]),
                ..Default::default()
            },
        );
        let id = store.add_technical_asset(server("Fresh")).unwrap();
        assert_eq!(id, "ta-3");
    }

    #[test]
    fn test_delete_current_model_falls_back_to_first() {
        let mut store = ModelStore::with_id_strategy(IdStrategy::Sequential);
        let a = store.add_model(NewModel::new("A", "1"));
        let b = store.add_model(NewModel::new("B", "1"));
        assert_eq!(store.current_model_id(), Some(b.as_str()));

        assert!(store.delete_model(&b));
        assert_eq!(store.current_model_id(), Some(a.as_str()));

        assert!(store.delete_model(&a));
        assert_eq!(store.current_model_id(), None);
        assert!(store.current_model().is_none());
        assert!(!store.delete_model(&a));
    }

    #[test]
    fn test_delete_other_model_keeps_current() {
        let mut store = ModelStore::new();
        let a = store.add_model(NewModel::new("A", "1"));
        let b = store.add_model(NewModel::new("B", "1"));
        store.delete_model(&a);
        assert_eq!(store.current_model_id(), Some(b.as_str()));
    }

    #[test]
    fn test_set_current_model_is_unchecked() {
        let (mut store, id) = store_with_model();
        store.set_current_model("model-404");
        assert_eq!(store.current_model_id(), Some("model-404"));
        assert!(store.current_model().is_none());
        assert!(store.add_trust_boundary(TrustBoundary::new("DMZ", TrustBoundaryType::SecurityZone)).is_none());
        store.set_current_model(id.clone());
        assert_eq!(store.current_model().unwrap().id, id);
    }

    #[test]
    fn test_update_model_merges_fields() {
        let (mut store, id) = store_with_model();
        assert!(store.update_model(
            &id,
            ModelPatch {
                description: Some(Some("card flows".into())),
                ..ModelPatch::name("Payments v2")
            }
        ));
        let model = store.current_model().unwrap();
        assert_eq!(model.name, "Payments v2");
        assert_eq!(model.version, "1.0");
        assert_eq!(model.description.as_deref(), Some("card flows"));
        assert!(!store.update_model("model-404", ModelPatch::name("x")));
    }

    #[test]
    fn test_confirmation_gate() {
        let (mut store, id) = store_with_model();
        let flow = store
            .add_data_flow(DataFlow::new("ta-1", "ta-2", Protocol::Tcp))
            .unwrap();

        assert!(!store.delete_data_flow_confirmed(&flow, &|_: &str| false));
        assert_eq!(store.current_model().unwrap().data_flows.len(), 1);
        assert!(store.delete_data_flow_confirmed(&flow, &|prompt: &str| prompt.contains("data flow")));

        assert!(!store.delete_model_confirmed(&id, &|_: &str| false));
        assert_eq!(store.len(), 1);
        assert!(store.delete_model_confirmed(&id, &|prompt: &str| prompt == DELETE_MODEL_PROMPT));
        assert!(store.is_empty());
    }

    #[test]
    fn test_events_follow_mutations() {
        let mut store = ModelStore::with_id_strategy(IdStrategy::Sequential);
        let events = store.subscribe();
        let model_id = store.add_model(NewModel::new("A", "1"));
        let asset = store.add_data_asset(DataAsset::new("Logs", oracle_types::DataAssetType::Logs)).unwrap();
        store.delete_model(&model_id);

        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(
            received,
            vec![
                StoreEvent::ModelAdded {
                    model_id: model_id.clone()
                },
                StoreEvent::EntityAdded {
                    model_id: model_id.clone(),
                    kind: EntityKind::DataAsset,
                    entity_id: asset,
                },
                StoreEvent::ModelDeleted {
                    model_id,
                    current_model_id: None
                },
            ]
        );
    }

    #[test]
    fn test_clear_current_model() {
        let (mut store, id) = store_with_model();
        let events = store.subscribe();

        store.clear_current_model();
        assert_eq!(store.current_model_id(), None);
        assert!(store.add_technical_asset(server("Web")).is_none());
        assert!(store.model(&id).is_some());

        // already clear: nothing to announce
        store.clear_current_model();
        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(received, vec![StoreEvent::CurrentModelChanged { model_id: None }]);
    }

    #[test]
    fn test_id_strategy_and_event_stats() {
        assert_eq!(ModelStore::new().id_strategy(), IdStrategy::Uuid);
        let config = OracleConfig {
            id_strategy: IdStrategy::Sequential,
            ..OracleConfig::default()
        };
        let mut store = ModelStore::from_config(&config);
        assert_eq!(store.id_strategy(), IdStrategy::Sequential);

        let _events = store.subscribe();
        let id = store.add_model(
            NewModel::new("Payments", "1.0").with_description("card authorisation"),
        );
        assert_eq!(id, "model-1");
        assert_eq!(
            store.current_model().unwrap().description.as_deref(),
            Some("card authorisation")
        );
        store.add_technical_asset(server("Web"));
        assert_eq!(
            store.event_stats(),
            EmitterStats {
                delivered: 2,
                dropped: 0
            }
        );
    }

    #[test]
    fn test_with_sample() {
        let store = ModelStore::with_sample();
        let model = store.current_model().unwrap();
        assert_eq!(model.id, "model-001");
        assert_eq!(model.technical_assets.len(), 4);
        assert_eq!(model.data_flows.len(), 3);
    }
}
