// 📚 Entity Registry
// Owns finished entities of any kind behind the shared capability contract

use crate::entities::{Entity, EntityId, EntityKind};
use crate::error::RegistryError;
use std::collections::HashMap;
use tracing::info;

/// Registry of live entities
///
/// Entities are owned exclusively by the registry once registered and
/// handed back by `remove`. Single-writer; no interior locking.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: HashMap<EntityId, Box<dyn Entity>>,
    /// Registration order, for stable listings
    order: Vec<EntityId>,
}

impl EntityRegistry {
    /// Create new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of an entity; ids must be unique
    pub fn register(&mut self, entity: Box<dyn Entity>) -> Result<EntityId, RegistryError> {
        let id = entity.id();
        if self.entities.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }
        info!(id = %id, kind = %entity.kind(), name = entity.name(), "entity registered");
        self.entities.insert(id, entity);
        self.order.push(id);
        Ok(id)
    }

    pub fn get(&self, id: &EntityId) -> Option<&dyn Entity> {
        self.entities.get(id).map(|e| e.as_ref())
    }

    /// Release an entity back to the caller
    pub fn remove(&mut self, id: &EntityId) -> Result<Box<dyn Entity>, RegistryError> {
        let entity = self
            .entities
            .remove(id)
            .ok_or(RegistryError::NotFound(*id))?;
        self.order.retain(|existing| existing != id);
        info!(id = %id, "entity released");
        Ok(entity)
    }

    /// All entities, in registration order
    pub fn all(&self) -> Vec<&dyn Entity> {
        self.order
            .iter()
            .filter_map(|id| self.get(id))
            .collect()
    }

    /// Find entity by name (exact match, case-insensitive)
    pub fn find_by_name(&self, name: &str) -> Option<&dyn Entity> {
        let lower_name = name.to_lowercase();
        self.all()
            .into_iter()
            .find(|e| e.name().to_lowercase() == lower_name)
    }

    pub fn by_kind(&self, kind: EntityKind) -> Vec<&dyn Entity> {
        self.all().into_iter().filter(|e| e.kind() == kind).collect()
    }

    pub fn count(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Sum of `compute_value` across every entity
    pub fn total_value(&self) -> f64 {
        self.entities.values().map(|e| e.compute_value()).sum()
    }

    pub fn total_value_by_kind(&self, kind: EntityKind) -> f64 {
        self.by_kind(kind).iter().map(|e| e.compute_value()).sum()
    }

    /// One `describe()` line per entity, in registration order
    pub fn describe_all(&self) -> Vec<String> {
        self.all().iter().map(|e| e.describe()).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
