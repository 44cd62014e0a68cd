// Entity Models
// "Identity persists, values change"
//
// Each entity has:
// - Stable identity (UUID) assigned once at creation
// - Values held in validated fields, changed only through validated setters
// - A kind-specific `compute_value`, reached through `dyn Entity`

pub mod salaried;
pub mod hourly;
pub mod card_payment;
pub mod wallet_payment;

pub use salaried::SalariedEmployee;
pub use hourly::HourlyEmployee;
pub use card_payment::CardPayment;
pub use wallet_payment::WalletPayment;

use crate::error::EntityError;
use crate::field::ValidatedField;
use crate::rules::TextRule;
use crate::schema::FieldSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// ENTITY KIND
// ============================================================================

/// The closed set of variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Salaried,
    Hourly,
    CardPayment,
    WalletPayment,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Salaried,
        EntityKind::Hourly,
        EntityKind::CardPayment,
        EntityKind::WalletPayment,
    ];

    /// Short code for raw input
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Salaried => "salaried",
            EntityKind::Hourly => "hourly",
            EntityKind::CardPayment => "card_payment",
            EntityKind::WalletPayment => "wallet_payment",
        }
    }

    /// Human-readable name for display
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Salaried => "Salaried employee",
            EntityKind::Hourly => "Hourly employee",
            EntityKind::CardPayment => "Card payment",
            EntityKind::WalletPayment => "Wallet payment",
        }
    }

    /// Case-insensitive lookup by short code
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim().to_lowercase();
        EntityKind::ALL.into_iter().find(|k| k.as_str() == code)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// IDENTITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    pub fn new() -> Self {
        EntityId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ENTITY CORE
// ============================================================================

/// Spec shared by every kind's display name
pub fn name_spec() -> FieldSpec {
    FieldSpec::text("name", vec![TextRule::NonEmpty, TextRule::MaxLength(120)])
        .with_description("Display name")
}

/// Fields every entity carries, embedded by each variant
#[derive(Debug, Serialize)]
pub struct EntityCore {
    id: EntityId,
    name: ValidatedField<String>,
    created_at: DateTime<Utc>,
}

impl EntityCore {
    /// Assign a fresh identity to an already validated name
    pub fn new(name: ValidatedField<String>) -> Self {
        EntityCore {
            id: EntityId::new(),
            name,
            created_at: Utc::now(),
        }
    }

    /// A second core for an existing identity
    #[cfg(test)]
    pub(crate) fn with_identity(id: EntityId, name: ValidatedField<String>) -> Self {
        EntityCore {
            id,
            name,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name.get()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Identity is untouched
    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), EntityError> {
        self.name.set(name.into())
    }
}

// ============================================================================
// CAPABILITY CONTRACT
// ============================================================================

/// JSON view of an entity's state
pub trait Snapshot {
    fn snapshot(&self) -> Value;
}

impl<T: Serialize> Snapshot for T {
    fn snapshot(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Entity - what callers may do without knowing the concrete variant
pub trait Entity: Snapshot + fmt::Debug {
    fn core(&self) -> &EntityCore;

    fn core_mut(&mut self) -> &mut EntityCore;

    fn kind(&self) -> EntityKind;

    /// Kind-specific value; pure over the entity's own fields
    fn compute_value(&self) -> f64;

    fn id(&self) -> EntityId {
        self.core().id()
    }

    fn name(&self) -> &str {
        self.core().name()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.core().created_at()
    }

    /// Validated rename; a rejected name leaves the old one
    fn rename(&mut self, name: &str) -> Result<(), EntityError> {
        self.core_mut().rename(name)
    }

    fn describe(&self) -> String {
        base_description(self)
    }

    /// SHA-256 of the entity's state, identity excluded
    ///
    /// Two entities built from the same inputs share a fingerprint.
    fn fingerprint(&self) -> String {
        let mut state = self.snapshot();
        if let Value::Object(map) = &mut state {
            map.remove("id");
            map.remove("created_at");
        }
        let mut hasher = Sha256::new();
        hasher.update(self.kind().as_str());
        hasher.update(state.to_string());
        format!("{:x}", hasher.finalize())
    }
}

/// `describe()` default, reusable by overrides that append a tag
pub fn base_description<E: Entity + ?Sized>(entity: &E) -> String {
    format!(
        "{} '{}' [{}]: {:.2}",
        entity.kind(),
        entity.name(),
        entity.id(),
        entity.compute_value()
    )
}

// ============================================================================
// TESTS
// ============================================================================
