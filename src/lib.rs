// Ledger Entities - Core Library
// Validated fields, polymorphic entities, and fluent construction
//
// Everything is in-memory, single-threaded and synchronous.

pub mod error;
pub mod config;
pub mod rules;      // Declarative number/text invariants
pub mod field;      // ValidatedField + Invariant
pub mod schema;     // Per-kind field catalogs
pub mod entities;   // Entity trait + the four variants
pub mod builder;    // Fluent builder state machine
pub mod registry;

// Re-export commonly used types
pub use error::{EntityError, FieldViolation, RegistryError};
pub use config::ModelConfig;
pub use rules::{CompiledTextRule, NumberRule, TextRule};
pub use field::{Invariant, ValidatedField};
pub use schema::{FieldKind, FieldSet, FieldSlot, FieldSpec, Schema};
pub use entities::{
    base_description, Entity, EntityCore, EntityId, EntityKind, Snapshot,
    SalariedEmployee, HourlyEmployee, CardPayment, WalletPayment,
};
pub use builder::{build_entity, BuilderState, Buildable, EntityBuilder, StepRecord};
pub use registry::EntityRegistry;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
