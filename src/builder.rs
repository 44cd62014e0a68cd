// 🏗️ Fluent Builder
// Accumulate raw field values, validate each step, report everything at build()
//
// State machine: Empty → Accumulating → (Built | Failed)
// Built and Failed are terminal; the builder is consumed either way.

use crate::config::ModelConfig;
use crate::entities::{CardPayment, Entity, EntityKind, HourlyEmployee, SalariedEmployee, WalletPayment};
use crate::error::{EntityError, FieldViolation};
use crate::schema::{FieldSet, Schema};
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, info, warn};

// ============================================================================
// BUILDABLE
// ============================================================================

/// Buildable - a variant that can be assembled from validated fields
pub trait Buildable: Entity + Sized {
    const KIND: EntityKind;

    /// Fields this kind accepts, with limits taken from `config`
    fn schema(config: &ModelConfig) -> Schema;

    /// Move validated fields into a new entity with a fresh identity
    fn assemble(fields: &mut FieldSet) -> Result<Self, EntityError>;
}

// ============================================================================
// BUILDER STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    /// No field applied yet
    Empty,
    /// At least one field applied
    Accumulating,
    /// `build()` returned an entity
    Built,
    /// `build()` returned an error
    Failed,
}

impl BuilderState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuilderState::Built | BuilderState::Failed)
    }
}

/// One applied step, for diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub field: String,
    pub value: Value,
    pub accepted: bool,
}

// ============================================================================
// ENTITY BUILDER
// ============================================================================

pub struct EntityBuilder<V: Buildable> {
    schema: Schema,
    fields: FieldSet,
    rejected: Vec<FieldViolation>,
    steps: Vec<StepRecord>,
    state: BuilderState,
    /// Misuse swallowed by the chainable `with_field`
    last_error: Option<EntityError>,
    _variant: PhantomData<V>,
}

impl<V: Buildable> EntityBuilder<V> {
    pub fn new() -> Self {
        Self::with_config(&ModelConfig::default())
    }

    pub fn with_config(config: &ModelConfig) -> Self {
        EntityBuilder {
            schema: V::schema(config),
            fields: FieldSet::new(V::KIND),
            rejected: Vec::new(),
            steps: Vec::new(),
            state: BuilderState::Empty,
            last_error: None,
            _variant: PhantomData,
        }
    }

    /// Apply one field; failures are recorded and reported by `build()`
    ///
    /// On a consumed builder the step is dropped and the error is kept in
    /// `last_error()`.
    pub fn with_field(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        if let Err(err) = self.try_with_field(name, value) {
            warn!(kind = %V::KIND, field = name, "{}", err);
            self.last_error = Some(err);
        }
        self
    }

    /// Like `with_field`, but fails once the builder is consumed
    pub fn try_with_field(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<&mut Self, EntityError> {
        if self.state.is_terminal() {
            return Err(EntityError::BuilderAlreadyConsumed { kind: V::KIND });
        }

        let value = value.into();
        let result = match self.fields.get_mut(name) {
            Some(slot) => slot.assign(&value),
            None => self
                .schema
                .coerce(name, &value)
                .map(|slot| self.fields.insert(name, slot)),
        };

        let accepted = result.is_ok();
        if let Err(err) = result {
            debug!(kind = %V::KIND, field = name, "step rejected: {}", err);
            self.rejected.extend(err.into_violations());
        }

        self.steps.push(StepRecord {
            field: name.to_string(),
            value,
            accepted,
        });
        self.state = BuilderState::Accumulating;
        Ok(self)
    }

    /// Finalize: a complete, valid entity or `IncompleteEntity` listing
    /// every missing and rejected field
    pub fn build(&mut self) -> Result<V, EntityError> {
        if self.state.is_terminal() {
            warn!(kind = %V::KIND, "build() called on a consumed builder");
            return Err(EntityError::BuilderAlreadyConsumed { kind: V::KIND });
        }

        self.apply_defaults();

        let missing: Vec<String> = self
            .schema
            .required_fields()
            .into_iter()
            .filter(|name| !self.fields.contains(name))
            .map(str::to_string)
            .collect();

        if !missing.is_empty() || !self.rejected.is_empty() {
            self.state = BuilderState::Failed;
            let err = EntityError::IncompleteEntity {
                kind: V::KIND,
                missing,
                rejected: std::mem::take(&mut self.rejected),
            };
            warn!(kind = %V::KIND, "{}", err);
            return Err(err);
        }

        let mut fields = std::mem::replace(&mut self.fields, FieldSet::new(V::KIND));
        match V::assemble(&mut fields) {
            Ok(entity) => {
                self.state = BuilderState::Built;
                info!(kind = %V::KIND, id = %entity.id(), steps = self.steps.len(), "entity built");
                Ok(entity)
            }
            Err(err) => {
                self.state = BuilderState::Failed;
                warn!(kind = %V::KIND, "{}", err);
                Err(err)
            }
        }
    }

    fn apply_defaults(&mut self) {
        for spec in self.schema.fields() {
            if self.fields.contains(spec.name) {
                continue;
            }
            if let Some(default) = &spec.default_value {
                match spec.slot(default) {
                    Ok(slot) => self.fields.insert(spec.name, slot),
                    Err(err) => self.rejected.extend(err.into_violations()),
                }
            }
        }
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    pub fn is_consumed(&self) -> bool {
        self.state.is_terminal()
    }

    /// Every step applied so far, in order
    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    /// Violations recorded so far; emptied into the error by a failed `build()`
    pub fn rejected(&self) -> &[FieldViolation] {
        &self.rejected
    }

    /// `BuilderAlreadyConsumed` left by a chained call after `build()`
    pub fn last_error(&self) -> Option<&EntityError> {
        self.last_error.as_ref()
    }

    pub fn kind(&self) -> EntityKind {
        V::KIND
    }
}

impl<V: Buildable> Default for EntityBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Buildable> fmt::Debug for EntityBuilder<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityBuilder")
            .field("kind", &V::KIND)
            .field("state", &self.state)
            .field("steps", &self.steps)
            .field("rejected", &self.rejected)
            .field("last_error", &self.last_error)
            .finish()
    }
}

// ============================================================================
// RUNTIME-SELECTED CONSTRUCTION
// ============================================================================

/// Build any kind from raw key/value input
pub fn build_entity(
    kind: EntityKind,
    input: &Map<String, Value>,
    config: &ModelConfig,
) -> Result<Box<dyn Entity>, EntityError> {
    match kind {
        EntityKind::Salaried => build_boxed::<SalariedEmployee>(input, config),
        EntityKind::Hourly => build_boxed::<HourlyEmployee>(input, config),
        EntityKind::CardPayment => build_boxed::<CardPayment>(input, config),
        EntityKind::WalletPayment => build_boxed::<WalletPayment>(input, config),
    }
}

fn build_boxed<V: Buildable + 'static>(
    input: &Map<String, Value>,
    config: &ModelConfig,
) -> Result<Box<dyn Entity>, EntityError> {
    let mut builder = EntityBuilder::<V>::with_config(config);
    for (name, value) in input {
        builder.with_field(name, value.clone());
    }
    let entity = builder.build()?;
    Ok(Box::new(entity))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ADDRESS: &str = "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkf";

    #[test]
    fn test_rejected_rate_fails_build_naming_rate() {
        let mut builder = EntityBuilder::<HourlyEmployee>::new();
        builder.with_field("name", "Alan").with_field("rate", -5);

        assert_eq!(builder.rejected().len(), 1);
        assert_eq!(builder.rejected()[0].field, "rate");
        assert_eq!(builder.rejected()[0].value, "-5");

        let err = builder.build().unwrap_err();
        assert!(matches!(err, EntityError::IncompleteEntity { .. }));
        assert!(err.mentions_field("rate"));
        assert_eq!(builder.state(), BuilderState::Failed);
    }

    #[test]
    fn test_hourly_builder_scenario() {
        let employee = EntityBuilder::<HourlyEmployee>::new()
            .with_field("name", "Alan")
            .with_field("rate", 50)
            .with_field("hours", 160)
            .build()
            .unwrap();

        assert_eq!(employee.compute_value(), 8000.0);
        assert_eq!(employee.kind(), EntityKind::Hourly);
    }

    #[test]
    fn test_state_transitions() {
        let mut builder = EntityBuilder::<SalariedEmployee>::new();
        assert_eq!(builder.state(), BuilderState::Empty);

        builder.with_field("name", "Grace");
        assert_eq!(builder.state(), BuilderState::Accumulating);

        builder.with_field("base_salary", 5000);
        builder.build().unwrap();
        assert_eq!(builder.state(), BuilderState::Built);
        assert!(builder.is_consumed());
    }

    #[test]
    fn test_build_from_empty_lists_every_required_field() {
        let mut builder = EntityBuilder::<CardPayment>::new();
        let err = builder.build().unwrap_err();

        match &err {
            EntityError::IncompleteEntity { missing, rejected, .. } => {
                assert_eq!(missing, &vec!["name", "amount", "card_number"]);
                assert!(rejected.is_empty());
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(builder.state(), BuilderState::Failed);
    }

    #[test]
    fn test_accumulates_every_rejection() {
        let mut builder = EntityBuilder::<WalletPayment>::new();
        builder
            .with_field("name", "")
            .with_field("amount", "lots")
            .with_field("address", ADDRESS)
            .with_field("memo", "thanks");

        let err = builder.build().unwrap_err();
        assert!(err.mentions_field("name"));
        assert!(err.mentions_field("amount"));
        assert!(err.mentions_field("memo"));
        assert!(!err.mentions_field("address"));
        assert_eq!(err.violations().len(), 3);
    }

    #[test]
    fn test_consumed_builder_rejects_every_call() {
        let mut builder = EntityBuilder::<SalariedEmployee>::new();
        builder.with_field("name", "Grace").with_field("base_salary", 5000);
        builder.build().unwrap();

        let again = builder.build().unwrap_err();
        assert_eq!(
            again,
            EntityError::BuilderAlreadyConsumed {
                kind: EntityKind::Salaried
            }
        );

        let step = builder.try_with_field("allowance", 100).unwrap_err();
        assert!(matches!(step, EntityError::BuilderAlreadyConsumed { .. }));

        // The chainable form applies nothing after consumption
        builder.with_field("allowance", 100);
        assert_eq!(builder.steps().len(), 2);
        assert_eq!(
            builder.last_error(),
            Some(&EntityError::BuilderAlreadyConsumed {
                kind: EntityKind::Salaried
            })
        );
        assert!(matches!(
            builder.build(),
            Err(EntityError::BuilderAlreadyConsumed { .. })
        ));
    }

    #[test]
    fn test_chained_call_after_build_leaves_consumed_error() {
        let mut builder = EntityBuilder::<HourlyEmployee>::new();
        builder
            .with_field("name", "Alan")
            .with_field("rate", 50)
            .with_field("hours", 160);
        assert!(builder.last_error().is_none());

        builder.build().unwrap();
        builder.with_field("rate", 60).with_field("hours", 170);

        assert!(matches!(
            builder.last_error(),
            Some(EntityError::BuilderAlreadyConsumed {
                kind: EntityKind::Hourly
            })
        ));
        assert_eq!(builder.steps().len(), 3);
        assert!(builder.rejected().is_empty());
        assert_eq!(builder.state(), BuilderState::Built);
    }

    #[test]
    fn test_rejected_step_is_not_a_builder_error() {
        let mut builder = EntityBuilder::<HourlyEmployee>::new();
        builder.with_field("rate", -5);
        assert!(builder.last_error().is_none());
        assert_eq!(builder.rejected().len(), 1);
    }

    #[test]
    fn test_failed_builder_is_also_consumed() {
        let mut builder = EntityBuilder::<HourlyEmployee>::new();
        assert!(builder.build().is_err());
        assert!(matches!(
            builder.try_with_field("rate", 50),
            Err(EntityError::BuilderAlreadyConsumed { .. })
        ));
    }

    #[test]
    fn test_chained_and_separate_steps_build_the_same_entity() {
        let chained = EntityBuilder::<HourlyEmployee>::new()
            .with_field("name", "Alan")
            .with_field("rate", 50)
            .with_field("hours", 160)
            .build()
            .unwrap();

        let mut builder = EntityBuilder::<HourlyEmployee>::new();
        builder.with_field("name", "Alan");
        builder.with_field("rate", 50);
        builder.with_field("hours", 160);
        let separate = builder.build().unwrap();

        assert_eq!(chained.fingerprint(), separate.fingerprint());
        assert_ne!(chained.id(), separate.id());
    }

    #[test]
    fn test_later_valid_write_overwrites_earlier_one() {
        let employee = EntityBuilder::<HourlyEmployee>::new()
            .with_field("name", "Alan")
            .with_field("rate", 40)
            .with_field("rate", 50)
            .with_field("hours", 160)
            .build()
            .unwrap();
        assert_eq!(employee.rate(), 50.0);
    }

    #[test]
    fn test_rejection_is_not_erased_by_later_write() {
        let mut builder = EntityBuilder::<HourlyEmployee>::new();
        builder
            .with_field("name", "Alan")
            .with_field("rate", -5)
            .with_field("rate", 50)
            .with_field("hours", 160);

        let err = builder.build().unwrap_err();
        match err {
            EntityError::IncompleteEntity { missing, rejected, .. } => {
                assert!(missing.is_empty());
                assert_eq!(rejected.len(), 1);
                assert_eq!(rejected[0].value, "-5");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_step_log_records_order_and_outcome() {
        let mut builder = EntityBuilder::<HourlyEmployee>::new();
        builder.with_field("rate", -5).with_field("rate", 50);

        let steps = builder.steps();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].value, json!(-5));
        assert!(!steps[0].accepted);
        assert!(steps[1].accepted);
    }

    #[test]
    fn test_defaults_fill_optional_fields() {
        let config = ModelConfig {
            default_currency: "MXN".to_string(),
            default_allowance: 250.0,
            ..ModelConfig::default()
        };

        let payment = EntityBuilder::<CardPayment>::with_config(&config)
            .with_field("name", "Invoice 42")
            .with_field("amount", 120.5)
            .with_field("card_number", "4111111111111111")
            .build()
            .unwrap();
        assert_eq!(payment.currency(), "MXN");

        let employee = EntityBuilder::<SalariedEmployee>::with_config(&config)
            .with_field("name", "Grace")
            .with_field("base_salary", 5000)
            .build()
            .unwrap();
        assert_eq!(employee.compute_value(), 5250.0);
    }

    #[test]
    fn test_build_entity_dispatches_on_kind() {
        let config = ModelConfig::default();
        let input = json!({
            "name": "Grace",
            "base_salary": 5000,
            "allowance": 1000,
        });
        let entity = build_entity(
            EntityKind::Salaried,
            input.as_object().unwrap(),
            &config,
        )
        .unwrap();

        assert_eq!(entity.kind(), EntityKind::Salaried);
        assert_eq!(entity.compute_value(), 6000.0);
        assert!(entity.describe().contains("Grace"));
    }

    #[test]
    fn test_build_entity_reports_fields_of_wrong_kind() {
        let config = ModelConfig::default();
        let input = json!({ "name": "Alan", "rate": 50, "hours": 160 });
        let err = build_entity(EntityKind::Salaried, input.as_object().unwrap(), &config)
            .unwrap_err();

        assert!(err.mentions_field("base_salary"));
        assert!(err.mentions_field("rate"));
        assert!(err.mentions_field("hours"));
    }
}
