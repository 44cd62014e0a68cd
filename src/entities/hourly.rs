// ⏱️ Hourly Employee - value = rate × hours logged

use super::{name_spec, Entity, EntityCore, EntityKind};
use crate::builder::Buildable;
use crate::config::ModelConfig;
use crate::error::EntityError;
use crate::field::{Invariant, ValidatedField};
use crate::rules::NumberRule;
use crate::schema::{FieldSet, FieldSpec, Schema};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HourlyEmployee {
    #[serde(flatten)]
    core: EntityCore,

    /// Pay per hour, bounded by `max_hourly_rate`
    rate: ValidatedField<f64>,

    /// Hours logged this period, bounded by `max_hours_per_period`
    hours: ValidatedField<f64>,
}

impl HourlyEmployee {
    pub fn new(name: impl Into<String>, rate: f64, hours: f64) -> Result<Self, EntityError> {
        Self::with_config(&ModelConfig::default(), name, rate, hours)
    }

    /// Atomic construction: every field valid, or no entity
    pub fn with_config(
        config: &ModelConfig,
        name: impl Into<String>,
        rate: f64,
        hours: f64,
    ) -> Result<Self, EntityError> {
        let schema = Self::schema(config);
        match (
            schema.text_field("name", name),
            schema.number_field("rate", rate),
            schema.number_field("hours", hours),
        ) {
            (Ok(name), Ok(rate), Ok(hours)) => Ok(Self::from_fields(name, rate, hours)),
            (name, rate, hours) => Err(EntityError::invalid_entity(
                Self::KIND,
                [name.err(), rate.err(), hours.err()],
            )),
        }
    }

    fn from_fields(
        name: ValidatedField<String>,
        rate: ValidatedField<f64>,
        hours: ValidatedField<f64>,
    ) -> Self {
        HourlyEmployee {
            core: EntityCore::new(name),
            rate,
            hours,
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate.value()
    }

    pub fn hours(&self) -> f64 {
        self.hours.value()
    }

    pub fn set_rate(&mut self, rate: f64) -> Result<(), EntityError> {
        self.rate.set(rate)
    }

    /// Add worked hours; the period total must stay within its bound
    pub fn log_hours(&mut self, worked: f64) -> Result<(), EntityError> {
        let worked = ValidatedField::create(
            "worked",
            worked,
            Invariant::from_number_rules(&[NumberRule::Positive]),
        )?;
        self.hours.set(self.hours.value() + worked.value())
    }

    /// Start a new period
    pub fn reset_hours(&mut self) -> Result<(), EntityError> {
        self.hours.set(0.0)
    }
}

impl Entity for HourlyEmployee {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn kind(&self) -> EntityKind {
        Self::KIND
    }

    fn compute_value(&self) -> f64 {
        self.rate.value() * self.hours.value()
    }
}

impl Buildable for HourlyEmployee {
    const KIND: EntityKind = EntityKind::Hourly;

    fn schema(config: &ModelConfig) -> Schema {
        Schema::new(
            Self::KIND,
            vec![
                name_spec(),
                FieldSpec::number(
                    "rate",
                    vec![NumberRule::Positive, NumberRule::Max(config.max_hourly_rate)],
                )
                    .with_description("Pay per hour"),
                FieldSpec::number(
                    "hours",
                    vec![NumberRule::NonNegative, NumberRule::Max(config.max_hours_per_period)],
                )
                .with_description("Hours logged this period"),
            ],
        )
    }

    fn assemble(fields: &mut FieldSet) -> Result<Self, EntityError> {
        let name = fields.take_text("name")?;
        let rate = fields.take_number("rate")?;
        let hours = fields.take_number("hours")?;
        Ok(Self::from_fields(name, rate, hours))
    }
}

// ============================================================================
// TESTS
// ============================================================================
