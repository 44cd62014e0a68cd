// 💼 Salaried Employee - value = base salary + fixed allowance

use super::{name_spec, Entity, EntityCore, EntityKind};
use crate::builder::Buildable;
use crate::config::ModelConfig;
use crate::error::EntityError;
use crate::field::{Invariant, ValidatedField};
use crate::rules::NumberRule;
use crate::schema::{FieldSet, FieldSpec, Schema};
use serde::Serialize;

fn salary_rules(config: &ModelConfig) -> Vec<NumberRule> {
    vec![NumberRule::NonNegative, NumberRule::Max(config.max_salary)]
}

#[derive(Debug, Serialize)]
pub struct SalariedEmployee {
    #[serde(flatten)]
    core: EntityCore,
    base_salary: ValidatedField<f64>,
    allowance: ValidatedField<f64>,
}

impl SalariedEmployee {
    pub fn new(name: impl Into<String>, base_salary: f64, allowance: f64) -> Result<Self, EntityError> {
        Self::with_config(&ModelConfig::default(), name, base_salary, allowance)
    }

    pub fn with_config(
        config: &ModelConfig,
        name: impl Into<String>,
        base_salary: f64,
        allowance: f64,
    ) -> Result<Self, EntityError> {
        let schema = Self::schema(config);
        match (
            schema.text_field("name", name),
            schema.number_field("base_salary", base_salary),
            schema.number_field("allowance", allowance),
        ) {
            (Ok(name), Ok(base), Ok(allowance)) => Ok(Self::from_fields(name, base, allowance)),
            (name, base, allowance) => Err(EntityError::invalid_entity(
                Self::KIND,
                [name.err(), base.err(), allowance.err()],
            )),
        }
    }

    fn from_fields(
        name: ValidatedField<String>,
        base_salary: ValidatedField<f64>,
        allowance: ValidatedField<f64>,
    ) -> Self {
        SalariedEmployee {
            core: EntityCore::new(name),
            base_salary,
            allowance,
        }
    }

    pub fn base_salary(&self) -> f64 {
        self.base_salary.value()
    }

    pub fn allowance(&self) -> f64 {
        self.allowance.value()
    }

    /// Raise the base salary by a positive amount
    pub fn promote(&mut self, raise: f64) -> Result<(), EntityError> {
        let raise = ValidatedField::create(
            "raise",
            raise,
            Invariant::from_number_rules(&[NumberRule::Positive]),
        )?;
        self.base_salary.set(self.base_salary.value() + raise.value())
    }

    pub fn set_allowance(&mut self, allowance: f64) -> Result<(), EntityError> {
        self.allowance.set(allowance)
    }
}

impl Entity for SalariedEmployee {
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
        self.base_salary.value() + self.allowance.value()
    }
}

impl Buildable for SalariedEmployee {
    const KIND: EntityKind = EntityKind::Salaried;

    fn schema(config: &ModelConfig) -> Schema {
        Schema::new(
            Self::KIND,
            vec![
                name_spec(),
                FieldSpec::number("base_salary", salary_rules(config))
                    .with_description("Base pay per period"),
                FieldSpec::number("allowance", salary_rules(config))
                    .with_default(config.default_allowance)
                    .with_description("Fixed allowance added to every period"),
            ],
        )
    }

    fn assemble(fields: &mut FieldSet) -> Result<Self, EntityError> {
        let name = fields.take_text("name")?;
        let base_salary = fields.take_number("base_salary")?;
        let allowance = fields.take_number("allowance")?;
        Ok(Self::from_fields(name, base_salary, allowance))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salaried_value_is_base_plus_allowance() {
        let employee = SalariedEmployee::new("Grace", 5000.0, 1000.0).unwrap();
        assert_eq!(employee.compute_value(), 6000.0);
        assert!(employee.describe().contains("Grace"));
    }

    #[test]
    fn test_salaried_rejects_negative_inputs() {
        let err = SalariedEmployee::new("Grace", -1.0, -1.0).unwrap_err();
        assert_eq!(err.violations().len(), 2);
        assert!(err.mentions_field("base_salary"));
        assert!(err.mentions_field("allowance"));
    }

    #[test]
    fn test_promote_raises_base() {
        let mut employee = SalariedEmployee::new("Grace", 5000.0, 1000.0).unwrap();
        employee.promote(500.0).unwrap();
        assert_eq!(employee.base_salary(), 5500.0);
        assert_eq!(employee.compute_value(), 6500.0);
    }

    #[test]
    fn test_promote_rejects_non_positive_raise() {
        let mut employee = SalariedEmployee::new("Grace", 5000.0, 1000.0).unwrap();
        let err = employee.promote(0.0).unwrap_err();
        assert!(err.mentions_field("raise"));
        assert_eq!(employee.base_salary(), 5000.0);
    }

    #[test]
    fn test_set_allowance() {
        let mut employee = SalariedEmployee::new("Grace", 5000.0, 1000.0).unwrap();
        assert!(employee.set_allowance(-10.0).is_err());
        assert_eq!(employee.allowance(), 1000.0);
        employee.set_allowance(0.0).unwrap();
        assert_eq!(employee.compute_value(), 5000.0);
    }

    #[test]
    fn test_salary_bounded_by_config() {
        let err = SalariedEmployee::new("Grace", 1e308, 1e308).unwrap_err();
        assert!(err.mentions_field("base_salary"));
        assert!(err.mentions_field("allowance"));

        let config = ModelConfig {
            max_salary: 6000.0,
            ..ModelConfig::default()
        };
        let mut employee = SalariedEmployee::with_config(&config, "Grace", 5000.0, 0.0).unwrap();
        assert!(employee.promote(1500.0).is_err());
        assert_eq!(employee.base_salary(), 5000.0);
        employee.promote(1000.0).unwrap();
        assert_eq!(employee.compute_value(), 6000.0);
    }

    #[test]
    fn test_allowance_default_comes_from_config() {
        let config = ModelConfig {
            default_allowance: 250.0,
            ..ModelConfig::default()
        };
        let schema = SalariedEmployee::schema(&config);
        let spec = schema.spec("allowance").unwrap();
        assert!(!spec.required);
        assert_eq!(spec.default_value, Some(serde_json::json!(250.0)));
    }
}
