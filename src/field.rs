// 🔒 Validated Field
// A value that can never hold something its own invariant rejects

use crate::error::{EntityError, FieldViolation};
use crate::rules::{CompiledTextRule, NumberRule, TextRule};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// INVARIANT
// ============================================================================

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Invariant predicate plus the reason reported when it fails.
///
/// The predicate must be deterministic and side-effect-free.
pub struct Invariant<T> {
    description: String,
    predicate: Predicate<T>,
}

impl<T> Invariant<T> {
    pub fn new<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Invariant {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Accept every value
    pub fn any() -> Self {
        Invariant::new("any value", |_| true)
    }

    pub fn holds(&self, value: &T) -> bool {
        (self.predicate)(value)
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl Invariant<f64> {
    /// All rules must hold; `Finite` is always implied.
    pub fn from_number_rules(rules: &[NumberRule]) -> Self {
        let mut rules = rules.to_vec();
        if !rules.contains(&NumberRule::Finite) {
            rules.insert(0, NumberRule::Finite);
        }
        let description = rules
            .iter()
            .map(|r| r.description())
            .collect::<Vec<_>>()
            .join(" and ");
        Invariant::new(description, move |v: &f64| rules.iter().all(|r| r.check(*v)))
    }
}

impl Invariant<String> {
    pub fn from_text_rules(rules: &[TextRule]) -> Self {
        let description = if rules.is_empty() {
            "any text".to_string()
        } else {
            rules
                .iter()
                .map(|r| r.description())
                .collect::<Vec<_>>()
                .join(" and ")
        };
        let compiled: Vec<CompiledTextRule> = rules.iter().map(TextRule::compile).collect();
        Invariant::new(description, move |v: &String| compiled.iter().all(|r| r.check(v)))
    }
}

impl<T> Clone for Invariant<T> {
    fn clone(&self) -> Self {
        Invariant {
            description: self.description.clone(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> fmt::Debug for Invariant<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invariant")
            .field("description", &self.description)
            .finish()
    }
}

// ============================================================================
// VALIDATED FIELD
// ============================================================================

/// ValidatedField - scalar holder guarded by an invariant
///
/// `invariant.holds(get())` is true from construction onwards. A rejected
/// `set` leaves the previous value in place.
#[derive(Clone)]
pub struct ValidatedField<T> {
    name: String,
    value: T,
    invariant: Invariant<T>,
}

impl<T: fmt::Display> ValidatedField<T> {
    /// Create a field, failing with `InvalidValue` if `initial` is rejected
    pub fn create(
        name: impl Into<String>,
        initial: T,
        invariant: Invariant<T>,
    ) -> Result<Self, EntityError> {
        let name = name.into();
        if !invariant.holds(&initial) {
            debug!(field = %name, value = %initial, "rejected initial value");
            return Err(violation(&name, &initial, &invariant));
        }
        Ok(ValidatedField {
            name,
            value: initial,
            invariant,
        })
    }

    /// Replace the value, or leave it untouched and fail with `InvalidValue`
    pub fn set(&mut self, value: T) -> Result<(), EntityError> {
        if !self.invariant.holds(&value) {
            debug!(field = %self.name, value = %value, "rejected write");
            return Err(violation(&self.name, &value, &self.invariant));
        }
        self.value = value;
        Ok(())
    }
}

impl<T> ValidatedField<T> {
    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn invariant(&self) -> &Invariant<T> {
        &self.invariant
    }
}

impl<T: Copy> ValidatedField<T> {
    /// Copy out the current value
    pub fn value(&self) -> T {
        self.value
    }
}

fn violation<T: fmt::Display>(name: &str, value: &T, invariant: &Invariant<T>) -> EntityError {
    EntityError::InvalidValue(FieldViolation::new(
        name,
        value.to_string(),
        invariant.description(),
    ))
}

impl<T: fmt::Debug> fmt::Debug for ValidatedField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedField")
            .field("name", &self.name)
            .field("value", &self.value)
            .finish()
    }
}

/// Serializes as the bare value
impl<T: Serialize> Serialize for ValidatedField<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn positive() -> Invariant<f64> {
        Invariant::from_number_rules(&[NumberRule::Positive])
    }

    #[test]
    fn test_create_valid_value() {
        let field = ValidatedField::create("rate", 50.0, positive()).unwrap();
        assert_eq!(*field.get(), 50.0);
        assert_eq!(field.value(), 50.0);
        assert_eq!(field.name(), "rate");
    }

    #[test]
    fn test_create_rejects_invalid_value() {
        let err = ValidatedField::create("rate", -5.0, positive()).unwrap_err();
        match err {
            EntityError::InvalidValue(v) => {
                assert_eq!(v.field, "rate");
                assert_eq!(v.value, "-5");
                assert!(v.reason.contains("greater than 0"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rejected_set_leaves_value_intact() {
        let mut field = ValidatedField::create("rate", 50.0, positive()).unwrap();

        assert!(field.set(-5.0).is_err());
        assert_eq!(field.value(), 50.0);

        // Rejection is idempotent
        assert!(field.set(-5.0).is_err());
        assert_eq!(field.value(), 50.0);

        assert!(field.set(75.0).is_ok());
        assert_eq!(field.value(), 75.0);
    }

    #[test]
    fn test_custom_predicate() {
        let even = Invariant::new("must be even", |v: &i64| v % 2 == 0);
        let mut field = ValidatedField::create("count", 4_i64, even).unwrap();
        assert!(field.set(3).is_err());
        assert_eq!(*field.get(), 4);
    }

    #[test]
    fn test_text_field_reports_raw_value() {
        let invariant = Invariant::from_text_rules(&[TextRule::NonEmpty]);
        let err = ValidatedField::create("name", "  ".to_string(), invariant).unwrap_err();
        let v = err.violations()[0].clone();
        assert_eq!(v.field, "name");
        assert_eq!(v.value, "  ");
        assert_eq!(v.reason, "must not be empty");
    }

    #[test]
    fn test_number_rules_imply_finite() {
        let invariant = Invariant::from_number_rules(&[NumberRule::NonNegative]);
        assert!(!invariant.holds(&f64::INFINITY));
        assert!(invariant.holds(&0.0));
        assert!(invariant.description().contains("finite"));
    }

    #[test]
    fn test_text_pattern_invariant_is_anchored() {
        let invariant = Invariant::from_text_rules(&[TextRule::Pattern("[A-Z]{3}".to_string())]);
        assert!(invariant.holds(&"USD".to_string()));
        assert!(!invariant.holds(&"xxUSDxx".to_string()));
    }

    #[test]
    fn test_serializes_as_bare_value() {
        let field = ValidatedField::create("rate", 50.0, positive()).unwrap();
        assert_eq!(serde_json::to_value(&field).unwrap(), serde_json::json!(50.0));
    }
}
