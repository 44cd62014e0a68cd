// 📐 Shape Layer - Entity Schemas
// Which fields a kind has, how each is validated, and how raw input is coerced

use crate::entities::EntityKind;
use crate::error::{EntityError, FieldViolation};
use crate::field::{Invariant, ValidatedField};
use crate::rules::{NumberRule, TextRule};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// FIELD SPEC
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Number(Vec<NumberRule>),
    Text(Vec<TextRule>),
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Number(_) => "number",
            FieldKind::Text(_) => "text",
        }
    }
}

/// FieldSpec - one named, typed, rule-checked field of a schema
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Applied at build time when the field was never set
    pub default_value: Option<Value>,
    pub description: String,
}

impl FieldSpec {
    pub fn number(name: &'static str, rules: Vec<NumberRule>) -> Self {
        FieldSpec {
            name,
            kind: FieldKind::Number(rules),
            required: true,
            default_value: None,
            description: String::new(),
        }
    }

    pub fn text(name: &'static str, rules: Vec<TextRule>) -> Self {
        FieldSpec {
            name,
            kind: FieldKind::Text(rules),
            required: true,
            default_value: None,
            description: String::new(),
        }
    }

    /// Builder: field may be omitted, falling back to `default`
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.required = false;
        self.default_value = Some(default.into());
        self
    }

    /// Builder: add description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn number_invariant(&self) -> Option<Invariant<f64>> {
        match &self.kind {
            FieldKind::Number(rules) => Some(Invariant::from_number_rules(rules)),
            FieldKind::Text(_) => None,
        }
    }

    pub fn text_invariant(&self) -> Option<Invariant<String>> {
        match &self.kind {
            FieldKind::Text(rules) => Some(Invariant::from_text_rules(rules)),
            FieldKind::Number(_) => None,
        }
    }

    /// Coerce raw input to this field's type and validate it
    pub fn slot(&self, value: &Value) -> Result<FieldSlot, EntityError> {
        match &self.kind {
            FieldKind::Number(rules) => {
                let number = coerce_number(value).ok_or_else(|| self.type_mismatch(value))?;
                ValidatedField::create(self.name, number, Invariant::from_number_rules(rules))
                    .map(FieldSlot::Number)
            }
            FieldKind::Text(rules) => {
                let text = coerce_text(value).ok_or_else(|| self.type_mismatch(value))?;
                ValidatedField::create(self.name, text, Invariant::from_text_rules(rules))
                    .map(FieldSlot::Text)
            }
        }
    }

    fn type_mismatch(&self, value: &Value) -> EntityError {
        EntityError::InvalidValue(FieldViolation::new(
            self.name,
            render_json(value),
            format!("expected {}", self.kind.name()),
        ))
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Strings without their JSON quotes, everything else as JSON
pub fn render_json(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// FIELD SLOT
// ============================================================================

/// A validated field of either supported type
#[derive(Debug, Clone)]
pub enum FieldSlot {
    Number(ValidatedField<f64>),
    Text(ValidatedField<String>),
}

impl FieldSlot {
    /// Validated write of raw input; a rejection leaves the slot unchanged
    pub fn assign(&mut self, value: &Value) -> Result<(), EntityError> {
        match self {
            FieldSlot::Number(field) => match coerce_number(value) {
                Some(number) => field.set(number),
                None => Err(mismatch(field.name(), value, "number")),
            },
            FieldSlot::Text(field) => match coerce_text(value) {
                Some(text) => field.set(text),
                None => Err(mismatch(field.name(), value, "text")),
            },
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldSlot::Number(field) => Value::from(field.value()),
            FieldSlot::Text(field) => Value::from(field.get().clone()),
        }
    }
}

fn mismatch(name: &str, value: &Value, expected: &str) -> EntityError {
    EntityError::InvalidValue(FieldViolation::new(
        name,
        render_json(value),
        format!("expected {}", expected),
    ))
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Schema - the field catalog of one entity kind
#[derive(Debug, Clone)]
pub struct Schema {
    pub kind: EntityKind,
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(kind: EntityKind, fields: Vec<FieldSpec>) -> Self {
        Schema { kind, fields }
    }

    pub fn spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Fields with no default; `build()` fails without them
    pub fn required_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect()
    }

    /// Validate a typed numeric input against this schema
    pub fn number_field(&self, name: &str, value: f64) -> Result<ValidatedField<f64>, EntityError> {
        let invariant = self
            .spec(name)
            .and_then(FieldSpec::number_invariant)
            .ok_or_else(|| self.unknown(name, &value.to_string()))?;
        ValidatedField::create(name, value, invariant)
    }

    /// Validate a typed text input against this schema
    pub fn text_field(
        &self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<ValidatedField<String>, EntityError> {
        let value = value.into();
        let invariant = self
            .spec(name)
            .and_then(FieldSpec::text_invariant)
            .ok_or_else(|| self.unknown(name, &value))?;
        ValidatedField::create(name, value, invariant)
    }

    /// Raw input → validated slot, rejecting names this kind doesn't have
    pub fn coerce(&self, name: &str, value: &Value) -> Result<FieldSlot, EntityError> {
        match self.spec(name) {
            Some(spec) => spec.slot(value),
            None => Err(self.unknown(name, &render_json(value))),
        }
    }

    fn unknown(&self, name: &str, value: &str) -> EntityError {
        EntityError::InvalidValue(FieldViolation::new(
            name,
            value,
            format!("not a field of {}", self.kind),
        ))
    }
}

// ============================================================================
// FIELD SET
// ============================================================================

/// FieldSet - validated fields handed from a builder to entity assembly
#[derive(Debug, Clone)]
pub struct FieldSet {
    kind: EntityKind,
    slots: BTreeMap<String, FieldSlot>,
}

impl FieldSet {
    pub fn new(kind: EntityKind) -> Self {
        FieldSet {
            kind,
            slots: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, slot: FieldSlot) {
        self.slots.insert(name.into(), slot);
    }

    pub fn get(&self, name: &str) -> Option<&FieldSlot> {
        self.slots.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldSlot> {
        self.slots.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn take_number(&mut self, name: &str) -> Result<ValidatedField<f64>, EntityError> {
        match self.slots.remove(name) {
            Some(FieldSlot::Number(field)) => Ok(field),
            _ => Err(self.missing(name)),
        }
    }

    pub fn take_text(&mut self, name: &str) -> Result<ValidatedField<String>, EntityError> {
        match self.slots.remove(name) {
            Some(FieldSlot::Text(field)) => Ok(field),
            _ => Err(self.missing(name)),
        }
    }

    fn missing(&self, name: &str) -> EntityError {
        EntityError::IncompleteEntity {
            kind: self.kind,
            missing: vec![name.to_string()],
            rejected: Vec::new(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
