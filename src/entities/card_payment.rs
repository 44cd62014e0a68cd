// 💳 Card Payment - value = amount, tagged with the masked card
//
// The full card number is validated on the way in but never serialized.

use super::{base_description, name_spec, Entity, EntityCore, EntityKind};
use crate::builder::Buildable;
use crate::config::ModelConfig;
use crate::error::EntityError;
use crate::field::ValidatedField;
use crate::rules::{NumberRule, TextRule};
use crate::schema::{FieldSet, FieldSpec, Schema};
use serde::Serialize;

pub(crate) fn currency_spec(config: &ModelConfig) -> FieldSpec {
    FieldSpec::text("currency", vec![TextRule::Pattern("^[A-Z]{3}$".to_string())])
        .with_default(config.default_currency.clone())
        .with_description("ISO 4217 currency code")
}

pub(crate) fn amount_spec(config: &ModelConfig) -> FieldSpec {
    FieldSpec::number(
        "amount",
        vec![NumberRule::Positive, NumberRule::Max(config.max_payment_amount)],
    )
    .with_description("Amount charged")
}

#[derive(Debug, Serialize)]
pub struct CardPayment {
    #[serde(flatten)]
    core: EntityCore,
    amount: ValidatedField<f64>,
    #[serde(skip)]
    card_number: ValidatedField<String>,
    /// "*1234"
    card: String,
    currency: ValidatedField<String>,
}

impl CardPayment {
    pub fn new(
        name: impl Into<String>,
        amount: f64,
        card_number: impl Into<String>,
        currency: impl Into<String>,
    ) -> Result<Self, EntityError> {
        Self::with_config(&ModelConfig::default(), name, amount, card_number, currency)
    }

    pub fn with_config(
        config: &ModelConfig,
        name: impl Into<String>,
        amount: f64,
        card_number: impl Into<String>,
        currency: impl Into<String>,
    ) -> Result<Self, EntityError> {
        let schema = Self::schema(config);
        match (
            schema.text_field("name", name),
            schema.number_field("amount", amount),
            schema.text_field("card_number", card_number),
            schema.text_field("currency", currency),
        ) {
            (Ok(name), Ok(amount), Ok(card_number), Ok(currency)) => {
                Ok(Self::from_fields(name, amount, card_number, currency))
            }
            (name, amount, card_number, currency) => Err(EntityError::invalid_entity(
                Self::KIND,
                [name.err(), amount.err(), card_number.err(), currency.err()],
            )),
        }
    }

    fn from_fields(
        name: ValidatedField<String>,
        amount: ValidatedField<f64>,
        card_number: ValidatedField<String>,
        currency: ValidatedField<String>,
    ) -> Self {
        let card = Self::mask_card_number(card_number.get());
        CardPayment {
            core: EntityCore::new(name),
            amount,
            card_number,
            card,
            currency,
        }
    }

    /// Mask card number (show only last 4 digits)
    ///
    /// Example: "4111111111111111" → "*1111"
    pub fn mask_card_number(full_number: &str) -> String {
        let count = full_number.chars().count();
        if count <= 4 {
            return full_number.to_string();
        }
        let last4: String = full_number.chars().skip(count - 4).collect();
        format!("*{}", last4)
    }

    pub fn masked_card(&self) -> &str {
        &self.card
    }

    pub fn amount(&self) -> f64 {
        self.amount.value()
    }

    pub fn currency(&self) -> &str {
        self.currency.get()
    }

    /// Same card, same currency; only the amount may be corrected
    pub fn set_amount(&mut self, amount: f64) -> Result<(), EntityError> {
        self.amount.set(amount)
    }

    /// True when both charges hit the same card
    pub fn same_card(&self, other: &CardPayment) -> bool {
        self.card_number.get() == other.card_number.get()
    }
}

impl Entity for CardPayment {
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
        self.amount.value()
    }

    fn describe(&self) -> String {
        format!(
            "{} {} via card {}",
            base_description(self),
            self.currency(),
            self.card
        )
    }
}

impl Buildable for CardPayment {
    const KIND: EntityKind = EntityKind::CardPayment;

    fn schema(config: &ModelConfig) -> Schema {
        Schema::new(
            Self::KIND,
            vec![
                name_spec(),
                amount_spec(config),
                FieldSpec::text("card_number", vec![TextRule::Digits { min: 12, max: 19 }])
                    .with_description("Primary account number, digits only"),
                currency_spec(config),
            ],
        )
    }

    fn assemble(fields: &mut FieldSet) -> Result<Self, EntityError> {
        let name = fields.take_text("name")?;
        let amount = fields.take_number("amount")?;
        let card_number = fields.take_text("card_number")?;
        let currency = fields.take_text("currency")?;
        Ok(Self::from_fields(name, amount, card_number, currency))
    }
}

// ============================================================================
// TESTS
// ============================================================================
