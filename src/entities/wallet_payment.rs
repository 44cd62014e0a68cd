// 👛 Wallet Payment - value = amount, tagged with the destination address

use super::card_payment::{amount_spec, currency_spec};
use super::{base_description, name_spec, Entity, EntityCore, EntityKind};
use crate::builder::Buildable;
use crate::config::ModelConfig;
use crate::error::EntityError;
use crate::field::ValidatedField;
use crate::rules::TextRule;
use crate::schema::{FieldSet, FieldSpec, Schema};
use serde::Serialize;

const ADDRESS_PATTERN: &str = "^[A-Za-z0-9]{16,64}$";

#[derive(Debug, Serialize)]
pub struct WalletPayment {
    #[serde(flatten)]
    core: EntityCore,
    amount: ValidatedField<f64>,
    address: ValidatedField<String>,
    currency: ValidatedField<String>,
}

impl WalletPayment {
    pub fn new(
        name: impl Into<String>,
        amount: f64,
        address: impl Into<String>,
        currency: impl Into<String>,
    ) -> Result<Self, EntityError> {
        Self::with_config(&ModelConfig::default(), name, amount, address, currency)
    }

    pub fn with_config(
        config: &ModelConfig,
        name: impl Into<String>,
        amount: f64,
        address: impl Into<String>,
        currency: impl Into<String>,
    ) -> Result<Self, EntityError> {
        let schema = Self::schema(config);
        match (
            schema.text_field("name", name),
            schema.number_field("amount", amount),
            schema.text_field("address", address),
            schema.text_field("currency", currency),
        ) {
            (Ok(name), Ok(amount), Ok(address), Ok(currency)) => {
                Ok(Self::from_fields(name, amount, address, currency))
            }
            (name, amount, address, currency) => Err(EntityError::invalid_entity(
                Self::KIND,
                [name.err(), amount.err(), address.err(), currency.err()],
            )),
        }
    }

    fn from_fields(
        name: ValidatedField<String>,
        amount: ValidatedField<f64>,
        address: ValidatedField<String>,
        currency: ValidatedField<String>,
    ) -> Self {
        WalletPayment {
            core: EntityCore::new(name),
            amount,
            address,
            currency,
        }
    }

    pub fn address(&self) -> &str {
        self.address.get()
    }

    /// First 6 and last 4 characters, e.g. "bc1qxy...3kkf"
    pub fn short_address(&self) -> String {
        let address = self.address.get();
        // ASCII-only by pattern, so byte slicing is safe
        format!("{}...{}", &address[..6], &address[address.len() - 4..])
    }

    pub fn amount(&self) -> f64 {
        self.amount.value()
    }

    pub fn currency(&self) -> &str {
        self.currency.get()
    }

    pub fn set_amount(&mut self, amount: f64) -> Result<(), EntityError> {
        self.amount.set(amount)
    }
}

impl Entity for WalletPayment {
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
            "{} {} to wallet {}",
            base_description(self),
            self.currency(),
            self.address()
        )
    }
}

impl Buildable for WalletPayment {
    const KIND: EntityKind = EntityKind::WalletPayment;

    fn schema(config: &ModelConfig) -> Schema {
        Schema::new(
            Self::KIND,
            vec![
                name_spec(),
                amount_spec(config),
                FieldSpec::text("address", vec![TextRule::Pattern(ADDRESS_PATTERN.to_string())])
                    .with_description("Destination wallet address"),
                currency_spec(config),
            ],
        )
    }

    fn assemble(fields: &mut FieldSet) -> Result<Self, EntityError> {
        let name = fields.take_text("name")?;
        let amount = fields.take_number("amount")?;
        let address = fields.take_text("address")?;
        let currency = fields.take_text("currency")?;
        Ok(Self::from_fields(name, amount, address, currency))
    }
}

// ============================================================================
// TESTS
// ============================================================================
