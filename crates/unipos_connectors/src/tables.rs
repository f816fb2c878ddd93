//! Per-gateway translation tables.
//!
//! Each gateway family declares one static [`GatewayTables`] record and the
//! generic mapper code looks canonical values up through it. Every lookup
//! that misses returns [`MappingError::TranslationMissing`]: a canonical
//! value a gateway's supported operations can reach must have an entry, so
//! a miss is a configuration/programming error, uniformly for every table
//! and every gateway, never a recoverable runtime condition.

use error_stack::report;
use unipos_domain_models::{
    CardBrand, Currency, MappingError, MappingResult, PaymentModel, RecurringCycle, TxType,
};

/// Static translation record for one gateway family.
pub struct GatewayTables {
    /// Gateway identifier, used in error reports.
    pub gateway: &'static str,
    pub tx_types: &'static [(TxType, &'static str)],
    pub currencies: &'static [(Currency, &'static str)],
    pub card_brands: &'static [(CardBrand, &'static str)],
    pub recurring_cycles: &'static [(RecurringCycle, &'static str)],
    pub secure_models: &'static [(PaymentModel, &'static str)],
    /// Procedure return code(s) this gateway reports on success.
    pub success_codes: &'static [&'static str],
}

impl GatewayTables {
    fn lookup<K: Copy + PartialEq + std::fmt::Display>(
        entries: &'static [(K, &'static str)],
        table: &'static str,
        value: K,
    ) -> MappingResult<&'static str> {
        entries
            .iter()
            .find(|(key, _)| *key == value)
            .map(|(_, token)| *token)
            .ok_or_else(|| {
                report!(MappingError::TranslationMissing {
                    table,
                    value: value.to_string(),
                })
            })
    }

    /// Gateway token for a transaction type.
    pub fn tx_type(&self, value: TxType) -> MappingResult<&'static str> {
        Self::lookup(self.tx_types, "tx_type", value)
    }

    /// Canonical transaction type for a gateway token, for replies that
    /// echo the transaction type back.
    pub fn tx_type_from_token(&self, token: &str) -> Option<TxType> {
        self.tx_types
            .iter()
            .find(|(_, entry)| *entry == token)
            .map(|(value, _)| *value)
    }

    /// Gateway token for a currency.
    pub fn currency(&self, value: Currency) -> MappingResult<&'static str> {
        Self::lookup(self.currencies, "currency", value)
    }

    /// Canonical currency for a gateway token.
    pub fn currency_from_token(&self, token: &str) -> Option<Currency> {
        self.currencies
            .iter()
            .find(|(_, entry)| *entry == token)
            .map(|(value, _)| *value)
    }

    /// Gateway code for a card brand.
    pub fn card_brand(&self, value: CardBrand) -> MappingResult<&'static str> {
        Self::lookup(self.card_brands, "card_brand", value)
    }

    /// Gateway token for a recurring frequency unit.
    pub fn recurring_cycle(&self, value: RecurringCycle) -> MappingResult<&'static str> {
        Self::lookup(self.recurring_cycles, "recurring_cycle", value)
    }

    /// Gateway token for a security model.
    pub fn secure_model(&self, value: PaymentModel) -> MappingResult<&'static str> {
        Self::lookup(self.secure_models, "secure_model", value)
    }

    /// Whether `code` is one of this gateway's success return codes.
    pub fn is_success_code(&self, code: &str) -> bool {
        self.success_codes.contains(&code)
    }
}
