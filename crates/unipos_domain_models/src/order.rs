//! Order input model.
//!
//! Callers hand the mappers a loosely-typed [`Order`] bag. Each gateway's
//! `prepare_*_order` step turns the bag into one of the per-operation
//! structs below, filling defaults and validating the fields that gateway
//! actually sends. Mapping code downstream of a prepare step only ever
//! reads fields that step populated.

use error_stack::report;
use serde::{Deserialize, Serialize};

use crate::{
    enums::{Currency, RecurringCycle},
    errors::{MappingError, MappingResult},
};

/// Recurring payment parameters attached to an order.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RecurringOrder {
    /// Interval between charges, in units of [`Self::cycle`].
    pub frequency: u32,
    pub cycle: RecurringCycle,
    /// Total number of charges in the series.
    pub installment_count: u32,
    /// Last day the series may charge; gateways that support it refuse end
    /// dates past the card expiry.
    pub end_date: Option<time::Date>,
}

/// The normalized caller input: one bag for every operation.
///
/// Everything is optional here; requiredness is per gateway and per
/// operation, enforced by the prepare steps.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Order {
    pub id: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<Currency>,
    pub installment: Option<u32>,
    pub ip: Option<String>,
    pub email: Option<String>,
    /// Customer/bill-to name.
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub success_url: Option<String>,
    pub fail_url: Option<String>,
    /// Per-request nonce included in 3-D Secure form data.
    pub rand: Option<String>,
    pub lang: Option<String>,
    pub recurring: Option<RecurringOrder>,
    /// Identifier of a recurring series, for status queries.
    pub recurring_id: Option<String>,
    /// Installment number inside a recurring series, for single-installment
    /// cancellation.
    pub recurring_installment_number: Option<u32>,
}

impl Order {
    /// Order id, required by nearly every operation.
    pub fn require_id(&self) -> MappingResult<String> {
        self.id
            .clone()
            .ok_or_else(|| report!(MappingError::MissingRequiredField { field_name: "id" }))
    }

    pub fn require_amount(&self) -> MappingResult<f64> {
        self.amount
            .ok_or_else(|| report!(MappingError::MissingRequiredField { field_name: "amount" }))
    }

    pub fn require_ip(&self) -> MappingResult<String> {
        self.ip
            .clone()
            .ok_or_else(|| report!(MappingError::MissingRequiredField { field_name: "ip" }))
    }

    /// Currency with the Turkish-lira default applied.
    pub fn currency_or_default(&self) -> Currency {
        self.currency.unwrap_or_default()
    }

    /// Installment count with the zero default applied.
    pub fn installment_or_default(&self) -> u32 {
        self.installment.unwrap_or(0)
    }
}

/// Input to payment operations (non-secure, 3-D completion, form data).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PaymentOrder {
    pub id: String,
    pub amount: f64,
    pub currency: Currency,
    pub installment: u32,
    pub ip: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub success_url: Option<String>,
    pub fail_url: Option<String>,
    pub rand: Option<String>,
    pub lang: Option<String>,
    pub recurring: Option<RecurringOrder>,
}

/// Input to post-authorization (capture).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PostAuthOrder {
    /// Reference id of the authorized transaction.
    pub id: String,
    pub amount: Option<f64>,
    pub currency: Option<Currency>,
    pub ip: Option<String>,
}

/// Input to cancellation (void).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CancelOrder {
    pub id: String,
    pub ip: Option<String>,
    /// When set, cancel only this installment of a recurring series
    /// instead of the whole order.
    pub recurring_installment_number: Option<u32>,
}

/// Input to refunds. `amount` stays `None` for a full refund; the mappers
/// must not default it, omission is what tells the gateway "full amount".
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RefundOrder {
    pub id: String,
    pub currency: Currency,
    pub amount: Option<f64>,
    pub ip: Option<String>,
}

/// Input to status queries: an order id or a recurring-series id. When both
/// are present in the source bag, the order id wins.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatusOrder {
    pub id: Option<String>,
    pub recurring_id: Option<String>,
}

/// Input to history queries.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistoryOrder {
    pub id: String,
}
