//! Shared enums for the canonical model.

use serde::{Deserialize, Serialize};

/// Currencies the supported gateways accept.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Currency {
    /// Turkish lira, the default for every gateway in this family.
    #[default]
    TRY,
    USD,
    EUR,
    GBP,
    JPY,
    RUB,
}

/// Transaction types across all gateway operations.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TxType {
    /// Direct sale (authorization + capture in one step).
    Pay,
    /// Authorization only; funds are captured later with [`Self::PostPay`].
    PrePay,
    /// Capture of a previously authorized transaction.
    PostPay,
    /// Void of a not-yet-settled transaction.
    Cancel,
    Refund,
    Status,
    History,
}

/// Security model selected on the account.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize, strum::Display)]
pub enum PaymentModel {
    #[serde(rename = "regular")]
    #[strum(serialize = "regular")]
    NonSecure,
    #[serde(rename = "3d")]
    #[strum(serialize = "3d")]
    ThreeDSecure,
    #[serde(rename = "3d_pay")]
    #[strum(serialize = "3d_pay")]
    ThreeDPay,
    #[serde(rename = "3d_pay_hosting")]
    #[strum(serialize = "3d_pay_hosting")]
    ThreeDPayHosting,
    #[serde(rename = "3d_host")]
    #[strum(serialize = "3d_host")]
    ThreeDHost,
}

/// Card brands with a gateway-side brand code.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CardBrand {
    Visa,
    MasterCard,
    Amex,
    Troy,
}

/// Recurring-payment frequency unit, canonical form.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum RecurringCycle {
    Day,
    Week,
    Month,
    Year,
}

/// Unified transaction status vocabulary.
///
/// The top-level response status is only ever [`Self::Approved`] or
/// [`Self::Declined`]; the remaining variants are the status-detail
/// refinements the gateways' return-code tables resolve to.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PosStatus {
    Approved,
    #[default]
    Declined,
    /// The cardholder has to call their bank before retrying.
    BankCall,
    Reject,
    TransactionNotFound,
    GeneralError,
    InvalidTransaction,
}

/// Classification of the 3-D Secure authentication outcome.
///
/// Derived from the gateway's authentication status code; deliberately not a
/// boolean because "attempted" covers both full cardholder authentication
/// and the half/fallback cases, and callers price the risk differently.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize, strum::Display)]
pub enum TransactionSecurity {
    #[serde(rename = "Full 3D Secure")]
    #[strum(serialize = "Full 3D Secure")]
    Full3DSecure,
    #[serde(rename = "Half 3D Secure")]
    #[strum(serialize = "Half 3D Secure")]
    Half3DSecure,
    #[serde(rename = "MPI fallback")]
    #[strum(serialize = "MPI fallback")]
    MpiFallback,
}
