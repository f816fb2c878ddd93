//! Bank account credentials and routing info.

use masking::Secret;

use crate::enums::PaymentModel;

/// Merchant credentials for one bank, owned by the caller for the duration
/// of a transaction. Mappers only read it.
#[derive(Clone, Debug)]
pub struct PosAccount {
    /// Bank identifier, used for routing and diagnostics only.
    pub bank: String,
    /// Merchant/client id (`ClientId`, `MerchantId` or `MerchantNo`
    /// depending on the gateway).
    pub client_id: String,
    /// API username; not every gateway issues one.
    pub username: Option<String>,
    pub password: Secret<String>,
    /// Terminal number for gateways that address terminals directly.
    pub terminal_id: Option<String>,
    /// Merchant type token for gateways that distinguish main branches from
    /// sub-branches.
    pub merchant_type: Option<String>,
    /// Sub-merchant id; presence marks the account as a sub-branch.
    pub sub_merchant_id: Option<String>,
    /// Security model the account was registered with.
    pub model: PaymentModel,
    /// Interface language (`tr`/`en`).
    pub lang: Option<String>,
}

impl PosAccount {
    /// Whether this account operates as a sub-branch of a main merchant.
    pub fn is_sub_branch(&self) -> bool {
        self.sub_merchant_id.is_some()
    }
}
