//! Canonical gateway response.

use serde::Serialize;

use crate::enums::{Currency, PaymentModel, PosStatus, TransactionSecurity, TxType};

/// The normalized result of any gateway operation.
///
/// Always fully shaped: response mappers start from [`Self::default_shape`]
/// and overlay gateway-derived values with [`Self::merge_prefer_non_null`],
/// so the caller receives every key even when the bank returned nothing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PosResponse {
    pub order_id: Option<String>,
    /// Order id as the gateway recorded it, when it differs from ours.
    pub remote_order_id: Option<String>,
    pub currency: Option<Currency>,
    pub amount: Option<f64>,
    pub installment: Option<u32>,
    pub group_id: Option<String>,
    /// Gateway transaction id.
    pub trans_id: Option<String>,
    pub auth_code: Option<String>,
    /// Reference/retrieval number (RRN / host reference).
    pub ref_ret_num: Option<String>,
    /// The gateway's primary return code, verbatim.
    pub proc_return_code: Option<String>,
    pub status: PosStatus,
    /// Refinement of `status` resolved from the gateway's code table.
    pub status_detail: Option<PosStatus>,
    /// Populated only when `status` is not approved.
    pub error_code: Option<String>,
    /// Populated only when `status` is not approved.
    pub error_message: Option<String>,
    pub masked_number: Option<String>,
    /// Raw 3-D Secure authentication status code (`mdStatus`).
    pub md_status: Option<String>,
    pub transaction_security: Option<TransactionSecurity>,
    pub md_error_message: Option<String>,
    pub eci: Option<String>,
    pub cavv: Option<String>,
    pub payment_model: Option<PaymentModel>,
    pub tx_type: Option<TxType>,
    /// Raw reply exactly as received, for diagnostics.
    pub all: serde_json::Value,
    /// Raw 3-D authentication reply, for the redirect flows.
    pub all_3d: Option<serde_json::Value>,
}

impl Default for PosResponse {
    fn default() -> Self {
        Self {
            order_id: None,
            remote_order_id: None,
            currency: None,
            amount: None,
            installment: None,
            group_id: None,
            trans_id: None,
            auth_code: None,
            ref_ret_num: None,
            proc_return_code: None,
            status: PosStatus::Declined,
            status_detail: None,
            error_code: None,
            error_message: None,
            masked_number: None,
            md_status: None,
            transaction_security: None,
            md_error_message: None,
            eci: None,
            cavv: None,
            payment_model: None,
            tx_type: None,
            all: serde_json::Value::Null,
            all_3d: None,
        }
    }
}

impl PosResponse {
    /// The neutral response shape for one operation: every field present,
    /// status declined. Returned as-is for empty raw replies.
    pub fn default_shape(tx_type: TxType, payment_model: PaymentModel) -> Self {
        Self {
            tx_type: Some(tx_type),
            payment_model: Some(payment_model),
            ..Self::default()
        }
    }

    /// Overlay `overlay` onto `self`, field by field, preferring non-null:
    /// an overlay value replaces the base value only when the overlay value
    /// is set, so overlay nulls never erase defaults. `status` and the raw
    /// `all` payload always come from the overlay when the overlay carries
    /// them (`status` is never null in a mapped overlay).
    pub fn merge_prefer_non_null(self, overlay: Self) -> Self {
        Self {
            order_id: overlay.order_id.or(self.order_id),
            remote_order_id: overlay.remote_order_id.or(self.remote_order_id),
            currency: overlay.currency.or(self.currency),
            amount: overlay.amount.or(self.amount),
            installment: overlay.installment.or(self.installment),
            group_id: overlay.group_id.or(self.group_id),
            trans_id: overlay.trans_id.or(self.trans_id),
            auth_code: overlay.auth_code.or(self.auth_code),
            ref_ret_num: overlay.ref_ret_num.or(self.ref_ret_num),
            proc_return_code: overlay.proc_return_code.or(self.proc_return_code),
            status: overlay.status,
            status_detail: overlay.status_detail.or(self.status_detail),
            error_code: overlay.error_code.or(self.error_code),
            error_message: overlay.error_message.or(self.error_message),
            masked_number: overlay.masked_number.or(self.masked_number),
            md_status: overlay.md_status.or(self.md_status),
            transaction_security: overlay.transaction_security.or(self.transaction_security),
            md_error_message: overlay.md_error_message.or(self.md_error_message),
            eci: overlay.eci.or(self.eci),
            cavv: overlay.cavv.or(self.cavv),
            payment_model: overlay.payment_model.or(self.payment_model),
            tx_type: overlay.tx_type.or(self.tx_type),
            all: if overlay.all.is_null() {
                self.all
            } else {
                overlay.all
            },
            all_3d: overlay.all_3d.or(self.all_3d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_nulls_never_erase_defaults() {
        let base = PosResponse {
            auth_code: None,
            order_id: Some("x".to_string()),
            ..PosResponse::default()
        };
        let overlay = PosResponse {
            auth_code: Some("y".to_string()),
            order_id: None,
            ..PosResponse::default()
        };
        let merged = base.merge_prefer_non_null(overlay);
        assert_eq!(Some("y".to_string()), merged.auth_code);
        assert_eq!(Some("x".to_string()), merged.order_id);
    }

    #[test]
    fn default_shape_is_declined_and_tagged() {
        let response = PosResponse::default_shape(TxType::Pay, PaymentModel::NonSecure);
        assert_eq!(PosStatus::Declined, response.status);
        assert_eq!(Some(TxType::Pay), response.tx_type);
        assert_eq!(Some(PaymentModel::NonSecure), response.payment_model);
        assert!(response.error_code.is_none());
    }
}
