//! The common mapper interface every gateway family implements.

use error_stack::report;
use serde_json::Value;
use unipos_domain_models::{
    CreditCard, MappingError, MappingResult, Order, PaymentModel, PaymentOrder, PosAccount,
    PosResponse, TxType,
};

use crate::types::{ThreeDAuthParams, ThreeDFormData};

/// Builds the gateway-shaped payload for each operation.
///
/// Payloads are returned as `serde_json::Value` maps with the gateway's
/// literal key names; the excluded transport collaborator serializes them
/// to the gateway's wire encoding (XML, JSON or form fields).
///
/// Operations a family does not offer keep the default body and fail with
/// [`MappingError::NotImplemented`], distinct from input-validation errors
/// so callers can branch on capability.
pub trait RequestDataMapper {
    /// Gateway family identifier for error reports.
    fn gateway(&self) -> &'static str;

    /// Direct card payment, no redirect. The card is mandatory.
    fn create_non_secure_payment_request(
        &self,
        account: &PosAccount,
        order: &Order,
        tx_type: TxType,
        card: &CreditCard,
    ) -> MappingResult<Value>;

    /// Completes a payment after the 3-D Secure redirect returned its
    /// authentication proofs. Fails when the proofs (or the card, for
    /// gateways that require re-submitting it) are absent.
    fn create_3d_payment_request(
        &self,
        account: &PosAccount,
        order: &Order,
        tx_type: TxType,
        auth_params: &ThreeDAuthParams,
        card: Option<&CreditCard>,
    ) -> MappingResult<Value>;

    /// Captures a previously authorized, uncaptured transaction.
    fn create_non_secure_post_auth_request(
        &self,
        account: &PosAccount,
        order: &Order,
    ) -> MappingResult<Value>;

    /// Voids a transaction, or a single installment of a recurring series
    /// when the order carries an installment number.
    fn create_cancel_request(&self, account: &PosAccount, order: &Order) -> MappingResult<Value>;

    /// Partial or full refund. The amount is wired only when the order
    /// specifies one; omission means "full amount" to the gateway.
    fn create_refund_request(&self, account: &PosAccount, order: &Order) -> MappingResult<Value>;

    /// Transaction status query by order id or recurring-series id.
    fn create_status_request(&self, account: &PosAccount, order: &Order) -> MappingResult<Value>;

    /// Order history query.
    fn create_history_request(&self, account: &PosAccount, order: &Order) -> MappingResult<Value> {
        let _ = (account, order);
        Err(report!(MappingError::NotImplemented {
            operation: "history",
            gateway: self.gateway(),
        }))
    }

    /// Builds the enrollment/lookup payload that initiates the 3-D Secure
    /// handshake, for gateways that run it as a separate step.
    fn create_3d_enrollment_check_request(
        &self,
        account: &PosAccount,
        order: &Order,
        card: &CreditCard,
    ) -> MappingResult<Value> {
        let _ = (account, order, card);
        Err(report!(MappingError::NotImplemented {
            operation: "3d_enrollment_check",
            gateway: self.gateway(),
        }))
    }

    /// Builds the redirect form the caller renders and auto-submits to the
    /// bank. `enrollment_params` carries the prior enrollment reply for
    /// gateways whose form data is a pass-through repackaging of it.
    #[allow(clippy::too_many_arguments)]
    fn create_3d_form_data(
        &self,
        account: &PosAccount,
        order: &Order,
        payment_model: PaymentModel,
        tx_type: TxType,
        gateway_url: &str,
        card: Option<&CreditCard>,
        enrollment_params: Option<&ThreeDAuthParams>,
    ) -> MappingResult<ThreeDFormData>;
}

/// Decodes each gateway's raw reply into the canonical [`PosResponse`].
///
/// Response mapping never fails: decode anomalies resolve to null fields
/// and an empty raw reply yields the fully-populated default shape with
/// status declined.
pub trait ResponseDataMapper {
    /// Gateway family identifier for error reports.
    fn gateway(&self) -> &'static str;

    /// Map a non-secure payment reply.
    fn map_payment_response(
        &self,
        raw: &Value,
        tx_type: TxType,
        order: &PaymentOrder,
    ) -> PosResponse;

    /// Map the pair of replies from a 3-D Secure flow: the authentication
    /// result and, when the provisioning call already ran, its reply.
    fn map_3d_payment_response(
        &self,
        raw_3d: &Value,
        raw_provision: Option<&Value>,
        tx_type: TxType,
        order: &PaymentOrder,
    ) -> PosResponse;

    /// Map a 3D-pay reply. The gateways in this family deliver payment and
    /// authentication outcome in one callback, so the raw data doubles as
    /// the provisioning result.
    fn map_3d_pay_response(&self, raw_3d: &Value, tx_type: TxType, order: &PaymentOrder) -> PosResponse {
        self.map_3d_payment_response(raw_3d, Some(raw_3d), tx_type, order)
    }

    /// Map a 3D-host reply; same single-callback shape as 3D-pay.
    fn map_3d_host_response(
        &self,
        raw_3d: &Value,
        tx_type: TxType,
        order: &PaymentOrder,
    ) -> PosResponse {
        self.map_3d_pay_response(raw_3d, tx_type, order)
    }

    /// Map a cancel (void) reply.
    fn map_cancel_response(&self, raw: &Value) -> PosResponse;

    /// Map a refund reply.
    fn map_refund_response(&self, raw: &Value) -> PosResponse;

    /// Map a status-query reply.
    fn map_status_response(&self, raw: &Value) -> PosResponse;

    /// Map a history reply. History rows keep the gateway's own shape,
    /// normalized (empty strings to null); gateways without history report
    /// [`MappingError::NotImplemented`].
    fn map_history_response(&self, raw: &Value) -> MappingResult<Value> {
        let _ = raw;
        Err(report!(MappingError::NotImplemented {
            operation: "history",
            gateway: self.gateway(),
        }))
    }
}
