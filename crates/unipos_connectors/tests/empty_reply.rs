//! Cross-gateway guarantees of the response mappers.
//!
//! Whatever the gateway family, an empty raw reply (pre-redirect failure,
//! network-level absence of data) must still produce a fully-shaped
//! canonical response with status declined, and never a panic.

use indexmap::IndexMap;
use serde_json::{json, Value};
use unipos_connectors::{
    api::ResponseDataMapper, crypt::ThreeDHashProvider, EstPos, PayFlexV4, PosNetV1,
};
use unipos_domain_models::{
    Currency, MappingResult, PaymentModel, PaymentOrder, PosAccount, PosStatus, TxType,
};

struct NoopHash;

impl ThreeDHashProvider for NoopHash {
    fn compute_three_d_hash(
        &self,
        _account: &PosAccount,
        _form_inputs: &IndexMap<String, String>,
        _tx_type: &str,
    ) -> MappingResult<String> {
        Ok(String::new())
    }
}

fn mappers() -> Vec<Box<dyn ResponseDataMapper>> {
    vec![
        Box::new(EstPos::new(Box::new(NoopHash))),
        Box::new(PayFlexV4::new()),
        Box::new(PosNetV1::new(Box::new(NoopHash))),
    ]
}

fn order() -> PaymentOrder {
    PaymentOrder {
        id: "order222".to_string(),
        amount: 100.0,
        currency: Currency::TRY,
        installment: 0,
        ip: None,
        email: None,
        name: None,
        user_id: None,
        success_url: None,
        fail_url: None,
        rand: None,
        lang: None,
        recurring: None,
    }
}

#[test]
fn empty_payment_reply_yields_the_default_shape() {
    for raw in [Value::Null, json!({})] {
        for mapper in mappers() {
            let response = mapper.map_payment_response(&raw, TxType::Pay, &order());
            assert_eq!(
                PosStatus::Declined,
                response.status,
                "{} must decline on an empty reply",
                mapper.gateway()
            );
            assert_eq!(Some(TxType::Pay), response.tx_type);
            assert_eq!(Some(PaymentModel::NonSecure), response.payment_model);
            assert!(response.proc_return_code.is_none());
            assert!(response.error_code.is_none());
            assert!(response.trans_id.is_none());
            // the order context still fills the identifying fields
            assert_eq!(Some("order222".to_string()), response.order_id);
        }
    }
}

#[test]
fn empty_cancel_refund_and_status_replies_decline_without_panicking() {
    for mapper in mappers() {
        for response in [
            mapper.map_cancel_response(&Value::Null),
            mapper.map_refund_response(&json!({})),
            mapper.map_status_response(&Value::Null),
        ] {
            assert_eq!(PosStatus::Declined, response.status);
            assert!(response.error_code.is_none());
            assert!(response.error_message.is_none());
        }
    }
}

#[test]
fn empty_3d_reply_declines_with_a_fallback_classification() {
    for mapper in mappers() {
        let response = mapper.map_3d_payment_response(&json!({}), None, TxType::Pay, &order());
        assert_eq!(PosStatus::Declined, response.status);
        assert!(response.all_3d.is_some());
    }
}
