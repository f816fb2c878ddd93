//! Wire payload and raw reply types for the EstPos family.

use indexmap::IndexMap;
use masking::Secret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use unipos_domain_models::{MappingError, PosAccount};

/// Merchant credential fields present on every EstPos request.
#[derive(Debug, Serialize)]
pub struct EstPosAccountData {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Password")]
    pub password: Secret<String>,
    #[serde(rename = "ClientId")]
    pub client_id: String,
}

impl TryFrom<&PosAccount> for EstPosAccountData {
    type Error = error_stack::Report<MappingError>;

    fn try_from(account: &PosAccount) -> Result<Self, Self::Error> {
        let name = account.username.clone().ok_or(MappingError::MissingRequiredField {
            field_name: "username",
        })?;
        Ok(Self {
            name,
            password: account.password.clone(),
            client_id: account.client_id.clone(),
        })
    }
}

/// Bill-to sub-structure.
#[derive(Debug, Serialize)]
pub struct EstPosBillTo {
    #[serde(rename = "Name")]
    pub name: String,
}

/// Recurring series parameters (`PbOrder`).
#[derive(Debug, Serialize)]
pub struct EstPosRecurringOrder {
    #[serde(rename = "OrderType")]
    pub order_type: &'static str,
    #[serde(rename = "OrderFrequencyInterval")]
    pub frequency_interval: String,
    #[serde(rename = "OrderFrequencyCycle")]
    pub frequency_cycle: &'static str,
    #[serde(rename = "TotalNumberPayments")]
    pub total_number_payments: String,
}

/// Payment request, covering both the direct card leg and the 3-D Secure
/// completion leg: the card fields carry the PAN/expiry/CVV on a direct
/// sale and the authentication reference on a completion call.
#[derive(Debug, Serialize)]
pub struct EstPosPaymentRequest {
    #[serde(flatten)]
    pub account: EstPosAccountData,
    #[serde(rename = "Type")]
    pub tx_type: &'static str,
    #[serde(rename = "IPAddress")]
    pub ip_address: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "OrderId")]
    pub order_id: String,
    #[serde(rename = "UserId")]
    pub user_id: String,
    #[serde(rename = "Total")]
    pub total: String,
    #[serde(rename = "Currency")]
    pub currency: &'static str,
    #[serde(rename = "Taksit")]
    pub installment: String,
    #[serde(rename = "Number", skip_serializing_if = "Option::is_none")]
    pub number: Option<Secret<String>>,
    #[serde(rename = "Expires", skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(rename = "Cvv2Val", skip_serializing_if = "Option::is_none")]
    pub cvv: Option<Secret<String>>,
    #[serde(rename = "PayerTxnId", skip_serializing_if = "Option::is_none")]
    pub payer_txn_id: Option<String>,
    #[serde(rename = "PayerSecurityLevel", skip_serializing_if = "Option::is_none")]
    pub payer_security_level: Option<String>,
    #[serde(
        rename = "PayerAuthenticationCode",
        skip_serializing_if = "Option::is_none"
    )]
    pub payer_authentication_code: Option<String>,
    #[serde(rename = "Mode")]
    pub mode: &'static str,
    #[serde(rename = "BillTo", skip_serializing_if = "Option::is_none")]
    pub bill_to: Option<EstPosBillTo>,
    #[serde(rename = "PbOrder", skip_serializing_if = "Option::is_none")]
    pub pb_order: Option<EstPosRecurringOrder>,
}

/// Capture of a previously authorized transaction.
#[derive(Debug, Serialize)]
pub struct EstPosPostAuthRequest {
    #[serde(flatten)]
    pub account: EstPosAccountData,
    #[serde(rename = "Type")]
    pub tx_type: &'static str,
    #[serde(rename = "OrderId")]
    pub order_id: String,
}

/// Void request. A full-order cancel wires `OrderId` + `Type`; cancelling a
/// single recurring installment wires only the `Extra` record instead.
#[derive(Debug, Serialize)]
pub struct EstPosCancelRequest {
    #[serde(flatten)]
    pub account: EstPosAccountData,
    #[serde(rename = "OrderId", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<&'static str>,
    #[serde(rename = "Extra", skip_serializing_if = "Option::is_none")]
    pub extra: Option<IndexMap<String, String>>,
}

#[derive(Debug, Serialize)]
pub struct EstPosRefundRequest {
    #[serde(flatten)]
    pub account: EstPosAccountData,
    #[serde(rename = "OrderId")]
    pub order_id: String,
    #[serde(rename = "Currency")]
    pub currency: &'static str,
    #[serde(rename = "Type")]
    pub tx_type: &'static str,
    /// Absent for a full refund.
    #[serde(rename = "Total", skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EstPosStatusRequest {
    #[serde(flatten)]
    pub account: EstPosAccountData,
    #[serde(rename = "OrderId", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(rename = "Extra")]
    pub extra: IndexMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct EstPosHistoryRequest {
    #[serde(flatten)]
    pub account: EstPosAccountData,
    #[serde(rename = "OrderId")]
    pub order_id: String,
    #[serde(rename = "Extra")]
    pub extra: IndexMap<String, String>,
}

/// Typed view over a normalized payment/void/refund/status reply. Every
/// field is optional; the banks omit freely on decline paths.
#[derive(Debug, Default, Deserialize)]
pub struct EstPosPaymentRawResponse {
    #[serde(rename = "ProcReturnCode")]
    pub proc_return_code: Option<String>,
    #[serde(rename = "Response")]
    pub response: Option<String>,
    #[serde(rename = "OrderId")]
    pub order_id: Option<String>,
    #[serde(rename = "GroupId")]
    pub group_id: Option<String>,
    #[serde(rename = "TransId")]
    pub trans_id: Option<String>,
    #[serde(rename = "AuthCode")]
    pub auth_code: Option<String>,
    #[serde(rename = "HostRefNum")]
    pub host_ref_num: Option<String>,
    #[serde(rename = "ErrMsg")]
    pub err_msg: Option<String>,
}

/// Typed view over a normalized 3-D Secure authentication callback.
#[derive(Debug, Default, Deserialize)]
pub struct EstPosThreeDRawResponse {
    #[serde(rename = "mdStatus")]
    pub md_status: Option<String>,
    #[serde(rename = "mdErrorMsg")]
    pub md_error_msg: Option<String>,
    #[serde(rename = "maskedCreditCard")]
    pub masked_credit_card: Option<String>,
    #[serde(rename = "oid")]
    pub order_id: Option<String>,
    #[serde(rename = "amount")]
    pub amount: Option<Value>,
    #[serde(rename = "currency")]
    pub currency: Option<String>,
    #[serde(rename = "eci")]
    pub eci: Option<String>,
    #[serde(rename = "cavv")]
    pub cavv: Option<String>,
    #[serde(rename = "xid")]
    pub xid: Option<String>,
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use serde_json::json;
    use unipos_domain_models::{
        CreditCard, MappingError, MappingResult, Order, PaymentModel, PaymentOrder, PosAccount,
        PosStatus, RecurringCycle, RecurringOrder, TransactionSecurity, TxType,
    };

    use crate::{
        api::{RequestDataMapper, ResponseDataMapper},
        connectors::estpos::EstPos,
        crypt::ThreeDHashProvider,
        types::ThreeDAuthParams,
    };

    struct FixedHash;

    impl ThreeDHashProvider for FixedHash {
        fn compute_three_d_hash(
            &self,
            _account: &PosAccount,
            _form_inputs: &IndexMap<String, String>,
            _tx_type: &str,
        ) -> MappingResult<String> {
            Ok("test-hash".to_string())
        }
    }

    fn mapper() -> EstPos {
        EstPos::new(Box::new(FixedHash))
    }

    fn account() -> PosAccount {
        PosAccount {
            bank: "akbank".to_string(),
            client_id: "700655000200".to_string(),
            username: Some("ISBANKAPI".to_string()),
            password: "ISBANK07".into(),
            terminal_id: None,
            merchant_type: None,
            sub_merchant_id: None,
            model: PaymentModel::ThreeDSecure,
            lang: Some("tr".to_string()),
        }
    }

    fn card() -> CreditCard {
        CreditCard::new(
            "5555444433332222".into(),
            12,
            2026,
            "122".into(),
            Some("ahmet".into()),
            Some(unipos_domain_models::CardBrand::Visa),
        )
        .unwrap()
    }

    fn order() -> Order {
        Order {
            id: Some("order222".to_string()),
            amount: Some(100.25),
            ip: Some("127.0.0.1".to_string()),
            email: Some("test@test.com".to_string()),
            success_url: Some("https://domain.com/success".to_string()),
            fail_url: Some("https://domain.com/fail_url".to_string()),
            rand: Some("rand-12345".to_string()),
            ..Order::default()
        }
    }

    fn payment_order() -> PaymentOrder {
        PaymentOrder {
            id: "order222".to_string(),
            amount: 100.25,
            currency: unipos_domain_models::Currency::TRY,
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
    fn installments_above_one_are_wired_as_numbers() {
        assert_eq!("", EstPos::map_installment(0));
        assert_eq!("", EstPos::map_installment(1));
        assert_eq!("2", EstPos::map_installment(2));
        assert_eq!("5", EstPos::map_installment(5));
    }

    #[test]
    fn non_secure_payment_carries_card_and_defaults() {
        let value = mapper()
            .create_non_secure_payment_request(&account(), &order(), TxType::Pay, &card())
            .unwrap();
        assert_eq!("Auth", value["Type"]);
        assert_eq!("5555444433332222", value["Number"]);
        assert_eq!("12/26", value["Expires"]);
        assert_eq!("122", value["Cvv2Val"]);
        assert_eq!("949", value["Currency"]);
        assert_eq!("", value["Taksit"]);
        assert_eq!("100.25", value["Total"]);
        assert_eq!("P", value["Mode"]);
        assert_eq!("ISBANKAPI", value["Name"]);
    }

    #[test]
    fn recurring_payment_is_augmented_not_replaced() {
        let mut order = order();
        order.recurring = Some(RecurringOrder {
            frequency: 3,
            cycle: RecurringCycle::Month,
            installment_count: 4,
            end_date: None,
        });
        let value = mapper()
            .create_non_secure_payment_request(&account(), &order, TxType::Pay, &card())
            .unwrap();
        assert_eq!("3", value["PbOrder"]["OrderFrequencyInterval"]);
        assert_eq!("M", value["PbOrder"]["OrderFrequencyCycle"]);
        assert_eq!("4", value["PbOrder"]["TotalNumberPayments"]);
        // the non-recurring fields stay
        assert_eq!("order222", value["OrderId"]);
        assert_eq!("5555444433332222", value["Number"]);
    }

    #[test]
    fn three_d_payment_requires_authentication_proofs() {
        let mut params = ThreeDAuthParams::new();
        params.insert("md".to_string(), "md-token".to_string());
        params.insert("xid".to_string(), "xid-1".to_string());
        // eci and cavv missing
        let err = mapper()
            .create_3d_payment_request(&account(), &order(), TxType::Pay, &params, None)
            .unwrap_err();
        assert!(matches!(
            err.current_context(),
            MappingError::MissingRequiredField { .. }
        ));
    }

    #[test]
    fn three_d_payment_forwards_the_proofs() {
        let mut params = ThreeDAuthParams::new();
        params.insert("md".to_string(), "md-token".to_string());
        params.insert("xid".to_string(), "xid-1".to_string());
        params.insert("eci".to_string(), "05".to_string());
        params.insert("cavv".to_string(), "cavv-data".to_string());
        let value = mapper()
            .create_3d_payment_request(&account(), &order(), TxType::Pay, &params, None)
            .unwrap();
        assert_eq!("md-token", value["Number"]);
        assert_eq!("xid-1", value["PayerTxnId"]);
        assert_eq!("05", value["PayerSecurityLevel"]);
        assert_eq!("cavv-data", value["PayerAuthenticationCode"]);
        assert!(value.get("Expires").is_none());
    }

    #[test]
    fn cancel_of_one_recurring_installment_synthesizes_the_record_id() {
        let order = Order {
            id: Some("202210121ABC".to_string()),
            recurring_installment_number: Some(3),
            ..Order::default()
        };
        let value = mapper().create_cancel_request(&account(), &order).unwrap();
        assert_eq!("202210121ABC-3", value["Extra"]["RECORDID"]);
        assert_eq!("Cancel", value["Extra"]["RECURRINGOPERATION"]);
        assert_eq!("Order", value["Extra"]["RECORDTYPE"]);
        assert!(value.get("OrderId").is_none());
        assert!(value.get("Type").is_none());
    }

    #[test]
    fn full_cancel_keeps_the_void_shape() {
        let order = Order {
            id: Some("order222".to_string()),
            ..Order::default()
        };
        let value = mapper().create_cancel_request(&account(), &order).unwrap();
        assert_eq!("order222", value["OrderId"]);
        assert_eq!("Void", value["Type"]);
        assert!(value.get("Extra").is_none());
    }

    #[test]
    fn refund_without_amount_means_full_refund() {
        let order = Order {
            id: Some("order222".to_string()),
            ..Order::default()
        };
        let value = mapper().create_refund_request(&account(), &order).unwrap();
        assert!(value.get("Total").is_none());
        assert_eq!("Credit", value["Type"]);

        let partial = Order {
            amount: Some(50.0),
            ..order
        };
        let value = mapper().create_refund_request(&account(), &partial).unwrap();
        assert_eq!("50", value["Total"]);
    }

    #[test]
    fn status_prefers_order_id_over_recurring_id() {
        let order = Order {
            id: Some("order222".to_string()),
            recurring_id: Some("22303O8EA19252".to_string()),
            ..Order::default()
        };
        let value = mapper().create_status_request(&account(), &order).unwrap();
        assert_eq!("order222", value["OrderId"]);
        assert!(value["Extra"].get("RECURRINGID").is_none());
        assert_eq!("QUERY", value["Extra"]["ORDERSTATUS"]);

        let recurring_only = Order {
            id: None,
            recurring_id: Some("22303O8EA19252".to_string()),
            ..Order::default()
        };
        let value = mapper()
            .create_status_request(&account(), &recurring_only)
            .unwrap();
        assert!(value.get("OrderId").is_none());
        assert_eq!("22303O8EA19252", value["Extra"]["RECURRINGID"]);
    }

    #[test]
    fn form_data_is_ordered_and_hash_terminated() {
        let form = mapper()
            .create_3d_form_data(
                &account(),
                &order(),
                PaymentModel::ThreeDSecure,
                TxType::Pay,
                "https://entegrasyon.asseco-see.com.tr/fim/est3Dgate",
                Some(&card()),
                None,
            )
            .unwrap();
        let keys: Vec<&str> = form.inputs.keys().map(String::as_str).collect();
        assert_eq!(
            vec![
                "clientid",
                "storetype",
                "amount",
                "oid",
                "okUrl",
                "failUrl",
                "rnd",
                "lang",
                "currency",
                "taksit",
                "islemtipi",
                "firmaadi",
                "Email",
                "cardType",
                "pan",
                "Ecom_Payment_Card_ExpDate_Month",
                "Ecom_Payment_Card_ExpDate_Year",
                "cv2",
                "hash",
            ],
            keys
        );
        assert_eq!("test-hash", form.inputs["hash"]);
        assert_eq!("3d", form.inputs["storetype"]);
        assert_eq!("POST", form.method.to_string());
    }

    #[test]
    fn approved_payment_has_no_error_fields() {
        let raw = json!({
            "ProcReturnCode": "00",
            "Response": "Approved",
            "OrderId": "order222",
            "TransId": "22199T1tA14884",
            "AuthCode": "P77974",
            "HostRefNum": "219900544487",
            "ErrMsg": "",
        });
        let response = mapper().map_payment_response(&raw, TxType::Pay, &payment_order());
        assert_eq!(PosStatus::Approved, response.status);
        assert_eq!(Some(PosStatus::Approved), response.status_detail);
        assert_eq!(Some("P77974".to_string()), response.auth_code);
        assert!(response.error_code.is_none());
        assert!(response.error_message.is_none());
    }

    #[test]
    fn declined_payment_carries_code_and_message() {
        let raw = json!({
            "ProcReturnCode": "99",
            "Response": "Error",
            "ErrMsg": "Genel Hata",
        });
        let response = mapper().map_payment_response(&raw, TxType::Pay, &payment_order());
        assert_eq!(PosStatus::Declined, response.status);
        assert_eq!(Some(PosStatus::GeneralError), response.status_detail);
        assert_eq!(Some("99".to_string()), response.error_code);
        assert_eq!(Some("Genel Hata".to_string()), response.error_message);
    }

    #[test]
    fn three_d_classification_per_md_status() {
        assert_eq!(
            TransactionSecurity::Full3DSecure,
            EstPos::transaction_security("1")
        );
        for code in ["2", "3", "4"] {
            assert_eq!(
                TransactionSecurity::Half3DSecure,
                EstPos::transaction_security(code)
            );
        }
        assert_eq!(
            TransactionSecurity::MpiFallback,
            EstPos::transaction_security("0")
        );
        assert_eq!(
            TransactionSecurity::MpiFallback,
            EstPos::transaction_security("garbage")
        );
    }

    #[test]
    fn three_d_payment_merges_authentication_and_provision() {
        let raw_3d = json!({
            "mdStatus": "1",
            "oid": "order222",
            "maskedCreditCard": "5555 44** **** 2222",
            "eci": "05",
            "cavv": "cavv-data",
            "amount": "100.25",
        });
        let provision = json!({
            "ProcReturnCode": "00",
            "Response": "Approved",
            "AuthCode": "P77974",
            "TransId": "22199T1tA14884",
        });
        let response = mapper().map_3d_payment_response(
            &raw_3d,
            Some(&provision),
            TxType::Pay,
            &payment_order(),
        );
        assert_eq!(PosStatus::Approved, response.status);
        assert_eq!(
            Some(TransactionSecurity::Full3DSecure),
            response.transaction_security
        );
        assert_eq!(Some("P77974".to_string()), response.auth_code);
        assert_eq!(Some("5555 44** **** 2222".to_string()), response.masked_number);
        assert!(response.all_3d.is_some());
    }

    #[test]
    fn failed_authentication_keeps_the_error_message() {
        let raw_3d = json!({
            "mdStatus": "0",
            "mdErrorMsg": "N-status/Not enrolled",
        });
        let response =
            mapper().map_3d_payment_response(&raw_3d, None, TxType::Pay, &payment_order());
        assert_eq!(PosStatus::Declined, response.status);
        assert_eq!(
            Some("N-status/Not enrolled".to_string()),
            response.md_error_message
        );
        assert_eq!(
            Some(TransactionSecurity::MpiFallback),
            response.transaction_security
        );
    }
}
