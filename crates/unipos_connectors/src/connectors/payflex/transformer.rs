//! Wire payload and raw reply types for the PayFlex V4 family.

use masking::Secret;
use serde::{Deserialize, Serialize};
use unipos_domain_models::{MappingError, PosAccount};

/// Merchant credential fields present on payment-side requests.
#[derive(Debug, Serialize)]
pub struct PayFlexAccountData {
    #[serde(rename = "MerchantId")]
    pub merchant_id: String,
    #[serde(rename = "Password")]
    pub password: Secret<String>,
    #[serde(rename = "TerminalNo")]
    pub terminal_no: String,
}

impl TryFrom<&PosAccount> for PayFlexAccountData {
    type Error = error_stack::Report<MappingError>;

    fn try_from(account: &PosAccount) -> Result<Self, Self::Error> {
        let terminal_no = account
            .terminal_id
            .clone()
            .ok_or(MappingError::MissingRequiredField {
                field_name: "terminal_id",
            })?;
        Ok(Self {
            merchant_id: account.client_id.clone(),
            password: account.password.clone(),
            terminal_no,
        })
    }
}

/// Payment request for the direct leg and the 3-D completion leg; the
/// completion leg re-submits the card next to the authentication proofs.
#[derive(Debug, Serialize)]
pub struct PayFlexPaymentRequest {
    #[serde(flatten)]
    pub account: PayFlexAccountData,
    #[serde(rename = "TransactionType")]
    pub transaction_type: &'static str,
    #[serde(rename = "TransactionId", skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(rename = "CurrencyAmount")]
    pub currency_amount: String,
    #[serde(rename = "CurrencyCode")]
    pub currency_code: &'static str,
    #[serde(rename = "ECI", skip_serializing_if = "Option::is_none")]
    pub eci: Option<String>,
    #[serde(rename = "CAVV", skip_serializing_if = "Option::is_none")]
    pub cavv: Option<String>,
    #[serde(rename = "MpiTransactionId", skip_serializing_if = "Option::is_none")]
    pub mpi_transaction_id: Option<String>,
    #[serde(rename = "OrderId")]
    pub order_id: String,
    #[serde(rename = "ClientIp")]
    pub client_ip: String,
    /// `"0"`: e-commerce.
    #[serde(rename = "TransactionDeviceSource")]
    pub transaction_device_source: &'static str,
    #[serde(rename = "CardHoldersName", skip_serializing_if = "Option::is_none")]
    pub card_holders_name: Option<Secret<String>>,
    #[serde(rename = "Cvv", skip_serializing_if = "Option::is_none")]
    pub cvv: Option<Secret<String>>,
    #[serde(rename = "Pan", skip_serializing_if = "Option::is_none")]
    pub pan: Option<Secret<String>>,
    #[serde(rename = "Expiry", skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(rename = "NumberOfInstallments", skip_serializing_if = "Option::is_none")]
    pub number_of_installments: Option<String>,
}

/// Enrollment/lookup payload that initiates the 3-D Secure handshake.
#[derive(Debug, Serialize)]
pub struct PayFlexEnrollmentRequest {
    #[serde(rename = "MerchantId")]
    pub merchant_id: String,
    #[serde(rename = "MerchantPassword")]
    pub merchant_password: Secret<String>,
    #[serde(rename = "MerchantType")]
    pub merchant_type: String,
    #[serde(rename = "PurchaseAmount")]
    pub purchase_amount: String,
    #[serde(rename = "VerifyEnrollmentRequestId")]
    pub verify_enrollment_request_id: String,
    #[serde(rename = "Currency")]
    pub currency: &'static str,
    #[serde(rename = "SuccessUrl")]
    pub success_url: String,
    #[serde(rename = "FailureUrl")]
    pub failure_url: String,
    #[serde(rename = "Pan")]
    pub pan: Secret<String>,
    #[serde(rename = "ExpiryDate")]
    pub expiry_date: String,
    #[serde(rename = "BrandName")]
    pub brand_name: &'static str,
    #[serde(rename = "IsRecurring")]
    pub is_recurring: &'static str,
    #[serde(rename = "InstallmentCount", skip_serializing_if = "Option::is_none")]
    pub installment_count: Option<String>,
    #[serde(rename = "SubMerchantId", skip_serializing_if = "Option::is_none")]
    pub sub_merchant_id: Option<String>,
    #[serde(rename = "RecurringFrequency", skip_serializing_if = "Option::is_none")]
    pub recurring_frequency: Option<String>,
    #[serde(
        rename = "RecurringFrequencyType",
        skip_serializing_if = "Option::is_none"
    )]
    pub recurring_frequency_type: Option<&'static str>,
    #[serde(
        rename = "RecurringInstallmentCount",
        skip_serializing_if = "Option::is_none"
    )]
    pub recurring_installment_count: Option<String>,
    #[serde(rename = "RecurringEndDate", skip_serializing_if = "Option::is_none")]
    pub recurring_end_date: Option<String>,
}

/// Capture request, addressed by the reference transaction id.
#[derive(Debug, Serialize)]
pub struct PayFlexPostAuthRequest {
    #[serde(flatten)]
    pub account: PayFlexAccountData,
    #[serde(rename = "TransactionType")]
    pub transaction_type: &'static str,
    #[serde(rename = "ReferenceTransactionId")]
    pub reference_transaction_id: String,
    #[serde(rename = "CurrencyAmount")]
    pub currency_amount: String,
    #[serde(rename = "CurrencyCode")]
    pub currency_code: &'static str,
    #[serde(rename = "ClientIp")]
    pub client_ip: String,
}

/// Void request; this endpoint takes no terminal number.
#[derive(Debug, Serialize)]
pub struct PayFlexCancelRequest {
    #[serde(rename = "MerchantId")]
    pub merchant_id: String,
    #[serde(rename = "Password")]
    pub password: Secret<String>,
    #[serde(rename = "TransactionType")]
    pub transaction_type: &'static str,
    #[serde(rename = "ReferenceTransactionId")]
    pub reference_transaction_id: String,
    #[serde(rename = "ClientIp")]
    pub client_ip: String,
}

#[derive(Debug, Serialize)]
pub struct PayFlexRefundRequest {
    #[serde(rename = "MerchantId")]
    pub merchant_id: String,
    #[serde(rename = "Password")]
    pub password: Secret<String>,
    #[serde(rename = "TransactionType")]
    pub transaction_type: &'static str,
    #[serde(rename = "ReferenceTransactionId")]
    pub reference_transaction_id: String,
    #[serde(rename = "ClientIp")]
    pub client_ip: String,
    #[serde(rename = "CurrencyAmount")]
    pub currency_amount: String,
}

#[derive(Debug, Serialize)]
pub struct PayFlexMerchantCriteria {
    #[serde(rename = "HostMerchantId")]
    pub host_merchant_id: String,
    #[serde(rename = "MerchantPassword")]
    pub merchant_password: Secret<String>,
}

#[derive(Debug, Serialize)]
pub struct PayFlexTransactionCriteria {
    #[serde(rename = "TransactionId")]
    pub transaction_id: String,
    #[serde(rename = "OrderId")]
    pub order_id: String,
    #[serde(rename = "AuthCode")]
    pub auth_code: String,
}

/// Status query with the gateway's nested criteria shape.
#[derive(Debug, Serialize)]
pub struct PayFlexStatusRequest {
    #[serde(rename = "MerchantCriteria")]
    pub merchant_criteria: PayFlexMerchantCriteria,
    #[serde(rename = "TransactionCriteria")]
    pub transaction_criteria: PayFlexTransactionCriteria,
}

/// Typed view over a normalized payment-side reply.
#[derive(Debug, Default, Deserialize)]
pub struct PayFlexPaymentRawResponse {
    #[serde(rename = "ResultCode")]
    pub result_code: Option<String>,
    #[serde(rename = "ResultDetail")]
    pub result_detail: Option<String>,
    #[serde(rename = "OrderId")]
    pub order_id: Option<String>,
    #[serde(rename = "TransactionId")]
    pub transaction_id: Option<String>,
    #[serde(rename = "AuthCode")]
    pub auth_code: Option<String>,
    #[serde(rename = "Rrn")]
    pub rrn: Option<String>,
    #[serde(rename = "TransactionType")]
    pub transaction_type: Option<String>,
}

/// Typed view over a normalized MPI authentication result.
#[derive(Debug, Default, Deserialize)]
pub struct PayFlexThreeDRawResponse {
    #[serde(rename = "Status")]
    pub status: Option<String>,
    #[serde(rename = "Eci")]
    pub eci: Option<String>,
    #[serde(rename = "Cavv")]
    pub cavv: Option<String>,
    #[serde(rename = "VerifyEnrollmentRequestId")]
    pub verify_enrollment_request_id: Option<String>,
    #[serde(rename = "ErrorMessage")]
    pub error_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::date;
    use unipos_domain_models::{
        CardBrand, CreditCard, Currency, MappingError, Order, PaymentModel, PaymentOrder,
        PosAccount, PosStatus, RecurringCycle, RecurringOrder, TransactionSecurity, TxType,
    };

    use crate::{
        api::{RequestDataMapper, ResponseDataMapper},
        connectors::payflex::PayFlexV4,
        types::ThreeDAuthParams,
    };

    fn account() -> PosAccount {
        PosAccount {
            bank: "vakifbank".to_string(),
            client_id: "000000000111111".to_string(),
            username: None,
            password: "3XTgER89as".into(),
            terminal_id: Some("VP999999".to_string()),
            merchant_type: Some("0".to_string()),
            sub_merchant_id: None,
            model: PaymentModel::ThreeDSecure,
            lang: None,
        }
    }

    fn card() -> CreditCard {
        CreditCard::new(
            "5555444433332222".into(),
            12,
            2021,
            "122".into(),
            Some("ahmet".into()),
            Some(CardBrand::Visa),
        )
        .unwrap()
    }

    fn order() -> Order {
        Order {
            id: Some("order222".to_string()),
            amount: Some(100.0),
            ip: Some("127.0.0.1".to_string()),
            success_url: Some("https://domain.com/success".to_string()),
            fail_url: Some("https://domain.com/fail_url".to_string()),
            rand: Some("enrollment-1".to_string()),
            ..Order::default()
        }
    }

    fn payment_order() -> PaymentOrder {
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
    fn zero_and_one_installment_are_wired_as_zero() {
        assert_eq!("0", PayFlexV4::map_installment(0));
        assert_eq!("0", PayFlexV4::map_installment(1));
        assert_eq!("2", PayFlexV4::map_installment(2));
        assert_eq!("5", PayFlexV4::map_installment(5));
    }

    #[test]
    fn non_secure_payment_uses_long_expiry_and_formatted_amount() {
        let value = PayFlexV4::new()
            .create_non_secure_payment_request(&account(), &order(), TxType::Pay, &card())
            .unwrap();
        assert_eq!("Sale", value["TransactionType"]);
        assert_eq!("100.00", value["CurrencyAmount"]);
        assert_eq!("949", value["CurrencyCode"]);
        assert_eq!("202112", value["Expiry"]);
        assert_eq!("VP999999", value["TerminalNo"]);
        assert_eq!("0", value["TransactionDeviceSource"]);
        assert!(value.get("ECI").is_none());
    }

    #[test]
    fn three_d_completion_without_card_is_a_usage_error() {
        let mut params = ThreeDAuthParams::new();
        params.insert("Eci".to_string(), "05".to_string());
        params.insert("Cavv".to_string(), "cavv-data".to_string());
        params.insert(
            "VerifyEnrollmentRequestId".to_string(),
            "enrollment-1".to_string(),
        );
        let err = PayFlexV4::new()
            .create_3d_payment_request(&account(), &order(), TxType::Pay, &params, None)
            .unwrap_err();
        assert_eq!(
            &MappingError::MissingRequiredField { field_name: "card" },
            err.current_context()
        );
    }

    #[test]
    fn three_d_completion_forwards_proofs_and_card() {
        let mut params = ThreeDAuthParams::new();
        params.insert("Eci".to_string(), "05".to_string());
        params.insert("Cavv".to_string(), "cavv-data".to_string());
        params.insert(
            "VerifyEnrollmentRequestId".to_string(),
            "enrollment-1".to_string(),
        );
        let value = PayFlexV4::new()
            .create_3d_payment_request(&account(), &order(), TxType::Pay, &params, Some(&card()))
            .unwrap();
        assert_eq!("05", value["ECI"]);
        assert_eq!("cavv-data", value["CAVV"]);
        assert_eq!("enrollment-1", value["MpiTransactionId"]);
        assert_eq!("5555444433332222", value["Pan"]);
        assert_eq!("ahmet", value["CardHoldersName"]);
        assert!(value.get("NumberOfInstallments").is_none());
    }

    #[test]
    fn enrollment_check_includes_recurring_and_sub_merchant_data() {
        let mut account = account();
        account.sub_merchant_id = Some("sub-001".to_string());
        let mut order = order();
        order.recurring = Some(RecurringOrder {
            frequency: 1,
            cycle: RecurringCycle::Month,
            installment_count: 12,
            end_date: Some(date!(2026 - 12 - 31)),
        });
        let value = PayFlexV4::new()
            .create_3d_enrollment_check_request(&account, &order, &card())
            .unwrap();
        assert_eq!("100.00", value["PurchaseAmount"]);
        assert_eq!("2112", value["ExpiryDate"]);
        assert_eq!("100", value["BrandName"]);
        assert_eq!("true", value["IsRecurring"]);
        assert_eq!("1", value["RecurringFrequency"]);
        assert_eq!("Month", value["RecurringFrequencyType"]);
        assert_eq!("12", value["RecurringInstallmentCount"]);
        assert_eq!("20261231", value["RecurringEndDate"]);
        assert_eq!("sub-001", value["SubMerchantId"]);
    }

    #[test]
    fn weekly_recurring_series_are_a_translation_error() {
        let mut order = order();
        order.recurring = Some(RecurringOrder {
            frequency: 1,
            cycle: RecurringCycle::Week,
            installment_count: 4,
            end_date: None,
        });
        let err = PayFlexV4::new()
            .create_3d_enrollment_check_request(&account(), &order, &card())
            .unwrap_err();
        assert!(matches!(
            err.current_context(),
            MappingError::TranslationMissing { .. }
        ));
    }

    #[test]
    fn history_is_not_implemented() {
        let err = PayFlexV4::new()
            .create_history_request(&account(), &order())
            .unwrap_err();
        assert_eq!(
            &MappingError::NotImplemented {
                operation: "history",
                gateway: PayFlexV4::GATEWAY,
            },
            err.current_context()
        );
    }

    #[test]
    fn form_data_is_a_pass_through_of_the_enrollment_bundle() {
        let mut params = ThreeDAuthParams::new();
        params.insert("ACSUrl".to_string(), "https://acs.bank.com.tr/mpi".to_string());
        params.insert("PaReq".to_string(), "pareq-blob".to_string());
        params.insert("TermUrl".to_string(), "https://domain.com/term".to_string());
        params.insert("MD".to_string(), "md-blob".to_string());
        let form = PayFlexV4::new()
            .create_3d_form_data(
                &account(),
                &order(),
                PaymentModel::ThreeDSecure,
                TxType::Pay,
                "ignored",
                None,
                Some(&params),
            )
            .unwrap();
        assert_eq!("https://acs.bank.com.tr/mpi", form.gateway_url);
        let keys: Vec<&str> = form.inputs.keys().map(String::as_str).collect();
        assert_eq!(vec!["PaReq", "TermUrl", "MD"], keys);
        assert_eq!("pareq-blob", form.inputs["PaReq"]);
    }

    #[test]
    fn result_code_0000_is_approved() {
        let raw = json!({
            "ResultCode": "0000",
            "ResultDetail": "İŞLEM BAŞARILI",
            "TransactionId": "28d2b9c27af545f48d49afc300db246b",
            "AuthCode": "368513",
            "Rrn": "219900544487",
        });
        let response = PayFlexV4::new().map_payment_response(&raw, TxType::Pay, &payment_order());
        assert_eq!(PosStatus::Approved, response.status);
        assert_eq!(
            Some("28d2b9c27af545f48d49afc300db246b".to_string()),
            response.trans_id
        );
        assert!(response.error_code.is_none());
    }

    #[test]
    fn non_success_codes_are_declined_with_detail() {
        let raw = json!({
            "ResultCode": "0312",
            "ResultDetail": "RED-GEÇERSİZ İŞLEM",
        });
        let response = PayFlexV4::new().map_payment_response(&raw, TxType::Pay, &payment_order());
        assert_eq!(PosStatus::Declined, response.status);
        assert_eq!(Some("0312".to_string()), response.error_code);
        assert_eq!(Some("RED-GEÇERSİZ İŞLEM".to_string()), response.error_message);
    }

    #[test]
    fn mpi_status_classification() {
        assert_eq!(
            TransactionSecurity::Full3DSecure,
            PayFlexV4::transaction_security("Y")
        );
        assert_eq!(
            TransactionSecurity::Half3DSecure,
            PayFlexV4::transaction_security("A")
        );
        assert_eq!(
            TransactionSecurity::MpiFallback,
            PayFlexV4::transaction_security("N")
        );
    }

    #[test]
    fn failed_enrollment_never_reaches_approved() {
        let raw_3d = json!({
            "Status": "N",
            "ErrorMessage": "Not enrolled",
        });
        let response =
            PayFlexV4::new().map_3d_payment_response(&raw_3d, None, TxType::Pay, &payment_order());
        assert_eq!(PosStatus::Declined, response.status);
        assert_eq!(Some("Not enrolled".to_string()), response.md_error_message);
        assert_eq!(
            Some(TransactionSecurity::MpiFallback),
            response.transaction_security
        );
    }
}
