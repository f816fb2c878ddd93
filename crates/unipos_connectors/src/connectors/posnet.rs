//! PosNet V1 gateway family (Yapı Kredi JSON API).
//!
//! Amounts travel as integer minor units and order ids are zero-padded to
//! the fixed 24-character field the host expects. The 3-D Secure form
//! carries a MAC from the injected crypt capability.

pub mod transformer;

use error_stack::{report, ResultExt};
use indexmap::IndexMap;
use serde_json::Value;
use unipos_domain_models::{
    CancelOrder, CreditCard, Currency, MappingError, MappingResult, Order, PaymentModel,
    PaymentOrder, PosAccount, PosResponse, PosStatus, PostAuthOrder, RefundOrder, StatusOrder,
    TransactionSecurity, TxType,
};

use crate::{
    api::{RequestDataMapper, ResponseDataMapper},
    crypt::ThreeDHashProvider,
    tables::GatewayTables,
    types::{FormMethod, ThreeDAuthParams, ThreeDFormData},
    utils,
};

use transformer::{
    PosNetAccountData, PosNetCancelRequest, PosNetCardData, PosNetPaymentRawResponse,
    PosNetPaymentRequest, PosNetPostAuthRequest, PosNetRefundRequest, PosNetStatusRequest,
    PosNetThreeDPaymentRequest, PosNetThreeDRawResponse, PosNetThreeDSecureData,
};

pub(crate) static TABLES: GatewayTables = GatewayTables {
    gateway: PosNetV1::GATEWAY,
    tx_types: &[
        (TxType::Pay, "Sale"),
        (TxType::PrePay, "Auth"),
        (TxType::PostPay, "Capt"),
        (TxType::Cancel, "Reverse"),
        (TxType::Refund, "Return"),
        (TxType::Status, "TransactionInquiry"),
    ],
    // request-side currency tokens; replies carry numeric ISO codes, see
    // RESPONSE_CURRENCIES
    currencies: &[
        (Currency::TRY, "TL"),
        (Currency::USD, "US"),
        (Currency::EUR, "EU"),
        (Currency::GBP, "GB"),
        (Currency::JPY, "JP"),
        (Currency::RUB, "RU"),
    ],
    card_brands: &[],
    recurring_cycles: &[],
    secure_models: &[],
    success_codes: &["00"],
};

/// Reply-side currency decode table.
static RESPONSE_CURRENCIES: &[(&str, Currency)] = &[
    ("949", Currency::TRY),
    ("840", Currency::USD),
    ("978", Currency::EUR),
    ("826", Currency::GBP),
    ("392", Currency::JPY),
    ("643", Currency::RUB),
];

/// Success code of the status-query endpoint, which differs from the
/// payment endpoints.
const STATUS_QUERY_SUCCESS_CODE: &str = "0000";

/// Return-code table; approval of a payment requires the procedure code
/// AND this table to agree.
static STATUS_CODES: &[(&str, PosStatus)] = &[
    ("00", PosStatus::Approved),
    ("0", PosStatus::Declined),
    ("2", PosStatus::Declined),
    ("0001", PosStatus::BankCall),
    ("0005", PosStatus::Reject),
    ("0007", PosStatus::BankCall),
    ("0012", PosStatus::Reject),
    ("0014", PosStatus::Reject),
    ("0030", PosStatus::BankCall),
    ("0041", PosStatus::Reject),
    ("0043", PosStatus::Reject),
    ("0051", PosStatus::Reject),
    ("0053", PosStatus::BankCall),
    ("0054", PosStatus::Reject),
    ("0057", PosStatus::Reject),
    ("0058", PosStatus::Reject),
    ("0062", PosStatus::Reject),
    ("0065", PosStatus::Reject),
    ("0091", PosStatus::BankCall),
    ("0123", PosStatus::TransactionNotFound),
    ("0444", PosStatus::BankCall),
];

/// Request/response data mapper for the PosNet V1 family.
pub struct PosNetV1 {
    crypt: Box<dyn ThreeDHashProvider>,
}

impl PosNetV1 {
    pub const GATEWAY: &'static str = "posnet-v1";

    /// Build a mapper around the injected MAC capability.
    pub fn new(crypt: Box<dyn ThreeDHashProvider>) -> Self {
        Self { crypt }
    }

    /// Installment encoding, PosNet rule: more than one installment is
    /// wired as the number, anything else as `"0"`.
    pub fn map_installment(installment: u32) -> String {
        if installment > 1 {
            installment.to_string()
        } else {
            "0".to_string()
        }
    }

    /// Order ids are a fixed 24-character field, left-padded with zeros.
    pub fn format_order_id(order_id: &str) -> String {
        format!("{order_id:0>24}")
    }

    /// Classify the 3-D Secure authentication outcome from `MdStatus`.
    pub fn transaction_security(md_status: &str) -> TransactionSecurity {
        match md_status {
            "1" => TransactionSecurity::Full3DSecure,
            "2" | "3" | "4" => TransactionSecurity::Half3DSecure,
            _ => TransactionSecurity::MpiFallback,
        }
    }

    fn status_detail(code: Option<&str>) -> Option<PosStatus> {
        code.and_then(|code| {
            STATUS_CODES
                .iter()
                .find(|(entry, _)| *entry == code)
                .map(|(_, status)| *status)
        })
    }

    fn response_currency(token: &str) -> Option<Currency> {
        RESPONSE_CURRENCIES
            .iter()
            .find(|(entry, _)| *entry == token)
            .map(|(_, currency)| *currency)
    }

    fn prepare_payment_order(&self, order: &Order) -> MappingResult<PaymentOrder> {
        Ok(PaymentOrder {
            id: order.require_id()?,
            amount: order.require_amount()?,
            currency: order.currency_or_default(),
            installment: order.installment_or_default(),
            ip: order.ip.clone(),
            email: None,
            name: None,
            user_id: None,
            success_url: order.success_url.clone(),
            fail_url: order.fail_url.clone(),
            rand: order.rand.clone(),
            lang: order.lang.clone(),
            recurring: None,
        })
    }

    fn prepare_post_auth_order(&self, order: &Order) -> MappingResult<PostAuthOrder> {
        Ok(PostAuthOrder {
            id: order.require_id()?,
            amount: Some(order.require_amount()?),
            currency: Some(order.currency_or_default()),
            ip: None,
        })
    }

    fn prepare_cancel_order(&self, order: &Order) -> MappingResult<CancelOrder> {
        Ok(CancelOrder {
            id: order.require_id()?,
            ip: None,
            recurring_installment_number: None,
        })
    }

    fn prepare_refund_order(&self, order: &Order) -> MappingResult<RefundOrder> {
        Ok(RefundOrder {
            id: order.require_id()?,
            currency: order.currency_or_default(),
            amount: order.amount,
            ip: None,
        })
    }

    fn prepare_status_order(&self, order: &Order) -> MappingResult<StatusOrder> {
        Ok(StatusOrder {
            id: Some(order.require_id()?),
            recurring_id: None,
        })
    }

    /// Shared reply decoding over the nested `ServiceResponseData` scheme.
    fn map_service_common(&self, raw: &Value, tx_type: TxType, model: PaymentModel) -> PosResponse {
        let default = PosResponse::default_shape(tx_type, model);
        if utils::raw_is_empty(raw) {
            return default;
        }
        let normalized = utils::empty_strings_to_null(raw.clone());
        let parsed: PosNetPaymentRawResponse = utils::decode_or_default(&normalized, Self::GATEWAY);

        let proc_return_code = parsed.proc_return_code();
        let status_detail = Self::status_detail(proc_return_code.as_deref());
        let approved = proc_return_code
            .as_deref()
            .is_some_and(|code| TABLES.is_success_code(code))
            && status_detail == Some(PosStatus::Approved);
        let status = if approved {
            PosStatus::Approved
        } else {
            PosStatus::Declined
        };

        let overlay = PosResponse {
            auth_code: parsed.auth_code,
            ref_ret_num: parsed.reference_code,
            proc_return_code: proc_return_code.clone(),
            status,
            status_detail,
            error_code: (!approved).then_some(proc_return_code).flatten(),
            error_message: (!approved)
                .then_some(parsed.service_response_data.and_then(|data| data.response_description))
                .flatten(),
            installment: approved
                .then_some(
                    parsed
                        .installment_data
                        .and_then(|data| utils::lenient_str(data.installment_count.as_ref()))
                        .and_then(|count| count.parse().ok()),
                )
                .flatten(),
            all: raw.clone(),
            ..PosResponse::default()
        };
        default.merge_prefer_non_null(overlay)
    }
}

impl RequestDataMapper for PosNetV1 {
    fn gateway(&self) -> &'static str {
        Self::GATEWAY
    }

    fn create_non_secure_payment_request(
        &self,
        account: &PosAccount,
        order: &Order,
        tx_type: TxType,
        card: &CreditCard,
    ) -> MappingResult<Value> {
        let order = self.prepare_payment_order(order)?;
        let request = PosNetPaymentRequest {
            account: PosNetAccountData::try_from(account)?,
            transaction_type: TABLES.tx_type(tx_type)?,
            order_id: Self::format_order_id(&order.id),
            amount: utils::to_minor_units(order.amount),
            currency_code: TABLES.currency(order.currency)?,
            installment_count: Self::map_installment(order.installment),
            client_ip: order.ip.clone(),
            card_information_data: Some(PosNetCardData {
                card_holder_name: card.holder_name().map(Into::into),
                card_no: card.number().into(),
                cvc2: card.cvv().into(),
                expire_date: card.expiry_yymm(),
            }),
        };
        serde_json::to_value(request).change_context(MappingError::RequestEncodingFailed)
    }

    fn create_3d_payment_request(
        &self,
        account: &PosAccount,
        order: &Order,
        tx_type: TxType,
        auth_params: &ThreeDAuthParams,
        _card: Option<&CreditCard>,
    ) -> MappingResult<Value> {
        let order = self.prepare_payment_order(order)?;
        let eci = utils::require_auth_param(auth_params, "ECI")?;
        let cavv = utils::require_auth_param(auth_params, "CAVV")?;
        let md = utils::require_auth_param(auth_params, "MD")?;
        let md_status = utils::require_auth_param(auth_params, "MdStatus")?;

        let request = PosNetThreeDPaymentRequest {
            account: PosNetAccountData::try_from(account)?,
            transaction_type: TABLES.tx_type(tx_type)?,
            three_d_secure_data: PosNetThreeDSecureData {
                eci: eci.to_owned(),
                cavv: cavv.to_owned(),
                md: md.to_owned(),
                md_status: md_status.to_owned(),
                order_id: Self::format_order_id(&order.id),
                amount: utils::to_minor_units(order.amount),
                currency_code: TABLES.currency(order.currency)?,
                installment_count: Self::map_installment(order.installment),
            },
        };
        serde_json::to_value(request).change_context(MappingError::RequestEncodingFailed)
    }

    fn create_non_secure_post_auth_request(
        &self,
        account: &PosAccount,
        order: &Order,
    ) -> MappingResult<Value> {
        let order = self.prepare_post_auth_order(order)?;
        let amount = order.amount.unwrap_or_default();
        let currency = order.currency.unwrap_or_default();
        let request = PosNetPostAuthRequest {
            account: PosNetAccountData::try_from(account)?,
            transaction_type: TABLES.tx_type(TxType::PostPay)?,
            reference_code: Self::format_order_id(&order.id),
            amount: utils::to_minor_units(amount),
            currency_code: TABLES.currency(currency)?,
        };
        serde_json::to_value(request).change_context(MappingError::RequestEncodingFailed)
    }

    fn create_cancel_request(&self, account: &PosAccount, order: &Order) -> MappingResult<Value> {
        let order = self.prepare_cancel_order(order)?;
        let request = PosNetCancelRequest {
            account: PosNetAccountData::try_from(account)?,
            transaction_type: TABLES.tx_type(TxType::Cancel)?,
            reference_code: Self::format_order_id(&order.id),
        };
        serde_json::to_value(request).change_context(MappingError::RequestEncodingFailed)
    }

    fn create_refund_request(&self, account: &PosAccount, order: &Order) -> MappingResult<Value> {
        let order = self.prepare_refund_order(order)?;
        let request = PosNetRefundRequest {
            account: PosNetAccountData::try_from(account)?,
            transaction_type: TABLES.tx_type(TxType::Refund)?,
            reference_code: Self::format_order_id(&order.id),
            // absent amount tells the host "full amount"
            amount: order.amount.map(utils::to_minor_units),
            currency_code: order
                .amount
                .map(|_| TABLES.currency(order.currency))
                .transpose()?,
        };
        serde_json::to_value(request).change_context(MappingError::RequestEncodingFailed)
    }

    fn create_status_request(&self, account: &PosAccount, order: &Order) -> MappingResult<Value> {
        let order = self.prepare_status_order(order)?;
        let request = PosNetStatusRequest {
            account: PosNetAccountData::try_from(account)?,
            transaction_type: TABLES.tx_type(TxType::Status)?,
            order_id: Self::format_order_id(&order.id.unwrap_or_default()),
        };
        serde_json::to_value(request).change_context(MappingError::RequestEncodingFailed)
    }

    fn create_3d_form_data(
        &self,
        account: &PosAccount,
        order: &Order,
        _payment_model: PaymentModel,
        tx_type: TxType,
        gateway_url: &str,
        _card: Option<&CreditCard>,
        _enrollment_params: Option<&ThreeDAuthParams>,
    ) -> MappingResult<ThreeDFormData> {
        let order = self.prepare_payment_order(order)?;
        let account_data = PosNetAccountData::try_from(account)?;
        let success_url = order.success_url.clone().ok_or_else(|| {
            report!(MappingError::MissingRequiredField {
                field_name: "success_url",
            })
        })?;
        let fail_url = order.fail_url.clone().ok_or_else(|| {
            report!(MappingError::MissingRequiredField {
                field_name: "fail_url",
            })
        })?;
        let rand = order.rand.clone().ok_or_else(|| {
            report!(MappingError::MissingRequiredField { field_name: "rand" })
        })?;
        let tx_token = TABLES.tx_type(tx_type)?;

        let mut inputs = IndexMap::new();
        inputs.insert("MerchantNo".to_string(), account_data.merchant_no.clone());
        inputs.insert("TerminalNo".to_string(), account_data.terminal_no.clone());
        inputs.insert("TranType".to_string(), tx_token.to_string());
        inputs.insert("Amount".to_string(), utils::to_minor_units(order.amount));
        inputs.insert(
            "CurrencyCode".to_string(),
            TABLES.currency(order.currency)?.to_string(),
        );
        inputs.insert("OrderId".to_string(), Self::format_order_id(&order.id));
        inputs.insert(
            "InstallmentCount".to_string(),
            Self::map_installment(order.installment),
        );
        inputs.insert("OkUrl".to_string(), success_url);
        inputs.insert("FailUrl".to_string(), fail_url);
        inputs.insert("Rnd".to_string(), rand);

        let mac = self.crypt.compute_three_d_hash(account, &inputs, tx_token)?;
        inputs.insert("Mac".to_string(), mac);

        Ok(ThreeDFormData {
            gateway_url: gateway_url.to_owned(),
            method: FormMethod::Post,
            inputs,
        })
    }
}

impl ResponseDataMapper for PosNetV1 {
    fn gateway(&self) -> &'static str {
        Self::GATEWAY
    }

    fn map_payment_response(
        &self,
        raw: &Value,
        tx_type: TxType,
        order: &PaymentOrder,
    ) -> PosResponse {
        tracing::debug!(gateway = Self::GATEWAY, "mapping payment response");
        let mut response = self.map_service_common(raw, tx_type, PaymentModel::NonSecure);
        if response.order_id.is_none() {
            response.order_id = Some(order.id.clone());
        }
        response.currency.get_or_insert(order.currency);
        response.amount.get_or_insert(order.amount);
        response
    }

    fn map_3d_payment_response(
        &self,
        raw_3d: &Value,
        raw_provision: Option<&Value>,
        tx_type: TxType,
        order: &PaymentOrder,
    ) -> PosResponse {
        tracing::debug!(gateway = Self::GATEWAY, "mapping 3D payment response");
        let normalized = utils::empty_strings_to_null(raw_3d.clone());
        let parsed: PosNetThreeDRawResponse = utils::decode_or_default(&normalized, Self::GATEWAY);

        let md_status = parsed.md_status.clone().unwrap_or_default();
        let three_d_approved = matches!(md_status.as_str(), "1" | "2" | "3" | "4");
        let tx_type = parsed
            .tran_type
            .as_deref()
            .and_then(|token| TABLES.tx_type_from_token(token))
            .unwrap_or(tx_type);

        let three_d = PosResponse {
            order_id: Some(order.id.clone()),
            remote_order_id: parsed.order_id,
            transaction_security: Some(Self::transaction_security(&md_status)),
            masked_number: parsed.cc_prefix,
            currency: parsed
                .currency_code
                .as_deref()
                .and_then(Self::response_currency)
                .or(Some(order.currency)),
            md_status: parsed.md_status,
            md_error_message: (!three_d_approved)
                .then_some(parsed.md_error_message)
                .flatten(),
            amount: parsed
                .amount
                .as_ref()
                .and_then(|amount| utils::lenient_str(Some(amount)))
                .and_then(|amount| utils::from_minor_units(&amount))
                .or(Some(order.amount)),
            tx_type: Some(tx_type),
            payment_model: Some(PaymentModel::ThreeDSecure),
            all_3d: Some(raw_3d.clone()),
            ..PosResponse::default()
        };

        let provision = self.map_service_common(
            raw_provision.unwrap_or(&Value::Null),
            tx_type,
            PaymentModel::ThreeDSecure,
        );
        three_d.merge_prefer_non_null(provision)
    }

    fn map_cancel_response(&self, raw: &Value) -> PosResponse {
        self.map_service_common(raw, TxType::Cancel, PaymentModel::NonSecure)
    }

    fn map_refund_response(&self, raw: &Value) -> PosResponse {
        // the host answers voids and returns with the same record
        self.map_cancel_response(raw)
    }

    fn map_status_response(&self, raw: &Value) -> PosResponse {
        let default = PosResponse::default_shape(TxType::Status, PaymentModel::NonSecure);
        if utils::raw_is_empty(raw) {
            return default;
        }
        let normalized = utils::empty_strings_to_null(raw.clone());
        let parsed: PosNetPaymentRawResponse = utils::decode_or_default(&normalized, Self::GATEWAY);

        let proc_return_code = parsed.proc_return_code();
        let approved = proc_return_code.as_deref() == Some(STATUS_QUERY_SUCCESS_CODE);
        let status = if approved {
            PosStatus::Approved
        } else {
            PosStatus::Declined
        };

        let overlay = PosResponse {
            proc_return_code: proc_return_code.clone(),
            status,
            status_detail: Self::status_detail(proc_return_code.as_deref()),
            error_code: (!approved).then_some(proc_return_code).flatten(),
            error_message: (!approved)
                .then_some(parsed.service_response_data.and_then(|data| data.response_description))
                .flatten(),
            all: raw.clone(),
            ..PosResponse::default()
        };
        default.merge_prefer_non_null(overlay)
    }

    fn map_history_response(&self, raw: &Value) -> MappingResult<Value> {
        Ok(utils::empty_strings_to_null(raw.clone()))
    }
}
