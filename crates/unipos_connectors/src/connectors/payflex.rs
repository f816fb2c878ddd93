//! PayFlex V4 gateway family (VPOS host-to-host API).
//!
//! 3-D Secure runs as a separate enrollment handshake: the enrollment reply
//! already carries the complete ACS form bundle, so form data here is a
//! pure pass-through repackaging and no hash is computed locally.

pub mod transformer;

use error_stack::{report, ResultExt};
use indexmap::IndexMap;
use serde_json::Value;
use unipos_domain_models::{
    CancelOrder, CardBrand, CreditCard, Currency, MappingError, MappingResult, Order,
    PaymentModel, PaymentOrder, PosAccount, PosResponse, PosStatus, PostAuthOrder, RecurringCycle,
    RefundOrder, StatusOrder, TransactionSecurity, TxType,
};

use crate::{
    api::{RequestDataMapper, ResponseDataMapper},
    tables::GatewayTables,
    types::{FormMethod, ThreeDAuthParams, ThreeDFormData},
    utils,
};

use transformer::{
    PayFlexAccountData, PayFlexCancelRequest, PayFlexEnrollmentRequest, PayFlexMerchantCriteria,
    PayFlexPaymentRawResponse, PayFlexPaymentRequest, PayFlexPostAuthRequest, PayFlexRefundRequest,
    PayFlexStatusRequest, PayFlexThreeDRawResponse, PayFlexTransactionCriteria,
};

pub(crate) static TABLES: GatewayTables = GatewayTables {
    gateway: PayFlexV4::GATEWAY,
    tx_types: &[
        (TxType::Pay, "Sale"),
        (TxType::PrePay, "Auth"),
        (TxType::PostPay, "Capture"),
        (TxType::Cancel, "Cancel"),
        (TxType::Refund, "Refund"),
        (TxType::Status, "status"),
        // history is not offered by this family
    ],
    currencies: &[
        (Currency::TRY, "949"),
        (Currency::USD, "840"),
        (Currency::EUR, "978"),
        (Currency::GBP, "826"),
        (Currency::JPY, "392"),
        (Currency::RUB, "643"),
    ],
    card_brands: &[
        (CardBrand::Visa, "100"),
        (CardBrand::MasterCard, "200"),
        (CardBrand::Troy, "300"),
        (CardBrand::Amex, "400"),
    ],
    // weekly recurring series are not supported by the API contract
    recurring_cycles: &[
        (RecurringCycle::Day, "Day"),
        (RecurringCycle::Month, "Month"),
        (RecurringCycle::Year, "Year"),
    ],
    secure_models: &[],
    success_codes: &["0000"],
};

static STATUS_CODES: &[(&str, PosStatus)] = &[("0000", PosStatus::Approved)];

/// Request/response data mapper for the PayFlex V4 family.
#[derive(Default)]
pub struct PayFlexV4;

impl PayFlexV4 {
    pub const GATEWAY: &'static str = "payflex-v4";

    pub fn new() -> Self {
        Self
    }

    /// Installment encoding, PayFlex rule: more than one installment is
    /// wired as the number, anything else as `"0"`.
    pub fn map_installment(installment: u32) -> String {
        if installment > 1 {
            installment.to_string()
        } else {
            "0".to_string()
        }
    }

    /// Classify the MPI authentication status letter.
    pub fn transaction_security(status: &str) -> TransactionSecurity {
        match status {
            "Y" => TransactionSecurity::Full3DSecure,
            "A" => TransactionSecurity::Half3DSecure,
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

    fn prepare_payment_order(&self, order: &Order) -> MappingResult<PaymentOrder> {
        Ok(PaymentOrder {
            id: order.require_id()?,
            amount: order.require_amount()?,
            currency: order.currency_or_default(),
            installment: order.installment_or_default(),
            ip: order.ip.clone(),
            email: order.email.clone(),
            name: order.name.clone(),
            user_id: None,
            success_url: order.success_url.clone(),
            fail_url: order.fail_url.clone(),
            rand: order.rand.clone(),
            lang: None,
            recurring: order.recurring.clone(),
        })
    }

    fn prepare_post_auth_order(&self, order: &Order) -> MappingResult<PostAuthOrder> {
        Ok(PostAuthOrder {
            id: order.require_id()?,
            amount: Some(order.require_amount()?),
            currency: Some(order.currency_or_default()),
            ip: Some(order.require_ip()?),
        })
    }

    fn prepare_cancel_order(&self, order: &Order) -> MappingResult<CancelOrder> {
        Ok(CancelOrder {
            id: order.require_id()?,
            ip: Some(order.require_ip()?),
            recurring_installment_number: None,
        })
    }

    fn prepare_refund_order(&self, order: &Order) -> MappingResult<RefundOrder> {
        Ok(RefundOrder {
            id: order.require_id()?,
            currency: order.currency_or_default(),
            amount: Some(order.require_amount()?),
            ip: Some(order.require_ip()?),
        })
    }

    fn prepare_status_order(&self, order: &Order) -> MappingResult<StatusOrder> {
        Ok(StatusOrder {
            id: Some(order.require_id()?),
            recurring_id: None,
        })
    }

    /// Shared reply decoding over the `ResultCode`/`ResultDetail` scheme.
    fn map_result_common(&self, raw: &Value, tx_type: TxType, model: PaymentModel) -> PosResponse {
        let default = PosResponse::default_shape(tx_type, model);
        if utils::raw_is_empty(raw) {
            return default;
        }
        let normalized = utils::empty_strings_to_null(raw.clone());
        let parsed: PayFlexPaymentRawResponse = utils::decode_or_default(&normalized, Self::GATEWAY);

        let result_code = parsed.result_code.clone();
        let approved = result_code
            .as_deref()
            .is_some_and(|code| TABLES.is_success_code(code));
        let status = if approved {
            PosStatus::Approved
        } else {
            PosStatus::Declined
        };

        let overlay = PosResponse {
            order_id: parsed.order_id,
            trans_id: parsed.transaction_id,
            auth_code: parsed.auth_code,
            ref_ret_num: parsed.rrn,
            proc_return_code: result_code.clone(),
            status,
            status_detail: Self::status_detail(result_code.as_deref()),
            error_code: (!approved).then_some(result_code).flatten(),
            error_message: (!approved).then_some(parsed.result_detail).flatten(),
            tx_type: parsed
                .transaction_type
                .as_deref()
                .and_then(|token| TABLES.tx_type_from_token(token)),
            all: raw.clone(),
            ..PosResponse::default()
        };
        default.merge_prefer_non_null(overlay)
    }
}

impl RequestDataMapper for PayFlexV4 {
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
        let request = PayFlexPaymentRequest {
            account: PayFlexAccountData::try_from(account)?,
            transaction_type: TABLES.tx_type(tx_type)?,
            transaction_id: None,
            currency_amount: utils::format_amount(order.amount),
            currency_code: TABLES.currency(order.currency)?,
            eci: None,
            cavv: None,
            mpi_transaction_id: None,
            order_id: order.id.clone(),
            client_ip: order.ip.clone().unwrap_or_default(),
            transaction_device_source: "0",
            card_holders_name: None,
            cvv: Some(card.cvv().into()),
            pan: Some(card.number().into()),
            expiry: Some(card.expiry_yyyymm()),
            number_of_installments: None,
        };
        serde_json::to_value(request).change_context(MappingError::RequestEncodingFailed)
    }

    fn create_3d_payment_request(
        &self,
        account: &PosAccount,
        order: &Order,
        tx_type: TxType,
        auth_params: &ThreeDAuthParams,
        card: Option<&CreditCard>,
    ) -> MappingResult<Value> {
        // This gateway requires the card again on the completion call.
        let card = card.ok_or_else(|| {
            report!(MappingError::MissingRequiredField { field_name: "card" })
        })?;
        let order = self.prepare_payment_order(order)?;
        let eci = utils::require_auth_param(auth_params, "Eci")?;
        let cavv = utils::require_auth_param(auth_params, "Cavv")?;
        let mpi_transaction_id =
            utils::require_auth_param(auth_params, "VerifyEnrollmentRequestId")?;

        let request = PayFlexPaymentRequest {
            account: PayFlexAccountData::try_from(account)?,
            transaction_type: TABLES.tx_type(tx_type)?,
            transaction_id: Some(order.id.clone()),
            currency_amount: utils::format_amount(order.amount),
            currency_code: TABLES.currency(order.currency)?,
            eci: Some(eci.to_owned()),
            cavv: Some(cavv.to_owned()),
            mpi_transaction_id: Some(mpi_transaction_id.to_owned()),
            order_id: order.id.clone(),
            client_ip: order.ip.clone().unwrap_or_default(),
            transaction_device_source: "0",
            card_holders_name: card.holder_name().map(Into::into),
            cvv: Some(card.cvv().into()),
            pan: Some(card.number().into()),
            expiry: Some(card.expiry_yyyymm()),
            number_of_installments: (order.installment != 0)
                .then(|| Self::map_installment(order.installment)),
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
        let request = PayFlexPostAuthRequest {
            account: PayFlexAccountData::try_from(account)?,
            transaction_type: TABLES.tx_type(TxType::PostPay)?,
            reference_transaction_id: order.id,
            currency_amount: utils::format_amount(amount),
            currency_code: TABLES.currency(currency)?,
            client_ip: order.ip.unwrap_or_default(),
        };
        serde_json::to_value(request).change_context(MappingError::RequestEncodingFailed)
    }

    fn create_cancel_request(&self, account: &PosAccount, order: &Order) -> MappingResult<Value> {
        let order = self.prepare_cancel_order(order)?;
        let request = PayFlexCancelRequest {
            merchant_id: account.client_id.clone(),
            password: account.password.clone(),
            transaction_type: TABLES.tx_type(TxType::Cancel)?,
            reference_transaction_id: order.id,
            client_ip: order.ip.unwrap_or_default(),
        };
        serde_json::to_value(request).change_context(MappingError::RequestEncodingFailed)
    }

    fn create_refund_request(&self, account: &PosAccount, order: &Order) -> MappingResult<Value> {
        let order = self.prepare_refund_order(order)?;
        let amount = order.amount.unwrap_or_default();
        let request = PayFlexRefundRequest {
            merchant_id: account.client_id.clone(),
            password: account.password.clone(),
            transaction_type: TABLES.tx_type(TxType::Refund)?,
            reference_transaction_id: order.id,
            client_ip: order.ip.unwrap_or_default(),
            currency_amount: utils::format_amount(amount),
        };
        serde_json::to_value(request).change_context(MappingError::RequestEncodingFailed)
    }

    fn create_status_request(&self, account: &PosAccount, order: &Order) -> MappingResult<Value> {
        let order = self.prepare_status_order(order)?;
        let request = PayFlexStatusRequest {
            merchant_criteria: PayFlexMerchantCriteria {
                host_merchant_id: account.client_id.clone(),
                merchant_password: account.password.clone(),
            },
            // the gateway prefers TransactionId over OrderId when both are
            // filled, so the unused selectors stay empty on purpose
            transaction_criteria: PayFlexTransactionCriteria {
                transaction_id: String::new(),
                order_id: order.id.unwrap_or_default(),
                auth_code: String::new(),
            },
        };
        serde_json::to_value(request).change_context(MappingError::RequestEncodingFailed)
    }

    fn create_3d_enrollment_check_request(
        &self,
        account: &PosAccount,
        order: &Order,
        card: &CreditCard,
    ) -> MappingResult<Value> {
        let order = self.prepare_payment_order(order)?;
        let merchant_type = account.merchant_type.clone().ok_or_else(|| {
            report!(MappingError::MissingRequiredField {
                field_name: "merchant_type",
            })
        })?;
        let verify_enrollment_request_id = order.rand.clone().ok_or_else(|| {
            report!(MappingError::MissingRequiredField { field_name: "rand" })
        })?;
        let success_url = order.success_url.clone().ok_or_else(|| {
            report!(MappingError::MissingRequiredField {
                field_name: "success_url",
            })
        })?;
        let failure_url = order.fail_url.clone().ok_or_else(|| {
            report!(MappingError::MissingRequiredField {
                field_name: "fail_url",
            })
        })?;
        let brand = card.brand().ok_or_else(|| {
            report!(MappingError::MissingRequiredField {
                field_name: "card_brand",
            })
        })?;

        let recurring = order.recurring.as_ref();
        let request = PayFlexEnrollmentRequest {
            merchant_id: account.client_id.clone(),
            merchant_password: account.password.clone(),
            merchant_type,
            purchase_amount: utils::format_amount(order.amount),
            verify_enrollment_request_id,
            currency: TABLES.currency(order.currency)?,
            success_url,
            failure_url,
            pan: card.number().into(),
            expiry_date: card.expiry_yymm(),
            brand_name: TABLES.card_brand(brand)?,
            is_recurring: if recurring.is_some() { "true" } else { "false" },
            installment_count: (order.installment != 0)
                .then(|| Self::map_installment(order.installment)),
            sub_merchant_id: account.sub_merchant_id.clone(),
            recurring_frequency: recurring.map(|data| data.frequency.to_string()),
            recurring_frequency_type: recurring
                .map(|data| TABLES.recurring_cycle(data.cycle))
                .transpose()?,
            recurring_installment_count: recurring.map(|data| data.installment_count.to_string()),
            // the ACS refuses end dates past the card expiry
            recurring_end_date: recurring
                .and_then(|data| data.end_date)
                .map(utils::format_end_date),
        };
        serde_json::to_value(request).change_context(MappingError::RequestEncodingFailed)
    }

    fn create_3d_form_data(
        &self,
        _account: &PosAccount,
        _order: &Order,
        _payment_model: PaymentModel,
        _tx_type: TxType,
        _gateway_url: &str,
        _card: Option<&CreditCard>,
        enrollment_params: Option<&ThreeDAuthParams>,
    ) -> MappingResult<ThreeDFormData> {
        // Pure pass-through: the enrollment step already produced the ACS
        // bundle, nothing is computed here.
        let params = enrollment_params.ok_or_else(|| {
            report!(MappingError::MissingRequiredField {
                field_name: "enrollment_params",
            })
        })?;
        let acs_url = utils::require_auth_param(params, "ACSUrl")?;
        let pa_req = utils::require_auth_param(params, "PaReq")?;
        let term_url = utils::require_auth_param(params, "TermUrl")?;
        let md = utils::require_auth_param(params, "MD")?;

        let mut inputs = IndexMap::new();
        inputs.insert("PaReq".to_string(), pa_req.to_owned());
        inputs.insert("TermUrl".to_string(), term_url.to_owned());
        inputs.insert("MD".to_string(), md.to_owned());

        Ok(ThreeDFormData {
            gateway_url: acs_url.to_owned(),
            method: FormMethod::Post,
            inputs,
        })
    }
}

impl ResponseDataMapper for PayFlexV4 {
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
        let mut response = self.map_result_common(raw, tx_type, PaymentModel::NonSecure);
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
        let parsed: PayFlexThreeDRawResponse = utils::decode_or_default(&normalized, Self::GATEWAY);

        let mpi_status = parsed.status.clone().unwrap_or_default();
        let three_d_approved = mpi_status == "Y";

        let three_d = PosResponse {
            order_id: Some(order.id.clone()),
            currency: Some(order.currency),
            amount: Some(order.amount),
            md_status: parsed.status,
            transaction_security: Some(Self::transaction_security(&mpi_status)),
            eci: parsed.eci,
            cavv: parsed.cavv,
            md_error_message: (!three_d_approved).then_some(parsed.error_message).flatten(),
            tx_type: Some(tx_type),
            payment_model: Some(PaymentModel::ThreeDSecure),
            all_3d: Some(raw_3d.clone()),
            ..PosResponse::default()
        };

        let provision = self.map_result_common(
            raw_provision.unwrap_or(&Value::Null),
            tx_type,
            PaymentModel::ThreeDSecure,
        );
        three_d.merge_prefer_non_null(provision)
    }

    fn map_cancel_response(&self, raw: &Value) -> PosResponse {
        self.map_result_common(raw, TxType::Cancel, PaymentModel::NonSecure)
    }

    fn map_refund_response(&self, raw: &Value) -> PosResponse {
        self.map_result_common(raw, TxType::Refund, PaymentModel::NonSecure)
    }

    fn map_status_response(&self, raw: &Value) -> PosResponse {
        self.map_result_common(raw, TxType::Status, PaymentModel::NonSecure)
    }
}
