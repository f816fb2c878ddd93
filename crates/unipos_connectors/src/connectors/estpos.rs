//! EstPos gateway family (Payten/Asseco hosted POS).
//!
//! Direct-post XML API plus a hash-protected 3-D Secure form flow. The
//! authentication hash over the redirect form is computed by the injected
//! crypt capability; everything else here is pure field mapping.

pub mod transformer;

use error_stack::{report, ResultExt};
use indexmap::IndexMap;
use serde_json::Value;
use unipos_domain_models::{
    CancelOrder, CardBrand, CreditCard, Currency, HistoryOrder, MappingError, MappingResult,
    Order, PaymentModel, PaymentOrder, PosAccount, PosResponse, PosStatus, RecurringCycle,
    RecurringOrder, RefundOrder, StatusOrder, TransactionSecurity, TxType,
};

use crate::{
    api::{RequestDataMapper, ResponseDataMapper},
    crypt::ThreeDHashProvider,
    tables::GatewayTables,
    types::{FormMethod, ThreeDAuthParams, ThreeDFormData},
    utils,
};

use transformer::{
    EstPosAccountData, EstPosBillTo, EstPosCancelRequest, EstPosHistoryRequest,
    EstPosPaymentRawResponse, EstPosPaymentRequest, EstPosPostAuthRequest, EstPosRecurringOrder,
    EstPosRefundRequest, EstPosStatusRequest, EstPosThreeDRawResponse,
};

pub(crate) static TABLES: GatewayTables = GatewayTables {
    gateway: EstPos::GATEWAY,
    tx_types: &[
        (TxType::Pay, "Auth"),
        (TxType::PrePay, "PreAuth"),
        (TxType::PostPay, "PostAuth"),
        (TxType::Cancel, "Void"),
        (TxType::Refund, "Credit"),
        (TxType::Status, "ORDERSTATUS"),
        (TxType::History, "ORDERHISTORY"),
    ],
    currencies: &[
        (Currency::TRY, "949"),
        (Currency::USD, "840"),
        (Currency::EUR, "978"),
        (Currency::GBP, "826"),
        (Currency::JPY, "392"),
        (Currency::RUB, "643"),
    ],
    card_brands: &[(CardBrand::Visa, "1"), (CardBrand::MasterCard, "2")],
    recurring_cycles: &[
        (RecurringCycle::Day, "D"),
        (RecurringCycle::Week, "W"),
        (RecurringCycle::Month, "M"),
        (RecurringCycle::Year, "Y"),
    ],
    secure_models: &[
        (PaymentModel::ThreeDSecure, "3d"),
        (PaymentModel::ThreeDPay, "3d_pay"),
        (PaymentModel::ThreeDPayHosting, "3d_pay_hosting"),
        (PaymentModel::ThreeDHost, "3d_host"),
        (PaymentModel::NonSecure, "regular"),
    ],
    success_codes: &["00"],
};

/// Return-code table, maintained separately from the success codes on
/// purpose: approval requires both to agree.
static STATUS_CODES: &[(&str, PosStatus)] = &[
    ("00", PosStatus::Approved),
    ("05", PosStatus::Declined),
    ("51", PosStatus::Declined),
    ("09", PosStatus::InvalidTransaction),
    ("12", PosStatus::InvalidTransaction),
    ("99", PosStatus::GeneralError),
];

/// Request/response data mapper for the EstPos family.
pub struct EstPos {
    crypt: Box<dyn ThreeDHashProvider>,
}

impl EstPos {
    pub const GATEWAY: &'static str = "estpos";

    /// Build a mapper around the injected hash capability.
    pub fn new(crypt: Box<dyn ThreeDHashProvider>) -> Self {
        Self { crypt }
    }

    /// Installment encoding, EstPos rule: more than one installment is
    /// wired as the number, anything else as the empty string.
    pub fn map_installment(installment: u32) -> String {
        if installment > 1 {
            installment.to_string()
        } else {
            String::new()
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

    /// Classify the 3-D Secure authentication outcome from `mdStatus`.
    /// Never fails; unknown codes fall back to MPI fallback.
    pub fn transaction_security(md_status: &str) -> TransactionSecurity {
        match md_status {
            "1" => TransactionSecurity::Full3DSecure,
            "2" | "3" | "4" => TransactionSecurity::Half3DSecure,
            _ => TransactionSecurity::MpiFallback,
        }
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
            user_id: order.user_id.clone(),
            success_url: order.success_url.clone(),
            fail_url: order.fail_url.clone(),
            rand: order.rand.clone(),
            lang: order.lang.clone(),
            recurring: order.recurring.clone(),
        })
    }

    fn prepare_cancel_order(&self, order: &Order) -> MappingResult<CancelOrder> {
        Ok(CancelOrder {
            id: order.require_id()?,
            ip: None,
            recurring_installment_number: order.recurring_installment_number,
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
        if order.id.is_none() && order.recurring_id.is_none() {
            return Err(report!(MappingError::MissingRequiredField { field_name: "id" }));
        }
        Ok(StatusOrder {
            id: order.id.clone(),
            recurring_id: order.recurring_id.clone(),
        })
    }

    fn recurring_data(recurring: &RecurringOrder) -> MappingResult<EstPosRecurringOrder> {
        Ok(EstPosRecurringOrder {
            order_type: "0",
            frequency_interval: recurring.frequency.to_string(),
            frequency_cycle: TABLES.recurring_cycle(recurring.cycle)?,
            total_number_payments: recurring.installment_count.to_string(),
        })
    }

    fn lang(account: &PosAccount, order: &PaymentOrder) -> String {
        order
            .lang
            .clone()
            .or_else(|| account.lang.clone())
            .unwrap_or_else(|| "tr".to_string())
    }

    /// Shared payment-reply decoding: default shape, normalization, dual
    /// success check, default-then-overlay assembly.
    fn map_payment_common(&self, raw: &Value, tx_type: TxType, model: PaymentModel) -> PosResponse {
        let default = PosResponse::default_shape(tx_type, model);
        if utils::raw_is_empty(raw) {
            return default;
        }
        let normalized = utils::empty_strings_to_null(raw.clone());
        let parsed: EstPosPaymentRawResponse = utils::decode_or_default(&normalized, Self::GATEWAY);

        let proc_return_code = parsed.proc_return_code.clone();
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
            order_id: parsed.order_id,
            group_id: parsed.group_id,
            trans_id: parsed.trans_id,
            auth_code: parsed.auth_code,
            ref_ret_num: parsed.host_ref_num,
            proc_return_code: proc_return_code.clone(),
            status,
            status_detail,
            error_code: (!approved).then_some(proc_return_code).flatten(),
            error_message: (!approved).then_some(parsed.err_msg).flatten(),
            all: raw.clone(),
            ..PosResponse::default()
        };
        default.merge_prefer_non_null(overlay)
    }
}

impl RequestDataMapper for EstPos {
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
        let request = EstPosPaymentRequest {
            account: EstPosAccountData::try_from(account)?,
            tx_type: TABLES.tx_type(tx_type)?,
            ip_address: order.ip.clone().unwrap_or_default(),
            email: order.email.clone().unwrap_or_default(),
            order_id: order.id.clone(),
            user_id: order.user_id.clone().unwrap_or_default(),
            total: utils::amount_to_string(order.amount),
            currency: TABLES.currency(order.currency)?,
            installment: Self::map_installment(order.installment),
            number: Some(card.number().into()),
            expires: Some(card.expiry_mm_slash_yy()),
            cvv: Some(card.cvv().into()),
            payer_txn_id: None,
            payer_security_level: None,
            payer_authentication_code: None,
            mode: "P",
            bill_to: Some(EstPosBillTo {
                name: order.name.clone().unwrap_or_default(),
            }),
            pb_order: order
                .recurring
                .as_ref()
                .map(Self::recurring_data)
                .transpose()?,
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
        let md = utils::require_auth_param(auth_params, "md")?;
        let xid = utils::require_auth_param(auth_params, "xid")?;
        let eci = utils::require_auth_param(auth_params, "eci")?;
        let cavv = utils::require_auth_param(auth_params, "cavv")?;

        let request = EstPosPaymentRequest {
            account: EstPosAccountData::try_from(account)?,
            tx_type: TABLES.tx_type(tx_type)?,
            ip_address: order.ip.clone().unwrap_or_default(),
            email: order.email.clone().unwrap_or_default(),
            order_id: order.id.clone(),
            user_id: order.user_id.clone().unwrap_or_default(),
            total: utils::amount_to_string(order.amount),
            currency: TABLES.currency(order.currency)?,
            installment: Self::map_installment(order.installment),
            // The masked PAN reference from the authentication step stands
            // in for the card number on the completion call.
            number: Some(md.into()),
            expires: None,
            cvv: None,
            payer_txn_id: Some(xid.to_owned()),
            payer_security_level: Some(eci.to_owned()),
            payer_authentication_code: Some(cavv.to_owned()),
            mode: "P",
            bill_to: order
                .name
                .clone()
                .map(|name| EstPosBillTo { name }),
            pb_order: order
                .recurring
                .as_ref()
                .map(Self::recurring_data)
                .transpose()?,
        };
        serde_json::to_value(request).change_context(MappingError::RequestEncodingFailed)
    }

    fn create_non_secure_post_auth_request(
        &self,
        account: &PosAccount,
        order: &Order,
    ) -> MappingResult<Value> {
        let request = EstPosPostAuthRequest {
            account: EstPosAccountData::try_from(account)?,
            tx_type: TABLES.tx_type(TxType::PostPay)?,
            order_id: order.require_id()?,
        };
        serde_json::to_value(request).change_context(MappingError::RequestEncodingFailed)
    }

    fn create_cancel_request(&self, account: &PosAccount, order: &Order) -> MappingResult<Value> {
        let order = self.prepare_cancel_order(order)?;
        let account = EstPosAccountData::try_from(account)?;

        // Cancelling one pending installment of a recurring series is a
        // structurally different request from a full-order void.
        let request = if let Some(installment_number) = order.recurring_installment_number {
            let mut extra = IndexMap::new();
            extra.insert("RECORDTYPE".to_string(), "Order".to_string());
            extra.insert("RECURRINGOPERATION".to_string(), "Cancel".to_string());
            extra.insert(
                "RECORDID".to_string(),
                format!("{}-{installment_number}", order.id),
            );
            EstPosCancelRequest {
                account,
                order_id: None,
                tx_type: None,
                extra: Some(extra),
            }
        } else {
            EstPosCancelRequest {
                account,
                order_id: Some(order.id),
                tx_type: Some(TABLES.tx_type(TxType::Cancel)?),
                extra: None,
            }
        };
        serde_json::to_value(request).change_context(MappingError::RequestEncodingFailed)
    }

    fn create_refund_request(&self, account: &PosAccount, order: &Order) -> MappingResult<Value> {
        let order = self.prepare_refund_order(order)?;
        let request = EstPosRefundRequest {
            account: EstPosAccountData::try_from(account)?,
            order_id: order.id,
            currency: TABLES.currency(order.currency)?,
            tx_type: TABLES.tx_type(TxType::Refund)?,
            // None means "full amount" to the gateway; never default it.
            total: order.amount.map(utils::amount_to_string),
        };
        serde_json::to_value(request).change_context(MappingError::RequestEncodingFailed)
    }

    fn create_status_request(&self, account: &PosAccount, order: &Order) -> MappingResult<Value> {
        let order = self.prepare_status_order(order)?;
        let mut extra = IndexMap::new();
        extra.insert(
            TABLES.tx_type(TxType::Status)?.to_string(),
            "QUERY".to_string(),
        );

        // An order id takes precedence over a recurring-series id.
        let order_id = order.id;
        if order_id.is_none() {
            if let Some(recurring_id) = order.recurring_id {
                extra.insert("RECURRINGID".to_string(), recurring_id);
            }
        }

        let request = EstPosStatusRequest {
            account: EstPosAccountData::try_from(account)?,
            order_id,
            extra,
        };
        serde_json::to_value(request).change_context(MappingError::RequestEncodingFailed)
    }

    fn create_history_request(&self, account: &PosAccount, order: &Order) -> MappingResult<Value> {
        let order = HistoryOrder {
            id: order.require_id()?,
        };
        let mut extra = IndexMap::new();
        extra.insert(
            TABLES.tx_type(TxType::History)?.to_string(),
            "QUERY".to_string(),
        );
        let request = EstPosHistoryRequest {
            account: EstPosAccountData::try_from(account)?,
            order_id: order.id,
            extra,
        };
        serde_json::to_value(request).change_context(MappingError::RequestEncodingFailed)
    }

    fn create_3d_form_data(
        &self,
        account: &PosAccount,
        order: &Order,
        payment_model: PaymentModel,
        tx_type: TxType,
        gateway_url: &str,
        card: Option<&CreditCard>,
        _enrollment_params: Option<&ThreeDAuthParams>,
    ) -> MappingResult<ThreeDFormData> {
        let order = self.prepare_payment_order(order)?;
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
        inputs.insert("clientid".to_string(), account.client_id.clone());
        inputs.insert(
            "storetype".to_string(),
            TABLES.secure_model(payment_model)?.to_string(),
        );
        inputs.insert("amount".to_string(), utils::amount_to_string(order.amount));
        inputs.insert("oid".to_string(), order.id.clone());
        inputs.insert("okUrl".to_string(), success_url);
        inputs.insert("failUrl".to_string(), fail_url);
        inputs.insert("rnd".to_string(), rand);
        inputs.insert("lang".to_string(), Self::lang(account, &order));
        inputs.insert(
            "currency".to_string(),
            TABLES.currency(order.currency)?.to_string(),
        );
        inputs.insert(
            "taksit".to_string(),
            Self::map_installment(order.installment),
        );
        inputs.insert("islemtipi".to_string(), tx_token.to_string());
        inputs.insert(
            "firmaadi".to_string(),
            order.name.clone().unwrap_or_default(),
        );
        inputs.insert("Email".to_string(), order.email.clone().unwrap_or_default());

        if let Some(card) = card {
            let brand = card.brand().ok_or_else(|| {
                report!(MappingError::MissingRequiredField {
                    field_name: "card_brand",
                })
            })?;
            inputs.insert("cardType".to_string(), TABLES.card_brand(brand)?.to_string());
            inputs.insert("pan".to_string(), card.number().to_string());
            inputs.insert(
                "Ecom_Payment_Card_ExpDate_Month".to_string(),
                card.exp_month(),
            );
            inputs.insert(
                "Ecom_Payment_Card_ExpDate_Year".to_string(),
                card.exp_year_short(),
            );
            inputs.insert("cv2".to_string(), card.cvv().to_string());
        }

        // Tamper evidence the bank verifies: the hash covers exactly the
        // ordered field set assembled above.
        let hash = self.crypt.compute_three_d_hash(account, &inputs, tx_token)?;
        inputs.insert("hash".to_string(), hash);

        Ok(ThreeDFormData {
            gateway_url: gateway_url.to_owned(),
            method: FormMethod::Post,
            inputs,
        })
    }
}

impl ResponseDataMapper for EstPos {
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
        let mut response = self.map_payment_common(raw, tx_type, PaymentModel::NonSecure);
        if response.order_id.is_none() {
            response.order_id = Some(order.id.clone());
        }
        response.currency.get_or_insert(order.currency);
        response.amount.get_or_insert(order.amount);
        response.installment.get_or_insert(order.installment);
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
        let parsed: EstPosThreeDRawResponse = utils::decode_or_default(&normalized, Self::GATEWAY);

        let md_status = parsed.md_status.clone().unwrap_or_default();
        let three_d_approved = matches!(md_status.as_str(), "1" | "2" | "3" | "4");

        let three_d = PosResponse {
            order_id: parsed.order_id.or_else(|| Some(order.id.clone())),
            md_status: parsed.md_status,
            transaction_security: Some(Self::transaction_security(&md_status)),
            masked_number: parsed.masked_credit_card,
            md_error_message: (!three_d_approved).then_some(parsed.md_error_msg).flatten(),
            eci: parsed.eci,
            cavv: parsed.cavv,
            amount: utils::lenient_str(parsed.amount.as_ref())
                .and_then(|amount| amount.parse().ok())
                .or(Some(order.amount)),
            currency: parsed
                .currency
                .as_deref()
                .and_then(|token| TABLES.currency_from_token(token))
                .or(Some(order.currency)),
            tx_type: Some(tx_type),
            payment_model: Some(PaymentModel::ThreeDSecure),
            all_3d: Some(raw_3d.clone()),
            ..PosResponse::default()
        };

        let provision = self.map_payment_common(
            raw_provision.unwrap_or(&Value::Null),
            tx_type,
            PaymentModel::ThreeDSecure,
        );
        three_d.merge_prefer_non_null(provision)
    }

    fn map_cancel_response(&self, raw: &Value) -> PosResponse {
        self.map_payment_common(raw, TxType::Cancel, PaymentModel::NonSecure)
    }

    fn map_refund_response(&self, raw: &Value) -> PosResponse {
        self.map_payment_common(raw, TxType::Refund, PaymentModel::NonSecure)
    }

    fn map_status_response(&self, raw: &Value) -> PosResponse {
        self.map_payment_common(raw, TxType::Status, PaymentModel::NonSecure)
    }

    fn map_history_response(&self, raw: &Value) -> MappingResult<Value> {
        Ok(utils::empty_strings_to_null(raw.clone()))
    }
}
