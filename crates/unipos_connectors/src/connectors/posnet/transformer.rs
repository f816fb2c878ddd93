//! Wire payload and raw reply types for the PosNet V1 JSON API.

use masking::Secret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use unipos_domain_models::{MappingError, PosAccount};

/// JSON envelope fields present on every request.
#[derive(Debug, Serialize)]
pub struct PosNetAccountData {
    #[serde(rename = "ApiType")]
    pub api_type: &'static str,
    #[serde(rename = "ApiVersion")]
    pub api_version: &'static str,
    #[serde(rename = "MerchantNo")]
    pub merchant_no: String,
    #[serde(rename = "TerminalNo")]
    pub terminal_no: String,
}

impl TryFrom<&PosAccount> for PosNetAccountData {
    type Error = error_stack::Report<MappingError>;

    fn try_from(account: &PosAccount) -> Result<Self, Self::Error> {
        let terminal_no = account
            .terminal_id
            .clone()
            .ok_or(MappingError::MissingRequiredField {
                field_name: "terminal_id",
            })?;
        Ok(Self {
            api_type: "JSON",
            api_version: "V100",
            merchant_no: account.client_id.clone(),
            terminal_no,
        })
    }
}

/// Card sub-structure of a direct sale.
#[derive(Debug, Serialize)]
pub struct PosNetCardData {
    #[serde(rename = "CardHolderName", skip_serializing_if = "Option::is_none")]
    pub card_holder_name: Option<Secret<String>>,
    #[serde(rename = "CardNo")]
    pub card_no: Secret<String>,
    #[serde(rename = "Cvc2")]
    pub cvc2: Secret<String>,
    /// `YYMM`.
    #[serde(rename = "ExpireDate")]
    pub expire_date: String,
}

/// Direct sale / pre-authorization request.
#[derive(Debug, Serialize)]
pub struct PosNetPaymentRequest {
    #[serde(flatten)]
    pub account: PosNetAccountData,
    #[serde(rename = "TransactionType")]
    pub transaction_type: &'static str,
    #[serde(rename = "OrderId")]
    pub order_id: String,
    /// Integer minor units.
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "CurrencyCode")]
    pub currency_code: &'static str,
    #[serde(rename = "InstallmentCount")]
    pub installment_count: String,
    #[serde(rename = "ClientIp", skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    #[serde(rename = "CardInformationData", skip_serializing_if = "Option::is_none")]
    pub card_information_data: Option<PosNetCardData>,
}

/// Authentication proofs forwarded on the 3-D completion call.
#[derive(Debug, Serialize)]
pub struct PosNetThreeDSecureData {
    #[serde(rename = "ECI")]
    pub eci: String,
    #[serde(rename = "CAVV")]
    pub cavv: String,
    #[serde(rename = "MD")]
    pub md: String,
    #[serde(rename = "MdStatus")]
    pub md_status: String,
    #[serde(rename = "OrderId")]
    pub order_id: String,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "CurrencyCode")]
    pub currency_code: &'static str,
    #[serde(rename = "InstallmentCount")]
    pub installment_count: String,
}

#[derive(Debug, Serialize)]
pub struct PosNetThreeDPaymentRequest {
    #[serde(flatten)]
    pub account: PosNetAccountData,
    #[serde(rename = "TransactionType")]
    pub transaction_type: &'static str,
    #[serde(rename = "ThreeDSecureData")]
    pub three_d_secure_data: PosNetThreeDSecureData,
}

#[derive(Debug, Serialize)]
pub struct PosNetPostAuthRequest {
    #[serde(flatten)]
    pub account: PosNetAccountData,
    #[serde(rename = "TransactionType")]
    pub transaction_type: &'static str,
    #[serde(rename = "ReferenceCode")]
    pub reference_code: String,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "CurrencyCode")]
    pub currency_code: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PosNetCancelRequest {
    #[serde(flatten)]
    pub account: PosNetAccountData,
    #[serde(rename = "TransactionType")]
    pub transaction_type: &'static str,
    #[serde(rename = "ReferenceCode")]
    pub reference_code: String,
}

#[derive(Debug, Serialize)]
pub struct PosNetRefundRequest {
    #[serde(flatten)]
    pub account: PosNetAccountData,
    #[serde(rename = "TransactionType")]
    pub transaction_type: &'static str,
    #[serde(rename = "ReferenceCode")]
    pub reference_code: String,
    /// Absent for a full refund.
    #[serde(rename = "Amount", skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(rename = "CurrencyCode", skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct PosNetStatusRequest {
    #[serde(flatten)]
    pub account: PosNetAccountData,
    #[serde(rename = "TransactionType")]
    pub transaction_type: &'static str,
    #[serde(rename = "OrderId")]
    pub order_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PosNetServiceResponseData {
    #[serde(rename = "ResponseCode")]
    pub response_code: Option<String>,
    #[serde(rename = "ResponseDescription")]
    pub response_description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PosNetInstallmentData {
    #[serde(rename = "InstallmentCount")]
    pub installment_count: Option<Value>,
}

/// Typed view over a normalized payment/void/refund/status reply. The
/// procedure return code sits nested under `ServiceResponseData`.
#[derive(Debug, Default, Deserialize)]
pub struct PosNetPaymentRawResponse {
    #[serde(rename = "ServiceResponseData")]
    pub service_response_data: Option<PosNetServiceResponseData>,
    #[serde(rename = "AuthCode")]
    pub auth_code: Option<String>,
    #[serde(rename = "ReferenceCode")]
    pub reference_code: Option<String>,
    #[serde(rename = "InstallmentData")]
    pub installment_data: Option<PosNetInstallmentData>,
}

impl PosNetPaymentRawResponse {
    /// The procedure return code, from its nested location.
    pub fn proc_return_code(&self) -> Option<String> {
        self.service_response_data
            .as_ref()
            .and_then(|data| data.response_code.clone())
    }
}

/// Typed view over a normalized 3-D Secure authentication callback.
#[derive(Debug, Default, Deserialize)]
pub struct PosNetThreeDRawResponse {
    #[serde(rename = "MdStatus")]
    pub md_status: Option<String>,
    #[serde(rename = "MdErrorMessage")]
    pub md_error_message: Option<String>,
    #[serde(rename = "OrderId")]
    pub order_id: Option<String>,
    /// Leading digits of the card number, e.g. `450634`.
    #[serde(rename = "CCPrefix")]
    pub cc_prefix: Option<String>,
    #[serde(rename = "CurrencyCode")]
    pub currency_code: Option<String>,
    /// Integer minor units.
    #[serde(rename = "Amount")]
    pub amount: Option<Value>,
    #[serde(rename = "TranType")]
    pub tran_type: Option<String>,
}
