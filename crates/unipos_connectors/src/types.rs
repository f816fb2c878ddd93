//! Shared mapper input/output types.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;

/// HTTP method of the 3-D Secure redirect form. The banks only accept POST.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, strum::Display)]
pub enum FormMethod {
    #[serde(rename = "POST")]
    #[strum(serialize = "POST")]
    Post,
}

/// Description of the HTML form the caller renders and auto-submits to the
/// bank's ACS/redirect endpoint.
///
/// Field insertion order is preserved: for gateways whose authentication
/// hash covers ordered concatenation, reordering the inputs breaks the
/// tamper check on the bank side.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ThreeDFormData {
    pub gateway_url: String,
    pub method: FormMethod,
    pub inputs: IndexMap<String, String>,
}

/// Key/value parameters returned by a 3-D Secure authentication or
/// enrollment step (redirect callback query/body fields), fed back into the
/// mappers to complete the payment.
pub type ThreeDAuthParams = HashMap<String, String>;
