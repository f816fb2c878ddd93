//! Gateway request/response data mappers.
//!
//! Each supported gateway family lives under [`connectors`] as a pair of
//! mappers behind the [`api::RequestDataMapper`] and
//! [`api::ResponseDataMapper`] traits: the request side turns the canonical
//! account/order/card model into the bank's wire format, the response side
//! turns the bank's raw reply into a [`unipos_domain_models::PosResponse`]
//! with the unified status vocabulary.
//!
//! The mappers are pure: no I/O, no shared state, no retries. Transport,
//! serialization to XML/JSON and form rendering belong to the caller; the
//! 3-D Secure hash is consumed through the injected
//! [`crypt::ThreeDHashProvider`] capability.

pub mod api;
pub mod connectors;
pub mod crypt;
pub mod tables;
pub mod types;
pub mod utils;

pub use connectors::{EstPos, PayFlexV4, PosNetV1};
