#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Wrapper types and traits for secret management.
//!
//! Secrets wrapped in [`Secret`] or [`StrongSecret`] render masked through
//! `Debug`, so card numbers and credentials cannot leak into logs by
//! accident. Access to the inner value is explicit, through
//! [`PeekInterface`] or [`ExposeInterface`].

pub use zeroize::Zeroize as ZeroizableSecret;

mod strategy;
pub use strategy::{Strategy, WithType, WithoutType};

mod abs;
pub use abs::{ExposeInterface, ExposeOptionInterface, PeekInterface};

mod secret;
pub use secret::Secret;

mod strong_secret;
pub use strong_secret::StrongSecret;

mod serde_impl;

/// This module should be included with asterisk.
///
/// `use masking::prelude::*;`
pub mod prelude {
    pub use super::{ExposeInterface, ExposeOptionInterface, PeekInterface};
}
