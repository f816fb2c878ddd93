//! Canonical domain models for the unipos mapping layer.
//!
//! Everything here is transient and scoped to one logical operation: the
//! mappers read these values, produce a gateway payload or a canonical
//! response, and retain nothing.

pub mod account;
pub mod card;
pub mod enums;
pub mod errors;
pub mod order;
pub mod response;

pub use account::PosAccount;
pub use card::CreditCard;
pub use enums::{
    CardBrand, Currency, PaymentModel, PosStatus, RecurringCycle, TransactionSecurity, TxType,
};
pub use errors::{MappingError, MappingResult};
pub use order::{
    CancelOrder, HistoryOrder, Order, PaymentOrder, PostAuthOrder, RecurringOrder, RefundOrder,
    StatusOrder,
};
pub use response::PosResponse;
