//! Injected 3-D Secure hash capability.

use indexmap::IndexMap;
use unipos_domain_models::{MappingResult, PosAccount};

/// Computes the gateway-specific authentication hash attached to 3-D Secure
/// form data.
///
/// The mapping layer consumes this capability, it never implements it. The
/// provider receives the ordered form inputs exactly as they will be
/// submitted, so hashing over the gateway-defined concatenation order falls
/// out of the mapper's own field ordering.
pub trait ThreeDHashProvider: Send + Sync {
    /// Compute the hash over `form_inputs` for `account`.
    ///
    /// `tx_type` is the already-translated gateway transaction token.
    fn compute_three_d_hash(
        &self,
        account: &PosAccount,
        form_inputs: &IndexMap<String, String>,
        tx_type: &str,
    ) -> MappingResult<String>;
}
