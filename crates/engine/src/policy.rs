use serde::{Deserialize, Serialize};

/// Policy knobs for the write path.
///
/// These are product-level choices the ledger itself stays agnostic about;
/// the accumulation and availability math tolerate any setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerPolicy {
    /// Reject movements whose delta sign contradicts the kind (a positive
    /// `sale`, a negative `purchase`). On by default to prevent silent
    /// sign-flip corruption.
    pub enforce_kind_sign: bool,

    /// Refuse movements for products the catalog does not know.
    pub require_known_product: bool,

    /// Permit on-hand quantity to go negative (oversold/backorder). When
    /// false, a movement that would drive on-hand below zero fails with
    /// `InsufficientStock`.
    pub allow_negative_on_hand: bool,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            enforce_kind_sign: true,
            require_known_product: true,
            allow_negative_on_hand: true,
        }
    }
}
