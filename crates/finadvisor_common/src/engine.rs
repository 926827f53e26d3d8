//! Advice engine
//!
//! Maps a [`FinancialProfile`] to exactly one [`Advice`]. Guards are checked
//! in priority order and the first match wins. Comparisons are on raw floats:
//! there is no epsilon on `debt == 0.0` and zero expenses are not
//! special-cased.

use crate::types::{Advice, FinancialProfile};

/// Evaluate the rule chain for a profile
pub fn evaluate(profile: &FinancialProfile) -> Advice {
    let FinancialProfile {
        income,
        expenses,
        savings,
        debt,
    } = *profile;

    if debt > income {
        Advice::PayDownDebt
    } else if expenses >= income {
        Advice::CutExpenses
    } else if savings < 3.0 * expenses {
        Advice::BuildEmergencyFund
    } else if savings > 6.0 * expenses && debt == 0.0 {
        Advice::Invest
    } else {
        Advice::KeepSaving
    }
}

/// Evaluate and return the recommendation text
pub fn evaluate_message(profile: &FinancialProfile) -> &'static str {
    evaluate(profile).message()
}
