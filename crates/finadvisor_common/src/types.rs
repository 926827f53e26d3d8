//! Core data types for the finance advisor

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four numeric inputs the engine works on.
///
/// Deserializes from both form-encoded and JSON bodies. All fields are
/// required; negative values are accepted. In JSON a field may be a number
/// or a string holding one (`"3000"`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancialProfile {
    #[serde(deserialize_with = "amount")]
    pub income: f64,
    #[serde(deserialize_with = "amount")]
    pub expenses: f64,
    #[serde(deserialize_with = "amount")]
    pub savings: f64,
    #[serde(deserialize_with = "amount")]
    pub debt: f64,
}

/// Number or numeric string, surrounding whitespace ignored
fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number or a numeric string")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            v.trim()
                .parse()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }

    deserializer.deserialize_any(AmountVisitor)
}

impl FinancialProfile {
    pub fn new(income: f64, expenses: f64, savings: f64, debt: f64) -> Self {
        Self {
            income,
            expenses,
            savings,
            debt,
        }
    }

    /// Reject NaN and infinities.
    ///
    /// Decoding parses strings with `str::parse`, which accepts `"inf"`
    /// and `"NaN"`, so transports call this before handing the profile to
    /// the engine.
    pub fn validate(&self) -> Result<(), ProfileError> {
        for (field, value) in self.fields() {
            if !value.is_finite() {
                return Err(ProfileError::NonFinite { field, value });
            }
        }
        Ok(())
    }

    fn fields(&self) -> [(&'static str, f64); 4] {
        [
            ("income", self.income),
            ("expenses", self.expenses),
            ("savings", self.savings),
            ("debt", self.debt),
        ]
    }
}

/// Profile validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("field '{field}' must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },
}

/// One of the five fixed recommendations, in rule order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advice {
    PayDownDebt,
    CutExpenses,
    BuildEmergencyFund,
    Invest,
    KeepSaving,
}

impl Advice {
    /// All variants in the order the rule chain checks them.
    pub const ALL: [Advice; 5] = [
        Advice::PayDownDebt,
        Advice::CutExpenses,
        Advice::BuildEmergencyFund,
        Advice::Invest,
        Advice::KeepSaving,
    ];

    /// The literal recommendation text sent to users
    pub fn message(&self) -> &'static str {
        match self {
            Advice::PayDownDebt => {
                "Your debt is higher than your income. Focus on paying off your debt."
            }
            Advice::CutExpenses => {
                "Your expenses are high or higher than your income. Try to cut down on unnecessary expenses."
            }
            Advice::BuildEmergencyFund => {
                "Your savings are less than 3 months' worth of expenses. Build an emergency fund."
            }
            Advice::Invest => "Your finances look great! Consider to invest your savings.",
            Advice::KeepSaving => "Keep saving and managing your finances wisely.",
        }
    }

    /// Reverse lookup from the literal text
    pub fn from_message(text: &str) -> Option<Advice> {
        Advice::ALL.into_iter().find(|a| a.message() == text)
    }
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
