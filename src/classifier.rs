// 🚩 Anomaly Classifier - fixed threshold rules
// Evaluated once per transaction at insertion; the result is stored as the flag

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Tuition payments above this amount are anomalous
pub const TUITION_CEILING: Decimal = dec!(50000.00);

/// Grants above this amount are anomalous
pub const GRANT_CEILING: Decimal = dec!(10000.00);

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyRule {
    /// "tuition" (any case) above TUITION_CEILING
    TuitionCeiling,

    /// "grant" (any case) above GRANT_CEILING
    GrantCeiling,

    /// Any amount below zero
    NegativeAmount,
}

impl AnomalyRule {
    pub const ALL: [AnomalyRule; 3] = [
        AnomalyRule::TuitionCeiling,
        AnomalyRule::GrantCeiling,
        AnomalyRule::NegativeAmount,
    ];

    /// Check if this rule fires for the given type and amount
    pub fn matches(&self, transaction_type: &str, amount: Decimal) -> bool {
        match self {
            AnomalyRule::TuitionCeiling => {
                eq_ignore_case(transaction_type, "tuition") && amount > TUITION_CEILING
            }
            AnomalyRule::GrantCeiling => {
                eq_ignore_case(transaction_type, "grant") && amount > GRANT_CEILING
            }
            AnomalyRule::NegativeAmount => amount < Decimal::ZERO,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyRule::TuitionCeiling => "tuition_ceiling",
            AnomalyRule::GrantCeiling => "grant_ceiling",
            AnomalyRule::NegativeAmount => "negative_amount",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AnomalyRule::TuitionCeiling => "tuition payment above 50000.00",
            AnomalyRule::GrantCeiling => "grant above 10000.00",
            AnomalyRule::NegativeAmount => "negative amount",
        }
    }
}

// ============================================================================
// CASE FOLDING
// ============================================================================

// Single-char folding: uppercase, then lowercase. Multi-char expansions
// ("ß" -> "SS", "İ" -> "i\u{307}") keep the char or take the leading char,
// so "TUıTION" and "tuİtion" both fold to "tuition".
fn fold_char(c: char) -> char {
    let mut upper = c.to_uppercase();
    let upper = match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    };
    upper.to_lowercase().next().unwrap_or(upper)
}

/// Char-by-char case-insensitive equality
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars().count() == b.chars().count()
        && a
            .chars()
            .zip(b.chars())
            .all(|(x, y)| x == y || fold_char(x) == fold_char(y))
}

/// Folded form of a label; two labels fold equal iff `eq_ignore_case` holds
pub fn fold_case(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Every rule that fires, in rule order
pub fn matched_rules(transaction_type: &str, amount: Decimal) -> Vec<AnomalyRule> {
    AnomalyRule::ALL
        .iter()
        .copied()
        .filter(|rule| rule.matches(transaction_type, amount))
        .collect()
}

/// True if any rule fires. Pure and total.
pub fn classify(transaction_type: &str, amount: Decimal) -> bool {
    AnomalyRule::ALL
        .iter()
        .any(|rule| rule.matches(transaction_type, amount))
}

// ============================================================================
// TESTS
// ============================================================================
