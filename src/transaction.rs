// 🧾 Transaction Record - the only entity in the ledger
// Identity (UUID) and classification (flag) are fixed at creation, never edited

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classifier;

// ============================================================================
// TRANSACTION
// ============================================================================

/// A student financial transaction as stored by the ledger.
///
/// Fields are read-only: the ledger hands out clones, so nothing a caller
/// holds can change what the ledger stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Stable identity (UUID v4) - NEVER reused
    id: Uuid,

    /// Opaque student identifier, compared by exact string equality
    student_id: String,

    /// Signed amount (negative = refund / reversal)
    amount: Decimal,

    /// Free-form label ("tuition", "grant", ...)
    #[serde(rename = "type")]
    transaction_type: String,

    /// Creation time
    timestamp: DateTime<Utc>,

    /// Anomaly flag, decided once by the classifier
    flagged: bool,
}

impl Transaction {
    /// Build a fully-formed record: fresh id, current time, flag computed now.
    pub(crate) fn create(student_id: String, amount: Decimal, transaction_type: String) -> Self {
        let flagged = classifier::classify(&transaction_type, amount);

        Transaction {
            id: Uuid::new_v4(),
            student_id,
            amount,
            transaction_type,
            timestamp: Utc::now(),
            flagged,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn transaction_type(&self) -> &str {
        &self.transaction_type
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_flagged(&self) -> bool {
        self.flagged
    }
}

// ============================================================================
// NEW TRANSACTION (validated intent)
// ============================================================================

/// A transaction intent whose fields have already been checked by the
/// intake layer. This is what the ledger accepts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewTransaction {
    pub student_id: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub transaction_type: String,
}

impl NewTransaction {
    pub fn new(
        student_id: impl Into<String>,
        amount: Decimal,
        transaction_type: impl Into<String>,
    ) -> Self {
        NewTransaction {
            student_id: student_id.into(),
            amount,
            transaction_type: transaction_type.into(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
